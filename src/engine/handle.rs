//! The conversion handle: lifecycle, ratio state and one-shot processing.
//!
//! # Path selection
//!
//! ```text
//! process(request)
//!   │  validate (state → mode → buffers → ratio → overlap)
//!   ▼
//! last_ratio unset? ── yes ──▶ adopt request ratio
//!   │
//!   ▼
//! |last_ratio − src_ratio| < 1e-15 ── yes ──▶ kernel.process_constant
//!                                  └─ no ───▶ kernel.process_variable
//! ```
//!
//! The variable path lets the kernel sweep smoothly from the previous ratio
//! to the new one instead of jumping, which would be audible.

use std::fmt;

use crate::error::SrcError;
use crate::kernel::{Block, ConverterId, Kernel, Registry};
use crate::ratio::{is_valid_ratio, same_ratio};

use super::callback::Stream;
use super::mode::Mode;
use super::request::ConversionRequest;

// ---------------------------------------------------------------------------
// Core
// ---------------------------------------------------------------------------

/// Handle state the processing path needs.  Kept apart from the streaming
/// state so a read can lend its leftover buffer to a request while
/// dispatching through the core.
pub(crate) struct Core {
    pub(crate) id: ConverterId,
    pub(crate) channels: usize,
    pub(crate) mode: Mode,
    pub(crate) last_ratio: Option<f64>,
    pub(crate) last_error: Option<SrcError>,
    /// `None` once the handle has been closed.
    pub(crate) kernel: Option<Box<dyn Kernel>>,
}

impl Core {
    /// Record `error` as the handle's last error and hand it back.
    pub(crate) fn fail(&mut self, error: SrcError) -> SrcError {
        log::debug!("converter: {} ({})", error, self.mode.label());
        self.last_error = Some(error.clone());
        error
    }

    /// Channel count of a live handle.
    pub(crate) fn live_channels(&mut self) -> Result<usize, SrcError> {
        if self.kernel.is_none() {
            return Err(self.fail(SrcError::BadState));
        }
        Ok(self.channels)
    }

    /// Validate `request` and run it through the kernel as if the handle
    /// were in `mode`.
    pub(crate) fn dispatch(
        &mut self,
        mode: Mode,
        request: &mut ConversionRequest<'_>,
    ) -> Result<(), SrcError> {
        let channels = self.live_channels()?;
        if mode != Mode::OneShot {
            return Err(self.fail(SrcError::BadMode));
        }
        if let Err(e) = request.check_bounds(channels) {
            return Err(self.fail(e));
        }
        if !is_valid_ratio(request.src_ratio) {
            return Err(self.fail(SrcError::BadSrcRatio));
        }
        if let Err(e) = request.check_overlap(channels) {
            return Err(self.fail(e));
        }

        request.input_frames_used = 0;
        request.output_frames_gen = 0;

        let src_ratio = request.src_ratio;
        let last_ratio = *self.last_ratio.get_or_insert(src_ratio);
        let constant = same_ratio(last_ratio, src_ratio);
        let (in_frames, out_frames) = (request.input_frames, request.output_frames);
        let end_of_input = request.end_of_input;

        let result = {
            let (input, output) = match request.live_buffers(channels) {
                Ok(buffers) => buffers,
                Err(e) => return Err(self.fail(e)),
            };
            let Some(kernel) = self.kernel.as_mut() else {
                return Err(SrcError::BadState);
            };
            let mut block = Block {
                input,
                output,
                channels,
                end_of_input,
                src_ratio,
                last_ratio,
                input_frames_used: 0,
                output_frames_gen: 0,
            };

            log::trace!(
                "converter: {} path, {in_frames} in / {out_frames} out, ratio {last_ratio} → {src_ratio}",
                if constant { "constant" } else { "variable" },
            );
            let outcome = if constant {
                kernel.process_constant(&mut block)
            } else {
                kernel.process_variable(&mut block)
            };
            outcome.map(|()| (block.input_frames_used, block.output_frames_gen, block.last_ratio))
        };

        match result {
            Ok((used, generated, _)) if used > in_frames || generated > out_frames => {
                Err(self.fail(SrcError::BadInternalState))
            }
            Ok((used, generated, reached)) => {
                request.input_frames_used = used;
                request.output_frames_gen = generated;
                self.last_ratio = Some(reached);
                Ok(())
            }
            Err(e) => Err(self.fail(e)),
        }
    }
}

// ---------------------------------------------------------------------------
// Converter
// ---------------------------------------------------------------------------

/// A sample-rate conversion handle.
///
/// Created in one-shot mode by [`Converter::new`]; switched to streaming
/// mode by [`Converter::callback`] or
/// [`attach_producer`](Converter::attach_producer).  Kernel state is
/// released by [`close`](Converter::close) or on drop.
///
/// ```
/// use srconv::{ConversionRequest, Converter, ConverterId};
///
/// let mut converter = Converter::new(ConverterId::ZERO_ORDER_HOLD, 1).unwrap();
/// let input = [1.0_f32, 2.0, 3.0];
/// let mut output = [0.0_f32; 6];
/// let mut request = ConversionRequest::new(&input, &mut output, 1, 2.0);
/// converter.process(&mut request).unwrap();
/// assert_eq!(request.output_frames_gen, 6);
/// assert_eq!(output, [1.0, 1.0, 2.0, 2.0, 3.0, 3.0]);
/// ```
pub struct Converter {
    pub(crate) core: Core,
    pub(crate) stream: Stream,
}

impl fmt::Debug for Converter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Converter")
            .field("id", &self.core.id)
            .field("channels", &self.core.channels)
            .field("mode", &self.core.mode)
            .field("last_ratio", &self.core.last_ratio)
            .field("closed", &self.core.kernel.is_none())
            .finish_non_exhaustive()
    }
}

impl Converter {
    /// Create a one-shot converter using the built-in kernels.
    ///
    /// # Errors
    ///
    /// - [`SrcError::BadChannelCount`]: `channels` is zero.
    /// - [`SrcError::BadConverter`]: no built-in kernel handles `id`.
    /// - [`SrcError::OutOfMemory`]: kernel state could not be allocated.
    pub fn new(id: ConverterId, channels: usize) -> Result<Self, SrcError> {
        Self::with_registry(&Registry::builtin(), id, channels)
    }

    /// Create a one-shot converter resolving `id` against `registry`.
    pub fn with_registry(
        registry: &Registry,
        id: ConverterId,
        channels: usize,
    ) -> Result<Self, SrcError> {
        if channels < 1 {
            return Err(SrcError::BadChannelCount);
        }
        let family = registry.resolve(id)?;
        let kernel = (family.bind)(id, channels)?;

        log::debug!(
            "converter: created {id} ({} family) with {channels} channel(s)",
            family.name
        );

        let mut converter = Self {
            core: Core {
                id,
                channels,
                mode: Mode::OneShot,
                last_ratio: None,
                last_error: None,
                kernel: Some(kernel),
            },
            stream: Stream::default(),
        };
        converter.reset()?;
        Ok(converter)
    }

    /// Convert one request.  Only valid in one-shot mode.
    ///
    /// Checks run in this order and the first failure is returned (and
    /// stored as [`last_error`](Self::last_error)):
    ///
    /// 1. closed handle → [`SrcError::BadState`]
    /// 2. streaming mode → [`SrcError::BadMode`]
    /// 3. frame counts not backed by the buffers → [`SrcError::BadDataPtr`]
    /// 4. ratio out of range → [`SrcError::BadSrcRatio`]
    /// 5. input and output share memory → [`SrcError::DataOverlap`]
    ///
    /// Kernel errors are returned unchanged.
    pub fn process(&mut self, request: &mut ConversionRequest<'_>) -> Result<(), SrcError> {
        let mode = self.core.mode;
        self.core.dispatch(mode, request)
    }

    /// Clear interpolation history, the stored ratio, any leftover streaming
    /// input and the last error.  Mode and kernel binding are kept.
    pub fn reset(&mut self) -> Result<(), SrcError> {
        match self.core.kernel.as_mut() {
            Some(kernel) => kernel.reset(),
            None => return Err(self.core.fail(SrcError::BadState)),
        }
        self.core.last_ratio = None;
        self.core.last_error = None;
        self.stream.clear_leftover();
        log::debug!("converter: reset {} ({})", self.core.id, self.core.mode.label());
        Ok(())
    }

    /// Release kernel state and any attached producer.  Calling it again is a
    /// no-op; every other operation then fails with [`SrcError::BadState`].
    pub fn close(&mut self) {
        if self.core.kernel.take().is_some() {
            log::debug!("converter: closed {}", self.core.id);
        }
        self.stream = Stream::default();
    }

    /// `true` once [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.core.kernel.is_none()
    }

    /// Store `ratio` as the ratio in effect, so the next call does not sweep
    /// from the old one.  Kernel state is untouched.
    pub fn set_ratio(&mut self, ratio: f64) -> Result<(), SrcError> {
        self.core.live_channels()?;
        if !is_valid_ratio(ratio) {
            return Err(self.core.fail(SrcError::BadSrcRatio));
        }
        self.core.last_ratio = Some(ratio);
        Ok(())
    }

    /// Channel count fixed at creation.
    pub fn channels(&mut self) -> Result<usize, SrcError> {
        self.core.live_channels()
    }

    /// Ratio in effect after the last call, `None` until one is set or used.
    pub fn last_ratio(&self) -> Option<f64> {
        self.core.last_ratio
    }

    pub fn mode(&self) -> Mode {
        self.core.mode
    }

    /// Most recent error recorded on this handle.
    pub fn last_error(&self) -> Option<&SrcError> {
        self.core.last_error.as_ref()
    }

    pub fn converter_id(&self) -> ConverterId {
        self.core.id
    }

    /// Independent copy of a one-shot handle, including kernel history.
    ///
    /// # Errors
    ///
    /// - [`SrcError::BadState`]: the handle is closed.
    /// - [`SrcError::BadMode`]: streaming handles own a producer that cannot
    ///   be duplicated.
    pub fn try_clone(&self) -> Result<Self, SrcError> {
        let kernel = self.core.kernel.as_ref().ok_or(SrcError::BadState)?;
        if self.core.mode != Mode::OneShot {
            return Err(SrcError::BadMode);
        }
        Ok(Self {
            core: Core {
                id: self.core.id,
                channels: self.core.channels,
                mode: self.core.mode,
                last_ratio: self.core.last_ratio,
                last_error: self.core.last_error.clone(),
                kernel: Some(kernel.box_clone()),
            },
            stream: Stream::default(),
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::MockKernel;

    fn mock_converter(channels: usize) -> (Converter, MockKernel) {
        let _ = env_logger::builder().is_test(true).try_init();
        let mock = MockKernel::default();
        let converter = Converter::with_registry(&mock.registry(), MockKernel::ID, channels)
            .expect("mock converter");
        (converter, mock)
    }

    fn run(converter: &mut Converter, input: &[f32], ratio: f64) -> Result<Vec<f32>, SrcError> {
        let channels = converter.channels()?;
        let mut output = vec![0.0; input.len() * 4];
        let mut request = ConversionRequest::new(input, &mut output, channels, ratio);
        converter.process(&mut request)?;
        let produced = request.output_frames_gen * channels;
        output.truncate(produced);
        Ok(output)
    }

    // ---- Creation ---------------------------------------------------------

    #[test]
    fn zero_channels_is_rejected() {
        assert_eq!(
            Converter::new(ConverterId::LINEAR, 0).unwrap_err(),
            SrcError::BadChannelCount
        );
    }

    #[test]
    fn unknown_converter_is_rejected() {
        assert_eq!(
            Converter::new(ConverterId(12), 1).unwrap_err(),
            SrcError::BadConverter
        );
    }

    #[test]
    fn kernel_allocation_failure_is_out_of_memory() {
        assert_eq!(
            Converter::new(ConverterId::LINEAR, usize::MAX / 2).unwrap_err(),
            SrcError::OutOfMemory
        );
    }

    #[test]
    fn new_handle_is_one_shot_and_reset() {
        let (converter, mock) = mock_converter(2);
        assert_eq!(converter.mode(), Mode::OneShot);
        assert_eq!(converter.last_ratio(), None);
        assert!(converter.last_error().is_none());
        assert_eq!(mock.reset_count(), 1);
    }

    #[test]
    fn every_builtin_converter_can_be_created() {
        for id in 0..5 {
            let mut c = Converter::new(ConverterId(id), 3).unwrap();
            assert_eq!(c.channels().unwrap(), 3);
            assert_eq!(c.converter_id(), ConverterId(id));
        }
    }

    // ---- Validation -------------------------------------------------------

    #[test]
    fn invalid_ratio_is_rejected_and_recorded() {
        let (mut converter, mock) = mock_converter(1);
        let err = run(&mut converter, &[1.0, 2.0], 1000.0).unwrap_err();
        assert_eq!(err, SrcError::BadSrcRatio);
        assert_eq!(converter.last_error(), Some(&SrcError::BadSrcRatio));
        assert_eq!(mock.constant() + mock.variable(), 0);
    }

    #[test]
    fn overlapping_shared_buffer_is_rejected_without_side_effects() {
        let (mut converter, mock) = mock_converter(1);
        let mut buffer = vec![1.0_f32; 32];

        for (input, output) in [(0..16, 10..20), (10..20, 0..16)] {
            let mut request = ConversionRequest::in_place(&mut buffer, input, output, 1.0);
            request.input_frames_used = 3;
            request.output_frames_gen = 3;
            assert_eq!(converter.process(&mut request), Err(SrcError::DataOverlap));
            // Counters are only reset once validation passes.
            assert_eq!(request.input_frames_used, 3);
            assert_eq!(request.output_frames_gen, 3);
        }
        assert_eq!(converter.last_ratio(), None);
        assert_eq!(mock.constant() + mock.variable(), 0);
    }

    #[test]
    fn overlap_error_leaves_fresh_counters_at_zero() {
        let (mut converter, _) = mock_converter(1);
        let mut buffer = vec![0.0_f32; 16];
        let mut request = ConversionRequest::in_place(&mut buffer, 0..8, 4..12, 1.0);
        assert_eq!(converter.process(&mut request), Err(SrcError::DataOverlap));
        assert_eq!(request.input_frames_used, 0);
        assert_eq!(request.output_frames_gen, 0);
    }

    #[test]
    fn disjoint_shared_buffer_converts_in_place() {
        let (mut converter, _) = mock_converter(1);
        let mut buffer: Vec<f32> = (0..16).map(|i| i as f32).collect();
        {
            let mut request = ConversionRequest::in_place(&mut buffer, 8..16, 0..8, 1.0);
            converter.process(&mut request).unwrap();
            assert_eq!(request.output_frames_gen, 8);
        }
        assert_eq!(&buffer[..8], &buffer[8..]);
    }

    #[test]
    fn unbacked_frame_count_is_bad_data_ptr() {
        let (mut converter, _) = mock_converter(2);
        let input = [0.0_f32; 4];
        let mut output = [0.0_f32; 4];
        let mut request = ConversionRequest::new(&input, &mut output, 2, 1.0);
        request.output_frames = 3;
        assert_eq!(converter.process(&mut request), Err(SrcError::BadDataPtr));
    }

    #[test]
    fn streaming_handle_rejects_process() {
        let (mut converter, _) = mock_converter(1);
        converter.attach_producer(|_: &mut Vec<f32>| 0_usize).unwrap();
        assert_eq!(run(&mut converter, &[1.0], 1.0), Err(SrcError::BadMode));
    }

    // ---- Path selection ---------------------------------------------------

    #[test]
    fn same_ratio_uses_constant_path() {
        let (mut converter, mock) = mock_converter(1);
        run(&mut converter, &[1.0, 2.0], 1.5).unwrap();
        run(&mut converter, &[3.0, 4.0], 1.5).unwrap();
        assert_eq!(mock.constant(), 2);
        assert_eq!(mock.variable(), 0);
    }

    #[test]
    fn ratio_change_uses_variable_path() {
        let (mut converter, mock) = mock_converter(1);
        run(&mut converter, &[1.0, 2.0], 1.0).unwrap();
        run(&mut converter, &[3.0, 4.0], 1.0 + 1e-12).unwrap();
        assert_eq!(mock.constant(), 1);
        assert_eq!(mock.variable(), 1);
    }

    #[test]
    fn ratio_within_tolerance_stays_constant() {
        let (mut converter, mock) = mock_converter(1);
        run(&mut converter, &[1.0], 0.5).unwrap();
        run(&mut converter, &[1.0], 0.5 + 1e-17).unwrap();
        assert_eq!(mock.variable(), 0);
    }

    #[test]
    fn set_ratio_steers_the_next_path() {
        let (mut converter, mock) = mock_converter(1);
        converter.set_ratio(2.0).unwrap();
        run(&mut converter, &[1.0], 1.0).unwrap();
        assert_eq!(mock.variable(), 1);

        converter.set_ratio(3.0).unwrap();
        run(&mut converter, &[1.0], 3.0).unwrap();
        assert_eq!(mock.constant(), 1);
    }

    #[test]
    fn sinc_level_holds_after_set_ratio_drop() {
        let mut converter = Converter::new(ConverterId::SINC_FASTEST, 1).unwrap();
        let input = vec![0.5_f32; 1000];
        run(&mut converter, &input, 1.0).unwrap();

        converter.set_ratio(0.1).unwrap();
        let out = run(&mut converter, &input, 0.1).unwrap();
        assert!(!out.is_empty());
        for s in out {
            assert!((s - 0.5).abs() < 1e-4, "{s}");
        }
    }

    #[test]
    fn set_ratio_rejects_out_of_range() {
        let (mut converter, _) = mock_converter(1);
        assert_eq!(converter.set_ratio(f64::NAN), Err(SrcError::BadSrcRatio));
        assert_eq!(converter.set_ratio(0.0), Err(SrcError::BadSrcRatio));
        assert_eq!(converter.last_ratio(), None);
    }

    #[test]
    fn kernel_error_is_passed_through() {
        let mock = MockKernel {
            fail_with: Some(SrcError::Kernel(404)),
            ..MockKernel::default()
        };
        let mut converter =
            Converter::with_registry(&mock.registry(), MockKernel::ID, 1).unwrap();
        assert_eq!(run(&mut converter, &[1.0], 1.0), Err(SrcError::Kernel(404)));
        assert_eq!(converter.last_error(), Some(&SrcError::Kernel(404)));
    }

    // ---- Reset / close / clone --------------------------------------------

    #[test]
    fn reset_clears_ratio_and_error() {
        let (mut converter, _) = mock_converter(1);
        run(&mut converter, &[1.0], 2.0).unwrap();
        let _ = converter.set_ratio(-1.0);
        assert!(converter.last_error().is_some());

        converter.reset().unwrap();
        assert_eq!(converter.last_ratio(), None);
        assert!(converter.last_error().is_none());
        assert_eq!(converter.mode(), Mode::OneShot);
    }

    #[test]
    fn double_reset_matches_single_reset() {
        let input: Vec<f32> = (0..64).map(|i| (i as f32 * 0.3).sin()).collect();

        let mut once = Converter::new(ConverterId::SINC_FASTEST, 1).unwrap();
        let mut twice = Converter::new(ConverterId::SINC_FASTEST, 1).unwrap();
        run(&mut once, &input, 0.7).unwrap();
        run(&mut twice, &input, 0.7).unwrap();

        once.reset().unwrap();
        twice.reset().unwrap();
        twice.reset().unwrap();

        assert_eq!(run(&mut once, &input, 1.3).unwrap(), run(&mut twice, &input, 1.3).unwrap());
    }

    #[test]
    fn closed_handle_reports_bad_state() {
        let (mut converter, _) = mock_converter(1);
        converter.close();
        converter.close();
        assert!(converter.is_closed());
        assert_eq!(converter.reset(), Err(SrcError::BadState));
        assert_eq!(converter.set_ratio(1.0), Err(SrcError::BadState));
        assert_eq!(converter.channels(), Err(SrcError::BadState));
        assert_eq!(run(&mut converter, &[1.0], 1.0), Err(SrcError::BadState));
        assert_eq!(converter.try_clone().unwrap_err(), SrcError::BadState);
    }

    #[test]
    fn clone_continues_from_the_same_history() {
        let input: Vec<f32> = (0..40).map(|i| i as f32).collect();
        let mut original = Converter::new(ConverterId::LINEAR, 1).unwrap();
        run(&mut original, &input[..20], 1.5).unwrap();

        let mut copy = original.try_clone().unwrap();
        assert_eq!(copy.last_ratio(), original.last_ratio());
        assert_eq!(
            run(&mut original, &input[20..], 1.5).unwrap(),
            run(&mut copy, &input[20..], 1.5).unwrap()
        );
    }

    #[test]
    fn streaming_handle_cannot_be_cloned() {
        let converter =
            Converter::callback(ConverterId::LINEAR, 1, |_: &mut Vec<f32>| 0_usize).unwrap();
        assert_eq!(converter.try_clone().unwrap_err(), SrcError::BadMode);
    }

    #[test]
    fn converter_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<Converter>();
    }
}
