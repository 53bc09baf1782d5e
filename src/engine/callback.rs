//! Streaming (pull) mode: the converter asks a producer for input as it
//! needs it.
//!
//! ```text
//! read(ratio, output)
//!   │
//!   ├─ leftover empty? ──▶ producer.produce(&mut pending) ── 0 frames ──▶ end of input
//!   │
//!   ├─ convert leftover → output           (one-shot path, same validation)
//!   │
//!   └─ repeat until output is full, or end of input and nothing more came out
//! ```
//!
//! Input the kernel did not consume stays in the handle between reads.

use crate::error::SrcError;
use crate::kernel::ConverterId;
use crate::ratio::is_valid_ratio;

use super::handle::Converter;
use super::mode::Mode;
use super::request::ConversionRequest;

// ---------------------------------------------------------------------------
// FrameProducer
// ---------------------------------------------------------------------------

/// Source of interleaved input frames for a streaming converter.
///
/// `produce` receives an empty buffer, fills it with interleaved samples and
/// returns the number of whole frames written.  Returning `0` signals end of
/// input for the current read.  Closures implement the trait directly:
///
/// ```
/// use srconv::{Converter, ConverterId};
///
/// let mut remaining = 3;
/// let producer = move |buffer: &mut Vec<f32>| {
///     if remaining == 0 {
///         return 0_usize;
///     }
///     remaining -= 1;
///     buffer.extend_from_slice(&[0.25; 64]);
///     64
/// };
///
/// let mut converter = Converter::callback(ConverterId::LINEAR, 1, producer).unwrap();
/// let mut output = vec![0.0_f32; 1024];
/// let frames = converter.read(2.0, &mut output).unwrap();
/// assert!(frames > 0);
/// ```
pub trait FrameProducer: Send {
    fn produce(&mut self, buffer: &mut Vec<f32>) -> usize;
}

impl<F> FrameProducer for F
where
    F: FnMut(&mut Vec<f32>) -> usize + Send,
{
    fn produce(&mut self, buffer: &mut Vec<f32>) -> usize {
        self(buffer)
    }
}

// ---------------------------------------------------------------------------
// Stream
// ---------------------------------------------------------------------------

/// Producer and unconsumed input of a streaming handle.
#[derive(Default)]
pub(crate) struct Stream {
    producer: Option<Box<dyn FrameProducer>>,
    pending: Vec<f32>,
    /// Sample offset of the first unconsumed frame in `pending`.
    offset: usize,
    /// Unconsumed frames left in `pending`.
    frames: usize,
}

impl Stream {
    pub(crate) fn clear_leftover(&mut self) {
        self.pending.clear();
        self.offset = 0;
        self.frames = 0;
    }

    /// Ask the producer for the next chunk.  Returns the frame count, clamped
    /// to what the producer actually wrote.
    fn refill(&mut self, channels: usize) -> usize {
        self.clear_leftover();
        let Some(producer) = self.producer.as_mut() else {
            return 0;
        };
        let reported = producer.produce(&mut self.pending);
        let written = self.pending.len() / channels;
        if reported > written {
            log::warn!(
                "stream: producer reported {reported} frame(s) but wrote {written}; using {written}"
            );
        }
        self.frames = reported.min(written);
        log::trace!("stream: pulled {} frame(s)", self.frames);
        self.frames
    }

    fn leftover(&self, channels: usize) -> &[f32] {
        &self.pending[self.offset..self.offset + self.frames * channels]
    }
}

// ---------------------------------------------------------------------------
// Converter: streaming operations
// ---------------------------------------------------------------------------

impl Converter {
    /// Create a streaming converter pulling input from `producer`.
    ///
    /// # Errors
    ///
    /// Same as [`Converter::new`].
    pub fn callback<P>(id: ConverterId, channels: usize, producer: P) -> Result<Self, SrcError>
    where
        P: FrameProducer + 'static,
    {
        let mut converter = Self::new(id, channels)?;
        converter.attach_producer(producer)?;
        Ok(converter)
    }

    /// Reset the handle and switch it to streaming mode with `producer` as
    /// its input source.
    pub fn attach_producer<P>(&mut self, producer: P) -> Result<(), SrcError>
    where
        P: FrameProducer + 'static,
    {
        self.reset()?;
        self.core.mode = Mode::Streaming;
        self.stream.producer = Some(Box::new(producer));
        log::debug!("stream: producer attached to {}", self.core.id);
        Ok(())
    }

    /// Remove the producer and drop any leftover input.  The handle stays in
    /// streaming mode, so reads fail with [`SrcError::NullCallback`] until a
    /// new producer is attached.
    pub fn detach_producer(&mut self) -> Option<Box<dyn FrameProducer>> {
        self.stream.clear_leftover();
        self.stream.producer.take()
    }

    /// Fill `output` with converted frames, pulling input from the producer
    /// as needed.  Returns the number of frames written.
    ///
    /// Fewer frames than requested means the producer signalled end of input
    /// and the kernel has nothing more to flush.  A later read starts a new
    /// stream segment and asks the producer again.
    ///
    /// # Errors
    ///
    /// - [`SrcError::BadState`]: the handle is closed.
    /// - [`SrcError::BadMode`]: the handle is in one-shot mode.
    /// - [`SrcError::NullCallback`]: no producer is attached.
    /// - [`SrcError::BadSrcRatio`]: `src_ratio` out of range.
    /// - Any error from the underlying conversion.  Frames written before the
    ///   error are discarded from the caller's view; unconsumed input is kept.
    pub fn read(&mut self, src_ratio: f64, output: &mut [f32]) -> Result<usize, SrcError> {
        let channels = self.core.live_channels()?;
        let requested = output.len() / channels;
        if requested == 0 {
            return Ok(0);
        }
        if self.core.mode != Mode::Streaming {
            return Err(self.core.fail(SrcError::BadMode));
        }
        if self.stream.producer.is_none() {
            return Err(self.core.fail(SrcError::NullCallback));
        }
        if !is_valid_ratio(src_ratio) {
            return Err(self.core.fail(SrcError::BadSrcRatio));
        }

        let Converter { core, stream } = self;
        let mut produced = 0;
        let mut end_of_input = false;

        while produced < requested {
            if stream.frames == 0 && !end_of_input && stream.refill(channels) == 0 {
                end_of_input = true;
            }

            let (used, generated) = {
                let target = &mut output[produced * channels..requested * channels];
                let mut request =
                    ConversionRequest::new(stream.leftover(channels), target, channels, src_ratio);
                request.end_of_input = end_of_input;
                core.dispatch(Mode::OneShot, &mut request)?;
                (request.input_frames_used, request.output_frames_gen)
            };

            stream.offset += used * channels;
            stream.frames -= used;
            produced += generated;

            if end_of_input && generated == 0 {
                break;
            }
        }

        log::trace!("stream: read {produced}/{requested} frame(s)");
        Ok(produced)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
