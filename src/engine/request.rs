//! Per-call conversion request and its buffer-safety checks.
//!
//! A request borrows its buffers for one call.  Two layouts are supported:
//!
//! * **split**: separate input and output slices ([`ConversionRequest::new`]);
//! * **shared**: one buffer holding both an input and an output frame range
//!   ([`ConversionRequest::in_place`]), for callers converting inside a
//!   single allocation.
//!
//! In both layouts the engine checks that the declared frame counts are
//! backed by the buffers and that the live input and output ranges do not
//! share memory before any kernel sees them.

use std::mem::size_of;
use std::ops::Range;

use crate::error::SrcError;

// ---------------------------------------------------------------------------
// Buffers
// ---------------------------------------------------------------------------

enum Buffers<'a> {
    Split {
        input: &'a [f32],
        output: &'a mut [f32],
    },
    Shared {
        buffer: &'a mut [f32],
        /// Frame offsets of the two ranges inside `buffer`.
        input_start: usize,
        output_start: usize,
    },
}

// ---------------------------------------------------------------------------
// ConversionRequest
// ---------------------------------------------------------------------------

/// Input, output and ratio for one call to
/// [`Converter::process`](crate::Converter::process).
///
/// After the call `input_frames_used` and `output_frames_gen` hold how many
/// frames the kernel consumed and produced.
///
/// ```
/// use srconv::{ConversionRequest, Converter, ConverterId};
///
/// let input = vec![0.0_f32; 2 * 480];       // 480 stereo frames
/// let mut output = vec![0.0_f32; 2 * 1024];
/// let mut request = ConversionRequest::new(&input, &mut output, 2, 44_100.0 / 48_000.0);
/// request.end_of_input = true;
///
/// let mut converter = Converter::new(ConverterId::LINEAR, 2).unwrap();
/// converter.process(&mut request).unwrap();
/// assert_eq!(request.input_frames_used, 480);
/// assert!(request.output_frames_gen > 0);
/// ```
pub struct ConversionRequest<'a> {
    buffers: Buffers<'a>,
    /// Frames of input offered to the converter.
    pub input_frames: usize,
    /// Output capacity in frames.
    pub output_frames: usize,
    /// Frames consumed by the last call.
    pub input_frames_used: usize,
    /// Frames produced by the last call.
    pub output_frames_gen: usize,
    /// No further input follows; the kernel must flush delayed output.
    pub end_of_input: bool,
    /// Output rate divided by input rate.
    pub src_ratio: f64,
}

impl<'a> ConversionRequest<'a> {
    /// Request over two separate buffers.  Frame counts are derived from the
    /// slice lengths and `channels`.
    pub fn new(input: &'a [f32], output: &'a mut [f32], channels: usize, src_ratio: f64) -> Self {
        let channels = channels.max(1);
        Self {
            input_frames: input.len() / channels,
            output_frames: output.len() / channels,
            buffers: Buffers::Split { input, output },
            input_frames_used: 0,
            output_frames_gen: 0,
            end_of_input: false,
            src_ratio,
        }
    }

    /// Request over a single buffer.  `input` and `output` are frame ranges
    /// inside `buffer`; the converter's channel count turns them into sample
    /// offsets.
    ///
    /// Overlapping ranges are rejected by the converter with
    /// [`SrcError::DataOverlap`]:
    ///
    /// ```
    /// use srconv::{ConversionRequest, Converter, ConverterId, SrcError};
    ///
    /// let mut buffer = vec![0.0_f32; 64];
    /// let mut request = ConversionRequest::in_place(&mut buffer, 0..32, 16..48, 1.0);
    ///
    /// let mut converter = Converter::new(ConverterId::LINEAR, 1).unwrap();
    /// assert_eq!(converter.process(&mut request), Err(SrcError::DataOverlap));
    /// ```
    pub fn in_place(
        buffer: &'a mut [f32],
        input: Range<usize>,
        output: Range<usize>,
        src_ratio: f64,
    ) -> Self {
        Self {
            input_frames: input.len(),
            output_frames: output.len(),
            buffers: Buffers::Shared {
                buffer,
                input_start: input.start,
                output_start: output.start,
            },
            input_frames_used: 0,
            output_frames_gen: 0,
            end_of_input: false,
            src_ratio,
        }
    }

    /// Checks that the declared frame counts fit inside the buffers.
    pub(crate) fn check_bounds(&self, channels: usize) -> Result<(), SrcError> {
        let input = self.input_samples(channels)?;
        let output = self.output_samples(channels)?;
        let fits = match &self.buffers {
            Buffers::Split {
                input: in_buf,
                output: out_buf,
            } => input.end <= in_buf.len() && output.end <= out_buf.len(),
            Buffers::Shared { buffer, .. } => {
                input.end <= buffer.len() && output.end <= buffer.len()
            }
        };
        if fits {
            Ok(())
        } else {
            Err(SrcError::BadDataPtr)
        }
    }

    /// Checks that the live input and output ranges do not share memory.
    ///
    /// Must run after [`check_bounds`](Self::check_bounds).
    pub(crate) fn check_overlap(&self, channels: usize) -> Result<(), SrcError> {
        let (input, output) = self.live_addresses(channels)?;
        if ranges_overlap(&input, &output) {
            Err(SrcError::DataOverlap)
        } else {
            Ok(())
        }
    }

    /// Disjoint live input and output slices.
    ///
    /// Must run after both checks have passed.
    pub(crate) fn live_buffers(&mut self, channels: usize) -> Result<(&[f32], &mut [f32]), SrcError> {
        let input = self.input_samples(channels)?;
        let output = self.output_samples(channels)?;
        match &mut self.buffers {
            Buffers::Split {
                input: in_buf,
                output: out_buf,
            } => Ok((&in_buf[input], &mut out_buf[output])),
            Buffers::Shared { buffer, .. } => {
                if input.end <= output.start {
                    let (head, tail) = buffer.split_at_mut(output.start);
                    Ok((&head[input], &mut tail[..output.len()]))
                } else if output.end <= input.start {
                    let (head, tail) = buffer.split_at_mut(input.start);
                    Ok((&tail[..input.len()], &mut head[output]))
                } else {
                    Err(SrcError::DataOverlap)
                }
            }
        }
    }

    /// Sample range of the live input, relative to its buffer.
    fn input_samples(&self, channels: usize) -> Result<Range<usize>, SrcError> {
        let start = match &self.buffers {
            Buffers::Split { .. } => 0,
            Buffers::Shared { input_start, .. } => *input_start,
        };
        sample_range(start, self.input_frames, channels)
    }

    /// Sample range of the live output, relative to its buffer.
    fn output_samples(&self, channels: usize) -> Result<Range<usize>, SrcError> {
        let start = match &self.buffers {
            Buffers::Split { .. } => 0,
            Buffers::Shared { output_start, .. } => *output_start,
        };
        sample_range(start, self.output_frames, channels)
    }

    /// Byte address ranges of the live input and output.
    fn live_addresses(&self, channels: usize) -> Result<(Range<usize>, Range<usize>), SrcError> {
        let input = self.input_samples(channels)?;
        let output = self.output_samples(channels)?;
        let (in_base, out_base) = match &self.buffers {
            Buffers::Split {
                input: in_buf,
                output: out_buf,
            } => (in_buf.as_ptr() as usize, out_buf.as_ptr() as usize),
            Buffers::Shared { buffer, .. } => {
                let base = buffer.as_ptr() as usize;
                (base, base)
            }
        };
        let to_bytes = |base: usize, r: Range<usize>| {
            base + r.start * size_of::<f32>()..base + r.end * size_of::<f32>()
        };
        Ok((to_bytes(in_base, input), to_bytes(out_base, output)))
    }
}

/// Frame range `[start, start + frames)` expressed in samples.
fn sample_range(start: usize, frames: usize, channels: usize) -> Result<Range<usize>, SrcError> {
    let begin = start.checked_mul(channels).ok_or(SrcError::BadDataPtr)?;
    let len = frames.checked_mul(channels).ok_or(SrcError::BadDataPtr)?;
    let end = begin.checked_add(len).ok_or(SrcError::BadDataPtr)?;
    Ok(begin..end)
}

/// Whichever range starts first must end at or before the other starts.
fn ranges_overlap(input: &Range<usize>, output: &Range<usize>) -> bool {
    if input.start < output.start {
        input.end > output.start
    } else {
        output.end > input.start
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
