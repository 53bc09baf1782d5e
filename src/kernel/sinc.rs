//! Band-limited windowed-sinc kernel.
//!
//! Each output frame is a Blackman-windowed sinc convolution centred on the
//! fractional read head.  The cutoff follows `min(1, ratio)`, so when
//! down-sampling the filter widens by `1 / ratio` to keep rejecting aliases.
//! Coefficients are normalised to unit DC gain.
//!
//! The kernel buffers input until the look-ahead of the next output frame is
//! available.  On `end_of_input` the missing look-ahead is treated as
//! silence, which flushes the delayed tail.
//!
//! | Tier | Half width (taps per side at ratio ≥ 1) |
//! |------|-----------------------------------------|
//! | Best | 64 |
//! | Medium | 24 |
//! | Fastest | 8 |

use std::f64::consts::PI;

use crate::error::SrcError;
use crate::ratio::{is_valid_ratio, MAX_RATIO};

use super::{Block, ConverterId, ConverterInfo, Kernel, KernelFamily};

pub(crate) const FAMILY: KernelFamily = KernelFamily {
    name: "sinc",
    recognizes,
    describe,
    bind,
};

fn recognizes(id: ConverterId) -> bool {
    SincQuality::from_id(id).is_some()
}

fn describe(id: ConverterId) -> Option<ConverterInfo> {
    let info = match SincQuality::from_id(id)? {
        SincQuality::Best => ConverterInfo {
            name: "Best Sinc Interpolator",
            description: "Band limited sinc interpolation, best quality, 128 tap window.",
        },
        SincQuality::Medium => ConverterInfo {
            name: "Medium Sinc Interpolator",
            description: "Band limited sinc interpolation, medium quality, 48 tap window.",
        },
        SincQuality::Fastest => ConverterInfo {
            name: "Fastest Sinc Interpolator",
            description: "Band limited sinc interpolation, fastest, 16 tap window.",
        },
    };
    Some(info)
}

fn bind(id: ConverterId, channels: usize) -> Result<Box<dyn Kernel>, SrcError> {
    let quality = SincQuality::from_id(id).ok_or(SrcError::BadConverter)?;
    Ok(Box::new(SincKernel::new(quality, channels)?))
}

// ---------------------------------------------------------------------------
// SincQuality
// ---------------------------------------------------------------------------

/// Speed/quality tier of the sinc kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SincQuality {
    Best,
    Medium,
    Fastest,
}

impl SincQuality {
    pub fn from_id(id: ConverterId) -> Option<Self> {
        match id {
            ConverterId::SINC_BEST_QUALITY => Some(Self::Best),
            ConverterId::SINC_MEDIUM_QUALITY => Some(Self::Medium),
            ConverterId::SINC_FASTEST => Some(Self::Fastest),
            _ => None,
        }
    }

    /// Filter half width in input frames at ratio ≥ 1.
    pub fn half_width(self) -> usize {
        match self {
            Self::Best => 64,
            Self::Medium => 24,
            Self::Fastest => 8,
        }
    }
}

// ---------------------------------------------------------------------------
// SincKernel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct SincKernel {
    channels: usize,
    half_width: usize,
    /// Frames kept behind the read head: the reach at the lowest valid
    /// ratio, so a later ratio drop never reads discarded history.
    keep: usize,
    /// Buffered interleaved input.  Frames before index 0 read as silence.
    history: Vec<f32>,
    /// Read head, in frames relative to `history[0]`.
    position: f64,
    /// One past the last real frame, once end of input has been reached.
    end: Option<usize>,
    coeffs: Vec<f64>,
}

impl SincKernel {
    pub fn new(quality: SincQuality, channels: usize) -> Result<Self, SrcError> {
        let half_width = quality.half_width();
        let keep = (half_width as f64 * MAX_RATIO).ceil() as usize;
        let history_len = keep
            .checked_add(2 * half_width)
            .and_then(|frames| frames.checked_mul(channels))
            .ok_or(SrcError::OutOfMemory)?;

        let mut history = Vec::new();
        history.try_reserve_exact(history_len)?;
        let mut coeffs = Vec::new();
        coeffs.try_reserve_exact(2 * half_width)?;

        Ok(Self {
            channels,
            half_width,
            keep,
            history,
            position: 0.0,
            end: None,
            coeffs,
        })
    }

    fn frames(&self) -> usize {
        self.history.len() / self.channels
    }

    /// Half width of the filter at `ratio`, widened when down-sampling.
    fn reach(&self, ratio: f64) -> usize {
        (self.half_width as f64 / ratio.min(1.0)).ceil() as usize
    }

    fn run(&mut self, block: &mut Block<'_>, sweep: bool) -> Result<(), SrcError> {
        let ch = self.channels;
        if block.channels != ch {
            return Err(SrcError::BadInternalState);
        }

        let mut ratio = if sweep { block.last_ratio } else { block.src_ratio };
        if !is_valid_ratio(ratio) {
            return Err(SrcError::BadInternalState);
        }

        let in_frames = block.input_frames();
        let out_frames = block.output_frames();
        let mut used = 0;
        let mut out_gen = 0;

        while out_gen < out_frames {
            let step_ratio = if sweep {
                block.swept_ratio(out_gen + 1, out_frames)
            } else {
                ratio
            };
            let reach = self.reach(step_ratio);
            let needed = self.position.floor() as usize + reach + 1;
            let have = self.frames();

            if needed > have {
                if used < in_frames {
                    let take = (needed - have).min(in_frames - used);
                    self.history.try_reserve(take * ch)?;
                    self.history
                        .extend_from_slice(&block.input[used * ch..(used + take) * ch]);
                    used += take;
                    self.end = None;
                    continue;
                }
                if !block.end_of_input {
                    break;
                }
                let end = *self.end.get_or_insert(have);
                if self.position >= end as f64 {
                    break;
                }
            }

            ratio = step_ratio;
            let frame = &mut block.output[out_gen * ch..(out_gen + 1) * ch];
            self.interpolate(frame, ratio, reach);
            out_gen += 1;
            self.position += 1.0 / ratio;
        }

        self.discard_consumed();

        block.input_frames_used = used;
        block.output_frames_gen = out_gen;
        block.last_ratio = ratio;
        Ok(())
    }

    fn interpolate(&mut self, out: &mut [f32], ratio: f64, reach: usize) {
        let cutoff = ratio.min(1.0);
        let centre = self.position.floor() as i64;
        let first = centre - reach as i64 + 1;
        let width = reach as f64;

        self.coeffs.clear();
        let mut gain = 0.0;
        for k in 0..2 * reach {
            let t = self.position - (first + k as i64) as f64;
            let c = cutoff * sinc(cutoff * t) * blackman(t / width);
            self.coeffs.push(c);
            gain += c;
        }
        if gain.abs() < f64::EPSILON {
            gain = 1.0;
        }

        let frames = self.frames() as i64;
        for (channel, sample) in out.iter_mut().enumerate() {
            let mut acc = 0.0;
            for (k, c) in self.coeffs.iter().enumerate() {
                let j = first + k as i64;
                if (0..frames).contains(&j) {
                    acc += c * self.history[j as usize * self.channels + channel] as f64;
                }
            }
            *sample = (acc / gain) as f32;
        }
    }

    /// Drop history no later output frame can reach, at any ratio.
    ///
    /// Trimming waits until at least `keep` frames can go, so the retained
    /// window is not shifted on every call.
    fn discard_consumed(&mut self) {
        let centre = self.position.floor() as usize;
        let drop = (centre + 1).saturating_sub(self.keep).min(self.frames());
        if drop < self.keep {
            return;
        }
        self.history.drain(..drop * self.channels);
        self.position -= drop as f64;
        if let Some(end) = self.end.as_mut() {
            *end -= drop;
        }
    }
}

fn sinc(x: f64) -> f64 {
    if x.abs() < 1e-9 {
        return 1.0;
    }
    let pi_x = PI * x;
    pi_x.sin() / pi_x
}

/// Blackman window over `u ∈ [-1, 1]`, zero outside.
fn blackman(u: f64) -> f64 {
    if u.abs() >= 1.0 {
        return 0.0;
    }
    0.42 + 0.5 * (PI * u).cos() + 0.08 * (2.0 * PI * u).cos()
}

impl Kernel for SincKernel {
    fn reset(&mut self) {
        self.history.clear();
        self.position = 0.0;
        self.end = None;
    }

    fn process_constant(&mut self, block: &mut Block<'_>) -> Result<(), SrcError> {
        self.run(block, false)
    }

    fn process_variable(&mut self, block: &mut Block<'_>) -> Result<(), SrcError> {
        self.run(block, true)
    }

    fn box_clone(&self) -> Box<dyn Kernel> {
        Box::new(self.clone())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
