//! Linear-interpolation kernel.
//!
//! The read head is kept in *block coordinates*: position `0.0` is the last
//! frame consumed by the previous call, position `k` (k ≥ 1) is input frame
//! `k - 1` of the current call.  Each output frame interpolates between the
//! two frames around the read head, which then advances by `1 / ratio`.
//!
//! At ratio 1 the kernel is an exact pass-through, but it needs one frame of
//! look-ahead, so the final frame of a stream only appears once
//! `end_of_input` is set (the last frame is then held instead of
//! interpolated towards a frame that will never arrive).

use crate::error::SrcError;
use crate::ratio::is_valid_ratio;

use super::{zeroed, Block, ConverterId, ConverterInfo, Kernel, KernelFamily};

pub(crate) const FAMILY: KernelFamily = KernelFamily {
    name: "linear",
    recognizes,
    describe,
    bind,
};

fn recognizes(id: ConverterId) -> bool {
    id == ConverterId::LINEAR
}

fn describe(id: ConverterId) -> Option<ConverterInfo> {
    recognizes(id).then_some(ConverterInfo {
        name: "Linear Interpolator",
        description: "Linear interpolator, very fast, poor quality.",
    })
}

fn bind(_: ConverterId, channels: usize) -> Result<Box<dyn Kernel>, SrcError> {
    Ok(Box::new(LinearKernel::new(channels)?))
}

// ---------------------------------------------------------------------------
// LinearKernel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct LinearKernel {
    channels: usize,
    /// Last consumed frame (block position 0).
    last: Vec<f32>,
    /// Read head in block coordinates.
    position: f64,
}

impl LinearKernel {
    pub fn new(channels: usize) -> Result<Self, SrcError> {
        Ok(Self {
            channels,
            last: zeroed(channels)?,
            position: 1.0,
        })
    }

    fn frame(&self, input: &[f32], index: usize, channel: usize) -> f32 {
        if index == 0 {
            self.last[channel]
        } else {
            input[(index - 1) * self.channels + channel]
        }
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
        let limit = if block.end_of_input {
            in_frames + 1
        } else {
            in_frames
        } as f64;

        let mut pos = self.position;
        let mut out_gen = 0;

        while out_gen < out_frames && pos < limit {
            if sweep {
                ratio = block.swept_ratio(out_gen + 1, out_frames);
            }

            let index = pos as usize;
            let frac = (pos - index as f64) as f32;
            for c in 0..ch {
                let a = self.frame(block.input, index, c);
                // Past the final frame only at end of input: hold it.
                let b = if index < in_frames {
                    self.frame(block.input, index + 1, c)
                } else {
                    a
                };
                block.output[out_gen * ch + c] = a + frac * (b - a);
            }

            out_gen += 1;
            pos += 1.0 / ratio;
        }

        let used = (pos.floor() as usize).min(in_frames);
        if used > 0 {
            self.last
                .copy_from_slice(&block.input[(used - 1) * ch..used * ch]);
        }
        self.position = pos - used as f64;

        block.input_frames_used = used;
        block.output_frames_gen = out_gen;
        block.last_ratio = ratio;
        Ok(())
    }
}

impl Kernel for LinearKernel {
    fn reset(&mut self) {
        self.last.fill(0.0);
        self.position = 1.0;
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
