//! Zero-order-hold kernel.
//!
//! Every output frame repeats the most recent input frame at or before the
//! read head.  Uses the same block coordinates as the linear kernel but
//! needs no look-ahead, so it never delays output.

use crate::error::SrcError;
use crate::ratio::is_valid_ratio;

use super::{zeroed, Block, ConverterId, ConverterInfo, Kernel, KernelFamily};

pub(crate) const FAMILY: KernelFamily = KernelFamily {
    name: "zoh",
    recognizes,
    describe,
    bind,
};

fn recognizes(id: ConverterId) -> bool {
    id == ConverterId::ZERO_ORDER_HOLD
}

fn describe(id: ConverterId) -> Option<ConverterInfo> {
    recognizes(id).then_some(ConverterInfo {
        name: "ZOH Interpolator",
        description: "Zero order hold interpolator, very fast, poor quality.",
    })
}

fn bind(_: ConverterId, channels: usize) -> Result<Box<dyn Kernel>, SrcError> {
    Ok(Box::new(ZohKernel::new(channels)?))
}

// ---------------------------------------------------------------------------
// ZohKernel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct ZohKernel {
    channels: usize,
    last: Vec<f32>,
    position: f64,
}

impl ZohKernel {
    pub fn new(channels: usize) -> Result<Self, SrcError> {
        Ok(Self {
            channels,
            last: zeroed(channels)?,
            position: 1.0,
        })
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
        let limit = (in_frames + 1) as f64;

        let mut pos = self.position;
        let mut out_gen = 0;

        while out_gen < out_frames && pos < limit {
            if sweep {
                ratio = block.swept_ratio(out_gen + 1, out_frames);
            }

            let index = pos as usize;
            let dst = &mut block.output[out_gen * ch..(out_gen + 1) * ch];
            if index == 0 {
                dst.copy_from_slice(&self.last);
            } else {
                dst.copy_from_slice(&block.input[(index - 1) * ch..index * ch]);
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

impl Kernel for ZohKernel {
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
