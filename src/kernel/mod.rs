//! Interpolation kernels and the capability contract the engine drives.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                       Registry                           │
//! │  [ sinc family ] → [ zoh family ] → [ linear family ]    │
//! │        │ recognizes(id)?  first match wins               │
//! │        ▼                                                 │
//! │   bind(id, channels) ──▶ Box<dyn Kernel>                 │
//! │                              │                           │
//! │            ┌─────────────────┴──────────────┐            │
//! │            ▼                                ▼            │
//! │   process_constant(Block)        process_variable(Block) │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! A [`Kernel`] owns all of its private interpolation state.  The engine
//! never looks inside it; it only hands over a [`Block`] describing the live
//! input and output slices of one call.
//!
//! # Quick start
//!
//! ```rust
//! use srconv::kernel::{ConverterId, Registry};
//!
//! let registry = Registry::builtin();
//! let family = registry.resolve(ConverterId::LINEAR).unwrap();
//! assert_eq!(family.name, "linear");
//!
//! let mut kernel = (family.bind)(ConverterId::LINEAR, 2).unwrap();
//! kernel.reset();
//! ```

pub mod linear;
pub mod registry;
pub mod sinc;
pub mod zoh;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SrcError;

// ── Public re-exports ──────────────────────────────────────────────────────

pub use linear::LinearKernel;
pub use registry::{KernelFamily, Registry};
pub use sinc::{SincKernel, SincQuality};
pub use zoh::ZohKernel;

// ---------------------------------------------------------------------------
// ConverterId
// ---------------------------------------------------------------------------

/// Identifies a converter.  Each kernel family owns a disjoint set of ids.
///
/// Ids parse from their snake-case names or from decimal numbers:
///
/// ```
/// use srconv::kernel::ConverterId;
///
/// assert_eq!("linear".parse::<ConverterId>().unwrap(), ConverterId::LINEAR);
/// assert_eq!("1".parse::<ConverterId>().unwrap(), ConverterId::SINC_MEDIUM_QUALITY);
/// assert!("cubic".parse::<ConverterId>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConverterId(pub u32);

impl ConverterId {
    /// Band-limited sinc, widest filter.
    pub const SINC_BEST_QUALITY: ConverterId = ConverterId(0);
    /// Band-limited sinc, balanced.
    pub const SINC_MEDIUM_QUALITY: ConverterId = ConverterId(1);
    /// Band-limited sinc, shortest filter.
    pub const SINC_FASTEST: ConverterId = ConverterId(2);
    /// Zero-order hold.
    pub const ZERO_ORDER_HOLD: ConverterId = ConverterId(3);
    /// Linear interpolation.
    pub const LINEAR: ConverterId = ConverterId(4);

    const NAMES: [(&'static str, ConverterId); 5] = [
        ("sinc_best_quality", Self::SINC_BEST_QUALITY),
        ("sinc_medium_quality", Self::SINC_MEDIUM_QUALITY),
        ("sinc_fastest", Self::SINC_FASTEST),
        ("zero_order_hold", Self::ZERO_ORDER_HOLD),
        ("linear", Self::LINEAR),
    ];

    /// Snake-case name of a built-in id, `None` for custom ids.
    pub fn key(self) -> Option<&'static str> {
        Self::NAMES
            .iter()
            .find(|(_, id)| *id == self)
            .map(|(name, _)| *name)
    }
}

impl fmt::Display for ConverterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.key() {
            Some(name) => f.write_str(name),
            None => write!(f, "{}", self.0),
        }
    }
}

impl FromStr for ConverterId {
    type Err = SrcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some((_, id)) = Self::NAMES.iter().find(|(name, _)| *name == s) {
            return Ok(*id);
        }
        s.parse::<u32>()
            .map(ConverterId)
            .map_err(|_| SrcError::BadConverter)
    }
}

// ---------------------------------------------------------------------------
// ConverterInfo
// ---------------------------------------------------------------------------

/// Human-readable name and description of a converter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConverterInfo {
    pub name: &'static str,
    pub description: &'static str,
}

// ---------------------------------------------------------------------------
// Block
// ---------------------------------------------------------------------------

/// One call's worth of work handed to a kernel.
///
/// `input` and `output` hold exactly the live frames of the request
/// (`frames * channels` samples each) and never overlap.  The kernel writes
/// `input_frames_used`, `output_frames_gen` and, when it sweeps the ratio,
/// the ratio it actually reached into `last_ratio`.
pub struct Block<'a> {
    pub input: &'a [f32],
    pub output: &'a mut [f32],
    pub channels: usize,
    pub end_of_input: bool,
    /// Target ratio of this call.
    pub src_ratio: f64,
    /// Ratio in effect at the end of the previous call.
    pub last_ratio: f64,
    pub input_frames_used: usize,
    pub output_frames_gen: usize,
}

impl Block<'_> {
    /// Number of input frames offered.
    pub fn input_frames(&self) -> usize {
        self.input.len() / self.channels
    }

    /// Output capacity in frames.
    pub fn output_frames(&self) -> usize {
        self.output.len() / self.channels
    }

    /// Ratio to use for output frame `out_gen` of `out_frames` when sweeping
    /// linearly from `last_ratio` to `src_ratio`.
    pub fn swept_ratio(&self, out_gen: usize, out_frames: usize) -> f64 {
        if out_frames == 0 {
            return self.last_ratio;
        }
        self.last_ratio
            + out_gen as f64 * (self.src_ratio - self.last_ratio) / out_frames as f64
    }
}

// ---------------------------------------------------------------------------
// Kernel trait
// ---------------------------------------------------------------------------

/// Capability contract implemented by every converter family.
///
/// # Contract
///
/// - When output capacity remains, a call must consume all input it is
///   offered before returning; otherwise a streaming read could stall.
/// - `process_constant` may assume `last_ratio == src_ratio`.
/// - `process_variable` must move smoothly from `last_ratio` towards
///   `src_ratio` across the block and store the ratio it ended on.
pub trait Kernel: Send {
    /// Clear interpolation history.  The default does nothing.
    fn reset(&mut self) {}

    /// Convert at a fixed ratio.
    fn process_constant(&mut self, block: &mut Block<'_>) -> Result<(), SrcError>;

    /// Convert while moving from the previous ratio to the new one.
    fn process_variable(&mut self, block: &mut Block<'_>) -> Result<(), SrcError>;

    /// Deep copy of the kernel including its private state.
    fn box_clone(&self) -> Box<dyn Kernel>;
}

// Compile-time assertion: Box<dyn Kernel> must be constructible.
const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn Kernel>) {}
};

/// Allocate a zeroed sample vector, reporting allocation failure instead of
/// aborting.
pub(crate) fn zeroed(len: usize) -> Result<Vec<f32>, SrcError> {
    let mut v = Vec::new();
    v.try_reserve_exact(len)?;
    v.resize(len, 0.0);
    Ok(v)
}

// ---------------------------------------------------------------------------
// MockKernel  (test-only)
// ---------------------------------------------------------------------------

#[cfg(test)]
pub use mock::MockKernel;

#[cfg(test)]
mod mock {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;

    /// Pass-through kernel that copies `min(input, output)` frames and counts
    /// which path the engine chose.
    #[derive(Clone, Default)]
    pub struct MockKernel {
        pub constant_calls: Arc<AtomicUsize>,
        pub variable_calls: Arc<AtomicUsize>,
        pub resets: Arc<AtomicUsize>,
        /// When set, process calls fail with this error.
        pub fail_with: Option<SrcError>,
        /// Restrict `fail_with` to this 1-based process call.
        pub fail_on_call: Option<usize>,
    }

    impl MockKernel {
        pub const ID: ConverterId = ConverterId(1000);

        pub fn constant(&self) -> usize {
            self.constant_calls.load(Ordering::SeqCst)
        }

        pub fn variable(&self) -> usize {
            self.variable_calls.load(Ordering::SeqCst)
        }

        pub fn reset_count(&self) -> usize {
            self.resets.load(Ordering::SeqCst)
        }

        /// A registry holding only this mock under [`MockKernel::ID`].
        ///
        /// `bind` is a plain `fn`, so it cannot capture `self`; the mock is
        /// handed over through a thread-local slot instead.
        pub fn registry(&self) -> Registry {
            SLOT.with(|slot| *slot.borrow_mut() = Some(self.clone()));
            Registry::empty().with_family(KernelFamily {
                name: "mock",
                recognizes: |id| id == MockKernel::ID,
                describe: |_| None,
                bind: |_, _| {
                    let kernel = SLOT
                        .with(|slot| slot.borrow().clone())
                        .unwrap_or_default();
                    Ok(Box::new(kernel))
                },
            })
        }

        fn copy(&self, block: &mut Block<'_>) -> Result<(), SrcError> {
            if let Some(err) = &self.fail_with {
                let call = self.constant() + self.variable();
                if self.fail_on_call.map_or(true, |n| n == call) {
                    return Err(err.clone());
                }
            }
            let frames = block.input_frames().min(block.output_frames());
            let samples = frames * block.channels;
            block.output[..samples].copy_from_slice(&block.input[..samples]);
            block.input_frames_used = frames;
            block.output_frames_gen = frames;
            block.last_ratio = block.src_ratio;
            Ok(())
        }
    }

    thread_local! {
        static SLOT: std::cell::RefCell<Option<MockKernel>> = const { std::cell::RefCell::new(None) };
    }

    impl Kernel for MockKernel {
        fn reset(&mut self) {
            self.resets.fetch_add(1, Ordering::SeqCst);
        }

        fn process_constant(&mut self, block: &mut Block<'_>) -> Result<(), SrcError> {
            self.constant_calls.fetch_add(1, Ordering::SeqCst);
            self.copy(block)
        }

        fn process_variable(&mut self, block: &mut Block<'_>) -> Result<(), SrcError> {
            self.variable_calls.fetch_add(1, Ordering::SeqCst);
            self.copy(block)
        }

        fn box_clone(&self) -> Box<dyn Kernel> {
            Box::new(self.clone())
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
