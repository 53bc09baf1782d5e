//! Streaming sample-rate conversion for interleaved `f32` audio.
//!
//! # Architecture
//!
//! ```text
//!             ┌──────────────┐     ┌────────────────────────────┐
//! caller ───▶ │  Converter   │ ──▶ │ Box<dyn Kernel>            │
//!  process()  │  mode, ratio │     │ sinc / zoh / linear / ...  │
//!  read()     │  last error  │     └────────────────────────────┘
//!             └──────┬───────┘
//!                    │ streaming mode only
//!                    ▼
//!             FrameProducer (pulls input on demand)
//! ```
//!
//! * [`Converter::process`]: caller-supplied buffers, one call at a time.
//! * [`Converter::read`]: output-driven; input is pulled from a
//!   [`FrameProducer`].
//! * [`simple`]: convert a whole signal in one call.
//!
//! # Quick start
//!
//! ```rust
//! use srconv::{ConversionRequest, Converter, ConverterId};
//!
//! // 48 kHz → 44.1 kHz, stereo.
//! let ratio = 44_100.0 / 48_000.0;
//! let mut converter = Converter::new(ConverterId::SINC_FASTEST, 2).unwrap();
//!
//! let input = vec![0.0_f32; 2 * 4_800];
//! let mut output = vec![0.0_f32; 2 * 4_800];
//! let mut request = ConversionRequest::new(&input, &mut output, 2, ratio);
//! request.end_of_input = true;
//! converter.process(&mut request).unwrap();
//!
//! assert_eq!(request.input_frames_used, 4_800);
//! // 4800 × 0.91875 = 4410, give or take rounding of the read position.
//! assert!(request.output_frames_gen.abs_diff(4_410) <= 1);
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod info;
pub mod kernel;
pub mod ratio;
pub mod sample;

// ── Public re-exports ──────────────────────────────────────────────────────

pub use engine::{simple, simple_with_registry, ConversionRequest, Converter, FrameProducer, Mode};
pub use error::SrcError;
pub use info::{converter_description, converter_name, version};
pub use kernel::{ConverterId, Kernel, Registry};
pub use ratio::{is_valid_ratio, MAX_RATIO};
