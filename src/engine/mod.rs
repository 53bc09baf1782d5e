//! Conversion engine: the handle, its request type and the streaming and
//! single-call front ends.
//!
//! # Quick start
//!
//! ```rust
//! use srconv::{ConversionRequest, Converter, ConverterId};
//!
//! let mut converter = Converter::new(ConverterId::SINC_MEDIUM_QUALITY, 2).unwrap();
//!
//! let input = vec![0.0_f32; 2 * 256];
//! let mut output = vec![0.0_f32; 2 * 512];
//! let mut request = ConversionRequest::new(&input, &mut output, 2, 1.5);
//! converter.process(&mut request).unwrap();
//!
//! // Changing the ratio between calls glides towards the new one.
//! let mut request = ConversionRequest::new(&input, &mut output, 2, 1.25);
//! converter.process(&mut request).unwrap();
//! let reached = converter.last_ratio().unwrap();
//! assert!((1.25..1.5).contains(&reached));
//! ```

pub mod callback;
pub mod handle;
pub mod mode;
pub mod request;
pub mod simple;

// ── Public re-exports ──────────────────────────────────────────────────────

pub use callback::FrameProducer;
pub use handle::Converter;
pub use mode::Mode;
pub use request::ConversionRequest;
pub use simple::{simple, simple_with_registry};
