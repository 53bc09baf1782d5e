//! Single-call conversion of a complete signal.

use crate::error::SrcError;
use crate::kernel::{ConverterId, Registry};

use super::handle::Converter;
use super::request::ConversionRequest;

/// Convert a whole signal in one call with a throw-away converter.
///
/// The request is always treated as the end of the input, so the kernel
/// flushes everything it has buffered.
///
/// ```
/// use srconv::{simple, ConversionRequest, ConverterId};
///
/// let input: Vec<f32> = (0..100).map(|i| (i as f32 * 0.1).sin()).collect();
/// let mut output = vec![0.0_f32; 300];
/// let mut request = ConversionRequest::new(&input, &mut output, 1, 2.0);
///
/// simple(&mut request, ConverterId::SINC_FASTEST, 1).unwrap();
/// assert_eq!(request.input_frames_used, 100);
/// assert!(request.end_of_input);
/// ```
pub fn simple(
    request: &mut ConversionRequest<'_>,
    id: ConverterId,
    channels: usize,
) -> Result<(), SrcError> {
    simple_with_registry(&Registry::builtin(), request, id, channels)
}

/// [`simple`] resolving `id` against a caller-supplied registry.
pub fn simple_with_registry(
    registry: &Registry,
    request: &mut ConversionRequest<'_>,
    id: ConverterId,
    channels: usize,
) -> Result<(), SrcError> {
    let mut converter = Converter::with_registry(registry, id, channels)?;
    request.end_of_input = true;
    converter.process(request)
}
