//! Converter names, descriptions and the library version string.

use crate::kernel::{ConverterId, Registry};

/// Short human-readable name of a built-in converter.
///
/// ```
/// use srconv::{converter_name, ConverterId};
///
/// assert_eq!(converter_name(ConverterId::LINEAR), Some("Linear Interpolator"));
/// assert_eq!(converter_name(ConverterId(40)), None);
/// ```
pub fn converter_name(id: ConverterId) -> Option<&'static str> {
    Registry::builtin().info(id).map(|info| info.name)
}

/// One-line description of a built-in converter.
pub fn converter_description(id: ConverterId) -> Option<&'static str> {
    Registry::builtin().info(id).map(|info| info.description)
}

/// Library name and version, e.g. `"srconv-0.1.0"`.
pub fn version() -> &'static str {
    concat!("srconv-", env!("CARGO_PKG_VERSION"))
}
