//! Ordered list of kernel families.
//!
//! Resolution walks the families in order and returns the first whose
//! `recognizes` predicate accepts the id.  Built-in id ranges are disjoint,
//! so order only decides which family answers for ids a custom family also
//! claims.

use crate::error::SrcError;

use super::{linear, sinc, zoh, ConverterId, ConverterInfo, Kernel};

// ---------------------------------------------------------------------------
// KernelFamily
// ---------------------------------------------------------------------------

/// One converter family: an id predicate plus a constructor.
#[derive(Clone, Copy)]
pub struct KernelFamily {
    /// Short family name used in log messages.
    pub name: &'static str,
    pub recognizes: fn(ConverterId) -> bool,
    pub describe: fn(ConverterId) -> Option<ConverterInfo>,
    /// Build the kernel and its private state for `channels` channels.
    pub bind: fn(ConverterId, usize) -> Result<Box<dyn Kernel>, SrcError>,
}

impl std::fmt::Debug for KernelFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KernelFamily")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Built-in families, highest quality first.
const BUILTIN: [KernelFamily; 3] = [sinc::FAMILY, zoh::FAMILY, linear::FAMILY];

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Resolves converter ids to kernel families.
///
/// ```
/// use srconv::kernel::{ConverterId, Registry};
/// use srconv::SrcError;
///
/// let registry = Registry::builtin();
/// assert_eq!(registry.resolve(ConverterId::SINC_FASTEST).unwrap().name, "sinc");
/// assert_eq!(registry.resolve(ConverterId(99)).unwrap_err(), SrcError::BadConverter);
/// ```
#[derive(Debug, Clone)]
pub struct Registry {
    families: Vec<KernelFamily>,
}

impl Registry {
    /// The sinc, zero-order-hold and linear families, in that order.
    pub fn builtin() -> Self {
        Self {
            families: BUILTIN.to_vec(),
        }
    }

    /// A registry with no families; every resolution fails.
    pub fn empty() -> Self {
        Self {
            families: Vec::new(),
        }
    }

    /// Append `family` after the existing ones.
    pub fn with_family(mut self, family: KernelFamily) -> Self {
        self.families.push(family);
        self
    }

    /// First family that recognises `id`.
    ///
    /// # Errors
    ///
    /// [`SrcError::BadConverter`] when no family does.
    pub fn resolve(&self, id: ConverterId) -> Result<&KernelFamily, SrcError> {
        self.families
            .iter()
            .find(|family| (family.recognizes)(id))
            .ok_or(SrcError::BadConverter)
    }

    /// Name and description of `id`, if some family describes it.
    pub fn info(&self, id: ConverterId) -> Option<ConverterInfo> {
        self.resolve(id).ok().and_then(|family| (family.describe)(id))
    }

    /// Number of registered families.
    pub fn len(&self) -> usize {
        self.families.len()
    }

    pub fn is_empty(&self) -> bool {
        self.families.is_empty()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::builtin()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::MockKernel;

    #[test]
    fn builtin_resolves_every_builtin_id() {
        let registry = Registry::builtin();
        let expect = [
            (ConverterId::SINC_BEST_QUALITY, "sinc"),
            (ConverterId::SINC_MEDIUM_QUALITY, "sinc"),
            (ConverterId::SINC_FASTEST, "sinc"),
            (ConverterId::ZERO_ORDER_HOLD, "zoh"),
            (ConverterId::LINEAR, "linear"),
        ];
        for (id, family) in expect {
            assert_eq!(registry.resolve(id).unwrap().name, family, "{id}");
        }
    }

    #[test]
    fn unknown_id_is_bad_converter() {
        let registry = Registry::builtin();
        assert_eq!(
            registry.resolve(ConverterId(5)).unwrap_err(),
            SrcError::BadConverter
        );
    }

    #[test]
    fn empty_registry_resolves_nothing() {
        let registry = Registry::empty();
        assert!(registry.is_empty());
        assert!(registry.resolve(ConverterId::LINEAR).is_err());
        assert!(registry.info(ConverterId::LINEAR).is_none());
    }

    #[test]
    fn custom_family_is_appended() {
        let registry = Registry::builtin().with_family(KernelFamily {
            name: "custom",
            recognizes: |id| id == ConverterId(500),
            describe: |_| None,
            bind: |_, _| Ok(Box::new(MockKernel::default())),
        });
        assert_eq!(registry.len(), 4);
        assert_eq!(registry.resolve(ConverterId(500)).unwrap().name, "custom");
        assert_eq!(registry.resolve(ConverterId::LINEAR).unwrap().name, "linear");
    }

    #[test]
    fn first_matching_family_wins() {
        let registry = Registry::empty()
            .with_family(KernelFamily {
                name: "first",
                recognizes: |_| true,
                describe: |_| None,
                bind: |_, _| Ok(Box::new(MockKernel::default())),
            })
            .with_family(KernelFamily {
                name: "second",
                recognizes: |_| true,
                describe: |_| None,
                bind: |_, _| Ok(Box::new(MockKernel::default())),
            });
        assert_eq!(registry.resolve(ConverterId(7)).unwrap().name, "first");
    }

    #[test]
    fn info_describes_builtins() {
        let registry = Registry::builtin();
        let info = registry.info(ConverterId::ZERO_ORDER_HOLD).unwrap();
        assert_eq!(info.name, "ZOH Interpolator");
        assert!(registry.info(ConverterId(42)).is_none());
    }
}
