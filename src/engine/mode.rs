//! Handle operating mode.

/// How a [`Converter`](crate::Converter) is driven.
///
/// ```text
/// new() ───────────────▶ OneShot    process() only
///   │
///   └─ attach_producer ─▶ Streaming  read() only
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// The caller supplies input and output buffers on every call.
    OneShot,
    /// Input is pulled from an attached producer.
    Streaming,
}

impl Mode {
    /// Short label for log messages.
    ///
    /// ```
    /// use srconv::Mode;
    ///
    /// assert_eq!(Mode::OneShot.label(), "one-shot");
    /// assert_eq!(Mode::Streaming.label(), "streaming");
    /// ```
    pub fn label(&self) -> &'static str {
        match self {
            Mode::OneShot => "one-shot",
            Mode::Streaming => "streaming",
        }
    }
}

impl Default for Mode {
    fn default() -> Self {
        Mode::OneShot
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_mode_is_one_shot() {
        assert_eq!(Mode::default(), Mode::OneShot);
    }

    #[test]
    fn labels_differ() {
        assert_ne!(Mode::OneShot.label(), Mode::Streaming.label());
    }
}
