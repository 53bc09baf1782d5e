//! Error taxonomy shared by the engine and the kernels.
//!
//! Every variant carries a stable small integer ([`SrcError::code`]) so the
//! errors can be logged, stored as a handle's last error and compared across
//! calls.  Kernels may report their own failures through
//! [`SrcError::Kernel`]; the engine passes those through unchanged.

use thiserror::Error;

// ---------------------------------------------------------------------------
// SrcError
// ---------------------------------------------------------------------------

/// All errors that can arise while creating or driving a converter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SrcError {
    /// Kernel state could not be allocated.
    #[error("out of memory while allocating converter state")]
    OutOfMemory,

    /// The handle has been closed.
    #[error("converter handle is closed")]
    BadState,

    /// No request was supplied.
    ///
    /// Requests are passed by reference, so this cannot arise through the
    /// Rust API; the variant keeps the code stable for callers that map
    /// codes back to errors.
    #[error("missing conversion request")]
    BadData,

    /// The declared frame counts are not backed by the supplied buffers.
    #[error("declared frame count exceeds the supplied buffer")]
    BadDataPtr,

    /// The conversion ratio lies outside `[1/MAX_RATIO, MAX_RATIO]`.
    #[error("conversion ratio out of range")]
    BadSrcRatio,

    /// The handle has no bound processing functions.
    #[error("converter has no bound processing functions")]
    BadProcPtr,

    /// No kernel family recognises the requested converter id.
    #[error("unknown converter id")]
    BadConverter,

    /// The channel count is less than one.
    #[error("channel count must be at least 1")]
    BadChannelCount,

    /// The live input and output ranges share memory.
    #[error("input and output buffers overlap")]
    DataOverlap,

    /// No producer was supplied where one is required.
    #[error("missing frame producer")]
    BadCallback,

    /// The operation is not valid in the handle's current mode.
    #[error("operation not valid in this converter mode")]
    BadMode,

    /// A streaming read was attempted with no producer attached.
    #[error("streaming read with no producer attached")]
    NullCallback,

    /// A kernel found its own carried state inconsistent.
    #[error("converter kernel internal state is inconsistent")]
    BadInternalState,

    /// Kernel-specific failure, passed through unchanged.
    #[error("converter kernel failed with code {0}")]
    Kernel(i32),
}

impl SrcError {
    /// Stable integer code for this error.
    ///
    /// ```
    /// use srconv::SrcError;
    ///
    /// assert_eq!(SrcError::BadSrcRatio.code(), 6);
    /// assert_eq!(SrcError::DataOverlap.code(), 16);
    /// assert_eq!(SrcError::Kernel(301).code(), 301);
    /// ```
    pub fn code(&self) -> i32 {
        match self {
            SrcError::OutOfMemory => 1,
            SrcError::BadState => 2,
            SrcError::BadData => 3,
            SrcError::BadDataPtr => 4,
            SrcError::BadSrcRatio => 6,
            SrcError::BadProcPtr => 7,
            SrcError::BadConverter => 10,
            SrcError::BadChannelCount => 11,
            SrcError::DataOverlap => 16,
            SrcError::BadCallback => 17,
            SrcError::BadMode => 18,
            SrcError::NullCallback => 19,
            SrcError::BadInternalState => 22,
            SrcError::Kernel(code) => *code,
        }
    }
}

impl From<std::collections::TryReserveError> for SrcError {
    fn from(_: std::collections::TryReserveError) -> Self {
        SrcError::OutOfMemory
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
