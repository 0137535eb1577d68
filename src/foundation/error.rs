/// Convenience result type used across flipframe.
pub type FlipResult<T> = Result<T, FlipError>;

/// Top-level error taxonomy for data-integrity and IO failures.
///
/// Expected, recoverable refusals (empty undo stack, frame limit, editing while playing)
/// are not errors; they are reported as [`Refusal`].
#[derive(thiserror::Error, Debug)]
pub enum FlipError {
    /// Invalid project data, configuration, or dimensions.
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors when serializing or deserializing project files.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Errors while encoding exported images or animations.
    #[error("encode error: {0}")]
    Encode(String),

    /// A long-running operation already holds the shared export scratch.
    #[error("busy: {0}")]
    Busy(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FlipError {
    /// Build a [`FlipError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`FlipError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Build a [`FlipError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`FlipError::Busy`] value.
    pub fn busy(msg: impl Into<String>) -> Self {
        Self::Busy(msg.into())
    }
}

/// A precondition refusal from an editing operation.
///
/// These are frequent and harmless; the `Display` text is suitable as a user-facing notice.
#[derive(thiserror::Error, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Refusal {
    /// Structural edits are rejected while playback is running.
    #[error("stop playback before editing frames")]
    Playing,
    /// Editing is disabled while an export holds the frames.
    #[error("an export is in progress")]
    Exporting,
    /// The store is already at its configured maximum length.
    #[error("max frames reached ({max})")]
    FrameLimit {
        /// Configured maximum frame count.
        max: usize,
    },
    /// The only remaining frame cannot be removed.
    #[error("cannot delete the last remaining frame")]
    LastFrame,
    /// The external confirmation step declined the operation.
    #[error("cancelled")]
    Cancelled,
    /// A frame or chunk index was out of range.
    #[error("index {index} out of range (len {len})")]
    OutOfRange {
        /// Requested index.
        index: usize,
        /// Length of the indexed sequence.
        len: usize,
    },
    /// Nothing recorded to undo on the current frame.
    #[error("nothing to undo")]
    NothingToUndo,
    /// Nothing recorded to redo on the current frame.
    #[error("nothing to redo")]
    NothingToRedo,
    /// A source frame does not match the store's dimensions.
    #[error("frame dimensions do not match the canvas")]
    DimensionMismatch,
    /// A montage chunk has no resolvable source project.
    #[error("chunk has no source project")]
    NoSource,
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
