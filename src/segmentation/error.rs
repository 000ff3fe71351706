use thiserror::Error;

/// Failures reported by the sample-consensus model.
///
/// None of these are transient: they come from malformed input or misuse and
/// are returned to the caller of the failing operation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ViBeError {
    /// Frame is not the (height, width) the model was built for
    #[error("frame shape mismatch: expected {expected:?} (height, width), got {actual:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },

    /// `classify_and_update` was called before `initialize`
    #[error("model has not been initialized with a first frame")]
    NotInitialized,

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}
