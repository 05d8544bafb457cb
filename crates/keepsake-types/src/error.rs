use thiserror::Error;

/// Errors produced while converting or encoding graph values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TypeError {
    /// A value did not have the shape a reconstruction routine requires.
    #[error("expected {expected}, found {found}")]
    Assertion { expected: String, found: String },

    /// A live instance was present but of a different concrete type.
    #[error("expected instance of {expected}, found instance of {found}")]
    InstanceMismatch { expected: String, found: String },

    /// An envelope-tagged value carried an unusable payload.
    #[error("malformed envelope {tag}: {reason}")]
    MalformedEnvelope { tag: String, reason: String },

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl TypeError {
    /// Shorthand for [`TypeError::Assertion`].
    pub fn assertion(expected: impl Into<String>, found: impl Into<String>) -> Self {
        Self::Assertion {
            expected: expected.into(),
            found: found.into(),
        }
    }
}

/// Result alias for type operations.
pub type TypeResult<T> = Result<T, TypeError>;
