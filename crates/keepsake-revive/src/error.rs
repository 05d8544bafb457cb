use keepsake_schema::ValidationReport;
use keepsake_types::TypeError;

/// Fatal errors of a load. Any of these aborts the whole revival.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ReviveError {
    /// The tag is neither registered nor in the legacy table.
    #[error("unknown constructor {tag}: save is corrupt or a type is not registered")]
    UnknownConstructor { tag: String },

    /// A reconstructed instance failed its declared schema.
    #[error("validation failed for {}: {}", .0.tag, .0.summary())]
    Validation(ValidationReport),

    /// Data handed to a reconstruction routine was not the expected shape.
    #[error("type assertion failed: {0}")]
    TypeAssertion(#[from] TypeError),

    /// A saved field could not be assigned during default reconstruction.
    #[error("cannot assign {tag}.{field}: {source}")]
    Field {
        tag: String,
        field: String,
        source: TypeError,
    },

    /// A hand-written reconstruction routine refused its payload.
    #[error("cannot reconstruct {tag}: {reason}")]
    Reconstruct { tag: String, reason: String },

    #[error("parse error: {0}")]
    Parse(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl ReviveError {
    /// Shorthand for [`ReviveError::Reconstruct`].
    pub fn reconstruct(tag: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Reconstruct {
            tag: tag.into(),
            reason: reason.into(),
        }
    }
}

/// Result alias for revival operations.
pub type ReviveResult<T> = Result<T, ReviveError>;

/// Errors raised while building or installing a registry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("type {type_name} declares an empty tag")]
    EmptyTag { type_name: &'static str },

    #[error("tag {tag} is registered more than once")]
    DuplicateTag { tag: String },

    #[error("tag {tag} is reserved for a built-in container")]
    ReservedTag { tag: String },

    #[error("tag {tag} is both registered and listed in the legacy table")]
    LegacyConflict { tag: String },

    #[error("legacy table lists tag {tag} more than once")]
    DuplicateLegacyTag { tag: String },

    #[error("schema of {tag} checks field {field}, which its allow-list excludes")]
    SchemaFieldExcluded { tag: String, field: String },

    #[error("a registry is already installed for this process")]
    AlreadyInstalled,

    #[error("no registry installed; call Registry::install before loading")]
    NotInstalled,
}
