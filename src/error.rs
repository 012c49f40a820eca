//! Error types for VLP.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Top-level crate error.
#[derive(Error, Debug)]
pub enum Error {
    /// The schema document could not be located or parsed. Fatal at startup;
    /// nothing in the crate works without a schema.
    #[error("Schema load error: {0}")]
    SchemaLoad(String),

    /// A message failed validation during construction.
    #[error("Message build failed: {0}")]
    Build(#[source] ValidationError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Why a candidate message was rejected.
///
/// Structural failures come from the schema document (missing field, wrong
/// type, bad enum value); semantic failures come from the truth-serum rules.
/// Callers can match on the variant instead of parsing the description.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("schema violation: {0}")]
    Structural(String),

    #[error(transparent)]
    Semantic(#[from] SemanticViolation),
}

/// The truth-serum rules, one variant per rule.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SemanticViolation {
    #[error("type must be lowercase")]
    TypeNotLowercase,

    #[error("confidence is required")]
    MissingConfidence,

    #[error("confidence must be a number")]
    InvalidConfidence,

    #[error("evidence messages must include refers_to")]
    EvidenceMissingReference,

    #[error("evidence messages must include non-empty provenance")]
    EvidenceMissingProvenance,

    #[error("{0} messages must include refers_to")]
    ReferenceRequired(String),

    #[error("confidence >= 0.9 requires provenance or safety.level=review")]
    UnearnedConfidence,
}
