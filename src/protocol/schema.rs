//! Schema store: loads the VLP message schema and runs structural checks.

use std::fmt;
use std::path::Path;

use serde_json::Value;

use crate::error::{Error, Result, ValidationError};

/// The schema document shipped with the crate.
const BUNDLED_SCHEMA: &str = include_str!("../../schema/vlp-1.1.json");

/// Holds the structural schema for a VLP message, compiled once at load time
/// and read-only afterward.
pub struct SchemaStore {
    document: Value,
    validator: jsonschema::Validator,
}

impl SchemaStore {
    /// Build a store from an already-parsed schema document.
    pub fn from_value(document: Value) -> Result<Self> {
        let validator = jsonschema::Validator::new(&document)
            .map_err(|e| Error::SchemaLoad(format!("invalid schema document: {}", e)))?;
        Ok(Self {
            document,
            validator,
        })
    }

    /// Load the schema bundled into the crate.
    pub fn bundled() -> Result<Self> {
        let document: Value = serde_json::from_str(BUNDLED_SCHEMA)
            .map_err(|e| Error::SchemaLoad(format!("bundled schema is not valid JSON: {}", e)))?;
        Self::from_value(document)
    }

    /// Load a schema document from disk. Intended for callers shipping their
    /// own schema revision; failure here is fatal at startup.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::SchemaLoad(format!("cannot read schema at {}: {}", path.display(), e))
        })?;
        let document: Value = serde_json::from_str(&content).map_err(|e| {
            Error::SchemaLoad(format!("cannot parse schema at {}: {}", path.display(), e))
        })?;
        let store = Self::from_value(document)?;
        tracing::debug!("Loaded VLP schema from {}", path.display());
        Ok(store)
    }

    /// The raw schema document.
    pub fn document(&self) -> &Value {
        &self.document
    }

    /// Check a candidate message against the schema, reporting the first
    /// violation encountered.
    pub fn check(&self, msg: &Value) -> std::result::Result<(), ValidationError> {
        if let Some(err) = self.validator.iter_errors(msg).next() {
            return Err(ValidationError::Structural(err.to_string()));
        }
        Ok(())
    }
}

impl fmt::Debug for SchemaStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaStore")
            .field("title", &self.document.get("title"))
            .finish()
    }
}
