//! Message validation: structural schema check plus the semantic
//! "truth serum" rules.

use serde_json::Value;

use crate::error::{SemanticViolation, ValidationError};
use crate::protocol::schema::SchemaStore;

/// Validate a candidate message in raw JSON form.
///
/// Runs the structural check against the schema store first, then the
/// semantic rules. Pure function of its inputs; never logs, never retries.
pub fn validate(schema: &SchemaStore, msg: &Value) -> Result<(), ValidationError> {
    schema.check(msg)?;
    semantic_check(msg)?;
    Ok(())
}

/// The truth-serum rules, evaluated in a fixed order so the first failing
/// rule determines the error.
///
/// Operates on the raw JSON form rather than the typed [`Message`] struct so
/// that messages arriving from outside the builder (NDJSON input, foreign
/// producers) get the same scrutiny. The builder guarantees most of these
/// properties already; the validator does not trust it.
///
/// [`Message`]: crate::protocol::Message
pub(crate) fn semantic_check(msg: &Value) -> Result<(), SemanticViolation> {
    let message_type = msg
        .get("type")
        .and_then(Value::as_str)
        .unwrap_or("")
        .trim();
    if message_type != message_type.to_lowercase() {
        return Err(SemanticViolation::TypeNotLowercase);
    }

    let confidence = match msg.get("confidence") {
        None | Some(Value::Null) => return Err(SemanticViolation::MissingConfidence),
        Some(Value::Number(n)) => match n.as_f64() {
            Some(f) => f,
            None => return Err(SemanticViolation::InvalidConfidence),
        },
        // Tolerated for schema documents that permit string confidence.
        Some(Value::String(s)) => match s.trim().parse::<f64>() {
            Ok(f) => f,
            Err(_) => return Err(SemanticViolation::InvalidConfidence),
        },
        Some(_) => return Err(SemanticViolation::InvalidConfidence),
    };

    let provenance_empty = msg
        .get("provenance")
        .and_then(Value::as_array)
        .map_or(true, |p| p.is_empty());

    let safety_level = msg
        .get("safety")
        .and_then(|s| s.get("level"))
        .and_then(Value::as_str)
        .unwrap_or("safe");

    let has_reference = msg
        .get("refers_to")
        .and_then(Value::as_str)
        .is_some_and(|r| !r.is_empty());

    if message_type == "evidence" {
        if !has_reference {
            return Err(SemanticViolation::EvidenceMissingReference);
        }
        if provenance_empty {
            return Err(SemanticViolation::EvidenceMissingProvenance);
        }
    }

    if matches!(message_type, "response" | "correction") && !has_reference {
        return Err(SemanticViolation::ReferenceRequired(
            message_type.to_string(),
        ));
    }

    // High confidence must be earned (provenance) or explicitly flagged for
    // review. The builder escalates before validation ever runs; this is the
    // independent re-check.
    if confidence >= 0.9 && provenance_empty && safety_level != "review" {
        return Err(SemanticViolation::UnearnedConfidence);
    }

    Ok(())
}
