//! Message construction: normalization, auto-escalation, validation.

use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use uuid::Uuid;

use crate::error::{Error, Result, SemanticViolation};
use crate::protocol::schema::SchemaStore;
use crate::protocol::types::{
    Message, MessageOptions, MessageType, SafetyIssue, SafetyLevel, PROTOCOL_VERSION,
};
use crate::protocol::validator;

/// Generate a unique message ID: prefix plus 8 lowercase hex chars.
pub fn new_id(prefix: &str) -> String {
    let hex = Uuid::new_v4().simple().to_string();
    format!("{}{}", prefix, &hex[..8])
}

/// Current UTC timestamp in ISO 8601, second precision, `Z` suffix.
pub fn now_iso() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// Lowercase, trim, drop empties, dedupe keeping first occurrence.
/// Idempotent: normalizing an already-normalized list is a no-op.
pub fn normalize_keywords(keywords: &[String]) -> Vec<String> {
    let mut seen = Vec::new();
    for raw in keywords {
        let k = raw.trim().to_lowercase();
        if !k.is_empty() && !seen.contains(&k) {
            seen.push(k);
        }
    }
    seen
}

/// Assembles validated VLP messages.
///
/// Holds the schema store so every built message is checked against the same
/// immutable schema. Construction either returns a fully valid message or an
/// [`Error::Build`] carrying the validator's description; there is no partial
/// success.
#[derive(Debug, Clone)]
pub struct MessageBuilder {
    schema: Arc<SchemaStore>,
}

impl MessageBuilder {
    /// Build against a caller-supplied schema store.
    pub fn new(schema: Arc<SchemaStore>) -> Self {
        Self { schema }
    }

    /// Build against the schema bundled with the crate.
    pub fn with_bundled_schema() -> Result<Self> {
        Ok(Self::new(Arc::new(SchemaStore::bundled()?)))
    }

    /// The schema store this builder validates against.
    pub fn schema(&self) -> &SchemaStore {
        &self.schema
    }

    /// Create a validated message.
    ///
    /// Applies the v1.1 accountability policy: a confidence of 0.9 or higher
    /// with no provenance escalates `safety.level` to review and records a
    /// `missing_provenance_high_confidence` issue before validation runs.
    pub fn build(
        &self,
        message_type: MessageType,
        sender: impl Into<String>,
        content: impl Into<Value>,
        opts: MessageOptions,
    ) -> Result<Message> {
        let confidence = opts.confidence.unwrap_or(1.0);
        if !confidence.is_finite() {
            return Err(Error::Build(SemanticViolation::InvalidConfidence.into()));
        }

        let mut safety = opts.safety.unwrap_or_default();
        if confidence >= 0.9 && opts.provenance.is_empty() && safety.level != SafetyLevel::Review {
            safety.escalate(SafetyIssue::missing_provenance());
        }

        let msg = Message {
            id: opts.id.unwrap_or_else(|| new_id("MSG")),
            protocol: PROTOCOL_VERSION.to_string(),
            message_type,
            timestamp: opts.timestamp.unwrap_or_else(now_iso),
            session_id: opts.session_id,
            seq: opts.seq,
            sender: sender.into(),
            receiver: opts.receiver,
            topic: opts.topic,
            content: content.into(),
            confidence,
            provenance: opts.provenance,
            constraints: opts.constraints,
            safety,
            refers_to: opts.refers_to,
            keywords: normalize_keywords(&opts.keywords),
            payload: opts.payload,
            extras: opts.extras,
        };

        let raw = msg.to_value()?;
        validator::validate(&self.schema, &raw).map_err(Error::Build)?;
        Ok(msg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use crate::protocol::types::{SafetyLevel, MISSING_PROVENANCE_HIGH_CONFIDENCE};

    fn builder() -> MessageBuilder {
        MessageBuilder::with_bundled_schema().unwrap()
    }

    #[test]
    fn test_new_id_format() {
        let id = new_id("MSG");
        assert_eq!(id.len(), 11); // MSG + 8 hex chars
        assert!(id.starts_with("MSG"));
        assert!(id[3..].chars().all(|c| c.is_ascii_hexdigit()));

        assert!(new_id("CLM").starts_with("CLM"));
    }

    #[test]
    fn test_now_iso_format() {
        let ts = now_iso();
        assert_eq!(ts.len(), 20); // YYYY-MM-DDTHH:MM:SSZ
        assert!(ts.ends_with('Z'));
        assert!(ts.contains('T'));
    }

    #[test]
    fn test_basic_claim() {
        let msg = builder()
            .build(
                MessageType::Claim,
                "TestAgent",
                "Test content",
                MessageOptions {
                    confidence: Some(0.8),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(msg.message_type, MessageType::Claim);
        assert_eq!(msg.sender, "TestAgent");
        assert_eq!(msg.content, serde_json::json!("Test content"));
        assert_eq!(msg.confidence, 0.8);
        assert_eq!(msg.protocol, "VLP/1.1");
        assert_eq!(msg.safety.level, SafetyLevel::Safe);
    }

    #[test]
    fn test_high_confidence_without_provenance_escalates() {
        let msg = builder()
            .build(
                MessageType::Claim,
                "TestAgent",
                "High confidence claim",
                MessageOptions {
                    confidence: Some(0.95),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(msg.safety.level, SafetyLevel::Review);
        assert!(msg
            .safety
            .issues
            .iter()
            .any(|i| i.code == MISSING_PROVENANCE_HIGH_CONFIDENCE));
    }

    #[test]
    fn test_default_confidence_escalates() {
        // Confidence defaults to 1.0, which without provenance must escalate.
        let msg = builder()
            .build(
                MessageType::Claim,
                "TestAgent",
                "Implicit full confidence",
                MessageOptions::default(),
            )
            .unwrap();

        assert_eq!(msg.confidence, 1.0);
        assert_eq!(msg.safety.level, SafetyLevel::Review);
    }

    #[test]
    fn test_high_confidence_with_provenance_stays_safe() {
        let msg = builder()
            .build(
                MessageType::Claim,
                "TestAgent",
                "Proven claim",
                MessageOptions {
                    confidence: Some(0.95),
                    provenance: vec!["source1".into(), "source2".into()],
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(msg.safety.level, SafetyLevel::Safe);
        assert!(msg.safety.issues.is_empty());
    }

    #[test]
    fn test_keywords_normalized() {
        let msg = builder()
            .build(
                MessageType::Claim,
                "TestAgent",
                "Test",
                MessageOptions {
                    confidence: Some(0.5),
                    keywords: vec![
                        "Research".into(),
                        "  OKLAHOMA  ".into(),
                        "test".into(),
                        "test".into(),
                    ],
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(msg.keywords, vec!["research", "oklahoma", "test"]);
    }

    #[test]
    fn test_keyword_normalization_idempotent() {
        let once = normalize_keywords(&["Research".into(), "  OKLAHOMA  ".into(), "test".into()]);
        let twice = normalize_keywords(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_session_fields_carried() {
        let msg = builder()
            .build(
                MessageType::Claim,
                "TestAgent",
                "Session test",
                MessageOptions {
                    confidence: Some(0.5),
                    session_id: Some("S-20250104-test-abc123".into()),
                    seq: Some(5),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(msg.session_id.as_deref(), Some("S-20250104-test-abc123"));
        assert_eq!(msg.seq, Some(5));
    }

    #[test]
    fn test_evidence_requires_refers_to() {
        let err = builder()
            .build(
                MessageType::Evidence,
                "TestAgent",
                "Evidence without ref",
                MessageOptions {
                    confidence: Some(0.8),
                    provenance: vec!["source".into()],
                    ..Default::default()
                },
            )
            .unwrap_err();

        assert!(err.to_string().contains("refers_to"));
        assert!(matches!(err, Error::Build(_)));
    }

    #[test]
    fn test_evidence_requires_provenance() {
        let err = builder()
            .build(
                MessageType::Evidence,
                "TestAgent",
                "Evidence without provenance",
                MessageOptions {
                    confidence: Some(0.8),
                    refers_to: Some("MSG00000001".into()),
                    ..Default::default()
                },
            )
            .unwrap_err();

        assert!(err.to_string().contains("provenance"));
        assert!(matches!(
            err,
            Error::Build(ValidationError::Semantic(
                SemanticViolation::EvidenceMissingProvenance
            ))
        ));
    }

    #[test]
    fn test_non_finite_confidence_rejected() {
        let err = builder()
            .build(
                MessageType::Claim,
                "TestAgent",
                "NaN claim",
                MessageOptions {
                    confidence: Some(f64::NAN),
                    ..Default::default()
                },
            )
            .unwrap_err();

        assert!(matches!(
            err,
            Error::Build(ValidationError::Semantic(
                SemanticViolation::InvalidConfidence
            ))
        ));
    }

    #[test]
    fn test_caller_supplied_id_and_timestamp_kept() {
        let msg = builder()
            .build(
                MessageType::Notice,
                "TestAgent",
                "Pinned fields",
                MessageOptions {
                    id: Some("NTC-fixed-0001".into()),
                    timestamp: Some("2025-01-04T10:00:00Z".into()),
                    confidence: Some(0.5),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(msg.id, "NTC-fixed-0001");
        assert_eq!(msg.timestamp, "2025-01-04T10:00:00Z");
    }
}
