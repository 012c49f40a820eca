//! Message types for the VLP wire format.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ValidationError;

/// Fixed protocol tag carried by every message.
pub const PROTOCOL_VERSION: &str = "VLP/1.1";

/// Message type classification.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    /// Assertion carrying a confidence score
    Claim,
    /// Substantiation of a prior claim (requires refers_to + provenance)
    Evidence,
    /// Question directed at another agent
    Query,
    /// Answer to a query (requires refers_to)
    Response,
    /// Amendment of an earlier message (requires refers_to)
    Correction,
    /// One-way informational message
    Notice,
    /// End-of-session summary with session statistics
    SessionContext,
}

impl MessageType {
    /// Wire-format tag, always lowercase.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Claim => "claim",
            Self::Evidence => "evidence",
            Self::Query => "query",
            Self::Response => "response",
            Self::Correction => "correction",
            Self::Notice => "notice",
            Self::SessionContext => "session_context",
        }
    }

    /// Prefix used for session-scoped message IDs of this type.
    pub fn id_prefix(&self) -> &'static str {
        match self {
            Self::Claim => "CLM",
            Self::Evidence => "EVD",
            Self::Query => "QRY",
            Self::Response => "RSP",
            Self::Correction => "COR",
            Self::Notice => "NTC",
            Self::SessionContext => "CTX",
        }
    }

    /// True for types that must link to another message via `refers_to`.
    pub fn requires_reference(&self) -> bool {
        matches!(self, Self::Evidence | Self::Response | Self::Correction)
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageType {
    type Err = ValidationError;

    /// Parses a type tag, normalizing case and surrounding whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "claim" => Ok(Self::Claim),
            "evidence" => Ok(Self::Evidence),
            "query" => Ok(Self::Query),
            "response" => Ok(Self::Response),
            "correction" => Ok(Self::Correction),
            "notice" => Ok(Self::Notice),
            "session_context" => Ok(Self::SessionContext),
            other => Err(ValidationError::Structural(format!(
                "unknown message type: {:?}",
                other
            ))),
        }
    }
}

/// Safety assessment levels.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SafetyLevel {
    /// No outstanding accountability issues
    Safe,
    /// Needs human or downstream review before being acted on
    Review,
}

impl Default for SafetyLevel {
    fn default() -> Self {
        Self::Safe
    }
}

/// Issue code appended when high confidence is asserted without provenance.
pub const MISSING_PROVENANCE_HIGH_CONFIDENCE: &str = "missing_provenance_high_confidence";

/// A single recorded safety issue.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SafetyIssue {
    /// Machine-readable issue code
    pub code: String,
    /// Human-readable explanation
    pub detail: String,
}

impl SafetyIssue {
    /// The escalation issue recorded by the builder's accountability check.
    pub fn missing_provenance() -> Self {
        Self {
            code: MISSING_PROVENANCE_HIGH_CONFIDENCE.to_string(),
            detail: "confidence >= 0.9 without provenance".to_string(),
        }
    }
}

/// Safety assessment attached to every message.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Safety {
    /// Overall assessment
    pub level: SafetyLevel,
    /// Issues found during construction or review
    #[serde(default)]
    pub issues: Vec<SafetyIssue>,
}

impl Safety {
    /// Escalate to review, recording the reason.
    pub fn escalate(&mut self, issue: SafetyIssue) {
        self.level = SafetyLevel::Review;
        self.issues.push(issue);
    }
}

/// A VLP message.
///
/// The field order mirrors the wire format; serialization emits every field
/// including nulls so that round-tripping through NDJSON is lossless.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    /// Unique message ID
    pub id: String,
    /// Protocol version tag, always "VLP/1.1"
    pub protocol: String,
    /// Message type
    #[serde(rename = "type")]
    pub message_type: MessageType,
    /// ISO-8601 UTC timestamp, second precision
    pub timestamp: String,
    /// Session this message belongs to, if any
    pub session_id: Option<String>,
    /// Position within the session
    pub seq: Option<u64>,
    /// Sending agent identifier
    pub sender: String,
    /// Receiving agent identifier (None for unaddressed messages)
    pub receiver: Option<String>,
    /// Conversation topic
    pub topic: Option<String>,
    /// The substantive content (string or structured)
    pub content: Value,
    /// Asserted confidence score
    pub confidence: f64,
    /// Evidence sources backing the content
    pub provenance: Vec<String>,
    /// Caller-defined constraints on interpretation or use
    pub constraints: Vec<String>,
    /// Safety assessment
    pub safety: Safety,
    /// ID of the message this one links to
    pub refers_to: Option<String>,
    /// Normalized search tags
    pub keywords: Vec<String>,
    /// Auxiliary structured data (session statistics for session_context)
    pub payload: Option<Value>,
    /// Forward-compatible extension bag
    #[serde(rename = "_extras", default)]
    pub extras: Map<String, Value>,
}

impl Message {
    /// Serialize to the raw JSON form the validator operates on.
    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

/// Optional fields accepted by the message builder.
///
/// Every field has a documented default; fields left at their default are
/// filled in by the builder's normalization steps. There is no open-ended
/// option map, so unknown options cannot be passed.
#[derive(Debug, Clone, Default)]
pub struct MessageOptions {
    /// Message ID; generated when None
    pub id: Option<String>,
    /// Timestamp; current UTC second when None
    pub timestamp: Option<String>,
    /// Session linkage
    pub session_id: Option<String>,
    /// Sequence within the session
    pub seq: Option<u64>,
    /// Receiving agent
    pub receiver: Option<String>,
    /// Conversation topic
    pub topic: Option<String>,
    /// Confidence score; defaults to 1.0 when None
    pub confidence: Option<f64>,
    /// Evidence sources
    pub provenance: Vec<String>,
    /// Interpretation constraints
    pub constraints: Vec<String>,
    /// Explicit safety assessment; defaults to safe with no issues
    pub safety: Option<Safety>,
    /// Linked message ID
    pub refers_to: Option<String>,
    /// Search tags (normalized by the builder)
    pub keywords: Vec<String>,
    /// Auxiliary structured data
    pub payload: Option<Value>,
    /// Extension fields carried through verbatim
    pub extras: Map<String, Value>,
}
