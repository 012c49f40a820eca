//! The VLP wire format and message engine.
//!
//! This module defines the protocol's unit of exchange and the machinery
//! around it:
//! - Typed messages with confidence, provenance, and safety assessment
//! - Structural validation against the VLP schema document
//! - Semantic "truth serum" rules (evidence linkage, earned confidence)
//! - Message construction with normalization and auto-escalation
//! - NDJSON text framing

pub mod builder;
pub mod ndjson;
pub mod schema;
pub mod types;
pub mod validator;

pub use builder::{new_id, normalize_keywords, now_iso, MessageBuilder};
pub use ndjson::{from_ndjson, to_ndjson};
pub use schema::SchemaStore;
pub use types::{
    Message, MessageOptions, MessageType, Safety, SafetyIssue, SafetyLevel,
    MISSING_PROVENANCE_HIGH_CONFIDENCE, PROTOCOL_VERSION,
};
pub use validator::validate;
