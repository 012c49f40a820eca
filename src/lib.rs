//! Vigilith Language Protocol (VLP) v1.1.
//!
//! A structured message protocol for accountable AI agent communication.
//! Every message carries a confidence score, optional provenance, and a
//! safety assessment; high-confidence claims without provenance are
//! automatically escalated for review.
//!
//! The crate constructs, validates, and locally sequences messages.
//! Transport, delivery, and storage are the caller's responsibility.

pub mod error;
pub mod logging;
pub mod protocol;
pub mod session;

pub use error::{Error, Result, SemanticViolation, ValidationError};
pub use protocol::{
    from_ndjson, new_id, now_iso, to_ndjson, validate, Message, MessageBuilder, MessageOptions,
    MessageType, Safety, SafetyIssue, SafetyLevel, SchemaStore, PROTOCOL_VERSION,
};
pub use session::{registry, AgentSession, SessionRegistry};
