//! Agent sessions: sequencing contexts that group related VLP messages.
//!
//! A session owns a monotonic counter and derives session-scoped message IDs;
//! the registry maps session IDs to live sessions and offers message-creation
//! helpers that delegate to the [`MessageBuilder`].

use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};

use chrono::Utc;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::Result;
use crate::protocol::{now_iso, Message, MessageBuilder, MessageOptions, MessageType};

/// An active VLP session for one agent.
///
/// The counter is guarded by its own lock, independent of the registry's map
/// lock, so concurrent callers can sequence messages on one session while
/// others manipulate unrelated sessions or the map itself.
#[derive(Debug)]
pub struct AgentSession {
    /// Human-readable agent name
    pub agent_name: String,
    /// Optional numeric identifier
    pub agent_number: u32,
    /// Unique session ID: `S-<date>-<slug>-<random6>`
    pub session_id: String,
    /// UTC instant the session started
    pub started_at: String,
    seq: Mutex<u64>,
}

impl AgentSession {
    /// Create a session with a freshly derived session ID.
    pub fn new(agent_name: impl Into<String>, agent_number: u32) -> Self {
        let agent_name = agent_name.into();
        let session_id = generate_session_id(&agent_name);
        Self {
            agent_name,
            agent_number,
            session_id,
            started_at: now_iso(),
            seq: Mutex::new(0),
        }
    }

    /// Next sequence number, starting from 1. Strictly increasing with no
    /// gaps or duplicates across concurrent callers.
    pub fn next_seq(&self) -> u64 {
        let mut seq = self.seq.lock().unwrap();
        *seq += 1;
        *seq
    }

    /// The last sequence number issued (0 before the first).
    pub fn seq(&self) -> u64 {
        *self.seq.lock().unwrap()
    }

    /// Derive a session-scoped message ID, advancing the sequence.
    ///
    /// Format: `<prefix>-<last 6 chars of session_id>-<seq zero-padded to 4>`.
    pub fn message_id(&self, prefix: &str) -> String {
        let n = self.next_seq();
        // The session ID always ends in the 6-char hex suffix.
        let tail = &self.session_id[self.session_id.len() - 6..];
        format!("{}-{}-{:04}", prefix, tail, n)
    }
}

/// `S-<date>-<slug>-<random6>`, e.g. `S-20250104-observer-a3f2c1`.
fn generate_session_id(agent_name: &str) -> String {
    let date = Utc::now().format("%Y%m%d");
    let hex = Uuid::new_v4().simple().to_string();
    format!("S-{}-{}-{}", date, slugify(agent_name), &hex[..6])
}

/// Lowercase, strip a leading "the ", spaces to hyphens, at most 12 chars.
fn slugify(agent_name: &str) -> String {
    let lower = agent_name.to_lowercase();
    let stripped = lower.strip_prefix("the ").unwrap_or(&lower);
    stripped.replace(' ', "-").chars().take(12).collect()
}

/// Registry of live sessions, keyed by session ID.
///
/// Map mutations hold a single coarse lock; no I/O or message construction
/// happens while it is held. Session counters are never touched under the
/// map lock, only through the session's own methods.
#[derive(Debug)]
pub struct SessionRegistry {
    builder: MessageBuilder,
    sessions: Mutex<HashMap<String, Arc<AgentSession>>>,
}

impl SessionRegistry {
    /// Registry validating against the bundled schema.
    pub fn new() -> Result<Self> {
        Ok(Self::with_builder(MessageBuilder::with_bundled_schema()?))
    }

    /// Registry using a caller-supplied builder (and thus schema).
    pub fn with_builder(builder: MessageBuilder) -> Self {
        Self {
            builder,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// The builder this registry constructs messages with.
    pub fn builder(&self) -> &MessageBuilder {
        &self.builder
    }

    /// Start and register a new session.
    pub fn start_session(
        &self,
        agent_name: impl Into<String>,
        agent_number: u32,
    ) -> Arc<AgentSession> {
        let session = Arc::new(AgentSession::new(agent_name, agent_number));
        self.sessions
            .lock()
            .unwrap()
            .insert(session.session_id.clone(), Arc::clone(&session));
        tracing::debug!(
            session_id = %session.session_id,
            agent = %session.agent_name,
            "Started VLP session"
        );
        session
    }

    /// Look up an active session. Never mutates.
    pub fn get_session(&self, session_id: &str) -> Option<Arc<AgentSession>> {
        self.sessions.lock().unwrap().get(session_id).cloned()
    }

    /// End a session: emit its `session_context` summary message and remove
    /// it from the registry.
    ///
    /// Deriving the message ID and filling the `seq` field each advance the
    /// session counter, so the context message consumes two sequence numbers
    /// and `total_messages` reflects both. If message construction fails the
    /// session stays registered.
    pub fn end_session(&self, session: &AgentSession, summary: &str) -> Result<Message> {
        let content = if summary.is_empty() {
            format!("Session ended for {}", session.agent_name)
        } else {
            summary.to_string()
        };

        let id = session.message_id("CTX");
        let seq = session.next_seq();
        let msg = self.builder.build(
            MessageType::SessionContext,
            session.agent_name.clone(),
            content,
            MessageOptions {
                id: Some(id),
                session_id: Some(session.session_id.clone()),
                seq: Some(seq),
                confidence: Some(1.0),
                provenance: vec![
                    "agent_session".to_string(),
                    format!("agent_{}", session.agent_number),
                ],
                payload: Some(json!({
                    "agent_number": session.agent_number,
                    "started_at": session.started_at,
                    "ended_at": now_iso(),
                    "total_messages": session.seq(),
                })),
                ..Default::default()
            },
        )?;

        self.sessions.lock().unwrap().remove(&session.session_id);
        tracing::debug!(
            session_id = %session.session_id,
            total_messages = session.seq(),
            "Ended VLP session"
        );
        Ok(msg)
    }

    /// Create a message of any type within a session, stamping the session
    /// ID, a session-scoped message ID, and the next sequence number.
    ///
    /// As with [`end_session`](Self::end_session), the ID and the `seq` field
    /// each advance the counter, so every helper-created message consumes two
    /// sequence numbers.
    pub fn create_message(
        &self,
        session: &AgentSession,
        message_type: MessageType,
        content: impl Into<Value>,
        mut opts: MessageOptions,
    ) -> Result<Message> {
        opts.id = Some(session.message_id(message_type.id_prefix()));
        opts.seq = Some(session.next_seq());
        opts.session_id = Some(session.session_id.clone());
        self.builder
            .build(message_type, session.agent_name.clone(), content, opts)
    }

    /// Create a claim within a session.
    pub fn create_claim(
        &self,
        session: &AgentSession,
        content: impl Into<Value>,
        confidence: f64,
        mut opts: MessageOptions,
    ) -> Result<Message> {
        opts.confidence = Some(confidence);
        self.create_message(session, MessageType::Claim, content, opts)
    }
}

/// The process-wide default registry, created lazily on first access.
///
/// Convenience only: core use never requires it, and independent registries
/// can coexist with it.
///
/// # Panics
///
/// Panics if the bundled schema fails to load, which is the fatal-at-startup
/// condition; there is no recovery without a schema.
pub fn registry() -> &'static SessionRegistry {
    static REGISTRY: OnceLock<SessionRegistry> = OnceLock::new();
    REGISTRY.get_or_init(|| SessionRegistry::new().expect("bundled VLP schema must load"))
}
