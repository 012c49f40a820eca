//! Simple VLP agent walkthrough.
//!
//! Demonstrates basic message creation and session management:
//! session start, claims, auto-escalation, evidence, session end, NDJSON.
//!
//! Run with: `cargo run --example simple_agent`

use anyhow::Result;
use vlp::protocol::{to_ndjson, validate, MessageBuilder, MessageOptions, MessageType};
use vlp::session::SessionRegistry;

fn main() -> Result<()> {
    vlp::logging::init();

    let registry = SessionRegistry::new()?;
    let session = registry.start_session("Example Agent", 99);
    println!("Started session: {}", session.session_id);

    let mut messages = Vec::new();

    // First claim: full confidence, no provenance, so it escalates.
    let claim1 = registry.create_claim(
        &session,
        "Starting example workflow.",
        1.0,
        MessageOptions {
            keywords: vec!["example".into(), "workflow".into(), "start".into()],
            ..Default::default()
        },
    )?;
    println!("Created claim: {}", claim1.id);
    messages.push(claim1);

    // Second claim backed by provenance stays safe.
    let claim2 = registry.create_claim(
        &session,
        "Fetched data from external API.",
        0.9,
        MessageOptions {
            provenance: vec!["https://api.example.com/data".into()],
            keywords: vec!["example".into(), "api".into(), "data".into()],
            ..Default::default()
        },
    )?;
    println!("Created claim: {}", claim2.id);
    let claim2_id = claim2.id.clone();
    messages.push(claim2);

    // Building outside the registry works the same way.
    let builder = MessageBuilder::with_bundled_schema()?;
    let claim3 = builder.build(
        MessageType::Claim,
        session.agent_name.clone(),
        "High confidence assertion without provenance.",
        MessageOptions {
            confidence: Some(0.95),
            session_id: Some(session.session_id.clone()),
            keywords: vec!["example".into(), "high-confidence".into()],
            ..Default::default()
        },
    )?;
    println!("Created claim: {}", claim3.id);
    println!("  -> Safety level: {:?}", claim3.safety.level);
    messages.push(claim3);

    // Evidence substantiating the second claim.
    let evidence = builder.build(
        MessageType::Evidence,
        session.agent_name.clone(),
        "API response verified against schema.",
        MessageOptions {
            confidence: Some(0.95),
            provenance: vec!["schema_validation".into(), "api_response_log".into()],
            refers_to: Some(claim2_id),
            session_id: Some(session.session_id.clone()),
            keywords: vec!["example".into(), "evidence".into(), "validation".into()],
            ..Default::default()
        },
    )?;
    println!("Created evidence: {}", evidence.id);
    messages.push(evidence);

    let context = registry.end_session(
        &session,
        "Example workflow completed successfully. Created 4 messages.",
    )?;
    println!("Session ended: {}", context.id);
    messages.push(context);

    println!("\n--- NDJSON Output ---");
    println!("{}", to_ndjson(&messages)?);

    println!("\n--- Validation ---");
    for msg in &messages {
        let raw = msg.to_value()?;
        match validate(builder.schema(), &raw) {
            Ok(()) => println!("{}: ok", msg.id),
            Err(e) => println!("{}: FAILED: {}", msg.id, e),
        }
    }

    Ok(())
}
