//! NDJSON framing: one message per line.

use crate::error::Result;
use crate::protocol::types::Message;

/// Serialize messages as newline-delimited JSON, one object per line,
/// no trailing newline.
pub fn to_ndjson(messages: &[Message]) -> Result<String> {
    let lines: Vec<String> = messages
        .iter()
        .map(serde_json::to_string)
        .collect::<std::result::Result<_, _>>()?;
    Ok(lines.join("\n"))
}

/// Parse NDJSON text into messages, preserving input order. Blank lines are
/// skipped; any malformed line fails the whole parse.
pub fn from_ndjson(text: &str) -> Result<Vec<Message>> {
    let mut out = Vec::new();
    for line in text.lines() {
        if line.trim().is_empty() {
            continue;
        }
        out.push(serde_json::from_str(line)?);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::builder::MessageBuilder;
    use crate::protocol::types::{MessageOptions, MessageType};

    fn sample(sender: &str, content: &str) -> Message {
        MessageBuilder::with_bundled_schema()
            .unwrap()
            .build(
                MessageType::Claim,
                sender,
                content,
                MessageOptions {
                    confidence: Some(0.5),
                    ..Default::default()
                },
            )
            .unwrap()
    }

    #[test]
    fn test_to_ndjson_one_line_per_message() {
        let msgs = vec![sample("Agent1", "First"), sample("Agent2", "Second")];
        let text = to_ndjson(&msgs).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert!(!text.ends_with('\n'));
    }

    #[test]
    fn test_from_ndjson_skips_blank_lines() {
        let msgs = vec![sample("Agent1", "First"), sample("Agent2", "Second")];
        let text = format!(
            "\n{}\n\n  \n{}\n",
            serde_json::to_string(&msgs[0]).unwrap(),
            serde_json::to_string(&msgs[1]).unwrap()
        );

        let parsed = from_ndjson(&text).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].sender, "Agent1");
        assert_eq!(parsed[1].sender, "Agent2");
    }

    #[test]
    fn test_roundtrip() {
        let original = vec![sample("Agent1", "Test1"), sample("Agent2", "Test2")];
        let parsed = from_ndjson(&to_ndjson(&original).unwrap()).unwrap();
        assert_eq!(parsed, original);
    }

    #[test]
    fn test_malformed_line_is_error() {
        assert!(from_ndjson("{\"id\": \"MSG001\"").is_err());
    }
}
