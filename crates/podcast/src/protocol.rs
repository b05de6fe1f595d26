//! Wire format of the script generation stream
//!
//! Each frame is `data: <json>` followed by a newline; the encoder adds a
//! blank line so every frame is also a complete server-sent event.

use serde::{Deserialize, Serialize};

const DATA_PREFIX: &str = "data:";

/// One event of a script generation stream
///
/// Zero or more `Log` events are followed by exactly one terminal `Script`
/// or `Error` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StreamEvent {
    /// Progress or free-text status line
    Log { message: String },
    /// Raw script payload with optional think and final-script regions
    Script { content: String },
    /// Generation failed
    Error { message: String },
}

impl StreamEvent {
    pub fn log(message: impl Into<String>) -> Self {
        Self::Log {
            message: message.into(),
        }
    }

    pub fn script(content: impl Into<String>) -> Self {
        Self::Script {
            content: content.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    /// Whether this event ends the stream
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Script { .. } | Self::Error { .. })
    }
}

/// Encode one event as a wire frame
pub fn encode_frame(event: &StreamEvent) -> String {
    // Serializing a string-only enum cannot fail
    let json = serde_json::to_string(event).unwrap_or_default();
    format!("data: {json}\n\n")
}

/// Incremental frame decoder
///
/// Transport chunks may split a frame anywhere, including inside a UTF-8
/// sequence, so bytes are buffered until a full line is available.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buffer: Vec<u8>,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk and return every event completed by it
    pub fn push(&mut self, chunk: &[u8]) -> Vec<StreamEvent> {
        self.buffer.extend_from_slice(chunk);

        let mut events = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            events.extend(decode_line(&line));
        }

        events
    }

    /// Flush a final line that was not newline-terminated
    pub fn finish(&mut self) -> Vec<StreamEvent> {
        let line = std::mem::take(&mut self.buffer);
        decode_line(&line).into_iter().collect()
    }
}

fn decode_line(raw: &[u8]) -> Option<StreamEvent> {
    let line = String::from_utf8_lossy(raw);
    let line = line.trim_end_matches(['\r', '\n']);

    let data = line.strip_prefix(DATA_PREFIX)?;
    let data = data.strip_prefix(' ').unwrap_or(data);

    match serde_json::from_str(data) {
        Ok(event) => Some(event),
        Err(e) => {
            tracing::warn!(error = %e, frame = %data, "skipping malformed stream frame");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frames_match_wire_format() {
        let wire: String = [
            StreamEvent::log("Analyzing Market Trends..."),
            StreamEvent::script("[Final Podcast Script]\nHello\n[End of Podcast Script]"),
            StreamEvent::error("stream timed out"),
        ]
        .iter()
        .map(encode_frame)
        .collect();

        insta::assert_snapshot!(wire.trim_end(), @r#"
        data: {"type":"log","message":"Analyzing Market Trends..."}

        data: {"type":"script","content":"[Final Podcast Script]\nHello\n[End of Podcast Script]"}

        data: {"type":"error","message":"stream timed out"}
        "#);
    }

    #[test]
    fn frame_split_across_chunks() {
        let mut decoder = FrameDecoder::new();

        assert!(decoder.push(b"data: {\"type\":\"lo").is_empty());
        assert!(decoder.push(b"g\",\"message\":\"Gathering").is_empty());
        let events = decoder.push(b" Financial Data...\"}\n\ndata: {\"type\":\"error\",");

        assert_eq!(events, vec![StreamEvent::log("Gathering Financial Data...")]);
        assert_eq!(
            decoder.push(b"\"message\":\"boom\"}\n"),
            vec![StreamEvent::error("boom")]
        );
    }

    #[test]
    fn several_frames_in_one_chunk() {
        let mut decoder = FrameDecoder::new();
        let chunk = "data: {\"type\":\"log\",\"message\":\"a\"}\ndata: {\"type\":\"log\",\"message\":\"b\"}\n";

        assert_eq!(
            decoder.push(chunk.as_bytes()),
            vec![StreamEvent::log("a"), StreamEvent::log("b")]
        );
    }

    #[test]
    fn multibyte_character_split_between_chunks() {
        let frame = "data: {\"type\":\"log\",\"message\":\"시장 분석\"}\n".as_bytes();
        let (head, tail) = frame.split_at(frame.len() - 5);

        let mut decoder = FrameDecoder::new();
        assert!(decoder.push(head).is_empty());
        assert_eq!(decoder.push(tail), vec![StreamEvent::log("시장 분석")]);
    }

    #[test]
    fn malformed_frame_is_skipped() {
        let mut decoder = FrameDecoder::new();
        let chunk = b"data: {not json}\ndata: {\"type\":\"unknown\"}\ndata: {\"type\":\"log\",\"message\":\"ok\"}\n";

        assert_eq!(decoder.push(chunk), vec![StreamEvent::log("ok")]);
    }

    #[test]
    fn non_data_lines_are_ignored() {
        let mut decoder = FrameDecoder::new();
        let chunk = b": keep-alive\r\nevent: message\r\n\r\ndata:{\"type\":\"log\",\"message\":\"x\"}\r\n";

        assert_eq!(decoder.push(chunk), vec![StreamEvent::log("x")]);
    }

    #[test]
    fn unterminated_last_frame_is_flushed() {
        let mut decoder = FrameDecoder::new();
        assert!(decoder.push(b"data: {\"type\":\"script\",\"content\":\"done\"}").is_empty());
        assert_eq!(decoder.finish(), vec![StreamEvent::script("done")]);
        assert!(decoder.finish().is_empty());
    }

    #[test]
    fn terminal_events() {
        assert!(!StreamEvent::log("x").is_terminal());
        assert!(StreamEvent::script("x").is_terminal());
        assert!(StreamEvent::error("x").is_terminal());
    }
}
