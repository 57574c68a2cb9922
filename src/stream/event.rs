// src/stream/event.rs
// Relay event type and its JSON payload encoding

use serde::{Deserialize, Serialize, Serializer};

/// One event on the explanation stream
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawEvent")]
pub enum StreamEvent {
    /// Incremental piece of generated text
    Text(String),
    /// Terminal marker of a successful stream, optionally carrying a last
    /// piece of text that precedes it
    Done { text: Option<String> },
}

#[derive(Deserialize)]
struct RawEvent {
    text: Option<String>,
    #[serde(default)]
    done: bool,
}

impl TryFrom<RawEvent> for StreamEvent {
    type Error = &'static str;

    fn try_from(raw: RawEvent) -> Result<Self, Self::Error> {
        if raw.done {
            return Ok(StreamEvent::Done { text: raw.text });
        }
        raw.text
            .map(StreamEvent::Text)
            .ok_or("event has neither `text` nor `done: true`")
    }
}

#[derive(Serialize)]
#[serde(untagged)]
enum WireEvent<'a> {
    Text {
        text: &'a str,
    },
    Done {
        #[serde(skip_serializing_if = "Option::is_none")]
        text: Option<&'a str>,
        done: bool,
    },
}

impl Serialize for StreamEvent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            StreamEvent::Text(text) => WireEvent::Text { text }.serialize(serializer),
            StreamEvent::Done { text } => WireEvent::Done {
                text: text.as_deref(),
                done: true,
            }
            .serialize(serializer),
        }
    }
}

impl StreamEvent {
    pub fn text(fragment: impl Into<String>) -> Self {
        StreamEvent::Text(fragment.into())
    }

    /// Plain terminal event, `{"done":true}`
    pub fn done() -> Self {
        StreamEvent::Done { text: None }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, StreamEvent::Done { .. })
    }

    /// JSON payload of this event (single line)
    pub fn to_json(&self) -> String {
        // Serializing strings and a bool into JSON cannot fail
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Decode one record payload. Malformed payloads yield `None`.
    pub fn decode(payload: &str) -> Option<Self> {
        serde_json::from_str(payload).ok()
    }
}
