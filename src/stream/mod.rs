// src/stream/mod.rs
// Event-stream codec shared by the proxy, the Gemini reader and the client

pub mod event;
pub mod parser;

pub use event::StreamEvent;
pub use parser::SseParser;
