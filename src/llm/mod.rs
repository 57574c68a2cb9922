// src/llm/mod.rs
// External model collaborator: trait + Gemini implementation

pub mod gemini;
pub mod http_client;
pub mod provider;

pub use gemini::{DEFAULT_MODEL, GeminiClient};
pub use http_client::create_shared_client;
pub use provider::{FragmentStream, TextGenerator};
