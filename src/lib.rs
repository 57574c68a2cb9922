// src/lib.rs
// explainer library: level catalog, explain proxy, streaming client, history

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod history;
pub mod llm;
pub mod prompt;
pub mod server;
pub mod stream;

pub use error::{ExplainerError, Result};
