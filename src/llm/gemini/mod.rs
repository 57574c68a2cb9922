// src/llm/gemini/mod.rs
// Google Gemini API client

mod client;
pub mod types;

pub use client::{DEFAULT_MODEL, GEMINI_API_BASE, GENERATION_CONFIG, GeminiClient};
