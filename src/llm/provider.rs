// src/llm/provider.rs
// Text-generation abstraction consumed by the explain proxy

use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;

use crate::error::Result;

/// Lazy, finite, non-restartable sequence of text fragments.
///
/// The end of the stream (`None`) is the model's completion signal; an
/// `Err` item means the generation failed part-way.
pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

/// Trait for text-completion backends
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Single-shot completion, returns the full text
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Incremental completion
    async fn generate_stream(&self, prompt: &str) -> Result<FragmentStream>;

    /// Model identifier for logging
    fn model_name(&self) -> String;
}
