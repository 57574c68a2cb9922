// src/prompt/builder.rs
// Final prompt assembly: level instruction + topic + closing directive

use super::levels::Level;

/// Closing directive appended to every prompt
pub const CLOSING_DIRECTIVE: &str = "Provide a clear, engaging explanation appropriate for the specified audience level. Use markdown formatting where helpful (bold for emphasis, bullet points for lists).";

/// Builds the prompt sent to the model.
///
/// The topic is trimmed and otherwise forwarded verbatim.
pub fn build_prompt(level: Level, topic: &str) -> String {
    let mut prompt = level.config().instruction();
    prompt.push_str("\n\nTopic to explain: ");
    prompt.push_str(topic.trim());
    prompt.push_str("\n\n");
    prompt.push_str(CLOSING_DIRECTIVE);
    prompt
}
