// src/client/state.rs
// Observable explanation state published by the streaming client

use crate::prompt::Level;

/// Text shown in place of the explanation when a request fails
pub const FAILURE_MESSAGE: &str = "Sorry, something went wrong. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExplanationStatus {
    #[default]
    Idle,
    Streaming,
    Complete,
    Failed,
}

/// Snapshot of the current explanation.
///
/// `request_id` identifies the request that owns this state; a request may
/// only publish while it is still the owner.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExplanationState {
    pub request_id: u64,
    pub topic: String,
    pub level: Level,
    pub text: String,
    pub status: ExplanationStatus,
}

impl ExplanationState {
    pub(crate) fn streaming(request_id: u64, topic: &str, level: Level) -> Self {
        Self {
            request_id,
            topic: topic.to_string(),
            level,
            text: String::new(),
            status: ExplanationStatus::Streaming,
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(
            self.status,
            ExplanationStatus::Complete | ExplanationStatus::Failed
        )
    }
}
