// src/client/mod.rs
// Streaming client: issues explain requests, decodes the relay stream,
// publishes partial text and commits completed explanations to history

pub mod state;

use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use futures::StreamExt;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::api::{ExplainRequest, ExplainResponse};
use crate::error::{ExplainerError, Result};
use crate::history::{HistoryEntry, SharedHistory};
use crate::llm::create_shared_client;
use crate::prompt::Level;
use crate::stream::{SseParser, StreamEvent};

pub use state::{ExplanationState, ExplanationStatus, FAILURE_MESSAGE};

/// Request currently allowed to publish
struct InFlight {
    request_id: u64,
    token: CancellationToken,
}

/// Client for the explain proxy.
///
/// At most one request is live at a time: starting a request (or clearing,
/// or restoring from history) cancels the previous one. Observers follow the
/// current explanation through [`ExplainClient::subscribe`].
pub struct ExplainClient {
    http: reqwest::Client,
    base_url: String,
    history: SharedHistory,
    state: watch::Sender<ExplanationState>,
    in_flight: Mutex<Option<InFlight>>,
    last_query: Mutex<Option<(String, Level)>>,
    next_request_id: AtomicU64,
}

impl ExplainClient {
    pub fn new(base_url: impl Into<String>, history: SharedHistory) -> Self {
        Self::with_http_client(base_url, history, create_shared_client())
    }

    pub fn with_http_client(
        base_url: impl Into<String>,
        history: SharedHistory,
        http: reqwest::Client,
    ) -> Self {
        let (state, _) = watch::channel(ExplanationState::default());
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            history,
            state,
            in_flight: Mutex::new(None),
            last_query: Mutex::new(None),
            next_request_id: AtomicU64::new(0),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<ExplanationState> {
        self.state.subscribe()
    }

    /// Current snapshot
    pub fn state(&self) -> ExplanationState {
        self.state.borrow().clone()
    }

    pub fn history(&self) -> SharedHistory {
        self.history.clone()
    }

    fn explain_url(&self) -> String {
        format!("{}/explain", self.base_url)
    }

    /// Stream an explanation of `topic` at `level`.
    ///
    /// Returns the full text once the terminal event arrives (after it has
    /// been committed to history). On failure the published text becomes
    /// [`FAILURE_MESSAGE`] and the error is returned. A request superseded
    /// by a newer one returns [`ExplainerError::Cancelled`] without
    /// publishing anything further.
    pub async fn explain(&self, topic: &str, level: Level) -> Result<String> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(ExplainerError::InvalidInput("topic is empty".to_string()));
        }
        self.remember_query(topic, level);

        let (request_id, token) = self.begin(topic, level);
        info!(request_id, level = %level, "Explain request started");
        let start = Instant::now();

        let result = tokio::select! {
            biased;
            _ = token.cancelled() => Err(ExplainerError::Cancelled),
            result = self.run_stream(request_id, topic, level) => result,
        };

        match result {
            Ok(text) => {
                info!(
                    request_id,
                    duration_ms = start.elapsed().as_millis() as u64,
                    chars = text.len(),
                    "Explanation complete"
                );
                Ok(text)
            }
            Err(e) if e.is_cancelled() => {
                debug!(request_id, "Explain request cancelled");
                Err(e)
            }
            Err(e) => {
                warn!(request_id, error = %e, "Explain request failed");
                let published = self.publish(request_id, |s| {
                    s.text = FAILURE_MESSAGE.to_string();
                    s.status = ExplanationStatus::Failed;
                });
                if published {
                    Err(e)
                } else {
                    Err(ExplainerError::Cancelled)
                }
            }
        }
    }

    /// Re-issue the last submitted topic at a new level
    pub async fn change_level(&self, level: Level) -> Result<String> {
        let (topic, _) = self.last_query()?;
        self.explain(&topic, level).await
    }

    /// Re-issue the last topic one level more advanced
    pub async fn harder(&self) -> Result<String> {
        let (_, level) = self.last_query()?;
        let next = level.next().ok_or_else(|| {
            ExplainerError::InvalidInput(format!("{} is already the most advanced level", level))
        })?;
        self.change_level(next).await
    }

    /// Re-issue the last topic one level simpler
    pub async fn simpler(&self) -> Result<String> {
        let (_, level) = self.last_query()?;
        let previous = level.previous().ok_or_else(|| {
            ExplainerError::InvalidInput(format!("{} is already the simplest level", level))
        })?;
        self.change_level(previous).await
    }

    /// Cancel any in-flight request and reset the state to idle
    pub fn clear(&self) {
        self.take_over(|request_id| ExplanationState {
            request_id,
            ..ExplanationState::default()
        });
    }

    /// Show a stored explanation as the current, completed one
    pub fn restore(&self, entry: &HistoryEntry) {
        self.remember_query(&entry.topic, entry.level);
        self.take_over(|request_id| ExplanationState {
            request_id,
            topic: entry.topic.clone(),
            level: entry.level,
            text: entry.explanation.clone(),
            status: ExplanationStatus::Complete,
        });
    }

    /// Non-streaming request. Leaves the observable state untouched; a
    /// successful answer is committed to history.
    pub async fn explain_once(&self, topic: &str, level: Level) -> Result<String> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(ExplainerError::InvalidInput("topic is empty".to_string()));
        }

        let response = self
            .http
            .post(self.explain_url())
            .json(&ExplainRequest {
                topic: topic.to_string(),
                level,
                stream: false,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExplainerError::Status(status.as_u16()));
        }

        let body: ExplainResponse = response.json().await?;
        self.commit(topic, level, &body.explanation);
        Ok(body.explanation)
    }

    /// Cancel the previous request, allocate a new id and publish its
    /// initial state. Holding the slot lock keeps id order and publish
    /// order the same.
    fn begin(&self, topic: &str, level: Level) -> (u64, CancellationToken) {
        let token = CancellationToken::new();
        let request_id = self.take_over_with(token.clone(), |request_id| {
            ExplanationState::streaming(request_id, topic, level)
        });
        (request_id, token)
    }

    fn take_over<F>(&self, initial: F) -> u64
    where
        F: FnOnce(u64) -> ExplanationState,
    {
        self.take_over_with(CancellationToken::new(), initial)
    }

    fn take_over_with<F>(&self, token: CancellationToken, initial: F) -> u64
    where
        F: FnOnce(u64) -> ExplanationState,
    {
        let mut slot = match self.in_flight.lock() {
            Ok(slot) => slot,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(previous) = slot.take() {
            debug!(request_id = previous.request_id, "Cancelling previous request");
            previous.token.cancel();
        }

        let request_id = self.next_request_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.send_replace(initial(request_id));
        *slot = Some(InFlight { request_id, token });
        request_id
    }

    fn remember_query(&self, topic: &str, level: Level) {
        if let Ok(mut last) = self.last_query.lock() {
            *last = Some((topic.to_string(), level));
        }
    }

    fn last_query(&self) -> Result<(String, Level)> {
        self.last_query
            .lock()
            .ok()
            .and_then(|q| q.clone())
            .ok_or_else(|| ExplainerError::InvalidInput("no topic submitted yet".to_string()))
    }

    /// Apply `update` only while `request_id` still owns the state
    fn publish<F>(&self, request_id: u64, update: F) -> bool
    where
        F: FnOnce(&mut ExplanationState),
    {
        self.state.send_if_modified(|state| {
            if state.request_id != request_id {
                return false;
            }
            update(state);
            true
        })
    }

    fn commit(&self, topic: &str, level: Level, text: &str) {
        match self.history.lock() {
            Ok(mut history) => {
                let entry = history.add(topic, level, text);
                debug!(id = %entry.id, "Committed to history");
            }
            Err(_) => warn!("History lock poisoned, explanation not saved"),
        }
    }

    async fn run_stream(&self, request_id: u64, topic: &str, level: Level) -> Result<String> {
        let response = self
            .http
            .post(self.explain_url())
            .json(&ExplainRequest {
                topic: topic.to_string(),
                level,
                stream: true,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExplainerError::Status(status.as_u16()));
        }

        let mut bytes = response.bytes_stream();
        let mut parser = SseParser::new();
        let mut text = String::new();

        while let Some(chunk) = bytes.next().await {
            for payload in parser.feed(&chunk?) {
                if self.apply(request_id, &payload, &mut text)? {
                    return self.complete(request_id, topic, level, text);
                }
            }
        }
        // A terminal record without its trailing newline
        if let Some(payload) = parser.finish() {
            if self.apply(request_id, &payload, &mut text)? {
                return self.complete(request_id, topic, level, text);
            }
        }

        Err(ExplainerError::Incomplete)
    }

    /// Apply one record payload. Returns `true` on the terminal event.
    fn apply(&self, request_id: u64, payload: &str, text: &mut String) -> Result<bool> {
        match StreamEvent::decode(payload) {
            Some(StreamEvent::Text(fragment)) => {
                text.push_str(&fragment);
                if !self.publish(request_id, |s| s.text.clone_from(&*text)) {
                    return Err(ExplainerError::Cancelled);
                }
                Ok(false)
            }
            Some(StreamEvent::Done { text: last }) => {
                if let Some(last) = last {
                    text.push_str(&last);
                }
                Ok(true)
            }
            None => {
                debug!(request_id, "Skipping malformed record");
                Ok(false)
            }
        }
    }

    /// Commit to history and mark complete, unless a newer request has
    /// taken over. Lock order is history, then the in-flight slot, then the
    /// state channel; `take_over` only ever takes the last two, and no lock
    /// is taken inside the channel's closures.
    fn complete(&self, request_id: u64, topic: &str, level: Level, text: String) -> Result<String> {
        let mut history = match self.history.lock() {
            Ok(history) => history,
            Err(poisoned) => poisoned.into_inner(),
        };
        let slot = match self.in_flight.lock() {
            Ok(slot) => slot,
            Err(poisoned) => poisoned.into_inner(),
        };
        if !slot.as_ref().is_some_and(|f| f.request_id == request_id) {
            return Err(ExplainerError::Cancelled);
        }

        let entry = history.add(topic, level, &text);
        debug!(request_id, id = %entry.id, "Committed to history");
        self.publish(request_id, |s| {
            s.text.clone_from(&text);
            s.status = ExplanationStatus::Complete;
        });
        Ok(text)
    }
}
