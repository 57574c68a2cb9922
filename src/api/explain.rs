// src/api/explain.rs
// POST /explain: validate, build prompt, relay the model's answer

use axum::{
    Json,
    body::Bytes,
    extract::State,
    response::{
        IntoResponse, Response,
        sse::{Event, Sse},
    },
};
use futures::{Stream, StreamExt};
use std::time::Instant;
use tracing::{error, info};

use super::error::{ApiError, ApiResult};
use super::types::{ExplainResponse, HealthResponse, ValidatedRequest};
use crate::error::ExplainerError;
use crate::llm::FragmentStream;
use crate::prompt::build_prompt;
use crate::server::AppState;
use crate::stream::StreamEvent;

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Explain endpoint. Streaming and non-streaming shapes never mix.
pub async fn explain(State(state): State<AppState>, body: Bytes) -> ApiResult<Response> {
    let request = ValidatedRequest::parse(&body).inspect_err(|e| {
        info!(reason = %e.reason, "Rejected explain request");
    })?;

    let prompt = build_prompt(request.level, &request.topic);
    info!(
        level = %request.level,
        topic_chars = request.topic.len(),
        stream = request.stream,
        model = %state.generator.model_name(),
        "Explain request"
    );

    if request.stream {
        let fragments = state
            .generator
            .generate_stream(&prompt)
            .await
            .map_err(ApiError::generation_failed)?;
        Ok(event_stream_response(fragments).into_response())
    } else {
        let start = Instant::now();
        let explanation = state
            .generator
            .generate(&prompt)
            .await
            .map_err(ApiError::generation_failed)?;
        info!(
            duration_ms = start.elapsed().as_millis() as u64,
            content_len = explanation.len(),
            "Explanation generated"
        );
        Ok(Json(ExplainResponse { explanation }).into_response())
    }
}

/// Relay fragments as `data:` events.
///
/// The body pulls one fragment, emits one event, then pulls the next. A
/// failure mid-stream aborts the body without the terminal event; a client
/// disconnect drops the body and with it the upstream stream. No keep-alive
/// comments are interleaved.
fn event_stream_response(
    mut fragments: FragmentStream,
) -> Sse<impl Stream<Item = Result<Event, ExplainerError>>> {
    let events = async_stream::stream! {
        let start = Instant::now();
        let mut relayed = 0usize;

        while let Some(item) = fragments.next().await {
            match item {
                Ok(text) if text.is_empty() => continue,
                Ok(text) => {
                    relayed += 1;
                    yield Ok(Event::default().data(StreamEvent::Text(text).to_json()));
                }
                Err(e) => {
                    error!(error = %e, relayed, "Stream generation failed");
                    yield Err(e);
                    return;
                }
            }
        }

        info!(
            relayed,
            duration_ms = start.elapsed().as_millis() as u64,
            "Stream complete"
        );
        yield Ok(Event::default().data(StreamEvent::done().to_json()));
    };

    Sse::new(events)
}
