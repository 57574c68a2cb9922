// src/llm/http_client.rs
// Shared HTTP client for outbound calls (Gemini API and the proxy client)

use std::time::Duration;

/// Default connect timeout
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Create the shared HTTP client.
///
/// Only the connect phase is bounded; a generation that stalls after the
/// connection is up runs until the caller drops or cancels it.
pub fn create_shared_client() -> reqwest::Client {
    reqwest::Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .pool_max_idle_per_host(10)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}
