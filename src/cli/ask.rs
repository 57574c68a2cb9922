// src/cli/ask.rs
// `explainer ask`: print an explanation as it streams in

use std::io::Write;

use anyhow::{Result, bail};
use explainer::client::{ExplainClient, ExplanationStatus, FAILURE_MESSAGE};
use explainer::config::ClientConfig;
use explainer::prompt::Level;
use tracing::debug;

use super::history::open_history;

pub async fn run_ask(
    topic: String,
    level: Level,
    no_stream: bool,
    server: Option<String>,
) -> Result<()> {
    let topic = topic.trim().to_string();
    if topic.is_empty() {
        bail!("Topic must not be empty");
    }

    let mut config = ClientConfig::from_env();
    if let Some(server) = server {
        config.server_url = server.trim_end_matches('/').to_string();
    }
    debug!(server = %config.server_url, level = %level, "Asking");

    let history = open_history(&config).shared();
    let client = ExplainClient::new(config.server_url, history);

    if no_stream {
        return match client.explain_once(&topic, level).await {
            Ok(explanation) => {
                println!("{}", explanation);
                Ok(())
            }
            Err(e) => {
                eprintln!("{}", FAILURE_MESSAGE);
                Err(e.into())
            }
        };
    }

    // Print only the part of the text not shown yet
    let mut updates = client.subscribe();
    let printer = tokio::spawn(async move {
        let mut printed = 0usize;
        let mut stdout = std::io::stdout();
        while updates.changed().await.is_ok() {
            let state = updates.borrow_and_update().clone();
            if state.status == ExplanationStatus::Failed {
                break;
            }
            if state.text.len() > printed && state.text.is_char_boundary(printed) {
                let _ = write!(stdout, "{}", &state.text[printed..]);
                let _ = stdout.flush();
                printed = state.text.len();
            }
            if state.is_finished() {
                break;
            }
        }
        printed
    });

    match client.explain(&topic, level).await {
        Ok(_) => {
            if printer.await.unwrap_or(0) > 0 {
                println!();
            }
            Ok(())
        }
        Err(e) => {
            printer.abort();
            println!();
            eprintln!("{}", FAILURE_MESSAGE);
            Err(e.into())
        }
    }
}
