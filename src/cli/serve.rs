// src/cli/serve.rs
// `explainer serve`

use anyhow::Result;
use explainer::config::ServerConfig;
use explainer::server;

pub async fn run_serve(host: Option<String>, port: Option<u16>) -> Result<()> {
    // Fails here, before binding, when no API key is configured
    let mut config = ServerConfig::from_env()?;
    if let Some(host) = host {
        config.host = host;
    }
    if let Some(port) = port {
        config.port = port;
    }

    server::run(config).await
}
