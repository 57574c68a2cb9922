// src/cli/mod.rs
// CLI module for explainer commands

use clap::{Parser, Subcommand};
use explainer::prompt::Level;

pub mod ask;
pub mod history;
pub mod levels;
pub mod serve;

pub use ask::run_ask;
pub use history::run_history;
pub use levels::run_levels;
pub use serve::run_serve;

#[derive(Parser)]
#[command(name = "explainer")]
#[command(about = "Explain any topic at the level you choose")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the explain proxy
    Serve {
        /// Host to bind
        #[arg(long, env = "EXPLAINER_HOST")]
        host: Option<String>,

        /// Port to listen on
        #[arg(short, long, env = "EXPLAINER_PORT")]
        port: Option<u16>,
    },

    /// Stream an explanation of a topic
    Ask {
        /// Topic to explain
        #[arg(index = 1)]
        topic: String,

        /// Audience level (e.g. child-basic, teen, expert)
        #[arg(short, long, default_value = "child-basic")]
        level: Level,

        /// Wait for the whole answer instead of streaming it
        #[arg(long)]
        no_stream: bool,

        /// Proxy base URL
        #[arg(long, env = "EXPLAINER_SERVER_URL")]
        server: Option<String>,
    },

    /// List audience levels
    Levels,

    /// Browse or edit saved explanations
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },
}

#[derive(Subcommand)]
pub enum HistoryAction {
    /// List entries, most recent first
    List,
    /// Print one entry
    Show {
        #[arg(index = 1)]
        id: String,
    },
    /// Delete one entry
    Remove {
        #[arg(index = 1)]
        id: String,
    },
    /// Delete every entry
    Clear,
}
