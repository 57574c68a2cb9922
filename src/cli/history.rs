// src/cli/history.rs
// `explainer history` subcommands

use anyhow::{Result, bail};
use chrono::Utc;
use explainer::config::ClientConfig;
use explainer::history::{FileStore, HistoryStore, format_relative};

use super::HistoryAction;

pub fn open_history(config: &ClientConfig) -> HistoryStore {
    HistoryStore::load(Box::new(FileStore::new(config.history_dir.clone())))
}

pub fn run_history(action: HistoryAction) -> Result<()> {
    let config = ClientConfig::from_env();
    let mut history = open_history(&config);

    match action {
        HistoryAction::List => {
            if history.is_empty() {
                println!("No history yet");
                return Ok(());
            }
            let now = Utc::now();
            for entry in history.list() {
                println!(
                    "{}  [{}]  {}  ({})",
                    entry.id,
                    entry.level.config().short_label,
                    entry.topic,
                    format_relative(entry.timestamp, now)
                );
            }
        }
        HistoryAction::Show { id } => {
            let Some(entry) = history.get(&id) else {
                bail!("No history entry with id {}", id);
            };
            println!("{} ({})", entry.topic, entry.level.label());
            println!();
            println!("{}", entry.explanation);
        }
        HistoryAction::Remove { id } => {
            if !history.remove(&id) {
                bail!("No history entry with id {}", id);
            }
            println!("Removed {}", id);
        }
        HistoryAction::Clear => {
            let count = history.len();
            history.clear();
            println!("Cleared {} entries", count);
        }
    }

    Ok(())
}
