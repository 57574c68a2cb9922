// src/prompt/mod.rs
// Prompt catalog: audience levels and prompt assembly

pub mod builder;
pub mod levels;

pub use builder::{CLOSING_DIRECTIVE, build_prompt};
pub use levels::{Level, LevelConfig, get_config, get_prompt_for_level, levels};
