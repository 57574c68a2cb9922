// src/cli/levels.rs
// `explainer levels`

use explainer::prompt::levels;

pub fn run_levels() {
    for config in levels() {
        println!("{:<20} {:<8} {}", config.id, config.short_label, config.label);
    }
}
