mod config_cmd;
mod diet;
mod import;
mod program;
mod workout;

pub use config_cmd::ConfigCommand;
pub use diet::DietCommand;
pub use import::ImportCommand;
pub use program::ProgramCommand;
pub use workout::WorkoutCommand;

use clap::ValueEnum;

#[derive(Clone, Copy, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Shorten `s` to at most `width` characters for table output.
fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() > width {
        let head: String = s.chars().take(width.saturating_sub(3)).collect();
        format!("{}...", head)
    } else {
        s.to_string()
    }
}

fn print_footer(total: u64, page: u64, limit: u64, shown: usize, noun: &str) {
    println!(
        "\nShowing {} of {} {}(s) (page {}, limit {})",
        shown, total, noun, page, limit
    );
}
