pub mod formatter;

pub use formatter::{
    format_entrants, format_entrants_tsv, format_judge_sheet, format_judge_sheet_tsv,
    format_leaderboard, format_leaderboard_tsv, format_pair_summary, format_pair_summary_tsv,
    format_score, format_score_card, format_score_card_tsv, should_use_colors,
};

use anyhow::{Context, Result};
use serde::Serialize;

/// How results are written to stdout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Aligned columns, colored when stdout is a terminal
    #[default]
    Table,
    /// Tab-separated values, no headers
    Tsv,
    /// Pretty-printed JSON
    Json,
}

/// Pretty JSON for `--format json`
pub fn format_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("Failed to serialize output as JSON")
}
