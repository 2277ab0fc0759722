use clap::{Parser, Subcommand};
use log::{info, warn};
use serde::Serialize;
use std::path::{Path, PathBuf};

use tabulator::config::Config;
use tabulator::model::{CompetitorId, JudgeId, Lane, Points, Roster, SegmentId};
use tabulator::output::{self, OutputFormat};
use tabulator::scoring::ScoringError;
use tabulator::store::{self, InMemoryScoreStore, ScoreSheet};
use tabulator::{Submission, Tabulator};

// Exit codes
const EXIT_SUCCESS: i32 = 0;
const EXIT_VALIDATION: i32 = 2;
const EXIT_DATA_MISSING: i32 = 3;
const EXIT_CONFIG: i32 = 4;

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate the competition file and the score sheet
    Check,
    /// Record one judge's score for one criterion
    Submit {
        #[arg(long)]
        judge: String,
        #[arg(long)]
        competitor: String,
        /// Required for pairs: male or female
        #[arg(long)]
        lane: Option<Lane>,
        #[arg(long)]
        segment: String,
        #[arg(long)]
        criterion: String,
        /// Score, up to two decimal places
        #[arg(long)]
        value: Points,
    },
    /// Leaderboard of one segment (candidates, or one pair lane)
    Segment {
        segment: String,
        #[arg(long)]
        lane: Option<Lane>,
    },
    /// Overall weighted leaderboard (candidates, or one pair lane)
    Overall {
        #[arg(long)]
        lane: Option<Lane>,
    },
    /// Both lanes of every pair, for one segment or overall
    Pairs {
        #[arg(long)]
        segment: Option<String>,
    },
    /// Raw judge scores behind an entrant's segment score
    Scores {
        #[arg(long)]
        competitor: String,
        #[arg(long)]
        lane: Option<Lane>,
        #[arg(long)]
        segment: String,
    },
    /// Entrants of one lane with their profiles (candidates, or one pair lane)
    Entrants {
        #[arg(long)]
        lane: Option<Lane>,
    },
    /// A judge's assignments and scoring progress
    Sheet {
        #[arg(long)]
        judge: String,
    },
    /// Write a starter competition file
    Init {
        /// Where to write it (defaults to ~/.config/tabulator/competition.yaml)
        path: Option<PathBuf>,
    },
}

#[derive(Parser, Debug)]
#[command(name = "tabulator")]
#[command(about = "Pageant score tabulation CLI", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to competition file (defaults to ~/.config/tabulator/competition.yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Path to score sheet (defaults to ~/.config/tabulator/scores.json)
    #[arg(short, long, global = true)]
    scores: Option<PathBuf>,

    /// Log level: error, warn, info, debug, trace (falls back to RUST_LOG)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    /// Memoize segment scores between reads
    #[arg(long, global = true)]
    lazy_cache: bool,

    #[command(subcommand)]
    command: Commands,
}

fn exit_code(err: &ScoringError) -> i32 {
    match err {
        ScoringError::Validation(_) => EXIT_VALIDATION,
        ScoringError::InsufficientData(_) => EXIT_DATA_MISSING,
        ScoringError::Configuration(_) => EXIT_CONFIG,
    }
}

fn fail(err: ScoringError) -> ! {
    eprintln!("Error: {}", err);
    std::process::exit(exit_code(&err));
}

fn emit<T: Serialize>(
    format: OutputFormat,
    value: &T,
    table: impl FnOnce() -> String,
    tsv: impl FnOnce() -> String,
) {
    let rendered = match format {
        OutputFormat::Table => table(),
        OutputFormat::Tsv => tsv(),
        OutputFormat::Json => match output::format_json(value) {
            Ok(json) => json,
            Err(e) => {
                eprintln!("Output error: {:#}", e);
                std::process::exit(EXIT_CONFIG);
            }
        },
    };
    if !rendered.is_empty() {
        println!("{}", rendered);
    }
}

/// Replay a saved sheet through validated submission. Returns rejected rows.
fn restore_sheet(tab: &Tabulator<InMemoryScoreStore>, sheet: ScoreSheet) -> usize {
    let mut rejected = 0;
    for row in sheet.scores {
        let label = format!(
            "{} / {} / {} / {}",
            row.key.judge, row.key.entrant, row.key.segment, row.key.criterion
        );
        if let Err(e) = tab.restore(row) {
            warn!("skipping saved score {}: {}", label, e);
            rejected += 1;
        }
    }
    rejected
}

fn load_tabulator(
    config: &Config,
    scores_path: &Path,
    cached: bool,
) -> (Tabulator<InMemoryScoreStore>, usize) {
    let roster = Roster::from_config(config);
    let store = InMemoryScoreStore::new(roster.score_range());
    let mut tab = Tabulator::new(roster, store);
    if cached {
        tab = tab.with_cache();
    }

    let sheet = match store::load_score_sheet(scores_path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Score sheet error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };
    let rejected = restore_sheet(&tab, sheet);
    info!(
        "loaded {} score(s) from {}",
        tab.store().len(),
        scores_path.display()
    );

    (tab, rejected)
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = tabulator::logging::setup_logger(cli.log_level.clone(), vec![]) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    if let Commands::Init { path } = &cli.command {
        match tabulator::config::init::run_init(path.clone()) {
            Ok(_) => std::process::exit(EXIT_SUCCESS),
            Err(e) => {
                eprintln!("Init error: {:#}", e);
                std::process::exit(EXIT_CONFIG);
            }
        }
    }

    // Load competition
    let config = match tabulator::config::load_config(cli.config.clone()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    // Validate the whole competition at startup
    if let Err(errors) = tabulator::scoring::validate_competition(&config) {
        eprintln!("Competition config errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_CONFIG);
    }

    let scores_path = cli.scores.clone().unwrap_or_else(store::get_scores_path);
    let (tab, rejected) = load_tabulator(&config, &scores_path, cli.lazy_cache);
    let roster = tab.roster();
    let use_colors = output::should_use_colors();
    let format = cli.format;

    match cli.command {
        Commands::Check => {
            println!(
                "{}: {} candidate(s), {} pair(s), {} judge(s), {} segment(s), {} score(s)",
                roster.name(),
                roster.candidates().len(),
                roster.pairs().len(),
                roster.judges().len(),
                roster.segments().len(),
                tab.store().len()
            );
            if rejected > 0 {
                eprintln!("{} saved score(s) no longer match the competition", rejected);
                std::process::exit(EXIT_VALIDATION);
            }
        }
        Commands::Submit {
            judge,
            competitor,
            lane,
            segment,
            criterion,
            value,
        } => {
            let entrant = roster
                .resolve_entrant(&CompetitorId::new(competitor), lane)
                .unwrap_or_else(|e| fail(e));
            let submission = Submission {
                entrant: entrant.clone(),
                segment: SegmentId::new(segment),
                criterion: criterion.as_str().into(),
                value,
            };
            let segment = submission.segment.clone();
            if let Err(e) = tab.submit_score(&JudgeId::new(judge), submission) {
                fail(e);
            }

            let sheet = ScoreSheet::from_store(tab.store());
            if let Err(e) = store::save_score_sheet(&scores_path, &sheet) {
                eprintln!("Failed to save score sheet: {:#}", e);
                std::process::exit(EXIT_CONFIG);
            }
            println!("Recorded {} for {} in {} ({})", value, entrant, segment, criterion);
        }
        Commands::Segment { segment, lane } => {
            let board = tab
                .segment_leaderboard(&SegmentId::new(segment), lane)
                .unwrap_or_else(|e| fail(e));
            emit(
                format,
                &board,
                || output::format_leaderboard(&board, roster, use_colors),
                || output::format_leaderboard_tsv(&board, roster),
            );
        }
        Commands::Overall { lane } => {
            let board = tab.overall_leaderboard(lane).unwrap_or_else(|e| fail(e));
            emit(
                format,
                &board,
                || output::format_leaderboard(&board, roster, use_colors),
                || output::format_leaderboard_tsv(&board, roster),
            );
        }
        Commands::Pairs { segment } => {
            let (title, standings) = match segment {
                Some(segment) => {
                    let segment = SegmentId::new(segment);
                    let standings = tab
                        .pair_segment_summary(&segment)
                        .unwrap_or_else(|e| fail(e));
                    (format!("Pairs in {}", segment), standings)
                }
                None => {
                    let standings = tab.pair_overall_summary().unwrap_or_else(|e| fail(e));
                    ("Pairs overall".to_string(), standings)
                }
            };
            emit(
                format,
                &standings,
                || output::format_pair_summary(&title, &standings, roster, use_colors),
                || output::format_pair_summary_tsv(&standings),
            );
        }
        Commands::Scores {
            competitor,
            lane,
            segment,
        } => {
            let entrant = roster
                .resolve_entrant(&CompetitorId::new(competitor), lane)
                .unwrap_or_else(|e| fail(e));
            let card = tab
                .competitor_scores(&entrant, &SegmentId::new(segment))
                .unwrap_or_else(|e| fail(e));
            emit(
                format,
                &card,
                || output::format_score_card(&card, roster, use_colors),
                || output::format_score_card_tsv(&card),
            );
        }
        Commands::Entrants { lane } => {
            let profiles = roster.entrant_profiles(lane);
            let title = match lane {
                None => "Candidates".to_string(),
                Some(lane) => format!("Pairs ({})", lane),
            };
            emit(
                format,
                &profiles,
                || output::format_entrants(&title, &profiles, use_colors),
                || output::format_entrants_tsv(&profiles),
            );
        }
        Commands::Sheet { judge } => {
            let sheet = tab
                .judge_sheet(&JudgeId::new(judge))
                .unwrap_or_else(|e| fail(e));
            emit(
                format,
                &sheet,
                || output::format_judge_sheet(&sheet, roster, use_colors),
                || output::format_judge_sheet_tsv(&sheet),
            );
        }
        Commands::Init { .. } => {}
    }

    std::process::exit(EXIT_SUCCESS);
}
