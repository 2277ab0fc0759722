pub mod cache;
pub mod config;
pub mod engine;
pub mod error;
pub mod ranking;
pub mod validation;
pub mod weights;

pub use cache::SegmentCache;
pub use config::*;
pub use engine::{
    aggregate_overall, aggregate_rows, aggregate_segment, judge_score, CompositeScore,
    JudgeContribution, SegmentResult, SegmentScore,
};
pub use error::ScoringError;
pub use ranking::{
    assign_ranks, build_leaderboard, Leaderboard, LeaderboardScope, OverallLeaderboard, Scored,
    SegmentLeaderboard, Standing, Unscored,
};
pub use validation::validate_competition;
pub use weights::{resolve_overall_weights, resolve_weights, ResolvedWeights};
