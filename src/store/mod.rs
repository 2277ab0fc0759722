pub mod memory;
pub mod sheet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{CriterionId, EntrantId, JudgeId, Points, SegmentId};
use crate::scoring::ScoringError;

pub use memory::InMemoryScoreStore;
pub use sheet::{get_scores_path, load_score_sheet, save_score_sheet, ScoreSheet};

/// Identity of one score cell. At most one live value exists per key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ScoreKey {
    pub judge: JudgeId,
    pub entrant: EntrantId,
    pub segment: SegmentId,
    pub criterion: CriterionId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRow {
    #[serde(flatten)]
    pub key: ScoreKey,
    pub value: Points,
    pub submitted_at: DateTime<Utc>,
}

/// Storage for raw judge scores.
///
/// Implementations must apply each upsert atomically per key and must return
/// a consistent view of every key they hand back from one `query` call.
pub trait ScoreStore: Send + Sync {
    /// Insert or overwrite the value for `key` (last write wins).
    ///
    /// Rejects values outside the store's configured range with
    /// `ScoringError::Validation` and leaves the stored value untouched.
    fn upsert(
        &self,
        key: ScoreKey,
        value: Points,
        submitted_at: DateTime<Utc>,
    ) -> Result<(), ScoringError>;

    /// All current rows for one entrant in one segment, ordered by
    /// (judge, criterion).
    fn query(&self, segment: &SegmentId, entrant: &EntrantId) -> Vec<ScoreRow>;

    /// Every stored row, ordered by key.
    fn rows(&self) -> Vec<ScoreRow>;
}
