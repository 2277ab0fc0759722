use serde::{Deserialize, Serialize};

use crate::model::{CriterionId, Lane, Points, SegmentId};

/// Valid range for a single criterion score (inclusive on both ends).
///
/// Example YAML:
/// ```yaml
/// score_range:
///   min: 0
///   max: 100
/// ```
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ScoreRange {
    pub min: Points,
    pub max: Points,
}

impl Default for ScoreRange {
    fn default() -> Self {
        Self {
            min: Points::ZERO,
            max: Points::whole(100),
        }
    }
}

impl ScoreRange {
    pub fn contains(&self, value: Points) -> bool {
        value >= self.min && value <= self.max
    }
}

/// A weighted judging dimension of a solo segment.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct CriterionConfig {
    pub id: CriterionId,

    /// Display name (defaults to the id)
    #[serde(default)]
    pub name: Option<String>,

    /// Non-negative weight; a segment's weights typically sum to 100
    pub weight: Points,
}

/// A weighted judging dimension of a pair segment, scoped to one lane.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct PairCriterionConfig {
    pub id: CriterionId,

    #[serde(default)]
    pub name: Option<String>,

    pub lane: Lane,

    pub weight: Points,
}

/// Segment weights for the overall (composite) ranking.
///
/// Independent of criterion weights. Pair lanes may weight segments
/// differently.
///
/// Example YAML:
/// ```yaml
/// overall:
///   segments:
///     - { segment: talent, weight: 50 }
///     - { segment: gown, weight: 50 }
///   pairs:
///     - { segment: production, lane: male, weight: 40 }
///     - { segment: production, lane: female, weight: 60 }
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct OverallConfig {
    #[serde(default)]
    pub segments: Vec<SegmentWeight>,

    #[serde(default)]
    pub pairs: Vec<PairSegmentWeight>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SegmentWeight {
    pub segment: SegmentId,
    pub weight: Points,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct PairSegmentWeight {
    pub segment: SegmentId,
    pub lane: Lane,
    pub weight: Points,
}

impl OverallConfig {
    /// Segment weights that apply to one ranking: solo when `lane` is None,
    /// otherwise the given pair lane. Configuration order is preserved.
    pub fn weights_for(&self, lane: Option<Lane>) -> Vec<(SegmentId, Points)> {
        match lane {
            None => self
                .segments
                .iter()
                .map(|w| (w.segment.clone(), w.weight))
                .collect(),
            Some(lane) => self
                .pairs
                .iter()
                .filter(|w| w.lane == lane)
                .map(|w| (w.segment.clone(), w.weight))
                .collect(),
        }
    }
}
