use chrono::{DateTime, Utc};
use log::debug;
use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::model::{CriterionId, EntrantId, JudgeId, Points, SegmentId};
use crate::scoring::{ScoreRange, ScoringError};

use super::{ScoreKey, ScoreRow, ScoreStore};

type Cells = BTreeMap<(JudgeId, CriterionId), (Points, DateTime<Utc>)>;

/// Score store held in memory, indexed by (segment, entrant).
///
/// One `RwLock` guards the whole index: an upsert is a single write-locked
/// insert and a query copies one bucket under a read lock.
pub struct InMemoryScoreStore {
    range: ScoreRange,
    buckets: RwLock<HashMap<(SegmentId, EntrantId), Cells>>,
}

impl InMemoryScoreStore {
    pub fn new(range: ScoreRange) -> Self {
        Self {
            range,
            buckets: RwLock::new(HashMap::new()),
        }
    }

    pub fn range(&self) -> ScoreRange {
        self.range
    }

    pub fn len(&self) -> usize {
        self.read().values().map(|cells| cells.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // A panic while holding the lock cannot leave a half-written cell behind
    // (each mutation is one map insert), so a poisoned lock is still usable.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<(SegmentId, EntrantId), Cells>> {
        self.buckets.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<(SegmentId, EntrantId), Cells>> {
        self.buckets.write().unwrap_or_else(|e| e.into_inner())
    }
}

fn to_row(
    segment: &SegmentId,
    entrant: &EntrantId,
    judge: &JudgeId,
    criterion: &CriterionId,
    value: Points,
    submitted_at: DateTime<Utc>,
) -> ScoreRow {
    ScoreRow {
        key: ScoreKey {
            judge: judge.clone(),
            entrant: entrant.clone(),
            segment: segment.clone(),
            criterion: criterion.clone(),
        },
        value,
        submitted_at,
    }
}

impl ScoreStore for InMemoryScoreStore {
    fn upsert(
        &self,
        key: ScoreKey,
        value: Points,
        submitted_at: DateTime<Utc>,
    ) -> Result<(), ScoringError> {
        if !self.range.contains(value) {
            return Err(ScoringError::Validation(format!(
                "score {} is outside the allowed range {}..={}",
                value, self.range.min, self.range.max
            )));
        }

        let ScoreKey {
            judge,
            entrant,
            segment,
            criterion,
        } = key;
        let previous = self
            .write()
            .entry((segment, entrant))
            .or_default()
            .insert((judge, criterion), (value, submitted_at));

        if let Some((old, _)) = previous {
            debug!("score overwritten: {} -> {}", old, value);
        }
        Ok(())
    }

    fn query(&self, segment: &SegmentId, entrant: &EntrantId) -> Vec<ScoreRow> {
        let buckets = self.read();
        match buckets.get(&(segment.clone(), entrant.clone())) {
            Some(cells) => cells
                .iter()
                .map(|((judge, criterion), (value, at))| {
                    to_row(segment, entrant, judge, criterion, *value, *at)
                })
                .collect(),
            None => Vec::new(),
        }
    }

    fn rows(&self) -> Vec<ScoreRow> {
        let buckets = self.read();
        let mut rows: Vec<ScoreRow> = buckets
            .iter()
            .flat_map(|((segment, entrant), cells)| {
                cells.iter().map(move |((judge, criterion), (value, at))| {
                    to_row(segment, entrant, judge, criterion, *value, *at)
                })
            })
            .collect();
        rows.sort_by(|a, b| a.key.cmp(&b.key));
        rows
    }
}
