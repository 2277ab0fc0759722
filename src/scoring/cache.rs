use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::model::{EntrantId, ScoringContext, SegmentId};

use super::engine::SegmentScore;
use super::error::ScoringError;

type Outcome = Result<SegmentScore, ScoringError>;

/// Memoized segment outcomes keyed by (context, entrant).
///
/// Writers bump an epoch when they invalidate. A reader only stores a result
/// if no invalidation happened since it started computing, so a result
/// derived from pre-write rows never outlives the write.
#[derive(Default)]
pub struct SegmentCache {
    inner: Mutex<CacheData>,
}

#[derive(Default)]
struct CacheData {
    epoch: u64,
    entries: HashMap<(ScoringContext, EntrantId), Outcome>,
}

/// Token returned by a cache miss; hand it back to `store`.
#[derive(Debug, Clone, Copy)]
pub struct MissTicket {
    epoch: u64,
}

pub enum Lookup {
    Hit(Outcome),
    Miss(MissTicket),
}

impl SegmentCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, CacheData> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn lookup(&self, context: &ScoringContext, entrant: &EntrantId) -> Lookup {
        let data = self.lock();
        match data.entries.get(&(context.clone(), entrant.clone())) {
            Some(outcome) => Lookup::Hit(outcome.clone()),
            None => Lookup::Miss(MissTicket { epoch: data.epoch }),
        }
    }

    /// Store a computed outcome unless the cache was invalidated since the miss.
    /// Configuration errors are never cached.
    pub fn store(
        &self,
        ticket: MissTicket,
        context: &ScoringContext,
        entrant: &EntrantId,
        outcome: &Outcome,
    ) {
        if matches!(
            outcome,
            Err(ScoringError::Configuration(_)) | Err(ScoringError::Validation(_))
        ) {
            return;
        }
        let mut data = self.lock();
        if data.epoch == ticket.epoch {
            data.entries
                .insert((context.clone(), entrant.clone()), outcome.clone());
        }
    }

    /// Drop the cached outcome of an entrant in a segment.
    pub fn invalidate(&self, segment: &SegmentId, entrant: &EntrantId) {
        let mut data = self.lock();
        data.epoch += 1;
        data.entries
            .retain(|(context, cached), _| !(&context.segment == segment && cached == entrant));
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
