use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::Serialize;

use crate::model::{
    CompetitorId, Competitor, CriterionId, EntrantId, JudgeId, Lane, Points, Roster,
    ScoringContext, SegmentId,
};
use crate::scoring::cache::Lookup;
use crate::scoring::{
    aggregate_overall, aggregate_segment, build_leaderboard, judge_score, resolve_overall_weights,
    resolve_weights, Leaderboard, LeaderboardScope, OverallLeaderboard, ResolvedWeights, Scored,
    ScoringError, SegmentCache, SegmentLeaderboard, SegmentResult, SegmentScore,
};
use crate::store::{ScoreKey, ScoreRow, ScoreStore};

/// A judge's score for one criterion of one entrant.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub entrant: EntrantId,
    pub segment: SegmentId,
    pub criterion: CriterionId,
    pub value: Points,
}

/// Raw values behind an entrant's segment score, for audit and edit views.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreCard {
    pub context: ScoringContext,
    pub entrant: EntrantId,
    pub judges: Vec<JudgeCard>,
    pub segment_score: Option<Points>,
    /// Set when the segment's weights are unusable
    pub not_ready: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JudgeCard {
    pub judge: JudgeId,
    pub scores: Vec<CriterionScore>,
    pub weighted: Option<Points>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CriterionScore {
    pub criterion: CriterionId,
    /// `None` when the criterion is not part of the current weights
    pub weight: Option<Points>,
    pub value: Points,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum LaneResult {
    Ranked { rank: usize, score: Points },
    Unscored,
    NotReady { reason: String },
}

/// Both lanes of a pair, side by side. Lanes are ranked independently.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairStanding {
    pub pair: CompetitorId,
    pub male: LaneResult,
    pub female: LaneResult,
}

impl PairStanding {
    pub fn lane(&self, lane: Lane) -> &LaneResult {
        match lane {
            Lane::Male => &self.male,
            Lane::Female => &self.female,
        }
    }
}

/// One (segment, entrant) a judge is expected to score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SheetLine {
    pub context: ScoringContext,
    pub entrant: EntrantId,
    pub criteria_total: usize,
    pub criteria_scored: usize,
    pub score: Option<Points>,
    pub not_ready: Option<String>,
}

impl SheetLine {
    pub fn is_complete(&self) -> bool {
        self.not_ready.is_none() && self.criteria_scored == self.criteria_total
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JudgeSheet {
    pub judge: JudgeId,
    pub name: String,
    pub lines: Vec<SheetLine>,
}

/// Entry point for scoring: validates submissions against the roster and
/// derives leaderboards from the store on every read.
///
/// With `with_cache`, segment outcomes are memoized per (context, entrant)
/// and invalidated by every accepted submission.
pub struct Tabulator<S: ScoreStore> {
    roster: Roster,
    store: S,
    cache: Option<SegmentCache>,
}

impl<S: ScoreStore> Tabulator<S> {
    pub fn new(roster: Roster, store: S) -> Self {
        Self {
            roster,
            store,
            cache: None,
        }
    }

    pub fn with_cache(mut self) -> Self {
        self.cache = Some(SegmentCache::new());
        self
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Record a score from an already-authenticated judge.
    ///
    /// Overwrites the judge's previous value for the same criterion.
    pub fn submit_score(
        &self,
        judge: &JudgeId,
        submission: Submission,
    ) -> Result<(), ScoringError> {
        let key = ScoreKey {
            judge: judge.clone(),
            entrant: submission.entrant,
            segment: submission.segment,
            criterion: submission.criterion,
        };
        self.record(key, submission.value, Utc::now())
    }

    /// Replay a stored row, keeping its original timestamp.
    pub fn restore(&self, row: ScoreRow) -> Result<(), ScoringError> {
        self.record(row.key, row.value, row.submitted_at)
    }

    fn record(
        &self,
        key: ScoreKey,
        value: Points,
        submitted_at: DateTime<Utc>,
    ) -> Result<(), ScoringError> {
        if let Err(e) = self.validate_key(&key) {
            warn!("rejected score from {}: {}", key.judge, e);
            return Err(e);
        }

        let segment = key.segment.clone();
        let entrant = key.entrant.clone();
        let label = format!("{} / {} / {}", key.judge, entrant, key.criterion);

        self.store.upsert(key, value, submitted_at)?;
        if let Some(cache) = &self.cache {
            cache.invalidate(&segment, &entrant);
        }

        info!("score recorded: {} in {} = {}", label, segment, value);
        Ok(())
    }

    fn validate_key(&self, key: &ScoreKey) -> Result<(), ScoringError> {
        if self.roster.judge(&key.judge).is_none() {
            return Err(ScoringError::Validation(format!("unknown judge '{}'", key.judge)));
        }
        let segment = self.roster.segment(&key.segment).ok_or_else(|| {
            ScoringError::Validation(format!("unknown segment '{}'", key.segment))
        })?;
        self.roster
            .resolve_entrant(key.entrant.competitor(), key.entrant.lane())?;

        let criterion = segment.criterion(&key.criterion).ok_or_else(|| {
            ScoringError::Validation(format!(
                "segment '{}' has no criterion '{}'",
                key.segment, key.criterion
            ))
        })?;
        if criterion.lane != key.entrant.lane() {
            let scope = match criterion.lane {
                None => "solo candidates".to_string(),
                Some(lane) => format!("the {} lane of pairs", lane),
            };
            return Err(ScoringError::Validation(format!(
                "criterion '{}' applies to {}, not to {}",
                key.criterion, scope, key.entrant
            )));
        }
        Ok(())
    }

    fn segment_outcome(
        &self,
        weights: &ResolvedWeights,
        entrant: &EntrantId,
    ) -> Result<SegmentScore, ScoringError> {
        let cache = match &self.cache {
            Some(cache) => cache,
            None => return aggregate_segment(&self.store, weights, entrant),
        };

        match cache.lookup(&weights.context, entrant) {
            Lookup::Hit(outcome) => outcome,
            Lookup::Miss(ticket) => {
                let outcome = aggregate_segment(&self.store, weights, entrant);
                cache.store(ticket, &weights.context, entrant, &outcome);
                outcome
            }
        }
    }

    /// Aggregated score of one entrant in one segment.
    pub fn segment_score(
        &self,
        segment: &SegmentId,
        entrant: &EntrantId,
    ) -> Result<SegmentScore, ScoringError> {
        if !self.roster.contains_entrant(entrant) {
            return Err(ScoringError::Validation(format!("unknown entrant '{}'", entrant)));
        }
        let context = ScoringContext::for_entrant(segment.clone(), entrant);
        let weights = resolve_weights(&self.roster, &context)?;
        self.segment_outcome(&weights, entrant)
    }

    /// Ranked entrants of one segment: candidates, or one pair lane.
    ///
    /// Entrants nobody has scored are listed as unscored, outside the ranking.
    pub fn segment_leaderboard(
        &self,
        segment: &SegmentId,
        lane: Option<Lane>,
    ) -> Result<SegmentLeaderboard, ScoringError> {
        let context = ScoringContext {
            segment: segment.clone(),
            lane,
        };
        let weights = resolve_weights(&self.roster, &context)?;

        let outcomes = self
            .roster
            .entrants(lane)
            .into_iter()
            .map(|entrant| {
                let outcome = self.segment_outcome(&weights, &entrant);
                (entrant, outcome)
            })
            .collect();

        build_leaderboard(LeaderboardScope::Segment(context), outcomes)
    }

    /// Composite ranking across the segments of the overall configuration.
    pub fn overall_leaderboard(
        &self,
        lane: Option<Lane>,
    ) -> Result<OverallLeaderboard, ScoringError> {
        let segment_weights = resolve_overall_weights(&self.roster, lane)?;

        // Every configured segment must be usable before anyone is ranked
        let mut resolved = Vec::with_capacity(segment_weights.len());
        for (segment, weight) in segment_weights {
            let context = ScoringContext {
                segment: segment.clone(),
                lane,
            };
            resolved.push((weight, resolve_weights(&self.roster, &context)?));
        }

        let mut outcomes = Vec::new();
        for entrant in self.roster.entrants(lane) {
            let mut segments = Vec::with_capacity(resolved.len());
            for (weight, weights) in &resolved {
                let score = match self.segment_outcome(weights, &entrant) {
                    Ok(s) => Some(s.score),
                    Err(ScoringError::InsufficientData(_)) => None,
                    Err(e) => return Err(e),
                };
                segments.push(SegmentResult {
                    segment: weights.context.segment.clone(),
                    weight: *weight,
                    score,
                });
            }
            let outcome = aggregate_overall(&entrant, segments);
            outcomes.push((entrant, outcome));
        }

        build_leaderboard(LeaderboardScope::Overall(lane), outcomes)
    }

    /// Per-judge, per-criterion raw values for one entrant in one segment.
    pub fn competitor_scores(
        &self,
        entrant: &EntrantId,
        segment: &SegmentId,
    ) -> Result<ScoreCard, ScoringError> {
        if !self.roster.contains_entrant(entrant) {
            return Err(ScoringError::Validation(format!("unknown entrant '{}'", entrant)));
        }
        if self.roster.segment(segment).is_none() {
            return Err(ScoringError::Validation(format!("unknown segment '{}'", segment)));
        }

        let context = ScoringContext::for_entrant(segment.clone(), entrant);
        let (weights, not_ready) = match resolve_weights(&self.roster, &context) {
            Ok(w) => (Some(w), None),
            Err(e) => (None, Some(e.to_string())),
        };

        let rows = self.store.query(segment, entrant);

        let mut judges: Vec<JudgeCard> = Vec::new();
        for row in &rows {
            let weight = weights.as_ref().and_then(|w| w.weight_of(&row.key.criterion));
            let score = CriterionScore {
                criterion: row.key.criterion.clone(),
                weight,
                value: row.value,
                submitted_at: row.submitted_at,
            };
            // Rows arrive ordered by judge
            if judges.last().map_or(true, |card| card.judge != row.key.judge) {
                judges.push(JudgeCard {
                    judge: row.key.judge.clone(),
                    scores: Vec::new(),
                    weighted: None,
                });
            }
            if let Some(card) = judges.last_mut() {
                card.scores.push(score);
            }
        }

        let mut segment_score = None;
        if let Some(weights) = &weights {
            for card in judges.iter_mut() {
                let own: Vec<&ScoreRow> =
                    rows.iter().filter(|r| r.key.judge == card.judge).collect();
                card.weighted = judge_score(weights, &card.judge, &own).map(|c| c.score);
            }
            segment_score = Points::mean(judges.iter().filter_map(|c| c.weighted));
        }

        Ok(ScoreCard {
            context,
            entrant: entrant.clone(),
            judges,
            segment_score,
            not_ready,
        })
    }

    /// Both lanes of every pair in one segment.
    pub fn pair_segment_summary(
        &self,
        segment: &SegmentId,
    ) -> Result<Vec<PairStanding>, ScoringError> {
        if self.roster.segment(segment).is_none() {
            return Err(ScoringError::Validation(format!("unknown segment '{}'", segment)));
        }
        let male = lane_results(self.segment_leaderboard(segment, Some(Lane::Male)))?;
        let female = lane_results(self.segment_leaderboard(segment, Some(Lane::Female)))?;
        Ok(self.pair_standings(male, female))
    }

    /// Both lanes of every pair in the overall ranking.
    pub fn pair_overall_summary(&self) -> Result<Vec<PairStanding>, ScoringError> {
        let male = lane_results(self.overall_leaderboard(Some(Lane::Male)))?;
        let female = lane_results(self.overall_leaderboard(Some(Lane::Female)))?;
        Ok(self.pair_standings(male, female))
    }

    fn pair_standings(&self, male: LaneLookup, female: LaneLookup) -> Vec<PairStanding> {
        self.roster
            .pairs()
            .iter()
            .map(|pair| PairStanding {
                pair: pair.id.clone(),
                male: male.result_for(&pair.id),
                female: female.result_for(&pair.id),
            })
            .collect()
    }

    /// What a judge has been assigned and how far along they are.
    pub fn judge_sheet(&self, judge: &JudgeId) -> Result<JudgeSheet, ScoringError> {
        let known = self
            .roster
            .judge(judge)
            .ok_or_else(|| ScoringError::Validation(format!("unknown judge '{}'", judge)))?;

        let competitors = self.roster.assigned_competitors(judge);
        let mut lines = Vec::new();

        for segment in self.roster.assigned_segments(judge) {
            for competitor in &competitors {
                let entrants = match self.roster.competitor(competitor) {
                    Some(Competitor::Candidate(c)) => vec![EntrantId::Candidate(c.id.clone())],
                    Some(Competitor::Pair(p)) => Lane::ALL
                        .iter()
                        .map(|lane| EntrantId::PairLane(p.id.clone(), *lane))
                        .collect(),
                    None => continue,
                };

                for entrant in entrants {
                    // Segments without criteria for this form do not apply
                    if segment.criteria_for(entrant.lane()).next().is_none() {
                        continue;
                    }
                    let context = ScoringContext::for_entrant(segment.id.clone(), &entrant);
                    lines.push(self.sheet_line(judge, context, entrant));
                }
            }
        }

        Ok(JudgeSheet {
            judge: judge.clone(),
            name: known.name.clone(),
            lines,
        })
    }

    fn sheet_line(
        &self,
        judge: &JudgeId,
        context: ScoringContext,
        entrant: EntrantId,
    ) -> SheetLine {
        let weights = match resolve_weights(&self.roster, &context) {
            Ok(w) => w,
            Err(e) => {
                return SheetLine {
                    context,
                    entrant,
                    criteria_total: 0,
                    criteria_scored: 0,
                    score: None,
                    not_ready: Some(e.to_string()),
                }
            }
        };

        let rows = self.store.query(&context.segment, &entrant);
        let own: Vec<&ScoreRow> = rows.iter().filter(|r| &r.key.judge == judge).collect();
        let criteria_scored = weights
            .criteria
            .iter()
            .filter(|(id, _)| own.iter().any(|r| &r.key.criterion == id))
            .count();

        SheetLine {
            criteria_total: weights.criteria.len(),
            criteria_scored,
            score: judge_score(&weights, judge, &own).map(|c| c.score),
            not_ready: None,
            context,
            entrant,
        }
    }
}

enum LaneLookup {
    Board(Vec<(CompetitorId, LaneResult)>),
    NotReady(String),
}

impl LaneLookup {
    fn result_for(&self, pair: &CompetitorId) -> LaneResult {
        match self {
            LaneLookup::NotReady(reason) => LaneResult::NotReady {
                reason: reason.clone(),
            },
            LaneLookup::Board(results) => results
                .iter()
                .find(|(id, _)| id == pair)
                .map(|(_, result)| result.clone())
                .unwrap_or(LaneResult::Unscored),
        }
    }
}

fn lane_results<T: Scored>(
    board: Result<Leaderboard<T>, ScoringError>,
) -> Result<LaneLookup, ScoringError> {
    match board {
        Ok(board) => Ok(LaneLookup::Board(
            board
                .standings
                .iter()
                .map(|s| {
                    (
                        s.entry.entrant().competitor().clone(),
                        LaneResult::Ranked {
                            rank: s.rank,
                            score: s.entry.score(),
                        },
                    )
                })
                .collect(),
        )),
        Err(ScoringError::Configuration(reason)) => Ok(LaneLookup::NotReady(reason)),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::model::roster::tests::sample_config;
    use crate::store::InMemoryScoreStore;

    fn tabulator(config: &Config, cached: bool) -> Tabulator<InMemoryScoreStore> {
        let roster = Roster::from_config(config);
        let store = InMemoryScoreStore::new(roster.score_range());
        let t = Tabulator::new(roster, store);
        if cached {
            t.with_cache()
        } else {
            t
        }
    }

    /// Naive and cached variants must behave identically
    fn both() -> Vec<Tabulator<InMemoryScoreStore>> {
        let config = sample_config();
        vec![tabulator(&config, false), tabulator(&config, true)]
    }

    fn candidate(id: &str) -> EntrantId {
        EntrantId::Candidate(CompetitorId::from(id))
    }

    fn lane(id: &str, lane: Lane) -> EntrantId {
        EntrantId::PairLane(CompetitorId::from(id), lane)
    }

    fn submit(
        t: &Tabulator<InMemoryScoreStore>,
        judge: &str,
        entrant: &EntrantId,
        segment: &str,
        criterion: &str,
        value: &str,
    ) -> Result<(), ScoringError> {
        t.submit_score(
            &JudgeId::from(judge),
            Submission {
                entrant: entrant.clone(),
                segment: segment.into(),
                criterion: criterion.into(),
                value: value.parse().unwrap(),
            },
        )
    }

    fn score_a_in_s(t: &Tabulator<InMemoryScoreStore>) {
        let a = candidate("a");
        submit(t, "j1", &a, "s", "c1", "80").unwrap();
        submit(t, "j1", &a, "s", "c2", "90").unwrap();
        submit(t, "j2", &a, "s", "c1", "70").unwrap();
        submit(t, "j2", &a, "s", "c2", "70").unwrap();
    }

    #[test]
    fn test_resubmission_keeps_latest_value() {
        for t in both() {
            let a = candidate("a");
            submit(&t, "j1", &a, "s", "c1", "60").unwrap();
            submit(&t, "j1", &a, "s", "c1", "95.5").unwrap();

            let rows = t.store().query(&"s".into(), &a);
            assert_eq!(rows.len(), 1);
            assert_eq!(rows[0].value, "95.5".parse().unwrap());
        }
    }

    #[test]
    fn test_segment_scenario() {
        for t in both() {
            score_a_in_s(&t);
            let board = t.segment_leaderboard(&"s".into(), None).unwrap();
            let top = &board.standings[0];
            assert_eq!(top.rank, 1);
            assert_eq!(top.entry.entrant, candidate("a"));
            assert_eq!(top.entry.score.to_string(), "77.00");
        }
    }

    #[test]
    fn test_unscored_candidate_is_flagged_not_ranked() {
        for t in both() {
            score_a_in_s(&t);
            let board = t.segment_leaderboard(&"s".into(), None).unwrap();
            assert_eq!(board.standings.len(), 1);
            assert_eq!(board.rank_of(&candidate("b")), None);
            assert!(board.is_unscored(&candidate("b")));
        }
    }

    #[test]
    fn test_overall_scenario() {
        for t in both() {
            score_a_in_s(&t);
            submit(&t, "j1", &candidate("a"), "t", "c1", "90").unwrap();

            let board = t.overall_leaderboard(None).unwrap();
            let a = board.standing_of(&candidate("a")).unwrap();
            assert_eq!(a.rank, 1);
            assert_eq!(a.entry.score.to_string(), "83.50");
            assert!(board.is_unscored(&candidate("b")));
        }
    }

    #[test]
    fn test_overall_skips_unscored_segment() {
        for t in both() {
            // b only scored in t
            submit(&t, "j1", &candidate("b"), "t", "c1", "64").unwrap();
            let board = t.overall_leaderboard(None).unwrap();
            let b = board.standing_of(&candidate("b")).unwrap();
            assert_eq!(b.entry.score, Points::whole(64));
            assert_eq!(b.entry.segments[0].score, None);
        }
    }

    #[test]
    fn test_ties_share_rank() {
        for t in both() {
            submit(&t, "j1", &candidate("a"), "t", "c1", "88.8").unwrap();
            submit(&t, "j1", &candidate("b"), "t", "c1", "88.80").unwrap();
            let board = t.segment_leaderboard(&"t".into(), None).unwrap();
            assert_eq!(board.standings[0].rank, 1);
            assert_eq!(board.standings[1].rank, 1);
        }
    }

    #[test]
    fn test_reads_observe_writes() {
        for t in both() {
            let a = candidate("a");
            submit(&t, "j1", &a, "t", "c1", "50").unwrap();
            let before = t.segment_score(&"t".into(), &a).unwrap();
            submit(&t, "j1", &a, "t", "c1", "75").unwrap();
            let after = t.segment_score(&"t".into(), &a).unwrap();
            assert_eq!(before.score, Points::whole(50));
            assert_eq!(after.score, Points::whole(75));
        }
    }

    #[test]
    fn test_unscored_then_scored_is_picked_up() {
        for t in both() {
            let a = candidate("a");
            assert!(t.segment_score(&"t".into(), &a).unwrap_err().is_insufficient_data());
            submit(&t, "j1", &a, "t", "c1", "42").unwrap();
            assert_eq!(t.segment_score(&"t".into(), &a).unwrap().score, Points::whole(42));
        }
    }

    #[test]
    fn test_rejected_submissions_store_nothing() {
        for t in both() {
            let a = candidate("a");
            let cases = [
                submit(&t, "ghost", &a, "s", "c1", "50"),
                submit(&t, "j1", &a, "nope", "c1", "50"),
                submit(&t, "j1", &a, "s", "zz", "50"),
                submit(&t, "j1", &candidate("zz"), "s", "c1", "50"),
                submit(&t, "j1", &a, "s", "c1", "100.01"),
                submit(&t, "j1", &a, "s", "m1", "50"),
                submit(&t, "j1", &lane("p1", Lane::Male), "s", "f1", "50"),
                submit(&t, "j1", &lane("a", Lane::Male), "s", "m1", "50"),
            ];
            for result in cases {
                assert!(matches!(result, Err(ScoringError::Validation(_))), "{:?}", result);
            }
            assert!(t.store().is_empty());
        }
    }

    #[test]
    fn test_pair_lanes_never_interact() {
        for t in both() {
            let male = lane("p1", Lane::Male);
            let female = lane("p1", Lane::Female);
            submit(&t, "j1", &female, "s", "f1", "80").unwrap();
            submit(&t, "j1", &female, "s", "f2", "70").unwrap();
            submit(&t, "j1", &male, "s", "m1", "60").unwrap();

            let female_before = t.segment_leaderboard(&"s".into(), Some(Lane::Female)).unwrap();
            let overall_before = t.overall_leaderboard(Some(Lane::Female)).unwrap();

            submit(&t, "j1", &male, "s", "m1", "99").unwrap();
            submit(&t, "j2", &male, "s", "m1", "10").unwrap();

            let female_after = t.segment_leaderboard(&"s".into(), Some(Lane::Female)).unwrap();
            let overall_after = t.overall_leaderboard(Some(Lane::Female)).unwrap();
            assert_eq!(female_before, female_after);
            assert_eq!(overall_before, overall_after);
            assert_eq!(female_after.standings[0].entry.score, Points::whole(77));

            let male_board = t.segment_leaderboard(&"s".into(), Some(Lane::Male)).unwrap();
            // mean(99, 10) = 54.5
            assert_eq!(male_board.standings[0].entry.score, "54.5".parse().unwrap());
        }
    }

    #[test]
    fn test_pair_summary_reports_both_lanes() {
        for t in both() {
            submit(&t, "j1", &lane("p1", Lane::Male), "s", "m1", "88").unwrap();
            let summary = t.pair_segment_summary(&"s".into()).unwrap();
            assert_eq!(summary.len(), 1);
            assert_eq!(
                summary[0].male,
                LaneResult::Ranked {
                    rank: 1,
                    score: Points::whole(88)
                }
            );
            assert_eq!(summary[0].female, LaneResult::Unscored);

            let overall = t.pair_overall_summary().unwrap();
            assert_eq!(overall[0].lane(Lane::Male), &summary[0].male);
        }
    }

    #[test]
    fn test_pair_summary_lane_not_ready() {
        let t = tabulator(&sample_config(), false);
        // Segment t has no pair criteria at all
        let summary = t.pair_segment_summary(&"t".into()).unwrap();
        assert!(matches!(summary[0].male, LaneResult::NotReady { .. }));
        assert!(matches!(summary[0].female, LaneResult::NotReady { .. }));
    }

    #[test]
    fn test_zero_weight_segment_is_configuration_error() {
        let config: Config = serde_saphyr::from_str(
            r#"
name: Broken
candidates:
  - { id: a, name: A }
judges:
  - { id: j1, name: J }
segments:
  - id: s
    name: S
    criteria:
      - { id: c1, weight: 0 }
overall:
  segments:
    - { segment: s, weight: 100 }
"#,
        )
        .unwrap();
        for cached in [false, true] {
            let t = tabulator(&config, cached);
            // Scores can still be recorded, but nothing can be ranked
            submit(&t, "j1", &candidate("a"), "s", "c1", "50").unwrap();
            assert!(matches!(
                t.segment_leaderboard(&"s".into(), None),
                Err(ScoringError::Configuration(_))
            ));
            assert!(matches!(
                t.overall_leaderboard(None),
                Err(ScoringError::Configuration(_))
            ));
        }
    }

    #[test]
    fn test_competitor_scores_audit_view() {
        for t in both() {
            score_a_in_s(&t);
            let card = t.competitor_scores(&candidate("a"), &"s".into()).unwrap();
            assert_eq!(card.judges.len(), 2);
            assert_eq!(card.judges[0].judge, JudgeId::from("j1"));
            assert_eq!(card.judges[0].scores.len(), 2);
            assert_eq!(card.judges[0].scores[0].weight, Some(Points::whole(60)));
            assert_eq!(card.judges[0].weighted, Some(Points::whole(84)));
            assert_eq!(card.judges[1].weighted, Some(Points::whole(70)));
            assert_eq!(card.segment_score, Some(Points::whole(77)));
            assert!(card.not_ready.is_none());
        }
    }

    #[test]
    fn test_competitor_scores_unknown_entrant() {
        let t = tabulator(&sample_config(), false);
        assert!(matches!(
            t.competitor_scores(&candidate("zz"), &"s".into()),
            Err(ScoringError::Validation(_))
        ));
    }

    #[test]
    fn test_judge_sheet_progress() {
        for t in both() {
            let a = candidate("a");
            submit(&t, "j1", &a, "s", "c1", "80").unwrap();

            let sheet = t.judge_sheet(&JudgeId::from("j1")).unwrap();
            assert_eq!(sheet.name, "One");
            // s: a, b, p1 male, p1 female; t: a, b (no pair criteria in t)
            assert_eq!(sheet.lines.len(), 6);

            let line = sheet
                .lines
                .iter()
                .find(|l| l.entrant == a && l.context.segment == SegmentId::from("s"))
                .unwrap();
            assert_eq!(line.criteria_total, 2);
            assert_eq!(line.criteria_scored, 1);
            assert_eq!(line.score, Some(Points::whole(80)));
            assert!(!line.is_complete());

            let j2 = t.judge_sheet(&JudgeId::from("j2")).unwrap();
            assert_eq!(j2.lines.len(), 1);
            assert!(t.judge_sheet(&JudgeId::from("ghost")).is_err());
        }
    }

    #[test]
    fn test_restore_keeps_timestamp() {
        let source = tabulator(&sample_config(), false);
        score_a_in_s(&source);
        let rows = source.store().rows();

        let target = tabulator(&sample_config(), true);
        for row in rows.clone() {
            target.restore(row).unwrap();
        }
        assert_eq!(target.store().rows(), rows);
        assert_eq!(
            target.segment_score(&"s".into(), &candidate("a")).unwrap().score,
            Points::whole(77)
        );
    }

    #[test]
    fn test_concurrent_judges() {
        for t in both() {
            std::thread::scope(|scope| {
                for judge in ["j1", "j2"] {
                    let t = &t;
                    scope.spawn(move || {
                        for who in ["a", "b"] {
                            submit(t, judge, &candidate(who), "s", "c1", "80").unwrap();
                            submit(t, judge, &candidate(who), "s", "c2", "90").unwrap();
                            // Interleave reads with writes
                            let _ = t.segment_leaderboard(&"s".into(), None);
                        }
                    });
                }
            });

            let board = t.segment_leaderboard(&"s".into(), None).unwrap();
            assert_eq!(board.standings.len(), 2);
            assert!(board.standings.iter().all(|s| s.rank == 1));
            assert!(board
                .standings
                .iter()
                .all(|s| s.entry.score == Points::whole(84)));
        }
    }
}
