use log::debug;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::model::{CriterionId, EntrantId, JudgeId, Points, ScoringContext, SegmentId};
use crate::store::{ScoreRow, ScoreStore};

use super::error::ScoringError;
use super::weights::ResolvedWeights;

/// One judge's weighted score for an entrant in a segment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JudgeContribution {
    pub judge: JudgeId,
    /// Criteria the judge actually scored, with the raw values
    pub scored: Vec<(CriterionId, Points)>,
    /// Sum of the weights of `scored`
    pub weight: Points,
    pub score: Points,
}

/// Aggregated score of one entrant in one scoring context.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentScore {
    pub context: ScoringContext,
    pub entrant: EntrantId,
    pub score: Points,
    pub judges: Vec<JudgeContribution>,
}

/// Weighted average of one judge's rows.
///
/// Criteria the judge skipped are left out of both sums. Returns `None` when
/// nothing the judge scored carries weight.
pub fn judge_score(
    weights: &ResolvedWeights,
    judge: &JudgeId,
    rows: &[&ScoreRow],
) -> Option<JudgeContribution> {
    let mut scored = Vec::new();
    let mut weighted = Vec::new();
    // Weight order keeps the breakdown in configured criterion order
    for (criterion, weight) in &weights.criteria {
        if let Some(row) = rows.iter().find(|r| &r.key.criterion == criterion) {
            scored.push((criterion.clone(), row.value));
            weighted.push((*weight, row.value));
        }
    }

    let weight = weighted
        .iter()
        .fold(Points::ZERO, |acc, (w, _)| acc.checked_add(*w).unwrap_or(acc));
    let score = Points::weighted_mean(weighted)?;

    Some(JudgeContribution {
        judge: judge.clone(),
        scored,
        weight,
        score,
    })
}

/// Combine every judge's scores for one entrant into a segment score.
///
/// The segment score is the mean of the per-judge weighted averages, over
/// judges that contributed at least one weighted criterion. Fails with
/// `InsufficientData` when no judge did.
pub fn aggregate_segment(
    store: &dyn ScoreStore,
    weights: &ResolvedWeights,
    entrant: &EntrantId,
) -> Result<SegmentScore, ScoringError> {
    let context = &weights.context;
    let rows = store.query(&context.segment, entrant);
    aggregate_rows(weights, entrant, &rows)
}

/// Same as `aggregate_segment`, over rows that were already read.
pub fn aggregate_rows(
    weights: &ResolvedWeights,
    entrant: &EntrantId,
    rows: &[ScoreRow],
) -> Result<SegmentScore, ScoringError> {
    let context = &weights.context;

    let mut by_judge: BTreeMap<&JudgeId, Vec<&ScoreRow>> = BTreeMap::new();
    for row in rows {
        if &row.key.entrant == entrant && row.key.segment == context.segment {
            by_judge.entry(&row.key.judge).or_default().push(row);
        }
    }

    let judges: Vec<JudgeContribution> = by_judge
        .into_iter()
        .filter_map(|(judge, rows)| judge_score(weights, judge, &rows))
        .collect();

    let score = Points::mean(judges.iter().map(|j| j.score)).ok_or_else(|| {
        ScoringError::InsufficientData(format!("{} in {}", entrant, context))
    })?;

    debug!(
        "segment score {} for {} in {} from {} judge(s)",
        score,
        entrant,
        context,
        judges.len()
    );

    Ok(SegmentScore {
        context: context.clone(),
        entrant: entrant.clone(),
        score,
        judges,
    })
}

/// A segment's place in a composite: its overall weight and the entrant's
/// score there, if any.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentResult {
    pub segment: SegmentId,
    pub weight: Points,
    pub score: Option<Points>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompositeScore {
    pub entrant: EntrantId,
    pub score: Points,
    pub segments: Vec<SegmentResult>,
}

/// Blend segment scores with the overall segment weights.
///
/// Segments without a score are left out of both sums. Fails with
/// `InsufficientData` when no weighted segment has a score.
pub fn aggregate_overall(
    entrant: &EntrantId,
    segments: Vec<SegmentResult>,
) -> Result<CompositeScore, ScoringError> {
    let weighted = segments
        .iter()
        .filter_map(|s| s.score.map(|score| (s.weight, score)));

    let score = Points::weighted_mean(weighted).ok_or_else(|| {
        ScoringError::InsufficientData(format!("{} has no scored segments", entrant))
    })?;

    Ok(CompositeScore {
        entrant: entrant.clone(),
        score,
        segments,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CompetitorId, Lane, Roster};
    use crate::model::roster::tests::sample_config;
    use crate::scoring::{resolve_weights, ScoreRange};
    use crate::store::{InMemoryScoreStore, ScoreKey};
    use chrono::Utc;

    fn candidate(id: &str) -> EntrantId {
        EntrantId::Candidate(CompetitorId::from(id))
    }

    fn put(
        store: &InMemoryScoreStore,
        judge: &str,
        entrant: &EntrantId,
        segment: &str,
        criterion: &str,
        value: i64,
    ) {
        store
            .upsert(
                ScoreKey {
                    judge: judge.into(),
                    entrant: entrant.clone(),
                    segment: segment.into(),
                    criterion: criterion.into(),
                },
                Points::whole(value),
                Utc::now(),
            )
            .unwrap();
    }

    fn solo_weights(segment: &str) -> ResolvedWeights {
        let roster = Roster::from_config(&sample_config());
        resolve_weights(&roster, &ScoringContext::solo(segment.into())).unwrap()
    }

    #[test]
    fn test_two_judge_scenario() {
        let store = InMemoryScoreStore::new(ScoreRange::default());
        let a = candidate("a");
        put(&store, "j1", &a, "s", "c1", 80);
        put(&store, "j1", &a, "s", "c2", 90);
        put(&store, "j2", &a, "s", "c1", 70);
        put(&store, "j2", &a, "s", "c2", 70);

        let result = aggregate_segment(&store, &solo_weights("s"), &a).unwrap();
        assert_eq!(result.judges[0].score, Points::whole(84));
        assert_eq!(result.judges[1].score, Points::whole(70));
        assert_eq!(result.score, Points::whole(77));
    }

    #[test]
    fn test_skipped_criterion_is_excluded() {
        let store = InMemoryScoreStore::new(ScoreRange::default());
        let a = candidate("a");
        // j1 only scored c2 (weight 40): 40*90/40 = 90, not 40*90/100 = 36
        put(&store, "j1", &a, "s", "c2", 90);

        let result = aggregate_segment(&store, &solo_weights("s"), &a).unwrap();
        assert_eq!(result.score, Points::whole(90));
        assert_eq!(result.judges[0].weight, Points::whole(40));
        assert_eq!(result.judges[0].scored.len(), 1);
    }

    #[test]
    fn test_no_scores_is_insufficient_data() {
        let store = InMemoryScoreStore::new(ScoreRange::default());
        let err = aggregate_segment(&store, &solo_weights("s"), &candidate("b")).unwrap_err();
        assert!(err.is_insufficient_data());
    }

    #[test]
    fn test_rows_for_unknown_criteria_are_ignored() {
        let store = InMemoryScoreStore::new(ScoreRange::default());
        let a = candidate("a");
        put(&store, "j1", &a, "t", "c2", 50); // c2 is not a criterion of t
        let err = aggregate_segment(&store, &solo_weights("t"), &a).unwrap_err();
        assert!(err.is_insufficient_data());
    }

    #[test]
    fn test_rescaled_weights_give_same_score() {
        let a = candidate("a");
        let rows: Vec<ScoreRow> = [("j1", "c1", 83), ("j1", "c2", 71), ("j2", "c1", 66)]
            .iter()
            .map(|(j, c, v)| ScoreRow {
                key: ScoreKey {
                    judge: (*j).into(),
                    entrant: a.clone(),
                    segment: "s".into(),
                    criterion: (*c).into(),
                },
                value: Points::whole(*v),
                submitted_at: Utc::now(),
            })
            .collect();

        let base = solo_weights("s");
        for factor in [1, 3, 7, 250] {
            let mut scaled = base.clone();
            for (_, w) in scaled.criteria.iter_mut() {
                *w = Points::from_hundredths(w.hundredths() * factor);
            }
            let original = aggregate_rows(&base, &a, &rows).unwrap();
            let rescaled = aggregate_rows(&scaled, &a, &rows).unwrap();
            assert_eq!(original.score, rescaled.score, "factor {}", factor);
        }

        // Fractional rescale: 60/40 -> 0.6/0.4
        let mut fractional = base.clone();
        fractional.criteria = vec![
            ("c1".into(), Points::from_hundredths(60)),
            ("c2".into(), Points::from_hundredths(40)),
        ];
        assert_eq!(
            aggregate_rows(&base, &a, &rows).unwrap().score,
            aggregate_rows(&fractional, &a, &rows).unwrap().score
        );
    }

    #[test]
    fn test_lane_rows_do_not_leak() {
        let store = InMemoryScoreStore::new(ScoreRange::default());
        let roster = Roster::from_config(&sample_config());
        let male = EntrantId::PairLane(CompetitorId::from("p1"), Lane::Male);
        let female = EntrantId::PairLane(CompetitorId::from("p1"), Lane::Female);
        put(&store, "j1", &male, "s", "m1", 95);
        put(&store, "j1", &female, "s", "f1", 80);
        put(&store, "j1", &female, "s", "f2", 70);

        let female_weights =
            resolve_weights(&roster, &ScoringContext::pair("s".into(), Lane::Female)).unwrap();
        let result = aggregate_segment(&store, &female_weights, &female).unwrap();
        // (70*80 + 30*70) / 100 = 77
        assert_eq!(result.score, Points::whole(77));
    }

    #[test]
    fn test_overall_scenario() {
        let a = candidate("a");
        let composite = aggregate_overall(
            &a,
            vec![
                SegmentResult {
                    segment: "s".into(),
                    weight: Points::whole(50),
                    score: Some(Points::whole(77)),
                },
                SegmentResult {
                    segment: "t".into(),
                    weight: Points::whole(50),
                    score: Some(Points::whole(90)),
                },
            ],
        )
        .unwrap();
        assert_eq!(composite.score, Points::from_hundredths(8350));
    }

    #[test]
    fn test_overall_excludes_unscored_segments() {
        let a = candidate("a");
        let composite = aggregate_overall(
            &a,
            vec![
                SegmentResult {
                    segment: "s".into(),
                    weight: Points::whole(30),
                    score: Some(Points::whole(80)),
                },
                SegmentResult {
                    segment: "t".into(),
                    weight: Points::whole(70),
                    score: None,
                },
            ],
        )
        .unwrap();
        assert_eq!(composite.score, Points::whole(80));
    }

    #[test]
    fn test_overall_without_scores() {
        let err = aggregate_overall(
            &candidate("a"),
            vec![SegmentResult {
                segment: "s".into(),
                weight: Points::whole(100),
                score: None,
            }],
        )
        .unwrap_err();
        assert!(err.is_insufficient_data());
    }
}
