use log::warn;
use serde::Serialize;
use std::fmt;

use crate::model::{EntrantId, Lane, Points, ScoringContext};

use super::engine::{CompositeScore, SegmentScore};
use super::error::ScoringError;

/// Anything that can be placed on a leaderboard.
pub trait Scored {
    fn entrant(&self) -> &EntrantId;
    fn score(&self) -> Points;

    /// Whether the score was computed from only part of its inputs
    fn incomplete(&self) -> bool {
        false
    }
}

impl Scored for SegmentScore {
    fn entrant(&self) -> &EntrantId {
        &self.entrant
    }

    fn score(&self) -> Points {
        self.score
    }
}

impl Scored for CompositeScore {
    fn entrant(&self) -> &EntrantId {
        &self.entrant
    }

    fn score(&self) -> Points {
        self.score
    }

    fn incomplete(&self) -> bool {
        self.segments.iter().any(|s| s.score.is_none())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Standing<T> {
    pub rank: usize,
    #[serde(flatten)]
    pub entry: T,
}

/// An entrant left out of the ranking because nothing has been scored yet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Unscored {
    pub entrant: EntrantId,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaderboardScope {
    Segment(ScoringContext),
    Overall(Option<Lane>),
}

impl fmt::Display for LeaderboardScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LeaderboardScope::Segment(context) => write!(f, "Segment {}", context),
            LeaderboardScope::Overall(None) => write!(f, "Overall"),
            LeaderboardScope::Overall(Some(lane)) => write!(f, "Overall ({})", lane),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Leaderboard<T> {
    pub scope: LeaderboardScope,
    pub standings: Vec<Standing<T>>,
    pub unscored: Vec<Unscored>,
}

pub type SegmentLeaderboard = Leaderboard<SegmentScore>;
pub type OverallLeaderboard = Leaderboard<CompositeScore>;

impl<T: Scored> Leaderboard<T> {
    /// Rank of an entrant, if it was ranked
    pub fn rank_of(&self, entrant: &EntrantId) -> Option<usize> {
        self.standings
            .iter()
            .find(|s| s.entry.entrant() == entrant)
            .map(|s| s.rank)
    }

    pub fn standing_of(&self, entrant: &EntrantId) -> Option<&Standing<T>> {
        self.standings.iter().find(|s| s.entry.entrant() == entrant)
    }

    pub fn is_unscored(&self, entrant: &EntrantId) -> bool {
        self.unscored.iter().any(|u| &u.entrant == entrant)
    }
}

/// Order entries by score descending and assign standard competition ranks.
///
/// Equal scores share a rank and the next distinct score ranks at its
/// position (1, 1, 3, 4). Ties are ordered by entrant id so the output does
/// not depend on input order.
pub fn assign_ranks<T: Scored>(mut entries: Vec<T>) -> Vec<Standing<T>> {
    entries.sort_by(|a, b| {
        b.score()
            .cmp(&a.score())
            .then_with(|| a.entrant().cmp(b.entrant()))
    });

    let mut standings: Vec<Standing<T>> = Vec::with_capacity(entries.len());
    for (position, entry) in entries.into_iter().enumerate() {
        let rank = match standings.last() {
            Some(prev) if prev.entry.score() == entry.score() => prev.rank,
            _ => position + 1,
        };
        standings.push(Standing { rank, entry });
    }
    standings
}

/// Split aggregation outcomes into ranked standings and unscored entrants.
///
/// `InsufficientData` marks the entrant unscored; any other error aborts the
/// whole leaderboard.
pub fn build_leaderboard<T: Scored>(
    scope: LeaderboardScope,
    outcomes: Vec<(EntrantId, Result<T, ScoringError>)>,
) -> Result<Leaderboard<T>, ScoringError> {
    let mut scored = Vec::new();
    let mut unscored = Vec::new();

    for (entrant, outcome) in outcomes {
        match outcome {
            Ok(entry) => scored.push(entry),
            Err(ScoringError::InsufficientData(reason)) => {
                warn!("{}: {} is unscored", scope, entrant);
                unscored.push(Unscored { entrant, reason });
            }
            Err(e) => return Err(e),
        }
    }

    unscored.sort_by(|a, b| a.entrant.cmp(&b.entrant));

    Ok(Leaderboard {
        scope,
        standings: assign_ranks(scored),
        unscored,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CompetitorId;

    #[derive(Debug, Clone, PartialEq)]
    struct Entry(EntrantId, Points);

    impl Scored for Entry {
        fn entrant(&self) -> &EntrantId {
            &self.0
        }

        fn score(&self) -> Points {
            self.1
        }
    }

    fn entry(id: &str, hundredths: i64) -> Entry {
        Entry(
            EntrantId::Candidate(CompetitorId::from(id)),
            Points::from_hundredths(hundredths),
        )
    }

    fn ranks(standings: &[Standing<Entry>]) -> Vec<(String, usize)> {
        standings
            .iter()
            .map(|s| (s.entry.0.to_string(), s.rank))
            .collect()
    }

    #[test]
    fn test_descending_order() {
        let standings = assign_ranks(vec![entry("a", 7000), entry("b", 9000), entry("c", 8000)]);
        assert_eq!(
            ranks(&standings),
            vec![("b".into(), 1), ("c".into(), 2), ("a".into(), 3)]
        );
    }

    #[test]
    fn test_competition_ranking_ties() {
        let standings = assign_ranks(vec![
            entry("d", 7000),
            entry("b", 9000),
            entry("a", 9000),
            entry("c", 8000),
            entry("e", 7000),
        ]);
        assert_eq!(
            ranks(&standings),
            vec![
                ("a".into(), 1),
                ("b".into(), 1),
                ("c".into(), 3),
                ("d".into(), 4),
                ("e".into(), 4),
            ]
        );
    }

    #[test]
    fn test_rank_equals_count_strictly_above_plus_one() {
        let input = vec![
            entry("a", 9050),
            entry("b", 9050),
            entry("c", 9050),
            entry("d", 9049),
            entry("e", 100),
        ];
        let standings = assign_ranks(input);
        for standing in &standings {
            let above = standings
                .iter()
                .filter(|o| o.entry.1 > standing.entry.1)
                .count();
            assert_eq!(standing.rank, above + 1);
        }
    }

    #[test]
    fn test_one_hundredth_apart_is_not_a_tie() {
        let standings = assign_ranks(vec![entry("a", 8000), entry("b", 8001)]);
        assert_eq!(ranks(&standings), vec![("b".into(), 1), ("a".into(), 2)]);
    }

    #[test]
    fn test_ranking_is_idempotent() {
        let input = vec![entry("c", 5000), entry("a", 5000), entry("b", 6000)];
        let first = assign_ranks(input.clone());
        let mut reversed = input;
        reversed.reverse();
        let second = assign_ranks(reversed);
        let again = assign_ranks(first.iter().map(|s| s.entry.clone()).collect());
        assert_eq!(first, second);
        assert_eq!(first, again);
    }

    #[test]
    fn test_build_leaderboard_flags_unscored() {
        let outcomes = vec![
            (
                EntrantId::Candidate("a".into()),
                Ok(entry("a", 7700)),
            ),
            (
                EntrantId::Candidate("b".into()),
                Err(ScoringError::InsufficientData("b in s".into())),
            ),
        ];
        let board = build_leaderboard(LeaderboardScope::Overall(None), outcomes).unwrap();
        assert_eq!(board.standings.len(), 1);
        assert_eq!(board.standings[0].rank, 1);
        assert!(board.is_unscored(&EntrantId::Candidate("b".into())));
        assert_eq!(board.rank_of(&EntrantId::Candidate("b".into())), None);
    }

    #[test]
    fn test_build_leaderboard_propagates_configuration_errors() {
        let outcomes: Vec<(EntrantId, Result<Entry, ScoringError>)> = vec![(
            EntrantId::Candidate("a".into()),
            Err(ScoringError::Configuration("zero".into())),
        )];
        assert!(build_leaderboard(LeaderboardScope::Overall(None), outcomes).is_err());
    }
}
