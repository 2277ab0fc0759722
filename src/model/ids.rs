use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }
    };
}

string_id!(
    /// Candidate or pair identity (one shared namespace)
    CompetitorId
);
string_id!(JudgeId);
string_id!(SegmentId);
string_id!(
    /// Criterion identity, unique within its segment
    CriterionId
);

/// Gender lane of a pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lane {
    Male,
    Female,
}

impl Lane {
    pub const ALL: [Lane; 2] = [Lane::Male, Lane::Female];

    pub fn as_str(&self) -> &'static str {
        match self {
            Lane::Male => "male",
            Lane::Female => "female",
        }
    }
}

impl fmt::Display for Lane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Lane {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "male" | "m" => Ok(Lane::Male),
            "female" | "f" => Ok(Lane::Female),
            other => Err(format!("unknown lane '{}' (expected male or female)", other)),
        }
    }
}

/// The unit that gets scored and ranked: a solo candidate, or one lane of a pair.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntrantId {
    Candidate(CompetitorId),
    PairLane(CompetitorId, Lane),
}

impl EntrantId {
    pub fn competitor(&self) -> &CompetitorId {
        match self {
            EntrantId::Candidate(id) | EntrantId::PairLane(id, _) => id,
        }
    }

    pub fn lane(&self) -> Option<Lane> {
        match self {
            EntrantId::Candidate(_) => None,
            EntrantId::PairLane(_, lane) => Some(*lane),
        }
    }
}

impl fmt::Display for EntrantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntrantId::Candidate(id) => write!(f, "{}", id),
            EntrantId::PairLane(id, lane) => write!(f, "{}:{}", id, lane),
        }
    }
}

/// Segment plus optional lane. Every weight lookup, aggregation and ranking
/// pass runs inside exactly one context.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ScoringContext {
    pub segment: SegmentId,
    pub lane: Option<Lane>,
}

impl ScoringContext {
    pub fn solo(segment: SegmentId) -> Self {
        Self { segment, lane: None }
    }

    pub fn pair(segment: SegmentId, lane: Lane) -> Self {
        Self {
            segment,
            lane: Some(lane),
        }
    }

    /// Context an entrant is scored in for the given segment
    pub fn for_entrant(segment: SegmentId, entrant: &EntrantId) -> Self {
        Self {
            segment,
            lane: entrant.lane(),
        }
    }
}

impl fmt::Display for ScoringContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.lane {
            None => write!(f, "{}", self.segment),
            Some(lane) => write!(f, "{} ({})", self.segment, lane),
        }
    }
}
