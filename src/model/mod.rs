pub mod ids;
pub mod points;
pub mod roster;

pub use ids::{CompetitorId, CriterionId, EntrantId, JudgeId, Lane, ScoringContext, SegmentId};
pub use points::Points;
pub use roster::{Candidate, Competitor, Criterion, EntrantProfile, Judge, Pair, Roster, Segment};
