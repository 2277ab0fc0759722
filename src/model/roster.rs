use std::collections::{BTreeSet, HashMap};

use serde::Serialize;

use crate::config::{Config, Profile};
use crate::scoring::{OverallConfig, ScoreRange, ScoringError};

use super::ids::{CompetitorId, CriterionId, EntrantId, JudgeId, Lane, ScoringContext, SegmentId};
use super::points::Points;

#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub id: CompetitorId,
    pub profile: Profile,
}

/// A pair owns exactly one male and one female member.
#[derive(Debug, Clone, PartialEq)]
pub struct Pair {
    pub id: CompetitorId,
    pub male: Profile,
    pub female: Profile,
}

impl Pair {
    pub fn member(&self, lane: Lane) -> &Profile {
        match lane {
            Lane::Male => &self.male,
            Lane::Female => &self.female,
        }
    }
}

/// One row of the roster listing: who competes in a lane, and their profile.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntrantProfile {
    pub entrant: EntrantId,
    #[serde(flatten)]
    pub profile: Profile,
}

#[derive(Debug, Clone, Copy)]
pub enum Competitor<'a> {
    Candidate(&'a Candidate),
    Pair(&'a Pair),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Judge {
    pub id: JudgeId,
    pub name: String,
}

/// Solo criteria carry no lane; pair criteria carry the lane they score.
#[derive(Debug, Clone, PartialEq)]
pub struct Criterion {
    pub id: CriterionId,
    pub name: String,
    pub lane: Option<Lane>,
    pub weight: Points,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub id: SegmentId,
    pub name: String,
    pub criteria: Vec<Criterion>,
}

impl Segment {
    /// Criteria scored in the given lane (`None` = solo), in configured order
    pub fn criteria_for(&self, lane: Option<Lane>) -> impl Iterator<Item = &Criterion> {
        self.criteria.iter().filter(move |c| c.lane == lane)
    }

    pub fn criterion(&self, id: &CriterionId) -> Option<&Criterion> {
        self.criteria.iter().find(|c| &c.id == id)
    }
}

/// Validated-elsewhere reference data: competitors, judges, segments,
/// weights and the judge assignment join sets.
///
/// Building a roster never fails; problems in the configuration surface as
/// `ScoringError`s when the affected data is used.
#[derive(Debug, Clone)]
pub struct Roster {
    name: String,
    score_range: ScoreRange,
    candidates: Vec<Candidate>,
    pairs: Vec<Pair>,
    judges: Vec<Judge>,
    segments: Vec<Segment>,
    overall: OverallConfig,
    competitor_index: HashMap<CompetitorId, CompetitorSlot>,
    judge_segments: BTreeSet<(JudgeId, SegmentId)>,
    judge_competitors: BTreeSet<(JudgeId, CompetitorId)>,
}

#[derive(Debug, Clone, Copy)]
enum CompetitorSlot {
    Candidate(usize),
    Pair(usize),
}

impl Roster {
    pub fn from_config(config: &Config) -> Self {
        let candidates: Vec<Candidate> = config
            .candidates
            .iter()
            .map(|c| Candidate {
                id: c.id.clone(),
                profile: c.profile(),
            })
            .collect();

        let pairs: Vec<Pair> = config
            .pairs
            .iter()
            .map(|p| Pair {
                id: p.id.clone(),
                male: p.male.clone(),
                female: p.female.clone(),
            })
            .collect();

        let mut competitor_index = HashMap::new();
        for (i, c) in candidates.iter().enumerate() {
            competitor_index
                .entry(c.id.clone())
                .or_insert(CompetitorSlot::Candidate(i));
        }
        for (i, p) in pairs.iter().enumerate() {
            competitor_index
                .entry(p.id.clone())
                .or_insert(CompetitorSlot::Pair(i));
        }

        let segments = config
            .segments
            .iter()
            .map(|s| {
                let solo = s.criteria.iter().map(|c| Criterion {
                    id: c.id.clone(),
                    name: c.name.clone().unwrap_or_else(|| c.id.to_string()),
                    lane: None,
                    weight: c.weight,
                });
                let paired = s.pair_criteria.iter().map(|c| Criterion {
                    id: c.id.clone(),
                    name: c.name.clone().unwrap_or_else(|| c.id.to_string()),
                    lane: Some(c.lane),
                    weight: c.weight,
                });
                Segment {
                    id: s.id.clone(),
                    name: s.name.clone(),
                    criteria: solo.chain(paired).collect(),
                }
            })
            .collect();

        let judges = config
            .judges
            .iter()
            .map(|j| Judge {
                id: j.id.clone(),
                name: j.name.clone(),
            })
            .collect();

        let mut judge_segments = BTreeSet::new();
        let mut judge_competitors = BTreeSet::new();
        for judge in &config.judges {
            for segment in &judge.segments {
                judge_segments.insert((judge.id.clone(), segment.clone()));
            }
            for competitor in &judge.competitors {
                judge_competitors.insert((judge.id.clone(), competitor.clone()));
            }
        }

        Self {
            name: config.name.clone(),
            score_range: config.score_range,
            candidates,
            pairs,
            judges,
            segments,
            overall: config.overall.clone(),
            competitor_index,
            judge_segments,
            judge_competitors,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn score_range(&self) -> ScoreRange {
        self.score_range
    }

    pub fn overall(&self) -> &OverallConfig {
        &self.overall
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn pairs(&self) -> &[Pair] {
        &self.pairs
    }

    pub fn judges(&self) -> &[Judge] {
        &self.judges
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn segment(&self, id: &SegmentId) -> Option<&Segment> {
        self.segments.iter().find(|s| &s.id == id)
    }

    pub fn judge(&self, id: &JudgeId) -> Option<&Judge> {
        self.judges.iter().find(|j| &j.id == id)
    }

    pub fn competitor(&self, id: &CompetitorId) -> Option<Competitor<'_>> {
        match self.competitor_index.get(id)? {
            CompetitorSlot::Candidate(i) => Some(Competitor::Candidate(&self.candidates[*i])),
            CompetitorSlot::Pair(i) => Some(Competitor::Pair(&self.pairs[*i])),
        }
    }

    /// Everyone ranked in one lane: all candidates for `None`, otherwise the
    /// given lane of every pair.
    pub fn entrants(&self, lane: Option<Lane>) -> Vec<EntrantId> {
        match lane {
            None => self
                .candidates
                .iter()
                .map(|c| EntrantId::Candidate(c.id.clone()))
                .collect(),
            Some(lane) => self
                .pairs
                .iter()
                .map(|p| EntrantId::PairLane(p.id.clone(), lane))
                .collect(),
        }
    }

    /// Turn a competitor id and optional lane into an entrant.
    ///
    /// A lane is required for pairs and rejected for candidates.
    pub fn resolve_entrant(
        &self,
        id: &CompetitorId,
        lane: Option<Lane>,
    ) -> Result<EntrantId, ScoringError> {
        match (self.competitor(id), lane) {
            (None, _) => Err(ScoringError::Validation(format!("unknown competitor '{}'", id))),
            (Some(Competitor::Candidate(c)), None) => Ok(EntrantId::Candidate(c.id.clone())),
            (Some(Competitor::Candidate(c)), Some(lane)) => Err(ScoringError::Validation(format!(
                "'{}' is a solo candidate and has no {} lane",
                c.id, lane
            ))),
            (Some(Competitor::Pair(p)), Some(lane)) => Ok(EntrantId::PairLane(p.id.clone(), lane)),
            (Some(Competitor::Pair(p)), None) => Err(ScoringError::Validation(format!(
                "'{}' is a pair; a lane (male or female) is required",
                p.id
            ))),
        }
    }

    /// Whether the entrant exists in this roster with a matching form
    pub fn contains_entrant(&self, entrant: &EntrantId) -> bool {
        self.resolve_entrant(entrant.competitor(), entrant.lane()).is_ok()
    }

    /// The candidate's profile, or that of the pair member in the entrant's lane
    pub fn profile(&self, entrant: &EntrantId) -> Option<&Profile> {
        match (self.competitor(entrant.competitor()), entrant.lane()) {
            (Some(Competitor::Candidate(c)), None) => Some(&c.profile),
            (Some(Competitor::Pair(p)), Some(lane)) => Some(p.member(lane)),
            _ => None,
        }
    }

    /// Profiles of every entrant in one lane, in roster order
    pub fn entrant_profiles(&self, lane: Option<Lane>) -> Vec<EntrantProfile> {
        self.entrants(lane)
            .into_iter()
            .filter_map(|entrant| {
                let profile = self.profile(&entrant)?.clone();
                Some(EntrantProfile { entrant, profile })
            })
            .collect()
    }

    /// Name shown on leaderboards: the candidate, or the pair member of the lane
    pub fn display_name(&self, entrant: &EntrantId) -> String {
        self.profile(entrant)
            .map(|p| p.name.clone())
            .unwrap_or_else(|| entrant.to_string())
    }

    pub fn criterion_name(&self, context: &ScoringContext, id: &CriterionId) -> String {
        self.segment(&context.segment)
            .and_then(|s| s.criterion(id))
            .map(|c| c.name.clone())
            .unwrap_or_else(|| id.to_string())
    }

    pub fn is_assigned_segment(&self, judge: &JudgeId, segment: &SegmentId) -> bool {
        self.judge_segments
            .contains(&(judge.clone(), segment.clone()))
    }

    pub fn is_assigned_competitor(&self, judge: &JudgeId, competitor: &CompetitorId) -> bool {
        self.judge_competitors
            .contains(&(judge.clone(), competitor.clone()))
    }

    /// Segments assigned to a judge, in segment configuration order
    pub fn assigned_segments(&self, judge: &JudgeId) -> Vec<&Segment> {
        self.segments
            .iter()
            .filter(|s| self.is_assigned_segment(judge, &s.id))
            .collect()
    }

    /// Competitor ids assigned to a judge: candidates first, then pairs
    pub fn assigned_competitors(&self, judge: &JudgeId) -> Vec<CompetitorId> {
        let candidates = self.candidates.iter().map(|c| &c.id);
        let pairs = self.pairs.iter().map(|p| &p.id);
        candidates
            .chain(pairs)
            .filter(|id| self.is_assigned_competitor(judge, id))
            .cloned()
            .collect()
    }
}
