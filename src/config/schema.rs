use serde::{Deserialize, Serialize};

use crate::model::{CompetitorId, JudgeId, SegmentId};
use crate::scoring::{CriterionConfig, OverallConfig, PairCriterionConfig, ScoreRange};

/// Competition file: reference data plus scoring configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub name: String,

    #[serde(default)]
    pub score_range: ScoreRange,

    #[serde(default)]
    pub candidates: Vec<CandidateConfig>,

    #[serde(default)]
    pub pairs: Vec<PairConfig>,

    #[serde(default)]
    pub judges: Vec<JudgeConfig>,

    #[serde(default)]
    pub segments: Vec<SegmentConfig>,

    #[serde(default)]
    pub overall: OverallConfig,
}

/// Display metadata shared by candidates and pair members
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Profile {
    pub name: String,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub vital_stats: Option<String>,
    #[serde(default)]
    pub picture: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct CandidateConfig {
    pub id: CompetitorId,
    pub name: String,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub vital_stats: Option<String>,
    #[serde(default)]
    pub picture: Option<String>,
}

impl CandidateConfig {
    pub fn profile(&self) -> Profile {
        Profile {
            name: self.name.clone(),
            age: self.age,
            vital_stats: self.vital_stats.clone(),
            picture: self.picture.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct PairConfig {
    pub id: CompetitorId,
    pub male: Profile,
    pub female: Profile,
}

/// A judge and the segments/competitors they are assigned to.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct JudgeConfig {
    pub id: JudgeId,
    pub name: String,
    #[serde(default)]
    pub segments: Vec<SegmentId>,
    #[serde(default)]
    pub competitors: Vec<CompetitorId>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SegmentConfig {
    pub id: SegmentId,
    pub name: String,

    /// Criteria for solo candidates
    #[serde(default)]
    pub criteria: Vec<CriterionConfig>,

    /// Lane-tagged criteria for pairs
    #[serde(default)]
    pub pair_criteria: Vec<PairCriterionConfig>,
}

impl Config {
    /// A small but complete competition, used by `init` as a starting point.
    pub fn starter() -> Self {
        use crate::model::{Lane, Points};
        use crate::scoring::{PairSegmentWeight, SegmentWeight};

        let criterion = |id: &str, weight: i64| CriterionConfig {
            id: id.into(),
            name: None,
            weight: Points::whole(weight),
        };
        let pair_criterion = |id: &str, lane: Lane, weight: i64| PairCriterionConfig {
            id: id.into(),
            name: None,
            lane,
            weight: Points::whole(weight),
        };
        let profile = |name: &str| Profile {
            name: name.to_string(),
            ..Profile::default()
        };
        let candidate = |id: &str, name: &str| CandidateConfig {
            id: id.into(),
            name: name.to_string(),
            age: None,
            vital_stats: None,
            picture: None,
        };

        Config {
            name: "Sample Pageant".to_string(),
            score_range: ScoreRange::default(),
            candidates: vec![
                candidate("c1", "Candidate One"),
                candidate("c2", "Candidate Two"),
            ],
            pairs: vec![PairConfig {
                id: "p1".into(),
                male: profile("Escort One"),
                female: profile("Muse One"),
            }],
            judges: vec![JudgeConfig {
                id: "j1".into(),
                name: "Judge One".to_string(),
                segments: vec!["talent".into(), "production".into()],
                competitors: vec!["c1".into(), "c2".into(), "p1".into()],
            }],
            segments: vec![
                SegmentConfig {
                    id: "talent".into(),
                    name: "Talent".to_string(),
                    criteria: vec![criterion("mastery", 60), criterion("stage-presence", 40)],
                    pair_criteria: vec![],
                },
                SegmentConfig {
                    id: "production".into(),
                    name: "Production Number".to_string(),
                    criteria: vec![],
                    pair_criteria: vec![
                        pair_criterion("male-poise", Lane::Male, 100),
                        pair_criterion("female-poise", Lane::Female, 100),
                    ],
                },
            ],
            overall: OverallConfig {
                segments: vec![SegmentWeight {
                    segment: "talent".into(),
                    weight: Points::whole(100),
                }],
                pairs: vec![
                    PairSegmentWeight {
                        segment: "production".into(),
                        lane: Lane::Male,
                        weight: Points::whole(100),
                    },
                    PairSegmentWeight {
                        segment: "production".into(),
                        lane: Lane::Female,
                        weight: Points::whole(100),
                    },
                ],
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Lane, Points};

    #[test]
    fn test_full_config_parse() {
        let yaml = r#"
name: Intramurals 2024
score_range: { min: 1, max: 10 }
candidates:
  - id: c1
    name: Ana
    age: 21
    vital_stats: "34-24-36"
    picture: ana.jpg
pairs:
  - id: p1
    male: { name: Ben }
    female: { name: Cora, age: 19 }
judges:
  - id: j1
    name: Judge Dee
    segments: [talent]
    competitors: [c1, p1]
segments:
  - id: talent
    name: Talent
    criteria:
      - { id: mastery, weight: 60 }
      - { id: presence, name: Stage Presence, weight: 40 }
    pair_criteria:
      - { id: m-poise, lane: male, weight: 100 }
overall:
  segments:
    - { segment: talent, weight: 100 }
"#;
        let config: Config = serde_saphyr::from_str(yaml).unwrap();
        assert_eq!(config.name, "Intramurals 2024");
        assert_eq!(config.score_range.max, Points::whole(10));
        assert_eq!(config.candidates[0].age, Some(21));
        assert_eq!(config.candidates[0].picture.as_deref(), Some("ana.jpg"));
        assert_eq!(config.pairs[0].female.name, "Cora");
        assert_eq!(config.judges[0].competitors.len(), 2);
        assert_eq!(config.segments[0].criteria[1].name.as_deref(), Some("Stage Presence"));
        assert_eq!(config.segments[0].pair_criteria[0].lane, Lane::Male);
        assert_eq!(config.overall.segments.len(), 1);
    }

    #[test]
    fn test_minimal_config_defaults() {
        let config: Config = serde_saphyr::from_str("name: Empty").unwrap();
        assert_eq!(config.score_range, ScoreRange::default());
        assert!(config.candidates.is_empty());
        assert!(config.segments.is_empty());
    }

    #[test]
    fn test_starter_config_roundtrip() {
        let config = Config::starter();
        let yaml = serde_saphyr::to_string(&config).unwrap();
        let parsed: Config = serde_saphyr::from_str(&yaml).unwrap();
        assert_eq!(config, parsed);
    }
}
