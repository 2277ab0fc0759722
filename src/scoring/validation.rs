use std::collections::HashSet;

use crate::config::Config;
use crate::model::{Lane, Points};

/// Validate a competition file at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_competition(config: &Config) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    // Score range
    if config.score_range.min >= config.score_range.max {
        errors.push(format!(
            "score_range: min ({}) must be below max ({})",
            config.score_range.min, config.score_range.max
        ));
    }

    // Competitor ids share one namespace
    let mut competitor_ids = HashSet::new();
    for (i, candidate) in config.candidates.iter().enumerate() {
        if !competitor_ids.insert(&candidate.id) {
            errors.push(format!("candidates[{}].id: duplicate id '{}'", i, candidate.id));
        }
    }
    for (i, pair) in config.pairs.iter().enumerate() {
        if !competitor_ids.insert(&pair.id) {
            errors.push(format!("pairs[{}].id: duplicate id '{}'", i, pair.id));
        }
    }

    // Segments and their criteria
    let mut segment_ids = HashSet::new();
    for (i, segment) in config.segments.iter().enumerate() {
        if !segment_ids.insert(&segment.id) {
            errors.push(format!("segments[{}].id: duplicate id '{}'", i, segment.id));
        }

        if segment.criteria.is_empty() && segment.pair_criteria.is_empty() {
            errors.push(format!("segments[{}]: '{}' has no criteria", i, segment.id));
        }

        let mut criterion_ids = HashSet::new();
        for (j, criterion) in segment.criteria.iter().enumerate() {
            if !criterion_ids.insert(&criterion.id) {
                errors.push(format!(
                    "segments[{}].criteria[{}].id: duplicate id '{}'",
                    i, j, criterion.id
                ));
            }
            if criterion.weight.is_negative() {
                errors.push(format!(
                    "segments[{}].criteria[{}].weight: must be non-negative",
                    i, j
                ));
            }
        }
        for (j, criterion) in segment.pair_criteria.iter().enumerate() {
            if !criterion_ids.insert(&criterion.id) {
                errors.push(format!(
                    "segments[{}].pair_criteria[{}].id: duplicate id '{}'",
                    i, j, criterion.id
                ));
            }
            if criterion.weight.is_negative() {
                errors.push(format!(
                    "segments[{}].pair_criteria[{}].weight: must be non-negative",
                    i, j
                ));
            }
        }

        if !segment.criteria.is_empty() {
            check_weight_sum(
                &mut errors,
                &format!("segments[{}].criteria", i),
                &format!("weights of '{}'", segment.id),
                segment.criteria.iter().map(|c| c.weight),
            );
        }
        for lane in Lane::ALL {
            let mut lane_criteria = segment
                .pair_criteria
                .iter()
                .filter(|c| c.lane == lane)
                .peekable();
            if lane_criteria.peek().is_some() {
                check_weight_sum(
                    &mut errors,
                    &format!("segments[{}].pair_criteria", i),
                    &format!("{} weights of '{}'", lane, segment.id),
                    lane_criteria.map(|c| c.weight),
                );
            }
        }
    }

    // Judges and their assignments
    let mut judge_ids = HashSet::new();
    for (i, judge) in config.judges.iter().enumerate() {
        if !judge_ids.insert(&judge.id) {
            errors.push(format!("judges[{}].id: duplicate id '{}'", i, judge.id));
        }
        for segment in &judge.segments {
            if !segment_ids.contains(segment) {
                errors.push(format!(
                    "judges[{}].segments: unknown segment '{}'",
                    i, segment
                ));
            }
        }
        for competitor in &judge.competitors {
            if !competitor_ids.contains(competitor) {
                errors.push(format!(
                    "judges[{}].competitors: unknown competitor '{}'",
                    i, competitor
                ));
            }
        }
    }

    // Overall weights
    for (i, weight) in config.overall.segments.iter().enumerate() {
        match config.segments.iter().find(|s| s.id == weight.segment) {
            None => errors.push(format!(
                "overall.segments[{}].segment: unknown segment '{}'",
                i, weight.segment
            )),
            Some(segment) if segment.criteria.is_empty() => errors.push(format!(
                "overall.segments[{}]: segment '{}' has no solo criteria",
                i, weight.segment
            )),
            Some(_) => {}
        }
        if weight.weight.is_negative() {
            errors.push(format!("overall.segments[{}].weight: must be non-negative", i));
        }
    }
    if !config.overall.segments.is_empty() {
        check_weight_sum(
            &mut errors,
            "overall.segments",
            "weights",
            config.overall.segments.iter().map(|w| w.weight),
        );
    }

    for (i, weight) in config.overall.pairs.iter().enumerate() {
        match config.segments.iter().find(|s| s.id == weight.segment) {
            None => errors.push(format!(
                "overall.pairs[{}].segment: unknown segment '{}'",
                i, weight.segment
            )),
            Some(segment) if !segment.pair_criteria.iter().any(|c| c.lane == weight.lane) => {
                errors.push(format!(
                    "overall.pairs[{}]: segment '{}' has no {} criteria",
                    i, weight.segment, weight.lane
                ))
            }
            Some(_) => {}
        }
        if weight.weight.is_negative() {
            errors.push(format!("overall.pairs[{}].weight: must be non-negative", i));
        }
    }
    for lane in Lane::ALL {
        let mut lane_weights = config
            .overall
            .pairs
            .iter()
            .filter(|w| w.lane == lane)
            .peekable();
        if lane_weights.peek().is_some() {
            check_weight_sum(
                &mut errors,
                "overall.pairs",
                &format!("{} weights", lane),
                lane_weights.map(|w| w.weight),
            );
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Report a weight list that overflows or sums to zero.
fn check_weight_sum(
    errors: &mut Vec<String>,
    field: &str,
    subject: &str,
    mut weights: impl Iterator<Item = Points>,
) {
    match weights.try_fold(Points::ZERO, |acc, w| acc.checked_add(w)) {
        None => errors.push(format!("{}: {} overflow", field, subject)),
        Some(total) if total.is_zero() => {
            errors.push(format!("{}: {} sum to zero", field, subject))
        }
        Some(_) => {}
    }
}
