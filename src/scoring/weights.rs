use crate::model::{CriterionId, Lane, Points, Roster, ScoringContext, SegmentId};

use super::error::ScoringError;

/// Criteria and weights that apply to one scoring context.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedWeights {
    pub context: ScoringContext,
    /// Configuration order
    pub criteria: Vec<(CriterionId, Points)>,
    pub total: Points,
}

impl ResolvedWeights {
    pub fn weight_of(&self, criterion: &CriterionId) -> Option<Points> {
        self.criteria
            .iter()
            .find(|(id, _)| id == criterion)
            .map(|(_, w)| *w)
    }
}

/// Look up the weighted criteria of a segment (or one pair lane of it).
///
/// Fails when the segment is unknown, has no criteria for the lane, a weight
/// is negative, or the weights sum to zero.
pub fn resolve_weights(
    roster: &Roster,
    context: &ScoringContext,
) -> Result<ResolvedWeights, ScoringError> {
    let segment = roster.segment(&context.segment).ok_or_else(|| {
        ScoringError::Configuration(format!("unknown segment '{}'", context.segment))
    })?;

    let criteria: Vec<(CriterionId, Points)> = segment
        .criteria_for(context.lane)
        .map(|c| (c.id.clone(), c.weight))
        .collect();

    if criteria.is_empty() {
        let message = match context.lane {
            None => format!("{} has no solo criteria", describe(context)),
            Some(_) => format!("{} has no criteria", describe(context)),
        };
        return Err(ScoringError::Configuration(message));
    }

    if let Some((id, _)) = criteria.iter().find(|(_, w)| w.is_negative()) {
        return Err(ScoringError::Configuration(format!(
            "{} criterion '{}' has a negative weight",
            describe(context),
            id
        )));
    }

    let total = criteria
        .iter()
        .try_fold(Points::ZERO, |acc, (_, w)| acc.checked_add(*w))
        .ok_or_else(|| {
            ScoringError::Configuration(format!("{} weights overflow", describe(context)))
        })?;

    if total.is_zero() {
        return Err(ScoringError::Configuration(format!(
            "{} criteria weights sum to zero",
            describe(context)
        )));
    }

    Ok(ResolvedWeights {
        context: context.clone(),
        criteria,
        total,
    })
}

/// Overall segment weights for one ranking, validated the same way as
/// criterion weights.
pub fn resolve_overall_weights(
    roster: &Roster,
    lane: Option<Lane>,
) -> Result<Vec<(SegmentId, Points)>, ScoringError> {
    let scope = match lane {
        None => "overall ranking".to_string(),
        Some(lane) => format!("overall {} ranking", lane),
    };

    let weights = roster.overall().weights_for(lane);
    if weights.is_empty() {
        return Err(ScoringError::Configuration(format!(
            "{} has no segment weights",
            scope
        )));
    }

    let mut total = Points::ZERO;
    for (segment, weight) in &weights {
        if roster.segment(segment).is_none() {
            return Err(ScoringError::Configuration(format!(
                "{} references unknown segment '{}'",
                scope, segment
            )));
        }
        if weight.is_negative() {
            return Err(ScoringError::Configuration(format!(
                "{} gives segment '{}' a negative weight",
                scope, segment
            )));
        }
        total = total.checked_add(*weight).ok_or_else(|| {
            ScoringError::Configuration(format!("{} weights overflow", scope))
        })?;
    }

    if total.is_zero() {
        return Err(ScoringError::Configuration(format!(
            "{} segment weights sum to zero",
            scope
        )));
    }

    Ok(weights)
}

fn describe(context: &ScoringContext) -> String {
    match context.lane {
        None => format!("segment '{}'", context.segment),
        Some(lane) => format!("segment '{}' ({} lane)", context.segment, lane),
    }
}
