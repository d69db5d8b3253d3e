// ============================
// crates/backend-lib/src/scoring.rs
// ============================
//! Co-curricular score calculation and dashboard statistics.
use kokupocket_common::{Calculation, CalculationRequest, DashboardStats};

use crate::error::AppError;

/// Sum of the maximum marks of all components
pub const MAX_TOTAL: f64 = 110.0;

/// Scale of the final mark
pub const FINAL_SCALE: f64 = 10.0;

/// How many calculations the history page shows
pub const HISTORY_LIMIT: usize = 50;

/// A fully populated calculator submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreInput {
    pub attendance: u32,
    pub assessment: u32,
    pub involvement: u32,
    pub achievement: u32,
    pub position: u32,
    pub bonus: u32,
}

impl TryFrom<&CalculationRequest> for ScoreInput {
    type Error = AppError;

    fn try_from(req: &CalculationRequest) -> Result<Self, Self::Error> {
        match (
            req.attendance,
            req.assessment,
            req.involvement,
            req.achievement,
            req.position,
            req.bonus,
        ) {
            (
                Some(attendance),
                Some(assessment),
                Some(involvement),
                Some(achievement),
                Some(position),
                Some(bonus),
            ) => Ok(Self {
                attendance,
                assessment,
                involvement,
                achievement,
                position,
                bonus,
            }),
            _ => Err(AppError::BadRequest("All fields required".to_string())),
        }
    }
}

/// Computed score
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Score {
    pub total: u32,
    pub final_percent: f64,
}

/// Round to two decimal places
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Total the components and scale onto the final mark
pub fn score(input: &ScoreInput) -> Score {
    let total = [
        input.attendance,
        input.assessment,
        input.involvement,
        input.achievement,
        input.position,
        input.bonus,
    ]
    .iter()
    .fold(0u32, |acc, v| acc.saturating_add(*v));

    Score {
        total,
        final_percent: round2(f64::from(total) / MAX_TOTAL * FINAL_SCALE),
    }
}

/// Statistics over calculations ordered newest first
pub fn summarize(calculations: &[Calculation]) -> DashboardStats {
    if calculations.is_empty() {
        return DashboardStats {
            total_calculations: 0,
            average_score: 0.0,
            highest_score: 0.0,
            lowest_score: 100.0,
            last_calculation_date: None,
        };
    }

    let scores = calculations.iter().map(|c| c.final_percent);
    let sum: f64 = scores.clone().sum();
    let highest = scores.clone().fold(f64::MIN, f64::max);
    let lowest = scores.fold(f64::MAX, f64::min);

    DashboardStats {
        total_calculations: calculations.len(),
        average_score: round2(sum / calculations.len() as f64),
        highest_score: round2(highest),
        lowest_score: round2(lowest),
        last_calculation_date: calculations.first().map(|c| c.timestamp),
    }
}
