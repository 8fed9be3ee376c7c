//! Likelihood of reaching the monthly target.

use crate::errors::DomainError;

use super::regression::{LinearRegressionForecaster, Projection};
use super::{validate_percent, DailySalesPoint};

#[derive(Debug, Clone, Copy, Default)]
pub struct ProbabilityEstimator;

impl ProbabilityEstimator {
    /// Achievement likelihood in `0..=100`.
    ///
    /// Reaching the target maps to 50; every two points of over-achievement
    /// add one, saturating at 100. Below target the likelihood ramps linearly
    /// from 0 to 50. The result is scaled by the fit confidence.
    pub fn estimate(&self, projection: &Projection, budget: f64, meta_percent: f64) -> u8 {
        let target_amount = budget * meta_percent / 100.0;
        if !target_amount.is_finite() || target_amount <= 0.0 {
            return 0;
        }

        let achievement_rate = projection.projected_total / target_amount * 100.0;
        let raw_probability = if achievement_rate >= 100.0 {
            50.0 + ((achievement_rate - 100.0) / 2.0).min(50.0)
        } else {
            achievement_rate / 100.0 * 50.0
        };

        let probability = (raw_probability * projection.confidence / 100.0).clamp(0.0, 100.0);
        if probability.is_nan() {
            return 0;
        }
        probability.round() as u8
    }
}

/// Projects `points` over the month and estimates the chance of reaching
/// `meta_percent` of `budget`.
pub fn calculate_target_probability(
    points: &[DailySalesPoint],
    budget: f64,
    meta_percent: f64,
    days_in_month: u32,
) -> Result<u8, DomainError> {
    validate_percent("meta_percent", meta_percent)?;
    let projection = LinearRegressionForecaster::new(days_in_month)?.project(points);
    Ok(ProbabilityEstimator.estimate(&projection, budget, meta_percent))
}
