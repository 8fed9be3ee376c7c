//! Month-end sales forecasting
//!
//! Fits a least-squares line to the observed daily sales of the current
//! month, completes the month with the fitted trend, and derives the
//! achievement probability against a budget, a scenario band, and a naive
//! trend ranking of top products.

mod calendar;
mod probability;
mod regression;
mod scenarios;
mod trend;

pub use calendar::{days_in_month, MonthContext};
pub use probability::{calculate_target_probability, ProbabilityEstimator};
pub use regression::{
    calculate_month_end_projection, get_daily_projections, DailyProjectionPoint,
    LinearRegressionForecaster, PointKind, Projection, RegressionModel,
};
pub use scenarios::{generate_scenarios, ScenarioGenerator, ScenarioSet};
pub use trend::{
    predict_top_products, GrowthStrategy, HalfOverHalfGrowth, ProductTrend, ProductVolume,
    RandomGrowth, TrendDirection, TrendRanker, DEFAULT_TREND_LIMIT,
};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::DomainError;

/// Default scenario band width in percent
pub const DEFAULT_VARIANCE_PERCENT: f64 = 20.0;

/// Default share of the budget that counts as the target
pub const DEFAULT_META_PERCENT: f64 = 100.0;

/// Sales observed on one day of the month. Days without data are absent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailySalesPoint {
    pub day: u32,
    pub sales: f64,
}

impl DailySalesPoint {
    pub fn new(day: u32, sales: f64) -> Self {
        Self { day, sales }
    }

    /// A calendar day (`>= 1`) with finite, non-negative sales.
    pub fn is_valid(&self) -> bool {
        self.day >= 1 && self.sales.is_finite() && self.sales >= 0.0
    }
}

/// Tunables for one forecast call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastOptions {
    /// Scenario band width in percent, non-negative (default: 20)
    pub variance_percent: f64,
    /// Target as a percentage of the budget (default: 100)
    pub meta_percent: f64,
    /// Products returned by the trend ranker (default: 5)
    pub trend_limit: usize,
}

impl Default for ForecastOptions {
    fn default() -> Self {
        Self {
            variance_percent: DEFAULT_VARIANCE_PERCENT,
            meta_percent: DEFAULT_META_PERCENT,
            trend_limit: DEFAULT_TREND_LIMIT,
        }
    }
}

impl ForecastOptions {
    pub fn with_variance_percent(mut self, variance_percent: f64) -> Self {
        self.variance_percent = variance_percent;
        self
    }

    pub fn with_meta_percent(mut self, meta_percent: f64) -> Self {
        self.meta_percent = meta_percent;
        self
    }

    pub fn with_trend_limit(mut self, trend_limit: usize) -> Self {
        self.trend_limit = trend_limit;
        self
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        validate_percent("variance_percent", self.variance_percent)?;
        validate_percent("meta_percent", self.meta_percent)?;
        if self.trend_limit == 0 {
            return Err(DomainError::invalid_option("trend_limit", "must be greater than zero"));
        }
        Ok(())
    }
}

pub(crate) fn validate_percent(option: &'static str, value: f64) -> Result<(), DomainError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(DomainError::invalid_option(option, format!("must be a non-negative number, got {value}")))
    }
}

/// Everything the dashboard needs about the current month in one structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastReport {
    pub budget: f64,
    pub days_in_month: u32,
    pub projection: Projection,
    pub probability: u8,
    pub scenarios: ScenarioSet,
    pub daily: Vec<DailyProjectionPoint>,
}

/// Projects the month, then derives probability, scenarios and the chart series.
pub fn forecast_month(
    points: &[DailySalesPoint],
    budget: f64,
    days_in_month: u32,
    options: &ForecastOptions,
) -> Result<ForecastReport, DomainError> {
    options.validate()?;
    let forecaster = LinearRegressionForecaster::new(days_in_month)?;

    let projection = forecaster.project(points);
    let probability = ProbabilityEstimator.estimate(&projection, budget, options.meta_percent);
    let scenarios = ScenarioGenerator.generate(projection.projected_total, options.variance_percent);
    let daily = forecaster.daily_projections(points, &projection.model);

    info!(
        event_name = "forecast.month.completed",
        days_in_month,
        days_observed = projection.days_observed,
        projected_total = projection.projected_total,
        confidence = projection.confidence,
        probability,
        "month forecast computed"
    );

    Ok(ForecastReport { budget, days_in_month, projection, probability, scenarios, daily })
}
