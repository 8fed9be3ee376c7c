//! Least-squares month-end projection.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::DomainError;
use crate::rounding::ratio_or_zero;

use super::calendar::validate_days_in_month;
use super::DailySalesPoint;

/// Fitted line `sales = slope * day + intercept`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RegressionModel {
    pub slope: f64,
    pub intercept: f64,
}

impl RegressionModel {
    /// Ordinary least squares over `(day, sales)`.
    ///
    /// Returns the zero model for fewer than two points. When every point sits
    /// on the same day the slope is undefined and the fit is the flat mean.
    pub fn fit(points: &[DailySalesPoint]) -> Self {
        if points.len() < 2 {
            return Self::default();
        }

        let n = points.len() as f64;
        let (mut sum_x, mut sum_y, mut sum_xy, mut sum_xx) = (0.0, 0.0, 0.0, 0.0);
        for point in points {
            let x = f64::from(point.day);
            sum_x += x;
            sum_y += point.sales;
            sum_xy += x * point.sales;
            sum_xx += x * x;
        }

        let denominator = n * sum_xx - sum_x * sum_x;
        if denominator == 0.0 {
            return Self { slope: 0.0, intercept: sum_y / n };
        }

        let slope = (n * sum_xy - sum_x * sum_y) / denominator;
        let intercept = (sum_y - slope * sum_x) / n;
        Self { slope, intercept }
    }

    pub fn predict(&self, day: u32) -> f64 {
        self.slope * f64::from(day) + self.intercept
    }

    /// Coefficient of determination over the observed points; `0` for a flat series.
    pub fn r_squared(&self, points: &[DailySalesPoint]) -> f64 {
        if points.is_empty() {
            return 0.0;
        }

        let mean = points.iter().map(|point| point.sales).sum::<f64>() / points.len() as f64;
        let (mut ss_tot, mut ss_res) = (0.0, 0.0);
        for point in points {
            ss_tot += (point.sales - mean).powi(2);
            ss_res += (point.sales - self.predict(point.day)).powi(2);
        }

        if ss_tot == 0.0 {
            0.0
        } else {
            1.0 - ss_res / ss_tot
        }
    }
}

/// Month-end projection derived from the observed trend.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Projection {
    pub projected_total: f64,
    /// `R² * 100`, clamped to `[0, 100]`
    pub confidence: f64,
    pub days_observed: usize,
    pub daily_average: f64,
    #[serde(flatten)]
    pub model: RegressionModel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointKind {
    Actual,
    Projected,
}

/// One day of the full-month series handed to charting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyProjectionPoint {
    pub day: u32,
    pub sales: f64,
    #[serde(rename = "type")]
    pub kind: PointKind,
}

/// Projects a month from its observed days. The month length is injected so
/// the forecaster never consults the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinearRegressionForecaster {
    days_in_month: u32,
}

impl LinearRegressionForecaster {
    pub fn new(days_in_month: u32) -> Result<Self, DomainError> {
        validate_days_in_month(days_in_month)?;
        Ok(Self { days_in_month })
    }

    pub fn days_in_month(&self) -> u32 {
        self.days_in_month
    }

    pub fn project(&self, points: &[DailySalesPoint]) -> Projection {
        let points = self.usable_points(points);
        if points.len() < 2 {
            debug!(
                event_name = "forecast.projection.insufficient_data",
                days_observed = points.len(),
                "fewer than two observed days; returning zero projection"
            );
            return Projection::default();
        }

        let model = RegressionModel::fit(&points);
        let projected_total: f64 =
            self.daily_projections(&points, &model).iter().map(|point| point.sales).sum();
        let confidence = (model.r_squared(&points) * 100.0).clamp(0.0, 100.0);

        debug!(
            event_name = "forecast.projection.completed",
            days_observed = points.len(),
            days_in_month = self.days_in_month,
            slope = model.slope,
            intercept = model.intercept,
            projected_total,
            confidence,
            "month-end projection computed"
        );

        Projection {
            projected_total,
            confidence,
            days_observed: points.len(),
            daily_average: ratio_or_zero(projected_total, f64::from(self.days_in_month)),
            model,
        }
    }

    /// Observed days as `actual`, then every later day of the month as
    /// `projected` (never negative). Days inside the observed range that have
    /// no data stay absent.
    pub fn daily_projections(
        &self,
        points: &[DailySalesPoint],
        model: &RegressionModel,
    ) -> Vec<DailyProjectionPoint> {
        let mut actual = self.usable_points(points);
        actual.sort_by_key(|point| point.day);
        let last_day = actual.last().map(|point| point.day).unwrap_or(0);

        let mut series: Vec<DailyProjectionPoint> = actual
            .iter()
            .map(|point| DailyProjectionPoint {
                day: point.day,
                sales: point.sales,
                kind: PointKind::Actual,
            })
            .collect();
        series.extend((last_day + 1..=self.days_in_month).map(|day| DailyProjectionPoint {
            day,
            sales: model.predict(day).max(0.0),
            kind: PointKind::Projected,
        }));
        series
    }

    /// Drops points that cannot describe a day of this month's sales.
    fn usable_points(&self, points: &[DailySalesPoint]) -> Vec<DailySalesPoint> {
        points
            .iter()
            .copied()
            .filter(|point| point.is_valid() && point.day <= self.days_in_month)
            .collect()
    }
}

/// Fits the observed series and projects it over `days_in_month`.
///
/// `budget` does not influence the fit; it is only reported next to the
/// projection.
pub fn calculate_month_end_projection(
    points: &[DailySalesPoint],
    budget: f64,
    days_in_month: u32,
) -> Result<Projection, DomainError> {
    let projection = LinearRegressionForecaster::new(days_in_month)?.project(points);
    debug!(
        event_name = "forecast.projection.against_budget",
        budget,
        projected_total = projection.projected_total,
        budget_share_percent = ratio_or_zero(projection.projected_total, budget) * 100.0,
        "projection compared with budget"
    );
    Ok(projection)
}

/// Full-month series for charting from an already fitted model.
pub fn get_daily_projections(
    points: &[DailySalesPoint],
    model: &RegressionModel,
    days_in_month: u32,
) -> Result<Vec<DailyProjectionPoint>, DomainError> {
    Ok(LinearRegressionForecaster::new(days_in_month)?.daily_projections(points, model))
}
