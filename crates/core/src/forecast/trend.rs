//! Naive trend ranking of top products.
//!
//! Growth is computed by a pluggable [`GrowthStrategy`]. The default,
//! [`HalfOverHalfGrowth`], compares the first and second half of a product's
//! own daily series. [`RandomGrowth`] reproduces the legacy dashboard
//! behavior of drawing growth at random; it carries no signal and should not
//! drive real decisions until the intended growth metric is settled.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::rounding::{ratio_or_zero, round_to};

use super::DailySalesPoint;

/// Default number of products returned by the ranker
pub const DEFAULT_TREND_LIMIT: usize = 5;

/// Growth above this percentage is tagged `up`
pub const UP_THRESHOLD: f64 = 15.0;

/// Growth below this percentage is tagged `down`
pub const DOWN_THRESHOLD: f64 = -5.0;

/// A top-selling product as supplied by the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductVolume {
    pub name: String,
    #[serde(alias = "cantidad", alias = "quantity")]
    pub value: f64,
    /// Per-product daily sales, when the upstream stage can provide them.
    #[serde(default)]
    pub daily: Vec<DailySalesPoint>,
}

impl ProductVolume {
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self { name: name.into(), value, daily: Vec::new() }
    }

    pub fn with_daily(mut self, daily: Vec<DailySalesPoint>) -> Self {
        self.daily = daily;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Up,
    Down,
    Stable,
}

impl TrendDirection {
    pub fn from_growth(growth_percent: f64) -> Self {
        if growth_percent > UP_THRESHOLD {
            TrendDirection::Up
        } else if growth_percent < DOWN_THRESHOLD {
            TrendDirection::Down
        } else {
            TrendDirection::Stable
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductTrend {
    pub name: String,
    pub value: f64,
    /// Growth percentage rounded to one decimal
    pub growth: f64,
    pub trend: TrendDirection,
}

/// Source of the growth percentage attached to each product.
pub trait GrowthStrategy {
    fn growth_percent(&mut self, product: &ProductVolume, store_series: &[DailySalesPoint]) -> f64;
}

/// Second-half average over first-half average of the product's own series.
///
/// Invalid days are ignored. Yields `0` when fewer than two valid days remain
/// or the first half averages zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct HalfOverHalfGrowth;

impl GrowthStrategy for HalfOverHalfGrowth {
    fn growth_percent(&mut self, product: &ProductVolume, _store_series: &[DailySalesPoint]) -> f64 {
        let mut daily: Vec<DailySalesPoint> =
            product.daily.iter().copied().filter(DailySalesPoint::is_valid).collect();
        if daily.len() < 2 {
            return 0.0;
        }
        daily.sort_by_key(|point| point.day);

        let (first, second) = daily.split_at(daily.len() / 2);
        let first_avg = mean_sales(first);
        if first_avg == 0.0 {
            return 0.0;
        }
        (mean_sales(second) - first_avg) / first_avg * 100.0
    }
}

fn mean_sales(points: &[DailySalesPoint]) -> f64 {
    ratio_or_zero(points.iter().map(|point| point.sales).sum(), points.len() as f64)
}

/// Uniform draw in `[-10, 30)` percent, independent of any data.
#[derive(Debug, Clone)]
pub struct RandomGrowth {
    rng: StdRng,
}

impl RandomGrowth {
    pub const MIN_GROWTH: f64 = -10.0;
    pub const MAX_GROWTH: f64 = 30.0;

    pub fn from_entropy() -> Self {
        Self { rng: StdRng::from_entropy() }
    }

    pub fn seeded(seed: u64) -> Self {
        Self { rng: StdRng::seed_from_u64(seed) }
    }
}

impl GrowthStrategy for RandomGrowth {
    fn growth_percent(&mut self, _product: &ProductVolume, _store_series: &[DailySalesPoint]) -> f64 {
        self.rng.gen_range(Self::MIN_GROWTH..Self::MAX_GROWTH)
    }
}

/// Annotates the leading products with growth and sorts them by it.
#[derive(Debug, Clone)]
pub struct TrendRanker<G = HalfOverHalfGrowth> {
    strategy: G,
    limit: usize,
}

impl Default for TrendRanker<HalfOverHalfGrowth> {
    fn default() -> Self {
        Self::new(HalfOverHalfGrowth)
    }
}

impl<G: GrowthStrategy> TrendRanker<G> {
    pub fn new(strategy: G) -> Self {
        Self { strategy, limit: DEFAULT_TREND_LIMIT }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Takes the first `limit` products as supplied (the caller's top list)
    /// and returns them sorted by growth descending; ties keep input order.
    pub fn rank(
        &mut self,
        store_series: &[DailySalesPoint],
        products: &[ProductVolume],
    ) -> Vec<ProductTrend> {
        let mut trends: Vec<ProductTrend> = products
            .iter()
            .take(self.limit)
            .map(|product| {
                let growth = self.strategy.growth_percent(product, store_series);
                let growth = if growth.is_finite() { round_to(growth, 1) } else { 0.0 };
                ProductTrend {
                    name: product.name.clone(),
                    value: product.value,
                    growth,
                    trend: TrendDirection::from_growth(growth),
                }
            })
            .collect();

        trends.sort_by(|left, right| right.growth.total_cmp(&left.growth));
        trends
    }
}

/// Ranks the top products with the deterministic default strategy.
pub fn predict_top_products(
    store_series: &[DailySalesPoint],
    products: &[ProductVolume],
) -> Vec<ProductTrend> {
    TrendRanker::new(HalfOverHalfGrowth).rank(store_series, products)
}
