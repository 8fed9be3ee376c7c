//! Retail decision-support analytics: market-basket recommendations and
//! month-end sales forecasting over in-memory data.

pub mod basket;
pub mod config;
pub mod errors;
pub mod forecast;

mod rounding;

pub use basket::{
    analyze_basket, AssociationRule, BasketAnalysisReport, BasketAnalyzer, BasketOptions,
    BasketStats, ItemPairStat, OrderLineRecord, Recommendation, RecommendationStrength,
    Transaction,
};
pub use errors::{ApplicationError, DomainError};
pub use forecast::{
    calculate_month_end_projection, calculate_target_probability, forecast_month,
    generate_scenarios, get_daily_projections, predict_top_products, DailyProjectionPoint,
    DailySalesPoint, ForecastOptions, ForecastReport, MonthContext, ProductTrend, ProductVolume,
    Projection, RegressionModel, ScenarioSet, TrendDirection,
};
