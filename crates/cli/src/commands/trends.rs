use std::path::PathBuf;

use basketcast_core::config::AppConfig;
use basketcast_core::forecast::{HalfOverHalfGrowth, RandomGrowth, TrendRanker};
use basketcast_core::{ApplicationError, DailySalesPoint, ProductTrend, ProductVolume};
use clap::{Args, ValueEnum};
use tracing::{info, warn};

use super::input::read_json;
use super::CommandResult;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum GrowthStrategyArg {
    /// Compare each product's first and second half of the month
    HalfOverHalf,
    /// Legacy random growth; carries no signal
    Random,
}

#[derive(Debug, Clone, Args)]
pub struct TrendsArgs {
    #[arg(long, help = "JSON array of top products ({name, value, daily?})")]
    pub input: PathBuf,
    #[arg(long, help = "JSON array of store-level daily sales points")]
    pub daily: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t = GrowthStrategyArg::HalfOverHalf)]
    pub strategy: GrowthStrategyArg,
    #[arg(long, help = "Seed for the random strategy")]
    pub seed: Option<u64>,
}

pub fn run(config: &AppConfig, args: &TrendsArgs) -> CommandResult {
    match rank(config, args) {
        Ok(trends) => CommandResult::report("trends", &trends),
        Err(error) => CommandResult::from_error("trends", error),
    }
}

fn rank(config: &AppConfig, args: &TrendsArgs) -> Result<Vec<ProductTrend>, ApplicationError> {
    let products: Vec<ProductVolume> = read_json(&args.input)?;
    let store_series: Vec<DailySalesPoint> = match &args.daily {
        Some(path) => read_json(path)?,
        None => Vec::new(),
    };
    let limit = config.forecast.trend_limit;

    let trends = match args.strategy {
        GrowthStrategyArg::HalfOverHalf => {
            TrendRanker::new(HalfOverHalfGrowth).with_limit(limit).rank(&store_series, &products)
        }
        GrowthStrategyArg::Random => {
            warn!(
                event_name = "cli.trends.random_strategy",
                "random growth strategy selected; results carry no signal"
            );
            let strategy = args.seed.map(RandomGrowth::seeded).unwrap_or_else(RandomGrowth::from_entropy);
            TrendRanker::new(strategy).with_limit(limit).rank(&store_series, &products)
        }
    };

    info!(event_name = "cli.trends.ranked", products = trends.len(), "trend ranking finished");
    Ok(trends)
}
