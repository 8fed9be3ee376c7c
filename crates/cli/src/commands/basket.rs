use std::path::PathBuf;

use basketcast_core::config::AppConfig;
use basketcast_core::{analyze_basket, ApplicationError, BasketAnalysisReport, OrderLineRecord};
use clap::Args;
use tracing::info;

use super::input::read_json;
use super::CommandResult;

#[derive(Debug, Clone, Args)]
pub struct BasketArgs {
    #[arg(long, help = "JSON array of order lines ({order_id, product_name})")]
    pub input: PathBuf,
    #[arg(long, help = "Minimum pair support as a fraction in (0, 1]")]
    pub min_support: Option<f64>,
    #[arg(long, help = "Minimum rule confidence as a fraction in (0, 1]")]
    pub min_confidence: Option<f64>,
    #[arg(long, help = "Maximum pairs and recommendations returned")]
    pub top_n: Option<usize>,
}

pub fn run(config: &AppConfig, args: &BasketArgs) -> CommandResult {
    match analyze(config, args) {
        Ok(report) => CommandResult::report("basket", &report),
        Err(error) => CommandResult::from_error("basket", error),
    }
}

fn analyze(config: &AppConfig, args: &BasketArgs) -> Result<BasketAnalysisReport, ApplicationError> {
    let mut options = config.basket_options();
    if let Some(min_support) = args.min_support {
        options = options.with_min_support(min_support);
    }
    if let Some(min_confidence) = args.min_confidence {
        options = options.with_min_confidence(min_confidence);
    }
    if let Some(top_n) = args.top_n {
        options = options.with_top_n(top_n);
    }
    options.validate()?;

    let records: Vec<OrderLineRecord> = read_json(&args.input)?;
    let report = analyze_basket(&records, &options)?;

    info!(
        event_name = "cli.basket.analyzed",
        order_lines = records.len(),
        transactions = report.stats.total_transactions,
        recommendations = report.recommendations.len(),
        "basket analysis finished"
    );
    Ok(report)
}
