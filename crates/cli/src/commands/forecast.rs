use std::path::PathBuf;

use basketcast_core::config::AppConfig;
use basketcast_core::{
    forecast_month, ApplicationError, DailySalesPoint, DomainError, ForecastReport, MonthContext,
};
use chrono::Utc;
use clap::Args;
use tracing::info;

use super::input::read_json;
use super::CommandResult;

#[derive(Debug, Clone, Args)]
pub struct ForecastArgs {
    #[arg(long, help = "JSON array of daily sales points ({day, sales})")]
    pub input: PathBuf,
    #[arg(long, help = "Monthly budget the target is derived from")]
    pub budget: f64,
    #[arg(long, conflicts_with = "month", help = "Length of the projected month")]
    pub days_in_month: Option<u32>,
    #[arg(long, help = "Projected month as YYYY-MM (defaults to the current month)")]
    pub month: Option<String>,
    #[arg(long, help = "Target as a percentage of the budget")]
    pub meta_percent: Option<f64>,
    #[arg(long, help = "Scenario band width in percent")]
    pub variance_percent: Option<f64>,
}

pub fn run(config: &AppConfig, args: &ForecastArgs) -> CommandResult {
    match forecast(config, args) {
        Ok(report) => CommandResult::report("forecast", &report),
        Err(error) => CommandResult::from_error("forecast", error),
    }
}

fn forecast(config: &AppConfig, args: &ForecastArgs) -> Result<ForecastReport, ApplicationError> {
    let mut options = config.forecast_options();
    if let Some(meta_percent) = args.meta_percent {
        options = options.with_meta_percent(meta_percent);
    }
    if let Some(variance_percent) = args.variance_percent {
        options = options.with_variance_percent(variance_percent);
    }
    options.validate()?;

    let days_in_month = resolve_days_in_month(args)?;
    let points: Vec<DailySalesPoint> = read_json(&args.input)?;
    let report = forecast_month(&points, args.budget, days_in_month, &options)?;

    info!(
        event_name = "cli.forecast.projected",
        days_in_month,
        days_observed = report.projection.days_observed,
        probability = report.probability,
        "forecast finished"
    );
    Ok(report)
}

fn resolve_days_in_month(args: &ForecastArgs) -> Result<u32, DomainError> {
    if let Some(days_in_month) = args.days_in_month {
        return Ok(days_in_month);
    }

    match args.month.as_deref() {
        Some(month) => Ok(parse_month(month)?.days_in_month),
        None => Ok(MonthContext::from_date(Utc::now().date_naive()).days_in_month),
    }
}

fn parse_month(value: &str) -> Result<MonthContext, DomainError> {
    let invalid = || DomainError::invalid_option("month", format!("expected YYYY-MM, got `{value}`"));
    let (year, month) = value.trim().split_once('-').ok_or_else(invalid)?;
    let year = year.parse::<i32>().map_err(|_| invalid())?;
    let month = month.parse::<u32>().map_err(|_| invalid())?;
    MonthContext::new(year, month)
}

#[cfg(test)]
mod tests {
    use super::parse_month;

    #[test]
    fn parses_year_month() {
        let context = parse_month("2024-02").expect("valid month");
        assert_eq!(context.days_in_month, 29);
    }

    #[test]
    fn rejects_malformed_month() {
        assert!(parse_month("2024/02").is_err());
        assert!(parse_month("2024-13").is_err());
        assert!(parse_month("feb").is_err());
    }
}
