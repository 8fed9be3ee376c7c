pub mod commands;
pub mod logging;

use std::path::PathBuf;
use std::process::ExitCode;

use basketcast_core::config::{AppConfig, LoadOptions};
use clap::{Parser, Subcommand};
use tracing::info;
use uuid::Uuid;

use commands::basket::BasketArgs;
use commands::forecast::ForecastArgs;
use commands::trends::TrendsArgs;
use commands::CommandResult;

#[derive(Debug, Parser)]
#[command(
    name = "basketcast",
    about = "Basketcast retail analytics CLI",
    long_about = "Mine cross-sell recommendations from order lines and project month-end sales from daily series.",
    after_help = "Examples:\n  basketcast basket --input orders.json --top-n 5\n  basketcast forecast --input daily.json --budget 120000 --month 2026-10\n  basketcast trends --input products.json\n  basketcast config"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Path to basketcast.toml")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Run market-basket analysis and print pairs, recommendations and stats")]
    Basket(BasketArgs),
    #[command(about = "Project month-end sales, achievement probability and scenarios")]
    Forecast(ForecastArgs),
    #[command(about = "Rank top products by growth")]
    Trends(TrendsArgs),
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Self::Basket(_) => "basket",
            Self::Forecast(_) => "forecast",
            Self::Trends(_) => "trends",
            Self::Config => "config",
        }
    }
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    let command_name = cli.command.name();

    let config = match AppConfig::load(LoadOptions {
        config_path: cli.config.clone(),
        require_file: cli.config.is_some(),
        ..LoadOptions::default()
    }) {
        Ok(config) => config,
        Err(error) => {
            let result =
                CommandResult::failure(command_name, "config_validation", error.to_string(), 2);
            println!("{}", result.output);
            return ExitCode::from(result.exit_code);
        }
    };
    logging::init_logging(&config);

    let correlation_id = Uuid::new_v4().to_string();
    let span = tracing::info_span!("command", command = command_name, correlation_id = %correlation_id);
    let _entered = span.enter();
    info!(event_name = "cli.command.start", "command started");

    let result = match &cli.command {
        Command::Basket(args) => commands::basket::run(&config, args),
        Command::Forecast(args) => commands::forecast::run(&config, args),
        Command::Trends(args) => commands::trends::run(&config, args),
        Command::Config => commands::config::run(&config, cli.config.as_deref()),
    };

    info!(event_name = "cli.command.finished", exit_code = result.exit_code, "command finished");
    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
