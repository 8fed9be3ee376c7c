use std::env;
use std::fs;
use std::path::Path;

use basketcast_core::config::{resolve_config_path, AppConfig};
use serde::Serialize;
use serde_json::json;
use toml::Value;

use super::CommandResult;

const PRECEDENCE: &str = "flag > env > file > default";

#[derive(Debug, Serialize)]
struct ConfigReport {
    precedence: &'static str,
    config_file: Option<String>,
    entries: Vec<ConfigEntry>,
}

#[derive(Debug, Serialize)]
struct ConfigEntry {
    key: &'static str,
    value: serde_json::Value,
    source: ValueSource,
}

#[derive(Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum ValueSource {
    Env { variable: String },
    File { path: String },
    Default,
}

/// Reports the effective configuration with the source of every value.
pub fn run(config: &AppConfig, config_path: Option<&Path>) -> CommandResult {
    let config_file_path = resolve_config_path(config_path);
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let source = |key_path: &str, env_keys: &[&str]| {
        field_source(key_path, env_keys, config_file_doc.as_ref(), config_file_path.as_deref())
    };

    let values: Vec<(&'static str, serde_json::Value, &[&str])> = vec![
        (
            "basket.min_support",
            json!(config.basket.min_support),
            &["BASKETCAST_BASKET_MIN_SUPPORT"] as &[&str],
        ),
        (
            "basket.min_confidence",
            json!(config.basket.min_confidence),
            &["BASKETCAST_BASKET_MIN_CONFIDENCE"] as &[&str],
        ),
        ("basket.top_n", json!(config.basket.top_n), &["BASKETCAST_BASKET_TOP_N"] as &[&str]),
        (
            "forecast.variance_percent",
            json!(config.forecast.variance_percent),
            &["BASKETCAST_FORECAST_VARIANCE_PERCENT"] as &[&str],
        ),
        (
            "forecast.meta_percent",
            json!(config.forecast.meta_percent),
            &["BASKETCAST_FORECAST_META_PERCENT"] as &[&str],
        ),
        (
            "forecast.trend_limit",
            json!(config.forecast.trend_limit),
            &["BASKETCAST_FORECAST_TREND_LIMIT"] as &[&str],
        ),
        (
            "logging.level",
            json!(config.logging.level),
            &["BASKETCAST_LOGGING_LEVEL", "BASKETCAST_LOG_LEVEL"] as &[&str],
        ),
        (
            "logging.format",
            json!(config.logging.format.as_str()),
            &["BASKETCAST_LOGGING_FORMAT", "BASKETCAST_LOG_FORMAT"] as &[&str],
        ),
    ];

    let entries = values
        .into_iter()
        .map(|(key, value, env_keys)| ConfigEntry { key, value, source: source(key, env_keys) })
        .collect();
    let report = ConfigReport {
        precedence: PRECEDENCE,
        config_file: config_file_path.map(|path| path.display().to_string()),
        entries,
    };
    CommandResult::report("config", &report)
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> ValueSource {
    if let Some(env_key) = env_keys.iter().find(|key| env_value_set(key)) {
        return ValueSource::Env { variable: (*env_key).to_string() };
    }

    if let (Some(doc), Some(path)) = (config_file_doc, config_file_path) {
        if contains_path(doc, key_path) {
            return ValueSource::File { path: path.display().to_string() };
        }
    }

    ValueSource::Default
}

/// Blank values are ignored by the config loader, so they never count as a source.
fn env_value_set(key: &str) -> bool {
    env::var(key).map(|value| !value.trim().is_empty()).unwrap_or(false)
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}
