use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::basket::{BasketOptions, DEFAULT_MIN_CONFIDENCE, DEFAULT_MIN_SUPPORT, DEFAULT_TOP_N};
use crate::forecast::{
    ForecastOptions, DEFAULT_META_PERCENT, DEFAULT_TREND_LIMIT, DEFAULT_VARIANCE_PERCENT,
};

pub const CONFIG_FILE_NAME: &str = "basketcast.toml";
pub const NESTED_CONFIG_FILE: &str = "config/basketcast.toml";

#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    pub basket: BasketConfig,
    pub forecast: ForecastConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BasketConfig {
    pub min_support: f64,
    pub min_confidence: f64,
    pub top_n: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ForecastConfig {
    pub variance_percent: f64,
    pub meta_percent: f64,
    pub trend_limit: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub min_support: Option<f64>,
    pub min_confidence: Option<f64>,
    pub top_n: Option<usize>,
    pub variance_percent: Option<f64>,
    pub meta_percent: Option<f64>,
    pub trend_limit: Option<usize>,
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            basket: BasketConfig {
                min_support: DEFAULT_MIN_SUPPORT,
                min_confidence: DEFAULT_MIN_CONFIDENCE,
                top_n: DEFAULT_TOP_N,
            },
            forecast: ForecastConfig {
                variance_percent: DEFAULT_VARIANCE_PERCENT,
                meta_percent: DEFAULT_META_PERCENT,
                trend_limit: DEFAULT_TREND_LIMIT,
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl LogFormat {
    /// The spelling accepted in config files and env overrides.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Compact => "compact",
            Self::Pretty => "pretty",
            Self::Json => "json",
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected =
                options.config_path.unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    pub fn basket_options(&self) -> BasketOptions {
        BasketOptions {
            min_support: self.basket.min_support,
            min_confidence: self.basket.min_confidence,
            top_n: self.basket.top_n,
        }
    }

    pub fn forecast_options(&self) -> ForecastOptions {
        ForecastOptions {
            variance_percent: self.forecast.variance_percent,
            meta_percent: self.forecast.meta_percent,
            trend_limit: self.forecast.trend_limit,
        }
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(basket) = patch.basket {
            if let Some(min_support) = basket.min_support {
                self.basket.min_support = min_support;
            }
            if let Some(min_confidence) = basket.min_confidence {
                self.basket.min_confidence = min_confidence;
            }
            if let Some(top_n) = basket.top_n {
                self.basket.top_n = top_n;
            }
        }

        if let Some(forecast) = patch.forecast {
            if let Some(variance_percent) = forecast.variance_percent {
                self.forecast.variance_percent = variance_percent;
            }
            if let Some(meta_percent) = forecast.meta_percent {
                self.forecast.meta_percent = meta_percent;
            }
            if let Some(trend_limit) = forecast.trend_limit {
                self.forecast.trend_limit = trend_limit;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("BASKETCAST_BASKET_MIN_SUPPORT") {
            self.basket.min_support = parse_f64("BASKETCAST_BASKET_MIN_SUPPORT", &value)?;
        }
        if let Some(value) = read_env("BASKETCAST_BASKET_MIN_CONFIDENCE") {
            self.basket.min_confidence = parse_f64("BASKETCAST_BASKET_MIN_CONFIDENCE", &value)?;
        }
        if let Some(value) = read_env("BASKETCAST_BASKET_TOP_N") {
            self.basket.top_n = parse_usize("BASKETCAST_BASKET_TOP_N", &value)?;
        }
        if let Some(value) = read_env("BASKETCAST_FORECAST_VARIANCE_PERCENT") {
            self.forecast.variance_percent =
                parse_f64("BASKETCAST_FORECAST_VARIANCE_PERCENT", &value)?;
        }
        if let Some(value) = read_env("BASKETCAST_FORECAST_META_PERCENT") {
            self.forecast.meta_percent = parse_f64("BASKETCAST_FORECAST_META_PERCENT", &value)?;
        }
        if let Some(value) = read_env("BASKETCAST_FORECAST_TREND_LIMIT") {
            self.forecast.trend_limit = parse_usize("BASKETCAST_FORECAST_TREND_LIMIT", &value)?;
        }

        let log_level =
            read_env("BASKETCAST_LOGGING_LEVEL").or_else(|| read_env("BASKETCAST_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("BASKETCAST_LOGGING_FORMAT").or_else(|| read_env("BASKETCAST_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(min_support) = overrides.min_support {
            self.basket.min_support = min_support;
        }
        if let Some(min_confidence) = overrides.min_confidence {
            self.basket.min_confidence = min_confidence;
        }
        if let Some(top_n) = overrides.top_n {
            self.basket.top_n = top_n;
        }
        if let Some(variance_percent) = overrides.variance_percent {
            self.forecast.variance_percent = variance_percent;
        }
        if let Some(meta_percent) = overrides.meta_percent {
            self.forecast.meta_percent = meta_percent;
        }
        if let Some(trend_limit) = overrides.trend_limit {
            self.forecast.trend_limit = trend_limit;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(log_format) = overrides.log_format {
            self.logging.format = log_format;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.basket_options()
            .validate()
            .map_err(|error| ConfigError::Validation(format!("basket: {error}")))?;
        self.forecast_options()
            .validate()
            .map_err(|error| ConfigError::Validation(format!("forecast: {error}")))?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

/// The config file `load` would read for `explicit_path`, if any exists.
pub fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from(CONFIG_FILE_NAME), PathBuf::from(NESTED_CONFIG_FILE)]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;
    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();
            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_f64(key: &str, value: &str) -> Result<f64, ConfigError> {
    value.trim().parse::<f64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_usize(key: &str, value: &str) -> Result<usize, ConfigError> {
    value.trim().parse::<usize>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    basket: Option<BasketPatch>,
    forecast: Option<ForecastPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct BasketPatch {
    min_support: Option<f64>,
    min_confidence: Option<f64>,
    top_n: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
struct ForecastPatch {
    variance_percent: Option<f64>,
    meta_percent: Option<f64>,
    trend_limit: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::fs;
    use std::sync::{Mutex, OnceLock};

    use tempfile::tempdir;

    use super::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};

    const ENV_KEYS: &[&str] = &[
        "BASKETCAST_BASKET_MIN_SUPPORT",
        "BASKETCAST_BASKET_MIN_CONFIDENCE",
        "BASKETCAST_BASKET_TOP_N",
        "BASKETCAST_FORECAST_VARIANCE_PERCENT",
        "BASKETCAST_FORECAST_META_PERCENT",
        "BASKETCAST_FORECAST_TREND_LIMIT",
        "BASKETCAST_LOGGING_LEVEL",
        "BASKETCAST_LOG_LEVEL",
        "BASKETCAST_LOGGING_FORMAT",
        "BASKETCAST_LOG_FORMAT",
        "BASKETCAST_TEST_TOP_N",
    ];

    fn env_lock() -> &'static Mutex<()> {
        static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        LOCK.get_or_init(|| Mutex::new(()))
    }

    fn with_env<T>(vars: &[(&str, &str)], test: impl FnOnce() -> T) -> T {
        let _guard = env_lock().lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        for key in ENV_KEYS {
            env::remove_var(key);
        }
        for (key, value) in vars {
            env::set_var(key, value);
        }

        let result = test();

        for key in ENV_KEYS {
            env::remove_var(key);
        }
        result
    }

    #[test]
    fn defaults_are_valid_without_a_file() {
        with_env(&[], || {
            let dir = tempdir().expect("tempdir");
            let config = AppConfig::load(LoadOptions {
                config_path: Some(dir.path().join("missing.toml")),
                ..LoadOptions::default()
            })
            .expect("defaults should load");

            assert_eq!(config, AppConfig::default());
            assert_eq!(config.basket_options().top_n, 10);
            assert_eq!(config.forecast_options().variance_percent, 20.0);
        });
    }

    #[test]
    fn require_file_fails_when_missing() {
        with_env(&[], || {
            let dir = tempdir().expect("tempdir");
            let error = AppConfig::load(LoadOptions {
                config_path: Some(dir.path().join("missing.toml")),
                require_file: true,
                ..LoadOptions::default()
            })
            .expect_err("missing file should fail");

            assert!(matches!(error, ConfigError::MissingConfigFile(_)));
        });
    }

    #[test]
    fn file_values_apply_with_env_interpolation() {
        with_env(&[("BASKETCAST_TEST_TOP_N", "25")], || {
            let dir = tempdir().expect("tempdir");
            let path = dir.path().join("basketcast.toml");
            fs::write(
                &path,
                "[basket]\nmin_support = 0.05\ntop_n = ${BASKETCAST_TEST_TOP_N}\n\n\
                 [forecast]\nvariance_percent = 15.0\n\n[logging]\nformat = \"json\"\n",
            )
            .expect("write config");

            let config = AppConfig::load(LoadOptions {
                config_path: Some(path),
                require_file: true,
                ..LoadOptions::default()
            })
            .expect("file config should load");

            assert_eq!(config.basket.min_support, 0.05);
            assert_eq!(config.basket.top_n, 25);
            assert_eq!(config.basket.min_confidence, 0.3);
            assert_eq!(config.forecast.variance_percent, 15.0);
            assert_eq!(config.logging.format, LogFormat::Json);
        });
    }

    #[test]
    fn env_overrides_file_and_explicit_overrides_win() {
        with_env(
            &[("BASKETCAST_BASKET_MIN_CONFIDENCE", "0.6"), ("BASKETCAST_LOG_LEVEL", "debug")],
            || {
                let dir = tempdir().expect("tempdir");
                let path = dir.path().join("basketcast.toml");
                fs::write(&path, "[basket]\nmin_confidence = 0.4\ntop_n = 3\n").expect("write");

                let config = AppConfig::load(LoadOptions {
                    config_path: Some(path),
                    overrides: ConfigOverrides { top_n: Some(7), ..ConfigOverrides::default() },
                    ..LoadOptions::default()
                })
                .expect("config should load");

                assert_eq!(config.basket.min_confidence, 0.6);
                assert_eq!(config.basket.top_n, 7);
                assert_eq!(config.logging.level, "debug");
            },
        );
    }

    #[test]
    fn malformed_env_override_is_reported() {
        with_env(&[("BASKETCAST_BASKET_TOP_N", "many")], || {
            let error = AppConfig::load(LoadOptions {
                config_path: Some("does-not-exist.toml".into()),
                ..LoadOptions::default()
            })
            .expect_err("bad override should fail");

            assert!(matches!(error, ConfigError::InvalidEnvOverride { ref key, .. } if key == "BASKETCAST_BASKET_TOP_N"));
        });
    }

    #[test]
    fn out_of_range_thresholds_fail_validation() {
        with_env(&[], || {
            let error = AppConfig::load(LoadOptions {
                config_path: Some("does-not-exist.toml".into()),
                overrides: ConfigOverrides { min_support: Some(1.5), ..ConfigOverrides::default() },
                ..LoadOptions::default()
            })
            .expect_err("invalid support should fail");

            assert!(error.to_string().contains("min_support"));
        });
    }

    #[test]
    fn unterminated_interpolation_is_rejected() {
        with_env(&[], || {
            let dir = tempdir().expect("tempdir");
            let path = dir.path().join("basketcast.toml");
            fs::write(&path, "[logging]\nlevel = \"${BASKETCAST_LOG\"\n").expect("write");

            let error = AppConfig::load(LoadOptions {
                config_path: Some(path),
                ..LoadOptions::default()
            })
            .expect_err("unterminated interpolation should fail");

            assert!(matches!(error, ConfigError::UnterminatedInterpolation));
        });
    }

    #[test]
    fn log_format_spelling_round_trips_through_parse() {
        for format in [LogFormat::Compact, LogFormat::Pretty, LogFormat::Json] {
            assert_eq!(format.as_str().parse::<LogFormat>().expect("known format"), format);
        }
    }

    #[test]
    fn unknown_log_level_fails_validation() {
        with_env(&[], || {
            let error = AppConfig::load(LoadOptions {
                config_path: Some("does-not-exist.toml".into()),
                overrides: ConfigOverrides {
                    log_level: Some("verbose".to_string()),
                    ..ConfigOverrides::default()
                },
                ..LoadOptions::default()
            })
            .expect_err("invalid level should fail");

            assert!(error.to_string().contains("logging.level"));
        });
    }
}
