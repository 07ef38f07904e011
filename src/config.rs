use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_INPUT: &str = "queries.csv";
pub const DEFAULT_OUTPUT: &str = "results.csv";
pub const DEFAULT_RESULT_CAP: usize = 20;
pub const DEFAULT_REQUEST_DELAY_SECS: f64 = 2.0;
pub const DEFAULT_LANG: &str = "en";
pub const DEFAULT_SEARCH_URL: &str = "https://www.google.com/search";
pub const DEFAULT_GROUP_HOST: &str = "www.facebook.com";
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:128.0) Gecko/20100101 Firefox/128.0";
pub const DEFAULT_TIMEOUT_SECS: f64 = 5.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    /// Max results requested per query.
    pub result_cap: usize,
    /// Minimum gap between two result-page fetches.
    pub request_delay: Duration,
    pub lang: String,
    /// Rows validated at once. 1 keeps the run strictly sequential.
    pub concurrency: usize,
    pub search_url: String,
    pub user_agent: String,
    pub request_timeout: Duration,
    pub group_host: String,
    pub summary_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            input_path: PathBuf::from(DEFAULT_INPUT),
            output_path: PathBuf::from(DEFAULT_OUTPUT),
            result_cap: DEFAULT_RESULT_CAP,
            request_delay: Duration::from_secs_f64(DEFAULT_REQUEST_DELAY_SECS),
            lang: DEFAULT_LANG.to_string(),
            concurrency: 1,
            search_url: DEFAULT_SEARCH_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_timeout: Duration::from_secs_f64(DEFAULT_TIMEOUT_SECS),
            group_host: DEFAULT_GROUP_HOST.to_string(),
            summary_path: None,
        }
    }
}

impl Config {
    /// Build a config from `GROUPCHECK_*` environment variables, loading a
    /// `.env` file first if present. Unset variables keep their defaults.
    pub fn from_env() -> Result<Config> {
        dotenv().ok();
        let defaults = Config::default();
        Ok(Config {
            input_path: get_env("GROUPCHECK_INPUT")
                .map(PathBuf::from)
                .unwrap_or(defaults.input_path),
            output_path: get_env("GROUPCHECK_OUTPUT")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_path),
            result_cap: parse_env_or("GROUPCHECK_RESULT_CAP", defaults.result_cap)?,
            request_delay: secs_env_or("GROUPCHECK_REQUEST_DELAY_SECS", defaults.request_delay)?,
            lang: get_env("GROUPCHECK_LANG").unwrap_or(defaults.lang),
            concurrency: parse_env_or("GROUPCHECK_CONCURRENCY", defaults.concurrency)?,
            search_url: get_env("GROUPCHECK_SEARCH_URL").unwrap_or(defaults.search_url),
            user_agent: get_env("GROUPCHECK_USER_AGENT").unwrap_or(defaults.user_agent),
            request_timeout: secs_env_or("GROUPCHECK_TIMEOUT_SECS", defaults.request_timeout)?,
            group_host: get_env("GROUPCHECK_GROUP_HOST").unwrap_or(defaults.group_host),
            summary_path: get_env("GROUPCHECK_SUMMARY").map(PathBuf::from),
        })
    }
}

fn get_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match get_env(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("invalid value for {key}: {raw:?}")),
        None => Ok(default),
    }
}

fn secs_env_or(key: &str, default: Duration) -> Result<Duration> {
    let secs: f64 = parse_env_or(key, default.as_secs_f64())?;
    parse_secs(secs).with_context(|| format!("invalid duration for {key}"))
}

pub fn parse_secs(secs: f64) -> Result<Duration> {
    Duration::try_from_secs_f64(secs).map_err(|e| anyhow::anyhow!("{secs} seconds: {e}"))
}

#[test]
fn test_default_config_matches_fixed_behaviour() {
    let config = Config::default();
    assert_eq!(config.input_path, PathBuf::from("queries.csv"));
    assert_eq!(config.output_path, PathBuf::from("results.csv"));
    assert_eq!(config.result_cap, 20);
    assert_eq!(config.request_delay, Duration::from_secs(2));
    assert_eq!(config.lang, "en");
    assert_eq!(config.concurrency, 1);
}

#[test]
fn test_parse_secs_rejects_negative() {
    assert!(parse_secs(-1.0).is_err());
    assert_eq!(parse_secs(0.5).unwrap(), Duration::from_millis(500));
}
