use crate::query::FilterPolicy;
use std::env;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_MODEL: &str = "mistralai/mistral-small-3.2-24b-instruct:free";
pub const DEFAULT_OPENROUTER_URL: &str = "https://openrouter.ai/api/v1/chat/completions";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} has an invalid value '{value}': {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: Option<String>,
    pub endpoint: String,
    pub model: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_path: String,
    pub schema_path: String,
    pub bind_addr: SocketAddr,
    pub workers: usize,
    pub city_cache_ttl: Duration,
    pub llm: LlmConfig,
    pub policy: FilterPolicy,
}

impl AppConfig {
    /// Reads `.env` if present, then the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; unset or blank keys take defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = FilterPolicy::default();

        let policy = FilterPolicy {
            property_prefixes: match get("KPI_PROPERTY_PREFIXES") {
                Some(v) => non_empty_list("KPI_PROPERTY_PREFIXES", &v)?,
                None => defaults.property_prefixes,
            },
            city_blocklist: get("KPI_CITY_BLOCKLIST")
                .map(|v| split_list(&v))
                .unwrap_or(defaults.city_blocklist),
            owner_property_ids: match get("KPI_OWNER_PROPERTY_IDS") {
                Some(v) => split_list(&v)
                    .iter()
                    .map(|id| parse("KPI_OWNER_PROPERTY_IDS", id))
                    .collect::<Result<_, _>>()?,
                None => defaults.owner_property_ids,
            },
            default_window_start: defaults.default_window_start,
        };

        Ok(Self {
            db_path: get("KPI_DB_PATH").unwrap_or_else(|| "kpi.sqlite3".into()),
            schema_path: get("KPI_SCHEMA_PATH").unwrap_or_else(|| "sql/schema.sql".into()),
            bind_addr: parse_or("KPI_BIND_ADDR", get("KPI_BIND_ADDR"), || {
                SocketAddr::from(([127, 0, 0, 1], 3000))
            })?,
            workers: parse_or("KPI_WORKERS", get("KPI_WORKERS"), || 8)?,
            city_cache_ttl: Duration::from_secs(parse_or(
                "KPI_CITY_CACHE_TTL_SECS",
                get("KPI_CITY_CACHE_TTL_SECS"),
                || 300,
            )?),
            llm: LlmConfig {
                api_key: get("OPENROUTER_API_KEY"),
                endpoint: get("OPENROUTER_URL").unwrap_or_else(|| DEFAULT_OPENROUTER_URL.into()),
                model: get("LLM_MODEL").unwrap_or_else(|| DEFAULT_MODEL.into()),
                timeout: Duration::from_secs(parse_or(
                    "LLM_TIMEOUT_SECS",
                    get("LLM_TIMEOUT_SECS"),
                    || 30,
                )?),
            },
            policy,
        })
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// An empty brand list would filter out every booking.
fn non_empty_list(var: &'static str, value: &str) -> Result<Vec<String>, ConfigError> {
    let items = split_list(value);
    if items.is_empty() {
        return Err(ConfigError::Invalid {
            var,
            value: value.to_string(),
            reason: "at least one property prefix is required".into(),
        });
    }
    Ok(items)
}

fn parse<T>(var: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.parse().map_err(|e: T::Err| ConfigError::Invalid {
        var,
        value: value.to_string(),
        reason: e.to_string(),
    })
}

fn parse_or<T, D>(var: &'static str, value: Option<String>, default: D) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    D: FnOnce() -> T,
{
    match value {
        Some(v) => parse(var, &v),
        None => Ok(default()),
    }
}
