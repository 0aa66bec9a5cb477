use std::env::{self, VarError};
use std::str::FromStr;
use std::time::Duration;

use chrono::TimeDelta;
use log::{debug, error, info};

use crate::error::{BotError, Result};

const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";
const DEFAULT_GEMINI_TIMEOUT_SECS: u64 = 120;
const DEFAULT_GENERATION_WORKERS: usize = 4;
const DEFAULT_HISTORY_MAX_TURNS: usize = 20;
const DEFAULT_HISTORY_EXPIRE_HOURS: i64 = 24;

#[derive(Debug, Clone)]
pub struct Config {
    pub discord_token: String,
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub gemini_timeout: Duration,
    pub generation_workers: usize,
    pub history_max_turns: usize,
    pub history_ttl: TimeDelta,
}

impl Config {
    /// Load configuration from the process environment (and `.env`, if any).
    ///
    /// # Errors
    ///
    /// See [`Config::from_lookup`].
    pub fn from_env() -> Result<Self> {
        debug!("Loading configuration from environment");
        dotenvy::dotenv().ok();

        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build the configuration from `lookup`, which returns a variable's
    /// value or `None` when it is unset.
    ///
    /// # Errors
    ///
    /// Returns `EnvVar` if a credential is missing and `Config` if an
    /// optional setting is present but malformed or out of range.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let discord_token = required(&lookup, "DISCORD_TOKEN")?;
        let gemini_api_key = required(&lookup, "GEMINI_API_KEY")?;

        let gemini_model =
            lookup("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string());

        let gemini_timeout = Duration::from_secs(parse_optional(
            "GEMINI_TIMEOUT_SECS",
            lookup("GEMINI_TIMEOUT_SECS"),
            DEFAULT_GEMINI_TIMEOUT_SECS,
        )?);
        let generation_workers = parse_positive(
            "GENERATION_WORKERS",
            lookup("GENERATION_WORKERS"),
            DEFAULT_GENERATION_WORKERS,
        )?;
        let history_max_turns = parse_positive(
            "HISTORY_MAX_TURNS",
            lookup("HISTORY_MAX_TURNS"),
            DEFAULT_HISTORY_MAX_TURNS,
        )?;
        let history_expire_hours = parse_positive(
            "HISTORY_EXPIRE_HOURS",
            lookup("HISTORY_EXPIRE_HOURS"),
            DEFAULT_HISTORY_EXPIRE_HOURS,
        )?;
        let history_ttl = TimeDelta::try_hours(history_expire_hours).ok_or_else(|| {
            BotError::Config(format!(
                "HISTORY_EXPIRE_HOURS is out of range: {history_expire_hours}"
            ))
        })?;

        info!("Configuration loaded successfully");
        debug!("Discord token length: {} characters", discord_token.len());
        debug!("Gemini API key length: {} characters", gemini_api_key.len());
        debug!("Gemini model: {gemini_model}");
        debug!("Gemini timeout: {}s", gemini_timeout.as_secs());
        debug!("Generation workers: {generation_workers}");
        debug!("History: {history_max_turns} turns, expires after {history_expire_hours}h");

        Ok(Self {
            discord_token,
            gemini_api_key,
            gemini_model,
            gemini_timeout,
            generation_workers,
            history_max_turns,
            history_ttl,
        })
    }
}

fn required(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Result<String> {
    lookup(name).ok_or_else(|| {
        error!("Failed to load {name} from environment: {}", VarError::NotPresent);
        BotError::EnvVar(VarError::NotPresent)
    })
}

fn parse_optional<T>(name: &str, raw: Option<String>, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|e| {
            error!("Invalid value for {name}: {e}");
            BotError::Config(format!("{name} must be a number, got '{value}'"))
        }),
    }
}

fn parse_positive<T>(name: &str, raw: Option<String>, default: T) -> Result<T>
where
    T: FromStr + PartialOrd + Default,
    T::Err: std::fmt::Display,
{
    let value = parse_optional(name, raw, default)?;
    if value <= T::default() {
        return Err(BotError::Config(format!("{name} must be at least 1")));
    }
    Ok(value)
}
