use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::evaluation::flags::FlagThresholds;

/// Application configuration loaded from environment variables.
/// Every variable has a default; only malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Remote scorer is enabled only when this is set.
    pub anthropic_api_key: Option<String>,
    pub remote_timeout: Duration,
    pub remote_max_attempts: u32,
    /// JSON catalogue file; the built-in catalogue is used when unset.
    pub catalogue_path: Option<PathBuf>,
    pub port: u16,
    pub rust_log: String,
    /// Review-flag thresholds; each one overridable via `FLAG_*`.
    pub flag_thresholds: FlagThresholds,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_source(|key| std::env::var(key).ok())
    }

    fn from_source(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let optional = |key: &str| var(key).filter(|v| !v.trim().is_empty());

        Ok(Config {
            anthropic_api_key: optional("ANTHROPIC_API_KEY"),
            remote_timeout: Duration::from_secs(parse_or(
                &var,
                "REMOTE_SCORER_TIMEOUT_SECS",
                60u64,
            )?),
            remote_max_attempts: parse_or(&var, "REMOTE_SCORER_MAX_ATTEMPTS", 1u32)?,
            catalogue_path: optional("CATALOGUE_PATH").map(PathBuf::from),
            port: parse_or(&var, "PORT", 8080u16)?,
            rust_log: var("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            flag_thresholds: flag_thresholds(&var)?,
        })
    }
}

fn flag_thresholds(var: &impl Fn(&str) -> Option<String>) -> Result<FlagThresholds> {
    let d = FlagThresholds::default();
    Ok(FlagThresholds {
        min_chars: parse_or(var, "FLAG_MIN_CHARS", d.min_chars)?,
        min_words: parse_or(var, "FLAG_MIN_WORDS", d.min_words)?,
        min_academic_markers: parse_or(var, "FLAG_MIN_ACADEMIC_MARKERS", d.min_academic_markers)?,
        off_topic_max_chars: parse_or(var, "FLAG_OFF_TOPIC_MAX_CHARS", d.off_topic_max_chars)?,
        casual_phrase_limit: parse_or(var, "FLAG_CASUAL_PHRASE_LIMIT", d.casual_phrase_limit)?,
        below_standard_max_words: parse_or(
            var,
            "FLAG_BELOW_STANDARD_MAX_WORDS",
            d.below_standard_max_words,
        )?,
        boilerplate_limit: parse_or(var, "FLAG_BOILERPLATE_LIMIT", d.boilerplate_limit)?,
    })
}

fn parse_or<T>(var: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match var(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Result<Config> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_source(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.rust_log, "info");
        assert_eq!(cfg.remote_timeout, Duration::from_secs(60));
        assert_eq!(cfg.remote_max_attempts, 1);
        assert!(cfg.anthropic_api_key.is_none());
        assert!(cfg.catalogue_path.is_none());
        assert_eq!(cfg.flag_thresholds, FlagThresholds::default());
    }

    #[test]
    fn test_flag_threshold_overrides() {
        let cfg = config(&[("FLAG_MIN_WORDS", "150"), ("FLAG_BOILERPLATE_LIMIT", "1")]).unwrap();
        assert_eq!(cfg.flag_thresholds.min_words, 150);
        assert_eq!(cfg.flag_thresholds.boilerplate_limit, 1);
        assert_eq!(
            cfg.flag_thresholds.min_chars,
            FlagThresholds::default().min_chars
        );

        let err = config(&[("FLAG_MIN_CHARS", "-3")]).unwrap_err();
        assert!(err.to_string().contains("FLAG_MIN_CHARS"));
    }

    #[test]
    fn test_overrides() {
        let cfg = config(&[
            ("PORT", "9090"),
            ("ANTHROPIC_API_KEY", "sk-test"),
            ("REMOTE_SCORER_TIMEOUT_SECS", "15"),
            ("REMOTE_SCORER_MAX_ATTEMPTS", "3"),
            ("CATALOGUE_PATH", "/etc/grader/units.json"),
        ])
        .unwrap();
        assert_eq!(cfg.port, 9090);
        assert_eq!(cfg.anthropic_api_key.as_deref(), Some("sk-test"));
        assert_eq!(cfg.remote_timeout, Duration::from_secs(15));
        assert_eq!(cfg.remote_max_attempts, 3);
        assert_eq!(
            cfg.catalogue_path,
            Some(PathBuf::from("/etc/grader/units.json"))
        );
    }

    #[test]
    fn test_blank_api_key_disables_remote() {
        let cfg = config(&[("ANTHROPIC_API_KEY", "  ")]).unwrap();
        assert!(cfg.anthropic_api_key.is_none());
    }

    #[test]
    fn test_invalid_port_is_an_error() {
        let err = config(&[("PORT", "eighty")]).unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }
}
