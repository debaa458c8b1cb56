//! Configuration loading and representation.
//!
//! Values come from the process environment, optionally seeded from a `.env`
//! file in the working directory. Only the platform token is required.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use ledgerbot_observability::LogFormat;

pub const TOKEN_VAR: &str = "DISCORD_TOKEN";
pub const LEDGER_PATH_VAR: &str = "LEDGER_PATH";
pub const STAFF_ROLE_VAR: &str = "STAFF_ROLE_NAME";
pub const AUTOSAVE_VAR: &str = "AUTOSAVE_INTERVAL_SECS";
pub const LOG_FORMAT_VAR: &str = "LOG_FORMAT";

pub const DEFAULT_LEDGER_PATH: &str = "userdata.json";
pub const DEFAULT_STAFF_ROLE: &str = "Staff 👷‍♂️";
pub const DEFAULT_AUTOSAVE_INTERVAL: Duration = Duration::from_secs(5 * 60);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("DISCORD_TOKEN environment variable is required")]
    MissingToken,

    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Clone)]
pub struct BotConfig {
    pub discord_token: String,
    pub ledger_path: PathBuf,
    pub staff_role_name: String,
    pub autosave_interval: Duration,
    pub log_format: LogFormat,
}

impl core::fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BotConfig")
            .field("discord_token", &"<redacted>")
            .field("ledger_path", &self.ledger_path)
            .field("staff_role_name", &self.staff_role_name)
            .field("autosave_interval", &self.autosave_interval)
            .field("log_format", &self.log_format)
            .finish()
    }
}

impl BotConfig {
    /// Read configuration from `.env` (if present) and the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        // A missing .env file is normal in production.
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Parse configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let discord_token = get(TOKEN_VAR).ok_or(ConfigError::MissingToken)?;

        let ledger_path = get(LEDGER_PATH_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_LEDGER_PATH));

        let staff_role_name = get(STAFF_ROLE_VAR).unwrap_or_else(|| DEFAULT_STAFF_ROLE.to_string());

        let autosave_interval = match get(AUTOSAVE_VAR) {
            None => DEFAULT_AUTOSAVE_INTERVAL,
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(ConfigError::Invalid {
                        key: AUTOSAVE_VAR,
                        reason: format!("expected a positive number of seconds, got '{raw}'"),
                    });
                }
            },
        };

        let log_format = match get(LOG_FORMAT_VAR) {
            None => LogFormat::default(),
            Some(raw) => raw.parse::<LogFormat>().map_err(|e| ConfigError::Invalid {
                key: LOG_FORMAT_VAR,
                reason: e.to_string(),
            })?,
        };

        Ok(Self {
            discord_token,
            ledger_path,
            staff_role_name,
            autosave_interval,
            log_format,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn parse(pairs: &[(&str, &str)]) -> Result<BotConfig, ConfigError> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        BotConfig::from_lookup(|k| env.get(k).cloned())
    }

    #[test]
    fn token_is_required() {
        assert_eq!(parse(&[]).unwrap_err(), ConfigError::MissingToken);
        assert_eq!(parse(&[(TOKEN_VAR, "  ")]).unwrap_err(), ConfigError::MissingToken);
    }

    #[test]
    fn defaults_apply_when_only_token_is_set() {
        let cfg = parse(&[(TOKEN_VAR, "abc")]).unwrap();
        assert_eq!(cfg.discord_token, "abc");
        assert_eq!(cfg.ledger_path, PathBuf::from("userdata.json"));
        assert_eq!(cfg.staff_role_name, "Staff 👷‍♂️");
        assert_eq!(cfg.autosave_interval, Duration::from_secs(300));
        assert_eq!(cfg.log_format, LogFormat::Json);
    }

    #[test]
    fn overrides_are_honoured() {
        let cfg = parse(&[
            (TOKEN_VAR, "abc"),
            (LEDGER_PATH_VAR, "/var/lib/bot/ledger.json"),
            (STAFF_ROLE_VAR, "Banker"),
            (AUTOSAVE_VAR, "60"),
            (LOG_FORMAT_VAR, "pretty"),
        ])
        .unwrap();
        assert_eq!(cfg.ledger_path, PathBuf::from("/var/lib/bot/ledger.json"));
        assert_eq!(cfg.staff_role_name, "Banker");
        assert_eq!(cfg.autosave_interval, Duration::from_secs(60));
        assert_eq!(cfg.log_format, LogFormat::Pretty);
    }

    #[test]
    fn bad_interval_and_format_are_rejected() {
        for bad in ["0", "-1", "five"] {
            let err = parse(&[(TOKEN_VAR, "abc"), (AUTOSAVE_VAR, bad)]).unwrap_err();
            assert!(matches!(err, ConfigError::Invalid { key: AUTOSAVE_VAR, .. }));
        }
        let err = parse(&[(TOKEN_VAR, "abc"), (LOG_FORMAT_VAR, "xml")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: LOG_FORMAT_VAR, .. }));
    }

    #[test]
    fn debug_output_redacts_token() {
        let cfg = parse(&[(TOKEN_VAR, "super-secret")]).unwrap();
        assert!(!format!("{cfg:?}").contains("super-secret"));
    }
}
