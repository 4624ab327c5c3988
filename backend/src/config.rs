use log::{info, warn};
use std::{env, fmt::Display, path::PathBuf, str::FromStr};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid {key} value '{value}': {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Runtime settings read from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// SQLite database file.
    pub database_path: PathBuf,
    /// Root directory for uploaded survey images and avatars, served under `/storage`.
    pub storage_dir: PathBuf,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        Ok(Self {
            host: try_load("SURVEY_HOST", "127.0.0.1")?,
            port: try_load("SURVEY_PORT", "8080")?,
            database_path: try_load("SURVEY_DATABASE", "survey.sqlite")?,
            storage_dir: try_load("SURVEY_STORAGE_DIR", "storage")?,
        })
    }

    pub fn url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

fn var(key: &str) -> Option<String> {
    env::var(key)
        .map_err(|e| {
            if let env::VarError::NotUnicode(_) = e {
                warn!("Environment variable {key} is not valid unicode, ignoring it");
            }
        })
        .ok()
}

fn try_load<T: FromStr>(key: &'static str, default: &str) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    let value = var(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });

    value.parse().map_err(|e: T::Err| ConfigError::Invalid {
        key,
        reason: e.to_string(),
        value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_unset() {
        let port: u16 = try_load("SURVEY_TEST_UNSET_PORT", "8080").unwrap();
        assert_eq!(port, 8080);
    }

    #[test]
    fn invalid_values_are_reported() {
        let err = try_load::<u16>("SURVEY_TEST_UNSET_PORT_BAD", "not-a-port").unwrap_err();
        assert!(err.to_string().contains("SURVEY_TEST_UNSET_PORT_BAD"));
    }
}
