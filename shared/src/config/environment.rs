//! Deployment environment and log output settings

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{or_default, parsed_or, EnvSource};
use crate::errors::ConfigError;

/// Where the process runs; anything but `production` behaves as development
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }

    pub fn is_development(&self) -> bool {
        !self.is_production()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
        }
    }

    /// `ENVIRONMENT`, falling back to development for unknown values
    pub fn from_source(source: EnvSource<'_>) -> Self {
        source("ENVIRONMENT")
            .and_then(|value| value.parse().ok())
            .unwrap_or_default()
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(ConfigError::invalid("ENVIRONMENT", format!("unknown environment {:?}", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "pretty" | "text" => Ok(LogFormat::Pretty),
            other => Err(format!("unknown log format {:?}", other)),
        }
    }
}

/// Subscriber settings; `RUST_LOG` still wins over `level` when set
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self::for_environment(Environment::default())
    }
}

impl LoggingConfig {
    /// Pretty debug output in development, JSON at info in production
    pub fn for_environment(env: Environment) -> Self {
        if env.is_production() {
            Self {
                level: "info".to_string(),
                format: LogFormat::Json,
            }
        } else {
            Self {
                level: "debug".to_string(),
                format: LogFormat::Pretty,
            }
        }
    }

    /// Environment defaults overridden by `LOG_LEVEL` and `LOG_FORMAT`
    pub fn from_source(source: EnvSource<'_>, env: Environment) -> Result<Self, ConfigError> {
        let defaults = Self::for_environment(env);
        Ok(Self {
            level: or_default(source, "LOG_LEVEL", &defaults.level),
            format: parsed_or(source, "LOG_FORMAT", defaults.format)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_parsing() {
        assert_eq!("prod".parse::<Environment>(), Ok(Environment::Production));
        assert_eq!(" Development ".parse::<Environment>(), Ok(Environment::Development));
        assert!("qa".parse::<Environment>().is_err());

        let lookup = |_: &str| Some("nonsense".to_string());
        assert_eq!(Environment::from_source(&lookup), Environment::Development);
        assert_eq!(Environment::Production.to_string(), "production");
    }

    #[test]
    fn test_logging_defaults_follow_environment() {
        assert_eq!(LoggingConfig::for_environment(Environment::Development).format, LogFormat::Pretty);
        assert_eq!(LoggingConfig::for_environment(Environment::Production).format, LogFormat::Json);
    }

    #[test]
    fn test_logging_overrides() {
        let lookup = |key: &str| match key {
            "LOG_LEVEL" => Some("warn,kk_api=debug".to_string()),
            "LOG_FORMAT" => Some("json".to_string()),
            _ => None,
        };
        let config = LoggingConfig::from_source(&lookup, Environment::Development).unwrap();
        assert_eq!(config.level, "warn,kk_api=debug");
        assert_eq!(config.format, LogFormat::Json);

        let lookup = |key: &str| (key == "LOG_FORMAT").then(|| "xml".to_string());
        let err = LoggingConfig::from_source(&lookup, Environment::Production).unwrap_err();
        assert_eq!(err.variable(), "LOG_FORMAT");
    }
}
