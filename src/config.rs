use anyhow::Context;
use tracing::warn;

use crate::locale::Locale;

const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: Option<String>,
    pub locale: Locale,
    pub max_connections: u32,
}

impl Config {
    /// Reads settings from the environment. Call after `dotenvy::dotenv()`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let locale = match lookup("SCHEDULE_LOCALE") {
            Some(tag) => Locale::from_tag(&tag).unwrap_or_else(|| {
                warn!(tag = %tag, "unknown SCHEDULE_LOCALE, using Thai");
                Locale::Thai
            }),
            None => Locale::default(),
        };

        let max_connections = lookup("DATABASE_MAX_CONNECTIONS")
            .and_then(|value| value.parse::<u32>().ok())
            .filter(|value| *value > 0)
            .unwrap_or(DEFAULT_MAX_CONNECTIONS);

        Self {
            database_url: lookup("DATABASE_URL").filter(|url| !url.trim().is_empty()),
            locale,
            max_connections,
        }
    }

    pub fn database_url(&self) -> anyhow::Result<&str> {
        self.database_url
            .as_deref()
            .context("DATABASE_URL must be set to reach the club schedule database")
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> Config {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn defaults_without_environment() {
        let config = config_from(&[]);
        assert_eq!(config.locale, Locale::Thai);
        assert_eq!(config.max_connections, 5);
        assert!(config.database_url().is_err());
    }

    #[test]
    fn reads_overrides() {
        let config = config_from(&[
            ("DATABASE_URL", "postgres://localhost/clubs"),
            ("SCHEDULE_LOCALE", "en"),
            ("DATABASE_MAX_CONNECTIONS", "12"),
        ]);
        assert_eq!(config.database_url().unwrap(), "postgres://localhost/clubs");
        assert_eq!(config.locale, Locale::English);
        assert_eq!(config.max_connections, 12);
    }

    #[test]
    fn ignores_bad_values() {
        let config = config_from(&[
            ("SCHEDULE_LOCALE", "klingon"),
            ("DATABASE_MAX_CONNECTIONS", "zero"),
            ("DATABASE_URL", "  "),
        ]);
        assert_eq!(config.locale, Locale::Thai);
        assert_eq!(config.max_connections, 5);
        assert!(config.database_url.is_none());
    }
}
