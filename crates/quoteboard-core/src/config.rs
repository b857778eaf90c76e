use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::cache::DEFAULT_CACHE_TTL;
use crate::{ProviderId, ValidationError};

pub const ENV_PROVIDER: &str = "QUOTEBOARD_PROVIDER";
pub const ENV_API_KEY: &str = "QUOTEBOARD_ALPHAVANTAGE_API_KEY";
pub const ENV_API_KEY_FALLBACK: &str = "ALPHAVANTAGE_API_KEY";
pub const ENV_CACHE_TTL_SECS: &str = "QUOTEBOARD_CACHE_TTL_SECS";
pub const ENV_RSI_SOURCE: &str = "QUOTEBOARD_RSI_SOURCE";

/// Where a quote's RSI reading comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RsiSource {
    /// The provider's indicator endpoint, or `Local` when it has none.
    #[default]
    Upstream,
    /// Computed from the provider's 5-minute intraday closes.
    Local,
    /// No RSI on quotes.
    Off,
}

impl RsiSource {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Upstream => "upstream",
            Self::Local => "local",
            Self::Off => "off",
        }
    }
}

impl Display for RsiSource {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RsiSource {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "upstream" => Ok(Self::Upstream),
            "local" => Ok(Self::Local),
            "off" | "none" => Ok(Self::Off),
            other => Err(ValidationError::InvalidRsiSource {
                value: other.to_owned(),
            }),
        }
    }
}

/// Service settings resolved from defaults and the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub provider: ProviderId,
    pub api_key: Option<String>,
    pub cache_ttl: Duration,
    pub rsi_source: RsiSource,
    /// Route every request to the no-op transport.
    pub offline: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            provider: ProviderId::Alphavantage,
            api_key: None,
            cache_ttl: DEFAULT_CACHE_TTL,
            rsi_source: RsiSource::default(),
            offline: false,
        }
    }
}

impl ServiceConfig {
    /// Defaults overridden by `QUOTEBOARD_*` environment variables.
    ///
    /// Unparseable values are skipped with a warning.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`from_env`](Self::from_env) over an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_PROVIDER) {
            match raw.parse::<ProviderId>() {
                Ok(provider) => config.provider = provider,
                Err(error) => warn!(var = ENV_PROVIDER, %error, "ignoring environment value"),
            }
        }

        config.api_key = [ENV_API_KEY, ENV_API_KEY_FALLBACK]
            .iter()
            .filter_map(|name| lookup(*name))
            .map(|key| key.trim().to_owned())
            .find(|key| !key.is_empty());

        if let Some(raw) = lookup(ENV_CACHE_TTL_SECS) {
            match raw.trim().parse::<u64>() {
                Ok(seconds) => config.cache_ttl = Duration::from_secs(seconds),
                Err(error) => warn!(var = ENV_CACHE_TTL_SECS, %error, "ignoring environment value"),
            }
        }

        if let Some(raw) = lookup(ENV_RSI_SOURCE) {
            match raw.parse::<RsiSource>() {
                Ok(source) => config.rsi_source = source,
                Err(error) => warn!(var = ENV_RSI_SOURCE, %error, "ignoring environment value"),
            }
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars = vars
            .iter()
            .map(|(name, value)| ((*name).to_owned(), (*value).to_owned()))
            .collect::<HashMap<_, _>>();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn defaults_without_environment() {
        let config = ServiceConfig::from_lookup(lookup(&[]));
        assert_eq!(config, ServiceConfig::default());
        assert_eq!(config.cache_ttl, Duration::from_secs(30));
        assert_eq!(config.rsi_source, RsiSource::Upstream);
    }

    #[test]
    fn reads_overrides() {
        let config = ServiceConfig::from_lookup(lookup(&[
            (ENV_PROVIDER, "Yahoo"),
            (ENV_CACHE_TTL_SECS, "5"),
            (ENV_RSI_SOURCE, "local"),
            (ENV_API_KEY_FALLBACK, "fallback-key"),
        ]));

        assert_eq!(config.provider, ProviderId::Yahoo);
        assert_eq!(config.cache_ttl, Duration::from_secs(5));
        assert_eq!(config.rsi_source, RsiSource::Local);
        assert_eq!(config.api_key.as_deref(), Some("fallback-key"));
    }

    #[test]
    fn primary_key_wins_and_blank_keys_are_skipped() {
        let config = ServiceConfig::from_lookup(lookup(&[
            (ENV_API_KEY, "  "),
            (ENV_API_KEY_FALLBACK, "fallback-key"),
        ]));
        assert_eq!(config.api_key.as_deref(), Some("fallback-key"));

        let config = ServiceConfig::from_lookup(lookup(&[
            (ENV_API_KEY, "primary"),
            (ENV_API_KEY_FALLBACK, "fallback-key"),
        ]));
        assert_eq!(config.api_key.as_deref(), Some("primary"));
    }

    #[test]
    fn invalid_values_keep_defaults() {
        let config = ServiceConfig::from_lookup(lookup(&[
            (ENV_PROVIDER, "bloomberg"),
            (ENV_CACHE_TTL_SECS, "soon"),
            (ENV_RSI_SOURCE, "wilder"),
        ]));
        assert_eq!(config, ServiceConfig::default());
    }

    #[test]
    fn rsi_source_round_trips_names() {
        for source in [RsiSource::Upstream, RsiSource::Local, RsiSource::Off] {
            assert_eq!(source.to_string().parse::<RsiSource>(), Ok(source));
        }
        assert!(matches!(
            "wilder".parse::<RsiSource>(),
            Err(ValidationError::InvalidRsiSource { .. })
        ));
    }
}
