//! Environment-driven defaults and logging setup

use crate::domain::{network_for_code, DomainResult, NetworkParams};
use tracing_subscriber::EnvFilter;

/// Network used when a token does not name one
pub const DEFAULT_NETWORK_VAR: &str = "KU_DEFAULT_NETWORK";
/// Log filter directive, e.g. `debug` or `ku_cli=trace`
pub const LOG_VAR: &str = "KU_LOG";

const DEFAULT_NETWORK: &str = "BTC";
const DEFAULT_LOG_FILTER: &str = "warn";

#[derive(Debug, Clone)]
pub struct Settings {
    pub default_network: &'static NetworkParams,
    pub log_filter: String,
}

impl Settings {
    pub fn from_env() -> DomainResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build settings from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> DomainResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let code = lookup(DEFAULT_NETWORK_VAR)
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_NETWORK.into());
        let log_filter = lookup(LOG_VAR)
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_LOG_FILTER.into());

        Ok(Self {
            default_network: network_for_code(&code)?,
            log_filter,
        })
    }
}

/// Install a stderr fmt subscriber filtered by `filter`
pub fn init_logging(filter: &str) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .finish();
    // Best-effort; a global subscriber may already be installed
    let _ = tracing::subscriber::set_global_default(subscriber);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DomainError;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::from_lookup(lookup(&[])).unwrap();
        assert_eq!(settings.default_network.symbol, "BTC");
        assert_eq!(settings.log_filter, "warn");
    }

    #[test]
    fn test_overrides() {
        let settings = Settings::from_lookup(lookup(&[
            (DEFAULT_NETWORK_VAR, "xtn"),
            (LOG_VAR, "debug"),
        ]))
        .unwrap();
        assert_eq!(settings.default_network.symbol, "XTN");
        assert_eq!(settings.log_filter, "debug");
    }

    #[test]
    fn test_unknown_network_is_an_error() {
        let err = Settings::from_lookup(lookup(&[(DEFAULT_NETWORK_VAR, "ZZZ")])).unwrap_err();
        assert!(matches!(err, DomainError::UnknownNetwork(code) if code == "ZZZ"));
    }

    #[test]
    fn test_init_logging_twice_does_not_panic() {
        init_logging("debug");
        init_logging("not a [valid filter");
    }
}
