//! Tunables for argument containers.

use serde::Deserialize;
use tracing::warn;

use crate::error::CallError;

pub const ENV_ARG_POOL_ALLOC: &str = "CALLSET_ARG_POOL_ALLOC";
pub const ENV_ARG_POOL_CAPACITY: &str = "CALLSET_ARG_POOL_CAPACITY";

/// Upper bound for `arg_pool_alloc`; no signature comes close to this many slots.
pub const MAX_ARG_POOL_ALLOC: usize = 256;
/// Upper bound for `arg_pool_capacity`.
pub const MAX_ARG_POOL_CAPACITY: usize = 1 << 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CallConfig {
    /// Slots reserved in a freshly allocated container.
    pub arg_pool_alloc: usize,
    /// Containers parked in a pool before releases are dropped.
    pub arg_pool_capacity: usize,
}

impl Default for CallConfig {
    fn default() -> Self {
        Self {
            arg_pool_alloc: 5,
            arg_pool_capacity: 1024,
        }
    }
}

impl CallConfig {
    /// Defaults overridden by `CALLSET_ARG_POOL_ALLOC` / `CALLSET_ARG_POOL_CAPACITY`.
    pub fn from_env() -> Self {
        Self::with_env(|key| std::env::var(key).ok())
    }

    pub fn with_env(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        override_from(&lookup, ENV_ARG_POOL_ALLOC, MAX_ARG_POOL_ALLOC, &mut config.arg_pool_alloc);
        override_from(&lookup, ENV_ARG_POOL_CAPACITY, MAX_ARG_POOL_CAPACITY, &mut config.arg_pool_capacity);
        config
    }

    /// Parses a flat TOML document; out-of-range values are rejected.
    pub fn from_toml_str(input: &str) -> Result<Self, CallError> {
        let config: Self = toml::from_str(input).map_err(|err| CallError::Config(err.to_string()))?;
        config.validate()
    }

    pub fn validate(self) -> Result<Self, CallError> {
        check_limit("arg_pool_alloc", self.arg_pool_alloc, MAX_ARG_POOL_ALLOC)?;
        check_limit("arg_pool_capacity", self.arg_pool_capacity, MAX_ARG_POOL_CAPACITY)?;
        Ok(self)
    }
}

fn check_limit(key: &str, value: usize, max: usize) -> Result<(), CallError> {
    if value > max {
        return Err(CallError::Config(format!("{} = {} exceeds the maximum of {}", key, value, max)));
    }
    Ok(())
}

fn override_from(lookup: &impl Fn(&str) -> Option<String>, key: &str, max: usize, slot: &mut usize) {
    let Some(raw) = lookup(key) else {
        return;
    };
    let parsed = raw
        .trim()
        .parse::<usize>()
        .map_err(|err| err.to_string())
        .and_then(|value| check_limit(key, value, max).map(|()| value).map_err(|err| err.to_string()));
    match parsed {
        Ok(value) => *slot = value,
        Err(error) => warn!(target: "callset::pool", key, value = %raw, %error, "config.ignored"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = CallConfig::default();
        assert_eq!(config.arg_pool_alloc, 5);
        assert_eq!(config.arg_pool_capacity, 1024);
    }

    #[test]
    fn env_overrides_and_ignores_garbage() {
        let config = CallConfig::with_env(|key| match key {
            ENV_ARG_POOL_ALLOC => Some("8".to_string()),
            ENV_ARG_POOL_CAPACITY => Some("lots".to_string()),
            _ => None,
        });
        assert_eq!(config.arg_pool_alloc, 8);
        assert_eq!(config.arg_pool_capacity, 1024);
    }

    #[test]
    fn toml_partial_document() {
        let config = CallConfig::from_toml_str("arg_pool_capacity = 16\n").unwrap();
        assert_eq!(config, CallConfig { arg_pool_alloc: 5, arg_pool_capacity: 16 });
    }

    #[test]
    fn oversized_values_are_rejected() {
        let err = CallConfig::from_toml_str("arg_pool_alloc = 9223372036854775807").unwrap_err();
        assert!(matches!(err, CallError::Config(ref msg) if msg.contains("arg_pool_alloc")));
        assert!(CallConfig::from_toml_str("arg_pool_capacity = 70000").is_err());
        assert!(CallConfig::from_toml_str("arg_pool_alloc = 256\narg_pool_capacity = 65536").is_ok());

        let config = CallConfig::with_env(|key| match key {
            ENV_ARG_POOL_ALLOC => Some(usize::MAX.to_string()),
            _ => None,
        });
        assert_eq!(config, CallConfig::default());
    }

    #[test]
    fn toml_errors_are_config_errors() {
        let err = CallConfig::from_toml_str("arg_pool_alloc = \"five\"").unwrap_err();
        assert!(matches!(err, CallError::Config(_)));
        assert!(CallConfig::from_toml_str("unknown = 1").is_err());
    }
}
