use crate::config::AppConfig;
use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

/// Default location of the TOML configuration file.
pub const DEFAULT_CONFIG_PATH: &str = "config/Config.toml";

/// Environment variable prefix; nested keys are separated by `__`
/// (e.g. `STRADDLE_MONITOR__INTERVAL_SECS=3`). Only `[monitor]` keys are
/// read from the environment: env keys arrive lowercased, which cannot
/// address case-sensitive index names or the `0DTE`/`1DTE` threshold keys.
pub const ENV_PREFIX: &str = "STRADDLE_";

pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads configuration from the default TOML file and the environment,
    /// layered over the built-in defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the merged configuration cannot be parsed or fails validation.
    pub fn load() -> Result<AppConfig> {
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    /// Loads configuration from a specific TOML file and the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the merged configuration cannot be parsed or fails validation.
    pub fn load_from(path: &str) -> Result<AppConfig> {
        let figment = Self::base()
            .merge(Toml::file(path))
            .merge(Self::env());

        Self::extract(&figment).with_context(|| format!("failed to load config from {path}"))
    }

    /// Loads configuration with a profile overlay (`config/Config.{profile}.toml`).
    ///
    /// # Errors
    ///
    /// Returns an error if the merged configuration cannot be parsed or fails validation.
    pub fn load_with_profile(profile: &str) -> Result<AppConfig> {
        let figment = Self::base()
            .merge(Toml::file(DEFAULT_CONFIG_PATH))
            .merge(Toml::file(format!("config/Config.{profile}.toml")))
            .merge(Self::env());

        Self::extract(&figment).with_context(|| format!("failed to load config profile {profile}"))
    }

    /// Parses configuration from an in-memory TOML document layered over the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be parsed or fails validation.
    pub fn load_from_str(toml: &str) -> Result<AppConfig> {
        Self::extract(&Self::base().merge(Toml::string(toml)))
    }

    fn env() -> Env {
        Env::prefixed(ENV_PREFIX)
            .split("__")
            .filter(|key| key.starts_with("monitor"))
    }

    fn base() -> Figment {
        Figment::from(Serialized::defaults(AppConfig::default()))
    }

    fn extract(figment: &Figment) -> Result<AppConfig> {
        let config: AppConfig = figment.extract()?;
        config.validate()?;

        tracing::debug!(
            indices = config.entry.indices.len(),
            interval_secs = config.monitor.interval_secs,
            "Configuration loaded"
        );

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DteBucket;
    use rust_decimal_macros::dec;

    #[test]
    fn empty_document_yields_defaults() {
        let config = ConfigLoader::load_from_str("").unwrap();

        assert!(config.entry.index("NIFTY").is_some());
        assert!(config.entry.index("SENSEX").is_some());
        assert_eq!(config.monitor.interval_secs, 5);
    }

    #[test]
    fn toml_overrides_thresholds_and_adds_indices() {
        let config = ConfigLoader::load_from_str(
            r#"
            [monitor]
            interval_secs = 3
            join_timeout_secs = 1

            [entry.indices.NIFTY.thresholds]
            0DTE = 150

            [entry.indices.BANKNIFTY]
            underlying = "NSE:NIFTYBANK-INDEX"
            step = 100
            thresholds = { 0DTE = 300, 1DTE = 450 }
            "#,
        )
        .unwrap();

        let nifty = config.entry.index("NIFTY").unwrap();
        assert_eq!(nifty.thresholds.get(DteBucket::ZeroDte), Some(dec!(150)));
        assert_eq!(nifty.thresholds.get(DteBucket::OneDte), Some(dec!(180)));
        assert_eq!(nifty.step, 50);

        let bank = config.entry.index("BANKNIFTY").unwrap();
        assert_eq!(bank.step, 100);
        assert_eq!(bank.thresholds.get(DteBucket::OneDte), Some(dec!(450)));

        assert_eq!(config.monitor.interval_secs, 3);
    }

    #[test]
    fn env_overrides_monitor_and_ignores_entry_keys() {
        std::env::set_var("STRADDLE_MONITOR__JOIN_TIMEOUT_SECS", "7");
        std::env::set_var("STRADDLE_ENTRY__INDICES__NIFTY__STEP", "100");

        let config = ConfigLoader::extract(&ConfigLoader::base().merge(ConfigLoader::env()));

        std::env::remove_var("STRADDLE_MONITOR__JOIN_TIMEOUT_SECS");
        std::env::remove_var("STRADDLE_ENTRY__INDICES__NIFTY__STEP");

        let config = config.unwrap();
        assert_eq!(config.monitor.join_timeout_secs, 7);
        assert_eq!(config.entry.index("NIFTY").unwrap().step, 50);
        assert!(config.entry.index("nifty").is_none());
    }

    #[test]
    fn invalid_step_fails_validation() {
        let result = ConfigLoader::load_from_str(
            r#"
            [entry.indices.NIFTY]
            step = -50
            "#,
        );

        assert!(result.is_err());
    }
}
