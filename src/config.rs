use std::path::Path;

use rand::{rngs::StdRng, SeedableRng};

use crate::engine::Rules;
use crate::error::ConfigError;

/// Settings for a play session, usually read from a TOML file:
///
/// ```toml
/// seed = 42
///
/// [rules]
/// win_tile = 2048
/// four_probability = 0.1
/// ```
///
/// Every key is optional.
#[derive(Clone, Debug, PartialEq, Default, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Seed for the tile spawner; `None` draws one from the OS.
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub rules: Rules,
}

impl Config {
    pub fn from_toml<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// The RNG every spawn in the session draws from.
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_is_standard() {
        let cfg = Config::from_toml_str("").unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.rules, Rules::STANDARD);
    }

    #[test]
    fn partial_rules_keep_defaults() {
        let cfg = Config::from_toml_str("seed = 9\n[rules]\nwin_tile = 512\n").unwrap();
        assert_eq!(cfg.seed, Some(9));
        assert_eq!(cfg.rules.win_tile(), 512);
        assert_eq!(cfg.rules.four_probability(), 0.1);
    }

    #[test]
    fn invalid_rules_are_rejected() {
        let err = Config::from_toml_str("[rules]\nwin_tile = 1000\n").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
        assert!(err.to_string().contains("win tile"));
        assert!(Config::from_toml_str("[rules]\nfour_probability = 2.0\n").is_err());
        assert!(Config::from_toml_str("colour = \"red\"\n").is_err());
    }
}
