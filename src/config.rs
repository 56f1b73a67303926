//! Search configuration and file/environment loading
//!
//! Configuration is resolved in order: `GOMCTS_CONFIG` if set, then the
//! first readable file among the search paths, then built-in defaults.
//! Individual `GOMCTS_*` environment variables override whatever was
//! loaded. A missing or broken file is never fatal; the loader warns and
//! falls back to defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

const CONFIG_ENV: &str = "GOMCTS_CONFIG";
const CONFIG_SEARCH_PATHS: &[&str] = &["config.toml", "../config.toml", "/app/config.toml"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// How sharply visit counts are converted into move probabilities as a
/// game progresses.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum TemperatureSchedule {
    /// The same temperature at every step.
    Constant { temp: f32 },

    /// `temp` while `step < cutoff_step`, deterministic play afterwards.
    Cutoff { temp: f32, cutoff_step: u32 },

    /// `initial * decay^step`, floored at `min`.
    Decay { initial: f32, decay: f32, min: f32 },
}

impl TemperatureSchedule {
    /// Temperature to use at the given move number.
    pub fn temperature(&self, step: u32) -> f32 {
        match *self {
            TemperatureSchedule::Constant { temp } => temp,
            TemperatureSchedule::Cutoff { temp, cutoff_step } => {
                if step < cutoff_step {
                    temp
                } else {
                    0.0
                }
            }
            TemperatureSchedule::Decay { initial, decay, min } => {
                (initial * decay.powi(step as i32)).max(min)
            }
        }
    }
}

impl Default for TemperatureSchedule {
    fn default() -> Self {
        TemperatureSchedule::Constant { temp: 1.0 }
    }
}

/// Tunable parameters for the search tree and the policies built on it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Simulations per move decision.
    pub num_searches: u32,

    /// Exploration constant in the UCB term.
    pub u_const: f32,

    /// Temperature schedule applied to root visit counts.
    pub temperature: TemperatureSchedule,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            num_searches: 128,
            u_const: 1.0,
            temperature: TemperatureSchedule::default(),
        }
    }
}

impl SearchConfig {
    /// Self-play settings: few searches, mild early randomness.
    pub fn for_training() -> Self {
        SearchConfig {
            num_searches: 16,
            u_const: 1.0,
            temperature: TemperatureSchedule::Cutoff {
                temp: 0.125,
                cutoff_step: 16,
            },
        }
    }

    /// Match-play settings: deeper search, always the best move.
    pub fn for_evaluation() -> Self {
        SearchConfig {
            num_searches: 128,
            u_const: 1.0,
            temperature: TemperatureSchedule::Constant { temp: 0.0 },
        }
    }

    /// Small, fully stochastic settings for tests.
    pub fn for_testing() -> Self {
        SearchConfig {
            num_searches: 8,
            u_const: 1.0,
            temperature: TemperatureSchedule::Constant { temp: 1.0 },
        }
    }

    pub fn with_searches(mut self, num_searches: u32) -> Self {
        self.num_searches = num_searches;
        self
    }

    pub fn with_exploration(mut self, u_const: f32) -> Self {
        self.u_const = u_const;
        self
    }

    pub fn with_temperature(mut self, temperature: TemperatureSchedule) -> Self {
        self.temperature = temperature;
        self
    }
}

/// Load configuration from the environment and well-known file locations.
pub fn load_config() -> SearchConfig {
    let mut config = if let Ok(path) = std::env::var(CONFIG_ENV) {
        debug!(path = %path, "Loading search config from GOMCTS_CONFIG");
        match load_from_path(Path::new(&path)) {
            Ok(config) => config,
            Err(error) => {
                warn!(%error, path = %path, "Failed to load GOMCTS_CONFIG, using defaults");
                SearchConfig::default()
            }
        }
    } else {
        load_from_search_paths()
    };
    apply_env_overrides(&mut config);
    config
}

/// Parse a config file at an explicit path.
pub fn load_from_path(path: &Path) -> Result<SearchConfig, ConfigError> {
    let raw = std::fs::read_to_string(path)?;
    let config = toml::from_str(&raw)?;
    Ok(config)
}

fn load_from_search_paths() -> SearchConfig {
    for candidate in CONFIG_SEARCH_PATHS {
        let path = Path::new(candidate);
        if path.exists() {
            match load_from_path(path) {
                Ok(config) => {
                    info!(path = %candidate, "Loaded search config");
                    return config;
                }
                Err(error) => {
                    warn!(%error, path = %candidate, "Skipping unreadable config file");
                }
            }
        }
    }
    debug!("No config file found, using defaults");
    SearchConfig::default()
}

macro_rules! env_override {
    ($field:expr, $var:expr, $ty:ty) => {
        if let Ok(raw) = std::env::var($var) {
            match raw.parse::<$ty>() {
                Ok(value) => {
                    debug!(var = $var, value = %value, "Applied environment override");
                    $field = value;
                }
                Err(_) => {
                    warn!(var = $var, raw = %raw, "Ignoring unparseable environment override");
                }
            }
        }
    };
}

fn apply_env_overrides(config: &mut SearchConfig) {
    env_override!(config.num_searches, "GOMCTS_NUM_SEARCHES", u32);
    env_override!(config.u_const, "GOMCTS_U_CONST", f32);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SearchConfig::default();
        assert_eq!(config.num_searches, 128);
        assert_eq!(config.u_const, 1.0);
        assert_eq!(config.temperature.temperature(0), 1.0);
    }

    #[test]
    fn test_builders_override_fields() {
        let config = SearchConfig::default()
            .with_searches(64)
            .with_exploration(2.0)
            .with_temperature(TemperatureSchedule::Constant { temp: 0.5 });
        assert_eq!(config.num_searches, 64);
        assert_eq!(config.u_const, 2.0);
        assert_eq!(config.temperature.temperature(100), 0.5);
    }

    #[test]
    fn test_presets() {
        assert_eq!(SearchConfig::for_training().num_searches, 16);
        assert_eq!(SearchConfig::for_evaluation().temperature.temperature(0), 0.0);
        assert_eq!(SearchConfig::for_testing().num_searches, 8);
    }

    #[test]
    fn test_cutoff_schedule_goes_deterministic() {
        let schedule = TemperatureSchedule::Cutoff {
            temp: 0.125,
            cutoff_step: 16,
        };
        assert_eq!(schedule.temperature(0), 0.125);
        assert_eq!(schedule.temperature(15), 0.125);
        assert_eq!(schedule.temperature(16), 0.0);
        assert_eq!(schedule.temperature(100), 0.0);
    }

    #[test]
    fn test_decay_schedule_floors_at_min() {
        let schedule = TemperatureSchedule::Decay {
            initial: 1.0,
            decay: 0.75,
            min: 1.0 / 64.0,
        };
        assert_eq!(schedule.temperature(0), 1.0);
        assert_eq!(schedule.temperature(1), 0.75);
        assert!(schedule.temperature(2) < schedule.temperature(1));
        assert_eq!(schedule.temperature(1000), 1.0 / 64.0);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "num_searches = 32\nu_const = 2.5\n\n[temperature]\nmode = \"cutoff\"\ntemp = 0.25\ncutoff_step = 8\n",
        )
        .unwrap();

        let config = load_from_path(&path).unwrap();
        assert_eq!(config.num_searches, 32);
        assert_eq!(config.u_const, 2.5);
        assert_eq!(
            config.temperature,
            TemperatureSchedule::Cutoff {
                temp: 0.25,
                cutoff_step: 8
            }
        );
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "num_searches = 4\n").unwrap();

        let config = load_from_path(&path).unwrap();
        assert_eq!(config.num_searches, 4);
        assert_eq!(config.u_const, 1.0);
        assert_eq!(config.temperature, TemperatureSchedule::default());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = load_from_path(Path::new("/nonexistent/config.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "num_searches = \"many\"\n").unwrap();

        let result = load_from_path(&path);
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_config_round_trips_through_toml() {
        let config = SearchConfig::for_training();
        let raw = toml::to_string(&config).unwrap();
        let parsed: SearchConfig = toml::from_str(&raw).unwrap();
        assert_eq!(parsed, config);
    }
}
