use std::{
    fs,
    net::{Ipv4Addr, SocketAddr, SocketAddrV4},
    path::{Path, PathBuf},
    time::Duration,
};

use serde::{Deserialize, Serialize};

use super::{Result, Selection, TrainerErr};

pub const DEFAULT_TICK_RATE_HZ: u32 = 15;
pub const DEFAULT_LEARNING_RATE: f64 = 0.5;
pub const DEFAULT_SAVE_INTERVAL_SECS: u64 = 30;
pub const DEFAULT_REWARD_PORT: u16 = 22333;

/// Whether a session learns or only plays.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoopMode {
    Train,
    Infer,
}

/// Settings of a training or inference session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    pub tick_rate_hz: u32,
    pub learning_rate: f64,
    pub save_interval_secs: u64,
    /// Where reinforcement sessions listen for the reward program.
    pub reward_addr: SocketAddr,
    pub networks_dir: PathBuf,
    pub selection: Selection,
    pub seed: Option<u64>,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            tick_rate_hz: DEFAULT_TICK_RATE_HZ,
            learning_rate: DEFAULT_LEARNING_RATE,
            save_interval_secs: DEFAULT_SAVE_INTERVAL_SECS,
            reward_addr: SocketAddr::V4(SocketAddrV4::new(
                Ipv4Addr::LOCALHOST,
                DEFAULT_REWARD_PORT,
            )),
            networks_dir: PathBuf::from("networks"),
            selection: Selection::Greedy,
            seed: None,
        }
    }
}

impl TrainerConfig {
    /// Reads a config from a JSON file, missing fields take their defaults.
    ///
    /// # Errors
    /// Returns `TrainerErr` if the file can't be read, parsed or validated.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the values a session can't run with.
    pub fn validate(&self) -> Result<()> {
        if self.tick_rate_hz == 0 {
            return Err(TrainerErr::InvalidConfig(
                "tick_rate_hz must be positive".into(),
            ));
        }

        if !self.learning_rate.is_finite() || self.learning_rate <= 0. {
            return Err(TrainerErr::InvalidConfig(format!(
                "learning_rate must be a positive number, got {}",
                self.learning_rate
            )));
        }

        if self.save_interval_secs == 0 {
            return Err(TrainerErr::InvalidConfig(
                "save_interval_secs must be positive".into(),
            ));
        }

        Ok(())
    }

    /// The target duration of a single tick.
    pub fn tick_period(&self) -> Duration {
        Duration::from_secs(1) / self.tick_rate_hz.max(1)
    }

    pub fn save_interval(&self) -> Duration {
        Duration::from_secs(self.save_interval_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = TrainerConfig::default();
        config.validate().unwrap();
        assert_eq!(config.reward_addr.port(), DEFAULT_REWARD_PORT);
        assert_eq!(config.tick_period(), Duration::from_nanos(66_666_666));
    }

    #[test]
    fn partial_json_fills_in_defaults() {
        let config: TrainerConfig =
            serde_json::from_str(r#"{ "tick_rate_hz": 30, "selection": "weighted" }"#).unwrap();

        assert_eq!(config.tick_rate_hz, 30);
        assert_eq!(config.selection, Selection::Weighted);
        assert_eq!(config.learning_rate, DEFAULT_LEARNING_RATE);
        assert_eq!(config.save_interval_secs, DEFAULT_SAVE_INTERVAL_SECS);
    }

    #[test]
    fn rejects_unusable_values() {
        let mut config = TrainerConfig::default();
        config.tick_rate_hz = 0;
        assert!(matches!(config.validate(), Err(TrainerErr::InvalidConfig(_))));

        let mut config = TrainerConfig::default();
        config.learning_rate = f64::NAN;
        assert!(config.validate().is_err());

        let mut config = TrainerConfig::default();
        config.save_interval_secs = 0;
        assert!(config.validate().is_err());
    }
}
