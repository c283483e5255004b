use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::game::Rules;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum AudioKind {
    Silent,
    /// Terminal bell
    #[default]
    Bell,
    /// Synthesized tones (needs the `tone` feature)
    Tone,
}

#[derive(Clone, Debug, PartialEq, serde::Deserialize)]
pub struct Config {
    #[serde(default = "defaults::start_level")]
    pub start_level: u32,

    /// Fixed RNG seed for reproducible shuffles.
    #[serde(default)]
    pub seed: Option<u64>,

    /// Only deal arrangements that sliding moves can solve.
    #[serde(default)]
    pub solvable_only: bool,

    #[serde(default)]
    pub timing: Timing,

    #[serde(default)]
    pub audio: Audio,
}

#[derive(Clone, Debug, PartialEq, serde::Deserialize)]
pub struct Timing {
    #[serde(default = "defaults::tick_ms")]
    pub tick_ms: u64,
    /// Pause between a level advance and the new grid being dealt.
    #[serde(default = "defaults::regenerate_delay_ms")]
    pub regenerate_delay_ms: u64,
}

#[derive(Clone, Debug, Default, PartialEq, serde::Deserialize)]
pub struct Audio {
    #[serde(default)]
    pub backend: AudioKind,
}

mod defaults {
    pub fn start_level() -> u32 {
        1
    }
    pub fn tick_ms() -> u64 {
        1000
    }
    pub fn regenerate_delay_ms() -> u64 {
        100
    }
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            tick_ms: defaults::tick_ms(),
            regenerate_delay_ms: defaults::regenerate_delay_ms(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            start_level: defaults::start_level(),
            seed: None,
            solvable_only: false,
            timing: Timing::default(),
            audio: Audio::default(),
        }
    }
}

impl Config {
    pub fn from_toml(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.start_level == 0 {
            return Err(ConfigError::Invalid("start_level must be at least 1".into()));
        }
        if self.timing.tick_ms == 0 {
            return Err(ConfigError::Invalid("timing.tick_ms must be positive".into()));
        }
        Ok(())
    }

    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.timing.tick_ms)
    }

    pub fn rules(&self) -> Rules {
        Rules {
            solvable_only: self.solvable_only,
            regenerate_delay: Duration::from_millis(self.timing.regenerate_delay_ms),
        }
    }
}
