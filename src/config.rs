use std::env;

use log::warn;

pub const DEFAULT_SAMPLE_RATE: u32 = 44100;
pub const DEFAULT_PLAYER: &str = "afplay";

pub const SAMPLE_RATE_VAR: &str = "MALSYNTH_SAMPLE_RATE";
pub const PLAYER_VAR: &str = "MALSYNTH_PLAYER";

/// Settings for the demo player.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub sample_rate: u32,
    /// Command used to play rendered WAV files. It is passed the file path as its only argument.
    pub player: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            player: DEFAULT_PLAYER.to_string(),
        }
    }
}

impl Config {
    /// Reads the config from the environment, falling back to defaults for missing or invalid values.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(value) = lookup(SAMPLE_RATE_VAR) {
            match value.trim().parse::<u32>() {
                Ok(rate) if rate > 0 => config.sample_rate = rate,
                _ => warn!("Ignoring invalid {SAMPLE_RATE_VAR} {value:?}"),
            }
        }

        if let Some(value) = lookup(PLAYER_VAR) {
            if value.trim().is_empty() {
                warn!("Ignoring empty {PLAYER_VAR}");
            } else {
                config.player = value.trim().to_string();
            }
        }

        config
    }
}
