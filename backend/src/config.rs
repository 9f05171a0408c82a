use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

pub const DEFAULT_ANIMATION_FRAMES: usize = 8;
pub const MAX_ANIMATION_FRAMES: usize = 64;

#[derive(Error, Debug, PartialEq)]
#[error("{key} must be {expected}, got {value:?}")]
pub struct ConfigError {
    key: &'static str,
    value: String,
    expected: &'static str,
}

const ANIMATION_FRAMES_KEY: &str = "SNAKELADDER_ANIMATION_FRAMES";
const ANIMATION_FRAMES_EXPECTED: &str = "an integer between 0 and 64";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub addr: SocketAddr,
    pub log_dir: PathBuf,
    // Fixed dice seed for reproducible sessions
    pub seed: Option<u64>,
    pub animation_frames: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            addr: SocketAddr::from(([127, 0, 0, 1], 8000)),
            log_dir: PathBuf::from("./logs"),
            seed: None,
            animation_frames: DEFAULT_ANIMATION_FRAMES,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Config::default();
        let animation_frames = parse(&lookup, ANIMATION_FRAMES_KEY, ANIMATION_FRAMES_EXPECTED)?
            .unwrap_or(defaults.animation_frames);
        if animation_frames > MAX_ANIMATION_FRAMES {
            return Err(ConfigError {
                key: ANIMATION_FRAMES_KEY,
                value: animation_frames.to_string(),
                expected: ANIMATION_FRAMES_EXPECTED,
            });
        }
        Ok(Config {
            addr: parse(&lookup, "SNAKELADDER_ADDR", "a socket address")?.unwrap_or(defaults.addr),
            log_dir: lookup("SNAKELADDER_LOG_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.log_dir),
            seed: parse(&lookup, "SNAKELADDER_SEED", "an unsigned integer")?,
            animation_frames,
        })
    }
}

fn parse<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    expected: &'static str,
) -> Result<Option<T>, ConfigError> {
    lookup(key)
        .map(|value| {
            value.trim().parse::<T>().map_err(|_| ConfigError {
                key,
                value,
                expected,
            })
        })
        .transpose()
}
