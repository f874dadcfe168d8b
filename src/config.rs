use std::env;
use std::str::FromStr;
use std::time::Duration;

use log::warn;

use crate::blockchain::{DEFAULT_DIFFICULTY, DEFAULT_MAX_ITERATIONS, MAX_DIFFICULTY};

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_MINE_TIMEOUT_SECS: u64 = 30;

/// Runtime settings, read from the environment (and `.env` via dotenvy).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub difficulty: u32,
    pub mine_max_iterations: u64,
    /// Deadline for a single `POST /mine`; `None` waits for the search to finish.
    pub mine_timeout: Option<Duration>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            difficulty: DEFAULT_DIFFICULTY,
            mine_max_iterations: DEFAULT_MAX_ITERATIONS,
            mine_timeout: Some(Duration::from_secs(DEFAULT_MINE_TIMEOUT_SECS)),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let difficulty = parse_or(&lookup, "DIFFICULTY", defaults.difficulty);
        let clamped = difficulty.clamp(1, MAX_DIFFICULTY);
        if clamped != difficulty {
            warn!("DIFFICULTY={difficulty} out of range, using {clamped}");
        }

        let timeout_secs = parse_or(&lookup, "MINE_TIMEOUT_SECS", DEFAULT_MINE_TIMEOUT_SECS);

        Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: parse_or(&lookup, "PORT", defaults.port),
            difficulty: clamped,
            mine_max_iterations: parse_or(
                &lookup,
                "MINE_MAX_ITERATIONS",
                defaults.mine_max_iterations,
            ),
            mine_timeout: (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs)),
        }
    }
}

fn parse_or<T: FromStr + Copy>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> T {
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("ignoring unparseable {key}={raw:?}");
            default
        }),
        None => default,
    }
}
