//! Bridge configuration.
//!
//! Defaults, then a JSON file (`--config PATH` or `$XDG_CONFIG_HOME/wndbridge/config.json`),
//! then `WNDBRIDGE_*` environment variables.

use bridge_dispatch::{BridgeOptions, DispatchOptions};
use bridge_queue::DEFAULT_CAPACITY;
use log::{debug, info};
use serde::Deserialize;
use std::fs;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Default consumer poll period, in milliseconds.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// How the application thread consumes the queue.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsumerMode {
    /// Block in `wait` on a dedicated thread.
    #[default]
    Wait,
    /// Drain on a fixed timer tick.
    Poll,
}

impl FromStr for ConsumerMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "wait" => Ok(ConsumerMode::Wait),
            "poll" => Ok(ConsumerMode::Poll),
            other => Err(ConfigError::Invalid(format!("unknown consumer mode '{}'", other))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Queue capacity in records.
    pub capacity: usize,
    pub mode: ConsumerMode,
    pub poll_interval_ms: u64,
    /// Upper bound for a single blocking wait; the waiter retries after it.
    pub wait_timeout_ms: Option<u64>,
    pub context_menu_also_commands: bool,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            mode: ConsumerMode::default(),
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            wait_timeout_ms: None,
            context_menu_also_commands: DispatchOptions::default().context_menu_also_commands,
        }
    }
}

impl BridgeConfig {
    /// Load from `explicit` if given, else from the default location if it exists.
    /// Environment overrides come next, then `mode`; the result is validated last.
    pub fn load(
        explicit: Option<&Path>,
        mode: Option<ConsumerMode>,
    ) -> Result<Self, ConfigError> {
        let mut config = match explicit {
            Some(path) => Self::from_file(path)?,
            None => match default_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => {
                    debug!("No config file found, using defaults");
                    Self::default()
                }
            },
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        if let Some(mode) = mode {
            config.mode = mode;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        info!("Loading config from {}", path.display());
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Apply `WNDBRIDGE_CAPACITY`, `WNDBRIDGE_MODE` and `WNDBRIDGE_POLL_MS` as looked up by `var`.
    pub fn apply_env<F>(&mut self, var: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = var("WNDBRIDGE_CAPACITY") {
            self.capacity = parse_number("WNDBRIDGE_CAPACITY", &value)?;
        }
        if let Some(value) = var("WNDBRIDGE_MODE") {
            self.mode = value.parse()?;
        }
        if let Some(value) = var("WNDBRIDGE_POLL_MS") {
            self.poll_interval_ms = parse_number("WNDBRIDGE_POLL_MS", &value)?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity == 0 {
            return Err(ConfigError::Invalid("capacity must be at least 1".into()));
        }
        if self.mode == ConsumerMode::Poll && self.poll_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "poll_interval_ms must be at least 1 in poll mode".into(),
            ));
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn bridge_options(&self) -> Result<BridgeOptions, ConfigError> {
        let capacity = NonZeroUsize::new(self.capacity)
            .ok_or_else(|| ConfigError::Invalid("capacity must be at least 1".into()))?;

        Ok(BridgeOptions {
            capacity,
            dispatch: DispatchOptions {
                context_menu_also_commands: self.context_menu_also_commands,
            },
            wait_timeout: self.wait_timeout_ms.map(Duration::from_millis),
        })
    }
}

/// `$XDG_CONFIG_HOME/wndbridge/config.json` (or the platform equivalent).
pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("wndbridge").join("config.json"))
}

fn parse_number<T: FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid(format!("{} is not a number: '{}'", key, value)))
}
