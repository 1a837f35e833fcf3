//! Runtime configuration read from the environment.
//!
//! | Variable                   | Default                  |
//! |----------------------------|--------------------------|
//! | `DEVINFO_PORT`             | `/dev/ttyUSB0` (`COM4`)  |
//! | `DEVINFO_BAUD`             | `19200`                  |
//! | `DEVINFO_TIMEOUT_MS`       | `1000`                   |
//! | `DEVINFO_TICK_INTERVAL_MS` | `0`                      |
//!
//! Log filtering uses `RUST_LOG` and is handled in `main`.

use std::str::FromStr;
use std::time::Duration;

use serde::Serialize;

use devinfo_core::constants::{DEFAULT_BAUD_RATE, DEFAULT_SERIAL_PORT, DEFAULT_TIMEOUT_MS};
use devinfo_core::{Error, Result};
use devinfo_session::SessionConfig;
use devinfo_transport::SerialConfig;

pub const PORT_ENV: &str = "DEVINFO_PORT";
pub const BAUD_ENV: &str = "DEVINFO_BAUD";
pub const TIMEOUT_ENV: &str = "DEVINFO_TIMEOUT_MS";
pub const TICK_INTERVAL_ENV: &str = "DEVINFO_TICK_INTERVAL_MS";

/// Settings for one run of the `devinfo` binary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CliConfig {
    /// Serial device path.
    pub port: String,

    pub baud_rate: u32,

    /// Receive timeout for each tick.
    pub receive_timeout: Duration,

    /// Pause between ticks.
    pub tick_interval: Duration,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_SERIAL_PORT.to_string(),
            baud_rate: DEFAULT_BAUD_RATE,
            receive_timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            tick_interval: Duration::ZERO,
        }
    }
}

impl CliConfig {
    /// Read the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if a variable is set to an unusable value.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the configuration through `lookup`, which maps a variable name to
    /// its value.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if a variable is set to an unusable value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let port = match lookup(PORT_ENV) {
            Some(port) if port.trim().is_empty() => {
                return Err(Error::MissingConfig(PORT_ENV.to_string()));
            }
            Some(port) => port.trim().to_string(),
            None => defaults.port,
        };

        let baud_rate: u32 = parse_var(&lookup, BAUD_ENV)?.unwrap_or(defaults.baud_rate);
        if baud_rate == 0 {
            return Err(Error::invalid_config(BAUD_ENV, "must be greater than zero"));
        }

        let receive_timeout = match parse_var::<u64>(&lookup, TIMEOUT_ENV)? {
            Some(0) => {
                return Err(Error::invalid_config(TIMEOUT_ENV, "must be greater than zero"));
            }
            Some(ms) => Duration::from_millis(ms),
            None => defaults.receive_timeout,
        };

        let tick_interval = parse_var::<u64>(&lookup, TICK_INTERVAL_ENV)?
            .map_or(defaults.tick_interval, Duration::from_millis);

        Ok(Self {
            port,
            baud_rate,
            receive_timeout,
            tick_interval,
        })
    }

    /// Serial port settings for [`devinfo_transport::SerialTransport::open`].
    pub fn serial(&self) -> SerialConfig {
        SerialConfig::new(self.port.as_str())
            .with_baud_rate(self.baud_rate)
            .with_timeout(self.receive_timeout)
    }

    pub fn session(&self) -> SessionConfig {
        SessionConfig::default().with_receive_timeout(self.receive_timeout)
    }
}

fn parse_var<V>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<V>>
where
    V: FromStr,
    V::Err: std::fmt::Display,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse::<V>()
                .map_err(|e| Error::invalid_config(key, format!("{:?}: {}", raw, e)))
        })
        .transpose()
}
