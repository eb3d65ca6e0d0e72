//! Server configuration read from the environment.

use std::fmt::Display;
use std::net::SocketAddr;
use std::str::FromStr;

use tracing::warn;

const DEFAULT_ADDR: ([u8; 4], u16) = ([0, 0, 0, 0], 3000);
const DEFAULT_SPEED_MS: u64 = 500;
const DEFAULT_MIN_SPEED_MS: u64 = 10;

/// Visualization server configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisConfig {
    /// Address the HTTP/WebSocket server binds to
    pub addr: SocketAddr,
    /// Initial delay between auto-mode steps
    pub speed_ms: u64,
    /// Floor for any requested delay
    pub min_speed_ms: u64,
}

impl Default for VisConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(DEFAULT_ADDR),
            speed_ms: DEFAULT_SPEED_MS,
            min_speed_ms: DEFAULT_MIN_SPEED_MS,
        }
    }
}

impl VisConfig {
    /// Create config from environment variables with sensible defaults.
    ///
    /// - `ALGOSCOPE_ADDR` (default `0.0.0.0:3000`)
    /// - `ALGOSCOPE_SPEED_MS` (default 500)
    /// - `ALGOSCOPE_MIN_SPEED_MS` (default 10)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            addr: parse_or(&lookup, "ALGOSCOPE_ADDR", defaults.addr),
            speed_ms: parse_or(&lookup, "ALGOSCOPE_SPEED_MS", defaults.speed_ms),
            min_speed_ms: parse_or(&lookup, "ALGOSCOPE_MIN_SPEED_MS", defaults.min_speed_ms),
        }
    }

    /// Same address, different port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.addr.set_port(port);
        self
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: FromStr,
    T::Err: Display,
{
    let Some(raw) = lookup(key) else {
        return default;
    };
    match raw.trim().parse() {
        Ok(value) => value,
        Err(e) => {
            warn!(key, value = %raw, error = %e, "ignoring invalid setting");
            default
        }
    }
}
