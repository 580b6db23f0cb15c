//! Connection configuration.
//!
//! [`ConnectionConfig`] names the endpoint and tunes the actor. There is no
//! default endpoint: callers must supply a host and port, either through the
//! builder methods or a TOML file loaded with [`ConnectionConfig::load`].

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::Deserialize;
use thiserror::Error;

use crate::{
    codec::{DEFAULT_MAX_LINE_LENGTH, clamp_line_length},
    socket_options::SocketOptions,
};

/// Default time allowed for a single connection attempt.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Limits how often a send issued while disconnected may trigger a connect.
///
/// Each queued line carries its own counter. When the line is processed while
/// disconnected and the counter is below `max_attempts`, a connect is queued
/// ahead of the line. Once the budget is spent the line is dropped and the
/// listener receives [`SendError::NotConnected`](crate::SendError::NotConnected).
///
/// # Examples
///
/// ```
/// use linewire::ReconnectPolicy;
///
/// assert_eq!(ReconnectPolicy::default().max_attempts(), 3);
/// assert_eq!(ReconnectPolicy::disabled().max_attempts(), 0);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReconnectPolicy {
    max_attempts: u32,
}

impl ReconnectPolicy {
    /// Allow up to `max_attempts` connects per queued line.
    #[must_use]
    pub const fn new(max_attempts: u32) -> Self { Self { max_attempts } }

    /// Never connect on behalf of a send.
    #[must_use]
    pub const fn disabled() -> Self { Self::new(0) }

    /// Maximum connects attempted for a single line.
    #[must_use]
    pub const fn max_attempts(&self) -> u32 { self.max_attempts }

    /// Returns `true` if a line that already triggered `attempts` connects
    /// may trigger another.
    #[must_use]
    pub const fn allows(&self, attempts: u32) -> bool { attempts < self.max_attempts }
}

impl Default for ReconnectPolicy {
    fn default() -> Self { Self::new(3) }
}

/// Settings for a [`ConnectionActor`](crate::ConnectionActor).
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use linewire::{ConnectionConfig, ReconnectPolicy};
///
/// let config = ConnectionConfig::new("chat.example.net", 7000)
///     .connect_timeout(Some(Duration::from_secs(2)))
///     .reconnect(ReconnectPolicy::new(5));
/// assert_eq!(config.endpoint(), "chat.example.net:7000");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConnectionConfig {
    host: String,
    port: u16,
    connect_timeout: Option<Duration>,
    max_line_length: usize,
    reconnect: ReconnectPolicy,
    socket: SocketOptions,
}

impl ConnectionConfig {
    /// Create a configuration for `host:port` with default tuning.
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            connect_timeout: Some(DEFAULT_CONNECT_TIMEOUT),
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
            reconnect: ReconnectPolicy::default(),
            socket: SocketOptions::default(),
        }
    }

    /// Replace the host.
    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Replace the port.
    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Bound each connection attempt; `None` waits for the OS.
    #[must_use]
    pub fn connect_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Maximum inbound line length in bytes. Zero is clamped to one.
    #[must_use]
    pub fn max_line_length(mut self, max: usize) -> Self {
        self.max_line_length = clamp_line_length(max);
        self
    }

    /// Replace the connect-on-send policy.
    #[must_use]
    pub fn reconnect(mut self, policy: ReconnectPolicy) -> Self {
        self.reconnect = policy;
        self
    }

    /// Replace the socket options.
    #[must_use]
    pub fn socket_options(mut self, options: SocketOptions) -> Self {
        self.socket = options;
        self
    }

    /// Configured host.
    #[must_use]
    pub fn host_value(&self) -> &str { &self.host }

    /// Configured port.
    #[must_use]
    pub fn port_value(&self) -> u16 { self.port }

    /// `host:port` for logging.
    #[must_use]
    pub fn endpoint(&self) -> String { format!("{}:{}", self.host, self.port) }

    /// Timeout for a single connection attempt.
    #[must_use]
    pub fn connect_timeout_value(&self) -> Option<Duration> { self.connect_timeout }

    /// Maximum inbound line length in bytes.
    #[must_use]
    pub fn max_line_length_value(&self) -> usize { self.max_line_length }

    /// Connect-on-send policy.
    #[must_use]
    pub fn reconnect_policy(&self) -> ReconnectPolicy { self.reconnect }

    /// Socket options applied before connecting.
    #[must_use]
    pub fn socket(&self) -> &SocketOptions { &self.socket }

    /// Parse a configuration from TOML text.
    ///
    /// ```
    /// use linewire::ConnectionConfig;
    ///
    /// let config = ConnectionConfig::from_toml_str(
    ///     r#"
    ///     host = "10.0.0.5"
    ///     port = 9000
    ///     max_attempts = 1
    ///     "#,
    /// )
    /// .expect("valid config");
    /// assert_eq!(config.endpoint(), "10.0.0.5:9000");
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML and
    /// [`ConfigError::Invalid`] when the endpoint is unusable.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: None,
            source,
        })?;
        let config = file.into_config();
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] if the file cannot be read, otherwise as
    /// [`ConnectionConfig::from_toml_str`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text).map_err(|err| match err {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: Some(path.to_path_buf()),
                source,
            },
            other => other,
        })
    }

    /// Check that the endpoint can be dialled.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for an empty host or port zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::Invalid {
                message: "host must not be empty".to_owned(),
            });
        }
        if self.port == 0 {
            return Err(ConfigError::Invalid {
                message: "port must be non-zero".to_owned(),
            });
        }
        Ok(())
    }
}

/// Errors raised while loading a [`ConnectionConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config file '{}': {source}", .path.display())]
    Read {
        /// File that failed to read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The configuration was not valid TOML or had the wrong shape.
    #[error("failed to parse config: {source}")]
    Parse {
        /// File being parsed, if any.
        path: Option<PathBuf>,
        /// Underlying parse error.
        #[source]
        source: toml::de::Error,
    },
    /// The configuration parsed but cannot be used.
    #[error("invalid config: {message}")]
    Invalid {
        /// Description of the problem.
        message: String,
    },
}

/// On-disk representation; durations are expressed in milliseconds.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    host: String,
    port: u16,
    connect_timeout_ms: Option<u64>,
    max_line_length: Option<usize>,
    max_attempts: Option<u32>,
    #[serde(default)]
    socket: SocketFile,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct SocketFile {
    nodelay: Option<bool>,
    keepalive_secs: Option<u64>,
    linger_secs: Option<u64>,
}

impl ConfigFile {
    fn into_config(self) -> ConnectionConfig {
        let mut config = ConnectionConfig::new(self.host, self.port);
        if let Some(ms) = self.connect_timeout_ms {
            config = config.connect_timeout((ms > 0).then(|| Duration::from_millis(ms)));
        }
        if let Some(max) = self.max_line_length {
            config = config.max_line_length(max);
        }
        if let Some(attempts) = self.max_attempts {
            config = config.reconnect(ReconnectPolicy::new(attempts));
        }
        config.socket_options(self.socket.into_options())
    }
}

impl SocketFile {
    fn into_options(self) -> SocketOptions {
        let mut options = SocketOptions::default();
        if let Some(enabled) = self.nodelay {
            options = options.nodelay(enabled);
        }
        if let Some(secs) = self.keepalive_secs {
            options = options.keepalive((secs > 0).then(|| Duration::from_secs(secs)));
        }
        if let Some(secs) = self.linger_secs {
            options = options.linger(Some(Duration::from_secs(secs)));
        }
        options
    }
}
