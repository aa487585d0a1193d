// Connection configuration for CellarClient

use crate::constants::{DEFAULT_HOST, DEFAULT_SCHEME, DEFAULT_TIMEOUT_MS};

/// Connection parameters captured by every operation of a client
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConnectionConfig {
    /// URL scheme (default: "https")
    pub scheme: String,
    /// API host, optionally with a port (default: "cellar.goa.design")
    pub host: String,
    /// Request timeout in milliseconds (default: 20000)
    pub timeout_ms: u64,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            scheme: DEFAULT_SCHEME.to_string(),
            host: DEFAULT_HOST.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl ConnectionConfig {
    /// Create a config for the given scheme and host with the default timeout
    pub fn new(scheme: &str, host: &str) -> Self {
        Self {
            scheme: scheme.to_string(),
            host: host.to_string(),
            ..Default::default()
        }
    }

    /// Set the URL scheme
    pub fn with_scheme(mut self, scheme: &str) -> Self {
        self.scheme = scheme.to_string();
        self
    }

    /// Set the host
    pub fn with_host(mut self, host: &str) -> Self {
        self.host = host.to_string();
        self
    }

    /// Set the request timeout; 0 means the default timeout
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self.normalized()
    }

    /// Replace a zero timeout with the default one
    pub fn normalized(mut self) -> Self {
        if self.timeout_ms == 0 {
            self.timeout_ms = DEFAULT_TIMEOUT_MS;
        }
        self
    }

    /// Prefix prepended verbatim to every request path
    pub fn url_prefix(&self) -> String {
        format!("{}://{}", self.scheme, self.host)
    }
}
