use std::io;
use std::sync::Arc;
use thiserror::Error;

/// Network errors surfaced by wsresolve.
///
/// Numeric codes follow Chromium's `net_error_list.h` so that a host bridge
/// can forward them unchanged.
#[derive(Debug, Error, Clone)]
pub enum NetError {
    // Connection Errors
    #[error("Connection closed (TCP FIN)")]
    ConnectionClosed,
    #[error("Connection failed")]
    ConnectionFailed,
    #[error("Connection to {host}:{port} failed: {source}")]
    ConnectionFailedTo {
        host: String,
        port: u16,
        #[source]
        source: Arc<io::Error>,
    },
    #[error("Connection timed out")]
    ConnectionTimedOut,

    // Resolution Errors
    #[error("Name not resolved")]
    NameNotResolved,
    #[error("Name not resolved for {domain}: {source}")]
    NameNotResolvedFor {
        domain: String,
        #[source]
        source: Arc<io::Error>,
    },
    #[error("Host unresolved: no reachable address for {domain}")]
    HostUnresolved { domain: String },
    #[error("Invalid IP address literal: {input}")]
    InvalidAddress { input: String },

    // WebSocket Errors
    #[error("WebSocket protocol error")]
    WsProtocolError,

    // URL Errors
    #[error("Invalid URL")]
    InvalidUrl,
    #[error("Unknown URL scheme")]
    UnknownUrlScheme,

    #[error("Unknown error: {0}")]
    Unknown(i32),
}

impl NetError {
    pub fn as_i32(&self) -> i32 {
        match self {
            NetError::ConnectionClosed => -100,
            NetError::ConnectionFailed | NetError::ConnectionFailedTo { .. } => -104,
            NetError::NameNotResolved
            | NetError::NameNotResolvedFor { .. }
            | NetError::HostUnresolved { .. } => -105,
            NetError::InvalidAddress { .. } => -108,
            NetError::ConnectionTimedOut => -118,
            NetError::WsProtocolError => -145,
            NetError::InvalidUrl => -300,
            NetError::UnknownUrlScheme => -302,
            NetError::Unknown(code) => *code,
        }
    }

    /// Builds a [`NetError::ConnectionFailedTo`] from an IO error.
    pub fn connection_failed_to(host: &str, port: u16, err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::TimedOut {
            return NetError::ConnectionTimedOut;
        }
        NetError::ConnectionFailedTo {
            host: host.to_string(),
            port,
            source: Arc::new(err),
        }
    }

    /// Builds a [`NetError::NameNotResolvedFor`] from an IO error.
    pub fn dns_failed(domain: &str, err: io::Error) -> Self {
        NetError::NameNotResolvedFor {
            domain: domain.to_string(),
            source: Arc::new(err),
        }
    }

    /// Returns true for the single error that means every resolution tier
    /// was exhausted.
    pub fn is_host_unresolved(&self) -> bool {
        matches!(self, NetError::HostUnresolved { .. })
    }
}

impl From<i32> for NetError {
    fn from(code: i32) -> Self {
        match code {
            -100 => NetError::ConnectionClosed,
            -104 => NetError::ConnectionFailed,
            -105 => NetError::NameNotResolved,
            -118 => NetError::ConnectionTimedOut,
            -145 => NetError::WsProtocolError,
            -300 => NetError::InvalidUrl,
            -302 => NetError::UnknownUrlScheme,
            _ => NetError::Unknown(code),
        }
    }
}
