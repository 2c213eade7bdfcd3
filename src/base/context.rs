//! Error context helpers.
//!
//! Turn raw IO outcomes from lookups and connects into `NetError`s that
//! carry the host being worked on.

use crate::base::neterror::NetError;
use std::io;
use tokio::time::error::Elapsed;

/// Attaches the host to an IO failure.
pub trait IoResultExt<T> {
    /// For failed TCP connects.
    ///
    /// # Example
    /// ```ignore
    /// use wsresolve::base::context::IoResultExt;
    ///
    /// let stream = TcpStream::connect(addr).await.connect_context("example.com", 443)?;
    /// ```
    fn connect_context(self, host: &str, port: u16) -> Result<T, NetError>;

    /// For failed platform lookups.
    fn lookup_context(self, domain: &str) -> Result<T, NetError>;
}

impl<T> IoResultExt<T> for Result<T, io::Error> {
    fn connect_context(self, host: &str, port: u16) -> Result<T, NetError> {
        self.map_err(|e| NetError::connection_failed_to(host, port, e))
    }

    fn lookup_context(self, domain: &str) -> Result<T, NetError> {
        self.map_err(|e| NetError::dns_failed(domain, e))
    }
}

/// [`IoResultExt::connect_context`] for a connect raced against
/// `tokio::time::timeout`. An elapsed timer is `ConnectionTimedOut`.
pub trait TimeoutResultExt<T> {
    fn connect_context(self, host: &str, port: u16) -> Result<T, NetError>;
}

impl<T> TimeoutResultExt<T> for Result<Result<T, io::Error>, Elapsed> {
    fn connect_context(self, host: &str, port: u16) -> Result<T, NetError> {
        self.map_err(|_| NetError::ConnectionTimedOut)?
            .connect_context(host, port)
    }
}
