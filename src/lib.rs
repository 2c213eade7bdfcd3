//! # wsresolve
//!
//! Resilient host resolution for long-lived client connections.
//!
//! `wsresolve` turns a hostname into a single address that has already
//! accepted a TCP connection, so a WebSocket (or any other stream client)
//! never starts its handshake against a stale or filtered answer.
//!
//! ## Features
//!
//! - **Racing Resolution**: DoH and plain UDP resolvers queried concurrently,
//!   first non-empty answer wins
//! - **Static Overrides**: operator-pinned IPs per host, consulted when the
//!   race yields nothing reachable
//! - **Platform Fallback**: getaddrinfo sweep as the last tier
//! - **Reachability Probing**: every tier's answer is TCP-probed before use
//! - **WebSocket Glue**: `ws://` / `wss://` connections routed through the
//!   resolver
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use wsresolve::dns::HostResolver;
//!
//! #[tokio::main]
//! async fn main() {
//!     let resolver = HostResolver::new().unwrap();
//!     resolver.add_static_host("api.example.com", "203.0.113.7").unwrap();
//!     let addr = resolver.resolve("api.example.com", 443).await.unwrap();
//!     println!("Connect to {}", addr);
//! }
//! ```
//!
//! ## Modules
//!
//! - [`base`] - Error definitions and error context helpers
//! - [`dns`] - Resolver endpoints, racing, static hosts and the pipeline
//! - [`socket`] - Resolve-then-connect job
//! - [`ws`] - WebSocket client on top of the pipeline

pub mod base;
pub mod dns;
pub mod socket;
pub mod ws;
