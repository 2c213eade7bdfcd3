//! DNS Resolution Module
//!
//! Resilient host resolution for connection setup:
//! - Racing several independent DNS sources (DoH and plain UDP)
//! - Operator-declared static host overrides
//! - A reachability-checked sweep over the platform resolver
//!
//! # Architecture
//!
//! [`Source`] is one racing DNS source and [`Resolve`] is the platform
//! resolver; both are traits so tests and embedders can substitute their
//! own. [`HostResolver`] composes them into the tiered pipeline.
//!
//! # Example
//!
//! ```rust,ignore
//! use wsresolve::dns::HostResolver;
//!
//! let resolver = HostResolver::new()?;
//! let addr = resolver.resolve("example.com", 443).await?;
//! println!("Reachable at {}", addr);
//! ```

mod config;
mod endpoint;
mod gai;
mod hickory;
mod hosts;
mod pipeline;
pub mod probe;
mod race;
mod resolve;

pub use config::{RaceStrategy, ResolutionConfig};
pub use endpoint::ResolverEndpoint;
pub use gai::GaiResolver;
pub use hickory::HickorySource;
pub use hosts::{StaticHostTable, STATIC_SOURCE};
pub use pipeline::{HostResolver, Tier, SYSTEM_SOURCE};
pub use race::RaceEngine;
pub use resolve::{Addrs, Candidate, Name, Querying, Resolve, Resolving, Source};
