//! Socket and connection setup.
//!
//! - [`connectjob`]: URL → resolved, reachability-checked address → TCP stream

pub mod connectjob;

pub use connectjob::ConnectJob;
