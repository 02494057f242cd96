// crates/pppoe-discovery/src/discovery/mod.rs
//! The discovery stage: PADI/PADO/PADR/PADS exchange with retry, backoff,
//! peer filtering, and session handoff.

pub mod connection;
pub mod criteria;
pub mod engine;
pub mod probe;
pub mod receiver;
pub mod states;

pub use connection::{Connection, ServiceSelector, Session};
pub use engine::{send_padt, DiscoveryEngine, DiscoveryOutcome};
pub use probe::{AcOffer, NoOpProbeReporter, ProbeReporter};
pub use states::{DiscoveryPhase, DiscoveryState};

#[cfg(feature = "std")]
pub use probe::StdoutProbeReporter;
