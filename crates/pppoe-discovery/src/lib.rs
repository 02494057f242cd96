#![cfg_attr(not(feature = "std"), no_std)]

// 'alloc' is used for dynamic allocation (e.g., Vec<u8> in tags)
extern crate alloc;

// --- Foundation Modules ---
pub mod hal;
pub mod types;

// --- Wire Format ---
pub mod frame;

// --- Discovery Stage ---
pub mod discovery;

// --- Top-level Exports ---
pub use discovery::{
    AcOffer, Connection, DiscoveryEngine, DiscoveryOutcome, DiscoveryPhase, DiscoveryState,
    NoOpProbeReporter, ProbeReporter, Session, ServiceSelector,
};
#[cfg(feature = "std")]
pub use discovery::StdoutProbeReporter;
pub use frame::basic::MacAddress;
pub use frame::codec::{Codec, DiscoveryPacket, PacketView};
pub use hal::{Clock, NullPppLink, PacketInterface, PppLink, PppoeError};
pub use types::DiscoveryCode;
