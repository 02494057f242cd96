// crates/pppoe-discovery/src/discovery/connection.rs

use super::states::DiscoveryState;
use crate::frame::basic::MacAddress;
use crate::types::{DEFAULT_DISCOVERY_TIMEOUT, DEFAULT_MAX_ATTEMPTS};
use alloc::vec::Vec;
use core::time::Duration;

/// Service-Name selection policy for outgoing PADI/PADR frames.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ServiceSelector {
    /// Empty Service-Name tag; any offered service is acceptable.
    #[default]
    Any,
    /// A specific service: the tag carries the name, and a PADO must offer it
    /// with an exact length-and-bytes match.
    Named(Vec<u8>),
    /// Omit the Service-Name tag from PADI entirely. Workaround for
    /// concentrators that reject an empty tag; any offered service is
    /// acceptable, and PADR falls back to an empty tag.
    Omit,
}

impl ServiceSelector {
    /// Name bytes carried in outgoing Service-Name tags.
    pub(crate) fn tag_value(&self) -> &[u8] {
        match self {
            ServiceSelector::Named(name) => name,
            _ => &[],
        }
    }

    /// Whether the selector is satisfied before any tag has been seen.
    pub(crate) fn accepts_any(&self) -> bool {
        !matches!(self, ServiceSelector::Named(_))
    }

    /// Whether an offered Service-Name satisfies the selector.
    pub(crate) fn matches(&self, offered: &[u8]) -> bool {
        match self {
            ServiceSelector::Named(name) => name[..] == *offered,
            _ => true,
        }
    }
}

/// Mutable per-attempt discovery context.
///
/// Created by the embedding program, mutated only by the discovery engine
/// during a single [`DiscoveryEngine::run`](super::DiscoveryEngine::run),
/// and consumed by the PPP stack through [`Connection::session`] afterwards.
#[derive(Debug, Clone)]
pub struct Connection {
    /// Local interface MAC; fixed for the lifetime of the context.
    pub my_mac: MacAddress,
    /// Selected access concentrator; zero until a PADO is accepted,
    /// immutable afterwards.
    pub peer_mac: MacAddress,
    /// Service-Name policy for outgoing frames and PADO filtering.
    pub service: ServiceSelector,
    /// Required AC-Name; `None` accepts any concentrator.
    pub ac_name: Option<Vec<u8>>,
    /// Client demultiplexer. When set, received frames must echo it exactly
    /// or they are dropped.
    pub host_uniq: Option<Vec<u8>>,
    /// AC-Cookie captured from the accepted PADO, echoed verbatim in PADR.
    pub cookie: Option<Vec<u8>>,
    /// Relay-Session-Id captured from PADO/PADS, echoed verbatim in PADR.
    pub relay_id: Option<Vec<u8>>,
    /// Negotiated session id; valid only in [`DiscoveryState::Session`].
    pub session_id: u16,
    pub state: DiscoveryState,
    /// Well-formed PADOs seen; meaningful in probe mode only.
    pub num_pados: u32,
    /// Whether any PADO/PADS carried a usable PPP-Max-Payload tag.
    pub seen_max_payload: bool,

    // --- Configuration knobs ---
    /// Base per-phase timeout before exponential backoff.
    pub discovery_timeout: Duration,
    /// Transmissions per phase before the phase is exhausted.
    pub max_attempts: u32,
    /// Probe mode: list the answering concentrators instead of committing.
    pub print_ac_names: bool,
    /// Retry forever instead of surfacing timeouts and error tags.
    pub persist: bool,
    /// Treat the context as already in session (session id supplied externally).
    pub skip_discovery: bool,
    /// With `skip_discovery`: emit a PADT for the supplied session and stop.
    pub kill_session: bool,
}

impl Connection {
    pub fn new(my_mac: MacAddress) -> Self {
        Self {
            my_mac,
            peer_mac: MacAddress::ZERO,
            service: ServiceSelector::Any,
            ac_name: None,
            host_uniq: None,
            cookie: None,
            relay_id: None,
            session_id: 0,
            state: DiscoveryState::Initial,
            num_pados: 0,
            seen_max_payload: false,
            discovery_timeout: DEFAULT_DISCOVERY_TIMEOUT,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            print_ac_names: false,
            persist: false,
            skip_discovery: false,
            kill_session: false,
        }
    }

    /// The negotiated session view handed to the PPP stack.
    ///
    /// `Some` only after discovery reached the terminal `Session` state.
    pub fn session(&self) -> Option<Session<'_>> {
        if self.state == DiscoveryState::Session {
            Some(Session {
                peer_mac: self.peer_mac,
                session_id: self.session_id,
                relay_id: self.relay_id.as_deref(),
            })
        } else {
            None
        }
    }
}

/// Outputs of a successful discovery, consumed by the external PPP stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session<'a> {
    pub peer_mac: MacAddress,
    pub session_id: u16,
    pub relay_id: Option<&'a [u8]>,
}

impl Session<'_> {
    /// Session id in network byte order, ready for the session-stage header.
    pub fn session_id_be(&self) -> [u8; 2] {
        self.session_id.to_be_bytes()
    }
}
