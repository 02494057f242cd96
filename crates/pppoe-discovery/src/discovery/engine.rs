// crates/pppoe-discovery/src/discovery/engine.rs

use super::connection::{Connection, ServiceSelector};
use super::criteria;
use super::probe::ProbeReporter;
use super::receiver::recv_frame;
use super::states::{DiscoveryPhase, DiscoveryState};
use crate::frame::basic::MacAddress;
use crate::frame::codec::{Codec, DiscoveryPacket, PacketView};
use crate::frame::tags::{
    error_tag_name, Tag, TAG_AC_COOKIE, TAG_HOST_UNIQ, TAG_PPP_MAX_PAYLOAD,
    TAG_RELAY_SESSION_ID, TAG_SERVICE_NAME,
};
use crate::hal::{Clock, PacketInterface, PppLink, PppoeError};
use crate::types::{DiscoveryCode, ETH_PPPOE_MTU, MAX_DISCOVERY_TIMEOUT};
use alloc::format;
use alloc::string::String;
use core::time::Duration;
use log::{debug, error, info, warn};

/// Receive buffer sized for a maximum Ethernet frame.
const FRAME_BUFFER_SIZE: usize = 1518;

/// Terminal result of a discovery run.
///
/// The engine never terminates the process; the embedding program translates
/// the outcome into its own exit policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscoveryOutcome {
    /// Terminal `Session` state reached; the context holds session id and peer.
    Session,
    /// Probe listing finished; number of well-formed offers seen.
    ProbeDone { offers: u32 },
    /// Kill-session shortcut: a PADT was emitted for the supplied session.
    SessionKilled,
    /// Retries exhausted without an acceptable response.
    Timeout { phase: DiscoveryPhase },
    /// An access concentrator reported a fatal error tag.
    Fatal { reason: String },
}

/// Verdict of the PADI/PADO phase, consumed by the outer discovery loop.
enum PadiVerdict {
    /// A PADO matching the filters committed a peer.
    Committed,
    /// Probe window closed; the listing is complete.
    ProbeDone,
    /// Attempts exhausted without persistence.
    TimedOut,
    Fatal(String),
}

/// Verdict of the PADR/PADS phase, consumed by the outer discovery loop.
enum PadrVerdict {
    Established,
    /// Persistent exhaustion: rerun the whole discovery from PADI.
    RestartDiscovery,
    TimedOut,
}

/// Result of one PADO receive window.
enum PadoWait {
    Matched,
    /// Deadline elapsed without a committing offer.
    Exhausted,
    Fatal(String),
}

/// Drives the discovery exchange for one connection context.
///
/// Single-flow: the engine owns the borrowed socket for the duration of
/// [`run`](Self::run), and a second run on the same context is undefined.
pub struct DiscoveryEngine<'a, L, P> {
    conn: &'a mut Connection,
    link: &'a mut L,
    probe: &'a mut P,
}

impl<'a, L: PppLink, P: ProbeReporter> DiscoveryEngine<'a, L, P> {
    pub fn new(conn: &'a mut Connection, link: &'a mut L, probe: &'a mut P) -> Self {
        Self { conn, link, probe }
    }

    /// Runs discovery to completion against the supplied raw socket and clock.
    ///
    /// Entry precondition: the context is in `DiscoveryState::Initial`
    /// (unless `skip_discovery` is set).
    pub fn run<I: PacketInterface, C: Clock>(
        &mut self,
        iface: &mut I,
        clock: &C,
    ) -> Result<DiscoveryOutcome, PppoeError> {
        if self.conn.skip_discovery {
            self.conn.state = DiscoveryState::Session;
            if self.conn.kill_session {
                send_padt(self.conn, iface, "session killed manually")?;
                return Ok(DiscoveryOutcome::SessionKilled);
            }
            return Ok(DiscoveryOutcome::Session);
        }

        loop {
            match self.padi_phase(iface, clock)? {
                PadiVerdict::Committed => {}
                PadiVerdict::ProbeDone => {
                    return Ok(DiscoveryOutcome::ProbeDone {
                        offers: self.conn.num_pados,
                    });
                }
                PadiVerdict::TimedOut => {
                    return Ok(DiscoveryOutcome::Timeout {
                        phase: DiscoveryPhase::Pado,
                    });
                }
                PadiVerdict::Fatal(reason) => return Ok(DiscoveryOutcome::Fatal { reason }),
            }

            match self.padr_phase(iface, clock)? {
                PadrVerdict::Established => {
                    // RFC 4638: without a PPP-Max-Payload from the peer, the
                    // PPP MTU/MRU MUST be limited to 1492.
                    if !self.conn.seen_max_payload {
                        self.link.cap_mru(ETH_PPPOE_MTU);
                    }
                    return Ok(DiscoveryOutcome::Session);
                }
                PadrVerdict::RestartDiscovery => {
                    self.conn.state = DiscoveryState::Initial;
                }
                PadrVerdict::TimedOut => {
                    return Ok(DiscoveryOutcome::Timeout {
                        phase: DiscoveryPhase::Pads,
                    });
                }
            }
        }
    }

    // --- PADI/PADO Phase ---

    fn padi_phase<I: PacketInterface, C: Clock>(
        &mut self,
        iface: &mut I,
        clock: &C,
    ) -> Result<PadiVerdict, PppoeError> {
        let mut attempts = 0u32;
        let mut timeout = self.conn.discovery_timeout;

        loop {
            attempts += 1;
            if attempts > self.conn.max_attempts {
                warn!("Timeout waiting for PADO packets");
                if self.conn.print_ac_names {
                    // Probes are bounded; report what was collected.
                    return Ok(PadiVerdict::ProbeDone);
                }
                if self.conn.persist {
                    attempts = 0;
                    timeout = self.conn.discovery_timeout;
                } else {
                    return Ok(PadiVerdict::TimedOut);
                }
            }

            self.send_padi(iface)?;
            self.conn.state = DiscoveryState::SentPadi;

            let wait = self.wait_for_pado(iface, clock, timeout)?;

            // Probe runs are bounded: no exponential backoff while listing.
            if !self.conn.print_ac_names {
                timeout = double_capped(timeout);
            }
            match wait {
                PadoWait::Fatal(reason) => return Ok(PadiVerdict::Fatal(reason)),
                PadoWait::Matched => return Ok(PadiVerdict::Committed),
                PadoWait::Exhausted => {}
            }
            if self.conn.print_ac_names && self.conn.num_pados > 0 {
                return Ok(PadiVerdict::ProbeDone);
            }
        }
    }

    fn send_padi<I: PacketInterface>(&mut self, iface: &mut I) -> Result<(), PppoeError> {
        let mut packet =
            DiscoveryPacket::new(DiscoveryCode::Padi, MacAddress::BROADCAST, self.conn.my_mac);
        if !matches!(self.conn.service, ServiceSelector::Omit) {
            packet.push_tag(Tag::new(TAG_SERVICE_NAME, self.conn.service.tag_value()));
        }
        if let Some(host_uniq) = &self.conn.host_uniq {
            packet.push_tag(Tag::new(TAG_HOST_UNIQ, host_uniq.clone()));
        }
        self.push_max_payload_tag(&mut packet);
        debug!("Sending PADI from {}", self.conn.my_mac);
        transmit(iface, &packet)
    }

    /// Collects PADOs until one commits a peer or the window closes.
    ///
    /// In probe mode every well-formed offer is reported and the window is
    /// always ridden out; otherwise the first offer satisfying both filters
    /// wins and the receive loop stops there.
    fn wait_for_pado<I: PacketInterface, C: Clock>(
        &mut self,
        iface: &mut I,
        clock: &C,
        timeout: Duration,
    ) -> Result<PadoWait, PppoeError> {
        let deadline = clock.now() + timeout;
        let mut buffer = [0u8; FRAME_BUFFER_SIZE];
        self.conn.seen_max_payload = false;

        loop {
            let Some(len) = recv_frame(iface, clock, deadline, &mut buffer)? else {
                return Ok(PadoWait::Exhausted);
            };

            let view = match PacketView::parse(&buffer[..len]) {
                Ok(view) => view,
                Err(PppoeError::BogusLengthField(length)) => {
                    error!("Bogus PPPoE length field ({})", length);
                    continue;
                }
                // Unrelated traffic on the shared segment.
                Err(_) => continue,
            };
            match criteria::packet_is_for_me(self.conn, &view) {
                Ok(true) => {}
                Ok(false) => continue,
                Err(e) => {
                    debug!("Dropping malformed discovery frame: {}", e);
                    continue;
                }
            }
            if view.code != DiscoveryCode::Pado as u8 {
                continue;
            }
            if view.eth.source_mac.is_broadcast() {
                error!("Ignoring PADO packet from broadcast MAC address");
                continue;
            }

            let inspection =
                match criteria::inspect_pado(self.conn, self.link, self.probe, &view) {
                    Ok(inspection) => inspection,
                    Err(e) => {
                        debug!("Dropping malformed PADO: {}", e);
                        continue;
                    }
                };
            if inspection.saw_max_payload {
                self.conn.seen_max_payload = true;
            }
            if let Some((tag_type, text)) = inspection.criteria.error {
                error!("Error in PADO packet");
                if !self.conn.persist {
                    return Ok(PadoWait::Fatal(fatal_reason(tag_type, &text)));
                }
                continue;
            }
            if !inspection.criteria.seen_ac_name {
                error!("Ignoring PADO packet with no AC-Name tag");
                continue;
            }
            if !inspection.criteria.seen_service_name {
                error!("Ignoring PADO packet with no Service-Name tag");
                continue;
            }

            self.conn.num_pados += 1;
            if self.conn.print_ac_names {
                if let Some(offer) = &inspection.offer {
                    self.probe.offer(offer);
                }
                continue;
            }

            if inspection.criteria.ac_name_ok && inspection.criteria.service_name_ok {
                // First offer satisfying both filters wins.
                self.conn.peer_mac = view.eth.source_mac;
                self.conn.cookie = inspection.cookie;
                self.conn.relay_id = inspection.relay_id;
                self.conn.state = DiscoveryState::ReceivedPado;
                debug!("Received acceptable PADO from {}", self.conn.peer_mac);
                return Ok(PadoWait::Matched);
            }
        }
    }

    // --- PADR/PADS Phase ---

    fn padr_phase<I: PacketInterface, C: Clock>(
        &mut self,
        iface: &mut I,
        clock: &C,
    ) -> Result<PadrVerdict, PppoeError> {
        let mut attempts = 0u32;
        let mut timeout = self.conn.discovery_timeout;

        loop {
            attempts += 1;
            if attempts > self.conn.max_attempts {
                warn!("Timeout waiting for PADS packets");
                if self.conn.persist {
                    return Ok(PadrVerdict::RestartDiscovery);
                }
                return Ok(PadrVerdict::TimedOut);
            }

            self.send_padr(iface)?;
            self.conn.state = DiscoveryState::SentPadr;
            self.wait_for_pads(iface, clock, timeout)?;
            timeout = double_capped(timeout);

            if self.conn.state == DiscoveryState::Session {
                return Ok(PadrVerdict::Established);
            }
        }
    }

    fn send_padr<I: PacketInterface>(&mut self, iface: &mut I) -> Result<(), PppoeError> {
        let mut packet =
            DiscoveryPacket::new(DiscoveryCode::Padr, self.conn.peer_mac, self.conn.my_mac);
        // Service-Name is mandatory in PADR, even when empty.
        packet.push_tag(Tag::new(TAG_SERVICE_NAME, self.conn.service.tag_value()));
        if let Some(host_uniq) = &self.conn.host_uniq {
            packet.push_tag(Tag::new(TAG_HOST_UNIQ, host_uniq.clone()));
        }
        if let Some(cookie) = &self.conn.cookie {
            packet.push_tag(Tag::new(TAG_AC_COOKIE, cookie.clone()));
        }
        if let Some(relay_id) = &self.conn.relay_id {
            packet.push_tag(Tag::new(TAG_RELAY_SESSION_ID, relay_id.clone()));
        }
        self.push_max_payload_tag(&mut packet);
        debug!("Sending PADR to {}", self.conn.peer_mac);
        transmit(iface, &packet)
    }

    fn wait_for_pads<I: PacketInterface, C: Clock>(
        &mut self,
        iface: &mut I,
        clock: &C,
        timeout: Duration,
    ) -> Result<(), PppoeError> {
        let deadline = clock.now() + timeout;
        let mut buffer = [0u8; FRAME_BUFFER_SIZE];

        loop {
            let Some(len) = recv_frame(iface, clock, deadline, &mut buffer)? else {
                return Ok(());
            };

            let view = match PacketView::parse(&buffer[..len]) {
                Ok(view) => view,
                Err(PppoeError::BogusLengthField(length)) => {
                    error!("Bogus PPPoE length field ({})", length);
                    continue;
                }
                Err(_) => continue,
            };
            // If it's not from the selected concentrator, it's not for us.
            if view.eth.source_mac != self.conn.peer_mac {
                continue;
            }
            match criteria::packet_is_for_me(self.conn, &view) {
                Ok(true) => {}
                Ok(false) => continue,
                Err(e) => {
                    debug!("Dropping malformed discovery frame: {}", e);
                    continue;
                }
            }
            if view.code != DiscoveryCode::Pads as u8 {
                continue;
            }

            let inspection = match criteria::inspect_pads(self.link, &view) {
                Ok(inspection) => inspection,
                Err(e) => {
                    debug!("Dropping malformed PADS: {}", e);
                    continue;
                }
            };
            if inspection.saw_max_payload {
                self.conn.seen_max_payload = true;
            }
            if inspection.had_error {
                continue;
            }
            if let Some(relay_id) = inspection.relay_id {
                self.conn.relay_id = Some(relay_id);
            }

            self.conn.session_id = view.session_id;
            self.conn.state = DiscoveryState::Session;
            info!(
                "PPP session is {} (0x{:x})",
                self.conn.session_id, self.conn.session_id
            );
            // RFC 2516 says the session id MUST NOT be zero or 0xFFFF.
            if self.conn.session_id == 0 || self.conn.session_id == 0xFFFF {
                error!(
                    "Access concentrator used a session value of {:x} -- the AC is violating RFC 2516",
                    self.conn.session_id
                );
            }
            return Ok(());
        }
    }

    fn push_max_payload_tag(&self, packet: &mut DiscoveryPacket) {
        let mru = self.link.max_payload();
        if mru > ETH_PPPOE_MTU {
            packet.push_tag(Tag::new(TAG_PPP_MAX_PAYLOAD, mru.to_be_bytes()));
        }
    }
}

/// Sends a PADT terminating the context's current session.
///
/// Carries the Host-Uniq, AC-Cookie and Relay-Session-Id when present, then
/// zeroes the context's session id so no further teardown can reference it.
pub fn send_padt<I: PacketInterface>(
    conn: &mut Connection,
    iface: &mut I,
    reason: &str,
) -> Result<(), PppoeError> {
    let mut packet = DiscoveryPacket::new(DiscoveryCode::Padt, conn.peer_mac, conn.my_mac);
    packet.session_id = conn.session_id;
    conn.session_id = 0;

    if let Some(host_uniq) = &conn.host_uniq {
        packet.push_tag(Tag::new(TAG_HOST_UNIQ, host_uniq.clone()));
    }
    if let Some(cookie) = &conn.cookie {
        packet.push_tag(Tag::new(TAG_AC_COOKIE, cookie.clone()));
    }
    if let Some(relay_id) = &conn.relay_id {
        packet.push_tag(Tag::new(TAG_RELAY_SESSION_ID, relay_id.clone()));
    }

    transmit(iface, &packet)?;
    info!("Sent PADT: {}", reason);
    Ok(())
}

fn transmit<I: PacketInterface>(
    iface: &mut I,
    packet: &DiscoveryPacket,
) -> Result<(), PppoeError> {
    let mut buffer = [0u8; FRAME_BUFFER_SIZE];
    let len = packet.serialize(&mut buffer)?;
    iface.send_frame(&buffer[..len])
}

/// Exponential backoff step, saturating at the discovery timeout ceiling.
fn double_capped(timeout: Duration) -> Duration {
    (timeout * 2).min(MAX_DISCOVERY_TIMEOUT)
}

fn fatal_reason(tag_type: u16, text: &[u8]) -> String {
    format!(
        "{}: {}",
        error_tag_name(tag_type),
        String::from_utf8_lossy(text)
    )
}
