// crates/pppoe-discovery/tests/simulator/mod.rs

use pppoe_discovery::discovery::{AcOffer, ProbeReporter};
use pppoe_discovery::frame::tags::Tag;
use pppoe_discovery::{
    Clock, Codec, DiscoveryCode, DiscoveryPacket, MacAddress, PacketInterface, PppLink,
    PppoeError,
};
use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

pub const CLIENT_MAC: MacAddress = MacAddress([0x02, 0x00, 0x00, 0x00, 0x00, 0x01]);
pub const AC_MAC: MacAddress = MacAddress([0x02, 0x00, 0x00, 0x00, 0x00, 0x02]);

/// Virtual monotonic clock shared between the test and the interface.
#[derive(Clone, Default)]
pub struct SimClock(Rc<Cell<Duration>>);

impl SimClock {
    pub fn new() -> Self {
        Self::default()
    }

    fn advance_to(&self, instant: Duration) {
        if instant > self.0.get() {
            self.0.set(instant);
        }
    }
}

impl Clock for SimClock {
    fn now(&self) -> Duration {
        self.0.get()
    }
}

enum RxEvent {
    Frame { at: Duration, data: Vec<u8> },
    Interrupt { at: Duration },
}

impl RxEvent {
    fn at(&self) -> Duration {
        match self {
            RxEvent::Frame { at, .. } | RxEvent::Interrupt { at } => *at,
        }
    }
}

/// A simulated raw socket fed by a pre-scripted timeline of receive events.
///
/// Each empty poll advances the virtual clock by one readiness interval, the
/// way a real channel's read timeout would consume wall-clock time. Events
/// fire once the clock passes their scheduled instant; interrupts are
/// delivered without advancing the clock at all.
pub struct SimulatedInterface {
    clock: SimClock,
    local_mac: MacAddress,
    rx_script: Vec<RxEvent>,
    /// Transmitted frames with their virtual send times.
    pub tx_frames: Vec<(Duration, Vec<u8>)>,
    idle_step: Duration,
}

impl SimulatedInterface {
    pub fn new(local_mac: MacAddress, clock: SimClock) -> Self {
        Self {
            clock,
            local_mac,
            rx_script: Vec::new(),
            tx_frames: Vec::new(),
            idle_step: Duration::from_millis(100),
        }
    }

    /// Schedules a frame to arrive at the given virtual instant.
    pub fn schedule_frame(&mut self, at: Duration, data: Vec<u8>) {
        self.rx_script.push(RxEvent::Frame { at, data });
        self.rx_script.sort_by_key(RxEvent::at);
    }

    /// Schedules a signal interruption of the readiness wait.
    pub fn schedule_interrupt(&mut self, at: Duration) {
        self.rx_script.push(RxEvent::Interrupt { at });
        self.rx_script.sort_by_key(RxEvent::at);
    }

    /// Decoded view of every transmitted frame, in order.
    pub fn sent_packets(&self) -> Vec<DiscoveryPacket> {
        self.tx_frames
            .iter()
            .map(|(_, data)| DiscoveryPacket::deserialize(data).expect("sent frame must decode"))
            .collect()
    }

    /// Virtual send times of every transmitted frame with the given code.
    pub fn send_times(&self, code: DiscoveryCode) -> Vec<Duration> {
        self.tx_frames
            .iter()
            .filter(|(_, data)| data.get(15) == Some(&(code as u8)))
            .map(|(at, _)| *at)
            .collect()
    }
}

impl PacketInterface for SimulatedInterface {
    fn send_frame(&mut self, frame: &[u8]) -> Result<(), PppoeError> {
        self.tx_frames.push((self.clock.0.get(), frame.to_vec()));
        Ok(())
    }

    fn receive_frame(&mut self, buffer: &mut [u8]) -> Result<usize, PppoeError> {
        let now = self.clock.0.get();
        if self.rx_script.first().is_some_and(|event| event.at() <= now) {
            match self.rx_script.remove(0) {
                RxEvent::Frame { data, .. } => {
                    if buffer.len() < data.len() {
                        return Err(PppoeError::BufferTooShort);
                    }
                    buffer[..data.len()].copy_from_slice(&data);
                    Ok(data.len())
                }
                RxEvent::Interrupt { .. } => Err(PppoeError::Interrupted),
            }
        } else {
            // Nothing pending: one readiness interval elapses.
            self.clock.advance_to(now + self.idle_step);
            Ok(0)
        }
    }

    fn local_mac_address(&self) -> [u8; 6] {
        self.local_mac.0
    }
}

// --- Frame Builders ---

/// Builds a PADO from `src` to the client carrying the given tags.
pub fn pado(src: MacAddress, tags: Vec<Tag>) -> Vec<u8> {
    build(DiscoveryCode::Pado, CLIENT_MAC, src, 0, tags)
}

/// Builds a PADS from `src` to the client with the given session id.
pub fn pads(src: MacAddress, session_id: u16, tags: Vec<Tag>) -> Vec<u8> {
    build(DiscoveryCode::Pads, CLIENT_MAC, src, session_id, tags)
}

fn build(
    code: DiscoveryCode,
    dest: MacAddress,
    src: MacAddress,
    session_id: u16,
    tags: Vec<Tag>,
) -> Vec<u8> {
    let mut packet = DiscoveryPacket::new(code, dest, src);
    packet.session_id = session_id;
    packet.tags = tags;
    let mut buffer = [0u8; 1518];
    let len = packet.serialize(&mut buffer).expect("test frame must fit");
    buffer[..len].to_vec()
}

// --- Recording Collaborators ---

/// PPP link mock that records every MRU cap.
pub struct RecordingLink {
    pub max: u16,
    pub caps: Vec<u16>,
}

impl RecordingLink {
    pub fn new(max: u16) -> Self {
        Self { max, caps: Vec::new() }
    }
}

impl PppLink for RecordingLink {
    fn max_payload(&self) -> u16 {
        self.max
    }

    fn cap_mru(&mut self, limit: u16) {
        self.caps.push(limit);
    }
}

/// Probe reporter that records the streamed listing.
#[derive(Default)]
pub struct RecordingProbe {
    pub offers: Vec<AcOffer>,
    pub errors: Vec<(u16, Vec<u8>)>,
}

impl ProbeReporter for RecordingProbe {
    fn offer(&mut self, offer: &AcOffer) {
        self.offers.push(offer.clone());
    }

    fn error_tag(&mut self, tag_type: u16, message: &[u8]) {
        self.errors.push((tag_type, message.to_vec()));
    }
}
