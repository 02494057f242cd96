// crates/pppoe-discovery/src/hal.rs
use crate::types::ETH_PPPOE_MTU;
use core::array::TryFromSliceError;
use core::fmt;
use core::time::Duration;

/// Defines a portable, descriptive Error type for the PPPoE discovery stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PppoeError {
    /// The provided buffer is too small for the operation.
    BufferTooShort,
    /// An underlying I/O error occurred.
    IoError,
    /// The readiness wait was broken by a signal; the caller retries.
    Interrupted,
    /// A received frame is fundamentally invalid (e.g., wrong EtherType or too short for headers).
    InvalidEthernetFrame,
    /// The version/type octet of a discovery frame is not 0x11.
    InvalidVerType(u8),
    /// A value in the frame is not a valid discovery code.
    InvalidCode(u8),
    /// The PPPoE length field disagrees with the number of bytes received.
    BogusLengthField(u16),
    /// A tag would extend past the declared end of the payload.
    TruncatedTag,
    /// The frame size exceeds the discovery payload window.
    FrameTooLarge,
    /// A multi-byte value could not be parsed from a slice (often due to wrong length).
    SliceConversion,
}

impl fmt::Display for PppoeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BufferTooShort => write!(f, "Buffer is too short"),
            Self::IoError => write!(f, "Underlying I/O error"),
            Self::Interrupted => write!(f, "Readiness wait interrupted by signal"),
            Self::InvalidEthernetFrame => {
                write!(f, "Invalid Ethernet frame (e.g., wrong EtherType)")
            }
            Self::InvalidVerType(v) => write!(f, "Invalid PPPoE version/type octet: {:#04x}", v),
            Self::InvalidCode(v) => write!(f, "Invalid discovery code: {:#04x}", v),
            Self::BogusLengthField(v) => write!(f, "Bogus PPPoE length field ({})", v),
            Self::TruncatedTag => write!(f, "Tag extends past the declared payload end"),
            Self::FrameTooLarge => write!(f, "Frame size exceeds the discovery payload window"),
            Self::SliceConversion => write!(f, "Failed to convert slice to fixed-size array"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for PppoeError {}

impl From<TryFromSliceError> for PppoeError {
    fn from(_: TryFromSliceError) -> Self {
        PppoeError::SliceConversion
    }
}

/// Hardware Abstraction Layer (HAL) for raw Ethernet discovery I/O.
///
/// The discovery engine borrows an already-open raw socket bound to a specific
/// interface; it never opens, closes, or reconfigures the socket itself.
pub trait PacketInterface {
    /// Sends a complete raw Ethernet frame (including Ethernet header).
    fn send_frame(&mut self, frame: &[u8]) -> Result<(), PppoeError>;

    /// Attempts to receive a single raw Ethernet frame into the provided buffer.
    ///
    /// Blocks for at most the implementation's readiness interval and returns
    /// the number of bytes read. Returns Ok(0) on a read timeout, and
    /// `Err(PppoeError::Interrupted)` when the wait was broken by a signal;
    /// callers retry both against their own deadline.
    /// The buffer must be large enough to hold a maximum Ethernet frame (e.g. 1518 bytes).
    fn receive_frame(&mut self, buffer: &mut [u8]) -> Result<usize, PppoeError>;

    /// Returns the local MAC address of the interface.
    fn local_mac_address(&self) -> [u8; 6];
}

/// Monotonic time source used for discovery deadlines.
///
/// Implementations report the time elapsed since an arbitrary fixed origin;
/// the engine only ever compares instants and computes remaining budgets.
pub trait Clock {
    fn now(&self) -> Duration;
}

// --- PPP Stack Abstraction ---

/// MRU negotiation callbacks into the external PPP stack (RFC 4638).
///
/// When discovery runs embedded in a PPP daemon, the implementation maps onto
/// the daemon's LCP option tables. The engine lowers the stack's MRUs when the
/// access concentrator advertises a smaller PPP-Max-Payload, and clamps them
/// to 1492 when the concentrator never advertised one.
pub trait PppLink {
    /// The smaller of the MRUs the PPP layer would advertise and request.
    fn max_payload(&self) -> u16;

    /// Lowers both the advertised and the requested MRU to at most `limit`.
    fn cap_mru(&mut self, limit: u16);
}

/// PPP link stub for standalone operation.
///
/// Pins the maximum payload at the conventional PPPoE MTU so no
/// PPP-Max-Payload tag is ever emitted, and ignores MRU caps.
pub struct NullPppLink;

impl PppLink for NullPppLink {
    fn max_payload(&self) -> u16 {
        ETH_PPPOE_MTU
    }

    fn cap_mru(&mut self, _limit: u16) {}
}
