use crate::hal::PppoeError;
use core::convert::TryFrom;
use core::time::Duration;

// --- Protocol Constants (RFC 2516) ---

/// Ethernet EtherType for PPPoE discovery frames: 0x8863
pub const ETH_PPPOE_DISCOVERY: u16 = 0x8863;

/// Combined version/type octet carried by every discovery frame (version 1, type 1).
pub const PPPOE_VERTYPE: u8 = 0x11;

/// Maximum TLV payload of a discovery frame in bytes.
pub const MAX_DISCOVERY_PAYLOAD: usize = 1484;

/// Conventional PPPoE MTU. MRUs above this value require RFC 4638
/// PPP-Max-Payload negotiation with the access concentrator.
pub const ETH_PPPOE_MTU: u16 = 1492;

// --- Retry Defaults ---

/// Per-phase timeout before the first exponential backoff step.
pub const DEFAULT_DISCOVERY_TIMEOUT: Duration = Duration::from_secs(5);

/// Ceiling applied to the doubled per-phase timeout in persistent mode.
pub const MAX_DISCOVERY_TIMEOUT: Duration = Duration::from_secs(60);

/// PADI/PADR transmissions per phase before the phase is declared exhausted.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

// --- Core Protocol Identifiers ---

/// PPPoE Active Discovery code points (RFC 2516, Section 5).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum DiscoveryCode {
    /// Active Discovery Initiation, broadcast by the client.
    Padi = 0x09,
    /// Active Discovery Offer, unicast reply from an access concentrator.
    Pado = 0x07,
    /// Active Discovery Request, the client's unicast selection.
    Padr = 0x19,
    /// Active Discovery Session-confirmation carrying the session id.
    Pads = 0x65,
    /// Active Discovery Terminate.
    Padt = 0xa7,
}

impl TryFrom<u8> for DiscoveryCode {
    type Error = PppoeError;
    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x09 => Ok(Self::Padi),
            0x07 => Ok(Self::Pado),
            0x19 => Ok(Self::Padr),
            0x65 => Ok(Self::Pads),
            0xa7 => Ok(Self::Padt),
            _ => Err(PppoeError::InvalidCode(value)),
        }
    }
}
