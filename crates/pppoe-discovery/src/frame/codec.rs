// crates/pppoe-discovery/src/frame/codec.rs

use crate::frame::basic::{
    EthernetHeader, MacAddress, DISCOVERY_HEADER_SIZE, ETHERNET_HEADER_SIZE,
};
use crate::frame::tags::{for_each_tag, Tag};
use crate::hal::PppoeError;
use crate::types::{DiscoveryCode, PPPOE_VERTYPE};
use alloc::vec::Vec;

/// A trait for objects that can be serialized into and deserialized from a byte buffer.
pub trait Codec: Sized {
    /// Serializes the object into the provided buffer.
    ///
    /// Returns the number of bytes written.
    fn serialize(&self, buffer: &mut [u8]) -> Result<usize, PppoeError>;

    /// Deserializes an object from the provided buffer.
    fn deserialize(buffer: &[u8]) -> Result<Self, PppoeError>;
}

// --- Transmit Side ---

/// An owned discovery frame assembled for transmission.
///
/// Tags are emitted in insertion order. Discovery frames carry session id 0;
/// only PADT names the session being torn down.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryPacket {
    pub destination: MacAddress,
    pub source: MacAddress,
    pub code: DiscoveryCode,
    pub session_id: u16,
    pub tags: Vec<Tag>,
}

impl DiscoveryPacket {
    pub fn new(code: DiscoveryCode, destination: MacAddress, source: MacAddress) -> Self {
        Self {
            destination,
            source,
            code,
            session_id: 0,
            tags: Vec::new(),
        }
    }

    pub fn push_tag(&mut self, tag: Tag) {
        self.tags.push(tag);
    }

    /// Total TLV bytes the queued tags occupy.
    pub fn payload_len(&self) -> usize {
        self.tags.iter().map(Tag::encoded_len).sum()
    }

    /// Total frame size on the wire.
    pub fn wire_len(&self) -> usize {
        DISCOVERY_HEADER_SIZE + self.payload_len()
    }
}

impl Codec for DiscoveryPacket {
    fn serialize(&self, buffer: &mut [u8]) -> Result<usize, PppoeError> {
        if buffer.len() < DISCOVERY_HEADER_SIZE {
            return Err(PppoeError::BufferTooShort);
        }

        EthernetHeader::new(self.destination, self.source).serialize(buffer)?;
        buffer[14] = PPPOE_VERTYPE;
        buffer[15] = self.code as u8;
        buffer[16..18].copy_from_slice(&self.session_id.to_be_bytes());

        let payload = &mut buffer[DISCOVERY_HEADER_SIZE..];
        let mut cursor = 0;
        for tag in &self.tags {
            cursor = tag.write(payload, cursor)?;
        }
        buffer[18..20].copy_from_slice(&(cursor as u16).to_be_bytes());

        Ok(DISCOVERY_HEADER_SIZE + cursor)
    }

    fn deserialize(buffer: &[u8]) -> Result<Self, PppoeError> {
        let view = PacketView::parse(buffer)?;
        let code = DiscoveryCode::try_from(view.code)?;
        let mut tags = Vec::new();
        for_each_tag(view.payload, |tag_type, value| {
            tags.push(Tag::new(tag_type, value));
        })?;
        Ok(Self {
            destination: view.eth.destination_mac,
            source: view.eth.source_mac,
            code,
            session_id: view.session_id,
            tags,
        })
    }
}

// --- Receive Side ---

/// A borrowed view of a received discovery frame.
///
/// `parse` validates only the fixed headers; the code byte is left raw so
/// that frames with unexpected codes can be dropped silently by the caller.
#[derive(Debug, Clone, Copy)]
pub struct PacketView<'a> {
    pub eth: EthernetHeader,
    pub code: u8,
    pub session_id: u16,
    pub payload: &'a [u8],
}

impl<'a> PacketView<'a> {
    /// Parses the headers of a received frame.
    ///
    /// Requires at least the 20 header bytes, the discovery EtherType, the
    /// 0x11 version/type octet, and a payload length field consistent with
    /// the received byte count.
    pub fn parse(frame: &'a [u8]) -> Result<Self, PppoeError> {
        if frame.len() < DISCOVERY_HEADER_SIZE {
            return Err(PppoeError::InvalidEthernetFrame);
        }
        let eth = EthernetHeader::deserialize(frame)?;
        if !eth.is_discovery() {
            return Err(PppoeError::InvalidEthernetFrame);
        }
        if frame[ETHERNET_HEADER_SIZE] != PPPOE_VERTYPE {
            return Err(PppoeError::InvalidVerType(frame[ETHERNET_HEADER_SIZE]));
        }
        let code = frame[15];
        let session_id = u16::from_be_bytes(frame[16..18].try_into()?);
        let length = u16::from_be_bytes(frame[18..20].try_into()?) as usize;
        if length + DISCOVERY_HEADER_SIZE > frame.len() {
            return Err(PppoeError::BogusLengthField(length as u16));
        }
        Ok(Self {
            eth,
            code,
            session_id,
            payload: &frame[DISCOVERY_HEADER_SIZE..DISCOVERY_HEADER_SIZE + length],
        })
    }

    /// Walks the frame's TLV stream in wire order.
    pub fn for_each_tag<F>(&self, visit: F) -> Result<(), PppoeError>
    where
        F: FnMut(u16, &[u8]),
    {
        for_each_tag(self.payload, visit)
    }
}

// --- Unit Tests ---

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::tags::{TAG_AC_COOKIE, TAG_HOST_UNIQ, TAG_SERVICE_NAME};
    use alloc::vec;

    fn sample_packet() -> DiscoveryPacket {
        let mut packet = DiscoveryPacket::new(
            DiscoveryCode::Padi,
            MacAddress::BROADCAST,
            MacAddress::new([0x02, 0x00, 0x00, 0x00, 0x00, 0x01]),
        );
        packet.push_tag(Tag::new(TAG_SERVICE_NAME, b"myisp".as_slice()));
        packet.push_tag(Tag::new(TAG_HOST_UNIQ, b"abc".as_slice()));
        packet
    }

    #[test]
    fn test_serialize_layout() {
        let packet = sample_packet();
        let mut buffer = [0u8; 64];
        let len = packet.serialize(&mut buffer).unwrap();

        // 14 + 6 header bytes plus two tags (4 + 5, 4 + 3).
        assert_eq!(len, DISCOVERY_HEADER_SIZE + 9 + 7);
        assert_eq!(len, packet.wire_len());
        assert_eq!(&buffer[0..6], &[0xFF; 6]);
        assert_eq!(&buffer[12..14], &[0x88, 0x63]);
        assert_eq!(buffer[14], 0x11);
        assert_eq!(buffer[15], DiscoveryCode::Padi as u8);
        assert_eq!(&buffer[16..18], &[0x00, 0x00]);
        // Length field equals the total TLV bytes.
        assert_eq!(u16::from_be_bytes([buffer[18], buffer[19]]), 16);
    }

    #[test]
    fn test_codec_roundtrip() {
        let mut packet = sample_packet();
        packet.push_tag(Tag::new(TAG_AC_COOKIE, vec![0xDE, 0xAD, 0xBE, 0xEF]));

        let mut buffer = [0u8; 128];
        let len = packet.serialize(&mut buffer).unwrap();

        let decoded = DiscoveryPacket::deserialize(&buffer[..len]).unwrap();
        assert_eq!(decoded, packet);
    }

    #[test]
    fn test_parse_rejects_short_frame() {
        let buffer = [0u8; 19];
        assert!(matches!(
            PacketView::parse(&buffer),
            Err(PppoeError::InvalidEthernetFrame)
        ));
    }

    #[test]
    fn test_parse_rejects_wrong_ethertype() {
        let mut buffer = [0u8; 32];
        buffer[12] = 0x08; // IP instead of discovery
        assert!(matches!(
            PacketView::parse(&buffer),
            Err(PppoeError::InvalidEthernetFrame)
        ));
    }

    #[test]
    fn test_parse_rejects_bogus_length_field() {
        let packet = sample_packet();
        let mut buffer = [0u8; 64];
        let len = packet.serialize(&mut buffer).unwrap();
        // Claim more payload than the frame carries.
        buffer[18..20].copy_from_slice(&100u16.to_be_bytes());
        assert_eq!(
            PacketView::parse(&buffer[..len]).unwrap_err(),
            PppoeError::BogusLengthField(100)
        );
    }

    #[test]
    fn test_parse_rejects_bad_vertype() {
        let packet = sample_packet();
        let mut buffer = [0u8; 64];
        let len = packet.serialize(&mut buffer).unwrap();
        buffer[14] = 0x21;
        assert_eq!(
            PacketView::parse(&buffer[..len]).unwrap_err(),
            PppoeError::InvalidVerType(0x21)
        );
    }

    #[test]
    fn test_view_exposes_declared_payload_only() {
        let packet = sample_packet();
        // Oversized receive buffer: trailing garbage beyond the declared length.
        let mut buffer = [0xAAu8; 256];
        let len = packet.serialize(&mut buffer).unwrap();
        let view = PacketView::parse(&buffer).unwrap();
        assert_eq!(view.payload.len(), len - DISCOVERY_HEADER_SIZE);
    }
}
