// crates/pppoe-discovery/src/frame/mod.rs
//! Wire format of PPPoE discovery frames: Ethernet header, PPPoE header,
//! and the TLV tag stream.

pub mod basic;
pub mod codec;
pub mod tags;

pub use basic::{EthernetHeader, MacAddress};
pub use codec::{Codec, DiscoveryPacket, PacketView};
pub use tags::{for_each_tag, Tag};
