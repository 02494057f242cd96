// crates/pppoe-discovery/src/discovery/probe.rs

use crate::frame::basic::MacAddress;
use alloc::vec::Vec;

/// One access concentrator offer observed while probing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcOffer {
    pub ac_name: Vec<u8>,
    /// Every Service-Name the PADO carried, in wire order.
    pub service_names: Vec<Vec<u8>>,
    pub cookie: Option<Vec<u8>>,
    pub relay_id: Option<Vec<u8>>,
    pub ac_mac: MacAddress,
}

/// Sink for the probe-mode concentrator listing.
///
/// The engine streams offers as PADOs arrive; implementations decide how (or
/// whether) to render them.
pub trait ProbeReporter {
    /// Called once per well-formed PADO.
    fn offer(&mut self, offer: &AcOffer);

    /// Called for each error tag carried by a PADO while probing.
    fn error_tag(&mut self, tag_type: u16, message: &[u8]);
}

/// Reporter that discards the listing (normal operation).
pub struct NoOpProbeReporter;

impl ProbeReporter for NoOpProbeReporter {
    fn offer(&mut self, _offer: &AcOffer) {}
    fn error_tag(&mut self, _tag_type: u16, _message: &[u8]) {}
}

/// Streams the listing to stdout, one block per concentrator.
#[cfg(feature = "std")]
#[derive(Default)]
pub struct StdoutProbeReporter {
    printed_any: bool,
}

#[cfg(feature = "std")]
impl StdoutProbeReporter {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(feature = "std")]
impl ProbeReporter for StdoutProbeReporter {
    fn offer(&mut self, offer: &AcOffer) {
        if self.printed_any {
            println!();
        }
        self.printed_any = true;

        println!(
            "Access-Concentrator: {}",
            String::from_utf8_lossy(&offer.ac_name)
        );
        for name in &offer.service_names {
            if !name.is_empty() {
                println!("       Service-Name: {}", String::from_utf8_lossy(name));
            }
        }
        if let Some(cookie) = &offer.cookie {
            println!("Got a cookie:{}", hex_preview(cookie));
        }
        if let Some(relay_id) = &offer.relay_id {
            println!("Got a Relay-ID:{}", hex_preview(relay_id));
        }
        println!("AC-Ethernet-Address: {}", offer.ac_mac);
    }

    fn error_tag(&mut self, tag_type: u16, message: &[u8]) {
        println!(
            "Got a {} tag: {}",
            crate::frame::tags::error_tag_name(tag_type),
            String::from_utf8_lossy(message)
        );
    }
}

/// First 20 bytes as " xx"-separated hex, with an ellipsis when truncated.
#[cfg(feature = "std")]
fn hex_preview(bytes: &[u8]) -> String {
    use core::fmt::Write;

    let mut out = String::new();
    for byte in bytes.iter().take(20) {
        let _ = write!(out, " {:02x}", byte);
    }
    if bytes.len() > 20 {
        out.push_str("...");
    }
    out
}
