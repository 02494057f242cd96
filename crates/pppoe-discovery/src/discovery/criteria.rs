// crates/pppoe-discovery/src/discovery/criteria.rs

use super::connection::Connection;
use super::probe::{AcOffer, ProbeReporter};
use crate::frame::codec::PacketView;
use crate::frame::tags::{
    error_tag_name, TAG_AC_COOKIE, TAG_AC_NAME, TAG_AC_SYSTEM_ERROR, TAG_GENERIC_ERROR,
    TAG_HOST_UNIQ, TAG_PPP_MAX_PAYLOAD, TAG_RELAY_SESSION_ID, TAG_SERVICE_NAME,
    TAG_SERVICE_NAME_ERROR,
};
use crate::hal::{PppLink, PppoeError};
use crate::types::ETH_PPPOE_MTU;
use alloc::string::String;
use alloc::vec::Vec;
use log::{debug, error};

/// True when a received frame is addressed to this client: the destination
/// MAC matches, and the configured Host-Uniq (if any) is echoed exactly.
pub fn packet_is_for_me(conn: &Connection, view: &PacketView<'_>) -> Result<bool, PppoeError> {
    if view.eth.destination_mac != conn.my_mac {
        return Ok(false);
    }
    // Without a Host-Uniq there is nothing further to demultiplex on.
    let Some(host_uniq) = &conn.host_uniq else {
        return Ok(true);
    };
    let mut for_me = false;
    view.for_each_tag(|tag_type, value| {
        if tag_type == TAG_HOST_UNIQ && value.len() == host_uniq.len() && *value == host_uniq[..] {
            for_me = true;
        }
    })?;
    Ok(for_me)
}

/// Classification of a PADO against the configured identity filters.
#[derive(Debug, Default)]
pub struct PadoCriteria {
    /// An AC-Name tag was present (mandatory per RFC 2516).
    pub seen_ac_name: bool,
    /// A Service-Name tag was present (mandatory per RFC 2516).
    pub seen_service_name: bool,
    pub ac_name_ok: bool,
    pub service_name_ok: bool,
    /// First error tag carried by the frame, if any (type and text).
    pub error: Option<(u16, Vec<u8>)>,
}

/// Everything a single pass over a PADO's tags produces.
///
/// Captures are returned rather than written to the context so that the
/// engine commits cookie and relay-id only for the offer it actually selects.
#[derive(Debug, Default)]
pub struct PadoInspection {
    pub criteria: PadoCriteria,
    pub cookie: Option<Vec<u8>>,
    pub relay_id: Option<Vec<u8>>,
    /// Offer record for the probe listing; collected only in probe mode.
    pub offer: Option<AcOffer>,
    /// A usable PPP-Max-Payload tag was present and applied to the PPP link.
    pub saw_max_payload: bool,
}

/// Single pass over a PADO's tag stream.
///
/// Fills the criteria flags, captures AC-Cookie and Relay-Session-Id, applies
/// RFC 4638 MRU tags through `link`, and collects the offer record in probe
/// mode. Error tags are reported to `probe` while probing; otherwise they are
/// logged and recorded in the criteria.
pub fn inspect_pado<L: PppLink, P: ProbeReporter>(
    conn: &Connection,
    link: &mut L,
    probe: &mut P,
    view: &PacketView<'_>,
) -> Result<PadoInspection, PppoeError> {
    let probing = conn.print_ac_names;
    let mut inspection = PadoInspection {
        criteria: PadoCriteria {
            ac_name_ok: conn.ac_name.is_none(),
            service_name_ok: conn.service.accepts_any(),
            ..Default::default()
        },
        offer: probing.then(|| AcOffer {
            ac_name: Vec::new(),
            service_names: Vec::new(),
            cookie: None,
            relay_id: None,
            ac_mac: view.eth.source_mac,
        }),
        ..Default::default()
    };

    view.for_each_tag(|tag_type, value| match tag_type {
        TAG_AC_NAME => {
            inspection.criteria.seen_ac_name = true;
            if let Some(offer) = &mut inspection.offer {
                offer.ac_name = value.to_vec();
            }
            if let Some(want) = &conn.ac_name {
                if want[..] == *value {
                    inspection.criteria.ac_name_ok = true;
                }
            }
        }
        TAG_SERVICE_NAME => {
            inspection.criteria.seen_service_name = true;
            if let Some(offer) = &mut inspection.offer {
                offer.service_names.push(value.to_vec());
            }
            if conn.service.matches(value) {
                inspection.criteria.service_name_ok = true;
            }
        }
        TAG_AC_COOKIE => {
            if let Some(offer) = &mut inspection.offer {
                offer.cookie = Some(value.to_vec());
            }
            inspection.cookie = Some(value.to_vec());
        }
        TAG_RELAY_SESSION_ID => {
            if let Some(offer) = &mut inspection.offer {
                offer.relay_id = Some(value.to_vec());
            }
            inspection.relay_id = Some(value.to_vec());
        }
        TAG_SERVICE_NAME_ERROR | TAG_AC_SYSTEM_ERROR | TAG_GENERIC_ERROR => {
            if probing {
                probe.error_tag(tag_type, value);
            } else {
                log_error_tag("PADO", tag_type, value);
                if inspection.criteria.error.is_none() {
                    inspection.criteria.error = Some((tag_type, value.to_vec()));
                }
            }
        }
        TAG_PPP_MAX_PAYLOAD => {
            if apply_max_payload(link, value) {
                inspection.saw_max_payload = true;
            }
        }
        _ => {}
    })?;

    Ok(inspection)
}

/// Everything a single pass over a PADS's tags produces.
#[derive(Debug, Default)]
pub struct PadsInspection {
    /// The PADS carried an error tag and must not establish a session.
    pub had_error: bool,
    pub relay_id: Option<Vec<u8>>,
    pub saw_max_payload: bool,
}

/// Single pass over a PADS's tag stream: error tags, Relay-Session-Id
/// capture, and the RFC 4638 MRU tag.
pub fn inspect_pads<L: PppLink>(
    link: &mut L,
    view: &PacketView<'_>,
) -> Result<PadsInspection, PppoeError> {
    let mut inspection = PadsInspection::default();

    view.for_each_tag(|tag_type, value| match tag_type {
        TAG_SERVICE_NAME => {
            debug!("PADS: Service-Name: '{}'", String::from_utf8_lossy(value));
        }
        TAG_SERVICE_NAME_ERROR | TAG_AC_SYSTEM_ERROR | TAG_GENERIC_ERROR => {
            log_error_tag("PADS", tag_type, value);
            inspection.had_error = true;
        }
        TAG_RELAY_SESSION_ID => {
            inspection.relay_id = Some(value.to_vec());
        }
        TAG_PPP_MAX_PAYLOAD => {
            if apply_max_payload(link, value) {
                inspection.saw_max_payload = true;
            }
        }
        _ => {}
    })?;

    Ok(inspection)
}

/// Applies a PPP-Max-Payload tag to the PPP link.
///
/// The tag is honoured only with an exact 16-bit length and an MRU at or
/// above the conventional PPPoE MTU (RFC 4638).
fn apply_max_payload<L: PppLink>(link: &mut L, value: &[u8]) -> bool {
    let Ok(raw) = <[u8; 2]>::try_from(value) else {
        return false;
    };
    let mru = u16::from_be_bytes(raw);
    if mru >= ETH_PPPOE_MTU {
        link.cap_mru(mru);
        return true;
    }
    false
}

pub(crate) fn log_error_tag(packet: &str, tag_type: u16, message: &[u8]) {
    error!(
        "{}: {}: {}",
        packet,
        error_tag_name(tag_type),
        String::from_utf8_lossy(message)
    );
}

// --- Unit Tests ---
