// crates/pppoe-discovery-linux/examples/discover.rs
//! Runs PPPoE discovery against a real interface.
//!
//! Requires CAP_NET_RAW (typically root):
//!
//!   sudo -E cargo run --example discover -- <interface> [-A | <service-name>]
//!
//! With `-A` the example only probes: it lists every access concentrator
//! answering on the segment. Otherwise it negotiates a session and prints
//! the resulting session parameters.

use log::{error, info};
use pppoe_discovery::{
    Connection, DiscoveryEngine, DiscoveryOutcome, MacAddress, NoOpProbeReporter, NullPppLink,
    PacketInterface, ServiceSelector, StdoutProbeReporter,
};
use pppoe_discovery_linux::{LinuxPnetInterface, MonotonicClock};
use std::env;
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::init();

    let mut args = env::args().skip(1);
    let Some(interface_name) = args.next() else {
        eprintln!("usage: discover <interface> [-A | <service-name>]");
        return ExitCode::FAILURE;
    };
    let selector_arg = args.next();

    let mut iface = match LinuxPnetInterface::new(&interface_name) {
        Ok(iface) => iface,
        Err(e) => {
            error!("Cannot open '{}': {}", interface_name, e);
            return ExitCode::FAILURE;
        }
    };
    let clock = MonotonicClock::new();

    let mut conn = Connection::new(MacAddress(iface.local_mac_address()));
    match selector_arg.as_deref() {
        Some("-A") => conn.print_ac_names = true,
        Some(service) => conn.service = ServiceSelector::Named(service.as_bytes().to_vec()),
        None => {}
    }

    let mut link = NullPppLink;
    let outcome = if conn.print_ac_names {
        let mut probe = StdoutProbeReporter::new();
        DiscoveryEngine::new(&mut conn, &mut link, &mut probe).run(&mut iface, &clock)
    } else {
        let mut probe = NoOpProbeReporter;
        DiscoveryEngine::new(&mut conn, &mut link, &mut probe).run(&mut iface, &clock)
    };

    match outcome {
        Ok(DiscoveryOutcome::Session) => {
            let session = conn.session().expect("terminal state carries a session");
            info!(
                "Discovery complete: session {:#06x} with {}",
                session.session_id, session.peer_mac
            );
            ExitCode::SUCCESS
        }
        Ok(DiscoveryOutcome::ProbeDone { offers }) => {
            if offers > 0 {
                ExitCode::SUCCESS
            } else {
                error!("No access concentrators answered");
                ExitCode::FAILURE
            }
        }
        Ok(DiscoveryOutcome::SessionKilled) => ExitCode::SUCCESS,
        Ok(DiscoveryOutcome::Timeout { phase }) => {
            error!("Discovery timed out ({:?} phase)", phase);
            ExitCode::FAILURE
        }
        Ok(DiscoveryOutcome::Fatal { reason }) => {
            error!("Access concentrator error: {}", reason);
            ExitCode::FAILURE
        }
        Err(e) => {
            error!("Discovery failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
