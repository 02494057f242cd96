// crates/pppoe-discovery-linux/src/lib.rs
#![cfg(target_os = "linux")]

use pnet::datalink::{self, Channel, NetworkInterface as PnetInterface};
use pppoe_discovery::{Clock, PacketInterface, PppoeError};
use std::io;
use std::sync::Mutex;
use std::time::{Duration, Instant};

pub struct LinuxPnetInterface {
    tx: Mutex<Box<dyn datalink::DataLinkSender>>,
    rx: Mutex<Box<dyn datalink::DataLinkReceiver>>,
    mac_address: [u8; 6],
}

impl LinuxPnetInterface {
    pub fn new(interface_name: &str) -> Result<Self, String> {
        let interface = datalink::interfaces()
            .into_iter()
            .find(|iface: &PnetInterface| iface.name == interface_name)
            .ok_or_else(|| format!("Interface '{}' not found", interface_name))?;

        let mac_address = interface.mac.ok_or("Interface has no MAC address")?.into();

        // Configure the channel to be promiscuous and have a short read
        // timeout: the discovery engine polls against its own deadline.
        let config = datalink::Config {
            read_timeout: Some(Duration::from_millis(100)),
            promiscuous: true,
            ..Default::default()
        };

        let (tx, rx) = match datalink::channel(&interface, config) {
            Ok(Channel::Ethernet(tx, rx)) => (tx, rx),
            Ok(_) => return Err("Unsupported channel type".to_string()),
            Err(e) => return Err(e.to_string()),
        };

        Ok(Self {
            tx: Mutex::new(tx),
            rx: Mutex::new(rx),
            mac_address,
        })
    }
}

impl PacketInterface for LinuxPnetInterface {
    fn send_frame(&mut self, frame: &[u8]) -> Result<(), PppoeError> {
        self.tx
            .lock()
            .unwrap()
            .send_to(frame, None)
            .ok_or(PppoeError::IoError)? // For channel closed
            .map_err(|_| PppoeError::IoError)?; // For OS error
        Ok(())
    }

    fn receive_frame(&mut self, buffer: &mut [u8]) -> Result<usize, PppoeError> {
        let mut rx_guard = self.rx.lock().unwrap();

        match rx_guard.next() {
            Ok(frame) => {
                let len = frame.len();
                if buffer.len() >= len {
                    buffer[..len].copy_from_slice(frame);
                    Ok(len)
                } else {
                    Err(PppoeError::BufferTooShort)
                }
            }
            Err(e) => match e.kind() {
                io::ErrorKind::TimedOut => Ok(0),
                // A signal broke the wait; the engine retries with its
                // remaining deadline budget.
                io::ErrorKind::Interrupted => Err(PppoeError::Interrupted),
                _ => Err(PppoeError::IoError),
            },
        }
    }

    fn local_mac_address(&self) -> [u8; 6] {
        self.mac_address
    }
}

/// Monotonic clock backed by `std::time::Instant`.
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}
