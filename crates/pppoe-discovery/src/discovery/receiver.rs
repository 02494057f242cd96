// crates/pppoe-discovery/src/discovery/receiver.rs

use crate::hal::{Clock, PacketInterface, PppoeError};
use core::time::Duration;

/// Receives one raw frame before `deadline`, or reports timeout as `None`.
///
/// The remaining budget is recomputed from the wall clock on every iteration,
/// so wake-ups that yield nothing (HAL read timeouts, signal interruption)
/// never consume more of the budget than the time they actually took. Other
/// I/O failures are unrecoverable and propagate to the caller.
pub fn recv_frame<I: PacketInterface, C: Clock + ?Sized>(
    iface: &mut I,
    clock: &C,
    deadline: Duration,
    buffer: &mut [u8],
) -> Result<Option<usize>, PppoeError> {
    loop {
        if clock.now() >= deadline {
            return Ok(None);
        }
        match iface.receive_frame(buffer) {
            // Read timeout inside the HAL; re-check our own deadline.
            Ok(0) => continue,
            Ok(len) => return Ok(Some(len)),
            // A signal broke the wait; restart it with the remaining budget.
            Err(PppoeError::Interrupted) => continue,
            Err(e) => return Err(e),
        }
    }
}
