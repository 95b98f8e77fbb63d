//! Frame construction and the redundant transmit burst.
//!
//! A command goes on air as a 13-byte burst:
//!
//! ```text
//! SYNC  HEAD SIGN CMD SYNC  HEAD SIGN CMD SYNC  HEAD SIGN CMD CHECK
//! ```
//!
//! ## Purpose
//!
//! The link has no acknowledgement and the check byte is only a per-command
//! tag, so redundancy is the only defence against a corrupted byte:
//!
//! - the lone leading sync byte lets the receiving UART realign after idle
//! - each partial `HEAD SIGN CMD` copy is closed by a sync byte, which the
//!   receiver treats as noise, so it can never complete a frame
//! - only the final, complete frame carries the check byte and can trigger a
//!   state change
//!
//! A byte lost in either of the partial copies therefore costs nothing: the
//! decoder starts over at every `HEAD`.
//!
//! ## Functions
//!
//! - [`Frame::new`]: builds the four-byte frame for a command
//! - [`encode_burst`]: writes the full burst into a caller buffer
//! - [`burst`]: returns the burst as a fixed-size array

use crate::command::Command;
use crate::consts::{BURST_LEN, FRAME_LEN, HEADER_REPEATS, PACKET_HEAD, PACKET_SIGN, SYNC_BYTE};

/// One `HEAD SIGN CMD CHECK` frame.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct Frame([u8; FRAME_LEN]);

impl Frame {
    /// Builds the frame carrying `cmd`.
    pub const fn new(cmd: Command) -> Self {
        Frame([PACKET_HEAD, PACKET_SIGN, cmd.code(), cmd.check()])
    }

    /// The frame bytes, in transmit order.
    pub const fn as_bytes(&self) -> &[u8; FRAME_LEN] {
        &self.0
    }

    /// The `HEAD SIGN CMD` prefix repeated ahead of the full frame.
    pub fn header(&self) -> &[u8] {
        &self.0[..FRAME_LEN - 1]
    }
}

impl From<Command> for Frame {
    fn from(cmd: Command) -> Self {
        Frame::new(cmd)
    }
}

/// Writes the transmit burst for `cmd` into `output`.
///
/// # Arguments
/// - `cmd`: The command to encode
/// - `output`: The output buffer, at least [`BURST_LEN`] bytes long
///
/// # Returns
/// The number of bytes written, or `None` if `output` is too short.
pub fn encode_burst(cmd: Command, output: &mut [u8]) -> Option<usize> {
    if output.len() < BURST_LEN {
        return None;
    }
    let frame = Frame::new(cmd);
    let mut i = 0;
    output[i] = SYNC_BYTE;
    i += 1;
    for _ in 0..HEADER_REPEATS {
        let header = frame.header();
        output[i..i + header.len()].copy_from_slice(header);
        i += header.len();
        output[i] = SYNC_BYTE;
        i += 1;
    }
    output[i..i + FRAME_LEN].copy_from_slice(frame.as_bytes());
    i += FRAME_LEN;
    Some(i)
}

/// Returns the transmit burst for `cmd`.
pub fn burst(cmd: Command) -> [u8; BURST_LEN] {
    let mut out = [0u8; BURST_LEN];
    let _ = encode_burst(cmd, &mut out);
    out
}
