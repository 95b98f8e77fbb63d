//! Byte-at-a-time frame acceptance state machine.
//!
//! The [`Decoder`] is fed every byte the receiving UART delivers, from the
//! receive interrupt, and reports a [`Command`] the moment a complete, valid
//! frame `HEAD SIGN CMD CHECK` has been seen. It keeps no buffer beyond the
//! pending command, does bounded work per byte, and never times out.
//!
//! ## Transitions
//!
//! | State          | Byte                 | Next state      |
//! |----------------|----------------------|-----------------|
//! | any            | `HEAD`               | `GotHead`       |
//! | `GotHead`      | `SIGN`               | `GotSign`       |
//! | `GotSign`      | command code         | `GotCmd(cmd)`   |
//! | `GotCmd(cmd)`  | check code           | `Empty` (emit `cmd` if the check matches) |
//! | any            | outside the alphabet | `Empty`         |
//! | any            | other alphabet byte  | `Empty`         |
//!
//! A `HEAD` always starts a fresh candidate, so a frame is recognized no
//! matter what partial junk precedes it, and only when its four bytes arrive
//! back to back. Only bytes outside the alphabet (the sync byte included)
//! count as channel noise.

use crate::command::{Command, Symbol};
use crate::fmt::{debug, trace};

/// How much of a frame has been matched since the last reset.
#[derive(PartialEq, Eq, Clone, Copy, Default, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum DecoderState {
    /// Waiting for `HEAD`.
    #[default]
    Empty,
    /// `HEAD` seen, waiting for `SIGN`.
    GotHead,
    /// `HEAD SIGN` seen, waiting for a command code.
    GotSign,
    /// `HEAD SIGN CMD` seen, waiting for the check byte of `CMD`.
    GotCmd(Command),
}

/// Counters describing what the decoder has seen.
///
/// All counters wrap on overflow; they are diagnostics only.
#[derive(PartialEq, Eq, Clone, Copy, Default, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct DecoderStats {
    /// Frames that passed the check byte.
    pub rx_good: u16,
    /// Complete frames whose check byte did not match the command.
    pub rx_bad: u16,
    /// Bytes outside the alphabet, each of which reset the decoder.
    pub noise: u16,
}

/// The receiver's frame decoder.
///
/// Owned exclusively by the receive interrupt context.
#[derive(Default, Debug)]
pub struct Decoder {
    state: DecoderState,
    stats: DecoderStats,
}

impl Decoder {
    /// Creates a decoder in the [`DecoderState::Empty`] state.
    pub const fn new() -> Self {
        Self {
            state: DecoderState::Empty,
            stats: DecoderStats {
                rx_good: 0,
                rx_bad: 0,
                noise: 0,
            },
        }
    }

    /// Current acceptance state.
    pub fn state(&self) -> DecoderState {
        self.state
    }

    /// Counters accumulated since creation.
    pub fn stats(&self) -> DecoderStats {
        self.stats
    }

    /// Drops any partially matched frame.
    pub fn reset(&mut self) {
        self.state = DecoderState::Empty;
    }

    /// Treats the current byte slot as unreadable channel noise.
    ///
    /// Used when the UART reports a framing, parity or overrun error instead
    /// of a byte.
    pub fn noise(&mut self) {
        self.stats.noise = self.stats.noise.wrapping_add(1);
        self.reset();
    }

    /// Advances the state machine by one received byte.
    ///
    /// # Returns
    /// - `Some(cmd)`: `byte` completed a valid frame carrying `cmd`
    /// - `None`: no frame was completed, or the completed frame failed its check
    pub fn feed(&mut self, byte: u8) -> Option<Command> {
        let symbol = Symbol::classify(byte);
        match (self.state, symbol) {
            (_, Symbol::Noise) => {
                self.noise();
                None
            }
            (_, Symbol::Head) => {
                self.state = DecoderState::GotHead;
                None
            }
            (DecoderState::GotHead, Symbol::Sign) => {
                self.state = DecoderState::GotSign;
                None
            }
            (DecoderState::GotSign, Symbol::Command(cmd)) => {
                self.state = DecoderState::GotCmd(cmd);
                None
            }
            (DecoderState::GotCmd(cmd), Symbol::Check(_)) => {
                self.state = DecoderState::Empty;
                if cmd.check() == byte {
                    self.stats.rx_good = self.stats.rx_good.wrapping_add(1);
                    debug!("frame accepted: {:?}", cmd);
                    Some(cmd)
                } else {
                    self.stats.rx_bad = self.stats.rx_bad.wrapping_add(1);
                    debug!("check mismatch for {:?}: {:?}", cmd, byte);
                    None
                }
            }
            (DecoderState::Empty, _) => None,
            (state, _) => {
                trace!("out of order byte {:?} in {:?}", byte, state);
                self.reset();
                None
            }
        }
    }
}
