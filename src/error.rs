//! Errors surfaced by the link's collaborators.
//!
//! The protocol core itself never fails: sync loss, check mismatches and a
//! saturated command queue all degrade to "ignore and continue". What can
//! fail is the hardware around it, the serial port, a GPIO pin, or the
//! non-volatile store, and those failures are reported here.

use thiserror::Error;

/// Failure while driving the transmitter hardware.
///
/// - `S`: the serial port error type
/// - `P`: the GPIO pin error type (power-enable pin or keypad inputs)
#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum Error<S, P> {
    /// The serial port rejected a byte or failed to flush.
    #[error("serial transmit failed: {0:?}")]
    Serial(S),
    /// A GPIO pin could not be read or driven.
    #[error("pin access failed: {0:?}")]
    Pin(P),
}

/// Failure reading or writing the non-volatile store.
#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
#[error("non-volatile store access failed at address {addr}: {inner:?}")]
pub struct StorageError<E> {
    /// Address that was being accessed.
    pub addr: u16,
    /// Error reported by the store.
    pub inner: E,
}

/// A byte that is not one of the command codes.
#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
#[error("unknown command code {0:#04x}")]
pub struct UnknownCommand(pub u8);
