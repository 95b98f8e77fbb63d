//! Transmitter side of the link: radio power gating, keypad, burst output.
//!
//! [`Transmitter`] owns the serial port that feeds the radio module. Every
//! call to [`send_command`](Transmitter::send_command) powers the module up,
//! waits for it to settle, writes the 13-byte burst one byte at a time
//! (each write blocks until the byte has fully left the shift register),
//! then powers the module down again.
//!
//! Because the transmitter holds the port by value and `send_command` takes
//! `&mut self`, a burst can never be interleaved with another transmission.
//!
//! ## Example
//!
//! ```rust
//! # use core::convert::Infallible;
//! # use embedded_hal_mock::eh1::delay::NoopDelay;
//! # use embedded_hal_mock::eh1::digital::Mock as Pin;
//! # struct Uart;
//! # impl embedded_hal_nb::serial::ErrorType for Uart { type Error = Infallible; }
//! # impl embedded_hal_nb::serial::Write<u8> for Uart {
//! #     fn write(&mut self, _: u8) -> nb::Result<(), Infallible> { Ok(()) }
//! #     fn flush(&mut self) -> nb::Result<(), Infallible> { Ok(()) }
//! # }
//! use rfswitch::command::Command;
//! use rfswitch::transmitter::{Transmitter, TxConfig};
//!
//! let mut tx: Transmitter<Uart, Pin, NoopDelay> =
//!     Transmitter::new(Uart, None, NoopDelay::new(), TxConfig::default());
//! tx.send_command(Command::SpeedInc).unwrap();
//! assert_eq!(tx.tx_good, 1);
//! ```

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal_nb::serial::Write;
use heapless::Vec;
use nb::block;

use crate::command::Command;
use crate::consts::{BURST_LEN, TX_WARMUP_MS};
use crate::encoding::burst;
use crate::error::Error;
use crate::fmt::{debug, warning};

/// Transmitter settings.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct TxConfig {
    /// Time to let the radio module settle after power-up, in milliseconds.
    pub warmup_ms: u32,
    /// Whether the power-enable pin is active low (on = LOW, off = HIGH).
    pub power_inverted: bool,
}

impl Default for TxConfig {
    fn default() -> Self {
        Self {
            warmup_ms: TX_WARMUP_MS,
            power_inverted: false,
        }
    }
}

/// Sends commands over a serial radio link.
///
/// ## Type Parameters
///
/// - `S`: serial port, [`embedded_hal_nb::serial::Write`]
/// - `PWR`: optional radio power-enable pin, [`OutputPin`]
/// - `D`: delay provider for the warm-up wait, [`DelayNs`]
#[derive(Debug)]
pub struct Transmitter<S, PWR, D>
where
    S: Write<u8>,
    PWR: OutputPin,
    D: DelayNs,
{
    serial: S,
    power: Option<PWR>,
    delay: D,
    config: TxConfig,
    tx_buf: Vec<u8, BURST_LEN>,

    /// Counter of bursts sent in full.
    pub tx_good: u16,
}

impl<S, PWR, D> Transmitter<S, PWR, D>
where
    S: Write<u8>,
    PWR: OutputPin,
    D: DelayNs,
{
    /// Creates a transmitter and drives the power pin to "off".
    ///
    /// # Arguments
    /// - `serial`: The serial port wired to the radio module's data input.
    /// - `power`: The optional pin switching the radio module's supply.
    /// - `delay`: Delay provider used for the warm-up wait.
    /// - `config`: Warm-up time and power pin polarity.
    pub fn new(serial: S, power: Option<PWR>, delay: D, config: TxConfig) -> Self {
        let mut tx = Self {
            serial,
            power,
            delay,
            config,
            tx_buf: Vec::new(),
            tx_good: 0,
        };
        let _ = tx.write_power(false); // Ensure idle
        tx
    }

    fn write_power(&mut self, on: bool) -> Result<(), PWR::Error> {
        let high = if self.config.power_inverted { !on } else { on };
        if let Some(ref mut pin) = self.power {
            if high {
                pin.set_high()?;
            } else {
                pin.set_low()?;
            }
        }
        Ok(())
    }

    /// Sends one command as a redundant burst.
    ///
    /// Blocks until the last byte has been shifted out. The radio module is
    /// powered down again even when the serial port fails mid-burst.
    pub fn send_command(&mut self, cmd: Command) -> Result<(), Error<S::Error, PWR::Error>> {
        self.tx_buf.clear();
        // Capacity is exactly one burst.
        self.tx_buf.extend(burst(cmd));

        self.write_power(true).map_err(Error::Pin)?;
        if self.power.is_some() {
            self.delay.delay_ms(self.config.warmup_ms);
        }

        let sent = emit(&mut self.serial, &self.tx_buf);
        self.write_power(false).map_err(Error::Pin)?;
        if let Err(e) = sent {
            warning!("burst for {:?} aborted", cmd);
            return Err(Error::Serial(e));
        }

        self.tx_good = self.tx_good.wrapping_add(1);
        debug!("sent {:?}", cmd);
        Ok(())
    }

    /// The bytes of the most recent burst.
    pub fn last_burst(&self) -> &[u8] {
        &self.tx_buf
    }

    /// Releases the serial port, power pin and delay provider.
    pub fn release(self) -> (S, Option<PWR>, D) {
        (self.serial, self.power, self.delay)
    }
}

fn emit<S: Write<u8>>(serial: &mut S, bytes: &[u8]) -> Result<(), S::Error> {
    for &b in bytes {
        // Wait for the data register, then for the byte to leave the wire.
        block!(serial.write(b))?;
        block!(serial.flush())?;
    }
    Ok(())
}

/// Three active-low push buttons: power, speed up, speed down.
#[derive(Debug)]
pub struct Keypad<B: InputPin> {
    power: B,
    inc: B,
    dec: B,
}

impl<B: InputPin> Keypad<B> {
    /// Creates a keypad from its three button inputs.
    pub fn new(power: B, inc: B, dec: B) -> Self {
        Self { power, inc, dec }
    }

    /// Returns the command of the first held button, checking power, then
    /// speed up, then speed down.
    pub fn pressed(&mut self) -> Result<Option<Command>, B::Error> {
        if self.power.is_low()? {
            return Ok(Some(Command::PowerToggle));
        }
        if self.inc.is_low()? {
            return Ok(Some(Command::SpeedInc));
        }
        if self.dec.is_low()? {
            return Ok(Some(Command::SpeedDec));
        }
        Ok(None)
    }

    /// Releases the button pins as `(power, inc, dec)`.
    pub fn release(self) -> (B, B, B) {
        (self.power, self.inc, self.dec)
    }
}

/// A handheld remote: a [`Keypad`] driving a [`Transmitter`].
#[derive(Debug)]
pub struct Remote<S, PWR, D, B>
where
    S: Write<u8>,
    PWR: OutputPin,
    D: DelayNs,
    B: InputPin<Error = PWR::Error>,
{
    /// The radio side.
    pub transmitter: Transmitter<S, PWR, D>,
    /// The button side.
    pub keypad: Keypad<B>,
}

impl<S, PWR, D, B> Remote<S, PWR, D, B>
where
    S: Write<u8>,
    PWR: OutputPin,
    D: DelayNs,
    B: InputPin<Error = PWR::Error>,
{
    /// Pairs a transmitter with a keypad.
    pub fn new(transmitter: Transmitter<S, PWR, D>, keypad: Keypad<B>) -> Self {
        Self {
            transmitter,
            keypad,
        }
    }

    /// Scans the keypad once and sends one burst for the held button.
    ///
    /// Call repeatedly (e.g. from the button interrupt, while the button
    /// stays held) to auto-repeat.
    ///
    /// # Returns
    /// The command sent, or `None` when no button is held.
    pub fn service(&mut self) -> Result<Option<Command>, Error<S::Error, PWR::Error>> {
        let Some(cmd) = self.keypad.pressed().map_err(Error::Pin)? else {
            return Ok(None);
        };
        self.transmitter.send_command(cmd)?;
        Ok(Some(cmd))
    }
}
