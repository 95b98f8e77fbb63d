//! Receive-interrupt side of the link.
//!
//! A [`Receiver`] bundles everything the byte-received interrupt owns: the
//! serial port it reads from, the frame [`Decoder`], and the [`Producer`]
//! half of the command queue. The main loop owns the matching
//! [`Consumer`](crate::queue::Consumer) and nothing else is shared.
//!
//! ## Example
//!
//! ```rust
//! # use core::convert::Infallible;
//! # struct Uart(Option<u8>);
//! # impl embedded_hal_nb::serial::ErrorType for Uart { type Error = Infallible; }
//! # impl embedded_hal_nb::serial::Read<u8> for Uart {
//! #     fn read(&mut self) -> nb::Result<u8, Infallible> { self.0.take().ok_or(nb::Error::WouldBlock) }
//! # }
//! use rfswitch::queue::CommandQueue;
//! use rfswitch::receiver::Receiver;
//!
//! static QUEUE: CommandQueue<2> = CommandQueue::new();
//!
//! let (producer, mut consumer) = QUEUE.split().unwrap();
//! let mut rx = Receiver::new(Uart(None), producer);
//!
//! // In the USART RX interrupt:
//! let _ = rx.on_interrupt();
//!
//! // In the main loop:
//! while let Some(cmd) = consumer.pop() {
//!     # let _ = cmd;
//! }
//! ```

use embedded_hal_nb::serial::Read;

use crate::command::Command;
use crate::decoder::{Decoder, DecoderStats};
use crate::fmt::{trace, warning};
use crate::queue::Producer;

/// The receiver's interrupt-owned state.
///
/// ## Type Parameters
///
/// - `S`: serial port, [`embedded_hal_nb::serial::Read`]
/// - `N`: command queue slots
#[derive(Debug)]
pub struct Receiver<'a, S, const N: usize>
where
    S: Read<u8>,
{
    serial: S,
    decoder: Decoder,
    producer: Producer<'a, N>,

    /// Counter of valid commands dropped because the queue was full.
    pub dropped: u16,
    /// Counter of receive errors reported by the serial port.
    pub line_errors: u16,
}

impl<'a, S, const N: usize> Receiver<'a, S, N>
where
    S: Read<u8>,
{
    /// Creates a receiver with an empty decoder.
    ///
    /// # Arguments
    /// - `serial`: The serial port wired to the radio module's data output.
    /// - `producer`: The write half of the command queue.
    pub fn new(serial: S, producer: Producer<'a, N>) -> Self {
        Self {
            serial,
            decoder: Decoder::new(),
            producer,
            dropped: 0,
            line_errors: 0,
        }
    }

    /// Services one byte-received interrupt.
    ///
    /// Reads at most one byte from the serial port and feeds it to the
    /// decoder. A receive error (framing, parity, overrun, noise) counts as
    /// a noise byte and drops any partially matched frame.
    ///
    /// # Returns
    /// The command queued by this byte, if it completed a valid frame.
    pub fn on_interrupt(&mut self) -> Option<Command> {
        match self.serial.read() {
            Ok(byte) => self.handle_byte(byte),
            Err(nb::Error::WouldBlock) => None,
            Err(nb::Error::Other(_)) => {
                self.line_errors = self.line_errors.wrapping_add(1);
                trace!("serial receive error, decoder reset");
                self.decoder.noise();
                None
            }
        }
    }

    /// Feeds one already-read byte to the decoder.
    ///
    /// # Returns
    /// The command queued by this byte, if it completed a valid frame and
    /// the queue had room for it.
    pub fn handle_byte(&mut self, byte: u8) -> Option<Command> {
        let cmd = self.decoder.feed(byte)?;
        if self.producer.push(cmd) {
            Some(cmd)
        } else {
            self.dropped = self.dropped.wrapping_add(1);
            warning!("command queue full, dropped {:?}", cmd);
            None
        }
    }

    /// The frame decoder.
    pub fn decoder(&self) -> &Decoder {
        &self.decoder
    }

    /// Decoder counters.
    pub fn stats(&self) -> DecoderStats {
        self.decoder.stats()
    }

    /// Releases the serial port and the queue producer.
    pub fn release(self) -> (S, Producer<'a, N>) {
        (self.serial, self.producer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{PACKET_HEAD as HEAD, PACKET_SIGN as SIGN};
    use crate::decoder::DecoderState;
    use crate::encoding::burst;
    use crate::queue::CommandQueue;
    use embedded_hal_nb::serial::{ErrorKind, ErrorType};
    use std::collections::VecDeque;

    #[derive(Debug, PartialEq, Clone, Copy)]
    enum Line {
        Byte(u8),
        Framing,
    }

    #[derive(Debug, Default)]
    struct Uart {
        incoming: VecDeque<Line>,
    }

    impl Uart {
        fn with_bytes(bytes: &[u8]) -> Self {
            Self {
                incoming: bytes.iter().map(|&b| Line::Byte(b)).collect(),
            }
        }
    }

    #[derive(Debug, PartialEq, Clone, Copy)]
    struct FramingError;

    impl embedded_hal_nb::serial::Error for FramingError {
        fn kind(&self) -> ErrorKind {
            ErrorKind::FrameFormat
        }
    }

    impl ErrorType for Uart {
        type Error = FramingError;
    }

    impl Read<u8> for Uart {
        fn read(&mut self) -> nb::Result<u8, FramingError> {
            match self.incoming.pop_front() {
                Some(Line::Byte(b)) => Ok(b),
                Some(Line::Framing) => Err(nb::Error::Other(FramingError)),
                None => Err(nb::Error::WouldBlock),
            }
        }
    }

    fn drain<S: Read<u8>, const N: usize>(rx: &mut Receiver<'_, S, N>, count: usize) -> Vec<Command> {
        (0..count).filter_map(|_| rx.on_interrupt()).collect()
    }

    #[test]
    fn test_receiver_queues_burst() {
        let queue: CommandQueue<4> = CommandQueue::new();
        let (producer, mut consumer) = queue.split().unwrap();
        let bytes = burst(Command::SpeedInc);
        let mut rx = Receiver::new(Uart::with_bytes(&bytes), producer);

        assert_eq!(drain(&mut rx, bytes.len()), [Command::SpeedInc]);
        assert_eq!(consumer.pop(), Some(Command::SpeedInc));
        assert_eq!(consumer.pop(), None);
        assert_eq!(rx.stats().rx_good, 1);
    }

    #[test]
    fn test_idle_interrupt_is_harmless() {
        let queue: CommandQueue<2> = CommandQueue::new();
        let (producer, _consumer) = queue.split().unwrap();
        let mut rx = Receiver::new(Uart::default(), producer);
        assert_eq!(rx.on_interrupt(), None);
        assert_eq!(rx.decoder().state(), DecoderState::Empty);
        assert_eq!(rx.line_errors, 0);
    }

    #[test]
    fn test_framing_error_resets_decoder() {
        let queue: CommandQueue<2> = CommandQueue::new();
        let (producer, mut consumer) = queue.split().unwrap();
        let uart = Uart {
            incoming: [
                Line::Byte(HEAD),
                Line::Byte(SIGN),
                Line::Byte(0x01),
                Line::Framing,
                Line::Byte(0xdf),
            ]
            .into_iter()
            .collect(),
        };
        let mut rx = Receiver::new(uart, producer);
        assert!(drain(&mut rx, 5).is_empty());
        assert_eq!(rx.line_errors, 1);
        assert_eq!(rx.stats().noise, 1);
        assert_eq!(consumer.pop(), None);
    }

    #[test]
    fn test_full_queue_counts_dropped_commands() {
        let queue: CommandQueue<2> = CommandQueue::new();
        let (producer, mut consumer) = queue.split().unwrap();
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&burst(Command::PowerToggle));
        bytes.extend_from_slice(&burst(Command::SpeedDec));
        let mut rx = Receiver::new(Uart::with_bytes(&bytes), producer);

        assert_eq!(drain(&mut rx, bytes.len()), [Command::PowerToggle]);
        assert_eq!(rx.dropped, 1);
        assert_eq!(rx.stats().rx_good, 2);
        assert_eq!(consumer.pop(), Some(Command::PowerToggle));
        assert_eq!(consumer.pop(), None);
    }

    #[test]
    fn test_handle_byte_without_serial_read() {
        let queue: CommandQueue<4> = CommandQueue::new();
        let (producer, mut consumer) = queue.split().unwrap();
        let mut rx = Receiver::new(Uart::default(), producer);
        for b in [HEAD, SIGN, 0x03, 0x63] {
            let _ = rx.handle_byte(b);
        }
        assert_eq!(consumer.pop(), Some(Command::SpeedDec));
        let (uart, _) = rx.release();
        assert!(uart.incoming.is_empty());
    }
}
