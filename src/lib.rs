//! # rfswitch
//!
//! A portable, no_std Rust implementation of a one-way radio remote control for a
//! two-state, ten-speed appliance (a fan, a pump, a dimmer), built for cheap
//! serial radio modules driven by a hardware USART at 2400 baud.
//!
//! The crate covers both firmwares:
//! - the **transmitter** turns a button press into a redundant 13-byte burst
//! - the **receiver** decodes bytes one at a time in the RX interrupt, validates
//!   each frame, and hands commands to the main loop through a lock-free queue
//! - the **control loop** applies commands to the appliance state and writes it
//!   back to non-volatile storage
//!
//! ## Crate features
//! | Feature          | Description |
//! |------------------|-------------|
//! | `std`            | Disables `#![no_std]` support |
//! | `isr` (default)  | Global `critical_section` receiver slot and the `rf_receiver_isr!` family of macros |
//! | `delay-loop`     | Blocking main loop driven by `embedded_hal::delay::DelayNs` |
//! | `defmt-0-3`      | Uses `defmt` logging |
//! | `log`            | Uses `log` logging |
//!
//! ## Protocol
//!
//! - Frame: `HEAD SIGN CMD CHECK` (`0xAA 0x2E cmd check(cmd)`)
//! - Commands: power toggle, speed up, speed down, each with a fixed check tag
//! - Burst: `SYNC [HEAD SIGN CMD SYNC] x2 HEAD SIGN CMD CHECK`, `SYNC = 0xFF`
//! - No acknowledgement, no retransmission: the redundancy is the only defence
//!
//! ## Usage
//!
//! Receiver:
//!
//! ```rust,ignore
//! rfswitch::init_rf_receiver!(Usart0);
//!
//! #[avr_device::interrupt(atmega8)]
//! fn USART_RXC() {
//!     let _ = rfswitch::rf_receiver_isr!();
//! }
//!
//! fn main() -> ! {
//!     let consumer = rfswitch::setup_rf_receiver!(usart0).unwrap();
//!     let control = ControlLoop::new(consumer, eeprom).unwrap();
//!     rfswitch::timing::run_control_loop(control, &mut delay, 1_000);
//! }
//! ```
//!
//! Transmitter:
//!
//! ```rust,ignore
//! let tx = Transmitter::new(usart0, Some(radio_gnd), delay, TxConfig::default());
//! let mut remote = Remote::new(tx, Keypad::new(sw_pwr, sw_inc, sw_dec));
//! while remote.service()?.is_some() {}
//! ```
//!
//! ## Integration Notes
//!
//! - The decoder never times out a partial frame; it converges on the next `HEAD`
//! - Only one receiver should be installed per queue; the queue splits once
//! - Valid commands arriving while the queue is full are dropped, never overwrite
//!
//! --
//! Designed for `#![no_std]` use in resource-constrained embedded environments.

#![deny(
    bad_style,
    dead_code,
    improper_ctypes,
    non_shorthand_field_patterns,
    no_mangle_generic_items,
    overflowing_literals,
    path_statements,
    patterns_in_fns_without_body,
    unconditional_recursion,
    unused,
    while_true,
    missing_debug_implementations,
    missing_docs,
    trivial_casts,
    trivial_numeric_casts,
    unused_extern_crates,
    unused_import_braces,
    unused_qualifications,
    unused_results
)]
#![cfg_attr(not(any(feature = "std", test)), no_std)]

pub use critical_section;

pub(crate) mod fmt;

pub mod command;
pub mod consts;
pub mod control;
pub mod decoder;
pub mod encoding;
pub mod error;
pub mod queue;
pub mod receiver;
pub mod timing;
pub mod transmitter;

pub use command::Command;
pub use control::{ApplianceState, ControlLoop, Storage};
pub use decoder::Decoder;
pub use error::{Error, StorageError, UnknownCommand};
pub use queue::{CommandQueue, Consumer, Producer};
pub use receiver::Receiver;
pub use transmitter::{Keypad, Remote, Transmitter, TxConfig};
