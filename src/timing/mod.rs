//! Baud-rate arithmetic and run-loop utilities for the link.
//!
//! Both firmwares drive a hardware USART at
//! [`BAUD_RATE`](crate::consts::BAUD_RATE). This module holds
//! the divisor arithmetic for AVR-style USARTs plus the helpers that drive the
//! receiver from an interrupt (`isr` feature) or a blocking loop
//! (`delay-loop` feature):
//! - `compute_ubrr_value`: runtime divisor calculator (rounded)
//! - `const_ubrr_value`: compile-time divisor calculator (truncated)
//! - `global_receiver_isr` and `rf_receiver_isr!()`: interrupt wrapper around
//!   the receiver (feature `isr`)
//! - `run_control_loop`: blocking main loop (feature `delay-loop`)
//!
//! Common 2400 baud divisors:
//!
//! | F_CPU      | UBRR (rounded) | Actual baud | Error  |
//! |------------|----------------|-------------|--------|
//! |  1 MHz     |             25 |        2404 | +0.16% |
//! |  8 MHz     |            207 |        2404 | +0.16% |
//! | 16 MHz     |            416 |        2398 | -0.08% |

use libm::round;

use crate::consts::{BITS_PER_FRAME_BYTE, BURST_LEN};

#[cfg(feature = "delay-loop")]
mod delay;
#[cfg_attr(feature = "delay-loop", allow(unused_imports))]
#[cfg(feature = "delay-loop")]
pub use delay::*;

#[cfg(feature = "isr")]
mod isr;
#[cfg_attr(feature = "isr", allow(unused_imports))]
#[cfg(feature = "isr")]
pub use isr::*;

#[cfg(feature = "isr")]
mod macros;

/// USART clock divisor in normal (16x oversampling) asynchronous mode.
pub const OVERSAMPLING: u32 = 16;

/// 1,000,000 microseconds = 1 second
pub const MICROSECONDS_PER_SECOND: u32 = 1_000_000;

/// Computes the UBRR value for an AVR USART, rounded to nearest.
///
/// # Arguments
/// - `f_cpu`: CPU frequency in Hz
/// - `baud`: desired line rate in bits per second
///
/// # Returns
/// - UBRR value (`f_cpu / (16 * baud) - 1`), saturating at 0
pub fn compute_ubrr_value(f_cpu: u32, baud: u32) -> u16 {
    let divisor = round(f64::from(f_cpu) / (f64::from(OVERSAMPLING) * f64::from(baud)));
    (divisor as u16).saturating_sub(1)
}

/// Compile-time UBRR value calculator
///
/// Truncates like the `UBRRVAL` preprocessor formula commonly used with avr-libc.
///
/// # Arguments
/// - `f_cpu`: CPU frequency in Hz
/// - `baud`: desired line rate in bits per second
///
/// # Panics
/// If `baud` is 0. In a `const` context this is a compile error.
pub const fn const_ubrr_value(f_cpu: u32, baud: u32) -> u16 {
    (f_cpu / OVERSAMPLING.saturating_mul(baud)).saturating_sub(1) as u16
}

/// The line rate a given UBRR value actually produces.
pub const fn actual_baud(f_cpu: u32, ubrr: u16) -> u32 {
    f_cpu / (OVERSAMPLING * (ubrr as u32 + 1))
}

/// Relative baud error of the rounded divisor, in percent.
pub fn baud_error_percent(f_cpu: u32, baud: u32) -> f32 {
    let ubrr = compute_ubrr_value(f_cpu, baud);
    let actual = f64::from(f_cpu) / (f64::from(OVERSAMPLING) * (f64::from(ubrr) + 1.0));
    ((actual / f64::from(baud) - 1.0) * 100.0) as f32
}

/// On-air time of one 8N1 byte, in microseconds (truncated).
///
/// # Panics
/// If `baud` is 0.
pub const fn byte_time_us(baud: u32) -> u32 {
    BITS_PER_FRAME_BYTE * MICROSECONDS_PER_SECOND / baud
}

/// On-air time of one full command burst, in microseconds.
///
/// # Panics
/// If `baud` is 0.
pub const fn burst_time_us(baud: u32) -> u32 {
    byte_time_us(baud) * BURST_LEN as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::BAUD_RATE;

    #[test]
    fn test_ubrr_for_common_clocks() {
        assert_eq!(compute_ubrr_value(1_000_000, BAUD_RATE), 25);
        assert_eq!(compute_ubrr_value(8_000_000, BAUD_RATE), 207);
        assert_eq!(compute_ubrr_value(16_000_000, BAUD_RATE), 416);
    }

    #[test]
    fn test_const_ubrr_truncates() {
        const UBRR: u16 = const_ubrr_value(16_000_000, BAUD_RATE);
        assert_eq!(UBRR, 415);
        assert_eq!(const_ubrr_value(8_000_000, BAUD_RATE), 207);
        assert_eq!(const_ubrr_value(100, BAUD_RATE), 0);
        assert_eq!(const_ubrr_value(16_000_000, u32::MAX), 0);
    }

    #[test]
    fn test_actual_baud_and_error() {
        assert_eq!(actual_baud(16_000_000, 416), 2398);
        assert_eq!(actual_baud(8_000_000, 207), 2403);
        let err = baud_error_percent(16_000_000, BAUD_RATE);
        assert!(err < 0.0 && err > -0.1, "{err}");
    }

    #[test]
    #[should_panic]
    fn test_const_ubrr_rejects_zero_baud() {
        let _ = const_ubrr_value(16_000_000, 0);
    }

    #[test]
    #[should_panic]
    fn test_byte_time_rejects_zero_baud() {
        let _ = byte_time_us(0);
    }

    #[test]
    fn test_burst_air_time() {
        assert_eq!(byte_time_us(BAUD_RATE), 4166);
        assert_eq!(burst_time_us(BAUD_RATE), 4166 * 13);
    }
}
