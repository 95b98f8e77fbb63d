//! Constants used across the remote-control link.
//!
//! Both ends of the link must agree on every value in this module: the
//! transmitter builds frames out of them and the receiver's decoder treats
//! any byte outside this alphabet as channel noise.
//!
//! ## Key Concepts
//!
//! - **Frame**: `[HEAD, SIGN, CMD, CHECK]`, four bytes, fixed positions.
//! - **Sync byte**: sent outside frames to help the receiving UART realign
//!   after idle. It is deliberately outside the decoder alphabet.
//! - **Burst**: one lone sync byte, two header repetitions each closed by a
//!   sync byte, then the complete frame.
//! - **Persisted state**: two bytes in the non-volatile store.

/// Frame start marker.
pub const PACKET_HEAD: u8 = 0xaa;

/// Second sync byte, confirms the protocol identity.
pub const PACKET_SIGN: u8 = 0x2e;

/// Resynchronization byte sent between header repetitions.
pub const SYNC_BYTE: u8 = 0xff;

/// Length (in bytes) of one complete frame.
pub const FRAME_LEN: usize = 4;

/// Number of partial `HEAD SIGN CMD SYNC` repetitions sent before the full frame.
pub const HEADER_REPEATS: usize = 2;

/// Total number of bytes emitted for one command.
///
/// One lone sync byte, [`HEADER_REPEATS`] four-byte partial copies, then the frame.
pub const BURST_LEN: usize = 1 + HEADER_REPEATS * FRAME_LEN + FRAME_LEN;

/// Line rate of the radio link, 8 data bits, no parity, 1 stop bit.
pub const BAUD_RATE: u32 = 2_400;

/// Bits on the wire per byte with 8N1 framing (start + 8 data + stop).
pub const BITS_PER_FRAME_BYTE: u32 = 10;

/// Slots in the receiver's command queue. Usable capacity is one less.
pub const RX_QUEUE_LEN: usize = 2;

/// Highest speed level.
pub const SPEED_MAX: u8 = 9;

/// Lowest speed level.
pub const SPEED_MIN: u8 = 0;

/// Non-volatile address of the power flag.
pub const POWER_ADDR: u16 = 0;

/// Non-volatile address of the speed level.
pub const SPEED_ADDR: u16 = 1;

/// Radio module settling time after power-up, in milliseconds.
pub const TX_WARMUP_MS: u32 = 50;
