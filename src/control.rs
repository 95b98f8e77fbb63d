//! Appliance state and the main-loop command consumer.
//!
//! The appliance has two pieces of state: a power flag and a speed level in
//! `0..=9`. Both are mirrored in a byte-addressable non-volatile store so
//! they survive power loss, one byte each at [`POWER_ADDR`] and
//! [`SPEED_ADDR`].
//!
//! [`ControlLoop`] owns the queue [`Consumer`], the in-memory
//! [`ApplianceState`] and the store. [`poll`](ControlLoop::poll) drains the
//! queue and applies commands in arrival order; [`persist`](ControlLoop::persist)
//! writes back whatever changed since the last write. When to call `persist`
//! is up to the firmware (every loop, on a timer, before sleeping).

use crate::command::Command;
use crate::consts::{POWER_ADDR, SPEED_ADDR, SPEED_MAX, SPEED_MIN};
use crate::error::StorageError;
use crate::fmt::debug;
use crate::queue::Consumer;

/// A byte-addressable non-volatile store, such as AVR EEPROM.
pub trait Storage {
    /// Error reported by the store.
    type Error;

    /// Reads the byte at `addr`, waiting for any write in progress.
    fn read_byte(&mut self, addr: u16) -> Result<u8, Self::Error>;

    /// Writes `byte` at `addr`.
    fn write_byte(&mut self, addr: u16, byte: u8) -> Result<(), Self::Error>;
}

/// Power flag and speed level.
#[derive(PartialEq, Eq, Clone, Copy, Default, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct ApplianceState {
    /// Whether the appliance is on.
    pub power: bool,
    /// Speed level, always within `SPEED_MIN..=SPEED_MAX`.
    speed: u8,
}

impl ApplianceState {
    /// Creates a state, clamping `speed` into range.
    pub fn new(power: bool, speed: u8) -> Self {
        Self {
            power,
            speed: speed.clamp(SPEED_MIN, SPEED_MAX),
        }
    }

    /// Current speed level.
    pub fn speed(&self) -> u8 {
        self.speed
    }

    /// Applies one command.
    ///
    /// Speed changes saturate at the ends of the range instead of wrapping.
    pub fn apply(&mut self, cmd: Command) {
        match cmd {
            Command::PowerToggle => self.power = !self.power,
            Command::SpeedInc => {
                if self.speed < SPEED_MAX {
                    self.speed += 1;
                }
            }
            Command::SpeedDec => {
                if self.speed > SPEED_MIN {
                    self.speed -= 1;
                }
            }
        }
    }

    /// Restores the state from the store.
    ///
    /// Power is bit 0 of its byte. An out-of-range speed byte, such as an
    /// erased `0xff`, is clamped to the maximum.
    pub fn load<E: Storage>(store: &mut E) -> Result<Self, StorageError<E::Error>> {
        let power = read(store, POWER_ADDR)?;
        let speed = read(store, SPEED_ADDR)?;
        Ok(Self::new(power & 0x01 != 0, speed))
    }

    /// Writes both bytes to the store.
    pub fn store<E: Storage>(&self, store: &mut E) -> Result<(), StorageError<E::Error>> {
        write(store, POWER_ADDR, u8::from(self.power))?;
        write(store, SPEED_ADDR, self.speed)
    }
}

fn read<E: Storage>(store: &mut E, addr: u16) -> Result<u8, StorageError<E::Error>> {
    store
        .read_byte(addr)
        .map_err(|inner| StorageError { addr, inner })
}

fn write<E: Storage>(store: &mut E, addr: u16, byte: u8) -> Result<(), StorageError<E::Error>> {
    store
        .write_byte(addr, byte)
        .map_err(|inner| StorageError { addr, inner })
}

/// The receiver's main-loop side.
///
/// ## Type Parameters
///
/// - `E`: non-volatile store, [`Storage`]
/// - `N`: command queue slots
#[derive(Debug)]
pub struct ControlLoop<'a, E, const N: usize>
where
    E: Storage,
{
    consumer: Consumer<'a, N>,
    store: E,
    state: ApplianceState,
    persisted: ApplianceState,
}

impl<'a, E, const N: usize> ControlLoop<'a, E, N>
where
    E: Storage,
{
    /// Creates the control loop, restoring the last persisted state.
    pub fn new(consumer: Consumer<'a, N>, mut store: E) -> Result<Self, StorageError<E::Error>> {
        let state = ApplianceState::load(&mut store)?;
        debug!("restored {:?}", state);
        Ok(Self {
            consumer,
            store,
            state,
            persisted: state,
        })
    }

    /// Current in-memory state.
    pub fn state(&self) -> ApplianceState {
        self.state
    }

    /// Returns `true` if the in-memory state differs from the store.
    pub fn is_dirty(&self) -> bool {
        self.state != self.persisted
    }

    /// Drains the command queue, applying every command in order.
    ///
    /// # Returns
    /// The number of commands applied.
    pub fn poll(&mut self) -> usize {
        let mut applied = 0;
        while let Some(cmd) = self.consumer.pop() {
            self.state.apply(cmd);
            debug!("applied {:?}, now {:?}", cmd, self.state);
            applied += 1;
        }
        applied
    }

    /// Writes back the bytes that changed since the last write.
    pub fn persist(&mut self) -> Result<(), StorageError<E::Error>> {
        if self.state.power != self.persisted.power {
            write(&mut self.store, POWER_ADDR, u8::from(self.state.power))?;
            self.persisted.power = self.state.power;
        }
        if self.state.speed != self.persisted.speed {
            write(&mut self.store, SPEED_ADDR, self.state.speed)?;
            self.persisted.speed = self.state.speed;
        }
        Ok(())
    }

    /// Releases the queue consumer and the store.
    pub fn release(self) -> (Consumer<'a, N>, E) {
        (self.consumer, self.store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::CommandQueue;
    use core::convert::Infallible;

    #[derive(Debug)]
    struct Eeprom {
        cells: [u8; 4],
        writes: usize,
    }

    impl Eeprom {
        fn with(power: u8, speed: u8) -> Self {
            Self {
                cells: [power, speed, 0xff, 0xff],
                writes: 0,
            }
        }
    }

    impl Storage for Eeprom {
        type Error = Infallible;

        fn read_byte(&mut self, addr: u16) -> Result<u8, Infallible> {
            Ok(self.cells[usize::from(addr)])
        }

        fn write_byte(&mut self, addr: u16, byte: u8) -> Result<(), Infallible> {
            self.cells[usize::from(addr)] = byte;
            self.writes += 1;
            Ok(())
        }
    }

    #[derive(Debug)]
    struct Broken;

    impl Storage for Broken {
        type Error = &'static str;

        fn read_byte(&mut self, _: u16) -> Result<u8, &'static str> {
            Err("busy")
        }

        fn write_byte(&mut self, _: u16, _: u8) -> Result<(), &'static str> {
            Err("busy")
        }
    }

    #[test]
    fn test_apply_toggles_power() {
        let mut state = ApplianceState::default();
        state.apply(Command::PowerToggle);
        assert!(state.power);
        state.apply(Command::PowerToggle);
        assert!(!state.power);
    }

    #[test]
    fn test_speed_saturates_at_max() {
        let mut state = ApplianceState::new(true, 9);
        for _ in 0..5 {
            state.apply(Command::SpeedInc);
            assert_eq!(state.speed(), 9);
        }
    }

    #[test]
    fn test_speed_saturates_at_min() {
        let mut state = ApplianceState::new(true, 0);
        for _ in 0..5 {
            state.apply(Command::SpeedDec);
            assert_eq!(state.speed(), 0);
        }
        state.apply(Command::SpeedInc);
        assert_eq!(state.speed(), 1);
    }

    #[test]
    fn test_load_clamps_erased_store() {
        let mut eeprom = Eeprom::with(0xff, 0xff);
        let state = ApplianceState::load(&mut eeprom).unwrap();
        assert!(state.power);
        assert_eq!(state.speed(), 9);

        let mut eeprom = Eeprom::with(0x02, 4);
        let state = ApplianceState::load(&mut eeprom).unwrap();
        assert!(!state.power);
        assert_eq!(state.speed(), 4);
    }

    #[test]
    fn test_storage_error_carries_address() {
        assert_eq!(
            ApplianceState::load(&mut Broken),
            Err(StorageError {
                addr: POWER_ADDR,
                inner: "busy"
            })
        );
        assert_eq!(
            ApplianceState::new(false, 3).store(&mut Broken),
            Err(StorageError {
                addr: POWER_ADDR,
                inner: "busy"
            })
        );
    }

    #[test]
    fn test_poll_applies_in_order() {
        let queue: CommandQueue<4> = CommandQueue::new();
        let (mut producer, consumer) = queue.split().unwrap();
        let mut control = ControlLoop::new(consumer, Eeprom::with(0, 8)).unwrap();

        assert!(producer.push(Command::SpeedInc));
        assert!(producer.push(Command::SpeedInc));
        assert!(producer.push(Command::PowerToggle));
        assert_eq!(control.poll(), 3);
        assert_eq!(control.state(), ApplianceState::new(true, 9));
        assert_eq!(control.poll(), 0);
    }

    #[test]
    fn test_persist_writes_only_changes() {
        let queue: CommandQueue<4> = CommandQueue::new();
        let (mut producer, consumer) = queue.split().unwrap();
        let mut control = ControlLoop::new(consumer, Eeprom::with(1, 3)).unwrap();
        assert!(!control.is_dirty());

        control.persist().unwrap();
        assert!(producer.push(Command::SpeedDec));
        let _ = control.poll();
        assert!(control.is_dirty());
        control.persist().unwrap();
        assert!(!control.is_dirty());

        let (_, eeprom) = control.release();
        assert_eq!(eeprom.writes, 1);
        assert_eq!(eeprom.cells[..2], [1, 2]);
    }
}
