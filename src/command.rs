//! Command codes, their check tags, and the decoder alphabet.
//!
//! Every command travels with a fixed check byte. The mapping is 1:1 and is
//! not a CRC: it only rejects garbage that happens to look like a
//! `HEAD SIGN CMD` prefix. Both ends must keep it exactly as is to stay
//! compatible with deployed devices.

use crate::consts::{PACKET_HEAD, PACKET_SIGN};
use crate::error::UnknownCommand;

/// A command carried by one frame.
#[derive(PartialEq, Eq, Clone, Copy, Debug, Hash)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
#[repr(u8)]
pub enum Command {
    /// Flip the appliance power flag.
    PowerToggle = 0x01,
    /// Raise the speed level by one, saturating at the maximum.
    SpeedInc = 0x02,
    /// Lower the speed level by one, saturating at the minimum.
    SpeedDec = 0x03,
}

impl Command {
    /// All commands, in keypad priority order.
    pub const ALL: [Command; 3] = [Command::PowerToggle, Command::SpeedInc, Command::SpeedDec];

    /// The wire code of this command.
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// The check byte that must follow this command in a frame.
    pub const fn check(self) -> u8 {
        match self {
            Command::PowerToggle => 0xdf,
            Command::SpeedInc => 0x3d,
            Command::SpeedDec => 0x63,
        }
    }

    /// Looks up a command by its wire code.
    pub const fn from_code(code: u8) -> Option<Command> {
        match code {
            0x01 => Some(Command::PowerToggle),
            0x02 => Some(Command::SpeedInc),
            0x03 => Some(Command::SpeedDec),
            _ => None,
        }
    }

    /// Looks up the command a check byte belongs to.
    pub const fn from_check(check: u8) -> Option<Command> {
        match check {
            0xdf => Some(Command::PowerToggle),
            0x3d => Some(Command::SpeedInc),
            0x63 => Some(Command::SpeedDec),
            _ => None,
        }
    }
}

impl TryFrom<u8> for Command {
    type Error = UnknownCommand;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Command::from_code(code).ok_or(UnknownCommand(code))
    }
}

impl From<Command> for u8 {
    fn from(cmd: Command) -> u8 {
        cmd.code()
    }
}

/// Classification of one received byte against the decoder alphabet.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum Symbol {
    /// [`PACKET_HEAD`]
    Head,
    /// [`PACKET_SIGN`]
    Sign,
    /// A command code.
    Command(Command),
    /// A check tag, carrying the command it belongs to.
    Check(Command),
    /// Anything else, including the sync byte.
    Noise,
}

impl Symbol {
    /// Classifies a raw byte.
    pub const fn classify(byte: u8) -> Symbol {
        if byte == PACKET_HEAD {
            return Symbol::Head;
        }
        if byte == PACKET_SIGN {
            return Symbol::Sign;
        }
        if let Some(cmd) = Command::from_code(byte) {
            return Symbol::Command(cmd);
        }
        if let Some(cmd) = Command::from_check(byte) {
            return Symbol::Check(cmd);
        }
        Symbol::Noise
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SYNC_BYTE;

    #[test]
    fn test_check_mapping_is_one_to_one() {
        for cmd in Command::ALL {
            assert_eq!(Command::from_check(cmd.check()), Some(cmd));
            assert_eq!(Command::from_code(cmd.code()), Some(cmd));
        }
    }

    #[test]
    fn test_try_from_rejects_unknown_code() {
        assert_eq!(Command::try_from(0x02), Ok(Command::SpeedInc));
        assert_eq!(Command::try_from(0x04), Err(UnknownCommand(0x04)));
    }

    #[test]
    fn test_classify_alphabet() {
        assert_eq!(Symbol::classify(0xaa), Symbol::Head);
        assert_eq!(Symbol::classify(0x2e), Symbol::Sign);
        assert_eq!(Symbol::classify(0x03), Symbol::Command(Command::SpeedDec));
        assert_eq!(Symbol::classify(0xdf), Symbol::Check(Command::PowerToggle));
        assert_eq!(Symbol::classify(SYNC_BYTE), Symbol::Noise);
        assert_eq!(Symbol::classify(0x00), Symbol::Noise);
    }
}
