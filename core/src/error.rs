use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can stop a step from completing.
///
/// `UnknownOpcode` is recoverable at the host's discretion. The rest indicate a malformed
/// program and leave the session in a state that shouldn't be stepped any further.
#[derive(Debug, Error)]
pub enum Error {
    #[error("unknown opcode {opcode:#06X} at pc {pc:#05X}")]
    UnknownOpcode { opcode: u16, pc: u16 },

    #[error("{len} byte access at {addr:#06X} runs past the end of memory")]
    AddressOutOfRange { addr: usize, len: usize },

    #[error("write to {addr:#05X} is below the program region")]
    ProtectedWrite { addr: usize },

    #[error("stack overflow at pc {pc:#05X} with depth {depth}")]
    StackOverflow { pc: u16, depth: usize },

    #[error("stack underflow at pc {pc:#05X}")]
    StackUnderflow { pc: u16 },

    #[error("rom is {size} bytes but at most {max} fit in memory")]
    RomTooLarge { size: usize, max: usize },

    #[error("key {key:#04X} is not on the keypad")]
    InvalidKey { key: u8 },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
