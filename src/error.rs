use thiserror::Error;

/// Everything that can stop the virtual machine.
///
/// All variants are fatal for the current run: the core never retries an
/// instruction, and it is up to the driver to log and `reset` the machine.
#[derive(Error, Debug)]
pub enum Error {
    #[error("unknown opcode {opcode:#06X} at address {pc:#05X}")]
    UnknownOpcode { opcode: u16, pc: u16 },

    #[error("call stack overflow on instruction at address {pc:#05X}")]
    StackOverflow { pc: u16 },

    #[error("return with an empty call stack on instruction at address {pc:#05X}")]
    StackUnderflow { pc: u16 },

    #[error("address {address:#06X} is outside of memory")]
    OutOfBoundsAddress { address: usize },

    #[error("rom has {size} bytes, but only {max} fit in memory")]
    RomTooLarge { size: usize, max: usize },

    #[error("wait for key press was cancelled")]
    Cancelled,

    #[error("input source disconnected while waiting for a key press")]
    InputDisconnected,

    #[error("machine is halted after a fatal error and must be reset")]
    Halted,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
