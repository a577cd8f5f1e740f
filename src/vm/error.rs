use thiserror::Error;

#[derive(Debug, Error)]
pub enum Chip8Error {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("program too large: {size} bytes (max {max})")]
    ProgramTooLarge { size: usize, max: usize },

    #[error("memory access out of range: 0x{address:04x}")]
    AddressOutOfRange { address: usize },

    #[error("call stack overflow at 0x{pc:03x}")]
    StackOverflow { pc: usize },

    #[error("return with empty call stack at 0x{pc:03x}")]
    StackUnderflow { pc: usize },

    #[error("unknown opcode 0x{opcode:04x} at 0x{pc:03x}")]
    UnknownOpcode { opcode: u16, pc: usize },

    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
}

impl Chip8Error {
    /// Fatal errors end the session; the rest are reported and execution continues.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            Self::StackOverflow { .. } | Self::StackUnderflow { .. } | Self::UnknownOpcode { .. }
        )
    }
}
