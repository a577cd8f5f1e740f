use std::fmt::{Display, Formatter};

use crate::vm::config::{MAX_PROGRAM_SIZE, PROGRAM_START};
use crate::vm::error::Chip8Error;

fn x_register_index(opcode: u16) -> usize {
    ((opcode & 0x0F00) >> 8) as usize
}

fn y_register_index(opcode: u16) -> usize {
    ((opcode & 0x00F0) >> 4) as usize
}

fn address_nnn(opcode: u16) -> u16 {
    opcode & 0x0FFF
}

fn byte_nn(opcode: u16) -> u8 {
    (opcode & 0x00FF) as u8
}

fn nibble_n(opcode: u16) -> u8 {
    (opcode & 0x000F) as u8
}

/// A decoded CHIP-8 instruction with its operand fields.
///
/// `x` and `y` are register indices (0..16), `addr` is a 12-bit address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    /// `0NNN`: call to a host machine-code routine; not emulated.
    Sys { addr: u16 },
    ClearScreen,
    Return,
    Jump { addr: u16 },
    Call { addr: u16 },
    SkipEqByte { x: usize, byte: u8 },
    SkipNeByte { x: usize, byte: u8 },
    SkipEqReg { x: usize, y: usize },
    LoadByte { x: usize, byte: u8 },
    AddByte { x: usize, byte: u8 },
    Move { x: usize, y: usize },
    Or { x: usize, y: usize },
    And { x: usize, y: usize },
    Xor { x: usize, y: usize },
    AddReg { x: usize, y: usize },
    SubReg { x: usize, y: usize },
    ShiftRight { x: usize, y: usize },
    SubReverse { x: usize, y: usize },
    ShiftLeft { x: usize, y: usize },
    SkipNeReg { x: usize, y: usize },
    LoadIndex { addr: u16 },
    JumpOffset { addr: u16 },
    Random { x: usize, mask: u8 },
    Draw { x: usize, y: usize, height: u8 },
    SkipKeyPressed { x: usize },
    SkipKeyReleased { x: usize },
    LoadDelay { x: usize },
    WaitKey { x: usize },
    SetDelay { x: usize },
    SetSound { x: usize },
    AddIndex { x: usize },
    LoadGlyph { x: usize },
    StoreBcd { x: usize },
    StoreRegisters { x: usize },
    LoadRegisters { x: usize },
    Unknown(u16),
}

impl Instruction {
    pub fn decode(opcode: u16) -> Self {
        let x = x_register_index(opcode);
        let y = y_register_index(opcode);
        let addr = address_nnn(opcode);
        let byte = byte_nn(opcode);
        let n = nibble_n(opcode);

        match opcode & 0xF000 {
            0x0000 => match opcode {
                0x00E0 => Self::ClearScreen,
                0x00EE => Self::Return,
                _ => Self::Sys { addr },
            },
            0x1000 => Self::Jump { addr },
            0x2000 => Self::Call { addr },
            0x3000 => Self::SkipEqByte { x, byte },
            0x4000 => Self::SkipNeByte { x, byte },
            0x5000 if n == 0 => Self::SkipEqReg { x, y },
            0x6000 => Self::LoadByte { x, byte },
            0x7000 => Self::AddByte { x, byte },
            0x8000 => match n {
                0x0 => Self::Move { x, y },
                0x1 => Self::Or { x, y },
                0x2 => Self::And { x, y },
                0x3 => Self::Xor { x, y },
                0x4 => Self::AddReg { x, y },
                0x5 => Self::SubReg { x, y },
                0x6 => Self::ShiftRight { x, y },
                0x7 => Self::SubReverse { x, y },
                0xE => Self::ShiftLeft { x, y },
                _ => Self::Unknown(opcode),
            },
            0x9000 if n == 0 => Self::SkipNeReg { x, y },
            0xA000 => Self::LoadIndex { addr },
            0xB000 => Self::JumpOffset { addr },
            0xC000 => Self::Random { x, mask: byte },
            0xD000 => Self::Draw { x, y, height: n },
            0xE000 => match byte {
                0x9E => Self::SkipKeyPressed { x },
                0xA1 => Self::SkipKeyReleased { x },
                _ => Self::Unknown(opcode),
            },
            0xF000 => match byte {
                0x07 => Self::LoadDelay { x },
                0x0A => Self::WaitKey { x },
                0x15 => Self::SetDelay { x },
                0x18 => Self::SetSound { x },
                0x1E => Self::AddIndex { x },
                0x29 => Self::LoadGlyph { x },
                0x33 => Self::StoreBcd { x },
                0x55 => Self::StoreRegisters { x },
                0x65 => Self::LoadRegisters { x },
                _ => Self::Unknown(opcode),
            },
            _ => Self::Unknown(opcode),
        }
    }

}

/// Renders a program image as `address: opcode  mnemonic` lines, numbered
/// from the load address. A trailing odd byte is listed as `DB`.
pub fn disassemble(program: &[u8]) -> Result<Vec<String>, Chip8Error> {
    if program.len() > MAX_PROGRAM_SIZE {
        return Err(Chip8Error::ProgramTooLarge {
            size: program.len(),
            max: MAX_PROGRAM_SIZE,
        });
    }

    let lines = program
        .chunks(2)
        .enumerate()
        .map(|(offset, word)| {
            let address = PROGRAM_START + offset * 2;
            match *word {
                [high, low] => {
                    let opcode = u16::from_be_bytes([high, low]);
                    format!("0x{address:03X}: {opcode:04X}  {}", Instruction::decode(opcode))
                }
                _ => {
                    let odd = word[0];
                    format!("0x{address:03X}: {odd:02X}    DB 0x{odd:02X}")
                }
            }
        })
        .collect();

    Ok(lines)
}

impl Display for Instruction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match *self {
            Self::Sys { addr } => write!(f, "SYS 0x{addr:03X}"),
            Self::ClearScreen => write!(f, "CLS"),
            Self::Return => write!(f, "RET"),
            Self::Jump { addr } => write!(f, "JP 0x{addr:03X}"),
            Self::Call { addr } => write!(f, "CALL 0x{addr:03X}"),
            Self::SkipEqByte { x, byte } => write!(f, "SE V{x:X}, 0x{byte:02X}"),
            Self::SkipNeByte { x, byte } => write!(f, "SNE V{x:X}, 0x{byte:02X}"),
            Self::SkipEqReg { x, y } => write!(f, "SE V{x:X}, V{y:X}"),
            Self::LoadByte { x, byte } => write!(f, "LD V{x:X}, 0x{byte:02X}"),
            Self::AddByte { x, byte } => write!(f, "ADD V{x:X}, 0x{byte:02X}"),
            Self::Move { x, y } => write!(f, "LD V{x:X}, V{y:X}"),
            Self::Or { x, y } => write!(f, "OR V{x:X}, V{y:X}"),
            Self::And { x, y } => write!(f, "AND V{x:X}, V{y:X}"),
            Self::Xor { x, y } => write!(f, "XOR V{x:X}, V{y:X}"),
            Self::AddReg { x, y } => write!(f, "ADD V{x:X}, V{y:X}"),
            Self::SubReg { x, y } => write!(f, "SUB V{x:X}, V{y:X}"),
            Self::ShiftRight { x, y } => write!(f, "SHR V{x:X}, V{y:X}"),
            Self::SubReverse { x, y } => write!(f, "SUBN V{x:X}, V{y:X}"),
            Self::ShiftLeft { x, y } => write!(f, "SHL V{x:X}, V{y:X}"),
            Self::SkipNeReg { x, y } => write!(f, "SNE V{x:X}, V{y:X}"),
            Self::LoadIndex { addr } => write!(f, "LD I, 0x{addr:03X}"),
            Self::JumpOffset { addr } => write!(f, "JP V0, 0x{addr:03X}"),
            Self::Random { x, mask } => write!(f, "RND V{x:X}, 0x{mask:02X}"),
            Self::Draw { x, y, height } => write!(f, "DRW V{x:X}, V{y:X}, {height}"),
            Self::SkipKeyPressed { x } => write!(f, "SKP V{x:X}"),
            Self::SkipKeyReleased { x } => write!(f, "SKNP V{x:X}"),
            Self::LoadDelay { x } => write!(f, "LD V{x:X}, DT"),
            Self::WaitKey { x } => write!(f, "LD V{x:X}, K"),
            Self::SetDelay { x } => write!(f, "LD DT, V{x:X}"),
            Self::SetSound { x } => write!(f, "LD ST, V{x:X}"),
            Self::AddIndex { x } => write!(f, "ADD I, V{x:X}"),
            Self::LoadGlyph { x } => write!(f, "LD F, V{x:X}"),
            Self::StoreBcd { x } => write!(f, "LD B, V{x:X}"),
            Self::StoreRegisters { x } => write!(f, "LD [I], V{x:X}"),
            Self::LoadRegisters { x } => write!(f, "LD V{x:X}, [I]"),
            Self::Unknown(opcode) => write!(f, "DW 0x{opcode:04X}"),
        }
    }
}
