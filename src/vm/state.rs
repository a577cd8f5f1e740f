use std::fs;
use std::path::Path;

use log::{debug, info, log_enabled, Level};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::vm::cadence::Cadence;
use crate::vm::config::{
    FONT_BYTES, KEY_COUNT, MAX_PROGRAM_SIZE, MEMORY_SIZE, PROGRAM_START, REGISTER_COUNT,
    SCREEN_HEIGHT, SCREEN_PIXELS, SCREEN_WIDTH, STACK_DEPTH,
};
use crate::vm::error::Chip8Error;

/// Complete state of one emulated CHIP-8 machine.
///
/// Everything the engine touches lives here; two machines never share state.
#[derive(Debug, Clone)]
pub struct Machine {
    pub memory: [u8; MEMORY_SIZE],
    pub registers: [u8; REGISTER_COUNT],
    pub index: u16,
    pub pc: usize,
    pub stack: [u16; STACK_DEPTH],
    /// Number of occupied stack slots.
    pub stack_pointer: usize,
    pub delay_timer: u8,
    pub sound_timer: u8,
    pub screen_buffer: [u8; SCREEN_PIXELS],
    pub keys: [bool; KEY_COUNT],
    pub cadence: Cadence,
    pub(crate) awaiting_key: Option<usize>,
    pub(crate) cycles_since_tick: u32,
    pub(crate) rng: StdRng,
}

impl Default for Machine {
    fn default() -> Self {
        Self::new()
    }
}

impl Machine {
    /// Creates a reset machine whose random source is seeded from entropy.
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Creates a reset machine with a deterministic random source.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        let mut machine = Self {
            memory: [0; MEMORY_SIZE],
            registers: [0; REGISTER_COUNT],
            index: 0,
            pc: PROGRAM_START,
            stack: [0; STACK_DEPTH],
            stack_pointer: 0,
            delay_timer: 0,
            sound_timer: 0,
            screen_buffer: [0; SCREEN_PIXELS],
            keys: [false; KEY_COUNT],
            cadence: Cadence::default(),
            awaiting_key: None,
            cycles_since_tick: 0,
            rng,
        };
        machine.reset();
        machine
    }

    pub fn with_cadence(mut self, cadence: Cadence) -> Self {
        self.cadence = cadence;
        self
    }

    /// Returns the machine to its power-on state with the font installed.
    ///
    /// The cadence and the random source survive a reset.
    pub fn reset(&mut self) {
        self.memory = [0; MEMORY_SIZE];
        self.registers = [0; REGISTER_COUNT];
        self.index = 0;
        self.pc = PROGRAM_START;
        self.stack = [0; STACK_DEPTH];
        self.stack_pointer = 0;
        self.delay_timer = 0;
        self.sound_timer = 0;
        self.keys = [false; KEY_COUNT];
        self.awaiting_key = None;
        self.cycles_since_tick = 0;
        self.clear_display();

        self.memory[..FONT_BYTES.len()].copy_from_slice(&FONT_BYTES);
        info!("machine reset, pc=0x{:03x}", self.pc);
    }

    pub fn load_program(&mut self, program: &[u8]) -> Result<(), Chip8Error> {
        if program.len() > MAX_PROGRAM_SIZE {
            return Err(Chip8Error::ProgramTooLarge {
                size: program.len(),
                max: MAX_PROGRAM_SIZE,
            });
        }

        let end = PROGRAM_START + program.len();
        self.memory[PROGRAM_START..end].copy_from_slice(program);

        if log_enabled!(Level::Debug) {
            log_program_bytes(program);
        }
        info!(
            "loaded {} bytes at 0x{:03x}..0x{:03x}",
            program.len(),
            PROGRAM_START,
            end
        );

        Ok(())
    }

    pub fn load_program_file(&mut self, path: &Path) -> Result<(), Chip8Error> {
        let program = fs::read(path)?;
        self.load_program(&program)
    }

    pub fn clear_display(&mut self) {
        self.screen_buffer = [0; SCREEN_PIXELS];
    }

    pub fn display(&self) -> &[u8; SCREEN_PIXELS] {
        &self.screen_buffer
    }

    /// Pixel at column `x`, row `y`; out-of-screen coordinates read as unlit.
    pub fn pixel(&self, x: usize, y: usize) -> bool {
        if x >= SCREEN_WIDTH || y >= SCREEN_HEIGHT {
            return false;
        }
        self.screen_buffer[y * SCREEN_WIDTH + x] == 1
    }

    pub fn set_key(&mut self, key_index: usize, is_pressed: bool) {
        if key_index >= KEY_COUNT {
            return;
        }
        self.keys[key_index] = is_pressed;
    }

    pub fn release_all_keys(&mut self) {
        self.keys = [false; KEY_COUNT];
    }

    pub fn first_pressed_key(&self) -> Option<u8> {
        first_pressed(&self.keys)
    }

    /// True while an `LD Vx, K` is parked waiting for a key press.
    pub fn is_awaiting_key(&self) -> bool {
        self.awaiting_key.is_some()
    }
}

pub(crate) fn first_pressed(keys: &[bool; KEY_COUNT]) -> Option<u8> {
    keys.iter()
        .position(|pressed| *pressed)
        .map(|index| index as u8)
}

/// Validates that `len` bytes starting at `start` lie inside memory.
pub(crate) fn check_range(start: usize, len: usize) -> Result<(), Chip8Error> {
    if len > 0 && start + len > MEMORY_SIZE {
        return Err(Chip8Error::AddressOutOfRange {
            address: usize::max(start, MEMORY_SIZE),
        });
    }
    Ok(())
}

fn log_program_bytes(program: &[u8]) {
    let rows: Vec<String> = program
        .chunks(16)
        .map(|row| {
            row.iter()
                .map(|byte| format!("{byte:02x}"))
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect();
    debug!("program image:\n{}", rows.join("\n"));
}
