pub mod vm;

#[cfg(feature = "window")]
pub use vm::app::run_window;
pub use vm::app::{create_machine, run_headless, HeadlessReport};
pub use vm::cadence::{load_cadence, load_cadence_from_env, Cadence, COUPLED};
pub use vm::config::{
    FONT_BYTES, KEY_COUNT, MAX_PROGRAM_SIZE, MEMORY_SIZE, PROGRAM_START, SCREEN_HEIGHT,
    SCREEN_WIDTH, STACK_DEPTH,
};
pub use vm::cpu::{execute, fetch, step, tick_timers, Cycle, CycleStatus, Effects};
pub use vm::error::Chip8Error;
pub use vm::instruction::{disassemble, Instruction};
pub use vm::state::Machine;
