use std::env;

use crate::vm::error::Chip8Error;

pub const CADENCE_ENV_VAR: &str = "CHIP8_CYCLES_PER_TICK";

/// How many executed cycles pass between two timer decrements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cadence {
    pub cycles_per_timer_tick: u32,
}

/// One timer tick per instruction.
pub const COUPLED: Cadence = Cadence {
    cycles_per_timer_tick: 1,
};

impl Default for Cadence {
    fn default() -> Self {
        COUPLED
    }
}

impl Cadence {
    pub fn new(cycles_per_timer_tick: u32) -> Result<Self, Chip8Error> {
        if cycles_per_timer_tick == 0 {
            return Err(Chip8Error::InvalidArgument("cycles per timer tick must be > 0"));
        }
        Ok(Self {
            cycles_per_timer_tick,
        })
    }

    /// Cadence that keeps the timers near 60 Hz for a driver stepping at `cpu_hz`.
    pub fn for_cpu_hz(cpu_hz: u32) -> Result<Self, Chip8Error> {
        if cpu_hz == 0 {
            return Err(Chip8Error::InvalidArgument("cpu_hz must be > 0"));
        }
        Self::new(u32::max(1, cpu_hz / 60))
    }
}

/// Parses `coupled`, `hz` (about 60 Hz timers at `cpu_hz`) or a cycle count.
pub fn load_cadence(profile: &str, cpu_hz: u32) -> Result<Cadence, Chip8Error> {
    match profile.trim().to_ascii_lowercase().as_str() {
        "coupled" => Ok(COUPLED),
        "hz" => Cadence::for_cpu_hz(cpu_hz),
        other => {
            let cycles = other.parse::<u32>().map_err(|_| {
                Chip8Error::InvalidArgument("cadence must be 'coupled', 'hz' or a positive integer")
            })?;
            Cadence::new(cycles)
        }
    }
}

pub fn load_cadence_from_env(cpu_hz: u32) -> Result<Cadence, Chip8Error> {
    let profile = env::var(CADENCE_ENV_VAR).unwrap_or_else(|_| "coupled".to_owned());
    load_cadence(&profile, cpu_hz)
}
