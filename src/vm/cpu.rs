use log::{debug, trace, warn};
use rand::Rng;

use crate::vm::config::{
    FLAG_REGISTER, FONT_GLYPH_SIZE, MEMORY_SIZE, SCREEN_PIXELS, SCREEN_WIDTH, STACK_DEPTH,
};
use crate::vm::error::Chip8Error;
use crate::vm::instruction::Instruction;
use crate::vm::state::{check_range, first_pressed, Machine};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleStatus {
    Executed(Instruction),
    /// `LD Vx, K` is still waiting; `pc` has not moved.
    AwaitingKey { register: usize },
}

/// What one call to [`step`] did, for the driver's renderer and audio.
#[derive(Debug)]
pub struct Cycle {
    pub status: CycleStatus,
    pub drew: bool,
    /// The sound timer ran out during this cycle.
    pub beep: bool,
    /// A reported, non-fatal error. Execution continued past it.
    pub fault: Option<Chip8Error>,
}

#[derive(Debug, Default)]
pub struct Effects {
    pub drew: bool,
    pub fault: Option<Chip8Error>,
}

enum Flow {
    Next,
    SkipIf(bool),
    Goto(usize),
    Stay,
}

impl Machine {
    pub fn step(&mut self) -> Result<Cycle, Chip8Error> {
        step(self)
    }
}

pub fn fetch(machine: &Machine) -> Result<u16, Chip8Error> {
    if machine.pc + 1 >= MEMORY_SIZE {
        return Err(Chip8Error::AddressOutOfRange {
            address: machine.pc,
        });
    }

    Ok(((machine.memory[machine.pc] as u16) << 8) | machine.memory[machine.pc + 1] as u16)
}

/// Runs one fetch-decode-execute cycle followed by the timer bookkeeping.
///
/// Returns `Err` only for fatal conditions, in which case the machine is
/// left exactly as it was before the call.
pub fn step(machine: &mut Machine) -> Result<Cycle, Chip8Error> {
    let (status, effects) = match machine.awaiting_key {
        Some(register) => (poll_key_wait(machine, register), Effects::default()),
        None => {
            let opcode = fetch(machine)?;
            let instruction = Instruction::decode(opcode);
            trace!("0x{:03x}: {opcode:04x}  {instruction}", machine.pc);

            let effects = execute(machine, instruction)?;
            let status = match machine.awaiting_key {
                Some(register) => CycleStatus::AwaitingKey { register },
                None => CycleStatus::Executed(instruction),
            };
            (status, effects)
        }
    };

    let beep = advance_timers(machine);

    Ok(Cycle {
        status,
        drew: effects.drew,
        beep,
        fault: effects.fault,
    })
}

fn poll_key_wait(machine: &mut Machine, register: usize) -> CycleStatus {
    match machine.first_pressed_key() {
        Some(key) => {
            debug!("key 0x{key:x} released wait on V{register:X}");
            machine.registers[register] = key;
            machine.awaiting_key = None;
            machine.pc += 2;
            CycleStatus::Executed(Instruction::WaitKey { x: register })
        }
        None => CycleStatus::AwaitingKey { register },
    }
}

fn advance_timers(machine: &mut Machine) -> bool {
    machine.cycles_since_tick += 1;
    if machine.cycles_since_tick < machine.cadence.cycles_per_timer_tick {
        return false;
    }
    machine.cycles_since_tick = 0;
    tick_timers(machine)
}

/// Decrements both timers toward zero. Returns true when the sound timer
/// reaches zero on this tick.
pub fn tick_timers(machine: &mut Machine) -> bool {
    machine.delay_timer = machine.delay_timer.saturating_sub(1);

    if machine.sound_timer > 0 {
        machine.sound_timer -= 1;
        return machine.sound_timer == 0;
    }
    false
}

/// Applies one instruction located at the current `pc`.
///
/// Expects an instruction produced by [`Instruction::decode`], whose register
/// fields are always below 16. A hand-built instruction naming a register
/// outside `V0..=VF` panics on the register access.
pub fn execute(machine: &mut Machine, instruction: Instruction) -> Result<Effects, Chip8Error> {
    let mut effects = Effects::default();
    let pc = machine.pc;
    let v = &mut machine.registers;

    let flow = match instruction {
        Instruction::Sys { addr } => {
            debug!("ignoring SYS 0x{addr:03x} at 0x{pc:03x}");
            Flow::Next
        }
        Instruction::ClearScreen => {
            machine.clear_display();
            effects.drew = true;
            Flow::Next
        }
        Instruction::Return => {
            if machine.stack_pointer == 0 {
                report(&mut effects, Chip8Error::StackUnderflow { pc });
                Flow::Next
            } else {
                machine.stack_pointer -= 1;
                Flow::Goto(machine.stack[machine.stack_pointer] as usize)
            }
        }
        Instruction::Jump { addr } => Flow::Goto(addr as usize),
        Instruction::Call { addr } => {
            if machine.stack_pointer == STACK_DEPTH {
                report(&mut effects, Chip8Error::StackOverflow { pc });
                Flow::Next
            } else {
                machine.stack[machine.stack_pointer] = (pc + 2) as u16;
                machine.stack_pointer += 1;
                Flow::Goto(addr as usize)
            }
        }
        Instruction::SkipEqByte { x, byte } => Flow::SkipIf(v[x] == byte),
        Instruction::SkipNeByte { x, byte } => Flow::SkipIf(v[x] != byte),
        Instruction::SkipEqReg { x, y } => Flow::SkipIf(v[x] == v[y]),
        Instruction::LoadByte { x, byte } => {
            v[x] = byte;
            Flow::Next
        }
        Instruction::AddByte { x, byte } => {
            v[x] = v[x].wrapping_add(byte);
            Flow::Next
        }
        Instruction::Move { x, y } => {
            v[x] = v[y];
            Flow::Next
        }
        Instruction::Or { x, y } => {
            v[x] |= v[y];
            Flow::Next
        }
        Instruction::And { x, y } => {
            v[x] &= v[y];
            Flow::Next
        }
        Instruction::Xor { x, y } => {
            v[x] ^= v[y];
            Flow::Next
        }
        Instruction::AddReg { x, y } => {
            let (result, carry) = v[x].overflowing_add(v[y]);
            v[FLAG_REGISTER] = u8::from(carry);
            v[x] = result;
            Flow::Next
        }
        Instruction::SubReg { x, y } => {
            let no_borrow = v[x] >= v[y];
            let result = v[x].wrapping_sub(v[y]);
            v[FLAG_REGISTER] = u8::from(no_borrow);
            v[x] = result;
            Flow::Next
        }
        Instruction::ShiftRight { x, .. } => {
            let value = v[x];
            v[FLAG_REGISTER] = value & 0x1;
            v[x] = value >> 1;
            Flow::Next
        }
        Instruction::SubReverse { x, y } => {
            let no_borrow = v[y] >= v[x];
            let result = v[y].wrapping_sub(v[x]);
            v[FLAG_REGISTER] = u8::from(no_borrow);
            v[x] = result;
            Flow::Next
        }
        Instruction::ShiftLeft { x, .. } => {
            let value = v[x];
            v[FLAG_REGISTER] = (value >> 7) & 0x1;
            v[x] = value << 1;
            Flow::Next
        }
        Instruction::SkipNeReg { x, y } => Flow::SkipIf(v[x] != v[y]),
        Instruction::LoadIndex { addr } => {
            machine.index = addr;
            Flow::Next
        }
        Instruction::JumpOffset { addr } => Flow::Goto(addr as usize + v[0] as usize),
        Instruction::Random { x, mask } => {
            v[x] = machine.rng.gen::<u8>() & mask;
            Flow::Next
        }
        Instruction::Draw { x, y, height } => {
            draw_sprite(machine, x, y, height)?;
            effects.drew = true;
            Flow::Next
        }
        Instruction::SkipKeyPressed { x } => Flow::SkipIf(machine.keys[(v[x] & 0x0F) as usize]),
        Instruction::SkipKeyReleased { x } => Flow::SkipIf(!machine.keys[(v[x] & 0x0F) as usize]),
        Instruction::LoadDelay { x } => {
            v[x] = machine.delay_timer;
            Flow::Next
        }
        Instruction::WaitKey { x } => match first_pressed(&machine.keys) {
            Some(key) => {
                v[x] = key;
                Flow::Next
            }
            None => {
                debug!("waiting for key into V{x:X} at 0x{pc:03x}");
                machine.awaiting_key = Some(x);
                Flow::Stay
            }
        },
        Instruction::SetDelay { x } => {
            machine.delay_timer = v[x];
            Flow::Next
        }
        Instruction::SetSound { x } => {
            machine.sound_timer = v[x];
            Flow::Next
        }
        Instruction::AddIndex { x } => {
            machine.index = machine.index.wrapping_add(v[x] as u16);
            Flow::Next
        }
        Instruction::LoadGlyph { x } => {
            machine.index = v[x] as u16 * FONT_GLYPH_SIZE as u16;
            Flow::Next
        }
        Instruction::StoreBcd { x } => {
            let start = machine.index as usize;
            check_range(start, 3)?;
            let value = v[x];
            machine.memory[start] = value / 100;
            machine.memory[start + 1] = (value % 100) / 10;
            machine.memory[start + 2] = value % 10;
            Flow::Next
        }
        Instruction::StoreRegisters { x } => {
            let start = machine.index as usize;
            check_range(start, x + 1)?;
            machine.memory[start..=start + x].copy_from_slice(&v[..=x]);
            Flow::Next
        }
        Instruction::LoadRegisters { x } => {
            let start = machine.index as usize;
            check_range(start, x + 1)?;
            v[..=x].copy_from_slice(&machine.memory[start..=start + x]);
            Flow::Next
        }
        Instruction::Unknown(opcode) => {
            report(&mut effects, Chip8Error::UnknownOpcode { opcode, pc });
            Flow::Next
        }
    };

    match flow {
        Flow::Next => machine.pc += 2,
        Flow::SkipIf(skip) => machine.pc += if skip { 4 } else { 2 },
        Flow::Goto(target) => machine.pc = target,
        Flow::Stay => {}
    }

    Ok(effects)
}

fn report(effects: &mut Effects, fault: Chip8Error) {
    warn!("{fault}");
    effects.fault = Some(fault);
}

/// XORs an `height`-row sprite from `memory[I..]` into the framebuffer.
///
/// Pixel positions wrap by linear buffer index, so a sprite running off the
/// right edge continues on the next row.
fn draw_sprite(machine: &mut Machine, x: usize, y: usize, height: u8) -> Result<(), Chip8Error> {
    let start = machine.index as usize;
    let height = height as usize;
    check_range(start, height)?;

    let x_start = machine.registers[x] as usize;
    let y_start = machine.registers[y] as usize;
    let mut collision = 0;

    for row in 0..height {
        let sprite_row = machine.memory[start + row];

        for bit in 0..8 {
            if (sprite_row >> (7 - bit)) & 0x1 == 0 {
                continue;
            }

            let location = ((y_start + row) * SCREEN_WIDTH + x_start + bit) % SCREEN_PIXELS;
            if machine.screen_buffer[location] == 1 {
                collision = 1;
            }
            machine.screen_buffer[location] ^= 1;
        }
    }

    machine.registers[FLAG_REGISTER] = collision;
    Ok(())
}
