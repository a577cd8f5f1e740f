use std::path::Path;

use log::info;

use crate::vm::cadence::Cadence;
use crate::vm::cpu::step;
use crate::vm::error::Chip8Error;
use crate::vm::state::Machine;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct HeadlessReport {
    pub cycles: usize,
    pub draws: usize,
    pub beeps: usize,
    pub faults: usize,
}

pub fn create_machine(
    rom_path: &Path,
    cadence: Cadence,
    seed: Option<u64>,
) -> Result<Machine, Chip8Error> {
    let machine = match seed {
        Some(seed) => Machine::with_seed(seed),
        None => Machine::new(),
    };
    let mut machine = machine.with_cadence(cadence);
    machine.load_program_file(rom_path)?;
    Ok(machine)
}

/// Steps a machine `max_cycles` times with no renderer attached.
pub fn run_headless(
    machine: &mut Machine,
    max_cycles: usize,
) -> Result<HeadlessReport, Chip8Error> {
    if max_cycles == 0 {
        return Err(Chip8Error::InvalidArgument("max_cycles must be > 0"));
    }

    let mut report = HeadlessReport::default();
    for _ in 0..max_cycles {
        let cycle = step(machine)?;
        report.cycles += 1;
        report.draws += usize::from(cycle.drew);
        report.beeps += usize::from(cycle.beep);
        report.faults += usize::from(cycle.fault.is_some());
    }

    info!(
        "headless run finished: {} cycles, {} draws, {} beeps, {} faults",
        report.cycles, report.draws, report.beeps, report.faults
    );
    Ok(report)
}

#[cfg(feature = "window")]
pub fn run_window(
    machine: &mut Machine,
    scale: usize,
    cpu_hz: u32,
    target_fps: usize,
) -> Result<(), Chip8Error> {
    use std::io::Write;

    use raylib::prelude::{Color, KeyboardKey, RaylibDraw};

    use crate::vm::config::{SCREEN_HEIGHT, SCREEN_WIDTH};

    if scale == 0 {
        return Err(Chip8Error::InvalidArgument("scale must be > 0"));
    }
    if cpu_hz == 0 {
        return Err(Chip8Error::InvalidArgument("cpu_hz must be > 0"));
    }
    if target_fps == 0 {
        return Err(Chip8Error::InvalidArgument("target_fps must be > 0"));
    }

    let width = (SCREEN_WIDTH * scale) as i32;
    let height = (SCREEN_HEIGHT * scale) as i32;
    let (mut rl, thread) = raylib::init()
        .size(width, height)
        .title("chip8-vm")
        .build();
    rl.set_target_fps(target_fps as u32);

    let key_map = [
        (KeyboardKey::KEY_ONE, 0x1usize),
        (KeyboardKey::KEY_TWO, 0x2),
        (KeyboardKey::KEY_THREE, 0x3),
        (KeyboardKey::KEY_FOUR, 0xC),
        (KeyboardKey::KEY_Q, 0x4),
        (KeyboardKey::KEY_W, 0x5),
        (KeyboardKey::KEY_E, 0x6),
        (KeyboardKey::KEY_R, 0xD),
        (KeyboardKey::KEY_A, 0x7),
        (KeyboardKey::KEY_S, 0x8),
        (KeyboardKey::KEY_D, 0x9),
        (KeyboardKey::KEY_F, 0xE),
        (KeyboardKey::KEY_Z, 0xA),
        (KeyboardKey::KEY_X, 0x0),
        (KeyboardKey::KEY_C, 0xB),
        (KeyboardKey::KEY_V, 0xF),
    ];

    let cycles_per_frame = usize::max(1, cpu_hz as usize / target_fps);
    let mut front_buffer = *machine.display();

    while !rl.window_should_close() {
        if rl.is_key_pressed(KeyboardKey::KEY_ESCAPE) {
            break;
        }

        for (key, mapped) in key_map {
            machine.set_key(mapped, rl.is_key_down(key));
        }

        let mut drew = false;
        for _ in 0..cycles_per_frame {
            let cycle = step(machine)?;
            drew |= cycle.drew;
            if cycle.beep {
                let mut stderr = std::io::stderr();
                stderr.write_all(b"\x07")?;
                stderr.flush()?;
            }
        }
        if drew {
            front_buffer = *machine.display();
        }

        let mut d = rl.begin_drawing(&thread);
        d.clear_background(Color::BLACK);
        for (index, value) in front_buffer.iter().enumerate() {
            if *value == 0 {
                continue;
            }
            let x = (index % SCREEN_WIDTH) as i32;
            let y = (index / SCREEN_WIDTH) as i32;
            d.draw_rectangle(
                x * scale as i32,
                y * scale as i32,
                scale as i32,
                scale as i32,
                Color::WHITE,
            );
        }
    }

    Ok(())
}
