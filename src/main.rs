use std::path::PathBuf;

use clap::Parser;

use chip8_vm::{create_machine, load_cadence, load_cadence_from_env, run_headless, Chip8Error};

#[derive(Debug, Parser)]
#[command(name = "chip8-vm")]
#[command(about = "Run a CHIP-8 program")]
struct Args {
    #[arg(long)]
    rom: PathBuf,

    /// "coupled", "hz" (60 Hz timers at --hz) or a number of cycles per timer tick;
    /// defaults to CHIP8_CYCLES_PER_TICK.
    #[arg(long)]
    cycles_per_tick: Option<String>,

    #[arg(long)]
    seed: Option<u64>,

    #[arg(long, default_value_t = 16)]
    scale: usize,

    #[arg(long, default_value_t = 700)]
    hz: u32,

    #[arg(long, default_value_t = 60)]
    fps: usize,

    #[arg(long, default_value_t = 2000)]
    max_cycles: usize,

    #[arg(long)]
    headless: bool,
}

fn main() -> Result<(), Chip8Error> {
    env_logger::init();

    let args = Args::parse();
    let cadence = match args.cycles_per_tick.as_deref() {
        Some(profile) => load_cadence(profile, args.hz)?,
        None => load_cadence_from_env(args.hz)?,
    };
    let mut machine = create_machine(&args.rom, cadence, args.seed)?;

    if args.headless {
        let report = run_headless(&mut machine, args.max_cycles)?;
        println!(
            "headless finished: cycles={} draws={} beeps={} faults={} pc=0x{:03x}",
            report.cycles, report.draws, report.beeps, report.faults, machine.pc
        );
        return Ok(());
    }

    run_windowed(&mut machine, &args)
}

#[cfg(feature = "window")]
fn run_windowed(machine: &mut chip8_vm::Machine, args: &Args) -> Result<(), Chip8Error> {
    chip8_vm::run_window(machine, args.scale, args.hz, args.fps)
}

#[cfg(not(feature = "window"))]
fn run_windowed(_machine: &mut chip8_vm::Machine, _args: &Args) -> Result<(), Chip8Error> {
    Err(Chip8Error::InvalidArgument(
        "built without the `window` feature; pass --headless",
    ))
}
