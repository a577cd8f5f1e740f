use std::path::PathBuf;

use clap::Parser;

use chip8_vm::{disassemble, Chip8Error};

#[derive(Debug, Parser)]
#[command(name = "chip8-dis")]
#[command(about = "Disassemble a CHIP-8 ROM")]
struct Args {
    rom: PathBuf,
}

fn main() -> Result<(), Chip8Error> {
    env_logger::init();

    let args = Args::parse();
    let rom_bytes = std::fs::read(&args.rom)?;

    for line in disassemble(&rom_bytes)? {
        println!("{line}");
    }

    Ok(())
}
