use std::env;
use std::error::Error;
use std::path::PathBuf;
use std::process;

use nes_cpu::config::{self, parse_address, parse_number, DEFAULT_STEPS};
use nes_cpu::{debug, Cartridge, Emulator};

// Runs a ROM headless, then prints a slice of the CPU address space.
//   cargo run --release --bin dump_memory -- roms/nestest.nes --steps 5000 --start 0x0000 --len 0x0200
// Env fallbacks: NES_CPU_STEPS, DUMP_START, DUMP_LEN

struct Args {
    rom: String,
    steps: u64,
    start: u16,
    len: usize,
    nonzero_only: bool,
    out: Option<PathBuf>,
}

fn parse_args() -> Result<Args, String> {
    let mut args = env::args().skip(1);
    let mut rom: Option<String> = None;
    let mut steps: Option<u64> = None;
    let mut start: Option<u16> = None;
    let mut len: Option<usize> = None;
    let mut nonzero_only = false;
    let mut out: Option<PathBuf> = None;

    while let Some(a) = args.next() {
        let mut value = || args.next().ok_or_else(|| format!("{} needs a value", a));
        match a.as_str() {
            "--steps" => steps = Some(parse_number(&value()?).ok_or("--steps: bad number")?),
            "--start" => start = Some(parse_address(&value()?).ok_or("--start: bad address")?),
            "--len" | "--length" => {
                len = Some(parse_number(&value()?).ok_or("--len: bad number")? as usize)
            }
            "--out" => out = Some(PathBuf::from(value()?)),
            "--nonzero" | "--nz" => nonzero_only = true,
            _ => {
                if rom.is_none() {
                    rom = Some(a.clone());
                }
            }
        }
    }

    let env_number = |key: &str| env::var(key).ok().and_then(|s| parse_number(&s));

    let rom = rom.ok_or("ROM path is required")?;
    let steps = steps
        .or_else(|| env_number("NES_CPU_STEPS"))
        .unwrap_or(DEFAULT_STEPS);
    let start = start
        .or_else(|| env::var("DUMP_START").ok().and_then(|s| parse_address(&s)))
        .unwrap_or(0x0000);
    let len = len
        .or_else(|| env_number("DUMP_LEN").map(|n| n as usize))
        .unwrap_or(0x0200);

    Ok(Args {
        rom,
        steps,
        start,
        len,
        nonzero_only,
        out,
    })
}

fn run(args: &Args) -> Result<(), Box<dyn Error>> {
    let rom_path = config::resolve_rom_path(&args.rom)?;
    let cartridge = Cartridge::load(&rom_path)?;
    let mut emu = Emulator::from_cartridge(&cartridge);
    let summary = emu.run(args.steps);

    let memory = &emu.cpu().memory;
    if let Some(path) = &args.out {
        debug::dump_memory(memory, path)?;
        println!("Wrote 64K image to {}", path.display());
    }

    let ram = memory.as_slice();
    let start = args.start as usize;
    let end = start.saturating_add(args.len).min(ram.len());
    println!(
        "Memory dump: start=0x{:04X} len=0x{:04X} ({}){}",
        start,
        end - start,
        summary,
        if args.nonzero_only { " [nonzero only]" } else { "" }
    );

    let mut addr = start;
    while addr < end {
        let line_end = (addr + 16).min(end);
        let row = &ram[addr..line_end];
        if !args.nonzero_only || row.iter().any(|&b| b != 0) {
            print!("{}", debug::hex_dump(row, addr as u16));
        }
        addr = line_end;
    }
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = match parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{}", e);
            process::exit(2);
        }
    };

    if let Err(e) = run(&args) {
        eprintln!("{}", e);
        process::exit(1);
    }
}
