use std::env;
use std::error::Error;
use std::process;

use nes_cpu::config::{self, Command, RunConfig};
use nes_cpu::trace::LogTraceSink;
use nes_cpu::{Cartridge, CpuSnapshot, Emulator};

fn main() {
    let config = match config::parse_args(env::args().skip(1), RunConfig::from_env()) {
        Ok(Command::Run(config)) => config,
        Ok(Command::Help) => {
            println!("{}", config::USAGE);
            return;
        }
        Err(e) => {
            eprintln!("{}", e);
            eprintln!("{}", config::USAGE);
            process::exit(2);
        }
    };

    // --trace needs the trace target enabled even without RUST_LOG.
    let default_filter = if config.quiet {
        "error"
    } else if config.trace {
        "info,nes_cpu::trace=trace"
    } else {
        "info"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    if let Err(e) = run(&config) {
        log::error!("{}", e);
        process::exit(1);
    }
}

fn load_emulator(config: &RunConfig) -> Result<Emulator, Box<dyn Error>> {
    if let Some(path) = &config.load_state {
        let cpu = CpuSnapshot::load_from_file(path)?.restore()?;
        return Ok(Emulator::new(cpu));
    }

    let rom_arg = config.rom.as_deref().ok_or(config::ConfigError::MissingRom)?;
    let rom_path = config::resolve_rom_path(rom_arg)?;
    log::info!("Loading ROM: {}", rom_path.display());
    let cartridge = Cartridge::load(&rom_path)?;
    Ok(Emulator::from_cartridge(&cartridge))
}

fn run(config: &RunConfig) -> Result<(), Box<dyn Error>> {
    let mut emulator = load_emulator(config)?;

    if let Some(pc) = config.start_pc {
        emulator.cpu_mut().pc = pc;
    }
    if config.trace {
        emulator.set_tracer(Box::new(LogTraceSink));
    }
    for &addr in &config.breakpoints {
        emulator.debugger_mut().add_breakpoint(addr);
    }
    emulator.set_nmi_period(config.nmi_every);
    emulator.set_irq_period(config.irq_every);

    log::info!("Starting at PC=${:04X}", emulator.cpu().pc);
    let summary = emulator.run(config.steps);
    log::info!("{}", summary);
    log::info!("\n{}", emulator.debugger().format_cpu_state(emulator.cpu()));

    if let Some((start, len)) = config.dump {
        print!(
            "{}",
            emulator
                .debugger()
                .format_memory(&emulator.cpu().memory, start, len)
        );
    }

    if let Some(path) = &config.save_state {
        CpuSnapshot::capture(emulator.cpu()).save_to_file(path)?;
    }

    Ok(())
}
