pub mod cartridge;
pub mod config;
pub mod cpu;
pub mod debug;
pub mod debugger;
pub mod emulator;
pub mod memory;
pub mod save_state;
pub mod trace;

pub use cartridge::{Cartridge, CartridgeError};
pub use cpu::{Cpu, Registers, StatusFlags};
pub use emulator::{Emulator, RunSummary, StopReason};
pub use memory::Memory;
pub use save_state::{CpuSnapshot, SaveStateError};
