use bitflags::bitflags;

use crate::memory::Memory;

pub mod addressing;
pub mod instructions;
pub mod opcodes;

pub use addressing::{AddressingMode, Operand, Resolved};
pub use instructions::Instruction;
pub use opcodes::{decode, Opcode, OPCODES};


pub const STACK_BASE: u16 = 0x0100;
pub const NMI_VECTOR: u16 = 0xFFFA;
pub const RESET_VECTOR: u16 = 0xFFFC;
pub const IRQ_VECTOR: u16 = 0xFFFE;

/// Cycles taken by the reset, IRQ and NMI entry sequences.
pub const INTERRUPT_CYCLES: u8 = 7;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct StatusFlags: u8 {
        const CARRY = 0b00000001;
        const ZERO = 0b00000010;
        const INTERRUPT_DISABLE = 0b00000100;
        const DECIMAL = 0b00001000;
        const BREAK = 0b00010000;
        const UNUSED = 0b00100000;
        const OVERFLOW = 0b01000000;
        const NEGATIVE = 0b10000000;
    }
}

/// Read-only copy of the programmer-visible registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Registers {
    pub a: u8,
    pub x: u8,
    pub y: u8,
    pub sp: u8,
    pub pc: u16,
    pub status: u8,
}

pub struct Cpu {
    pub a: u8,      // Accumulator
    pub x: u8,      // X register
    pub y: u8,      // Y register
    pub sp: u8,     // Stack pointer, offset from $0100
    pub pc: u16,    // Program counter
    pub status: StatusFlags,
    pub opcode: u8, // Last fetched opcode
    pub memory: Memory,
    pub(crate) cycles: u64,
}

impl Cpu {
    /// Everything zeroed, memory cleared.
    pub fn new() -> Self {
        Cpu {
            a: 0,
            x: 0,
            y: 0,
            sp: 0,
            pc: 0,
            status: StatusFlags::empty(),
            opcode: 0,
            memory: Memory::new(),
            cycles: 0,
        }
    }

    pub fn with_memory(memory: Memory) -> Self {
        Cpu {
            memory,
            ..Cpu::new()
        }
    }

    /// Zeroes the registers and jumps through the reset vector. Memory is
    /// left as loaded.
    pub fn reset(&mut self) {
        self.a = 0;
        self.x = 0;
        self.y = 0;
        self.sp = 0;
        self.status = StatusFlags::empty();
        self.opcode = 0;

        self.pc = self.memory.read_u16(RESET_VECTOR);

        self.cycles = INTERRUPT_CYCLES as u64;
    }

    /// Executes one instruction and returns the cycles it took.
    pub fn step(&mut self) -> u8 {
        self.opcode = self.memory.read(self.pc);
        self.pc = self.pc.wrapping_add(1);

        let entry = OPCODES[self.opcode as usize];
        let resolved = self.resolve(entry.mode);
        let extra = self.execute(entry.instruction, resolved);

        let mut cycles = entry.cycles + extra;
        if entry.page_penalty && resolved.page_crossed {
            cycles += 1;
        }

        self.cycles += cycles as u64;
        cycles
    }

    pub fn nmi(&mut self) {
        log::debug!("NMI at PC: 0x{:04X}", self.pc);
        self.interrupt(NMI_VECTOR);
    }

    /// Maskable interrupt. Returns false, leaving state untouched, while
    /// the interrupt-disable flag is set.
    pub fn irq(&mut self) -> bool {
        if self.status.contains(StatusFlags::INTERRUPT_DISABLE) {
            return false;
        }
        log::debug!("IRQ at PC: 0x{:04X}", self.pc);
        self.interrupt(IRQ_VECTOR);
        true
    }

    fn interrupt(&mut self, vector: u16) {
        self.push_word(self.pc);
        let status = (self.status | StatusFlags::UNUSED) - StatusFlags::BREAK;
        self.push(status.bits());

        self.status.insert(StatusFlags::INTERRUPT_DISABLE);
        self.pc = self.memory.read_u16(vector);

        self.cycles += INTERRUPT_CYCLES as u64;
    }

    /// Writes bytes into memory before execution starts.
    pub fn load(&mut self, offset: u16, bytes: &[u8]) -> usize {
        self.memory.load(offset, bytes)
    }

    pub fn registers(&self) -> Registers {
        Registers {
            a: self.a,
            x: self.x,
            y: self.y,
            sp: self.sp,
            pc: self.pc,
            status: self.status.bits(),
        }
    }

    pub fn get_cycles(&self) -> u64 {
        self.cycles
    }

    pub fn set_cycles(&mut self, cycles: u64) {
        self.cycles = cycles;
    }

    pub fn flag(&self, flag: StatusFlags) -> bool {
        self.status.contains(flag)
    }

    pub(crate) fn push(&mut self, value: u8) {
        let addr = STACK_BASE | self.sp as u16;
        self.memory.write(addr, value);
        self.sp = self.sp.wrapping_sub(1);
    }

    pub(crate) fn pull(&mut self) -> u8 {
        self.sp = self.sp.wrapping_add(1);
        let addr = STACK_BASE | self.sp as u16;
        self.memory.read(addr)
    }

    // High byte first, so the word sits little-endian in memory.
    pub(crate) fn push_word(&mut self, value: u16) {
        self.push((value >> 8) as u8);
        self.push(value as u8);
    }

    pub(crate) fn pull_word(&mut self) -> u16 {
        let low = self.pull() as u16;
        let high = self.pull() as u16;
        (high << 8) | low
    }

    fn set_zero_negative_flags(&mut self, value: u8) {
        self.status.set(StatusFlags::ZERO, value == 0);
        self.status.set(StatusFlags::NEGATIVE, value & 0x80 != 0);
    }
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}
