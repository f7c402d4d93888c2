use std::collections::{BTreeMap, VecDeque};
use std::fmt;

use crate::cpu::{AddressingMode, Cpu, OPCODES};
use crate::debug::hex_dump;
use crate::memory::Memory;
use crate::trace::TraceRecord;

pub const DEFAULT_HISTORY: usize = 1000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Breakpoint {
    pub address: u16,
    pub enabled: bool,
    pub hit_count: u32,
}

/// Disassembles the instruction at `addr`. Returns the text and the
/// instruction length in bytes. Branch targets are resolved to absolute
/// addresses.
pub fn disassemble(memory: &Memory, addr: u16) -> (String, u16) {
    let entry = OPCODES[memory.read(addr) as usize];
    let byte = memory.read(addr.wrapping_add(1));
    let word = memory.read_u16(addr.wrapping_add(1));

    let operand = match entry.mode {
        AddressingMode::Implied => String::new(),
        AddressingMode::Accumulator => "A".to_string(),
        AddressingMode::Immediate => format!("#${:02X}", byte),
        AddressingMode::ZeroPage => format!("${:02X}", byte),
        AddressingMode::ZeroPageX => format!("${:02X},X", byte),
        AddressingMode::ZeroPageY => format!("${:02X},Y", byte),
        AddressingMode::Absolute => format!("${:04X}", word),
        AddressingMode::AbsoluteX => format!("${:04X},X", word),
        AddressingMode::AbsoluteY => format!("${:04X},Y", word),
        AddressingMode::Indirect => format!("(${:04X})", word),
        AddressingMode::IndirectX => format!("(${:02X},X)", byte),
        AddressingMode::IndirectY => format!("(${:02X}),Y", byte),
        AddressingMode::Relative => {
            let target = addr
                .wrapping_add(2)
                .wrapping_add(byte as i8 as i16 as u16);
            format!("${:04X}", target)
        }
    };

    let text = if operand.is_empty() {
        entry.mnemonic.to_string()
    } else {
        format!("{} {}", entry.mnemonic, operand)
    };
    (text, entry.len())
}

pub struct Debugger {
    breakpoints: BTreeMap<u16, Breakpoint>,
    history: VecDeque<TraceRecord>,
    history_size: usize,
    instruction_count: u64,
}

impl Debugger {
    pub fn new() -> Self {
        Self::with_history(DEFAULT_HISTORY)
    }

    /// A history size of zero disables recording.
    pub fn with_history(history_size: usize) -> Self {
        Self {
            breakpoints: BTreeMap::new(),
            history: VecDeque::with_capacity(history_size.min(DEFAULT_HISTORY)),
            history_size,
            instruction_count: 0,
        }
    }

    pub fn add_breakpoint(&mut self, address: u16) {
        self.breakpoints.insert(
            address,
            Breakpoint {
                address,
                enabled: true,
                hit_count: 0,
            },
        );
        log::debug!("Breakpoint added at 0x{:04X}", address);
    }

    pub fn remove_breakpoint(&mut self, address: u16) -> bool {
        let removed = self.breakpoints.remove(&address).is_some();
        if removed {
            log::debug!("Breakpoint removed from 0x{:04X}", address);
        }
        removed
    }

    /// Flips a breakpoint on or off. Returns the new state, or `None` if
    /// there is no breakpoint at `address`.
    pub fn toggle_breakpoint(&mut self, address: u16) -> Option<bool> {
        let bp = self.breakpoints.get_mut(&address)?;
        bp.enabled = !bp.enabled;
        Some(bp.enabled)
    }

    pub fn breakpoints(&self) -> impl Iterator<Item = &Breakpoint> {
        self.breakpoints.values()
    }

    pub fn has_breakpoints(&self) -> bool {
        self.breakpoints.values().any(|bp| bp.enabled)
    }

    pub fn check_breakpoint(&mut self, pc: u16) -> bool {
        if let Some(bp) = self.breakpoints.get_mut(&pc) {
            if bp.enabled {
                bp.hit_count += 1;
                log::debug!(
                    "Breakpoint hit at 0x{:04X} (hit count: {})",
                    pc,
                    bp.hit_count
                );
                return true;
            }
        }
        false
    }

    /// Zero turns recording off. Shrinking drops the oldest records.
    pub fn set_history_size(&mut self, history_size: usize) {
        self.history_size = history_size;
        while self.history.len() > history_size {
            self.history.pop_front();
        }
    }

    pub fn records_history(&self) -> bool {
        self.history_size > 0
    }

    pub fn count_instruction(&mut self) {
        self.instruction_count += 1;
    }

    pub fn record(&mut self, record: TraceRecord) {
        self.count_instruction();
        if self.history_size == 0 {
            return;
        }
        if self.history.len() == self.history_size {
            self.history.pop_front();
        }
        self.history.push_back(record);
    }

    pub fn history(&self) -> impl Iterator<Item = &TraceRecord> {
        self.history.iter()
    }

    pub fn instruction_count(&self) -> u64 {
        self.instruction_count
    }

    pub fn format_cpu_state(&self, cpu: &Cpu) -> String {
        let p = cpu.status.bits();
        let flag = |bit: u8, c: char| if p & bit != 0 { c } else { '-' };
        format!(
            "PC: {:04X}  A: {:02X}  X: {:02X}  Y: {:02X}  SP: {:02X}\n\
             P: {:02X} [{}{}{}{}{}{}{}{}]\n\
             Cycles: {}  Instructions: {}",
            cpu.pc,
            cpu.a,
            cpu.x,
            cpu.y,
            cpu.sp,
            p,
            flag(0x80, 'N'),
            flag(0x40, 'V'),
            flag(0x20, 'U'),
            flag(0x10, 'B'),
            flag(0x08, 'D'),
            flag(0x04, 'I'),
            flag(0x02, 'Z'),
            flag(0x01, 'C'),
            cpu.get_cycles(),
            self.instruction_count
        )
    }

    pub fn format_memory(&self, memory: &Memory, address: u16, length: usize) -> String {
        let start = address as usize;
        let end = start.saturating_add(length).min(memory.as_slice().len());
        hex_dump(&memory.as_slice()[start..end], address)
    }

    /// The last `count` trace lines, oldest first.
    pub fn format_trace(&self, count: usize) -> String {
        let skip = self.history.len().saturating_sub(count);
        self.history
            .iter()
            .skip(skip)
            .map(|r| r.to_string())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Default for Debugger {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Debugger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Breakpoints: {} | History: {}/{} | Instructions: {}",
            self.breakpoints.len(),
            self.history.len(),
            self.history_size,
            self.instruction_count
        )
    }
}
