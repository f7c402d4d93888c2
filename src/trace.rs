use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::cpu::{Cpu, Registers};
use crate::debugger::disassemble;

/// CPU state captured just before an instruction executes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceRecord {
    pub pc: u16,
    pub bytes: Vec<u8>,
    pub text: String,
    pub registers: Registers,
    pub cycles: u64,
}

impl TraceRecord {
    pub fn capture(cpu: &Cpu) -> Self {
        let pc = cpu.pc;
        let (text, len) = disassemble(&cpu.memory, pc);
        let bytes = (0..len)
            .map(|i| cpu.memory.read(pc.wrapping_add(i)))
            .collect();
        TraceRecord {
            pc,
            bytes,
            text,
            registers: cpu.registers(),
            cycles: cpu.get_cycles(),
        }
    }
}

// nestest.log layout; unofficial mnemonics take the column's leading space.
impl fmt::Display for TraceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bytes = self
            .bytes
            .iter()
            .map(|b| format!("{:02X}", b))
            .collect::<Vec<_>>()
            .join(" ");
        let text = if self.text.starts_with('*') {
            self.text.clone()
        } else {
            format!(" {}", self.text)
        };
        let r = &self.registers;
        write!(
            f,
            "{:04X}  {:<8} {:<33}A:{:02X} X:{:02X} Y:{:02X} P:{:02X} SP:{:02X} CYC:{}",
            self.pc, bytes, text, r.a, r.x, r.y, r.status, r.sp, self.cycles
        )
    }
}

pub trait TraceSink {
    fn record(&mut self, record: &TraceRecord);
}

/// Sends each line to the `log` facade at trace level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogTraceSink;

impl TraceSink for LogTraceSink {
    fn record(&mut self, record: &TraceRecord) {
        log::trace!(target: "nes_cpu::trace", "{}", record);
    }
}

/// Collects records in memory. Clones share the same buffer, so a test
/// can keep one handle and give the other to an emulator.
#[derive(Debug, Default, Clone)]
pub struct MemoryTraceSink {
    records: Rc<RefCell<Vec<TraceRecord>>>,
}

impl MemoryTraceSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<TraceRecord> {
        self.records.borrow().clone()
    }

    pub fn lines(&self) -> Vec<String> {
        self.records.borrow().iter().map(|r| r.to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.records.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.records.borrow_mut().clear();
    }
}

impl TraceSink for MemoryTraceSink {
    fn record(&mut self, record: &TraceRecord) {
        self.records.borrow_mut().push(record.clone());
    }
}
