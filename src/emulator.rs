use std::fmt;

use crate::cartridge::Cartridge;
use crate::cpu::Cpu;
use crate::debugger::Debugger;
use crate::memory::Memory;
use crate::trace::{TraceRecord, TraceSink};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    StepLimit,
    Breakpoint(u16),
    /// An instruction left pc where it was (a branch or jump to itself).
    Trap(u16),
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::StepLimit => write!(f, "step limit reached"),
            StopReason::Breakpoint(pc) => write!(f, "breakpoint at ${:04X}", pc),
            StopReason::Trap(pc) => write!(f, "trapped at ${:04X}", pc),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub steps: u64,
    pub cycles: u64,
    pub pc: u16,
    pub reason: StopReason,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} after {} instructions ({} cycles), PC=${:04X}",
            self.reason, self.steps, self.cycles, self.pc
        )
    }
}

// Fires every `period` CPU cycles. A masked IRQ stays pending until the
// CPU accepts it.
#[derive(Debug, Clone, Copy)]
struct Periodic {
    period: u64,
    next_at: u64,
    pending: bool,
    count: u64,
}

impl Periodic {
    fn new(period: u64, now: u64) -> Self {
        Periodic {
            period,
            next_at: now.saturating_add(period),
            pending: false,
            count: 0,
        }
    }

    fn poll(&mut self, now: u64) {
        if now >= self.next_at {
            self.pending = true;
            self.next_at = now.saturating_add(self.period);
        }
    }
}

/// Drives a `Cpu`: tracing, breakpoints, periodic interrupts and trap
/// detection. Trace history is off until `debugger_mut().set_history_size`
/// turns it on.
pub struct Emulator {
    cpu: Cpu,
    tracer: Option<Box<dyn TraceSink>>,
    debugger: Debugger,
    nmi: Option<Periodic>,
    irq: Option<Periodic>,
    steps: u64,
}

impl Emulator {
    pub fn new(cpu: Cpu) -> Self {
        Emulator {
            cpu,
            tracer: None,
            debugger: Debugger::with_history(0),
            nmi: None,
            irq: None,
            steps: 0,
        }
    }

    /// Maps the cartridge's PRG ROM into fresh memory and resets.
    pub fn from_cartridge(cartridge: &Cartridge) -> Self {
        let mut memory = Memory::new();
        let mapped = cartridge.map_into(&mut memory);
        log::info!("Mapped {} bytes of PRG ROM", mapped);

        let mut emulator = Emulator::new(Cpu::with_memory(memory));
        emulator.reset();
        emulator
    }

    pub fn set_tracer(&mut self, tracer: Box<dyn TraceSink>) {
        self.tracer = Some(tracer);
    }

    /// Raise NMI every `period` cycles; `None` stops it.
    pub fn set_nmi_period(&mut self, period: Option<u64>) {
        let now = self.cpu.get_cycles();
        self.nmi = period.filter(|&p| p > 0).map(|p| Periodic::new(p, now));
    }

    pub fn set_irq_period(&mut self, period: Option<u64>) {
        let now = self.cpu.get_cycles();
        self.irq = period.filter(|&p| p > 0).map(|p| Periodic::new(p, now));
    }

    pub fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    pub fn cpu_mut(&mut self) -> &mut Cpu {
        &mut self.cpu
    }

    pub fn debugger(&self) -> &Debugger {
        &self.debugger
    }

    pub fn debugger_mut(&mut self) -> &mut Debugger {
        &mut self.debugger
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn nmi_count(&self) -> u64 {
        self.nmi.map(|n| n.count).unwrap_or(0)
    }

    pub fn irq_count(&self) -> u64 {
        self.irq.map(|n| n.count).unwrap_or(0)
    }

    pub fn reset(&mut self) {
        self.cpu.reset();
        let now = self.cpu.get_cycles();
        for timer in [&mut self.nmi, &mut self.irq].into_iter().flatten() {
            *timer = Periodic::new(timer.period, now);
        }
    }

    pub fn nmi(&mut self) {
        self.cpu.nmi();
    }

    pub fn irq(&mut self) -> bool {
        self.cpu.irq()
    }

    /// One instruction, then any periodic interrupt that came due.
    /// Returns the instruction's cycles.
    pub fn step(&mut self) -> u8 {
        if self.tracer.is_some() || self.debugger.records_history() {
            let record = TraceRecord::capture(&self.cpu);
            if let Some(tracer) = self.tracer.as_mut() {
                tracer.record(&record);
            }
            self.debugger.record(record);
        } else {
            self.debugger.count_instruction();
        }

        let cycles = self.cpu.step();
        self.steps += 1;
        self.service_interrupts();
        cycles
    }

    fn service_interrupts(&mut self) {
        let now = self.cpu.get_cycles();

        if let Some(nmi) = self.nmi.as_mut() {
            nmi.poll(now);
            if nmi.pending {
                nmi.pending = false;
                nmi.count += 1;
                self.cpu.nmi();
            }
        }

        if let Some(irq) = self.irq.as_mut() {
            irq.poll(now);
            if irq.pending && self.cpu.irq() {
                irq.pending = false;
                irq.count += 1;
            }
        }
    }

    /// Steps until `max_steps` instructions ran, an enabled breakpoint is
    /// reached, or the program traps. A breakpoint at the starting pc does
    /// not stop the run, so a stopped run can be resumed. Trap detection is
    /// off while periodic interrupts are configured, since idle loops then
    /// wait for the interrupt.
    pub fn run(&mut self, max_steps: u64) -> RunSummary {
        let start_cycles = self.cpu.get_cycles();
        let detect_traps = self.nmi.is_none() && self.irq.is_none();
        let mut steps = 0;
        let mut reason = StopReason::StepLimit;

        while steps < max_steps {
            let pc = self.cpu.pc;
            if steps > 0 && self.debugger.check_breakpoint(pc) {
                reason = StopReason::Breakpoint(pc);
                break;
            }

            self.step();
            steps += 1;

            if detect_traps && self.cpu.pc == pc {
                log::debug!("Trapped at 0x{:04X} after {} instructions", pc, self.steps);
                reason = StopReason::Trap(pc);
                break;
            }
        }

        RunSummary {
            steps,
            cycles: self.cpu.get_cycles() - start_cycles,
            pc: self.cpu.pc,
            reason,
        }
    }
}
