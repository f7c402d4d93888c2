use super::Cpu;

/// How an instruction locates its operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressingMode {
    Accumulator,
    Implied,
    Immediate,
    ZeroPage,
    ZeroPageX,
    ZeroPageY,
    Absolute,
    AbsoluteX,
    AbsoluteY,
    Indirect,
    IndirectX,
    IndirectY,
    Relative,
}

impl AddressingMode {
    /// Operand bytes following the opcode.
    pub const fn operand_len(self) -> u16 {
        match self {
            AddressingMode::Accumulator | AddressingMode::Implied => 0,
            AddressingMode::Immediate
            | AddressingMode::ZeroPage
            | AddressingMode::ZeroPageX
            | AddressingMode::ZeroPageY
            | AddressingMode::IndirectX
            | AddressingMode::IndirectY
            | AddressingMode::Relative => 1,
            AddressingMode::Absolute
            | AddressingMode::AbsoluteX
            | AddressingMode::AbsoluteY
            | AddressingMode::Indirect => 2,
        }
    }
}

/// Where the instruction reads from or writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    Implied,
    Accumulator,
    Memory(u16),
}

/// Output of the addressing phase, handed to the instruction phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolved {
    pub operand: Operand,
    pub page_crossed: bool,
}

impl Resolved {
    fn at(addr: u16) -> Self {
        Resolved {
            operand: Operand::Memory(addr),
            page_crossed: false,
        }
    }

    fn indexed(base: u16, addr: u16) -> Self {
        Resolved {
            operand: Operand::Memory(addr),
            page_crossed: (base & 0xFF00) != (addr & 0xFF00),
        }
    }
}

impl Cpu {
    /// Runs the addressing mode against the current `pc`, consuming the
    /// operand bytes. `pc` must already point past the opcode.
    pub(crate) fn resolve(&mut self, mode: AddressingMode) -> Resolved {
        match mode {
            AddressingMode::Accumulator => Resolved {
                operand: Operand::Accumulator,
                page_crossed: false,
            },
            AddressingMode::Implied => Resolved {
                operand: Operand::Implied,
                page_crossed: false,
            },
            AddressingMode::Immediate => {
                let addr = self.pc;
                self.pc = self.pc.wrapping_add(1);
                Resolved::at(addr)
            }
            AddressingMode::ZeroPage => {
                let addr = self.read_byte() as u16;
                Resolved::at(addr)
            }
            AddressingMode::ZeroPageX => {
                let base = self.read_byte();
                Resolved::at(base.wrapping_add(self.x) as u16)
            }
            AddressingMode::ZeroPageY => {
                let base = self.read_byte();
                Resolved::at(base.wrapping_add(self.y) as u16)
            }
            AddressingMode::Absolute => {
                let addr = self.read_word();
                Resolved::at(addr)
            }
            AddressingMode::AbsoluteX => {
                let base = self.read_word();
                Resolved::indexed(base, base.wrapping_add(self.x as u16))
            }
            AddressingMode::AbsoluteY => {
                let base = self.read_word();
                Resolved::indexed(base, base.wrapping_add(self.y as u16))
            }
            AddressingMode::Indirect => {
                let ptr = self.read_word();
                Resolved::at(self.memory.read_u16_page_wrapped(ptr))
            }
            AddressingMode::IndirectX => {
                let ptr = self.read_byte().wrapping_add(self.x);
                Resolved::at(self.memory.read_u16_zero_page(ptr))
            }
            AddressingMode::IndirectY => {
                let ptr = self.read_byte();
                let base = self.memory.read_u16_zero_page(ptr);
                Resolved::indexed(base, base.wrapping_add(self.y as u16))
            }
            AddressingMode::Relative => {
                let offset = self.read_byte() as i8;
                // Relative to the byte after the operand.
                let target = self.pc.wrapping_add(offset as i16 as u16);
                Resolved::indexed(self.pc, target)
            }
        }
    }

    fn read_byte(&mut self) -> u8 {
        let byte = self.memory.read(self.pc);
        self.pc = self.pc.wrapping_add(1);
        byte
    }

    fn read_word(&mut self) -> u16 {
        let low = self.read_byte() as u16;
        let high = self.read_byte() as u16;
        (high << 8) | low
    }
}
