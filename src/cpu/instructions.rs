use super::addressing::{Operand, Resolved};
use super::{Cpu, StatusFlags, IRQ_VECTOR};

/// The 56 documented 6502 instructions plus the stub used for
/// unassigned opcodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    Adc,
    And,
    Asl,
    Bcc,
    Bcs,
    Beq,
    Bit,
    Bmi,
    Bne,
    Bpl,
    Brk,
    Bvc,
    Bvs,
    Clc,
    Cld,
    Cli,
    Clv,
    Cmp,
    Cpx,
    Cpy,
    Dec,
    Dex,
    Dey,
    Eor,
    Inc,
    Inx,
    Iny,
    Jmp,
    Jsr,
    Lda,
    Ldx,
    Ldy,
    Lsr,
    Nop,
    Ora,
    Pha,
    Php,
    Pla,
    Plp,
    Rol,
    Ror,
    Rti,
    Rts,
    Sbc,
    Sec,
    Sed,
    Sei,
    Sta,
    Stx,
    Sty,
    Tax,
    Tay,
    Tsx,
    Txa,
    Txs,
    Tya,
    Illegal,
}

impl Instruction {
    pub const fn is_branch(self) -> bool {
        matches!(
            self,
            Instruction::Bcc
                | Instruction::Bcs
                | Instruction::Beq
                | Instruction::Bmi
                | Instruction::Bne
                | Instruction::Bpl
                | Instruction::Bvc
                | Instruction::Bvs
        )
    }
}

impl Cpu {
    /// Executes one decoded instruction against its resolved operand.
    /// Returns cycles beyond the table's base cost (taken branches only).
    pub(crate) fn execute(&mut self, instruction: Instruction, resolved: Resolved) -> u8 {
        let operand = resolved.operand;
        match instruction {
            // Arithmetic
            Instruction::Adc => {
                let value = self.read_operand(operand);
                self.adc(value);
            }
            Instruction::Sbc => {
                let value = self.read_operand(operand);
                self.adc(!value);
            }

            // Logic
            Instruction::And => {
                self.a &= self.read_operand(operand);
                self.set_zero_negative_flags(self.a);
            }
            Instruction::Ora => {
                self.a |= self.read_operand(operand);
                self.set_zero_negative_flags(self.a);
            }
            Instruction::Eor => {
                self.a ^= self.read_operand(operand);
                self.set_zero_negative_flags(self.a);
            }
            Instruction::Bit => {
                let value = self.read_operand(operand);
                self.status.set(StatusFlags::ZERO, self.a & value == 0);
                self.status.set(StatusFlags::OVERFLOW, value & 0x40 != 0);
                self.status.set(StatusFlags::NEGATIVE, value & 0x80 != 0);
            }

            // Shifts and rotates
            Instruction::Asl => {
                let value = self.read_operand(operand);
                self.status.set(StatusFlags::CARRY, value & 0x80 != 0);
                self.write_shifted(operand, value << 1);
            }
            Instruction::Lsr => {
                let value = self.read_operand(operand);
                self.status.set(StatusFlags::CARRY, value & 0x01 != 0);
                self.write_shifted(operand, value >> 1);
            }
            Instruction::Rol => {
                let value = self.read_operand(operand);
                let carry_in = self.carry_bit();
                self.status.set(StatusFlags::CARRY, value & 0x80 != 0);
                self.write_shifted(operand, (value << 1) | carry_in);
            }
            Instruction::Ror => {
                let value = self.read_operand(operand);
                let carry_in = self.carry_bit() << 7;
                self.status.set(StatusFlags::CARRY, value & 0x01 != 0);
                self.write_shifted(operand, (value >> 1) | carry_in);
            }

            // Compare
            Instruction::Cmp => {
                let value = self.read_operand(operand);
                self.compare(self.a, value);
            }
            Instruction::Cpx => {
                let value = self.read_operand(operand);
                self.compare(self.x, value);
            }
            Instruction::Cpy => {
                let value = self.read_operand(operand);
                self.compare(self.y, value);
            }

            // Increment / decrement
            Instruction::Inc => {
                let value = self.read_operand(operand).wrapping_add(1);
                self.write_operand(operand, value);
                self.set_zero_negative_flags(value);
            }
            Instruction::Dec => {
                let value = self.read_operand(operand).wrapping_sub(1);
                self.write_operand(operand, value);
                self.set_zero_negative_flags(value);
            }
            Instruction::Inx => {
                self.x = self.x.wrapping_add(1);
                self.set_zero_negative_flags(self.x);
            }
            Instruction::Iny => {
                self.y = self.y.wrapping_add(1);
                self.set_zero_negative_flags(self.y);
            }
            Instruction::Dex => {
                self.x = self.x.wrapping_sub(1);
                self.set_zero_negative_flags(self.x);
            }
            Instruction::Dey => {
                self.y = self.y.wrapping_sub(1);
                self.set_zero_negative_flags(self.y);
            }

            // Branches
            Instruction::Bcc => return self.branch(resolved, !self.status.contains(StatusFlags::CARRY)),
            Instruction::Bcs => return self.branch(resolved, self.status.contains(StatusFlags::CARRY)),
            Instruction::Bne => return self.branch(resolved, !self.status.contains(StatusFlags::ZERO)),
            Instruction::Beq => return self.branch(resolved, self.status.contains(StatusFlags::ZERO)),
            Instruction::Bpl => return self.branch(resolved, !self.status.contains(StatusFlags::NEGATIVE)),
            Instruction::Bmi => return self.branch(resolved, self.status.contains(StatusFlags::NEGATIVE)),
            Instruction::Bvc => return self.branch(resolved, !self.status.contains(StatusFlags::OVERFLOW)),
            Instruction::Bvs => return self.branch(resolved, self.status.contains(StatusFlags::OVERFLOW)),

            // Jumps and calls
            Instruction::Jmp => {
                if let Operand::Memory(target) = operand {
                    self.pc = target;
                }
            }
            Instruction::Jsr => {
                if let Operand::Memory(target) = operand {
                    // Hardware pushes the address of the last operand byte.
                    let return_addr = self.pc.wrapping_sub(1);
                    self.push_word(return_addr);
                    self.pc = target;
                }
            }
            Instruction::Rts => {
                self.pc = self.pull_word().wrapping_add(1);
            }
            Instruction::Rti => {
                let status = self.pull();
                self.set_status_from_stack(status);
                self.pc = self.pull_word();
            }

            // Stack
            Instruction::Pha => self.push(self.a),
            Instruction::Php => {
                let status = self.status | StatusFlags::BREAK | StatusFlags::UNUSED;
                self.push(status.bits());
            }
            Instruction::Pla => {
                self.a = self.pull();
                self.set_zero_negative_flags(self.a);
            }
            Instruction::Plp => {
                let status = self.pull();
                self.set_status_from_stack(status);
            }

            // Flags
            Instruction::Clc => self.status.remove(StatusFlags::CARRY),
            Instruction::Sec => self.status.insert(StatusFlags::CARRY),
            Instruction::Cli => self.status.remove(StatusFlags::INTERRUPT_DISABLE),
            Instruction::Sei => self.status.insert(StatusFlags::INTERRUPT_DISABLE),
            Instruction::Cld => self.status.remove(StatusFlags::DECIMAL),
            Instruction::Sed => self.status.insert(StatusFlags::DECIMAL),
            Instruction::Clv => self.status.remove(StatusFlags::OVERFLOW),

            // Loads and stores
            Instruction::Lda => {
                self.a = self.read_operand(operand);
                self.set_zero_negative_flags(self.a);
            }
            Instruction::Ldx => {
                self.x = self.read_operand(operand);
                self.set_zero_negative_flags(self.x);
            }
            Instruction::Ldy => {
                self.y = self.read_operand(operand);
                self.set_zero_negative_flags(self.y);
            }
            Instruction::Sta => self.write_operand(operand, self.a),
            Instruction::Stx => self.write_operand(operand, self.x),
            Instruction::Sty => self.write_operand(operand, self.y),

            // Transfers
            Instruction::Tax => {
                self.x = self.a;
                self.set_zero_negative_flags(self.x);
            }
            Instruction::Tay => {
                self.y = self.a;
                self.set_zero_negative_flags(self.y);
            }
            Instruction::Txa => {
                self.a = self.x;
                self.set_zero_negative_flags(self.a);
            }
            Instruction::Tya => {
                self.a = self.y;
                self.set_zero_negative_flags(self.a);
            }
            Instruction::Tsx => {
                self.x = self.sp;
                self.set_zero_negative_flags(self.x);
            }
            Instruction::Txs => self.sp = self.x,

            // Control
            Instruction::Brk => {
                // The padding byte was consumed as an immediate operand,
                // so pc already points two past the opcode.
                self.push_word(self.pc);
                let status = self.status | StatusFlags::BREAK | StatusFlags::UNUSED;
                self.push(status.bits());
                self.status.insert(StatusFlags::INTERRUPT_DISABLE);
                self.pc = self.memory.read_u16(IRQ_VECTOR);
            }
            Instruction::Nop => {}
            Instruction::Illegal => {
                log::debug!(
                    "Illegal opcode 0x{:02X} at PC: 0x{:04X}",
                    self.opcode,
                    self.pc.wrapping_sub(1)
                );
            }
        }
        0
    }

    /// Reads the operand value. Implied operands read as zero.
    pub(crate) fn read_operand(&self, operand: Operand) -> u8 {
        match operand {
            Operand::Accumulator => self.a,
            Operand::Memory(addr) => self.memory.read(addr),
            Operand::Implied => 0,
        }
    }

    pub(crate) fn write_operand(&mut self, operand: Operand, value: u8) {
        match operand {
            Operand::Accumulator => self.a = value,
            Operand::Memory(addr) => self.memory.write(addr, value),
            Operand::Implied => {}
        }
    }

    fn write_shifted(&mut self, operand: Operand, value: u8) {
        self.write_operand(operand, value);
        self.set_zero_negative_flags(value);
    }

    fn carry_bit(&self) -> u8 {
        if self.status.contains(StatusFlags::CARRY) {
            1
        } else {
            0
        }
    }

    // Binary mode only: the 2A03 has no decimal adder.
    fn adc(&mut self, value: u8) {
        let result = self.a as u16 + value as u16 + self.carry_bit() as u16;

        self.status.set(StatusFlags::CARRY, result > 0xFF);
        self.status.set(
            StatusFlags::OVERFLOW,
            (self.a ^ result as u8) & (value ^ result as u8) & 0x80 != 0,
        );

        self.a = result as u8;
        self.set_zero_negative_flags(self.a);
    }

    fn compare(&mut self, register: u8, value: u8) {
        let diff = register.wrapping_sub(value);
        self.status.set(StatusFlags::CARRY, register >= value);
        self.set_zero_negative_flags(diff);
    }

    fn branch(&mut self, resolved: Resolved, condition: bool) -> u8 {
        if !condition {
            return 0;
        }
        let Operand::Memory(target) = resolved.operand else {
            return 0;
        };
        self.pc = target;
        if resolved.page_crossed {
            2
        } else {
            1
        }
    }

    // PLP and RTI replace the whole register, B and bit 5 included.
    fn set_status_from_stack(&mut self, value: u8) {
        self.status = StatusFlags::from_bits_truncate(value);
    }
}
