use super::addressing::AddressingMode;
use super::instructions::Instruction;

use AddressingMode as M;
use Instruction as I;

/// One dispatch table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Opcode {
    pub mnemonic: &'static str,
    pub instruction: Instruction,
    pub mode: AddressingMode,
    pub cycles: u8,
    /// Adds a cycle when the indexed address crosses a page.
    pub page_penalty: bool,
}

impl Opcode {
    /// Opcode byte plus operand bytes.
    pub const fn len(&self) -> u16 {
        1 + self.mode.operand_len()
    }

    pub const fn is_illegal(&self) -> bool {
        matches!(self.instruction, Instruction::Illegal)
    }
}

const fn op(mnemonic: &'static str, instruction: Instruction, mode: AddressingMode, cycles: u8) -> Opcode {
    Opcode {
        mnemonic,
        instruction,
        mode,
        cycles,
        page_penalty: false,
    }
}

// Read-type indexed access: one more cycle on page crossing.
const fn opp(mnemonic: &'static str, instruction: Instruction, mode: AddressingMode, cycles: u8) -> Opcode {
    Opcode {
        mnemonic,
        instruction,
        mode,
        cycles,
        page_penalty: true,
    }
}

const fn ill(cycles: u8) -> Opcode {
    op("???", I::Illegal, M::Implied, cycles)
}

/// Decodes an opcode byte. Every byte value has an arm, so the compiler
/// proves the table covers all 256 opcodes.
pub const fn decode(opcode: u8) -> Opcode {
    match opcode {
        0x00 => op("BRK", I::Brk, M::Immediate, 7),
        0x01 => op("ORA", I::Ora, M::IndirectX, 6),
        0x04 => op("*NOP", I::Nop, M::ZeroPage, 3),
        0x05 => op("ORA", I::Ora, M::ZeroPage, 3),
        0x06 => op("ASL", I::Asl, M::ZeroPage, 5),
        0x08 => op("PHP", I::Php, M::Implied, 3),
        0x09 => op("ORA", I::Ora, M::Immediate, 2),
        0x0A => op("ASL", I::Asl, M::Accumulator, 2),
        0x0C => op("*NOP", I::Nop, M::Absolute, 4),
        0x0D => op("ORA", I::Ora, M::Absolute, 4),
        0x0E => op("ASL", I::Asl, M::Absolute, 6),

        0x10 => op("BPL", I::Bpl, M::Relative, 2),
        0x11 => opp("ORA", I::Ora, M::IndirectY, 5),
        0x14 => op("*NOP", I::Nop, M::ZeroPageX, 4),
        0x15 => op("ORA", I::Ora, M::ZeroPageX, 4),
        0x16 => op("ASL", I::Asl, M::ZeroPageX, 6),
        0x18 => op("CLC", I::Clc, M::Implied, 2),
        0x19 => opp("ORA", I::Ora, M::AbsoluteY, 4),
        0x1A => op("*NOP", I::Nop, M::Implied, 2),
        0x1C => opp("*NOP", I::Nop, M::AbsoluteX, 4),
        0x1D => opp("ORA", I::Ora, M::AbsoluteX, 4),
        0x1E => op("ASL", I::Asl, M::AbsoluteX, 7),

        0x20 => op("JSR", I::Jsr, M::Absolute, 6),
        0x21 => op("AND", I::And, M::IndirectX, 6),
        0x24 => op("BIT", I::Bit, M::ZeroPage, 3),
        0x25 => op("AND", I::And, M::ZeroPage, 3),
        0x26 => op("ROL", I::Rol, M::ZeroPage, 5),
        0x28 => op("PLP", I::Plp, M::Implied, 4),
        0x29 => op("AND", I::And, M::Immediate, 2),
        0x2A => op("ROL", I::Rol, M::Accumulator, 2),
        0x2C => op("BIT", I::Bit, M::Absolute, 4),
        0x2D => op("AND", I::And, M::Absolute, 4),
        0x2E => op("ROL", I::Rol, M::Absolute, 6),

        0x30 => op("BMI", I::Bmi, M::Relative, 2),
        0x31 => opp("AND", I::And, M::IndirectY, 5),
        0x34 => op("*NOP", I::Nop, M::ZeroPageX, 4),
        0x35 => op("AND", I::And, M::ZeroPageX, 4),
        0x36 => op("ROL", I::Rol, M::ZeroPageX, 6),
        0x38 => op("SEC", I::Sec, M::Implied, 2),
        0x39 => opp("AND", I::And, M::AbsoluteY, 4),
        0x3A => op("*NOP", I::Nop, M::Implied, 2),
        0x3C => opp("*NOP", I::Nop, M::AbsoluteX, 4),
        0x3D => opp("AND", I::And, M::AbsoluteX, 4),
        0x3E => op("ROL", I::Rol, M::AbsoluteX, 7),

        0x40 => op("RTI", I::Rti, M::Implied, 6),
        0x41 => op("EOR", I::Eor, M::IndirectX, 6),
        0x44 => op("*NOP", I::Nop, M::ZeroPage, 3),
        0x45 => op("EOR", I::Eor, M::ZeroPage, 3),
        0x46 => op("LSR", I::Lsr, M::ZeroPage, 5),
        0x48 => op("PHA", I::Pha, M::Implied, 3),
        0x49 => op("EOR", I::Eor, M::Immediate, 2),
        0x4A => op("LSR", I::Lsr, M::Accumulator, 2),
        0x4C => op("JMP", I::Jmp, M::Absolute, 3),
        0x4D => op("EOR", I::Eor, M::Absolute, 4),
        0x4E => op("LSR", I::Lsr, M::Absolute, 6),

        0x50 => op("BVC", I::Bvc, M::Relative, 2),
        0x51 => opp("EOR", I::Eor, M::IndirectY, 5),
        0x54 => op("*NOP", I::Nop, M::ZeroPageX, 4),
        0x55 => op("EOR", I::Eor, M::ZeroPageX, 4),
        0x56 => op("LSR", I::Lsr, M::ZeroPageX, 6),
        0x58 => op("CLI", I::Cli, M::Implied, 2),
        0x59 => opp("EOR", I::Eor, M::AbsoluteY, 4),
        0x5A => op("*NOP", I::Nop, M::Implied, 2),
        0x5C => opp("*NOP", I::Nop, M::AbsoluteX, 4),
        0x5D => opp("EOR", I::Eor, M::AbsoluteX, 4),
        0x5E => op("LSR", I::Lsr, M::AbsoluteX, 7),

        0x60 => op("RTS", I::Rts, M::Implied, 6),
        0x61 => op("ADC", I::Adc, M::IndirectX, 6),
        0x64 => op("*NOP", I::Nop, M::ZeroPage, 3),
        0x65 => op("ADC", I::Adc, M::ZeroPage, 3),
        0x66 => op("ROR", I::Ror, M::ZeroPage, 5),
        0x68 => op("PLA", I::Pla, M::Implied, 4),
        0x69 => op("ADC", I::Adc, M::Immediate, 2),
        0x6A => op("ROR", I::Ror, M::Accumulator, 2),
        0x6C => op("JMP", I::Jmp, M::Indirect, 5),
        0x6D => op("ADC", I::Adc, M::Absolute, 4),
        0x6E => op("ROR", I::Ror, M::Absolute, 6),

        0x70 => op("BVS", I::Bvs, M::Relative, 2),
        0x71 => opp("ADC", I::Adc, M::IndirectY, 5),
        0x74 => op("*NOP", I::Nop, M::ZeroPageX, 4),
        0x75 => op("ADC", I::Adc, M::ZeroPageX, 4),
        0x76 => op("ROR", I::Ror, M::ZeroPageX, 6),
        0x78 => op("SEI", I::Sei, M::Implied, 2),
        0x79 => opp("ADC", I::Adc, M::AbsoluteY, 4),
        0x7A => op("*NOP", I::Nop, M::Implied, 2),
        0x7C => opp("*NOP", I::Nop, M::AbsoluteX, 4),
        0x7D => opp("ADC", I::Adc, M::AbsoluteX, 4),
        0x7E => op("ROR", I::Ror, M::AbsoluteX, 7),

        0x80 => op("*NOP", I::Nop, M::Immediate, 2),
        0x81 => op("STA", I::Sta, M::IndirectX, 6),
        0x82 => op("*NOP", I::Nop, M::Immediate, 2),
        0x84 => op("STY", I::Sty, M::ZeroPage, 3),
        0x85 => op("STA", I::Sta, M::ZeroPage, 3),
        0x86 => op("STX", I::Stx, M::ZeroPage, 3),
        0x88 => op("DEY", I::Dey, M::Implied, 2),
        0x89 => op("*NOP", I::Nop, M::Immediate, 2),
        0x8A => op("TXA", I::Txa, M::Implied, 2),
        0x8C => op("STY", I::Sty, M::Absolute, 4),
        0x8D => op("STA", I::Sta, M::Absolute, 4),
        0x8E => op("STX", I::Stx, M::Absolute, 4),

        0x90 => op("BCC", I::Bcc, M::Relative, 2),
        0x91 => op("STA", I::Sta, M::IndirectY, 6),
        0x94 => op("STY", I::Sty, M::ZeroPageX, 4),
        0x95 => op("STA", I::Sta, M::ZeroPageX, 4),
        0x96 => op("STX", I::Stx, M::ZeroPageY, 4),
        0x98 => op("TYA", I::Tya, M::Implied, 2),
        0x99 => op("STA", I::Sta, M::AbsoluteY, 5),
        0x9A => op("TXS", I::Txs, M::Implied, 2),
        0x9C => op("*NOP", I::Nop, M::AbsoluteX, 5),
        0x9D => op("STA", I::Sta, M::AbsoluteX, 5),

        0xA0 => op("LDY", I::Ldy, M::Immediate, 2),
        0xA1 => op("LDA", I::Lda, M::IndirectX, 6),
        0xA2 => op("LDX", I::Ldx, M::Immediate, 2),
        0xA4 => op("LDY", I::Ldy, M::ZeroPage, 3),
        0xA5 => op("LDA", I::Lda, M::ZeroPage, 3),
        0xA6 => op("LDX", I::Ldx, M::ZeroPage, 3),
        0xA8 => op("TAY", I::Tay, M::Implied, 2),
        0xA9 => op("LDA", I::Lda, M::Immediate, 2),
        0xAA => op("TAX", I::Tax, M::Implied, 2),
        0xAC => op("LDY", I::Ldy, M::Absolute, 4),
        0xAD => op("LDA", I::Lda, M::Absolute, 4),
        0xAE => op("LDX", I::Ldx, M::Absolute, 4),

        0xB0 => op("BCS", I::Bcs, M::Relative, 2),
        0xB1 => opp("LDA", I::Lda, M::IndirectY, 5),
        0xB4 => op("LDY", I::Ldy, M::ZeroPageX, 4),
        0xB5 => op("LDA", I::Lda, M::ZeroPageX, 4),
        0xB6 => op("LDX", I::Ldx, M::ZeroPageY, 4),
        0xB8 => op("CLV", I::Clv, M::Implied, 2),
        0xB9 => opp("LDA", I::Lda, M::AbsoluteY, 4),
        0xBA => op("TSX", I::Tsx, M::Implied, 2),
        0xBC => opp("LDY", I::Ldy, M::AbsoluteX, 4),
        0xBD => opp("LDA", I::Lda, M::AbsoluteX, 4),
        0xBE => opp("LDX", I::Ldx, M::AbsoluteY, 4),

        0xC0 => op("CPY", I::Cpy, M::Immediate, 2),
        0xC1 => op("CMP", I::Cmp, M::IndirectX, 6),
        0xC2 => op("*NOP", I::Nop, M::Immediate, 2),
        0xC4 => op("CPY", I::Cpy, M::ZeroPage, 3),
        0xC5 => op("CMP", I::Cmp, M::ZeroPage, 3),
        0xC6 => op("DEC", I::Dec, M::ZeroPage, 5),
        0xC8 => op("INY", I::Iny, M::Implied, 2),
        0xC9 => op("CMP", I::Cmp, M::Immediate, 2),
        0xCA => op("DEX", I::Dex, M::Implied, 2),
        0xCC => op("CPY", I::Cpy, M::Absolute, 4),
        0xCD => op("CMP", I::Cmp, M::Absolute, 4),
        0xCE => op("DEC", I::Dec, M::Absolute, 6),

        0xD0 => op("BNE", I::Bne, M::Relative, 2),
        0xD1 => opp("CMP", I::Cmp, M::IndirectY, 5),
        0xD4 => op("*NOP", I::Nop, M::ZeroPageX, 4),
        0xD5 => op("CMP", I::Cmp, M::ZeroPageX, 4),
        0xD6 => op("DEC", I::Dec, M::ZeroPageX, 6),
        0xD8 => op("CLD", I::Cld, M::Implied, 2),
        0xD9 => opp("CMP", I::Cmp, M::AbsoluteY, 4),
        0xDA => op("*NOP", I::Nop, M::Implied, 2),
        0xDC => opp("*NOP", I::Nop, M::AbsoluteX, 4),
        0xDD => opp("CMP", I::Cmp, M::AbsoluteX, 4),
        0xDE => op("DEC", I::Dec, M::AbsoluteX, 7),

        0xE0 => op("CPX", I::Cpx, M::Immediate, 2),
        0xE1 => op("SBC", I::Sbc, M::IndirectX, 6),
        0xE2 => op("*NOP", I::Nop, M::Immediate, 2),
        0xE4 => op("CPX", I::Cpx, M::ZeroPage, 3),
        0xE5 => op("SBC", I::Sbc, M::ZeroPage, 3),
        0xE6 => op("INC", I::Inc, M::ZeroPage, 5),
        0xE8 => op("INX", I::Inx, M::Implied, 2),
        0xE9 => op("SBC", I::Sbc, M::Immediate, 2),
        0xEA => op("NOP", I::Nop, M::Implied, 2),
        0xEB => op("*SBC", I::Sbc, M::Immediate, 2),
        0xEC => op("CPX", I::Cpx, M::Absolute, 4),
        0xED => op("SBC", I::Sbc, M::Absolute, 4),
        0xEE => op("INC", I::Inc, M::Absolute, 6),

        0xF0 => op("BEQ", I::Beq, M::Relative, 2),
        0xF1 => opp("SBC", I::Sbc, M::IndirectY, 5),
        0xF4 => op("*NOP", I::Nop, M::ZeroPageX, 4),
        0xF5 => op("SBC", I::Sbc, M::ZeroPageX, 4),
        0xF6 => op("INC", I::Inc, M::ZeroPageX, 6),
        0xF8 => op("SED", I::Sed, M::Implied, 2),
        0xF9 => opp("SBC", I::Sbc, M::AbsoluteY, 4),
        0xFA => op("*NOP", I::Nop, M::Implied, 2),
        0xFC => opp("*NOP", I::Nop, M::AbsoluteX, 4),
        0xFD => opp("SBC", I::Sbc, M::AbsoluteX, 4),
        0xFE => op("INC", I::Inc, M::AbsoluteX, 7),

        // Unassigned opcodes: no effect beyond their cycle cost.
        0x02 | 0x12 | 0x22 | 0x32 | 0x42 | 0x52 | 0x62 | 0x72 | 0x92 | 0xB2 | 0xD2 | 0xF2 => ill(2),
        0x0B | 0x2B | 0x4B | 0x6B | 0x8B | 0xAB | 0xCB => ill(2),
        0x87 | 0xA7 => ill(3),
        0x8F | 0x97 | 0xAF | 0xB7 | 0xBB | 0xBF => ill(4),
        0x07 | 0x27 | 0x47 | 0x67 | 0xC7 | 0xE7 | 0x9B | 0x9E | 0x9F | 0xB3 => ill(5),
        0x0F | 0x2F | 0x4F | 0x6F | 0xCF | 0xEF => ill(6),
        0x17 | 0x37 | 0x57 | 0x77 | 0xD7 | 0xF7 | 0x83 | 0x93 | 0xA3 => ill(6),
        0x1B | 0x3B | 0x5B | 0x7B | 0xDB | 0xFB => ill(7),
        0x1F | 0x3F | 0x5F | 0x7F | 0xDF | 0xFF => ill(7),
        0x03 | 0x13 | 0x23 | 0x33 | 0x43 | 0x53 | 0x63 | 0x73 | 0xC3 | 0xD3 | 0xE3 | 0xF3 => ill(8),
    }
}

const fn build_table() -> [Opcode; 256] {
    let mut table = [ill(2); 256];
    let mut i = 0;
    while i < 256 {
        table[i] = decode(i as u8);
        i += 1;
    }
    table
}

/// Dispatch table indexed by opcode byte.
pub static OPCODES: [Opcode; 256] = build_table();
