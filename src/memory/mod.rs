/// Size of the CPU address space ($0000-$FFFF).
pub const MEMORY_SIZE: usize = 0x10000;

/// Flat 64 KiB view of the CPU address bus.
///
/// Mirrored RAM and memory-mapped registers are addressed positionally;
/// whoever loads data here decides what lives where.
#[derive(Clone)]
pub struct Memory {
    pub(crate) ram: Box<[u8; MEMORY_SIZE]>,
}

impl Memory {
    pub fn new() -> Self {
        Memory {
            ram: Box::new([0; MEMORY_SIZE]),
        }
    }

    pub fn read(&self, addr: u16) -> u8 {
        self.ram[addr as usize]
    }

    pub fn write(&mut self, addr: u16, data: u8) {
        self.ram[addr as usize] = data;
    }

    /// Little-endian word; the high byte comes from `addr + 1` (wrapping at $FFFF).
    pub fn read_u16(&self, addr: u16) -> u16 {
        let low = self.read(addr) as u16;
        let high = self.read(addr.wrapping_add(1)) as u16;
        (high << 8) | low
    }

    /// Word read where the high byte never leaves the page of `addr`.
    /// $xxFF pulls its high byte from $xx00, as JMP ($xxFF) does on the 6502.
    pub fn read_u16_page_wrapped(&self, addr: u16) -> u16 {
        let low = self.read(addr) as u16;
        let high_addr = (addr & 0xFF00) | (addr.wrapping_add(1) & 0x00FF);
        let high = self.read(high_addr) as u16;
        (high << 8) | low
    }

    /// Pointer fetch from zero page; $FF pairs with $00.
    pub fn read_u16_zero_page(&self, ptr: u8) -> u16 {
        let low = self.read(ptr as u16) as u16;
        let high = self.read(ptr.wrapping_add(1) as u16) as u16;
        (high << 8) | low
    }

    pub fn write_u16(&mut self, addr: u16, value: u16) {
        self.write(addr, value as u8);
        self.write(addr.wrapping_add(1), (value >> 8) as u8);
    }

    /// Copies `bytes` in at `offset`. Anything past $FFFF is dropped;
    /// returns how many bytes landed.
    pub fn load(&mut self, offset: u16, bytes: &[u8]) -> usize {
        let start = offset as usize;
        let count = bytes.len().min(MEMORY_SIZE - start);
        self.ram[start..start + count].copy_from_slice(&bytes[..count]);
        count
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.ram[..]
    }

    // Save state methods
    pub fn get_ram(&self) -> Vec<u8> {
        self.ram.to_vec()
    }

    /// Replaces the whole address space. Returns false (and leaves memory
    /// alone) when `ram` is not exactly 64 KiB.
    pub fn set_ram(&mut self, ram: &[u8]) -> bool {
        if ram.len() != MEMORY_SIZE {
            return false;
        }
        self.ram.copy_from_slice(ram);
        true
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}
