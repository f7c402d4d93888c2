use std::fmt;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::cpu::{Cpu, StatusFlags};
use crate::memory::{Memory, MEMORY_SIZE};

pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug)]
pub enum SaveStateError {
    Io(io::Error),
    Encode(bincode::Error),
    Decode(bincode::Error),
    MemorySize(usize),
}

impl fmt::Display for SaveStateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SaveStateError::Io(e) => write!(f, "save state I/O failed: {}", e),
            SaveStateError::Encode(e) => write!(f, "failed to encode save state: {}", e),
            SaveStateError::Decode(e) => write!(f, "failed to decode save state: {}", e),
            SaveStateError::MemorySize(len) => write!(
                f,
                "save state holds {} bytes of memory, expected {}",
                len, MEMORY_SIZE
            ),
        }
    }
}

impl std::error::Error for SaveStateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SaveStateError::Io(e) => Some(e),
            SaveStateError::Encode(e) | SaveStateError::Decode(e) => Some(&**e),
            SaveStateError::MemorySize(_) => None,
        }
    }
}

impl From<io::Error> for SaveStateError {
    fn from(e: io::Error) -> Self {
        SaveStateError::Io(e)
    }
}

/// Everything needed to resume a CPU exactly where it stopped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CpuSnapshot {
    pub version: u32,
    pub a: u8,
    pub x: u8,
    pub y: u8,
    pub sp: u8,
    pub pc: u16,
    pub status: u8,
    pub opcode: u8,
    pub cycles: u64,
    pub memory: Vec<u8>,
}

impl CpuSnapshot {
    pub fn capture(cpu: &Cpu) -> Self {
        CpuSnapshot {
            version: SNAPSHOT_VERSION,
            a: cpu.a,
            x: cpu.x,
            y: cpu.y,
            sp: cpu.sp,
            pc: cpu.pc,
            status: cpu.status.bits(),
            opcode: cpu.opcode,
            cycles: cpu.get_cycles(),
            memory: cpu.memory.get_ram(),
        }
    }

    pub fn restore(&self) -> Result<Cpu, SaveStateError> {
        let mut memory = Memory::new();
        if !memory.set_ram(&self.memory) {
            return Err(SaveStateError::MemorySize(self.memory.len()));
        }

        let mut cpu = Cpu::with_memory(memory);
        cpu.a = self.a;
        cpu.x = self.x;
        cpu.y = self.y;
        cpu.sp = self.sp;
        cpu.pc = self.pc;
        cpu.status = StatusFlags::from_bits_truncate(self.status);
        cpu.opcode = self.opcode;
        cpu.set_cycles(self.cycles);
        Ok(cpu)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, SaveStateError> {
        bincode::serialize(self).map_err(SaveStateError::Encode)
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self, SaveStateError> {
        bincode::deserialize(data).map_err(SaveStateError::Decode)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), SaveStateError> {
        let data = self.to_bytes()?;
        std::fs::write(path.as_ref(), data)?;
        log::info!("Save state written to: {}", path.as_ref().display());
        Ok(())
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, SaveStateError> {
        let data = std::fs::read(path.as_ref())?;
        let snapshot = Self::from_bytes(&data)?;
        if snapshot.version != SNAPSHOT_VERSION {
            log::warn!(
                "Save state version {} differs from {}",
                snapshot.version,
                SNAPSHOT_VERSION
            );
        }
        log::info!("Save state loaded from: {}", path.as_ref().display());
        Ok(snapshot)
    }
}
