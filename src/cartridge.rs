use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use crate::memory::Memory;

pub const HEADER_SIZE: usize = 16;
pub const TRAINER_SIZE: usize = 512;
pub const PRG_BANK_SIZE: usize = 16384;
pub const CHR_BANK_SIZE: usize = 8192;

/// CPU address where PRG ROM starts.
pub const PRG_ROM_START: u16 = 0x8000;

const MAGIC: &[u8; 4] = b"NES\x1a";

#[derive(Debug)]
pub enum CartridgeError {
    Io(io::Error),
    InvalidMagic,
    Truncated {
        section: &'static str,
        expected: usize,
        actual: usize,
    },
    MissingPrgRom,
}

impl fmt::Display for CartridgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CartridgeError::Io(e) => write!(f, "failed to read ROM file: {}", e),
            CartridgeError::InvalidMagic => write!(f, "invalid NES file format"),
            CartridgeError::Truncated {
                section,
                expected,
                actual,
            } => write!(
                f,
                "ROM truncated in {}: expected {} bytes, found {}",
                section, expected, actual
            ),
            CartridgeError::MissingPrgRom => write!(f, "ROM declares no PRG banks"),
        }
    }
}

impl std::error::Error for CartridgeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CartridgeError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for CartridgeError {
    fn from(e: io::Error) -> Self {
        CartridgeError::Io(e)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mirroring {
    Horizontal,
    Vertical,
    FourScreen,
}

/// An iNES image. Only PRG ROM is used by the CPU; CHR data is kept for
/// inspection.
#[derive(Debug, Clone)]
pub struct Cartridge {
    prg_rom: Vec<u8>,
    chr_rom: Vec<u8>,
    mapper: u8,
    mirroring: Mirroring,
    has_trainer: bool,
}

impl Cartridge {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, CartridgeError> {
        let mut file = File::open(path)?;
        let mut data = Vec::new();
        file.read_to_end(&mut data)?;

        Self::from_bytes(&data)
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self, CartridgeError> {
        if data.len() < HEADER_SIZE {
            if data.len() >= 4 && &data[0..4] != MAGIC {
                return Err(CartridgeError::InvalidMagic);
            }
            return Err(CartridgeError::Truncated {
                section: "header",
                expected: HEADER_SIZE,
                actual: data.len(),
            });
        }
        if &data[0..4] != MAGIC {
            return Err(CartridgeError::InvalidMagic);
        }

        let prg_rom_size = data[4] as usize * PRG_BANK_SIZE;
        let chr_rom_size = data[5] as usize * CHR_BANK_SIZE;
        let flags6 = data[6];
        let flags7 = data[7];

        if prg_rom_size == 0 {
            return Err(CartridgeError::MissingPrgRom);
        }

        let mirroring = if flags6 & 0x08 != 0 {
            Mirroring::FourScreen
        } else if flags6 & 0x01 != 0 {
            Mirroring::Vertical
        } else {
            Mirroring::Horizontal
        };

        let has_trainer = flags6 & 0x04 != 0;
        let mapper = (flags7 & 0xF0) | (flags6 >> 4);

        let prg_rom_start = HEADER_SIZE + if has_trainer { TRAINER_SIZE } else { 0 };
        let chr_rom_start = prg_rom_start + prg_rom_size;

        let prg_rom = section(data, "PRG ROM", prg_rom_start, prg_rom_size)?.to_vec();
        let chr_rom = section(data, "CHR ROM", chr_rom_start, chr_rom_size)?.to_vec();

        log::info!(
            "Cartridge loaded - Mapper: {}, PRG ROM: {} bytes, CHR ROM: {} bytes, Mirroring: {:?}",
            mapper,
            prg_rom.len(),
            chr_rom.len(),
            mirroring
        );

        Ok(Cartridge {
            prg_rom,
            chr_rom,
            mapper,
            mirroring,
            has_trainer,
        })
    }

    /// Copies PRG ROM into CPU memory at $8000. A single 16K bank is
    /// mirrored into $C000 so the vectors resolve. Returns bytes mapped.
    pub fn map_into(&self, memory: &mut Memory) -> usize {
        if self.mapper != 0 {
            log::warn!(
                "Mapper {} is not emulated; mapping the first 32K of PRG ROM flat",
                self.mapper
            );
        }

        let window = &self.prg_rom[..self.prg_rom.len().min(2 * PRG_BANK_SIZE)];
        let mut mapped = memory.load(PRG_ROM_START, window);
        if window.len() == PRG_BANK_SIZE {
            mapped += memory.load(PRG_ROM_START + PRG_BANK_SIZE as u16, window);
        }
        if self.prg_rom.len() > window.len() {
            log::warn!(
                "PRG ROM has {} bytes; only {} mapped",
                self.prg_rom.len(),
                window.len()
            );
        }
        mapped
    }

    pub fn prg_rom(&self) -> &[u8] {
        &self.prg_rom
    }

    pub fn chr_rom(&self) -> &[u8] {
        &self.chr_rom
    }

    pub fn mapper(&self) -> u8 {
        self.mapper
    }

    pub fn mirroring(&self) -> Mirroring {
        self.mirroring
    }

    pub fn has_trainer(&self) -> bool {
        self.has_trainer
    }
}

fn section<'a>(
    data: &'a [u8],
    name: &'static str,
    start: usize,
    len: usize,
) -> Result<&'a [u8], CartridgeError> {
    let available = data.len().saturating_sub(start);
    if available < len {
        return Err(CartridgeError::Truncated {
            section: name,
            expected: len,
            actual: available,
        });
    }
    Ok(&data[start..start + len])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ines(prg_banks: u8, chr_banks: u8, flags6: u8, flags7: u8) -> Vec<u8> {
        let mut data = vec![0x4E, 0x45, 0x53, 0x1A, prg_banks, chr_banks, flags6, flags7];
        data.resize(HEADER_SIZE, 0);
        if flags6 & 0x04 != 0 {
            data.extend(std::iter::repeat(0xEE).take(TRAINER_SIZE));
        }
        for i in 0..prg_banks as usize * PRG_BANK_SIZE {
            data.push((i % 251) as u8);
        }
        data.extend(std::iter::repeat(0xCC).take(chr_banks as usize * CHR_BANK_SIZE));
        data
    }

    #[test]
    fn test_parses_header() {
        let cart = Cartridge::from_bytes(&ines(2, 1, 0x11, 0x20)).unwrap();

        assert_eq!(cart.prg_rom().len(), 2 * PRG_BANK_SIZE);
        assert_eq!(cart.chr_rom().len(), CHR_BANK_SIZE);
        assert_eq!(cart.mapper(), 0x21);
        assert_eq!(cart.mirroring(), Mirroring::Vertical);
        assert!(!cart.has_trainer());
    }

    #[test]
    fn test_skips_trainer() {
        let cart = Cartridge::from_bytes(&ines(1, 0, 0x04, 0)).unwrap();

        assert!(cart.has_trainer());
        assert_eq!(cart.prg_rom()[0], 0);
        assert_eq!(cart.prg_rom()[1], 1);
    }

    #[test]
    fn test_four_screen_wins_over_vertical() {
        let cart = Cartridge::from_bytes(&ines(1, 0, 0x09, 0)).unwrap();
        assert_eq!(cart.mirroring(), Mirroring::FourScreen);
    }

    #[test]
    fn test_rejects_bad_magic() {
        let mut data = ines(1, 0, 0, 0);
        data[3] = 0x00;
        assert!(matches!(
            Cartridge::from_bytes(&data),
            Err(CartridgeError::InvalidMagic)
        ));
    }

    #[test]
    fn test_rejects_short_header() {
        let err = Cartridge::from_bytes(b"NES\x1a\x01").unwrap_err();
        assert!(matches!(
            err,
            CartridgeError::Truncated {
                section: "header",
                expected: 16,
                actual: 5
            }
        ));
    }

    #[test]
    fn test_rejects_truncated_prg() {
        let mut data = ines(2, 0, 0, 0);
        data.truncate(HEADER_SIZE + PRG_BANK_SIZE);
        let err = Cartridge::from_bytes(&data).unwrap_err();
        assert!(matches!(
            err,
            CartridgeError::Truncated {
                section: "PRG ROM",
                ..
            }
        ));
        assert!(err.to_string().contains("PRG ROM"));
    }

    #[test]
    fn test_rejects_missing_prg() {
        assert!(matches!(
            Cartridge::from_bytes(&ines(0, 1, 0, 0)),
            Err(CartridgeError::MissingPrgRom)
        ));
    }

    #[test]
    fn test_single_bank_is_mirrored() {
        let mut data = ines(1, 0, 0, 0);
        let reset = HEADER_SIZE + 0x3FFC;
        data[reset] = 0x34;
        data[reset + 1] = 0x92;
        let cart = Cartridge::from_bytes(&data).unwrap();
        let mut memory = Memory::new();

        let mapped = cart.map_into(&mut memory);

        assert_eq!(mapped, 2 * PRG_BANK_SIZE);
        assert_eq!(memory.read(0x8001), memory.read(0xC001));
        assert_eq!(memory.read_u16(0xFFFC), 0x9234);
    }

    #[test]
    fn test_two_banks_fill_upper_half() {
        let cart = Cartridge::from_bytes(&ines(2, 0, 0, 0)).unwrap();
        let mut memory = Memory::new();

        assert_eq!(cart.map_into(&mut memory), 2 * PRG_BANK_SIZE);
        assert_eq!(memory.read(0xC000), (PRG_BANK_SIZE % 251) as u8);
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let path = std::env::temp_dir().join("nes_cpu_missing_rom.nes");
        let _ = std::fs::remove_file(&path);
        assert!(matches!(Cartridge::load(&path), Err(CartridgeError::Io(_))));
    }
}
