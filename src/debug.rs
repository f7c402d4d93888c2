use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::memory::Memory;

/// 16 bytes per row: address, hex, then an ASCII gutter.
pub fn hex_dump(bytes: &[u8], base: u16) -> String {
    let mut out = String::new();
    for (row, chunk) in bytes.chunks(16).enumerate() {
        let addr = base.wrapping_add((row * 16) as u16);
        out.push_str(&format!("{:04X}: ", addr));

        for i in 0..16 {
            match chunk.get(i) {
                Some(byte) => out.push_str(&format!("{:02X} ", byte)),
                None => out.push_str("   "),
            }
        }

        out.push_str(" | ");
        for &byte in chunk {
            if (0x20..0x7F).contains(&byte) {
                out.push(byte as char);
            } else {
                out.push('.');
            }
        }
        out.push('\n');
    }
    out
}

/// Writes the whole 64K address space to `path`.
pub fn dump_memory<P: AsRef<Path>>(memory: &Memory, path: P) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(memory.as_slice())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_dump_rows() {
        let bytes: Vec<u8> = (0x41..0x41 + 20).collect();

        let dump = hex_dump(&bytes, 0x0200);
        let lines: Vec<&str> = dump.lines().collect();

        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("0200: 41 42 43"));
        assert!(lines[0].ends_with("| ABCDEFGHIJKLMNOP"));
        assert!(lines[1].starts_with("0210: 51 52 53 54 "));
        assert!(lines[1].ends_with("| QRST"));
    }

    #[test]
    fn test_non_printable_bytes() {
        let dump = hex_dump(&[0x00, 0x7F, 0x20], 0);
        assert!(dump.ends_with("| .. \n"));
    }

    #[test]
    fn test_dump_memory_writes_full_image() {
        let mut memory = Memory::new();
        memory.write(0x1234, 0xAB);
        let path = std::env::temp_dir().join(format!("nes_cpu_dump_{}.bin", std::process::id()));

        dump_memory(&memory, &path).unwrap();
        let data = std::fs::read(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(data.len(), 0x10000);
        assert_eq!(data[0x1234], 0xAB);
    }
}
