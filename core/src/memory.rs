use std::ops::Range;

use crate::constants::{MEMORY_SIZE, PROGRAM_START, SPRITE_SHEET};
use crate::error::{Error, Result};

// NB. addresses are usize rather than u16 so that I + offset can't silently wrap

/// # Memory
/// 4096 bytes of flat addressable memory.
///
/// ```text
/// 0x000..0x050  sprite sheet
/// 0x050..0x200  reserved for the interpreter
/// 0x200..0x1000 program and data
/// ```
///
/// Reads are allowed anywhere in memory; writes only from `PROGRAM_START` upwards so that
/// programs can't clobber the sprite sheet.
#[derive(Copy, Clone)]
pub struct Memory {
    bytes: [u8; MEMORY_SIZE],
}

impl Memory {
    /// Zeroed memory with the sprite sheet at 0x000
    pub fn new() -> Self {
        let mut bytes = [0; MEMORY_SIZE];
        bytes[..SPRITE_SHEET.len()].copy_from_slice(&SPRITE_SHEET);
        Memory { bytes }
    }

    pub fn read_byte(&self, addr: usize) -> Result<u8> {
        self.bytes
            .get(addr)
            .copied()
            .ok_or(Error::AddressOutOfRange { addr, len: 1 })
    }

    pub fn write_byte(&mut self, addr: usize, value: u8) -> Result<()> {
        self.write_bytes(addr, &[value])
    }

    /// Reads the big-endian word at `addr..=addr + 1`
    pub fn read_word(&self, addr: usize) -> Result<u16> {
        let word = self.bytes(addr, 2)?;
        Ok(u16::from_be_bytes([word[0], word[1]]))
    }

    /// Borrows `len` bytes starting at `addr`
    pub fn bytes(&self, addr: usize, len: usize) -> Result<&[u8]> {
        let range = Self::range(addr, len)?;
        Ok(&self.bytes[range])
    }

    /// Writes all of `data` starting at `addr`.
    /// The whole range is checked before anything is written.
    pub fn write_bytes(&mut self, addr: usize, data: &[u8]) -> Result<()> {
        if addr < PROGRAM_START as usize {
            return Err(Error::ProtectedWrite { addr });
        }
        let range = Self::range(addr, data.len())?;
        self.bytes[range].copy_from_slice(data);
        Ok(())
    }

    fn range(addr: usize, len: usize) -> Result<Range<usize>> {
        let end = addr + len;
        if end > MEMORY_SIZE {
            Err(Error::AddressOutOfRange { addr, len })
        } else {
            Ok(addr..end)
        }
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_has_sprite_sheet() {
        let m = Memory::new();
        assert_eq!(m.bytes(0, 80).unwrap(), &SPRITE_SHEET[..]);
    }

    #[test]
    fn test_memory_zeroed_after_sprite_sheet() {
        let m = Memory::new();
        assert!(m.bytes(80, MEMORY_SIZE - 80).unwrap().iter().all(|b| *b == 0));
    }

    #[test]
    fn test_read_word() {
        let mut m = Memory::new();
        m.write_bytes(0x300, &[0x12, 0x34]).unwrap();
        assert_eq!(m.read_word(0x300).unwrap(), 0x1234);
    }

    #[test]
    fn test_read_word_straddling_the_end() {
        let m = Memory::new();
        assert!(matches!(
            m.read_word(0xFFF),
            Err(Error::AddressOutOfRange { addr: 0xFFF, len: 2 })
        ));
    }

    #[test]
    fn test_span_past_the_end_reports_its_start() {
        let m = Memory::new();
        assert!(matches!(
            m.bytes(0xFFE, 4),
            Err(Error::AddressOutOfRange {
                addr: 0xFFE,
                len: 4
            })
        ));
    }

    #[test]
    fn test_read_anywhere_in_range() {
        let m = Memory::new();
        assert_eq!(m.read_byte(0x000).unwrap(), 0xF0);
        assert_eq!(m.read_byte(0xFFF).unwrap(), 0x00);
    }

    #[test]
    fn test_read_out_of_range() {
        let m = Memory::new();
        assert!(matches!(
            m.read_byte(0x1000),
            Err(Error::AddressOutOfRange {
                addr: 0x1000,
                len: 1
            })
        ));
    }

    #[test]
    fn test_write_byte() {
        let mut m = Memory::new();
        m.write_byte(0x200, 0xAB).unwrap();
        assert_eq!(m.read_byte(0x200).unwrap(), 0xAB);
    }

    #[test]
    fn test_write_below_program_start_is_rejected() {
        let mut m = Memory::new();
        assert!(matches!(
            m.write_byte(0x1FF, 0xAB),
            Err(Error::ProtectedWrite { addr: 0x1FF })
        ));
        assert_eq!(m.read_byte(0x1FF).unwrap(), 0x00);
    }

    #[test]
    fn test_write_past_the_end_writes_nothing() {
        let mut m = Memory::new();
        assert!(m.write_bytes(0xFFE, &[1, 2, 3]).is_err());
        assert_eq!(m.bytes(0xFFE, 2).unwrap(), &[0, 0]);
    }
}
