use crate::error::{Error, Result};

// memory size
pub const MEM_SIZE: usize = 4096;

// start of the built-in glyphs
pub const FONT_START: usize = 0;

// bytes per glyph
pub const GLYPH_SIZE: usize = 5;

// built-in glyphs for the hex digits
const FONT_DATA: [u8; 16 * GLYPH_SIZE] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];

// where programs are loaded, and where execution starts
pub const PROGRAM_START: usize = 0x200;

// rom size
pub const MAX_ROM_SIZE: usize = MEM_SIZE - PROGRAM_START;

/// The 4KB address space of the machine.
///
/// Every access is checked against the end of memory; addresses are never
/// wrapped around.
#[derive(Clone)]
pub struct Memory {
    bytes: [u8; MEM_SIZE],
}

impl Memory {
    /// Zeroed memory, without glyphs.
    pub fn new() -> Self {
        Memory {
            bytes: [0u8; MEM_SIZE],
        }
    }

    /// Zeroed memory with the hex glyphs loaded at `FONT_START`.
    pub fn with_font() -> Self {
        let mut memory = Memory::new();
        memory.bytes[FONT_START..FONT_START + FONT_DATA.len()].copy_from_slice(&FONT_DATA[..]);
        memory
    }

    /// Address of the glyph for the low nibble of `digit`.
    pub fn glyph_address(digit: u8) -> usize {
        FONT_START + (digit & 0xF) as usize * GLYPH_SIZE
    }

    /// Copy a program image to `PROGRAM_START`.
    pub fn load_program(&mut self, image: &[u8]) -> Result<()> {
        if image.len() > MAX_ROM_SIZE {
            return Err(Error::RomTooLarge {
                size: image.len(),
                max: MAX_ROM_SIZE,
            });
        }

        self.bytes[PROGRAM_START..PROGRAM_START + image.len()].copy_from_slice(image);
        Ok(())
    }

    pub fn read(&self, address: usize) -> Result<u8> {
        self.bytes
            .get(address)
            .copied()
            .ok_or(Error::OutOfBoundsAddress { address })
    }

    pub fn write(&mut self, address: usize, value: u8) -> Result<()> {
        let cell = self
            .bytes
            .get_mut(address)
            .ok_or(Error::OutOfBoundsAddress { address })?;
        *cell = value;
        Ok(())
    }

    /// Read a big-endian word, as opcodes are stored.
    pub fn read_word(&self, address: usize) -> Result<u16> {
        let hi = self.read(address)?;
        let lo = self.read(address + 1)?;
        Ok(u16::from_be_bytes([hi, lo]))
    }

    /// Borrow `len` bytes starting at `address`.
    pub fn slice(&self, address: usize, len: usize) -> Result<&[u8]> {
        let end = Self::checked_end(address, len)?;
        Ok(&self.bytes[address..end])
    }

    pub fn slice_mut(&mut self, address: usize, len: usize) -> Result<&mut [u8]> {
        let end = Self::checked_end(address, len)?;
        Ok(&mut self.bytes[address..end])
    }

    // exclusive end of the range, if the whole range fits in memory
    fn checked_end(address: usize, len: usize) -> Result<usize> {
        if address >= MEM_SIZE {
            return Err(Error::OutOfBoundsAddress { address });
        }

        let end = address + len;
        if end > MEM_SIZE {
            // report the first byte that does not exist
            return Err(Error::OutOfBoundsAddress { address: MEM_SIZE });
        }
        Ok(end)
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
    fn test_load_small_rom() {
        let rom = [0xFFu8; 10];
        let mut memory = Memory::new();
        memory.load_program(&rom[..]).unwrap();

        for offset in 0..10 {
            assert_eq!(memory.read(PROGRAM_START + offset).unwrap(), 0xFF);
        }
        assert_eq!(memory.read(PROGRAM_START + 10).unwrap(), 0x00);
        assert_eq!(memory.read(PROGRAM_START - 1).unwrap(), 0x00);
    }

    #[test]
    fn test_load_rom_exact() {
        let mut rom = [0xFF; MAX_ROM_SIZE];
        rom[0] = 0xAA;
        rom[1] = 0xBB;
        rom[MAX_ROM_SIZE - 1] = 0xCC;

        let mut memory = Memory::new();
        memory.load_program(&rom[..]).unwrap();
        assert_eq!(memory.read(PROGRAM_START).unwrap(), 0xAA);
        assert_eq!(memory.read(PROGRAM_START + 1).unwrap(), 0xBB);
        assert_eq!(memory.read(PROGRAM_START + 2).unwrap(), 0xFF);
        assert_eq!(memory.read(MEM_SIZE - 1).unwrap(), 0xCC);
    }

    #[test]
    fn test_load_big_rom_fails() {
        let rom = [0xEE; MAX_ROM_SIZE + 1];
        let mut memory = Memory::new();

        assert!(matches!(
            memory.load_program(&rom[..]),
            Err(Error::RomTooLarge {
                size,
                max: MAX_ROM_SIZE
            }) if size == MAX_ROM_SIZE + 1
        ));
        assert_eq!(memory.read(PROGRAM_START).unwrap(), 0x00);
    }

    #[test]
    fn test_font_is_loaded() {
        let memory = Memory::with_font();
        assert_eq!(memory.slice(Memory::glyph_address(0x0), 5).unwrap(), &[0xF0, 0x90, 0x90, 0x90, 0xF0]);
        assert_eq!(memory.slice(Memory::glyph_address(0xF), 5).unwrap(), &[0xF0, 0x80, 0xF0, 0x80, 0x80]);
        assert_eq!(Memory::glyph_address(0x1E), Memory::glyph_address(0xE));

        let empty = Memory::new();
        assert_eq!(empty.read(0).unwrap(), 0x00);
    }

    #[test]
    fn test_read_word_is_big_endian() {
        let mut memory = Memory::new();
        memory.load_program(&[0xAA, 0xBB]).unwrap();
        assert_eq!(memory.read_word(PROGRAM_START).unwrap(), 0xAABB);
    }

    #[test]
    fn test_out_of_bounds() {
        let mut memory = Memory::new();

        assert!(memory.read(MEM_SIZE - 1).is_ok());
        assert!(matches!(
            memory.read(MEM_SIZE),
            Err(Error::OutOfBoundsAddress { address: MEM_SIZE })
        ));
        assert!(matches!(
            memory.write(0x1234, 1),
            Err(Error::OutOfBoundsAddress { address: 0x1234 })
        ));
        assert!(matches!(
            memory.read_word(MEM_SIZE - 1),
            Err(Error::OutOfBoundsAddress { address: MEM_SIZE })
        ));
        assert!(memory.slice(MEM_SIZE - 3, 3).is_ok());
        assert!(matches!(
            memory.slice(MEM_SIZE - 3, 4),
            Err(Error::OutOfBoundsAddress { address: MEM_SIZE })
        ));
        assert!(matches!(
            memory.slice_mut(MEM_SIZE + 2, 0),
            Err(Error::OutOfBoundsAddress { address }) if address == MEM_SIZE + 2
        ));
    }
}
