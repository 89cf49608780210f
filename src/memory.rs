use crate::error::{Fault, Result};

// NB. addresses are u16 as per the chip-8; lengths are usize to stop endless casting

/// Represents memory map, ROM, RAM etc. Slices handed out are clipped to the
/// end of memory rather than panicking, so bulk copies stop silently at the top.
pub trait MemoryMap {
    /// how many bytes are addressable
    fn size(&self) -> usize;

    /// get a r/w slice of the underlying memory, clipped to the end of memory
    fn get_rw_slice(&mut self, addr: u16, len: usize) -> &mut [u8];

    /// get a r/o slice of the underlying memory, clipped to the end of memory
    fn get_ro_slice(&self, addr: u16, len: usize) -> &[u8];

    /// write a chunk of bytes into "RAM", returning how many actually fit
    fn write(&mut self, data: &[u8], addr: u16) -> usize {
        let bytes = self.get_rw_slice(addr, data.len());
        let len = bytes.len();
        bytes.copy_from_slice(&data[..len]);
        len
    }

    /// single byte; anything past the end of memory reads as zero
    fn read_byte(&self, addr: u16) -> u8 {
        self.get_ro_slice(addr, 1).first().copied().unwrap_or(0)
    }

    /// get a two-byte big-endian word (instruction fetch)
    fn get_word(&self, addr: u16) -> Result<u16> {
        match self.get_ro_slice(addr, 2) {
            [hi, lo] => Ok(u16::from_be_bytes([*hi, *lo])),
            _ => Err(Fault::Address { pc: addr }),
        }
    }
}

/// Defines the CHIP-8 memory map used here, 4K configuration:
///   0x0000-0x004f  unused interpreter area
///   0x0050-0x009f  small font, 16 glyphs of 5 bytes
///   0x00a0-0x013f  large (super-chip) font, 16 glyphs of 10 bytes
///   0x0140-0x01ff  unused interpreter area
///   0x0200-0x0fff  program
///
/// the stack, registers and display live outside of addressable memory
pub struct Chip8MemoryMap {
    bytes: Box<[u8]>,
}

impl MemoryMap for Chip8MemoryMap {
    fn size(&self) -> usize {
        self.bytes.len()
    }

    fn get_rw_slice(&mut self, addr: u16, len: usize) -> &mut [u8] {
        let (a, b) = clip(addr, len, self.bytes.len());
        &mut self.bytes[a..b]
    }

    fn get_ro_slice(&self, addr: u16, len: usize) -> &[u8] {
        let (a, b) = clip(addr, len, self.bytes.len());
        &self.bytes[a..b]
    }
}

fn clip(addr: u16, len: usize, size: usize) -> (usize, usize) {
    let a = (addr as usize).min(size);
    (a, (a + len).min(size))
}

/// how much RAM we have
pub const RAM_SIZE_BYTES: usize = 4096;

/// where the program is loaded
pub const PROGRAM_ADDR: u16 = 0x0200;

/// most bytes a program can occupy
pub const PROGRAM_CAPACITY: usize = RAM_SIZE_BYTES - PROGRAM_ADDR as usize;

pub const FONT_ADDR: u16 = 0x050;
pub const FONT_GLYPH_BYTES: u16 = 5;
pub const LARGE_FONT_ADDR: u16 = 0x0a0;
pub const LARGE_FONT_GLYPH_BYTES: u16 = 10;

impl Chip8MemoryMap {
    /// zeroed memory with both fonts baked in below the program area
    pub fn new() -> Self {
        let mut mm = Chip8MemoryMap {
            bytes: vec![0u8; RAM_SIZE_BYTES].into_boxed_slice(),
        };
        mm.write(&FONT, FONT_ADDR);
        mm.write(&LARGE_FONT, LARGE_FONT_ADDR);
        mm
    }

    /// zero everything from the program address upward; fonts survive
    pub fn clear_program_area(&mut self) {
        self.bytes[PROGRAM_ADDR as usize..].fill(0);
    }

    /// copy a CHIP-8 program in at 0x200, verbatim
    pub fn load_program(&mut self, rom: &[u8]) -> Result<usize> {
        if rom.len() > PROGRAM_CAPACITY {
            return Err(Fault::Capacity {
                len: rom.len(),
                capacity: PROGRAM_CAPACITY,
            });
        }
        Ok(self.write(rom, PROGRAM_ADDR))
    }
}

impl Default for Chip8MemoryMap {
    fn default() -> Self {
        Self::new()
    }
}

const FONT: [u8; 80] = [
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

// 8x10 glyphs, one byte per row
#[rustfmt::skip]
const LARGE_FONT: [u8; 160] = [
    0x3C, 0x7E, 0xE7, 0xC3, 0xC3, 0xC3, 0xC3, 0xE7, 0x7E, 0x3C, // 0
    0x18, 0x38, 0x58, 0x18, 0x18, 0x18, 0x18, 0x18, 0x18, 0x3C, // 1
    0x3E, 0x7F, 0xC3, 0x06, 0x0C, 0x18, 0x30, 0x60, 0xFF, 0xFF, // 2
    0x3C, 0x7E, 0xC3, 0x03, 0x0E, 0x0E, 0x03, 0xC3, 0x7E, 0x3C, // 3
    0x06, 0x0E, 0x1E, 0x36, 0x66, 0xC6, 0xFF, 0xFF, 0x06, 0x06, // 4
    0xFF, 0xFF, 0xC0, 0xC0, 0xFC, 0xFE, 0x03, 0xC3, 0x7E, 0x3C, // 5
    0x3E, 0x7C, 0xE0, 0xC0, 0xFC, 0xFE, 0xC3, 0xC3, 0x7E, 0x3C, // 6
    0xFF, 0xFF, 0x03, 0x06, 0x0C, 0x18, 0x30, 0x60, 0x60, 0x60, // 7
    0x3C, 0x7E, 0xC3, 0xC3, 0x7E, 0x7E, 0xC3, 0xC3, 0x7E, 0x3C, // 8
    0x3C, 0x7E, 0xC3, 0xC3, 0x7F, 0x3F, 0x03, 0x03, 0x3E, 0x7C, // 9
    0x18, 0x3C, 0x66, 0xC3, 0xC3, 0xFF, 0xFF, 0xC3, 0xC3, 0xC3, // A
    0xFC, 0xFE, 0xC3, 0xC3, 0xFE, 0xFE, 0xC3, 0xC3, 0xFE, 0xFC, // B
    0x3C, 0x7E, 0xE3, 0xC0, 0xC0, 0xC0, 0xC0, 0xE3, 0x7E, 0x3C, // C
    0xFC, 0xFE, 0xC7, 0xC3, 0xC3, 0xC3, 0xC3, 0xC7, 0xFE, 0xFC, // D
    0xFF, 0xFF, 0xC0, 0xC0, 0xFC, 0xFC, 0xC0, 0xC0, 0xFF, 0xFF, // E
    0xFF, 0xFF, 0xC0, 0xC0, 0xFC, 0xFC, 0xC0, 0xC0, 0xC0, 0xC0, // F
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_zeroed() {
        let m = Chip8MemoryMap::new();
        // NB. memory is zeroed from 0x200 because before that we bake in the
        //     fonts
        assert_eq!(m.bytes[0x200..], [0; 0xe00]);
        assert_eq!(m.bytes[..FONT_ADDR as usize], [0; 0x50]);
    }

    #[test]
    fn test_fonts_baked_in() {
        let m = Chip8MemoryMap::new();
        assert_eq!(m.get_ro_slice(FONT_ADDR, 5), &[0xF0, 0x90, 0x90, 0x90, 0xF0]);
        // glyph F of the small font
        assert_eq!(m.get_ro_slice(FONT_ADDR + 15 * FONT_GLYPH_BYTES, 5), &FONT[75..]);
        assert_eq!(m.get_ro_slice(LARGE_FONT_ADDR, 160), &LARGE_FONT[..]);
        assert_eq!(m.read_byte(LARGE_FONT_ADDR + 160), 0);
    }

    #[test]
    fn test_write_slice_ok() {
        let mut dst = Chip8MemoryMap::new();
        let src: &[u8] = &[0, 1, 2, 3, 4, 5, 6, 7];
        assert_eq!(dst.write(src, 8), 8);
        assert_eq!(
            dst.bytes[..16],
            [0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 2, 3, 4, 5, 6, 7]
        );
    }

    #[test]
    fn test_write_clips_at_top_of_memory() {
        let mut dst = Chip8MemoryMap::new();
        assert_eq!(dst.write(&[9; 8], 4092), 4);
        assert_eq!(dst.bytes[4088..], [0, 0, 0, 0, 9, 9, 9, 9]);
    }

    #[test]
    fn test_read_ro() {
        let m = Chip8MemoryMap::new();
        let s = m.get_ro_slice(0, 8);
        assert_eq!(s, &[0, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_read_past_end_is_clipped() {
        let m = Chip8MemoryMap::new();
        assert_eq!(m.get_ro_slice(4094, 8).len(), 2);
        assert!(m.get_ro_slice(0xffff, 8).is_empty());
        assert_eq!(m.read_byte(0x1000), 0);
    }

    #[test]
    fn test_read_word() -> Result<()> {
        let mut m = Chip8MemoryMap::new();
        m.write(&[0, 1, 2, 3, 4, 5, 6, 7], 0);
        assert_eq!(m.get_word(0x4)?, 0x0405);
        Ok(())
    }

    #[test]
    fn test_read_word_at_top_of_memory() {
        let m = Chip8MemoryMap::new();
        assert_eq!(m.get_word(0x0ffe), Ok(0));
        assert_eq!(m.get_word(0x0fff), Err(Fault::Address { pc: 0x0fff }));
        assert_eq!(m.get_word(0x1000), Err(Fault::Address { pc: 0x1000 }));
    }

    #[test]
    fn test_program_load_ok() -> Result<()> {
        let mut dst = Chip8MemoryMap::new();
        let prog: &[u8] = &[0x00, 0xe0]; // clear screen
        assert_eq!(dst.load_program(prog)?, 2);
        assert_eq!(dst.get_ro_slice(0x200, 2), &[0x00, 0xe0]);
        Ok(())
    }

    #[test]
    fn test_program_fills_memory_exactly() -> Result<()> {
        let mut dst = Chip8MemoryMap::new();
        let prog = vec![0xaa; PROGRAM_CAPACITY];
        assert_eq!(dst.load_program(&prog)?, PROGRAM_CAPACITY);
        assert_eq!(dst.read_byte(0x0fff), 0xaa);
        Ok(())
    }

    #[test]
    fn test_program_too_large() {
        let mut dst = Chip8MemoryMap::new();
        let prog = vec![0xaa; PROGRAM_CAPACITY + 1];
        assert_eq!(
            dst.load_program(&prog),
            Err(Fault::Capacity {
                len: PROGRAM_CAPACITY + 1,
                capacity: PROGRAM_CAPACITY
            })
        );
        assert_eq!(dst.read_byte(PROGRAM_ADDR), 0);
    }

    #[test]
    fn test_clear_program_area_keeps_fonts() {
        let mut m = Chip8MemoryMap::new();
        m.write(&[1; 16], 0x300);
        m.clear_program_area();
        assert_eq!(m.read_byte(0x300), 0);
        assert_eq!(m.read_byte(FONT_ADDR), 0xF0);
    }
}
