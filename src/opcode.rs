use std::fmt;

/// A fetched instruction word split into its nibble fields. Every field is
/// always filled in; which ones mean anything depends on the instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Opcode {
    /// bits 15-12, selects the instruction family
    pub kind: u8,
    /// bits 11-8, usually a register index
    pub x: u8,
    /// bits 7-4, usually a register index
    pub y: u8,
    /// bits 3-0
    pub n: u8,
    /// bits 7-0
    pub nn: u8,
    /// bits 11-0, an address or 12 bit immediate
    pub nnn: u16,
}

/// split a raw word into fields; total over every u16
pub fn decode(raw: u16) -> Opcode {
    Opcode {
        kind: (raw >> 12) as u8,
        x: ((raw >> 8) & 0xf) as u8,
        y: ((raw >> 4) & 0xf) as u8,
        n: (raw & 0xf) as u8,
        nn: (raw & 0xff) as u8,
        nnn: raw & 0x0fff,
    }
}

impl From<u16> for Opcode {
    fn from(raw: u16) -> Self {
        decode(raw)
    }
}

impl Opcode {
    /// put the word back together again
    pub fn raw(&self) -> u16 {
        (self.kind as u16) << 12 | self.nnn
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "kind: {:X}, x: {:X}, y: {:X}, n: {:X}, nn: {:02X}, nnn: {:03X}",
            self.kind, self.x, self.y, self.n, self.nn, self.nnn
        )
    }
}
