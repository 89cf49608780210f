use crate::opcode::Opcode;
use std::fmt;

/// Register index, always 0x0-0xF because it comes out of a nibble
pub type Reg = u8;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Instruction {
    ///////////////////////////////////
    // CHIP-8                        //
    ///////////////////////////////////
    //
    /// 00E0: clear the screen
    Cls,
    /// 00EE: return from subroutine
    Ret,
    /// 1nnn: jump to `nnn`
    Jump { nnn: u16 },
    /// 2nnn: call subroutine at `nnn`
    Call { nnn: u16 },
    /// 3xnn: skip next if `x` == `nn`
    SkipEqByte { x: Reg, nn: u8 },
    /// 4xnn: skip next if `x` != `nn`
    SkipNeByte { x: Reg, nn: u8 },
    /// 5xy_: skip next if `x` == `y`
    SkipEqReg { x: Reg, y: Reg },
    /// 6xnn: load `nn` into `x`
    LoadByte { x: Reg, nn: u8 },
    /// 7xnn: add `nn` to `x`, no carry
    AddByte { x: Reg, nn: u8 },
    /// 8xy0: copy `y` into `x`
    Move { x: Reg, y: Reg },
    /// 8xy1
    Or { x: Reg, y: Reg },
    /// 8xy2
    And { x: Reg, y: Reg },
    /// 8xy3
    Xor { x: Reg, y: Reg },
    /// 8xy4: `x` += `y`, VF set on carry
    AddReg { x: Reg, y: Reg },
    /// 8xy5: `x` -= `y`, VF set when no borrow
    Sub { x: Reg, y: Reg },
    /// 8xy6: shift `x` right, VF gets bit 0
    ShiftRight { x: Reg, y: Reg },
    /// 8xy7: `x` = `y` - `x`, VF set when no borrow
    SubN { x: Reg, y: Reg },
    /// 8xyE: shift `x` left, VF gets bit 7
    ShiftLeft { x: Reg, y: Reg },
    /// 9xy_: skip next if `x` != `y`
    SkipNeReg { x: Reg, y: Reg },
    /// Annn: load index with `nnn`
    LoadIndex { nnn: u16 },
    /// Bnnn: jump to `nnn` + V0
    JumpV0 { nnn: u16 },
    /// Cxnn: random byte masked by `nn`
    Random { x: Reg, nn: u8 },
    /// Dxyn: draw `n` rows of sprite at index, at (`x`, `y`)
    Draw { x: Reg, y: Reg, n: u8 },
    /// Ex9E: skip next if key in `x` is held
    SkipKey { x: Reg },
    /// ExA1: skip next if key in `x` is not held
    SkipNoKey { x: Reg },
    /// Fx07: read delay timer into `x`
    LoadDelay { x: Reg },
    /// Fx0A: wait for a keypress, store it in `x`
    WaitKey { x: Reg },
    /// Fx15: set delay timer from `x`
    SetDelay { x: Reg },
    /// Fx18: set sound timer from `x`
    SetSound { x: Reg },
    /// Fx1E: add `x` to index
    AddIndex { x: Reg },
    /// Fx29: point index at small font glyph for `x`
    LoadFont { x: Reg },
    /// Fx33: BCD of `x` at index..index+2
    Bcd { x: Reg },
    /// Fx55: store V0..=`x` at index
    Store { x: Reg },
    /// Fx65: load V0..=`x` from index
    Restore { x: Reg },

    ///////////////////////////////////
    // Super CHIP-8                  //
    ///////////////////////////////////
    //
    /// 00Cn: scroll down `n` rows
    ScrollDown { n: u8 },
    /// 00FB: scroll right 4 columns
    ScrollRight,
    /// 00FC: scroll left 4 columns
    ScrollLeft,
    /// 00FD: exit interpreter
    Exit,
    /// 00FE: disable hi-res mode
    LowRes,
    /// 00FF: enable hi-res mode
    HighRes,
    /// Fx30: point index at large font glyph for `x`
    LoadLargeFont { x: Reg },
    /// Fx75: store V0..=`x` in the user flags
    StoreFlags { x: Reg },
    /// Fx85: load V0..=`x` from the user flags
    RestoreFlags { x: Reg },
}

impl Instruction {
    /// pick the concrete instruction for a decoded word; `None` when the
    /// sub-selector doesn't name anything
    pub fn from_opcode(o: Opcode) -> Option<Instruction> {
        use Instruction::*;
        let (x, y, n, nn, nnn) = (o.x, o.y, o.n, o.nn, o.nnn);
        let ins = match (o.kind, nnn, n, nn) {
            (0x0, 0x0e0, _, _) => Cls,
            (0x0, 0x0ee, _, _) => Ret,
            (0x0, 0x0c0..=0x0cf, _, _) => ScrollDown { n },
            (0x0, 0x0fb, _, _) => ScrollRight,
            (0x0, 0x0fc, _, _) => ScrollLeft,
            (0x0, 0x0fd, _, _) => Exit,
            (0x0, 0x0fe, _, _) => LowRes,
            (0x0, 0x0ff, _, _) => HighRes,
            (0x1, _, _, _) => Jump { nnn },
            (0x2, _, _, _) => Call { nnn },
            (0x3, _, _, _) => SkipEqByte { x, nn },
            (0x4, _, _, _) => SkipNeByte { x, nn },
            (0x5, _, _, _) => SkipEqReg { x, y },
            (0x6, _, _, _) => LoadByte { x, nn },
            (0x7, _, _, _) => AddByte { x, nn },
            (0x8, _, 0x0, _) => Move { x, y },
            (0x8, _, 0x1, _) => Or { x, y },
            (0x8, _, 0x2, _) => And { x, y },
            (0x8, _, 0x3, _) => Xor { x, y },
            (0x8, _, 0x4, _) => AddReg { x, y },
            (0x8, _, 0x5, _) => Sub { x, y },
            (0x8, _, 0x6, _) => ShiftRight { x, y },
            (0x8, _, 0x7, _) => SubN { x, y },
            (0x8, _, 0xe, _) => ShiftLeft { x, y },
            (0x9, _, _, _) => SkipNeReg { x, y },
            (0xa, _, _, _) => LoadIndex { nnn },
            (0xb, _, _, _) => JumpV0 { nnn },
            (0xc, _, _, _) => Random { x, nn },
            (0xd, _, _, _) => Draw { x, y, n },
            (0xe, _, _, 0x9e) => SkipKey { x },
            (0xe, _, _, 0xa1) => SkipNoKey { x },
            (0xf, _, _, 0x07) => LoadDelay { x },
            (0xf, _, _, 0x0a) => WaitKey { x },
            (0xf, _, _, 0x15) => SetDelay { x },
            (0xf, _, _, 0x18) => SetSound { x },
            (0xf, _, _, 0x1e) => AddIndex { x },
            (0xf, _, _, 0x29) => LoadFont { x },
            (0xf, _, _, 0x30) => LoadLargeFont { x },
            (0xf, _, _, 0x33) => Bcd { x },
            (0xf, _, _, 0x55) => Store { x },
            (0xf, _, _, 0x65) => Restore { x },
            (0xf, _, _, 0x75) => StoreFlags { x },
            (0xf, _, _, 0x85) => RestoreFlags { x },
            _ => return None,
        };
        Some(ins)
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Instruction::*;
        match *self {
            Cls => write!(f, "CLS"),
            Ret => write!(f, "RET"),
            Jump { nnn } => write!(f, "JP #{:03X}", nnn),
            Call { nnn } => write!(f, "CALL #{:03X}", nnn),
            SkipEqByte { x, nn } => write!(f, "SE V{:X}, #{:02X}", x, nn),
            SkipNeByte { x, nn } => write!(f, "SNE V{:X}, #{:02X}", x, nn),
            SkipEqReg { x, y } => write!(f, "SE V{:X}, V{:X}", x, y),
            LoadByte { x, nn } => write!(f, "LD V{:X}, #{:02X}", x, nn),
            AddByte { x, nn } => write!(f, "ADD V{:X}, #{:02X}", x, nn),
            Move { x, y } => write!(f, "LD V{:X}, V{:X}", x, y),
            Or { x, y } => write!(f, "OR V{:X}, V{:X}", x, y),
            And { x, y } => write!(f, "AND V{:X}, V{:X}", x, y),
            Xor { x, y } => write!(f, "XOR V{:X}, V{:X}", x, y),
            AddReg { x, y } => write!(f, "ADD V{:X}, V{:X}", x, y),
            Sub { x, y } => write!(f, "SUB V{:X}, V{:X}", x, y),
            ShiftRight { x, y } => write!(f, "SHR V{:X}, V{:X}", x, y),
            SubN { x, y } => write!(f, "SUBN V{:X}, V{:X}", x, y),
            ShiftLeft { x, y } => write!(f, "SHL V{:X}, V{:X}", x, y),
            SkipNeReg { x, y } => write!(f, "SNE V{:X}, V{:X}", x, y),
            LoadIndex { nnn } => write!(f, "LD I, #{:03X}", nnn),
            JumpV0 { nnn } => write!(f, "JP V0, #{:03X}", nnn),
            Random { x, nn } => write!(f, "RND V{:X}, #{:02X}", x, nn),
            Draw { x, y, n } => write!(f, "DRW V{:X}, V{:X}, {}", x, y, n),
            SkipKey { x } => write!(f, "SKP V{:X}", x),
            SkipNoKey { x } => write!(f, "SKNP V{:X}", x),
            LoadDelay { x } => write!(f, "LD V{:X}, DT", x),
            WaitKey { x } => write!(f, "LD V{:X}, K", x),
            SetDelay { x } => write!(f, "LD DT, V{:X}", x),
            SetSound { x } => write!(f, "LD ST, V{:X}", x),
            AddIndex { x } => write!(f, "ADD I, V{:X}", x),
            LoadFont { x } => write!(f, "LD F, V{:X}", x),
            Bcd { x } => write!(f, "LD B, V{:X}", x),
            Store { x } => write!(f, "LD [I], V{:X}", x),
            Restore { x } => write!(f, "LD V{:X}, [I]", x),
            ScrollDown { n } => write!(f, "SCD {}", n),
            ScrollRight => write!(f, "SCR"),
            ScrollLeft => write!(f, "SCL"),
            Exit => write!(f, "EXIT"),
            LowRes => write!(f, "LOW"),
            HighRes => write!(f, "HIGH"),
            LoadLargeFont { x } => write!(f, "LD HF, V{:X}", x),
            StoreFlags { x } => write!(f, "LD R, V{:X}", x),
            RestoreFlags { x } => write!(f, "LD V{:X}, R", x),
        }
    }
}
