use super::*;
use crate::instruction::Reg;
use crate::memory::{FONT_ADDR, FONT_GLYPH_BYTES, LARGE_FONT_ADDR, LARGE_FONT_GLYPH_BYTES};
use log::warn;
use rand::Rng;

/// columns moved by the super-chip horizontal scrolls
const SCROLL_COLUMNS: usize = 4;

impl Interpreter {
    /// Carry out one decoded instruction. PC has already been moved past it.
    /// Nothing in here can fail: register indices come from nibbles and all
    /// the arithmetic wraps.
    pub(super) fn execute(&mut self, instruction: Instruction) {
        use Instruction::*;
        match instruction {
            Cls => {
                self.framebuffer.clear();
                self.display_updated = true;
            }
            Ret => match self.stack.pop() {
                Some(addr) => self.program_counter = addr,
                None => warn!(
                    "RET with an empty stack at 0x{:04x}, ignored",
                    self.program_counter.wrapping_sub(2)
                ),
            },
            Jump { nnn } => self.program_counter = nnn,
            Call { nnn } => {
                self.stack.push(self.program_counter);
                self.program_counter = nnn;
            }
            SkipEqByte { x, nn } => self.skip_if(self.reg(x) == nn),
            SkipNeByte { x, nn } => self.skip_if(self.reg(x) != nn),
            SkipEqReg { x, y } => self.skip_if(self.reg(x) == self.reg(y)),
            SkipNeReg { x, y } => self.skip_if(self.reg(x) != self.reg(y)),

            LoadByte { x, nn } => self.set_reg(x, nn),
            AddByte { x, nn } => self.set_reg(x, self.reg(x).wrapping_add(nn)),
            Move { x, y } => self.set_reg(x, self.reg(y)),
            Or { x, y } => self.set_reg(x, self.reg(x) | self.reg(y)),
            And { x, y } => self.set_reg(x, self.reg(x) & self.reg(y)),
            Xor { x, y } => self.set_reg(x, self.reg(x) ^ self.reg(y)),
            AddReg { x, y } => {
                let (sum, carry) = self.reg(x).overflowing_add(self.reg(y));
                self.set_with_flag(x, sum, carry);
            }
            Sub { x, y } => {
                let (a, b) = (self.reg(x), self.reg(y));
                self.set_with_flag(x, a.wrapping_sub(b), a >= b);
            }
            SubN { x, y } => {
                let (a, b) = (self.reg(x), self.reg(y));
                self.set_with_flag(x, b.wrapping_sub(a), b >= a);
            }
            ShiftRight { x, .. } => {
                let a = self.reg(x);
                self.set_with_flag(x, a >> 1, a & 0x01 != 0);
            }
            ShiftLeft { x, .. } => {
                let a = self.reg(x);
                self.set_with_flag(x, a << 1, a & 0x80 != 0);
            }

            LoadIndex { nnn } => self.i = nnn,
            JumpV0 { nnn } => self.program_counter = nnn + self.v[0] as u16,
            AddIndex { x } => self.i = self.i.wrapping_add(self.reg(x) as u16),
            LoadFont { x } => self.i = FONT_ADDR + self.reg(x) as u16 * FONT_GLYPH_BYTES,
            LoadLargeFont { x } => {
                self.i = LARGE_FONT_ADDR + self.reg(x) as u16 * LARGE_FONT_GLYPH_BYTES
            }
            Random { x, nn } => {
                let r: u8 = self.rng.gen();
                self.set_reg(x, r & nn);
            }

            Bcd { x } => {
                let a = self.reg(x);
                self.memory.write(&[a / 100, a / 10 % 10, a % 10], self.i);
            }
            Store { x } => {
                self.memory.write(&self.v[..=x as usize], self.i);
            }
            Restore { x } => {
                let src = self.memory.get_ro_slice(self.i, x as usize + 1);
                self.v[..src.len()].copy_from_slice(src);
            }
            StoreFlags { x } => {
                let count = (x as usize + 1).min(USER_FLAG_COUNT);
                self.user_flags[..count].copy_from_slice(&self.v[..count]);
            }
            RestoreFlags { x } => {
                let count = (x as usize + 1).min(USER_FLAG_COUNT);
                self.v[..count].copy_from_slice(&self.user_flags[..count]);
            }

            LoadDelay { x } => self.set_reg(x, self.timers.delay()),
            SetDelay { x } => self.timers.set_delay(self.reg(x)),
            SetSound { x } => self.timers.set_sound(self.reg(x)),

            SkipKey { x } => self.skip_if(self.keys.contains(&self.reg(x))),
            SkipNoKey { x } => self.skip_if(!self.keys.contains(&self.reg(x))),
            WaitKey { x } => match self.keys.first() {
                Some(&key) => self.set_reg(x, key),
                // nothing held: go round again on the next cycle
                None => self.rewind(),
            },

            Draw { x, y, n } => self.draw(x, y, n),
            ScrollDown { n } => {
                self.framebuffer.scroll_down(n as usize);
                self.display_updated = true;
            }
            ScrollRight => {
                self.framebuffer.scroll_right(SCROLL_COLUMNS);
                self.display_updated = true;
            }
            ScrollLeft => {
                self.framebuffer.scroll_left(SCROLL_COLUMNS);
                self.display_updated = true;
            }
            LowRes => {
                self.framebuffer.set_hi_res(false);
                self.display_updated = true;
            }
            HighRes => {
                self.framebuffer.set_hi_res(true);
                self.display_updated = true;
            }
            Exit => {
                if !self.exited {
                    info!("EXIT at 0x{:04x}, spinning", self.program_counter.wrapping_sub(2));
                    self.exited = true;
                }
                self.rewind();
            }
        }
    }

    fn reg(&self, r: Reg) -> u8 {
        self.v[r as usize]
    }

    fn set_reg(&mut self, r: Reg, value: u8) {
        self.v[r as usize] = value;
    }

    // result first, then the flag, so VF as the destination ends up holding
    // the flag
    fn set_with_flag(&mut self, r: Reg, value: u8, flag: bool) {
        self.v[r as usize] = value;
        self.v[FLAG_REG] = flag as u8;
    }

    fn skip_if(&mut self, condition: bool) {
        if condition {
            self.program_counter = self.program_counter.wrapping_add(2);
        }
    }

    fn rewind(&mut self) {
        self.program_counter = self.program_counter.wrapping_sub(2);
    }

    /// DRW: n rows of 8 from I, or a 16x16 sprite (32 bytes) for n == 0 in
    /// hi-res. Sprite bytes past the end of memory read as blank.
    fn draw(&mut self, x: Reg, y: Reg, n: u8) {
        let (px, py) = (self.reg(x) as usize, self.reg(y) as usize);
        let tag: Pixel = self.i.max(1);

        let (rows, bits): (Vec<u16>, usize) = if n == 0 && self.framebuffer.hi_res() {
            let bytes = self.memory.get_ro_slice(self.i, 32);
            let byte = |k: usize| bytes.get(k).copied().unwrap_or(0);
            ((0..16).map(|r| u16::from_be_bytes([byte(2 * r), byte(2 * r + 1)])).collect(), 16)
        } else {
            let bytes = self.memory.get_ro_slice(self.i, n as usize);
            let byte = |k: usize| bytes.get(k).copied().unwrap_or(0);
            ((0..n as usize).map(|r| byte(r) as u16).collect(), 8)
        };

        let collision = self.framebuffer.blit(px, py, &rows, bits, tag);
        self.v[FLAG_REG] = collision as u8;
        self.display_updated = true;

        if self.config.debug >= DebugLevel::Sprite && self.seen_sprites.insert(self.i) {
            debug!("drawing sprite 0x{:04x} at {},{} ({}x{})", self.i, px, py, bits, rows.len());
        }
    }
}
