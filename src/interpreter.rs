//! # interpreter
//!
//! The machine state and its fetch/decode/execute loop. What a program can
//! see:
//!  - V0..VF      8bit general registers; VF doubles as the carry/borrow/
//!                collision flag and is always written last
//!  - I           16bit index register
//!  - PC          16bit program counter, starts at 0x200
//!  - stack       return addresses for CALL/RET, as deep as it needs to be
//!  - DT, ST      delay and sound timers, counted down at 60Hz by a separate
//!                thread (see [crate::timer])
//!  - display     64x32, or 128x64 in super-chip hi-res mode
//!  - keypad      16 keys, handed in by the driver before each cycle
//!
//! Everything except the timers is owned by whoever calls [Interpreter::cycle].

use crate::config::{Config, DebugLevel};
use crate::error::{Fault, Result};
use crate::framebuffer::{Framebuffer, Pixel};
use crate::instruction::Instruction;
use crate::memory::{Chip8MemoryMap, MemoryMap, PROGRAM_ADDR};
use crate::opcode::decode;
use crate::timer::{TimerClock, Timers};
use log::{debug, info, log, Level};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashSet;
use std::io;
use std::sync::Arc;
use std::thread::JoinHandle;

mod execute;

pub const REG_COUNT: usize = 16;
pub const FLAG_REG: usize = 0xf;

/// super-chip "RPL user flags", saved/restored by Fx75/Fx85
pub const USER_FLAG_COUNT: usize = 8;

pub struct Interpreter {
    memory: Chip8MemoryMap,
    framebuffer: Framebuffer,
    v: [u8; REG_COUNT],
    i: u16,
    program_counter: u16,
    stack: Vec<u16>,
    timers: Arc<Timers>,
    clock: Option<JoinHandle<()>>,
    keys: Vec<u8>,
    user_flags: [u8; USER_FLAG_COUNT],
    display_updated: bool,
    exited: bool,
    rng: StdRng,
    config: Config,
    seen_sprites: HashSet<u16>,
}

impl Interpreter {
    pub fn new(config: Config) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut interpreter = Interpreter {
            memory: Chip8MemoryMap::new(),
            framebuffer: Framebuffer::new(),
            v: [0; REG_COUNT],
            i: 0,
            program_counter: PROGRAM_ADDR,
            stack: Vec::new(),
            timers: Arc::new(Timers::new()),
            clock: None,
            keys: Vec::new(),
            user_flags: [0; USER_FLAG_COUNT],
            display_updated: false,
            exited: false,
            rng,
            config,
            seen_sprites: HashSet::new(),
        };
        interpreter.reset();
        info!(
            "CHIP-8 system created, {} bytes of memory, debug level {}",
            interpreter.memory.size(),
            interpreter.config.debug
        );
        interpreter
    }

    /// Back to power-on state, except the fonts which are never reloaded and
    /// the user flags which outlive a reset.
    pub fn reset(&mut self) {
        self.memory.clear_program_area();
        self.framebuffer.set_hi_res(false);
        self.framebuffer.clear();
        self.v = [0; REG_COUNT];
        self.i = 0;
        self.program_counter = PROGRAM_ADDR;
        self.stack.clear();
        self.timers.reset();
        self.keys.clear();
        self.exited = false;
        self.seen_sprites.clear();
        self.display_updated = true;
        info!("system was reset");
    }

    /// Reset, then copy `rom` in at 0x200. A ROM that doesn't fit leaves the
    /// machine freshly reset.
    pub fn load_program(&mut self, rom: &[u8]) -> Result<usize> {
        self.reset();
        let len = self.memory.load_program(rom)?;
        info!("loaded {} bytes into memory at 0x{:04x}", len, PROGRAM_ADDR);
        Ok(len)
    }

    /// Start the 60Hz timer thread. Does nothing if it's already going. The
    /// thread stops by itself when this interpreter is dropped.
    pub fn start_timer_clock(&mut self) -> io::Result<()> {
        if self.clock.is_none() {
            self.clock = Some(TimerClock::spawn(&self.timers, self.config.timer_hz)?);
        }
        Ok(())
    }

    /// Replace the set of held keys. Codes outside the keypad are dropped;
    /// order is kept, since a key wait takes the first one.
    pub fn set_keys(&mut self, keys: &[u8]) {
        self.keys.clear();
        for &k in keys {
            if k < 16 && !self.keys.contains(&k) {
                self.keys.push(k);
            }
        }
    }

    /// Run one fetch/decode/execute step.
    pub fn cycle(&mut self) -> Result<()> {
        let pc = self.program_counter;
        let raw = self.fetch()?;
        let opcode = decode(raw);
        let instruction =
            Instruction::from_opcode(opcode).ok_or(Fault::Decode { opcode: raw, pc })?;

        if self.tracing() {
            debug!("> {:04X}: {:04X}  {:<16} [{}]", pc, raw, instruction.to_string(), opcode);
        }
        self.execute(instruction);
        if self.tracing() {
            self.dump(Level::Debug);
        }
        Ok(())
    }

    fn fetch(&mut self) -> Result<u16> {
        let raw = self.memory.get_word(self.program_counter)?;
        self.program_counter = self.program_counter.wrapping_add(2);
        Ok(raw)
    }

    fn tracing(&self) -> bool {
        self.config.debug == DebugLevel::Full
    }

    /// pixel tag at (x, y); 0 is off
    pub fn pixel(&self, x: usize, y: usize) -> Pixel {
        self.framebuffer.get(x, y)
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        &self.framebuffer
    }

    pub fn hi_res(&self) -> bool {
        self.framebuffer.hi_res()
    }

    pub fn display_updated(&self) -> bool {
        self.display_updated
    }

    /// Checks and clears the display updated flag
    pub fn take_display_updated(&mut self) -> bool {
        std::mem::take(&mut self.display_updated)
    }

    pub fn sound_timer(&self) -> u8 {
        self.timers.sound()
    }

    pub fn delay_timer(&self) -> u8 {
        self.timers.delay()
    }

    pub fn pc(&self) -> u16 {
        self.program_counter
    }

    pub fn index(&self) -> u16 {
        self.i
    }

    pub fn register(&self, r: usize) -> u8 {
        self.v[r & 0xf]
    }

    pub fn stack_depth(&self) -> usize {
        self.stack.len()
    }

    /// a super-chip EXIT has been hit; the machine is spinning on it
    pub fn exited(&self) -> bool {
        self.exited
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn set_debug(&mut self, debug: DebugLevel) {
        self.config.debug = debug;
    }

    /// log PC, I, timers, registers and stack
    pub fn dump(&self, level: Level) {
        log!(
            level,
            "> SYS >>> PC:{:04X}  I:{:04X}  DT:{:02X}  ST:{:02X}",
            self.program_counter,
            self.i,
            self.timers.delay(),
            self.timers.sound()
        );
        let regs: Vec<String> = self
            .v
            .iter()
            .enumerate()
            .map(|(r, v)| format!("v{:X}:{:02X}", r, v))
            .collect();
        log!(level, "> REG >>> {}", regs.join("  "));
        if !self.stack.is_empty() {
            let stack: Vec<String> = self
                .stack
                .iter()
                .enumerate()
                .map(|(d, a)| format!("stack[{}]:{:04X}", d, a))
                .collect();
            log!(level, "> STK >>> {}", stack.join(" "));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::PROGRAM_CAPACITY;
    use std::thread;
    use std::time::Duration;

    fn interpreter() -> Interpreter {
        Interpreter::new(Config::default().with_seed(1))
    }

    #[test]
    fn test_new_state() {
        let i = interpreter();
        assert_eq!(i.pc(), 0x200);
        assert_eq!(i.index(), 0);
        assert_eq!(i.stack_depth(), 0);
        assert!(!i.hi_res());
        assert!((0..16).all(|r| i.register(r) == 0));
        assert_eq!(i.memory.read_byte(0x50), 0xf0);
    }

    #[test]
    fn test_program_load_ok() -> Result<()> {
        let mut i = interpreter();
        let prog: &[u8] = &[0x00, 0xe0, 0x12, 0x00];
        assert_eq!(i.load_program(prog)?, 4);
        assert_eq!(i.memory.get_ro_slice(0x200, 4), prog);
        assert_eq!(i.memory.read_byte(0x204), 0);
        Ok(())
    }

    #[test]
    fn test_load_program_resets_first() -> Result<()> {
        let mut i = interpreter();
        i.load_program(&[0x6a, 0x42, 0x22, 0x10])?;
        i.cycle()?;
        i.cycle()?;
        assert_eq!(i.register(0xa), 0x42);
        assert_eq!(i.stack_depth(), 1);

        i.load_program(&[0x00, 0xe0])?;
        assert_eq!(i.register(0xa), 0);
        assert_eq!(i.pc(), 0x200);
        assert_eq!(i.stack_depth(), 0);
        // the tail of the old program is gone
        assert_eq!(i.memory.get_ro_slice(0x202, 2), &[0, 0]);
        Ok(())
    }

    #[test]
    fn test_program_too_large_leaves_reset_state() -> Result<()> {
        let mut i = interpreter();
        i.load_program(&[0x6a, 0x42, 0xa3, 0x21])?;
        i.cycle()?;
        i.cycle()?;

        let rom = vec![0x11; PROGRAM_CAPACITY + 1];
        assert_eq!(
            i.load_program(&rom),
            Err(Fault::Capacity {
                len: PROGRAM_CAPACITY + 1,
                capacity: PROGRAM_CAPACITY
            })
        );
        assert_eq!(i.pc(), 0x200);
        assert_eq!(i.index(), 0);
        assert_eq!(i.register(0xa), 0);
        assert!(i.memory.get_ro_slice(0x200, PROGRAM_CAPACITY).iter().all(|b| *b == 0));
        assert_eq!(i.memory.read_byte(0x50), 0xf0);
        Ok(())
    }

    #[test]
    fn test_fetch_past_memory_faults() -> Result<()> {
        let mut i = interpreter();
        // JP 0xFFF, which leaves only one byte to fetch from
        i.load_program(&[0x1f, 0xff])?;
        i.cycle()?;
        assert_eq!(i.cycle(), Err(Fault::Address { pc: 0x0fff }));
        assert_eq!(i.pc(), 0x0fff);
        Ok(())
    }

    #[test]
    fn test_fetch_from_last_word_ok() -> Result<()> {
        let mut i = interpreter();
        i.load_program(&[0x1f, 0xfe])?;
        i.memory.write(&[0x60, 0x01], 0x0ffe);
        i.cycle()?;
        i.cycle()?;
        assert_eq!(i.register(0), 1);
        // next fetch is off the end
        assert_eq!(i.cycle(), Err(Fault::Address { pc: 0x1000 }));
        Ok(())
    }

    #[test]
    fn test_undefined_instruction_faults() -> Result<()> {
        let mut i = interpreter();
        i.load_program(&[0x00, 0xe0, 0x8f, 0xf8])?;
        i.cycle()?;
        assert_eq!(
            i.cycle(),
            Err(Fault::Decode {
                opcode: 0x8ff8,
                pc: 0x202
            })
        );
        Ok(())
    }

    #[test]
    fn test_display_updated_is_consumed() -> Result<()> {
        let mut i = interpreter();
        i.load_program(&[0x60, 0x01, 0x00, 0xe0])?;
        assert!(i.take_display_updated());
        assert!(!i.display_updated());
        i.cycle()?;
        assert!(!i.display_updated());
        i.cycle()?;
        assert!(i.take_display_updated());
        assert!(!i.take_display_updated());
        Ok(())
    }

    #[test]
    fn test_set_keys_filters_and_dedups() {
        let mut i = interpreter();
        i.set_keys(&[0x3, 0x13, 0xf, 0x3]);
        assert_eq!(i.keys, vec![0x3, 0xf]);
        i.set_keys(&[]);
        assert!(i.keys.is_empty());
    }

    #[test]
    fn test_reset_keeps_user_flags() {
        let mut i = interpreter();
        i.user_flags[3] = 9;
        i.reset();
        assert_eq!(i.user_flags[3], 9);
    }

    #[test]
    fn test_timer_clock_runs_independently_of_cycles() -> io::Result<()> {
        let mut i = interpreter();
        i.timers.set_delay(10);
        i.start_timer_clock()?;
        // starting twice is harmless
        i.start_timer_clock()?;
        thread::sleep(Duration::from_millis(500));
        assert_eq!(i.delay_timer(), 0);
        Ok(())
    }

    #[test]
    fn test_debug_level_does_not_change_behaviour() -> Result<()> {
        let prog = [0x60, 0x05, 0xa0, 0x50, 0xd0, 0x05, 0x80, 0x04];
        let mut quiet = Interpreter::new(Config::default().with_seed(3));
        let mut loud = Interpreter::new(Config::default().with_seed(3).with_debug(DebugLevel::Full));
        quiet.load_program(&prog)?;
        loud.load_program(&prog)?;
        for _ in 0..4 {
            quiet.cycle()?;
            loud.cycle()?;
        }
        assert_eq!(quiet.v, loud.v);
        assert_eq!(quiet.pc(), loud.pc());
        assert_eq!(
            quiet.framebuffer.lit().collect::<Vec<_>>(),
            loud.framebuffer.lit().collect::<Vec<_>>()
        );
        Ok(())
    }
}
