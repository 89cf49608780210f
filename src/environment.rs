use crate::display::Display;
use crate::error::Fault;
use crate::config::DebugLevel;
use crate::input::{Command, Input};
use crate::interpreter::Interpreter;
use crate::sound::Sound;
use log::{info, warn, Level};
use std::io;
use thiserror::Error;

/// Whatever stops a frame: the program faulting, or the terminal going away.
#[derive(Debug, Error)]
pub enum FrameError {
    #[error(transparent)]
    Fault(#[from] Fault),
    #[error("display or input failed: {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    /// the program hit a super-chip EXIT and is spinning on it
    Exited,
    Quit,
}

/// Ties an interpreter to the devices around it and runs it a frame at a
/// time. Pacing the frames is left to the caller.
pub struct Environment<'a> {
    interpreter: Interpreter,
    display: &'a mut dyn Display,
    input: &'a mut dyn Input,
    sound: &'a mut dyn Sound,
    /// kept for soft resets
    rom: Vec<u8>,
    /// cycles per frame
    speed: usize,
    paused: bool,
}

impl<'a> Environment<'a> {
    pub fn new(
        interpreter: Interpreter,
        display: &'a mut dyn Display,
        input: &'a mut dyn Input,
        sound: &'a mut dyn Sound,
        speed: usize,
    ) -> Self {
        Environment {
            interpreter,
            display,
            input,
            sound,
            rom: Vec::new(),
            speed: speed.max(1),
            paused: false,
        }
    }

    /// load `rom`, keeping a copy so it can be reloaded on reset
    pub fn load_program(&mut self, rom: Vec<u8>) -> Result<usize, Fault> {
        let len = self.interpreter.load_program(&rom)?;
        self.rom = rom;
        Ok(len)
    }

    pub fn interpreter(&self) -> &Interpreter {
        &self.interpreter
    }

    pub fn paused(&self) -> bool {
        self.paused
    }

    /// One frame: read input, act on any commands, run `speed` cycles (or one
    /// if stepping while paused), then redraw and update the sound if needed.
    pub fn run_frame(&mut self) -> Result<Flow, FrameError> {
        let keys = self.input.peek_keys()?;
        self.interpreter.set_keys(keys);

        let mut step = false;
        for command in self.input.take_commands() {
            match command {
                Command::Quit => {
                    info!("quit requested");
                    return Ok(Flow::Quit);
                }
                Command::Pause => {
                    self.paused = !self.paused;
                    info!("{}", if self.paused { "paused" } else { "resumed" });
                }
                Command::Step => step = true,
                Command::Reset => {
                    self.interpreter.load_program(&self.rom)?;
                }
                Command::ToggleDebug => {
                    let level = match self.interpreter.config().debug {
                        DebugLevel::Off => DebugLevel::Full,
                        _ => DebugLevel::Off,
                    };
                    self.interpreter.set_debug(level);
                    info!("debug level now {}", level);
                }
            }
        }

        let cycles = match (self.paused, step) {
            (false, _) => self.speed,
            (true, true) => 1,
            (true, false) => 0,
        };
        for _ in 0..cycles {
            self.interpreter.cycle()?;
        }
        if self.paused && step {
            self.interpreter.dump(Level::Info);
        }

        if self.interpreter.take_display_updated() {
            self.display.draw(self.interpreter.framebuffer())?;
        }
        // no speaker is no reason to stop the program
        if let Err(e) = self.sound.update(self.interpreter.sound_timer()) {
            warn!("sound failed: {}", e);
        }
        if self.interpreter.exited() {
            return Ok(Flow::Exited);
        }
        Ok(Flow::Continue)
    }
}
