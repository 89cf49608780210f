use crossterm::event::{poll, read, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal;
use log::debug;
use std::collections::{HashMap, VecDeque};
use std::io;
use std::time::Duration;

/// left-hand side of a qwerty keyboard laid over the COSMAC hex keypad:
///   1 2 3 4      1 2 3 C
///   q w e r  =>  4 5 6 D
///   a s d f      7 8 9 E
///   z x c v      A 0 B F
const CHIP8_CONVENTIONAL_KEYMAP: [(char, u8); 16] = [
    ('x', 0x00),
    ('1', 0x01),
    ('2', 0x02),
    ('3', 0x03),
    ('q', 0x04),
    ('w', 0x05),
    ('e', 0x06),
    ('a', 0x07),
    ('s', 0x08),
    ('d', 0x09),
    ('z', 0x0a),
    ('c', 0x0b),
    ('4', 0x0c),
    ('r', 0x0d),
    ('f', 0x0e),
    ('v', 0x0f),
];

/// Terminals only report presses, so a key counts as held for this many
/// frames after its last press (or auto-repeat).
pub const HOLD_FRAMES: u32 = 6;

/// things the user can ask of the emulator itself, rather than the program
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Quit,
    /// toggle pause
    Pause,
    /// run one cycle while paused
    Step,
    /// soft reset, reloading the same program
    Reset,
    /// flip full tracing on or off
    ToggleDebug,
}

/// reads keypresses
pub trait Input {
    /// Read whatever's waiting and return the keypad keys currently held.
    /// Called once per frame.
    fn peek_keys(&mut self) -> Result<&[u8], io::Error>;

    /// take the emulator commands seen since the last call
    fn take_commands(&mut self) -> Vec<Command>;
}

/// what a terminal key event turned out to be
#[derive(Debug, PartialEq, Eq)]
enum Mapped {
    Key(u8),
    Command(Command),
}

fn map_event(keymap: &HashMap<char, u8>, evt: KeyEvent) -> Option<Mapped> {
    match evt.code {
        // raw mode swallows SIGINT
        KeyCode::Char('c') if evt.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(Mapped::Command(Command::Quit))
        }
        KeyCode::Char(c) => keymap
            .get(&c.to_ascii_lowercase())
            .map(|k| Mapped::Key(*k)),
        KeyCode::Esc => Some(Mapped::Command(Command::Quit)),
        KeyCode::F(5) => Some(Mapped::Command(Command::Pause)),
        KeyCode::F(6) => Some(Mapped::Command(Command::Step)),
        KeyCode::F(11) => Some(Mapped::Command(Command::ToggleDebug)),
        KeyCode::F(12) => Some(Mapped::Command(Command::Reset)),
        _ => None,
    }
}

/// Keys with a countdown of frames left before they're let go.
#[derive(Debug, Default)]
struct HeldKeys {
    held: Vec<(u8, u32)>,
}

impl HeldKeys {
    fn press(&mut self, key: u8) {
        match self.held.iter_mut().find(|(k, _)| *k == key) {
            Some((_, frames)) => *frames = HOLD_FRAMES,
            None => self.held.push((key, HOLD_FRAMES)),
        }
    }

    /// one frame has gone by
    fn age(&mut self) {
        for (_, frames) in self.held.iter_mut() {
            *frames = frames.saturating_sub(1);
        }
        self.held.retain(|(_, frames)| *frames > 0);
    }

    fn keys(&self) -> impl Iterator<Item = u8> + '_ {
        self.held.iter().map(|(k, _)| *k)
    }
}

/// simple implementation of Input, using STDIN in raw mode
pub struct StdinInput {
    buffer: Vec<u8>,
    held: HeldKeys,
    commands: Vec<Command>,
    keymap: HashMap<char, u8>,
}

impl StdinInput {
    pub fn new() -> Result<Self, io::Error> {
        terminal::enable_raw_mode()?;
        Ok(StdinInput {
            buffer: Vec::new(),
            held: HeldKeys::default(),
            commands: Vec::new(),
            keymap: HashMap::from(CHIP8_CONVENTIONAL_KEYMAP),
        })
    }

    fn read_stdin(&mut self) -> Result<(), io::Error> {
        while poll(Duration::from_millis(0))? {
            if let Event::Key(evt) = read()? {
                match map_event(&self.keymap, evt) {
                    Some(Mapped::Key(k)) => self.held.press(k),
                    Some(Mapped::Command(c)) => self.commands.push(c),
                    None => debug!("can't map {:?} to a COSMAC key", evt.code),
                }
            }
        }
        Ok(())
    }
}

impl Drop for StdinInput {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

impl Input for StdinInput {
    fn peek_keys(&mut self) -> Result<&[u8], io::Error> {
        self.held.age();
        self.read_stdin()?;
        self.buffer.clear();
        self.buffer.extend(self.held.keys());
        Ok(self.buffer.as_slice())
    }

    fn take_commands(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.commands)
    }
}

/// dummy Input implementation for testing: fixed keys, and a script of
/// commands handed out one frame at a time
pub struct DummyInput {
    bytes: Vec<u8>,
    script: VecDeque<Vec<Command>>,
}

impl DummyInput {
    pub fn new(keys: &[u8]) -> Self {
        DummyInput {
            bytes: Vec::from(keys),
            script: VecDeque::new(),
        }
    }

    /// queue up the commands for the next unscripted frame
    pub fn push_frame(&mut self, commands: &[Command]) {
        self.script.push_back(commands.to_vec());
    }
}

impl Input for DummyInput {
    fn peek_keys(&mut self) -> Result<&[u8], io::Error> {
        Ok(self.bytes.as_slice())
    }

    fn take_commands(&mut self) -> Vec<Command> {
        self.script.pop_front().unwrap_or_default()
    }
}
