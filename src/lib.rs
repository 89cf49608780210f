//! CHIP-8 and SUPER-CHIP interpreter core, with a terminal front end.
//!
//! ## Design
//!
//! * the interpreter core knows nothing about screens, keyboards or speakers;
//!   whoever drives it hands keys in and reads the framebuffer out
//! * instructions run as fast as the driver asks; a frame loop runs a fixed
//!   number of cycles per 60Hz frame then sleeps, so not quite authentic
//! * the delay and sound timers are ticked at 60Hz by their own thread,
//!   independently of how fast instructions are executed
//! * anything a program can do wrong is a [Fault], returned from
//!   [Interpreter::cycle]; nothing in the core panics on bad programs
//!
//! Model
//!
//! Environment
//!  |-- display, input, sound
//!  |-- interpreter(config)
//!  |    |-- memory (fonts + program), framebuffer, registers, stack
//!  |    |-- timers <-- timer clock thread
//!  |    `-- fetch (opcode) -> decode (instruction) -> execute
//!  `-- frame loop, driven by main
//!       |-- keys = input.peek_keys(); commands = input.take_commands()
//!       |-- interpreter.cycle() x speed
//!       |-- if interpreter.take_display_updated() { display.draw() }
//!       `-- sound.update(interpreter.sound_timer())
pub mod config;
pub mod display;
pub mod environment;
pub mod error;
pub mod framebuffer;
pub mod input;
pub mod instruction;
pub mod interpreter;
pub mod memory;
pub mod opcode;
pub mod sound;
pub mod timer;

pub use config::{Config, DebugLevel};
pub use error::Fault;
pub use interpreter::Interpreter;
