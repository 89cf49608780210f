use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info, Level};
use std::fs;
use std::path::PathBuf;
use std::process;

use superchip8::display::{ColourMap, TermDisplay};
use superchip8::environment::{Environment, Flow, FrameError};
use superchip8::input::StdinInput;
use superchip8::sound::{Mute, SimpleBeep, Sound};
use superchip8::timer::{Pacer, TIMER_HZ};
use superchip8::{Config, DebugLevel, Interpreter};

/// Runs a CHIP-8 or SUPER-CHIP program in the terminal.
///
/// Keypad is the left of the keyboard (1234 / QWER / ASDF / ZXCV). Esc quits,
/// F5 pauses, F6 steps while paused, F11 toggles tracing, F12 resets. Logs go
/// to stderr, so redirect it somewhere (eg. `2>chip8.log`) to keep the screen
/// clean. A few well known programs get coloured unless --tint is given.
#[derive(Parser, Debug)]
#[command(name = "superchip8", version, about, long_about = None)]
struct Args {
    /// program to run
    rom: PathBuf,

    /// instructions per 60Hz frame
    #[arg(short, long, default_value_t = 10, value_parser = clap::value_parser!(u32).range(1..))]
    speed: u32,

    /// off, sprite or full
    #[arg(short, long, default_value_t = DebugLevel::Off)]
    debug: DebugLevel,

    /// fixed seed for RND, for repeatable runs
    #[arg(long)]
    seed: Option<u64>,

    /// no beeping
    #[arg(short, long)]
    mute: bool,

    /// colour the sprite at ADDR (hex), eg. --tint 2f0=red; repeatable
    #[arg(short, long, value_name = "ADDR=COLOUR", value_parser = ColourMap::parse_entry)]
    tint: Vec<(u16, tui::style::Color)>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_filter = if args.debug == DebugLevel::Off { "warn" } else { "debug" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let rom = fs::read(&args.rom).with_context(|| format!("couldn't read {}", args.rom.display()))?;

    let mut config = Config::default().with_debug(args.debug);
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }
    let mut interpreter = Interpreter::new(config);
    interpreter
        .start_timer_clock()
        .context("couldn't start the timer clock")?;

    // --tint replaces any built-in colours rather than adding to them
    let colours = if args.tint.is_empty() {
        ColourMap::preset(&rom).map_or_else(ColourMap::new, |map| {
            info!("using built-in colours for {}", args.rom.display());
            map
        })
    } else {
        let mut colours = ColourMap::new();
        for (tag, colour) in args.tint {
            colours.insert(tag, colour);
        }
        colours
    };

    let mut beeper = SimpleBeep::new();
    let mut mute = Mute::new();
    let sound: &mut dyn Sound = if args.mute { &mut mute } else { &mut beeper };
    let mut input = StdinInput::new().context("couldn't put the terminal into raw mode")?;
    let mut display = TermDisplay::new(colours).context("couldn't set up the terminal display")?;

    let mut env = Environment::new(interpreter, &mut display, &mut input, sound, args.speed as usize);
    let len = env
        .load_program(rom)
        .with_context(|| format!("couldn't load {}", args.rom.display()))?;
    info!("running {} ({} bytes)", args.rom.display(), len);

    let outcome = run(&mut env);
    // put the terminal back before saying anything else
    drop(env);
    drop(display);
    drop(input);

    match outcome {
        Ok(()) => Ok(()),
        Err(FrameError::Fault(fault)) => {
            eprintln!("{}", fault);
            process::exit(fault.code());
        }
        Err(e) => Err(e.into()),
    }
}

/// frame loop; returns when asked to quit or something goes wrong
fn run(env: &mut Environment) -> Result<(), FrameError> {
    let mut pacer = Pacer::new(TIMER_HZ);
    let mut exited = false;
    loop {
        match env.run_frame() {
            Ok(Flow::Continue) => {
                exited = false;
                pacer.wait();
            }
            Ok(Flow::Exited) => {
                if !exited {
                    info!("program exited; Esc quits, F12 restarts");
                    exited = true;
                }
                pacer.wait();
            }
            Ok(Flow::Quit) => return Ok(()),
            Err(FrameError::Fault(fault)) => {
                error!("{}", fault);
                env.interpreter().dump(Level::Error);
                return Err(FrameError::Fault(fault));
            }
            Err(e) => return Err(e),
        }
    }
}
