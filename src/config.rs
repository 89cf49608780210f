use crate::timer::TIMER_HZ;
use std::fmt;
use std::str::FromStr;

/// How chatty an interpreter is about what it's doing. Only ever changes what
/// gets logged, never how the machine behaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum DebugLevel {
    #[default]
    Off,
    /// log the first draw from each distinct sprite address
    Sprite,
    /// log every fetch, decode and the machine state after each cycle
    Full,
}

impl FromStr for DebugLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "off" | "0" => Ok(DebugLevel::Off),
            "sprite" | "1" => Ok(DebugLevel::Sprite),
            "full" | "2" => Ok(DebugLevel::Full),
            other => Err(format!("unknown debug level '{}', expected off, sprite or full", other)),
        }
    }
}

impl fmt::Display for DebugLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DebugLevel::Off => "off",
            DebugLevel::Sprite => "sprite",
            DebugLevel::Full => "full",
        };
        f.write_str(s)
    }
}

/// per-interpreter settings
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub debug: DebugLevel,
    /// fixed seed for RND; entropy when None
    pub seed: Option<u64>,
    /// timer clock rate
    pub timer_hz: f64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            debug: DebugLevel::Off,
            seed: None,
            timer_hz: TIMER_HZ,
        }
    }
}

impl Config {
    pub fn with_debug(mut self, debug: DebugLevel) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}
