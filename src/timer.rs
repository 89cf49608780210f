use log::debug;
use std::io;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Weak};
use std::thread;
use std::time::{Duration, Instant};

/// rate the delay and sound timers count down at
pub const TIMER_HZ: f64 = 60.0;

/// The delay and sound counters. These are the only state shared between the
/// cycle driver and the timer clock thread, so they're atomics; everything
/// else in the machine belongs to the driver.
#[derive(Debug, Default)]
pub struct Timers {
    delay: AtomicU8,
    sound: AtomicU8,
}

impl Timers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delay(&self) -> u8 {
        self.delay.load(Ordering::Acquire)
    }

    pub fn sound(&self) -> u8 {
        self.sound.load(Ordering::Acquire)
    }

    pub fn set_delay(&self, value: u8) {
        self.delay.store(value, Ordering::Release);
    }

    pub fn set_sound(&self, value: u8) {
        self.sound.store(value, Ordering::Release);
    }

    /// one 60Hz tick: both counters drop by one, stopping at zero
    pub fn tick(&self) {
        for counter in [&self.delay, &self.sound] {
            // Err just means the counter was already at zero
            let _ = counter.fetch_update(Ordering::AcqRel, Ordering::Acquire, |v| v.checked_sub(1));
        }
    }

    pub fn reset(&self) {
        self.set_delay(0);
        self.set_sound(0);
    }
}

/// Keeps a loop running at a fixed rate: work as fast as possible, then
/// spin-sleep until the next deadline. Falls back to "now" instead of trying to
/// catch up if it gets more than a whole period behind.
pub struct Pacer {
    period: Duration,
    next: Instant,
}

impl Pacer {
    pub fn new(hz: f64) -> Self {
        let period = Duration::try_from_secs_f64(1.0 / hz)
            .unwrap_or_else(|_| Duration::from_secs_f64(1.0 / TIMER_HZ));
        Pacer {
            period,
            next: Instant::now() + period,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// block until the next deadline
    pub fn wait(&mut self) {
        let now = Instant::now();
        if now < self.next {
            spin_sleep::sleep(self.next - now);
            self.next += self.period;
        } else if now - self.next > self.period {
            self.next = now + self.period;
        } else {
            self.next += self.period;
        }
    }
}

/// Background thread ticking a set of [Timers] independently of how often
/// the interpreter is cycled.
pub struct TimerClock;

impl TimerClock {
    /// Start ticking `timers` at `hz`. There's no stop switch: the thread only
    /// holds a weak reference and winds itself up once the timers are dropped.
    pub fn spawn(timers: &Arc<Timers>, hz: f64) -> io::Result<thread::JoinHandle<()>> {
        let timers: Weak<Timers> = Arc::downgrade(timers);
        thread::Builder::new()
            .name("timer-clock".to_string())
            .spawn(move || {
                let mut pacer = Pacer::new(hz);
                debug!("timer clock started, period {:?}", pacer.period());
                loop {
                    pacer.wait();
                    match timers.upgrade() {
                        Some(t) => t.tick(),
                        None => break,
                    }
                }
                debug!("timer clock stopped");
            })
    }
}
