use crate::framebuffer::{Framebuffer, Pixel};
use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen};
use md5::{Digest, Md5};
use std::collections::HashMap;
use std::io;
use tui::backend::CrosstermBackend;
use tui::layout::Rect;
use tui::style::{Color, Style};
use tui::symbols::Marker;
use tui::widgets::canvas::{Canvas, Points};
use tui::widgets::{Block, Borders};
use tui::Terminal;

/// Display is used by the driver to put the framebuffer on a screen. It should
/// abstract the implementation details, so a variety of kinds of screen would
/// work.
pub trait Display {
    fn draw(&mut self, fb: &Framebuffer) -> Result<(), io::Error>;
}

/// colours a pixel can be tinted with; index 1 is the default foreground
const PALETTE: [(&str, Color); 8] = [
    ("white", Color::White),
    ("red", Color::Red),
    ("green", Color::Green),
    ("blue", Color::Blue),
    ("magenta", Color::Magenta),
    ("yellow", Color::Yellow),
    ("cyan", Color::Cyan),
    ("orange", Color::Rgb(255, 120, 0)),
];

/// Maps pixel tags (the address of the sprite that lit them) to colours, so a
/// monochrome program can be given a bit of colour from outside. Anything not
/// in the map is drawn in white.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColourMap {
    tints: HashMap<Pixel, Color>,
}

impl ColourMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, tag: Pixel, colour: Color) {
        self.tints.insert(tag, colour);
    }

    pub fn colour(&self, tag: Pixel) -> Color {
        self.tints.get(&tag).copied().unwrap_or(Color::White)
    }

    /// Parse one `ADDR=COLOUR` entry, eg. `0x2f0=red` or `2F0=3`. The address
    /// is hex; the colour is a palette name or 1-based palette index.
    pub fn parse_entry(s: &str) -> Result<(Pixel, Color), String> {
        let (addr, colour) = s
            .split_once('=')
            .ok_or_else(|| format!("expected ADDR=COLOUR, got '{}'", s))?;
        let addr = addr.trim();
        let addr = addr
            .strip_prefix("0x")
            .or_else(|| addr.strip_prefix("0X"))
            .unwrap_or(addr);
        let tag = Pixel::from_str_radix(addr, 16)
            .map_err(|e| format!("bad sprite address '{}': {}", addr, e))?;
        Ok((tag, parse_colour(colour.trim())?))
    }
}

/// Colour maps for a few well known programs, keyed by the MD5 of the ROM.
/// Entries are (sprite address, 1-based palette index).
const PRESETS: [(&str, &[(Pixel, usize)]); 5] = [
    // joust
    ("214E7C967243CC8FD9E51CCEBE248113", &[(0xa6a, 2), (0xa62, 2)]),
    // car
    ("C497BB692EA4B32A4A7B11B1373EF92F", &[(0x32c, 1), (0x330, 3), (0x338, 8)]),
    // invaders
    (
        "4FE20B951DBC801D7F682B88E672626C",
        &[(0x3b7, 2), (0x3cf, 1), (0x3bd, 4), (0x3c3, 5)],
    ),
    // brix
    (
        "D677C1B9DE941484D718799AEBAFEBF3",
        &[(0x30c, 5), (0x312, 1), (0x310, 4), (0x30e, 6)],
    ),
    // spacejam
    ("21D9FF1620FC2D8AEC0D6DBCDA92C35E", &[(0x396, 1), (0x3cc, 5), (0x397, 7)]),
];

/// upper case hex MD5 of a program, as used to look up presets
pub fn rom_hash(rom: &[u8]) -> String {
    Md5::digest(rom).iter().map(|b| format!("{:02X}", b)).collect()
}

impl ColourMap {
    /// the built-in colour map for `rom`, if it's one we know
    pub fn preset(rom: &[u8]) -> Option<ColourMap> {
        Self::preset_for_hash(&rom_hash(rom))
    }

    fn preset_for_hash(hash: &str) -> Option<ColourMap> {
        let (_, entries) = PRESETS.iter().find(|(h, _)| *h == hash)?;
        let mut map = ColourMap::new();
        for &(tag, index) in entries.iter() {
            map.insert(tag, PALETTE[index - 1].1);
        }
        Some(map)
    }
}

fn parse_colour(s: &str) -> Result<Color, String> {
    let lower = s.to_ascii_lowercase();
    if let Some((_, c)) = PALETTE.iter().find(|(name, _)| *name == lower) {
        return Ok(*c);
    }
    match lower.parse::<usize>() {
        Ok(n) if (1..=PALETTE.len()).contains(&n) => Ok(PALETTE[n - 1].1),
        _ => Err(format!("unknown colour '{}'", s)),
    }
}

/// Group lit pixels by colour, as canvas coords. Canvas y runs upwards so rows
/// are negated to keep (0, 0) at the top left.
fn points_by_colour(fb: &Framebuffer, colours: &ColourMap) -> Vec<(Color, Vec<(f64, f64)>)> {
    let mut groups: Vec<(Color, Vec<(f64, f64)>)> = Vec::new();
    for (x, y, tag) in fb.lit() {
        let colour = colours.colour(tag);
        let point = (x as f64, -(y as f64));
        match groups.iter_mut().find(|(c, _)| *c == colour) {
            Some((_, points)) => points.push(point),
            None => groups.push((colour, vec![point])),
        }
    }
    groups
}

fn x_bounds(fb: &Framebuffer) -> [f64; 2] {
    [0.0, (fb.width() - 1) as f64]
}

fn y_bounds(fb: &Framebuffer) -> [f64; 2] {
    [-((fb.height() - 1) as f64), 0.0]
}

/// display in a terminal, rendered using TUI and Crossterm
pub struct TermDisplay {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    colours: ColourMap,
}

impl TermDisplay {
    /// Take over the terminal's alternate screen. Raw mode is the input side's
    /// business.
    pub fn new(colours: ColourMap) -> Result<TermDisplay, io::Error> {
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        terminal.hide_cursor()?;
        terminal.clear()?;
        Ok(TermDisplay { terminal, colours })
    }
}

impl Drop for TermDisplay {
    fn drop(&mut self) {
        // best effort, there's nowhere left to report a failure to
        let _ = self.terminal.show_cursor();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

impl Display for TermDisplay {
    fn draw(&mut self, fb: &Framebuffer) -> Result<(), io::Error> {
        let groups = points_by_colour(fb, &self.colours);
        let (xb, yb) = (x_bounds(fb), y_bounds(fb));
        let title = if fb.hi_res() { "SUPER-CHIP" } else { "CHIP-8" };
        // one terminal cell per pixel, plus the border
        let size = Rect::new(0, 0, 2 + fb.width() as u16, 2 + fb.height() as u16);

        self.terminal.draw(|f| {
            let canvas = Canvas::default()
                .block(
                    Block::default()
                        .title(title)
                        .borders(Borders::ALL)
                        .style(Style::default().bg(Color::Black)),
                )
                .x_bounds(xb)
                .y_bounds(yb)
                .marker(Marker::Block)
                .paint(|ctx| {
                    for (colour, coords) in &groups {
                        ctx.draw(&Points {
                            coords,
                            color: *colour,
                        });
                    }
                });
            f.render_widget(canvas, size);
        })?;
        Ok(())
    }
}

/// useful for running without a terminal; counts frames
#[derive(Default)]
pub struct DummyDisplay {
    pub frames: usize,
}

impl DummyDisplay {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Display for DummyDisplay {
    fn draw(&mut self, _fb: &Framebuffer) -> Result<(), io::Error> {
        self.frames += 1;
        Ok(())
    }
}
