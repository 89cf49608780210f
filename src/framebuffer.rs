pub const LO_RES_WIDTH: usize = 64;
pub const LO_RES_HEIGHT: usize = 32;
pub const HI_RES_WIDTH: usize = 128;
pub const HI_RES_HEIGHT: usize = 64;

/// 0 is off; anything else is on, and the value is whatever tag the drawing
/// instruction supplied (the sprite address, so renderers can tint sprites)
pub type Pixel = u16;

/// The display grid. It is allocated once at hi-res size with a fixed row
/// stride; low-res mode just uses the top-left 64x32 corner of it.
#[derive(Clone)]
pub struct Framebuffer {
    cells: Box<[Pixel]>,
    hi_res: bool,
}

impl Framebuffer {
    pub fn new() -> Self {
        Framebuffer {
            cells: vec![0; HI_RES_WIDTH * HI_RES_HEIGHT].into_boxed_slice(),
            hi_res: false,
        }
    }

    pub fn hi_res(&self) -> bool {
        self.hi_res
    }

    /// Switch resolution. Cells are left alone: low-res pixels are the top
    /// left corner of the hi-res screen, and hi-res pixels outside it are
    /// hidden until hi-res comes back.
    pub fn set_hi_res(&mut self, on: bool) {
        self.hi_res = on;
    }

    pub fn width(&self) -> usize {
        if self.hi_res {
            HI_RES_WIDTH
        } else {
            LO_RES_WIDTH
        }
    }

    pub fn height(&self) -> usize {
        if self.hi_res {
            HI_RES_HEIGHT
        } else {
            LO_RES_HEIGHT
        }
    }

    /// pixel at (x, y) of the active area; off when outside it
    pub fn get(&self, x: usize, y: usize) -> Pixel {
        if x < self.width() && y < self.height() {
            self.cells[index(x, y)]
        } else {
            0
        }
    }

    pub fn clear(&mut self) {
        self.cells.fill(0);
    }

    /// XOR a sprite onto the screen and report whether any lit pixel was
    /// turned off.
    ///
    /// Each entry of `rows` holds `bits` sprite pixels with the most
    /// significant one leftmost. Only the origin wraps around the screen; rows
    /// falling off the bottom and columns falling off the right are clipped.
    pub fn blit(&mut self, x: usize, y: usize, rows: &[u16], bits: usize, tag: Pixel) -> bool {
        let (w, h) = (self.width(), self.height());
        let (x0, y0) = (x % w, y % h);
        let mut collision = false;

        for (r, row) in rows.iter().enumerate() {
            let py = y0 + r;
            if py >= h {
                break;
            }
            for b in 0..bits {
                let px = x0 + b;
                if px >= w {
                    break;
                }
                if (row >> (bits - 1 - b)) & 1 == 0 {
                    continue;
                }
                let cell = &mut self.cells[index(px, py)];
                if *cell != 0 {
                    *cell = 0;
                    collision = true;
                } else {
                    *cell = tag;
                }
            }
        }
        collision
    }

    /// move everything down `n` rows, blanking the rows uncovered at the top
    pub fn scroll_down(&mut self, n: usize) {
        let (w, h) = (self.width(), self.height());
        for y in (0..h).rev() {
            if y >= n {
                let src = index(0, y - n);
                self.cells.copy_within(src..src + w, index(0, y));
            } else {
                self.row_mut(y).fill(0);
            }
        }
    }

    /// move everything left `n` columns, blanking the right edge
    pub fn scroll_left(&mut self, n: usize) {
        let w = self.width();
        let n = n.min(w);
        for y in 0..self.height() {
            let row = self.row_mut(y);
            row.copy_within(n.., 0);
            row[w - n..].fill(0);
        }
    }

    /// move everything right `n` columns, blanking the left edge
    pub fn scroll_right(&mut self, n: usize) {
        let w = self.width();
        let n = n.min(w);
        for y in 0..self.height() {
            let row = self.row_mut(y);
            row.copy_within(..w - n, n);
            row[..n].fill(0);
        }
    }

    /// every lit pixel of the active area as (x, y, tag)
    pub fn lit(&self) -> impl Iterator<Item = (usize, usize, Pixel)> + '_ {
        let w = self.width();
        (0..self.height()).flat_map(move |y| {
            (0..w).filter_map(move |x| match self.cells[index(x, y)] {
                0 => None,
                p => Some((x, y, p)),
            })
        })
    }

    // the active part of row y
    fn row_mut(&mut self, y: usize) -> &mut [Pixel] {
        let w = self.width();
        &mut self.cells[index(0, y)..index(0, y) + w]
    }
}

impl Default for Framebuffer {
    fn default() -> Self {
        Self::new()
    }
}

fn index(x: usize, y: usize) -> usize {
    y * HI_RES_WIDTH + x
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn row(fb: &Framebuffer, y: usize) -> Vec<Pixel> {
        (0..fb.width()).map(|x| fb.get(x, y)).collect()
    }

    fn snapshot(fb: &Framebuffer) -> Vec<Vec<Pixel>> {
        (0..fb.height()).map(|y| row(fb, y)).collect()
    }

    #[test]
    fn test_dimensions() {
        let mut fb = Framebuffer::new();
        assert_eq!((fb.width(), fb.height()), (64, 32));
        fb.set_hi_res(true);
        assert_eq!((fb.width(), fb.height()), (128, 64));
    }

    #[test]
    fn test_blit_byte() {
        let mut fb = Framebuffer::new();
        let collision = fb.blit(8, 2, &[0b10101011], 8, 1);
        assert!(!collision);
        let mut expected = vec![0; 64];
        for x in [8, 10, 12, 14, 15] {
            expected[x] = 1;
        }
        assert_eq!(row(&fb, 2), expected);
        assert_eq!(row(&fb, 1), vec![0; 64]);
        assert_eq!(row(&fb, 3), vec![0; 64]);
    }

    #[test]
    fn test_blit_carries_tag() {
        let mut fb = Framebuffer::new();
        fb.blit(0, 0, &[0x80], 8, 0x3b7);
        assert_eq!(fb.get(0, 0), 0x3b7);
    }

    #[test]
    fn test_blit_collision() {
        let mut fb = Framebuffer::new();
        assert!(!fb.blit(0, 0, &[0b1100_0000], 8, 1));
        assert!(fb.blit(1, 0, &[0b1100_0000], 8, 1));
        assert_eq!(fb.get(0, 0), 1);
        assert_eq!(fb.get(1, 0), 0);
        assert_eq!(fb.get(2, 0), 1);
    }

    #[test]
    fn test_blit_twice_restores_screen() {
        let mut fb = Framebuffer::new();
        fb.blit(3, 10, &[0x0f], 8, 2);
        let before = snapshot(&fb);
        let sprite = [0xff, 0x81, 0x81, 0xff];
        assert!(!fb.blit(1, 2, &sprite, 8, 5));
        assert_ne!(snapshot(&fb), before);
        assert!(fb.blit(1, 2, &sprite, 8, 5));
        assert_eq!(snapshot(&fb), before);
    }

    #[test]
    fn test_blit_wraps_origin_only() {
        let mut fb = Framebuffer::new();
        // origin (66, 33) wraps to (2, 1)
        fb.blit(66, 33, &[0x80], 8, 1);
        assert_eq!(fb.get(2, 1), 1);
        assert_eq!(fb.lit().count(), 1);
    }

    #[test]
    fn test_blit_clips_right_edge() {
        let mut fb = Framebuffer::new();
        fb.blit(60, 0, &[0xff], 8, 1);
        assert_eq!(fb.lit().map(|(x, _, _)| x).collect::<Vec<_>>(), vec![60, 61, 62, 63]);
        // nothing wrapped round to the left edge
        assert_eq!(fb.get(0, 0), 0);
        assert_eq!(fb.get(0, 1), 0);
    }

    #[test]
    fn test_blit_clips_bottom_edge() {
        let mut fb = Framebuffer::new();
        fb.blit(0, 30, &[0x80, 0x80, 0x80, 0x80], 8, 1);
        assert_eq!(fb.lit().map(|(_, y, _)| y).collect::<Vec<_>>(), vec![30, 31]);
        assert_eq!(fb.get(0, 0), 0);
    }

    #[test]
    fn test_blit_sixteen_wide() {
        let mut fb = Framebuffer::new();
        fb.set_hi_res(true);
        fb.blit(120, 0, &[0x8001], 16, 1);
        // the low bit lands at column 135, off screen
        assert_eq!(fb.lit().collect::<Vec<_>>(), vec![(120, 0, 1)]);
        fb.blit(0, 0, &[0x8001], 16, 1);
        assert_eq!(fb.get(0, 0), 1);
        assert_eq!(fb.get(15, 0), 1);
    }

    #[test]
    fn test_hi_res_switch_keeps_pixels() {
        let mut fb = Framebuffer::new();
        fb.blit(0, 0, &[0xf0], 8, 1);
        fb.set_hi_res(true);
        assert_eq!(fb.lit().count(), 4);
        fb.blit(100, 60, &[0xff], 8, 1);
        assert_eq!(fb.lit().count(), 12);
        // back in low-res only the corner shows, but nothing was lost
        fb.set_hi_res(false);
        assert_eq!(fb.lit().count(), 4);
        assert_eq!(fb.get(100, 60), 0);
        fb.set_hi_res(true);
        assert_eq!(fb.get(100, 60), 1);
        assert_eq!(fb.lit().count(), 12);
    }

    #[test]
    fn test_scroll_down() {
        let mut fb = Framebuffer::new();
        fb.blit(0, 0, &[0x80, 0x40], 8, 1);
        fb.scroll_down(3);
        assert_eq!(fb.lit().collect::<Vec<_>>(), vec![(0, 3, 1), (1, 4, 1)]);
    }

    #[test]
    fn test_scroll_down_off_screen() {
        let mut fb = Framebuffer::new();
        fb.blit(5, 30, &[0xff, 0xff], 8, 1);
        fb.scroll_down(2);
        assert_eq!(fb.lit().count(), 0);
    }

    #[test]
    fn test_scroll_left_and_right() {
        let mut fb = Framebuffer::new();
        fb.blit(0, 0, &[0x81], 8, 1);
        fb.scroll_right(4);
        assert_eq!(fb.lit().collect::<Vec<_>>(), vec![(4, 0, 1), (11, 0, 1)]);
        fb.scroll_left(8);
        assert_eq!(fb.lit().collect::<Vec<_>>(), vec![(3, 0, 1)]);
        fb.scroll_left(4);
        assert_eq!(fb.lit().count(), 0);
    }

    #[test]
    fn test_scroll_right_blanks_left_edge() {
        let mut fb = Framebuffer::new();
        fb.blit(60, 7, &[0xf0], 8, 1);
        fb.scroll_right(4);
        assert_eq!(fb.lit().count(), 0);
        assert_eq!(row(&fb, 7), vec![0; 64]);
    }

    #[test]
    fn test_hi_res_scroll_right() {
        let mut fb = Framebuffer::new();
        fb.set_hi_res(true);
        fb.blit(120, 40, &[0x81], 8, 1);
        fb.blit(0, 63, &[0x80], 8, 1);
        fb.scroll_right(4);
        // column 127 falls off the right edge, the rest moves over
        assert_eq!(fb.lit().collect::<Vec<_>>(), vec![(124, 40, 1), (4, 63, 1)]);
        assert_eq!(row(&fb, 40).len(), 128);
    }

    #[test]
    fn test_hi_res_scroll_down() {
        let mut fb = Framebuffer::new();
        fb.set_hi_res(true);
        fb.blit(127, 0, &[0x80], 8, 1);
        fb.blit(64, 31, &[0x80], 8, 1);
        fb.blit(5, 62, &[0x80], 8, 1);
        fb.scroll_down(2);
        assert_eq!(fb.lit().collect::<Vec<_>>(), vec![(127, 2, 1), (64, 33, 1)]);
    }

    #[test]
    fn test_clear() {
        let mut fb = Framebuffer::new();
        fb.blit(10, 10, &[0xff; 8], 8, 1);
        fb.clear();
        assert_eq!(fb.lit().count(), 0);
    }
}
