pub const DISPLAY_WIDTH: usize = 64;
pub const DISPLAY_HEIGHT: usize = 32;

// sprites are always one byte wide
const SPRITE_WIDTH: usize = 8;

/// Row-major pixels, `true` is lit.
pub type Frame = [bool; DISPLAY_WIDTH * DISPLAY_HEIGHT];

/// The monochrome framebuffer and its sprite compositor.
#[derive(Clone)]
pub struct Display {
    pixels: Frame,
}

impl Display {
    pub fn new() -> Self {
        Display {
            pixels: [false; DISPLAY_WIDTH * DISPLAY_HEIGHT],
        }
    }

    pub fn clear(&mut self) {
        self.pixels.fill(false);
    }

    /// XOR a sprite onto the screen with its top-left corner at `(x, y)`.
    ///
    /// Each byte of `sprite` is one row, most significant bit leftmost.
    /// Rows wrap at the bottom edge and columns wrap at the right edge,
    /// each axis on its own. Returns `true` when any lit pixel was turned off.
    pub fn draw(&mut self, x: u8, y: u8, sprite: &[u8]) -> bool {
        let mut collision = false;

        for (r, line) in sprite.iter().enumerate() {
            let row = (y as usize + r) % DISPLAY_HEIGHT;

            for c in 0..SPRITE_WIDTH {
                if line & (0x80 >> c) == 0 {
                    continue;
                }

                let col = (x as usize + c) % DISPLAY_WIDTH;
                let pixel = &mut self.pixels[row * DISPLAY_WIDTH + col];
                collision |= *pixel;
                *pixel = !*pixel;
            }
        }

        collision
    }

    pub fn get_pixel(&self, x: usize, y: usize) -> bool {
        self.pixels[(y % DISPLAY_HEIGHT) * DISPLAY_WIDTH + (x % DISPLAY_WIDTH)]
    }

    /// Read-only view for renderers.
    pub fn frame(&self) -> &Frame {
        &self.pixels
    }

    pub fn rows(&self) -> impl Iterator<Item = &[bool]> {
        self.pixels.chunks(DISPLAY_WIDTH)
    }
}

impl Default for Display {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(display: &Display) -> Vec<(usize, usize)> {
        let mut result = vec![];
        for y in 0..DISPLAY_HEIGHT {
            for x in 0..DISPLAY_WIDTH {
                if display.get_pixel(x, y) {
                    result.push((x, y));
                }
            }
        }
        result
    }

    #[test]
    fn test_draw_msb_first() {
        let mut display = Display::new();

        let collision = display.draw(2, 3, &[0b1000_0001, 0b0100_0000]);
        assert!(!collision);
        assert_eq!(lit(&display), vec![(2, 3), (9, 3), (3, 4)]);
    }

    #[test]
    fn test_clear() {
        let mut display = Display::new();
        display.draw(10, 10, &[0xFF, 0xFF]);
        assert_eq!(lit(&display).len(), 16);

        display.clear();
        assert!(lit(&display).is_empty());
        assert!(display.rows().all(|row| row.iter().all(|p| !p)));
    }

    #[test]
    fn test_draw_twice_restores_and_collides() {
        let sprite = [0xF0, 0x90, 0x90, 0x90, 0xF0];
        let mut display = Display::new();
        display.draw(0, 0, &[0xFF]);
        let before = *display.frame();

        let first = display.draw(4, 0, &sprite);
        // the top row of the glyph overlaps the pre-existing line
        assert!(first);

        let second = display.draw(4, 0, &sprite);
        assert!(second);
        assert_eq!(display.frame()[..], before[..]);
    }

    #[test]
    fn test_draw_on_empty_screen_twice() {
        let sprite = [0x3C, 0x42, 0x81];
        let mut display = Display::new();

        assert!(!display.draw(20, 7, &sprite));
        assert!(display.draw(20, 7, &sprite));
        assert!(lit(&display).is_empty());
    }

    #[test]
    fn test_no_collision_on_disjoint_pixels() {
        let mut display = Display::new();
        display.draw(0, 0, &[0xF0]);

        assert!(!display.draw(0, 0, &[0x0F]));
        assert_eq!(lit(&display).len(), 8);
    }

    #[test]
    fn test_wraps_each_axis() {
        let mut display = Display::new();

        let collision = display.draw(60, 30, &[0xFF, 0xFF, 0xFF]);
        assert!(!collision);

        let mut expected = vec![];
        for y in [0, 30, 31] {
            for x in [0, 1, 2, 3, 60, 61, 62, 63] {
                expected.push((x, y));
            }
        }
        assert_eq!(lit(&display), expected);
    }

    #[test]
    fn test_start_coordinates_wrap() {
        let mut display = Display::new();

        // 70 % 64 = 6, 33 % 32 = 1
        display.draw(70, 33, &[0x80]);
        assert_eq!(lit(&display), vec![(6, 1)]);
    }

    #[test]
    fn test_frame_is_row_major() {
        let mut display = Display::new();
        display.draw(5, 2, &[0x80]);

        assert!(display.frame()[2 * DISPLAY_WIDTH + 5]);
        assert!(display.rows().nth(2).unwrap()[5]);
    }
}
