use crate::constants::{DISPLAY_HEIGHT, DISPLAY_WIDTH};

/// A row of pixels, 1 for on and 0 for off
pub type Row = [u8; DISPLAY_WIDTH];

/// # FrameBuffer
/// The 64x32 monochrome display, indexed as `[y][x]`.
///
/// Only ever changed by clearing it or by XOR-ing sprite pixels onto it.
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    pixels: [Row; DISPLAY_HEIGHT],
}

impl FrameBuffer {
    pub fn new() -> Self {
        FrameBuffer {
            pixels: [[0; DISPLAY_WIDTH]; DISPLAY_HEIGHT],
        }
    }

    pub fn clear(&mut self) {
        self.pixels = [[0; DISPLAY_WIDTH]; DISPLAY_HEIGHT];
    }

    /// Flips the pixel at x, y (wrapping around the edges).
    /// Returns whether the pixel was on beforehand, i.e. whether it got erased.
    pub fn flip(&mut self, x: usize, y: usize) -> bool {
        let pixel = &mut self.pixels[y % DISPLAY_HEIGHT][x % DISPLAY_WIDTH];
        let was_set = *pixel == 1;
        *pixel ^= 1;
        was_set
    }

    pub fn is_set(&self, x: usize, y: usize) -> bool {
        self.pixels[y % DISPLAY_HEIGHT][x % DISPLAY_WIDTH] == 1
    }

    pub fn rows(&self) -> &[Row; DISPLAY_HEIGHT] {
        &self.pixels
    }

    pub fn is_blank(&self) -> bool {
        self.pixels.iter().flatten().all(|p| *p == 0)
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for FrameBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in self.pixels.iter() {
            let line: String = row.iter().map(|p| if *p == 1 { '#' } else { '.' }).collect();
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_blank() {
        assert!(FrameBuffer::new().is_blank());
    }

    #[test]
    fn test_flip_toggles() {
        let mut fb = FrameBuffer::new();
        assert!(!fb.flip(3, 4));
        assert!(fb.is_set(3, 4));
        assert!(fb.flip(3, 4));
        assert!(!fb.is_set(3, 4));
    }

    #[test]
    fn test_flip_wraps() {
        let mut fb = FrameBuffer::new();
        fb.flip(DISPLAY_WIDTH + 1, DISPLAY_HEIGHT + 2);
        assert_eq!(fb.rows()[2][1], 1);
    }

    #[test]
    fn test_clear() {
        let mut fb = FrameBuffer::new();
        fb.flip(0, 0);
        fb.flip(63, 31);
        fb.clear();
        assert!(fb.is_blank());
    }
}
