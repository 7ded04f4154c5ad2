use core::fmt;

use smart_leds::RGB8;

use crate::config::{BRIGHTNESS, LED_COUNT, Pattern};
use crate::matrix;

/// A write to a position past the end of the chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IndexOutOfRange {
    pub position: usize,
    pub len: usize,
}

impl fmt::Display for IndexOutOfRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "LED position {} out of range for a chain of {}",
            self.position, self.len
        )
    }
}

impl core::error::Error for IndexOutOfRange {}

fn scale(channel: u8) -> u8 {
    libm::floorf(channel as f32 * BRIGHTNESS) as u8
}

/// The color of every LED, in transmission order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameBuffer {
    leds: [RGB8; LED_COUNT],
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameBuffer {
    pub const fn new() -> Self {
        Self {
            leds: [RGB8 { r: 0, g: 0, b: 0 }; LED_COUNT],
        }
    }

    /// Store a color at a chain position, dimmed by [`BRIGHTNESS`].
    ///
    /// Panics if `position` is not below [`LED_COUNT`].
    pub fn set(&mut self, position: usize, r: u8, g: u8, b: u8) {
        if let Err(e) = self.try_set(position, r, g, b) {
            panic!("{e}");
        }
    }

    pub fn try_set(&mut self, position: usize, r: u8, g: u8, b: u8) -> Result<(), IndexOutOfRange> {
        let len = self.leds.len();
        let led = self
            .leds
            .get_mut(position)
            .ok_or(IndexOutOfRange { position, len })?;
        *led = RGB8::new(scale(r), scale(g), scale(b));
        Ok(())
    }

    pub fn clear(&mut self) {
        self.leds.fill(RGB8::default());
    }

    /// Paint a grid pattern onto the chain.
    ///
    /// `pattern[row][col]` ends up on grid cell (row, col), so the table reads
    /// the way it shows on the panel.
    pub fn paint(&mut self, pattern: &Pattern) {
        for (row, col) in matrix::coordinates() {
            let [r, g, b] = pattern[row][col];
            self.set(matrix::index(row, col), r, g, b);
        }
    }

    pub fn get(&self, position: usize) -> Option<RGB8> {
        self.leds.get(position).copied()
    }

    pub fn pixels(&self) -> &[RGB8; LED_COUNT] {
        &self.leds
    }

    pub fn is_dark(&self) -> bool {
        self.leds.iter().all(|led| *led == RGB8::default())
    }
}
