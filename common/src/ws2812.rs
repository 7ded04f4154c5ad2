// Note: based on https://github.com/smart-leds-rs/ws2812-spi-rs
//
// The chip tells 0 and 1 apart by the width of the high pulse. Each protocol
// bit is shaped from four SPI bits clocked at `SPI_FREQUENCY_HZ`:
//   0 -> 1000 (short high, long low)
//   1 -> 1110 (long high, short low)
// so one SPI byte carries two protocol bits and one color byte takes four SPI bytes.

use embedded_hal::spi::SpiBus;
use smart_leds::RGB8;

use crate::config::{LATCH_US, LED_COUNT, SPI_FREQUENCY_HZ};
use crate::frame::FrameBuffer;

pub const SPI_BYTES_PER_COLOR: usize = 4;
pub const SPI_BYTES_PER_LED: usize = 3 * SPI_BYTES_PER_COLOR;

/// Number of all-zero SPI bytes needed to hold the line low for `latch_us` at `spi_hz`.
pub const fn latch_bytes(spi_hz: u32, latch_us: u32) -> usize {
    let bits = (spi_hz as u64 * latch_us as u64).div_ceil(1_000_000);
    bits.div_ceil(8) as usize
}

pub const WS2812_LATCH_BYTES: usize = latch_bytes(SPI_FREQUENCY_HZ, LATCH_US);
pub const FRAME_BYTES: usize = SPI_BYTES_PER_LED * LED_COUNT + WS2812_LATCH_BYTES;

const PATTERNS: [u8; 4] = [0b1000_1000, 0b1000_1110, 0b1110_1000, 0b1110_1110];

fn encode_byte(buffer: &mut [u8], mut data: u8) {
    // most significant bit first, two at a time
    for slot in buffer.iter_mut().take(SPI_BYTES_PER_COLOR) {
        let bits = (data & 0b1100_0000) >> 6;
        *slot = PATTERNS[bits as usize];
        data <<= 2;
    }
}

fn encode_pixel(buffer: &mut [u8], pixel: &RGB8) {
    // chip-native order is green, red, blue
    let (g, rest) = buffer.split_at_mut(SPI_BYTES_PER_COLOR);
    let (r, b) = rest.split_at_mut(SPI_BYTES_PER_COLOR);
    encode_byte(g, pixel.g);
    encode_byte(r, pixel.r);
    encode_byte(b, pixel.b);
}

/// Render a whole frame, latch included, into `buffer`.
pub fn encode_frame(buffer: &mut [u8; FRAME_BYTES], pixels: &[RGB8; LED_COUNT]) {
    let (data, latch) = buffer.split_at_mut(SPI_BYTES_PER_LED * LED_COUNT);
    for (chunk, pixel) in data.chunks_exact_mut(SPI_BYTES_PER_LED).zip(pixels) {
        encode_pixel(chunk, pixel);
    }
    latch.fill(0);
}

/// The LED chain, driven through an SPI bus used as pulse generator.
pub struct LedChain<SPI> {
    spi: SPI,
    buffer: [u8; FRAME_BYTES],
}

impl<SPI: SpiBus<u8>> LedChain<SPI> {
    /// Take over the bus and switch every LED off.
    pub fn new(spi: SPI) -> Result<Self, SPI::Error> {
        let mut chain = Self {
            spi,
            buffer: [0; FRAME_BYTES],
        };
        chain.write(&FrameBuffer::new())?;
        log::debug!("LED chain ready, {LED_COUNT} LEDs, {FRAME_BYTES} bytes per frame");
        Ok(chain)
    }

    /// Push a frame out. Returns once the bus has shifted out the frame and its latch.
    pub fn write(&mut self, frame: &FrameBuffer) -> Result<(), SPI::Error> {
        encode_frame(&mut self.buffer, frame.pixels());
        self.spi.write(&self.buffer)?;
        self.spi.flush()
    }

    pub fn release(self) -> SPI {
        self.spi
    }
}
