//! Build-time parameters. Nothing here is read at runtime from storage.

// ---------------------------------------------------------------- matrix

/// Width and height of the square LED matrix.
pub const MATRIX_SIDE: usize = 5;
pub const LED_COUNT: usize = MATRIX_SIDE * MATRIX_SIDE;

/// Every channel value handed to the frame buffer is multiplied by this
/// before it is stored, so full scale (255) ends up as 12.
pub const BRIGHTNESS: f32 = 0.05;

// ------------------------------------------------------------ LED timing

/// Protocol bit rate of the LED chain.
pub const LED_BIT_RATE_HZ: u32 = 800_000;

/// One protocol bit is shaped from 4 SPI bits, so two protocol bits fit in one SPI byte.
pub const SPI_BITS_PER_LED_BIT: u32 = 4;
pub const SPI_FREQUENCY_HZ: u32 = LED_BIT_RATE_HZ * SPI_BITS_PER_LED_BIT;

/// Minimum time the line has to stay low after a frame so the chips latch it.
pub const LATCH_US: u32 = 100;

// ------------------------------------------------------------ microphone

/// Full-scale reading of the 12-bit ADC.
pub const ADC_MAX: u16 = 4095;
/// Reference voltage corresponding to `ADC_MAX`.
pub const MIC_VREF: f32 = 3.3;
/// A reading strictly above this raises the alarm (roughly conversational loudness).
pub const ALARM_THRESHOLD: u16 = 2100;
pub const SAMPLE_PERIOD_MS: u64 = 20;

// -------------------------------------------------------------- renderer

/// How long the pattern, and then the dark frame after it, stay on the matrix.
pub const FLASH_HOLD_MS: u32 = 5;

/// Depth of the queue between the sampling core and the rendering core.
pub const ALARM_QUEUE_DEPTH: usize = 1;

/// Target colors (RGB) of the alarm flash.
///
/// Indexed `[row][col]` as laid out on the panel, see [`crate::frame::FrameBuffer::paint`].
pub type Pattern = [[[u8; 3]; MATRIX_SIDE]; MATRIX_SIDE];

const OFF: [u8; 3] = [0, 0, 0];
const RED: [u8; 3] = [255, 0, 0];

pub const ALARM_PATTERN: Pattern = [
    [OFF, OFF, RED, OFF, OFF],
    [OFF, OFF, RED, OFF, OFF],
    [OFF, OFF, RED, OFF, OFF],
    [OFF, OFF, OFF, OFF, OFF],
    [OFF, OFF, RED, OFF, OFF],
];
