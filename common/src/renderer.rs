use embedded_hal::spi::SpiBus;
use embedded_hal_async::delay::DelayNs;

use crate::channel::AlarmChannel;
use crate::config::{ALARM_PATTERN, FLASH_HOLD_MS, Pattern};
use crate::frame::FrameBuffer;
use crate::sampler::MicSample;
use crate::ws2812::LedChain;

/// Owns the frame buffer and the LED chain; lives on the rendering core.
pub struct Renderer<SPI, D> {
    frame: FrameBuffer,
    chain: LedChain<SPI>,
    delay: D,
    pattern: &'static Pattern,
}

impl<SPI: SpiBus<u8>, D: DelayNs> Renderer<SPI, D> {
    pub fn new(chain: LedChain<SPI>, delay: D) -> Self {
        Self {
            frame: FrameBuffer::new(),
            chain,
            delay,
            pattern: &ALARM_PATTERN,
        }
    }

    /// React to one sample. Returns whether the matrix flashed.
    pub async fn handle(&mut self, sample: &MicSample) -> Result<bool, SPI::Error> {
        if !sample.alarm {
            return Ok(false);
        }
        log::info!("[render] sound level {} over threshold, flashing", sample.raw);
        self.flash().await?;
        Ok(true)
    }

    /// Show the pattern briefly, then go dark again.
    ///
    /// The dark frame is pushed even if the pattern could not be, and the
    /// first error is returned.
    pub async fn flash(&mut self) -> Result<(), SPI::Error> {
        self.frame.paint(self.pattern);
        let shown = self.chain.write(&self.frame);
        if shown.is_ok() {
            self.delay.delay_ms(FLASH_HOLD_MS).await;
        }

        self.frame.clear();
        let dark = self.chain.write(&self.frame);
        self.delay.delay_ms(FLASH_HOLD_MS).await;
        shown.and(dark)
    }

    pub fn frame(&self) -> &FrameBuffer {
        &self.frame
    }

    pub fn release(self) -> (LedChain<SPI>, D) {
        (self.chain, self.delay)
    }
}

/// Consume samples forever. A failed write is logged and the next sample handled.
pub async fn render_loop<SPI, D>(channel: &AlarmChannel, renderer: &mut Renderer<SPI, D>) -> !
where
    SPI: SpiBus<u8>,
    SPI::Error: core::fmt::Debug,
    D: DelayNs,
{
    loop {
        let sample = channel.receive().await;
        log::info!("ADC raw {}, {:.2} V", sample.raw, sample.volts);

        if let Err(e) = renderer.handle(&sample).await {
            log::error!("[render] failed to write to the LED chain: {e:?}");
        }
    }
}

#[cfg(test)]
mod tests {
    use core::convert::Infallible;

    use embassy_futures::block_on;

    use super::*;
    use crate::config::LED_COUNT;
    use crate::ws2812::tests::{RecordingSpi, decode};

    #[derive(Default)]
    struct RecordingDelay {
        waits_ns: Vec<u64>,
    }

    impl DelayNs for RecordingDelay {
        async fn delay_ns(&mut self, ns: u32) {
            self.waits_ns.push(ns as u64);
        }

        async fn delay_ms(&mut self, ms: u32) {
            self.waits_ns.push(ms as u64 * 1_000_000);
        }
    }

    fn lit(wire: &[u8]) -> usize {
        wire.chunks_exact(3).filter(|grb| grb.iter().any(|&c| c != 0)).count()
    }

    #[test]
    fn quiet_sample_does_nothing() {
        let mut spi = RecordingSpi::default();
        let mut renderer = Renderer::new(LedChain::new(&mut spi).unwrap(), RecordingDelay::default());

        let flashed = block_on(renderer.handle(&MicSample::from_raw(2100)));
        assert_eq!(flashed, Ok::<_, Infallible>(false));

        let (chain, delay) = renderer.release();
        drop(chain);
        assert!(delay.waits_ns.is_empty());
        // only the frame that darkened the chain at start-up
        assert_eq!(spi.frames.len(), 1);
    }

    #[test]
    fn loud_sample_flashes_once_and_goes_dark() {
        let mut spi = RecordingSpi::default();
        let mut renderer = Renderer::new(LedChain::new(&mut spi).unwrap(), RecordingDelay::default());

        let flashed = block_on(renderer.handle(&MicSample::from_raw(3000)));
        assert_eq!(flashed, Ok(true));
        assert!(renderer.frame().is_dark());

        let (chain, delay) = renderer.release();
        drop(chain);
        assert_eq!(delay.waits_ns, [5_000_000, 5_000_000]);

        assert_eq!(spi.frames.len(), 3);
        let pattern = decode(&spi.frames[1]);
        assert_eq!(pattern.len(), 3 * LED_COUNT);
        assert_eq!(lit(&pattern), 4);
        assert_eq!(lit(&decode(&spi.frames[2])), 0);
    }

    #[derive(Debug, PartialEq)]
    struct BusFault;

    impl embedded_hal::spi::Error for BusFault {
        fn kind(&self) -> embedded_hal::spi::ErrorKind {
            embedded_hal::spi::ErrorKind::Other
        }
    }

    /// Fails the write with index `fail_at`, records the others.
    struct FlakySpi {
        fail_at: usize,
        attempts: usize,
        frames: Vec<Vec<u8>>,
    }

    impl embedded_hal::spi::ErrorType for FlakySpi {
        type Error = BusFault;
    }

    impl SpiBus<u8> for FlakySpi {
        fn read(&mut self, _words: &mut [u8]) -> Result<(), BusFault> {
            Ok(())
        }

        fn write(&mut self, words: &[u8]) -> Result<(), BusFault> {
            let attempt = self.attempts;
            self.attempts += 1;
            if attempt == self.fail_at {
                return Err(BusFault);
            }
            self.frames.push(words.to_vec());
            Ok(())
        }

        fn transfer(&mut self, _read: &mut [u8], write: &[u8]) -> Result<(), BusFault> {
            self.write(write)
        }

        fn transfer_in_place(&mut self, words: &mut [u8]) -> Result<(), BusFault> {
            self.write(words)
        }

        fn flush(&mut self) -> Result<(), BusFault> {
            Ok(())
        }
    }

    #[test]
    fn failed_pattern_write_still_goes_dark() {
        // write 0 is the start-up frame, write 1 the pattern
        let mut spi = FlakySpi {
            fail_at: 1,
            attempts: 0,
            frames: Vec::new(),
        };
        let mut renderer = Renderer::new(LedChain::new(&mut spi).unwrap(), RecordingDelay::default());

        let result = block_on(renderer.handle(&MicSample::from_raw(4000)));
        assert_eq!(result, Err(BusFault));
        assert!(renderer.frame().is_dark());

        let (chain, delay) = renderer.release();
        drop(chain);
        assert_eq!(spi.attempts, 3);
        assert_eq!(spi.frames.len(), 2);
        assert_eq!(lit(&decode(&spi.frames[1])), 0);
        assert_eq!(delay.waits_ns, [5_000_000]);
    }

    #[test]
    fn failed_dark_write_is_reported() {
        let mut spi = FlakySpi {
            fail_at: 2,
            attempts: 0,
            frames: Vec::new(),
        };
        let mut renderer = Renderer::new(LedChain::new(&mut spi).unwrap(), RecordingDelay::default());

        let result = block_on(renderer.handle(&MicSample::from_raw(4000)));
        assert_eq!(result, Err(BusFault));
        assert!(renderer.frame().is_dark());

        drop(renderer);
        assert_eq!(spi.attempts, 3);
    }
}
