use esp_hal::Blocking;
use esp_hal::spi::master::SpiDmaBus;

use common::renderer::render_loop;
use common::{AlarmChannel, LedChain, Renderer};

/// Runs on the app core: waits for samples and flashes the matrix on alarm.
#[embassy_executor::task]
pub async fn render_task(
    spi: SpiDmaBus<'static, Blocking>,
    channel: &'static AlarmChannel,
) -> ! {
    log::info!("Render task started");

    // push one dark frame so the matrix starts in a known state
    let chain = match LedChain::new(spi) {
        Ok(chain) => chain,
        Err(e) => panic!("Failed to blank the LED chain: {e:?}"),
    };
    let mut renderer = Renderer::new(chain, embassy_time::Delay);

    render_loop(channel, &mut renderer).await
}
