#![no_std]
#![no_main]
#![feature(never_type)]

extern crate alloc;
use embassy_executor::Spawner;
use esp_hal_embassy::Executor;
use log::{LevelFilter, info};

use core::{panic::PanicInfo, ptr::addr_of_mut};

use esp_hal::{
    dma::{DmaRxBuf, DmaTxBuf},
    dma_buffers,
    system::{CpuControl, Stack},
    time::Rate,
    timer::{AnyTimer, timg::TimerGroup},
};

use anyhow::Result;

use esp_hal::peripherals::Peripherals;

use static_cell::StaticCell;

use rtt_target::{ChannelMode, rprintln, rtt_init_print};

use common::AlarmChannel;
use common::channel::relay_loop;
use common::config::{LED_COUNT, SPI_FREQUENCY_HZ};
use common::ws2812::FRAME_BYTES;

mod lights;
mod microphone;
pub mod util;

use util::*;

esp_bootloader_esp_idf::esp_app_desc!();

use esp_alloc as _;

#[inline(never)]
#[panic_handler]
fn panic(info: &PanicInfo) -> ! {
    rprintln!("{}", info);
    log::error!("{info}");

    loop {
        // prevent optimization
        core::sync::atomic::compiler_fence(core::sync::atomic::Ordering::SeqCst);
    }
}

static mut APP_CORE_STACK: Stack<{ 8 * 1024 }> = Stack::new();

/// Samples travel from the sampling core (producer) to the rendering core (consumer).
static ALARM_CHANNEL: AlarmChannel = AlarmChannel::new();

#[esp_hal_embassy::main]
async fn main(spawner: Spawner) -> ! {
    log::info!("Hello, world!");

    match _main(spawner).await {
        Err(e) => {
            log::error!("Error!");
            log::error!("{e:?}");
            loop {}
        }
    }
}

async fn _main(_spawner: Spawner) -> Result<!> {
    // only the log formatting and the error messages allocate
    esp_alloc::heap_allocator!(size: 8 * 1024);

    // ---------------------------------------------------------------------------

    rtt_init_print!(ChannelMode::NoBlockTrim, 4 * 1024);

    static LOGGER: StaticCell<MultiLogger> = StaticCell::new();
    let logger = LOGGER.init(MultiLogger);

    log::set_logger(logger).map_err(|_| error_with_location!("Failed to set logger"))?;
    log::set_max_level(LevelFilter::Info);

    // ---------------------------------------------------------------------------

    let peripherals: Peripherals = esp_hal::init(esp_hal::Config::default());

    let neopixel_data_pin = peripherals.GPIO7; // 5x5 matrix data in
    let mic_pin = peripherals.GPIO1; // microphone module analog out

    let timg0 = TimerGroup::new(peripherals.TIMG0);
    let timer0: AnyTimer = timg0.timer0.into();
    let timer1: AnyTimer = timg0.timer1.into();
    esp_hal_embassy::init([timer0, timer1]);

    // Neopixel setup:
    //  DMA TX buffer size:
    //    25 LEDs * 3 bytes (g r b) * 4 (4 SPI bytes are used for one ws2812 byte) + 40 latch bytes
    //    = 340 ==> round up to 1 kB
    const _: () = assert!(FRAME_BYTES <= 1024);
    let (rx_buffer, rx_descriptors, tx_buffer, tx_descriptors) = dma_buffers!(1, 1024);
    let dma_rx_buf = DmaRxBuf::new(rx_descriptors, rx_buffer)
        .map_err(|err| error_with_location!("Failed to create DMA RX buffer: {:?}", err))?;
    let dma_tx_buf = DmaTxBuf::new(tx_descriptors, tx_buffer)
        .map_err(|err| error_with_location!("Failed to create DMA TX buffer: {:?}", err))?;

    // Without the pulse generator no LED can be driven, there is nothing to fall back to.
    let spi: esp_hal::spi::master::SpiDmaBus<'_, esp_hal::Blocking> =
        match esp_hal::spi::master::Spi::new(
            peripherals.SPI2,
            esp_hal::spi::master::Config::default().with_frequency(Rate::from_hz(SPI_FREQUENCY_HZ)),
        ) {
            Ok(spi) => spi
                .with_mosi(neopixel_data_pin)
                .with_dma(peripherals.DMA_CH1)
                .with_buffers(dma_rx_buf, dma_tx_buf),
            Err(e) => panic!("No pulse generator for the LED chain: {e:?}"),
        };
    info!("[main] LED chain of {LED_COUNT} on SPI2 at {SPI_FREQUENCY_HZ} Hz");

    // start the render task on the second core

    let mut cpu_control = CpuControl::new(peripherals.CPU_CTRL);
    let _guard = cpu_control
        .start_app_core(unsafe { &mut *addr_of_mut!(APP_CORE_STACK) }, move || {
            static EXECUTOR: StaticCell<Executor> = StaticCell::new();
            let executor = EXECUTOR.init(Executor::new());
            executor.run(|spawner| {
                spawner
                    .spawn(lights::render_task(spi, &ALARM_CHANNEL))
                    .ok();
            });
        })
        .map_err(|e| error_with_location!("Failed to start the app core: {:?}", e))?;

    let timg1 = TimerGroup::new(peripherals.TIMG1);
    microphone::start_sampling(peripherals.ADC1, mic_pin, timg1.timer0.into())?;

    // this core relays every sample to the render core, blocking while it is busy
    relay_loop(&microphone::LATEST_SAMPLE, &ALARM_CHANNEL).await
}
