use core::cell::RefCell;

use critical_section::Mutex;
use esp_hal::{
    Blocking,
    analog::adc::{Adc, AdcConfig, AdcPin, Attenuation},
    handler,
    peripherals::{ADC1, GPIO1},
    time::Duration,
    timer::{AnyTimer, PeriodicTimer},
};

use anyhow::Result;

use common::config::SAMPLE_PERIOD_MS;
use common::{LatestSample, Sampler};

use crate::error_with_location;

type MicPin = AdcPin<GPIO1<'static>, ADC1<'static>>;

struct Microphone {
    timer: PeriodicTimer<'static, Blocking>,
    adc: Adc<'static, ADC1<'static>, Blocking>,
    pin: MicPin,
    sampler: Sampler<'static>,
}

// Only touched from `on_tick` once sampling has started.
static MICROPHONE: Mutex<RefCell<Option<Microphone>>> = Mutex::new(RefCell::new(None));

/// Written by the tick handler, read by the relay loop.
pub static LATEST_SAMPLE: LatestSample = LatestSample::new();

/// Start reading the microphone every `SAMPLE_PERIOD_MS` from the timer interrupt.
pub fn start_sampling(
    adc1: ADC1<'static>,
    mic_pin: GPIO1<'static>,
    timer: AnyTimer<'static>,
) -> Result<()> {
    let mut adc_config = AdcConfig::new();
    // 11 dB gives the full 0..3.3 V swing of the microphone module
    let pin = adc_config.enable_pin(mic_pin, Attenuation::_11dB);
    let adc = Adc::new(adc1, adc_config);

    let mut timer = PeriodicTimer::new(timer);
    timer.set_interrupt_handler(on_tick);

    // the handler must find the microphone in place on its very first tick
    critical_section::with(|cs| {
        timer.listen();
        timer
            .start(Duration::from_millis(SAMPLE_PERIOD_MS))
            .map_err(|e| error_with_location!("Failed to start the sampling timer: {:?}", e))?;
        MICROPHONE.borrow_ref_mut(cs).replace(Microphone {
            timer,
            adc,
            pin,
            sampler: Sampler::new(&LATEST_SAMPLE),
        });
        Ok::<_, anyhow::Error>(())
    })?;

    log::info!("[mic] sampling every {SAMPLE_PERIOD_MS} ms");
    Ok(())
}

#[handler]
fn on_tick() {
    critical_section::with(|cs| {
        let mut microphone = MICROPHONE.borrow_ref_mut(cs);
        let Some(mic) = microphone.as_mut() else {
            return;
        };
        mic.timer.clear_interrupt();

        // a one-shot conversion takes a few microseconds
        if let Ok(raw) = nb::block!(mic.adc.read_oneshot(&mut mic.pin)) {
            mic.sampler.tick(raw);
        }
    });
}
