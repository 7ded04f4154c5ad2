use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;

use crate::config::{ADC_MAX, ALARM_THRESHOLD, MIC_VREF};

/// One microphone reading and what it means.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MicSample {
    /// Raw ADC count, 0..=ADC_MAX
    pub raw: u16,
    /// The reading in volts
    pub volts: f32,
    /// Whether the reading was above the loudness threshold
    pub alarm: bool,
}

impl MicSample {
    pub fn from_raw(raw: u16) -> Self {
        Self {
            raw,
            volts: normalize(raw),
            alarm: is_loud(raw),
        }
    }
}

pub fn normalize(raw: u16) -> f32 {
    raw as f32 * MIC_VREF / ADC_MAX as f32
}

/// The threshold itself does not count as loud.
pub fn is_loud(raw: u16) -> bool {
    raw > ALARM_THRESHOLD
}

/// Latest sample published by the timer interrupt.
///
/// `signal` never blocks, so it is safe to call from the tick handler; a
/// reading nobody picked up yet is replaced by the newer one.
pub type LatestSample = Signal<CriticalSectionRawMutex, MicSample>;

/// Turns periodic ADC readings into samples and publishes them. Owned by the timer handler.
pub struct Sampler<'a> {
    latest: &'a LatestSample,
}

impl<'a> Sampler<'a> {
    pub const fn new(latest: &'a LatestSample) -> Self {
        Self { latest }
    }

    /// Evaluate one reading and hand it to whoever waits on the published sample.
    /// Bounded work only, this runs once per timer tick.
    pub fn tick(&mut self, raw: u16) -> MicSample {
        let sample = MicSample::from_raw(raw.min(ADC_MAX));
        self.latest.signal(sample);
        sample
    }
}
