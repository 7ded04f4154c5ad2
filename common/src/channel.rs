use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::{Channel, TrySendError};

use crate::config::ALARM_QUEUE_DEPTH;
use crate::sampler::{LatestSample, MicSample};

/// Blocking FIFO handoff between the two cores.
///
/// `send` waits while the queue holds `N` values, `receive` waits while it is
/// empty. Nothing is ever dropped.
pub struct SignalChannel<T, const N: usize = 1> {
    inner: Channel<CriticalSectionRawMutex, T, N>,
}

/// The queue between the sampling core and the rendering core.
pub type AlarmChannel = SignalChannel<MicSample, ALARM_QUEUE_DEPTH>;

impl<T, const N: usize> Default for SignalChannel<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const N: usize> SignalChannel<T, N> {
    pub const fn new() -> Self {
        Self {
            inner: Channel::new(),
        }
    }

    pub async fn send(&self, value: T) {
        self.inner.send(value).await
    }

    pub async fn receive(&self) -> T {
        self.inner.receive().await
    }

    /// Hands the value back if the queue is full.
    pub fn try_send(&self, value: T) -> Result<(), T> {
        self.inner.try_send(value).map_err(|TrySendError::Full(v)| v)
    }

    pub fn try_receive(&self) -> Option<T> {
        self.inner.try_receive().ok()
    }

    pub fn is_full(&self) -> bool {
        self.inner.is_full()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

/// Forward the next sample published by the timer to the rendering core.
///
/// Waits for a fresh sample, then for room in the queue, so this never spins.
pub async fn relay_once(latest: &LatestSample, channel: &AlarmChannel) -> MicSample {
    let sample = latest.wait().await;
    channel.send(sample).await;
    sample
}

pub async fn relay_loop(latest: &LatestSample, channel: &AlarmChannel) -> ! {
    loop {
        relay_once(latest, channel).await;
    }
}

#[cfg(test)]
mod tests {
    use core::cell::RefCell;

    use embassy_futures::block_on;
    use embassy_futures::join::join;

    use super::*;

    #[test]
    fn send_then_receive() {
        let channel: SignalChannel<bool> = SignalChannel::new();
        block_on(async {
            channel.send(true).await;
            assert!(channel.receive().await);
        });
        assert!(channel.is_empty());
    }

    #[test]
    fn values_arrive_in_send_order() {
        let channel: SignalChannel<u8, 4> = SignalChannel::new();
        block_on(async {
            for v in 0..4 {
                channel.send(v).await;
            }
            for v in 0..4 {
                assert_eq!(channel.receive().await, v);
            }
        });
    }

    #[test]
    fn single_slot_refuses_a_second_value() {
        let channel: SignalChannel<bool> = SignalChannel::new();
        assert_eq!(channel.try_send(true), Ok(()));
        assert!(channel.is_full());
        assert_eq!(channel.try_send(false), Err(false));

        assert_eq!(channel.try_receive(), Some(true));
        assert_eq!(channel.try_receive(), None);
    }

    #[test]
    fn full_slot_holds_the_producer_until_consumed() {
        let channel: SignalChannel<u32> = SignalChannel::new();
        let received = RefCell::new([0u32; 8]);

        let producer = async {
            for v in 0..8 {
                channel.send(v).await;
            }
        };
        let consumer = async {
            for slot in 0..8 {
                let v = channel.receive().await;
                received.borrow_mut()[slot] = v;
            }
        };
        block_on(join(producer, consumer));

        assert_eq!(*received.borrow(), [0, 1, 2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn relay_forwards_the_published_sample() {
        let latest = LatestSample::new();
        let channel = AlarmChannel::new();
        latest.signal(MicSample::from_raw(2101));

        let relayed = block_on(relay_once(&latest, &channel));
        assert!(relayed.alarm);
        assert_eq!(channel.try_receive(), Some(relayed));
        assert!(latest.try_take().is_none());
    }
}
