#![cfg_attr(not(test), no_std)]

pub mod channel;
pub mod config;
pub mod frame;
pub mod matrix;
pub mod renderer;
pub mod sampler;
pub mod ws2812;

pub use channel::{AlarmChannel, SignalChannel};
pub use frame::{FrameBuffer, IndexOutOfRange};
pub use renderer::Renderer;
pub use sampler::{LatestSample, MicSample, Sampler};
pub use ws2812::LedChain;
