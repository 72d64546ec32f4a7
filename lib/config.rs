use crate::timebase::Timebase;
use crate::waveform::Transform;

/// ADC trigger rate.
pub const SAMPLE_RATE_HZ: u32 = 10_000;
/// Raw samples retained for rendering, must be a power of two.
pub const RING_CAPACITY: usize = 8192;
/// Interrupt to sampler queue. Holds `QUEUE_LEN - 1` samples, ~100 ms at 10 kHz.
pub const QUEUE_LEN: usize = 1024;
pub const FRAME_PERIOD_MS: u32 = 16;

/// 12-bit converter.
pub const CODE_MAX: u16 = 4095;
pub const CODE_MID: u16 = 2048;

/// Normalized joystick units per cursor row.
pub const CURSOR_SENSITIVITY: i32 = 25;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RenderStrategy {
    /// Repaint the whole trace on every throttled tick.
    FullFrame,
    /// Draw one new column per throttled tick, restarting the page at the right edge.
    Incremental,
}

#[derive(Copy, Clone, Debug)]
pub struct Config {
    pub sample_rate_hz: u32,
    pub timebase: Timebase,
    pub strategy: RenderStrategy,
    pub transform: Transform,
    pub sensitivity: i32,
}

impl Config {
    pub fn with_strategy(mut self, strategy: RenderStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_timebase(mut self, timebase: Timebase) -> Self {
        self.timebase = timebase;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            sample_rate_hz: SAMPLE_RATE_HZ,
            timebase: Timebase::default(),
            strategy: RenderStrategy::FullFrame,
            transform: Transform::default(),
            sensitivity: CURSOR_SENSITIVITY,
        }
    }
}
