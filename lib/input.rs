use crate::config::CODE_MID;
use crate::RawSample;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Button {
    Freeze,
    Unfreeze,
    Menu,
}

/// Operator inputs, sampled once per frame tick.
pub trait Controls {
    /// `true` once per press. Must be polled exactly once per tick for every button.
    fn button_edge(&mut self, button: Button) -> bool;
    /// Vertical deflection in [-100, 100], 0 inside the deadzone.
    fn read_secondary_axis(&mut self) -> i32;
}

/// Rising edge of a level sampled at a fixed period.
///
/// Sampling at the frame period is slower than contact bounce, which makes
/// this the debouncer as well.
#[derive(Default)]
pub struct EdgeDetector {
    previous: bool,
}

impl EdgeDetector {
    pub const fn new() -> Self {
        EdgeDetector { previous: false }
    }

    pub fn update(&mut self, pressed: bool) -> bool {
        let edge = pressed && !self.previous;
        self.previous = pressed;
        edge
    }
}

/// Low-pass filtered, centre-calibrated joystick axis.
pub struct AxisFilter {
    baseline: i32,
    /// Filtered code in hundredths.
    filtered: i32,
}

impl AxisFilter {
    /// Codes around the baseline that read as zero.
    const DEADZONE: i32 = 60;
    /// Smoothing factor in percent.
    const ALPHA: i32 = 15;

    pub const fn new() -> Self {
        AxisFilter {
            baseline: CODE_MID as i32,
            filtered: CODE_MID as i32 * 100,
        }
    }

    /// Takes the resting position from the average of `readings`.
    pub fn calibrate(&mut self, readings: impl IntoIterator<Item = RawSample>) {
        let (sum, count) = readings
            .into_iter()
            .fold((0i32, 0i32), |(sum, count), raw| (sum + raw as i32, count + 1));
        if count > 0 {
            self.baseline = sum / count;
            self.filtered = self.baseline * 100;
        }
        debug!("joystick baseline {=i32}", self.baseline);
    }

    pub fn update(&mut self, raw: RawSample) {
        self.filtered += (raw as i32 * 100 - self.filtered) * AxisFilter::ALPHA / 100;
    }

    pub fn position(&self) -> i32 {
        let offset = self.filtered / 100 - self.baseline;
        if offset.abs() < AxisFilter::DEADZONE {
            return 0;
        }
        (offset * 100 / CODE_MID as i32).clamp(-100, 100)
    }
}

impl Default for AxisFilter {
    fn default() -> Self {
        Self::new()
    }
}
