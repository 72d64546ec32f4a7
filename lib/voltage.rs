use crate::config::CODE_MAX;
use crate::RawSample;

/// Calibrated code to volts conversion.
pub trait VoltageLookup {
    fn code_to_voltage(&self, code: RawSample) -> f32;
}

impl<F> VoltageLookup for F
where
    F: Fn(RawSample) -> f32,
{
    fn code_to_voltage(&self, code: RawSample) -> f32 {
        self(code)
    }
}

/// Straight line between the volts at code 0 and at the top code.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Linear {
    low: f32,
    high: f32,
    code_max: RawSample,
}

impl Linear {
    pub const fn new(low: f32, high: f32, code_max: RawSample) -> Self {
        Linear {
            low,
            high,
            code_max,
        }
    }
}

impl Default for Linear {
    /// ±5 V front end on the 12-bit converter.
    fn default() -> Self {
        Linear::new(-5.0, 5.0, CODE_MAX)
    }
}

impl VoltageLookup for Linear {
    fn code_to_voltage(&self, code: RawSample) -> f32 {
        let code = code.min(self.code_max);
        self.low + (self.high - self.low) * code as f32 / self.code_max as f32
    }
}

/// Measured volts per code. Codes past the end read the last entry.
#[derive(Copy, Clone, Debug)]
pub struct Table<'a>(pub &'a [f32]);

impl VoltageLookup for Table<'_> {
    fn code_to_voltage(&self, code: RawSample) -> f32 {
        let index = (code as usize).min(self.0.len().saturating_sub(1));
        self.0.get(index).copied().unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_spans_range() {
        let lut = Linear::default();
        assert_eq!(lut.code_to_voltage(0), -5.0);
        assert_eq!(lut.code_to_voltage(4095), 5.0);
        assert_eq!(lut.code_to_voltage(u16::MAX), 5.0);
        assert!(lut.code_to_voltage(2048).abs() < 0.01);
    }

    #[test]
    fn table_clamps_index() {
        let table = [0.5, 1.0, 1.5];
        let lut = Table(&table);
        assert_eq!(lut.code_to_voltage(1), 1.0);
        assert_eq!(lut.code_to_voltage(10), 1.5);
        assert_eq!(Table(&[]).code_to_voltage(3), 0.0);
    }

    #[test]
    fn closures_are_lookups() {
        let lut = |code: RawSample| code as f32 / 1000.0;
        assert_eq!(lut.code_to_voltage(1500), 1.5);
    }
}
