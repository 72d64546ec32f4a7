use core::convert::Infallible;
use core::sync::atomic::{AtomicU16, Ordering};
use stm32g0xx_hal::hal::digital::v2::InputPin;

use crate::input::{AxisFilter, Button, Controls, EdgeDetector};

/// Front panel: three active low buttons and the joystick vertical axis.
pub struct Panel<F, U, M> {
    freeze: F,
    unfreeze: U,
    menu: M,
    edges: [EdgeDetector; 3],
    axis: AxisFilter,
    joystick: &'static AtomicU16,
}

impl<F, U, M> Panel<F, U, M>
where
    F: InputPin<Error = Infallible>,
    U: InputPin<Error = Infallible>,
    M: InputPin<Error = Infallible>,
{
    const CALIBRATION_READINGS: usize = 8;

    /// `joystick` holds the latest axis code, published by the ADC interrupt.
    pub fn new(freeze: F, unfreeze: U, menu: M, joystick: &'static AtomicU16) -> Self {
        Panel {
            freeze,
            unfreeze,
            menu,
            edges: [EdgeDetector::new(), EdgeDetector::new(), EdgeDetector::new()],
            axis: AxisFilter::new(),
            joystick,
        }
    }

    /// Samples the resting joystick. The ADC must already be running and the
    /// stick left alone.
    pub fn calibrate(&mut self, settle_cycles: u32) {
        let joystick = self.joystick;
        self.axis
            .calibrate((0..Self::CALIBRATION_READINGS).map(|_| {
                cortex_m::asm::delay(settle_cycles);
                joystick.load(Ordering::Relaxed)
            }));
    }
}

impl<F, U, M> Controls for Panel<F, U, M>
where
    F: InputPin<Error = Infallible>,
    U: InputPin<Error = Infallible>,
    M: InputPin<Error = Infallible>,
{
    fn button_edge(&mut self, button: Button) -> bool {
        let (pressed, edge) = match button {
            Button::Freeze => (pressed(&self.freeze), &mut self.edges[0]),
            Button::Unfreeze => (pressed(&self.unfreeze), &mut self.edges[1]),
            Button::Menu => (pressed(&self.menu), &mut self.edges[2]),
        };
        edge.update(pressed)
    }

    fn read_secondary_axis(&mut self) -> i32 {
        self.axis.update(self.joystick.load(Ordering::Relaxed));
        self.axis.position()
    }
}

fn pressed<P: InputPin<Error = Infallible>>(pin: &P) -> bool {
    matches!(pin.is_low(), Ok(true))
}
