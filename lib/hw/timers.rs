use stm32g0xx_hal::hal::timer::CountDown;
use stm32g0xx_hal::hal::PwmPin as PwmPinTrait;
use stm32g0xx_hal::rcc::Rcc;
use stm32g0xx_hal::stm32g0::stm32g070::{TIM1, TIM6};
use stm32g0xx_hal::time::{Hertz, MicroSecond};
use stm32g0xx_hal::timer::pins::TimerPin;
use stm32g0xx_hal::timer::pwm::{Pwm, PwmExt, PwmPin};
use stm32g0xx_hal::timer::{Channel4, Timer, TimerExt};

/// Periodic interrupt driving the render side.
pub struct FrameTimer {
    timer: Timer<TIM6>,
    period: MicroSecond,
}

impl FrameTimer {
    pub fn new(pac_tim: TIM6, period: MicroSecond, rcc: &mut Rcc) -> Self {
        FrameTimer {
            timer: pac_tim.timer(rcc),
            period,
        }
    }

    pub fn start(&mut self) {
        self.timer.clear_irq();
        self.timer.listen();
        self.timer.start(self.period);
    }

    pub fn unpend(&mut self) {
        self.timer.clear_irq();
    }
}

struct UnusedPin;

impl TimerPin<TIM1> for UnusedPin {
    type Channel = Channel4;

    fn setup(&self) {
        // Do nothing
    }

    fn release(self) -> Self {
        self
    }
}

/// TIM1 channel 4 PWM, the ADC external trigger 1.
pub struct SampleTimer {
    _timer: Pwm<TIM1>,
    trig: PwmPin<TIM1, Channel4>,
}

impl SampleTimer {
    pub fn new(pac_timer: TIM1, freq: Hertz, rcc: &mut Rcc) -> Self {
        let timer = pac_timer.pwm(freq, rcc);
        let trig = timer.bind_pin(UnusedPin);
        SampleTimer {
            _timer: timer,
            trig,
        }
    }

    pub fn start(&mut self) {
        self.trig.set_duty(self.trig.get_max_duty() / 2);
        self.trig.enable();
    }
}
