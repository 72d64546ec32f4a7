#![no_main]
#![no_std]

use lib as _;

use core::sync::atomic::AtomicU16;
use cortex_m::singleton;
use heapless::spsc::Queue;
use lib::acquisition::{Acquisition, Dropped, Sampler};
use lib::config::{Config, CODE_MID, FRAME_PERIOD_MS, QUEUE_LEN, RING_CAPACITY, SAMPLE_RATE_HZ};
use lib::hw::{
    init_clock, init_lcd, Adc, AdcConfig, AdcSource, DmaBuffer, FrameTimer, HwLcd, LcdInterface,
    Panel,
};
use lib::ring::RingBuffer;
use lib::scope::Scope;
use lib::voltage::Linear;
use lib::RawSample;
use rtic::app;
use stm32g0xx_hal::delay::DelayExt;
use stm32g0xx_hal::dma::DmaExt;
use stm32g0xx_hal::dmamux::DmaMuxIndex;
use stm32g0xx_hal::gpio::{GpioExt, Speed};
use stm32g0xx_hal::time::U32Ext;

static RING: RingBuffer<RING_CAPACITY> = RingBuffer::new();
static DROPPED: Dropped = Dropped::new();
static JOYSTICK: AtomicU16 = AtomicU16::new(CODE_MID);

// ~1 ms at 64 MHz between joystick calibration readings
const CALIBRATION_SETTLE_CYCLES: u32 = 64_000;

#[app(device = stm32g0xx_hal::stm32, peripherals = true)]
const APP: () = {
    struct Resources {
        scope: Scope<'static, HwLcd, Linear, RING_CAPACITY>,
        acquisition: Acquisition<'static, AdcSource, QUEUE_LEN>,
        sampler: Sampler<'static, QUEUE_LEN, RING_CAPACITY>,
        panel: Panel,
        frame_timer: FrameTimer,
        adc: Adc,
    }

    #[init]
    fn init(cx: init::Context) -> init::LateResources {
        let core: rtic::export::Peripherals = cx.core;
        let device: stm32g0xx_hal::stm32::Peripherals = cx.device;

        // Buffers
        let queue: &'static mut Queue<_, QUEUE_LEN> =
            singleton!(: Queue<RawSample, QUEUE_LEN> = Queue::new()).unwrap();
        let dma_buffer: &'static mut DmaBuffer = singleton!(: DmaBuffer = [0; 4]).unwrap();
        let (producer, consumer) = queue.split();

        // Clock
        let mut rcc = init_clock(device.RCC);
        let mut delay = core.SYST.delay(&mut rcc);

        // GPIO
        let gpioa = device.GPIOA.split(&mut rcc);
        let gpiob = device.GPIOB.split(&mut rcc);

        // LCD
        let interface = LcdInterface::new(
            gpiob.pb0.into_push_pull_output().set_speed(Speed::VeryHigh),
            gpiob.pb1.into_push_pull_output().set_speed(Speed::VeryHigh),
            gpiob.pb2.into_push_pull_output().set_speed(Speed::VeryHigh),
            gpiob.pb3.into_push_pull_output().set_speed(Speed::VeryHigh),
            gpiob.pb4.into_push_pull_output().set_speed(Speed::VeryHigh),
            gpiob.pb5.into_push_pull_output().set_speed(Speed::VeryHigh),
            gpiob.pb6.into_push_pull_output().set_speed(Speed::VeryHigh),
            gpiob.pb7.into_push_pull_output().set_speed(Speed::VeryHigh),
            gpiob.pb8.into_push_pull_output().set_speed(Speed::VeryHigh),
            gpiob.pb9.into_push_pull_output().set_speed(Speed::VeryHigh),
        );
        let lcd = init_lcd(
            interface,
            gpioa.pa4.into_push_pull_output(),
            gpioa.pa5.into_push_pull_output(),
            &mut delay,
        )
        .unwrap();
        let scope = Scope::new(lcd, &RING, Linear::default(), Config::default()).unwrap();
        let frame_timer = FrameTimer::new(device.TIM6, FRAME_PERIOD_MS.ms(), &mut rcc);

        // Controls
        let panel = Panel::new(
            gpiob.pb10.into_pull_up_input(),
            gpiob.pb11.into_pull_up_input(),
            gpiob.pb12.into_pull_up_input(),
            &JOYSTICK,
        );

        // ADC
        let dma = device.DMA.split(&mut rcc, device.DMAMUX);
        let mut ch1 = dma.ch1;
        ch1.mux().select_peripheral(DmaMuxIndex::ADC);
        let adc = Adc::new(
            device.ADC,
            device.TIM1,
            dma_buffer,
            AdcConfig::new(gpioa.pa0, gpioa.pa1, ch1, SAMPLE_RATE_HZ.hz()),
            &mut rcc,
            &mut delay,
        );
        let acquisition = Acquisition::new(AdcSource::new(dma_buffer, &JOYSTICK), producer, &DROPPED);
        let sampler = Sampler::new(consumer, &RING);

        init::LateResources {
            scope,
            acquisition,
            sampler,
            panel,
            frame_timer,
            adc,
        }
    }

    #[idle(resources = [frame_timer, adc, panel])]
    fn idle(mut cx: idle::Context) -> ! {
        cx.resources.adc.lock(|adc: &mut Adc| {
            adc.start();
        });
        cx.resources.panel.lock(|panel: &mut Panel| {
            panel.calibrate(CALIBRATION_SETTLE_CYCLES);
        });
        cx.resources.frame_timer.lock(|timer: &mut FrameTimer| {
            timer.start();
        });
        loop {
            cortex_m::asm::nop();
        }
    }

    #[task(binds = DMA_CHANNEL1, priority = 3, resources = [adc, acquisition], spawn = [sample])]
    fn dma(cx: dma::Context) {
        let adc: &mut Adc = cx.resources.adc;
        let acquisition: &mut Acquisition<'_, _, QUEUE_LEN> = cx.resources.acquisition;

        adc.unpend();
        acquisition.on_interrupt();
        // Already pending means the sampler drains this sample as well
        let _ = cx.spawn.sample();
    }

    #[task(priority = 2, resources = [sampler])]
    fn sample(cx: sample::Context) {
        let sampler: &mut Sampler<'_, QUEUE_LEN, RING_CAPACITY> = cx.resources.sampler;
        sampler.service();
    }

    #[task(binds = TIM6, priority = 1, resources = [scope, panel, frame_timer])]
    fn tim6(cx: tim6::Context) {
        static mut REPORTED: u32 = 0;

        let frame_timer: &mut FrameTimer = cx.resources.frame_timer;
        let scope: &mut Scope<'_, _, _, RING_CAPACITY> = cx.resources.scope;
        let panel: &mut Panel = cx.resources.panel;

        frame_timer.unpend();
        scope.on_frame_tick(panel).unwrap();

        let dropped = DROPPED.count();
        if dropped != *REPORTED {
            defmt::warn!("{=u32} samples dropped", dropped.wrapping_sub(*REPORTED));
            *REPORTED = dropped;
        }
    }

    extern "C" {
        fn USART1();
    }
};
