use core::sync::atomic::{AtomicU16, Ordering};
use stm32g0xx_hal::analog::adc::Adc as HalAdc;
use stm32g0xx_hal::dma::{Channel as DmaChannel, Direction, Event, Priority, WordSize};
use stm32g0xx_hal::hal::adc::Channel as AdcChannel;
use stm32g0xx_hal::hal::blocking::delay::DelayUs;
use stm32g0xx_hal::rcc::Rcc;
use stm32g0xx_hal::stm32g0::stm32g070::{ADC, RCC, SYST, TIM1};
use stm32g0xx_hal::time::Hertz;
use stm32g0xx_hal::timer::delay::Delay;

use crate::acquisition::SampleSource;
use crate::hw::timers::SampleTimer;
use crate::RawSample;

/// Two halves of one (scope input, joystick) conversion pair each.
pub type DmaBuffer = [u16; 4];

pub struct AdcConfig<I, J, C> {
    input: I,
    joystick: J,
    dma_channel: C,
    frequency: Hertz,
}

impl<I, J, C> AdcConfig<I, J, C>
where
    I: AdcChannel<HalAdc, ID = u8>,
    J: AdcChannel<HalAdc, ID = u8>,
    C: DmaChannel,
{
    pub fn new(input: I, joystick: J, dma_channel: C, frequency: Hertz) -> Self {
        AdcConfig {
            input,
            joystick,
            dma_channel,
            frequency,
        }
    }
}

/// Timer triggered, DMA fed converter. Every trigger converts the scope input
/// and then the joystick.
pub struct Adc<I, J, C> {
    adc: InnerAdc<I, J>,
    dma: Dma<C>,
    trig: SampleTimer,
}

impl<I, J, C> Adc<I, J, C>
where
    I: AdcChannel<HalAdc, ID = u8>,
    J: AdcChannel<HalAdc, ID = u8>,
    C: DmaChannel,
{
    pub fn new(
        pac_adc: ADC,
        pac_timer: TIM1,
        buffer: &mut DmaBuffer,
        config: AdcConfig<I, J, C>,
        rcc: &mut Rcc,
        delay: &mut Delay<SYST>,
    ) -> Self {
        let adc = InnerAdc::new(pac_adc, config.input, config.joystick, rcc, delay);
        let memory_addr = buffer.as_ptr() as u32;
        let dma = Dma::new(
            config.dma_channel,
            InnerAdc::<I, J>::get_dma_address(),
            memory_addr,
            buffer.len() as u16,
        );
        let trig = SampleTimer::new(pac_timer, config.frequency, rcc);
        Adc { adc, dma, trig }
    }

    pub fn start(&mut self) {
        self.adc.start();
        self.dma.start();
        self.trig.start();
    }

    pub fn unpend(&mut self) {
        self.dma.unpend();
    }
}

/// Reads the half of the DMA buffer that has just been completed.
///
/// The half transfer and transfer complete interrupts alternate, so the
/// completed half alternates too. The joystick code is published for the
/// frame task to pick up.
pub struct AdcSource {
    buffer: &'static DmaBuffer,
    first_half: bool,
    joystick: &'static AtomicU16,
}

impl AdcSource {
    pub fn new(buffer: &'static DmaBuffer, joystick: &'static AtomicU16) -> Self {
        AdcSource {
            buffer,
            first_half: true,
            joystick,
        }
    }

    fn raw_pair(&self) -> (u16, u16) {
        let offset = if self.first_half { 0 } else { 2 };
        // Written by the DMA behind the compiler's back.
        unsafe {
            (
                core::ptr::read_volatile(&self.buffer[offset]),
                core::ptr::read_volatile(&self.buffer[offset + 1]),
            )
        }
    }
}

impl SampleSource for AdcSource {
    fn read_sample(&mut self) -> RawSample {
        let (input, joystick) = self.raw_pair();
        self.first_half ^= true;
        self.joystick.store(joystick, Ordering::Relaxed);
        input
    }
}

struct Dma<C> {
    channel: C,
}

impl<C> Dma<C>
where
    C: DmaChannel,
{
    pub fn new(channel: C, peripheral_addr: u32, memory_addr: u32, len: u16) -> Self {
        let mut dma = Dma { channel };
        dma.configure(peripheral_addr, memory_addr, len);
        dma
    }

    pub fn start(&mut self) {
        self.unpend();
        self.channel.listen(Event::HalfTransfer);
        self.channel.listen(Event::TransferComplete);
        self.channel.enable();
    }

    pub fn unpend(&mut self) {
        self.channel.clear_event(Event::HalfTransfer);
        self.channel.clear_event(Event::TransferComplete);
    }

    fn configure(&mut self, peripheral_addr: u32, memory_addr: u32, len: u16) {
        self.channel.set_priority_level(Priority::VeryHigh);
        self.channel.set_word_size(WordSize::BITS16);
        self.channel.set_direction(Direction::FromPeripheral);
        self.channel.set_peripheral_address(peripheral_addr, false);
        self.channel.set_memory_address(memory_addr, true);
        self.channel.set_transfer_length(len);
        self.channel.set_circular_mode(true);
    }
}

// The HAL driver has no external trigger or scan support, so the registers
// are driven directly.
struct InnerAdc<I, J> {
    adc: ADC,
    _input: I,
    _joystick: J,
}

impl<I, J> InnerAdc<I, J>
where
    I: AdcChannel<HalAdc, ID = u8>,
    J: AdcChannel<HalAdc, ID = u8>,
{
    pub fn new<D: DelayUs<u8>>(
        pac_adc: ADC,
        input: I,
        joystick: J,
        rcc: &mut Rcc,
        delay: &mut D,
    ) -> Self {
        InnerAdc::<I, J>::enable_clock_and_reset(rcc);
        let mut adc = InnerAdc {
            adc: pac_adc,
            _input: input,
            _joystick: joystick,
        };
        adc.disable();
        adc.enable_vreg(delay);
        adc.calibrate();
        adc.enable();
        adc.configure();
        adc
    }

    pub fn start(&mut self) {
        self.adc.isr.write(|w| {
            w.eoc().set_bit();
            w.eos().set_bit()
        });
        self.adc.cr.modify(|_, w| w.adstart().set_bit());
    }

    pub fn get_dma_address() -> u32 {
        unsafe { &(*ADC::ptr()).dr as *const _ as u32 }
    }

    fn configure(&mut self) {
        self.adc.cfgr1.write(|w| unsafe {
            // External trigger rising edge
            w.exten().bits(0b01);
            // External trigger 1
            w.extsel().bits(0b001);
            // Right alignment
            w.align().clear_bit();
            // 12-bit resolution
            w.res().bits(0b00);
            // Circular DMA
            w.dmacfg().set_bit();
            // Enable DMA requests
            w.dmaen().set_bit()
        });
        // 39.5 cycles, two conversions fit well within one 100 us period
        self.adc.smpr.write(|w| unsafe { w.smp1().bits(0b100) });
        // Scan order is ascending channel number, the scope input comes first
        self.adc
            .chselr()
            .write(|w| unsafe { w.chsel().bits(1 << I::channel() | 1 << J::channel()) });
    }

    fn enable_clock_and_reset(_: &mut Rcc) {
        let rcc = unsafe { &(*RCC::ptr()) };
        rcc.apbenr2.modify(|_, w| w.adcen().set_bit());
        rcc.apbrstr2.modify(|_, w| w.adcrst().set_bit());
        rcc.apbrstr2.modify(|_, w| w.adcrst().clear_bit());
    }

    fn enable_vreg<D: DelayUs<u8>>(&mut self, delay: &mut D) {
        self.adc.cr.modify(|_, w| w.advregen().set_bit());
        // Max starting time declared by stm32g070 datasheet is 20 us
        delay.delay_us(20);
    }

    fn enable(&mut self) {
        self.adc.isr.write(|w| w.adrdy().set_bit());
        self.adc.cr.modify(|_, w| w.aden().set_bit());
        while self.adc.isr.read().adrdy().bit_is_clear() {}
    }

    fn disable(&mut self) {
        let cr = self.adc.cr.read();
        if cr.aden().bit_is_clear() {
            return;
        }
        if cr.adstart().bit_is_set() {
            self.adc.cr.modify(|_, w| w.adstp().set_bit());
        }
        self.adc.cr.modify(|_, w| w.addis().set_bit());
        while self.adc.cr.read().aden().bit_is_set() {}
        self.adc.isr.write(|w| w.adrdy().set_bit());
    }

    fn calibrate(&mut self) {
        self.adc.cr.modify(|_, w| w.adcal().set_bit());
        while self.adc.isr.read().eocal().bit_is_clear() {}
        self.adc.isr.write(|w| w.eocal().set_bit());
    }
}
