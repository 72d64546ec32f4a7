#![cfg_attr(not(test), no_std)]

#[macro_use]
mod fmt;

#[cfg(target_os = "none")]
use defmt_rtt as _; // global logger
#[cfg(target_os = "none")]
use panic_probe as _;

pub mod acquisition;
pub mod config;
pub mod cursor;
pub mod display;
pub mod error;
pub mod hw;
pub mod input;
pub mod ring;
pub mod scope;
pub mod timebase;
pub mod voltage;
pub mod waveform;

#[cfg(test)]
mod mock;

/// Code produced by the ADC, 0..=`config::CODE_MAX`.
pub type RawSample = u16;

#[cfg(all(target_os = "none", feature = "defmt"))]
static COUNT: core::sync::atomic::AtomicUsize = core::sync::atomic::AtomicUsize::new(0);
#[cfg(all(target_os = "none", feature = "defmt"))]
defmt::timestamp!("{=usize}", {
    use core::sync::atomic::Ordering;
    let n = COUNT.load(Ordering::Relaxed);
    COUNT.store(n + 1, Ordering::Relaxed);
    n
});
