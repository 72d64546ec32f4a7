use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::Drawable;

#[cfg(target_os = "none")]
mod adc;
#[cfg(target_os = "none")]
mod helper;
#[cfg(target_os = "none")]
mod input;
#[cfg(target_os = "none")]
mod lcd;
#[cfg(target_os = "none")]
mod timers;

#[cfg(target_os = "none")]
pub use adc::{AdcConfig, AdcSource, DmaBuffer};
#[cfg(target_os = "none")]
pub use helper::*;
#[cfg(target_os = "none")]
pub use lcd::{IliError, IliLcd};
#[cfg(target_os = "none")]
pub use timers::FrameTimer;

/// Pixel sink the renderer draws through.
pub trait Lcd {
    type Error;
    fn clear(&mut self, color: Rgb565) -> Result<(), Self::Error>;
    fn draw<D: Drawable<Color = Rgb565>>(&mut self, drawable: D) -> Result<D::Output, Self::Error>;
}
