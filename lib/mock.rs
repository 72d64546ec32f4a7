//! In-memory LCD for host tests.

use core::convert::Infallible;
use embedded_graphics::pixelcolor::{Rgb565, RgbColor};
use embedded_graphics::prelude::{DrawTarget, Drawable, OriginDimensions, Pixel, Size};

use crate::display::{HEIGHT, WIDTH};
use crate::hw::Lcd;

pub struct MockLcd {
    pixels: Vec<Rgb565>,
    /// Number of `clear` and `draw` calls issued.
    pub draws: usize,
}

impl MockLcd {
    pub fn new() -> Self {
        MockLcd {
            pixels: vec![Rgb565::BLACK; WIDTH * HEIGHT],
            draws: 0,
        }
    }

    pub fn pixel(&self, x: i32, y: i32) -> Rgb565 {
        self.pixels[y as usize * WIDTH + x as usize]
    }

    pub fn count_in_row(&self, y: i32, color: Rgb565) -> usize {
        (0..WIDTH as i32)
            .filter(|&x| self.pixel(x, y) == color)
            .count()
    }
}

impl OriginDimensions for MockLcd {
    fn size(&self) -> Size {
        Size::new(WIDTH as u32, HEIGHT as u32)
    }
}

impl DrawTarget for MockLcd {
    type Color = Rgb565;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if (0..WIDTH as i32).contains(&point.x) && (0..HEIGHT as i32).contains(&point.y) {
                self.pixels[point.y as usize * WIDTH + point.x as usize] = color;
            }
        }
        Ok(())
    }
}

impl Lcd for MockLcd {
    type Error = Infallible;

    fn clear(&mut self, color: Rgb565) -> Result<(), Self::Error> {
        self.draws += 1;
        DrawTarget::clear(self, color)
    }

    fn draw<D: Drawable<Color = Rgb565>>(&mut self, drawable: D) -> Result<D::Output, Self::Error> {
        self.draws += 1;
        drawable.draw(self)
    }
}
