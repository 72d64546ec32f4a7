use core::fmt::Write;
use embedded_graphics::mono_font::ascii::FONT_6X10;
use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::{Rgb565, RgbColor};
use embedded_graphics::prelude::{Pixel, Point, Primitive, Size};
use embedded_graphics::primitives::{Line, PrimitiveStyle, Rectangle};
use embedded_graphics::text::{Baseline, Text};
use heapless::String;

use crate::error::{Error, Result};
use crate::hw::Lcd;
use crate::timebase::Timebase;

pub const WIDTH: usize = Dimension::WIDTH as usize;
pub const HEIGHT: usize = Dimension::HEIGHT as usize;

/// Drawing vocabulary of the scope screen on top of an [`Lcd`].
pub struct Display<LCD> {
    lcd: LCD,
}

impl<LCD, LCDER> Display<LCD>
where
    LCD: Lcd<Error = LCDER>,
{
    pub fn new(lcd: LCD) -> Self {
        Display { lcd }
    }

    pub fn lcd(&self) -> &LCD {
        &self.lcd
    }

    /// Background, grid and timebase label. Wipes everything else.
    pub fn draw_grid(&mut self, timebase: Timebase) -> Result<(), LCDER> {
        self.lcd.clear(Color::BACKGROUND).map_err(Error::Lcd)?;
        for y in Grid::rows() {
            self.line(Point::new(0, y), Point::new(Dimension::WIDTH - 1, y), Color::GRID)?;
        }
        for x in Grid::columns() {
            self.line(Point::new(x, 0), Point::new(x, Dimension::HEIGHT - 1), Color::GRID)?;
        }
        self.draw_timebase_label(timebase)
    }

    /// Waveform segment ending in column `x`.
    pub fn draw_segment(&mut self, x: usize, from: u16, to: u16) -> Result<(), LCDER> {
        let x = x as i32;
        self.line(
            Point::new(x - 1, from as i32),
            Point::new(x, to as i32),
            Color::WAVEFORM,
        )
    }

    pub fn draw_row(&mut self, row: u16, color: Rgb565) -> Result<(), LCDER> {
        let y = row as i32;
        self.line(Point::new(0, y), Point::new(Dimension::WIDTH - 1, y), color)
    }

    /// Puts back the grid pixels that lie on `row`.
    pub fn repaint_grid_row(&mut self, row: u16) -> Result<(), LCDER> {
        let y = row as i32;
        if Grid::rows().any(|grid_y| grid_y == y) {
            self.draw_row(row, Color::GRID)?;
        }
        for x in Grid::columns() {
            self.lcd
                .draw(Pixel(Point::new(x, y), Color::GRID))
                .map_err(Error::Lcd)?;
        }
        Ok(())
    }

    pub fn draw_frozen_indicator(&mut self, visible: bool) -> Result<(), LCDER> {
        let color = if visible {
            Color::TEXT
        } else {
            Color::BACKGROUND
        };
        self.text(Label::FROZEN_TEXT, Label::FROZEN, color)?;
        if !visible {
            // Blanked glyphs cross the first vertical grid line.
            for y in Label::FROZEN.y..Label::FROZEN.y + Label::HEIGHT {
                self.repaint_grid_row(y as u16)?;
            }
        }
        Ok(())
    }

    pub fn draw_timebase_label(&mut self, timebase: Timebase) -> Result<(), LCDER> {
        self.text(timebase.label(), Label::TIMEBASE, Color::TEXT)
    }

    pub fn draw_voltage(&mut self, volts: f32) -> Result<(), LCDER> {
        let volts = volts.clamp(Readout::MIN_VOLTS, Readout::MAX_VOLTS);
        let mut buffer = String::<16>::new();
        if write!(&mut buffer, "{:.3}V", volts).is_err() {
            buffer.clear();
            let _ = buffer.push_str(Readout::PLACEHOLDER);
        }
        let background = Rectangle::new(Readout::TOP_LEFT, Readout::SIZE)
            .into_styled(PrimitiveStyle::with_fill(Color::READOUT_BACKGROUND));
        self.lcd.draw(background).map_err(Error::Lcd)?;
        self.text(&buffer, Readout::TEXT, Color::READOUT)
    }

    fn line(&mut self, from: Point, to: Point, color: Rgb565) -> Result<(), LCDER> {
        let line = Line::new(from, to).into_styled(PrimitiveStyle::with_stroke(color, 1));
        self.lcd.draw(line).map_err(Error::Lcd)
    }

    fn text(&mut self, text: &str, position: Point, color: Rgb565) -> Result<(), LCDER> {
        let text = Text::with_baseline(
            text,
            position,
            MonoTextStyle::new(&FONT_6X10, color),
            Baseline::Top,
        );
        self.lcd.draw(text).map_err(Error::Lcd)?;
        Ok(())
    }
}

pub struct Dimension;

impl Dimension {
    pub const WIDTH: i32 = 320;
    pub const HEIGHT: i32 = 240;
}

pub struct Grid;

impl Grid {
    const LINES: i32 = 5;

    pub fn rows() -> impl Iterator<Item = i32> {
        (1..=Grid::LINES).map(|n| n * Dimension::HEIGHT / (Grid::LINES + 1))
    }

    pub fn columns() -> impl Iterator<Item = i32> {
        (1..=Grid::LINES).map(|n| n * Dimension::WIDTH / (Grid::LINES + 1))
    }
}

pub struct Label;

impl Label {
    const HEIGHT: i32 = 10;
    const FROZEN_TEXT: &'static str = "SCREEN FROZEN";
    pub const FROZEN: Point = Point::new(5, 5);
    pub const TIMEBASE: Point = Point::new(5, Dimension::HEIGHT - 12);

    /// Whether a label drawn at `origin` has pixels on `row`.
    pub fn covers(origin: Point, row: u16) -> bool {
        let row = row as i32;
        row >= origin.y && row < origin.y + Label::HEIGHT
    }
}

struct Readout;

impl Readout {
    const TOP_LEFT: Point = Point::new(Dimension::WIDTH - 62, 3);
    const SIZE: Size = Size::new(57, 12);
    const TEXT: Point = Point::new(Dimension::WIDTH - 60, 5);
    // Widest reading is "-999.999V", nine glyphs in the box.
    const MIN_VOLTS: f32 = -999.999;
    const MAX_VOLTS: f32 = 999.999;
    const PLACEHOLDER: &'static str = "---V";
}

pub struct Color;

impl Color {
    pub const BACKGROUND: Rgb565 = Rgb565::WHITE;
    pub const GRID: Rgb565 = Rgb565::BLACK;
    pub const WAVEFORM: Rgb565 = Rgb565::BLUE;
    pub const CURSOR: Rgb565 = Rgb565::RED;
    pub const TEXT: Rgb565 = Rgb565::BLACK;
    pub const READOUT: Rgb565 = Rgb565::RED;
    pub const READOUT_BACKGROUND: Rgb565 = Rgb565::BLACK;
}
