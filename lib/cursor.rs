use crate::display::{Color, Display, Label, HEIGHT};
use crate::error::Result;
use crate::hw::Lcd;
use crate::timebase::Timebase;
use crate::voltage::VoltageLookup;
use crate::waveform::{DrawnColumns, Transform};

/// Horizontal readout cursor shown while the screen is frozen.
pub struct Cursor {
    row: u16,
    /// Row the cursor is currently painted on, if any.
    drawn: Option<u16>,
    sensitivity: i32,
}

impl Cursor {
    pub fn new(sensitivity: i32) -> Self {
        Cursor {
            row: Cursor::MIDDLE,
            drawn: None,
            sensitivity: sensitivity.max(1),
        }
    }

    const MIDDLE: u16 = (HEIGHT / 2) as u16;

    pub fn row(&self) -> u16 {
        self.row
    }

    pub fn drawn(&self) -> Option<u16> {
        self.drawn
    }

    /// Back to the vertical middle of the screen.
    pub fn reset(&mut self) {
        self.row = Cursor::MIDDLE;
    }

    /// The screen was repainted underneath, nothing of the cursor is left on it.
    pub fn forget(&mut self) {
        self.drawn = None;
    }

    /// Moves the cursor by `delta` normalized input units and repaints it.
    ///
    /// Returns `false` without touching the screen when the cursor stays on
    /// the row it is already painted on.
    pub fn update<LCD, LCDER, V>(
        &mut self,
        delta: i32,
        display: &mut Display<LCD>,
        columns: &DrawnColumns,
        transform: &Transform,
        lut: &V,
        timebase: Timebase,
    ) -> Result<bool, LCDER>
    where
        LCD: Lcd<Error = LCDER>,
        V: VoltageLookup,
    {
        let row = self.row as i32 + div_round(delta, self.sensitivity);
        self.row = row.clamp(0, HEIGHT as i32 - 1) as u16;
        if self.drawn == Some(self.row) {
            return Ok(false);
        }

        if let Some(previous) = self.drawn {
            self.erase(previous, display, columns, timebase)?;
        }
        display.draw_row(self.row, Color::CURSOR)?;
        let volts = voltage_at(self.row, columns, transform, lut);
        display.draw_voltage(volts)?;

        self.drawn = Some(self.row);
        Ok(true)
    }

    fn erase<LCD, LCDER>(
        &self,
        row: u16,
        display: &mut Display<LCD>,
        columns: &DrawnColumns,
        timebase: Timebase,
    ) -> Result<(), LCDER>
    where
        LCD: Lcd<Error = LCDER>,
    {
        display.draw_row(row, Color::BACKGROUND)?;
        display.repaint_grid_row(row)?;
        for (x, from, to) in columns.crossing(row) {
            display.draw_segment(x, from, to)?;
        }
        if Label::covers(Label::FROZEN, row) {
            display.draw_frozen_indicator(true)?;
        }
        if Label::covers(Label::TIMEBASE, row) {
            display.draw_timebase_label(timebase)?;
        }
        Ok(())
    }
}

/// Volts at the drawn column nearest to `row`, 0 V when nothing is drawn.
pub fn voltage_at<V: VoltageLookup>(
    row: u16,
    columns: &DrawnColumns,
    transform: &Transform,
    lut: &V,
) -> f32 {
    match columns.nearest(row) {
        Some((_, y)) => lut.code_to_voltage(transform.code(y)),
        None => 0.0,
    }
}

/// Division rounding half away from zero.
fn div_round(value: i32, divisor: i32) -> i32 {
    if value >= 0 {
        (value + divisor / 2) / divisor
    } else {
        (value - divisor / 2) / divisor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockLcd;
    use crate::voltage::Linear;

    struct Fixture {
        display: Display<MockLcd>,
        columns: DrawnColumns,
        transform: Transform,
        lut: Linear,
        cursor: Cursor,
    }

    impl Fixture {
        fn new() -> Self {
            let mut display = Display::new(MockLcd::new());
            display.draw_grid(Timebase::Ms32).unwrap();
            Fixture {
                display,
                columns: DrawnColumns::new(),
                transform: Transform::default(),
                lut: Linear::default(),
                cursor: Cursor::new(25),
            }
        }

        fn segment(&mut self, x: usize, from: u16, to: u16) {
            self.columns.set(x - 1, from);
            self.columns.set(x, to);
            self.display.draw_segment(x, from, to).unwrap();
        }

        fn step(&mut self, delta: i32) -> bool {
            self.cursor
                .update(
                    delta,
                    &mut self.display,
                    &self.columns,
                    &self.transform,
                    &self.lut,
                    Timebase::Ms32,
                )
                .unwrap()
        }

        fn lcd(&self) -> &MockLcd {
            self.display.lcd()
        }
    }

    #[test]
    fn rounds_delta_by_sensitivity() {
        assert_eq!(div_round(12, 25), 0);
        assert_eq!(div_round(13, 25), 1);
        assert_eq!(div_round(-13, 25), -1);
        assert_eq!(div_round(100, 25), 4);
        assert_eq!(div_round(-100, 25), -4);
    }

    #[test]
    fn first_update_draws_at_middle() {
        let mut fixture = Fixture::new();
        assert!(fixture.step(0));
        assert_eq!(fixture.cursor.drawn(), Some(120));
        assert_eq!(fixture.lcd().count_in_row(120, Color::CURSOR), WIDTH_I32 as usize);
    }

    #[test]
    fn row_is_clamped_to_screen() {
        let mut fixture = Fixture::new();
        // 100 units move 4 rows per tick.
        for _ in 0..40 {
            fixture.step(-100);
        }
        assert_eq!(fixture.cursor.row(), 0);

        for _ in 0..80 {
            fixture.step(100);
        }
        assert_eq!(fixture.cursor.row(), HEIGHT as u16 - 1);
    }

    #[test]
    fn unchanged_row_is_a_no_op() {
        let mut fixture = Fixture::new();
        assert!(fixture.step(50));
        let draws = fixture.lcd().draws;

        assert!(!fixture.step(0));
        assert!(!fixture.step(12));
        assert_eq!(fixture.lcd().draws, draws);
    }

    #[test]
    fn erase_restores_crossing_segment() {
        let mut fixture = Fixture::new();
        fixture.segment(11, 40, 60);
        fixture.segment(31, 70, 90);

        // Park the cursor on row 50, then move it away.
        fixture.cursor.row = 50;
        fixture.step(0);
        assert_eq!(fixture.lcd().count_in_row(50, Color::WAVEFORM), 0);
        fixture.step(100);

        let row: Vec<_> = (0..WIDTH_I32)
            .filter(|&x| fixture.lcd().pixel(x, 50) == Color::WAVEFORM)
            .collect();
        assert!(!row.is_empty());
        assert!(row.iter().all(|&x| x == 10 || x == 11));
    }

    #[test]
    fn erase_leaves_distant_segment_alone() {
        let mut fixture = Fixture::new();
        fixture.segment(11, 40, 60);
        fixture.cursor.row = 70;
        fixture.step(0);
        let before = fixture.lcd().draws;
        fixture.step(100);

        // erase row, 5 grid crossings, new row, readout box and text
        assert_eq!(fixture.lcd().draws - before, 1 + 5 + 1 + 2);
        assert_eq!(fixture.lcd().count_in_row(70, Color::WAVEFORM), 0);
    }

    #[test]
    fn erase_repaints_grid_and_labels() {
        let mut fixture = Fixture::new();
        fixture.cursor.row = 80;
        fixture.step(0);
        fixture.step(100);
        assert_eq!(fixture.lcd().count_in_row(80, Color::GRID), 320);

        fixture.cursor.row = 230;
        fixture.step(0);
        fixture.step(-100);
        assert!(fixture.lcd().count_in_row(230, Color::TEXT) > 5);
    }

    #[test]
    fn voltage_follows_nearest_column() {
        let transform = Transform::default();
        let lut = Linear::default();
        let mut columns = DrawnColumns::new();
        assert_eq!(voltage_at(100, &columns, &transform, &lut), 0.0);

        columns.set(5, 0);
        columns.set(6, 239);
        assert!(voltage_at(10, &columns, &transform, &lut) < -4.99);
        assert!(voltage_at(230, &columns, &transform, &lut) > 4.9);
    }

    #[test]
    fn forget_skips_erase() {
        let mut fixture = Fixture::new();
        fixture.step(0);
        fixture.display.draw_grid(Timebase::Ms32).unwrap();
        fixture.cursor.forget();
        fixture.cursor.reset();

        let before = fixture.lcd().draws;
        assert!(fixture.step(0));
        assert_eq!(fixture.lcd().draws - before, 3);
    }

    const WIDTH_I32: i32 = crate::display::WIDTH as i32;
}
