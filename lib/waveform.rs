use crate::config::{CODE_MAX, CODE_MID, SAMPLE_RATE_HZ};
use crate::display::{Dimension, Display, WIDTH};
use crate::error::Result;
use crate::hw::Lcd;
use crate::ring::RingBuffer;
use crate::timebase::{Timebase, Window};
use crate::RawSample;

/// Affine code to row mapping, `row = (code - code_mid) / slope + row_mid`.
///
/// The slope depends on the analog front end and the panel height, so it is
/// a calibration value of the board rather than a constant. It is kept in
/// hundredths of a code per row.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Transform {
    code_mid: i32,
    code_max: i32,
    slope_centi: i32,
    row_mid: i32,
    row_max: i32,
}

impl Transform {
    /// A zero slope or row count is raised to one.
    pub const fn new(code_mid: u16, code_max: u16, slope_centi: u16, rows: u16) -> Self {
        let slope_centi = if slope_centi == 0 { 1 } else { slope_centi };
        let rows = if rows == 0 { 1 } else { rows };
        Transform {
            code_mid: code_mid as i32,
            code_max: code_max as i32,
            slope_centi: slope_centi as i32,
            row_mid: rows as i32 / 2,
            row_max: rows as i32 - 1,
        }
    }

    pub fn row(&self, code: RawSample) -> u16 {
        let y = (code as i32 - self.code_mid) * 100 / self.slope_centi + self.row_mid;
        y.clamp(0, self.row_max) as u16
    }

    /// Approximate inverse of [`Transform::row`], clamped to the code range.
    pub fn code(&self, row: u16) -> RawSample {
        let code = (row as i32 - self.row_mid) * self.slope_centi / 100 + self.code_mid;
        code.clamp(0, self.code_max) as RawSample
    }
}

impl Default for Transform {
    fn default() -> Self {
        // 17.06 codes per row maps the 12-bit range onto 240 rows.
        Transform::new(CODE_MID, CODE_MAX, 1706, Dimension::HEIGHT as u16)
    }
}

/// Last row drawn in every column, `None` until the column is drawn.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DrawnColumns {
    rows: [Option<u16>; WIDTH],
}

impl DrawnColumns {
    pub const fn new() -> Self {
        DrawnColumns {
            rows: [None; WIDTH],
        }
    }

    pub fn clear(&mut self) {
        self.rows = [None; WIDTH];
    }

    pub fn set(&mut self, x: usize, row: u16) {
        self.rows[x] = Some(row);
    }

    pub fn get(&self, x: usize) -> Option<u16> {
        self.rows.get(x).copied().flatten()
    }

    pub fn is_complete(&self) -> bool {
        self.rows.iter().all(Option::is_some)
    }

    /// Drawn segments `(x, row at x - 1, row at x)` whose rows enclose `row`.
    pub fn crossing(&self, row: u16) -> impl Iterator<Item = (usize, u16, u16)> + '_ {
        self.rows
            .windows(2)
            .enumerate()
            .filter_map(|(i, pair)| match pair {
                [Some(from), Some(to)] => Some((i + 1, *from, *to)),
                _ => None,
            })
            .filter(move |&(_, from, to)| from.min(to) <= row && row <= from.max(to))
    }

    /// Column whose row is closest to `row`, first one on ties.
    pub fn nearest(&self, row: u16) -> Option<(usize, u16)> {
        self.rows
            .iter()
            .enumerate()
            .filter_map(|(x, drawn)| drawn.map(|y| (x, y)))
            .fold(None, |best: Option<(usize, u16)>, (x, y)| match best {
                Some((_, best_y)) if best_y.abs_diff(row) <= y.abs_diff(row) => best,
                _ => Some((x, y)),
            })
    }
}

impl Default for DrawnColumns {
    fn default() -> Self {
        Self::new()
    }
}

/// Turns a window of the ring buffer into waveform columns.
pub struct Waveform {
    columns: DrawnColumns,
    /// Next column of the incremental page.
    column: usize,
    transform: Transform,
    sample_rate_hz: u32,
}

impl Waveform {
    pub fn new(transform: Transform, sample_rate_hz: u32) -> Self {
        Waveform {
            columns: DrawnColumns::new(),
            column: 0,
            transform,
            sample_rate_hz,
        }
    }

    pub fn columns(&self) -> &DrawnColumns {
        &self.columns
    }

    pub fn column(&self) -> usize {
        self.column
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    /// Grid plus every column of the current window.
    pub fn full_frame<LCD, LCDER, const C: usize>(
        &mut self,
        display: &mut Display<LCD>,
        ring: &RingBuffer<C>,
        timebase: Timebase,
    ) -> Result<(), LCDER>
    where
        LCD: Lcd<Error = LCDER>,
    {
        let window = self.window(ring, timebase);
        trace!(
            "full frame: start {=usize}, decimation {=usize}",
            window.start,
            window.decimation
        );
        display.draw_grid(timebase)?;
        for x in 0..WIDTH {
            let row = self.transform.row(ring.get(window.column(x)));
            self.columns.set(x, row);
            if x > 0 {
                if let Some(previous) = self.columns.get(x - 1) {
                    display.draw_segment(x, previous, row)?;
                }
            }
        }
        self.column = WIDTH;
        Ok(())
    }

    /// Blank page: grid only, no drawn columns, next column is 0.
    pub fn restart<LCD, LCDER>(
        &mut self,
        display: &mut Display<LCD>,
        timebase: Timebase,
    ) -> Result<(), LCDER>
    where
        LCD: Lcd<Error = LCDER>,
    {
        display.draw_grid(timebase)?;
        self.columns.clear();
        self.column = 0;
        Ok(())
    }

    /// Appends the newest sample as one column; restarts the page at the right edge.
    ///
    /// Returns `true` when the page was restarted, the grid repaint wipes
    /// anything else on screen.
    pub fn incremental<LCD, LCDER, const C: usize>(
        &mut self,
        display: &mut Display<LCD>,
        ring: &RingBuffer<C>,
        timebase: Timebase,
    ) -> Result<bool, LCDER>
    where
        LCD: Lcd<Error = LCDER>,
    {
        let restarted = self.column >= WIDTH;
        if restarted {
            self.restart(display, timebase)?;
        }
        let window = self.window(ring, timebase);
        let x = self.column;
        let row = self.transform.row(ring.get(window.end()));
        self.columns.set(x, row);
        if x > 0 {
            if let Some(previous) = self.columns.get(x - 1) {
                display.draw_segment(x, previous, row)?;
            }
        }
        self.column += 1;
        Ok(restarted)
    }

    fn window<const C: usize>(&self, ring: &RingBuffer<C>, timebase: Timebase) -> Window {
        Window::new(
            self.sample_rate_hz,
            timebase.window_ms(),
            WIDTH,
            C,
            ring.written(),
        )
    }
}

impl Default for Waveform {
    fn default() -> Self {
        Waveform::new(Transform::default(), SAMPLE_RATE_HZ)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::Color;
    use crate::mock::MockLcd;

    fn ring_with<const C: usize>(codes: impl IntoIterator<Item = RawSample>) -> RingBuffer<C> {
        let ring = RingBuffer::new();
        for code in codes {
            ring.push(code);
        }
        ring
    }

    #[test]
    fn transform_maps_and_clamps() {
        let transform = Transform::default();
        assert_eq!(transform.row(2048), 120);
        assert_eq!(transform.row(0), 0);
        assert_eq!(transform.row(4095), 239);
        assert_eq!(transform.row(683), 40);
        assert_eq!(transform.row(u16::MAX), 239);
    }

    #[test]
    fn degenerate_calibration_stays_in_range() {
        let transform = Transform::new(2048, 4095, 0, 0);
        assert_eq!(transform.row(0), 0);
        assert_eq!(transform.row(4095), 0);
        assert_eq!(transform.code(0), 2048);

        let flat = Transform::new(2048, 4095, 0, 240);
        assert_eq!(flat.row(2050), 239);
        assert_eq!(flat.row(2046), 0);
    }

    #[test]
    fn inverse_transform_clamps_code() {
        let transform = Transform::default();
        assert_eq!(transform.code(120), 2048);
        assert_eq!(transform.code(40), 684);

        let steep = Transform::new(2048, 4095, 4000, 240);
        assert_eq!(steep.code(0), 0);
        assert_eq!(steep.code(239), 4095);
    }

    #[test]
    fn crossing_uses_closed_interval() {
        let mut columns = DrawnColumns::new();
        columns.set(10, 40);
        columns.set(11, 60);

        assert_eq!(columns.crossing(50).collect::<Vec<_>>(), [(11, 40, 60)]);
        assert_eq!(columns.crossing(40).count(), 1);
        assert_eq!(columns.crossing(60).count(), 1);
        assert_eq!(columns.crossing(70).count(), 0);
    }

    #[test]
    fn crossing_skips_unset_neighbours() {
        let mut columns = DrawnColumns::new();
        columns.set(10, 50);
        columns.set(12, 50);
        assert_eq!(columns.crossing(50).count(), 0);
    }

    #[test]
    fn nearest_prefers_first_match() {
        let mut columns = DrawnColumns::new();
        assert_eq!(columns.nearest(100), None);

        columns.set(3, 90);
        columns.set(7, 110);
        columns.set(9, 130);
        assert_eq!(columns.nearest(100), Some((3, 90)));
        assert_eq!(columns.nearest(108), Some((7, 110)));
        assert_eq!(columns.nearest(239), Some((9, 130)));
    }

    #[test]
    fn full_frame_is_deterministic() {
        let ring: RingBuffer<1024> = ring_with((0..1500).map(|n| (n * 7 % 4096) as RawSample));
        let mut display = Display::new(MockLcd::new());
        let mut waveform = Waveform::default();

        waveform.full_frame(&mut display, &ring, Timebase::Ms32).unwrap();
        let first = waveform.columns().clone();
        waveform.full_frame(&mut display, &ring, Timebase::Ms32).unwrap();

        assert!(first.is_complete());
        assert_eq!(waveform.columns(), &first);
        assert_eq!(waveform.column(), WIDTH);
    }

    #[test]
    fn full_frame_reads_the_window() {
        // 320 samples per screen at 32 ms, one sample per column.
        let ring: RingBuffer<1024> = ring_with((0..320).map(|x| if x < 160 { 0 } else { 4095 }));
        let mut display = Display::new(MockLcd::new());
        let mut waveform = Waveform::default();

        waveform.full_frame(&mut display, &ring, Timebase::Ms32).unwrap();

        let columns = waveform.columns();
        assert_eq!(columns.get(0), Some(0));
        assert_eq!(columns.get(159), Some(0));
        assert_eq!(columns.get(160), Some(239));
        assert_eq!(columns.get(319), Some(239));
        assert_eq!(display.lcd().pixel(100, 0), Color::WAVEFORM);
        assert_eq!(display.lcd().pixel(200, 239), Color::WAVEFORM);
    }

    #[test]
    fn incremental_advances_and_restarts_page() {
        let ring: RingBuffer<1024> = ring_with([2048; 400]);
        let mut display = Display::new(MockLcd::new());
        let mut waveform = Waveform::default();

        waveform.full_frame(&mut display, &ring, Timebase::Ms32).unwrap();
        assert!(waveform.incremental(&mut display, &ring, Timebase::Ms32).unwrap());
        assert_eq!(waveform.column(), 1);
        assert_eq!(waveform.columns().get(0), Some(120));
        assert_eq!(waveform.columns().get(1), None);

        for _ in 1..WIDTH {
            assert!(!waveform.incremental(&mut display, &ring, Timebase::Ms32).unwrap());
        }
        assert!(waveform.columns().is_complete());
        assert_eq!(display.lcd().count_in_row(120, Color::WAVEFORM), WIDTH);
    }

    #[test]
    fn incremental_plots_newest_sample() {
        let ring: RingBuffer<1024> = ring_with([2048; 10]);
        let mut display = Display::new(MockLcd::new());
        let mut waveform = Waveform::default();

        waveform.incremental(&mut display, &ring, Timebase::Ms8).unwrap();
        ring.push(4095);
        waveform.incremental(&mut display, &ring, Timebase::Ms8).unwrap();

        assert_eq!(waveform.columns().get(0), Some(120));
        assert_eq!(waveform.columns().get(1), Some(239));
    }
}
