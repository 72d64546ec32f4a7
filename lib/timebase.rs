/// Screen time window selectable with the menu button, cycled in declaration order.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Timebase {
    Ms8,
    Ms16,
    Ms32,
    Ms64,
    Ms160,
    Ms320,
    Ms640,
}

struct Entry {
    window_ms: u32,
    redraw_interval: u8,
    label: &'static str,
}

// Redraw intervals keep a full frame inside the per-tick budget; long windows
// barely change between ticks anyway.
const TABLE: [Entry; 7] = [
    Entry { window_ms: 8, redraw_interval: 2, label: "8ms/div" },
    Entry { window_ms: 16, redraw_interval: 2, label: "16ms/div" },
    Entry { window_ms: 32, redraw_interval: 2, label: "32ms/div" },
    Entry { window_ms: 64, redraw_interval: 2, label: "64ms/div" },
    Entry { window_ms: 160, redraw_interval: 3, label: "160ms/div" },
    Entry { window_ms: 320, redraw_interval: 10, label: "320ms/div" },
    Entry { window_ms: 640, redraw_interval: 20, label: "640ms/div" },
];

impl Timebase {
    pub const ALL: [Timebase; 7] = [
        Timebase::Ms8,
        Timebase::Ms16,
        Timebase::Ms32,
        Timebase::Ms64,
        Timebase::Ms160,
        Timebase::Ms320,
        Timebase::Ms640,
    ];

    fn entry(self) -> &'static Entry {
        &TABLE[self as usize]
    }

    /// Time covered by the full display width.
    pub fn window_ms(self) -> u32 {
        self.entry().window_ms
    }

    /// Frame ticks between two renders while running.
    pub fn redraw_interval(self) -> u8 {
        self.entry().redraw_interval
    }

    pub fn label(self) -> &'static str {
        self.entry().label
    }

    pub fn next(self) -> Self {
        Self::ALL[(self as usize + 1) % Self::ALL.len()]
    }
}

impl Default for Timebase {
    fn default() -> Self {
        Timebase::Ms32
    }
}

/// Mapping of one screen onto the ring buffer for a given write position.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Window {
    pub samples_per_screen: usize,
    pub decimation: usize,
    /// Slot of the oldest visible sample.
    pub start: usize,
    capacity: usize,
}

impl Window {
    /// `written` is the ring's write counter; `capacity` must be at least 2.
    ///
    /// The screen never spans more than `capacity - 1` samples, so the slot
    /// the writer fills next is never part of the window.
    pub fn new(
        sample_rate_hz: u32,
        window_ms: u32,
        width: usize,
        capacity: usize,
        written: usize,
    ) -> Self {
        let requested = (sample_rate_hz as u64 * window_ms as u64 / 1000) as usize;
        let samples_per_screen = requested.min(capacity - 1);
        let decimation = (samples_per_screen / width.max(1)).max(1);
        let start = (written % capacity + capacity - samples_per_screen) % capacity;
        Window {
            samples_per_screen,
            decimation,
            start,
            capacity,
        }
    }

    /// Ring slot plotted in column `x`. Single-sample pick, no averaging.
    pub fn column(&self, x: usize) -> usize {
        (self.start + x * self.decimation) % self.capacity
    }

    /// Slot of the newest sample in the window.
    pub fn end(&self) -> usize {
        (self.start + self.samples_per_screen + self.capacity - 1) % self.capacity
    }
}
