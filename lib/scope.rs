use crate::config::{Config, RenderStrategy};
use crate::cursor::Cursor;
use crate::display::Display;
use crate::error::Result;
use crate::hw::Lcd;
use crate::input::{Button, Controls};
use crate::ring::RingBuffer;
use crate::timebase::Timebase;
use crate::voltage::VoltageLookup;
use crate::waveform::{DrawnColumns, Waveform};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    Running,
    Frozen,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    FreezeEdge,
    UnfreezeEdge,
    MenuEdge,
    FrameTick,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Action {
    /// Cursor back to the middle, frozen indicator on.
    Freeze,
    /// Frozen indicator off.
    Unfreeze,
    /// Next timebase, indicator off, redraw from scratch.
    CycleTimebase,
    /// Throttled waveform render.
    Render,
    /// Cursor follows the joystick.
    Track,
}

impl Mode {
    /// Next mode and the action to run, `None` for events ignored in this mode.
    pub fn on(self, event: Event) -> Option<(Mode, Action)> {
        match (self, event) {
            (Mode::Running, Event::FreezeEdge) => Some((Mode::Frozen, Action::Freeze)),
            (Mode::Frozen, Event::UnfreezeEdge) => Some((Mode::Running, Action::Unfreeze)),
            (_, Event::MenuEdge) => Some((Mode::Running, Action::CycleTimebase)),
            (Mode::Running, Event::FrameTick) => Some((Mode::Running, Action::Render)),
            (Mode::Frozen, Event::FrameTick) => Some((Mode::Frozen, Action::Track)),
            _ => None,
        }
    }
}

impl Default for Mode {
    fn default() -> Self {
        Mode::Running
    }
}

/// Edges in the order they are applied within one tick.
const EDGES: [(Button, Event); 3] = [
    (Button::Freeze, Event::FreezeEdge),
    (Button::Unfreeze, Event::UnfreezeEdge),
    (Button::Menu, Event::MenuEdge),
];

/// Render-side context: owns the screen and everything drawn on it.
pub struct Scope<'a, LCD, V, const C: usize> {
    display: Display<LCD>,
    waveform: Waveform,
    cursor: Cursor,
    ring: &'a RingBuffer<C>,
    lut: V,
    strategy: RenderStrategy,
    timebase: Timebase,
    mode: Mode,
    frames: u8,
}

impl<'a, LCD, LCDER, V, const C: usize> Scope<'a, LCD, V, C>
where
    LCD: Lcd<Error = LCDER>,
    V: VoltageLookup,
{
    pub fn new(lcd: LCD, ring: &'a RingBuffer<C>, lut: V, config: Config) -> Result<Self, LCDER> {
        let mut scope = Scope {
            display: Display::new(lcd),
            waveform: Waveform::new(config.transform, config.sample_rate_hz),
            cursor: Cursor::new(config.sensitivity),
            ring,
            lut,
            strategy: config.strategy,
            timebase: config.timebase,
            mode: Mode::default(),
            frames: 0,
        };
        scope
            .waveform
            .restart(&mut scope.display, scope.timebase)?;
        info!("scope ready, timebase {}", scope.timebase);
        Ok(scope)
    }

    /// One frame period elapsed: apply button edges, then render or track.
    pub fn on_frame_tick<I: Controls>(&mut self, controls: &mut I) -> Result<(), LCDER> {
        // Every button is polled each tick, whatever the mode.
        let edges = EDGES.map(|(button, event)| (controls.button_edge(button), event));
        for (pressed, event) in edges {
            if pressed {
                self.dispatch(event, controls)?;
            }
        }
        self.dispatch(Event::FrameTick, controls)
    }

    pub fn dispatch<I: Controls>(&mut self, event: Event, controls: &mut I) -> Result<(), LCDER> {
        let (next, action) = match self.mode.on(event) {
            Some(transition) => transition,
            None => return Ok(()),
        };
        if next != self.mode {
            debug!("{} -> {} on {}", self.mode, next, event);
        }
        self.mode = next;
        match action {
            Action::Freeze => self.freeze(),
            Action::Unfreeze => self.display.draw_frozen_indicator(false),
            Action::CycleTimebase => self.cycle_timebase(),
            Action::Render => self.render(),
            Action::Track => {
                let delta = controls.read_secondary_axis();
                self.cursor.update(
                    delta,
                    &mut self.display,
                    self.waveform.columns(),
                    self.waveform.transform(),
                    &self.lut,
                    self.timebase,
                )?;
                Ok(())
            }
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn timebase(&self) -> Timebase {
        self.timebase
    }

    pub fn redraw_interval(&self) -> u8 {
        self.timebase.redraw_interval()
    }

    pub fn columns(&self) -> &DrawnColumns {
        self.waveform.columns()
    }

    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    pub fn display(&self) -> &Display<LCD> {
        &self.display
    }

    fn freeze(&mut self) -> Result<(), LCDER> {
        if !self.waveform.columns().is_complete() {
            self.full_frame()?;
        }
        self.cursor.reset();
        self.display.draw_frozen_indicator(true)
    }

    fn cycle_timebase(&mut self) -> Result<(), LCDER> {
        self.timebase = self.timebase.next();
        info!("timebase {}", self.timebase);
        self.display.draw_frozen_indicator(false)?;
        match self.strategy {
            RenderStrategy::FullFrame => self.full_frame(),
            RenderStrategy::Incremental => {
                self.waveform.restart(&mut self.display, self.timebase)?;
                self.cursor.forget();
                Ok(())
            }
        }
    }

    fn render(&mut self) -> Result<(), LCDER> {
        let interval = self.redraw_interval().max(1);
        let due = self.frames % interval == 0;
        self.frames = if due { 1 } else { self.frames + 1 };
        if !due {
            return Ok(());
        }
        match self.strategy {
            RenderStrategy::FullFrame => self.full_frame(),
            RenderStrategy::Incremental => {
                let restarted = self
                    .waveform
                    .incremental(&mut self.display, self.ring, self.timebase)?;
                if restarted {
                    self.cursor.forget();
                }
                Ok(())
            }
        }
    }

    fn full_frame(&mut self) -> Result<(), LCDER> {
        self.waveform
            .full_frame(&mut self.display, self.ring, self.timebase)?;
        self.cursor.forget();
        Ok(())
    }
}
