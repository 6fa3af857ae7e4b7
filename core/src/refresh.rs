use crate::display::{Display, RefreshMode};
use crate::framebuffer::DisplayBuffers;

/// Chooses the panel waveform. The first committed frame after boot gets a
/// full refresh to clear ghosting; every later frame uses the partial
/// waveform over the whole frame. `primed` is never cleared.
#[derive(Debug, Default)]
pub struct RefreshController {
    primed: bool,
}

impl RefreshController {
    pub const fn new() -> Self {
        Self { primed: false }
    }

    pub fn is_primed(&self) -> bool {
        self.primed
    }

    pub fn next_mode(&self) -> RefreshMode {
        if self.primed {
            RefreshMode::Partial
        } else {
            RefreshMode::Full
        }
    }

    /// Paints the active buffer and returns the mode used. Blocks until the
    /// panel has finished.
    pub fn render(&mut self, display: &mut impl Display, buffers: &mut DisplayBuffers) -> RefreshMode {
        let mode = self.next_mode();
        display.display(buffers, mode);
        self.primed = true;
        mode
    }
}

/// Edge trigger on wall-clock minute changes.
#[derive(Debug, Default)]
pub struct MinuteTrigger {
    last: Option<(u8, u8)>,
}

impl MinuteTrigger {
    pub const fn new() -> Self {
        Self { last: None }
    }

    /// True the first time a given (hour, minute) is seen in a row.
    pub fn fire(&mut self, hour24: u8, minute: u8) -> bool {
        let now = Some((hour24, minute));
        if self.last == now {
            return false;
        }
        self.last = now;
        true
    }
}
