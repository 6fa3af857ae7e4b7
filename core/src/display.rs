use crate::framebuffer::DisplayBuffers;

pub const WIDTH: usize = 800;
pub const HEIGHT: usize = 480;

/// Refresh techniques offered by the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshMode {
    /// Full refresh with complete waveform; clears residual ghosting.
    Full,
    /// Faster partial waveform applied over the whole frame rectangle.
    /// Reduced flash, but still covers every pixel.
    Partial,
}

/// Panel driver seam. `display` blocks until the physical refresh has completed.
pub trait Display {
    fn display(&mut self, buffers: &mut DisplayBuffers, mode: RefreshMode);
}
