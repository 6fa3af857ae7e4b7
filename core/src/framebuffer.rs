use embedded_graphics::{
    Pixel,
    pixelcolor::BinaryColor,
    prelude::{DrawTarget, OriginDimensions, Size},
};

pub use crate::display::{HEIGHT, WIDTH};

pub const BUFFER_SIZE: usize = WIDTH * HEIGHT / 8;

/// Double-buffered 1bpp landscape frame. A set bit is white.
///
/// The inactive buffer holds the last committed frame so that panel drivers
/// can compute partial-refresh waveforms against it.
pub struct DisplayBuffers {
    framebuffer: [[u8; BUFFER_SIZE]; 2],
    active: bool,
}

impl Default for DisplayBuffers {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplayBuffers {
    pub fn new() -> Self {
        // Clear screen to white
        let mut framebuffer = [[0; BUFFER_SIZE]; 2];
        framebuffer[0].fill(0xFF);
        framebuffer[1].fill(0xFF);
        Self {
            framebuffer,
            active: false,
        }
    }

    pub fn get_active_buffer_mut(&mut self) -> &mut [u8; BUFFER_SIZE] {
        if self.active {
            &mut self.framebuffer[1]
        } else {
            &mut self.framebuffer[0]
        }
    }

    pub fn get_active_buffer(&self) -> &[u8; BUFFER_SIZE] {
        if self.active {
            &self.framebuffer[1]
        } else {
            &self.framebuffer[0]
        }
    }

    pub fn get_inactive_buffer(&self) -> &[u8; BUFFER_SIZE] {
        if self.active {
            &self.framebuffer[0]
        } else {
            &self.framebuffer[1]
        }
    }

    /// Called by drivers once a frame has been committed to the panel.
    pub fn swap_buffers(&mut self) {
        self.active = !self.active;
    }

    pub fn set_pixel(&mut self, x: i32, y: i32, color: BinaryColor) {
        if x < 0 || y < 0 || x as usize >= WIDTH || y as usize >= HEIGHT {
            return;
        }
        let index = y as usize * WIDTH + x as usize;
        let byte_index = index / 8;
        let bit_index = 7 - (index % 8);
        match color {
            BinaryColor::On => {
                self.get_active_buffer_mut()[byte_index] |= 1 << bit_index;
            }
            BinaryColor::Off => {
                self.get_active_buffer_mut()[byte_index] &= !(1 << bit_index);
            }
        }
    }

    pub fn pixel(&self, x: i32, y: i32) -> Option<BinaryColor> {
        if x < 0 || y < 0 || x as usize >= WIDTH || y as usize >= HEIGHT {
            return None;
        }
        let index = y as usize * WIDTH + x as usize;
        let bit = (self.get_active_buffer()[index / 8] >> (7 - (index % 8))) & 0x01;
        Some(if bit == 1 {
            BinaryColor::On
        } else {
            BinaryColor::Off
        })
    }
}

impl OriginDimensions for DisplayBuffers {
    fn size(&self) -> Size {
        Size::new(WIDTH as u32, HEIGHT as u32)
    }
}

impl DrawTarget for DisplayBuffers {
    type Color = BinaryColor;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(coord, color) in pixels {
            self.set_pixel(coord.x, coord.y, color);
        }
        Ok(())
    }
}
