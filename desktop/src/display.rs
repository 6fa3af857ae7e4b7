use std::time::Duration;

use verseclock_core::{
    display::{Display, HEIGHT, RefreshMode, WIDTH},
    framebuffer::DisplayBuffers,
};

const DISPLAY_BUFFER_SIZE: usize = WIDTH * HEIGHT;
const WHITE: u32 = 0xFFFFFFFF;
const BLACK: u32 = 0xFF000000;
/// How long the simulated full-refresh flash stays on screen.
const FULL_REFRESH_FLASH: Duration = Duration::from_millis(150);

/// Window-backed stand-in for the e-paper panel.
pub struct MinifbDisplay {
    display_buffer: Vec<u32>,
    window: minifb::Window,
    paints: usize,
}

impl MinifbDisplay {
    pub fn new(window: minifb::Window) -> Self {
        Self {
            display_buffer: vec![WHITE; DISPLAY_BUFFER_SIZE],
            window,
            paints: 0,
        }
    }

    pub fn is_open(&self) -> bool {
        self.window.is_open() && !self.window.is_key_down(minifb::Key::Escape)
    }

    pub fn paints(&self) -> usize {
        self.paints
    }

    /// Keeps the window responsive between paints.
    pub fn update(&mut self) {
        self.present();
    }

    fn present(&mut self) {
        if let Err(err) = self
            .window
            .update_with_buffer(&self.display_buffer, WIDTH, HEIGHT)
        {
            log::error!("window update failed: {}", err);
        }
    }

    fn blit(&mut self, buffers: &DisplayBuffers) {
        unpack(buffers.get_active_buffer(), &mut self.display_buffer);
    }
}

impl Display for MinifbDisplay {
    fn display(&mut self, buffers: &mut DisplayBuffers, mode: RefreshMode) {
        if mode == RefreshMode::Full {
            self.display_buffer.fill(BLACK);
            self.present();
            std::thread::sleep(FULL_REFRESH_FLASH);
        }
        self.blit(buffers);
        self.present();
        self.paints += 1;
        log::debug!("panel paint #{} ({:?})", self.paints, mode);
        buffers.swap_buffers();
    }
}

/// Headless panel that keeps the last committed frame, for screenshots.
#[derive(Default)]
pub struct CaptureDisplay {
    pub frame: Option<Vec<u32>>,
    pub modes: Vec<RefreshMode>,
}

impl Display for CaptureDisplay {
    fn display(&mut self, buffers: &mut DisplayBuffers, mode: RefreshMode) {
        let mut pixels = vec![WHITE; DISPLAY_BUFFER_SIZE];
        unpack(buffers.get_active_buffer(), &mut pixels);
        self.frame = Some(pixels);
        self.modes.push(mode);
        buffers.swap_buffers();
    }
}

fn unpack(packed: &[u8], pixels: &mut [u32]) {
    for (i, byte) in packed.iter().enumerate() {
        for bit in 0..8 {
            let pixel_index = i * 8 + bit;
            pixels[pixel_index] = if (byte & (1 << (7 - bit))) != 0 {
                WHITE
            } else {
                BLACK
            };
        }
    }
}

/// Saves an unpacked frame as an 8-bit grayscale PNG.
pub fn save_png(pixels: &[u32], path: &str) -> image::ImageResult<()> {
    let image = image::GrayImage::from_fn(WIDTH as u32, HEIGHT as u32, |x, y| {
        let value = pixels[y as usize * WIDTH + x as usize];
        image::Luma([if value == WHITE { 255 } else { 0 }])
    });
    image.save(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::pixelcolor::BinaryColor;

    #[test]
    fn capture_keeps_committed_frame() {
        let mut buffers = DisplayBuffers::new();
        buffers.set_pixel(9, 0, BinaryColor::Off);
        let mut capture = CaptureDisplay::default();
        capture.display(&mut buffers, RefreshMode::Full);

        let frame = capture.frame.as_ref().unwrap();
        assert_eq!(frame[8], WHITE);
        assert_eq!(frame[9], BLACK);
        assert_eq!(capture.modes, [RefreshMode::Full]);
    }

    #[test]
    fn screenshot_is_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.png");
        let pixels = vec![WHITE; DISPLAY_BUFFER_SIZE];
        save_png(&pixels, path.to_str().unwrap()).unwrap();
        let loaded = image::open(&path).unwrap();
        assert_eq!(loaded.width(), WIDTH as u32);
    }
}
