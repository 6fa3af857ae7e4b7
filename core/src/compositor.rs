//! Arranges one frame into three zones:
//!
//! ```text
//! +--------------------------------------+  0
//! |              12:45 PM                |  zone A: time (48% of height)
//! |--------------------------------------|
//! |              John 3:16               |  zone B: passage
//! |     For God so loved the world...    |
//! |--------------------------------------|  HEIGHT - STATUS_BAR_HEIGHT
//! | Fri Oct 16                  [t] 21°C |  zone C: status
//! | Setup: http://192.168.4.1/           |
//! +--------------------------------------+
//! ```

extern crate alloc;

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use embedded_graphics::{
    Drawable,
    pixelcolor::BinaryColor,
    prelude::{DrawTarget, Point, Primitive},
    primitives::{Line, PrimitiveStyle},
};

mod generated_icons {
    include!(concat!(env!("OUT_DIR"), "/icons.rs"));
}

use crate::books::Reference;
use crate::clock::{LocalTime, WeatherReading};
use crate::config::DisplaySettings;
use crate::display::{HEIGHT, WIDTH};
use crate::font::{self, Font};
use crate::framebuffer::DisplayBuffers;
use crate::layout::{self, FontMetrics};

pub const MARGIN: i32 = 16;
pub const STATUS_BAR_HEIGHT: i32 = 56;
pub const TIME_ZONE_PERCENT: i32 = 48;
/// Passage lines never exceed this share of the panel width.
pub const TEXT_WIDTH_PERCENT: u32 = 74;
pub const GLANCE_MAX_LINES: usize = 2;
pub const FULL_MAX_LINES: usize = 6;

const DIVIDER_STROKE: u32 = 2;
const LINE_GAP: i32 = 5;
const REFERENCE_GAP: i32 = 8;
const MERIDIEM_GAP: i32 = 8;
const ICON_GAP: i32 = 6;

pub const NOT_READY_MESSAGE: &str = "Verse data unavailable. Check the storage card and restart.";
pub const NO_PASSAGE_MESSAGE: &str = "No verse for this minute.";
pub const NO_WEATHER: &str = "--\u{b0}";

/// What zone B shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassageView<'a> {
    NotReady,
    NoPassage,
    Passage { reference: Reference, text: &'a str },
}

pub struct Frame<'a> {
    pub time: LocalTime,
    pub settings: DisplaySettings,
    pub passage: PassageView<'a>,
    pub weather: Option<WeatherReading>,
    /// Shown outside glance mode while the network is up.
    pub setup_url: Option<&'a str>,
}

pub fn time_zone_height() -> i32 {
    HEIGHT as i32 * TIME_ZONE_PERCENT / 100
}

pub fn text_width() -> u32 {
    WIDTH as u32 * TEXT_WIDTH_PERCENT / 100
}

/// Draws `frame` into the active buffer and returns the wrapped passage
/// lines that were laid out in zone B.
pub fn compose(buffers: &mut DisplayBuffers, frame: &Frame<'_>) -> Vec<String> {
    buffers.clear(BinaryColor::On).ok();
    draw_time_zone(buffers, frame);
    let lines = draw_passage_zone(buffers, frame);
    draw_status_zone(buffers, frame);
    lines
}

fn draw_time_zone(buffers: &mut DisplayBuffers, frame: &Frame<'_>) {
    let zone_h = time_zone_height();
    let time = layout::format_time(frame.time.hour, frame.time.minute, frame.settings.clock24);

    let digits_w = font::TIME.measure(&time.digits) as i32;
    let x = (WIDTH as i32 - digits_w) / 2;
    let y = (zone_h - font::TIME.height() as i32) / 2;
    let end = font::TIME.draw(buffers, &time.digits, Point::new(x, y)).unwrap_or(x + digits_w);

    if let Some(meridiem) = time.meridiem {
        font::MERIDIEM
            .draw(buffers, meridiem, Point::new(end + MERIDIEM_GAP, y))
            .ok();
    }

    divider(buffers, zone_h - DIVIDER_STROKE as i32 * 2);
}

fn draw_passage_zone(buffers: &mut DisplayBuffers, frame: &Frame<'_>) -> Vec<String> {
    let top = time_zone_height();
    let bottom = HEIGHT as i32 - STATUS_BAR_HEIGHT;
    let max_width = text_width();

    let (reference, text, body_font, max_lines) = match frame.passage {
        PassageView::NotReady => (None, NOT_READY_MESSAGE, font::BODY, FULL_MAX_LINES),
        PassageView::NoPassage => (None, NO_PASSAGE_MESSAGE, font::BODY, FULL_MAX_LINES),
        PassageView::Passage { reference, text } => {
            if frame.settings.glance {
                (Some(reference), text, font::PASSAGE_LARGE, GLANCE_MAX_LINES)
            } else {
                (Some(reference), text, font::BODY, FULL_MAX_LINES)
            }
        }
    };

    let lines = layout::wrap(text, max_width, max_lines, &body_font);
    let pitch = line_pitch(&body_font);
    let reference_label = reference.map(|r| format!("{r}"));
    let reference_h = if reference_label.is_some() {
        font::BODY.line_height() as i32 + REFERENCE_GAP
    } else {
        0
    };
    let block_h = reference_h + lines.len() as i32 * pitch - LINE_GAP;
    let mut y = top + ((bottom - top) - block_h).max(0) / 2;

    if let Some(label) = &reference_label {
        let x = centered_x(&font::BODY, label);
        // Double strike for a bold reference line.
        font::BODY.draw(buffers, label, Point::new(x, y)).ok();
        font::BODY.draw(buffers, label, Point::new(x + 1, y)).ok();
        y += reference_h;
    }

    for line in &lines {
        body_font
            .draw(buffers, line, Point::new(centered_x(&body_font, line), y))
            .ok();
        y += pitch;
    }
    lines
}

fn draw_status_zone(buffers: &mut DisplayBuffers, frame: &Frame<'_>) {
    let top = HEIGHT as i32 - STATUS_BAR_HEIGHT;
    divider(buffers, top);

    let line_y = top + 8;
    let date = layout::format_date(frame.time.weekday, frame.time.month, frame.time.day);
    font::BODY.draw(buffers, &date, Point::new(MARGIN, line_y)).ok();

    let reading = frame.weather.filter(|w| w.valid);
    let temperature = match reading {
        Some(w) => layout::format_temperature(w.temperature_c, frame.settings.unit),
        None => String::from(NO_WEATHER),
    };
    let temp_x = WIDTH as i32 - MARGIN - font::BODY.measure(&temperature) as i32;
    font::BODY.draw(buffers, &temperature, Point::new(temp_x, line_y)).ok();
    if reading.is_some() {
        let size = generated_icons::ICON_SIZE as i32;
        let icon_y = line_y + (font::BODY.height() as i32 - size) / 2;
        draw_mask(
            buffers,
            temp_x - ICON_GAP - size,
            icon_y,
            size,
            size,
            generated_icons::ICON_THERMOMETER_MASK,
        );
    }

    if !frame.settings.glance {
        if let Some(url) = frame.setup_url {
            let label = format!("Setup: {url}");
            let second_y = line_y + font::BODY.line_height() as i32 + 4;
            font::BODY.draw(buffers, &label, Point::new(MARGIN, second_y)).ok();
        }
    }
}

/// Baseline-to-baseline distance of wrapped passage lines.
fn line_pitch<F: FontMetrics + ?Sized>(font: &F) -> i32 {
    font.line_height() as i32 + LINE_GAP
}

fn centered_x(font: &Font, text: &str) -> i32 {
    (WIDTH as i32 - font.measure(text) as i32) / 2
}

fn divider(buffers: &mut DisplayBuffers, y: i32) {
    Line::new(Point::new(MARGIN, y), Point::new(WIDTH as i32 - MARGIN, y))
        .into_styled(PrimitiveStyle::with_stroke(BinaryColor::Off, DIVIDER_STROKE))
        .draw(buffers)
        .ok();
}

/// Blits a packed 1-bit mask (MSB first, row-major); set bits are inked.
fn draw_mask(buffers: &mut DisplayBuffers, x: i32, y: i32, width: i32, height: i32, mask: &[u8]) {
    if width <= 0 || height <= 0 {
        return;
    }
    let width_u = width as usize;
    let height_u = height as usize;
    if mask.len() != (width_u * height_u).div_ceil(8) {
        return;
    }
    for yy in 0..height_u {
        for xx in 0..width_u {
            let idx = yy * width_u + xx;
            if (mask[idx / 8] >> (7 - (idx % 8))) & 1 == 1 {
                buffers.set_pixel(x + xx as i32, y + yy as i32, BinaryColor::Off);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn time() -> LocalTime {
        LocalTime {
            hour: 15,
            minute: 16,
            weekday: 5,
            month: 9,
            day: 16,
        }
    }

    fn frame(passage: PassageView<'_>, settings: DisplaySettings) -> Frame<'_> {
        Frame {
            time: time(),
            settings,
            passage,
            weather: Some(WeatherReading {
                temperature_c: 21.0,
                valid: true,
            }),
            setup_url: Some("http://192.168.4.1/"),
        }
    }

    fn inked_rows(buffers: &DisplayBuffers, from: i32, to: i32) -> usize {
        (from..to)
            .filter(|&y| (0..WIDTH as i32).any(|x| buffers.pixel(x, y) == Some(BinaryColor::Off)))
            .count()
    }

    const VERSE: &str = "For God so loved the world, that he gave his only begotten Son, \
        that whosoever believeth in him should not perish, but have everlasting life.";

    #[test]
    fn glance_mode_caps_passage_at_two_lines() {
        let mut buffers = DisplayBuffers::new();
        let reference = Reference { book_id: 43, chapter: 3, verse: 16 };
        let settings = DisplaySettings { glance: true, ..DisplaySettings::default() };
        let lines = compose(&mut buffers, &frame(PassageView::Passage { reference, text: VERSE }, settings));
        assert_eq!(lines.len(), GLANCE_MAX_LINES);
        assert!(lines.iter().all(|l| font::PASSAGE_LARGE.measure(l) <= text_width()));
    }

    #[test]
    fn full_mode_fits_passage_in_six_lines() {
        let mut buffers = DisplayBuffers::new();
        let reference = Reference { book_id: 43, chapter: 3, verse: 16 };
        let lines = compose(
            &mut buffers,
            &frame(PassageView::Passage { reference, text: VERSE }, DisplaySettings::default()),
        );
        assert!(!lines.is_empty() && lines.len() <= FULL_MAX_LINES);
        assert_eq!(lines.concat().len() + lines.len() - 1, VERSE.len());
    }

    #[test]
    fn not_ready_and_no_passage_show_fixed_messages() {
        let mut buffers = DisplayBuffers::new();
        let lines = compose(&mut buffers, &frame(PassageView::NotReady, DisplaySettings::default()));
        assert_eq!(lines.join(" "), NOT_READY_MESSAGE);
        let lines = compose(&mut buffers, &frame(PassageView::NoPassage, DisplaySettings::default()));
        assert_eq!(lines, [NO_PASSAGE_MESSAGE]);
    }

    #[test]
    fn every_zone_gets_ink() {
        let mut buffers = DisplayBuffers::new();
        compose(&mut buffers, &frame(PassageView::NoPassage, DisplaySettings::default()));
        let zone_a = time_zone_height();
        let status = HEIGHT as i32 - STATUS_BAR_HEIGHT;
        assert!(inked_rows(&buffers, 0, zone_a) > 60);
        assert!(inked_rows(&buffers, zone_a, status) > 10);
        assert!(inked_rows(&buffers, status + 4, HEIGHT as i32) > 20);
    }

    #[test]
    fn setup_line_hidden_in_glance_mode() {
        let status_second_line = HEIGHT as i32 - STATUS_BAR_HEIGHT + 8 + 24;
        let mut buffers = DisplayBuffers::new();
        compose(&mut buffers, &frame(PassageView::NoPassage, DisplaySettings::default()));
        assert!(inked_rows(&buffers, status_second_line, HEIGHT as i32) > 0);

        let settings = DisplaySettings { glance: true, ..DisplaySettings::default() };
        compose(&mut buffers, &frame(PassageView::NoPassage, settings));
        assert_eq!(inked_rows(&buffers, status_second_line, HEIGHT as i32), 0);
    }

    #[test]
    fn passage_pitch_follows_font_line_height() {
        assert_eq!(line_pitch(&font::BODY), 25);
        assert_eq!(line_pitch(&font::PASSAGE_LARGE), 45);
    }
}
