//! Integer-scaled bitmap fonts on top of the embedded-graphics mono fonts.
//!
//! The panel is large compared to the biggest built-in glyphs, so the time
//! and glance fonts are drawn through [`ScaledTarget`], which turns every
//! source pixel into a `scale x scale` block.

use embedded_graphics::{
    Drawable, Pixel,
    mono_font::{MonoFont, MonoTextStyle, iso_8859_1::FONT_10X20},
    pixelcolor::BinaryColor,
    prelude::{DrawTarget, OriginDimensions, Point, Size},
    primitives::Rectangle,
    text::{Baseline, Text},
};

use crate::layout::FontMetrics;

#[derive(Clone, Copy)]
pub struct Font {
    pub mono: &'static MonoFont<'static>,
    pub scale: u32,
}

/// Clock digits in zone A.
pub const TIME: Font = Font::new(&FONT_10X20, 6);
/// AM/PM token beside the digits.
pub const MERIDIEM: Font = Font::new(&FONT_10X20, 2);
/// Passage text in glance mode.
pub const PASSAGE_LARGE: Font = Font::new(&FONT_10X20, 2);
/// Passage text, reference line and status bar.
pub const BODY: Font = Font::new(&FONT_10X20, 1);

impl Font {
    pub const fn new(mono: &'static MonoFont<'static>, scale: u32) -> Self {
        Self { mono, scale }
    }

    pub fn height(&self) -> u32 {
        self.mono.character_size.height * self.scale
    }

    /// Draws `text` with its top-left corner at `top_left`, returning the x
    /// coordinate just past the last glyph.
    pub fn draw<D>(&self, target: &mut D, text: &str, top_left: Point) -> Result<i32, D::Error>
    where
        D: DrawTarget<Color = BinaryColor> + OriginDimensions,
    {
        let style = MonoTextStyle::new(self.mono, BinaryColor::Off);
        if self.scale <= 1 {
            Text::with_baseline(text, top_left, style, Baseline::Top).draw(target)?;
        } else {
            let mut scaled = ScaledTarget::new(target, top_left, self.scale);
            Text::with_baseline(text, Point::zero(), style, Baseline::Top).draw(&mut scaled)?;
        }
        Ok(top_left.x + self.measure(text) as i32)
    }
}

impl FontMetrics for Font {
    fn advance(&self, _ch: char) -> u32 {
        (self.mono.character_size.width + self.mono.character_spacing) * self.scale
    }

    fn line_height(&self) -> u32 {
        self.height()
    }
}

/// Draw adapter that magnifies everything drawn into it.
pub struct ScaledTarget<'a, D> {
    inner: &'a mut D,
    origin: Point,
    scale: u32,
}

impl<'a, D> ScaledTarget<'a, D> {
    pub fn new(inner: &'a mut D, origin: Point, scale: u32) -> Self {
        Self {
            inner,
            origin,
            scale: scale.max(1),
        }
    }
}

impl<D: OriginDimensions> OriginDimensions for ScaledTarget<'_, D> {
    fn size(&self) -> Size {
        self.inner.size() / self.scale
    }
}

impl<D> DrawTarget for ScaledTarget<'_, D>
where
    D: DrawTarget<Color = BinaryColor> + OriginDimensions,
{
    type Color = BinaryColor;
    type Error = D::Error;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let block = Size::new(self.scale, self.scale);
        for Pixel(coord, color) in pixels {
            let top_left = self.origin + coord * self.scale as i32;
            self.inner
                .fill_solid(&Rectangle::new(top_left, block), color)?;
        }
        Ok(())
    }
}
