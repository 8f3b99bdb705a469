//! Text width measurement.
//!
//! The wrapper and fitter only ever ask "how wide is this string at this
//! size", so they are written against [`TextMeasure`] and never touch pango
//! directly.

use serde::Serialize;

/// Average advance of a bold sans-serif glyph relative to the font size.
///
/// Used by hard-split wrapping and by [`EstimatedMeasure`]. It is a tunable
/// approximation, not a contract with the real rasterizer.
pub const ESTIMATED_CHAR_WIDTH: f64 = 0.56;

pub const DEFAULT_FONT_FAMILY: &str = "Arial";

/// Card text is always set bold; only family and size vary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FontSpec {
    pub family: String,
    pub size_px: u32,
}

impl FontSpec {
    pub fn bold(family: impl Into<String>, size_px: u32) -> Self {
        Self {
            family: family.into(),
            size_px,
        }
    }

    pub fn to_pango(&self) -> pango::FontDescription {
        let mut desc = pango::FontDescription::new();
        desc.set_family(&self.family);
        desc.set_weight(pango::Weight::Bold);
        desc.set_absolute_size(f64::from(self.size_px) * f64::from(pango::SCALE));
        desc
    }
}

pub trait TextMeasure {
    /// Width in pixels of `text` set in `font` on a single line.
    fn measure(&self, text: &str, font: &FontSpec) -> f64;
}

impl<T: TextMeasure + ?Sized> TextMeasure for &T {
    fn measure(&self, text: &str, font: &FontSpec) -> f64 {
        (**self).measure(text, font)
    }
}

/// Monospace approximation: every character is `size × 0.56` wide.
///
/// Deterministic and independent of installed fonts, which makes it the
/// measurer of choice for previews and tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct EstimatedMeasure;

impl TextMeasure for EstimatedMeasure {
    fn measure(&self, text: &str, font: &FontSpec) -> f64 {
        text.chars().count() as f64 * f64::from(font.size_px) * ESTIMATED_CHAR_WIDTH
    }
}

/// Measures with pango against a scratch cairo surface.
pub struct PangoMeasure {
    layout: pango::Layout,
    // keeps the layout's cairo target alive
    _ctx: cairo::Context,
}

impl PangoMeasure {
    pub fn new() -> Result<Self, cairo::Error> {
        let surface = cairo::ImageSurface::create(cairo::Format::ARgb32, 1, 1)?;
        let ctx = cairo::Context::new(&surface)?;
        let layout = pangocairo::create_layout(&ctx);
        Ok(Self { layout, _ctx: ctx })
    }

    pub(crate) fn from_layout(layout: pango::Layout, ctx: cairo::Context) -> Self {
        Self { layout, _ctx: ctx }
    }

    pub(crate) fn layout(&self) -> &pango::Layout {
        &self.layout
    }
}

impl TextMeasure for PangoMeasure {
    fn measure(&self, text: &str, font: &FontSpec) -> f64 {
        self.layout.set_width(-1);
        self.layout.set_font_description(Some(&font.to_pango()));
        self.layout.set_text(text);
        let (width, _) = self.layout.pixel_size();
        f64::from(width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn estimated_width_counts_chars_not_bytes() {
        let font = FontSpec::bold(DEFAULT_FONT_FAMILY, 50);
        assert_eq!(EstimatedMeasure.measure("abcd", &font), 112.0);
        assert_eq!(EstimatedMeasure.measure("éé", &font), 56.0);
        assert_eq!(EstimatedMeasure.measure("", &font), 0.0);
    }
}
