use std::fmt;

use schemars::{gen::SchemaGenerator, schema::Schema, JsonSchema};
use serde::{Deserialize, Serialize};

/// Integer box in canvas pixels, as authored in layout profiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(&self) -> i32 {
        self.x.saturating_add(self.width)
    }

    pub fn bottom(&self) -> i32 {
        self.y.saturating_add(self.height)
    }

    pub fn center_x(&self) -> f64 {
        f64::from(self.x) + f64::from(self.width) / 2.0
    }

    pub fn center_y(&self) -> f64 {
        f64::from(self.y) + f64::from(self.height) / 2.0
    }

    /// True when the box has positive size and lies fully inside a
    /// `width`x`height` canvas anchored at the origin.
    pub fn fits_within(&self, width: i32, height: i32) -> bool {
        self.width > 0
            && self.height > 0
            && self.x >= 0
            && self.y >= 0
            && self.right() <= width
            && self.bottom() <= height
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// Scales each edge independently, rounding to the nearest pixel.
    ///
    /// Width and height come from the rounded edges, so a box centred on the
    /// canvas stays centred.
    pub fn scaled(&self, sx: f64, sy: f64) -> Self {
        let x = scale_px(self.x, sx);
        let y = scale_px(self.y, sy);
        Self {
            x,
            y,
            width: scale_px(self.right(), sx).saturating_sub(x),
            height: scale_px(self.bottom(), sy).saturating_sub(y),
        }
    }
}

impl From<Rect> for DrawRect {
    fn from(rect: Rect) -> Self {
        Self {
            x: rect.x.into(),
            y: rect.y.into(),
            width: rect.width.into(),
            height: rect.height.into(),
        }
    }
}

pub(crate) fn scale_px(value: i32, scale: f64) -> i32 {
    (f64::from(value) * scale).round() as i32
}

/// Sub-pixel rectangle produced by layout calculations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DrawRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl DrawRect {
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Whether `other` lies entirely inside this rectangle, allowing `epsilon`
    /// of floating point slack on every edge.
    pub fn contains(&self, other: &Rect, epsilon: f64) -> bool {
        let other = DrawRect::from(*other);
        self.x <= other.x + epsilon
            && self.y <= other.y + epsilon
            && self.right() + epsilon >= other.right()
            && self.bottom() + epsilon >= other.bottom()
    }
}

/// Opaque RGB colour, written as `#rrggbb` (or `#rgb`) in config files.
#[derive(Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(0xff, 0xff, 0xff);
    pub const BLACK: Color = Color::rgb(0x00, 0x00, 0x00);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Channels as cairo expects them, in `0.0..=1.0`.
    pub fn to_unit(self) -> (f64, f64, f64) {
        (
            f64::from(self.r) / 255.0,
            f64::from(self.g) / 255.0,
            f64::from(self.b) / 255.0,
        )
    }
}

impl fmt::Debug for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

impl std::str::FromStr for Color {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s
            .strip_prefix('#')
            .ok_or_else(|| format!("colour `{s}` must start with `#`"))?;
        let digits: Vec<u8> = hex
            .chars()
            .map(|c| c.to_digit(16).map(|d| d as u8))
            .collect::<Option<_>>()
            .ok_or_else(|| format!("colour `{s}` is not hexadecimal"))?;
        match digits.as_slice() {
            [r, g, b] => Ok(Color::rgb(r * 17, g * 17, b * 17)),
            [r1, r2, g1, g2, b1, b2] => Ok(Color::rgb(r1 * 16 + r2, g1 * 16 + g2, b1 * 16 + b2)),
            _ => Err(format!("colour `{s}` must have 3 or 6 hex digits")),
        }
    }
}

impl JsonSchema for Color {
    fn schema_name() -> String {
        "Color".to_string()
    }

    fn json_schema(gen: &mut SchemaGenerator) -> Schema {
        String::json_schema(gen)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_colors() {
        assert_eq!("#8b0000".parse::<Color>(), Ok(Color::rgb(0x8b, 0, 0)));
        assert_eq!("#FFD700".parse::<Color>(), Ok(Color::rgb(0xff, 0xd7, 0x00)));
        assert_eq!("#fff".parse::<Color>(), Ok(Color::WHITE));
        assert!("8b0000".parse::<Color>().is_err());
        assert!("#12345".parse::<Color>().is_err());
        assert!("#zzzzzz".parse::<Color>().is_err());
    }

    #[test]
    fn color_serde_is_hex_string() {
        let color: Color = serde_json::from_str("\"#cc0000\"").unwrap();
        assert_eq!(color, Color::rgb(0xcc, 0, 0));
        assert_eq!(serde_json::to_string(&color).unwrap(), "\"#cc0000\"");
    }

    #[test]
    fn scaled_rect_rounds_each_edge() {
        let rect = Rect::new(52, 200, 220, 60).scaled(1080.0 / 920.0, 1.35);
        assert_eq!(rect, Rect::new(61, 270, 258, 81));
    }

    #[test]
    fn scaling_keeps_centred_boxes_centred() {
        let rect = Rect::new(20, 420, 880, 400).scaled(1080.0 / 920.0, 1.35);
        assert_eq!(rect, Rect::new(23, 567, 1034, 540));
        assert_eq!(rect.center_x(), 540.0);
    }

    #[test]
    fn edges_saturate_instead_of_overflowing() {
        let rect = Rect::new(i32::MAX - 10, 0, 100, i32::MAX);
        assert_eq!(rect.right(), i32::MAX);
        assert!(!rect.fits_within(920, 1000));
        assert!(!Rect::new(0, 1, 10, i32::MAX).fits_within(920, 1000));
    }

    #[test]
    fn fits_within_canvas() {
        assert!(Rect::new(0, 0, 920, 1000).fits_within(920, 1000));
        assert!(!Rect::new(50, 420, 880, 400).fits_within(920, 1000));
        assert!(!Rect::new(10, 10, 0, 10).fits_within(920, 1000));
    }

    #[test]
    fn touching_boxes_do_not_intersect() {
        let image = Rect::new(40, 275, 840, 400);
        assert!(!image.intersects(&Rect::new(20, 675, 880, 200)));
        assert!(image.intersects(&Rect::new(20, 674, 880, 200)));
    }
}
