//! Drawing surface abstraction and its cairo/pango implementation.

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use custom_debug::Debug;

use crate::error::{DecodeError, ExportError, RenderError};
use crate::geometry::{Color, DrawRect, Rect};
use crate::measure::{FontSpec, PangoMeasure, TextMeasure};
use crate::profile::Stroke;

/// A decoded raster image, stored as premultiplied native-endian ARGB32 so it
/// can be handed straight to cairo.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    width: u32,
    height: u32,
    #[debug(skip)]
    pixels: Arc<[u8]>,
}

impl DecodedImage {
    /// Decodes any format the `image` crate recognises.
    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        let img = image::load_from_memory(bytes)?;
        Self::from_rgba(img.to_rgba8())
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Self, DecodeError> {
        let img = image::open(path)?;
        Self::from_rgba(img.to_rgba8())
    }

    pub fn from_rgba(img: image::RgbaImage) -> Result<Self, DecodeError> {
        let (width, height) = img.dimensions();
        if width == 0 || height == 0 {
            return Err(DecodeError::Dimensions { width, height });
        }
        let mut pixels = Vec::with_capacity(img.as_raw().len());
        for image::Rgba([r, g, b, a]) in img.pixels().copied() {
            let premultiply = |c: u8| ((u32::from(c) * u32::from(a) + 127) / 255) as u8;
            let argb = u32::from_be_bytes([a, premultiply(r), premultiply(g), premultiply(b)]);
            pixels.extend_from_slice(&argb.to_ne_bytes());
        }
        Ok(Self {
            width,
            height,
            pixels: pixels.into(),
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    fn to_surface(&self) -> Result<cairo::ImageSurface, cairo::Error> {
        cairo::ImageSurface::create_for_data(
            self.pixels.to_vec(),
            cairo::Format::ARgb32,
            self.width as i32,
            self.height as i32,
            self.width as i32 * 4,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HAlign {
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VAlign {
    Top,
    Middle,
}

/// Where a single line of text is pinned.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextAnchor {
    pub x: f64,
    pub y: f64,
    pub align: HAlign,
    pub baseline: VAlign,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub color: Color,
    pub stroke: Option<Stroke>,
}

impl TextStyle {
    pub fn fill(color: Color) -> Self {
        Self { color, stroke: None }
    }
}

/// Everything the compositor needs from a raster target.
pub trait Canvas: TextMeasure {
    fn fill_rect(&mut self, rect: Rect, color: Color) -> Result<(), RenderError>;

    /// Draws `image` scaled into `dest`, restricted to `clip` when given.
    fn draw_image(
        &mut self,
        image: &DecodedImage,
        dest: DrawRect,
        clip: Option<Rect>,
    ) -> Result<(), RenderError>;

    fn draw_text(
        &mut self,
        text: &str,
        font: &FontSpec,
        anchor: TextAnchor,
        style: &TextStyle,
    ) -> Result<(), RenderError>;
}

pub struct CairoCanvas {
    surface: cairo::ImageSurface,
    ctx: cairo::Context,
    text: PangoMeasure,
}

impl CairoCanvas {
    pub fn new(width: i32, height: i32) -> Result<Self, RenderError> {
        let surface = cairo::ImageSurface::create(cairo::Format::ARgb32, width, height)?;
        let ctx = cairo::Context::new(&surface)?;
        let layout = pangocairo::create_layout(&ctx);
        Ok(Self {
            surface,
            text: PangoMeasure::from_layout(layout, ctx.clone()),
            ctx,
        })
    }

    /// Ends drawing and hands over the finished surface.
    pub fn finish(self) -> RasterSurface {
        let Self { surface, ctx, text } = self;
        drop(text);
        drop(ctx);
        surface.flush();
        RasterSurface { surface }
    }

    fn set_color(&self, color: Color) {
        let (r, g, b) = color.to_unit();
        self.ctx.set_source_rgb(r, g, b);
    }
}

impl TextMeasure for CairoCanvas {
    fn measure(&self, text: &str, font: &FontSpec) -> f64 {
        self.text.measure(text, font)
    }
}

impl Canvas for CairoCanvas {
    fn fill_rect(&mut self, rect: Rect, color: Color) -> Result<(), RenderError> {
        self.set_color(color);
        self.ctx.rectangle(
            rect.x.into(),
            rect.y.into(),
            rect.width.into(),
            rect.height.into(),
        );
        self.ctx.fill()?;
        Ok(())
    }

    fn draw_image(
        &mut self,
        image: &DecodedImage,
        dest: DrawRect,
        clip: Option<Rect>,
    ) -> Result<(), RenderError> {
        let source = image.to_surface()?;
        self.ctx.save()?;
        if let Some(clip) = clip {
            self.ctx.rectangle(
                clip.x.into(),
                clip.y.into(),
                clip.width.into(),
                clip.height.into(),
            );
            self.ctx.clip();
        }
        self.ctx.translate(dest.x, dest.y);
        self.ctx.scale(
            dest.width / f64::from(image.width),
            dest.height / f64::from(image.height),
        );
        self.ctx.set_source_surface(&source, 0.0, 0.0)?;
        // edge pixels must not blend with transparency when upscaled
        self.ctx.source().set_extend(cairo::Extend::Pad);
        self.ctx.paint()?;
        self.ctx.restore()?;
        Ok(())
    }

    fn draw_text(
        &mut self,
        text: &str,
        font: &FontSpec,
        anchor: TextAnchor,
        style: &TextStyle,
    ) -> Result<(), RenderError> {
        let layout = self.text.layout();
        layout.set_width(-1);
        layout.set_font_description(Some(&font.to_pango()));
        layout.set_text(text);

        let (width, height) = layout.pixel_size();
        let x = match anchor.align {
            HAlign::Center => anchor.x - f64::from(width) / 2.0,
            HAlign::Right => anchor.x - f64::from(width),
        };
        let y = match anchor.baseline {
            VAlign::Top => anchor.y,
            VAlign::Middle => anchor.y - f64::from(height) / 2.0,
        };

        if let Some(stroke) = &style.stroke {
            self.ctx.move_to(x, y);
            self.set_color(stroke.color);
            pangocairo::layout_path(&self.ctx, layout);
            self.ctx.set_line_width(stroke.width);
            self.ctx.stroke()?;
        }

        self.ctx.move_to(x, y);
        self.set_color(style.color);
        pangocairo::layout_path(&self.ctx, layout);
        self.ctx.fill()?;
        Ok(())
    }
}

/// A finished card. Nothing draws on it any more.
pub struct RasterSurface {
    surface: cairo::ImageSurface,
}

impl RasterSurface {
    pub fn width(&self) -> i32 {
        self.surface.width()
    }

    pub fn height(&self) -> i32 {
        self.surface.height()
    }

    /// Un-premultiplied `(r, g, b, a)` at a pixel, `None` when out of range.
    pub fn pixel(&mut self, x: i32, y: i32) -> Option<(u8, u8, u8, u8)> {
        if x < 0 || y < 0 || x >= self.width() || y >= self.height() {
            return None;
        }
        let stride = self.surface.stride() as usize;
        let data = self.surface.data().ok()?;
        let offset = y as usize * stride + x as usize * 4;
        let word = u32::from_ne_bytes(data.get(offset..offset + 4)?.try_into().ok()?);
        let [a, r, g, b] = word.to_be_bytes();
        let unpremultiply = |c: u8| {
            if a == 0 {
                0
            } else {
                ((u32::from(c) * 255 + u32::from(a) / 2) / u32::from(a)) as u8
            }
        };
        Some((unpremultiply(r), unpremultiply(g), unpremultiply(b), a))
    }

    pub fn write_png<W: Write>(&self, out: &mut W) -> Result<(), ExportError> {
        self.surface.write_to_png(out)?;
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod recording {
    //! A canvas that logs draw calls instead of rasterizing them.

    use custom_debug::Debug;

    use super::*;
    use crate::measure::EstimatedMeasure;

    #[derive(Debug, Clone, PartialEq)]
    pub enum DrawOp {
        Fill(Rect, Color),
        Image {
            size: (u32, u32),
            dest: DrawRect,
            clip: Option<Rect>,
        },
        Text {
            text: String,
            size_px: u32,
            anchor: TextAnchor,
            color: Color,
        },
    }

    #[derive(Debug, Default)]
    pub struct RecordingCanvas {
        pub ops: Vec<DrawOp>,
    }

    impl TextMeasure for RecordingCanvas {
        fn measure(&self, text: &str, font: &FontSpec) -> f64 {
            EstimatedMeasure.measure(text, font)
        }
    }

    impl Canvas for RecordingCanvas {
        fn fill_rect(&mut self, rect: Rect, color: Color) -> Result<(), RenderError> {
            self.ops.push(DrawOp::Fill(rect, color));
            Ok(())
        }

        fn draw_image(
            &mut self,
            image: &DecodedImage,
            dest: DrawRect,
            clip: Option<Rect>,
        ) -> Result<(), RenderError> {
            self.ops.push(DrawOp::Image {
                size: (image.width(), image.height()),
                dest,
                clip,
            });
            Ok(())
        }

        fn draw_text(
            &mut self,
            text: &str,
            font: &FontSpec,
            anchor: TextAnchor,
            style: &TextStyle,
        ) -> Result<(), RenderError> {
            self.ops.push(DrawOp::Text {
                text: text.to_string(),
                size_px: font.size_px,
                anchor,
                color: style.color,
            });
            Ok(())
        }
    }
}

#[cfg(test)]
pub(crate) fn solid_image(width: u32, height: u32, color: Color) -> DecodedImage {
    let rgba = image::Rgba([color.r, color.g, color.b, 255]);
    let img = image::RgbaImage::from_pixel(width, height, rgba);
    DecodedImage::from_rgba(img).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_sized_image_is_rejected() {
        let img = image::RgbaImage::new(0, 4);
        assert!(matches!(
            DecodedImage::from_rgba(img),
            Err(DecodeError::Dimensions { width: 0, height: 4 })
        ));
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        assert!(matches!(
            DecodedImage::decode(b"definitely not a png"),
            Err(DecodeError::Image(_))
        ));
    }

    #[test]
    fn decodes_png_bytes() {
        let mut png = Vec::new();
        image::RgbaImage::from_pixel(3, 2, image::Rgba([10, 20, 30, 255]))
            .write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
            .unwrap();
        let decoded = DecodedImage::decode(&png).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (3, 2));
    }

    #[test]
    fn premultiplies_alpha() {
        let img = image::RgbaImage::from_pixel(1, 1, image::Rgba([255, 0, 0, 128]));
        let decoded = DecodedImage::from_rgba(img).unwrap();
        let word = u32::from_ne_bytes(decoded.pixels[..4].try_into().unwrap());
        assert_eq!(word.to_be_bytes(), [128, 128, 0, 0]);
    }

    #[test]
    fn cairo_fill_and_clipped_image() {
        let mut canvas = CairoCanvas::new(40, 40).unwrap();
        canvas.fill_rect(Rect::new(0, 0, 40, 40), Color::rgb(0x8b, 0, 0)).unwrap();
        let photo = solid_image(10, 10, Color::rgb(0, 0, 0xff));
        // the photo would cover the whole canvas but is clipped to the centre
        canvas
            .draw_image(
                &photo,
                DrawRect { x: -20.0, y: -20.0, width: 80.0, height: 80.0 },
                Some(Rect::new(10, 10, 20, 20)),
            )
            .unwrap();

        let mut surface = canvas.finish();
        assert_eq!((surface.width(), surface.height()), (40, 40));
        assert_eq!(surface.pixel(2, 2), Some((0x8b, 0, 0, 255)));
        assert_eq!(surface.pixel(20, 20), Some((0, 0, 0xff, 255)));
        assert_eq!(surface.pixel(35, 20), Some((0x8b, 0, 0, 255)));
        assert_eq!(surface.pixel(40, 0), None);
    }

    #[test]
    fn stretched_image_keeps_opaque_edges() {
        let mut canvas = CairoCanvas::new(30, 30).unwrap();
        let template = solid_image(3, 3, Color::rgb(0xcc, 0, 0));
        canvas
            .draw_image(&template, Rect::new(0, 0, 30, 30).into(), None)
            .unwrap();

        let mut surface = canvas.finish();
        for (x, y) in [(0, 0), (29, 0), (0, 29), (29, 29), (15, 0)] {
            assert_eq!(surface.pixel(x, y), Some((0xcc, 0, 0, 255)), "at {x},{y}");
        }
    }

    #[test]
    fn recorded_ops_are_debug_printable() {
        use super::recording::{DrawOp, RecordingCanvas};

        let mut canvas = RecordingCanvas::default();
        canvas.fill_rect(Rect::new(0, 0, 2, 2), Color::WHITE).unwrap();
        assert_eq!(canvas.ops, [DrawOp::Fill(Rect::new(0, 0, 2, 2), Color::WHITE)]);
        assert!(format!("{canvas:?}").contains("Fill"));
    }
}
