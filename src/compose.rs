//! Card composition.
//!
//! A render runs `Idle → BackgroundResolving → Composing → Rendered`, or ends
//! in `Failed` when the photo is unusable. Background problems never fail a
//! render; they switch the card to the profile's flat fallback.
//!
//! Layout ([`plan`]) and drawing ([`paint`]) are separate so the geometry can
//! be inspected or tested without a raster backend.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use custom_debug::Debug;
use serde::Serialize;

use crate::asset::{resolve_background, BackgroundSource};
use crate::canvas::{
    Canvas, CairoCanvas, DecodedImage, HAlign, RasterSurface, TextAnchor, TextStyle, VAlign,
};
use crate::cover::cover_fit;
use crate::error::RenderError;
use crate::fit::{fit, WrappedText};
use crate::geometry::{DrawRect, Rect};
use crate::measure::{FontSpec, TextMeasure};
use crate::profile::{Banner, LayoutProfile};

pub const DATE_FORMAT: &str = "%m/%d/%Y";

pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Date printed in the date box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CardDate {
    #[default]
    Today,
    On(NaiveDate),
}

impl CardDate {
    pub fn resolve(self) -> NaiveDate {
        match self {
            CardDate::Today => chrono::Local::now().date_naive(),
            CardDate::On(date) => date,
        }
    }
}

impl From<Option<NaiveDate>> for CardDate {
    fn from(date: Option<NaiveDate>) -> Self {
        date.map_or(CardDate::Today, CardDate::On)
    }
}

#[derive(Debug, Clone)]
pub enum Background {
    /// The profile's template image, stretched over the whole canvas.
    Template(DecodedImage),
    /// Flat colour plus header and footer banners.
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderPhase {
    Idle,
    BackgroundResolving,
    Composing,
    Rendered,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhotoPlacement {
    /// Where the whole photo lands; usually larger than `clip`.
    pub draw: DrawRect,
    pub clip: Rect,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionedLine {
    pub text: String,
    /// Horizontal centre of the line.
    pub x: f64,
    /// Top of the line.
    pub y: f64,
}

/// Every position and size needed to draw a card.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardLayout {
    pub profile: String,
    pub width: i32,
    pub height: i32,
    pub date_text: String,
    pub photo: Option<PhotoPlacement>,
    pub headline: WrappedText,
    pub headline_lines: Vec<PositionedLine>,
}

/// Computes the card layout without drawing anything.
pub fn plan<M>(
    profile: &LayoutProfile,
    headline: &str,
    photo: Option<&DecodedImage>,
    date: NaiveDate,
    measure: &M,
) -> Result<CardLayout, RenderError>
where
    M: TextMeasure + ?Sized,
{
    let photo = match (profile.image_box, photo) {
        (Some(image_box), Some(photo)) => Some(PhotoPlacement {
            draw: cover_fit(photo.width(), photo.height(), &image_box)?,
            clip: image_box,
        }),
        (None, Some(_)) => {
            tracing::debug!(profile = %profile.name, "profile has no image box, ignoring photo");
            None
        }
        _ => None,
    };

    let headline = fit(headline, profile, measure);
    if headline.truncated {
        tracing::warn!(
            profile = %profile.name,
            lines = headline.lines.len(),
            font_size = headline.font_size_px,
            block_height = headline.block_height(),
            "headline truncated to fit its box"
        );
    }

    let center = profile.headline_box.center_x();
    let top = f64::from(profile.headline_box.y);
    let headline_lines = headline
        .lines
        .iter()
        .enumerate()
        .map(|(i, text)| PositionedLine {
            text: text.clone(),
            x: center,
            y: top + i as f64 * f64::from(headline.line_height_px),
        })
        .collect();

    Ok(CardLayout {
        profile: profile.name.clone(),
        width: profile.width,
        height: profile.height,
        date_text: format_date(date),
        photo,
        headline,
        headline_lines,
    })
}

/// Draws a planned card: background, date box, photo, headline, in that order.
pub fn paint<C>(
    canvas: &mut C,
    profile: &LayoutProfile,
    background: &Background,
    photo: Option<&DecodedImage>,
    layout: &CardLayout,
) -> Result<(), RenderError>
where
    C: Canvas + ?Sized,
{
    match background {
        Background::Template(image) => {
            let full = Rect::new(0, 0, profile.width, profile.height);
            canvas.draw_image(image, full.into(), None)?;
        }
        Background::Fallback => paint_fallback(canvas, profile)?,
    }

    let date = &profile.date;
    canvas.fill_rect(date.rect, date.fill)?;
    canvas.draw_text(
        &layout.date_text,
        &profile.date_font(),
        TextAnchor {
            x: f64::from(date.rect.right() - date.padding_px),
            y: date.rect.center_y(),
            align: HAlign::Right,
            baseline: VAlign::Middle,
        },
        &TextStyle::fill(date.text_color),
    )?;

    if let (Some(placement), Some(photo)) = (&layout.photo, photo) {
        canvas.draw_image(photo, placement.draw, Some(placement.clip))?;
    }

    let font = FontSpec::bold(&profile.font_family, layout.headline.font_size_px);
    let style = TextStyle {
        color: profile.headline_color,
        stroke: profile.headline_stroke.clone(),
    };
    for line in &layout.headline_lines {
        let anchor = TextAnchor {
            x: line.x,
            y: line.y,
            align: HAlign::Center,
            baseline: VAlign::Top,
        };
        canvas.draw_text(&line.text, &font, anchor, &style)?;
    }
    Ok(())
}

fn paint_fallback<C>(canvas: &mut C, profile: &LayoutProfile) -> Result<(), RenderError>
where
    C: Canvas + ?Sized,
{
    let full = Rect::new(0, 0, profile.width, profile.height);
    canvas.fill_rect(full, profile.fallback.background)?;

    let banners = [
        (profile.header_rect(), &profile.fallback.header),
        (profile.footer_rect(), &profile.fallback.footer),
    ];
    for (rect, banner) in banners {
        if let (Some(rect), Some(banner)) = (rect, banner) {
            paint_banner(canvas, profile, rect, banner)?;
        }
    }
    Ok(())
}

fn paint_banner<C>(
    canvas: &mut C,
    profile: &LayoutProfile,
    rect: Rect,
    banner: &Banner,
) -> Result<(), RenderError>
where
    C: Canvas + ?Sized,
{
    canvas.fill_rect(rect, banner.fill)?;
    canvas.draw_text(
        &banner.text,
        &FontSpec::bold(&profile.font_family, banner.font_size_px),
        TextAnchor {
            x: rect.center_x(),
            y: rect.center_y(),
            align: HAlign::Center,
            baseline: VAlign::Middle,
        },
        &TextStyle::fill(banner.text_color),
    )
}

/// Plans and paints onto `canvas`, using the canvas itself to measure text.
pub fn compose<C>(
    canvas: &mut C,
    profile: &LayoutProfile,
    background: &Background,
    headline: &str,
    photo: Option<&DecodedImage>,
    date: NaiveDate,
) -> Result<CardLayout, RenderError>
where
    C: Canvas,
{
    let layout = plan(profile, headline, photo, date, &*canvas)?;
    paint(canvas, profile, background, photo, &layout)?;
    Ok(layout)
}

/// Renders a card onto a fresh surface of the profile's size.
pub fn render_card(
    profile: &LayoutProfile,
    background: &Background,
    headline: &str,
    photo: Option<&DecodedImage>,
    date: CardDate,
) -> Result<(RasterSurface, CardLayout), RenderError> {
    profile.validate()?;
    let mut canvas = CairoCanvas::new(profile.width, profile.height)?;
    let layout = compose(
        &mut canvas,
        profile,
        background,
        headline.trim(),
        photo,
        date.resolve(),
    )?;
    Ok((canvas.finish(), layout))
}

/// Caller-owned inputs for the next render.
#[derive(Debug, Clone)]
pub struct RenderState {
    profile: LayoutProfile,
    photo: Option<DecodedImage>,
}

impl RenderState {
    pub fn new(profile: LayoutProfile) -> Self {
        Self {
            profile,
            photo: None,
        }
    }

    pub fn profile(&self) -> &LayoutProfile {
        &self.profile
    }

    pub fn photo(&self) -> Option<&DecodedImage> {
        self.photo.as_ref()
    }

    pub fn select_profile(&mut self, profile: LayoutProfile) {
        self.profile = profile;
    }

    /// Replaces the current photo.
    pub fn set_photo(&mut self, photo: DecodedImage) -> Result<(), RenderError> {
        if photo.width() == 0 || photo.height() == 0 {
            return Err(RenderError::InvalidSource {
                width: photo.width(),
                height: photo.height(),
            });
        }
        self.photo = Some(photo);
        Ok(())
    }

    pub fn clear_photo(&mut self) {
        self.photo = None;
    }
}

/// Identifies one render request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

impl Ticket {
    pub fn get(self) -> u64 {
        self.0
    }
}

/// Monotonic render counter; only the newest ticket is current.
#[derive(Debug, Clone, Default)]
pub struct Generation(Arc<AtomicU64>);

impl Generation {
    pub fn advance(&self) -> Ticket {
        Ticket(self.0.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.0.load(Ordering::SeqCst) == ticket.0
    }
}

#[derive(Debug)]
pub struct RenderedCard {
    #[debug(skip)]
    pub surface: RasterSurface,
    pub layout: CardLayout,
    pub ticket: Ticket,
    pub used_fallback: bool,
}

#[derive(Debug)]
pub enum RenderOutcome {
    Rendered(RenderedCard),
    /// A newer render started while this one waited on its background.
    Superseded(Ticket),
}

/// Drives the two-phase render: resolve the background, then compose.
pub struct Compositor<S> {
    source: S,
    generation: Generation,
    fetch_timeout: Duration,
}

impl<S: BackgroundSource> Compositor<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            generation: Generation::default(),
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// The profile's template, or the flat fallback if it cannot be had.
    pub async fn resolve(&self, profile: &LayoutProfile) -> Background {
        let Some(background) = &profile.background else {
            return Background::Fallback;
        };
        match resolve_background(&self.source, background, self.fetch_timeout).await {
            Ok(image) => Background::Template(image),
            Err(err) => {
                tracing::warn!(
                    profile = %profile.name,
                    error = ?err,
                    "background unavailable, using solid fallback"
                );
                Background::Fallback
            }
        }
    }

    pub async fn render(
        &self,
        state: &RenderState,
        headline: &str,
        date: CardDate,
    ) -> Result<RenderOutcome, RenderError> {
        let ticket = self.generation.advance();
        let profile = state.profile();
        transition(ticket, RenderPhase::Idle, RenderPhase::BackgroundResolving);

        let background = self.resolve(profile).await;
        if !self.generation.is_current(ticket) {
            tracing::debug!(ticket = ticket.0, "render superseded, dropping background");
            return Ok(RenderOutcome::Superseded(ticket));
        }

        transition(ticket, RenderPhase::BackgroundResolving, RenderPhase::Composing);
        let used_fallback = matches!(background, Background::Fallback);
        match render_card(profile, &background, headline, state.photo(), date) {
            Ok((surface, layout)) => {
                transition(ticket, RenderPhase::Composing, RenderPhase::Rendered);
                Ok(RenderOutcome::Rendered(RenderedCard {
                    surface,
                    layout,
                    ticket,
                    used_fallback,
                }))
            }
            Err(err) => {
                transition(ticket, RenderPhase::Composing, RenderPhase::Failed);
                Err(err)
            }
        }
    }
}

fn transition(ticket: Ticket, from: RenderPhase, to: RenderPhase) {
    tracing::debug!(ticket = ticket.0, ?from, ?to, "render phase");
}
