//! The stock card variants.
//!
//! `classic` and `photo` are authored at 920x1000; the portrait variants are
//! derived from them by scaling.

use url::Url;

use super::{Banner, DateStyle, FallbackStyle, LayoutProfile};
use crate::asset::BackgroundRef;
use crate::fit::{FitPolicy, FitTier, IterativeFit, LadderStep, SizeLadder, TieredFit};
use crate::geometry::{Color, Rect};
use crate::measure::DEFAULT_FONT_FAMILY;

pub const TEMPLATE_URL: &str =
    "https://raw.githubusercontent.com/CDH-Devs/-News-Template/main/template.png";

pub const PORTRAIT_WIDTH: i32 = 1080;
pub const PORTRAIT_HEIGHT: i32 = 1350;

pub fn all() -> Vec<LayoutProfile> {
    vec![classic(), instagram(), photo(), instagram_photo()]
}

/// Headline-only card.
pub fn classic() -> LayoutProfile {
    LayoutProfile {
        name: "classic".to_string(),
        width: 920,
        height: 1000,
        font_family: DEFAULT_FONT_FAMILY.to_string(),
        date: date_style(),
        image_box: None,
        headline_box: Rect::new(20, 420, 880, 400),
        headline_color: Color::WHITE,
        headline_stroke: None,
        allow_overlap: false,
        fit_policy: FitPolicy::Iterative(IterativeFit {
            ladder: SizeLadder {
                default_px: 56,
                steps: [(30, 52), (40, 48), (50, 44), (60, 40), (80, 36), (100, 32)]
                    .into_iter()
                    .map(|(longer_than, size_px)| LadderStep { longer_than, size_px })
                    .collect(),
            },
            floor_px: 24,
            step_px: 2,
        }),
        background: template_background(),
        fallback: fallback_style(),
    }
}

pub fn instagram() -> LayoutProfile {
    classic().scaled("instagram", PORTRAIT_WIDTH, PORTRAIT_HEIGHT)
}

/// Card with a cover-fitted photo above a shorter headline.
pub fn photo() -> LayoutProfile {
    LayoutProfile {
        name: "photo".to_string(),
        image_box: Some(Rect::new(40, 275, 840, 400)),
        headline_box: Rect::new(20, 690, 880, 200),
        fit_policy: FitPolicy::Tiered(TieredFit {
            tiers: [(0, 48, 2), (50, 42, 3), (90, 36, 3), (130, 30, 4)]
                .into_iter()
                .map(|(longer_than, size_px, max_lines)| FitTier {
                    longer_than,
                    size_px,
                    max_lines,
                })
                .collect(),
        }),
        ..classic()
    }
}

pub fn instagram_photo() -> LayoutProfile {
    photo().scaled("instagram-photo", PORTRAIT_WIDTH, PORTRAIT_HEIGHT)
}

fn date_style() -> DateStyle {
    DateStyle {
        rect: Rect::new(52, 200, 220, 60),
        font_size_px: 32,
        padding_px: 10,
        fill: Color::WHITE,
        text_color: Color::rgb(0x33, 0x33, 0x33),
    }
}

fn template_background() -> Option<BackgroundRef> {
    Url::parse(TEMPLATE_URL).ok().map(BackgroundRef::Url)
}

fn fallback_style() -> FallbackStyle {
    FallbackStyle {
        background: Color::rgb(0x8b, 0x00, 0x00),
        header: Some(Banner {
            height: 111,
            fill: Color::rgb(0xcc, 0x00, 0x00),
            text: "CDH NEWS ALERT".to_string(),
            text_color: Color::WHITE,
            font_size_px: 51,
        }),
        footer: Some(Banner {
            height: 100,
            fill: Color::rgb(0xff, 0xd7, 0x00),
            text: "CDH NEWS".to_string(),
            text_color: Color::BLACK,
            font_size_px: 43,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_unique() {
        let names: Vec<String> = all().into_iter().map(|p| p.name).collect();
        assert_eq!(names, ["classic", "instagram", "photo", "instagram-photo"]);
    }

    #[test]
    fn only_photo_variants_have_image_boxes() {
        assert!(classic().image_box.is_none());
        assert!(instagram().image_box.is_none());
        assert_eq!(photo().image_box, Some(Rect::new(40, 275, 840, 400)));
        assert_eq!(instagram_photo().image_box, Some(Rect::new(47, 371, 986, 540)));
    }

    #[test]
    fn stock_profiles_use_the_remote_template() {
        for profile in all() {
            assert!(matches!(profile.background, Some(BackgroundRef::Url(_))));
        }
    }
}
