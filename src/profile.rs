//! Layout profiles: the geometry and typography of one card variant.

pub mod builtin;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::asset::BackgroundRef;
use crate::error::ProfileError;
use crate::fit::FitPolicy;
use crate::geometry::{scale_px, Color, Rect};
use crate::measure::{FontSpec, DEFAULT_FONT_FAMILY};

/// Largest canvas side cairo can allocate an image surface for.
pub const MAX_CANVAS_PX: i32 = 32_767;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, JsonSchema)]
pub struct LayoutProfile {
    pub name: String,
    pub width: i32,
    pub height: i32,
    #[serde(default = "default_font_family")]
    pub font_family: String,
    pub date: DateStyle,
    /// Box the photo is cover-fitted and clipped to. Profiles without one
    /// ignore any photo.
    #[serde(default)]
    pub image_box: Option<Rect>,
    /// Headline lines are centred on this box and start at its top; its
    /// width and height bound the fitter.
    pub headline_box: Rect,
    pub headline_color: Color,
    #[serde(default)]
    pub headline_stroke: Option<Stroke>,
    /// The headline is drawn over the photo, so overlap must be opted into.
    #[serde(default)]
    pub allow_overlap: bool,
    pub fit_policy: FitPolicy,
    #[serde(default)]
    pub background: Option<BackgroundRef>,
    pub fallback: FallbackStyle,
}

fn default_font_family() -> String {
    DEFAULT_FONT_FAMILY.to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
pub struct DateStyle {
    pub rect: Rect,
    pub font_size_px: u32,
    /// Gap between the right edge of the box and the right-aligned date.
    pub padding_px: i32,
    pub fill: Color,
    pub text_color: Color,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, JsonSchema)]
pub struct Stroke {
    pub color: Color,
    pub width: f64,
}

/// Flat background drawn when the remote template is unavailable.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
pub struct FallbackStyle {
    pub background: Color,
    #[serde(default)]
    pub header: Option<Banner>,
    #[serde(default)]
    pub footer: Option<Banner>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
pub struct Banner {
    pub height: i32,
    pub fill: Color,
    pub text: String,
    pub text_color: Color,
    pub font_size_px: u32,
}

impl LayoutProfile {
    pub fn date_font(&self) -> FontSpec {
        FontSpec::bold(&self.font_family, self.date.font_size_px)
    }

    pub fn header_rect(&self) -> Option<Rect> {
        self.fallback
            .header
            .as_ref()
            .map(|banner| Rect::new(0, 0, self.width, banner.height))
    }

    pub fn footer_rect(&self) -> Option<Rect> {
        self.fallback
            .footer
            .as_ref()
            .map(|banner| {
                Rect::new(0, self.height.saturating_sub(banner.height), self.width, banner.height)
            })
    }

    pub fn validate(&self) -> Result<(), ProfileError> {
        let profile = || self.name.clone();
        let side = 1..=MAX_CANVAS_PX;
        if !side.contains(&self.width) || !side.contains(&self.height) {
            return Err(ProfileError::CanvasSize {
                profile: profile(),
                width: self.width,
                height: self.height,
            });
        }

        let mut regions = vec![("date", self.date.rect), ("headline", self.headline_box)];
        regions.extend(self.image_box.map(|rect| ("image", rect)));
        regions.extend(self.header_rect().map(|rect| ("header", rect)));
        regions.extend(self.footer_rect().map(|rect| ("footer", rect)));
        for (region, rect) in regions {
            if !rect.fits_within(self.width, self.height) {
                return Err(ProfileError::OutOfBounds {
                    profile: profile(),
                    region,
                });
            }
        }

        let typography = |reason: &str| ProfileError::Typography {
            profile: profile(),
            reason: reason.to_string(),
        };
        if let Some(image_box) = self.image_box {
            if image_box.intersects(&self.headline_box) && !self.allow_overlap {
                return Err(typography(
                    "headline box overlaps the image box; set allow_overlap to keep it",
                ));
            }
        }
        if self.date.font_size_px == 0 {
            return Err(typography("date font size must be positive"));
        }
        let banners = [&self.fallback.header, &self.fallback.footer];
        if banners.into_iter().flatten().any(|b| b.font_size_px == 0) {
            return Err(typography("banner font size must be positive"));
        }
        if self.font_sizes().any(|size| size > self.height.unsigned_abs()) {
            return Err(typography("font sizes must not exceed the canvas height"));
        }
        match &self.fit_policy {
            FitPolicy::Iterative(policy) => {
                if policy.floor_px == 0 {
                    return Err(typography("floor_px must be positive"));
                }
                if policy.step_px == 0 {
                    return Err(typography("step_px must be positive"));
                }
                if policy.ladder.sizes().any(|size| size < policy.floor_px) {
                    return Err(typography("every ladder size must be at least floor_px"));
                }
            }
            FitPolicy::Tiered(policy) => {
                if policy.tiers.is_empty() {
                    return Err(typography("tiered fit needs at least one tier"));
                }
                if policy.tiers.iter().any(|t| t.size_px == 0 || t.max_lines == 0) {
                    return Err(typography("tiers need a positive size and line cap"));
                }
            }
        }
        Ok(())
    }

    fn font_sizes(&self) -> impl Iterator<Item = u32> + '_ {
        let banners = [&self.fallback.header, &self.fallback.footer];
        let policy: Vec<u32> = match &self.fit_policy {
            FitPolicy::Iterative(policy) => policy.ladder.sizes().collect(),
            FitPolicy::Tiered(policy) => policy.tiers.iter().map(|t| t.size_px).collect(),
        };
        std::iter::once(self.date.font_size_px)
            .chain(banners.into_iter().flatten().map(|b| b.font_size_px))
            .chain(policy)
    }

    /// Rescales every coordinate and font size to a `width`x`height` canvas.
    ///
    /// Horizontal values and font sizes follow the horizontal scale, vertical
    /// values the vertical one. Character-count thresholds and shrink steps
    /// are not scaled.
    pub fn scaled(&self, name: impl Into<String>, width: i32, height: i32) -> Self {
        let sx = f64::from(width) / f64::from(self.width);
        let sy = f64::from(height) / f64::from(self.height);
        let font = |size: u32| (f64::from(size) * sx).round() as u32;
        let banner = |banner: &Option<Banner>| {
            banner.as_ref().map(|b| Banner {
                height: scale_px(b.height, sy),
                font_size_px: font(b.font_size_px),
                ..b.clone()
            })
        };

        Self {
            name: name.into(),
            width,
            height,
            font_family: self.font_family.clone(),
            date: DateStyle {
                rect: self.date.rect.scaled(sx, sy),
                font_size_px: font(self.date.font_size_px),
                padding_px: scale_px(self.date.padding_px, sx),
                ..self.date.clone()
            },
            image_box: self.image_box.map(|rect| rect.scaled(sx, sy)),
            headline_box: self.headline_box.scaled(sx, sy),
            headline_color: self.headline_color,
            headline_stroke: self.headline_stroke.as_ref().map(|stroke| Stroke {
                color: stroke.color,
                width: stroke.width * sx,
            }),
            allow_overlap: self.allow_overlap,
            fit_policy: self.fit_policy.scaled(sx),
            background: self.background.clone(),
            fallback: FallbackStyle {
                background: self.fallback.background,
                header: banner(&self.fallback.header),
                footer: banner(&self.fallback.footer),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fit::{FitTier, TieredFit};

    #[test]
    fn builtins_are_valid() {
        for profile in builtin::all() {
            assert_eq!(profile.validate(), Ok(()), "{}", profile.name);
        }
    }

    #[test]
    fn instagram_matches_scaled_classic_geometry() {
        let profile = builtin::instagram();
        assert_eq!((profile.width, profile.height), (1080, 1350));
        assert_eq!(profile.date.rect, Rect::new(61, 270, 258, 81));
        assert_eq!(profile.date.font_size_px, 38);
        assert_eq!(profile.headline_box.y, 567);
        assert_eq!(profile.headline_box.width, 1034);
        assert_eq!(profile.headline_box.center_x(), 540.0);
        assert_eq!(profile.headline_box.height, 540);
        assert_eq!(profile.header_rect(), Some(Rect::new(0, 0, 1080, 150)));
        assert_eq!(profile.footer_rect(), Some(Rect::new(0, 1215, 1080, 135)));

        let FitPolicy::Iterative(policy) = &profile.fit_policy else {
            panic!("instagram uses the iterative policy");
        };
        assert_eq!(policy.ladder.default_px, 66);
        assert_eq!(policy.floor_px, 28);
        assert_eq!(policy.step_px, 2);
        assert_eq!(policy.ladder.initial_size(70), 47);
    }

    #[test]
    fn out_of_bounds_box_is_rejected() {
        let mut profile = builtin::classic();
        profile.headline_box = Rect::new(50, 420, 880, 400);
        assert_eq!(
            profile.validate(),
            Err(ProfileError::OutOfBounds {
                profile: "classic".to_string(),
                region: "headline",
            })
        );
    }

    #[test]
    fn overlap_needs_opt_in() {
        let mut profile = builtin::photo();
        profile.headline_box.y -= 40;
        assert!(matches!(profile.validate(), Err(ProfileError::Typography { .. })));
        profile.allow_overlap = true;
        assert_eq!(profile.validate(), Ok(()));
    }

    #[test]
    fn oversized_geometry_is_rejected_without_overflow() {
        let mut profile = builtin::classic();
        profile.headline_box.x = i32::MAX - 5;
        assert!(matches!(profile.validate(), Err(ProfileError::OutOfBounds { .. })));

        let mut profile = builtin::classic();
        profile.width = 100_000;
        assert!(matches!(profile.validate(), Err(ProfileError::CanvasSize { .. })));

        let mut profile = builtin::classic();
        if let FitPolicy::Iterative(policy) = &mut profile.fit_policy {
            policy.ladder.default_px = 500_000_000;
        }
        assert!(matches!(profile.validate(), Err(ProfileError::Typography { .. })));
    }

    #[test]
    fn ladder_below_floor_is_rejected() {
        let mut profile = builtin::classic();
        if let FitPolicy::Iterative(policy) = &mut profile.fit_policy {
            policy.floor_px = 60;
        }
        assert!(matches!(profile.validate(), Err(ProfileError::Typography { .. })));
    }

    #[test]
    fn empty_tiers_are_rejected() {
        let mut profile = builtin::photo();
        profile.fit_policy = FitPolicy::Tiered(TieredFit { tiers: vec![] });
        assert!(profile.validate().is_err());
        profile.fit_policy = FitPolicy::Tiered(TieredFit {
            tiers: vec![FitTier { longer_than: 0, size_px: 40, max_lines: 0 }],
        });
        assert!(profile.validate().is_err());
    }

    #[test]
    fn profile_round_trips_through_json() {
        let profile = builtin::instagram_photo();
        let json = serde_json::to_string(&profile).unwrap();
        let back: LayoutProfile = serde_json::from_str(&json).unwrap();
        assert_eq!(back, profile);
    }
}
