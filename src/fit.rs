//! Headline fitting: picks a font size and line breaks so the headline block
//! stays inside its box.
//!
//! Both policies start from a cheap guess keyed on the headline's character
//! count. [`IterativeFit`] then shrinks in fixed pixel steps until the block
//! fits or a floor is reached; [`TieredFit`] only ever moves between its
//! configured tiers and caps the line count.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::measure::{FontSpec, TextMeasure};
use crate::profile::LayoutProfile;
use crate::wrap::wrap_lines;

pub const LINE_HEIGHT_FACTOR: f64 = 1.3;

/// Fixed vertical padding added to every headline block.
pub const BLOCK_PADDING_PX: u32 = 30;

pub fn line_height(font_size_px: u32) -> u32 {
    (f64::from(font_size_px) * LINE_HEIGHT_FACTOR).ceil() as u32
}

pub fn block_height(line_count: usize, font_size_px: u32) -> u32 {
    u32::try_from(line_count)
        .unwrap_or(u32::MAX)
        .saturating_mul(line_height(font_size_px))
        .saturating_add(BLOCK_PADDING_PX)
}

/// Result of a fitting pass. Each attempt builds a fresh value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WrappedText {
    pub lines: Vec<String>,
    pub font_size_px: u32,
    pub line_height_px: u32,
    /// Lines or characters were dropped to honour a line cap.
    pub truncated: bool,
}

impl WrappedText {
    pub fn block_height(&self) -> u32 {
        block_height(self.lines.len(), self.font_size_px)
    }
}

/// Headline longer than `longer_than` characters starts at `size_px`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
pub struct LadderStep {
    pub longer_than: usize,
    pub size_px: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
pub struct SizeLadder {
    /// Size for headlines no step applies to.
    pub default_px: u32,
    pub steps: Vec<LadderStep>,
}

impl SizeLadder {
    /// The step with the highest threshold below `char_count` wins.
    pub fn initial_size(&self, char_count: usize) -> u32 {
        self.steps
            .iter()
            .filter(|step| char_count > step.longer_than)
            .max_by_key(|step| step.longer_than)
            .map_or(self.default_px, |step| step.size_px)
    }

    pub fn sizes(&self) -> impl Iterator<Item = u32> + '_ {
        std::iter::once(self.default_px).chain(self.steps.iter().map(|s| s.size_px))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
pub struct IterativeFit {
    pub ladder: SizeLadder,
    /// Shrinking stops here even if the block still overflows.
    pub floor_px: u32,
    #[serde(default = "default_step_px")]
    pub step_px: u32,
}

fn default_step_px() -> u32 {
    2
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
pub struct FitTier {
    pub longer_than: usize,
    pub size_px: u32,
    pub max_lines: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
pub struct TieredFit {
    pub tiers: Vec<FitTier>,
}

impl TieredFit {
    fn ordered(&self) -> Vec<FitTier> {
        let mut tiers = self.tiers.clone();
        tiers.sort_by_key(|tier| tier.longer_than);
        tiers
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum FitPolicy {
    Iterative(IterativeFit),
    Tiered(TieredFit),
}

impl FitPolicy {
    /// Fits `text` into a box `max_width` wide and `max_height` tall.
    pub fn fit<M>(
        &self,
        text: &str,
        family: &str,
        max_width: f64,
        max_height: u32,
        measure: &M,
    ) -> WrappedText
    where
        M: TextMeasure + ?Sized,
    {
        let text = text.trim();
        let char_count = text.chars().count();
        match self {
            FitPolicy::Iterative(policy) => {
                let floor = policy.floor_px;
                let step = policy.step_px.max(1);
                let mut size = policy.ladder.initial_size(char_count);
                let mut breaks =
                    wrap_lines(text, &FontSpec::bold(family, size), max_width, measure);

                while block_height(breaks.lines.len(), size) > max_height && size > floor {
                    size = size.saturating_sub(step).max(floor);
                    tracing::trace!(size, lines = breaks.lines.len(), "shrinking headline");
                    breaks = wrap_lines(text, &FontSpec::bold(family, size), max_width, measure);
                }

                WrappedText {
                    lines: breaks.lines,
                    font_size_px: size,
                    line_height_px: line_height(size),
                    truncated: breaks.truncated,
                }
            }
            FitPolicy::Tiered(policy) => {
                let tiers = policy.ordered();
                let Some(mut index) = tiers
                    .iter()
                    .rposition(|tier| char_count > tier.longer_than)
                    .or(if tiers.is_empty() { None } else { Some(0) })
                else {
                    return WrappedText {
                        lines: Vec::new(),
                        font_size_px: 0,
                        line_height_px: 0,
                        truncated: char_count > 0,
                    };
                };

                let mut breaks = wrap_lines(
                    text,
                    &FontSpec::bold(family, tiers[index].size_px),
                    max_width,
                    measure,
                );
                while breaks.lines.len() > tiers[index].max_lines && index + 1 < tiers.len() {
                    index += 1;
                    breaks = wrap_lines(
                        text,
                        &FontSpec::bold(family, tiers[index].size_px),
                        max_width,
                        measure,
                    );
                }

                let tier = tiers[index];
                let overflow = breaks.lines.len() > tier.max_lines;
                breaks.lines.truncate(tier.max_lines);
                WrappedText {
                    lines: breaks.lines,
                    font_size_px: tier.size_px,
                    line_height_px: line_height(tier.size_px),
                    truncated: breaks.truncated || overflow,
                }
            }
        }
    }

    pub(crate) fn scaled(&self, sx: f64) -> Self {
        let px = |v: u32| (f64::from(v) * sx).round() as u32;
        match self {
            FitPolicy::Iterative(policy) => FitPolicy::Iterative(IterativeFit {
                ladder: SizeLadder {
                    default_px: px(policy.ladder.default_px),
                    steps: policy
                        .ladder
                        .steps
                        .iter()
                        .map(|step| LadderStep {
                            longer_than: step.longer_than,
                            size_px: px(step.size_px),
                        })
                        .collect(),
                },
                floor_px: px(policy.floor_px),
                step_px: policy.step_px,
            }),
            FitPolicy::Tiered(policy) => FitPolicy::Tiered(TieredFit {
                tiers: policy
                    .tiers
                    .iter()
                    .map(|tier| FitTier {
                        size_px: px(tier.size_px),
                        ..*tier
                    })
                    .collect(),
            }),
        }
    }
}

/// Fits a headline into `profile`'s headline box using its fit policy.
pub fn fit<M>(text: &str, profile: &LayoutProfile, measure: &M) -> WrappedText
where
    M: TextMeasure + ?Sized,
{
    profile.fit_policy.fit(
        text,
        &profile.font_family,
        f64::from(profile.headline_box.width),
        profile.headline_box.height.max(0) as u32,
        measure,
    )
}
