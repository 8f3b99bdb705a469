//! Line wrapping for headlines.

use crate::measure::{FontSpec, TextMeasure, ESTIMATED_CHAR_WIDTH};

/// Lines kept by either wrapping mode; anything past this is dropped.
pub const MAX_LINES: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LineBreaks {
    pub lines: Vec<String>,
    /// Content was dropped to respect [`MAX_LINES`].
    pub truncated: bool,
    /// The text was one unbroken token and got chopped by character count.
    pub hard_split: bool,
}

/// Wraps `text` into at most [`MAX_LINES`] lines no wider than `max_width`.
pub fn wrap<M>(text: &str, font: &FontSpec, max_width: f64, measure: &M) -> Vec<String>
where
    M: TextMeasure + ?Sized,
{
    wrap_lines(text, font, max_width, measure).lines
}

/// Like [`wrap`], but also reports whether anything was truncated.
pub fn wrap_lines<M>(text: &str, font: &FontSpec, max_width: f64, measure: &M) -> LineBreaks
where
    M: TextMeasure + ?Sized,
{
    let text = text.trim();
    if text.is_empty() {
        return LineBreaks::default();
    }

    if !text.contains(char::is_whitespace) && measure.measure(text, font) > max_width {
        return hard_split(text, font, max_width);
    }

    greedy(text, font, max_width, measure)
}

/// Characters per chunk in hard-split mode, never less than one.
pub fn hard_split_chunk_len(font: &FontSpec, max_width: f64) -> usize {
    let char_width = f64::from(font.size_px) * ESTIMATED_CHAR_WIDTH;
    if char_width <= 0.0 {
        return usize::MAX;
    }
    ((max_width / char_width).floor() as usize).max(1)
}

fn hard_split(text: &str, font: &FontSpec, max_width: f64) -> LineBreaks {
    let chunk_len = hard_split_chunk_len(font, max_width);
    let chars: Vec<char> = text.chars().collect();
    let total = chars.len().div_ceil(chunk_len);
    LineBreaks {
        lines: chars
            .chunks(chunk_len)
            .take(MAX_LINES)
            .map(|chunk| chunk.iter().collect())
            .collect(),
        truncated: total > MAX_LINES,
        hard_split: true,
    }
}

fn greedy<M>(text: &str, font: &FontSpec, max_width: f64, measure: &M) -> LineBreaks
where
    M: TextMeasure + ?Sized,
{
    let mut lines = Vec::new();
    let mut line = String::new();
    let mut truncated = false;

    for word in text.split_whitespace() {
        if line.is_empty() {
            line.push_str(word);
            continue;
        }
        let candidate = format!("{line} {word}");
        if measure.measure(&candidate, font) <= max_width {
            line = candidate;
        } else {
            lines.push(std::mem::replace(&mut line, word.to_string()));
            if lines.len() == MAX_LINES {
                truncated = true;
                line.clear();
                break;
            }
        }
    }
    if !line.is_empty() {
        lines.push(line);
    }

    LineBreaks {
        lines,
        truncated,
        hard_split: false,
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::measure::{EstimatedMeasure, DEFAULT_FONT_FAMILY};

    fn font(size: u32) -> FontSpec {
        FontSpec::bold(DEFAULT_FONT_FAMILY, size)
    }

    #[test]
    fn empty_and_blank_text_produce_no_lines() {
        assert!(wrap("", &font(32), 880.0, &EstimatedMeasure).is_empty());
        assert!(wrap("   \t ", &font(32), 880.0, &EstimatedMeasure).is_empty());
    }

    #[test]
    fn short_text_stays_on_one_line() {
        let lines = wrap("Budget approved", &font(56), 880.0, &EstimatedMeasure);
        assert_eq!(lines, vec!["Budget approved"]);
    }

    #[test]
    fn greedy_breaks_on_word_boundaries() {
        // 11.2px per char at 20px, room for 11 chars
        let lines = wrap("aaaa bbbb cccc dddd", &font(20), 11.2 * 11.0, &EstimatedMeasure);
        assert_eq!(lines, vec!["aaaa bbbb", "cccc dddd"]);
    }

    #[test]
    fn overlong_word_gets_its_own_line() {
        let lines = wrap(
            "a supercalifragilistic b",
            &font(20),
            11.2 * 10.0,
            &EstimatedMeasure,
        );
        assert_eq!(lines, vec!["a", "supercalifragilistic", "b"]);
    }

    #[test]
    fn greedy_truncates_after_eight_lines() {
        let text = (0..20).map(|i| format!("word{i:02}")).collect::<Vec<_>>().join(" ");
        let breaks = wrap_lines(&text, &font(20), 11.2 * 6.0, &EstimatedMeasure);
        assert_eq!(breaks.lines.len(), MAX_LINES);
        assert!(breaks.truncated);
        assert!(!breaks.hard_split);
        assert_eq!(breaks.lines[7], "word07");
    }

    #[test]
    fn exactly_eight_lines_is_not_truncated() {
        let text = (0..8).map(|i| format!("word{i:02}")).collect::<Vec<_>>().join(" ");
        let breaks = wrap_lines(&text, &font(20), 11.2 * 6.0, &EstimatedMeasure);
        assert_eq!(breaks.lines.len(), MAX_LINES);
        assert!(!breaks.truncated);
    }

    #[test]
    fn unbroken_token_is_hard_split() {
        let text = "A".repeat(100);
        let breaks = wrap_lines(&text, &font(32), 880.0, &EstimatedMeasure);
        // floor(880 / (32 * 0.56)) = 49 chars per chunk
        assert_eq!(hard_split_chunk_len(&font(32), 880.0), 49);
        assert_eq!(breaks.lines.len(), 100_usize.div_ceil(49));
        assert!(breaks.hard_split);
        assert!(!breaks.truncated);
        assert_eq!(breaks.lines[0].len(), 49);
        assert_eq!(breaks.lines[2].len(), 2);
    }

    #[test]
    fn hard_split_caps_at_eight_chunks() {
        let text = "x".repeat(1000);
        let breaks = wrap_lines(&text, &font(32), 880.0, &EstimatedMeasure);
        assert_eq!(breaks.lines.len(), MAX_LINES);
        assert!(breaks.truncated);
    }

    #[test]
    fn hard_split_respects_char_boundaries() {
        let text = "é".repeat(60);
        let lines = wrap(&text, &font(32), 880.0, &EstimatedMeasure);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].chars().count(), 49);
    }

    #[test]
    fn unbroken_token_that_fits_is_left_alone() {
        let lines = wrap("Breaking", &font(56), 880.0, &EstimatedMeasure);
        assert_eq!(lines, vec!["Breaking"]);
    }

    proptest! {
        #[test]
        fn prop_hard_split_chunks_fit(len in 1usize..400, size in 12u32..120) {
            let text = "W".repeat(len);
            let font = font(size);
            let breaks = wrap_lines(&text, &font, 880.0, &EstimatedMeasure);
            prop_assert!(breaks.lines.len() <= MAX_LINES);
            for line in &breaks.lines {
                prop_assert!(EstimatedMeasure.measure(line, &font) <= 880.0 + 1e-9);
            }
        }

        #[test]
        fn prop_greedy_keeps_words_whole(
            words in proptest::collection::vec("[a-z]{1,12}", 1..40),
            size in 16u32..64,
        ) {
            let text = words.join(" ");
            let breaks = wrap_lines(&text, &font(size), 880.0, &EstimatedMeasure);
            prop_assert!(breaks.lines.len() <= MAX_LINES);

            let emitted: Vec<&str> = breaks.lines.iter().flat_map(|l| l.split(' ')).collect();
            prop_assert_eq!(&words[..emitted.len()], &emitted[..]);
            prop_assert_eq!(breaks.truncated, emitted.len() < words.len());
        }
    }
}
