use crate::config::{EngineFlags, JustifyConfig};
use crate::error::JustifyError;
use crate::unit::{TextStyle, Token, TokenKind, Unit};

/// Host text measurement hook.
///
/// Widths must share the length unit of the target line widths.
pub trait WidthMeasurer: Send + Sync {
    /// Measure rendered text width for the provided style.
    fn measure_text(&self, text: &str, style: &TextStyle) -> f32;
}

impl<F> WidthMeasurer for F
where
    F: Fn(&str, &TextStyle) -> f32 + Send + Sync,
{
    fn measure_text(&self, text: &str, style: &TextStyle) -> f32 {
        self(text, style)
    }
}

/// Per-glyph em-width model for hosts without font metrics.
#[derive(Clone, Copy, Debug, Default)]
pub struct HeuristicMeasurer;

impl WidthMeasurer for HeuristicMeasurer {
    fn measure_text(&self, text: &str, style: &TextStyle) -> f32 {
        heuristic_measure_text(text, style)
    }
}

/// Every character advances by the same amount; style is ignored.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MonospaceMeasurer {
    pub advance: f32,
}

impl Default for MonospaceMeasurer {
    fn default() -> Self {
        Self { advance: 1.0 }
    }
}

impl WidthMeasurer for MonospaceMeasurer {
    fn measure_text(&self, text: &str, _style: &TextStyle) -> f32 {
        text.chars().count() as f32 * self.advance
    }
}

/// Measure every token and attach elasticity and cost.
///
/// Spaces use `config.space_width` and hyphenation points use
/// `config.hyphen_width` when set; otherwise `" "` and `"-"` are measured in
/// the token's style.
pub fn measure_units(
    tokens: &[Token],
    measurer: &dyn WidthMeasurer,
    config: &JustifyConfig,
) -> Result<Vec<Unit>, JustifyError> {
    let raw: Vec<f32> = tokens
        .iter()
        .map(|token| match token.kind {
            TokenKind::Word | TokenKind::Hanging | TokenKind::Punctuation => {
                if token.text.is_empty() {
                    0.0
                } else {
                    measurer.measure_text(&token.text, &token.style)
                }
            }
            TokenKind::Space => config
                .space_width
                .unwrap_or_else(|| measurer.measure_text(" ", &token.style)),
            TokenKind::Hyphen => config
                .hyphen_width
                .unwrap_or_else(|| measurer.measure_text("-", &token.style)),
        })
        .collect();
    attach_widths(tokens, &raw, config)
}

/// Build units from host-supplied raw widths, one per token.
///
/// For hyphenation points the raw width is the width of the inserted hyphen.
/// Configured fixed space and hyphen widths take precedence.
pub fn attach_widths(
    tokens: &[Token],
    raw_widths: &[f32],
    config: &JustifyConfig,
) -> Result<Vec<Unit>, JustifyError> {
    if tokens.len() != raw_widths.len() {
        return Err(JustifyError::InvalidUnitWidth {
            index: tokens.len().min(raw_widths.len()),
            width: f32::NAN,
        });
    }
    let mut units = Vec::with_capacity(tokens.len());
    for (index, (token, &raw)) in tokens.iter().zip(raw_widths).enumerate() {
        let width = match token.kind {
            TokenKind::Space => config.space_width.unwrap_or(raw),
            TokenKind::Hyphen => config.hyphen_width.unwrap_or(raw),
            _ => raw,
        };
        if !width.is_finite() || width < 0.0 {
            return Err(JustifyError::InvalidUnitWidth { index, width });
        }
        units.push(match token.kind {
            TokenKind::Word => Unit::boxed(width),
            TokenKind::Hanging => Unit::Box {
                width,
                hanging: true,
            },
            TokenKind::Space => Unit::space(width, config.stretch, config.shrink),
            TokenKind::Punctuation => Unit::rigid(width),
            TokenKind::Hyphen => Unit::penalty(config.hyphen_penalty, width),
        });
    }
    Ok(units)
}

/// Width and elasticity of one candidate line.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LineMeasure {
    /// Natural width of the visible content.
    pub width: f32,
    /// Summed stretch of interior interword glue.
    pub stretch: f32,
    /// Summed shrink of interior interword glue (non-positive).
    pub shrink: f32,
    /// Interior interword glue count.
    pub glue_count: usize,
    /// Visible boxes on the line.
    pub box_count: usize,
    /// Leading hanging punctuation excluded from `width`.
    pub hanging_width: f32,
}

impl LineMeasure {
    /// Measure `units[start..end]` as a line closed by a break at `end`.
    ///
    /// `start` is the first unit after the opening break. Leading interword
    /// glue and penalties are skipped, and so is leading hanging punctuation
    /// when overhang is on. Interword glue after the last visible unit (a box
    /// or punctuation glue) is dropped; interword glue before it is interior.
    /// Punctuation glue, including a punctuation break at `end`, keeps its
    /// width but never stretches; a penalty at `end` adds its hyphen width.
    pub fn of(units: &[Unit], start: usize, end: usize, flags: &EngineFlags) -> Self {
        let end = end.min(units.len());
        let mut measure = Self::default();
        if start >= end {
            return measure;
        }

        let mut lo = start;
        while lo < end {
            match units[lo] {
                Unit::Box { hanging: true, width } if flags.opening_punctuation_overhang => {
                    measure.hanging_width += width;
                }
                Unit::Box { .. } => break,
                Unit::Glue {
                    interword: false, ..
                } => break,
                _ => {}
            }
            lo += 1;
        }
        // Everything up to the last visible unit renders, interword glue
        // included. A punctuation break at `end` makes the whole range visible.
        let closes_visible = matches!(
            units.get(end),
            Some(Unit::Glue {
                interword: false,
                ..
            })
        );
        let mut hi = end;
        if !closes_visible {
            while hi > lo && !is_visible(&units[hi - 1]) {
                hi -= 1;
            }
        }

        for unit in &units[lo..hi] {
            match *unit {
                Unit::Box { width, .. } => {
                    measure.width += width;
                    measure.box_count += 1;
                }
                Unit::Glue {
                    width,
                    stretch,
                    shrink,
                    interword,
                } => {
                    measure.width += width;
                    if interword {
                        measure.stretch += stretch;
                        measure.shrink += shrink;
                        measure.glue_count += 1;
                    }
                }
                Unit::Penalty { .. } => {}
            }
        }
        if measure.box_count == 0 {
            return measure;
        }
        match units.get(end) {
            Some(Unit::Penalty { width, .. }) => measure.width += width,
            Some(unit) if closes_visible => measure.width += unit.width(),
            _ => {}
        }
        measure
    }
}

fn is_visible(unit: &Unit) -> bool {
    matches!(
        unit,
        Unit::Box { .. }
            | Unit::Glue {
                interword: false,
                ..
            }
    )
}

fn heuristic_measure_text(text: &str, style: &TextStyle) -> f32 {
    let chars = text.chars().count();
    if chars == 0 {
        return 0.0;
    }
    let family = style.family.to_ascii_lowercase();
    let proportional = !(family.contains("mono") || family.contains("fixed"));
    let mut em_sum = 0.0f32;
    if proportional {
        for ch in text.chars() {
            em_sum += proportional_glyph_em_width(ch);
        }
    } else {
        for ch in text.chars() {
            em_sum += if ch == ' ' { 0.52 } else { 0.58 };
        }
    }

    let mut family_scale = if family.contains("sans") {
        0.99
    } else if family.contains("serif") {
        1.03
    } else {
        1.00
    };
    if style.weight >= 700 {
        family_scale += 0.03;
    }
    if style.italic {
        family_scale += 0.01;
    }

    let mut width = em_sum * style.size_px * family_scale;
    if chars > 1 {
        width += (chars as f32 - 1.0) * style.letter_spacing;
    }
    width
}

fn proportional_glyph_em_width(ch: char) -> f32 {
    match ch {
        ' ' | '\u{00A0}' => 0.32,
        'i' | 'l' | 'I' | '|' | '!' => 0.24,
        '.' | ',' | ':' | ';' | '\'' | '"' | '\u{2019}' => 0.23,
        '\u{201C}' | '\u{201D}' | '\u{2018}' => 0.30,
        '-' | '\u{2010}' | '\u{2011}' | '\u{2013}' => 0.34,
        '\u{2014}' => 0.92,
        '(' | ')' | '[' | ']' | '{' | '}' => 0.30,
        'f' | 't' | 'j' | 'r' => 0.34,
        'm' | 'w' | 'M' | 'W' | '@' | '%' | '&' | '#' => 0.74,
        c if c.is_ascii_digit() => 0.52,
        c if c.is_ascii_uppercase() => 0.64,
        c if c.is_ascii_lowercase() => 0.52,
        c if c.is_whitespace() => 0.32,
        c if c.is_ascii_punctuation() => 0.42,
        _ => 0.56,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(kinds: &[(TokenKind, &str)]) -> Vec<Token> {
        let style = TextStyle::default();
        kinds
            .iter()
            .map(|(kind, text)| Token::new(*kind, *text, &style))
            .collect()
    }

    #[test]
    fn attach_widths_maps_kinds_to_units() {
        let cfg = JustifyConfig {
            stretch: 5.0,
            shrink: -1.0,
            hyphen_penalty: 500.0,
            ..JustifyConfig::default()
        };
        let toks = tokens(&[
            (TokenKind::Word, "jus"),
            (TokenKind::Hyphen, ""),
            (TokenKind::Word, "tify"),
            (TokenKind::Punctuation, ","),
            (TokenKind::Space, " "),
        ]);
        let units = attach_widths(&toks, &[15.0, 3.0, 20.0, 2.0, 4.0], &cfg).unwrap();
        assert_eq!(
            units,
            vec![
                Unit::boxed(15.0),
                Unit::penalty(500.0, 3.0),
                Unit::boxed(20.0),
                Unit::rigid(2.0),
                Unit::space(4.0, 5.0, -1.0),
            ]
        );
    }

    #[test]
    fn attach_widths_rejects_bad_input() {
        let cfg = JustifyConfig::default();
        let toks = tokens(&[(TokenKind::Word, "a"), (TokenKind::Word, "b")]);
        assert_eq!(
            attach_widths(&toks, &[1.0, -2.0], &cfg),
            Err(JustifyError::InvalidUnitWidth {
                index: 1,
                width: -2.0
            })
        );
        assert!(matches!(
            attach_widths(&toks, &[1.0], &cfg),
            Err(JustifyError::InvalidUnitWidth { index: 1, .. })
        ));
    }

    #[test]
    fn fixed_space_width_overrides_measurement() {
        let cfg = JustifyConfig {
            space_width: Some(4.0),
            hyphen_width: Some(2.5),
            ..JustifyConfig::default()
        };
        let toks = tokens(&[
            (TokenKind::Word, "abc"),
            (TokenKind::Space, " "),
            (TokenKind::Hyphen, ""),
        ]);
        let units = measure_units(&toks, &MonospaceMeasurer { advance: 10.0 }, &cfg).unwrap();
        assert_eq!(units[0].width(), 30.0);
        assert_eq!(units[1].width(), 4.0);
        assert_eq!(units[2].width(), 2.5);
    }

    #[test]
    fn heuristic_measurer_scales_with_size_and_weight() {
        let base = TextStyle::default();
        let narrow = HeuristicMeasurer.measure_text("ill", &base);
        let wide = HeuristicMeasurer.measure_text("mmm", &base);
        assert!(wide > narrow);
        let bold = base.nested("strong");
        assert!(
            HeuristicMeasurer.measure_text("word", &bold)
                > HeuristicMeasurer.measure_text("word", &base)
        );
        let closure = |text: &str, _: &TextStyle| text.len() as f32;
        assert_eq!(closure.measure_text("four", &base), 4.0);
    }

    #[test]
    fn line_measure_trims_boundary_glue() {
        let units = [
            Unit::boxed(20.0),
            Unit::space(5.0, 5.0, -1.0),
            Unit::boxed(20.0),
            Unit::space(5.0, 5.0, -1.0),
            Unit::boxed(20.0),
        ];
        let flags = EngineFlags::default();
        let m = LineMeasure::of(&units, 0, 3, &flags);
        assert_eq!(m.width, 45.0);
        assert_eq!(m.stretch, 5.0);
        assert_eq!(m.shrink, -1.0);
        assert_eq!(m.glue_count, 1);
        assert_eq!(m.box_count, 2);

        let m = LineMeasure::of(&units, 3, 5, &flags);
        assert_eq!(m.width, 20.0);
        assert_eq!(m.glue_count, 0);
        assert_eq!(LineMeasure::of(&units, 1, 3, &flags).box_count, 1);
        assert_eq!(LineMeasure::of(&units, 3, 4, &flags).box_count, 0);
    }

    #[test]
    fn line_measure_counts_hyphen_and_trailing_punctuation() {
        let units = [
            Unit::boxed(10.0),
            Unit::penalty(100.0, 3.0),
            Unit::boxed(10.0),
            Unit::rigid(2.0),
            Unit::space(4.0, 5.0, -1.0),
            Unit::boxed(10.0),
        ];
        let flags = EngineFlags::default();
        // Break at the penalty: the inserted hyphen is part of the line.
        assert_eq!(LineMeasure::of(&units, 0, 1, &flags).width, 13.0);
        // Interior penalties contribute nothing; the comma break adds its width.
        assert_eq!(LineMeasure::of(&units, 0, 3, &flags).width, 22.0);
        // Break at the space after the comma keeps the comma width.
        let m = LineMeasure::of(&units, 0, 4, &flags);
        assert_eq!(m.width, 22.0);
        assert_eq!(m.glue_count, 0);
    }

    #[test]
    fn space_before_punctuation_counts_as_interior() {
        // "aaaa ,bbbb" and "aaaa — bbbb" in one-unit cells.
        let units = [
            Unit::boxed(4.0),
            Unit::space(1.0, 3.0, 0.0),
            Unit::rigid(1.0),
            Unit::space(1.0, 3.0, 0.0),
            Unit::boxed(4.0),
        ];
        let flags = EngineFlags::default();
        // Break at the punctuation: the space before it renders.
        let m = LineMeasure::of(&units, 0, 2, &flags);
        assert_eq!(m.width, 6.0);
        assert_eq!(m.glue_count, 1);
        assert_eq!(m.stretch, 3.0);
        // Break at the space after it: only that trailing space is dropped.
        let m = LineMeasure::of(&units, 0, 3, &flags);
        assert_eq!(m.width, 6.0);
        assert_eq!(m.glue_count, 1);
        // Break at the space before it: nothing visible follows the word.
        let m = LineMeasure::of(&units, 0, 1, &flags);
        assert_eq!(m.width, 4.0);
        assert_eq!(m.glue_count, 0);
    }

    #[test]
    fn leading_punctuation_glue_stays_visible() {
        let units = [
            Unit::boxed(10.0),
            Unit::space(4.0, 5.0, -1.0),
            Unit::rigid(6.0),
            Unit::boxed(10.0),
        ];
        let m = LineMeasure::of(&units, 2, 4, &EngineFlags::default());
        assert_eq!(m.width, 16.0);
        assert_eq!(m.box_count, 1);
    }

    #[test]
    fn hanging_punctuation_is_excluded_only_at_line_start() {
        let units = [
            Unit::Box {
                width: 3.0,
                hanging: true,
            },
            Unit::boxed(10.0),
            Unit::space(4.0, 5.0, -1.0),
            Unit::Box {
                width: 3.0,
                hanging: true,
            },
            Unit::boxed(10.0),
        ];
        let flags = EngineFlags {
            opening_punctuation_overhang: true,
            ..EngineFlags::default()
        };
        let m = LineMeasure::of(&units, 0, 5, &flags);
        assert_eq!(m.hanging_width, 3.0);
        assert_eq!(m.width, 27.0);
        let m = LineMeasure::of(&units, 2, 5, &flags);
        assert_eq!(m.hanging_width, 3.0);
        assert_eq!(m.width, 10.0);
        let plain = LineMeasure::of(&units, 0, 5, &EngineFlags::default());
        assert_eq!(plain.width, 30.0);
    }
}
