use crate::error::JustifyError;

/// Feature flags consolidating historical engine variants.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EngineFlags {
    /// Treat punctuation clusters as inelastic, breakable glue.
    ///
    /// When disabled, punctuation stays inside word boxes and hard hyphens
    /// become break opportunities instead.
    pub punctuation_as_glue: bool,
    /// Attach an integer [`SpacingSplit`](crate::SpacingSplit) to every
    /// justified line for renderers limited to whole spacing units.
    pub subpixel_spacing_split: bool,
    /// Let opening punctuation hang into the line indent.
    pub opening_punctuation_overhang: bool,
}

impl Default for EngineFlags {
    fn default() -> Self {
        Self {
            punctuation_as_glue: true,
            subpixel_spacing_split: false,
            opening_punctuation_overhang: false,
        }
    }
}

/// Tokenization policy for the segmenter.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SegmentConfig {
    /// Characters whose clusters behave as breakable, non-stretchable glue.
    pub glue_punctuation: String,
    /// Characters that may hang into the indent at the start of a word.
    pub opening_punctuation: String,
    /// Elements carrying this class are preserved but never segmented.
    pub ignore_class: String,
}

impl SegmentConfig {
    pub const DEFAULT_GLUE_PUNCTUATION: &'static str = "-,;:\"\u{201D}=./)]}?\u{2014}";
    pub const DEFAULT_OPENING_PUNCTUATION: &'static str = "\u{201C}\u{2018}\u{00AB}";
    pub const DEFAULT_IGNORE_CLASS: &'static str = "parfit-ignore";

    pub(crate) fn is_glue_char(&self, ch: char) -> bool {
        self.glue_punctuation.contains(ch)
    }

    pub(crate) fn is_opening_char(&self, ch: char) -> bool {
        self.opening_punctuation.contains(ch)
    }
}

impl Default for SegmentConfig {
    fn default() -> Self {
        Self {
            glue_punctuation: Self::DEFAULT_GLUE_PUNCTUATION.to_string(),
            opening_punctuation: Self::DEFAULT_OPENING_PUNCTUATION.to_string(),
            ignore_class: Self::DEFAULT_IGNORE_CLASS.to_string(),
        }
    }
}

/// Justification configuration.
///
/// Built once per paragraph-processing call and passed by reference through
/// segmentation, measurement and search. Lengths share the unit of the target
/// line widths.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct JustifyConfig {
    /// Maximum extra width per interword glue.
    pub stretch: f32,
    /// Maximum compression per interword glue (non-positive).
    pub shrink: f32,
    /// Outdent allowance subtracted from every target width.
    pub overhang: f32,
    /// Cost added for breaking at a hyphenation point.
    pub hyphen_penalty: f32,
    /// Fixed interword glue width; measured when `None`.
    pub space_width: Option<f32>,
    /// Fixed inserted-hyphen width; measured when `None`.
    pub hyphen_width: Option<f32>,
    /// Segmenter policy.
    pub segment: SegmentConfig,
    /// Engine variant flags.
    pub flags: EngineFlags,
}

impl Default for JustifyConfig {
    fn default() -> Self {
        Self {
            stretch: 15.0,
            shrink: -1.0,
            overhang: 0.0,
            hyphen_penalty: 1000.0,
            space_width: None,
            hyphen_width: None,
            segment: SegmentConfig::default(),
            flags: EngineFlags::default(),
        }
    }
}

impl JustifyConfig {
    /// Reject values that would invert the feasibility inequalities.
    pub fn validate(&self) -> Result<(), JustifyError> {
        if !self.stretch.is_finite() || self.stretch < 0.0 {
            return Err(JustifyError::config(
                "stretch",
                self.stretch,
                "must be finite and >= 0",
            ));
        }
        if !self.shrink.is_finite() || self.shrink > 0.0 {
            return Err(JustifyError::config(
                "shrink",
                self.shrink,
                "must be finite and <= 0",
            ));
        }
        if !self.overhang.is_finite() || self.overhang < 0.0 {
            return Err(JustifyError::config(
                "overhang",
                self.overhang,
                "must be finite and >= 0",
            ));
        }
        if !self.hyphen_penalty.is_finite() || self.hyphen_penalty < 0.0 {
            return Err(JustifyError::config(
                "hyphen_penalty",
                self.hyphen_penalty,
                "must be finite and >= 0",
            ));
        }
        if let Some(width) = self.space_width {
            if !width.is_finite() || width < 0.0 {
                return Err(JustifyError::config(
                    "space_width",
                    width,
                    "must be finite and >= 0",
                ));
            }
        }
        if let Some(width) = self.hyphen_width {
            if !width.is_finite() || width < 0.0 {
                return Err(JustifyError::config(
                    "hyphen_width",
                    width,
                    "must be finite and >= 0",
                ));
            }
        }
        Ok(())
    }

    /// Validate target widths and return them with the overhang removed.
    pub fn effective_line_widths(&self, widths: &[f32]) -> Result<Vec<f32>, JustifyError> {
        if widths.is_empty() {
            return Err(JustifyError::MissingLineWidths);
        }
        let mut out = Vec::with_capacity(widths.len());
        for (line, &width) in widths.iter().enumerate() {
            if !width.is_finite() || width <= 0.0 {
                return Err(JustifyError::InvalidLineWidth { line, width });
            }
            let effective = width - self.overhang;
            if effective <= 0.0 {
                return Err(JustifyError::config(
                    "overhang",
                    self.overhang,
                    "must be smaller than every target width",
                ));
            }
            out.push(effective);
        }
        Ok(out)
    }
}
