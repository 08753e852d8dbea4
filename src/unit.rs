use std::sync::Arc;

/// Resolved style passed to the width measurer.
#[derive(Clone, Debug, PartialEq)]
pub struct TextStyle {
    /// Chosen family.
    pub family: Arc<str>,
    /// Numeric weight.
    pub weight: u16,
    /// Italic flag.
    pub italic: bool,
    /// Size in the host's length unit.
    pub size_px: f32,
    /// Letter spacing in the host's length unit.
    pub letter_spacing: f32,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            family: Arc::from("serif"),
            weight: 400,
            italic: false,
            size_px: 16.0,
            letter_spacing: 0.0,
        }
    }
}

impl TextStyle {
    /// Derive the style for content nested inside `tag`.
    pub fn nested(&self, tag: &str) -> Self {
        let mut style = self.clone();
        match tag {
            "b" | "strong" => style.weight = style.weight.max(700),
            "i" | "em" | "cite" | "var" => style.italic = true,
            "code" | "kbd" | "samp" | "tt" => style.family = Arc::from("monospace"),
            "small" => style.size_px *= 0.83,
            _ => {}
        }
        style
    }
}

/// Inline markup node.
///
/// Text runs hold decoded text; elements keep their tag and attributes so the
/// structure around segmented runs survives.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Inline {
    /// Character data.
    Text(String),
    /// Nested element with its own children.
    Element {
        /// Lowercase local tag name.
        tag: String,
        /// Attribute pairs in source order.
        attributes: Vec<(String, String)>,
        /// Child nodes.
        children: Vec<Inline>,
    },
}

impl Inline {
    /// Shorthand for a text node.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Shorthand for an attribute-less element.
    pub fn element(tag: impl Into<String>, children: Vec<Inline>) -> Self {
        Self::Element {
            tag: tag.into(),
            attributes: Vec::new(),
            children,
        }
    }

    /// True when the element's `class` attribute lists `class`.
    pub fn has_class(&self, class: &str) -> bool {
        match self {
            Self::Text(_) => false,
            Self::Element { attributes, .. } => attributes
                .iter()
                .filter(|(key, _)| key == "class")
                .any(|(_, value)| value.split_whitespace().any(|c| c == class)),
        }
    }
}

/// Segmented token kind; decides which [`Unit`] variant a token becomes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TokenKind {
    /// Word fragment (box).
    Word,
    /// Opening punctuation that may hang into the line indent (box).
    Hanging,
    /// Interword space (elastic glue).
    Space,
    /// Punctuation cluster or hard-hyphen joint (inelastic glue).
    Punctuation,
    /// Hyphenation opportunity between syllables (penalty).
    Hyphen,
}

/// Segmented text token awaiting measurement.
#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    /// Token kind.
    pub kind: TokenKind,
    /// Source text. Empty for hyphenation points and hard-hyphen joints.
    pub text: String,
    /// Style the token is measured with.
    pub style: TextStyle,
}

impl Token {
    pub(crate) fn new(kind: TokenKind, text: impl Into<String>, style: &TextStyle) -> Self {
        Self {
            kind,
            text: text.into(),
            style: style.clone(),
        }
    }
}

/// Atomic layout unit consumed by the break optimizer.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Unit {
    /// Unbreakable, non-elastic span of text.
    Box {
        /// Fixed width.
        width: f32,
        /// Opening punctuation excluded from the width when it starts a line
        /// and overhang is enabled.
        hanging: bool,
    },
    /// Elastic separator.
    Glue {
        /// Natural width (may be zero).
        width: f32,
        /// Maximum extra width.
        stretch: f32,
        /// Maximum compression, as a non-positive number.
        shrink: f32,
        /// Interword glue is elastic and counts toward spacing distribution.
        interword: bool,
    },
    /// Optional break point inside a word.
    Penalty {
        /// Cost added when the break is taken.
        cost: f32,
        /// Width of the inserted hyphen when the break is taken.
        width: f32,
    },
}

impl Unit {
    /// Zero-width inelastic glue appended to force a final break.
    pub const PARAGRAPH_END: Unit = Unit::Glue {
        width: 0.0,
        stretch: 0.0,
        shrink: 0.0,
        interword: false,
    };

    /// Plain box.
    pub const fn boxed(width: f32) -> Self {
        Self::Box {
            width,
            hanging: false,
        }
    }

    /// Elastic interword glue.
    pub const fn space(width: f32, stretch: f32, shrink: f32) -> Self {
        Self::Glue {
            width,
            stretch,
            shrink,
            interword: true,
        }
    }

    /// Inelastic glue (punctuation or hard-hyphen joint).
    pub const fn rigid(width: f32) -> Self {
        Self::Glue {
            width,
            stretch: 0.0,
            shrink: 0.0,
            interword: false,
        }
    }

    /// Hyphenation point.
    pub const fn penalty(cost: f32, width: f32) -> Self {
        Self::Penalty { cost, width }
    }

    /// Natural width. Penalties report the hyphen width they add when taken.
    pub fn width(&self) -> f32 {
        match *self {
            Self::Box { width, .. } | Self::Glue { width, .. } | Self::Penalty { width, .. } => {
                width
            }
        }
    }

    pub fn is_box(&self) -> bool {
        matches!(self, Self::Box { .. })
    }

    pub fn is_glue(&self) -> bool {
        matches!(self, Self::Glue { .. })
    }

    pub fn is_penalty(&self) -> bool {
        matches!(self, Self::Penalty { .. })
    }

    pub fn is_interword(&self) -> bool {
        matches!(
            self,
            Self::Glue {
                interword: true,
                ..
            }
        )
    }

    pub fn is_hanging(&self) -> bool {
        matches!(self, Self::Box { hanging: true, .. })
    }

    /// Glue and penalties are break candidates; boxes never are.
    pub fn is_break_point(&self) -> bool {
        !self.is_box()
    }

    pub fn stretch(&self) -> f32 {
        match *self {
            Self::Glue { stretch, .. } => stretch,
            _ => 0.0,
        }
    }

    pub fn shrink(&self) -> f32 {
        match *self {
            Self::Glue { shrink, .. } => shrink,
            _ => 0.0,
        }
    }

    /// Cost of breaking here; zero for glue.
    pub fn break_cost(&self) -> f32 {
        match *self {
            Self::Penalty { cost, .. } => cost,
            _ => 0.0,
        }
    }
}
