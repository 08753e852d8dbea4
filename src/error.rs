use core::fmt;

/// Line-breaking error.
#[derive(Clone, Debug, PartialEq)]
pub enum JustifyError {
    /// No break chain satisfies the elasticity bounds for the given widths.
    InfeasibleLayout {
        /// Units in the paragraph, including the synthetic end glue.
        units: usize,
        /// Deepest line number any feasible candidate reached.
        lines_tried: usize,
    },
    /// A configuration value would invert the feasibility inequalities.
    InvalidConfiguration {
        field: &'static str,
        value: f32,
        reason: &'static str,
    },
    /// A target line width is not a positive finite number.
    InvalidLineWidth { line: usize, width: f32 },
    /// A non-empty paragraph was given no target widths.
    MissingLineWidths,
    /// A measured unit width is negative or non-finite, or a raw width is missing.
    InvalidUnitWidth { index: usize, width: f32 },
    /// Inline markup could not be parsed.
    Markup { offset: usize, message: Box<str> },
    /// Batch processing was cancelled between paragraphs.
    Cancelled,
}

impl JustifyError {
    pub(crate) fn config(field: &'static str, value: f32, reason: &'static str) -> Self {
        Self::InvalidConfiguration {
            field,
            value,
            reason,
        }
    }

    /// True for errors that mean "render this paragraph unjustified".
    pub fn is_infeasible(&self) -> bool {
        matches!(self, Self::InfeasibleLayout { .. })
    }
}

impl fmt::Display for JustifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InfeasibleLayout { units, lines_tried } => write!(
                f,
                "no justified layout possible (units={} lines_tried={})",
                units, lines_tried
            ),
            Self::InvalidConfiguration {
                field,
                value,
                reason,
            } => write!(f, "invalid configuration: {}={} ({})", field, value, reason),
            Self::InvalidLineWidth { line, width } => {
                write!(f, "invalid target width for line {}: {}", line, width)
            }
            Self::MissingLineWidths => write!(f, "no target line widths supplied"),
            Self::InvalidUnitWidth { index, width } => {
                write!(f, "invalid width for unit {}: {}", index, width)
            }
            Self::Markup { offset, message } => {
                write!(f, "markup error at byte {}: {}", offset, message)
            }
            Self::Cancelled => write!(f, "justification cancelled"),
        }
    }
}

impl std::error::Error for JustifyError {}
