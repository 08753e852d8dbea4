use crate::optimize::{CandidateArena, CandidateId};

/// Renderer instruction for one line.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BreakAssignment {
    /// One-based line number; 0 for the leading sentinel.
    pub line: usize,
    /// Unit index of the break that opened this line; 0 for the first line.
    pub start_unit_index: usize,
    /// Unit index the line breaks at.
    pub break_unit_index: usize,
    /// Adjustment applied to every interword glue on the line.
    pub spacing: f32,
    /// Total adjustment for the line (target width minus natural width).
    pub compression: f32,
    /// Interword glue sharing the adjustment.
    pub glue_count: usize,
    /// The line ends mid-word and renders an inserted hyphen.
    pub hyphenated: bool,
    /// Width of hanging punctuation at the line start.
    pub hanging_width: f32,
}

impl BreakAssignment {
    pub fn is_sentinel(&self) -> bool {
        self.line == 0
    }
}

/// Linearize the chain ending at `terminal` in render order.
///
/// Entry 0 is the "no break yet" sentinel; entries `1..=N` are the lines.
pub fn reify(arena: &CandidateArena, terminal: CandidateId) -> Vec<BreakAssignment> {
    let mut out: Vec<BreakAssignment> = Vec::with_capacity(arena.get(terminal).line_number + 1);
    for (_, candidate) in arena.chain(terminal) {
        let Some(previous) = candidate.previous else {
            out.push(BreakAssignment::default());
            break;
        };
        let spacing = if candidate.glue_count == 0 {
            0.0
        } else {
            candidate.compression / candidate.glue_count as f32
        };
        out.push(BreakAssignment {
            line: candidate.line_number,
            start_unit_index: arena.get(previous).index,
            break_unit_index: candidate.index,
            spacing,
            compression: candidate.compression,
            glue_count: candidate.glue_count,
            hyphenated: candidate.hyphenated,
            hanging_width: candidate.hanging_width,
        });
    }
    out.reverse();
    out
}

/// Whole-unit spacing for renderers that cannot place fractional spacing.
///
/// The first `first_count` glues get `first_spacing`; the remaining
/// `rest_count` get `rest_spacing`, one unit further from zero. The
/// spacings sum to the line's compression truncated toward zero.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpacingSplit {
    pub first_spacing: i32,
    pub first_count: usize,
    pub rest_spacing: i32,
    pub rest_count: usize,
}

impl SpacingSplit {
    pub fn new(compression: f32, glue_count: usize) -> Self {
        if glue_count == 0 || !compression.is_finite() {
            return Self::default();
        }
        let glues = glue_count as f32;
        let first_spacing = (compression / glues).trunc();
        let remainder = compression - first_spacing * glues;
        let rest_count = (remainder.trunc().abs() as usize).min(glue_count);
        let first_spacing = first_spacing as i32;
        let rest_spacing = if compression < 0.0 {
            first_spacing - 1
        } else {
            first_spacing + 1
        };
        Self {
            first_spacing,
            first_count: glue_count - rest_count,
            rest_spacing,
            rest_count,
        }
    }

    pub fn from_assignment(assignment: &BreakAssignment) -> Self {
        Self::new(assignment.compression, assignment.glue_count)
    }

    /// Spacing for the zero-based `ordinal`-th interword glue of the line.
    pub fn spacing_for(&self, ordinal: usize) -> i32 {
        if ordinal < self.first_count {
            self.first_spacing
        } else {
            self.rest_spacing
        }
    }

    /// Sum of all glue adjustments.
    pub fn total(&self) -> i32 {
        self.first_spacing * self.first_count as i32 + self.rest_spacing * self.rest_count as i32
    }
}
