//! Paragraph pipeline: segment, measure, search, reify.
//!
//! [`Justifier`] runs the stages for one paragraph at a time. Infeasible
//! paragraphs surface as [`JustifyError::InfeasibleLayout`] from the
//! `justify_*` entry points; the `layout_*` entry points turn that error into
//! an explicit [`ParagraphLayout::Unjustified`] result instead.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::config::JustifyConfig;
use crate::error::JustifyError;
use crate::hyphenate::{Hyphenator, NoHyphenation};
use crate::measure::{attach_widths, measure_units, HeuristicMeasurer, WidthMeasurer};
use crate::optimize::{find_breaks, CandidateArena, CandidateId, SearchStats};
use crate::reify::{reify, BreakAssignment, SpacingSplit};
use crate::segment::{SegmentedInline, Segmenter};
use crate::unit::{Inline, TextStyle, Token, TokenKind, Unit};

/// Cancellation hook checked between paragraphs.
pub trait CancelToken {
    fn is_cancelled(&self) -> bool;
}

/// Never-cancel token for default call paths.
#[derive(Clone, Copy, Debug, Default)]
pub struct NeverCancel;

impl CancelToken for NeverCancel {
    fn is_cancelled(&self) -> bool {
        false
    }
}

impl CancelToken for AtomicBool {
    fn is_cancelled(&self) -> bool {
        self.load(Ordering::Relaxed)
    }
}

/// Line breaker bound to one configuration, hyphenator and measurer.
#[derive(Clone)]
pub struct Justifier {
    config: JustifyConfig,
    hyphenator: Arc<dyn Hyphenator>,
    measurer: Arc<dyn WidthMeasurer>,
}

impl core::fmt::Debug for Justifier {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Justifier")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Justifier {
    /// Validate `config` and build a justifier that does not hyphenate and
    /// measures with [`HeuristicMeasurer`].
    pub fn new(config: JustifyConfig) -> Result<Self, JustifyError> {
        config.validate()?;
        Ok(Self {
            config,
            hyphenator: Arc::new(NoHyphenation),
            measurer: Arc::new(HeuristicMeasurer),
        })
    }

    pub fn with_hyphenator(mut self, hyphenator: impl Hyphenator + 'static) -> Self {
        self.hyphenator = Arc::new(hyphenator);
        self
    }

    pub fn with_measurer(mut self, measurer: impl WidthMeasurer + 'static) -> Self {
        self.measurer = Arc::new(measurer);
        self
    }

    pub fn config(&self) -> &JustifyConfig {
        &self.config
    }

    pub fn segmenter(&self) -> Segmenter<'_> {
        Segmenter::new(&self.config, self.hyphenator.as_ref())
    }

    /// Justify a plain text paragraph.
    pub fn justify_text(
        &self,
        text: &str,
        line_widths: &[f32],
    ) -> Result<JustifiedParagraph, JustifyError> {
        let tokens = self.segmenter().segment_text(text, &TextStyle::default());
        self.justify_tokens(tokens, line_widths)
    }

    /// Justify a paragraph given as an inline markup tree.
    pub fn justify_inline(
        &self,
        nodes: &[Inline],
        line_widths: &[f32],
    ) -> Result<JustifiedParagraph, JustifyError> {
        let tree = self.segmenter().segment_tree(nodes, &TextStyle::default());
        self.justify_tokens(SegmentedInline::flatten(&tree), line_widths)
    }

    /// Parse an inline fragment and justify it.
    #[cfg(feature = "markup")]
    #[cfg_attr(docsrs, doc(cfg(feature = "markup")))]
    pub fn justify_markup(
        &self,
        fragment: &str,
        line_widths: &[f32],
    ) -> Result<JustifiedParagraph, JustifyError> {
        let nodes = crate::markup::parse_inline(fragment)?;
        self.justify_inline(&nodes, line_widths)
    }

    /// Justify segmented tokens, measuring them with the configured measurer.
    pub fn justify_tokens(
        &self,
        tokens: Vec<Token>,
        line_widths: &[f32],
    ) -> Result<JustifiedParagraph, JustifyError> {
        let tokens = trim_trailing_spaces(tokens);
        let units = measure_units(&tokens, self.measurer.as_ref(), &self.config)?;
        self.justify_units(tokens, units, line_widths)
    }

    /// Justify segmented tokens with widths measured by the host, one per
    /// token.
    pub fn justify_measured(
        &self,
        mut tokens: Vec<Token>,
        raw_widths: &[f32],
        line_widths: &[f32],
    ) -> Result<JustifiedParagraph, JustifyError> {
        let mut units = attach_widths(&tokens, raw_widths, &self.config)?;
        let keep = trimmed_len(&tokens);
        tokens.truncate(keep);
        units.truncate(keep);
        self.justify_units(tokens, units, line_widths)
    }

    /// Like [`Justifier::justify_text`], falling back to an unjustified
    /// layout when no break chain is feasible.
    pub fn layout_text(
        &self,
        text: &str,
        line_widths: &[f32],
    ) -> Result<ParagraphLayout, JustifyError> {
        let tokens = self.segmenter().segment_text(text, &TextStyle::default());
        self.layout_tokens(tokens, line_widths)
    }

    /// Like [`Justifier::justify_inline`] with the unjustified fallback.
    pub fn layout_inline(
        &self,
        nodes: &[Inline],
        line_widths: &[f32],
    ) -> Result<ParagraphLayout, JustifyError> {
        let tree = self.segmenter().segment_tree(nodes, &TextStyle::default());
        self.layout_tokens(SegmentedInline::flatten(&tree), line_widths)
    }

    /// Lay out one batch input.
    pub fn layout(&self, input: &ParagraphInput) -> Result<ParagraphLayout, JustifyError> {
        match &input.content {
            ParagraphContent::Text(text) => self.layout_text(text, &input.line_widths),
            ParagraphContent::Inline(nodes) => self.layout_inline(nodes, &input.line_widths),
        }
    }

    fn layout_tokens(
        &self,
        tokens: Vec<Token>,
        line_widths: &[f32],
    ) -> Result<ParagraphLayout, JustifyError> {
        let tokens = trim_trailing_spaces(tokens);
        let units = measure_units(&tokens, self.measurer.as_ref(), &self.config)?;
        if !units.iter().any(Unit::is_box) {
            return Ok(ParagraphLayout::Justified(JustifiedParagraph::empty(
                tokens, units,
            )));
        }
        let result = self
            .config
            .effective_line_widths(line_widths)
            .and_then(|widths| find_breaks(&units, &widths, &self.config.flags));
        match result {
            Ok(search) => Ok(ParagraphLayout::Justified(self.assemble(
                tokens,
                units,
                search.arena,
                search.terminal,
                search.stats,
            ))),
            Err(err) if err.is_infeasible() => {
                log::warn!(
                    "paragraph falls back to unjustified layout: {} (tokens={})",
                    err,
                    tokens.len()
                );
                Ok(ParagraphLayout::Unjustified(UnjustifiedParagraph {
                    tokens,
                    reason: err,
                }))
            }
            Err(err) => Err(err),
        }
    }

    fn justify_units(
        &self,
        tokens: Vec<Token>,
        units: Vec<Unit>,
        line_widths: &[f32],
    ) -> Result<JustifiedParagraph, JustifyError> {
        if !units.iter().any(Unit::is_box) {
            return Ok(JustifiedParagraph::empty(tokens, units));
        }
        let widths = self.config.effective_line_widths(line_widths)?;
        let search = find_breaks(&units, &widths, &self.config.flags)?;
        Ok(self.assemble(
            tokens,
            units,
            search.arena,
            search.terminal,
            search.stats,
        ))
    }

    fn assemble(
        &self,
        tokens: Vec<Token>,
        mut units: Vec<Unit>,
        arena: CandidateArena,
        terminal: CandidateId,
        stats: SearchStats,
    ) -> JustifiedParagraph {
        let assignments = reify(&arena, terminal);
        let cost = arena.get(terminal).cost;
        units.push(Unit::PARAGRAPH_END);
        log::debug!(
            "justified paragraph: tokens={} lines={} cost={:.1}",
            tokens.len(),
            assignments.len().saturating_sub(1),
            cost
        );
        JustifiedParagraph {
            tokens,
            units,
            assignments,
            stats,
            cost,
            overhang: self.config.overhang,
            spacing_split: self.config.flags.subpixel_spacing_split,
        }
    }
}

fn trimmed_len(tokens: &[Token]) -> usize {
    tokens
        .iter()
        .rposition(|t| t.kind != TokenKind::Space)
        .map_or(0, |idx| idx + 1)
}

fn trim_trailing_spaces(mut tokens: Vec<Token>) -> Vec<Token> {
    let keep = trimmed_len(&tokens);
    tokens.truncate(keep);
    tokens
}

/// A justified paragraph ready for rendering.
///
/// Units mirror tokens one to one, followed by the synthetic end glue the
/// final assignment breaks at.
#[derive(Clone, Debug)]
pub struct JustifiedParagraph {
    tokens: Vec<Token>,
    units: Vec<Unit>,
    assignments: Vec<BreakAssignment>,
    stats: SearchStats,
    cost: f32,
    overhang: f32,
    spacing_split: bool,
}

impl JustifiedParagraph {
    fn empty(tokens: Vec<Token>, mut units: Vec<Unit>) -> Self {
        units.push(Unit::PARAGRAPH_END);
        Self {
            tokens,
            units,
            assignments: vec![BreakAssignment::default()],
            stats: SearchStats::default(),
            cost: 0.0,
            overhang: 0.0,
            spacing_split: false,
        }
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    /// Assignments including the leading sentinel.
    pub fn assignments(&self) -> &[BreakAssignment] {
        &self.assignments
    }

    /// One assignment per line, without the sentinel.
    pub fn line_assignments(&self) -> &[BreakAssignment] {
        self.assignments.get(1..).unwrap_or(&[])
    }

    pub fn line_count(&self) -> usize {
        self.line_assignments().len()
    }

    /// Total cost of the chosen break chain.
    pub fn cost(&self) -> f32 {
        self.cost
    }

    pub fn stats(&self) -> SearchStats {
        self.stats
    }

    /// Line views in render order.
    pub fn lines(&self) -> Vec<JustifiedLine<'_>> {
        self.line_assignments()
            .iter()
            .map(|assignment| self.line_view(assignment))
            .collect()
    }

    fn line_view(&self, assignment: &BreakAssignment) -> JustifiedLine<'_> {
        let token_count = self.tokens.len();
        let mut start = if assignment.line <= 1 {
            0
        } else {
            assignment.start_unit_index + 1
        };
        let mut end = assignment.break_unit_index.min(token_count);
        // A punctuation break renders at the end of the line it closes.
        if end < token_count && matches!(self.units[end], Unit::Glue { interword: false, .. }) {
            end += 1;
        }
        start = start.min(end);
        while start < end && is_invisible(&self.tokens[start]) {
            start += 1;
        }
        while end > start && is_invisible(&self.tokens[end - 1]) {
            end -= 1;
        }
        JustifiedLine {
            number: assignment.line,
            tokens: &self.tokens[start..end],
            token_start: start,
            spacing: assignment.spacing,
            compression: assignment.compression,
            glue_count: assignment.glue_count,
            hyphenated: assignment.hyphenated,
            indent: self.overhang - assignment.hanging_width,
            split: self
                .spacing_split
                .then(|| SpacingSplit::from_assignment(assignment)),
        }
    }
}

fn is_invisible(token: &Token) -> bool {
    matches!(token.kind, TokenKind::Space | TokenKind::Hyphen)
}

/// Borrowed view of one justified line.
#[derive(Clone, Debug, PartialEq)]
pub struct JustifiedLine<'a> {
    /// One-based line number.
    pub number: usize,
    /// Visible tokens, boundary spaces trimmed.
    pub tokens: &'a [Token],
    /// Index of the first visible token in the paragraph.
    pub token_start: usize,
    /// Adjustment for each interword space.
    pub spacing: f32,
    /// Total adjustment across the line.
    pub compression: f32,
    /// Interword spaces sharing the adjustment.
    pub glue_count: usize,
    /// Render an inserted hyphen at the end.
    pub hyphenated: bool,
    /// Left offset: the overhang allowance minus hanging punctuation width.
    /// Negative when punctuation hangs past the allowance.
    pub indent: f32,
    /// Whole-unit spacing, when the paragraph was built with the sub-pixel
    /// split enabled.
    pub split: Option<SpacingSplit>,
}

impl JustifiedLine<'_> {
    /// Line text with natural single spaces and the inserted hyphen.
    pub fn text(&self) -> String {
        let mut out: String = self.tokens.iter().map(|t| t.text.as_str()).collect();
        if self.hyphenated {
            out.push('-');
        }
        out
    }
}

/// Paragraph rendered unbroken at natural spacing.
#[derive(Clone, Debug, PartialEq)]
pub struct UnjustifiedParagraph {
    tokens: Vec<Token>,
    reason: JustifyError,
}

impl UnjustifiedParagraph {
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Why justification was abandoned.
    pub fn reason(&self) -> &JustifyError {
        &self.reason
    }

    pub fn text(&self) -> String {
        let visible = self
            .tokens
            .iter()
            .position(|t| t.kind != TokenKind::Space)
            .unwrap_or(self.tokens.len());
        self.tokens[visible..].iter().map(|t| t.text.as_str()).collect()
    }
}

/// Result of the layout entry points.
#[derive(Clone, Debug)]
pub enum ParagraphLayout {
    Justified(JustifiedParagraph),
    /// Deliberate fallback for a paragraph with no feasible break chain.
    Unjustified(UnjustifiedParagraph),
}

impl ParagraphLayout {
    pub fn is_justified(&self) -> bool {
        matches!(self, Self::Justified(_))
    }

    pub fn justified(&self) -> Option<&JustifiedParagraph> {
        match self {
            Self::Justified(paragraph) => Some(paragraph),
            Self::Unjustified(_) => None,
        }
    }

    /// Rendered line count; an unjustified paragraph is one line.
    pub fn line_count(&self) -> usize {
        match self {
            Self::Justified(paragraph) => paragraph.line_count(),
            Self::Unjustified(_) => 1,
        }
    }
}

/// Paragraph content for batch processing.
#[derive(Clone, Debug, PartialEq)]
pub enum ParagraphContent {
    Text(String),
    Inline(Vec<Inline>),
}

/// One paragraph and its target widths.
#[derive(Clone, Debug, PartialEq)]
pub struct ParagraphInput {
    pub content: ParagraphContent,
    pub line_widths: Vec<f32>,
}

impl ParagraphInput {
    pub fn text(text: impl Into<String>, line_widths: Vec<f32>) -> Self {
        Self {
            content: ParagraphContent::Text(text.into()),
            line_widths,
        }
    }

    pub fn inline(nodes: Vec<Inline>, line_widths: Vec<f32>) -> Self {
        Self {
            content: ParagraphContent::Inline(nodes),
            line_widths,
        }
    }
}

/// Lay out paragraphs in order, checking `cancel` before each one.
///
/// Infeasible paragraphs degrade to [`ParagraphLayout::Unjustified`]; any
/// other error stops the batch.
pub fn justify_batch(
    justifier: &Justifier,
    inputs: &[ParagraphInput],
    cancel: &dyn CancelToken,
) -> Result<Vec<ParagraphLayout>, JustifyError> {
    let mut out = Vec::with_capacity(inputs.len());
    for (idx, input) in inputs.iter().enumerate() {
        if cancel.is_cancelled() {
            log::debug!("batch cancelled before paragraph {}", idx);
            return Err(JustifyError::Cancelled);
        }
        out.push(justifier.layout(input)?);
    }
    Ok(out)
}

/// Parallel [`justify_batch`]; output order matches `inputs`.
#[cfg(feature = "parallel")]
#[cfg_attr(docsrs, doc(cfg(feature = "parallel")))]
pub fn justify_batch_par(
    justifier: &Justifier,
    inputs: &[ParagraphInput],
    cancel: &(dyn CancelToken + Sync),
) -> Result<Vec<ParagraphLayout>, JustifyError> {
    use rayon::prelude::*;

    inputs
        .par_iter()
        .map(|input| {
            if cancel.is_cancelled() {
                return Err(JustifyError::Cancelled);
            }
            justifier.layout(input)
        })
        .collect()
}
