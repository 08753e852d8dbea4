//! Optimal paragraph line breaking.
//!
//! `parfit` reflows a paragraph into justified lines. Text is split into
//! boxes (word fragments), glue (elastic spaces) and penalties (hyphenation
//! points); a dynamic-programming search then picks the break chain with the
//! lowest combined cost of compression, mid-word breaks, and compression
//! variance between consecutive lines.
//!
//! The pipeline runs in four stages:
//!
//! 1. [`segment`] turns text (or an inline markup tree) into typed tokens.
//! 2. [`measure_units`] attaches widths and elasticity using a host
//!    [`WidthMeasurer`].
//! 3. [`find_breaks`] searches feasible breakpoints against a list of target
//!    line widths.
//! 4. [`reify`] linearizes the winning chain into per-line
//!    [`BreakAssignment`]s for a renderer.
//!
//! [`Justifier`] wires the stages together and provides the explicit
//! unjustified fallback for paragraphs that cannot be justified.

#![cfg_attr(
    not(test),
    deny(
        clippy::disallowed_methods,
        clippy::expect_used,
        clippy::unwrap_used,
        clippy::panic,
        clippy::panic_in_result_fn,
        clippy::todo,
        clippy::unimplemented
    )
)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod config;
mod error;
mod hyphenate;
#[cfg(feature = "markup")]
mod markup;
mod measure;
mod optimize;
mod paragraph;
mod reify;
mod segment;
mod unit;

pub use config::{EngineFlags, JustifyConfig, SegmentConfig};
pub use error::JustifyError;
#[cfg(feature = "hyphenation")]
pub use hyphenate::PatternHyphenator;
pub use hyphenate::{
    checked_syllables, EnglishHeuristicHyphenator, Hyphenator, NoHyphenation,
    SoftHyphenHyphenator,
};
#[cfg(feature = "markup")]
pub use markup::parse_inline;
pub use measure::{
    attach_widths, measure_units, HeuristicMeasurer, LineMeasure, MonospaceMeasurer,
    WidthMeasurer,
};
pub use optimize::{
    find_breaks, line_width_for, BreakCandidate, BreakSearch, CandidateArena, CandidateId,
    SearchStats,
};
#[cfg(feature = "parallel")]
pub use paragraph::justify_batch_par;
pub use paragraph::{
    justify_batch, CancelToken, JustifiedLine, JustifiedParagraph, Justifier, NeverCancel,
    ParagraphContent, ParagraphInput, ParagraphLayout, UnjustifiedParagraph,
};
pub use reify::{reify, BreakAssignment, SpacingSplit};
pub use segment::{segment, segment_tree, SegmentedInline, Segmenter};
pub use unit::{Inline, TextStyle, Token, TokenKind, Unit};
