//! Text segmentation into typed layout tokens.
//!
//! A token is a [`Unit`](crate::Unit) awaiting its width: words become boxes,
//! whitespace becomes elastic glue, punctuation clusters become inelastic
//! glue, and syllable boundaries become hyphenation penalties.

use crate::config::JustifyConfig;
use crate::hyphenate::{checked_syllables, Hyphenator};
use crate::unit::{Inline, TextStyle, Token, TokenKind};

/// Segmented inline tree mirroring the [`Inline`] input.
#[derive(Clone, Debug, PartialEq)]
pub enum SegmentedInline {
    /// Tokens produced from one text run.
    Tokens(Vec<Token>),
    /// Element with segmented children.
    Element {
        tag: String,
        attributes: Vec<(String, String)>,
        /// Style in effect for the element's content.
        style: TextStyle,
        children: Vec<SegmentedInline>,
    },
    /// Element carrying the ignore class, preserved verbatim.
    Opaque(Inline),
}

impl SegmentedInline {
    /// Ordered tokens of a segmented tree, skipping opaque elements.
    ///
    /// Whitespace meeting across an element boundary yields a single space.
    pub fn flatten(nodes: &[SegmentedInline]) -> Vec<Token> {
        let mut out = Vec::with_capacity(nodes.len() * 8);
        for node in nodes {
            node.append_tokens(&mut out);
        }
        out
    }

    fn append_tokens(&self, out: &mut Vec<Token>) {
        match self {
            Self::Tokens(tokens) => {
                for token in tokens {
                    let repeated_space = token.kind == TokenKind::Space
                        && out.last().is_some_and(|last| last.kind == TokenKind::Space);
                    if !repeated_space {
                        out.push(token.clone());
                    }
                }
            }
            Self::Element { children, .. } => {
                for child in children {
                    child.append_tokens(out);
                }
            }
            Self::Opaque(_) => {}
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum CharClass {
    Space,
    Glue,
    Word,
}

/// Splits text runs into tokens under one configuration and hyphenator.
#[derive(Clone, Copy)]
pub struct Segmenter<'a> {
    config: &'a JustifyConfig,
    hyphenator: &'a dyn Hyphenator,
}

impl<'a> Segmenter<'a> {
    pub fn new(config: &'a JustifyConfig, hyphenator: &'a dyn Hyphenator) -> Self {
        Self { config, hyphenator }
    }

    /// Segment a single text run.
    pub fn segment_text(&self, text: &str, style: &TextStyle) -> Vec<Token> {
        let mut out = Vec::with_capacity(text.len() / 3 + 1);
        self.segment_into(text, style, &mut out);
        out
    }

    /// Segment `text`, appending tokens to `out`.
    pub fn segment_into(&self, text: &str, style: &TextStyle, out: &mut Vec<Token>) {
        let mut run_start = 0usize;
        let mut run_class: Option<CharClass> = None;
        for (idx, ch) in text.char_indices() {
            let class = self.classify(ch);
            match run_class {
                Some(current) if current == class => {}
                Some(current) => {
                    self.emit_run(current, &text[run_start..idx], style, out);
                    run_start = idx;
                    run_class = Some(class);
                }
                None => {
                    run_start = idx;
                    run_class = Some(class);
                }
            }
        }
        if let Some(current) = run_class {
            self.emit_run(current, &text[run_start..], style, out);
        }
    }

    /// Segment every text run of an inline tree, keeping its structure.
    pub fn segment_tree(&self, nodes: &[Inline], style: &TextStyle) -> Vec<SegmentedInline> {
        nodes
            .iter()
            .map(|node| self.segment_node(node, style))
            .collect()
    }

    fn segment_node(&self, node: &Inline, style: &TextStyle) -> SegmentedInline {
        match node {
            Inline::Text(text) => SegmentedInline::Tokens(self.segment_text(text, style)),
            Inline::Element { .. } if node.has_class(&self.config.segment.ignore_class) => {
                SegmentedInline::Opaque(node.clone())
            }
            Inline::Element {
                tag,
                attributes,
                children,
            } => {
                let nested = style.nested(tag);
                let children = self.segment_tree(children, &nested);
                SegmentedInline::Element {
                    tag: tag.clone(),
                    attributes: attributes.clone(),
                    style: nested,
                    children,
                }
            }
        }
    }

    fn classify(&self, ch: char) -> CharClass {
        if is_breaking_whitespace(ch) {
            CharClass::Space
        } else if self.config.flags.punctuation_as_glue && self.config.segment.is_glue_char(ch) {
            CharClass::Glue
        } else {
            CharClass::Word
        }
    }

    fn emit_run(&self, class: CharClass, run: &str, style: &TextStyle, out: &mut Vec<Token>) {
        match class {
            CharClass::Space => {
                if out.last().is_some_and(|last| last.kind == TokenKind::Space) {
                    return;
                }
                out.push(Token::new(TokenKind::Space, " ", style));
            }
            CharClass::Glue => out.push(Token::new(TokenKind::Punctuation, run, style)),
            CharClass::Word => self.emit_word(run, style, out),
        }
    }

    fn emit_word(&self, word: &str, style: &TextStyle, out: &mut Vec<Token>) {
        let mut word = word;
        if self.config.flags.opening_punctuation_overhang {
            let split = word
                .char_indices()
                .find(|(_, ch)| !self.config.segment.is_opening_char(*ch))
                .map(|(idx, _)| idx)
                .unwrap_or(word.len());
            if split > 0 {
                out.push(Token::new(TokenKind::Hanging, &word[..split], style));
                word = &word[split..];
            }
        }
        if word.is_empty() {
            return;
        }
        if self.config.flags.punctuation_as_glue || !word.contains('-') {
            self.emit_syllables(word, style, out);
            return;
        }
        // Hard hyphens: the part before each hyphen keeps it as a box and the
        // zero-width joint after it is a free break.
        for (i, part) in word.split('-').enumerate() {
            if i > 0 {
                out.push(Token::new(TokenKind::Word, "-", style));
                out.push(Token::new(TokenKind::Punctuation, "", style));
            }
            if !part.is_empty() {
                self.emit_syllables(part, style, out);
            }
        }
    }

    fn emit_syllables(&self, word: &str, style: &TextStyle, out: &mut Vec<Token>) {
        let syllables = checked_syllables(self.hyphenator, word);
        for (i, syllable) in syllables.into_iter().enumerate() {
            if i > 0 {
                out.push(Token::new(TokenKind::Hyphen, "", style));
            }
            out.push(Token::new(TokenKind::Word, syllable, style));
        }
    }
}

/// Segment a plain text run with the default style.
pub fn segment(text: &str, hyphenator: &dyn Hyphenator, config: &JustifyConfig) -> Vec<Token> {
    Segmenter::new(config, hyphenator).segment_text(text, &TextStyle::default())
}

/// Segment an inline tree with the default root style.
pub fn segment_tree(
    nodes: &[Inline],
    hyphenator: &dyn Hyphenator,
    config: &JustifyConfig,
) -> Vec<SegmentedInline> {
    Segmenter::new(config, hyphenator).segment_tree(nodes, &TextStyle::default())
}

// Non-breaking spaces belong to the word they join.
fn is_breaking_whitespace(ch: char) -> bool {
    ch.is_whitespace() && !matches!(ch, '\u{00A0}' | '\u{2007}' | '\u{202F}')
}
