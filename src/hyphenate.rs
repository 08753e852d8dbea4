use smallvec::{smallvec, SmallVec};

const SOFT_HYPHEN: char = '\u{00AD}';

/// Splits a word into ordered syllables.
///
/// The concatenation of the returned syllables must equal the input word.
/// Returning `[word]` disables hyphenation for that word.
pub trait Hyphenator: Send + Sync {
    fn syllables(&self, word: &str) -> Vec<String>;
}

impl<F> Hyphenator for F
where
    F: Fn(&str) -> Vec<String> + Send + Sync,
{
    fn syllables(&self, word: &str) -> Vec<String> {
        self(word)
    }
}

/// Never hyphenates.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoHyphenation;

impl Hyphenator for NoHyphenation {
    fn syllables(&self, word: &str) -> Vec<String> {
        vec![word.to_string()]
    }
}

/// Breaks only at discretionary soft hyphens (U+00AD) present in the text.
#[derive(Clone, Copy, Debug, Default)]
pub struct SoftHyphenHyphenator;

impl Hyphenator for SoftHyphenHyphenator {
    fn syllables(&self, word: &str) -> Vec<String> {
        if !word.contains(SOFT_HYPHEN) {
            return vec![word.to_string()];
        }
        word.split(SOFT_HYPHEN)
            .filter(|part| !part.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// Dictionary-free English hyphenation.
///
/// Splits at vowel/consonant transitions, common suffixes, and a small
/// exception table, never leaving fewer than two characters in a syllable.
#[derive(Clone, Copy, Debug)]
pub struct EnglishHeuristicHyphenator {
    /// Words shorter than this are never split.
    pub min_word_chars: usize,
}

impl Default for EnglishHeuristicHyphenator {
    fn default() -> Self {
        Self { min_word_chars: 7 }
    }
}

impl Hyphenator for EnglishHeuristicHyphenator {
    fn syllables(&self, word: &str) -> Vec<String> {
        let chars = word.chars().count();
        if chars < self.min_word_chars.max(6) {
            return vec![word.to_string()];
        }
        let mut out = Vec::with_capacity(4);
        let mut last_split = 0usize;
        let mut last_byte = 0usize;
        for split in english_hyphenation_candidates(word) {
            if split < last_split + 2 || split + 2 > chars {
                continue;
            }
            let Some(byte) = char_to_byte(word, split) else {
                continue;
            };
            out.push(word[last_byte..byte].to_string());
            last_split = split;
            last_byte = byte;
        }
        out.push(word[last_byte..].to_string());
        out
    }
}

/// Liang-pattern hyphenation backed by `hypher`.
#[cfg(feature = "hyphenation")]
#[cfg_attr(docsrs, doc(cfg(feature = "hyphenation")))]
#[derive(Clone, Copy, Debug)]
pub struct PatternHyphenator {
    lang: hypher::Lang,
    /// Words shorter than this are never split.
    pub min_word_chars: usize,
}

#[cfg(feature = "hyphenation")]
impl PatternHyphenator {
    pub fn new(lang: hypher::Lang) -> Self {
        Self {
            lang,
            min_word_chars: 7,
        }
    }

    pub fn english() -> Self {
        Self::new(hypher::Lang::English)
    }

    /// Look up patterns by two-letter ISO 639-1 code (e.g. `"de"`).
    pub fn from_iso(code: &str) -> Option<Self> {
        let bytes: [u8; 2] = code.as_bytes().try_into().ok()?;
        hypher::Lang::from_iso(bytes).map(Self::new)
    }
}

#[cfg(feature = "hyphenation")]
impl Hyphenator for PatternHyphenator {
    fn syllables(&self, word: &str) -> Vec<String> {
        if word.chars().count() < self.min_word_chars {
            return vec![word.to_string()];
        }
        hypher::hyphenate(word, self.lang)
            .map(str::to_string)
            .collect()
    }
}

/// Run `hyphenator` on `word` and verify its output.
///
/// Soft hyphens are stripped from the result. If the syllables do not
/// reassemble the word, the word is kept whole.
pub fn checked_syllables(hyphenator: &dyn Hyphenator, word: &str) -> SmallVec<[String; 4]> {
    let syllables = hyphenator.syllables(word);
    let expected = strip_soft_hyphens(word);
    let mut out: SmallVec<[String; 4]> = SmallVec::with_capacity(syllables.len());
    let mut joined = String::with_capacity(expected.len());
    for syllable in &syllables {
        let clean = strip_soft_hyphens(syllable);
        if clean.is_empty() {
            continue;
        }
        joined.push_str(&clean);
        out.push(clean);
    }
    if out.is_empty() || joined != expected {
        log::warn!(
            "hyphenator returned {:?} for {:?}; keeping word whole",
            syllables,
            word
        );
        return smallvec![expected];
    }
    out
}

pub(crate) fn strip_soft_hyphens(text: &str) -> String {
    if text.contains(SOFT_HYPHEN) {
        text.chars().filter(|ch| *ch != SOFT_HYPHEN).collect()
    } else {
        text.to_string()
    }
}

fn char_to_byte(word: &str, chars: usize) -> Option<usize> {
    if chars == 0 {
        return None;
    }
    word.char_indices().nth(chars).map(|(byte, _)| byte)
}

fn english_hyphenation_candidates(word: &str) -> Vec<usize> {
    let chars: Vec<char> = word.chars().collect();
    if chars.len() < 6 || !chars.iter().all(|c| c.is_alphabetic()) {
        return Vec::with_capacity(0);
    }
    let mut candidates = Vec::with_capacity(chars.len() / 2);
    if let Some(exception) = english_hyphenation_exception(word) {
        candidates.extend_from_slice(exception);
        return candidates;
    }
    let is_vowel = |c: char| matches!(c.to_ascii_lowercase(), 'a' | 'e' | 'i' | 'o' | 'u' | 'y');

    for i in 3..(chars.len().saturating_sub(3)) {
        let prev = chars[i - 1];
        let next = chars[i];
        if !prev.is_ascii_alphabetic() || !next.is_ascii_alphabetic() {
            continue;
        }
        // Split before a consonant that starts a new syllable.
        if is_vowel(prev) && !is_vowel(next) && i + 1 < chars.len() && is_vowel(chars[i + 1]) {
            candidates.push(i);
        } else if !is_vowel(prev) && !is_vowel(next) && prev != 'h' && next != 'h' {
            candidates.push(i);
        }
    }

    const SUFFIXES: &[&str] = &[
        "tion", "sion", "ment", "ness", "less", "able", "ible", "ally", "ingly", "edly", "ing",
    ];
    let lower = word.to_ascii_lowercase();
    for suffix in SUFFIXES {
        if lower.ends_with(suffix) {
            let split = chars.len().saturating_sub(suffix.chars().count());
            if split >= 3 && split + 3 <= chars.len() {
                candidates.push(split);
            }
            break;
        }
    }

    candidates.sort_unstable();
    candidates.dedup();
    candidates
}

fn english_hyphenation_exception(word: &str) -> Option<&'static [usize]> {
    let lower = word.to_ascii_lowercase();
    match lower.as_str() {
        "characteristically" => Some(&[4, 6, 9, 12]),
        "accessibility" => Some(&[3, 6, 9]),
        "fundamental" => Some(&[3, 6]),
        "functionality" => Some(&[4, 7, 10]),
        "publication" => Some(&[3, 6]),
        "justify" => Some(&[3, 5]),
        "justification" => Some(&[3, 5, 7, 9]),
        "paragraph" => Some(&[3, 5]),
        "extraordinary" => Some(&[5, 8]),
        "responsibility" => Some(&[3, 6, 9]),
        "determined" => Some(&[3, 6]),
        "encounter" => Some(&[2, 5]),
        "providence" => Some(&[3, 6]),
        "language" => Some(&[3]),
        "hyphenation" => Some(&[3, 5, 7]),
        _ => None,
    }
}
