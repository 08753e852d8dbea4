//! DHAT heap profiler for parfit.
//!
//! Profiles allocation patterns of each pipeline stage over plain-text
//! corpora (paragraphs separated by blank lines):
//! segment -> measure -> search -> reify.
//!
//! Usage:
//!   cargo run -p parfit-heap-profile --release -- [OPTIONS] [TEXT_FILES...]
//!
//! Writes dhat-<phase>.json to the output directory (default: target/memory).
//! Open in https://nnethercote.github.io/dh_view/dh_view.html

#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

use std::path::PathBuf;
use std::process::ExitCode;

use parfit::{
    find_breaks, measure_units, reify, JustifyConfig, Justifier, MonospaceMeasurer,
    PatternHyphenator, Segmenter, TextStyle, Token, Unit,
};

const DEFAULT_FIXTURES: &[&str] = &["tests/fixtures/frankenstein.txt"];
const DEFAULT_WIDTH: f32 = 48.0;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Phase {
    Segment,
    Measure,
    Search,
    Full,
}

impl Phase {
    fn from_str(s: &str) -> Option<Self> {
        match s {
            "segment" => Some(Self::Segment),
            "measure" => Some(Self::Measure),
            "search" => Some(Self::Search),
            "full" => Some(Self::Full),
            _ => None,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Segment => "segment",
            Self::Measure => "measure",
            Self::Search => "search",
            Self::Full => "full",
        }
    }
}

struct Corpus {
    paragraphs: Vec<String>,
}

impl Corpus {
    fn load(files: &[PathBuf]) -> Result<Self, String> {
        let mut paragraphs = Vec::new();
        for file in files {
            let text = std::fs::read_to_string(file)
                .map_err(|e| format!("read {}: {}", file.display(), e))?;
            paragraphs.extend(
                text.split("\n\n")
                    .map(|p| p.split_whitespace().collect::<Vec<_>>().join(" "))
                    .filter(|p| !p.is_empty()),
            );
        }
        Ok(Self { paragraphs })
    }
}

fn config() -> JustifyConfig {
    JustifyConfig {
        stretch: 3.0,
        shrink: 0.0,
        hyphen_penalty: 25.0,
        space_width: Some(1.0),
        hyphen_width: Some(1.0),
        ..JustifyConfig::default()
    }
}

// Segmentation and measurement outside the profiled phase run before the
// profiler starts, so each phase only reports its own allocations.
fn prepare_tokens(corpus: &Corpus, cfg: &JustifyConfig) -> Vec<Vec<Token>> {
    let hyphenator = PatternHyphenator::english();
    let segmenter = Segmenter::new(cfg, &hyphenator);
    corpus
        .paragraphs
        .iter()
        .map(|p| segmenter.segment_text(p, &TextStyle::default()))
        .collect()
}

fn prepare_units(tokens: &[Vec<Token>], cfg: &JustifyConfig) -> Result<Vec<Vec<Unit>>, String> {
    tokens
        .iter()
        .map(|t| measure_units(t, &MonospaceMeasurer::default(), cfg).map_err(|e| e.to_string()))
        .collect()
}

fn profile(phase: Phase, corpus: &Corpus, width: f32, out: PathBuf) -> Result<(), String> {
    let cfg = config();
    match phase {
        Phase::Segment => {
            let hyphenator = PatternHyphenator::english();
            let segmenter = Segmenter::new(&cfg, &hyphenator);
            let _profiler = dhat::Profiler::builder().file_name(out).build();
            for paragraph in &corpus.paragraphs {
                let _tokens = segmenter.segment_text(paragraph, &TextStyle::default());
            }
        }
        Phase::Measure => {
            let tokens = prepare_tokens(corpus, &cfg);
            let _profiler = dhat::Profiler::builder().file_name(out).build();
            prepare_units(&tokens, &cfg)?;
        }
        Phase::Search => {
            let tokens = prepare_tokens(corpus, &cfg);
            let units = prepare_units(&tokens, &cfg)?;
            let _profiler = dhat::Profiler::builder().file_name(out).build();
            for paragraph in &units {
                match find_breaks(paragraph, &[width], &cfg.flags) {
                    Ok(search) => {
                        let _lines = reify(&search.arena, search.terminal);
                    }
                    Err(e) => eprintln!("  skipped paragraph: {}", e),
                }
            }
        }
        Phase::Full => {
            let justifier = Justifier::new(cfg)
                .map_err(|e| e.to_string())?
                .with_hyphenator(PatternHyphenator::english())
                .with_measurer(MonospaceMeasurer::default());
            let _profiler = dhat::Profiler::builder().file_name(out).build();
            for paragraph in &corpus.paragraphs {
                justifier
                    .layout_text(paragraph, &[width])
                    .map_err(|e| e.to_string())?;
            }
        }
    }
    Ok(())
}

fn usage() {
    eprintln!("Usage: heap-profile [OPTIONS] [TEXT_FILES...]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --phase <segment|measure|search|full>  Stage to profile (default: full)");
    eprintln!("  --width <CELLS>                        Target line width (default: 48)");
    eprintln!("  --out-dir <DIR>                        Output directory (default: target/memory)");
    eprintln!();
    eprintln!("If no files are given, profiles the bundled fixture paragraphs.");
}

fn run() -> Result<(), String> {
    let mut args = std::env::args().skip(1);
    let mut phase = Phase::Full;
    let mut width = DEFAULT_WIDTH;
    let mut out_dir = PathBuf::from("target/memory");
    let mut files: Vec<PathBuf> = Vec::new();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--phase" => {
                let value = args.next().ok_or("--phase needs a value")?;
                phase = Phase::from_str(&value).ok_or(format!("unknown phase: {value}"))?;
            }
            "--width" => {
                let value = args.next().ok_or("--width needs a value")?;
                width = value
                    .parse()
                    .map_err(|_| format!("invalid width: {value}"))?;
            }
            "--out-dir" => {
                out_dir = PathBuf::from(args.next().ok_or("--out-dir needs a value")?);
            }
            "--help" | "-h" => {
                usage();
                return Ok(());
            }
            other => files.push(PathBuf::from(other)),
        }
    }

    if files.is_empty() {
        files.extend(
            DEFAULT_FIXTURES
                .iter()
                .map(PathBuf::from)
                .filter(|p| p.exists()),
        );
    }
    if files.is_empty() {
        return Err("no text files found; provide paths or run from the repo root".to_string());
    }

    std::fs::create_dir_all(&out_dir)
        .map_err(|e| format!("create {}: {}", out_dir.display(), e))?;

    let corpus = Corpus::load(&files)?;
    let json_path = out_dir.join(format!("dhat-{}.json", phase.name()));
    eprintln!(
        "heap-profile: phase={}, paragraphs={}, width={}, out={}",
        phase.name(),
        corpus.paragraphs.len(),
        width,
        out_dir.display()
    );

    profile(phase, &corpus, width, json_path.clone())?;

    eprintln!(
        "Done. Open {} in https://nnethercote.github.io/dh_view/dh_view.html",
        json_path.display()
    );
    Ok(())
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("heap-profile: {message}");
            usage();
            ExitCode::FAILURE
        }
    }
}
