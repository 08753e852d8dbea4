//! Justify plain text in character cells.
//!
//! Usage:
//!   parfit [INPUT] [--width N[,N...]] [--stretch X] [--shrink X]
//!          [--hyphen-penalty X] [--overhang X]
//!          [--hyphenate none|soft|english|patterns] [--markup] [--json]
//!          [--config FILE.json]
//!
//! Paragraphs are separated by blank lines. Reads stdin when INPUT is
//! missing or `-`.

use std::env;
use std::io::{self, Read, Write};
use std::process::ExitCode;

use parfit::{
    parse_inline, BreakAssignment, EngineFlags, EnglishHeuristicHyphenator, JustifiedLine,
    JustifyConfig, Justifier, MonospaceMeasurer, NoHyphenation, ParagraphLayout,
    SoftHyphenHyphenator, SpacingSplit, TokenKind, Unit,
};
use serde::Serialize;

const DEFAULT_WIDTH: f32 = 72.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum HyphenateMode {
    None,
    Soft,
    English,
    Patterns,
}

impl HyphenateMode {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "none" => Some(Self::None),
            "soft" => Some(Self::Soft),
            "english" => Some(Self::English),
            "patterns" => Some(Self::Patterns),
            _ => None,
        }
    }
}

#[derive(Debug)]
struct Args {
    input: Option<String>,
    widths: Vec<f32>,
    stretch: Option<f32>,
    shrink: Option<f32>,
    hyphen_penalty: Option<f32>,
    overhang: Option<f32>,
    hyphenate: HyphenateMode,
    markup: bool,
    json: bool,
    config_path: Option<String>,
}

#[derive(Serialize)]
struct ParagraphReport {
    justified: bool,
    cost: Option<f32>,
    lines: Vec<LineReport>,
}

#[derive(Serialize)]
struct LineReport {
    text: String,
    indent: f32,
    #[serde(flatten)]
    assignment: BreakAssignment,
}

fn main() -> ExitCode {
    match run(env::args().collect()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(msg) => {
            eprintln!("error: {}", msg);
            eprintln!("{}", help_text());
            ExitCode::FAILURE
        }
    }
}

fn run(args: Vec<String>) -> Result<(), String> {
    let cli = parse_args(args)?;
    let config = build_config(&cli)?;
    let justifier = build_justifier(config, cli.hyphenate)?;

    let mut source = String::with_capacity(4096);
    match cli.input.as_deref() {
        None | Some("-") => {
            io::stdin()
                .read_to_string(&mut source)
                .map_err(|e| format!("read stdin: {}", e))?;
        }
        Some(path) => {
            source = std::fs::read_to_string(path).map_err(|e| format!("read {}: {}", path, e))?;
        }
    }

    let mut layouts = Vec::with_capacity(16);
    for paragraph in split_paragraphs(&source) {
        let layout = if cli.markup {
            let nodes = parse_inline(&paragraph).map_err(|e| e.to_string())?;
            justifier.layout_inline(&nodes, &cli.widths)
        } else {
            justifier.layout_text(&paragraph, &cli.widths)
        };
        layouts.push(layout.map_err(|e| e.to_string())?);
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if cli.json {
        let reports: Vec<ParagraphReport> = layouts.iter().map(report).collect();
        serde_json::to_writer_pretty(&mut out, &reports).map_err(|e| e.to_string())?;
        writeln!(out).map_err(|e| e.to_string())?;
        return Ok(());
    }
    for (idx, layout) in layouts.iter().enumerate() {
        if idx > 0 {
            writeln!(out).map_err(|e| e.to_string())?;
        }
        match layout {
            ParagraphLayout::Justified(paragraph) => {
                for line in paragraph.lines() {
                    writeln!(out, "{}", render_line(&line, paragraph.units()))
                        .map_err(|e| e.to_string())?;
                }
            }
            ParagraphLayout::Unjustified(paragraph) => {
                eprintln!("parfit: {}; printing paragraph unjustified", paragraph.reason());
                writeln!(out, "{}", paragraph.text()).map_err(|e| e.to_string())?;
            }
        }
    }
    Ok(())
}

fn build_config(cli: &Args) -> Result<JustifyConfig, String> {
    let mut config = match &cli.config_path {
        Some(path) => {
            let raw =
                std::fs::read_to_string(path).map_err(|e| format!("read {}: {}", path, e))?;
            serde_json::from_str::<JustifyConfig>(&raw)
                .map_err(|e| format!("parse {}: {}", path, e))?
        }
        // Character cells: one-cell spaces and hyphens, spaces may widen but
        // never shrink. A config file supplies its own values instead.
        None => JustifyConfig {
            stretch: 3.0,
            shrink: 0.0,
            hyphen_penalty: 25.0,
            space_width: Some(1.0),
            hyphen_width: Some(1.0),
            flags: EngineFlags {
                subpixel_spacing_split: true,
                ..EngineFlags::default()
            },
            ..JustifyConfig::default()
        },
    };
    if let Some(v) = cli.stretch {
        config.stretch = v;
    }
    if let Some(v) = cli.shrink {
        config.shrink = v;
    }
    if let Some(v) = cli.hyphen_penalty {
        config.hyphen_penalty = v;
    }
    if let Some(v) = cli.overhang {
        config.overhang = v;
    }
    Ok(config)
}

fn build_justifier(config: JustifyConfig, mode: HyphenateMode) -> Result<Justifier, String> {
    let justifier = Justifier::new(config)
        .map_err(|e| e.to_string())?
        .with_measurer(MonospaceMeasurer::default());
    Ok(match mode {
        HyphenateMode::None => justifier.with_hyphenator(NoHyphenation),
        HyphenateMode::Soft => justifier.with_hyphenator(SoftHyphenHyphenator),
        HyphenateMode::English => {
            justifier.with_hyphenator(EnglishHeuristicHyphenator::default())
        }
        #[cfg(feature = "hyphenation")]
        HyphenateMode::Patterns => justifier.with_hyphenator(parfit::PatternHyphenator::english()),
        #[cfg(not(feature = "hyphenation"))]
        HyphenateMode::Patterns => {
            return Err("--hyphenate patterns requires the `hyphenation` feature".to_string())
        }
    })
}

fn split_paragraphs(source: &str) -> Vec<String> {
    let mut paragraphs = Vec::with_capacity(16);
    let mut current = String::with_capacity(512);
    for line in source.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                paragraphs.push(std::mem::take(&mut current));
            }
            continue;
        }
        if !current.is_empty() {
            current.push('\n');
        }
        current.push_str(line);
    }
    if !current.is_empty() {
        paragraphs.push(current);
    }
    paragraphs
}

fn render_line(line: &JustifiedLine<'_>, units: &[Unit]) -> String {
    let mut out = String::with_capacity(96);
    let indent = line.indent.round().max(0.0) as usize;
    out.extend(std::iter::repeat_n(' ', indent));
    let split = line
        .split
        .unwrap_or_else(|| SpacingSplit::new(line.compression, line.glue_count));
    let mut ordinal = 0usize;
    for (offset, token) in line.tokens.iter().enumerate() {
        match token.kind {
            TokenKind::Space => {
                let natural = units
                    .get(line.token_start + offset)
                    .map_or(1.0, Unit::width)
                    .round() as i32;
                let extra = if ordinal < line.glue_count {
                    split.spacing_for(ordinal)
                } else {
                    0
                };
                ordinal += 1;
                let cells = (natural + extra).max(0) as usize;
                out.extend(std::iter::repeat_n(' ', cells));
            }
            TokenKind::Hyphen => {}
            _ => out.push_str(&token.text),
        }
    }
    if line.hyphenated {
        out.push('-');
    }
    out
}

fn report(layout: &ParagraphLayout) -> ParagraphReport {
    match layout {
        ParagraphLayout::Justified(paragraph) => ParagraphReport {
            justified: true,
            cost: Some(paragraph.cost()),
            lines: paragraph
                .lines()
                .iter()
                .zip(paragraph.line_assignments())
                .map(|(line, assignment)| LineReport {
                    text: line.text(),
                    indent: line.indent,
                    assignment: *assignment,
                })
                .collect(),
        },
        ParagraphLayout::Unjustified(paragraph) => ParagraphReport {
            justified: false,
            cost: None,
            lines: vec![LineReport {
                text: paragraph.text(),
                indent: 0.0,
                assignment: BreakAssignment::default(),
            }],
        },
    }
}

fn parse_widths(value: &str) -> Result<Vec<f32>, String> {
    value
        .split(',')
        .map(|part| {
            part.trim()
                .parse::<f32>()
                .map_err(|_| format!("invalid --width value '{}'", value))
        })
        .collect()
}

fn parse_f32(args: &[String], i: usize, flag: &str) -> Result<f32, String> {
    let v = args
        .get(i + 1)
        .ok_or_else(|| format!("{} requires a value", flag))?;
    v.parse::<f32>()
        .map_err(|_| format!("invalid {} value '{}'", flag, v))
}

fn parse_args(args: Vec<String>) -> Result<Args, String> {
    let mut cfg = Args {
        input: None,
        widths: vec![DEFAULT_WIDTH],
        stretch: None,
        shrink: None,
        hyphen_penalty: None,
        overhang: None,
        hyphenate: HyphenateMode::English,
        markup: false,
        json: false,
        config_path: None,
    };

    let mut i = 1usize;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => return Err("help requested".to_string()),
            "--width" => {
                let v = args
                    .get(i + 1)
                    .ok_or_else(|| "--width requires a value".to_string())?;
                cfg.widths = parse_widths(v)?;
                i += 2;
            }
            "--stretch" => {
                cfg.stretch = Some(parse_f32(&args, i, "--stretch")?);
                i += 2;
            }
            "--shrink" => {
                cfg.shrink = Some(parse_f32(&args, i, "--shrink")?);
                i += 2;
            }
            "--hyphen-penalty" => {
                cfg.hyphen_penalty = Some(parse_f32(&args, i, "--hyphen-penalty")?);
                i += 2;
            }
            "--overhang" => {
                cfg.overhang = Some(parse_f32(&args, i, "--overhang")?);
                i += 2;
            }
            "--hyphenate" => {
                let v = args
                    .get(i + 1)
                    .ok_or_else(|| "--hyphenate requires a value".to_string())?;
                cfg.hyphenate = HyphenateMode::parse(v)
                    .ok_or_else(|| format!("invalid --hyphenate value '{}'", v))?;
                i += 2;
            }
            "--config" => {
                let v = args
                    .get(i + 1)
                    .ok_or_else(|| "--config requires a value".to_string())?;
                cfg.config_path = Some(v.clone());
                i += 2;
            }
            "--markup" => {
                cfg.markup = true;
                i += 1;
            }
            "--json" => {
                cfg.json = true;
                i += 1;
            }
            other if other.starts_with("--") => {
                return Err(format!("unknown option '{}'", other));
            }
            other => {
                if cfg.input.is_some() {
                    return Err(format!("unexpected argument '{}'", other));
                }
                cfg.input = Some(other.to_string());
                i += 1;
            }
        }
    }
    Ok(cfg)
}

fn help_text() -> &'static str {
    "usage: parfit [INPUT] [--width N[,N...]] [--stretch X] [--shrink X] \
     [--hyphen-penalty X] [--overhang X] [--hyphenate none|soft|english|patterns] \
     [--markup] [--json] [--config FILE.json]"
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(rest: &[&str]) -> Vec<String> {
        std::iter::once("parfit")
            .chain(rest.iter().copied())
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn parses_widths_and_flags() {
        let args = parse_args(argv(&[
            "in.txt",
            "--width",
            "30,40",
            "--hyphenate",
            "none",
            "--json",
        ]))
        .unwrap();
        assert_eq!(args.input.as_deref(), Some("in.txt"));
        assert_eq!(args.widths, vec![30.0, 40.0]);
        assert_eq!(args.hyphenate, HyphenateMode::None);
        assert!(args.json);
        assert!(parse_args(argv(&["--width"])).is_err());
        assert!(parse_args(argv(&["--bogus"])).is_err());
    }

    #[test]
    fn splits_paragraphs_on_blank_lines() {
        let paragraphs = split_paragraphs("one\ntwo\n\n  \nthree\n");
        assert_eq!(paragraphs, vec!["one\ntwo", "three"]);
    }

    #[test]
    fn rendered_lines_fill_the_width() {
        let args = parse_args(argv(&["--width", "12", "--hyphenate", "none"])).unwrap();
        let justifier = build_justifier(build_config(&args).unwrap(), args.hyphenate).unwrap();
        let paragraph = justifier
            .justify_text("aaa bb cc ddd eeee f", &args.widths)
            .unwrap();
        let lines = paragraph.lines();
        for line in &lines[..lines.len() - 1] {
            assert_eq!(
                render_line(line, paragraph.units()).chars().count(),
                12,
                "{:?}",
                line.text()
            );
        }
    }

    #[test]
    fn shrunk_spaces_render_narrower_than_one_cell() {
        // "aa bb cc" is 8 cells; at 7 the single line shrinks one space away.
        let args = parse_args(argv(&["--width", "7", "--shrink", "-1", "--hyphenate", "none"]))
            .unwrap();
        let justifier = build_justifier(build_config(&args).unwrap(), args.hyphenate).unwrap();
        let paragraph = justifier.justify_text("aa bb cc", &args.widths).unwrap();
        let lines = paragraph.lines();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].compression, -1.0);
        assert_eq!(render_line(&lines[0], paragraph.units()), "aa bbcc");
    }

    #[test]
    fn config_file_values_are_not_overridden() {
        let path = std::env::temp_dir().join(format!("parfit-cli-{}.json", std::process::id()));
        std::fs::write(
            &path,
            r#"{"space_width": 2.0, "hyphen_width": 0.5, "flags": {"subpixel_spacing_split": false}}"#,
        )
        .unwrap();
        let path_arg = path.to_string_lossy().into_owned();
        let args = parse_args(argv(&["--config", &path_arg, "--stretch", "4"])).unwrap();
        let config = build_config(&args).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.space_width, Some(2.0));
        assert_eq!(config.hyphen_width, Some(0.5));
        assert!(!config.flags.subpixel_spacing_split);
        assert_eq!(config.stretch, 4.0);

        let defaults = build_config(&parse_args(argv(&[])).unwrap()).unwrap();
        assert_eq!(defaults.space_width, Some(1.0));
        assert!(defaults.flags.subpixel_spacing_split);
    }
}
