use parfit::{
    EnglishHeuristicHyphenator, JustifyConfig, Justifier, MonospaceMeasurer, Unit,
};

/// Opening letter of Frankenstein, one paragraph per blank-line block.
pub const FRANKENSTEIN: &str = include_str!("../fixtures/frankenstein.txt");

pub fn paragraphs() -> Vec<String> {
    FRANKENSTEIN
        .split("\n\n")
        .map(|p| p.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|p| !p.is_empty())
        .collect()
}

/// Terminal-cell setup: one cell per character, spaces may widen by three
/// cells and never shrink.
pub fn cell_config() -> JustifyConfig {
    JustifyConfig {
        stretch: 3.0,
        shrink: 0.0,
        hyphen_penalty: 25.0,
        space_width: Some(1.0),
        hyphen_width: Some(1.0),
        ..JustifyConfig::default()
    }
}

pub fn cell_justifier() -> Justifier {
    Justifier::new(cell_config())
        .unwrap_or_else(|e| panic!("cell config rejected: {}", e))
        .with_hyphenator(EnglishHeuristicHyphenator::default())
        .with_measurer(MonospaceMeasurer::default())
}

/// Boxes of the given widths joined by interword glue.
pub fn words(widths: &[f32], space: f32, stretch: f32, shrink: f32) -> Vec<Unit> {
    let mut units = Vec::with_capacity(widths.len() * 2);
    for (i, &width) in widths.iter().enumerate() {
        if i > 0 {
            units.push(Unit::space(space, stretch, shrink));
        }
        units.push(Unit::boxed(width));
    }
    units
}
