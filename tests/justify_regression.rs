mod common;

use common::fixtures::{cell_config, cell_justifier, paragraphs, words};
use parfit::{
    find_breaks, reify, EngineFlags, JustifyError, Justifier, MonospaceMeasurer,
    ParagraphLayout, Unit,
};
use pretty_assertions::assert_eq;

fn breaks(units: &[Unit], widths: &[f32]) -> Vec<usize> {
    let search = find_breaks(units, widths, &EngineFlags::default())
        .unwrap_or_else(|e| panic!("search failed: {}", e));
    reify(&search.arena, search.terminal)
        .iter()
        .filter(|a| !a.is_sentinel())
        .map(|a| a.break_unit_index)
        .collect()
}

#[test]
fn to_be_or_not_breaks_after_be() {
    let units = words(&[20.0; 4], 5.0, 5.0, -1.0);
    assert_eq!(breaks(&units, &[50.0, 50.0]), vec![3, 7]);
}

#[test]
fn single_width_repeats_for_every_line() {
    let units = words(&[20.0; 6], 5.0, 5.0, -1.0);
    assert_eq!(breaks(&units, &[50.0]), vec![3, 7, 11]);
}

#[test]
fn oversized_box_falls_back_to_one_unbroken_line() {
    let justifier = Justifier::new(cell_config())
        .unwrap()
        .with_measurer(MonospaceMeasurer::default());
    let word = "x".repeat(200);
    let layout = justifier.layout_text(&word, &[100.0]).unwrap();
    let ParagraphLayout::Unjustified(fallback) = &layout else {
        panic!("expected fallback, got {:?}", layout);
    };
    assert!(fallback.reason().is_infeasible());
    assert_eq!(fallback.text(), word);
    assert_eq!(layout.line_count(), 1);

    let err = justifier.justify_text(&word, &[100.0]).unwrap_err();
    assert!(matches!(err, JustifyError::InfeasibleLayout { .. }));
}

#[test]
fn hyphen_penalty_loses_to_a_plain_break() {
    // "we jus-ti-fy now" at 62: breaking inside "justify" is feasible but
    // costs the penalty.
    let space = Unit::space(5.0, 30.0, -1.0);
    let hyphen = Unit::penalty(1000.0, 5.0);
    let units = [
        Unit::boxed(20.0),
        space,
        Unit::boxed(15.0),
        hyphen,
        Unit::boxed(10.0),
        hyphen,
        Unit::boxed(10.0),
        space,
        Unit::boxed(20.0),
    ];
    let search = find_breaks(&units, &[62.0], &EngineFlags::default()).unwrap();
    let lines = reify(&search.arena, search.terminal);
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[1].break_unit_index, 7);
    assert!(!lines[1].hyphenated);
    assert_eq!(lines[1].compression, 2.0);
    assert_eq!(lines[2].break_unit_index, 9);
    assert_eq!(search.terminal().cost, 12.0);
}

// Line count is not monotonic in the width in general: the variance term can
// make an extra line cheaper at a wider measure. This case widens cleanly.
#[test]
fn widening_four_words_merges_into_one_line() {
    let units = words(&[20.0; 4], 5.0, 5.0, -1.0);
    let counts: Vec<usize> = [45.0, 50.0, 100.0]
        .iter()
        .map(|&w| breaks(&units, &[w]).len())
        .collect();
    assert_eq!(counts, vec![2, 2, 1]);
}

#[test]
fn variance_term_can_add_a_line_at_a_wider_measure() {
    let units = words(
        &[1.0, 3.0, 13.0, 9.0, 2.0, 12.0, 17.0, 11.0, 14.0, 17.0, 1.0],
        4.0,
        10.0,
        -2.0,
    );
    assert_eq!(breaks(&units, &[39.0]).len(), 4);
    assert_eq!(breaks(&units, &[40.0]).len(), 5);
}

#[test]
fn spaced_punctuation_renders_at_the_target_width() {
    let justifier = Justifier::new(cell_config())
        .unwrap()
        .with_measurer(MonospaceMeasurer::default());
    for text in ["aaaa ,bbbb", "aaaa \u{2014} bbbb"] {
        let paragraph = justifier
            .justify_text(text, &[6.0])
            .unwrap_or_else(|e| panic!("{}: {}", text, e));
        let lines = paragraph.lines();
        let texts: Vec<String> = lines.iter().map(|l| l.text()).collect();
        assert_eq!(texts.len(), 2, "{:?}", texts);
        assert_eq!(texts[1], "bbbb");
        let first = &lines[0];
        let rendered =
            first.text().chars().count() as f32 + first.spacing * first.glue_count as f32;
        assert_eq!(rendered, 6.0, "{:?}", texts);
        assert_eq!(first.glue_count, 1);
    }

    // The space before the comma must fit too.
    let err = justifier.justify_text("aaaa ,bbbb", &[5.0]).unwrap_err();
    assert!(err.is_infeasible(), "{}", err);
}

#[test]
fn frankenstein_lines_fill_the_measure() {
    const WIDTH: f32 = 48.0;
    let justifier = cell_justifier();
    for paragraph in paragraphs() {
        let justified = justifier
            .justify_text(&paragraph, &[WIDTH])
            .unwrap_or_else(|e| panic!("{}: {}", e, paragraph));
        let lines = justified.lines();
        assert!(lines.len() > 1, "{}", paragraph);
        for line in &lines[..lines.len() - 1] {
            let natural = line.text().chars().count() as f32;
            let filled = natural + line.spacing * line.glue_count as f32;
            assert!(
                (filled - WIDTH).abs() < 1e-3,
                "line {} '{}' fills {}",
                line.number,
                line.text(),
                filled
            );
            assert!(line.spacing >= 0.0 && line.spacing <= 3.0);
        }
        let last = &lines[lines.len() - 1];
        assert_eq!(last.spacing, 0.0);
        assert!(last.text().chars().count() as f32 <= WIDTH);
        assert!(lines.iter().all(|l| !l.text().is_empty()));
    }
}

#[test]
fn markup_and_plain_text_break_identically() {
    let justifier = cell_justifier();
    let plain = justifier
        .justify_text("It was on a dreary night of November that I beheld", &[20.0])
        .unwrap();
    let marked = justifier
        .justify_markup(
            "It was on a <em>dreary</em> night of <b>November</b> that I beheld",
            &[20.0],
        )
        .unwrap();
    let plain_lines: Vec<String> = plain.lines().iter().map(|l| l.text()).collect();
    let marked_lines: Vec<String> = marked.lines().iter().map(|l| l.text()).collect();
    assert_eq!(plain_lines, marked_lines);
    assert_eq!(plain.assignments(), marked.assignments());
}
