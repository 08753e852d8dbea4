//! Break optimizer.
//!
//! Dynamic-programming search over glue and penalty positions. Each feasible
//! break keeps only its cheapest predecessor, and predecessors are dropped
//! from the active list once maximal shrink can no longer fit a line started
//! at them, which keeps the live set small.
//!
//! Position `units.len()` is the synthetic zero-width end glue that forces
//! the final break; callers do not append it themselves.

use crate::config::EngineFlags;
use crate::error::JustifyError;
use crate::measure::LineMeasure;
use crate::unit::Unit;

/// Index of a candidate inside a [`CandidateArena`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CandidateId(u32);

impl CandidateId {
    /// The paragraph-start candidate every chain ends at.
    pub const ROOT: CandidateId = CandidateId(0);

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// One node of a break chain.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BreakCandidate {
    /// Unit index of the break.
    pub index: usize,
    /// Cumulative cost from the paragraph start.
    pub cost: f32,
    /// Target width minus natural width for the line this break closes.
    pub compression: f32,
    /// Lines closed so far; the root is line 0.
    pub line_number: usize,
    /// Predecessor break, `None` for the root.
    pub previous: Option<CandidateId>,
    /// Natural width of the line this break closes.
    pub width: f32,
    /// Interword glue on that line.
    pub glue_count: usize,
    /// The line ends at a hyphenation point.
    pub hyphenated: bool,
    /// Hanging punctuation pulled out of the line start.
    pub hanging_width: f32,
}

impl BreakCandidate {
    const ROOT: BreakCandidate = BreakCandidate {
        index: 0,
        cost: 0.0,
        compression: 0.0,
        line_number: 0,
        previous: None,
        width: 0.0,
        glue_count: 0,
        hyphenated: false,
        hanging_width: 0.0,
    };

    pub fn is_root(&self) -> bool {
        self.previous.is_none()
    }
}

/// Owns every candidate created by one search.
///
/// Superseded candidates stay in the arena but are unreachable from the
/// terminal chain.
#[derive(Clone, Debug)]
pub struct CandidateArena {
    nodes: Vec<BreakCandidate>,
}

impl CandidateArena {
    pub fn new() -> Self {
        Self::with_capacity(16)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let mut nodes = Vec::with_capacity(capacity.max(1));
        nodes.push(BreakCandidate::ROOT);
        Self { nodes }
    }

    pub fn push(&mut self, candidate: BreakCandidate) -> CandidateId {
        let id = CandidateId(u32::try_from(self.nodes.len()).unwrap_or(u32::MAX));
        self.nodes.push(candidate);
        id
    }

    pub fn get(&self, id: CandidateId) -> &BreakCandidate {
        &self.nodes[id.index()]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Walk `previous` links from `id` back to the root, inclusive.
    pub fn chain(&self, id: CandidateId) -> impl Iterator<Item = (CandidateId, &BreakCandidate)> {
        let mut next = Some(id);
        std::iter::from_fn(move || {
            let current = next?;
            let node = self.get(current);
            next = node.previous;
            Some((current, node))
        })
    }
}

impl Default for CandidateArena {
    fn default() -> Self {
        Self::new()
    }
}

/// Counters from one search.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Break positions visited.
    pub iterations: usize,
    /// Candidates added to the arena, excluding the root.
    pub candidates_created: usize,
    /// Largest active list seen.
    pub peak_active: usize,
}

/// Outcome of a successful search.
#[derive(Clone, Debug)]
pub struct BreakSearch {
    pub arena: CandidateArena,
    /// Winning break at the paragraph end, or the root for a paragraph
    /// without boxes.
    pub terminal: CandidateId,
    pub stats: SearchStats,
}

impl BreakSearch {
    pub fn terminal(&self) -> &BreakCandidate {
        self.arena.get(self.terminal)
    }

    /// Lines in the winning chain.
    pub fn line_count(&self) -> usize {
        self.terminal().line_number
    }
}

/// Target width for a zero-based line; the last width repeats.
pub fn line_width_for(line_widths: &[f32], line: usize) -> f32 {
    line_widths
        .get(line)
        .or_else(|| line_widths.last())
        .copied()
        .unwrap_or(0.0)
}

/// Find the lowest-cost feasible break chain.
///
/// A break at `i` closing a line started at `prev` is feasible when the line
/// holds a box and `shrink <= compression <= stretch`; the final line's
/// compression is clamped to at most zero. Its cost is
/// `prev.cost + c^2 + penalty + (prev.c - c)^2`.
///
/// Equal costs at one position keep the later predecessor in active-list
/// order, so results depend only on the inputs.
pub fn find_breaks(
    units: &[Unit],
    line_widths: &[f32],
    flags: &EngineFlags,
) -> Result<BreakSearch, JustifyError> {
    let mut arena = CandidateArena::with_capacity(units.len() / 2 + 1);
    let mut stats = SearchStats::default();
    if !units.iter().any(Unit::is_box) {
        return Ok(BreakSearch {
            arena,
            terminal: CandidateId::ROOT,
            stats,
        });
    }
    if line_widths.is_empty() {
        return Err(JustifyError::MissingLineWidths);
    }
    if let Some((line, &width)) = line_widths
        .iter()
        .enumerate()
        .find(|(_, w)| !w.is_finite() || **w <= 0.0)
    {
        return Err(JustifyError::InvalidLineWidth { line, width });
    }

    let end = units.len();
    let mut active: Vec<CandidateId> = Vec::with_capacity(16);
    let mut survivors: Vec<CandidateId> = Vec::with_capacity(16);
    active.push(CandidateId::ROOT);
    stats.peak_active = 1;

    for index in 0..=end {
        let is_final = index == end;
        if !is_final && !units[index].is_break_point() {
            continue;
        }
        stats.iterations += 1;
        let break_cost = if is_final {
            0.0
        } else {
            units[index].break_cost()
        };
        let hyphenated = !is_final && units[index].is_penalty();

        let mut best: Option<BreakCandidate> = None;
        survivors.clear();
        for &prev_id in &active {
            let prev = *arena.get(prev_id);
            let target = line_width_for(line_widths, prev.line_number);
            let start = if prev.is_root() { 0 } else { prev.index + 1 };
            let measure = LineMeasure::of(units, start, index, flags);
            let mut compression = target - measure.width;
            if is_final {
                compression = compression.min(0.0);
            }

            let feasible = measure.box_count > 0
                && compression >= measure.shrink
                && compression <= measure.stretch;
            if feasible {
                let delta = prev.compression - compression;
                let cost = prev.cost + compression * compression + break_cost + delta * delta;
                if best.as_ref().is_none_or(|b| cost <= b.cost) {
                    best = Some(BreakCandidate {
                        index,
                        cost,
                        compression,
                        line_number: prev.line_number + 1,
                        previous: Some(prev_id),
                        width: measure.width,
                        glue_count: measure.glue_count,
                        hyphenated,
                        hanging_width: measure.hanging_width,
                    });
                }
            }

            if !is_final && measure.width + measure.shrink < target {
                survivors.push(prev_id);
            }
        }
        if let Some(candidate) = best {
            survivors.push(arena.push(candidate));
            stats.candidates_created += 1;
        }
        std::mem::swap(&mut active, &mut survivors);
        stats.peak_active = stats.peak_active.max(active.len());
        log::trace!("break search index={} active={}", index, active.len());

        if active.is_empty() {
            break;
        }
    }

    // Reverse, then keep the first strictly cheaper candidate.
    let mut terminal: Option<CandidateId> = None;
    for &id in active.iter().rev() {
        let candidate = arena.get(id);
        if candidate.index != end {
            continue;
        }
        if terminal.is_none_or(|best| candidate.cost < arena.get(best).cost) {
            terminal = Some(id);
        }
    }

    let Some(terminal) = terminal else {
        let lines_tried = arena.nodes.iter().map(|c| c.line_number).max().unwrap_or(0);
        log::debug!(
            "break search infeasible: units={} lines_tried={} candidates={}",
            end + 1,
            lines_tried,
            stats.candidates_created
        );
        return Err(JustifyError::InfeasibleLayout {
            units: end + 1,
            lines_tried,
        });
    };

    let search = BreakSearch {
        arena,
        terminal,
        stats,
    };
    log::debug!(
        "break search done: units={} lines={} cost={:.1} candidates={} peak_active={}",
        end + 1,
        search.line_count(),
        search.terminal().cost,
        stats.candidates_created,
        stats.peak_active
    );
    Ok(search)
}
