//! Layout analyzer.
//!
//! Decides how each container arranges its children: a flex row, a flex
//! column, a grid, or free (absolute) positioning. The decision looks only at
//! the children's boxes, the parent's box and any auto-layout the parent
//! declared, so it is independent of child order and of every other
//! container's result.
//!
//! Precedence for containers with two or more children:
//!
//! 1. declared auto-layout (`layoutMode`)
//! 2. row: vertical centers within tolerance, horizontal spread above threshold
//! 3. column: the same test with the axes swapped
//! 4. grid: more than one distinct x bucket and more than one distinct y bucket
//! 5. free

use std::collections::BTreeMap;

use serde::Serialize;
use trellis_tree::{AxisAlign, Rect};

use crate::config::AnalysisConfig;
use crate::node::{AutoLayoutHint, DesignTree};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Axis {
    Row,
    Column,
}

/// Primary-axis distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Justify {
    Start,
    Center,
    End,
    SpaceBetween,
}

/// Cross-axis alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Align {
    Start,
    Center,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Padding {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Padding {
    pub fn is_zero(&self) -> bool {
        self.top == 0.0 && self.right == 0.0 && self.bottom == 0.0 && self.left == 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FlowLayout {
    pub direction: Axis,
    pub gap: f64,
    pub justify: Justify,
    pub align: Align,
    pub padding: Padding,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GridLayout {
    pub columns: usize,
    pub rows: usize,
    pub column_gap: f64,
    pub row_gap: f64,
}

/// Layout descriptor of a node. Leaves and undecided containers are `Free`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub enum Layout {
    #[default]
    Free,
    Flow(FlowLayout),
    Grid(GridLayout),
}

/// The arrangement kind without its parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ArrangementKind {
    FlowRow,
    FlowColumn,
    Grid,
    Free,
}

impl Layout {
    pub fn kind(&self) -> ArrangementKind {
        match self {
            Layout::Free => ArrangementKind::Free,
            Layout::Flow(flow) => match flow.direction {
                Axis::Row => ArrangementKind::FlowRow,
                Axis::Column => ArrangementKind::FlowColumn,
            },
            Layout::Grid(_) => ArrangementKind::Grid,
        }
    }
}

pub struct LayoutAnalyzer<'a> {
    config: &'a AnalysisConfig,
}

impl<'a> LayoutAnalyzer<'a> {
    pub fn new(config: &'a AnalysisConfig) -> Self {
        Self { config }
    }

    /// Assign a layout to every node in the tree.
    pub fn analyze(&self, tree: &mut DesignTree) {
        let mut counts = [0usize; 4];
        for id in tree.ids().collect::<Vec<_>>() {
            let node = &tree[id];
            let boxes: Vec<Rect> = tree.children(id).map(|c| c.bounds).collect();
            let layout = self.arrange(node.bounds, node.auto_layout.as_ref(), &boxes);
            counts[layout.kind() as usize] += 1;
            tree[id].layout = layout;
        }
        tracing::debug!(
            rows = counts[ArrangementKind::FlowRow as usize],
            columns = counts[ArrangementKind::FlowColumn as usize],
            grids = counts[ArrangementKind::Grid as usize],
            free = counts[ArrangementKind::Free as usize],
            "analyzed layouts"
        );
    }

    /// Decide the layout of one container from its children's boxes.
    pub fn arrange(
        &self,
        parent: Rect,
        declared: Option<&AutoLayoutHint>,
        children: &[Rect],
    ) -> Layout {
        if children.len() < 2 {
            return Layout::Free;
        }
        if let Some(hint) = declared {
            return Layout::Flow(declared_flow(hint));
        }
        if self.is_flow(children, Axis::Row) {
            return Layout::Flow(self.inferred_flow(parent, children, Axis::Row));
        }
        if self.is_flow(children, Axis::Column) {
            return Layout::Flow(self.inferred_flow(parent, children, Axis::Column));
        }
        self.grid(children).map_or(Layout::Free, Layout::Grid)
    }

    fn is_flow(&self, children: &[Rect], direction: Axis) -> bool {
        let centers: Vec<f64> = children.iter().map(|r| cross(r, direction).center()).collect();
        let mean = centers.iter().sum::<f64>() / centers.len() as f64;
        if centers
            .iter()
            .any(|c| (c - mean).abs() > self.config.alignment_tolerance)
        {
            return false;
        }
        let starts = children.iter().map(|r| primary(r, direction).start);
        spread(starts) > self.config.min_distribution
    }

    fn inferred_flow(&self, parent: Rect, children: &[Rect], direction: Axis) -> FlowLayout {
        let tol = self.config.alignment_tolerance;
        let spans: Vec<Span> = children.iter().map(|r| primary(r, direction)).collect();
        let gap = mean_positive_gap(spans.clone());
        let justify = justify(primary(&parent, direction), &spans, gap, tol);
        let cross_spans: Vec<Span> = children.iter().map(|r| cross(r, direction)).collect();
        let align = align(cross(&parent, direction), &cross_spans, tol);
        FlowLayout {
            direction,
            gap,
            justify,
            align,
            padding: Padding::default(),
        }
    }

    fn grid(&self, children: &[Rect]) -> Option<GridLayout> {
        let bucket = self.config.grid_bucket;
        let xs = bucketed(children.iter().map(|r| (r.x, Span::new(r.x, r.width))), bucket);
        let ys = bucketed(children.iter().map(|r| (r.y, Span::new(r.y, r.height))), bucket);
        if xs.len() < 2 || ys.len() < 2 {
            return None;
        }
        Some(GridLayout {
            columns: xs.len(),
            rows: ys.len(),
            column_gap: bucket_gap(&xs),
            row_gap: bucket_gap(&ys),
        })
    }
}

/// An interval along one axis.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Span {
    start: f64,
    end: f64,
}

impl Span {
    fn new(start: f64, length: f64) -> Self {
        Self {
            start,
            end: start + length,
        }
    }

    fn center(&self) -> f64 {
        (self.start + self.end) / 2.0
    }

    fn extent(&self) -> f64 {
        self.end - self.start
    }
}

fn primary(rect: &Rect, direction: Axis) -> Span {
    match direction {
        Axis::Row => Span::new(rect.x, rect.width),
        Axis::Column => Span::new(rect.y, rect.height),
    }
}

fn cross(rect: &Rect, direction: Axis) -> Span {
    match direction {
        Axis::Row => Span::new(rect.y, rect.height),
        Axis::Column => Span::new(rect.x, rect.width),
    }
}

fn spread(values: impl Iterator<Item = f64>) -> f64 {
    let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if min.is_finite() {
        max - min
    } else {
        0.0
    }
}

fn min_start(spans: &[Span]) -> f64 {
    spans.iter().map(|s| s.start).fold(f64::INFINITY, f64::min)
}

fn max_end(spans: &[Span]) -> f64 {
    spans.iter().map(|s| s.end).fold(f64::NEG_INFINITY, f64::max)
}

/// Mean of the strictly positive gaps between consecutive spans, 0 if none.
fn mean_positive_gap(mut spans: Vec<Span>) -> f64 {
    spans.sort_by(|a, b| a.start.total_cmp(&b.start).then(a.end.total_cmp(&b.end)));
    let gaps: Vec<f64> = spans
        .windows(2)
        .map(|w| w[1].start - w[0].end)
        .filter(|g| *g > 0.0)
        .collect();
    if gaps.is_empty() {
        0.0
    } else {
        gaps.iter().sum::<f64>() / gaps.len() as f64
    }
}

fn justify(parent: Span, spans: &[Span], gap: f64, tol: f64) -> Justify {
    if parent.extent() <= 0.0 {
        return Justify::Start;
    }
    let lead = min_start(spans) - parent.start;
    let trail = parent.end - max_end(spans);
    if lead <= tol && trail <= tol {
        if gap > 0.0 {
            Justify::SpaceBetween
        } else {
            Justify::Start
        }
    } else if (lead - trail).abs() <= tol {
        Justify::Center
    } else if lead < trail {
        Justify::Start
    } else {
        Justify::End
    }
}

fn align(parent: Span, spans: &[Span], tol: f64) -> Align {
    let starts = spread(spans.iter().map(|s| s.start)) <= tol;
    let ends = spread(spans.iter().map(|s| s.end)) <= tol;
    let centers = spread(spans.iter().map(|s| s.center())) <= tol;

    match (starts, ends) {
        (true, true) => {
            if parent.extent() <= 0.0 {
                return Align::Start;
            }
            let lead = min_start(spans) - parent.start;
            let trail = parent.end - max_end(spans);
            if lead <= tol && trail <= tol {
                Align::Start
            } else if (lead - trail).abs() <= tol {
                Align::Center
            } else if lead < trail {
                Align::Start
            } else {
                Align::End
            }
        }
        (true, false) => Align::Start,
        (false, true) => Align::End,
        (false, false) if centers => Align::Center,
        (false, false) => Align::Start,
    }
}

fn declared_flow(hint: &AutoLayoutHint) -> FlowLayout {
    let justify = match hint.primary_align {
        Some(AxisAlign::Center) => Justify::Center,
        Some(AxisAlign::Max) => Justify::End,
        Some(AxisAlign::SpaceBetween) => Justify::SpaceBetween,
        _ => Justify::Start,
    };
    let align = match hint.counter_align {
        Some(AxisAlign::Center) => Align::Center,
        Some(AxisAlign::Max) => Align::End,
        _ => Align::Start,
    };
    FlowLayout {
        direction: hint.direction,
        gap: hint.spacing.max(0.0),
        justify,
        align,
        padding: hint.padding,
    }
}

/// Group spans by the coarse bucket of their position.
fn bucketed(items: impl Iterator<Item = (f64, Span)>, bucket: f64) -> BTreeMap<i64, Vec<Span>> {
    let size = if bucket > 0.0 { bucket } else { 1.0 };
    let mut groups: BTreeMap<i64, Vec<Span>> = BTreeMap::new();
    for (position, span) in items {
        groups
            .entry((position / size).round() as i64)
            .or_default()
            .push(span);
    }
    groups
}

/// Mean positive gap between consecutive bucket groups.
fn bucket_gap(groups: &BTreeMap<i64, Vec<Span>>) -> f64 {
    let groups: Vec<&Vec<Span>> = groups.values().collect();
    let gaps: Vec<f64> = groups
        .windows(2)
        .map(|w| min_start(w[1]) - max_end(w[0]))
        .filter(|g| *g > 0.0)
        .collect();
    if gaps.is_empty() {
        0.0
    } else {
        gaps.iter().sum::<f64>() / gaps.len() as f64
    }
}
