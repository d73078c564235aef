//! Tunable analysis heuristics.
//!
//! Every threshold the layout analyzer, classifier and strategy selector use
//! lives here as a named constant and as a field on [`AnalysisConfig`], so a
//! caller can override any of them (the CLI loads overrides from JSON).

use serde::{Deserialize, Serialize};

/// Max deviation of a child's cross-axis center from the mean for a flow axis.
pub const ALIGNMENT_TOLERANCE: f64 = 4.0;
/// Primary-axis spread children must exceed before a flow axis is declared.
pub const MIN_DISTRIBUTION: f64 = 20.0;
/// Coordinate bucket size for grid detection.
pub const GRID_BUCKET: f64 = 10.0;
/// Corner radius from which a button counts as elevated.
pub const ELEVATED_RADIUS: f64 = 8.0;
/// Corner radius from which a shadowed shape counts as a card.
pub const CARD_RADIUS: f64 = 4.0;
pub const HEADING1_SIZE: f64 = 24.0;
pub const HEADING2_SIZE: f64 = 20.0;
pub const HEADING3_SIZE: f64 = 16.0;
/// Font weight above which text is emphasized.
pub const EMPHASIS_WEIGHT: f64 = 500.0;
/// Text at least this long reads as body copy.
pub const PARAGRAPH_MIN_CHARS: usize = 40;
/// Button labels longer than this are not treated as labels.
pub const BUTTON_LABEL_MAX_CHARS: usize = 24;
/// How far a label's center may sit from its button's center.
pub const LABEL_CENTER_TOLERANCE: f64 = 6.0;
/// Width/height range of button-shaped nodes.
pub const BUTTON_MIN_ASPECT: f64 = 1.5;
pub const BUTTON_MAX_ASPECT: f64 = 8.0;
pub const BUTTON_MAX_HEIGHT: f64 = 64.0;
/// Nodes sampled from the head of the sequence by the strategy selector.
pub const STRATEGY_SAMPLE_PREFIX: usize = 100;
/// Distinct declared types in the sample that mark a richly structured design.
pub const STRATEGY_DIVERSITY_THRESHOLD: usize = 4;
/// Documents larger than this are always handled structurally.
pub const GENERATIVE_NODE_CEILING: usize = 500;

/// Heuristic thresholds for one conversion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub alignment_tolerance: f64,
    pub min_distribution: f64,
    pub grid_bucket: f64,
    pub elevated_radius: f64,
    pub card_radius: f64,
    pub heading1_size: f64,
    pub heading2_size: f64,
    pub heading3_size: f64,
    pub emphasis_weight: f64,
    pub paragraph_min_chars: usize,
    pub button_label_max_chars: usize,
    pub label_center_tolerance: f64,
    pub button_min_aspect: f64,
    pub button_max_aspect: f64,
    pub button_max_height: f64,
    pub strategy_sample_prefix: usize,
    pub strategy_diversity_threshold: usize,
    pub generative_node_ceiling: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            alignment_tolerance: ALIGNMENT_TOLERANCE,
            min_distribution: MIN_DISTRIBUTION,
            grid_bucket: GRID_BUCKET,
            elevated_radius: ELEVATED_RADIUS,
            card_radius: CARD_RADIUS,
            heading1_size: HEADING1_SIZE,
            heading2_size: HEADING2_SIZE,
            heading3_size: HEADING3_SIZE,
            emphasis_weight: EMPHASIS_WEIGHT,
            paragraph_min_chars: PARAGRAPH_MIN_CHARS,
            button_label_max_chars: BUTTON_LABEL_MAX_CHARS,
            label_center_tolerance: LABEL_CENTER_TOLERANCE,
            button_min_aspect: BUTTON_MIN_ASPECT,
            button_max_aspect: BUTTON_MAX_ASPECT,
            button_max_height: BUTTON_MAX_HEIGHT,
            strategy_sample_prefix: STRATEGY_SAMPLE_PREFIX,
            strategy_diversity_threshold: STRATEGY_DIVERSITY_THRESHOLD,
            generative_node_ceiling: GENERATIVE_NODE_CEILING,
        }
    }
}
