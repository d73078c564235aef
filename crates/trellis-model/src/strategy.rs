//! Strategy selector.
//!
//! Decides whether a design is handled by the structural pipeline or handed
//! to the external generative path. Signals come from a bounded prefix of the
//! flattened sequence; the decision is advisory and generates nothing.

use std::collections::HashSet;

use serde::Serialize;
use trellis_tree::RawNode;

use crate::config::AnalysisConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Convert with the structural pipeline.
    Structural,
    /// Delegate to the external generative path.
    Generative,
}

/// Aggregate complexity signals of one design.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrategySignals {
    /// Nodes in the whole flattened sequence.
    pub node_count: usize,
    /// Nodes the other signals were sampled from.
    pub sampled: usize,
    pub has_auto_layout: bool,
    pub has_constraints: bool,
    /// Distinct declared types in the sample.
    pub type_diversity: usize,
}

impl StrategySignals {
    pub fn collect(nodes: &[RawNode], config: &AnalysisConfig) -> Self {
        let sample = &nodes[..nodes.len().min(config.strategy_sample_prefix)];
        let types: HashSet<&str> = sample.iter().map(|n| n.node_type.as_str()).collect();
        Self {
            node_count: nodes.len(),
            sampled: sample.len(),
            has_auto_layout: sample.iter().any(|n| n.layout_mode.is_some()),
            has_constraints: sample.iter().any(|n| n.constraints.is_some()),
            type_diversity: types.len(),
        }
    }
}

/// Free-text instructions asking for the widget library imply the
/// structural path.
pub fn prefers_structural(instructions: &str) -> bool {
    instructions.to_lowercase().contains("material")
}

pub fn select_strategy(
    signals: &StrategySignals,
    prefer_structural: bool,
    config: &AnalysisConfig,
) -> Strategy {
    let reason = if prefer_structural {
        Some("preference")
    } else if signals.has_auto_layout {
        Some("auto-layout")
    } else if signals.has_constraints {
        Some("constraints")
    } else if signals.type_diversity >= config.strategy_diversity_threshold {
        Some("type diversity")
    } else if signals.node_count > config.generative_node_ceiling {
        Some("size")
    } else {
        None
    };

    let strategy = match reason {
        Some(_) => Strategy::Structural,
        None => Strategy::Generative,
    };
    tracing::info!(?strategy, reason = reason.unwrap_or("simple design"), "selected strategy");
    strategy
}
