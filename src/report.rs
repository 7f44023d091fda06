use serde::Serialize;
use std::fmt;
use std::time::Duration;

use crate::net::Net;
use crate::unfold::{UnfoldStats, Unfolding};

#[derive(Debug, Clone, Serialize)]
pub struct NetSize {
    pub places: usize,
    pub transitions: usize,
}

/// Summary of one unfolding run.
#[derive(Debug, Clone, Serialize)]
pub struct UnfoldReport {
    pub tool_name: String,
    pub input: NetSize,
    pub output: NetSize,
    pub duplicated_places: usize,
    pub duplicated_transitions: usize,
    pub stats: UnfoldStats,
    pub exploration_graph: Option<NetSize>,
    pub analysis_time: Duration,
}

impl UnfoldReport {
    pub fn new(net: &Net, unfolding: &Unfolding, analysis_time: Duration) -> Self {
        Self {
            tool_name: env!("CARGO_PKG_NAME").to_string(),
            input: NetSize {
                places: net.places_len(),
                transitions: net.transitions_len(),
            },
            output: NetSize {
                places: unfolding.places_len(),
                transitions: unfolding.transitions_len(),
            },
            duplicated_places: unfolding.duplicated_places(),
            duplicated_transitions: unfolding.duplicated_transitions(),
            stats: unfolding.stats,
            // 探索图中节点为标识、边为发射
            exploration_graph: unfolding.graph.as_ref().map(|graph| NetSize {
                places: graph.node_count(),
                transitions: graph.edge_count(),
            }),
            analysis_time,
        }
    }
}

impl fmt::Display for UnfoldReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Unfolding report")?;
        writeln!(f, "tool: {}", self.tool_name)?;
        writeln!(f, "analysis time: {:?}", self.analysis_time)?;
        writeln!(
            f,
            "input net: {} places, {} transitions",
            self.input.places, self.input.transitions
        )?;
        writeln!(
            f,
            "unfolded net: {} places ({} duplicates), {} transitions ({} duplicates)",
            self.output.places,
            self.duplicated_places,
            self.output.transitions,
            self.duplicated_transitions
        )?;
        writeln!(
            f,
            "exploration: {} steps, {} distinct markings, {} new nodes, {} cutoffs, {} backtracks, max depth {}",
            self.stats.steps,
            self.stats.markings_visited,
            self.stats.new_nodes,
            self.stats.cutoffs,
            self.stats.backtracks,
            self.stats.max_depth
        )?;
        if self.stats.resumptions > 0 {
            writeln!(f, "resumed from visited markings {} times", self.stats.resumptions)?;
        }
        if let Some(graph) = &self.exploration_graph {
            writeln!(
                f,
                "exploration graph: {} markings, {} edges",
                graph.places, graph.transitions
            )?;
        }
        Ok(())
    }
}
