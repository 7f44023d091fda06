//! 探索图：每个访问过的标识一个节点，新节点发射与截断回边各为一条边。
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use petgraph::dot::{Config, Dot};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;

use crate::net::ids::{EventId, TransitionId};
use crate::net::structure::Marking;

#[derive(Debug, Clone)]
pub struct ExplorationNode {
    pub index: usize,
    pub marking: Marking,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExplorationEdge {
    /// Firing into a marking not on the active path.
    Fire { transition: TransitionId, name: String },
    /// Firing back onto the active path, materialised as a duplicate event.
    Cutoff {
        transition: TransitionId,
        event: EventId,
        name: String,
    },
}

impl ExplorationEdge {
    pub fn name(&self) -> &str {
        match self {
            ExplorationEdge::Fire { name, .. } | ExplorationEdge::Cutoff { name, .. } => name,
        }
    }

    pub fn is_cutoff(&self) -> bool {
        matches!(self, ExplorationEdge::Cutoff { .. })
    }
}

#[derive(Debug, Clone, Default)]
pub struct ExplorationGraph {
    pub graph: DiGraph<ExplorationNode, ExplorationEdge>,
    markings: HashMap<Marking, NodeIndex>,
}

impl ExplorationGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Node of `marking`, added on first sight.
    pub fn node_for(&mut self, marking: &Marking) -> NodeIndex {
        if let Some(index) = self.markings.get(marking) {
            return *index;
        }
        let index = self.graph.add_node(ExplorationNode {
            index: self.graph.node_count(),
            marking: marking.clone(),
        });
        self.markings.insert(marking.clone(), index);
        index
    }

    pub fn record(&mut self, from: &Marking, to: &Marking, edge: ExplorationEdge) {
        let source = self.node_for(from);
        let target = self.node_for(to);
        self.graph.add_edge(source, target, edge);
    }

    pub fn node(&self, marking: &Marking) -> Option<NodeIndex> {
        self.markings.get(marking).copied()
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn cutoff_count(&self) -> usize {
        self.graph
            .edge_weights()
            .filter(|edge| edge.is_cutoff())
            .count()
    }

    pub fn dot(&self) -> String {
        fn escape(s: &str) -> String {
            s.replace('\\', "\\\\").replace('"', "\\\"")
        }

        let dot = Dot::with_attr_getters(
            &self.graph,
            &[Config::EdgeNoLabel, Config::NodeNoLabel],
            &|_, e| {
                let label = escape(e.weight().name());
                if e.weight().is_cutoff() {
                    format!("label = \"{}\", style = dashed, color = red", label)
                } else {
                    format!("label = \"{}\"", label)
                }
            },
            &|_, nr| {
                let tokens = itertools::join(nr.1.marking.0.iter(), ",");
                format!("label = \"s{}\\n[{}]\"", nr.1.index, tokens)
            },
        );
        format!("{:?}", dot)
    }

    pub fn write_dot<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.dot())
    }
}
