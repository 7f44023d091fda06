//! 结果组装：展开后的矩阵、名称列表与扩展标识。
use std::fmt::Write as FmtWrite;
use std::fs;
use std::path::Path;

use crate::net::ids::{ConditionId, EventId};
use crate::net::incidence::Incidence;
use crate::net::index_vec::{Idx, IndexVec};
use crate::net::io::UnfoldingDocument;
use crate::net::structure::{Delta, Weight};
use crate::net::Net;
use crate::unfold::builder::{ConditionOrigin, EventOrigin, Extension, Origin};
use crate::unfold::engine::UnfoldStats;
use crate::unfold::graph::ExplorationGraph;

/// Final, read-only output of one unfolding run.
#[derive(Debug, Clone)]
pub struct Unfolding {
    pub places: IndexVec<ConditionId, String>,
    pub transitions: IndexVec<EventId, String>,
    pub matrix: Incidence<ConditionId, EventId, Delta>,
    /// Initial tokens of original places; duplicates start empty.
    pub marking: IndexVec<ConditionId, Weight>,
    pub condition_origins: IndexVec<ConditionId, ConditionOrigin>,
    pub event_origins: IndexVec<EventId, EventOrigin>,
    pub stats: UnfoldStats,
    pub graph: Option<ExplorationGraph>,
}

pub(crate) fn assemble(
    net: &Net,
    extension: Extension,
    stats: UnfoldStats,
    graph: Option<ExplorationGraph>,
) -> Unfolding {
    let (places, transitions, matrix, condition_origins, event_origins) = extension.into_parts();
    // 新建库所的 token 体现在弧权上，初始标识中恒为 0
    let marking = condition_origins
        .iter()
        .map(|origin| match origin {
            Origin::Original(place) => net.initial_marking().tokens(*place),
            Origin::Duplicate { .. } => 0,
        })
        .collect();

    Unfolding {
        places,
        transitions,
        matrix,
        marking,
        condition_origins,
        event_origins,
        stats,
        graph,
    }
}

impl Unfolding {
    pub fn places_len(&self) -> usize {
        self.places.len()
    }

    pub fn transitions_len(&self) -> usize {
        self.transitions.len()
    }

    pub fn duplicated_places(&self) -> usize {
        self.condition_origins
            .iter()
            .filter(|origin| origin.is_duplicate())
            .count()
    }

    pub fn duplicated_transitions(&self) -> usize {
        self.event_origins
            .iter()
            .filter(|origin| origin.is_duplicate())
            .count()
    }

    pub fn to_document(&self) -> UnfoldingDocument {
        UnfoldingDocument {
            matrix: self.matrix.to_nested_vec(),
            places: self.places.iter().cloned().collect(),
            transitions: self.transitions.iter().cloned().collect(),
            marking: self.marking.iter().copied().collect(),
        }
    }

    pub fn render_matrix(&self) -> String {
        let mut out = String::new();
        for row in self.matrix.rows().iter() {
            let _ = writeln!(&mut out, "{}", itertools::join(row.iter(), " "));
        }
        out
    }

    /// Unfolded net in Graphviz form; duplicates are drawn dashed.
    pub fn to_dot(&self) -> String {
        let mut dot = String::new();
        let _ = writeln!(&mut dot, "digraph Unfolding {{");
        let _ = writeln!(&mut dot, "    rankdir=LR;");
        let _ = writeln!(&mut dot, "    node [fontname=\"Helvetica\"];");

        for (condition, name) in self.places.iter_enumerated() {
            let style = if self.condition_origins[condition].is_duplicate() {
                "\"filled,dashed\""
            } else {
                "filled"
            };
            let _ = writeln!(
                &mut dot,
                "    place_{} [label=\"{}\\n{}\", shape=circle, style={}, fillcolor=\"#e3f2fd\"];",
                condition.index(),
                escape_label(name),
                self.marking[condition],
                style
            );
        }

        for (event, name) in self.transitions.iter_enumerated() {
            let style = if self.event_origins[event].is_duplicate() {
                "\"filled,dashed\""
            } else {
                "filled"
            };
            let _ = writeln!(
                &mut dot,
                "    trans_{} [label=\"{}\", shape=box, style={}, fillcolor=\"#ffe0b2\"];",
                event.index(),
                escape_label(name),
                style
            );
        }

        for (condition, row) in self.matrix.rows().iter_enumerated() {
            let place_node = format!("place_{}", condition.index());
            for (idx, delta) in row.iter().enumerate() {
                let transition_node = format!("trans_{}", idx);
                let (from, to) = match delta.signum() {
                    -1 => (&place_node, &transition_node),
                    1 => (&transition_node, &place_node),
                    _ => continue,
                };
                let weight = delta.unsigned_abs();
                if weight == 1 {
                    let _ = writeln!(&mut dot, "    {} -> {};", from, to);
                } else {
                    let _ = writeln!(&mut dot, "    {} -> {} [label=\"{}\"];", from, to, weight);
                }
            }
        }

        let _ = writeln!(&mut dot, "}}");
        dot
    }

    pub fn write_dot<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_dot())
    }
}

fn escape_label(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '"' => escaped.push_str("\\\""),
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
