//! 展开引擎：显式栈上的深度优先遍历，处理新节点、截断（回到活动路径）与回溯。
//!
//! 每次 [`Unfolder::step`] 只做一次状态迁移并返回对应的 [`Step`] 事件：
//!
//! * 栈顶标识仍有未尝试且可激发的迁移：发射之；
//!   - 新标识已在活动路径上：截断，生成副本迁移与副本库所，不再递归；
//!   - 新标识严格覆盖路径上的某个祖先：网在该路径上无界，报错；
//!   - 否则记录新节点并入栈；
//! * 栈顶无可尝试迁移：出栈回溯；
//! * 栈空：扫描访问过的标识，若仍有从未发射过的可激发迁移则从该处继续，否则结束。
use std::collections::BTreeSet;

use indexmap::IndexSet;
use serde::Serialize;
use thiserror::Error;

use crate::config::UnfoldConfig;
use crate::net::core::{MalformedNetError, Net, fire, is_enabled};
use crate::net::ids::{ConditionId, EventId, TransitionId};
use crate::net::index_vec::Idx;
use crate::net::structure::Marking;
use crate::unfold::builder::{Extension, Origin};
use crate::unfold::graph::{ExplorationEdge, ExplorationGraph};
use crate::unfold::registry::DuplicateRegistry;
use crate::unfold::result::{self, Unfolding};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnboundedExplorationError {
    #[error(
        "firing {transition} reaches {marking:?}, which strictly covers {ancestor:?} on the active path; the net is unbounded"
    )]
    Covering {
        transition: String,
        ancestor: Marking,
        marking: Marking,
    },
    #[error("exploration exceeded the step limit of {limit}")]
    StepLimit { limit: usize },
    #[error("unfolding exceeded the place limit of {limit}")]
    PlaceLimit { limit: usize },
}

#[derive(Debug, Error)]
pub enum UnfoldError {
    #[error(transparent)]
    Malformed(#[from] MalformedNetError),
    #[error(transparent)]
    Unbounded(#[from] UnboundedExplorationError),
}

/// One state transition of the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// `transition` led to a marking not on the active path; it is now on top.
    Advanced {
        transition: TransitionId,
        depth: usize,
    },
    /// `transition` led back onto the active path and was unrolled once.
    Cutoff {
        transition: TransitionId,
        event: EventId,
        conditions: Vec<ConditionId>,
    },
    /// The top marking had nothing left to try and was popped; `remaining`
    /// markings stay on the active path.
    Backtracked { remaining: usize },
    /// The path was exhausted and exploration restarts from a visited marking
    /// that still enables a never-fired transition.
    Resumed { from: Marking },
    Done,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UnfoldStats {
    pub steps: usize,
    pub markings_visited: usize,
    pub new_nodes: usize,
    pub cutoffs: usize,
    pub backtracks: usize,
    pub resumptions: usize,
    pub max_depth: usize,
}

pub struct Unfolder<'net> {
    net: &'net Net,
    config: UnfoldConfig,
    extension: Extension,
    place_duplicates: DuplicateRegistry,
    transition_duplicates: DuplicateRegistry,
    /// Markings on the active path, root first.
    history: IndexSet<Marking>,
    /// Next transition to try, one per history entry.
    cursors: Vec<usize>,
    /// Every marking ever entered, in first-visit order.
    visited: IndexSet<Marking>,
    never_fired: BTreeSet<TransitionId>,
    sweep_from: usize,
    done: bool,
    stats: UnfoldStats,
    graph: Option<ExplorationGraph>,
}

impl<'net> Unfolder<'net> {
    pub fn new(net: &'net Net, config: UnfoldConfig) -> Self {
        let initial = net.initial_marking().clone();
        let extension = Extension::seeded(net, config.seed);
        let graph = config.record_graph.then(|| {
            let mut graph = ExplorationGraph::new();
            graph.node_for(&initial);
            graph
        });

        let mut history = IndexSet::new();
        history.insert(initial.clone());
        let mut visited = IndexSet::new();
        visited.insert(initial);

        Self {
            net,
            config,
            extension,
            place_duplicates: DuplicateRegistry::new(),
            transition_duplicates: DuplicateRegistry::new(),
            history,
            cursors: vec![0],
            visited,
            never_fired: net.transitions().indices().collect(),
            sweep_from: 0,
            done: false,
            stats: UnfoldStats {
                markings_visited: 1,
                ..UnfoldStats::default()
            },
            graph,
        }
    }

    /// Drives [`step`](Self::step) until the traversal is done.
    pub fn run(mut self) -> Result<Unfolding, UnfoldError> {
        while self.step()? != Step::Done {}
        Ok(self.finish())
    }

    pub fn step(&mut self) -> Result<Step, UnboundedExplorationError> {
        if self.done {
            return Ok(Step::Done);
        }
        let Some(marking) = self.history.last().cloned() else {
            return Ok(self.sweep());
        };
        self.charge_step()?;

        let Some(transition) = self.next_enabled(&marking) else {
            self.history.pop();
            self.cursors.pop();
            self.stats.backtracks += 1;
            log::trace!("backtrack from {:?}", marking);
            return Ok(Step::Backtracked {
                remaining: self.history.len(),
            });
        };

        let next = fire(&marking, self.net.template(transition));
        self.never_fired.remove(&transition);
        log::trace!(
            "{} fires: {:?} -> {:?}",
            self.net.transition_name(transition),
            marking,
            next
        );

        if self.history.contains(&next) {
            return self.cutoff(transition, &marking, &next);
        }
        if self.config.detect_unbounded {
            if let Some(ancestor) = self.history.iter().find(|seen| next.strictly_covers(seen)) {
                log::warn!(
                    "{} pumps {:?} up to {:?}",
                    self.net.transition_name(transition),
                    ancestor,
                    next
                );
                return Err(UnboundedExplorationError::Covering {
                    transition: self.net.transition_name(transition).to_owned(),
                    ancestor: ancestor.clone(),
                    marking: next,
                });
            }
        }
        self.advance(transition, &marking, next)
    }

    /// Next transition at the top marking, in identifier order, that has not
    /// been tried from this visit and is enabled.
    fn next_enabled(&mut self, marking: &Marking) -> Option<TransitionId> {
        let cursor = self.cursors.last_mut()?;
        while *cursor < self.net.transitions_len() {
            let transition = TransitionId::from_usize(*cursor);
            *cursor += 1;
            if is_enabled(marking, self.net.template(transition)) {
                return Some(transition);
            }
        }
        None
    }

    /// Unrolls one more turn of the loop closed by `transition`: a duplicate
    /// event consuming like the template and producing into fresh duplicates
    /// of every place that gained tokens.
    fn cutoff(
        &mut self,
        transition: TransitionId,
        before: &Marking,
        after: &Marking,
    ) -> Result<Step, UnboundedExplorationError> {
        let net = self.net;
        let template = net.template(transition);

        let (index, name) = self
            .transition_duplicates
            .next_duplicate(net.transition_name(transition));
        let event = self.extension.append_transition(
            name,
            Origin::Duplicate {
                original: transition,
                index,
            },
        );
        for (place, _) in template.consumed() {
            let (condition, _) = self.extension.record_place(net, place);
            self.extension
                .set_weight(condition, event, template.delta(place));
        }

        let mut conditions = Vec::new();
        for place in net.places().indices() {
            if after.tokens(place) <= before.tokens(place) {
                continue;
            }
            let (index, name) = self.place_duplicates.next_duplicate(net.place_name(place));
            let condition = self.extension.append_place(
                name,
                Origin::Duplicate {
                    original: place,
                    index,
                },
            );
            self.extension
                .set_weight(condition, event, template.delta(place));
            conditions.push(condition);
        }
        self.check_place_limit()?;

        self.stats.cutoffs += 1;
        if let Some(graph) = self.graph.as_mut() {
            graph.record(
                before,
                after,
                ExplorationEdge::Cutoff {
                    transition,
                    event,
                    name: self.extension.transitions()[event].clone(),
                },
            );
        }
        log::debug!(
            "cutoff: {} returns to {:?}, unrolled as {} producing {:?}",
            net.transition_name(transition),
            after,
            self.extension.transitions()[event],
            conditions
                .iter()
                .map(|condition| self.extension.places()[*condition].as_str())
                .collect::<Vec<_>>()
        );

        Ok(Step::Cutoff {
            transition,
            event,
            conditions,
        })
    }

    /// Records `transition` and any place first reaching a positive count,
    /// then pushes `next` onto the active path.
    fn advance(
        &mut self,
        transition: TransitionId,
        before: &Marking,
        next: Marking,
    ) -> Result<Step, UnboundedExplorationError> {
        let net = self.net;
        for (place, tokens) in next.iter() {
            if *tokens > 0 && self.extension.record_place(net, place).1 {
                log::debug!("{} marked for the first time", net.place_name(place));
            }
        }
        if self.extension.record_transition(net, transition).1 {
            log::debug!("first occurrence of {}", net.transition_name(transition));
        }
        self.check_place_limit()?;

        if let Some(graph) = self.graph.as_mut() {
            graph.record(
                before,
                &next,
                ExplorationEdge::Fire {
                    transition,
                    name: net.transition_name(transition).to_owned(),
                },
            );
        }
        self.visited.insert(next.clone());
        self.history.insert(next);
        self.cursors.push(0);

        let depth = self.depth();
        self.stats.new_nodes += 1;
        self.stats.markings_visited = self.visited.len();
        self.stats.max_depth = self.stats.max_depth.max(depth);
        log::debug!("advance by {} to depth {}", net.transition_name(transition), depth);

        Ok(Step::Advanced { transition, depth })
    }

    /// Restarts from the first visited marking that still enables a
    /// transition nobody has fired yet.
    fn sweep(&mut self) -> Step {
        let net = self.net;
        while let Some(marking) = self.visited.get_index(self.sweep_from) {
            self.sweep_from += 1;
            let offers_untried = self
                .never_fired
                .iter()
                .any(|transition| is_enabled(marking, net.template(*transition)));
            if offers_untried {
                let from = marking.clone();
                log::info!("resuming exploration from {:?}", from);
                self.history.insert(from.clone());
                self.cursors.push(0);
                self.stats.resumptions += 1;
                return Step::Resumed { from };
            }
        }
        self.done = true;
        Step::Done
    }

    fn charge_step(&mut self) -> Result<(), UnboundedExplorationError> {
        self.stats.steps += 1;
        if let Some(limit) = self.config.step_limit {
            if self.stats.steps > limit {
                log::warn!("step limit {} reached, aborting", limit);
                return Err(UnboundedExplorationError::StepLimit { limit });
            }
        }
        Ok(())
    }

    fn check_place_limit(&self) -> Result<(), UnboundedExplorationError> {
        if let Some(limit) = self.config.place_limit {
            if self.extension.places_len() > limit {
                log::warn!("place limit {} reached, aborting", limit);
                return Err(UnboundedExplorationError::PlaceLimit { limit });
            }
        }
        Ok(())
    }

    /// Firings on the active path.
    fn depth(&self) -> usize {
        self.history.len().saturating_sub(1)
    }

    pub fn finish(self) -> Unfolding {
        log::info!(
            "unfolding finished: {} places, {} transitions, {} cutoffs, {} markings",
            self.extension.places_len(),
            self.extension.transitions_len(),
            self.stats.cutoffs,
            self.stats.markings_visited
        );
        result::assemble(self.net, self.extension, self.stats, self.graph)
    }

    pub fn history(&self) -> impl Iterator<Item = &Marking> + '_ {
        self.history.iter()
    }

    pub fn extension(&self) -> &Extension {
        &self.extension
    }

    pub fn stats(&self) -> &UnfoldStats {
        &self.stats
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn never_fired(&self) -> impl Iterator<Item = TransitionId> + '_ {
        self.never_fired.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::ids::PlaceId;
    use crate::unfold::builder::SeedPolicy;
    use std::collections::HashSet;

    fn net(matrix: Vec<Vec<i64>>, marking: Vec<i64>) -> Net {
        Net::new(matrix, marking).unwrap()
    }

    fn cycle() -> Net {
        net(vec![vec![-1, 1], vec![1, -1]], vec![1, 0])
    }

    /// Steps to the end, checking the structural and path invariants after
    /// every state transition.
    fn drive(unfolder: &mut Unfolder<'_>) -> Vec<Step> {
        let mut steps = Vec::new();
        loop {
            let step = unfolder.step().unwrap();
            assert!(unfolder.extension().is_consistent());
            let path: Vec<_> = unfolder.history().collect();
            let distinct: HashSet<_> = path.iter().collect();
            assert_eq!(path.len(), distinct.len(), "marking repeated on active path");
            if step == Step::Done {
                break;
            }
            steps.push(step);
        }
        steps
    }

    #[test]
    fn simple_cycle_is_cut_off_once() {
        let net = cycle();
        let mut unfolder = Unfolder::new(&net, UnfoldConfig::default());
        let steps = drive(&mut unfolder);

        assert_eq!(
            steps,
            vec![
                Step::Advanced {
                    transition: TransitionId::new(0),
                    depth: 1
                },
                Step::Cutoff {
                    transition: TransitionId::new(1),
                    event: EventId::new(2),
                    conditions: vec![ConditionId::new(2)],
                },
                Step::Backtracked { remaining: 1 },
                Step::Backtracked { remaining: 0 },
            ]
        );
        assert!(unfolder.is_done());
        assert_eq!(unfolder.history().count(), 0);

        let extension = unfolder.extension();
        assert_eq!(extension.places().as_slice(), &["p1", "p2", "p1(1)"]);
        assert_eq!(extension.transitions().as_slice(), &["t1", "t2", "t2(1)"]);
        assert_eq!(
            extension.matrix().to_nested_vec(),
            vec![vec![-1, 1, 0], vec![1, -1, -1], vec![0, 0, 1]]
        );
    }

    #[test]
    fn dead_end_leaves_structure_unchanged() {
        let net = net(vec![vec![-1, 0], vec![0, -1]], vec![1, 0]);
        let unfolding = Unfolder::new(&net, UnfoldConfig::default()).run().unwrap();
        assert_eq!(unfolding.matrix.to_nested_vec(), vec![vec![-1, 0], vec![0, -1]]);
        assert_eq!(unfolding.stats.cutoffs, 0);
        assert_eq!(unfolding.stats.markings_visited, 2);
    }

    #[test]
    fn source_transition_is_reported_unbounded() {
        let net = net(vec![vec![-1, 1]], vec![1]);
        let err = Unfolder::new(&net, UnfoldConfig::default()).run().unwrap_err();
        match err {
            UnfoldError::Unbounded(UnboundedExplorationError::Covering {
                transition,
                ancestor,
                marking,
            }) => {
                assert_eq!(transition, "t2");
                assert_eq!(ancestor, Marking::from(vec![1]));
                assert_eq!(marking, Marking::from(vec![2]));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn step_limit_aborts_when_detection_is_off() {
        let net = net(vec![vec![-1, 1]], vec![1]);
        let config = UnfoldConfig {
            detect_unbounded: false,
            step_limit: Some(50),
            ..UnfoldConfig::default()
        };
        let err = Unfolder::new(&net, config).run().unwrap_err();
        assert!(matches!(
            err,
            UnfoldError::Unbounded(UnboundedExplorationError::StepLimit { limit: 50 })
        ));
    }

    #[test]
    fn place_limit_aborts_growth() {
        let net = cycle();
        let config = UnfoldConfig {
            place_limit: Some(2),
            ..UnfoldConfig::default()
        };
        let err = Unfolder::new(&net, config).run().unwrap_err();
        assert!(matches!(
            err,
            UnfoldError::Unbounded(UnboundedExplorationError::PlaceLimit { limit: 2 })
        ));
    }

    #[test]
    fn cutoff_duplicates_every_gaining_place_with_template_weights() {
        // t1: p1 -> 2*p2 + p3, t2: 2*p2 + p3 -> p1
        let net = net(vec![vec![-1, 1], vec![2, -2], vec![1, -1]], vec![1, 0, 0]);
        let unfolding = Unfolder::new(&net, UnfoldConfig::default()).run().unwrap();

        assert_eq!(unfolding.places.as_slice(), &["p1", "p2", "p3", "p1(1)"]);
        assert_eq!(unfolding.transitions.as_slice(), &["t1", "t2", "t2(1)"]);
        let event = EventId::new(2);
        assert_eq!(unfolding.matrix.column(event).into_vec(), vec![0, -2, -1, 1]);
        assert_eq!(unfolding.marking.as_slice(), &[1, 0, 0, 0]);
    }

    #[test]
    fn repeated_cutoffs_number_duplicates_upwards() {
        // Two independent loops sharing a token: t1/t2 via p2, t3/t4 via p3.
        let net = net(
            vec![vec![-1, 1, -1, 1], vec![1, -1, 0, 0], vec![0, 0, 1, -1]],
            vec![1, 0, 0],
        );
        let unfolding = Unfolder::new(&net, UnfoldConfig::default()).run().unwrap();

        assert_eq!(
            unfolding.places.as_slice(),
            &["p1", "p2", "p3", "p1(1)", "p1(2)"]
        );
        assert_eq!(
            unfolding.transitions.as_slice(),
            &["t1", "t2", "t3", "t4", "t2(1)", "t4(1)"]
        );
        assert_eq!(unfolding.stats.cutoffs, 2);
    }

    #[test]
    fn same_marking_on_different_paths_is_not_a_cycle() {
        // Separate consumers of p1 and p2 reach [0,0,0] and [0,0,1] along several paths.
        let net = net(
            vec![vec![-1, 0, 0, -1], vec![0, -1, -1, 0], vec![0, 0, 1, 1]],
            vec![1, 1, 0],
        );
        let mut unfolder = Unfolder::new(&net, UnfoldConfig::default());
        let steps = drive(&mut unfolder);
        assert!(steps.iter().all(|step| !matches!(step, Step::Cutoff { .. })));
        let advanced = steps
            .iter()
            .filter(|step| matches!(step, Step::Advanced { .. }))
            .count();
        assert!(advanced > unfolder.stats().markings_visited - 1);
    }

    #[test]
    fn reachable_seed_grows_rows_and_columns_on_first_occurrence() {
        let net = cycle();
        let config = UnfoldConfig {
            seed: SeedPolicy::Reachable,
            ..UnfoldConfig::default()
        };
        let mut unfolder = Unfolder::new(&net, config);
        assert_eq!(unfolder.extension().places_len(), 1);
        assert_eq!(unfolder.extension().transitions_len(), 0);

        drive(&mut unfolder);
        let extension = unfolder.extension();
        assert_eq!(extension.places().as_slice(), &["p1", "p2", "p1(1)"]);
        assert_eq!(extension.transitions().as_slice(), &["t1", "t2(1)"]);
        assert_eq!(
            extension.matrix().to_nested_vec(),
            vec![vec![-1, 0], vec![1, -1], vec![0, 1]]
        );
        assert_eq!(extension.condition_of(PlaceId::new(1)), Some(ConditionId::new(1)));
    }

    #[test]
    fn sweep_resumes_from_marking_with_never_fired_transition() {
        let net = cycle();
        let mut unfolder = Unfolder::new(&net, UnfoldConfig::default());
        // Leave the root without trying anything, as an exhausted path would.
        unfolder.history.clear();
        unfolder.cursors.clear();

        assert_eq!(
            unfolder.step().unwrap(),
            Step::Resumed {
                from: Marking::from(vec![1, 0])
            }
        );
        let steps = drive(&mut unfolder);
        assert!(matches!(steps[0], Step::Advanced { .. }));
        assert_eq!(unfolder.stats().resumptions, 1);
        assert_eq!(unfolder.never_fired().count(), 0);
    }

    #[test]
    fn exploration_graph_records_cutoff_back_edge() {
        let net = cycle();
        let config = UnfoldConfig {
            record_graph: true,
            ..UnfoldConfig::default()
        };
        let unfolding = Unfolder::new(&net, config).run().unwrap();
        let graph = unfolding.graph.as_ref().unwrap();
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.cutoff_count(), 1);
    }
}
