//! 展开结构构造器：所有行/列增长都经由 `append_place` / `append_transition`。
use serde::{Deserialize, Serialize};

use crate::net::ids::{ConditionId, EventId, PlaceId, TransitionId};
use crate::net::incidence::Incidence;
use crate::net::index_vec::IndexVec;
use crate::net::structure::Delta;
use crate::net::Net;

/// Which node of the input net a row or column of the unfolding stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Origin<I> {
    Original(I),
    Duplicate { original: I, index: u32 },
}

impl<I: Copy> Origin<I> {
    pub fn original(&self) -> I {
        match *self {
            Origin::Original(id) | Origin::Duplicate { original: id, .. } => id,
        }
    }

    pub fn is_duplicate(&self) -> bool {
        matches!(self, Origin::Duplicate { .. })
    }
}

pub type ConditionOrigin = Origin<PlaceId>;
pub type EventOrigin = Origin<TransitionId>;

/// Starting content of the unfolded structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeedPolicy {
    /// Start from a copy of the input net.
    #[default]
    Input,
    /// Start from the initially marked places only; columns and further rows
    /// appear as exploration first reaches them.
    Reachable,
}

/// The growing output: matrix plus the name and origin of every row/column.
#[derive(Debug, Clone)]
pub struct Extension {
    places: IndexVec<ConditionId, String>,
    transitions: IndexVec<EventId, String>,
    matrix: Incidence<ConditionId, EventId, Delta>,
    condition_origins: IndexVec<ConditionId, ConditionOrigin>,
    event_origins: IndexVec<EventId, EventOrigin>,
    /// Row recording each original place, once there is one.
    place_rows: IndexVec<PlaceId, Option<ConditionId>>,
    /// Column recording each original transition, once there is one.
    transition_cols: IndexVec<TransitionId, Option<EventId>>,
}

impl Extension {
    fn empty(net: &Net) -> Self {
        Self {
            places: IndexVec::new(),
            transitions: IndexVec::new(),
            matrix: Incidence::new(0, 0, 0),
            condition_origins: IndexVec::new(),
            event_origins: IndexVec::new(),
            place_rows: IndexVec::from_elem(None, net.places_len()),
            transition_cols: IndexVec::from_elem(None, net.transitions_len()),
        }
    }

    pub fn seeded(net: &Net, policy: SeedPolicy) -> Self {
        let mut extension = Self::empty(net);
        match policy {
            SeedPolicy::Input => {
                for place in net.places().indices() {
                    extension.record_place(net, place);
                }
                for transition in net.transitions().indices() {
                    extension.record_transition(net, transition);
                }
            }
            SeedPolicy::Reachable => {
                for (place, tokens) in net.initial_marking().iter() {
                    if *tokens > 0 {
                        extension.record_place(net, place);
                    }
                }
            }
        }
        extension
    }

    /// Appends `name` with an all-zero row; edge weights are set afterwards.
    pub fn append_place(&mut self, name: String, origin: ConditionOrigin) -> ConditionId {
        self.places.push(name);
        self.condition_origins.push(origin);
        let condition = self.matrix.push_row_with_default(0);
        debug_assert!(self.is_consistent());
        condition
    }

    /// Appends `name` with an all-zero column; edge weights are set afterwards.
    pub fn append_transition(&mut self, name: String, origin: EventOrigin) -> EventId {
        self.transitions.push(name);
        self.event_origins.push(origin);
        let event = self.matrix.push_column_with_default(0);
        debug_assert!(self.is_consistent());
        event
    }

    pub fn set_weight(&mut self, condition: ConditionId, event: EventId, delta: Delta) {
        self.matrix.set(condition, event, delta);
    }

    /// Row of original `place`, appending it when this is its first appearance.
    ///
    /// A fresh row receives the template weights of every original transition
    /// already recorded. Returns whether the row is new.
    pub fn record_place(&mut self, net: &Net, place: PlaceId) -> (ConditionId, bool) {
        if let Some(condition) = self.place_rows[place] {
            return (condition, false);
        }
        let condition =
            self.append_place(net.place_name(place).to_owned(), Origin::Original(place));
        self.place_rows[place] = Some(condition);
        for (transition, event) in self.transition_cols.iter_enumerated() {
            if let Some(event) = *event {
                let delta = net.template(transition).delta(place);
                self.matrix.set(condition, event, delta);
            }
        }
        (condition, true)
    }

    /// Column of original `transition`, appending it on its first occurrence.
    ///
    /// Weights are wired into the rows of recorded places only. Returns
    /// whether the column is new.
    pub fn record_transition(&mut self, net: &Net, transition: TransitionId) -> (EventId, bool) {
        if let Some(event) = self.transition_cols[transition] {
            return (event, false);
        }
        let event = self.append_transition(
            net.transition_name(transition).to_owned(),
            Origin::Original(transition),
        );
        self.transition_cols[transition] = Some(event);
        for (place, delta) in net.template(transition).iter() {
            if delta == 0 {
                continue;
            }
            if let Some(condition) = self.place_rows[place] {
                self.matrix.set(condition, event, delta);
            }
        }
        (event, true)
    }

    pub fn condition_of(&self, place: PlaceId) -> Option<ConditionId> {
        self.place_rows[place]
    }

    pub fn event_of(&self, transition: TransitionId) -> Option<EventId> {
        self.transition_cols[transition]
    }

    pub fn places(&self) -> &IndexVec<ConditionId, String> {
        &self.places
    }

    pub fn transitions(&self) -> &IndexVec<EventId, String> {
        &self.transitions
    }

    pub fn matrix(&self) -> &Incidence<ConditionId, EventId, Delta> {
        &self.matrix
    }

    pub fn condition_origins(&self) -> &IndexVec<ConditionId, ConditionOrigin> {
        &self.condition_origins
    }

    pub fn event_origins(&self) -> &IndexVec<EventId, EventOrigin> {
        &self.event_origins
    }

    pub fn places_len(&self) -> usize {
        self.places.len()
    }

    pub fn transitions_len(&self) -> usize {
        self.transitions.len()
    }

    /// Rows == place names, columns == transition names, every row full.
    pub fn is_consistent(&self) -> bool {
        self.matrix.rows_len() == self.places.len()
            && self.matrix.cols_len() == self.transitions.len()
            && self.condition_origins.len() == self.places.len()
            && self.event_origins.len() == self.transitions.len()
            && self.matrix.is_rectangular()
    }

    pub(crate) fn into_parts(
        self,
    ) -> (
        IndexVec<ConditionId, String>,
        IndexVec<EventId, String>,
        Incidence<ConditionId, EventId, Delta>,
        IndexVec<ConditionId, ConditionOrigin>,
        IndexVec<EventId, EventOrigin>,
    ) {
        (
            self.places,
            self.transitions,
            self.matrix,
            self.condition_origins,
            self.event_origins,
        )
    }
}
