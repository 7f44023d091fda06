//! P/T 网静态结构元素：标识（marking）与迁移模板列。
use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::net::ids::PlaceId;
use crate::net::index_vec::IndexVec;

/// Token count held by one place.
pub type Weight = u64;
/// Signed net effect of one transition on one place.
pub type Delta = i64;

#[derive(Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Marking(pub IndexVec<PlaceId, Weight>);

impl Marking {
    pub fn new(initial: IndexVec<PlaceId, Weight>) -> Self {
        Self(initial)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (PlaceId, &Weight)> + '_ {
        self.0.iter_enumerated()
    }

    pub fn tokens(&self, place: PlaceId) -> Weight {
        self.0[place]
    }

    pub fn tokens_mut(&mut self, place: PlaceId) -> &mut Weight {
        &mut self.0[place]
    }

    /// `self` covers `other` and differs from it in at least one place.
    pub fn strictly_covers(&self, other: &Marking) -> bool {
        matches!(self.partial_cmp(other), Some(Ordering::Greater))
    }

    pub fn into_inner(self) -> IndexVec<PlaceId, Weight> {
        self.0
    }
}

impl From<Vec<Weight>> for Marking {
    fn from(value: Vec<Weight>) -> Self {
        Self(IndexVec::from(value))
    }
}

impl fmt::Debug for Marking {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.0.iter()).finish()
    }
}

/// Componentwise covering order; markings of different length are incomparable.
impl PartialOrd for Marking {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self.len() != other.len() {
            return None;
        }
        let mut less = false;
        let mut greater = false;
        for (idx, left) in self.0.iter_enumerated() {
            let right = other.0[idx];
            if left < &right {
                less = true;
            } else if left > &right {
                greater = true;
            }
        }
        match (less, greater) {
            (true, true) => None,
            (true, false) => Some(Ordering::Less),
            (false, true) => Some(Ordering::Greater),
            (false, false) => Some(Ordering::Equal),
        }
    }
}

/// Column of the input incidence matrix for one transition.
///
/// Every occurrence of the transition in the unfolding (duplicates included)
/// reads its enabledness and token deltas from this column.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Template(pub IndexVec<PlaceId, Delta>);

impl Template {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn delta(&self, place: PlaceId) -> Delta {
        self.0[place]
    }

    pub fn iter(&self) -> impl Iterator<Item = (PlaceId, Delta)> + '_ {
        self.0.iter_enumerated().map(|(place, delta)| (place, *delta))
    }

    /// Places this transition takes tokens from, with the amount taken.
    pub fn consumed(&self) -> impl Iterator<Item = (PlaceId, Weight)> + '_ {
        self.iter()
            .filter(|(_, delta)| *delta < 0)
            .map(|(place, delta)| (place, delta.unsigned_abs()))
    }

    /// Places this transition puts tokens into, with the amount put.
    pub fn produced(&self) -> impl Iterator<Item = (PlaceId, Weight)> + '_ {
        self.iter()
            .filter(|(_, delta)| *delta > 0)
            .map(|(place, delta)| (place, delta.unsigned_abs()))
    }
}

impl From<Vec<Delta>> for Template {
    fn from(value: Vec<Delta>) -> Self {
        Self(IndexVec::from(value))
    }
}

impl fmt::Debug for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.0.iter()).finish()
    }
}
