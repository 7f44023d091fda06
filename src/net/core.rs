//! 运行时: 网模型构造校验、可发生判定与发生语义.
use std::fmt::{self, Write as FmtWrite};

use thiserror::Error;

use crate::net::ids::{PlaceId, TransitionId};
use crate::net::incidence::{Incidence, SmallRow};
use crate::net::index_vec::{Idx, IndexVec};
use crate::net::structure::{Delta, Marking, Template, Weight};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedNetError {
    #[error("incidence matrix has no places or no transitions")]
    EmptyMatrix,
    #[error("matrix row {row} has {found} entries, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("initial marking has {found} entries but the net has {expected} places")]
    MarkingLength { expected: usize, found: usize },
    #[error("initial marking holds a negative token count {tokens} at place {place}")]
    NegativeTokens { place: usize, tokens: i64 },
}

/// Immutable input net: incidence matrix, initial marking and node names.
#[derive(Clone)]
pub struct Net {
    places: IndexVec<PlaceId, String>,
    transitions: IndexVec<TransitionId, String>,
    incidence: Incidence<PlaceId, TransitionId, Delta>,
    templates: IndexVec<TransitionId, Template>,
    initial: Marking,
}

impl fmt::Debug for Net {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Net")
            .field("places", &self.places)
            .field("transitions", &self.transitions)
            .field("incidence", &self.incidence)
            .field("initial", &self.initial)
            .finish()
    }
}

impl Net {
    /// Validates `matrix` (rows = places, columns = transitions) against
    /// `initial_marking` and names nodes `p1..pn` / `t1..tm`.
    pub fn new(matrix: Vec<Vec<Delta>>, initial_marking: Vec<i64>) -> Result<Self, MalformedNetError> {
        let cols = matrix.first().map(Vec::len).unwrap_or_default();
        if matrix.is_empty() || cols == 0 {
            return Err(MalformedNetError::EmptyMatrix);
        }
        if let Some((row, found)) = matrix
            .iter()
            .map(Vec::len)
            .enumerate()
            .find(|(_, len)| *len != cols)
        {
            return Err(MalformedNetError::RaggedRow {
                row,
                expected: cols,
                found,
            });
        }
        if initial_marking.len() != matrix.len() {
            return Err(MalformedNetError::MarkingLength {
                expected: matrix.len(),
                found: initial_marking.len(),
            });
        }

        let mut tokens = Vec::with_capacity(initial_marking.len());
        for (place, value) in initial_marking.into_iter().enumerate() {
            let weight = Weight::try_from(value)
                .map_err(|_| MalformedNetError::NegativeTokens { place, tokens: value })?;
            tokens.push(weight);
        }

        let places = (1..=matrix.len()).map(|i| format!("p{i}")).collect();
        let transitions = (1..=cols).map(|j| format!("t{j}")).collect();
        let incidence = Incidence::from_rows(
            matrix
                .into_iter()
                .map(SmallRow::from_vec)
                .collect::<IndexVec<PlaceId, _>>(),
        );
        let templates = (0..cols)
            .map(|t| Template(incidence.column(TransitionId::from_usize(t))))
            .collect();

        Ok(Self {
            places,
            transitions,
            incidence,
            templates,
            initial: Marking::from(tokens),
        })
    }

    pub fn places_len(&self) -> usize {
        self.places.len()
    }

    pub fn transitions_len(&self) -> usize {
        self.transitions.len()
    }

    pub fn places(&self) -> &IndexVec<PlaceId, String> {
        &self.places
    }

    pub fn transitions(&self) -> &IndexVec<TransitionId, String> {
        &self.transitions
    }

    pub fn place_name(&self, place: PlaceId) -> &str {
        &self.places[place]
    }

    pub fn transition_name(&self, transition: TransitionId) -> &str {
        &self.transitions[transition]
    }

    pub fn template(&self, transition: TransitionId) -> &Template {
        &self.templates[transition]
    }

    pub fn incidence(&self) -> &Incidence<PlaceId, TransitionId, Delta> {
        &self.incidence
    }

    pub fn initial_marking(&self) -> &Marking {
        &self.initial
    }

    pub fn enabled_transitions(&self, marking: &Marking) -> Vec<TransitionId> {
        self.templates
            .iter_enumerated()
            .filter(|(_, template)| is_enabled(marking, template))
            .map(|(transition, _)| transition)
            .collect()
    }

    /// Renders the matrix one place per line, for console output.
    pub fn render_matrix(&self) -> String {
        let mut out = String::new();
        for row in self.incidence.rows().iter() {
            let _ = writeln!(&mut out, "{}", itertools::join(row.iter(), " "));
        }
        out
    }
}

/// A transition may fire iff every place it consumes from holds enough tokens.
///
/// Positive and zero entries impose no precondition: there is no capacity
/// bound on places.
pub fn is_enabled(marking: &Marking, template: &Template) -> bool {
    template
        .consumed()
        .all(|(place, needed)| marking.tokens(place) >= needed)
}

/// Applies the template's deltas; the caller has checked enabledness.
pub fn fire(marking: &Marking, template: &Template) -> Marking {
    debug_assert!(is_enabled(marking, template));
    let mut next = marking.clone();
    for (place, delta) in template.iter() {
        let tokens = next.tokens_mut(place);
        *tokens = tokens.saturating_add_signed(delta);
    }
    next
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cycle() -> Net {
        Net::new(vec![vec![-1, 1], vec![1, -1]], vec![1, 0]).unwrap()
    }

    #[test]
    fn new_names_nodes_and_extracts_templates() {
        let net = cycle();
        assert_eq!(net.places().as_slice(), &["p1", "p2"]);
        assert_eq!(net.transitions().as_slice(), &["t1", "t2"]);
        assert_eq!(net.template(TransitionId::new(0)), &Template::from(vec![-1, 1]));
        assert_eq!(net.template(TransitionId::new(1)), &Template::from(vec![1, -1]));
        assert_eq!(net.initial_marking(), &Marking::from(vec![1, 0]));
    }

    #[test]
    fn new_rejects_malformed_input() {
        assert_eq!(
            Net::new(vec![vec![-1, 1], vec![1]], vec![1, 0]).unwrap_err(),
            MalformedNetError::RaggedRow {
                row: 1,
                expected: 2,
                found: 1
            }
        );
        assert_eq!(
            Net::new(vec![], vec![]).unwrap_err(),
            MalformedNetError::EmptyMatrix
        );
        assert_eq!(
            Net::new(vec![vec![]], vec![0]).unwrap_err(),
            MalformedNetError::EmptyMatrix
        );
        assert_eq!(
            Net::new(vec![vec![-1]], vec![1, 0]).unwrap_err(),
            MalformedNetError::MarkingLength {
                expected: 1,
                found: 2
            }
        );
        assert_eq!(
            Net::new(vec![vec![-1]], vec![-3]).unwrap_err(),
            MalformedNetError::NegativeTokens {
                place: 0,
                tokens: -3
            }
        );
    }

    #[test]
    fn enabledness_matches_non_negative_firing() {
        let templates = [
            Template::from(vec![-1, 0, 2]),
            Template::from(vec![-2, -1, 0]),
            Template::from(vec![0, 0, 1]),
            Template::from(vec![-3, 1, -1]),
        ];
        for a in 0..4i64 {
            for b in 0..3i64 {
                for c in 0..3i64 {
                    let marking = Marking::from(vec![a as u64, b as u64, c as u64]);
                    for template in &templates {
                        let stays_non_negative = [a, b, c]
                            .iter()
                            .zip(template.0.iter())
                            .all(|(tokens, delta)| tokens + delta >= 0);
                        assert_eq!(is_enabled(&marking, template), stays_non_negative);
                    }
                }
            }
        }
    }

    #[test]
    fn fire_adds_deltas_and_keeps_length() {
        let net = cycle();
        let next = fire(net.initial_marking(), net.template(TransitionId::new(0)));
        assert_eq!(next, Marking::from(vec![0, 1]));
        assert_eq!(next.len(), net.places_len());
    }

    #[test]
    fn enabled_transitions_in_identifier_order() {
        let net = Net::new(vec![vec![-1, -1, 1]], vec![1]).unwrap();
        assert_eq!(
            net.enabled_transitions(net.initial_marking()),
            vec![TransitionId::new(0), TransitionId::new(1), TransitionId::new(2)]
        );
        let empty = Marking::from(vec![0]);
        assert_eq!(net.enabled_transitions(&empty), vec![TransitionId::new(2)]);
    }
}
