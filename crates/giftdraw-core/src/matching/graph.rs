//! Giver → recipient eligibility as a bipartite graph over dense indices.
//!
//! Both sides of the graph are the same participant list. Index `i` on the
//! giver side and index `i` on the recipient side are the same person: the
//! participant at position `i` of the input. Identities are translated to
//! indices once, here; every algorithm downstream works on indices only.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use tracing::debug;

use crate::matching::error::{EngineResult, InputError};
use crate::matching::participant::{Participant, ParticipantId};

/// Bipartite eligibility graph.
///
/// `adjacency[g]` lists, in input order, every recipient index that giver
/// `g` may be assigned.
#[derive(Debug, Clone)]
pub struct EligibilityGraph {
    ids: Vec<ParticipantId>,
    index: HashMap<ParticipantId, usize>,
    adjacency: Vec<Vec<usize>>,
}

impl EligibilityGraph {
    /// Build the graph from participants in input order.
    ///
    /// Returns [`InputError`] for fewer than 2 participants, a blank id, or a
    /// duplicate id. Exclusions naming someone outside the list are ignored.
    pub fn build(participants: &[Participant]) -> EngineResult<Self> {
        if participants.len() < 2 {
            return Err(InputError::TooFewParticipants {
                count: participants.len(),
            }
            .into());
        }

        let mut ids = Vec::with_capacity(participants.len());
        let mut index = HashMap::with_capacity(participants.len());
        for (position, p) in participants.iter().enumerate() {
            if p.id.is_blank() {
                return Err(InputError::MissingId { position }.into());
            }
            if index.insert(p.id.clone(), position).is_some() {
                return Err(InputError::DuplicateId { id: p.id.clone() }.into());
            }
            ids.push(p.id.clone());
        }

        let adjacency: Vec<Vec<usize>> = participants
            .iter()
            .enumerate()
            .map(|(giver, p)| {
                let unknown = p
                    .excluded
                    .iter()
                    .filter(|x| !index.contains_key(*x))
                    .count();
                if unknown > 0 {
                    debug!(giver = %p.id, unknown, "ignoring exclusions of non-participants");
                }
                (0..ids.len())
                    .filter(|&r| r != giver && !p.excluded.contains(&ids[r]))
                    .collect()
            })
            .collect();

        let graph = Self {
            ids,
            index,
            adjacency,
        };
        debug!(
            participants = graph.len(),
            edges = graph.edge_count(),
            "eligibility graph built"
        );
        Ok(graph)
    }

    /// Number of participants (givers = recipients).
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Always false; a built graph has at least 2 participants.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Identity at a dense index.
    pub fn id(&self, index: usize) -> &ParticipantId {
        &self.ids[index]
    }

    /// Dense index of an identity.
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// Recipients giver `giver` may be assigned, in input order.
    pub fn eligible(&self, giver: usize) -> &[usize] {
        &self.adjacency[giver]
    }

    /// Total number of giver → recipient edges.
    pub fn edge_count(&self) -> usize {
        self.adjacency.iter().map(Vec::len).sum()
    }

    /// N(S): every recipient reachable from at least one giver in `givers`.
    pub fn neighborhood<'a>(&self, givers: impl IntoIterator<Item = &'a usize>) -> BTreeSet<usize> {
        givers
            .into_iter()
            .flat_map(|&g| self.adjacency[g].iter().copied())
            .collect()
    }

    /// Eligible recipients per giver, by identity.
    pub fn options_by_giver(&self) -> BTreeMap<ParticipantId, Vec<ParticipantId>> {
        self.adjacency
            .iter()
            .enumerate()
            .map(|(g, recipients)| {
                (
                    self.ids[g].clone(),
                    recipients.iter().map(|&r| self.ids[r].clone()).collect(),
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::error::EngineError;

    fn ids(graph: &EligibilityGraph, giver: usize) -> Vec<&str> {
        graph
            .eligible(giver)
            .iter()
            .map(|&r| graph.id(r).as_str())
            .collect()
    }

    #[test]
    fn test_self_is_never_eligible() {
        let g = EligibilityGraph::build(&[
            Participant::new("a"),
            Participant::new("b"),
            Participant::new("c"),
        ])
        .unwrap();
        assert_eq!(ids(&g, 0), vec!["b", "c"]);
        assert_eq!(ids(&g, 1), vec!["a", "c"]);
        assert_eq!(ids(&g, 2), vec!["a", "b"]);
        assert_eq!(g.edge_count(), 6);
    }

    #[test]
    fn test_exclusions_remove_edges_one_way() {
        let g = EligibilityGraph::build(&[
            Participant::new("a").excluding("b"),
            Participant::new("b"),
            Participant::new("c"),
        ])
        .unwrap();
        assert_eq!(ids(&g, 0), vec!["c"]);
        assert_eq!(ids(&g, 1), vec!["a", "c"], "b does not exclude a");
    }

    #[test]
    fn test_unknown_exclusions_are_ignored() {
        let g = EligibilityGraph::build(&[
            Participant::new("a").excluding("ghost"),
            Participant::new("b"),
        ])
        .unwrap();
        assert_eq!(ids(&g, 0), vec!["b"]);
    }

    #[test]
    fn test_fewer_than_two_participants_rejected() {
        for people in [vec![], vec![Participant::new("solo")]] {
            let err = EligibilityGraph::build(&people).unwrap_err();
            assert!(matches!(
                err,
                EngineError::Input(InputError::TooFewParticipants { .. })
            ));
        }
    }

    #[test]
    fn test_blank_id_rejected_with_position() {
        let err = EligibilityGraph::build(&[Participant::new("a"), Participant::new(" ")])
            .unwrap_err();
        assert_eq!(err, EngineError::Input(InputError::MissingId { position: 1 }));
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let err = EligibilityGraph::build(&[
            Participant::new("a"),
            Participant::new("b"),
            Participant::new("a"),
        ])
        .unwrap_err();
        assert_eq!(
            err,
            EngineError::Input(InputError::DuplicateId { id: "a".into() })
        );
    }

    #[test]
    fn test_index_round_trips_identity() {
        let g = EligibilityGraph::build(&[Participant::new(10u64), Participant::new(20u64)])
            .unwrap();
        let i = g.index_of("20").unwrap();
        assert_eq!(g.id(i).as_str(), "20");
        assert_eq!(g.index_of("30"), None);
    }

    #[test]
    fn test_neighborhood_is_union_of_adjacency() {
        let g = EligibilityGraph::build(&[
            Participant::new("a").excluding("c"),
            Participant::new("b").excluding("c"),
            Participant::new("c"),
        ])
        .unwrap();
        let n: Vec<usize> = g.neighborhood(&[0, 1]).into_iter().collect();
        assert_eq!(n, vec![0, 1]);
    }
}
