//! Maximum bipartite matching (Hopcroft–Karp).
//!
//! Each phase layers the graph with a BFS from every unmatched giver, then
//! augments along vertex-disjoint shortest alternating paths with a DFS that
//! only steps from layer `L` to layer `L + 1`. The loop stops when a BFS
//! reaches no unmatched recipient, at which point the matching is maximum.
//! Total work is O(E·√V).

use std::collections::VecDeque;

use tracing::{debug, instrument};

use crate::matching::graph::EligibilityGraph;

const UNLAYERED: usize = usize::MAX;

/// A (possibly partial) giver ↔ recipient matching over dense indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matching {
    giver_to_recipient: Vec<Option<usize>>,
    recipient_to_giver: Vec<Option<usize>>,
    size: usize,
}

impl Matching {
    fn empty(n: usize) -> Self {
        Self {
            giver_to_recipient: vec![None; n],
            recipient_to_giver: vec![None; n],
            size: 0,
        }
    }

    fn link(&mut self, giver: usize, recipient: usize) {
        self.giver_to_recipient[giver] = Some(recipient);
        self.recipient_to_giver[recipient] = Some(giver);
    }

    /// Number of matched pairs.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of givers (and recipients) the matching ranges over.
    pub fn participant_count(&self) -> usize {
        self.giver_to_recipient.len()
    }

    /// Every giver has a recipient, and so every recipient has a giver.
    pub fn is_perfect(&self) -> bool {
        self.size == self.participant_count()
    }

    pub fn recipient_of(&self, giver: usize) -> Option<usize> {
        self.giver_to_recipient[giver]
    }

    pub fn giver_of(&self, recipient: usize) -> Option<usize> {
        self.recipient_to_giver[recipient]
    }

    /// Givers without a recipient, ascending.
    pub fn unmatched_givers(&self) -> impl Iterator<Item = usize> + '_ {
        self.giver_to_recipient
            .iter()
            .enumerate()
            .filter(|(_, r)| r.is_none())
            .map(|(g, _)| g)
    }
}

/// Compute a maximum matching of `graph`.
///
/// Deterministic: the same graph always yields the same matching.
#[instrument(skip_all, fields(participants = graph.len(), edges = graph.edge_count()))]
pub fn maximum_matching(graph: &EligibilityGraph) -> Matching {
    let mut matching = Matching::empty(graph.len());
    let mut layer = vec![UNLAYERED; graph.len()];
    let mut phase = 0usize;

    while build_layers(graph, &matching, &mut layer) {
        phase += 1;
        let mut augmented = 0usize;
        for giver in 0..graph.len() {
            if matching.recipient_of(giver).is_none()
                && augment(graph, &mut matching, &mut layer, giver)
            {
                matching.size += 1;
                augmented += 1;
            }
        }
        debug!(phase, augmented, size = matching.size, "matching phase complete");
    }

    debug!(phases = phase, size = matching.size, "maximum matching found");
    matching
}

/// BFS layering from all unmatched givers. Returns whether any unmatched
/// recipient is reachable, i.e. whether an augmenting path exists.
fn build_layers(graph: &EligibilityGraph, matching: &Matching, layer: &mut [usize]) -> bool {
    let mut queue = VecDeque::new();
    for (giver, l) in layer.iter_mut().enumerate() {
        if matching.recipient_of(giver).is_none() {
            *l = 0;
            queue.push_back(giver);
        } else {
            *l = UNLAYERED;
        }
    }

    let mut reached_free = false;
    while let Some(giver) = queue.pop_front() {
        for &recipient in graph.eligible(giver) {
            match matching.giver_of(recipient) {
                None => reached_free = true,
                Some(holder) if layer[holder] == UNLAYERED => {
                    layer[holder] = layer[giver] + 1;
                    queue.push_back(holder);
                }
                Some(_) => {}
            }
        }
    }
    reached_free
}

/// Layered DFS from `giver`. On success the path is flipped into the
/// matching; on failure `giver` is removed from this phase.
fn augment(
    graph: &EligibilityGraph,
    matching: &mut Matching,
    layer: &mut [usize],
    giver: usize,
) -> bool {
    // A free recipient ends the path right here.
    if let Some(&recipient) = graph
        .eligible(giver)
        .iter()
        .find(|&&r| matching.giver_of(r).is_none())
    {
        matching.link(giver, recipient);
        return true;
    }

    let next = layer[giver] + 1;
    for &recipient in graph.eligible(giver) {
        let Some(holder) = matching.giver_of(recipient) else {
            continue;
        };
        if layer[holder] == next && augment(graph, matching, layer, holder) {
            matching.link(giver, recipient);
            return true;
        }
    }

    layer[giver] = UNLAYERED;
    false
}
