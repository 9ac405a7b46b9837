//! Explaining why no perfect matching exists.
//!
//! Given a maximum matching that is not perfect, an alternating BFS from the
//! unmatched givers (any edge giver → recipient, then only the matching edge
//! recipient → giver) reaches a set `S` of givers whose combined eligible
//! recipients `N(S)` are all matched to other givers in `S`. Hence
//! `|N(S)| = |S| - unmatched < |S|`: a Hall violator.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::matching::graph::EligibilityGraph;
use crate::matching::hopcroft_karp::Matching;
use crate::matching::participant::{Participant, ParticipantId};

/// Why a draw cannot be completed, in terms an operator can act on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnosis {
    pub participant_count: usize,
    /// Size of the maximum matching; always below `participant_count`.
    pub matched_count: usize,
    /// `S`: givers that together have too few eligible recipients.
    pub violator_set: BTreeSet<ParticipantId>,
    /// `N(S)`: every recipient eligible for at least one giver in `S`.
    pub reachable_recipients: BTreeSet<ParticipantId>,
    /// Givers with no eligible recipient at all, in input order.
    pub zero_option_givers: Vec<ParticipantId>,
    /// Eligible recipients of every giver.
    pub per_giver_options: BTreeMap<ParticipantId, Vec<ParticipantId>>,
    /// Declared exclusions of every giver that has any.
    pub exclusions: BTreeMap<ParticipantId, Vec<ParticipantId>>,
}

impl Diagnosis {
    /// `|S| - |N(S)|`; at least 1 for any real infeasibility.
    pub fn hall_deficit(&self) -> usize {
        self.violator_set
            .len()
            .saturating_sub(self.reachable_recipients.len())
    }

    /// Number of givers left without a recipient by the best matching.
    pub fn unmatched_count(&self) -> usize {
        self.participant_count - self.matched_count
    }
}

/// Build the diagnosis for a maximum matching that is not perfect.
#[instrument(skip_all, fields(participants = graph.len(), matched = matching.size()))]
pub fn diagnose(
    participants: &[Participant],
    graph: &EligibilityGraph,
    matching: &Matching,
) -> Diagnosis {
    let n = graph.len();
    let mut giver_seen = vec![false; n];
    let mut recipient_seen = vec![false; n];
    let mut queue = VecDeque::new();

    for giver in matching.unmatched_givers() {
        giver_seen[giver] = true;
        queue.push_back(giver);
    }
    while let Some(giver) = queue.pop_front() {
        for &recipient in graph.eligible(giver) {
            if recipient_seen[recipient] {
                continue;
            }
            recipient_seen[recipient] = true;
            if let Some(holder) = matching.giver_of(recipient) {
                if !giver_seen[holder] {
                    giver_seen[holder] = true;
                    queue.push_back(holder);
                }
            }
        }
    }

    let violators: Vec<usize> = (0..n).filter(|&g| giver_seen[g]).collect();
    let reachable = graph.neighborhood(&violators);

    let zero_option_givers: Vec<ParticipantId> = (0..n)
        .filter(|&g| graph.eligible(g).is_empty())
        .map(|g| graph.id(g).clone())
        .collect();

    let exclusions = participants
        .iter()
        .filter(|p| !p.excluded.is_empty())
        .map(|p| (p.id.clone(), p.excluded.iter().cloned().collect()))
        .collect();

    let diagnosis = Diagnosis {
        participant_count: n,
        matched_count: matching.size(),
        violator_set: violators.iter().map(|&g| graph.id(g).clone()).collect(),
        reachable_recipients: reachable.iter().map(|&r| graph.id(r).clone()).collect(),
        zero_option_givers,
        per_giver_options: graph.options_by_giver(),
        exclusions,
    };
    debug!(
        violators = diagnosis.violator_set.len(),
        reachable = diagnosis.reachable_recipients.len(),
        zero_option = diagnosis.zero_option_givers.len(),
        "hall violator computed"
    );
    diagnosis
}
