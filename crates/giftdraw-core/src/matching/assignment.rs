//! Turning a perfect matching back into identity pairs.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::error;

use crate::matching::error::{EngineResult, InvariantViolation};
use crate::matching::graph::EligibilityGraph;
use crate::matching::hopcroft_karp::Matching;
use crate::matching::participant::{Participant, ParticipantId};

/// One giver → recipient assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pair {
    pub giver: ParticipantId,
    pub recipient: ParticipantId,
}

/// A complete draw: exactly one pair per participant, in input order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pairs: Vec<Pair>,
}

impl Assignment {
    /// Wrap existing pairs. Use [`Assignment::verify`] before trusting them.
    pub fn from_pairs(pairs: Vec<Pair>) -> Self {
        Self { pairs }
    }

    pub fn pairs(&self) -> &[Pair] {
        &self.pairs
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Pair> {
        self.pairs.iter()
    }

    pub fn into_pairs(self) -> Vec<Pair> {
        self.pairs
    }

    /// Recipient drawn for `giver`, if any.
    pub fn recipient_of(&self, giver: &str) -> Option<&ParticipantId> {
        self.pairs
            .iter()
            .find(|p| p.giver.as_str() == giver)
            .map(|p| &p.recipient)
    }

    /// Check every post-condition of a draw against its participants:
    /// one pair per participant, each giver and recipient used exactly once,
    /// nobody draws themself, and no declared exclusion is violated.
    pub fn verify(&self, participants: &[Participant]) -> Result<(), InvariantViolation> {
        if self.pairs.len() != participants.len() {
            return Err(InvariantViolation::WrongPairCount {
                expected: participants.len(),
                actual: self.pairs.len(),
            });
        }

        let by_id: HashMap<&ParticipantId, &Participant> =
            participants.iter().map(|p| (&p.id, p)).collect();
        let mut givers = HashSet::with_capacity(self.pairs.len());
        let mut recipients = HashSet::with_capacity(self.pairs.len());

        for pair in &self.pairs {
            let Some(giver) = by_id.get(&pair.giver) else {
                return Err(InvariantViolation::UnknownParticipant {
                    id: pair.giver.clone(),
                });
            };
            if !by_id.contains_key(&pair.recipient) {
                return Err(InvariantViolation::UnknownParticipant {
                    id: pair.recipient.clone(),
                });
            }
            if !givers.insert(&pair.giver) {
                return Err(InvariantViolation::DuplicateGiver {
                    giver: pair.giver.clone(),
                });
            }
            if !recipients.insert(&pair.recipient) {
                return Err(InvariantViolation::DuplicateRecipient {
                    recipient: pair.recipient.clone(),
                });
            }
            if pair.giver == pair.recipient {
                return Err(InvariantViolation::SelfAssignment {
                    giver: pair.giver.clone(),
                });
            }
            if giver.excluded.contains(&pair.recipient) {
                return Err(InvariantViolation::ExcludedRecipient {
                    giver: pair.giver.clone(),
                    recipient: pair.recipient.clone(),
                });
            }
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a Assignment {
    type Item = &'a Pair;
    type IntoIter = std::slice::Iter<'a, Pair>;

    fn into_iter(self) -> Self::IntoIter {
        self.pairs.iter()
    }
}

/// Translate a perfect matching into identity pairs and verify them.
///
/// Any failure here means the solver produced something it must not have;
/// it is logged at error level and returned as an invariant violation.
pub fn emit(
    participants: &[Participant],
    graph: &EligibilityGraph,
    matching: &Matching,
) -> EngineResult<Assignment> {
    let mut pairs = Vec::with_capacity(graph.len());
    for giver in 0..graph.len() {
        let Some(recipient) = matching.recipient_of(giver) else {
            let violation = InvariantViolation::UnmatchedGiver {
                giver: graph.id(giver).clone(),
            };
            error!(error = %violation, "assignment emission failed");
            return Err(violation.into());
        };
        pairs.push(Pair {
            giver: graph.id(giver).clone(),
            recipient: graph.id(recipient).clone(),
        });
    }

    let assignment = Assignment { pairs };
    if let Err(violation) = assignment.verify(participants) {
        error!(error = %violation, "assignment failed post-check");
        return Err(violation.into());
    }
    Ok(assignment)
}
