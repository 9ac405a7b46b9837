//! Single entry point: participants in, assignment or diagnosis out.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::matching::assignment::{self, Assignment};
use crate::matching::diagnosis::{self, Diagnosis};
use crate::matching::error::EngineResult;
use crate::matching::graph::EligibilityGraph;
use crate::matching::hopcroft_karp::maximum_matching;
use crate::matching::participant::Participant;

/// Result of a successful engine run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    /// Every participant gives exactly once and receives exactly once.
    Matched(Assignment),
    /// No valid draw exists for these participants.
    Infeasible(Diagnosis),
}

impl Outcome {
    pub fn is_matched(&self) -> bool {
        matches!(self, Outcome::Matched(_))
    }

    pub fn assignment(&self) -> Option<&Assignment> {
        match self {
            Outcome::Matched(a) => Some(a),
            Outcome::Infeasible(_) => None,
        }
    }

    pub fn diagnosis(&self) -> Option<&Diagnosis> {
        match self {
            Outcome::Matched(_) => None,
            Outcome::Infeasible(d) => Some(d),
        }
    }
}

/// Run the full pipeline: build the graph, find a maximum matching, then
/// emit the assignment or explain why none exists.
///
/// Pure and deterministic. Errors only on malformed input or on a broken
/// post-condition; infeasibility is an [`Outcome`], not an error.
#[instrument(skip_all, fields(participants = participants.len()))]
pub fn solve(participants: &[Participant]) -> EngineResult<Outcome> {
    let graph = EligibilityGraph::build(participants)?;
    solve_graph(participants, &graph)
}

/// Same as [`solve`] over a graph already built from `participants`.
pub fn solve_graph(
    participants: &[Participant],
    graph: &EligibilityGraph,
) -> EngineResult<Outcome> {
    let matching = maximum_matching(graph);

    if matching.is_perfect() {
        let assignment = assignment::emit(participants, graph, &matching)?;
        debug!(pairs = assignment.len(), "draw matched");
        Ok(Outcome::Matched(assignment))
    } else {
        let diagnosis = diagnosis::diagnose(participants, graph, &matching);
        debug!(
            matched = diagnosis.matched_count,
            deficit = diagnosis.hall_deficit(),
            "draw infeasible"
        );
        Ok(Outcome::Infeasible(diagnosis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::error::{EngineError, InputError};

    #[test]
    fn test_solve_matches_two_people() {
        let outcome = solve(&[Participant::new("a"), Participant::new("b")]).unwrap();
        let a = outcome.assignment().unwrap();
        assert_eq!(a.recipient_of("a").unwrap().as_str(), "b");
        assert_eq!(a.recipient_of("b").unwrap().as_str(), "a");
        assert!(outcome.diagnosis().is_none());
    }

    #[test]
    fn test_solve_reports_infeasible_as_outcome() {
        let outcome = solve(&[
            Participant::new("a").with_exclusions(["b", "c"]),
            Participant::new("b"),
            Participant::new("c"),
        ])
        .unwrap();
        assert!(!outcome.is_matched());
        assert_eq!(outcome.diagnosis().unwrap().matched_count, 2);
    }

    #[test]
    fn test_solve_rejects_single_participant() {
        let err = solve(&[Participant::new("solo")]).unwrap_err();
        assert_eq!(
            err,
            EngineError::Input(InputError::TooFewParticipants { count: 1 })
        );
    }

    #[test]
    fn test_solve_graph_agrees_with_solve() {
        let people = [
            Participant::new("a").excluding("b"),
            Participant::new("b"),
            Participant::new("c"),
        ];
        let graph = EligibilityGraph::build(&people).unwrap();
        assert_eq!(solve_graph(&people, &graph).unwrap(), solve(&people).unwrap());
    }

    #[test]
    fn test_outcome_serializes_with_status_tag() {
        let outcome = solve(&[Participant::new("a"), Participant::new("b")]).unwrap();
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "matched");
    }
}
