//! Constrained perfect matching for gift exchange draws.
//!
//! Provides:
//! - [`graph::EligibilityGraph`] - giver → recipient eligibility over dense indices
//! - [`hopcroft_karp::maximum_matching`] - maximum bipartite matching in O(E·√V)
//! - [`assignment::emit`] / [`assignment::Assignment::verify`] - verified identity pairs
//! - [`diagnosis::diagnose`] - Hall violator explaining an infeasible draw
//! - [`engine::solve`] - the whole pipeline in one call
//!
//! ## Quick start
//!
//! ```rust
//! use giftdraw_core::matching::{solve, Outcome, Participant};
//!
//! let people = vec![
//!     Participant::new("ana").excluding("ben"),
//!     Participant::new("ben").excluding("ana"),
//!     Participant::new("cy"),
//!     Participant::new("dee"),
//! ];
//! match solve(&people).unwrap() {
//!     Outcome::Matched(assignment) => assert_eq!(assignment.len(), 4),
//!     Outcome::Infeasible(diagnosis) => panic!("{diagnosis:?}"),
//! }
//! ```

pub mod assignment;
pub mod diagnosis;
pub mod engine;
pub mod error;
pub mod graph;
pub mod hopcroft_karp;
pub mod participant;

pub use assignment::{Assignment, Pair};
pub use diagnosis::{diagnose, Diagnosis};
pub use engine::{solve, solve_graph, Outcome};
pub use error::{EngineError, EngineResult, InputError, InvariantViolation};
pub use graph::EligibilityGraph;
pub use hopcroft_karp::{maximum_matching, Matching};
pub use participant::{Participant, ParticipantId};
