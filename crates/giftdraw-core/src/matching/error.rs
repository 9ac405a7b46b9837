//! Error types for the matching engine.

use thiserror::Error;

use crate::matching::participant::ParticipantId;

/// Input rejected before any graph is built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    /// Self-assignment is forbidden, so 0 or 1 participants can never be matched.
    #[error("at least 2 participants are required, got {count}")]
    TooFewParticipants { count: usize },

    /// A participant record carries no usable identity.
    #[error("participant at position {position} has no id")]
    MissingId { position: usize },

    /// The same identity appears twice in the participant list.
    #[error("participant id {id} appears more than once")]
    DuplicateId { id: ParticipantId },
}

/// The emitted assignment broke one of its post-conditions.
///
/// Never expected from a correct solver; surfaces as a hard failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("assignment has {actual} pairs, expected {expected}")]
    WrongPairCount { expected: usize, actual: usize },

    #[error("giver {giver} was left without a recipient")]
    UnmatchedGiver { giver: ParticipantId },

    #[error("{id} is not a participant")]
    UnknownParticipant { id: ParticipantId },

    #[error("giver {giver} appears in more than one pair")]
    DuplicateGiver { giver: ParticipantId },

    #[error("recipient {recipient} is assigned to more than one giver")]
    DuplicateRecipient { recipient: ParticipantId },

    #[error("giver {giver} is assigned to themself")]
    SelfAssignment { giver: ParticipantId },

    #[error("giver {giver} is assigned excluded recipient {recipient}")]
    ExcludedRecipient {
        giver: ParticipantId,
        recipient: ParticipantId,
    },
}

/// Errors produced by [`crate::matching::engine::solve`].
///
/// Infeasibility is not an error; it is reported as
/// [`crate::matching::engine::Outcome::Infeasible`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("invalid input: {0}")]
    Input(#[from] InputError),

    #[error("internal invariant violated: {0}")]
    Invariant(#[from] InvariantViolation),
}

/// Convenience result alias.
pub type EngineResult<T> = std::result::Result<T, EngineError>;
