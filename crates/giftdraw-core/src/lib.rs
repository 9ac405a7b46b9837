//! giftdraw core library
//!
//! Gift-exchange draws as constrained perfect matching.
//!
//! ## Layer 1 - Engine and orchestration
//!
//! - [`matching`]: pure, deterministic engine. Participants with exclusions
//!   in; a verified assignment or a Hall-violator diagnosis out.
//! - [`draw`]: [`DrawService`] ties the engine to a participant source and a
//!   draw ledger from `draw-state`.
//! - [`failure_log`], [`obs`], [`metrics`], [`telemetry`]: audit trail,
//!   lifecycle events, counters and subscriber setup.

pub mod draw;
pub mod failure_log;
pub mod matching;
pub mod metrics;
pub mod obs;
pub mod telemetry;

pub use draw::{
    participants_from_snapshot, DrawError, DrawPlan, DrawResult, DrawService, DrawStatus,
    Inspection,
};
pub use failure_log::{FailureEntry, FailureLog};
pub use matching::{
    solve, Assignment, Diagnosis, EngineError, EngineResult, InputError, InvariantViolation,
    Outcome, Pair, Participant, ParticipantId,
};
pub use metrics::METRICS;
pub use telemetry::init_tracing;
