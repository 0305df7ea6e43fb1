//! In-memory vote-kick/vote-ban session engine.
//!
//! A community member starts a vote against a target; other members cast
//! yes/no/abstain ballots; the session resolves when the passing threshold
//! is reached early or when its timeout fires, whichever happens first.
//! The engine owns the sessions and the resolution race; everything
//! platform-specific (who is eligible, how to kick, where summaries go)
//! comes in through the collaborator traits in [`traits`].

mod config;
mod engine;
mod error;
mod ids;
mod registry;
mod session;
mod tally;
mod traits;

pub use config::{
    BallotValues, PunishmentKind, SessionConfig, MAX_DURATION, MAX_VOTES_NEEDED, MIN_DURATION,
    MIN_VOTES_NEEDED,
};
pub use engine::VoteEngine;
pub use error::{ActuatorError, VoteError};
pub use ids::{CommunityId, SessionKey, UserId};
pub use registry::SessionRegistry;
pub use session::{
    ExecutionReport, SessionStatus, SessionSummary, SessionView, VoteOutcome, VoteSession,
};
pub use tally::{Ballot, TallyCounts, VoteTally};
pub use traits::{
    AuditLog, EligibilityChecker, NotificationSink, PunishmentActuator, SettingsProvider,
};

pub mod prelude {
    pub use crate::{
        ActuatorError, AuditLog, Ballot, BallotValues, CommunityId, EligibilityChecker,
        ExecutionReport, NotificationSink, PunishmentActuator, PunishmentKind, SessionConfig,
        SessionKey, SessionSummary, SessionView, SettingsProvider, TallyCounts, UserId,
        VoteEngine, VoteError, VoteOutcome,
    };
    pub use async_trait::async_trait;
}
