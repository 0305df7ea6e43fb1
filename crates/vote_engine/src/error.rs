use serde::Serialize;
use thiserror::Error;

use crate::ids::UserId;

/// Rejections surfaced synchronously from initiation and cancellation.
///
/// None of these change any state: a rejected request leaves the registry
/// exactly as it was.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VoteError {
    /// The community has switched the vote system off.
    #[error("the vote system is disabled in this community")]
    Disabled,

    /// A session already exists for this target.
    #[error("a vote against {target} is already active")]
    AlreadyActive { target: UserId },

    /// The target is the initiator, the engine itself, or a protected
    /// member such as the community owner.
    #[error("{target} cannot be the target of a vote")]
    InvalidTarget { target: UserId },

    /// The initiator failed the hosting system's eligibility policy.
    #[error("{initiator} is not eligible to start a vote against {target}")]
    NotEligible { initiator: UserId, target: UserId },

    /// Cancellation requires the initiator or moderator authority.
    #[error("{requester} is not allowed to cancel this vote")]
    NotAuthorized { requester: UserId },

    /// The session is terminal, or no open session exists for the key.
    #[error("the vote against {target} is no longer open")]
    AlreadyResolved { target: UserId },
}

/// Failure reported by the punishment actuator during resolution.
///
/// Terminal for the session either way: the engine records the failure in
/// the outcome summary and does not retry.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize)]
pub enum ActuatorError {
    /// The hosting system refused the action (insufficient privilege).
    #[error("not permitted to carry out the action")]
    Forbidden,

    /// The target was already gone, or a transient delivery failure.
    #[error("the action could not be carried out: {0}")]
    Transient(String),
}
