use std::fmt::{self, Display};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::Serialize;
use tokio::time::Instant;

use crate::config::{PunishmentKind, SessionConfig};
use crate::error::ActuatorError;
use crate::ids::{CommunityId, SessionKey, UserId};
use crate::tally::{Ballot, TallyCounts, VoteTally};

/// How a resolved session ended.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteOutcome {
    Passed,
    Failed,
    Cancelled,
}

impl Display for VoteOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VoteOutcome::Passed => write!(f, "passed"),
            VoteOutcome::Failed => write!(f, "failed"),
            VoteOutcome::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Session lifecycle: `Open` until one resolution path claims the session,
/// then terminal forever.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Open,
    Resolved(VoteOutcome),
}

/// One in-progress vote against one target in one community.
///
/// Owned exclusively by the registry; the engine takes it out of the
/// registry when a resolution path claims it.
#[derive(Debug)]
pub struct VoteSession {
    /// Distinguishes this session from earlier or later sessions under the
    /// same key, so a timer armed for one session can never resolve
    /// another.
    id: u64,
    key: SessionKey,
    initiator: UserId,
    reason: String,
    created_at: Instant,
    config: SessionConfig,
    status: SessionStatus,
    tally: VoteTally,
}

static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(0);

impl VoteSession {
    pub(crate) fn new(
        key: SessionKey,
        initiator: UserId,
        reason: String,
        config: SessionConfig,
    ) -> Self {
        let mut session = Self {
            id: NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed),
            key,
            initiator,
            reason,
            created_at: Instant::now(),
            config,
            status: SessionStatus::Open,
            tally: VoteTally::new(),
        };
        if session.config.seed_initiator_ballot {
            session.tally.cast(initiator, Ballot::Yes);
        }
        session
    }

    pub(crate) fn id(&self) -> u64 {
        self.id
    }

    pub fn key(&self) -> SessionKey {
        self.key
    }

    pub fn community(&self) -> CommunityId {
        self.key.community
    }

    pub fn target(&self) -> UserId {
        self.key.target
    }

    pub fn initiator(&self) -> UserId {
        self.initiator
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn is_open(&self) -> bool {
        self.status == SessionStatus::Open
    }

    pub fn outcome(&self) -> Option<VoteOutcome> {
        match self.status {
            SessionStatus::Open => None,
            SessionStatus::Resolved(outcome) => Some(outcome),
        }
    }

    pub fn counts(&self) -> TallyCounts {
        self.tally.counts()
    }

    pub fn deadline(&self) -> Instant {
        self.created_at + self.config.duration
    }

    pub fn remaining(&self) -> Duration {
        self.deadline().saturating_duration_since(Instant::now())
    }

    /// Records a ballot. Returns false when the session is closed, or when
    /// the voter already cast a different choice and changes are
    /// disallowed.
    pub(crate) fn cast(&mut self, voter: UserId, choice: Ballot) -> bool {
        if !self.is_open() {
            return false;
        }
        if !self.config.allow_ballot_change {
            if let Some(previous) = self.tally.ballot_of(voter) {
                if previous != choice {
                    return false;
                }
            }
        }
        self.tally.cast(voter, choice);
        true
    }

    /// The exactly-once gate: the first caller to observe an open session
    /// transitions it and gets true; every later caller gets false and
    /// must no-op. Callers hold the registry lock across this call.
    pub(crate) fn mark_resolved(&mut self, outcome: VoteOutcome) -> bool {
        match self.status {
            SessionStatus::Open => {
                self.status = SessionStatus::Resolved(outcome);
                true
            }
            SessionStatus::Resolved(_) => false,
        }
    }

    /// Snapshot for display. The initiator is withheld when the vote is
    /// anonymous.
    pub fn view(&self) -> SessionView {
        SessionView {
            community: self.key.community,
            target: self.key.target,
            initiator: (!self.config.anonymous).then_some(self.initiator),
            reason: self.reason.clone(),
            punishment: self.config.punishment,
            votes_needed: self.config.votes_needed,
            counts: self.tally.counts(),
            remaining: self.remaining(),
        }
    }

    /// Detail string for the audit log. Always names the initiator, even
    /// for anonymous votes.
    pub(crate) fn audit_reason(&self) -> String {
        let counts = self.tally.counts();
        format!(
            "Vote {}: {} (initiated by {}; {} yes / {} no / {} abstain)",
            self.config.punishment,
            self.reason,
            self.initiator,
            counts.yes,
            counts.no,
            counts.abstain,
        )
    }

    pub(crate) fn summary(
        &self,
        outcome: VoteOutcome,
        execution: Option<ExecutionReport>,
    ) -> SessionSummary {
        SessionSummary {
            community: self.key.community,
            target: self.key.target,
            initiator: (!self.config.anonymous).then_some(self.initiator),
            reason: self.reason.clone(),
            punishment: self.config.punishment,
            counts: self.tally.counts(),
            outcome,
            execution,
        }
    }
}

/// Point-in-time rendering of an open session.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct SessionView {
    pub community: CommunityId,
    pub target: UserId,
    pub initiator: Option<UserId>,
    pub reason: String,
    pub punishment: PunishmentKind,
    pub votes_needed: u32,
    pub counts: TallyCounts,
    pub remaining: Duration,
}

/// Whether the punishment action went through after a passed vote.
///
/// A vote that passed but could not be executed is still reported as
/// passed, with the failure attached.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub enum ExecutionReport {
    Executed,
    Failed { error: ActuatorError },
}

/// Final report published through the notification sink once a session
/// resolves.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub community: CommunityId,
    pub target: UserId,
    pub initiator: Option<UserId>,
    pub reason: String,
    pub punishment: PunishmentKind,
    pub counts: TallyCounts,
    pub outcome: VoteOutcome,
    pub execution: Option<ExecutionReport>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(config: SessionConfig) -> VoteSession {
        VoteSession::new(
            SessionKey::new(CommunityId(1), UserId(2)),
            UserId(3),
            "spamming".to_owned(),
            config,
        )
    }

    #[test]
    fn mark_resolved_succeeds_exactly_once() {
        let mut session = session(SessionConfig::default());
        assert!(session.mark_resolved(VoteOutcome::Passed));
        assert!(!session.mark_resolved(VoteOutcome::Failed));
        assert!(!session.mark_resolved(VoteOutcome::Cancelled));
        assert_eq!(session.outcome(), Some(VoteOutcome::Passed));
    }

    #[test]
    fn closed_session_rejects_ballots() {
        let mut session = session(SessionConfig::default());
        session.mark_resolved(VoteOutcome::Cancelled);
        assert!(!session.cast(UserId(4), Ballot::Yes));
        // Only the seeded initiator ballot remains.
        assert_eq!(session.counts().yes, 1);
    }

    #[test]
    fn seeding_records_the_initiator_yes() {
        let seeded = session(SessionConfig::default());
        assert_eq!(seeded.counts().yes, 1);

        let unseeded = session(SessionConfig {
            seed_initiator_ballot: false,
            ..SessionConfig::default()
        });
        assert_eq!(unseeded.counts().yes, 0);
    }

    #[test]
    fn sticky_ballot_when_change_disallowed() {
        let mut session = session(SessionConfig {
            seed_initiator_ballot: false,
            allow_ballot_change: false,
            ..SessionConfig::default()
        });
        assert!(session.cast(UserId(4), Ballot::Yes));
        assert!(!session.cast(UserId(4), Ballot::No));
        assert_eq!(session.counts().yes, 1);
        assert_eq!(session.counts().no, 0);
        // Re-casting the same choice is fine.
        assert!(session.cast(UserId(4), Ballot::Yes));
    }

    #[test]
    fn anonymous_sessions_hide_the_initiator() {
        let session = session(SessionConfig {
            anonymous: true,
            ..SessionConfig::default()
        });
        assert_eq!(session.view().initiator, None);
        assert_eq!(
            session.summary(VoteOutcome::Failed, None).initiator,
            None
        );
        // The audit trail still has the full detail.
        assert!(session.audit_reason().contains("initiated by 3"));
    }
}
