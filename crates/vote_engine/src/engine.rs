use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::time;

use crate::error::VoteError;
use crate::ids::{CommunityId, SessionKey, UserId};
use crate::registry::SessionRegistry;
use crate::session::{ExecutionReport, SessionView, VoteOutcome, VoteSession};
use crate::traits::{
    AuditLog, EligibilityChecker, NotificationSink, PunishmentActuator, SettingsProvider,
};

/// Drives vote sessions from creation to resolution.
///
/// Each session races two resolution paths: a timer task that fires at the
/// session deadline, and the early-completion check that runs after every
/// recorded ballot. Whichever path claims the session first (an explicit
/// check-and-set on the session status, under the registry lock) performs
/// the side effects; the other path finds the session resolved or gone and
/// no-ops. Side effects always run after the lock is released, so a slow
/// actuator or sink never blocks other sessions.
///
/// The engine is a cheap handle; clones share the same registry.
#[derive(Clone)]
pub struct VoteEngine {
    inner: Arc<EngineInner>,
}

struct EngineInner {
    registry: Mutex<SessionRegistry>,
    eligibility: Arc<dyn EligibilityChecker>,
    settings: Arc<dyn SettingsProvider>,
    actuator: Arc<dyn PunishmentActuator>,
    notifier: Arc<dyn NotificationSink>,
    audit: Option<Arc<dyn AuditLog>>,
    /// The engine's own identity in the hosting system; ballots from it
    /// are dropped.
    service_identity: UserId,
}

impl VoteEngine {
    pub fn new(
        eligibility: Arc<dyn EligibilityChecker>,
        settings: Arc<dyn SettingsProvider>,
        actuator: Arc<dyn PunishmentActuator>,
        notifier: Arc<dyn NotificationSink>,
        audit: Option<Arc<dyn AuditLog>>,
        service_identity: UserId,
    ) -> Self {
        Self {
            inner: Arc::new(EngineInner {
                registry: Mutex::new(SessionRegistry::new()),
                eligibility,
                settings,
                actuator,
                notifier,
                audit,
                service_identity,
            }),
        }
    }

    /// Starts a vote against `target` and schedules its timeout.
    ///
    /// The settings snapshot is captured here and stays with the session;
    /// a settings change during the vote has no effect on it.
    pub async fn begin(
        &self,
        community: CommunityId,
        initiator: UserId,
        target: UserId,
        reason: impl Into<String>,
    ) -> Result<SessionView, VoteError> {
        let inner = &self.inner;
        if target == initiator || target == inner.service_identity {
            return Err(VoteError::InvalidTarget { target });
        }
        if inner.eligibility.is_protected(community, target).await {
            return Err(VoteError::InvalidTarget { target });
        }
        if !inner
            .eligibility
            .is_eligible(community, initiator, target)
            .await
        {
            return Err(VoteError::NotEligible { initiator, target });
        }

        let config = inner.settings.get_config(community).await.clamped();
        if !config.enabled {
            return Err(VoteError::Disabled);
        }

        let key = SessionKey::new(community, target);
        let session = VoteSession::new(key, initiator, reason.into(), config);
        let session_id = session.id();
        let deadline = session.deadline();
        let view = session.view();

        inner.registry.lock().await.insert(session)?;

        let timer = Arc::clone(inner);
        tokio::spawn(async move {
            time::sleep_until(deadline).await;
            timer.resolve_expired(key, session_id).await;
        });

        // A seeded initiator ballot can already meet a threshold of one.
        inner.try_early_completion(key).await;

        Ok(view)
    }

    /// Ingests one ballot event from the transport.
    ///
    /// Invalid tokens, ballots from the engine's own identity, and ballots
    /// for unknown or closed sessions are dropped silently; the transport
    /// is not a caller that can act on an error.
    pub async fn submit_ballot(&self, key: SessionKey, voter: UserId, token: &str) {
        let inner = &self.inner;
        if voter == inner.service_identity {
            return;
        }

        let recorded = {
            let mut registry = inner.registry.lock().await;
            let Some(session) = registry.get_mut(&key) else {
                return;
            };
            let Some(choice) = session.config().ballot_values.parse(token) else {
                return;
            };
            session.cast(voter, choice)
        };

        if recorded {
            inner.try_early_completion(key).await;
        }
    }

    /// Cancels an open session. Only the initiator or a moderator may
    /// cancel; no punishment action is taken.
    pub async fn cancel(
        &self,
        community: CommunityId,
        target: UserId,
        requester: UserId,
    ) -> Result<(), VoteError> {
        let inner = &self.inner;
        let key = SessionKey::new(community, target);

        // The authority check awaits a collaborator, so read what it needs
        // first and re-take the lock afterwards.
        let initiator = {
            let registry = inner.registry.lock().await;
            match registry.get(&key) {
                Some(session) if session.is_open() => session.initiator(),
                _ => return Err(VoteError::AlreadyResolved { target }),
            }
        };

        if requester != initiator
            && !inner.eligibility.is_moderator(community, requester).await
        {
            return Err(VoteError::NotAuthorized { requester });
        }

        let claimed = {
            let mut registry = inner.registry.lock().await;
            match registry.get_mut(&key) {
                // The session may have resolved while the lock was
                // released; the check-and-set decides.
                Some(session) if session.is_open() => {
                    session.mark_resolved(VoteOutcome::Cancelled);
                    registry.remove(&key)
                }
                _ => return Err(VoteError::AlreadyResolved { target }),
            }
        };

        if let Some(session) = claimed {
            inner.finish(session).await;
        }
        Ok(())
    }

    /// Returns the open session for the key, if any.
    pub async fn lookup(&self, community: CommunityId, target: UserId) -> Option<SessionView> {
        let registry = self.inner.registry.lock().await;
        registry
            .get(&SessionKey::new(community, target))
            .filter(|session| session.is_open())
            .map(VoteSession::view)
    }

    /// All open sessions in a community, with remaining time.
    pub async fn list_active(&self, community: CommunityId) -> Vec<SessionView> {
        let registry = self.inner.registry.lock().await;
        registry
            .active_in(community)
            .map(VoteSession::view)
            .collect()
    }
}

impl EngineInner {
    /// Timeout path: fires once per session at its deadline. Resolves from
    /// the current tally unless another path already claimed the session.
    ///
    /// The id check stops a stale timer: once its session is resolved and
    /// replaced by a new vote under the same key, the pending timer finds
    /// a different id and leaves the successor alone.
    async fn resolve_expired(&self, key: SessionKey, session_id: u64) {
        let claimed = {
            let mut registry = self.registry.lock().await;
            match registry.get_mut(&key) {
                Some(session) if session.id() == session_id && session.is_open() => {
                    let outcome = if session.counts().passes(session.config().votes_needed) {
                        VoteOutcome::Passed
                    } else {
                        VoteOutcome::Failed
                    };
                    if session.mark_resolved(outcome) {
                        registry.remove(&key)
                    } else {
                        None
                    }
                }
                _ => None,
            }
        };

        if let Some(session) = claimed {
            self.finish(session).await;
        }
    }

    /// Early-completion path: claims the session the moment the passing
    /// condition holds, skipping the rest of the timeout wait.
    async fn try_early_completion(&self, key: SessionKey) {
        let claimed = {
            let mut registry = self.registry.lock().await;
            match registry.get_mut(&key) {
                Some(session)
                    if session.is_open()
                        && session.counts().passes(session.config().votes_needed) =>
                {
                    session.mark_resolved(VoteOutcome::Passed);
                    registry.remove(&key)
                }
                _ => None,
            }
        };

        if let Some(session) = claimed {
            self.finish(session).await;
        }
    }

    /// Side effects for a claimed session: punishment on a pass, then the
    /// summary to the sink, then the optional audit case. Runs outside the
    /// registry lock; failures are recorded in the summary, never raised,
    /// so every path ends with the session gone from the registry.
    async fn finish(&self, session: VoteSession) {
        let Some(outcome) = session.outcome() else {
            // Claimed sessions are always resolved; nothing to do if not.
            return;
        };

        let detail = session.audit_reason();
        let execution = match outcome {
            VoteOutcome::Passed => {
                let result = self
                    .actuator
                    .apply(
                        session.community(),
                        session.target(),
                        session.config().punishment,
                        &detail,
                    )
                    .await;
                Some(match result {
                    Ok(()) => ExecutionReport::Executed,
                    Err(error) => ExecutionReport::Failed { error },
                })
            }
            VoteOutcome::Failed | VoteOutcome::Cancelled => None,
        };

        let summary = session.summary(outcome, execution);
        self.notifier.publish(&summary).await;

        if outcome == VoteOutcome::Passed {
            if let Some(audit) = &self.audit {
                audit.record_case(&summary, &detail).await;
            }
        }
    }
}
