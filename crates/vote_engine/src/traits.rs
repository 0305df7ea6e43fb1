use async_trait::async_trait;

use crate::config::{PunishmentKind, SessionConfig};
use crate::error::ActuatorError;
use crate::ids::{CommunityId, UserId};
use crate::session::SessionSummary;

/// Policy the hosting system supplies about who may vote against whom.
#[async_trait]
pub trait EligibilityChecker: Send + Sync {
    /// Members the engine must never open a vote against, such as the
    /// community owner.
    async fn is_protected(&self, community: CommunityId, target: UserId) -> bool;

    /// Role-hierarchy / role-matching policy between initiator and target.
    async fn is_eligible(
        &self,
        community: CommunityId,
        initiator: UserId,
        target: UserId,
    ) -> bool;

    /// Moderator-equivalent authority; allows cancelling votes started by
    /// someone else.
    async fn is_moderator(&self, community: CommunityId, user: UserId) -> bool;
}

/// Per-community settings store. The engine snapshots the result once per
/// session and never reads it again for that session.
#[async_trait]
pub trait SettingsProvider: Send + Sync {
    async fn get_config(&self, community: CommunityId) -> SessionConfig;
}

/// The external capability that removes a member (kick) or permanently
/// excludes them (ban).
#[async_trait]
pub trait PunishmentActuator: Send + Sync {
    async fn apply(
        &self,
        community: CommunityId,
        target: UserId,
        kind: PunishmentKind,
        reason: &str,
    ) -> Result<(), ActuatorError>;
}

/// Where final session summaries are delivered.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn publish(&self, summary: &SessionSummary);
}

/// Optional structured case log. Absence affects observability only, never
/// whether a vote resolves or a punishment is applied.
#[async_trait]
pub trait AuditLog: Send + Sync {
    /// Records one case per passed vote. `reason` always carries the full
    /// detail, including the initiator of anonymous votes.
    async fn record_case(&self, summary: &SessionSummary, reason: &str);
}
