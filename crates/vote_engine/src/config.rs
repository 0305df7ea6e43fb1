use std::fmt::{self, Display};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::tally::Ballot;

pub const MIN_DURATION: Duration = Duration::from_secs(30);
pub const MAX_DURATION: Duration = Duration::from_secs(24 * 60 * 60);
pub const MIN_VOTES_NEEDED: u32 = 1;
pub const MAX_VOTES_NEEDED: u32 = 50;

/// What happens to the target when a vote passes.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PunishmentKind {
    Kick,
    Ban,
}

impl Display for PunishmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PunishmentKind::Kick => write!(f, "kick"),
            PunishmentKind::Ban => write!(f, "ban"),
        }
    }
}

/// The raw tokens the ballot transport delivers for each choice.
///
/// In the hosting chat system these are the reaction emoji on the vote
/// message; anything outside this set is not a ballot.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct BallotValues {
    pub yes: String,
    pub no: String,
    pub abstain: String,
}

impl BallotValues {
    pub fn parse(&self, token: &str) -> Option<Ballot> {
        if token == self.yes {
            Some(Ballot::Yes)
        } else if token == self.no {
            Some(Ballot::No)
        } else if token == self.abstain {
            Some(Ballot::Abstain)
        } else {
            None
        }
    }
}

impl Default for BallotValues {
    fn default() -> Self {
        Self {
            yes: "\u{1F44D}".to_owned(),
            no: "\u{1F44E}".to_owned(),
            abstain: "\u{1F937}".to_owned(),
        }
    }
}

/// Per-community settings, captured once when a session is created.
///
/// A running vote is never affected by a concurrent settings change: the
/// session keeps the snapshot it started with.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub duration: Duration,
    pub votes_needed: u32,
    pub punishment: PunishmentKind,
    /// Hide the initiator in views and published summaries. The audit log
    /// still records full detail.
    pub anonymous: bool,
    /// Communities can switch the whole system off.
    pub enabled: bool,
    /// Seed the tally with the initiator's implicit yes.
    pub seed_initiator_ballot: bool,
    /// When false, a voter's first ballot is sticky and later casts with a
    /// different choice are dropped.
    pub allow_ballot_change: bool,
    pub ballot_values: BallotValues,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            duration: Duration::from_secs(300),
            votes_needed: 3,
            punishment: PunishmentKind::Kick,
            anonymous: false,
            enabled: true,
            seed_initiator_ballot: true,
            allow_ballot_change: true,
            ballot_values: BallotValues::default(),
        }
    }
}

impl SessionConfig {
    /// Forces duration and votes-needed into the allowed envelopes.
    ///
    /// Applied when a snapshot is captured, so the bounds hold no matter
    /// what a settings provider returns.
    pub fn clamped(mut self) -> Self {
        self.duration = self.duration.clamp(MIN_DURATION, MAX_DURATION);
        self.votes_needed = self.votes_needed.clamp(MIN_VOTES_NEEDED, MAX_VOTES_NEEDED);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamping_enforces_bounds() {
        let config = SessionConfig {
            duration: Duration::from_secs(1),
            votes_needed: 0,
            ..SessionConfig::default()
        }
        .clamped();
        assert_eq!(config.duration, MIN_DURATION);
        assert_eq!(config.votes_needed, MIN_VOTES_NEEDED);

        let config = SessionConfig {
            duration: Duration::from_secs(7 * 24 * 60 * 60),
            votes_needed: 1000,
            ..SessionConfig::default()
        }
        .clamped();
        assert_eq!(config.duration, MAX_DURATION);
        assert_eq!(config.votes_needed, MAX_VOTES_NEEDED);
    }

    #[test]
    fn clamping_keeps_values_in_range() {
        let config = SessionConfig::default().clamped();
        assert_eq!(config.duration, Duration::from_secs(300));
        assert_eq!(config.votes_needed, 3);
    }

    #[test]
    fn ballot_values_parse_only_configured_tokens() {
        let values = BallotValues::default();
        assert_eq!(values.parse("\u{1F44D}"), Some(Ballot::Yes));
        assert_eq!(values.parse("\u{1F44E}"), Some(Ballot::No));
        assert_eq!(values.parse("\u{1F937}"), Some(Ballot::Abstain));
        assert_eq!(values.parse("yes"), None);
    }
}
