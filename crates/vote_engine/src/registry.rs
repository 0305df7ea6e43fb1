use std::collections::HashMap;

use crate::error::VoteError;
use crate::ids::{CommunityId, SessionKey};
use crate::session::VoteSession;

/// Owns every open session. Constructed once per engine, never ambient
/// global state, so several engines can coexist in one process.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: HashMap<SessionKey, VoteSession>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new session. A key that still holds an open session
    /// rejects the insertion.
    pub fn insert(&mut self, session: VoteSession) -> Result<(), VoteError> {
        let key = session.key();
        if self.sessions.get(&key).is_some_and(VoteSession::is_open) {
            return Err(VoteError::AlreadyActive { target: key.target });
        }
        self.sessions.insert(key, session);
        Ok(())
    }

    pub fn get(&self, key: &SessionKey) -> Option<&VoteSession> {
        self.sessions.get(key)
    }

    pub fn get_mut(&mut self, key: &SessionKey) -> Option<&mut VoteSession> {
        self.sessions.get_mut(key)
    }

    pub fn remove(&mut self, key: &SessionKey) -> Option<VoteSession> {
        self.sessions.remove(key)
    }

    pub fn active_in(&self, community: CommunityId) -> impl Iterator<Item = &VoteSession> {
        self.sessions
            .values()
            .filter(move |session| session.community() == community && session.is_open())
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SessionConfig;
    use crate::ids::UserId;

    fn session(community: u64, target: u64) -> VoteSession {
        VoteSession::new(
            SessionKey::new(CommunityId(community), UserId(target)),
            UserId(99),
            "rude".to_owned(),
            SessionConfig::default(),
        )
    }

    #[test]
    fn duplicate_open_key_is_rejected() {
        let mut registry = SessionRegistry::new();
        registry.insert(session(1, 2)).unwrap();
        let err = registry.insert(session(1, 2)).unwrap_err();
        assert_eq!(err, VoteError::AlreadyActive { target: UserId(2) });
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn same_target_in_another_community_is_independent() {
        let mut registry = SessionRegistry::new();
        registry.insert(session(1, 2)).unwrap();
        registry.insert(session(3, 2)).unwrap();
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn active_in_filters_by_community() {
        let mut registry = SessionRegistry::new();
        registry.insert(session(1, 2)).unwrap();
        registry.insert(session(1, 3)).unwrap();
        registry.insert(session(2, 4)).unwrap();
        assert_eq!(registry.active_in(CommunityId(1)).count(), 2);
        assert_eq!(registry.active_in(CommunityId(9)).count(), 0);
    }

    #[test]
    fn removal_frees_the_key() {
        let mut registry = SessionRegistry::new();
        registry.insert(session(1, 2)).unwrap();
        assert!(registry.remove(&SessionKey::new(CommunityId(1), UserId(2))).is_some());
        registry.insert(session(1, 2)).unwrap();
    }
}
