use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

/// Identifies a community (a server, in the hosting system's terms).
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CommunityId(pub u64);

/// Identifies a member of a community.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UserId(pub u64);

/// Key of one vote: at most one open session per target per community.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionKey {
    pub community: CommunityId,
    pub target: UserId,
}

impl SessionKey {
    pub fn new(community: CommunityId, target: UserId) -> Self {
        Self { community, target }
    }
}

impl Display for CommunityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
