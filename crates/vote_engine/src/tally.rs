use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::ids::UserId;

/// A single voter's recorded choice within a session.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ballot {
    Yes,
    No,
    Abstain,
}

/// The ballots of one session, one per voter.
///
/// Counts are always derived from the map, never stored alongside it.
#[derive(Debug, Clone, Default)]
pub struct VoteTally {
    ballots: HashMap<UserId, Ballot>,
}

impl VoteTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the voter's choice, overwriting any earlier ballot.
    pub fn cast(&mut self, voter: UserId, choice: Ballot) {
        self.ballots.insert(voter, choice);
    }

    pub fn ballot_of(&self, voter: UserId) -> Option<Ballot> {
        self.ballots.get(&voter).copied()
    }

    pub fn voter_count(&self) -> usize {
        self.ballots.len()
    }

    pub fn counts(&self) -> TallyCounts {
        let mut counts = TallyCounts::default();
        for ballot in self.ballots.values() {
            match ballot {
                Ballot::Yes => counts.yes += 1,
                Ballot::No => counts.no += 1,
                Ballot::Abstain => counts.abstain += 1,
            }
        }
        counts
    }
}

/// Aggregate totals derived from a [`VoteTally`].
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TallyCounts {
    pub yes: u32,
    pub no: u32,
    pub abstain: u32,
}

impl TallyCounts {
    /// A vote passes when the yes count reaches the threshold and strictly
    /// beats the no count. A tie never passes.
    pub fn passes(&self, votes_needed: u32) -> bool {
        self.yes >= votes_needed && self.yes > self.no
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_are_derived_from_ballots() {
        let mut tally = VoteTally::new();
        tally.cast(UserId(1), Ballot::Yes);
        tally.cast(UserId(2), Ballot::Yes);
        tally.cast(UserId(3), Ballot::No);
        tally.cast(UserId(4), Ballot::Abstain);

        let counts = tally.counts();
        assert_eq!(counts.yes, 2);
        assert_eq!(counts.no, 1);
        assert_eq!(counts.abstain, 1);
    }

    #[test]
    fn casting_again_overwrites() {
        let mut tally = VoteTally::new();
        tally.cast(UserId(1), Ballot::Yes);
        tally.cast(UserId(1), Ballot::No);

        assert_eq!(tally.voter_count(), 1);
        assert_eq!(tally.ballot_of(UserId(1)), Some(Ballot::No));
        assert_eq!(tally.counts().yes, 0);
        assert_eq!(tally.counts().no, 1);
    }

    #[test]
    fn tie_does_not_pass() {
        let counts = TallyCounts {
            yes: 3,
            no: 3,
            abstain: 0,
        };
        assert!(!counts.passes(3));
    }

    #[test]
    fn majority_above_threshold_passes() {
        let counts = TallyCounts {
            yes: 4,
            no: 1,
            abstain: 2,
        };
        assert!(counts.passes(3));
    }

    #[test]
    fn below_threshold_fails() {
        let counts = TallyCounts {
            yes: 2,
            no: 0,
            abstain: 0,
        };
        assert!(!counts.passes(3));
    }
}
