//! Account - one user's economic state.
//!
//! Wraps the enforced [`Wallet`] with the experience/level progression
//! fields. All mutations go through validated operations; the identity is
//! immutable after creation.

use serde::{Deserialize, Serialize};

use crate::core_types::{Identity, Level, Xp};
use crate::level::{LevelPolicy, Progress, apply_experience};
use crate::wallet::Wallet;

/// One user's economic state.
///
/// # Invariants (enforced by private fields):
/// 1. `identity` is immutable after creation
/// 2. Balances only change through [`Wallet`] validated operations
/// 3. `level` is monotonically non-decreasing and never exceeds the
///    policy's max level; XP only decreases via level-up carry-over
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Account {
    identity: Identity,        // PRIVATE - use identity()
    wallet: Wallet,            // PRIVATE - use wallet()/wallet_mut()
    experience_points: Xp,     // PRIVATE - use gain_experience()
    level: Level,              // PRIVATE - use level()
}

impl Account {
    /// Create a first-login account with the configured starting balances.
    pub fn new(identity: Identity, starting_diamonds: u64, starting_coins: u64) -> Self {
        Self {
            identity,
            wallet: Wallet::with_starting_balances(starting_diamonds, starting_coins),
            experience_points: 0,
            level: 1,
        }
    }

    #[inline(always)]
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    #[inline(always)]
    pub fn wallet(&self) -> &Wallet {
        &self.wallet
    }

    /// Mutable wallet access for ledger commits.
    ///
    /// Only the repository may call this inside an atomic unit; the
    /// coordinator never mutates balances outside a committed transaction.
    #[inline(always)]
    pub(crate) fn wallet_mut(&mut self) -> &mut Wallet {
        &mut self.wallet
    }

    #[inline(always)]
    pub fn experience_points(&self) -> Xp {
        self.experience_points
    }

    #[inline(always)]
    pub fn level(&self) -> Level {
        self.level
    }

    /// Award experience and run the level engine.
    ///
    /// Handles multi-level jumps in a single call. Returns the progression
    /// outcome so callers can report `leveled_up` without re-deriving it.
    pub(crate) fn gain_experience(&mut self, policy: &LevelPolicy, gained: Xp) -> Progress {
        let progress = apply_experience(policy, self.experience_points, self.level, gained);
        self.experience_points = progress.experience_points;
        self.level = progress.level;
        progress
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_account_defaults() {
        let acc = Account::new(Identity::from("alice"), 500, 10);
        assert_eq!(acc.identity().as_str(), "alice");
        assert_eq!(acc.wallet().diamonds(), 500);
        assert_eq!(acc.wallet().coins(), 10);
        assert_eq!(acc.level(), 1);
        assert_eq!(acc.experience_points(), 0);
    }

    #[test]
    fn test_gain_experience_levels_up() {
        let policy = LevelPolicy::default();
        let mut acc = Account::new(Identity::from("bob"), 0, 0);

        let p = acc.gain_experience(&policy, 250);
        assert!(p.leveled_up);
        assert_eq!(acc.level(), 3);
        assert_eq!(acc.experience_points(), 30);
    }
}
