/// ENFORCED WALLET TYPE
///
/// Single source of truth for currency mutations. ALL balance changes MUST
/// go through these methods.
///
/// # Enforcement Strategy:
/// 1. Fields are PRIVATE - no direct access
/// 2. All mutations return Result - errors are explicit
/// 3. Version auto-increments - audit trail
/// 4. checked_add/sub - overflow protection
use serde::{Deserialize, Serialize};

/// Two-currency wallet for a single account.
///
/// # Invariants (ENFORCED by private fields):
/// - `diamonds` and `coins` are u64 and every debit is guarded, so a balance
///   can never go negative
/// - Version increments on every mutation
/// - No overflow/underflow (checked arithmetic)
///
/// Diamonds are the spendable currency (debited when sending a gift),
/// coins are the earned currency (credited to a gift receiver, redeemable
/// back into diamonds at a configured rate).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Wallet {
    diamonds: u64, // PRIVATE - only via credit_diamonds/debit_diamonds
    coins: u64,    // PRIVATE - only via credit_coins/debit_coins
    version: u64,  // PRIVATE - incremented on every mutation
}

impl Wallet {
    /// Wallet seeded with starting balances (first login).
    pub fn with_starting_balances(diamonds: u64, coins: u64) -> Self {
        Self {
            diamonds,
            coins,
            version: 0,
        }
    }

    #[inline(always)]
    pub const fn diamonds(&self) -> u64 {
        self.diamonds
    }

    #[inline(always)]
    pub const fn coins(&self) -> u64 {
        self.coins
    }

    /// Mutation counter, useful for optimistic-concurrency backends.
    #[inline(always)]
    pub const fn version(&self) -> u64 {
        self.version
    }

    /// Credit diamonds (recharge approval, redemption payout).
    ///
    /// # Errors
    /// Returns error on overflow.
    pub fn credit_diamonds(&mut self, amount: u64) -> Result<(), &'static str> {
        self.diamonds = self
            .diamonds
            .checked_add(amount)
            .ok_or("Diamond credit overflow")?;
        self.version = self.version.wrapping_add(1);
        Ok(())
    }

    /// Debit diamonds (gift send).
    ///
    /// # Errors
    /// - "Insufficient diamonds" if the balance cannot cover the amount
    pub fn debit_diamonds(&mut self, amount: u64) -> Result<(), &'static str> {
        if self.diamonds < amount {
            return Err("Insufficient diamonds");
        }
        self.diamonds = self
            .diamonds
            .checked_sub(amount)
            .ok_or("Diamond debit underflow")?;
        self.version = self.version.wrapping_add(1);
        Ok(())
    }

    /// Credit coins (gift received).
    ///
    /// # Errors
    /// Returns error on overflow.
    pub fn credit_coins(&mut self, amount: u64) -> Result<(), &'static str> {
        self.coins = self
            .coins
            .checked_add(amount)
            .ok_or("Coin credit overflow")?;
        self.version = self.version.wrapping_add(1);
        Ok(())
    }

    /// Debit coins (redemption into diamonds).
    ///
    /// # Errors
    /// - "Insufficient coins" if the balance cannot cover the amount
    pub fn debit_coins(&mut self, amount: u64) -> Result<(), &'static str> {
        if self.coins < amount {
            return Err("Insufficient coins");
        }
        self.coins = self
            .coins
            .checked_sub(amount)
            .ok_or("Coin debit underflow")?;
        self.version = self.version.wrapping_add(1);
        Ok(())
    }

    /// Atomic: debit coins + credit diamonds (redemption).
    ///
    /// Validates both legs before applying either, so a failure leaves the
    /// wallet untouched.
    pub fn redeem(&mut self, coin_debit: u64, diamond_credit: u64) -> Result<(), &'static str> {
        if self.coins < coin_debit {
            return Err("Insufficient coins");
        }
        let new_diamonds = self
            .diamonds
            .checked_add(diamond_credit)
            .ok_or("Redeem diamond overflow")?;
        self.coins = self
            .coins
            .checked_sub(coin_debit)
            .ok_or("Redeem coin underflow")?;
        self.diamonds = new_diamonds;
        self.version = self.version.wrapping_add(1);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starting_balances() {
        let w = Wallet::with_starting_balances(500, 10);
        assert_eq!(w.diamonds(), 500);
        assert_eq!(w.coins(), 10);
        assert_eq!(w.version(), 0);
    }

    #[test]
    fn test_debit_diamonds() {
        let mut w = Wallet::with_starting_balances(100, 0);
        w.debit_diamonds(60).unwrap();
        assert_eq!(w.diamonds(), 40);
        assert_eq!(w.version(), 1);
    }

    #[test]
    fn test_debit_insufficient_leaves_wallet_unchanged() {
        let mut w = Wallet::with_starting_balances(50, 0);
        assert!(w.debit_diamonds(100).is_err());
        assert_eq!(w.diamonds(), 50);
        assert_eq!(w.version(), 0);
    }

    #[test]
    fn test_coin_credit_overflow() {
        let mut w = Wallet::default();
        w.credit_coins(u64::MAX).unwrap();
        assert!(w.credit_coins(1).is_err());
        assert_eq!(w.coins(), u64::MAX);
    }

    #[test]
    fn test_redeem_is_all_or_nothing() {
        let mut w = Wallet::with_starting_balances(0, 50);
        // Not enough coins: neither leg applies
        assert!(w.redeem(100, 10).is_err());
        assert_eq!(w.coins(), 50);
        assert_eq!(w.diamonds(), 0);

        w.credit_coins(50).unwrap();
        w.redeem(100, 10).unwrap();
        assert_eq!(w.coins(), 0);
        assert_eq!(w.diamonds(), 10);
    }

    #[test]
    fn test_version_increments_on_every_mutation() {
        let mut w = Wallet::default();
        w.credit_diamonds(10).unwrap();
        w.credit_coins(10).unwrap();
        w.debit_diamonds(5).unwrap();
        w.debit_coins(5).unwrap();
        assert_eq!(w.version(), 4);
    }
}
