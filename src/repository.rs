//! Ledger Repository - single source of truth for account balances.
//!
//! The trait is the seam between the coordinator and the storage backend:
//! everything that mutates balances goes through an atomic operation here,
//! never through two independent saves. `MemoryLedger` is the bundled
//! backend; a database-backed one only needs to honor the same contract.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::debug;

use crate::account::Account;
use crate::audit::GiftTransactionRecord;
use crate::core_types::Identity;
use crate::error::GiftError;
use crate::level::{LevelPolicy, Progress};

/// All deltas of one gift transfer, applied as a single atomic unit.
#[derive(Debug, Clone)]
pub struct TransferPlan {
    pub sender: Identity,
    pub receiver: Identity,
    /// Diamonds debited from the sender.
    pub diamond_debit: u64,
    /// Coins credited to the receiver.
    pub coin_credit: u64,
    /// XP awarded to the sender (0 when the sender-XP policy is disabled).
    pub sender_xp: u64,
    /// XP awarded to the receiver.
    pub receiver_xp: u64,
}

/// Post-commit snapshot of both accounts.
#[derive(Debug, Clone)]
pub struct CommittedAccounts {
    pub sender: Account,
    pub receiver: Account,
    pub sender_progress: Progress,
    pub receiver_progress: Progress,
}

/// Transactional key-value store of accounts.
///
/// Contract: every multi-account mutation is all-or-nothing; a rejected
/// operation leaves every account bit-for-bit unchanged. Implementations
/// detecting a concurrent modification return `Conflict`; the coordinator
/// owns the retry loop.
#[async_trait]
pub trait LedgerRepository: Send + Sync {
    /// Look up an account.
    async fn get_account(&self, identity: &Identity) -> Result<Account, GiftError>;

    /// First-login account creation with starting balances.
    ///
    /// Idempotent: an existing account is returned unchanged.
    async fn create_account(&self, identity: &Identity) -> Result<Account, GiftError>;

    /// Apply one gift transfer atomically.
    ///
    /// Funds are re-checked inside the atomic scope (commit-time check, not
    /// just the coordinator's fail-fast read), so two concurrent sends can
    /// never overdraw the sender.
    async fn atomic_transfer(&self, plan: TransferPlan) -> Result<CommittedAccounts, GiftError>;

    /// Single-account atomic redemption: debit coins, credit diamonds.
    async fn atomic_exchange(
        &self,
        identity: &Identity,
        coin_debit: u64,
        diamond_credit: u64,
    ) -> Result<Account, GiftError>;

    /// Credit diamonds from an approved recharge.
    async fn credit_recharge(&self, identity: &Identity, diamonds: u64)
    -> Result<Account, GiftError>;

    /// Append an audit record. Best-effort; implementations should not block
    /// the transaction path on this.
    async fn append_audit(&self, record: GiftTransactionRecord) -> Result<(), GiftError>;
}

/// In-memory ledger.
///
/// Accounts live in a DashMap of per-account mutex slots. Multi-account
/// commits take both locks in sorted identity order, which serializes any
/// two transactions touching the same account and rules out both deadlock
/// and lost updates.
pub struct MemoryLedger {
    accounts: DashMap<Identity, Arc<Mutex<Account>>>,
    audit_log: Mutex<Vec<GiftTransactionRecord>>,
    level_policy: LevelPolicy,
    starting_diamonds: u64,
    starting_coins: u64,
}

impl MemoryLedger {
    pub fn new(level_policy: LevelPolicy, starting_diamonds: u64, starting_coins: u64) -> Self {
        Self {
            accounts: DashMap::new(),
            audit_log: Mutex::new(Vec::new()),
            level_policy,
            starting_diamonds,
            starting_coins,
        }
    }

    fn slot(&self, identity: &Identity) -> Result<Arc<Mutex<Account>>, GiftError> {
        self.accounts
            .get(identity)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| GiftError::AccountNotFound(identity.to_string()))
    }

    /// Snapshot of the audit log, oldest first. For inspection and tests.
    pub fn audit_records(&self) -> Vec<GiftTransactionRecord> {
        self.audit_log.lock().expect("audit log poisoned").clone()
    }
}

impl Default for MemoryLedger {
    fn default() -> Self {
        Self::new(LevelPolicy::default(), 500, 10)
    }
}

#[async_trait]
impl LedgerRepository for MemoryLedger {
    async fn get_account(&self, identity: &Identity) -> Result<Account, GiftError> {
        let slot = self.slot(identity)?;
        let account = slot.lock().expect("account slot poisoned");
        Ok(account.clone())
    }

    async fn create_account(&self, identity: &Identity) -> Result<Account, GiftError> {
        let slot = self
            .accounts
            .entry(identity.clone())
            .or_insert_with(|| {
                Arc::new(Mutex::new(Account::new(
                    identity.clone(),
                    self.starting_diamonds,
                    self.starting_coins,
                )))
            })
            .value()
            .clone();
        let account = slot.lock().expect("account slot poisoned");
        Ok(account.clone())
    }

    async fn atomic_transfer(&self, plan: TransferPlan) -> Result<CommittedAccounts, GiftError> {
        if plan.sender == plan.receiver {
            return Err(GiftError::SameAccount);
        }

        let sender_slot = self.slot(&plan.sender)?;
        let receiver_slot = self.slot(&plan.receiver)?;

        // Lock ordering by identity keeps concurrent transfers over
        // overlapping account pairs deadlock-free.
        let (first, second) = if plan.sender < plan.receiver {
            (&sender_slot, &receiver_slot)
        } else {
            (&receiver_slot, &sender_slot)
        };
        let first_guard = first.lock().expect("account slot poisoned");
        let second_guard = second.lock().expect("account slot poisoned");
        let (mut sender_guard, mut receiver_guard) = if plan.sender < plan.receiver {
            (first_guard, second_guard)
        } else {
            (second_guard, first_guard)
        };

        // Commit-time funds check, inside the critical section.
        if sender_guard.wallet().diamonds() < plan.diamond_debit {
            return Err(GiftError::InsufficientFunds);
        }

        // Work on copies so a mid-sequence failure leaves both live
        // accounts untouched.
        let mut sender = sender_guard.clone();
        let mut receiver = receiver_guard.clone();

        sender
            .wallet_mut()
            .debit_diamonds(plan.diamond_debit)
            .map_err(|_| GiftError::InsufficientFunds)?;
        receiver
            .wallet_mut()
            .credit_coins(plan.coin_credit)
            .map_err(|e| GiftError::Internal(e.to_string()))?;

        let sender_progress = sender.gain_experience(&self.level_policy, plan.sender_xp);
        let receiver_progress = receiver.gain_experience(&self.level_policy, plan.receiver_xp);

        *sender_guard = sender.clone();
        *receiver_guard = receiver.clone();

        debug!(
            sender = %plan.sender,
            receiver = %plan.receiver,
            diamonds = plan.diamond_debit,
            coins = plan.coin_credit,
            "Transfer committed"
        );

        Ok(CommittedAccounts {
            sender,
            receiver,
            sender_progress,
            receiver_progress,
        })
    }

    async fn atomic_exchange(
        &self,
        identity: &Identity,
        coin_debit: u64,
        diamond_credit: u64,
    ) -> Result<Account, GiftError> {
        let slot = self.slot(identity)?;
        let mut account = slot.lock().expect("account slot poisoned");
        // Distinguish the client error (not enough coins) from arithmetic
        // failure on the credit leg, which is an internal fault.
        if account.wallet().coins() < coin_debit {
            return Err(GiftError::InsufficientCoins);
        }
        account
            .wallet_mut()
            .redeem(coin_debit, diamond_credit)
            .map_err(|e| GiftError::Internal(e.to_string()))?;
        Ok(account.clone())
    }

    async fn credit_recharge(
        &self,
        identity: &Identity,
        diamonds: u64,
    ) -> Result<Account, GiftError> {
        let slot = self.slot(identity)?;
        let mut account = slot.lock().expect("account slot poisoned");
        account
            .wallet_mut()
            .credit_diamonds(diamonds)
            .map_err(|e| GiftError::Internal(e.to_string()))?;
        Ok(account.clone())
    }

    async fn append_audit(&self, record: GiftTransactionRecord) -> Result<(), GiftError> {
        self.audit_log
            .lock()
            .expect("audit log poisoned")
            .push(record);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::TransactionOutcome;

    fn ledger() -> MemoryLedger {
        MemoryLedger::default()
    }

    fn plan(sender: &str, receiver: &str, cost: u64) -> TransferPlan {
        TransferPlan {
            sender: Identity::from(sender),
            receiver: Identity::from(receiver),
            diamond_debit: cost,
            coin_credit: cost,
            sender_xp: cost,
            receiver_xp: cost / 2,
        }
    }

    #[tokio::test]
    async fn test_create_account_is_idempotent() {
        let ledger = ledger();
        let alice = Identity::from("alice");

        let created = ledger.create_account(&alice).await.unwrap();
        assert_eq!(created.wallet().diamonds(), 500);

        // Mutate, then re-create: balances must survive
        ledger.credit_recharge(&alice, 100).await.unwrap();
        let again = ledger.create_account(&alice).await.unwrap();
        assert_eq!(again.wallet().diamonds(), 600);
    }

    #[tokio::test]
    async fn test_get_account_not_found() {
        let ledger = ledger();
        let err = ledger.get_account(&Identity::from("ghost")).await.unwrap_err();
        assert!(matches!(err, GiftError::AccountNotFound(_)));
    }

    #[tokio::test]
    async fn test_atomic_transfer_moves_both_currencies() {
        let ledger = ledger();
        ledger.create_account(&Identity::from("alice")).await.unwrap();
        ledger.create_account(&Identity::from("bob")).await.unwrap();

        let committed = ledger.atomic_transfer(plan("alice", "bob", 200)).await.unwrap();
        assert_eq!(committed.sender.wallet().diamonds(), 300);
        assert_eq!(committed.receiver.wallet().coins(), 210);
        // Sender XP 200: consumes the level-1 threshold (100), leaving 100
        assert_eq!(committed.sender.level(), 2);
        assert_eq!(committed.sender.experience_points(), 100);
    }

    #[tokio::test]
    async fn test_atomic_transfer_insufficient_leaves_accounts_unchanged() {
        let ledger = ledger();
        ledger.create_account(&Identity::from("alice")).await.unwrap();
        ledger.create_account(&Identity::from("bob")).await.unwrap();

        let before_sender = ledger.get_account(&Identity::from("alice")).await.unwrap();
        let before_receiver = ledger.get_account(&Identity::from("bob")).await.unwrap();

        let err = ledger
            .atomic_transfer(plan("alice", "bob", 10_000))
            .await
            .unwrap_err();
        assert!(matches!(err, GiftError::InsufficientFunds));

        assert_eq!(
            ledger.get_account(&Identity::from("alice")).await.unwrap(),
            before_sender
        );
        assert_eq!(
            ledger.get_account(&Identity::from("bob")).await.unwrap(),
            before_receiver
        );
    }

    #[tokio::test]
    async fn test_atomic_exchange() {
        let ledger = ledger();
        let alice = Identity::from("alice");
        ledger.create_account(&alice).await.unwrap();

        // Starting coins are 10: not enough
        let err = ledger.atomic_exchange(&alice, 100, 10).await.unwrap_err();
        assert!(matches!(err, GiftError::InsufficientCoins));

        // Fund and redeem 100 coins -> 10 diamonds
        let slot = ledger.slot(&alice).unwrap();
        slot.lock().unwrap().wallet_mut().credit_coins(90).unwrap();

        let after = ledger.atomic_exchange(&alice, 100, 10).await.unwrap();
        assert_eq!(after.wallet().coins(), 0);
        assert_eq!(after.wallet().diamonds(), 510);
    }

    #[tokio::test]
    async fn test_atomic_exchange_overflow_is_internal_not_client_error() {
        let ledger = ledger();
        let alice = Identity::from("alice");
        ledger.create_account(&alice).await.unwrap();

        // Push diamonds to the ceiling so the credit leg must overflow
        let slot = ledger.slot(&alice).unwrap();
        {
            let mut account = slot.lock().unwrap();
            let headroom = u64::MAX - account.wallet().diamonds();
            account.wallet_mut().credit_diamonds(headroom).unwrap();
            account.wallet_mut().credit_coins(200).unwrap();
        }

        let err = ledger.atomic_exchange(&alice, 100, 10).await.unwrap_err();
        assert!(matches!(err, GiftError::Internal(_)));
        assert_eq!(err.http_status(), 500);

        // Failed exchange leaves the wallet untouched
        let account = ledger.get_account(&alice).await.unwrap();
        assert_eq!(account.wallet().coins(), 210);
        assert_eq!(account.wallet().diamonds(), u64::MAX);
    }

    #[tokio::test]
    async fn test_audit_log_append() {
        let ledger = ledger();
        let record = GiftTransactionRecord::new(
            Identity::from("alice"),
            Identity::from("bob"),
            50,
            TransactionOutcome::Committed,
        );
        ledger.append_audit(record.clone()).await.unwrap();
        let records = ledger.audit_records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0], record);
    }
}
