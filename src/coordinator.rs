//! Gift Transaction Coordinator
//!
//! Executes one gift send as a single atomic business transaction:
//! validate, move currency, award experience, level up, audit, broadcast.
//! This is the only component that drives ledger commits; it never caches
//! or mutates balances outside a committed transaction.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::account::Account;
use crate::audit::{GiftTransactionRecord, TransactionOutcome};
use crate::broadcast::{BroadcastGateway, RoomEvent};
use crate::config::EconomyConfig;
use crate::core_types::{Identity, Level, RoomId};
use crate::error::GiftError;
use crate::gift::GiftCatalog;
use crate::level::{CosmeticTier, theme_for};
use crate::repository::{CommittedAccounts, LedgerRepository, TransferPlan};

/// Confirmation returned to the caller after a committed gift send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferResult {
    pub sender_diamonds: u64,
    pub receiver_coins: u64,
    pub receiver_level: Level,
    pub receiver_theme: CosmeticTier,
    pub leveled_up: bool,
}

/// Orchestrates gift transactions against an abstract ledger and gateway.
pub struct GiftCoordinator {
    repo: Arc<dyn LedgerRepository>,
    gateway: Arc<dyn BroadcastGateway>,
    catalog: GiftCatalog,
    economy: EconomyConfig,
}

impl GiftCoordinator {
    pub fn new(
        repo: Arc<dyn LedgerRepository>,
        gateway: Arc<dyn BroadcastGateway>,
        economy: EconomyConfig,
    ) -> Self {
        Self::with_catalog(repo, gateway, economy, GiftCatalog::with_defaults())
    }

    pub fn with_catalog(
        repo: Arc<dyn LedgerRepository>,
        gateway: Arc<dyn BroadcastGateway>,
        economy: EconomyConfig,
        catalog: GiftCatalog,
    ) -> Self {
        Self {
            repo,
            gateway,
            catalog,
            economy,
        }
    }

    /// First-login registration with the configured starting balances.
    pub async fn register(&self, identity: &Identity) -> Result<Account, GiftError> {
        let account = self.repo.create_account(identity).await?;
        info!(identity = %identity, diamonds = account.wallet().diamonds(), "Account ready");
        Ok(account)
    }

    /// Send a gift with an already-resolved diamond cost.
    pub async fn send_gift(
        &self,
        sender: &Identity,
        receiver: &Identity,
        gift_cost: u64,
        room: &RoomId,
    ) -> Result<TransferResult, GiftError> {
        let force_global = false;
        self.send_gift_inner(sender, receiver, gift_cost, room, force_global)
            .await
    }

    /// Send `quantity` units of a named catalog gift.
    ///
    /// A definition flagged `is_super_gift` always triggers the global
    /// announcement, regardless of the cost threshold.
    pub async fn send_gift_by_name(
        &self,
        sender: &Identity,
        receiver: &Identity,
        gift_name: &str,
        quantity: u64,
        room: &RoomId,
    ) -> Result<TransferResult, GiftError> {
        let cost = self.catalog.resolve_cost(gift_name, quantity)?;
        let force_global = self
            .catalog
            .get(gift_name)
            .is_some_and(|g| g.is_super_gift);
        self.send_gift_inner(sender, receiver, cost, room, force_global)
            .await
    }

    async fn send_gift_inner(
        &self,
        sender: &Identity,
        receiver: &Identity,
        gift_cost: u64,
        room: &RoomId,
        force_global: bool,
    ) -> Result<TransferResult, GiftError> {
        // === Fail-fast validation: no partial effect past this block ===
        if gift_cost == 0 {
            return self
                .reject(sender, receiver, gift_cost, GiftError::InvalidAmount)
                .await;
        }
        if sender == receiver {
            return self
                .reject(sender, receiver, gift_cost, GiftError::SameAccount)
                .await;
        }

        let sender_account = match self.repo.get_account(sender).await {
            Ok(acc) => acc,
            Err(e) => return self.reject(sender, receiver, gift_cost, e).await,
        };
        if let Err(e) = self.repo.get_account(receiver).await {
            return self.reject(sender, receiver, gift_cost, e).await;
        }
        if sender_account.wallet().diamonds() < gift_cost {
            return self
                .reject(sender, receiver, gift_cost, GiftError::InsufficientFunds)
                .await;
        }

        let plan = TransferPlan {
            sender: sender.clone(),
            receiver: receiver.clone(),
            diamond_debit: gift_cost,
            coin_credit: self.economy.coin_credit(gift_cost),
            sender_xp: self.economy.sender_xp(gift_cost),
            receiver_xp: self.economy.receiver_xp(self.economy.coin_credit(gift_cost)),
        };

        // === Atomic commit, bounded conflict retries ===
        let committed = match self.commit_with_retries(plan).await {
            Ok(committed) => committed,
            Err(e) => return self.reject(sender, receiver, gift_cost, e).await,
        };

        // === Audit strictly after commit, best-effort ===
        let record = GiftTransactionRecord::new(
            sender.clone(),
            receiver.clone(),
            gift_cost,
            TransactionOutcome::Committed,
        );
        if let Err(e) = self.repo.append_audit(record).await {
            warn!(sender = %sender, receiver = %receiver, "Audit append failed: {}", e);
        }

        // === Broadcast strictly after commit, fire-and-forget ===
        let leveled_up = committed.receiver_progress.leveled_up;
        let new_receiver_level = committed.receiver.level();
        self.gateway.publish(
            room,
            RoomEvent::GiftReceived {
                sender: sender.clone(),
                receiver: receiver.clone(),
                amount: gift_cost,
                leveled_up,
                new_receiver_level,
            },
        );
        if force_global || gift_cost > self.economy.super_gift_threshold {
            self.gateway.publish_global(RoomEvent::GlobalAnnouncement {
                sender: sender.clone(),
                receiver: receiver.clone(),
                amount: gift_cost,
            });
        }

        info!(
            sender = %sender,
            receiver = %receiver,
            amount = gift_cost,
            leveled_up,
            "Gift committed"
        );

        Ok(TransferResult {
            sender_diamonds: committed.sender.wallet().diamonds(),
            receiver_coins: committed.receiver.wallet().coins(),
            receiver_level: new_receiver_level,
            receiver_theme: theme_for(new_receiver_level),
            leveled_up,
        })
    }

    /// Commit the plan, retrying bounded times on repository conflicts.
    ///
    /// Each attempt runs under the configured timeout so a stuck backend
    /// fails retryable instead of hanging the request.
    async fn commit_with_retries(
        &self,
        plan: TransferPlan,
    ) -> Result<CommittedAccounts, GiftError> {
        let timeout = Duration::from_millis(self.economy.commit_timeout_ms);
        let max_attempts = self.economy.max_commit_attempts.max(1);

        for attempt in 1..=max_attempts {
            let commit = tokio::time::timeout(timeout, self.repo.atomic_transfer(plan.clone()));
            match commit.await {
                Err(_) => return Err(GiftError::Timeout),
                Ok(Ok(committed)) => return Ok(committed),
                Ok(Err(GiftError::Conflict)) if attempt < max_attempts => {
                    debug!(
                        sender = %plan.sender,
                        receiver = %plan.receiver,
                        attempt,
                        "Commit conflict, retrying"
                    );
                }
                Ok(Err(GiftError::Conflict)) => {
                    warn!(
                        sender = %plan.sender,
                        receiver = %plan.receiver,
                        attempts = max_attempts,
                        "Commit conflict retries exhausted"
                    );
                    return Err(GiftError::Conflict);
                }
                Ok(Err(e)) => return Err(e),
            }
        }
        unreachable!("retry loop always returns")
    }

    /// Record a rejected attempt and surface the error.
    ///
    /// The record is written best-effort with the rejection reason code;
    /// both accounts are untouched by construction.
    async fn reject(
        &self,
        sender: &Identity,
        receiver: &Identity,
        amount: u64,
        error: GiftError,
    ) -> Result<TransferResult, GiftError> {
        let record = GiftTransactionRecord::new(
            sender.clone(),
            receiver.clone(),
            amount,
            TransactionOutcome::rejected(error.code()),
        );
        if let Err(audit_err) = self.repo.append_audit(record).await {
            warn!(sender = %sender, "Audit append failed for rejection: {}", audit_err);
        }
        debug!(sender = %sender, receiver = %receiver, amount, code = error.code(), "Gift rejected");
        Err(error)
    }

    /// Redeem coins into diamonds at the configured rate.
    ///
    /// Only whole-diamond multiples are deducted; the remainder stays on
    /// the coin balance. Every attempt is audited, committed or rejected,
    /// with the identity on both sides of the record.
    pub async fn redeem_coins(
        &self,
        identity: &Identity,
        coin_amount: u64,
    ) -> Result<Account, GiftError> {
        let rate = self.economy.redeem_coins_per_diamond.max(1);
        let diamonds_gained = coin_amount / rate;
        let coins_deducted = diamonds_gained * rate;

        if coin_amount < self.economy.redeem_minimum_coins {
            let err = GiftError::BelowMinimumRedeem(self.economy.redeem_minimum_coins);
            self.audit_single(identity, diamonds_gained, TransactionOutcome::rejected(err.code()))
                .await;
            return Err(err);
        }

        match self
            .repo
            .atomic_exchange(identity, coins_deducted, diamonds_gained)
            .await
        {
            Ok(account) => {
                self.audit_single(identity, diamonds_gained, TransactionOutcome::Committed)
                    .await;
                info!(
                    identity = %identity,
                    coins_deducted,
                    diamonds_gained,
                    "Redemption committed"
                );
                Ok(account)
            }
            Err(e) => {
                self.audit_single(identity, diamonds_gained, TransactionOutcome::rejected(e.code()))
                    .await;
                Err(e)
            }
        }
    }

    /// Record a single-account operation; the affected identity stands on
    /// both sides of the record. Best-effort, like the gift path.
    async fn audit_single(&self, identity: &Identity, amount: u64, outcome: TransactionOutcome) {
        let record =
            GiftTransactionRecord::new(identity.clone(), identity.clone(), amount, outcome);
        if let Err(e) = self.repo.append_audit(record).await {
            warn!(identity = %identity, "Audit append failed: {}", e);
        }
    }

    /// Apply the ledger credit produced by an approved recharge.
    ///
    /// The approval workflow itself lives elsewhere; only its resulting
    /// ledger entry is in scope here.
    pub async fn credit_recharge(
        &self,
        identity: &Identity,
        diamonds: u64,
    ) -> Result<Account, GiftError> {
        if diamonds == 0 {
            return Err(GiftError::InvalidAmount);
        }
        let account = self.repo.credit_recharge(identity, diamonds).await?;
        self.audit_single(identity, diamonds, TransactionOutcome::Committed)
            .await;
        Ok(account)
    }
}
