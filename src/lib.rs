//! Gift Ledger - the transactional core of a live voice chat room economy.
//!
//! Users send virtual gifts that convert between two currencies (diamonds
//! spent, coins earned) and drive an experience/level progression. The
//! crate covers the pieces with real invariants - conservation of currency,
//! monotonic leveling, at-most-once broadcast - behind swappable repository
//! and gateway seams.
//!
//! # Modules
//!
//! - [`core_types`] - Identity/room key newtypes
//! - [`wallet`] - Enforced two-currency balance type
//! - [`account`] - One user's economic state
//! - [`level`] - Pure XP -> level/tier engine
//! - [`gift`] - Read-only gift catalog
//! - [`audit`] - Immutable per-attempt transaction records
//! - [`repository`] - Transactional ledger seam + in-memory backend
//! - [`broadcast`] - Room publish/subscribe gateway
//! - [`coordinator`] - The atomic gift transaction coordinator
//! - [`config`] / [`logging`] - App configuration and tracing setup

// Core types - must be first!
pub mod core_types;

// Economy components
pub mod account;
pub mod audit;
pub mod broadcast;
pub mod coordinator;
pub mod gift;
pub mod level;
pub mod repository;
pub mod wallet;

// App plumbing
pub mod config;
pub mod error;
pub mod logging;

// Convenient re-exports at crate root
pub use account::Account;
pub use audit::{GiftTransactionRecord, RecordId, TransactionOutcome};
pub use broadcast::{BroadcastGateway, RoomBroadcaster, RoomEvent};
pub use config::{AppConfig, EconomyConfig};
pub use coordinator::{GiftCoordinator, TransferResult};
pub use core_types::{Identity, Level, RoomId, Xp};
pub use error::GiftError;
pub use gift::{EntryEffect, GiftCatalog, GiftCategory, GiftDefinition};
pub use level::{CosmeticTier, LevelPolicy, Progress, apply_experience, required_experience, theme_for};
pub use repository::{CommittedAccounts, LedgerRepository, MemoryLedger, TransferPlan};
pub use wallet::Wallet;
