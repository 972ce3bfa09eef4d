//! Loyalty points ledger
//!
//! Converts monetary purchases into earned points and spends points
//! against a catalog of redeemable products, for one retail business with
//! multiple point-of-sale operators working concurrently against shared
//! customer balances.
//!
//! The crate is organized hexagonally:
//!
//! - [`domain`] - Ledger entries, drafts, points arithmetic, engine
//!   configuration
//! - [`ports`] - Trait seams to the collaborators the engine consumes:
//!   the balance-and-ledger store and the product catalog
//! - [`adapters`] - Concrete port implementations (in-memory)
//! - [`commands`] - The transaction engine: one [`tower::Service`] per
//!   operation (`Earn`, `Redeem`, `GetBalance`)
//!
//! Correctness rests on a single contract: a transaction's balance delta
//! and its ledger entry commit as one indivisible unit per customer, so
//! concurrent operations can never lose an update, double-spend points,
//! or drive a balance negative. Operations against distinct customers
//! proceed in parallel.

pub mod adapters;
pub mod commands;
pub mod domain;
pub mod ports;

pub use commands::{
    EarnRequest, EarnResponse, Error, GetBalanceRequest, GetBalanceResponse, RedeemRequest,
    RedeemResponse, TransactionEngine,
};
pub use domain::{EngineConfig, EntryDraft, EntryKind, LedgerEntry, DEFAULT_RATE_DIVISOR};
