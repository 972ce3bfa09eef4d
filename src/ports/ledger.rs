use uuid::Uuid;

use crate::domain::{EntryDraft, LedgerEntry};

/// Result of a successful commit.
#[derive(Clone, Debug)]
pub struct Committed {
    /// The entry as durably recorded, with its assigned id and timestamp.
    pub entry: LedgerEntry,
    /// Balance after the entry's delta was applied.
    pub new_balance: u64,
}

/// Authoritative balance store and append-only transaction ledger.
///
/// The two live behind one port because a commit must apply the balance
/// delta and append the ledger entry as a single indivisible unit: either
/// both persist or neither does.
#[mockall::automock]
#[async_trait::async_trait]
pub trait LedgerPort {
    /// Current balance for the customer.
    async fn balance(&self, customer_id: Uuid) -> Result<u64, Error>;

    /// Atomically apply `draft.points_delta` to the balance and append the
    /// entry to the customer's ledger.
    ///
    /// Linearizable per customer: no two concurrent commits may both read
    /// the same pre-delta balance and both succeed on it. Fails with
    /// [`Error::InsufficientBalance`] if the resulting balance would be
    /// negative, leaving balance and ledger untouched.
    async fn commit(&self, customer_id: Uuid, draft: EntryDraft) -> Result<Committed, Error>;

    /// All committed entries for the customer, oldest first, in the order
    /// their deltas were applied to the balance.
    ///
    /// Audit and reconciliation path, not the transaction hot path.
    async fn entries(&self, customer_id: Uuid) -> Result<Vec<LedgerEntry>, Error>;
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The referenced account does not exist.
    #[error("customer {0} does not exist")]
    CustomerNotFound(Uuid),

    /// Applying the delta would drive the balance below zero.
    #[error("balance {balance} cannot absorb delta {delta}")]
    InsufficientBalance { balance: u64, delta: i64 },

    /// Concrete adapter errors
    ///
    /// This could represent any errors from a concrete adapter that is not part of the domain
    /// model, such as connectivity, configuration, or permission errors.
    #[error("adapter error: {0:?}")]
    Adapter(Box<dyn std::error::Error + Send + Sync>),
}
