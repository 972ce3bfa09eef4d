use chrono::Utc;
use dashmap::DashMap;
use uuid::Uuid;

use crate::{
    domain::{EntryDraft, LedgerEntry},
    ports::ledger::{Committed, Error, LedgerPort},
};

/// Per-customer account state: current balance plus the full entry history.
#[derive(Debug, Default)]
struct CustomerRecord {
    balance: u64,
    entries: Vec<LedgerEntry>,
    next_id: u64,
}

/// In-memory ledger adapter.
///
/// Customers are sharded across a [`DashMap`], so commits against distinct
/// customers proceed in parallel while commits against the same customer
/// serialize on that customer's entry. The entry lock is held for the whole
/// commit, which makes the balance check, the delta application, and the
/// ledger append one indivisible unit.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    customers: DashMap<Uuid, CustomerRecord>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an account with balance 0 and an empty ledger.
    ///
    /// Registration happens outside the transaction engine; this is the
    /// hook the surrounding system (and tests) use. A no-op if the
    /// customer already exists.
    pub fn register_customer(&self, customer_id: Uuid) {
        self.customers.entry(customer_id).or_default();
    }
}

#[async_trait::async_trait]
impl LedgerPort for MemoryLedger {
    async fn balance(&self, customer_id: Uuid) -> Result<u64, Error> {
        self.customers
            .get(&customer_id)
            .map(|record| record.balance)
            .ok_or(Error::CustomerNotFound(customer_id))
    }

    async fn commit(&self, customer_id: Uuid, draft: EntryDraft) -> Result<Committed, Error> {
        let mut record = self
            .customers
            .get_mut(&customer_id)
            .ok_or(Error::CustomerNotFound(customer_id))?;

        let new_balance = match record.balance.checked_add_signed(draft.points_delta) {
            Some(balance) => balance,
            None if draft.points_delta < 0 => {
                return Err(Error::InsufficientBalance {
                    balance: record.balance,
                    delta: draft.points_delta,
                })
            }
            None => return Err(Error::Adapter("balance overflow".into())),
        };

        // Timestamps must never decrease within a customer's ledger, even
        // if the wall clock does.
        let now = Utc::now();
        let timestamp = match record.entries.last() {
            Some(prev) if prev.timestamp > now => prev.timestamp,
            _ => now,
        };

        record.next_id += 1;
        let entry = LedgerEntry {
            id: record.next_id,
            customer_id,
            kind: draft.kind,
            points_delta: draft.points_delta,
            source_amount: draft.source_amount,
            product_id: draft.product_id,
            actor_id: draft.actor_id,
            timestamp,
        };

        record.balance = new_balance;
        record.entries.push(entry.clone());

        Ok(Committed { entry, new_balance })
    }

    async fn entries(&self, customer_id: Uuid) -> Result<Vec<LedgerEntry>, Error> {
        self.customers
            .get(&customer_id)
            .map(|record| record.entries.clone())
            .ok_or(Error::CustomerNotFound(customer_id))
    }
}
