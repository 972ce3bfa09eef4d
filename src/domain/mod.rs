use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Minor currency units that convert into one loyalty point.
///
/// An in-store purchase of `n` units earns `n / DEFAULT_RATE_DIVISOR`
/// points, rounded down.
pub const DEFAULT_RATE_DIVISOR: u64 = 10_000;

/// Engine-level configuration, injected at construction.
#[derive(Clone, Copy, Debug)]
pub struct EngineConfig {
    /// Minor currency units per earned point. Must be positive.
    pub rate_divisor: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            rate_divisor: DEFAULT_RATE_DIVISOR,
        }
    }
}

/// Points earned by a purchase of `source_amount` minor currency units.
///
/// Integer floor division; amounts below one point's worth earn zero,
/// which is still a valid, recorded transaction.
pub fn points_for_amount(source_amount: u64, rate_divisor: u64) -> u64 {
    source_amount / rate_divisor
}

/// The two kinds of balance-affecting transactions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryKind {
    /// A monetary purchase converted into points added to the balance.
    Earn,
    /// Points subtracted from the balance in exchange for a catalog product.
    Redeem,
}

/// One immutable record of a balance-affecting event.
///
/// Created exactly once by the ledger at commit time; never mutated or
/// deleted afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LedgerEntry {
    /// Per-customer sequence number, strictly increasing.
    pub id: u64,
    pub customer_id: Uuid,
    pub kind: EntryKind,
    /// Signed points difference; `>= 0` for `Earn`, `< 0` for `Redeem`.
    pub points_delta: i64,
    /// Monetary amount (minor units) that generated the points.
    ///
    /// Informational only; it is never re-validated after the fact.
    pub source_amount: Option<u64>,
    /// Redeemed product, for `Redeem` entries.
    ///
    /// Weak reference: the product may later disappear from the catalog
    /// without invalidating this entry.
    pub product_id: Option<Uuid>,
    /// The authenticated staff operator who initiated the transaction.
    pub actor_id: Uuid,
    /// Commit time, monotonically non-decreasing per customer.
    pub timestamp: DateTime<Utc>,
}

/// A transaction awaiting commit.
///
/// The ledger assigns `id` and `timestamp` when the draft is committed.
/// Constructed through [`EntryDraft::earn`] or [`EntryDraft::redeem`] so
/// the delta sign always matches the kind.
#[derive(Clone, Debug)]
pub struct EntryDraft {
    pub kind: EntryKind,
    pub points_delta: i64,
    pub source_amount: Option<u64>,
    pub product_id: Option<Uuid>,
    pub actor_id: Uuid,
}

impl EntryDraft {
    /// Draft for a purchase of `source_amount` minor units earning `points`.
    pub fn earn(actor_id: Uuid, points: u64, source_amount: u64) -> Self {
        Self {
            kind: EntryKind::Earn,
            points_delta: points as i64,
            source_amount: Some(source_amount),
            product_id: None,
            actor_id,
        }
    }

    /// Draft for a redemption of `points` against `product_id`.
    pub fn redeem(actor_id: Uuid, points: u64, product_id: Uuid) -> Self {
        Self {
            kind: EntryKind::Redeem,
            points_delta: -(points as i64),
            source_amount: None,
            product_id: Some(product_id),
            actor_id,
        }
    }
}
