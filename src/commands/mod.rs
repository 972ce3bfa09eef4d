use std::{borrow::Cow, sync::Arc};

use uuid::Uuid;

use crate::{
    domain::EngineConfig,
    ports::{catalog, ledger},
};

pub mod balance;
pub mod earn;
pub mod redeem;

pub use balance::{GetBalanceRequest, GetBalanceResponse};
pub use earn::{EarnRequest, EarnResponse};
pub use redeem::{RedeemRequest, RedeemResponse};

/// The transaction engine: the only component allowed to mutate balances.
///
/// One [`tower::Service`] implementation per operation (`Earn`, `Redeem`,
/// `GetBalance`). The engine holds shared handles to its two collaborators
/// and performs no background work; every call runs to completion, commit
/// or abort, before returning.
pub struct TransactionEngine<L, C> {
    ledger: Arc<L>,
    catalog: Arc<C>,
    config: EngineConfig,
}

impl<L, C> TransactionEngine<L, C> {
    pub fn new(ledger: Arc<L>, catalog: Arc<C>, config: EngineConfig) -> Self {
        Self {
            ledger,
            catalog,
            config,
        }
    }
}

// One engine handle per terminal/session; they all share the same ports.
impl<L, C> Clone for TransactionEngine<L, C> {
    fn clone(&self) -> Self {
        Self {
            ledger: Arc::clone(&self.ledger),
            catalog: Arc::clone(&self.catalog),
            config: self.config,
        }
    }
}

/// Engine-surface errors, typed so callers can branch on the kind.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The referenced account does not exist. Not retryable.
    #[error("customer {0} does not exist")]
    CustomerNotFound(Uuid),

    /// The referenced catalog item does not exist or is not currently
    /// redeemable. Not retryable.
    #[error("product {0} does not exist or is not redeemable")]
    ProductNotFound(Uuid),

    /// Balance below the requested redemption amount.
    ///
    /// A user-facing rejection, not an internal fault.
    #[error("insufficient points: balance {balance}, requested {requested}")]
    InsufficientPoints { balance: u64, requested: u64 },

    /// The caller-supplied amount does not equal the catalog's current
    /// price. Distinct from [`Error::InsufficientPoints`] so the caller
    /// can re-fetch the price and retry with corrected input.
    #[error("price mismatch for product {product_id}: catalog price {expected}, supplied {supplied}")]
    PriceMismatch {
        product_id: Uuid,
        expected: u64,
        supplied: u64,
    },

    /// Non-positive amounts or otherwise malformed input.
    #[error("invalid input: {0}")]
    InvalidInput(Cow<'static, str>),

    /// Transient infrastructure failure. The only class the caller may
    /// retry; the engine itself never retries a commit.
    #[error("storage unavailable: {0:?}")]
    Storage(Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    /// Map ledger port errors onto the engine surface.
    ///
    /// `InsufficientBalance` comes back from the atomic commit when a
    /// concurrent transaction spent the balance after validation read it;
    /// it surfaces as the same rejection an upfront check produces.
    fn from_ledger(err: ledger::Error) -> Self {
        match err {
            ledger::Error::CustomerNotFound(customer_id) => Error::CustomerNotFound(customer_id),
            ledger::Error::InsufficientBalance { balance, delta } => Error::InsufficientPoints {
                balance,
                requested: delta.unsigned_abs(),
            },
            ledger::Error::Adapter(err) => Error::Storage(err),
        }
    }

    fn from_catalog(err: catalog::Error) -> Self {
        match err {
            catalog::Error::ProductNotFound(product_id) => Error::ProductNotFound(product_id),
            catalog::Error::Adapter(err) => Error::Storage(err),
        }
    }
}
