use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use tower::Service;
use uuid::Uuid;

use crate::{
    domain::{points_for_amount, EntryDraft},
    ports::{catalog::CatalogPort, ledger::LedgerPort},
};

use super::{Error, TransactionEngine};

/// A monetary purchase to convert into points.
#[derive(Clone, Debug)]
pub struct EarnRequest {
    pub customer_id: Uuid,
    /// The staff operator mediating the transaction.
    pub actor_id: Uuid,
    /// Purchase amount in minor currency units. Must be positive.
    pub source_amount: u64,
}

#[derive(Debug, PartialEq, Eq)]
pub struct EarnResponse {
    pub customer_id: Uuid,
    pub new_balance: u64,
    /// Points credited by this purchase; zero is valid and still recorded.
    pub points_awarded: u64,
}

impl<L, C> Service<EarnRequest> for TransactionEngine<L, C>
where
    L: LedgerPort + Send + Sync + 'static,
    C: CatalogPort + Send + Sync + 'static,
{
    type Response = EarnResponse;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: EarnRequest) -> Self::Future {
        let ledger = self.ledger.clone();
        let rate_divisor = self.config.rate_divisor;
        Box::pin(async move {
            if req.source_amount == 0 {
                tracing::warn!(customer_id = %req.customer_id, "earn rejected: zero amount");
                return Err(Error::InvalidInput("source amount must be positive".into()));
            }

            let points = points_for_amount(req.source_amount, rate_divisor);
            let draft = EntryDraft::earn(req.actor_id, points, req.source_amount);

            // Single atomic unit: balance delta and ledger append commit
            // together or not at all.
            let committed = ledger
                .commit(req.customer_id, draft)
                .await
                .map_err(Error::from_ledger)?;

            tracing::debug!(
                customer_id = %req.customer_id,
                actor_id = %req.actor_id,
                points_awarded = points,
                new_balance = committed.new_balance,
                "earn committed"
            );

            Ok(EarnResponse {
                customer_id: req.customer_id,
                new_balance: committed.new_balance,
                points_awarded: points,
            })
        })
    }
}
