use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use tower::Service;
use uuid::Uuid;

use crate::ports::{catalog::CatalogPort, ledger::LedgerPort};

use super::{Error, TransactionEngine};

/// Read a customer's current point balance.
#[derive(Clone, Copy, Debug)]
pub struct GetBalanceRequest {
    pub customer_id: Uuid,
}

#[derive(Debug, PartialEq, Eq)]
pub struct GetBalanceResponse {
    pub customer_id: Uuid,
    pub balance: u64,
}

impl<L, C> Service<GetBalanceRequest> for TransactionEngine<L, C>
where
    L: LedgerPort + Send + Sync + 'static,
    C: CatalogPort + Send + Sync + 'static,
{
    type Response = GetBalanceResponse;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: GetBalanceRequest) -> Self::Future {
        let ledger = self.ledger.clone();
        Box::pin(async move {
            let balance = ledger
                .balance(req.customer_id)
                .await
                .map_err(Error::from_ledger)?;

            Ok(GetBalanceResponse {
                customer_id: req.customer_id,
                balance,
            })
        })
    }
}
