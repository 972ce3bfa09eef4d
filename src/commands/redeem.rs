use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use tower::Service;
use uuid::Uuid;

use crate::{
    domain::EntryDraft,
    ports::{catalog::CatalogPort, ledger::LedgerPort},
};

use super::{Error, TransactionEngine};

/// A request to spend points against a catalog product.
#[derive(Clone, Debug)]
pub struct RedeemRequest {
    pub customer_id: Uuid,
    /// The staff operator mediating the transaction.
    pub actor_id: Uuid,
    pub product_id: Uuid,
    /// Points the caller believes the product costs. Advisory: it must
    /// equal the catalog's current price exactly, not merely be affordable.
    pub points_to_redeem: u64,
}

#[derive(Debug, PartialEq, Eq)]
pub struct RedeemResponse {
    pub customer_id: Uuid,
    pub new_balance: u64,
}

impl<L, C> Service<RedeemRequest> for TransactionEngine<L, C>
where
    L: LedgerPort + Send + Sync + 'static,
    C: CatalogPort + Send + Sync + 'static,
{
    type Response = RedeemResponse;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: RedeemRequest) -> Self::Future {
        let ledger = self.ledger.clone();
        let catalog = self.catalog.clone();
        Box::pin(async move {
            // Validation phase: read-only, aborts freely with no side
            // effects. The commit below re-checks the balance atomically.
            if req.points_to_redeem == 0 {
                tracing::warn!(customer_id = %req.customer_id, "redeem rejected: zero points");
                return Err(Error::InvalidInput(
                    "points to redeem must be positive".into(),
                ));
            }

            let balance = ledger
                .balance(req.customer_id)
                .await
                .map_err(Error::from_ledger)?;
            if balance < req.points_to_redeem {
                tracing::warn!(
                    customer_id = %req.customer_id,
                    balance,
                    requested = req.points_to_redeem,
                    "redeem rejected: insufficient points"
                );
                return Err(Error::InsufficientPoints {
                    balance,
                    requested: req.points_to_redeem,
                });
            }

            // Always the live catalog price, never a cached one.
            let points_cost = catalog
                .points_cost(req.product_id)
                .await
                .map_err(Error::from_catalog)?;
            if points_cost != req.points_to_redeem {
                tracing::warn!(
                    customer_id = %req.customer_id,
                    product_id = %req.product_id,
                    expected = points_cost,
                    supplied = req.points_to_redeem,
                    "redeem rejected: price mismatch"
                );
                return Err(Error::PriceMismatch {
                    product_id: req.product_id,
                    expected: points_cost,
                    supplied: req.points_to_redeem,
                });
            }

            let draft = EntryDraft::redeem(req.actor_id, req.points_to_redeem, req.product_id);
            let committed = ledger
                .commit(req.customer_id, draft)
                .await
                .map_err(Error::from_ledger)?;

            tracing::debug!(
                customer_id = %req.customer_id,
                actor_id = %req.actor_id,
                product_id = %req.product_id,
                points_redeemed = req.points_to_redeem,
                new_balance = committed.new_balance,
                "redeem committed"
            );

            Ok(RedeemResponse {
                customer_id: req.customer_id,
                new_balance: committed.new_balance,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        adapters::{catalog::MemoryCatalog, ledger::MemoryLedger},
        domain::{EngineConfig, EntryDraft, EntryKind},
        ports::catalog::MockCatalogPort,
    };
    use mockall::predicate::*;
    use rstest::*;
    use speculoos::prelude::*;
    use std::sync::Arc;
    use tower::{BoxError, ServiceExt};

    #[fixture]
    fn customer_id() -> Uuid {
        Uuid::new_v4()
    }

    #[fixture]
    fn product_id() -> Uuid {
        Uuid::new_v4()
    }

    async fn ledger_with_balance(customer_id: Uuid, points: u64) -> Arc<MemoryLedger> {
        let ledger = Arc::new(MemoryLedger::new());
        ledger.register_customer(customer_id);
        if points > 0 {
            ledger
                .commit(
                    customer_id,
                    EntryDraft::earn(Uuid::new_v4(), points, points * 10_000),
                )
                .await
                .unwrap();
        }
        ledger
    }

    fn request(customer_id: Uuid, product_id: Uuid, points: u64) -> RedeemRequest {
        RedeemRequest {
            customer_id,
            actor_id: Uuid::new_v4(),
            product_id,
            points_to_redeem: points,
        }
    }

    #[rstest]
    #[tokio::test]
    async fn test_redeem_full_balance(customer_id: Uuid, product_id: Uuid) -> Result<(), BoxError> {
        // GIVEN a customer at balance 5 and a product costing 5
        let ledger = ledger_with_balance(customer_id, 5).await;
        let catalog = Arc::new(MemoryCatalog::new());
        catalog.set_cost(product_id, 5);
        let engine =
            TransactionEngine::new(Arc::clone(&ledger), catalog, EngineConfig::default());

        // WHEN redeeming 5 points
        let res = engine
            .oneshot(request(customer_id, product_id, 5))
            .await;

        // THEN the balance reaches 0 with one Redeem entry of delta -5
        assert_that!(res).is_ok().is_equal_to(RedeemResponse {
            customer_id,
            new_balance: 0,
        });
        let entries = ledger.entries(customer_id).await?;
        assert_that!(entries).has_length(2);
        assert_that!(entries[1].kind).is_equal_to(EntryKind::Redeem);
        assert_that!(entries[1].points_delta).is_equal_to(-5);
        assert_that!(entries[1].product_id).is_equal_to(Some(product_id));

        Ok(())
    }

    #[rstest]
    #[tokio::test]
    async fn test_redeem_with_insufficient_points(
        customer_id: Uuid,
        product_id: Uuid,
    ) -> Result<(), BoxError> {
        let ledger = ledger_with_balance(customer_id, 3).await;
        // The balance check precedes the catalog lookup, so no expectation
        // is registered on the catalog.
        let catalog = Arc::new(MockCatalogPort::new());
        let engine =
            TransactionEngine::new(Arc::clone(&ledger), catalog, EngineConfig::default());

        let res = engine
            .oneshot(request(customer_id, product_id, 5))
            .await;

        assert_that!(res).is_err().matches(|err| {
            matches!(
                err,
                Error::InsufficientPoints {
                    balance: 3,
                    requested: 5
                }
            )
        });
        // Balance and ledger untouched.
        assert_that!(ledger.balance(customer_id).await?).is_equal_to(3);
        assert_that!(ledger.entries(customer_id).await?).has_length(1);

        Ok(())
    }

    #[rstest]
    #[tokio::test]
    async fn test_redeem_price_mismatch(
        customer_id: Uuid,
        product_id: Uuid,
    ) -> Result<(), BoxError> {
        // Affordable, but the catalog says the product costs 8, not 5.
        let ledger = ledger_with_balance(customer_id, 10).await;
        let catalog = Arc::new(MemoryCatalog::new());
        catalog.set_cost(product_id, 8);
        let engine =
            TransactionEngine::new(Arc::clone(&ledger), catalog, EngineConfig::default());

        let res = engine
            .oneshot(request(customer_id, product_id, 5))
            .await;

        assert_that!(res).is_err().matches(|err| {
            matches!(
                err,
                Error::PriceMismatch {
                    expected: 8,
                    supplied: 5,
                    ..
                }
            )
        });
        assert_that!(ledger.balance(customer_id).await?).is_equal_to(10);

        Ok(())
    }

    #[rstest]
    #[tokio::test]
    async fn test_redeem_unknown_product(
        customer_id: Uuid,
        product_id: Uuid,
    ) -> Result<(), BoxError> {
        let ledger = ledger_with_balance(customer_id, 10).await;
        let mut catalog = MockCatalogPort::new();
        catalog
            .expect_points_cost()
            .times(1)
            .with(eq(product_id))
            .returning(move |id| Err(crate::ports::catalog::Error::ProductNotFound(id)));
        let engine = TransactionEngine::new(
            Arc::clone(&ledger),
            Arc::new(catalog),
            EngineConfig::default(),
        );

        let res = engine
            .oneshot(request(customer_id, product_id, 5))
            .await;

        assert_that!(res)
            .is_err()
            .matches(|err| matches!(err, Error::ProductNotFound(_)));
        assert_that!(ledger.balance(customer_id).await?).is_equal_to(10);
        assert_that!(ledger.entries(customer_id).await?).has_length(1);

        Ok(())
    }

    #[rstest]
    #[tokio::test]
    async fn test_redeem_catalog_unavailable(
        customer_id: Uuid,
        product_id: Uuid,
    ) -> Result<(), BoxError> {
        let ledger = ledger_with_balance(customer_id, 10).await;
        let mut catalog = MockCatalogPort::new();
        catalog.expect_points_cost().times(1).returning(|_| {
            Err(crate::ports::catalog::Error::Adapter(
                "connection reset".into(),
            ))
        });
        let engine = TransactionEngine::new(
            Arc::clone(&ledger),
            Arc::new(catalog),
            EngineConfig::default(),
        );

        let res = engine
            .oneshot(request(customer_id, product_id, 5))
            .await;

        // Transient infrastructure failures surface as Storage, the only
        // retryable class, and leave no trace.
        assert_that!(res)
            .is_err()
            .matches(|err| matches!(err, Error::Storage(_)));
        assert_that!(ledger.balance(customer_id).await?).is_equal_to(10);
        assert_that!(ledger.entries(customer_id).await?).has_length(1);

        Ok(())
    }

    #[rstest]
    #[tokio::test]
    async fn test_redeem_unknown_customer(
        customer_id: Uuid,
        product_id: Uuid,
    ) -> Result<(), BoxError> {
        let ledger = Arc::new(MemoryLedger::new());
        let catalog = Arc::new(MockCatalogPort::new());
        let engine = TransactionEngine::new(ledger, catalog, EngineConfig::default());

        let res = engine
            .oneshot(request(customer_id, product_id, 5))
            .await;

        assert_that!(res)
            .is_err()
            .matches(|err| matches!(err, Error::CustomerNotFound(_)));

        Ok(())
    }

    #[rstest]
    #[tokio::test]
    async fn test_redeem_zero_points_is_invalid(
        customer_id: Uuid,
        product_id: Uuid,
    ) -> Result<(), BoxError> {
        let ledger = ledger_with_balance(customer_id, 5).await;
        let catalog = Arc::new(MockCatalogPort::new());
        let engine =
            TransactionEngine::new(Arc::clone(&ledger), catalog, EngineConfig::default());

        let res = engine
            .oneshot(request(customer_id, product_id, 0))
            .await;

        assert_that!(res)
            .is_err()
            .matches(|err| matches!(err, Error::InvalidInput(_)));
        assert_that!(ledger.balance(customer_id).await?).is_equal_to(5);

        Ok(())
    }

    #[rstest]
    #[tokio::test]
    async fn test_redeem_reads_live_price(
        customer_id: Uuid,
        product_id: Uuid,
    ) -> Result<(), BoxError> {
        // The price changed after the caller fetched it; the stale amount
        // must be rejected even though it is affordable.
        let ledger = ledger_with_balance(customer_id, 10).await;
        let catalog = Arc::new(MemoryCatalog::new());
        catalog.set_cost(product_id, 5);
        let engine = TransactionEngine::new(
            Arc::clone(&ledger),
            Arc::clone(&catalog),
            EngineConfig::default(),
        );

        catalog.set_cost(product_id, 7);
        let res = engine
            .oneshot(request(customer_id, product_id, 5))
            .await;

        assert_that!(res).is_err().matches(|err| {
            matches!(
                err,
                Error::PriceMismatch {
                    expected: 7,
                    supplied: 5,
                    ..
                }
            )
        });

        Ok(())
    }
}
