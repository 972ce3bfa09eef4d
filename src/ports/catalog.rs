use uuid::Uuid;

/// Read-only lookup into the external product catalog.
///
/// The catalog owns product lifecycle; the engine only consumes the
/// current redemption price and must read it fresh at every redemption,
/// never a cached value.
#[mockall::automock]
#[async_trait::async_trait]
pub trait CatalogPort {
    /// Current points cost of the product.
    ///
    /// Only products with a defined, positive cost are redeemable.
    async fn points_cost(&self, product_id: Uuid) -> Result<u64, Error>;
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The id does not resolve to a currently redeemable product.
    #[error("product {0} does not exist or is not redeemable")]
    ProductNotFound(Uuid),

    /// Concrete adapter errors
    ///
    /// This could represent any errors from a concrete adapter that is not part of the domain
    /// model, such as connectivity, configuration, or permission errors.
    #[error("adapter error: {0:?}")]
    Adapter(Box<dyn std::error::Error + Send + Sync>),
}
