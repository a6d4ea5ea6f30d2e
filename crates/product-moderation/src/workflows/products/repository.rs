use super::domain::{ProductId, ProductKey, ProductRecord, ProductSubmission};

/// Storage abstraction for pending and live products.
///
/// Implementations must reject an insert whose name or barcode is already claimed by a
/// pending or live record, and must do so atomically with the insert itself.
pub trait ProductStore: Send + Sync {
    fn exists(&self, key: ProductKey<'_>) -> Result<bool, StoreError>;
    fn insert_pending(&self, submission: &ProductSubmission) -> Result<ProductId, StoreError>;
    /// Returns `Ok(false)` when `id` is not a pending record.
    fn move_to_live(&self, id: ProductId) -> Result<bool, StoreError>;
    /// Returns `Ok(false)` when `id` is not a pending record.
    fn discard(&self, id: ProductId) -> Result<bool, StoreError>;
    fn fetch(&self, id: ProductId) -> Result<Option<ProductRecord>, StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("a product with this {field} already exists")]
    Conflict { field: &'static str },
    #[error("product store unavailable: {0}")]
    Unavailable(String),
}
