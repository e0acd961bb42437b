use crate::Number;
use core::future::Future;

/// The persistence side of a run.
///
/// [`ProducerOrchestrator::save`] depends only on [`Self::save_all`]; the
/// remaining operations make up the read and maintenance surface of a
/// store. Implementations must make `save_all` atomic: either every record
/// of the batch is stored or none is.
///
/// [`ProducerOrchestrator::save`]: crate::ProducerOrchestrator::save
pub trait NumberStore: Send + Sync {
    type Error: core::error::Error + Send + Sync + 'static;

    /// Creates the backing table if it does not exist. Idempotent.
    fn ensure_schema(&self) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Durably stores the whole batch in one transaction.
    fn save_all(&self, records: &[Number]) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Returns up to `count` stored records.
    fn fetch_first(
        &self,
        count: usize,
    ) -> impl Future<Output = Result<Vec<Number>, Self::Error>> + Send;

    /// Returns every stored record.
    fn fetch_all(&self) -> impl Future<Output = Result<Vec<Number>, Self::Error>> + Send;

    /// Removes every stored record, returning how many were removed.
    fn delete_all(&self) -> impl Future<Output = Result<u64, Self::Error>> + Send;
}
