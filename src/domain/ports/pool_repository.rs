use crate::domain::entities::scored_stock::ScoredStock;
use crate::domain::entities::screened_stock::ScreenedStock;
use crate::domain::error::DomainError;
use crate::domain::values::day::Day;

/// Pool-1 and pool-2 live behind one port: pool-2 rows are derived 1:1 from
/// pool-1 rows and deleting a pool-1 row cascades.
pub trait PoolRepository: Send + Sync {
    /// Atomically delete the day's pool-1 rows (pool-2 cascades) and insert
    /// the new set.
    fn replace_pool1(&self, day: Day, stocks: &[ScreenedStock]) -> Result<(), DomainError>;

    fn list_pool1(&self, day: Day) -> Result<Vec<ScreenedStock>, DomainError>;

    fn count_pool1(&self, day: Day) -> Result<usize, DomainError>;

    /// Atomically delete the day's pool-2 rows and insert the new set.
    /// Pool-1 rows are untouched.
    fn replace_pool2(&self, day: Day, stocks: &[ScoredStock]) -> Result<(), DomainError>;

    fn list_pool2(&self, day: Day) -> Result<Vec<ScoredStock>, DomainError>;

    fn count_pool2(&self, day: Day) -> Result<usize, DomainError>;

    /// Delete a day's pool-1 rows (and, via cascade, pool-2). Returns the
    /// number of pool-1 rows removed.
    fn delete_day(&self, day: Day) -> Result<usize, DomainError>;
}
