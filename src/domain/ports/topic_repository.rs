use crate::domain::entities::topic::Topic;
use crate::domain::error::DomainError;
use crate::domain::values::day::Day;

pub trait TopicRepository: Send + Sync {
    /// Atomically delete the day's topics and insert the new set. Readers
    /// never observe a mixed old/new result.
    fn replace_day(&self, day: Day, topics: &[Topic]) -> Result<(), DomainError>;

    /// Topics for a day, mention_count desc then sector asc.
    fn list_for_day(&self, day: Day) -> Result<Vec<Topic>, DomainError>;

    fn count_for_day(&self, day: Day) -> Result<usize, DomainError>;

    fn delete_day(&self, day: Day) -> Result<usize, DomainError>;
}
