use async_trait::async_trait;
use chrono::NaiveDate;
use eyre::Result;
use model::attendance::StudentMark;
use storage::attendance::AttendanceStore;

/// Read/write surface of the attendance document store. The aggregation
/// layer only talks to the store through this trait, so tests can swap in
/// an in-memory source.
#[async_trait]
pub trait AttendanceSource: Send + Sync {
    /// Marks for one day from the month-document layout, `None` when that
    /// layout has no entry for the date.
    async fn month_day(&self, class_id: &str, date: NaiveDate)
        -> Result<Option<Vec<StudentMark>>>;

    /// Marks for one day from the legacy per-date partition, empty when
    /// nothing was recorded.
    async fn legacy_day(&self, class_id: &str, date: NaiveDate) -> Result<Vec<StudentMark>>;

    async fn class_ids(&self) -> Result<Vec<String>>;

    async fn save_day(&self, class_id: &str, date: NaiveDate, marks: &[StudentMark]) -> Result<()>;

    async fn save_month_day(
        &self,
        class_id: &str,
        date: NaiveDate,
        marks: &[StudentMark],
    ) -> Result<()>;
}

#[async_trait]
impl AttendanceSource for AttendanceStore {
    async fn month_day(
        &self,
        class_id: &str,
        date: NaiveDate,
    ) -> Result<Option<Vec<StudentMark>>> {
        AttendanceStore::month_day(self, class_id, date).await
    }

    async fn legacy_day(&self, class_id: &str, date: NaiveDate) -> Result<Vec<StudentMark>> {
        AttendanceStore::legacy_day(self, class_id, date).await
    }

    async fn class_ids(&self) -> Result<Vec<String>> {
        AttendanceStore::class_ids(self).await
    }

    async fn save_day(&self, class_id: &str, date: NaiveDate, marks: &[StudentMark]) -> Result<()> {
        for mark in marks {
            self.upsert_day_mark(class_id, date, mark).await?;
        }
        Ok(())
    }

    async fn save_month_day(
        &self,
        class_id: &str,
        date: NaiveDate,
        marks: &[StudentMark],
    ) -> Result<()> {
        self.merge_month_day(class_id, date, marks).await
    }
}
