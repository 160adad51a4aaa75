use std::sync::Arc;

use chrono::NaiveDate;
use log::info;
use model::attendance::StudentMark;
use model::dates::MonthKey;
use thiserror::Error;

use crate::service::reports::Reports;
use crate::source::AttendanceSource;

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("Class id is empty")]
    EmptyClassId,
    #[error("No marks to save")]
    EmptyMarks,
    #[error(transparent)]
    Store(#[from] eyre::Error),
}

/// The attendance write path. Every save invalidates the matching report
/// cache entries so the next read reflects the just-written data.
#[derive(Clone)]
pub struct Register {
    source: Arc<dyn AttendanceSource>,
    reports: Reports,
}

impl Register {
    pub(crate) fn new(source: Arc<dyn AttendanceSource>, reports: Reports) -> Self {
        Register { source, reports }
    }

    /// Save one day of marks into the legacy per-date partition, one
    /// update-in-place per student.
    pub async fn save_day(
        &self,
        class_id: &str,
        date: NaiveDate,
        marks: &[StudentMark],
    ) -> Result<(), SaveError> {
        validate(class_id, marks)?;
        self.source.save_day(class_id, date, marks).await?;
        self.reports.clear_class_date(class_id, date);
        info!(
            "Attendance saved: {} {} ({} students)",
            class_id,
            date,
            marks.len()
        );
        Ok(())
    }

    /// Merge one day of marks into the (class, month) document.
    pub async fn save_month_day(
        &self,
        class_id: &str,
        date: NaiveDate,
        marks: &[StudentMark],
    ) -> Result<(), SaveError> {
        validate(class_id, marks)?;
        self.source.save_month_day(class_id, date, marks).await?;
        self.reports.clear_month(class_id, MonthKey::of(date));
        info!(
            "Month attendance saved: {} {} ({} students)",
            class_id,
            date,
            marks.len()
        );
        Ok(())
    }
}

fn validate(class_id: &str, marks: &[StudentMark]) -> Result<(), SaveError> {
    if class_id.is_empty() {
        return Err(SaveError::EmptyClassId);
    }
    if marks.is_empty() {
        return Err(SaveError::EmptyMarks);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use model::attendance::AttendanceStatus;

    use super::*;
    use crate::source::testing::{mark, FakeSource};

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 5).unwrap()
    }

    fn services(source: Arc<FakeSource>) -> (Reports, Register) {
        let reports = Reports::new(source.clone());
        let register = Register::new(source, reports.clone());
        (reports, register)
    }

    #[tokio::test]
    async fn save_day_invalidates_the_cached_entry() {
        let source = Arc::new(FakeSource::default());
        source.put_legacy("kg1-a", date(), vec![mark("s1", AttendanceStatus::Absent)]);
        let (reports, register) = services(source);

        let stale = reports.fetch_class_attendance("kg1-a", date()).await.unwrap();
        assert_eq!(stale.absent, 1);

        register
            .save_day("kg1-a", date(), &[mark("s1", AttendanceStatus::Present)])
            .await
            .unwrap();

        let fresh = reports.fetch_class_attendance("kg1-a", date()).await.unwrap();
        assert_eq!(fresh.present, 1);
        assert_eq!(fresh.absent, 0);
        // The re-save replaced the record, it did not add a second one.
        assert_eq!(fresh.total, 1);
    }

    #[tokio::test]
    async fn save_month_day_invalidates_the_whole_month() {
        let source = Arc::new(FakeSource::default());
        source.put_month("kg1-a", date(), vec![mark("s1", AttendanceStatus::Absent)]);
        let (reports, register) = services(source);

        reports.fetch_class_attendance("kg1-a", date()).await.unwrap();

        register
            .save_month_day("kg1-a", date(), &[mark("s1", AttendanceStatus::Late)])
            .await
            .unwrap();

        let fresh = reports.fetch_class_attendance("kg1-a", date()).await.unwrap();
        assert_eq!(fresh.late, 1);
        assert_eq!(fresh.absent, 0);
        assert_eq!(fresh.percentage, 100);
    }

    #[tokio::test]
    async fn save_month_day_keeps_other_classes_cached() {
        let source = Arc::new(FakeSource::default());
        source.put_month("kg1-a", date(), vec![mark("s1", AttendanceStatus::Present)]);
        source.put_month("kg1-b", date(), vec![mark("s2", AttendanceStatus::Present)]);
        let (reports, register) = services(source.clone());

        reports.fetch_class_attendance("kg1-a", date()).await.unwrap();
        reports.fetch_class_attendance("kg1-b", date()).await.unwrap();
        let reads_before = source.reads();

        register
            .save_month_day("kg1-a", date(), &[mark("s1", AttendanceStatus::Absent)])
            .await
            .unwrap();

        reports.fetch_class_attendance("kg1-b", date()).await.unwrap();
        assert_eq!(source.reads(), reads_before);
    }

    #[tokio::test]
    async fn rejects_empty_input() {
        let source = Arc::new(FakeSource::default());
        let (_, register) = services(source);

        let err = register
            .save_day("", date(), &[mark("s1", AttendanceStatus::Present)])
            .await
            .unwrap_err();
        assert!(matches!(err, SaveError::EmptyClassId));

        let err = register.save_day("kg1-a", date(), &[]).await.unwrap_err();
        assert!(matches!(err, SaveError::EmptyMarks));

        let err = register
            .save_month_day("kg1-a", date(), &[])
            .await
            .unwrap_err();
        assert!(matches!(err, SaveError::EmptyMarks));
    }
}
