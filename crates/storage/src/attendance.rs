use bson::doc;
use chrono::{NaiveDate, Utc};
use eyre::Result;
use futures_util::TryStreamExt as _;
use log::info;
use model::attendance::{DayRecord, MonthDocument, MonthEntry, StudentMark};
use model::dates::{date_key, MonthKey};
use mongodb::options::{IndexOptions, UpdateOptions};
use mongodb::{Collection, IndexModel};

use crate::db::Db;

const DAYS_COLLECTION: &str = "attendance";
const MONTHS_COLLECTION: &str = "attendance_months";

/// Attendance collections in both physical layouts: the legacy per-student
/// documents partitioned by (class, date), and the per-(class, month)
/// documents carrying a nested date -> student -> entry map. Readers must
/// cope with data living in either.
#[derive(Clone)]
pub struct AttendanceStore {
    days: Collection<DayRecord>,
    months: Collection<MonthDocument>,
}

impl AttendanceStore {
    pub(crate) async fn new(db: &Db) -> Result<Self> {
        let days: Collection<DayRecord> = db.collection(DAYS_COLLECTION);
        // One status per student per (class, date); a re-save is an update
        // in place, never a second record.
        days.create_index(
            IndexModel::builder()
                .keys(doc! { "class_id": 1, "date": 1, "student_id": 1 })
                .options(IndexOptions::builder().unique(true).build())
                .build(),
        )
        .await?;

        let months: Collection<MonthDocument> = db.collection(MONTHS_COLLECTION);
        months
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "class_id": 1, "month": 1 })
                    .options(IndexOptions::builder().unique(true).build())
                    .build(),
            )
            .await?;

        Ok(AttendanceStore { days, months })
    }

    /// One day's marks from the month document, `None` when the document is
    /// missing or has no entry for the date.
    pub async fn month_day(
        &self,
        class_id: &str,
        date: NaiveDate,
    ) -> Result<Option<Vec<StudentMark>>> {
        let filter = doc! {
            "class_id": class_id,
            "month": MonthKey::of(date).to_string(),
        };
        let document = self.months.find_one(filter).await?;
        Ok(document.and_then(|document| document.day_marks(date)))
    }

    /// One day's marks from the legacy per-date partition, in cursor order.
    pub async fn legacy_day(&self, class_id: &str, date: NaiveDate) -> Result<Vec<StudentMark>> {
        let filter = doc! { "class_id": class_id, "date": date_key(date) };
        let records: Vec<DayRecord> = self.days.find(filter).await?.try_collect().await?;
        Ok(records.iter().map(DayRecord::mark).collect())
    }

    /// Class ids that have attendance data in either layout.
    pub async fn class_ids(&self) -> Result<Vec<String>> {
        let mut raw = self.days.distinct("class_id", doc! {}).await?;
        raw.extend(self.months.distinct("class_id", doc! {}).await?);
        let mut ids: Vec<String> = raw
            .into_iter()
            .filter_map(|id| id.as_str().map(str::to_owned))
            .collect();
        ids.sort();
        ids.dedup();
        Ok(ids)
    }

    pub async fn upsert_day_mark(
        &self,
        class_id: &str,
        date: NaiveDate,
        mark: &StudentMark,
    ) -> Result<()> {
        info!(
            "Saving attendance: {} {} {} -> {}",
            class_id, date, mark.student_id, mark.status
        );
        let filter = doc! {
            "class_id": class_id,
            "date": date_key(date),
            "student_id": &mark.student_id,
        };
        let update = doc! {
            "$set": {
                "name": &mark.name,
                "status": mark.status.to_string(),
                "recorded_at": bson::DateTime::from_chrono(Utc::now()),
            }
        };
        self.days
            .update_one(filter, update)
            .with_options(UpdateOptions::builder().upsert(true).build())
            .await?;
        Ok(())
    }

    /// Merge one day's marks into the (class, month) document, creating it
    /// when absent. Existing entries for the same students are overwritten.
    pub async fn merge_month_day(
        &self,
        class_id: &str,
        date: NaiveDate,
        marks: &[StudentMark],
    ) -> Result<()> {
        info!(
            "Saving month attendance: {} {} ({} students)",
            class_id,
            date,
            marks.len()
        );
        let mut fields = doc! {
            "updated_at": bson::DateTime::from_chrono(Utc::now()),
        };
        let day = date_key(date);
        for mark in marks {
            let entry = MonthEntry {
                name: mark.name.clone(),
                status: mark.status.clone(),
                note: None,
            };
            fields.insert(
                format!("days.{}.{}", day, mark.student_id),
                bson::to_bson(&entry)?,
            );
        }
        let filter = doc! {
            "class_id": class_id,
            "month": MonthKey::of(date).to_string(),
        };
        self.months
            .update_one(filter, doc! { "$set": fields })
            .with_options(UpdateOptions::builder().upsert(true).build())
            .await?;
        Ok(())
    }
}
