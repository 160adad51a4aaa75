use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use eyre::Result;
use futures_util::future::join_all;
use log::error;
use model::attendance::DaySummary;
use model::dates::{school_week, MonthKey};
use model::report::{roll_up_day, roll_up_month, roll_up_week, DayReport, MonthReport, WeekReport};
use parking_lot::Mutex;

use crate::source::AttendanceSource;

type CacheKey = (String, NaiveDate);

/// The attendance aggregator. Folds raw per-student records into per-day
/// summaries and report roll-ups, caching every (class, date) result for
/// the life of the session. The cache has no eviction; it is dropped only
/// through the explicit clear calls after a save.
#[derive(Clone)]
pub struct Reports {
    source: Arc<dyn AttendanceSource>,
    cache: Arc<Mutex<HashMap<CacheKey, DaySummary>>>,
}

impl Reports {
    pub(crate) fn new(source: Arc<dyn AttendanceSource>) -> Self {
        Reports {
            source,
            cache: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Summary for one class on one day. Served from cache when possible;
    /// otherwise the month-document layout is tried first and the legacy
    /// per-date partition probed as the fallback. A class or date with no
    /// records yields a zero summary, not an error; only a store failure
    /// is an `Err`, and failed lookups are never cached.
    pub async fn fetch_class_attendance(
        &self,
        class_id: &str,
        date: NaiveDate,
    ) -> Result<DaySummary> {
        let key = (class_id.to_string(), date);
        if let Some(summary) = self.cache.lock().get(&key) {
            return Ok(summary.clone());
        }

        let marks = match self.source.month_day(class_id, date).await? {
            Some(marks) => marks,
            None => self.source.legacy_day(class_id, date).await?,
        };

        let summary = DaySummary::fold(class_id, date, marks);
        self.cache.lock().insert(key, summary.clone());
        Ok(summary)
    }

    /// Every (class, date) combination, fetched concurrently. A failing
    /// pair degrades to a zero summary and never fails its siblings.
    /// Results are tagged with class id and date; callers must match by
    /// tag, not by position.
    pub async fn fetch_bulk(&self, class_ids: &[String], dates: &[NaiveDate]) -> Vec<DaySummary> {
        let mut fetches = Vec::with_capacity(class_ids.len() * dates.len());
        for class_id in class_ids {
            for date in dates {
                fetches.push(async move {
                    match self.fetch_class_attendance(class_id, *date).await {
                        Ok(summary) => summary,
                        Err(err) => {
                            error!(
                                "Failed to fetch attendance for {} on {}: {:?}",
                                class_id, date, err
                            );
                            DaySummary::empty(class_id, *date)
                        }
                    }
                });
            }
        }
        join_all(fetches).await
    }

    /// All classes summed for one date.
    pub async fn daily_report(&self, class_ids: &[String], date: NaiveDate) -> DayReport {
        let summaries = self.fetch_bulk(class_ids, &[date]).await;
        roll_up_day(date, summaries)
    }

    /// Monday-to-Friday of the week containing `anchor`.
    pub async fn weekly_report(&self, class_ids: &[String], anchor: NaiveDate) -> WeekReport {
        let week = school_week(anchor);
        let results = self.fetch_bulk(class_ids, &week).await;
        let days = week
            .iter()
            .map(|date| {
                let classes = results
                    .iter()
                    .filter(|summary| summary.date == *date)
                    .cloned()
                    .collect();
                roll_up_day(*date, classes)
            })
            .collect();
        roll_up_week(week[0], days)
    }

    /// Every weekday of the month.
    pub async fn monthly_report(&self, class_ids: &[String], month: MonthKey) -> MonthReport {
        let dates = month.weekdays();
        let results = self.fetch_bulk(class_ids, &dates).await;
        let days = dates
            .iter()
            .map(|date| {
                let classes = results
                    .iter()
                    .filter(|summary| summary.date == *date)
                    .cloned()
                    .collect();
                roll_up_day(*date, classes)
            })
            .collect();
        roll_up_month(month, days)
    }

    /// Class ids that have attendance data in either layout.
    pub async fn class_ids(&self) -> Result<Vec<String>> {
        self.source.class_ids().await
    }

    pub fn clear_cache(&self) {
        self.cache.lock().clear();
    }

    pub fn clear_class_date(&self, class_id: &str, date: NaiveDate) {
        self.cache.lock().remove(&(class_id.to_string(), date));
    }

    pub fn clear_month(&self, class_id: &str, month: MonthKey) {
        self.cache
            .lock()
            .retain(|(cached_class, date), _| cached_class != class_id || !month.contains(*date));
    }
}
