use std::collections::HashMap;

use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::dates::date_key;

/// Status strings as the application has always stored them. The legacy
/// three-state data carries `present`/`absent`/`on leave`; the newer
/// take-attendance flow additionally writes `late`. Anything else is kept
/// verbatim in `Other` and counted only toward the day total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(from = "String", into = "String")]
pub enum AttendanceStatus {
    #[strum(serialize = "present")]
    Present,
    #[strum(serialize = "absent")]
    Absent,
    #[strum(to_string = "on leave", serialize = "on-leave")]
    OnLeave,
    #[strum(serialize = "late")]
    Late,
    #[strum(default)]
    Other(String),
}

impl From<String> for AttendanceStatus {
    fn from(value: String) -> Self {
        value.parse().unwrap_or(AttendanceStatus::Other(value))
    }
}

impl From<AttendanceStatus> for String {
    fn from(value: AttendanceStatus) -> Self {
        value.to_string()
    }
}

/// One student's status on one day, the unit both physical layouts reduce to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentMark {
    pub student_id: String,
    pub name: String,
    pub status: AttendanceStatus,
}

/// Legacy layout: one document per student per (class, date) partition.
/// `recorded_at` is the write moment, not the attendance date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayRecord {
    pub class_id: String,
    pub date: String,
    pub student_id: String,
    pub name: String,
    pub status: AttendanceStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub recorded_at: DateTime<Utc>,
}

impl DayRecord {
    pub fn mark(&self) -> StudentMark {
        StudentMark {
            student_id: self.student_id.clone(),
            name: self.name.clone(),
            status: self.status.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthEntry {
    pub name: String,
    pub status: AttendanceStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Newer layout: one document per (class, month) holding a
/// date string -> student id -> entry map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthDocument {
    pub class_id: String,
    pub month: String,
    #[serde(default)]
    pub days: HashMap<String, HashMap<String, MonthEntry>>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl MonthDocument {
    /// Marks recorded for one day, or `None` when the document has no entry
    /// for that date and the legacy layout should be probed instead.
    pub fn day_marks(&self, date: NaiveDate) -> Option<Vec<StudentMark>> {
        self.days.get(&date_key(date)).map(|students| {
            students
                .iter()
                .map(|(student_id, entry)| StudentMark {
                    student_id: student_id.clone(),
                    name: entry.name.clone(),
                    status: entry.status.clone(),
                })
                .collect()
        })
    }
}

/// Derived per-(class, date) aggregation. Never persisted, safe to discard
/// and recompute at any time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaySummary {
    pub class_id: String,
    pub date: NaiveDate,
    pub present: u32,
    pub absent: u32,
    pub leave: u32,
    pub late: u32,
    pub total: u32,
    pub percentage: u32,
    pub students: Vec<StudentMark>,
}

impl DaySummary {
    pub fn empty(class_id: &str, date: NaiveDate) -> Self {
        DaySummary {
            class_id: class_id.to_string(),
            date,
            present: 0,
            absent: 0,
            leave: 0,
            late: 0,
            total: 0,
            percentage: 0,
            students: Vec::new(),
        }
    }

    /// Fold raw marks into counts. Student order follows the fetch; no
    /// sorting guarantee is made. `late` counts as attended for the
    /// percentage, matching the four-state take-attendance flow.
    pub fn fold(class_id: &str, date: NaiveDate, students: Vec<StudentMark>) -> Self {
        let mut summary = DaySummary::empty(class_id, date);
        for mark in &students {
            match mark.status {
                AttendanceStatus::Present => summary.present += 1,
                AttendanceStatus::Absent => summary.absent += 1,
                AttendanceStatus::OnLeave => summary.leave += 1,
                AttendanceStatus::Late => summary.late += 1,
                AttendanceStatus::Other(_) => {}
            }
        }
        summary.total = students.len() as u32;
        summary.students = students;
        summary.percentage = attended_percent(summary.attended(), summary.total);
        summary
    }

    pub fn attended(&self) -> u32 {
        self.present + self.late
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}

/// Whole-number attendance percentage, `0` when nothing was recorded.
pub fn attended_percent(attended: u32, total: u32) -> u32 {
    if total == 0 {
        0
    } else {
        (attended as f64 / total as f64 * 100.0).round() as u32
    }
}
