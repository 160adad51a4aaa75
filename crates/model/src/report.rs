use chrono::NaiveDate;
use serde::Serialize;

use crate::attendance::DaySummary;
use crate::dates::MonthKey;

/// One date summed across classes. The percent is computed from the summed
/// counts, never averaged over per-class percentages.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayReport {
    pub date: NaiveDate,
    pub present: u32,
    pub absent: u32,
    pub leave: u32,
    pub late: u32,
    pub total: u32,
    pub percent: f64,
    pub classes: Vec<DaySummary>,
}

/// Monday-to-Friday of one week. The week percent is the arithmetic mean of
/// the five daily percents, which is NOT the same as attended/total over the
/// whole week when day sizes differ. Days without records weigh in as 0.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekReport {
    pub monday: NaiveDate,
    pub days: Vec<DayReport>,
    pub percent: f64,
}

/// Weekdays of one month. Unlike the weekly view, days without a single
/// record are excluded from the month percent instead of dragging it down.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthReport {
    pub month: MonthKey,
    pub days_in_month: u32,
    pub counted_days: u32,
    pub percent: f64,
    pub total_marks: u32,
    pub days: Vec<DayReport>,
}

pub fn roll_up_day(date: NaiveDate, classes: Vec<DaySummary>) -> DayReport {
    let mut report = DayReport {
        date,
        present: 0,
        absent: 0,
        leave: 0,
        late: 0,
        total: 0,
        percent: 0.0,
        classes: Vec::new(),
    };
    for class in &classes {
        report.present += class.present;
        report.absent += class.absent;
        report.leave += class.leave;
        report.late += class.late;
        report.total += class.total;
    }
    report.percent = percent_of(report.present + report.late, report.total);
    report.classes = classes;
    report
}

pub fn roll_up_week(monday: NaiveDate, days: Vec<DayReport>) -> WeekReport {
    let percent = if days.is_empty() {
        0.0
    } else {
        round2(days.iter().map(|day| day.percent).sum::<f64>() / days.len() as f64)
    };
    WeekReport {
        monday,
        days,
        percent,
    }
}

pub fn roll_up_month(month: MonthKey, days: Vec<DayReport>) -> MonthReport {
    let mut percent_sum = 0.0;
    let mut counted_days = 0u32;
    let mut total_marks = 0u32;
    for day in &days {
        total_marks += day.total;
        if day.total > 0 {
            percent_sum += day.percent;
            counted_days += 1;
        }
    }
    let percent = if counted_days == 0 {
        0.0
    } else {
        round2(percent_sum / counted_days as f64)
    };
    MonthReport {
        month,
        days_in_month: month.days_in_month(),
        counted_days,
        percent,
        total_marks,
        days,
    }
}

/// Attendance share with two decimal places, `0` when nothing was recorded.
pub fn percent_of(attended: u32, total: u32) -> f64 {
    if total == 0 {
        0.0
    } else {
        round2(attended as f64 / total as f64 * 100.0)
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attendance::{AttendanceStatus, DaySummary, StudentMark};

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, day).unwrap()
    }

    fn summary(class_id: &str, day: u32, present: u32, absent: u32) -> DaySummary {
        let mut students = Vec::new();
        for index in 0..present {
            students.push(StudentMark {
                student_id: format!("p{}", index),
                name: format!("Present {}", index),
                status: AttendanceStatus::Present,
            });
        }
        for index in 0..absent {
            students.push(StudentMark {
                student_id: format!("a{}", index),
                name: format!("Absent {}", index),
                status: AttendanceStatus::Absent,
            });
        }
        DaySummary::fold(class_id, date(day), students)
    }

    #[test]
    fn daily_roll_up_sums_before_dividing() {
        // 8/10 and 4/10 must combine to 60%, not the 60%-by-accident
        // average of 80% and 40% - and not that average when sizes differ.
        let report = roll_up_day(
            date(2),
            vec![summary("kg1-a", 2, 8, 2), summary("kg1-b", 2, 4, 6)],
        );
        assert_eq!(report.present, 12);
        assert_eq!(report.total, 20);
        assert_eq!(report.percent, 60.0);

        // Unequal class sizes make the distinction visible: 9/10 and 1/2
        // is 10/12 = 83.33%, not (90 + 50) / 2 = 70%.
        let uneven = roll_up_day(
            date(3),
            vec![summary("kg1-a", 3, 9, 1), summary("kg1-b", 3, 1, 1)],
        );
        assert_eq!(uneven.percent, 83.33);
    }

    #[test]
    fn daily_roll_up_keeps_per_class_breakdown() {
        let report = roll_up_day(
            date(2),
            vec![summary("kg1-a", 2, 8, 2), summary("kg1-b", 2, 4, 6)],
        );
        assert_eq!(report.classes.len(), 2);
        assert_eq!(report.classes[0].class_id, "kg1-a");
        assert_eq!(report.classes[0].percentage, 80);
        assert_eq!(report.classes[1].percentage, 40);
    }

    #[test]
    fn empty_day_is_zero() {
        let report = roll_up_day(date(2), Vec::new());
        assert_eq!(report.total, 0);
        assert_eq!(report.percent, 0.0);
    }

    #[test]
    fn weekly_roll_up_averages_daily_percents() {
        // Per-day percents [100, 80, 60, 100, 60] -> 80, even though the
        // underlying totals differ per day.
        let days = vec![
            roll_up_day(date(2), vec![summary("kg1-a", 2, 5, 0)]),
            roll_up_day(date(3), vec![summary("kg1-a", 3, 8, 2)]),
            roll_up_day(date(4), vec![summary("kg1-a", 4, 3, 2)]),
            roll_up_day(date(5), vec![summary("kg1-a", 5, 20, 0)]),
            roll_up_day(date(6), vec![summary("kg1-a", 6, 6, 4)]),
        ];
        let report = roll_up_week(date(2), days);
        assert_eq!(report.percent, 80.0);
    }

    #[test]
    fn weekly_roll_up_counts_empty_days_as_zero() {
        let days = vec![
            roll_up_day(date(2), vec![summary("kg1-a", 2, 10, 0)]),
            roll_up_day(date(3), Vec::new()),
            roll_up_day(date(4), Vec::new()),
            roll_up_day(date(5), Vec::new()),
            roll_up_day(date(6), Vec::new()),
        ];
        let report = roll_up_week(date(2), days);
        assert_eq!(report.percent, 20.0);
    }

    #[test]
    fn monthly_roll_up_skips_days_without_records() {
        let month = MonthKey::new(2026, 3).unwrap();
        let days = vec![
            roll_up_day(date(2), vec![summary("kg1-a", 2, 10, 0)]),
            roll_up_day(date(3), Vec::new()),
            roll_up_day(date(4), vec![summary("kg1-a", 4, 5, 5)]),
            roll_up_day(date(5), Vec::new()),
        ];
        let report = roll_up_month(month, days);
        // (100 + 50) / 2, not divided by four.
        assert_eq!(report.percent, 75.0);
        assert_eq!(report.counted_days, 2);
        assert_eq!(report.days_in_month, 31);
        assert_eq!(report.total_marks, 20);
    }

    #[test]
    fn monthly_roll_up_with_no_records_is_zero() {
        let month = MonthKey::new(2026, 3).unwrap();
        let report = roll_up_month(month, vec![roll_up_day(date(3), Vec::new())]);
        assert_eq!(report.percent, 0.0);
        assert_eq!(report.counted_days, 0);
    }

    #[test]
    fn late_counts_toward_day_percent() {
        let marks = vec![
            StudentMark {
                student_id: "s1".into(),
                name: "S1".into(),
                status: AttendanceStatus::Present,
            },
            StudentMark {
                student_id: "s2".into(),
                name: "S2".into(),
                status: AttendanceStatus::Late,
            },
            StudentMark {
                student_id: "s3".into(),
                name: "S3".into(),
                status: AttendanceStatus::Absent,
            },
            StudentMark {
                student_id: "s4".into(),
                name: "S4".into(),
                status: AttendanceStatus::Absent,
            },
        ];
        let report = roll_up_day(date(2), vec![DaySummary::fold("kg1-a", date(2), marks)]);
        assert_eq!(report.percent, 50.0);
    }
}
