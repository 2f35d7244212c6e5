//! Storage-shape records: what the record store persists.
//!
//! The business entities in `engineer`/`task`/`milestone` are mapped onto
//! these flat rows by the services. Two quirks worth knowing:
//! - a task's forecast date is persisted as an offset (whole seconds) from
//!   its scheduled date, not as an absolute date;
//! - milestones are task records with the `milestone` flag set, hidden from
//!   the plain task read path.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::level::ExperienceLevel;

/// Storage-facing experience scale. Same ordinal space as
/// [`ExperienceLevel`], distinct declared type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ExperienceGrade {
    Beginner = 0,
    AdvancedBeginner = 1,
    Intermediate = 2,
    Advanced = 3,
    Expert = 4,
}

impl From<ExperienceLevel> for ExperienceGrade {
    fn from(level: ExperienceLevel) -> Self {
        match level {
            ExperienceLevel::Beginner => ExperienceGrade::Beginner,
            ExperienceLevel::AdvancedBeginner => ExperienceGrade::AdvancedBeginner,
            ExperienceLevel::Intermediate => ExperienceGrade::Intermediate,
            ExperienceLevel::Advanced => ExperienceGrade::Advanced,
            ExperienceLevel::Expert => ExperienceGrade::Expert,
        }
    }
}

impl From<ExperienceGrade> for ExperienceLevel {
    fn from(grade: ExperienceGrade) -> Self {
        match grade {
            ExperienceGrade::Beginner => ExperienceLevel::Beginner,
            ExperienceGrade::AdvancedBeginner => ExperienceLevel::AdvancedBeginner,
            ExperienceGrade::Intermediate => ExperienceLevel::Intermediate,
            ExperienceGrade::Advanced => ExperienceLevel::Advanced,
            ExperienceGrade::Expert => ExperienceLevel::Expert,
        }
    }
}

/// A row the record store can hold: cloneable, addressed by integer id.
pub trait Record: Clone {
    fn id(&self) -> u32;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineerRecord {
    pub id: u32,
    pub name: String,
    pub email: String,
    pub grade: ExperienceGrade,
    pub cost: f64,
}

impl Record for EngineerRecord {
    fn id(&self) -> u32 {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub id: u32,
    pub description: String,
    pub alias: String,
    pub milestone: bool,
    pub created_at: DateTime<Utc>,
    /// Forecast date as an offset from `scheduled`, in whole seconds.
    /// Absent whenever either endpoint is absent.
    pub forecast_offset_secs: Option<i64>,
    pub start: Option<DateTime<Utc>>,
    pub scheduled: Option<DateTime<Utc>>,
    pub deadline: Option<DateTime<Utc>>,
    pub complete: Option<DateTime<Utc>>,
    pub deliverables: Option<String>,
    pub remarks: Option<String>,
    pub engineer_id: Option<u32>,
    pub complexity: Option<ExperienceGrade>,
}

impl Record for TaskRecord {
    fn id(&self) -> u32 {
        self.id
    }
}

/// One edge of the task dependency graph: `task_id` depends on
/// `depends_on_id`. Rows get their own running ids so the store contract
/// stays uniform across tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DependencyRecord {
    pub id: u32,
    pub task_id: u32,
    pub depends_on_id: u32,
}

impl Record for DependencyRecord {
    fn id(&self) -> u32 {
        self.id
    }
}

/// Encode an absolute forecast date as a stored offset.
///
/// Mirrors nullable subtraction: no scheduled date means no offset, so a
/// forecast written without a scheduled date does not survive the round
/// trip.
pub fn forecast_to_offset(
    scheduled: Option<DateTime<Utc>>,
    forecast: Option<DateTime<Utc>>,
) -> Option<i64> {
    match (scheduled, forecast) {
        (Some(s), Some(f)) => Some((f - s).num_seconds()),
        _ => None,
    }
}

/// Reconstitute the absolute forecast date from a stored offset.
pub fn forecast_from_offset(
    scheduled: Option<DateTime<Utc>>,
    offset_secs: Option<i64>,
) -> Option<DateTime<Utc>> {
    match (scheduled, offset_secs) {
        (Some(s), Some(o)) => Some(s + Duration::seconds(o)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn grade_level_conversions_are_inverse() {
        for level in [
            ExperienceLevel::Beginner,
            ExperienceLevel::AdvancedBeginner,
            ExperienceLevel::Intermediate,
            ExperienceLevel::Advanced,
            ExperienceLevel::Expert,
        ] {
            assert_eq!(ExperienceLevel::from(ExperienceGrade::from(level)), level);
        }
    }

    #[test]
    fn forecast_offset_round_trips() {
        let scheduled = Utc.with_ymd_and_hms(2026, 4, 1, 8, 0, 0).unwrap();
        let forecast = Utc.with_ymd_and_hms(2026, 4, 10, 17, 30, 0).unwrap();
        let off = forecast_to_offset(Some(scheduled), Some(forecast));
        assert_eq!(forecast_from_offset(Some(scheduled), off), Some(forecast));
    }

    #[test]
    fn forecast_before_scheduled_is_a_negative_offset() {
        let scheduled = Utc.with_ymd_and_hms(2026, 4, 10, 8, 0, 0).unwrap();
        let forecast = Utc.with_ymd_and_hms(2026, 4, 1, 8, 0, 0).unwrap();
        let off = forecast_to_offset(Some(scheduled), Some(forecast)).unwrap();
        assert!(off < 0);
        assert_eq!(forecast_from_offset(Some(scheduled), Some(off)), Some(forecast));
    }

    #[test]
    fn task_record_json_round_trips() {
        let rec = TaskRecord {
            id: 7,
            description: "wire format".into(),
            alias: "t7".into(),
            milestone: false,
            created_at: Utc.with_ymd_and_hms(2026, 4, 1, 8, 0, 0).unwrap(),
            forecast_offset_secs: Some(3600),
            start: None,
            scheduled: Some(Utc.with_ymd_and_hms(2026, 4, 2, 8, 0, 0).unwrap()),
            deadline: None,
            complete: None,
            deliverables: Some("binary".into()),
            remarks: None,
            engineer_id: Some(3),
            complexity: Some(ExperienceGrade::Advanced),
        };
        let json = serde_json::to_string(&rec).unwrap();
        let back: TaskRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, rec);
    }

    #[test]
    fn forecast_without_scheduled_is_dropped() {
        let forecast = Utc.with_ymd_and_hms(2026, 4, 1, 8, 0, 0).unwrap();
        assert_eq!(forecast_to_offset(None, Some(forecast)), None);
        assert_eq!(forecast_from_offset(None, Some(60)), None);
    }
}
