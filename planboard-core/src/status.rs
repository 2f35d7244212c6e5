//! Task/milestone status, derived from date fields on every read.
//!
//! Status is never persisted. The three optional dates on a record fully
//! determine it, and clearing a date moves the status back (no terminal
//! state is enforced).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    Unscheduled,
    Scheduled,
    InProgress,
    Done,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Unscheduled => "unscheduled",
            Status::Scheduled => "scheduled",
            Status::InProgress => "in-progress",
            Status::Done => "done",
        }
    }
}

/// Derive status from the scheduled/start/complete dates.
///
/// Precedence: a record with no scheduled date is Unscheduled regardless of
/// the other fields.
pub fn derive_status(
    scheduled: Option<DateTime<Utc>>,
    start: Option<DateTime<Utc>>,
    complete: Option<DateTime<Utc>>,
) -> Status {
    if scheduled.is_none() {
        Status::Unscheduled
    } else if start.is_none() {
        Status::Scheduled
    } else if complete.is_none() {
        Status::InProgress
    } else {
        Status::Done
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn d(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, day, 9, 0, 0).unwrap()
    }

    #[test]
    fn walks_the_four_stages() {
        assert_eq!(derive_status(None, None, None), Status::Unscheduled);
        assert_eq!(derive_status(Some(d(1)), None, None), Status::Scheduled);
        assert_eq!(derive_status(Some(d(1)), Some(d(2)), None), Status::InProgress);
        assert_eq!(derive_status(Some(d(1)), Some(d(2)), Some(d(3))), Status::Done);
    }

    #[test]
    fn clearing_complete_reverts_to_in_progress() {
        assert_eq!(derive_status(Some(d(1)), Some(d(2)), None), Status::InProgress);
    }

    #[test]
    fn missing_scheduled_wins_over_later_fields() {
        assert_eq!(derive_status(None, Some(d(2)), Some(d(3))), Status::Unscheduled);
    }
}
