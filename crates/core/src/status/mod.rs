//! Event status engine
//!
//! An event's lifecycle stage is purely a function of its time window and the
//! clock. [`compute_status`] is that function; every decision in the system
//! uses it rather than trusting the stored status column, which is only a
//! cache refreshed before writes and by the periodic sweep.

pub mod service;

pub use service::{StatusService, SweepSummary};

use chrono::{DateTime, Utc};
use convene_domain::EventStatus;

/// Compute the status of an event at a given instant.
///
/// The end boundary is inclusive: an event is still ongoing at exactly
/// `end_time`. For a fixed window the result is monotonic in `now`
/// (upcoming, then ongoing, then completed); editing the window itself may
/// move the status backward, which is expected.
pub fn compute_status(
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    now: DateTime<Utc>,
) -> EventStatus {
    if now < start_time {
        EventStatus::Upcoming
    } else if now > end_time {
        EventStatus::Completed
    } else {
        EventStatus::Ongoing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 14, 9, 0, 0).single().unwrap()
    }

    #[test]
    fn test_upcoming_before_start() {
        let start = t0();
        let end = start + Duration::hours(2);
        assert_eq!(compute_status(start, end, start - Duration::seconds(1)), EventStatus::Upcoming);
    }

    #[test]
    fn test_ongoing_at_exact_start() {
        let start = t0();
        let end = start + Duration::hours(2);
        assert_eq!(compute_status(start, end, start), EventStatus::Ongoing);
    }

    #[test]
    fn test_ongoing_mid_window() {
        let start = t0();
        let end = start + Duration::hours(2);
        assert_eq!(compute_status(start, end, start + Duration::hours(1)), EventStatus::Ongoing);
    }

    #[test]
    fn test_ongoing_at_exact_end() {
        let start = t0();
        let end = start + Duration::hours(2);
        assert_eq!(compute_status(start, end, end), EventStatus::Ongoing);
    }

    #[test]
    fn test_completed_after_end() {
        let start = t0();
        let end = start + Duration::hours(2);
        assert_eq!(compute_status(start, end, end + Duration::seconds(1)), EventStatus::Completed);
    }

    #[test]
    fn test_monotonic_for_fixed_window() {
        let start = t0();
        let end = start + Duration::hours(2);
        let mut last = compute_status(start, end, start - Duration::days(1));
        let mut now = start - Duration::days(1);
        while now < end + Duration::days(1) {
            let status = compute_status(start, end, now);
            let rank = |s: EventStatus| match s {
                EventStatus::Upcoming => 0,
                EventStatus::Ongoing => 1,
                EventStatus::Completed => 2,
            };
            assert!(rank(status) >= rank(last), "status moved backward at {now}");
            last = status;
            now += Duration::minutes(17);
        }
    }
}
