//! Event input validation
//!
//! The time-window rule lives here and nowhere else; create and update both
//! call [`validate_window`] so the two paths cannot drift apart.

use chrono::{DateTime, Utc};
use convene_domain::constants::{MAX_TITLE_LENGTH, MAX_VENUE_LENGTH};
use convene_domain::{ConveneError, NewEvent, Result};

/// Reject windows where the end does not strictly follow the start.
pub fn validate_window(start_time: DateTime<Utc>, end_time: DateTime<Utc>) -> Result<()> {
    if end_time <= start_time {
        return Err(ConveneError::InvalidTimeRange);
    }
    Ok(())
}

/// Validate the textual fields shared by create and update.
pub fn validate_text_fields(title: &str, description: &str, venue: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(ConveneError::Validation("Title is required".to_string()));
    }
    if title.len() > MAX_TITLE_LENGTH {
        return Err(ConveneError::Validation(format!(
            "Title cannot exceed {MAX_TITLE_LENGTH} characters"
        )));
    }
    if description.trim().is_empty() {
        return Err(ConveneError::Validation("Description is required".to_string()));
    }
    if venue.trim().is_empty() {
        return Err(ConveneError::Validation("Venue is required".to_string()));
    }
    if venue.len() > MAX_VENUE_LENGTH {
        return Err(ConveneError::Validation(format!(
            "Venue cannot exceed {MAX_VENUE_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Validate a capacity value when one is set.
pub fn validate_capacity(capacity: Option<u32>) -> Result<()> {
    if capacity == Some(0) {
        return Err(ConveneError::Validation("Capacity must be at least 1".to_string()));
    }
    Ok(())
}

/// Full validation for event creation.
///
/// Creating an event whose window already closed is rejected with
/// `PastEvent`; updates deliberately skip that check so finished events can
/// still be edited for the record.
pub fn validate_new_event(input: &NewEvent, now: DateTime<Utc>) -> Result<()> {
    validate_text_fields(&input.title, &input.description, &input.venue)?;
    validate_capacity(input.capacity)?;
    validate_window(input.start_time, input.end_time)?;
    if input.end_time < now {
        return Err(ConveneError::PastEvent);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample_input(start: DateTime<Utc>, end: DateTime<Utc>) -> NewEvent {
        NewEvent {
            title: "Robotics demo".to_string(),
            description: "Hands-on session".to_string(),
            venue: "Lab 2".to_string(),
            start_time: start,
            end_time: end,
            capacity: Some(20),
        }
    }

    #[test]
    fn test_window_must_be_strictly_increasing() {
        let now = Utc::now();
        assert!(matches!(validate_window(now, now), Err(ConveneError::InvalidTimeRange)));
        assert!(matches!(
            validate_window(now, now - Duration::hours(1)),
            Err(ConveneError::InvalidTimeRange)
        ));
        assert!(validate_window(now, now + Duration::hours(1)).is_ok());
    }

    #[test]
    fn test_new_event_in_the_past_is_rejected() {
        let now = Utc::now();
        let input = sample_input(now - Duration::hours(3), now - Duration::hours(1));
        assert!(matches!(validate_new_event(&input, now), Err(ConveneError::PastEvent)));
    }

    #[test]
    fn test_new_event_that_already_started_is_allowed() {
        // Started but not finished: callers may still create it mid-window.
        let now = Utc::now();
        let input = sample_input(now - Duration::hours(1), now + Duration::hours(1));
        assert!(validate_new_event(&input, now).is_ok());
    }

    #[test]
    fn test_title_length_limit() {
        let now = Utc::now();
        let mut input = sample_input(now + Duration::hours(1), now + Duration::hours(2));
        input.title = "x".repeat(MAX_TITLE_LENGTH + 1);
        assert!(matches!(validate_new_event(&input, now), Err(ConveneError::Validation(_))));
    }

    #[test]
    fn test_blank_fields_rejected() {
        let now = Utc::now();
        let mut input = sample_input(now + Duration::hours(1), now + Duration::hours(2));
        input.description = "   ".to_string();
        assert!(matches!(validate_new_event(&input, now), Err(ConveneError::Validation(_))));
    }

    #[test]
    fn test_zero_capacity_rejected() {
        assert!(matches!(validate_capacity(Some(0)), Err(ConveneError::Validation(_))));
        assert!(validate_capacity(None).is_ok());
        assert!(validate_capacity(Some(1)).is_ok());
    }
}
