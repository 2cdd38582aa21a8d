//! Registration preconditions
//!
//! These checks are the single source of truth for who may join or leave an
//! event. Store implementations call them against the event row they just
//! read, inside the same unit of work that performs the write, so a racing
//! writer can never slip between check and append. The check order is part
//! of the contract: state gate, then capacity, then membership.

use chrono::{DateTime, Utc};
use convene_domain::{ConveneError, Event, EventStatus, Result};
use uuid::Uuid;

use crate::status::compute_status;

/// May `user_id` register for `event` at `now`?
///
/// Gating uses the computed status, so a stale stored status never lets a
/// registration through after the event started.
pub fn check_register(event: &Event, user_id: Uuid, now: DateTime<Utc>) -> Result<()> {
    if compute_status(event.start_time, event.end_time, now) != EventStatus::Upcoming {
        return Err(ConveneError::InvalidState(
            "Cannot register for completed or ongoing events".to_string(),
        ));
    }
    if let Some(capacity) = event.capacity {
        if event.attendees.len() as u32 >= capacity {
            return Err(ConveneError::CapacityExceeded);
        }
    }
    if event.attendees.contains(&user_id) {
        return Err(ConveneError::AlreadyRegistered);
    }
    Ok(())
}

/// May `user_id` withdraw from `event` at `now`?
///
/// Membership is frozen once an event is ongoing or completed, mirroring
/// registration.
pub fn check_unregister(event: &Event, user_id: Uuid, now: DateTime<Utc>) -> Result<()> {
    if compute_status(event.start_time, event.end_time, now) != EventStatus::Upcoming {
        return Err(ConveneError::InvalidState(
            "Cannot unregister from completed or ongoing events".to_string(),
        ));
    }
    if !event.attendees.contains(&user_id) {
        return Err(ConveneError::NotRegistered);
    }
    Ok(())
}
