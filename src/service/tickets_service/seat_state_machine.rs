//!
//! Pure seat lifecycle logic. Takes a seat value and the current time,
//! returns the next seat value plus a decision; persistence and clocks
//! stay with the caller.
//!

use crate::repository::{Seat, SeatStatus};
use std::time::Duration;
use time::OffsetDateTime;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Ok(Seat),
    ///
    /// The hold had already expired; carries the seat back in AVAILABLE
    ///
    Expired(Seat),
    ///
    /// Seat is PURCHASED, a terminal state
    ///
    SeatUnavailable,
    InvalidTransition,
}

///
/// AVAILABLE -> HOLD with hold_until = now + hold_window
///
pub fn hold(seat: Seat, now: OffsetDateTime, hold_window: Duration) -> Outcome {
    match seat.status {
        SeatStatus::Available => Outcome::Ok(Seat {
            status: SeatStatus::Hold,
            hold_until: Some(now + hold_window),
            ..seat
        }),
        SeatStatus::Hold => Outcome::SeatUnavailable,
        SeatStatus::Purchased => Outcome::SeatUnavailable,
    }
}

///
/// Lazy expiry: HOLD -> AVAILABLE when hold_until < now.
///
/// ### Returns
/// the seat back in AVAILABLE, or None when there is nothing to expire
///
pub fn expire_if_past(seat: &Seat, now: OffsetDateTime) -> Option<Seat> {
    match (seat.status, seat.hold_until) {
        (SeatStatus::Hold, Some(hold_until)) if hold_until < now => Some(Seat {
            status: SeatStatus::Available,
            hold_until: None,
            ..seat.clone()
        }),
        _ => None,
    }
}

///
/// HOLD -> PURCHASED, only while the hold is still valid (hold_until >= now)
///
pub fn confirm(seat: Seat, now: OffsetDateTime) -> Outcome {
    match (seat.status, seat.hold_until) {
        (SeatStatus::Hold, Some(hold_until)) => match hold_until >= now {
            true => Outcome::Ok(Seat {
                status: SeatStatus::Purchased,
                hold_until: None,
                ..seat
            }),
            false => Outcome::Expired(Seat {
                status: SeatStatus::Available,
                hold_until: None,
                ..seat
            }),
        },
        (SeatStatus::Purchased, _) => Outcome::SeatUnavailable,
        _ => Outcome::InvalidTransition,
    }
}

///
/// HOLD -> AVAILABLE without waiting for expiry
///
pub fn release(seat: Seat) -> Outcome {
    match seat.status {
        SeatStatus::Hold => Outcome::Ok(Seat {
            status: SeatStatus::Available,
            hold_until: None,
            ..seat
        }),
        SeatStatus::Purchased => Outcome::SeatUnavailable,
        SeatStatus::Available => Outcome::InvalidTransition,
    }
}
