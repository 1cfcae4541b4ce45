//! The availability engine: which start times can still be booked for a
//! staff member, service and date.
//!
//! Pure interval arithmetic over an immutable snapshot of the day: the
//! staff member's working window, the bookings already committed and the
//! global blocked times. No I/O, no clock reads, no hidden state; identical
//! inputs always produce identical output.

use chrono::NaiveDate;
use tracing::warn;

use crate::models::{BlockedTime, Booking, Service, Staff, TimeSlot};
use crate::utils::time::{
    format_display, format_hhmm, parse_clock_time, parse_time, weekday_name, ClockTime,
    MINUTES_PER_DAY,
};

/// Candidate start times are generated on this fixed grid.
pub const SLOT_GRANULARITY_MINUTES: u32 = 15;

/// Gap enforced after each appointment. Kept at zero; exists so a
/// per-deployment buffer can be introduced without touching the overlap
/// test.
pub const SLOT_BUFFER_MINUTES: u32 = 0;

/// A half-open `[start, end)` span in minutes since midnight.
type Interval = (u32, u32);

/// A day's working window in wire form (`HH:mm` strings).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkWindow {
    pub start: String,
    pub end: String,
}

/// Result of computing one day's availability.
///
/// An empty slot list can mean two different things to a customer, so the
/// day-off case is a distinct variant rather than an empty `Working` result.
#[derive(Debug, Clone, PartialEq)]
pub enum DayAvailability {
    /// No working-hours entry for the day, or the entry is marked not
    /// working. Carries the weekday name for the response message.
    NotWorking { day: &'static str },
    /// The staff member works this day; `slots` may still be empty when the
    /// day is fully booked or blocked.
    Working {
        window: WorkWindow,
        slots: Vec<TimeSlot>,
    },
}

/// Compute the bookable slots for `staff` performing `service` on `date`.
///
/// `bookings` must already be scoped to the same staff member and date;
/// `blocked` to the same date. Status filtering happens here: only pending
/// and confirmed bookings occupy time.
pub fn compute_slots(
    staff: &Staff,
    service: &Service,
    date: NaiveDate,
    bookings: &[Booking],
    blocked: &[BlockedTime],
) -> DayAvailability {
    let day = weekday_name(date);
    let Some(schedule) = staff.working_hours.get(day).filter(|s| s.is_working) else {
        return DayAvailability::NotWorking { day };
    };

    let window = WorkWindow {
        start: schedule.start.clone(),
        end: schedule.end.clone(),
    };

    let (work_start, work_end) = match (parse_time(&schedule.start), parse_time(&schedule.end)) {
        (Some((sh, sm)), Some((eh, em))) => (sh * 60 + sm, eh * 60 + em),
        _ => {
            warn!(
                staff_id = %staff.id,
                day,
                start = %schedule.start,
                end = %schedule.end,
                "unparseable working hours, day yields no slots"
            );
            return DayAvailability::Working {
                window,
                slots: Vec::new(),
            };
        }
    };

    let occupied = occupied_intervals(service, bookings, blocked);
    let duration = service.duration;

    let date_str = date.format("%Y-%m-%d").to_string();
    let mut slots = Vec::new();
    let mut candidate = work_start;
    // A candidate must allow the full appointment (plus buffer) to complete
    // within the working window; no partial-fit slots.
    while candidate + duration + SLOT_BUFFER_MINUTES <= work_end {
        if interval_is_free(candidate, duration + SLOT_BUFFER_MINUTES, &occupied) {
            let time = format_hhmm(candidate);
            slots.push(TimeSlot {
                display: format_display(candidate),
                date_time_id: format!("{}T{}", date_str, time),
                time,
            });
        }
        candidate += SLOT_GRANULARITY_MINUTES;
    }

    DayAvailability::Working { window, slots }
}

/// Write-time guard used by the booking endpoint: whether an appointment of
/// `duration` minutes starting at `start` is clear of everything already
/// committed on the day.
pub fn slot_is_bookable(
    start: u32,
    duration: u32,
    service: &Service,
    bookings: &[Booking],
    blocked: &[BlockedTime],
) -> bool {
    interval_is_free(start, duration, &occupied_intervals(service, bookings, blocked))
}

/// Build the occupied-interval set for one day.
///
/// Bookings with unparseable start times are dropped with a warning rather
/// than failing the computation; the interval list is left unmerged and
/// unsorted since the overlap test is pairwise.
fn occupied_intervals(
    service: &Service,
    bookings: &[Booking],
    blocked: &[BlockedTime],
) -> Vec<Interval> {
    let mut occupied = Vec::with_capacity(bookings.len() + blocked.len());

    for booking in bookings.iter().filter(|b| b.status.occupies_time()) {
        match parse_clock_time(&booking.start_time) {
            ClockTime::Iso(start) | ClockTime::Legacy(start) => {
                let duration = booking.duration.unwrap_or(service.duration);
                occupied.push((start, start + duration));
            }
            ClockTime::Invalid => {
                warn!(
                    booking_id = booking.id.as_deref().unwrap_or("<unsaved>"),
                    staff_id = %booking.staff_id,
                    date = %booking.date,
                    start_time = %booking.start_time,
                    "skipping booking with unparseable start time"
                );
            }
        }
    }

    for block in blocked {
        if block.all_day {
            occupied.push((0, MINUTES_PER_DAY));
            continue;
        }
        let start = parse_clock_time(block.start_time.as_deref().unwrap_or("00:00"));
        let end = parse_clock_time(block.end_time.as_deref().unwrap_or("23:59"));
        match (start.minutes(), end.minutes()) {
            (Some(start), Some(end)) => occupied.push((start, end)),
            _ => {
                warn!(
                    blocked_id = block.id.as_deref().unwrap_or("<unsaved>"),
                    date = %block.date,
                    "skipping blocked time with unparseable bounds"
                );
            }
        }
    }

    occupied
}

/// Strict half-open overlap: `[start, start+span)` against each occupied
/// interval. Touching endpoints do not conflict.
fn interval_is_free(start: u32, span: u32, occupied: &[Interval]) -> bool {
    let end = start + span;
    occupied
        .iter()
        .all(|&(occ_start, occ_end)| !(start < occ_end && end > occ_start))
}
