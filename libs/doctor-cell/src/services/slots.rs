// libs/doctor-cell/src/services/slots.rs
use chrono::{Duration, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::models::{BookedSlotMap, SlotDate, SlotTime};

/// Booking window opens at 10:00 and closes at 21:00 for every doctor;
/// slots step in fixed half-hour increments across the next seven days.
pub const OPENING_HOUR: u32 = 10;
pub const CLOSING_HOUR: u32 = 21;
pub const SLOT_STEP_MINUTES: i64 = 30;
pub const BOOKING_WINDOW_DAYS: i64 = 7;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaySlots {
    pub date: SlotDate,
    pub slots: Vec<SlotTime>,
}

/// Computes the offerable slots for the next seven days (today first)
/// given a doctor's booked map and the current wall-clock time. Pure and
/// recomputed per call; nothing here is cached.
///
/// Today's window opens at 10:00, or at the next half-hour boundary
/// strictly after `now` once 10:00 has passed; a day already past
/// closing yields an empty list. A slot is offerable only when its exact
/// label is absent from the booked list for that date.
pub fn offerable_slots(booked: &BookedSlotMap, now: NaiveDateTime) -> Vec<DaySlots> {
    let today = now.date();
    let mut days = Vec::with_capacity(BOOKING_WINDOW_DAYS as usize);

    for offset in 0..BOOKING_WINDOW_DAYS {
        let date = today + Duration::days(offset);
        let open = date.and_hms_opt(OPENING_HOUR, 0, 0).unwrap();
        let close = date.and_hms_opt(CLOSING_HOUR, 0, 0).unwrap();

        let mut cursor = if offset == 0 && now >= open {
            next_half_hour(now)
        } else {
            open
        };

        let slot_date = SlotDate::from(date);
        let mut slots = Vec::new();
        while cursor < close {
            let time = SlotTime::from(cursor.time());
            if !booked.is_booked(slot_date, time) {
                slots.push(time);
            }
            cursor += Duration::minutes(SLOT_STEP_MINUTES);
        }

        days.push(DaySlots {
            date: slot_date,
            slots,
        });
    }

    days
}

fn next_half_hour(t: NaiveDateTime) -> NaiveDateTime {
    let mut boundary = t.date().and_hms_opt(t.hour(), 0, 0).unwrap();
    while boundary <= t {
        boundary += Duration::minutes(SLOT_STEP_MINUTES);
    }
    boundary
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32, hour: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(hour, min, 0)
            .unwrap()
    }

    #[test]
    fn next_half_hour_is_strictly_after() {
        assert_eq!(next_half_hour(at(2025, 3, 3, 14, 10)), at(2025, 3, 3, 14, 30));
        assert_eq!(next_half_hour(at(2025, 3, 3, 14, 40)), at(2025, 3, 3, 15, 0));
        assert_eq!(next_half_hour(at(2025, 3, 3, 14, 0)), at(2025, 3, 3, 14, 30));
    }
}
