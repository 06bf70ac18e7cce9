//! Slot planner: cadence → concrete future publication instants.
//!
//! Pure computation. "Now" and randomness are explicit inputs so planning is
//! fully deterministic under test.

use chrono::{DateTime, Datelike, Duration, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use rand::Rng;

use crate::schedule::Cadence;

/// Weekdays used when a schedule has no day preference (Mon..Fri).
pub const DEFAULT_WEEKDAYS: [u8; 5] = [1, 2, 3, 4, 5];

/// Hours used when a schedule has no hour preference.
pub const DEFAULT_HOURS: [u8; 4] = [9, 12, 15, 17];

/// Compute the publication slots for one week of posting.
///
/// Returns exactly `cadence.posts_per_week()` UTC instants, strictly
/// ascending, all on or after the Monday (00:00 local) of the week following
/// `now`'s week in the schedule's timezone.
///
/// Posts are spread evenly across the preferred days, the remainder
/// front-loaded onto the earliest ones. Within a day, hours are either taken
/// cyclically from the preferred set (minute 0) or drawn from it at random
/// with a random minute. Local wall-clock times convert to UTC with full DST
/// handling; identical instants (possible once a day holds more posts than
/// there are hours) are nudged apart by a minute so the result stays strictly
/// ordered.
pub fn compute_slots<R: Rng + ?Sized>(
    cadence: &Cadence,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Vec<DateTime<Utc>> {
    let tz = cadence.timezone();

    let days: Vec<u8> = if cadence.preferred_days().is_empty() {
        DEFAULT_WEEKDAYS.to_vec()
    } else {
        cadence.preferred_days().iter().copied().collect()
    };
    let hours: Vec<u8> = if cadence.preferred_hours().is_empty() {
        DEFAULT_HOURS.to_vec()
    } else {
        cadence.preferred_hours().iter().copied().collect()
    };

    // Monday of next week, in the schedule's local calendar.
    let local_today = now.with_timezone(&tz).date_naive();
    let start_of_next_week = local_today
        - Duration::days(i64::from(local_today.weekday().num_days_from_monday()))
        + Duration::days(7);

    let total = usize::from(cadence.posts_per_week());
    let base = total / days.len();
    let extra = total % days.len();

    let mut slots: Vec<DateTime<Utc>> = Vec::with_capacity(total);
    let mut remaining = total;
    let mut day_index = 0usize;

    // One pass over the preferred days covers the whole week's quota; the
    // second cycle is a termination bound, not an expected path.
    while remaining > 0 && day_index < days.len() * 2 {
        let weekday = days[day_index % days.len()];
        let day_offset =
            i64::from(weekday - 1) + (day_index / days.len()) as i64 * 7;
        let date = start_of_next_week + Duration::days(day_offset);

        let quota = base + usize::from(day_index < extra);
        let posts_today = quota.min(remaining);

        for k in 0..posts_today {
            let (hour, minute) = if cadence.randomize() {
                (hours[rng.gen_range(0..hours.len())], rng.gen_range(0..60u32))
            } else {
                (hours[k % hours.len()], 0)
            };
            slots.push(local_to_utc(date, u32::from(hour), minute, tz));
        }

        remaining -= posts_today;
        day_index += 1;
    }

    slots.sort_unstable();

    // Hour collisions within a day produce equal instants; keep the contract
    // of a strictly ascending sequence.
    for i in 1..slots.len() {
        if slots[i] <= slots[i - 1] {
            slots[i] = slots[i - 1] + Duration::minutes(1);
        }
    }

    slots
}

/// Resolve a local wall-clock time in `tz` to a UTC instant.
///
/// Spring-forward gaps (the local time does not exist) probe forward in
/// one-hour steps; fall-back overlaps resolve to the earliest instant.
fn local_to_utc(date: NaiveDate, hour: u32, minute: u32, tz: Tz) -> DateTime<Utc> {
    let time = NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN);
    let mut naive: NaiveDateTime = date.and_time(time);

    for _ in 0..4 {
        match tz.from_local_datetime(&naive) {
            LocalResult::Single(dt) => return dt.with_timezone(&Utc),
            LocalResult::Ambiguous(earliest, _) => return earliest.with_timezone(&Utc),
            LocalResult::None => naive += Duration::hours(1),
        }
    }

    // No real zone has a gap this wide; read the wall time as UTC.
    Utc.from_utc_datetime(&naive)
}
