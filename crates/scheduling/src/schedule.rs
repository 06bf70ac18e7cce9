//! Per-channel posting cadence configuration.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use postpilot_core::{CompanyId, DomainError, DomainResult, Entity, ScheduleId};
use postpilot_content::Channel;

/// Hard cap on weekly volume; anything above this is a configuration mistake.
pub const MAX_POSTS_PER_WEEK: u8 = 20;

/// How often and when to post.
///
/// Day/hour preferences are kept as typed ordered sets in memory; they travel
/// as plain number arrays on the wire and in storage. Empty sets are legal and
/// mean "use the planner defaults"; resolution happens at planning time, never
/// here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cadence {
    posts_per_week: u8,
    /// ISO weekday numbers, Monday = 1 .. Sunday = 7.
    preferred_days: BTreeSet<u8>,
    /// Hours of day, 0..=23.
    preferred_hours: BTreeSet<u8>,
    timezone: Tz,
    randomize: bool,
}

impl Cadence {
    pub fn new(
        posts_per_week: u8,
        preferred_days: impl IntoIterator<Item = u8>,
        preferred_hours: impl IntoIterator<Item = u8>,
        timezone: Tz,
        randomize: bool,
    ) -> DomainResult<Self> {
        if posts_per_week == 0 || posts_per_week > MAX_POSTS_PER_WEEK {
            return Err(DomainError::validation(format!(
                "posts_per_week must be in 1..={MAX_POSTS_PER_WEEK}, got {posts_per_week}"
            )));
        }

        let preferred_days: BTreeSet<u8> = preferred_days.into_iter().collect();
        if let Some(bad) = preferred_days.iter().find(|d| !(1..=7).contains(*d)) {
            return Err(DomainError::validation(format!(
                "preferred day {bad} out of range (1 = Monday .. 7 = Sunday)"
            )));
        }

        let preferred_hours: BTreeSet<u8> = preferred_hours.into_iter().collect();
        if let Some(bad) = preferred_hours.iter().find(|h| **h > 23) {
            return Err(DomainError::validation(format!(
                "preferred hour {bad} out of range (0..=23)"
            )));
        }

        Ok(Self {
            posts_per_week,
            preferred_days,
            preferred_hours,
            timezone,
            randomize,
        })
    }

    /// Parse a cadence whose timezone is still a string (wire/storage form).
    pub fn from_parts(
        posts_per_week: u8,
        preferred_days: impl IntoIterator<Item = u8>,
        preferred_hours: impl IntoIterator<Item = u8>,
        timezone: &str,
        randomize: bool,
    ) -> DomainResult<Self> {
        let tz: Tz = timezone
            .parse()
            .map_err(|_| DomainError::validation(format!("unknown IANA timezone: {timezone}")))?;
        Self::new(posts_per_week, preferred_days, preferred_hours, tz, randomize)
    }

    pub fn posts_per_week(&self) -> u8 {
        self.posts_per_week
    }

    pub fn preferred_days(&self) -> &BTreeSet<u8> {
        &self.preferred_days
    }

    pub fn preferred_hours(&self) -> &BTreeSet<u8> {
        &self.preferred_hours
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    pub fn randomize(&self) -> bool {
        self.randomize
    }
}

/// Entity: a company's cadence for one channel.
///
/// At most one schedule per (company, channel); stores key on that pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    id: ScheduleId,
    company_id: CompanyId,
    channel: Channel,
    enabled: bool,
    cadence: Cadence,
    created_at: DateTime<Utc>,
}

impl Schedule {
    pub fn new(
        id: ScheduleId,
        company_id: CompanyId,
        channel: Channel,
        enabled: bool,
        cadence: Cadence,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            company_id,
            channel,
            enabled,
            cadence,
            created_at,
        }
    }

    pub fn id_typed(&self) -> ScheduleId {
        self.id
    }

    pub fn company_id(&self) -> CompanyId {
        self.company_id
    }

    pub fn channel(&self) -> Channel {
        self.channel
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn cadence(&self) -> &Cadence {
        &self.cadence
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn set_cadence(&mut self, cadence: Cadence) {
        self.cadence = cadence;
    }
}

impl Entity for Schedule {
    type Id = ScheduleId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_full_range_of_posts_per_week() {
        for n in 1..=MAX_POSTS_PER_WEEK {
            assert!(Cadence::new(n, [], [], chrono_tz::UTC, false).is_ok());
        }
    }

    #[test]
    fn rejects_zero_and_excessive_volume() {
        assert!(Cadence::new(0, [], [], chrono_tz::UTC, false).is_err());
        assert!(Cadence::new(MAX_POSTS_PER_WEEK + 1, [], [], chrono_tz::UTC, false).is_err());
    }

    #[test]
    fn rejects_out_of_range_days_and_hours() {
        assert!(Cadence::new(3, [0], [], chrono_tz::UTC, false).is_err());
        assert!(Cadence::new(3, [8], [], chrono_tz::UTC, false).is_err());
        assert!(Cadence::new(3, [], [24], chrono_tz::UTC, false).is_err());
    }

    #[test]
    fn deduplicates_and_orders_preferences() {
        let cadence = Cadence::new(3, [5, 1, 5, 3], [17, 9, 17], chrono_tz::UTC, false).unwrap();
        assert_eq!(
            cadence.preferred_days().iter().copied().collect::<Vec<_>>(),
            vec![1, 3, 5]
        );
        assert_eq!(
            cadence.preferred_hours().iter().copied().collect::<Vec<_>>(),
            vec![9, 17]
        );
    }

    #[test]
    fn from_parts_resolves_iana_names() {
        let cadence = Cadence::from_parts(2, [], [], "Europe/Amsterdam", true).unwrap();
        assert_eq!(cadence.timezone(), chrono_tz::Europe::Amsterdam);

        let err = Cadence::from_parts(2, [], [], "Mars/Olympus_Mons", true).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn empty_preferences_are_legal() {
        let cadence = Cadence::new(5, [], [], chrono_tz::UTC, false).unwrap();
        assert!(cadence.preferred_days().is_empty());
        assert!(cadence.preferred_hours().is_empty());
    }
}
