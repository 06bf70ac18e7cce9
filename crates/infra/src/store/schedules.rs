//! Schedule storage.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use postpilot_core::{CompanyId, ScheduleId};
use postpilot_content::Channel;
use postpilot_scheduling::Schedule;

use super::StoreError;

/// Schedule store abstraction.
///
/// Keyed by (company, channel): at most one schedule per pair. `upsert`
/// replaces the pair's existing schedule, preserving that invariant.
pub trait ScheduleStore: Send + Sync {
    /// Insert or replace the schedule for its (company, channel) pair.
    fn upsert(&self, schedule: Schedule) -> Result<ScheduleId, StoreError>;

    /// Get a schedule by id.
    fn get(&self, id: ScheduleId) -> Result<Option<Schedule>, StoreError>;

    /// All schedules of a company, ordered by channel.
    fn list_for_company(&self, company: CompanyId) -> Result<Vec<Schedule>, StoreError>;

    /// Enabled schedules of a company, ordered by channel.
    fn enabled_for_company(&self, company: CompanyId) -> Result<Vec<Schedule>, StoreError>;

    /// Delete a schedule by id.
    fn delete(&self, id: ScheduleId) -> Result<(), StoreError>;
}

/// In-memory schedule store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryScheduleStore {
    schedules: RwLock<HashMap<(CompanyId, Channel), Schedule>>,
}

impl InMemoryScheduleStore {
    pub fn new() -> Self {
        Self {
            schedules: RwLock::new(HashMap::new()),
        }
    }

    pub fn arc() -> Arc<Self> {
        Arc::new(Self::new())
    }

    fn sorted_by_channel(mut schedules: Vec<Schedule>) -> Vec<Schedule> {
        schedules.sort_by_key(|s| s.channel());
        schedules
    }
}

impl ScheduleStore for InMemoryScheduleStore {
    fn upsert(&self, schedule: Schedule) -> Result<ScheduleId, StoreError> {
        let mut schedules = self.schedules.write().unwrap();
        let id = schedule.id_typed();
        schedules.insert((schedule.company_id(), schedule.channel()), schedule);
        Ok(id)
    }

    fn get(&self, id: ScheduleId) -> Result<Option<Schedule>, StoreError> {
        let schedules = self.schedules.read().unwrap();
        Ok(schedules.values().find(|s| s.id_typed() == id).cloned())
    }

    fn list_for_company(&self, company: CompanyId) -> Result<Vec<Schedule>, StoreError> {
        let schedules = self.schedules.read().unwrap();
        Ok(Self::sorted_by_channel(
            schedules
                .values()
                .filter(|s| s.company_id() == company)
                .cloned()
                .collect(),
        ))
    }

    fn enabled_for_company(&self, company: CompanyId) -> Result<Vec<Schedule>, StoreError> {
        let schedules = self.schedules.read().unwrap();
        Ok(Self::sorted_by_channel(
            schedules
                .values()
                .filter(|s| s.company_id() == company && s.is_enabled())
                .cloned()
                .collect(),
        ))
    }

    fn delete(&self, id: ScheduleId) -> Result<(), StoreError> {
        let mut schedules = self.schedules.write().unwrap();
        let key = schedules
            .iter()
            .find(|(_, s)| s.id_typed() == id)
            .map(|(k, _)| *k)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        schedules.remove(&key);
        Ok(())
    }
}

impl<T: ScheduleStore + ?Sized> ScheduleStore for Arc<T> {
    fn upsert(&self, schedule: Schedule) -> Result<ScheduleId, StoreError> {
        (**self).upsert(schedule)
    }

    fn get(&self, id: ScheduleId) -> Result<Option<Schedule>, StoreError> {
        (**self).get(id)
    }

    fn list_for_company(&self, company: CompanyId) -> Result<Vec<Schedule>, StoreError> {
        (**self).list_for_company(company)
    }

    fn enabled_for_company(&self, company: CompanyId) -> Result<Vec<Schedule>, StoreError> {
        (**self).enabled_for_company(company)
    }

    fn delete(&self, id: ScheduleId) -> Result<(), StoreError> {
        (**self).delete(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use postpilot_scheduling::Cadence;

    fn schedule(company: CompanyId, channel: Channel, enabled: bool) -> Schedule {
        Schedule::new(
            ScheduleId::new(),
            company,
            channel,
            enabled,
            Cadence::from_parts(3, [1, 3, 5], [9, 17], "UTC", false).unwrap(),
            Utc::now(),
        )
    }

    #[test]
    fn upsert_replaces_the_channel_pair() {
        let store = InMemoryScheduleStore::new();
        let company = CompanyId::new();

        let first = schedule(company, Channel::Linkedin, true);
        let first_id = store.upsert(first).unwrap();

        let second = schedule(company, Channel::Linkedin, false);
        let second_id = store.upsert(second).unwrap();

        // One schedule per (company, channel); the old id is gone.
        let all = store.list_for_company(company).unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id_typed(), second_id);
        assert!(store.get(first_id).unwrap().is_none());
    }

    #[test]
    fn enabled_filter_and_channel_order() {
        let store = InMemoryScheduleStore::new();
        let company = CompanyId::new();

        store.upsert(schedule(company, Channel::Tiktok, true)).unwrap();
        store.upsert(schedule(company, Channel::Linkedin, true)).unwrap();
        store.upsert(schedule(company, Channel::Facebook, false)).unwrap();
        store.upsert(schedule(CompanyId::new(), Channel::Linkedin, true)).unwrap();

        let enabled = store.enabled_for_company(company).unwrap();
        let channels: Vec<_> = enabled.iter().map(|s| s.channel()).collect();
        assert_eq!(channels, vec![Channel::Linkedin, Channel::Tiktok]);
    }

    #[test]
    fn delete_unknown_id_is_not_found() {
        let store = InMemoryScheduleStore::new();
        assert!(matches!(
            store.delete(ScheduleId::new()),
            Err(StoreError::NotFound(_))
        ));
    }
}
