use chrono::Utc;
use greenwallet::calculators::{CalculationType, ImpactSummary};
use greenwallet::records::{
    AggregatorError, CalculationId, CalculationRecord, CalculationRepository, HistoryQuery,
    NewCalculation, NewProfilePreset, ProfileId, ProfilePreset, ProfileRepository,
    RepositoryError, StatsAggregator, StatsTally, UserId, UserStats,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryCalculationRepository {
    records: Arc<Mutex<HashMap<CalculationId, CalculationRecord>>>,
    sequence: Arc<AtomicU64>,
}

impl CalculationRepository for InMemoryCalculationRepository {
    fn create(&self, calculation: NewCalculation) -> Result<CalculationRecord, RepositoryError> {
        let id = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        let record = calculation.into_record(CalculationId(format!("calc-{id:06}")), Utc::now());
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn list(
        &self,
        user_id: &UserId,
        query: &HistoryQuery,
    ) -> Result<Vec<CalculationRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(query.apply(
            guard
                .values()
                .filter(|record| &record.user_id == user_id)
                .cloned(),
        ))
    }

    fn fetch(
        &self,
        user_id: &UserId,
        id: &CalculationId,
    ) -> Result<Option<CalculationRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard
            .get(id)
            .filter(|record| &record.user_id == user_id)
            .cloned())
    }

    fn delete(
        &self,
        user_id: &UserId,
        id: &CalculationId,
    ) -> Result<CalculationRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        match guard.get(id) {
            Some(record) if &record.user_id == user_id => {
                guard.remove(id).ok_or(RepositoryError::NotFound)
            }
            _ => Err(RepositoryError::NotFound),
        }
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryProfileRepository {
    presets: Arc<Mutex<HashMap<ProfileId, ProfilePreset>>>,
    sequence: Arc<AtomicU64>,
}

impl ProfileRepository for InMemoryProfileRepository {
    fn create(&self, preset: NewProfilePreset) -> Result<ProfilePreset, RepositoryError> {
        let id = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        let preset = preset.into_preset(ProfileId(format!("profile-{id:06}")), Utc::now());
        let mut guard = self.presets.lock().expect("profile mutex poisoned");
        guard.insert(preset.id.clone(), preset.clone());
        Ok(preset)
    }

    fn by_type(
        &self,
        user_id: &UserId,
        calculation_type: CalculationType,
    ) -> Result<Vec<ProfilePreset>, RepositoryError> {
        let guard = self.presets.lock().expect("profile mutex poisoned");
        let mut presets: Vec<_> = guard
            .values()
            .filter(|preset| {
                &preset.user_id == user_id && preset.calculation_type == calculation_type
            })
            .cloned()
            .collect();
        presets.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(presets)
    }

    fn delete(&self, user_id: &UserId, id: &ProfileId) -> Result<(), RepositoryError> {
        let mut guard = self.presets.lock().expect("profile mutex poisoned");
        match guard.get(id) {
            Some(preset) if &preset.user_id == user_id => {
                guard.remove(id);
                Ok(())
            }
            _ => Err(RepositoryError::NotFound),
        }
    }
}

/// Keeps one exact tally per user; the mutex serializes writers so totals never interleave.
#[derive(Default, Clone)]
pub(crate) struct InMemoryStatsAggregator {
    tallies: Arc<Mutex<HashMap<UserId, StatsTally>>>,
}

impl InMemoryStatsAggregator {
    fn update(&self, user_id: &UserId, apply: impl FnOnce(&mut StatsTally)) -> UserStats {
        let mut guard = self.tallies.lock().expect("aggregator mutex poisoned");
        let tally = guard.entry(user_id.clone()).or_default();
        apply(tally);
        tally.stats()
    }
}

impl StatsAggregator for InMemoryStatsAggregator {
    fn record_added(
        &self,
        user_id: &UserId,
        summary: &ImpactSummary,
    ) -> Result<UserStats, AggregatorError> {
        Ok(self.update(user_id, |tally| tally.add(summary)))
    }

    fn record_removed(
        &self,
        user_id: &UserId,
        summary: &ImpactSummary,
    ) -> Result<UserStats, AggregatorError> {
        Ok(self.update(user_id, |tally| tally.remove(summary)))
    }

    fn rebuild(
        &self,
        user_id: &UserId,
        records: &[CalculationRecord],
    ) -> Result<UserStats, AggregatorError> {
        let tally = StatsTally::from_records(records);
        Ok(self.update(user_id, |current| *current = tally))
    }

    fn stats(&self, user_id: &UserId) -> Result<UserStats, AggregatorError> {
        let guard = self.tallies.lock().expect("aggregator mutex poisoned");
        Ok(guard
            .get(user_id)
            .map(StatsTally::stats)
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn calculation(user: &str, points: u64) -> NewCalculation {
        NewCalculation {
            user_id: UserId(user.to_string()),
            calculation_type: CalculationType::Water,
            title: "Monthly Bill Reduction".to_string(),
            money_saved: 240.0,
            co2_reduced_kg: 42.67,
            points,
            details: BTreeMap::new(),
        }
    }

    #[test]
    fn records_are_scoped_to_their_owner() {
        let repository = InMemoryCalculationRepository::default();
        let mine = repository
            .create(calculation("user-1", 283))
            .expect("create succeeds");
        repository
            .create(calculation("user-2", 10))
            .expect("create succeeds");

        assert_eq!(mine.id, CalculationId("calc-000001".to_string()));
        let owner = UserId("user-1".to_string());
        let stranger = UserId("user-2".to_string());
        assert_eq!(
            repository
                .list(&owner, &HistoryQuery::all())
                .expect("list succeeds")
                .len(),
            1
        );
        assert_eq!(repository.fetch(&stranger, &mine.id).expect("fetch"), None);
        assert!(matches!(
            repository.delete(&stranger, &mine.id),
            Err(RepositoryError::NotFound)
        ));
        assert_eq!(
            repository.delete(&owner, &mine.id).expect("delete succeeds"),
            mine
        );
    }

    #[test]
    fn aggregator_rebuild_replaces_running_tally() {
        let aggregator = InMemoryStatsAggregator::default();
        let user = UserId("user-1".to_string());
        let summary = ImpactSummary {
            money_saved: 240.0,
            co2_reduced_kg: 42.67,
            points: 283,
        };
        aggregator.record_added(&user, &summary).expect("add");
        aggregator.record_added(&user, &summary).expect("add");

        let rebuilt = aggregator.rebuild(&user, &[]).expect("rebuild");
        assert_eq!(rebuilt, UserStats::default());
        assert_eq!(aggregator.stats(&user).expect("stats"), UserStats::default());
    }
}
