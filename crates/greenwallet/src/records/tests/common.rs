use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{Duration, TimeZone, Utc};
use serde_json::Value;

use crate::calculators::{
    ApplianceAction, CalculationRequest, CalculationType, ElectricityInput, Frequency,
    ImpactSummary, SolarInput, TransportInput, TransportMode, WaterInput,
};
use crate::config::HistoryConfig;
use crate::records::domain::{
    CalculationId, CalculationRecord, NewCalculation, NewProfilePreset, ProfileId, ProfilePreset,
    UserId, UserStats,
};
use crate::records::query::HistoryQuery;
use crate::records::repository::{
    AggregatorError, CalculationRepository, ProfileRepository, RepositoryError, StatsAggregator,
};
use crate::records::stats::StatsTally;
use crate::records::{calculation_router, CalculationService};

pub(super) fn user() -> UserId {
    UserId("user-1".to_string())
}

pub(super) fn other_user() -> UserId {
    UserId("user-2".to_string())
}

pub(super) fn solar_request() -> CalculationRequest {
    CalculationRequest::Solar(SolarInput {
        monthly_bill_rupees: Some(3000.0),
        rooftop_area_sqft: Some(500.0),
        sunlight_hours_per_day: Some(6.0),
    })
}

pub(super) fn transport_request() -> CalculationRequest {
    CalculationRequest::Transport(TransportInput {
        distance_km: Some(15.0),
        frequency: Some(Frequency::Daily),
        current_mode: Some(TransportMode::Taxi),
        alternate_mode: Some(TransportMode::Metro),
    })
}

pub(super) fn electricity_request() -> CalculationRequest {
    CalculationRequest::Electricity(ElectricityInput {
        appliance_action: Some(ApplianceAction::AcToFan),
        hours_per_day: Some(8.0),
        days_per_month: Some(30.0),
    })
}

pub(super) fn water_bill_request(bill: f64) -> CalculationRequest {
    CalculationRequest::Water(WaterInput::Bill {
        monthly_bill_rupees: Some(bill),
    })
}

pub(super) type MemoryService = CalculationService<MemoryCalculations, MemoryProfiles, MemoryAggregator>;

pub(super) fn build_service() -> (
    MemoryService,
    Arc<MemoryCalculations>,
    Arc<MemoryAggregator>,
) {
    build_service_with_history(HistoryConfig::default())
}

pub(super) fn build_service_with_history(
    history: HistoryConfig,
) -> (
    MemoryService,
    Arc<MemoryCalculations>,
    Arc<MemoryAggregator>,
) {
    let repository = Arc::new(MemoryCalculations::default());
    let aggregator = Arc::new(MemoryAggregator::default());
    let service = CalculationService::new(
        repository.clone(),
        Arc::new(MemoryProfiles::default()),
        aggregator.clone(),
        history,
    );
    (service, repository, aggregator)
}

pub(super) fn router_with_service(service: MemoryService) -> axum::Router {
    calculation_router(Arc::new(service))
}

/// Record store handing out sequential ids and strictly increasing timestamps.
#[derive(Default)]
pub(super) struct MemoryCalculations {
    records: Mutex<Vec<CalculationRecord>>,
    sequence: AtomicU64,
}

impl MemoryCalculations {
    pub(super) fn all(&self, user_id: &UserId) -> Vec<CalculationRecord> {
        self.records
            .lock()
            .expect("repository mutex poisoned")
            .iter()
            .filter(|record| &record.user_id == user_id)
            .cloned()
            .collect()
    }
}

impl CalculationRepository for MemoryCalculations {
    fn create(&self, calculation: NewCalculation) -> Result<CalculationRecord, RepositoryError> {
        let seq = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        let base = Utc
            .with_ymd_and_hms(2024, 7, 15, 9, 0, 0)
            .single()
            .expect("valid timestamp");
        let record = calculation.into_record(
            CalculationId(format!("calc-{seq:06}")),
            base + Duration::seconds(seq as i64),
        );
        self.records
            .lock()
            .expect("repository mutex poisoned")
            .push(record.clone());
        Ok(record)
    }

    fn list(
        &self,
        user_id: &UserId,
        query: &HistoryQuery,
    ) -> Result<Vec<CalculationRecord>, RepositoryError> {
        Ok(query.apply(self.all(user_id)))
    }

    fn fetch(
        &self,
        user_id: &UserId,
        id: &CalculationId,
    ) -> Result<Option<CalculationRecord>, RepositoryError> {
        Ok(self
            .all(user_id)
            .into_iter()
            .find(|record| &record.id == id))
    }

    fn delete(
        &self,
        user_id: &UserId,
        id: &CalculationId,
    ) -> Result<CalculationRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        let index = guard
            .iter()
            .position(|record| &record.id == id && &record.user_id == user_id)
            .ok_or(RepositoryError::NotFound)?;
        Ok(guard.remove(index))
    }
}

#[derive(Default)]
pub(super) struct MemoryProfiles {
    presets: Mutex<Vec<ProfilePreset>>,
    sequence: AtomicU64,
}

impl ProfileRepository for MemoryProfiles {
    fn create(&self, preset: NewProfilePreset) -> Result<ProfilePreset, RepositoryError> {
        let seq = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        let preset = preset.into_preset(ProfileId(format!("profile-{seq:06}")), Utc::now());
        self.presets
            .lock()
            .expect("profile mutex poisoned")
            .push(preset.clone());
        Ok(preset)
    }

    fn by_type(
        &self,
        user_id: &UserId,
        calculation_type: CalculationType,
    ) -> Result<Vec<ProfilePreset>, RepositoryError> {
        Ok(self
            .presets
            .lock()
            .expect("profile mutex poisoned")
            .iter()
            .filter(|preset| {
                &preset.user_id == user_id && preset.calculation_type == calculation_type
            })
            .cloned()
            .collect())
    }

    fn delete(&self, user_id: &UserId, id: &ProfileId) -> Result<(), RepositoryError> {
        let mut guard = self.presets.lock().expect("profile mutex poisoned");
        let before = guard.len();
        guard.retain(|preset| !(&preset.id == id && &preset.user_id == user_id));
        if guard.len() == before {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

/// Aggregator whose incremental updates and rebuilds can be switched off independently.
#[derive(Default)]
pub(super) struct MemoryAggregator {
    tallies: Mutex<HashMap<UserId, StatsTally>>,
    fail_updates: AtomicBool,
    fail_rebuilds: AtomicBool,
}

impl MemoryAggregator {
    pub(super) fn fail_updates(&self, fail: bool) {
        self.fail_updates.store(fail, Ordering::SeqCst);
    }

    pub(super) fn fail_rebuilds(&self, fail: bool) {
        self.fail_rebuilds.store(fail, Ordering::SeqCst);
    }

    pub(super) fn tally(&self, user_id: &UserId) -> StatsTally {
        self.tallies
            .lock()
            .expect("aggregator mutex poisoned")
            .get(user_id)
            .copied()
            .unwrap_or_default()
    }

    fn update(
        &self,
        user_id: &UserId,
        apply: impl FnOnce(&mut StatsTally),
    ) -> Result<UserStats, AggregatorError> {
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(AggregatorError::Unavailable("write timeout".to_string()));
        }
        let mut guard = self.tallies.lock().expect("aggregator mutex poisoned");
        let tally = guard.entry(user_id.clone()).or_default();
        apply(tally);
        Ok(tally.stats())
    }
}

impl StatsAggregator for MemoryAggregator {
    fn record_added(
        &self,
        user_id: &UserId,
        summary: &ImpactSummary,
    ) -> Result<UserStats, AggregatorError> {
        self.update(user_id, |tally| tally.add(summary))
    }

    fn record_removed(
        &self,
        user_id: &UserId,
        summary: &ImpactSummary,
    ) -> Result<UserStats, AggregatorError> {
        self.update(user_id, |tally| tally.remove(summary))
    }

    fn rebuild(
        &self,
        user_id: &UserId,
        records: &[CalculationRecord],
    ) -> Result<UserStats, AggregatorError> {
        if self.fail_rebuilds.load(Ordering::SeqCst) {
            return Err(AggregatorError::Unavailable("rebuild timeout".to_string()));
        }
        let tally = StatsTally::from_records(records);
        self.tallies
            .lock()
            .expect("aggregator mutex poisoned")
            .insert(user_id.clone(), tally);
        Ok(tally.stats())
    }

    fn stats(&self, user_id: &UserId) -> Result<UserStats, AggregatorError> {
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(AggregatorError::Unavailable("read timeout".to_string()));
        }
        Ok(self.tally(user_id).stats())
    }
}

pub(super) struct UnavailableCalculations;

impl CalculationRepository for UnavailableCalculations {
    fn create(&self, _calculation: NewCalculation) -> Result<CalculationRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn list(
        &self,
        _user_id: &UserId,
        _query: &HistoryQuery,
    ) -> Result<Vec<CalculationRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(
        &self,
        _user_id: &UserId,
        _id: &CalculationId,
    ) -> Result<Option<CalculationRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn delete(
        &self,
        _user_id: &UserId,
        _id: &CalculationId,
    ) -> Result<CalculationRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) fn close(actual: f64, expected: f64) -> bool {
    (actual - expected).abs() < 1e-6
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
