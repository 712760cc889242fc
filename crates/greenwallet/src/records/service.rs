use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::calculators::{
    CalculationOutcome, CalculationRequest, CalculationType, ImpactOutcome, RateTable,
    ValidationError,
};
use crate::config::HistoryConfig;

use super::builder::RecordBuilder;
use super::domain::{
    CalculationId, CalculationRecord, NewCalculation, NewProfilePreset, ProfileId, ProfilePreset,
    UserId, UserStats,
};
use super::query::HistoryQuery;
use super::repository::{
    AggregatorError, CalculationRepository, ProfileRepository, RepositoryError, StatsAggregator,
};
use super::stats::StatsTally;

/// Service composing the calculators, record store, preset store and stats aggregator.
pub struct CalculationService<R, P, A> {
    rates: RateTable,
    history: HistoryConfig,
    repository: Arc<R>,
    profiles: Arc<P>,
    aggregator: Arc<A>,
    stale: Mutex<HashSet<UserId>>,
    writers: Mutex<HashMap<UserId, Arc<Mutex<()>>>>,
}

/// Outcome of a save: the stored record plus the refreshed totals.
///
/// `stats` is `None` and `stats_stale` is set when the record was stored but the totals could
/// not be refreshed; the next stats read retries the rebuild.
#[derive(Debug, Clone, Serialize)]
pub struct SavedCalculation {
    pub record: CalculationRecord,
    pub stats: Option<UserStats>,
    pub stats_stale: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeletedCalculation {
    pub record: CalculationRecord,
    pub stats: Option<UserStats>,
    pub stats_stale: bool,
}

impl<R, P, A> CalculationService<R, P, A>
where
    R: CalculationRepository + 'static,
    P: ProfileRepository + 'static,
    A: StatsAggregator + 'static,
{
    pub fn new(
        repository: Arc<R>,
        profiles: Arc<P>,
        aggregator: Arc<A>,
        history: HistoryConfig,
    ) -> Self {
        Self::with_rates(RateTable::STANDARD, repository, profiles, aggregator, history)
    }

    pub fn with_rates(
        rates: RateTable,
        repository: Arc<R>,
        profiles: Arc<P>,
        aggregator: Arc<A>,
        history: HistoryConfig,
    ) -> Self {
        Self {
            rates,
            history,
            repository,
            profiles,
            aggregator,
            stale: Mutex::new(HashSet::new()),
            writers: Mutex::new(HashMap::new()),
        }
    }

    pub fn rates(&self) -> &RateTable {
        &self.rates
    }

    /// Run a calculator without persisting anything.
    pub fn calculate(
        &self,
        request: &CalculationRequest,
    ) -> Result<CalculationOutcome, CalculationServiceError> {
        Ok(request.calculate(&self.rates)?)
    }

    /// Calculate and persist in one step.
    pub fn save(
        &self,
        user_id: &UserId,
        request: &CalculationRequest,
        title: Option<String>,
    ) -> Result<SavedCalculation, CalculationServiceError> {
        let outcome = self.calculate(request)?;
        self.save_outcome(user_id, &outcome, title)
    }

    /// Persist an already computed outcome and add it to the user's totals.
    ///
    /// A failed insert leaves the totals untouched.
    pub fn save_outcome<O>(
        &self,
        user_id: &UserId,
        outcome: &O,
        title: Option<String>,
    ) -> Result<SavedCalculation, CalculationServiceError>
    where
        O: ImpactOutcome + ?Sized,
    {
        let calculation = RecordBuilder::new(user_id).title(title).build(outcome);
        self.persist(calculation)
    }

    fn persist(
        &self,
        calculation: NewCalculation,
    ) -> Result<SavedCalculation, CalculationServiceError> {
        let summary = calculation.summary();
        let writer = self.writer(&calculation.user_id);
        let _guard = writer.lock().unwrap_or_else(PoisonError::into_inner);
        let record = self.repository.create(calculation)?;
        let stats = self.refresh(&record.user_id, |aggregator| {
            aggregator.record_added(&record.user_id, &summary)
        });

        info!(
            user = %record.user_id.0,
            id = %record.id.0,
            kind = record.calculation_type.id(),
            points = record.points,
            "calculation saved"
        );

        Ok(SavedCalculation {
            stats_stale: stats.is_none(),
            stats,
            record,
        })
    }

    /// Remove a record from the user's history and retract it from their totals.
    ///
    /// A failed delete leaves both the record and the totals in place.
    pub fn delete(
        &self,
        user_id: &UserId,
        id: &CalculationId,
    ) -> Result<DeletedCalculation, CalculationServiceError> {
        let writer = self.writer(user_id);
        let _guard = writer.lock().unwrap_or_else(PoisonError::into_inner);
        let record = self.repository.delete(user_id, id)?;
        let summary = record.summary();
        let stats = self.refresh(user_id, |aggregator| {
            aggregator.record_removed(user_id, &summary)
        });

        info!(user = %user_id.0, id = %id.0, "calculation deleted");

        Ok(DeletedCalculation {
            stats_stale: stats.is_none(),
            stats,
            record,
        })
    }

    pub fn get(
        &self,
        user_id: &UserId,
        id: &CalculationId,
    ) -> Result<CalculationRecord, CalculationServiceError> {
        let record = self
            .repository
            .fetch(user_id, id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(record)
    }

    pub fn history(
        &self,
        user_id: &UserId,
        query: &HistoryQuery,
    ) -> Result<Vec<CalculationRecord>, CalculationServiceError> {
        let mut query = query.clone();
        if query.limit.is_none() {
            query.limit = Some(self.history.default_limit);
        }
        Ok(self.repository.list(user_id, &query)?)
    }

    /// Most recent calculations for the dashboard.
    pub fn recent(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<CalculationRecord>, CalculationServiceError> {
        Ok(self.repository.list(user_id, &HistoryQuery::recent())?)
    }

    /// Current totals for a user, rebuilt from the record set when they were left stale.
    pub fn stats(&self, user_id: &UserId) -> Result<UserStats, CalculationServiceError> {
        if self.is_stale(user_id) {
            let records = self.repository.list(user_id, &HistoryQuery::all())?;
            return match self.aggregator.rebuild(user_id, &records) {
                Ok(stats) => {
                    self.mark_fresh(user_id);
                    Ok(stats)
                }
                Err(err) => {
                    warn!(user = %user_id.0, error = %err, "stats rebuild failed, reducing records directly");
                    Ok(StatsTally::from_records(&records).stats())
                }
            };
        }

        match self.aggregator.stats(user_id) {
            Ok(stats) => Ok(stats),
            Err(err) => {
                warn!(user = %user_id.0, error = %err, "stats aggregator unavailable, reducing records directly");
                self.mark_stale(user_id);
                let records = self.repository.list(user_id, &HistoryQuery::all())?;
                Ok(StatsTally::from_records(&records).stats())
            }
        }
    }

    pub fn create_profile(
        &self,
        user_id: &UserId,
        calculation_type: CalculationType,
        name: &str,
        data: BTreeMap<String, Value>,
    ) -> Result<ProfilePreset, CalculationServiceError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::MissingField { field: "name" }.into());
        }

        let preset = self.profiles.create(NewProfilePreset {
            user_id: user_id.clone(),
            calculation_type,
            name: name.to_string(),
            data,
        })?;
        info!(user = %user_id.0, id = %preset.id.0, kind = calculation_type.id(), "profile saved");
        Ok(preset)
    }

    pub fn profiles(
        &self,
        user_id: &UserId,
        calculation_type: CalculationType,
    ) -> Result<Vec<ProfilePreset>, CalculationServiceError> {
        Ok(self.profiles.by_type(user_id, calculation_type)?)
    }

    pub fn delete_profile(
        &self,
        user_id: &UserId,
        calculation_type: CalculationType,
        id: &ProfileId,
    ) -> Result<(), CalculationServiceError> {
        self.profile(user_id, calculation_type, id)?;
        self.profiles.delete(user_id, id)?;
        Ok(())
    }

    /// Run the calculator pre-filled from one of the user's saved presets.
    pub fn calculate_profile(
        &self,
        user_id: &UserId,
        calculation_type: CalculationType,
        id: &ProfileId,
    ) -> Result<CalculationOutcome, CalculationServiceError> {
        let preset = self.profile(user_id, calculation_type, id)?;
        let request = CalculationRequest::from_fields(calculation_type, &preset.data)?;
        self.calculate(&request)
    }

    fn profile(
        &self,
        user_id: &UserId,
        calculation_type: CalculationType,
        id: &ProfileId,
    ) -> Result<ProfilePreset, CalculationServiceError> {
        let preset = self
            .profiles
            .by_type(user_id, calculation_type)?
            .into_iter()
            .find(|preset| &preset.id == id)
            .ok_or(RepositoryError::NotFound)?;
        Ok(preset)
    }

    /// Applies an aggregator update; on failure retries as a full rebuild and, failing that,
    /// flags the user's totals as stale. Totals already flagged stale skip the incremental
    /// update and are rebuilt.
    fn refresh<F>(&self, user_id: &UserId, update: F) -> Option<UserStats>
    where
        F: FnOnce(&A) -> Result<UserStats, AggregatorError>,
    {
        if self.is_stale(user_id) {
            info!(user = %user_id.0, "stats stale, rebuilding from records");
        } else {
            match update(&self.aggregator) {
                Ok(stats) => return Some(stats),
                Err(err) => {
                    warn!(user = %user_id.0, error = %err, "stats update failed, rebuilding from records")
                }
            }
        }

        let rebuilt = self
            .repository
            .list(user_id, &HistoryQuery::all())
            .map_err(|err| err.to_string())
            .and_then(|records| {
                self.aggregator
                    .rebuild(user_id, &records)
                    .map_err(|err| err.to_string())
            });

        match rebuilt {
            Ok(stats) => {
                self.mark_fresh(user_id);
                Some(stats)
            }
            Err(reason) => {
                warn!(user = %user_id.0, %reason, "stats marked stale");
                self.mark_stale(user_id);
                None
            }
        }
    }

    /// Per-user lock held across a record write and its totals update, so adds and removes
    /// for one user reach the aggregator in the order the records changed.
    fn writer(&self, user_id: &UserId) -> Arc<Mutex<()>> {
        let mut writers = self.writers.lock().unwrap_or_else(PoisonError::into_inner);
        writers.entry(user_id.clone()).or_default().clone()
    }

    fn is_stale(&self, user_id: &UserId) -> bool {
        self.stale
            .lock()
            .map(|stale| stale.contains(user_id))
            .unwrap_or(true)
    }

    fn mark_stale(&self, user_id: &UserId) {
        if let Ok(mut stale) = self.stale.lock() {
            stale.insert(user_id.clone());
        }
    }

    fn mark_fresh(&self, user_id: &UserId) {
        if let Ok(mut stale) = self.stale.lock() {
            stale.remove(user_id);
        }
    }
}

/// Error raised by the calculation service.
#[derive(Debug, thiserror::Error)]
pub enum CalculationServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Aggregator(#[from] AggregatorError),
}
