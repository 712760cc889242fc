use crate::calculators::{CalculationType, ImpactSummary};

use super::domain::{
    CalculationId, CalculationRecord, NewCalculation, NewProfilePreset, ProfileId, ProfilePreset,
    UserId, UserStats,
};
use super::query::HistoryQuery;

/// Storage for calculation records so the service can be exercised in isolation.
pub trait CalculationRepository: Send + Sync {
    /// Persists a calculation, assigning its id and creation timestamp.
    fn create(&self, calculation: NewCalculation) -> Result<CalculationRecord, RepositoryError>;
    fn list(
        &self,
        user_id: &UserId,
        query: &HistoryQuery,
    ) -> Result<Vec<CalculationRecord>, RepositoryError>;
    fn fetch(
        &self,
        user_id: &UserId,
        id: &CalculationId,
    ) -> Result<Option<CalculationRecord>, RepositoryError>;
    /// Removes a record owned by `user_id`, returning it; `NotFound` if absent or owned by
    /// someone else.
    fn delete(
        &self,
        user_id: &UserId,
        id: &CalculationId,
    ) -> Result<CalculationRecord, RepositoryError>;
}

/// Storage for saved calculator input presets.
pub trait ProfileRepository: Send + Sync {
    fn create(&self, preset: NewProfilePreset) -> Result<ProfilePreset, RepositoryError>;
    fn by_type(
        &self,
        user_id: &UserId,
        calculation_type: CalculationType,
    ) -> Result<Vec<ProfilePreset>, RepositoryError>;
    fn delete(&self, user_id: &UserId, id: &ProfileId) -> Result<(), RepositoryError>;
}

/// Maintains per-user totals alongside the record store.
pub trait StatsAggregator: Send + Sync {
    fn record_added(
        &self,
        user_id: &UserId,
        summary: &ImpactSummary,
    ) -> Result<UserStats, AggregatorError>;
    fn record_removed(
        &self,
        user_id: &UserId,
        summary: &ImpactSummary,
    ) -> Result<UserStats, AggregatorError>;
    /// Replaces the user's totals with a reduction over `records`.
    fn rebuild(
        &self,
        user_id: &UserId,
        records: &[CalculationRecord],
    ) -> Result<UserStats, AggregatorError>;
    fn stats(&self, user_id: &UserId) -> Result<UserStats, AggregatorError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Aggregation backend failure; always retryable.
#[derive(Debug, thiserror::Error)]
pub enum AggregatorError {
    #[error("stats aggregator unavailable: {0}")]
    Unavailable(String),
}
