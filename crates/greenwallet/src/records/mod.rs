//! Calculation history, per-user totals and saved input presets.
//!
//! Storage and aggregation sit behind traits so the service can run against in-memory fakes
//! in tests and against real backends in the API service. Every save and delete updates the
//! record store first and the totals second; when the second step fails the totals are
//! rebuilt from the record set or flagged stale until the next read rebuilds them.

pub mod builder;
pub mod domain;
pub mod query;
pub mod repository;
pub mod router;
pub mod service;
pub mod stats;

#[cfg(test)]
mod tests;

pub use builder::RecordBuilder;
pub use domain::{
    CalculationId, CalculationRecord, NewCalculation, NewProfilePreset, ProfileId, ProfilePreset,
    UserId, UserStats,
};
pub use query::{HistoryQuery, HistorySort, RECENT_LIMIT};
pub use repository::{
    AggregatorError, CalculationRepository, ProfileRepository, RepositoryError, StatsAggregator,
};
pub use router::{calculation_router, CreateProfileRequest, SaveCalculationRequest, USER_HEADER};
pub use service::{
    CalculationService, CalculationServiceError, DeletedCalculation, SavedCalculation,
};
pub use stats::StatsTally;
