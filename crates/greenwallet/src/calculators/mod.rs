//! Savings, CO2 and points calculators for each eco-action category.
//!
//! Every calculator is a pure function of the [`RateTable`] and a validated input; none of
//! them hold state, so they can be called concurrently without coordination.

pub mod afforestation;
pub mod dispatch;
pub mod electricity;
pub mod impact;
pub mod rates;
pub mod selection;
pub mod solar;
pub mod transport;
pub mod validation;
pub mod water;

pub use afforestation::{AfforestationInput, AfforestationResult};
pub use dispatch::{CalculationOutcome, CalculationRequest};
pub use electricity::{ElectricityInput, ElectricityResult};
pub use impact::{
    round_points, CalculationType, CalculationTypeView, ImpactOutcome, ImpactSummary,
};
pub use rates::{AppliancePower, RateTable, TransportRate};
pub use selection::{ApplianceAction, Frequency, Selection, TransportMode, TreeSpecies, WaterAction};
pub use solar::{SolarInput, SolarResult};
pub use transport::{TransportInput, TransportResult};
pub use validation::{InputFields, ValidationError, MAX_IMPACT};
pub use water::{WaterInput, WaterMode, WaterResult};
