use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::impact::{display_number, round_points, CalculationType, ImpactOutcome, ImpactSummary};
use super::rates::RateTable;
use super::selection::{Frequency, Selection, TransportMode};
use super::validation::{
    bounded_result, number_field, require_positive, require_present, selection_field, InputFields,
    ValidationError,
};

const GRAMS_PER_KG: f64 = 1000.0;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransportInput {
    #[serde(default)]
    pub distance_km: Option<f64>,
    #[serde(default)]
    pub frequency: Option<Frequency>,
    #[serde(default)]
    pub current_mode: Option<TransportMode>,
    #[serde(default)]
    pub alternate_mode: Option<TransportMode>,
}

impl TransportInput {
    pub fn from_fields(fields: &InputFields) -> Result<Self, ValidationError> {
        Ok(Self {
            distance_km: number_field(fields, "distance_km")?,
            frequency: selection_field(fields, "frequency")?,
            current_mode: selection_field(fields, "current_mode")?,
            alternate_mode: selection_field(fields, "alternate_mode")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransportResult {
    pub distance_km: f64,
    pub frequency: Frequency,
    pub current_mode: TransportMode,
    pub alternate_mode: TransportMode,
    pub current_cost: f64,
    pub alternate_cost: f64,
    pub current_co2_kg: f64,
    pub alternate_co2_kg: f64,
    pub money_saved: f64,
    pub annual_savings: f64,
    pub co2_reduced_kg: f64,
    pub points: u64,
}

/// Compares a monthly trip pattern on the current mode against the alternate mode.
///
/// Switching to a costlier or dirtier mode yields zero savings rather than a penalty.
pub fn calculate(
    rates: &RateTable,
    input: &TransportInput,
) -> Result<TransportResult, ValidationError> {
    if let (Some(current), Some(alternate)) = (input.current_mode, input.alternate_mode) {
        if current == alternate {
            return Err(ValidationError::SameTransportMode);
        }
    }

    let distance_km = require_positive("distance_km", input.distance_km)?;
    let frequency = require_present(Frequency::FIELD, input.frequency)?;
    let current_mode = require_present("current_mode", input.current_mode)?;
    let alternate_mode = require_present("alternate_mode", input.alternate_mode)?;

    let current = rates.transport(current_mode)?;
    let alternate = rates.transport(alternate_mode)?;
    let trips = frequency.trips_per_month();

    let current_cost = bounded_result("current_cost", distance_km * current.cost_per_km * trips)?;
    let alternate_cost =
        bounded_result("alternate_cost", distance_km * alternate.cost_per_km * trips)?;
    let current_co2_kg = bounded_result(
        "current_co2_kg",
        distance_km * current.co2_grams_per_km * trips / GRAMS_PER_KG,
    )?;
    let alternate_co2_kg = bounded_result(
        "alternate_co2_kg",
        distance_km * alternate.co2_grams_per_km * trips / GRAMS_PER_KG,
    )?;

    let money_saved = (current_cost - alternate_cost).max(0.0);
    let annual_savings = bounded_result("annual_savings", money_saved * 12.0)?;
    let co2_reduced_kg = (current_co2_kg - alternate_co2_kg).max(0.0);
    let points = round_points(money_saved + co2_reduced_kg);

    Ok(TransportResult {
        distance_km,
        frequency,
        current_mode,
        alternate_mode,
        current_cost,
        alternate_cost,
        current_co2_kg,
        alternate_co2_kg,
        money_saved,
        annual_savings,
        co2_reduced_kg,
        points,
    })
}

impl ImpactOutcome for TransportResult {
    fn calculation_type(&self) -> CalculationType {
        CalculationType::Transport
    }

    fn title(&self) -> String {
        format!(
            "{} → {}",
            self.current_mode.label(),
            self.alternate_mode.label()
        )
    }

    fn summary(&self) -> ImpactSummary {
        ImpactSummary {
            money_saved: self.money_saved,
            co2_reduced_kg: self.co2_reduced_kg,
            points: self.points,
        }
    }

    fn details(&self) -> BTreeMap<String, String> {
        BTreeMap::from([
            (
                "distance".to_string(),
                format!("{}km", display_number(self.distance_km)),
            ),
            ("frequency".to_string(), self.frequency.id().to_string()),
            ("from".to_string(), self.current_mode.label().to_string()),
            ("to".to_string(), self.alternate_mode.label().to_string()),
            (
                "current_cost".to_string(),
                format!("₹{:.2}", self.current_cost),
            ),
            (
                "alternate_cost".to_string(),
                format!("₹{:.2}", self.alternate_cost),
            ),
        ])
    }
}
