use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::afforestation::{self, AfforestationInput, AfforestationResult};
use super::electricity::{self, ElectricityInput, ElectricityResult};
use super::impact::{CalculationType, ImpactOutcome, ImpactSummary};
use super::rates::RateTable;
use super::solar::{self, SolarInput, SolarResult};
use super::transport::{self, TransportInput, TransportResult};
use super::validation::{InputFields, ValidationError};
use super::water::{self, WaterInput, WaterResult};

/// Calculator input tagged with the category it targets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "input", rename_all = "snake_case")]
pub enum CalculationRequest {
    Solar(SolarInput),
    Afforestation(AfforestationInput),
    Water(WaterInput),
    Transport(TransportInput),
    Electricity(ElectricityInput),
}

impl CalculationRequest {
    pub fn calculation_type(&self) -> CalculationType {
        match self {
            Self::Solar(_) => CalculationType::Solar,
            Self::Afforestation(_) => CalculationType::Afforestation,
            Self::Water(_) => CalculationType::Water,
            Self::Transport(_) => CalculationType::Transport,
            Self::Electricity(_) => CalculationType::Electricity,
        }
    }

    pub fn calculate(&self, rates: &RateTable) -> Result<CalculationOutcome, ValidationError> {
        let outcome = match self {
            Self::Solar(input) => CalculationOutcome::Solar(solar::calculate(rates, input)?),
            Self::Afforestation(input) => {
                CalculationOutcome::Afforestation(afforestation::calculate(rates, input)?)
            }
            Self::Water(input) => CalculationOutcome::Water(water::calculate(rates, input)?),
            Self::Transport(input) => {
                CalculationOutcome::Transport(transport::calculate(rates, input)?)
            }
            Self::Electricity(input) => {
                CalculationOutcome::Electricity(electricity::calculate(rates, input)?)
            }
        };
        Ok(outcome)
    }

    /// Pre-fills a request from a saved profile preset.
    pub fn from_fields(
        calculation_type: CalculationType,
        fields: &InputFields,
    ) -> Result<Self, ValidationError> {
        let request = match calculation_type {
            CalculationType::Solar => Self::Solar(SolarInput::from_fields(fields)?),
            CalculationType::Afforestation => {
                Self::Afforestation(AfforestationInput::from_fields(fields)?)
            }
            CalculationType::Water => Self::Water(WaterInput::from_fields(fields)?),
            CalculationType::Transport => Self::Transport(TransportInput::from_fields(fields)?),
            CalculationType::Electricity => {
                Self::Electricity(ElectricityInput::from_fields(fields)?)
            }
        };
        Ok(request)
    }
}

/// Result of any calculator, tagged with its category.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "result", rename_all = "snake_case")]
pub enum CalculationOutcome {
    Solar(SolarResult),
    Afforestation(AfforestationResult),
    Water(WaterResult),
    Transport(TransportResult),
    Electricity(ElectricityResult),
}

impl CalculationOutcome {
    fn as_outcome(&self) -> &dyn ImpactOutcome {
        match self {
            Self::Solar(result) => result,
            Self::Afforestation(result) => result,
            Self::Water(result) => result,
            Self::Transport(result) => result,
            Self::Electricity(result) => result,
        }
    }
}

impl ImpactOutcome for CalculationOutcome {
    fn calculation_type(&self) -> CalculationType {
        self.as_outcome().calculation_type()
    }

    fn title(&self) -> String {
        self.as_outcome().title()
    }

    fn summary(&self) -> ImpactSummary {
        self.as_outcome().summary()
    }

    fn details(&self) -> BTreeMap<String, String> {
        self.as_outcome().details()
    }
}
