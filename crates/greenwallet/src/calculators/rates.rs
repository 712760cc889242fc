use serde::Serialize;

use super::selection::{ApplianceAction, Selection, TransportMode, TreeSpecies, WaterAction};
use super::validation::ValidationError;

/// Per-kilometre cost and emissions for a transport mode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TransportRate {
    pub cost_per_km: f64,
    pub co2_grams_per_km: f64,
}

/// Power draw before and after an appliance swap, in kW.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AppliancePower {
    pub from_kw: f64,
    pub to_kw: f64,
}

/// Static conversion factors from physical quantities to rupees and kg CO2.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RateTable {
    pub electricity_rate_per_kwh: f64,
    pub electricity_co2_per_kwh: f64,
    pub water_rate_per_kiloliter: f64,
    pub water_co2_per_kiloliter: f64,
    /// Avoided grid cost credited to rooftop generation.
    pub solar_avoided_cost_per_kwh: f64,
    pub transport_modes: &'static [(TransportMode, TransportRate)],
    pub tree_species: &'static [(TreeSpecies, f64)],
    pub water_actions: &'static [(WaterAction, f64)],
    pub appliance_swaps: &'static [(ApplianceAction, AppliancePower)],
}

impl RateTable {
    pub const STANDARD: RateTable = RateTable {
        electricity_rate_per_kwh: 7.0,
        electricity_co2_per_kwh: 0.82,
        water_rate_per_kiloliter: 30.0,
        water_co2_per_kiloliter: 1.6,
        solar_avoided_cost_per_kwh: 6.0,
        transport_modes: &[
            (
                TransportMode::Taxi,
                TransportRate {
                    cost_per_km: 18.0,
                    co2_grams_per_km: 150.0,
                },
            ),
            (
                TransportMode::Car,
                TransportRate {
                    cost_per_km: 8.0,
                    co2_grams_per_km: 120.0,
                },
            ),
            (
                TransportMode::Metro,
                TransportRate {
                    cost_per_km: 2.5,
                    co2_grams_per_km: 18.0,
                },
            ),
            (
                TransportMode::Bus,
                TransportRate {
                    cost_per_km: 1.5,
                    co2_grams_per_km: 25.0,
                },
            ),
        ],
        tree_species: &[
            (TreeSpecies::Neem, 1.0),
            (TreeSpecies::Banyan, 1.5),
            (TreeSpecies::Peepal, 1.3),
            (TreeSpecies::Mango, 1.1),
            (TreeSpecies::Teak, 1.2),
            (TreeSpecies::Eucalyptus, 0.9),
            (TreeSpecies::Bamboo, 0.8),
            (TreeSpecies::Oak, 1.4),
        ],
        water_actions: &[
            (WaterAction::Rainwater, 1.0),
            (WaterAction::LowFlow, 0.3),
            (WaterAction::Greywater, 0.4),
            (WaterAction::Drip, 0.5),
            (WaterAction::Leak, 0.2),
        ],
        appliance_swaps: &[
            (
                ApplianceAction::AcToFan,
                AppliancePower {
                    from_kw: 1.5,
                    to_kw: 0.075,
                },
            ),
            (
                ApplianceAction::AcReduce,
                AppliancePower {
                    from_kw: 1.5,
                    to_kw: 0.75,
                },
            ),
            (
                ApplianceAction::LedBulb,
                AppliancePower {
                    from_kw: 0.06,
                    to_kw: 0.01,
                },
            ),
            (
                ApplianceAction::EnergyStar,
                AppliancePower {
                    from_kw: 2.0,
                    to_kw: 1.4,
                },
            ),
        ],
    };

    pub fn transport(&self, mode: TransportMode) -> Result<TransportRate, ValidationError> {
        lookup(self.transport_modes, mode)
    }

    pub fn species_multiplier(&self, species: TreeSpecies) -> Result<f64, ValidationError> {
        lookup(self.tree_species, species)
    }

    pub fn water_action_multiplier(&self, action: WaterAction) -> Result<f64, ValidationError> {
        lookup(self.water_actions, action)
    }

    pub fn appliance_swap(&self, action: ApplianceAction) -> Result<AppliancePower, ValidationError> {
        lookup(self.appliance_swaps, action)
    }

    /// True when every rate, multiplier and power figure is strictly positive.
    pub fn is_well_formed(&self) -> bool {
        let scalars = [
            self.electricity_rate_per_kwh,
            self.electricity_co2_per_kwh,
            self.water_rate_per_kiloliter,
            self.water_co2_per_kiloliter,
            self.solar_avoided_cost_per_kwh,
        ];
        let positive = |value: f64| value.is_finite() && value > 0.0;

        scalars.into_iter().all(positive)
            && self
                .transport_modes
                .iter()
                .all(|(_, rate)| positive(rate.cost_per_km) && positive(rate.co2_grams_per_km))
            && self.tree_species.iter().all(|(_, m)| positive(*m))
            && self.water_actions.iter().all(|(_, m)| positive(*m))
            && self
                .appliance_swaps
                .iter()
                .all(|(_, power)| positive(power.from_kw) && positive(power.to_kw))
    }
}

impl Default for RateTable {
    fn default() -> Self {
        Self::STANDARD
    }
}

fn lookup<K, V>(table: &[(K, V)], key: K) -> Result<V, ValidationError>
where
    K: Selection + PartialEq,
    V: Copy,
{
    table
        .iter()
        .find(|(candidate, _)| *candidate == key)
        .map(|(_, value)| *value)
        .ok_or_else(|| ValidationError::UnknownSelection {
            field: K::FIELD,
            value: key.id().to_string(),
        })
}
