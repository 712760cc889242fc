use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::impact::{display_number, round_points, CalculationType, ImpactOutcome, ImpactSummary};
use super::rates::RateTable;
use super::selection::{Selection, TreeSpecies};
use super::validation::{
    bounded_result, number_field, require_positive, require_present, require_whole, selection_field, InputFields,
    ValidationError,
};

const CO2_KG_PER_TREE_YEAR: f64 = 22.0;
const OXYGEN_KG_PER_TREE_YEAR: f64 = 118.0;
const POINTS_PER_KG_CO2: f64 = 5.0;
const BIODIVERSITY_PER_SQFT_TREE: f64 = 0.1;
const SOIL_CU_FT_PER_TREE_YEAR: f64 = 2.5;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AfforestationInput {
    #[serde(default)]
    pub number_of_trees: Option<f64>,
    #[serde(default)]
    pub land_area_sqft: Option<f64>,
    #[serde(default)]
    pub years_of_growth: Option<f64>,
    #[serde(default)]
    pub tree_species: Option<TreeSpecies>,
}

impl AfforestationInput {
    pub fn from_fields(fields: &InputFields) -> Result<Self, ValidationError> {
        Ok(Self {
            number_of_trees: number_field(fields, "number_of_trees")?,
            land_area_sqft: number_field(fields, "land_area_sqft")?,
            years_of_growth: number_field(fields, "years_of_growth")?,
            tree_species: selection_field(fields, "tree_species")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AfforestationResult {
    pub number_of_trees: f64,
    pub land_area_sqft: f64,
    pub years_of_growth: f64,
    pub tree_species: TreeSpecies,
    pub species_multiplier: f64,
    pub co2_absorbed_kg: f64,
    pub oxygen_produced_kg: f64,
    pub biodiversity_score: f64,
    pub soil_conservation_cu_ft: f64,
    /// Planting trees carries no direct financial saving; always zero.
    pub money_saved: f64,
    pub points: u64,
}

pub fn calculate(
    rates: &RateTable,
    input: &AfforestationInput,
) -> Result<AfforestationResult, ValidationError> {
    let number_of_trees = require_whole("number_of_trees", input.number_of_trees)?;
    let land_area_sqft = require_positive("land_area_sqft", input.land_area_sqft)?;
    let years_of_growth = require_positive("years_of_growth", input.years_of_growth)?;
    let tree_species = require_present(TreeSpecies::FIELD, input.tree_species)?;
    let multiplier = rates.species_multiplier(tree_species)?;

    let co2_absorbed_kg = bounded_result(
        "co2_absorbed_kg",
        number_of_trees * CO2_KG_PER_TREE_YEAR * years_of_growth * multiplier,
    )?;
    let oxygen_produced_kg = bounded_result(
        "oxygen_produced_kg",
        number_of_trees * OXYGEN_KG_PER_TREE_YEAR * years_of_growth * multiplier,
    )?;
    let points = round_points(co2_absorbed_kg * POINTS_PER_KG_CO2);
    let biodiversity_score = bounded_result(
        "biodiversity_score",
        land_area_sqft * BIODIVERSITY_PER_SQFT_TREE * number_of_trees,
    )?;
    let soil_conservation_cu_ft = bounded_result(
        "soil_conservation_cu_ft",
        number_of_trees * SOIL_CU_FT_PER_TREE_YEAR * years_of_growth,
    )?;

    Ok(AfforestationResult {
        number_of_trees,
        land_area_sqft,
        years_of_growth,
        tree_species,
        species_multiplier: multiplier,
        co2_absorbed_kg,
        oxygen_produced_kg,
        biodiversity_score,
        soil_conservation_cu_ft,
        money_saved: 0.0,
        points,
    })
}

impl ImpactOutcome for AfforestationResult {
    fn calculation_type(&self) -> CalculationType {
        CalculationType::Afforestation
    }

    fn title(&self) -> String {
        format!(
            "{} {} Trees",
            display_number(self.number_of_trees),
            self.tree_species.label()
        )
    }

    fn summary(&self) -> ImpactSummary {
        ImpactSummary {
            money_saved: self.money_saved,
            co2_reduced_kg: self.co2_absorbed_kg,
            points: self.points,
        }
    }

    fn details(&self) -> BTreeMap<String, String> {
        BTreeMap::from([
            (
                "number_of_trees".to_string(),
                display_number(self.number_of_trees),
            ),
            (
                "land_area".to_string(),
                format!("{} sqft", display_number(self.land_area_sqft)),
            ),
            (
                "years_of_growth".to_string(),
                display_number(self.years_of_growth),
            ),
            (
                "tree_species".to_string(),
                self.tree_species.label().to_string(),
            ),
            (
                "oxygen_produced".to_string(),
                format!("{:.0} kg", self.oxygen_produced_kg),
            ),
            (
                "biodiversity_score".to_string(),
                format!("{:.1}", self.biodiversity_score),
            ),
            (
                "soil_conservation".to_string(),
                format!("{:.0} cu ft", self.soil_conservation_cu_ft),
            ),
        ])
    }
}
