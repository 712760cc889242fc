use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::impact::{display_number, round_points, CalculationType, ImpactOutcome, ImpactSummary};
use super::rates::RateTable;
use super::validation::{
    bounded_result, number_field, optional_non_negative, require_positive, require_positive_at_most, InputFields,
    ValidationError,
};

const CAPACITY_KW_PER_SQFT: f64 = 0.01;
const DAYS_PER_MONTH: f64 = 30.0;
const PANEL_DERATING: f64 = 0.8;
const MONTHS_PER_YEAR: f64 = 12.0;
const POINTS_PER_KG_CO2: f64 = 10.0;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SolarInput {
    /// Informational only; it does not feed the savings formula.
    #[serde(default)]
    pub monthly_bill_rupees: Option<f64>,
    #[serde(default)]
    pub rooftop_area_sqft: Option<f64>,
    #[serde(default)]
    pub sunlight_hours_per_day: Option<f64>,
}

impl SolarInput {
    pub fn from_fields(fields: &InputFields) -> Result<Self, ValidationError> {
        Ok(Self {
            monthly_bill_rupees: number_field(fields, "monthly_bill_rupees")?,
            rooftop_area_sqft: number_field(fields, "rooftop_area_sqft")?,
            sunlight_hours_per_day: number_field(fields, "sunlight_hours_per_day")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SolarResult {
    pub monthly_bill_rupees: Option<f64>,
    pub rooftop_area_sqft: f64,
    pub sunlight_hours_per_day: f64,
    pub system_capacity_kw: f64,
    pub monthly_generation_kwh: f64,
    pub money_saved: f64,
    pub annual_savings: f64,
    pub annual_co2_reduction_kg: f64,
    pub points: u64,
}

impl SolarResult {
    /// Stored on records so solar stays comparable with the other monthly figures.
    pub fn monthly_co2_reduction_kg(&self) -> f64 {
        self.annual_co2_reduction_kg / MONTHS_PER_YEAR
    }
}

pub fn calculate(rates: &RateTable, input: &SolarInput) -> Result<SolarResult, ValidationError> {
    let monthly_bill_rupees = optional_non_negative("monthly_bill_rupees", input.monthly_bill_rupees)?;
    let rooftop_area_sqft = require_positive("rooftop_area_sqft", input.rooftop_area_sqft)?;
    let sunlight_hours_per_day = require_positive_at_most(
        "sunlight_hours_per_day",
        input.sunlight_hours_per_day,
        12.0,
        "(0, 12]",
    )?;

    let system_capacity_kw = rooftop_area_sqft * CAPACITY_KW_PER_SQFT;
    let monthly_generation_kwh =
        system_capacity_kw * sunlight_hours_per_day * DAYS_PER_MONTH * PANEL_DERATING;
    let money_saved = monthly_generation_kwh * rates.solar_avoided_cost_per_kwh;
    let annual_savings = bounded_result("annual_savings", money_saved * MONTHS_PER_YEAR)?;
    let annual_co2_reduction_kg = bounded_result(
        "annual_co2_reduction_kg",
        monthly_generation_kwh * MONTHS_PER_YEAR * rates.electricity_co2_per_kwh,
    )?;
    let points = round_points(annual_co2_reduction_kg * POINTS_PER_KG_CO2);

    Ok(SolarResult {
        monthly_bill_rupees,
        rooftop_area_sqft,
        sunlight_hours_per_day,
        system_capacity_kw,
        monthly_generation_kwh,
        money_saved,
        annual_savings,
        annual_co2_reduction_kg,
        points,
    })
}

impl ImpactOutcome for SolarResult {
    fn calculation_type(&self) -> CalculationType {
        CalculationType::Solar
    }

    fn title(&self) -> String {
        format!("Solar Panel ({:.1}kW)", self.system_capacity_kw)
    }

    fn summary(&self) -> ImpactSummary {
        ImpactSummary {
            money_saved: self.money_saved,
            co2_reduced_kg: self.monthly_co2_reduction_kg(),
            points: self.points,
        }
    }

    fn details(&self) -> BTreeMap<String, String> {
        let mut details = BTreeMap::new();
        details.insert(
            "system_capacity".to_string(),
            format!("{:.1}kW", self.system_capacity_kw),
        );
        details.insert(
            "rooftop_area".to_string(),
            format!("{} sqft", display_number(self.rooftop_area_sqft)),
        );
        details.insert(
            "sunlight_hours".to_string(),
            display_number(self.sunlight_hours_per_day),
        );
        details.insert(
            "monthly_generation".to_string(),
            format!("{:.0} kWh", self.monthly_generation_kwh),
        );
        details.insert(
            "annual_savings".to_string(),
            format!("₹{:.0}", self.annual_savings),
        );
        if let Some(bill) = self.monthly_bill_rupees {
            details.insert("monthly_bill".to_string(), format!("₹{}", display_number(bill)));
        }
        details
    }
}
