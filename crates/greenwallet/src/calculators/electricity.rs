use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::impact::{display_number, round_points, CalculationType, ImpactOutcome, ImpactSummary};
use super::rates::RateTable;
use super::selection::{ApplianceAction, Selection};
use super::validation::{
    bounded_result, number_field, require_between, require_positive_at_most, require_present, selection_field,
    InputFields, ValidationError,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ElectricityInput {
    #[serde(default)]
    pub appliance_action: Option<ApplianceAction>,
    #[serde(default)]
    pub hours_per_day: Option<f64>,
    #[serde(default)]
    pub days_per_month: Option<f64>,
}

impl ElectricityInput {
    pub fn from_fields(fields: &InputFields) -> Result<Self, ValidationError> {
        Ok(Self {
            appliance_action: selection_field(fields, "appliance_action")?,
            hours_per_day: number_field(fields, "hours_per_day")?,
            days_per_month: number_field(fields, "days_per_month")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElectricityResult {
    pub appliance_action: ApplianceAction,
    pub hours_per_day: f64,
    pub days_per_month: f64,
    pub from_consumption_kwh: f64,
    pub to_consumption_kwh: f64,
    /// Raw difference, kept for the before/after display even if the swap table is inverted.
    pub kwh_saved: f64,
    pub money_saved: f64,
    pub annual_savings: f64,
    pub co2_reduced_kg: f64,
    pub points: u64,
}

pub fn calculate(
    rates: &RateTable,
    input: &ElectricityInput,
) -> Result<ElectricityResult, ValidationError> {
    let appliance_action = require_present(ApplianceAction::FIELD, input.appliance_action)?;
    let hours_per_day =
        require_positive_at_most("hours_per_day", input.hours_per_day, 24.0, "(0, 24]")?;
    let days_per_month =
        require_between("days_per_month", input.days_per_month, 1.0, 31.0, "[1, 31]")?;
    let power = rates.appliance_swap(appliance_action)?;

    let from_consumption_kwh = power.from_kw * hours_per_day * days_per_month;
    let to_consumption_kwh = power.to_kw * hours_per_day * days_per_month;
    let kwh_saved = from_consumption_kwh - to_consumption_kwh;

    let credited_kwh = kwh_saved.max(0.0);
    let money_saved = credited_kwh * rates.electricity_rate_per_kwh;
    let annual_savings = bounded_result("annual_savings", money_saved * 12.0)?;
    let co2_reduced_kg = bounded_result(
        "co2_reduced_kg",
        credited_kwh * rates.electricity_co2_per_kwh,
    )?;
    let points = round_points(money_saved + co2_reduced_kg);

    Ok(ElectricityResult {
        appliance_action,
        hours_per_day,
        days_per_month,
        from_consumption_kwh,
        to_consumption_kwh,
        kwh_saved,
        money_saved,
        annual_savings,
        co2_reduced_kg,
        points,
    })
}

impl ImpactOutcome for ElectricityResult {
    fn calculation_type(&self) -> CalculationType {
        CalculationType::Electricity
    }

    fn title(&self) -> String {
        self.appliance_action.label().to_string()
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
                "appliance".to_string(),
                self.appliance_action.label().to_string(),
            ),
            (
                "hours_per_day".to_string(),
                display_number(self.hours_per_day),
            ),
            (
                "days_per_month".to_string(),
                display_number(self.days_per_month),
            ),
            (
                "before_consumption".to_string(),
                format!("{:.0} kWh", self.from_consumption_kwh),
            ),
            (
                "after_consumption".to_string(),
                format!("{:.0} kWh", self.to_consumption_kwh),
            ),
            (
                "kwh_saved".to_string(),
                format!("{:.1} kWh", self.kwh_saved),
            ),
        ])
    }
}
