use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::impact::{round_points, CalculationType, ImpactOutcome, ImpactSummary};
use super::rates::RateTable;
use super::selection::{Selection, WaterAction};
use super::validation::{
    bounded_result, number_field, require_positive, require_present, selection_field, InputFields,
    ValidationError,
};

const LITERS_PER_KILOLITER: f64 = 1000.0;
/// Assumed share of the bill saved through conservation.
const BILL_REDUCTION_SHARE: f64 = 0.3;
const BILL_TITLE: &str = "Monthly Bill Reduction";
const BILL_ACTION_LABEL: &str = "Bill Reduction";

/// Water savings are estimated either from the monthly bill or from a specific action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum WaterInput {
    Bill {
        #[serde(default)]
        monthly_bill_rupees: Option<f64>,
    },
    Action {
        #[serde(default)]
        liters_per_month: Option<f64>,
        #[serde(default)]
        action: Option<WaterAction>,
    },
}

impl WaterInput {
    /// Builds an input from preset fields; without an explicit `mode` the presence of a bill
    /// amount selects bill mode.
    pub fn from_fields(fields: &InputFields) -> Result<Self, ValidationError> {
        let mode = match fields.get("mode") {
            Some(Value::String(mode)) => mode.trim().to_ascii_lowercase(),
            Some(Value::Null) | None => {
                if fields.contains_key("monthly_bill_rupees") {
                    "bill".to_string()
                } else {
                    "action".to_string()
                }
            }
            Some(other) => {
                return Err(ValidationError::UnknownSelection {
                    field: "mode",
                    value: other.to_string(),
                })
            }
        };

        match mode.as_str() {
            "bill" => Ok(Self::Bill {
                monthly_bill_rupees: number_field(fields, "monthly_bill_rupees")?,
            }),
            "action" => Ok(Self::Action {
                liters_per_month: number_field(fields, "liters_per_month")?,
                action: selection_field(fields, "action")?,
            }),
            other => Err(ValidationError::UnknownSelection {
                field: "mode",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WaterMode {
    Bill,
    Action,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WaterResult {
    pub mode: WaterMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monthly_bill_rupees: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<WaterAction>,
    pub liters_per_month: f64,
    pub money_saved: f64,
    pub annual_savings: f64,
    pub co2_reduced_kg: f64,
    pub points: u64,
}

pub fn calculate(rates: &RateTable, input: &WaterInput) -> Result<WaterResult, ValidationError> {
    let (mode, monthly_bill_rupees, action, liters_per_month, money_saved) = match input {
        WaterInput::Bill {
            monthly_bill_rupees,
        } => {
            let bill = require_positive("monthly_bill_rupees", *monthly_bill_rupees)?;
            let liters = bill / rates.water_rate_per_kiloliter * LITERS_PER_KILOLITER;
            (
                WaterMode::Bill,
                Some(bill),
                None,
                liters,
                bill * BILL_REDUCTION_SHARE,
            )
        }
        WaterInput::Action {
            liters_per_month,
            action,
        } => {
            let liters = require_positive("liters_per_month", *liters_per_month)?;
            let action = require_present(WaterAction::FIELD, *action)?;
            let multiplier = rates.water_action_multiplier(action)?;
            let money =
                liters / LITERS_PER_KILOLITER * rates.water_rate_per_kiloliter * multiplier;
            (WaterMode::Action, None, Some(action), liters, money)
        }
    };

    let annual_savings = bounded_result("annual_savings", money_saved * 12.0)?;
    let co2_reduced_kg = bounded_result(
        "co2_reduced_kg",
        liters_per_month / LITERS_PER_KILOLITER * rates.water_co2_per_kiloliter,
    )?;
    let points = round_points(money_saved + co2_reduced_kg);

    Ok(WaterResult {
        mode,
        monthly_bill_rupees,
        action,
        liters_per_month,
        money_saved,
        annual_savings,
        co2_reduced_kg,
        points,
    })
}

impl WaterResult {
    fn action_label(&self) -> &'static str {
        self.action
            .map(Selection::label)
            .unwrap_or(BILL_ACTION_LABEL)
    }
}

impl ImpactOutcome for WaterResult {
    fn calculation_type(&self) -> CalculationType {
        CalculationType::Water
    }

    fn title(&self) -> String {
        match self.mode {
            WaterMode::Bill => BILL_TITLE.to_string(),
            WaterMode::Action => self.action_label().to_string(),
        }
    }

    fn summary(&self) -> ImpactSummary {
        ImpactSummary {
            money_saved: self.money_saved,
            co2_reduced_kg: self.co2_reduced_kg,
            points: self.points,
        }
    }

    fn details(&self) -> BTreeMap<String, String> {
        let mut details = BTreeMap::new();
        details.insert(
            "liters_per_month".to_string(),
            format!("{:.0}L", self.liters_per_month),
        );
        details.insert("action".to_string(), self.action_label().to_string());
        details.insert(
            "annual_savings".to_string(),
            format!("₹{:.0}", self.annual_savings),
        );
        details
    }
}
