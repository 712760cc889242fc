use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::calculators::{CalculationType, ImpactSummary};

/// Authenticated identity every calculation and stats mutation is attributed to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub String);

/// Identifier assigned to a calculation record on persistence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CalculationId(pub String);

/// Identifier assigned to a saved profile preset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProfileId(pub String);

/// Calculation shaped for persistence, before the store assigns an id and timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCalculation {
    pub user_id: UserId,
    #[serde(rename = "type")]
    pub calculation_type: CalculationType,
    pub title: String,
    pub money_saved: f64,
    pub co2_reduced_kg: f64,
    pub points: u64,
    pub details: BTreeMap<String, String>,
}

impl NewCalculation {
    pub fn summary(&self) -> ImpactSummary {
        ImpactSummary {
            money_saved: self.money_saved,
            co2_reduced_kg: self.co2_reduced_kg,
            points: self.points,
        }
    }

    pub fn into_record(self, id: CalculationId, created_at: DateTime<Utc>) -> CalculationRecord {
        CalculationRecord {
            id,
            user_id: self.user_id,
            calculation_type: self.calculation_type,
            title: self.title,
            money_saved: self.money_saved,
            co2_reduced_kg: self.co2_reduced_kg,
            points: self.points,
            details: self.details,
            created_at,
        }
    }
}

/// Persisted outcome of a calculator run, owned by one user and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationRecord {
    pub id: CalculationId,
    pub user_id: UserId,
    #[serde(rename = "type")]
    pub calculation_type: CalculationType,
    pub title: String,
    pub money_saved: f64,
    pub co2_reduced_kg: f64,
    pub points: u64,
    pub details: BTreeMap<String, String>,
    pub created_at: DateTime<Utc>,
}

impl CalculationRecord {
    pub fn summary(&self) -> ImpactSummary {
        ImpactSummary {
            money_saved: self.money_saved,
            co2_reduced_kg: self.co2_reduced_kg,
            points: self.points,
        }
    }
}

/// Per-user totals over the current record set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct UserStats {
    pub total_saved: f64,
    pub total_co2_reduced_kg: f64,
    pub total_points: u64,
    pub calculation_count: u64,
}

/// Preset to store: a named set of calculator inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProfilePreset {
    pub user_id: UserId,
    #[serde(rename = "type")]
    pub calculation_type: CalculationType,
    pub name: String,
    #[serde(default)]
    pub data: BTreeMap<String, Value>,
}

impl NewProfilePreset {
    pub fn into_preset(self, id: ProfileId, created_at: DateTime<Utc>) -> ProfilePreset {
        ProfilePreset {
            id,
            user_id: self.user_id,
            calculation_type: self.calculation_type,
            name: self.name,
            data: self.data,
            created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfilePreset {
    pub id: ProfileId,
    pub user_id: UserId,
    #[serde(rename = "type")]
    pub calculation_type: CalculationType,
    pub name: String,
    pub data: BTreeMap<String, Value>,
    pub created_at: DateTime<Utc>,
}
