use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Eco-action category a calculation belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalculationType {
    Solar,
    Afforestation,
    Water,
    Transport,
    Electricity,
}

impl CalculationType {
    pub const fn ordered() -> [Self; 5] {
        [
            Self::Solar,
            Self::Afforestation,
            Self::Water,
            Self::Transport,
            Self::Electricity,
        ]
    }

    pub const fn id(self) -> &'static str {
        match self {
            Self::Solar => "solar",
            Self::Afforestation => "afforestation",
            Self::Water => "water",
            Self::Transport => "transport",
            Self::Electricity => "electricity",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Solar => "Solar Power",
            Self::Afforestation => "Afforestation",
            Self::Water => "Water Conservation",
            Self::Transport => "Transport Switch",
            Self::Electricity => "Electricity Efficiency",
        }
    }

    pub const fn icon(self) -> &'static str {
        match self {
            Self::Solar => "Sun",
            Self::Afforestation => "TreePine",
            Self::Water => "Droplets",
            Self::Transport => "Car",
            Self::Electricity => "Zap",
        }
    }

    pub const fn color(self) -> &'static str {
        match self {
            Self::Solar => "text-yellow-600",
            Self::Afforestation => "text-green-600",
            Self::Water => "text-blue-600",
            Self::Transport => "text-purple-600",
            Self::Electricity => "text-orange-600",
        }
    }

    pub fn from_id(raw: &str) -> Option<Self> {
        let needle = raw.trim();
        Self::ordered()
            .into_iter()
            .find(|kind| kind.id().eq_ignore_ascii_case(needle))
    }

    pub fn view(self) -> CalculationTypeView {
        CalculationTypeView {
            calculation_type: self,
            label: self.label(),
            icon: self.icon(),
            color: self.color(),
        }
    }
}

/// Display metadata for a calculation type.
#[derive(Debug, Clone, Serialize)]
pub struct CalculationTypeView {
    #[serde(rename = "type")]
    pub calculation_type: CalculationType,
    pub label: &'static str,
    pub icon: &'static str,
    pub color: &'static str,
}

/// The three normalized outputs every calculator produces.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ImpactSummary {
    pub money_saved: f64,
    pub co2_reduced_kg: f64,
    pub points: u64,
}

/// A calculator result that can be turned into a persisted calculation record.
pub trait ImpactOutcome {
    fn calculation_type(&self) -> CalculationType;
    /// Human-readable title composed from the selected categories.
    fn title(&self) -> String;
    fn summary(&self) -> ImpactSummary;
    /// Domain-specific display fields, already formatted with units.
    fn details(&self) -> BTreeMap<String, String>;
}

/// Rounds a raw score to points, half away from zero; negative or non-finite scores earn nothing.
pub fn round_points(score: f64) -> u64 {
    if score.is_finite() && score > 0.0 {
        score.round() as u64
    } else {
        0
    }
}

/// Formats user-entered quantities without trailing zeros (`6`, `6.5`, `12.25`).
pub(crate) fn display_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        let formatted = format!("{value:.2}");
        formatted
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_string()
    }
}
