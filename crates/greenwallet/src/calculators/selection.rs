use serde::{Deserialize, Serialize};

use super::validation::ValidationError;

/// Closed set of user-selectable options carrying a stable id and a display label.
pub trait Selection: Copy + Sized + 'static {
    /// Field name reported when a selection is missing or unknown.
    const FIELD: &'static str;

    fn ordered() -> &'static [Self];
    fn id(self) -> &'static str;
    fn label(self) -> &'static str;

    fn from_id(raw: &str) -> Option<Self> {
        let needle = raw.trim();
        Self::ordered()
            .iter()
            .copied()
            .find(|option| option.id().eq_ignore_ascii_case(needle))
    }

    fn parse(raw: &str) -> Result<Self, ValidationError> {
        Self::from_id(raw).ok_or_else(|| ValidationError::UnknownSelection {
            field: Self::FIELD,
            value: raw.trim().to_string(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportMode {
    Taxi,
    Car,
    Metro,
    Bus,
}

impl Selection for TransportMode {
    const FIELD: &'static str = "transport_mode";

    fn ordered() -> &'static [Self] {
        &[Self::Taxi, Self::Car, Self::Metro, Self::Bus]
    }

    fn id(self) -> &'static str {
        match self {
            Self::Taxi => "taxi",
            Self::Car => "car",
            Self::Metro => "metro",
            Self::Bus => "bus",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Taxi => "Taxi/Cab",
            Self::Car => "Personal Car",
            Self::Metro => "Metro/Subway",
            Self::Bus => "Bus",
        }
    }
}

/// How often a trip is repeated within a month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
}

impl Frequency {
    pub const fn trips_per_month(self) -> f64 {
        match self {
            Self::Daily => 30.0,
            Self::Weekly => 4.0,
            Self::Monthly => 1.0,
        }
    }
}

impl Selection for Frequency {
    const FIELD: &'static str = "frequency";

    fn ordered() -> &'static [Self] {
        &[Self::Daily, Self::Weekly, Self::Monthly]
    }

    fn id(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Daily => "Daily (30 days)",
            Self::Weekly => "Weekly (4 times)",
            Self::Monthly => "Monthly (1 time)",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreeSpecies {
    Neem,
    Banyan,
    Peepal,
    Mango,
    Teak,
    Eucalyptus,
    Bamboo,
    Oak,
}

impl Selection for TreeSpecies {
    const FIELD: &'static str = "tree_species";

    fn ordered() -> &'static [Self] {
        &[
            Self::Neem,
            Self::Banyan,
            Self::Peepal,
            Self::Mango,
            Self::Teak,
            Self::Eucalyptus,
            Self::Bamboo,
            Self::Oak,
        ]
    }

    fn id(self) -> &'static str {
        match self {
            Self::Neem => "neem",
            Self::Banyan => "banyan",
            Self::Peepal => "peepal",
            Self::Mango => "mango",
            Self::Teak => "teak",
            Self::Eucalyptus => "eucalyptus",
            Self::Bamboo => "bamboo",
            Self::Oak => "oak",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Neem => "Neem",
            Self::Banyan => "Banyan",
            Self::Peepal => "Peepal",
            Self::Mango => "Mango",
            Self::Teak => "Teak",
            Self::Eucalyptus => "Eucalyptus",
            Self::Bamboo => "Bamboo",
            Self::Oak => "Oak",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WaterAction {
    #[serde(rename = "rainwater")]
    Rainwater,
    #[serde(rename = "lowflow")]
    LowFlow,
    #[serde(rename = "greywater")]
    Greywater,
    #[serde(rename = "drip")]
    Drip,
    #[serde(rename = "leak")]
    Leak,
}

impl Selection for WaterAction {
    const FIELD: &'static str = "action";

    fn ordered() -> &'static [Self] {
        &[
            Self::Rainwater,
            Self::LowFlow,
            Self::Greywater,
            Self::Drip,
            Self::Leak,
        ]
    }

    fn id(self) -> &'static str {
        match self {
            Self::Rainwater => "rainwater",
            Self::LowFlow => "lowflow",
            Self::Greywater => "greywater",
            Self::Drip => "drip",
            Self::Leak => "leak",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Rainwater => "Rainwater Harvesting",
            Self::LowFlow => "Low-flow Fixtures",
            Self::Greywater => "Greywater Recycling",
            Self::Drip => "Drip Irrigation",
            Self::Leak => "Fix Water Leaks",
        }
    }
}

/// Appliance swap or usage change offered by the electricity calculator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplianceAction {
    AcToFan,
    AcReduce,
    LedBulb,
    EnergyStar,
}

impl Selection for ApplianceAction {
    const FIELD: &'static str = "appliance_action";

    fn ordered() -> &'static [Self] {
        &[
            Self::AcToFan,
            Self::AcReduce,
            Self::LedBulb,
            Self::EnergyStar,
        ]
    }

    fn id(self) -> &'static str {
        match self {
            Self::AcToFan => "ac_to_fan",
            Self::AcReduce => "ac_reduce",
            Self::LedBulb => "led_bulb",
            Self::EnergyStar => "energy_star",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::AcToFan => "Switch AC to Fan",
            Self::AcReduce => "Reduce AC Usage (50%)",
            Self::LedBulb => "Switch to LED Bulbs",
            Self::EnergyStar => "Energy Star Appliances",
        }
    }
}
