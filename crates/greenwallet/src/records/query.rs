use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::calculators::CalculationType;

use super::domain::CalculationRecord;

/// Number of records shown on the dashboard's recent activity panel.
pub const RECENT_LIMIT: usize = 5;

/// Sort keys offered by the history view; every key sorts descending.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistorySort {
    #[default]
    Date,
    Savings,
    Co2,
    Points,
}

/// Filter, search, sort and paging options for a user's calculation history.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryQuery {
    #[serde(default, rename = "type")]
    pub calculation_type: Option<CalculationType>,
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub sort: HistorySort,
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub skip: usize,
}

impl HistoryQuery {
    /// Every record, newest first.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn recent() -> Self {
        Self {
            limit: Some(RECENT_LIMIT),
            ..Self::default()
        }
    }

    /// Case-insensitive match of the search term against title or type id.
    pub fn matches(&self, record: &CalculationRecord) -> bool {
        if let Some(kind) = self.calculation_type {
            if record.calculation_type != kind {
                return false;
            }
        }

        match self.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(term) => {
                let term = term.to_lowercase();
                record.title.to_lowercase().contains(&term)
                    || record.calculation_type.id().contains(&term)
            }
        }
    }

    fn compare(&self, a: &CalculationRecord, b: &CalculationRecord) -> Ordering {
        let primary = match self.sort {
            HistorySort::Date => b.created_at.cmp(&a.created_at),
            HistorySort::Savings => b.money_saved.total_cmp(&a.money_saved),
            HistorySort::Co2 => b.co2_reduced_kg.total_cmp(&a.co2_reduced_kg),
            HistorySort::Points => b.points.cmp(&a.points),
        };
        primary
            .then_with(|| b.created_at.cmp(&a.created_at))
            .then_with(|| b.id.cmp(&a.id))
    }

    /// Applies filter, sort and paging to an unordered set of records.
    pub fn apply<I>(&self, records: I) -> Vec<CalculationRecord>
    where
        I: IntoIterator<Item = CalculationRecord>,
    {
        let mut selected: Vec<_> = records
            .into_iter()
            .filter(|record| self.matches(record))
            .collect();
        selected.sort_by(|a, b| self.compare(a, b));

        let page = selected.into_iter().skip(self.skip);
        match self.limit {
            Some(limit) => page.take(limit).collect(),
            None => page.collect(),
        }
    }
}
