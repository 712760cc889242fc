use crate::calculators::ImpactOutcome;

use super::domain::{NewCalculation, UserId};

/// Shapes a calculator outcome into the record handed to persistence.
#[derive(Debug, Clone)]
pub struct RecordBuilder<'a> {
    user_id: &'a UserId,
    title: Option<String>,
}

impl<'a> RecordBuilder<'a> {
    pub fn new(user_id: &'a UserId) -> Self {
        Self {
            user_id,
            title: None,
        }
    }

    /// Replaces the generated title; blank titles fall back to the generated one.
    pub fn title(mut self, title: Option<String>) -> Self {
        self.title = title
            .map(|title| title.trim().to_string())
            .filter(|title| !title.is_empty());
        self
    }

    pub fn build<O>(self, outcome: &O) -> NewCalculation
    where
        O: ImpactOutcome + ?Sized,
    {
        let summary = outcome.summary();
        NewCalculation {
            user_id: self.user_id.clone(),
            calculation_type: outcome.calculation_type(),
            title: self.title.unwrap_or_else(|| outcome.title()),
            money_saved: summary.money_saved,
            co2_reduced_kg: summary.co2_reduced_kg,
            points: summary.points,
            details: outcome.details(),
        }
    }
}
