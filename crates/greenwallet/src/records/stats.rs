use crate::calculators::ImpactSummary;

use super::domain::{CalculationRecord, UserStats};

const FIXED_POINT_SCALE: f64 = 10_000.0;

/// Exact running totals for one user.
///
/// Currency and CO2 are accumulated as integers in ten-thousandths so that adding and
/// retracting the same record always restores the previous totals bit for bit, and the
/// incremental totals always equal a fresh reduction over the record set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsTally {
    saved: i128,
    co2: i128,
    points: u64,
    count: u64,
}

impl StatsTally {
    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a CalculationRecord>,
    {
        records
            .into_iter()
            .fold(Self::default(), |mut tally, record| {
                tally.add(&record.summary());
                tally
            })
    }

    pub fn add(&mut self, summary: &ImpactSummary) {
        self.saved = self.saved.saturating_add(to_fixed(summary.money_saved));
        self.co2 = self.co2.saturating_add(to_fixed(summary.co2_reduced_kg));
        self.points = self.points.saturating_add(summary.points);
        self.count = self.count.saturating_add(1);
    }

    pub fn remove(&mut self, summary: &ImpactSummary) {
        self.saved = self.saved.saturating_sub(to_fixed(summary.money_saved));
        self.co2 = self.co2.saturating_sub(to_fixed(summary.co2_reduced_kg));
        self.points = self.points.saturating_sub(summary.points);
        self.count = self.count.saturating_sub(1);
    }

    pub fn stats(&self) -> UserStats {
        UserStats {
            total_saved: from_fixed(self.saved),
            total_co2_reduced_kg: from_fixed(self.co2),
            total_points: self.points,
            calculation_count: self.count,
        }
    }
}

fn to_fixed(value: f64) -> i128 {
    if value.is_finite() {
        (value * FIXED_POINT_SCALE).round() as i128
    } else {
        0
    }
}

fn from_fixed(value: i128) -> f64 {
    value as f64 / FIXED_POINT_SCALE
}
