//! GreenWallet turns everyday eco-friendly actions into rupees saved, CO2 avoided and points.
//!
//! [`calculators`] holds the pure per-category formulas, [`records`] persists results and keeps
//! per-user totals consistent with the stored history.

pub mod calculators;
pub mod config;
pub mod error;
pub mod records;
pub mod telemetry;
