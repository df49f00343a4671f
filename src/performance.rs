use serde::Serialize;

use crate::percentile::round_dp;
use crate::population::{PlayerRecord, Stat};
use crate::zones;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceSummary {
    /// Goals as a share of xG, in percent.
    pub offensive_efficiency: f64,
    pub defensive_contribution: u8,
    /// Starts as a share of appearances, in percent.
    pub consistency: f64,
}

pub fn summarize(record: &PlayerRecord) -> PerformanceSummary {
    PerformanceSummary {
        offensive_efficiency: offensive_efficiency(record),
        defensive_contribution: zones::defensive_contribution(&record.position),
        consistency: consistency(record),
    }
}

fn offensive_efficiency(record: &PlayerRecord) -> f64 {
    let xg = record.stat_or_zero(Stat::Xg);
    if xg <= 0.0 {
        return 0.0;
    }
    round_dp(record.stat_or_zero(Stat::Goals) / xg * 100.0, 1)
}

fn consistency(record: &PlayerRecord) -> f64 {
    if record.matches == 0 {
        return 0.0;
    }
    round_dp(record.starts as f64 / record.matches as f64 * 100.0, 1)
}
