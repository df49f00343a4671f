use serde::Serialize;

use crate::percentile::{PercentileResult, round_dp};
use crate::population::{PlayerRecord, Stat};
use crate::zones;

pub const NEUTRAL_RATING: f64 = 50.0;
pub const STRENGTH_THRESHOLD: f64 = 80.0;
pub const WEAKNESS_THRESHOLD: f64 = 20.0;

pub const INSUFFICIENT_DATA: &str = "Insufficient data";
pub const NO_STRENGTH: &str = "Balanced profile";
pub const NO_WEAKNESS: &str = "No major weakness";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Classification {
    pub composite_rating: f64,
    pub style: String,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
}

pub fn classify(percentiles: &PercentileResult, record: &PlayerRecord) -> Classification {
    Classification {
        composite_rating: composite_rating(percentiles),
        style: zones::style_label(
            &record.position,
            record.stat_or_zero(Stat::Goals),
            record.stat_or_zero(Stat::Assists),
        )
        .to_string(),
        strengths: strengths(percentiles),
        weaknesses: weaknesses(percentiles),
    }
}

/// Mean percentile, or the neutral 50 when nothing could be ranked.
pub fn composite_rating(percentiles: &PercentileResult) -> f64 {
    if percentiles.is_empty() {
        return NEUTRAL_RATING;
    }
    let sum: f64 = percentiles.iter().map(|(_, v)| v).sum();
    round_dp(sum / percentiles.len() as f64, 1)
}

pub fn strengths(percentiles: &PercentileResult) -> Vec<String> {
    banded(percentiles, |pct| pct >= STRENGTH_THRESHOLD, NO_STRENGTH)
}

pub fn weaknesses(percentiles: &PercentileResult) -> Vec<String> {
    banded(percentiles, |pct| pct <= WEAKNESS_THRESHOLD, NO_WEAKNESS)
}

fn banded(
    percentiles: &PercentileResult,
    in_band: impl Fn(f64) -> bool,
    fallback: &str,
) -> Vec<String> {
    if percentiles.is_empty() {
        return vec![INSUFFICIENT_DATA.to_string()];
    }
    let labels: Vec<String> = percentiles
        .iter()
        .filter(|(_, pct)| in_band(*pct))
        .map(|(stat, _)| stat_label(stat).to_string())
        .collect();
    if labels.is_empty() {
        vec![fallback.to_string()]
    } else {
        labels
    }
}

pub fn stat_label(stat: Stat) -> &'static str {
    match stat {
        Stat::Goals => "Finishing",
        Stat::Assists => "Assists",
        Stat::Xg => "Shot quality",
        Stat::Xag => "Chance creation",
        Stat::ProgressivePasses => "Progressive passing",
        Stat::ProgressiveCarries => "Ball carrying",
        Stat::ProgressiveReceptions => "Advanced receptions",
        Stat::PenaltyGoals => "Penalties",
        Stat::YellowCards => "Yellow cards",
        Stat::RedCards => "Red cards",
        Stat::Npxg => "Non-penalty xG",
        Stat::Shots => "Shooting volume",
        Stat::Tackles => "Tackling",
        Stat::Interceptions => "Interceptions",
    }
}
