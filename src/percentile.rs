use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::population::{PlayerRecord, Population, Stat};

/// Below this many same-position rows the whole table is used instead.
pub const MIN_REFERENCE_SIZE: usize = 5;

/// Statistics ranked in a profile, in evaluation order.
pub const PROFILE_STATS: [Stat; 7] = [
    Stat::Goals,
    Stat::Assists,
    Stat::Xg,
    Stat::Xag,
    Stat::ProgressivePasses,
    Stat::ProgressiveCarries,
    Stat::ProgressiveReceptions,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceScope {
    SamePosition,
    FullPopulation,
}

#[derive(Debug, Clone)]
pub struct ReferencePopulation<'a> {
    rows: Vec<&'a PlayerRecord>,
    scope: ReferenceScope,
}

impl<'a> ReferencePopulation<'a> {
    /// Rows sharing the target's exact position code, or the full table
    /// (target included) when fewer than [`MIN_REFERENCE_SIZE`] share it.
    pub fn select(population: &'a Population, target: &PlayerRecord) -> Self {
        let code = target.position.as_str();
        let same: Vec<&PlayerRecord> = population
            .iter()
            .filter(|r| r.position.as_str() == code)
            .collect();
        if same.len() >= MIN_REFERENCE_SIZE {
            return Self {
                rows: same,
                scope: ReferenceScope::SamePosition,
            };
        }
        Self::full(population)
    }

    pub fn full(population: &'a Population) -> Self {
        Self {
            rows: population.iter().collect(),
            scope: ReferenceScope::FullPopulation,
        }
    }

    pub fn scope(&self) -> ReferenceScope {
        self.scope
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Percentile of `value` for `stat`: share of rows strictly below it.
    /// Unknown population values compare as 0.
    pub fn percentile_of(&self, stat: Stat, value: f64) -> Option<f64> {
        if self.rows.is_empty() {
            return None;
        }
        let below = self
            .rows
            .iter()
            .filter(|r| r.stat_or_zero(stat) < value)
            .count();
        let pct = below as f64 / self.rows.len() as f64 * 100.0;
        Some(round_dp(pct, 1))
    }
}

/// Ordered statistic -> percentile mapping. Statistics the target lacks have
/// no entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PercentileResult {
    entries: Vec<(Stat, f64)>,
}

impl PercentileResult {
    pub fn from_entries(entries: Vec<(Stat, f64)>) -> Self {
        Self { entries }
    }

    pub fn get(&self, stat: Stat) -> Option<f64> {
        self.entries
            .iter()
            .find(|(s, _)| *s == stat)
            .map(|(_, v)| *v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Stat, f64)> + '_ {
        self.entries.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for PercentileResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (stat, value) in &self.entries {
            map.serialize_entry(stat.column(), value)?;
        }
        map.end()
    }
}

pub fn percentile_rank(
    target: &PlayerRecord,
    stats: &[Stat],
    reference: &ReferencePopulation<'_>,
) -> PercentileResult {
    let entries = stats
        .iter()
        .filter_map(|&stat| {
            let value = target.stat(stat)?;
            reference.percentile_of(stat, value).map(|pct| (stat, pct))
        })
        .collect();
    PercentileResult { entries }
}

pub fn round_dp(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
