use serde::Serialize;

use crate::per90::{Per90Block, per90_block};
use crate::percentile::{
    PROFILE_STATS, PercentileResult, ReferencePopulation, ReferenceScope, percentile_rank,
    round_dp,
};
use crate::performance::{PerformanceSummary, summarize};
use crate::population::{PlayerRecord, Population, Stat};
use crate::rating::{Classification, classify};
use crate::zones::{ActivityZones, activity_zones};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersonalInfo {
    pub name: String,
    pub age: Option<u32>,
    pub nationality: String,
    pub position: String,
    pub team: String,
    pub league: String,
    pub birth_year: Option<u32>,
}

impl PersonalInfo {
    pub fn of(record: &PlayerRecord) -> Self {
        Self {
            name: record.name.clone(),
            age: record.age,
            nationality: record.nationality.clone(),
            position: record.position.as_str().to_string(),
            team: record.team.clone(),
            league: record.league.clone(),
            birth_year: record.birth_year,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BaseStats {
    pub matches: u32,
    pub starts: u32,
    pub minutes: u32,
    pub goals: u32,
    pub assists: u32,
    pub yellow_cards: u32,
    pub red_cards: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdvancedStats {
    pub xg: f64,
    pub xa: f64,
    pub npxg: f64,
    pub progressive_passes: u32,
    pub progressive_carries: u32,
    pub progressive_receptions: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReferenceInfo {
    pub scope: ReferenceScope,
    pub size: usize,
}

impl ReferenceInfo {
    pub fn of(reference: &ReferencePopulation<'_>) -> Self {
        Self {
            scope: reference.scope(),
            size: reference.len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerProfile {
    pub personal_info: PersonalInfo,
    pub base_stats: BaseStats,
    pub advanced_stats: AdvancedStats,
    pub per_90: Per90Block,
    pub performance: PerformanceSummary,
    pub percentiles: PercentileResult,
    pub reference: ReferenceInfo,
    pub composite_rating: f64,
    pub style: String,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub activity_zones: ActivityZones,
}

pub struct ProfileParts {
    pub percentiles: PercentileResult,
    pub reference: ReferenceInfo,
    pub per_90: Per90Block,
    pub classification: Classification,
    pub performance: PerformanceSummary,
    pub zones: ActivityZones,
}

/// Pure composition of already-derived parts.
pub fn assemble(record: &PlayerRecord, parts: ProfileParts) -> PlayerProfile {
    let ProfileParts {
        percentiles,
        reference,
        per_90,
        classification,
        performance,
        zones,
    } = parts;
    PlayerProfile {
        personal_info: PersonalInfo::of(record),
        base_stats: base_stats(record),
        advanced_stats: advanced_stats(record),
        per_90,
        performance,
        percentiles,
        reference,
        composite_rating: classification.composite_rating,
        style: classification.style,
        strengths: classification.strengths,
        weaknesses: classification.weaknesses,
        activity_zones: zones,
    }
}

/// Full pipeline for one record against a population. The record does not
/// have to belong to the population.
pub fn build_profile(population: &Population, record: &PlayerRecord) -> PlayerProfile {
    let reference = ReferencePopulation::select(population, record);
    let percentiles = percentile_rank(record, &PROFILE_STATS, &reference);
    let classification = classify(&percentiles, record);
    let parts = ProfileParts {
        reference: ReferenceInfo::of(&reference),
        per_90: per90_block(record),
        performance: summarize(record),
        zones: activity_zones(&record.position),
        percentiles,
        classification,
    };
    assemble(record, parts)
}

fn base_stats(record: &PlayerRecord) -> BaseStats {
    BaseStats {
        matches: record.matches,
        starts: record.starts,
        minutes: record.minutes,
        goals: count(record, Stat::Goals),
        assists: count(record, Stat::Assists),
        yellow_cards: count(record, Stat::YellowCards),
        red_cards: count(record, Stat::RedCards),
    }
}

fn advanced_stats(record: &PlayerRecord) -> AdvancedStats {
    AdvancedStats {
        xg: round_dp(record.stat_or_zero(Stat::Xg), 2),
        xa: round_dp(record.stat_or_zero(Stat::Xag), 2),
        npxg: round_dp(record.stat_or_zero(Stat::Npxg), 2),
        progressive_passes: count(record, Stat::ProgressivePasses),
        progressive_carries: count(record, Stat::ProgressiveCarries),
        progressive_receptions: count(record, Stat::ProgressiveReceptions),
    }
}

fn count(record: &PlayerRecord, stat: Stat) -> u32 {
    record.stat_or_zero(stat).round() as u32
}
