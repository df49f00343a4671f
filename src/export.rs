use std::path::Path;

use anyhow::{Context, Result};
use rayon::prelude::*;
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::per90::Per90Block;
use crate::percentile::{PROFILE_STATS, ReferenceScope};
use crate::population::Population;
use crate::profile::{PlayerProfile, build_profile};
use crate::rating::stat_label;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReport {
    pub players: usize,
    pub percentile_rows: usize,
    pub per90_rows: usize,
    pub insufficient_playing_time: usize,
}

pub struct ExportProgress {
    pub current: usize,
    pub total: usize,
    pub message: String,
}

/// Sheet contents, header row first.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportSheets {
    pub profiles: Vec<Vec<String>>,
    pub percentiles: Vec<Vec<String>>,
    pub per90: Vec<Vec<String>>,
}

pub fn export_population(population: &Population, path: &Path) -> Result<ExportReport> {
    export_population_with_progress(population, path, |progress| {
        tracing::info!(
            current = progress.current,
            total = progress.total,
            "{}",
            progress.message
        );
    })
}

pub fn export_population_with_progress(
    population: &Population,
    path: &Path,
    mut on_progress: impl FnMut(ExportProgress),
) -> Result<ExportReport> {
    let total = population.len();
    on_progress(ExportProgress {
        current: 0,
        total,
        message: "Building profiles".to_string(),
    });

    let profiles: Vec<PlayerProfile> = population
        .records()
        .par_iter()
        .map(|record| build_profile(population, record))
        .collect();

    on_progress(ExportProgress {
        current: total,
        total,
        message: "Writing workbook".to_string(),
    });

    let sheets = sheet_rows(&profiles);
    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Profiles")?;
        write_rows(sheet, &sheets.profiles)?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Percentiles")?;
        write_rows(sheet, &sheets.percentiles)?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Per90")?;
        write_rows(sheet, &sheets.per90)?;
    }

    workbook
        .save(path)
        .with_context(|| format!("failed writing workbook to {}", path.display()))?;

    on_progress(ExportProgress {
        current: total,
        total,
        message: format!("Saved {}", path.display()),
    });

    Ok(ExportReport {
        players: profiles.len(),
        percentile_rows: sheets.percentiles.len().saturating_sub(1),
        per90_rows: sheets.per90.len().saturating_sub(1),
        insufficient_playing_time: profiles
            .iter()
            .filter(|p| p.per_90.is_insufficient())
            .count(),
    })
}

pub fn sheet_rows(profiles: &[PlayerProfile]) -> ExportSheets {
    let mut profile_rows = vec![
        [
            "Player",
            "Team",
            "Position",
            "Age",
            "Minutes",
            "Goals",
            "Assists",
            "xG",
            "xA",
            "Rating",
            "Style",
            "Strengths",
            "Weaknesses",
            "Reference",
            "Reference Size",
        ]
        .map(String::from)
        .to_vec(),
    ];
    let mut percentile_rows = vec![
        ["Player", "Team", "Stat", "Label", "Percentile"]
            .map(String::from)
            .to_vec(),
    ];
    let mut per90_rows = vec![
        ["Player", "Team", "Goals/90", "Assists/90", "xG/90", "xA/90", "Note"]
            .map(String::from)
            .to_vec(),
    ];

    for profile in profiles {
        profile_rows.push(profile_row(profile));
        let info = &profile.personal_info;
        for stat in PROFILE_STATS {
            if let Some(value) = profile.percentiles.get(stat) {
                percentile_rows.push(vec![
                    info.name.clone(),
                    info.team.clone(),
                    stat.column().to_string(),
                    stat_label(stat).to_string(),
                    format!("{value:.1}"),
                ]);
            }
        }
        per90_rows.push(per90_row(profile));
    }

    ExportSheets {
        profiles: profile_rows,
        percentiles: percentile_rows,
        per90: per90_rows,
    }
}

fn profile_row(profile: &PlayerProfile) -> Vec<String> {
    let info = &profile.personal_info;
    vec![
        info.name.clone(),
        info.team.clone(),
        info.position.clone(),
        info.age.map(|a| a.to_string()).unwrap_or_default(),
        profile.base_stats.minutes.to_string(),
        profile.base_stats.goals.to_string(),
        profile.base_stats.assists.to_string(),
        format!("{:.2}", profile.advanced_stats.xg),
        format!("{:.2}", profile.advanced_stats.xa),
        format!("{:.1}", profile.composite_rating),
        profile.style.clone(),
        profile.strengths.join(", "),
        profile.weaknesses.join(", "),
        match profile.reference.scope {
            ReferenceScope::SamePosition => "position".to_string(),
            ReferenceScope::FullPopulation => "all".to_string(),
        },
        profile.reference.size.to_string(),
    ]
}

fn per90_row(profile: &PlayerProfile) -> Vec<String> {
    let info = &profile.personal_info;
    let mut row = vec![info.name.clone(), info.team.clone()];
    match &profile.per_90 {
        Per90Block::Rates(rates) => {
            row.extend(
                [
                    rates.goals_per_90,
                    rates.assists_per_90,
                    rates.xg_per_90,
                    rates.xa_per_90,
                ]
                .iter()
                .map(|v| format!("{v:.2}")),
            );
            row.push(String::new());
        }
        Per90Block::Insufficient(marker) => {
            row.extend(std::iter::repeat_n(String::new(), 4));
            row.push(marker.message.clone());
        }
    }
    row
}

fn write_rows(worksheet: &mut Worksheet, rows: &[Vec<String>]) -> Result<()> {
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, value) in row.iter().enumerate() {
            worksheet
                .write_string(row_idx as u32, col_idx as u16, value)
                .with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
        }
    }
    Ok(())
}
