use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Serialize, Serializer};

/// Counting and advanced statistics carried by a population row, keyed by
/// their FBref column name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Stat {
    Goals,
    Assists,
    PenaltyGoals,
    YellowCards,
    RedCards,
    Xg,
    Npxg,
    Xag,
    ProgressiveCarries,
    ProgressivePasses,
    ProgressiveReceptions,
    Shots,
    Tackles,
    Interceptions,
}

impl Stat {
    pub const ALL: [Stat; 14] = [
        Stat::Goals,
        Stat::Assists,
        Stat::PenaltyGoals,
        Stat::YellowCards,
        Stat::RedCards,
        Stat::Xg,
        Stat::Npxg,
        Stat::Xag,
        Stat::ProgressiveCarries,
        Stat::ProgressivePasses,
        Stat::ProgressiveReceptions,
        Stat::Shots,
        Stat::Tackles,
        Stat::Interceptions,
    ];

    pub fn column(self) -> &'static str {
        match self {
            Stat::Goals => "Gls",
            Stat::Assists => "Ast",
            Stat::PenaltyGoals => "PK",
            Stat::YellowCards => "CrdY",
            Stat::RedCards => "CrdR",
            Stat::Xg => "xG",
            Stat::Npxg => "npxG",
            Stat::Xag => "xAG",
            Stat::ProgressiveCarries => "PrgC",
            Stat::ProgressivePasses => "PrgP",
            Stat::ProgressiveReceptions => "PrgR",
            Stat::Shots => "Sh",
            Stat::Tackles => "Tkl",
            Stat::Interceptions => "Int",
        }
    }

    pub fn from_column(name: &str) -> Option<Stat> {
        let name = name.trim();
        Stat::ALL.into_iter().find(|stat| stat.column() == name)
    }
}

impl Serialize for Stat {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.column())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Position {
    Goalkeeper,
    Defender,
    Midfielder,
    Forward,
}

impl Position {
    pub fn from_code(raw: &str) -> Option<Position> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "GK" | "GOALKEEPER" => Some(Position::Goalkeeper),
            "DF" | "DEFENDER" => Some(Position::Defender),
            "MF" | "MIDFIELDER" => Some(Position::Midfielder),
            "FW" | "FORWARD" => Some(Position::Forward),
            _ => None,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Position::Goalkeeper => "GK",
            Position::Defender => "DF",
            Position::Midfielder => "MF",
            Position::Forward => "FW",
        }
    }
}

/// Raw position code as it appears in the table, e.g. `"FW"` or `"FW,MF"`.
/// Reference populations compare codes verbatim, so the raw text is kept.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct PositionCode(String);

impl PositionCode {
    pub fn new(raw: &str) -> Self {
        Self(raw.trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn positions(&self) -> Vec<Position> {
        self.0
            .split([',', '-', '/', ' '])
            .filter_map(Position::from_code)
            .collect()
    }

    pub fn primary(&self) -> Option<Position> {
        self.positions().into_iter().next()
    }

    pub fn contains(&self, position: Position) -> bool {
        self.positions().contains(&position)
    }
}

/// One row of the population table. Missing statistics are absent from
/// `stats`; playing-time columns default to 0.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlayerRecord {
    pub name: String,
    pub team: String,
    pub position: PositionCode,
    pub age: Option<u32>,
    pub birth_year: Option<u32>,
    pub nationality: String,
    pub league: String,
    pub matches: u32,
    pub starts: u32,
    pub minutes: u32,
    pub stats: BTreeMap<Stat, f64>,
}

impl PlayerRecord {
    pub fn new(name: &str, team: &str, position: &str) -> Self {
        Self {
            name: name.to_string(),
            team: team.to_string(),
            position: PositionCode::new(position),
            ..Default::default()
        }
    }

    pub fn with_stat(mut self, stat: Stat, value: f64) -> Self {
        self.stats.insert(stat, value);
        self
    }

    pub fn with_playing_time(mut self, matches: u32, starts: u32, minutes: u32) -> Self {
        self.matches = matches;
        self.starts = starts;
        self.minutes = minutes;
        self
    }

    pub fn stat(&self, stat: Stat) -> Option<f64> {
        self.stats.get(&stat).copied()
    }

    pub fn stat_or_zero(&self, stat: Stat) -> f64 {
        self.stat(stat).unwrap_or(0.0)
    }
}

/// Immutable table of player records in source row order.
#[derive(Debug, Clone, Default)]
pub struct Population {
    records: Vec<PlayerRecord>,
}

impl Population {
    pub fn new(records: Vec<PlayerRecord>) -> Self {
        Self { records }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[PlayerRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlayerRecord> {
        self.records.iter()
    }
}

pub fn load_population(path: &Path) -> Result<Population> {
    let file = File::open(path)
        .with_context(|| format!("failed to open player table {}", path.display()))?;
    read_population(file).with_context(|| format!("failed to parse {}", path.display()))
}

/// Loads the table, degrading to an empty population when the source is
/// missing or unreadable. Every later lookup then reports not found.
pub fn load_population_or_empty(path: &Path) -> Population {
    match load_population(path) {
        Ok(population) => {
            tracing::info!(rows = population.len(), path = %path.display(), "player table loaded");
            population
        }
        Err(err) => {
            let reason = format!("{err:#}");
            tracing::warn!(error = %reason, "player table unavailable, using empty population");
            Population::empty()
        }
    }
}

pub fn read_population<R: Read>(reader: R) -> Result<Population> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader.headers().context("missing header row")?.clone();
    let columns = ColumnIndex::from_headers(&headers);

    let mut records = Vec::new();
    for (row, result) in reader.records().enumerate() {
        let raw = match result {
            Ok(raw) => raw,
            Err(err) => {
                tracing::warn!(row = row + 2, error = %err, "skipping unreadable row");
                continue;
            }
        };
        if let Some(record) = columns.parse_row(&raw) {
            records.push(record);
        }
    }
    Ok(Population::new(records))
}

struct ColumnIndex {
    by_name: HashMap<String, usize>,
}

impl ColumnIndex {
    fn from_headers(headers: &csv::StringRecord) -> Self {
        let mut by_name = HashMap::new();
        // FBref exports repeat some headers (totals, then per-90); the first wins.
        for (idx, name) in headers.iter().enumerate() {
            by_name.entry(name.trim().to_string()).or_insert(idx);
        }
        Self { by_name }
    }

    fn cell<'r>(&self, row: &'r csv::StringRecord, column: &str) -> Option<&'r str> {
        let idx = *self.by_name.get(column)?;
        row.get(idx).map(str::trim).filter(|s| !s.is_empty())
    }

    fn text(&self, row: &csv::StringRecord, column: &str) -> String {
        self.cell(row, column).unwrap_or_default().to_string()
    }

    fn parse_row(&self, row: &csv::StringRecord) -> Option<PlayerRecord> {
        // Nameless rows stay in the table and still count in reference
        // populations; only repeated header rows are dropped.
        let name = self.cell(row, "Player").unwrap_or_default();
        if name == "Player" {
            return None;
        }

        let mut stats = BTreeMap::new();
        for stat in Stat::ALL {
            if let Some(value) = self.cell(row, stat.column()).and_then(parse_number) {
                stats.insert(stat, value);
            }
        }

        Some(PlayerRecord {
            name: name.to_string(),
            team: self.text(row, "Squad"),
            position: PositionCode::new(&self.text(row, "Pos")),
            age: self.cell(row, "Age").and_then(parse_age),
            birth_year: self.cell(row, "Born").and_then(parse_count),
            nationality: self.text(row, "Nation"),
            league: self.text(row, "Comp"),
            matches: self.cell(row, "MP").and_then(parse_count).unwrap_or(0),
            starts: self.cell(row, "Starts").and_then(parse_count).unwrap_or(0),
            minutes: self.cell(row, "Min").and_then(parse_count).unwrap_or(0),
            stats,
        })
    }
}

fn parse_number(raw: &str) -> Option<f64> {
    let cleaned: String = raw.chars().filter(|c| *c != ',').collect();
    let value = cleaned.trim().parse::<f64>().ok()?;
    (value.is_finite() && value >= 0.0).then_some(value)
}

fn parse_count(raw: &str) -> Option<u32> {
    parse_number(raw).map(|v| v.round() as u32)
}

fn parse_age(raw: &str) -> Option<u32> {
    // "25-123" is years-days.
    raw.split('-').next().and_then(parse_count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_number_handles_thousands_and_blanks() {
        assert_eq!(parse_number("1,234"), Some(1234.0));
        assert_eq!(parse_number("0.45"), Some(0.45));
        assert_eq!(parse_number("n/a"), None);
        assert_eq!(parse_number("-3"), None);
    }

    #[test]
    fn parse_age_takes_years_part() {
        assert_eq!(parse_age("25-123"), Some(25));
        assert_eq!(parse_age("31"), Some(31));
        assert_eq!(parse_age(""), None);
    }

    #[test]
    fn position_code_splits_compound_codes() {
        let code = PositionCode::new("FW,MF");
        assert_eq!(code.primary(), Some(Position::Forward));
        assert!(code.contains(Position::Midfielder));
        assert!(!code.contains(Position::Defender));

        let long = PositionCode::new("forward-midfielder");
        assert_eq!(long.positions(), vec![Position::Forward, Position::Midfielder]);
    }

    #[test]
    fn stat_columns_round_trip() {
        for stat in Stat::ALL {
            assert_eq!(Stat::from_column(stat.column()), Some(stat));
        }
        assert_eq!(Stat::from_column("Rk"), None);
    }

    #[test]
    fn missing_columns_leave_fields_unknown() {
        let csv = "Player,Squad,Pos,Min,Gls\nAlpha,Team A,FW,900,3\nBeta,Team B,DF,,\n";
        let population = read_population(csv.as_bytes()).expect("csv parses");
        assert_eq!(population.len(), 2);
        let beta = &population.records()[1];
        assert_eq!(beta.minutes, 0);
        assert_eq!(beta.stat(Stat::Goals), None);
        assert_eq!(beta.stat(Stat::Xg), None);
        assert_eq!(population.records()[0].stat(Stat::Goals), Some(3.0));
    }

    #[test]
    fn nameless_rows_are_kept_and_header_rows_dropped() {
        let csv = "Player,Pos,Gls\nAlpha,FW,3\n,FW,0\nPlayer,Pos,Gls\n";
        let population = read_population(csv.as_bytes()).expect("csv parses");
        assert_eq!(population.len(), 2);
        assert_eq!(population.records()[1].name, "");
        assert_eq!(population.records()[1].position.as_str(), "FW");
    }

    #[test]
    fn duplicate_headers_keep_first_column() {
        let csv = "Player,Pos,Gls,Gls\nAlpha,FW,10,0.5\n";
        let population = read_population(csv.as_bytes()).expect("csv parses");
        assert_eq!(population.records()[0].stat(Stat::Goals), Some(10.0));
    }
}
