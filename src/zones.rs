//! Position-keyed decision tables: activity zones, style labels, defensive
//! contribution and heatmap layouts. Kept apart from the statistics engine
//! so each table can be audited on its own.

use std::ops::Range;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::percentile::round_dp;
use crate::population::{Position, PositionCode};

pub const HEATMAP_SIZE: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ActivityZones {
    pub defence: u8,
    pub defensive_midfield: u8,
    pub central_midfield: u8,
    pub attacking_midfield: u8,
    pub attack: u8,
}

impl ActivityZones {
    const fn new(defence: u8, dm: u8, cm: u8, am: u8, attack: u8) -> Self {
        Self {
            defence,
            defensive_midfield: dm,
            central_midfield: cm,
            attacking_midfield: am,
            attack,
        }
    }

    pub fn total(&self) -> u32 {
        [
            self.defence,
            self.defensive_midfield,
            self.central_midfield,
            self.attacking_midfield,
            self.attack,
        ]
        .iter()
        .map(|v| *v as u32)
        .sum()
    }
}

const BALANCED_ZONES: ActivityZones = ActivityZones::new(20, 15, 30, 25, 10);

const ZONE_TABLE: [(Position, ActivityZones); 3] = [
    (Position::Defender, ActivityZones::new(50, 30, 15, 5, 0)),
    (Position::Midfielder, ActivityZones::new(15, 25, 35, 20, 5)),
    (Position::Forward, ActivityZones::new(5, 10, 20, 35, 30)),
];

/// Outfield key for a (possibly compound) code. A defender tag outranks a
/// midfield tag, which outranks a forward tag.
pub fn zone_key(code: &PositionCode) -> Option<Position> {
    ZONE_TABLE
        .iter()
        .map(|(pos, _)| *pos)
        .find(|pos| code.contains(*pos))
}

pub fn activity_zones(code: &PositionCode) -> ActivityZones {
    zone_key(code)
        .and_then(|key| ZONE_TABLE.iter().find(|(pos, _)| *pos == key))
        .map(|(_, zones)| *zones)
        .unwrap_or(BALANCED_ZONES)
}

pub const FINISHER: &str = "Finisher";
pub const CREATOR: &str = "Creator";
pub const COMPLETE_FORWARD: &str = "Complete forward";
pub const VERSATILE_PLAYER: &str = "Versatile player";

pub fn base_style(position: Position) -> &'static str {
    match position {
        Position::Goalkeeper => "Shot-stopper",
        Position::Defender => "Solid defender",
        Position::Midfielder => "Versatile midfielder",
        Position::Forward => "Efficient forward",
    }
}

pub fn forward_style(goals: f64, assists: f64) -> &'static str {
    if goals > assists * 2.0 {
        FINISHER
    } else if assists > goals {
        CREATOR
    } else {
        COMPLETE_FORWARD
    }
}

/// Any code carrying a forward tag is refined by goals vs assists; other
/// codes take the base label of their first tag.
pub fn style_label(code: &PositionCode, goals: f64, assists: f64) -> &'static str {
    if code.contains(Position::Forward) {
        return forward_style(goals, assists);
    }
    code.primary().map(base_style).unwrap_or(VERSATILE_PLAYER)
}

pub fn defensive_contribution(code: &PositionCode) -> u8 {
    match zone_key(code) {
        Some(Position::Defender) => 85,
        Some(Position::Midfielder) => 60,
        _ => 30,
    }
}

struct HeatBlock {
    rows: Range<usize>,
    cols: Range<usize>,
    low: f64,
    high: f64,
}

const fn block(rows: Range<usize>, cols: Range<usize>, low: f64, high: f64) -> HeatBlock {
    HeatBlock {
        rows,
        cols,
        low,
        high,
    }
}

// Row 0 is the opponent's goal line, row 9 the player's own.
const GOALKEEPER_HEAT: &[HeatBlock] = &[block(8..10, 3..7, 0.7, 1.0), block(6..8, 4..6, 0.2, 0.4)];
const DEFENDER_HEAT: &[HeatBlock] = &[block(7..10, 3..7, 0.7, 1.0), block(5..7, 4..6, 0.3, 0.6)];
const MIDFIELDER_HEAT: &[HeatBlock] = &[
    block(4..8, 3..7, 0.6, 1.0),
    block(2..4, 4..6, 0.3, 0.5),
    block(8..10, 4..6, 0.3, 0.5),
];
const FORWARD_HEAT: &[HeatBlock] = &[block(0..4, 3..7, 0.7, 1.0), block(4..6, 4..6, 0.4, 0.6)];

fn heat_blocks(code: &PositionCode) -> &'static [HeatBlock] {
    let key = zone_key(code).or_else(|| {
        code.contains(Position::Goalkeeper)
            .then_some(Position::Goalkeeper)
    });
    match key {
        Some(Position::Goalkeeper) => GOALKEEPER_HEAT,
        Some(Position::Defender) => DEFENDER_HEAT,
        Some(Position::Midfielder) => MIDFIELDER_HEAT,
        Some(Position::Forward) => FORWARD_HEAT,
        None => &[],
    }
}

/// 10x10 intensity grid for the position. The same seed always yields the
/// same grid.
pub fn activity_heatmap(code: &PositionCode, seed: u64) -> Vec<Vec<f64>> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut grid = vec![vec![0.0; HEATMAP_SIZE]; HEATMAP_SIZE];
    for heat in heat_blocks(code) {
        for row in heat.rows.clone() {
            for col in heat.cols.clone() {
                grid[row][col] = round_dp(rng.gen_range(heat.low..heat.high), 2);
            }
        }
    }
    grid
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_zone_table_sums_to_one_hundred() {
        assert_eq!(BALANCED_ZONES.total(), 100);
        for (_, zones) in ZONE_TABLE {
            assert_eq!(zones.total(), 100);
        }
    }

    #[test]
    fn defender_tag_outranks_forward_tag() {
        let code = PositionCode::new("FW,DF");
        assert_eq!(zone_key(&code), Some(Position::Defender));
        assert_eq!(activity_zones(&code).defence, 50);
    }

    #[test]
    fn goalkeepers_use_balanced_zones() {
        assert_eq!(activity_zones(&PositionCode::new("GK")), BALANCED_ZONES);
        assert_eq!(activity_zones(&PositionCode::new("")), BALANCED_ZONES);
    }

    #[test]
    fn forward_refinement_table() {
        assert_eq!(forward_style(10.0, 4.0), FINISHER);
        assert_eq!(forward_style(3.0, 5.0), CREATOR);
        assert_eq!(forward_style(8.0, 4.0), COMPLETE_FORWARD);
        assert_eq!(forward_style(0.0, 0.0), COMPLETE_FORWARD);
    }

    #[test]
    fn style_uses_forward_tag_anywhere_in_code() {
        assert_eq!(style_label(&PositionCode::new("MF,FW"), 10.0, 1.0), FINISHER);
        assert_eq!(style_label(&PositionCode::new("MF"), 10.0, 1.0), "Versatile midfielder");
        assert_eq!(style_label(&PositionCode::new("DF,MF"), 0.0, 0.0), "Solid defender");
        assert_eq!(style_label(&PositionCode::new("??"), 0.0, 0.0), VERSATILE_PLAYER);
    }

    #[test]
    fn heatmap_is_reproducible_and_bounded() {
        let code = PositionCode::new("FW");
        let a = activity_heatmap(&code, 42);
        let b = activity_heatmap(&code, 42);
        assert_eq!(a, b);
        assert_eq!(a.len(), HEATMAP_SIZE);
        assert!(a[0][3] >= 0.7 && a[0][3] <= 1.0);
        assert_eq!(a[9][0], 0.0);
    }

    #[test]
    fn unknown_position_heatmap_is_empty() {
        let grid = activity_heatmap(&PositionCode::new(""), 7);
        assert!(grid.iter().flatten().all(|v| *v == 0.0));
    }
}
