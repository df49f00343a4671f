use serde::Serialize;

use crate::percentile::round_dp;
use crate::population::{PlayerRecord, Stat};

pub const INSUFFICIENT_PLAYING_TIME: &str = "Not enough playing time to analyse";

/// `value` scaled to a 90-minute basis, rounded to 2 decimals. `None` when
/// there is no playing time to scale by; an unknown value counts as 0.
pub fn per90(value: Option<f64>, minutes: u32) -> Option<f64> {
    if minutes == 0 {
        return None;
    }
    let factor = 90.0 / minutes as f64;
    Some(round_dp(value.unwrap_or(0.0) * factor, 2))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Per90Rates {
    pub goals_per_90: f64,
    pub assists_per_90: f64,
    pub xg_per_90: f64,
    pub xa_per_90: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsufficientData {
    pub insufficient_data: bool,
    pub message: String,
}

impl Default for InsufficientData {
    fn default() -> Self {
        Self {
            insufficient_data: true,
            message: INSUFFICIENT_PLAYING_TIME.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Per90Block {
    Rates(Per90Rates),
    Insufficient(InsufficientData),
}

impl Per90Block {
    pub fn rates(&self) -> Option<&Per90Rates> {
        match self {
            Per90Block::Rates(rates) => Some(rates),
            Per90Block::Insufficient(_) => None,
        }
    }

    pub fn is_insufficient(&self) -> bool {
        matches!(self, Per90Block::Insufficient(_))
    }
}

/// Whole-block normalisation: zero minutes marks the block, not each stat.
pub fn per90_block(record: &PlayerRecord) -> Per90Block {
    let minutes = record.minutes;
    let rate = |stat: Stat| per90(record.stat(stat), minutes);
    match (
        rate(Stat::Goals),
        rate(Stat::Assists),
        rate(Stat::Xg),
        rate(Stat::Xag),
    ) {
        (Some(goals_per_90), Some(assists_per_90), Some(xg_per_90), Some(xa_per_90)) => {
            Per90Block::Rates(Per90Rates {
                goals_per_90,
                assists_per_90,
                xg_per_90,
                xa_per_90,
            })
        }
        _ => Per90Block::Insufficient(InsufficientData::default()),
    }
}
