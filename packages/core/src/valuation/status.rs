//! MVRV status bands

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MvrvStatus {
    Euphoria,
    Overheated,
    ModeratelyOvervalued,
    FairlyValued,
    ModeratelyValued,
    Undervalued,
    HeavilyUndervalued,
}

/// Serialisable status block attached to every valuation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusInfo {
    pub level: MvrvStatus,
    pub label: String,
    pub color: String,
    pub summary: String,
}

impl MvrvStatus {
    /// Lower bounds are inclusive.
    pub fn from_ratio(mvrv: f64) -> Self {
        match mvrv {
            r if r >= 3.5 => MvrvStatus::Euphoria,
            r if r >= 2.0 => MvrvStatus::Overheated,
            r if r >= 1.5 => MvrvStatus::ModeratelyOvervalued,
            r if r >= 1.2 => MvrvStatus::FairlyValued,
            r if r >= 1.0 => MvrvStatus::ModeratelyValued,
            r if r >= 0.8 => MvrvStatus::Undervalued,
            _ => MvrvStatus::HeavilyUndervalued,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MvrvStatus::Euphoria => "EUPHORIA - Major Sell Signal",
            MvrvStatus::Overheated => "OVERHEATED - Profit Taking Risk",
            MvrvStatus::ModeratelyOvervalued => "MODERATELY OVERVALUED - Caution Zone",
            MvrvStatus::FairlyValued => "FAIRLY VALUED - Bull Market",
            MvrvStatus::ModeratelyValued => "MODERATELY VALUED - Normal",
            MvrvStatus::Undervalued => "UNDERVALUED - Opportunity",
            MvrvStatus::HeavilyUndervalued => "HEAVILY UNDERVALUED - Capitulation/Bottom",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            MvrvStatus::Euphoria => "#8B0000",
            MvrvStatus::Overheated => "#FF4500",
            MvrvStatus::ModeratelyOvervalued => "#FFA500",
            MvrvStatus::FairlyValued => "#FFD700",
            MvrvStatus::ModeratelyValued => "#90EE90",
            MvrvStatus::Undervalued => "#00AA00",
            MvrvStatus::HeavilyUndervalued => "#006400",
        }
    }
}

/// Three-tier reading of the ratio. Boundaries are exclusive, unlike the bands.
pub fn summary(mvrv: f64) -> &'static str {
    if mvrv > 2.0 {
        "The market is showing signs of overheating. Historical data suggests this could be a good time to consider taking profits."
    } else if mvrv > 1.0 {
        "The market is in a healthy range. Price is above average cost basis, indicating profits for most holders."
    } else {
        "The market appears undervalued. Historical data suggests this could be an accumulation opportunity."
    }
}

impl StatusInfo {
    pub fn for_ratio(mvrv: f64) -> Self {
        let level = MvrvStatus::from_ratio(mvrv);
        Self {
            level,
            label: level.label().to_string(),
            color: level.color().to_string(),
            summary: summary(mvrv).to_string(),
        }
    }
}
