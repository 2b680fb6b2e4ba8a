//! Season classification.
//!
//! Two variants exist in the workflow and both are intentional: pollutant
//! aggregation uses whole-month blocks, while the meteorology summaries cut
//! on the solstice/equinox calendar dates.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// A season of the year, ordered Winter → Spring → Summer → Autumn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Autumn,
}

impl Season {
    /// All seasons in display order.
    pub const ORDER: [Season; 4] = [
        Season::Winter,
        Season::Spring,
        Season::Summer,
        Season::Autumn,
    ];

    /// Month-block classification: JFM, AMJ, JAS, OND.
    pub fn from_month(month: u32) -> Self {
        match month {
            1..=3 => Season::Winter,
            4..=6 => Season::Spring,
            7..=9 => Season::Summer,
            _ => Season::Autumn,
        }
    }

    /// Calendar-date classification used by the meteorology summaries:
    /// Winter Jan 1 – Mar 20, Spring Mar 21 – Jun 20, Summer Jun 21 – Sep 22,
    /// Autumn Sep 23 – Dec 20. Dates after Dec 20 wrap into Winter.
    pub fn from_date(date: NaiveDate) -> Self {
        let md = (date.month(), date.day());
        if md <= (3, 20) {
            Season::Winter
        } else if md <= (6, 20) {
            Season::Spring
        } else if md <= (9, 22) {
            Season::Summer
        } else if md <= (12, 20) {
            Season::Autumn
        } else {
            Season::Winter
        }
    }

    /// Position in display order.
    pub fn index(&self) -> usize {
        match self {
            Season::Winter => 0,
            Season::Spring => 1,
            Season::Summer => 2,
            Season::Autumn => 3,
        }
    }

    /// Display label.
    pub fn label(&self) -> &'static str {
        match self {
            Season::Winter => "Winter",
            Season::Spring => "Spring",
            Season::Summer => "Summer",
            Season::Autumn => "Autumn",
        }
    }
}

impl std::fmt::Display for Season {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for Season {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "winter" => Ok(Season::Winter),
            "spring" => Ok(Season::Spring),
            "summer" => Ok(Season::Summer),
            "autumn" | "fall" => Ok(Season::Autumn),
            other => Err(format!("unknown season: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_blocks() {
        assert_eq!(Season::from_month(1), Season::Winter);
        assert_eq!(Season::from_month(3), Season::Winter);
        assert_eq!(Season::from_month(4), Season::Spring);
        assert_eq!(Season::from_month(9), Season::Summer);
        assert_eq!(Season::from_month(12), Season::Autumn);
    }

    #[test]
    fn test_calendar_boundaries() {
        let d = |m, day| NaiveDate::from_ymd_opt(2021, m, day).unwrap();
        assert_eq!(Season::from_date(d(3, 20)), Season::Winter);
        assert_eq!(Season::from_date(d(3, 21)), Season::Spring);
        assert_eq!(Season::from_date(d(9, 22)), Season::Summer);
        assert_eq!(Season::from_date(d(9, 23)), Season::Autumn);
        assert_eq!(Season::from_date(d(12, 21)), Season::Winter);
    }

    #[test]
    fn test_parse() {
        assert_eq!("Autumn".parse::<Season>().unwrap(), Season::Autumn);
        assert_eq!("fall".parse::<Season>().unwrap(), Season::Autumn);
        assert!("monsoon".parse::<Season>().is_err());
    }
}
