//! Industry codes, threshold profiles and industry detection
//!
//! Every analysis runs against one [`IndustryProfile`]. Six industries carry
//! their own tuned profile; the remaining codes borrow the software profile.

mod detect;
mod profiles;

pub use detect::{detect_industry, is_financial};
pub use profiles::{FundamentalRules, IndustryProfile, ThresholdTiers, profile};

use crate::error::ResearchError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Industry classification used to select scoring rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Industry {
    Software,
    Energy,
    Financial,
    Healthcare,
    Industrial,
    ConsumerStaples,
    ConsumerDiscretionary,
    Communication,
    Utilities,
    RealEstate,
    Materials,
}

impl Industry {
    /// All industry codes in display order
    pub fn all() -> &'static [Industry] {
        &[
            Industry::Software,
            Industry::Energy,
            Industry::Financial,
            Industry::Healthcare,
            Industry::Industrial,
            Industry::ConsumerStaples,
            Industry::ConsumerDiscretionary,
            Industry::Communication,
            Industry::Utilities,
            Industry::RealEstate,
            Industry::Materials,
        ]
    }

    /// Stable snake_case code, used in file names and on the CLI
    pub fn code(self) -> &'static str {
        match self {
            Industry::Software => "software",
            Industry::Energy => "energy",
            Industry::Financial => "financial",
            Industry::Healthcare => "healthcare",
            Industry::Industrial => "industrial",
            Industry::ConsumerStaples => "consumer_staples",
            Industry::ConsumerDiscretionary => "consumer_discretionary",
            Industry::Communication => "communication",
            Industry::Utilities => "utilities",
            Industry::RealEstate => "real_estate",
            Industry::Materials => "materials",
        }
    }

    /// Human-readable name
    pub fn display_name(self) -> &'static str {
        match self {
            Industry::Software => "Software / Technology",
            Industry::Energy => "Energy",
            Industry::Financial => "Financials",
            Industry::Healthcare => "Healthcare",
            Industry::Industrial => "Industrials",
            Industry::ConsumerStaples => "Consumer Staples",
            Industry::ConsumerDiscretionary => "Consumer Discretionary",
            Industry::Communication => "Communication Services",
            Industry::Utilities => "Utilities",
            Industry::RealEstate => "Real Estate",
            Industry::Materials => "Materials",
        }
    }

    /// Whether this industry has its own tuned profile
    pub fn has_dedicated_profile(self) -> bool {
        matches!(
            self,
            Industry::Software
                | Industry::Energy
                | Industry::Financial
                | Industry::Healthcare
                | Industry::Industrial
                | Industry::ConsumerStaples
        )
    }
}

impl fmt::Display for Industry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Industry {
    type Err = ResearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace(['-', ' '], "_");
        Industry::all()
            .iter()
            .copied()
            .find(|industry| industry.code() == wanted)
            .ok_or_else(|| {
                ResearchError::ConfigError(format!(
                    "Unknown industry '{s}'. Expected one of: {}",
                    Industry::all()
                        .iter()
                        .map(|i| i.code())
                        .collect::<Vec<_>>()
                        .join(", ")
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_round_trip() {
        for industry in Industry::all() {
            assert_eq!(industry.code().parse::<Industry>().unwrap(), *industry);
        }
        assert_eq!(Industry::all().len(), 11);
    }

    #[test]
    fn test_parse_is_lenient_on_separators() {
        assert_eq!(
            "Consumer-Staples".parse::<Industry>().unwrap(),
            Industry::ConsumerStaples
        );
        assert_eq!("real estate".parse::<Industry>().unwrap(), Industry::RealEstate);
        assert!("crypto".parse::<Industry>().is_err());
    }

    #[test]
    fn test_serde_uses_codes() {
        let json = serde_json::to_string(&Industry::ConsumerDiscretionary).unwrap();
        assert_eq!(json, "\"consumer_discretionary\"");
    }
}
