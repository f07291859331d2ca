//! The output category and its fixed statistic catalog.

use super::settings::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

const COVERAGE_STATISTICS: &[&str] = &[
    "x", "y", "W", "pLab", "pTlab", "etaLab", "phiLab", "z", "pT", "qT", "qTq", "mX", "phiH", "phiS",
    "phiSivers", "phiCollins",
];

const RESOLUTION_STATISTICS: &[&str] = &[
    "x_Res", "y_Res", "pT_Res", "Q2_Res", "Nu_Res", "W_Res", "phiH_Res", "phiS_Res", "z_Res", "mX_Res", "xF_Res",
];

/// What kind of comparison is being produced; selects the statistics drawn
/// for every subgroup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    /// Kinematic coverage distributions.
    Coverage,
    /// Reconstructed-minus-true resolutions.
    Resolution,
}

impl Category {
    pub fn statistics(&self) -> &'static [&'static str] {
        match self {
            Category::Coverage => COVERAGE_STATISTICS,
            Category::Resolution => RESOLUTION_STATISTICS,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Coverage => "coverage",
            Category::Resolution => "resolution",
        }
    }

    /// Infers the category from a destination such as `out/resolution.comparison.json`.
    ///
    /// Only meant for command-line convenience; callers that know the category
    /// should pass it explicitly.
    pub fn from_destination(path: &Path) -> Result<Self, ConfigError> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if name.contains("coverage") {
            Ok(Category::Coverage)
        } else if name.contains("resolution") {
            Ok(Category::Resolution)
        } else {
            Err(ConfigError::UnknownCategory(path.display().to_string()))
        }
    }
}

impl FromStr for Category {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "coverage" => Ok(Category::Coverage),
            "resolution" => Ok(Category::Resolution),
            other => Err(ConfigError::UnknownCategory(other.to_string())),
        }
    }
}
