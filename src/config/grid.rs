//! The two variables that span the comparison grid, and how they are displayed.

use serde::{Deserialize, Serialize};

/// Names of the grid variables: `x` runs across the panel columns, `y` up the rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSpec {
    #[serde(default = "GridSpec::default_x")]
    pub x: String,
    #[serde(default = "GridSpec::default_y")]
    pub y: String,
}

impl GridSpec {
    fn default_x() -> String {
        "x".to_string()
    }
    fn default_y() -> String {
        "q2".to_string()
    }
}

impl Default for GridSpec {
    fn default() -> Self {
        Self { x: Self::default_x(), y: Self::default_y() }
    }
}

/// Display title and scale of a grid variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridAxisStyle {
    pub title: String,
    pub log_scale: bool,
}

impl GridAxisStyle {
    /// Known kinematic variables get a proper title and scale; anything else
    /// is shown by its key on a linear scale.
    pub fn for_variable(key: &str) -> Self {
        let (title, log_scale) = match key {
            "x" => ("x", true),
            "q2" => ("Q²", true),
            "eta" => ("η", false),
            "p" => ("p", true),
            other => (other, false),
        };
        Self { title: title.to_string(), log_scale }
    }
}
