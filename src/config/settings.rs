use super::category::Category;
use super::grid::GridSpec;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Statistic list not defined for output '{0}': expected a coverage or resolution category")]
    UnknownCategory(String),
    #[error("At least one source is required")]
    NoSources,
    #[error("Grid variables must differ, both are '{0}'")]
    DuplicateGridVariable(String),
    #[error("Invalid source '{0}': expected TITLE=PATH")]
    InvalidSource(String),
    #[error("Cannot read config {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        err: std::io::Error,
    },
    #[error("Cannot parse config {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        err: serde_json::Error,
    },
}

/// A labeled input: the title is used in the legend, the path locates the
/// source document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSpec {
    pub title: String,
    pub path: PathBuf,
}

impl FromStr for SourceSpec {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('=') {
            Some((title, path)) if !title.trim().is_empty() && !path.trim().is_empty() => Ok(Self {
                title: title.trim().to_string(),
                path: PathBuf::from(path.trim()),
            }),
            _ => Err(ConfigError::InvalidSource(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderOptions {
    #[serde(default = "RenderOptions::default_width")]
    pub width: u32,
    #[serde(default = "RenderOptions::default_height")]
    pub height: u32,
    /// Scale every overlay to unit integral so shapes compare across sources.
    #[serde(default)]
    pub normalize: bool,
}

impl RenderOptions {
    fn default_width() -> u32 {
        1600
    }
    fn default_height() -> u32 {
        1200
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            width: Self::default_width(),
            height: Self::default_height(),
            normalize: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparatorConfig {
    /// The first source is the reference whose graph drives the traversal.
    pub sources: Vec<SourceSpec>,
    pub output: PathBuf,
    #[serde(default)]
    pub category: Option<Category>,
    #[serde(default)]
    pub grid: GridSpec,
    #[serde(default)]
    pub render: RenderOptions,
}

impl ComparatorConfig {
    pub fn new(sources: Vec<SourceSpec>, output: impl Into<PathBuf>) -> Self {
        Self {
            sources,
            output: output.into(),
            category: None,
            grid: GridSpec::default(),
            render: RenderOptions::default(),
        }
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|err| ConfigError::Io { path: path.to_path_buf(), err })?;
        let config: Self =
            serde_json::from_str(&contents).map_err(|err| ConfigError::Parse { path: path.to_path_buf(), err })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sources.is_empty() {
            return Err(ConfigError::NoSources);
        }
        if self.grid.x == self.grid.y {
            return Err(ConfigError::DuplicateGridVariable(self.grid.x.clone()));
        }
        Ok(())
    }

    /// The explicit category, or else one inferred from the output name.
    pub fn resolve_category(&self) -> Result<Category, ConfigError> {
        match self.category {
            Some(category) => Ok(category),
            None => Category::from_destination(&self.output),
        }
    }

    pub fn labels(&self) -> Vec<String> {
        self.sources.iter().map(|s| s.title.clone()).collect()
    }
}
