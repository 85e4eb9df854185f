use crate::{
    normalize::OffsetTable,
    pm_error::PmError,
    region::RegionOptions,
    skeleton::{JointMapping, Layout, BODY_LEN, HAND_LEN},
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Everything that tunes a run. Fields missing from a configuration file
/// keep their defaults.
///
/// ```yaml
/// region:
///   seed_radius: 0.08
///   face_policy: all
/// offsets:
///   base: [0.0, 0.0, 0.0]
/// mapping:
///   0: 0
///   1: [5, 6]
///   3: -1
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub region: RegionOptions,
    pub offsets: OffsetTable,
    pub layout: Layout,
    /// Canonical joint table over the concatenated body and hand sources
    pub mapping: JointMapping,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            region: RegionOptions::default(),
            offsets: OffsetTable::default(),
            layout: Layout::default(),
            mapping: JointMapping::stick_figure(BODY_LEN, 2 * HAND_LEN),
        }
    }
}

impl Config {
    /// # Errors
    /// May return `PmError::SerdeYamlError`
    pub fn from_yaml_str(text: &str) -> Result<Self, PmError> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// # Errors
    /// May return `PmError` if the file can't be read or parsed
    pub fn load(path: &Path) -> Result<Self, PmError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    /// # Errors
    /// May return `PmError::SerdeYamlError`
    pub fn to_yaml_string(&self) -> Result<String, PmError> {
        Ok(serde_yaml::to_string(self)?)
    }
}
