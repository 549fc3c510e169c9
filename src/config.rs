//! Configuration file parser for reconstruction runs.
//!
//! Every field is optional. Values given on the command line take precedence.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::detector::Detector;
use crate::error::{Error, Result};
use crate::partition::Partitioning;

#[derive(Deserialize, Debug, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {

    #[serde(default)]
    pub detector: Detector,

    #[serde(default)]
    pub run: Run,
}

#[derive(Deserialize, Debug, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct Run {

    /// Worker threads per member of the group
    pub threads: Option<usize>,

    /// Number of consecutive Z slices in each parallel task
    pub slices_per_task: usize,

    pub partition: Partitioning,
}

impl Default for Run {
    fn default() -> Self {
        Self { threads: None, slices_per_task: 1, partition: Partitioning::default() }
    }
}

pub fn read_config_file(path: &Path) -> Result<Config> {
    let config: String = fs::read_to_string(path)
        .map_err(|source| Error::Read { path: path.to_path_buf(), source })?;
    toml::from_str(&config)
        .map_err(|source| Error::ConfigFile { path: path.to_path_buf(), source })
}
