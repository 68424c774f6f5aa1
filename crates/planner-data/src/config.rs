//! Planner configuration file.
//!
//! An optional `policy.{ron,toml,json}` next to the catalog tunes binding
//! and expansion. Both sections may be omitted; missing fields keep their
//! defaults, so an empty file is the stock configuration.

use planner_core::binder::BindPolicy;
use planner_core::expand::ExpandOptions;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::loader::{DataLoadError, deserialize_file, find_data_file};

/// Base name of the configuration file.
pub const POLICY_FILE: &str = "policy";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    pub bind: BindPolicy,
    pub expand: ExpandOptions,
}

/// Load `policy.*` from `dir`, or the defaults if there is none.
pub fn load_config(dir: &Path) -> Result<PlannerConfig, DataLoadError> {
    match find_data_file(dir, POLICY_FILE)? {
        Some(path) => deserialize_file(&path),
        None => {
            tracing::debug!(dir = %dir.display(), "no policy file, using defaults");
            Ok(PlannerConfig::default())
        }
    }
}
