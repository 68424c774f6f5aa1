//! Planner Data -- catalog files to bound worlds.
//!
//! A world directory holds a required `catalog.{ron,toml,json}` and an
//! optional `policy.{ron,toml,json}` (see [`config::PlannerConfig`]).
//! [`load_world`] finds both, deserializes them, and runs the binder.

pub mod config;
pub mod loader;
pub mod schema;

pub use config::{PlannerConfig, load_config};
pub use loader::{DataLoadError, Format};
pub use schema::CatalogData;

use planner_core::binder::{BindPolicy, WorldBuilder};
use planner_core::catalog::World;
use std::path::Path;

/// Base name of the catalog file.
pub const CATALOG_FILE: &str = "catalog";

/// A bound world plus the configuration it was loaded with.
#[derive(Debug, Clone)]
pub struct LoadedWorld {
    pub world: World,
    pub config: PlannerConfig,
}

/// Bind parsed catalog data into a world.
pub fn setup_world(name: &str, catalog: CatalogData, policy: BindPolicy) -> Result<World, DataLoadError> {
    let (items, buildings, drafts) = catalog.into_parts();
    let world = WorldBuilder::bind_all(name, policy, items, buildings, &drafts)?;
    tracing::info!(
        world = name,
        items = world.item_count(),
        buildings = world.building_count(),
        recipes = world.recipe_count(),
        unresolved = world.unresolved().len(),
        "world loaded"
    );
    Ok(world)
}

/// Read `catalog.*` from `dir`.
pub fn load_catalog(dir: &Path) -> Result<CatalogData, DataLoadError> {
    let path = loader::require_data_file(dir, CATALOG_FILE)?;
    loader::deserialize_file(&path)
}

/// Load the catalog and configuration in `dir` and bind them.
pub fn load_world(dir: &Path, name: &str) -> Result<LoadedWorld, DataLoadError> {
    let config = load_config(dir)?;
    let catalog = load_catalog(dir)?;
    let world = setup_world(name, catalog, config.bind.clone())?;
    Ok(LoadedWorld { world, config })
}
