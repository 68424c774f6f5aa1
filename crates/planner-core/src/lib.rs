//! Planner Core -- production requirement trees for factory catalogs.
//!
//! This crate binds a flat, string-keyed catalog of items, buildings, and
//! recipes into a cross-referenced [`catalog::World`], and expands a
//! requested item quantity into a tree of scaled ingredient requirements
//! using exact rational arithmetic.
//!
//! # Pipeline
//!
//! 1. **Bind** -- [`binder::WorldBuilder`] resolves recipe references and
//!    selects one default recipe per item under a [`binder::BindPolicy`].
//! 2. **Expand** -- [`expand::Expander`] disassembles requested amounts one
//!    recipe level at a time until every branch ends in a raw resource.
//! 3. **Traverse** -- [`tree::ProductionTree`] flattens the result in
//!    pre-order for rendering ([`render::RenderSink`]) or aggregation.
//!
//! ```rust,ignore
//! let world = WorldBuilder::bind_all("my world", BindPolicy::default(), items, buildings, &drafts)?;
//! let plate = world.item_id("Desc_IronPlate_C").unwrap();
//! let tree = disassemble_to_root_building(&world, vec![ItemAmount::new(plate, dec!(6))])?;
//! for node in tree.iter() {
//!     println!("{}", node.label(&world));
//! }
//! ```
//!
//! # Key Types
//!
//! - [`amount::Amount`] -- exact rational quantity (never floating point).
//! - [`catalog::World`] -- immutable bound catalog, safe to share.
//! - [`binder::BindPolicy`] -- default-recipe exclusion configuration.
//! - [`expand::ExpandError`] -- inconsistent or cyclic recipe data.
//! - [`lcm::lcm`] -- least common multiple over integers and decimals.

pub mod amount;
pub mod binder;
pub mod catalog;
pub mod expand;
pub mod id;
pub mod lcm;
pub mod render;
pub mod tree;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
