//! Production tree expansion.
//!
//! One disassembly step turns `requested` units of an item into the
//! ingredients of the item's default recipe, scaled by
//! `ingredient * requested / produced`. [`Expander::disassemble_to_root_building`]
//! repeats that step until every branch ends in a raw resource (an item
//! without a default recipe).
//!
//! Default recipes can form cycles in real catalogs (packaging and
//! unpackaging are inverse recipes). The expander tracks the recipes on the
//! current root-to-node path and fails with [`ExpandError::CyclicRecipe`]
//! on a repeat, so expansion always terminates.

use crate::amount::{Amount, scale_requirement};
use crate::catalog::{ItemAmount, Recipe, World};
use crate::id::*;
use crate::tree::{ProductionNode, ProductionTree};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Options and errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpandOptions {
    /// Deepest allowed node depth (root is 0). `None` means unbounded.
    pub max_depth: Option<usize>,
}

#[derive(Debug, thiserror::Error)]
pub enum ExpandError {
    #[error("nothing requested")]
    EmptyRequest,

    #[error("item {0:?} is not in the world")]
    UnknownItem(ItemId),

    #[error("requested a negative amount {amount} of '{item}'")]
    NegativeAmount { item: String, amount: Amount },

    #[error("default recipe '{recipe}' of '{item}' does not produce it")]
    InconsistentRecipe { item: String, recipe: String },

    #[error("recipe '{recipe}' of '{item}' yields zero")]
    ZeroYield { item: String, recipe: String },

    #[error("recipe cycle through '{recipe}': {}", .path.join(" -> "))]
    CyclicRecipe { recipe: String, path: Vec<String> },

    #[error("amount overflow while scaling recipe '{recipe}'")]
    Overflow { recipe: String },

    #[error("expansion deeper than {max_depth} levels")]
    DepthExceeded { max_depth: usize },
}

// ---------------------------------------------------------------------------
// One-level disassembly
// ---------------------------------------------------------------------------

/// Scaled ingredients needed to produce `requested` with `recipe`.
fn scale_recipe(
    world: &World,
    requested: ItemAmount,
    recipe: &Recipe,
) -> Result<Vec<ItemAmount>, ExpandError> {
    let item_key = || {
        world
            .item(requested.item)
            .map_or_else(|| format!("{:?}", requested.item), |i| i.key.clone())
    };
    let produced = recipe
        .product_amount(requested.item)
        .ok_or_else(|| ExpandError::InconsistentRecipe {
            item: item_key(),
            recipe: recipe.key.clone(),
        })?;
    if produced.is_zero() {
        return Err(ExpandError::ZeroYield {
            item: item_key(),
            recipe: recipe.key.clone(),
        });
    }

    recipe
        .ingredients
        .iter()
        .map(|ingredient| {
            scale_requirement(ingredient.amount, requested.amount, produced)
                .map(|amount| ItemAmount::new(ingredient.item, amount))
                .ok_or_else(|| ExpandError::Overflow {
                    recipe: recipe.key.clone(),
                })
        })
        .collect()
}

/// Disassemble each amount one recipe level. Raw items contribute nothing.
pub fn disassemble_one_level(
    world: &World,
    amounts: &[ItemAmount],
) -> Result<Vec<ItemAmount>, ExpandError> {
    let mut ingredients = Vec::new();
    for &requested in amounts {
        world
            .item(requested.item)
            .ok_or(ExpandError::UnknownItem(requested.item))?;
        if let Some((_, recipe)) = world.default_recipe(requested.item) {
            ingredients.extend(scale_recipe(world, requested, recipe)?);
        }
    }
    Ok(ingredients)
}

// ---------------------------------------------------------------------------
// Expander
// ---------------------------------------------------------------------------

/// Builds production trees against one world.
#[derive(Debug, Clone)]
pub struct Expander<'w> {
    world: &'w World,
    options: ExpandOptions,
}

impl<'w> Expander<'w> {
    pub fn new(world: &'w World) -> Self {
        Self::with_options(world, ExpandOptions::default())
    }

    pub fn with_options(world: &'w World, options: ExpandOptions) -> Self {
        Self { world, options }
    }

    pub fn world(&self) -> &'w World {
        self.world
    }

    /// Expand `amounts` into a full production tree.
    ///
    /// The root holds every requested amount, with the default recipe of the
    /// first entry and that recipe's canonical building.
    pub fn disassemble_to_root_building(
        &self,
        amounts: Vec<ItemAmount>,
    ) -> Result<ProductionTree, ExpandError> {
        let first = *amounts.first().ok_or(ExpandError::EmptyRequest)?;
        for requested in &amounts {
            let item = self
                .world
                .item(requested.item)
                .ok_or(ExpandError::UnknownItem(requested.item))?;
            if requested.amount.is_negative() {
                return Err(ExpandError::NegativeAmount {
                    item: item.key.clone(),
                    amount: requested.amount,
                });
            }
        }

        let (recipe, building) = self.recipe_and_building(first.item);
        let mut root = ProductionNode::new(amounts, recipe, building);
        let mut path = Vec::new();
        self.expand_node(&mut root, &mut path, 0)?;

        let tree = ProductionTree::new(root);
        tracing::debug!(
            world = %self.world.name(),
            nodes = tree.len(),
            depth = tree.depth(),
            "production tree expanded"
        );
        Ok(tree)
    }

    /// Expand independent requests on the rayon pool, sharing the read-only
    /// world. Results keep request order.
    #[cfg(feature = "parallel")]
    pub fn expand_many(
        &self,
        requests: Vec<Vec<ItemAmount>>,
    ) -> Vec<Result<ProductionTree, ExpandError>> {
        use rayon::prelude::*;
        requests
            .into_par_iter()
            .map(|amounts| self.disassemble_to_root_building(amounts))
            .collect()
    }

    /// Expand independent requests in order.
    #[cfg(not(feature = "parallel"))]
    pub fn expand_many(
        &self,
        requests: Vec<Vec<ItemAmount>>,
    ) -> Vec<Result<ProductionTree, ExpandError>> {
        requests
            .into_iter()
            .map(|amounts| self.disassemble_to_root_building(amounts))
            .collect()
    }

    fn recipe_and_building(&self, item: ItemId) -> (Option<RecipeId>, Option<BuildingId>) {
        match self.world.default_recipe(item) {
            Some((id, recipe)) => (Some(id), recipe.canonical_building()),
            None => (None, None),
        }
    }

    fn expand_node(
        &self,
        node: &mut ProductionNode,
        path: &mut Vec<RecipeId>,
        depth: usize,
    ) -> Result<(), ExpandError> {
        for index in 0..node.amounts.len() {
            let requested = node.amounts[index];
            let Some((recipe_id, recipe)) = self.world.default_recipe(requested.item) else {
                continue;
            };
            if path.contains(&recipe_id) {
                return Err(self.cycle_error(recipe, path));
            }
            if let Some(max_depth) = self.options.max_depth {
                if depth >= max_depth && !recipe.ingredients.is_empty() {
                    return Err(ExpandError::DepthExceeded { max_depth });
                }
            }

            let mut children = Vec::with_capacity(recipe.ingredients.len());
            for ingredient in scale_recipe(self.world, requested, recipe)? {
                let (recipe, building) = self.recipe_and_building(ingredient.item);
                children.push(ProductionNode::new(vec![ingredient], recipe, building));
            }
            tracing::trace!(recipe = %recipe.key, depth, children = children.len(), "disassembled");

            path.push(recipe_id);
            for child in &mut children {
                self.expand_node(child, path, depth + 1)?;
            }
            path.pop();
            node.children.extend(children);
        }
        Ok(())
    }

    fn cycle_error(&self, recipe: &Recipe, path: &[RecipeId]) -> ExpandError {
        let mut keys: Vec<String> = path
            .iter()
            .filter_map(|id| self.world.recipe(*id))
            .map(|r| r.key.clone())
            .collect();
        keys.push(recipe.key.clone());
        ExpandError::CyclicRecipe {
            recipe: recipe.key.clone(),
            path: keys,
        }
    }
}

/// Expand `amounts` with default options.
pub fn disassemble_to_root_building(
    world: &World,
    amounts: Vec<ItemAmount>,
) -> Result<ProductionTree, ExpandError> {
    Expander::new(world).disassemble_to_root_building(amounts)
}
