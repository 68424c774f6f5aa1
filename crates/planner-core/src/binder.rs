//! Catalog binding: string-keyed drafts into a linked [`World`].
//!
//! Binding runs in phases, like a registry builder:
//!
//! 1. register items and buildings,
//! 2. [`WorldBuilder::bind_recipes`] resolves every draft recipe reference,
//! 3. [`WorldBuilder::bind_default_recipes`] picks one canonical recipe per item,
//! 4. [`WorldBuilder::build`] freezes the result.
//!
//! Running a phase before its inputs exist is a caller bug and fails with
//! [`BindError::Precondition`].
//!
//! Unknown keys inside a draft recipe are dropped from the bound recipe
//! (lenient binding). Every drop is logged at `warn` level and recorded in
//! [`World::unresolved`]. Set [`BindPolicy::strict_references`] to fail
//! instead.

use crate::amount::Amount;
use crate::catalog::*;
use crate::id::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// ---------------------------------------------------------------------------
// Policy
// ---------------------------------------------------------------------------

/// Which recipes may become an item's default recipe.
///
/// Alternate recipes are never eligible. On top of that a recipe is skipped
/// when its key is in `excluded_recipes` or contains any of
/// `excluded_markers`, and items listed in `excluded_items` never get a
/// default recipe at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BindPolicy {
    pub excluded_recipes: BTreeSet<String>,
    pub excluded_markers: Vec<String>,
    pub excluded_items: BTreeSet<String>,
    /// Fail on unknown item/building keys instead of dropping them.
    pub strict_references: bool,
}

impl Default for BindPolicy {
    /// Exclusions for the stock catalog: unpackaging recipes (the inverse of
    /// packaging, which would otherwise close cycles) and water.
    fn default() -> Self {
        Self {
            excluded_recipes: [
                "Recipe_UnpackageOilResidue_C",
                "Recipe_UnpackageOil_C",
                "Recipe_UnpackageNitrogen_C",
                "Water",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            excluded_markers: vec!["Unpackage".to_string()],
            excluded_items: ["Desc_Water_C"].into_iter().map(String::from).collect(),
            strict_references: false,
        }
    }
}

impl BindPolicy {
    /// No exclusions beyond alternates.
    pub fn permissive() -> Self {
        Self {
            excluded_recipes: BTreeSet::new(),
            excluded_markers: Vec::new(),
            excluded_items: BTreeSet::new(),
            strict_references: false,
        }
    }

    pub fn strict(mut self) -> Self {
        self.strict_references = true;
        self
    }

    /// Whether `recipe` may serve as a default recipe at all.
    pub fn allows_recipe(&self, recipe: &Recipe) -> bool {
        !recipe.alternate
            && !self.excluded_recipes.contains(&recipe.key)
            && !self
                .excluded_markers
                .iter()
                .any(|marker| recipe.key.contains(marker.as_str()))
    }

    pub fn allows_item(&self, item: &Item) -> bool {
        !self.excluded_items.contains(&item.key)
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum BindError {
    #[error("binding out of order: {0}")]
    Precondition(&'static str),

    #[error("unresolved reference: {0}")]
    UnresolvedReference(UnresolvedReference),

    #[error("recipe '{recipe}' has negative amount {amount} for '{item}'")]
    NegativeAmount {
        recipe: String,
        item: String,
        amount: Amount,
    },
}

// ---------------------------------------------------------------------------
// Default recipe selection
// ---------------------------------------------------------------------------

/// First recipe, in catalog order, that may serve as `item`'s default.
pub fn select_default_recipe(
    policy: &BindPolicy,
    item_id: ItemId,
    item: &Item,
    recipes: &[Recipe],
) -> Option<RecipeId> {
    if !policy.allows_item(item) {
        return None;
    }
    recipes
        .iter()
        .position(|recipe| recipe.produces(item_id) && policy.allows_recipe(recipe))
        .map(|i| RecipeId(i as u32))
}

/// Assign every item its default recipe in place. Items with no eligible
/// recipe are left as raw resources.
pub fn bind_default_recipes(policy: &BindPolicy, items: &mut [Item], recipes: &[Recipe]) {
    for (i, item) in items.iter_mut().enumerate() {
        item.default_recipe = select_default_recipe(policy, ItemId(i as u32), item, recipes);
    }
}

// ---------------------------------------------------------------------------
// WorldBuilder
// ---------------------------------------------------------------------------

/// Staged construction of a [`World`].
#[derive(Debug)]
pub struct WorldBuilder {
    name: String,
    policy: BindPolicy,
    items: Option<Vec<Item>>,
    item_index: KeyIndex,
    buildings: Option<Vec<Building>>,
    building_index: KeyIndex,
    recipes: Option<Vec<Recipe>>,
    defaults_bound: bool,
    unresolved: Vec<UnresolvedReference>,
}

impl WorldBuilder {
    pub fn new(name: &str, policy: BindPolicy) -> Self {
        Self {
            name: name.to_string(),
            policy,
            items: None,
            item_index: KeyIndex::default(),
            buildings: None,
            building_index: KeyIndex::default(),
            recipes: None,
            defaults_bound: false,
            unresolved: Vec::new(),
        }
    }

    /// Run every phase in order.
    pub fn bind_all(
        name: &str,
        policy: BindPolicy,
        items: Vec<Item>,
        buildings: Vec<Building>,
        drafts: &[DraftRecipe],
    ) -> Result<World, BindError> {
        let mut builder = Self::new(name, policy);
        builder.register_items(items);
        builder.register_buildings(buildings);
        builder.bind_recipes(drafts)?;
        builder.bind_default_recipes()?;
        builder.build()
    }

    pub fn policy(&self) -> &BindPolicy {
        &self.policy
    }

    /// Phase 1: register the item catalog. Ids follow the given order.
    pub fn register_items(&mut self, items: Vec<Item>) -> &mut Self {
        self.item_index = KeyIndex::build("item", items.iter().map(|i| i.key.as_str()));
        self.items = Some(items);
        self
    }

    /// Phase 1: register the building catalog. Ids follow the given order.
    pub fn register_buildings(&mut self, buildings: Vec<Building>) -> &mut Self {
        self.building_index =
            KeyIndex::build("building", buildings.iter().map(|b| b.key.as_str()));
        self.buildings = Some(buildings);
        self
    }

    /// Phase 2: resolve the item and building keys of every draft recipe.
    /// Recipe order is preserved, since default selection depends on it.
    pub fn bind_recipes(&mut self, drafts: &[DraftRecipe]) -> Result<&[Recipe], BindError> {
        if self.items.is_none() || self.buildings.is_none() {
            return Err(BindError::Precondition(
                "items and buildings must be registered before recipes are bound",
            ));
        }

        self.unresolved.clear();
        let mut recipes = Vec::with_capacity(drafts.len());
        for draft in drafts {
            let ingredients = self.resolve_amounts(draft, &draft.ingredients, ReferenceKind::Ingredient)?;
            let products = self.resolve_amounts(draft, &draft.products, ReferenceKind::Product)?;
            let buildings = self.resolve_buildings(draft)?;
            recipes.push(Recipe {
                key: draft.key.clone(),
                name: draft.name.clone(),
                slug: draft.slug.clone(),
                alternate: draft.alternate,
                time: draft.time,
                ingredients,
                products,
                buildings,
            });
        }

        tracing::debug!(
            world = %self.name,
            recipes = recipes.len(),
            dropped = self.unresolved.len(),
            "recipes bound"
        );
        self.defaults_bound = false;
        Ok(self.recipes.insert(recipes).as_slice())
    }

    /// Phase 3: select each item's default recipe.
    pub fn bind_default_recipes(&mut self) -> Result<(), BindError> {
        let recipes = self
            .recipes
            .as_deref()
            .ok_or(BindError::Precondition("recipes must be bound before default recipes"))?;
        let items = self
            .items
            .as_deref_mut()
            .ok_or(BindError::Precondition("items must be registered before default recipes"))?;

        bind_default_recipes(&self.policy, items, recipes);
        let raw = items.iter().filter(|item| item.is_raw()).count();
        tracing::debug!(world = %self.name, items = items.len(), raw, "default recipes bound");
        self.defaults_bound = true;
        Ok(())
    }

    /// Phase 4: freeze into an immutable [`World`]. Default recipes are bound
    /// here if phase 3 was skipped.
    pub fn build(mut self) -> Result<World, BindError> {
        if !self.defaults_bound {
            self.bind_default_recipes()?;
        }
        let (Some(items), Some(buildings), Some(recipes)) =
            (self.items, self.buildings, self.recipes)
        else {
            return Err(BindError::Precondition("world is incomplete"));
        };
        Ok(World::from_parts(
            self.name,
            items,
            buildings,
            recipes,
            self.item_index,
            self.building_index,
            self.unresolved,
        ))
    }

    fn resolve_amounts(
        &mut self,
        draft: &DraftRecipe,
        entries: &[DraftAmount],
        kind: ReferenceKind,
    ) -> Result<Vec<ItemAmount>, BindError> {
        let mut resolved = Vec::with_capacity(entries.len());
        for entry in entries {
            if entry.amount.is_negative() {
                return Err(BindError::NegativeAmount {
                    recipe: draft.key.clone(),
                    item: entry.item.clone(),
                    amount: entry.amount,
                });
            }
            match self.item_index.get(&entry.item) {
                Some(i) => resolved.push(ItemAmount::new(ItemId(i), entry.amount)),
                None => self.drop_reference(draft, kind, &entry.item)?,
            }
        }
        Ok(resolved)
    }

    fn resolve_buildings(&mut self, draft: &DraftRecipe) -> Result<Vec<BuildingId>, BindError> {
        let mut resolved = Vec::with_capacity(draft.buildings.len());
        for key in &draft.buildings {
            match self.building_index.get(key) {
                Some(i) => resolved.push(BuildingId(i)),
                None => self.drop_reference(draft, ReferenceKind::Building, key)?,
            }
        }
        Ok(resolved)
    }

    fn drop_reference(
        &mut self,
        draft: &DraftRecipe,
        kind: ReferenceKind,
        key: &str,
    ) -> Result<(), BindError> {
        let reference = UnresolvedReference {
            recipe: draft.key.clone(),
            kind,
            key: key.to_string(),
        };
        if self.policy.strict_references {
            return Err(BindError::UnresolvedReference(reference));
        }
        tracing::warn!(
            recipe = %reference.recipe,
            kind = %reference.kind,
            key = %reference.key,
            "dropping unresolved catalog reference"
        );
        self.unresolved.push(reference);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    fn key_of(world: &World, item: &str) -> Option<String> {
        let (_, recipe) = world.default_recipe(world.item_id(item)?)?;
        Some(recipe.key.clone())
    }

    #[test]
    fn bind_recipes_before_items_fails() {
        let (_, _, drafts) = iron_catalog();
        let mut builder = WorldBuilder::new("w", BindPolicy::default());
        let result = builder.bind_recipes(&drafts);
        assert!(matches!(result, Err(BindError::Precondition(_))));
    }

    #[test]
    fn bind_recipes_before_buildings_fails() {
        let (items, _, drafts) = iron_catalog();
        let mut builder = WorldBuilder::new("w", BindPolicy::default());
        builder.register_items(items);
        assert!(matches!(
            builder.bind_recipes(&drafts),
            Err(BindError::Precondition(_))
        ));
    }

    #[test]
    fn default_recipes_before_recipes_fails() {
        let (items, buildings, _) = iron_catalog();
        let mut builder = WorldBuilder::new("w", BindPolicy::default());
        builder.register_items(items).register_buildings(buildings);
        assert!(matches!(
            builder.bind_default_recipes(),
            Err(BindError::Precondition(_))
        ));
        assert!(matches!(builder.build(), Err(BindError::Precondition(_))));
    }

    #[test]
    fn bind_recipes_resolves_in_order() {
        let (items, buildings, drafts) = iron_catalog();
        let mut builder = WorldBuilder::new("w", BindPolicy::default());
        builder.register_items(items).register_buildings(buildings);
        let recipes = builder.bind_recipes(&drafts).unwrap();
        let keys: Vec<&str> = recipes.iter().map(|r| r.key.as_str()).collect();
        let draft_keys: Vec<&str> = drafts.iter().map(|d| d.key.as_str()).collect();
        assert_eq!(keys, draft_keys);

        let reinforced = &recipes[3];
        assert_eq!(reinforced.ingredients.len(), 2);
        assert_eq!(reinforced.ingredients[0].amount, amt("6"));
        assert_eq!(reinforced.ingredients[1].amount, amt("12"));
        assert_eq!(reinforced.buildings, vec![BuildingId(1)]);
    }

    #[test]
    fn default_recipe_skips_alternates() {
        let world = iron_world();
        assert_eq!(key_of(&world, IRON_PLATE).as_deref(), Some("Recipe_IronPlate_C"));
        assert_eq!(key_of(&world, SCREW).as_deref(), Some("Recipe_Screw_C"));
        assert_eq!(key_of(&world, IRON_INGOT), None);
    }

    #[test]
    fn default_recipe_is_first_eligible_in_catalog_order() {
        let (items, buildings, mut drafts) = iron_catalog();
        // A second non-alternate plate recipe listed after the first.
        drafts.push(draft(
            "Recipe_IronPlateBulk_C",
            "Bulk Iron Plate",
            &[(IRON_INGOT, "3")],
            &[(IRON_PLATE, "6")],
            &[ASSEMBLER],
        ));
        let world =
            WorldBuilder::bind_all("w", BindPolicy::default(), items.clone(), buildings.clone(), &drafts)
                .unwrap();
        assert_eq!(key_of(&world, IRON_PLATE).as_deref(), Some("Recipe_IronPlate_C"));

        // Moving it to the front makes it the default.
        let bulk = drafts.pop().unwrap();
        drafts.insert(0, bulk);
        let world = WorldBuilder::bind_all("w", BindPolicy::default(), items, buildings, &drafts)
            .unwrap();
        assert_eq!(key_of(&world, IRON_PLATE).as_deref(), Some("Recipe_IronPlateBulk_C"));
    }

    #[test]
    fn only_alternates_leaves_item_raw() {
        let (items, buildings, mut drafts) = iron_catalog();
        drafts.retain(|d| d.key != "Recipe_IronPlate_C");
        let world = WorldBuilder::bind_all("w", BindPolicy::default(), items, buildings, &drafts)
            .unwrap();
        assert!(world.item(world.item_id(IRON_PLATE).unwrap()).unwrap().is_raw());
    }

    #[test]
    fn default_policy_excludes_unpackaging_and_water() {
        let world = packaging_world(BindPolicy::default());
        assert_eq!(key_of(&world, FUEL), None);
        assert_eq!(key_of(&world, CANISTER), None);
        assert_eq!(key_of(&world, WATER), None);
        assert_eq!(key_of(&world, PACKAGED_FUEL).as_deref(), Some("Recipe_Fuel_C"));
    }

    #[test]
    fn permissive_policy_allows_unpackaging() {
        let world = packaging_world(BindPolicy::permissive());
        assert_eq!(key_of(&world, FUEL).as_deref(), Some("Recipe_UnpackageFuel_C"));
        assert_eq!(key_of(&world, WATER).as_deref(), Some("Recipe_UnpackageWater_C"));
    }

    #[test]
    fn excluded_recipe_key_is_never_default() {
        let mut policy = BindPolicy::permissive();
        policy.excluded_recipes.insert("Recipe_Screw_C".to_string());
        let (items, buildings, drafts) = iron_catalog();
        let world = WorldBuilder::bind_all("w", policy, items, buildings, &drafts).unwrap();
        assert_eq!(key_of(&world, SCREW), None);
    }

    #[test]
    fn default_recipe_always_produces_its_item() {
        let world = iron_world();
        for (id, item) in world.items() {
            if let Some(recipe) = item.default_recipe {
                assert!(world.recipe(recipe).unwrap().produces(id), "{}", item.key);
            }
        }
    }

    #[test]
    fn default_selection_is_deterministic() {
        let a = iron_world();
        let b = iron_world();
        let defaults = |w: &World| w.items().map(|(_, i)| i.default_recipe).collect::<Vec<_>>();
        assert_eq!(defaults(&a), defaults(&b));
    }

    #[test]
    fn unresolved_references_are_dropped_and_recorded() {
        let (items, buildings, mut drafts) = iron_catalog();
        drafts[0].ingredients.push(DraftAmount::new(IRON_ORE, amt("1")));
        drafts[0].buildings.insert(0, SMELTER.to_string());
        let world = WorldBuilder::bind_all("w", BindPolicy::default(), items, buildings, &drafts)
            .unwrap();

        let (_, recipe) = world.default_recipe(world.item_id(IRON_PLATE).unwrap()).unwrap();
        assert_eq!(recipe.ingredients.len(), 1);
        // The unknown smelter is dropped, so the constructor stays canonical.
        assert_eq!(
            world.building(recipe.canonical_building().unwrap()).unwrap().key,
            CONSTRUCTOR
        );
        assert_eq!(world.unresolved().len(), 2);
        assert_eq!(world.unresolved()[0].kind, ReferenceKind::Ingredient);
        assert_eq!(world.unresolved()[0].key, IRON_ORE);
        assert_eq!(world.unresolved()[1].kind, ReferenceKind::Building);
    }

    #[test]
    fn strict_policy_rejects_unresolved_references() {
        let (items, buildings, mut drafts) = iron_catalog();
        drafts[2].products.push(DraftAmount::new("Desc_Missing_C", amt("1")));
        let result =
            WorldBuilder::bind_all("w", BindPolicy::default().strict(), items, buildings, &drafts);
        match result {
            Err(BindError::UnresolvedReference(r)) => {
                assert_eq!(r.recipe, "Recipe_Screw_C");
                assert_eq!(r.kind, ReferenceKind::Product);
            }
            other => panic!("expected UnresolvedReference, got: {other:?}"),
        }
    }

    #[test]
    fn negative_amount_rejected() {
        let (items, buildings, mut drafts) = iron_catalog();
        drafts[1].ingredients[0].amount = amt("-1");
        let result = WorldBuilder::bind_all("w", BindPolicy::default(), items, buildings, &drafts);
        assert!(matches!(result, Err(BindError::NegativeAmount { .. })));
    }

    #[test]
    fn zero_amount_is_accepted() {
        let (items, buildings, mut drafts) = iron_catalog();
        drafts[1].ingredients[0].amount = amt("0");
        assert!(WorldBuilder::bind_all("w", BindPolicy::default(), items, buildings, &drafts).is_ok());
    }

    #[test]
    fn build_binds_defaults_when_phase_skipped() {
        let (items, buildings, drafts) = iron_catalog();
        let mut builder = WorldBuilder::new("w", BindPolicy::default());
        builder.register_items(items).register_buildings(buildings);
        builder.bind_recipes(&drafts).unwrap();
        let world = builder.build().unwrap();
        assert_eq!(key_of(&world, IRON_ROD).as_deref(), Some("Recipe_IronRod_C"));
        assert_eq!(world.name(), "w");
    }

    #[test]
    fn policy_deserializes_with_defaults() {
        let policy: BindPolicy =
            serde_json::from_str(r#"{"excluded_items": ["Desc_Coal_C"]}"#).unwrap();
        assert!(policy.excluded_items.contains("Desc_Coal_C"));
        assert!(policy.excluded_markers.contains(&"Unpackage".to_string()));
        assert!(!policy.strict_references);
    }

    #[test]
    fn error_display_messages() {
        let e = BindError::Precondition("items first");
        assert_eq!(e.to_string(), "binding out of order: items first");
        let e = BindError::NegativeAmount {
            recipe: "R".into(),
            item: "I".into(),
            amount: amt("-2"),
        };
        assert_eq!(e.to_string(), "recipe 'R' has negative amount -2 for 'I'");
    }
}
