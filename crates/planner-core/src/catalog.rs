//! Bound catalog types: items, buildings, recipes, and the [`World`] that
//! owns them.
//!
//! Raw catalog data refers to everything by string key. After binding, all
//! cross references are dense ids into the owning [`World`], so a `World`
//! is plain data: immutable, `Send + Sync`, and cheap to share between
//! independent expansion queries.

use crate::amount::Amount;
use crate::id::*;
use std::collections::HashMap;
use std::fmt;

// ---------------------------------------------------------------------------
// Catalog entities
// ---------------------------------------------------------------------------

/// A catalog item.
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    /// External catalog key (e.g. `Desc_IronPlate_C`).
    pub key: String,
    pub name: String,
    pub slug: String,
    pub stack_size: Amount,
    pub liquid: bool,
    pub sink_points: Amount,
    /// Canonical recipe used for tree expansion. `None` marks a raw resource.
    /// Written once by the binder.
    pub default_recipe: Option<RecipeId>,
}

impl Item {
    pub fn new(key: &str, name: &str) -> Self {
        Self {
            key: key.to_string(),
            name: name.to_string(),
            slug: String::new(),
            stack_size: Amount::ZERO,
            liquid: false,
            sink_points: Amount::ZERO,
            default_recipe: None,
        }
    }

    pub fn is_raw(&self) -> bool {
        self.default_recipe.is_none()
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "name = {}, stack size = {}", self.name, self.stack_size)
    }
}

/// A production building.
#[derive(Debug, Clone, PartialEq)]
pub struct Building {
    pub key: String,
    pub name: String,
    pub slug: String,
    pub description: String,
    /// Zero when the catalog has no power metadata for the building.
    pub power_consumption: Amount,
}

impl Building {
    pub fn new(key: &str, name: &str) -> Self {
        Self {
            key: key.to_string(),
            name: name.to_string(),
            slug: String::new(),
            description: String::new(),
            power_consumption: Amount::ZERO,
        }
    }
}

/// A quantity of one item. Several amounts may refer to the same item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ItemAmount {
    pub item: ItemId,
    pub amount: Amount,
}

impl ItemAmount {
    pub fn new(item: ItemId, amount: Amount) -> Self {
        Self { item, amount }
    }

    /// `"<amount> <item name>"`, with trailing zeros stripped.
    pub fn display<'a>(&self, world: &'a World) -> ItemAmountDisplay<'a> {
        ItemAmountDisplay {
            amount: *self,
            world,
        }
    }
}

/// Display adapter returned by [`ItemAmount::display`].
pub struct ItemAmountDisplay<'a> {
    amount: ItemAmount,
    world: &'a World,
}

impl fmt::Display for ItemAmountDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self
            .world
            .item(self.amount.item)
            .map_or("<unknown item>", |item| item.name.as_str());
        write!(f, "{} {}", self.amount.amount, name)
    }
}

/// An unresolved recipe ingredient or product: item key plus amount.
#[derive(Debug, Clone, PartialEq)]
pub struct DraftAmount {
    pub item: String,
    pub amount: Amount,
}

impl DraftAmount {
    pub fn new(item: &str, amount: Amount) -> Self {
        Self {
            item: item.to_string(),
            amount,
        }
    }
}

/// A recipe as it appears in raw catalog data, before binding.
/// Items and buildings are referenced by key.
#[derive(Debug, Clone, PartialEq)]
pub struct DraftRecipe {
    pub key: String,
    pub name: String,
    pub slug: String,
    pub alternate: bool,
    pub time: Amount,
    pub ingredients: Vec<DraftAmount>,
    pub products: Vec<DraftAmount>,
    pub buildings: Vec<String>,
}

impl DraftRecipe {
    pub fn new(key: &str, name: &str) -> Self {
        Self {
            key: key.to_string(),
            name: name.to_string(),
            slug: String::new(),
            alternate: false,
            time: Amount::ZERO,
            ingredients: Vec::new(),
            products: Vec::new(),
            buildings: Vec::new(),
        }
    }
}

/// A bound recipe. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Recipe {
    pub key: String,
    pub name: String,
    pub slug: String,
    pub alternate: bool,
    pub time: Amount,
    pub ingredients: Vec<ItemAmount>,
    pub products: Vec<ItemAmount>,
    /// Buildings able to run this recipe. The first entry is canonical.
    pub buildings: Vec<BuildingId>,
}

impl Recipe {
    /// Yield of `item` per craft, from the first matching product entry.
    pub fn product_amount(&self, item: ItemId) -> Option<Amount> {
        self.products
            .iter()
            .find(|p| p.item == item)
            .map(|p| p.amount)
    }

    pub fn produces(&self, item: ItemId) -> bool {
        self.products.iter().any(|p| p.item == item)
    }

    /// The building used when this recipe appears in a production tree.
    pub fn canonical_building(&self) -> Option<BuildingId> {
        self.buildings.first().copied()
    }

    /// Multi-line description: name, build time, ingredients, products.
    pub fn display<'a>(&'a self, world: &'a World) -> RecipeDisplay<'a> {
        RecipeDisplay {
            recipe: self,
            world,
        }
    }
}

/// Display adapter returned by [`Recipe::display`].
pub struct RecipeDisplay<'a> {
    recipe: &'a Recipe,
    world: &'a World,
}

impl fmt::Display for RecipeDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "name: {}, time to build: {},",
            self.recipe.name,
            self.recipe.time
        )?;
        writeln!(f, "ingredients:")?;
        for ingredient in &self.recipe.ingredients {
            writeln!(f, "{}", ingredient.display(self.world))?;
        }
        writeln!(f, "products:")?;
        for product in &self.recipe.products {
            writeln!(f, "{}", product.display(self.world))?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Unresolved references
// ---------------------------------------------------------------------------

/// Which list of a draft recipe an unresolved key came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    Ingredient,
    Product,
    Building,
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReferenceKind::Ingredient => f.write_str("ingredient"),
            ReferenceKind::Product => f.write_str("product"),
            ReferenceKind::Building => f.write_str("building"),
        }
    }
}

/// A draft recipe reference that matched nothing in the catalog and was
/// dropped during lenient binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedReference {
    pub recipe: String,
    pub kind: ReferenceKind,
    pub key: String,
}

impl fmt::Display for UnresolvedReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "recipe '{}' references unknown {} '{}'",
            self.recipe, self.kind, self.key
        )
    }
}

// ---------------------------------------------------------------------------
// Stable-order key index
// ---------------------------------------------------------------------------

/// Maps catalog keys to positions. When a key repeats, the first position
/// wins, so lookups agree with a front-to-back scan of the source list.
#[derive(Debug, Clone, Default)]
pub(crate) struct KeyIndex {
    positions: HashMap<String, u32>,
}

impl KeyIndex {
    pub(crate) fn build<'a>(kind: &'static str, keys: impl IntoIterator<Item = &'a str>) -> Self {
        let mut positions = HashMap::new();
        for (position, key) in keys.into_iter().enumerate() {
            if positions.contains_key(key) {
                tracing::warn!(kind, key, position, "duplicate catalog key, keeping first entry");
                continue;
            }
            positions.insert(key.to_string(), position as u32);
        }
        Self { positions }
    }

    pub(crate) fn get(&self, key: &str) -> Option<u32> {
        self.positions.get(key).copied()
    }
}

// ---------------------------------------------------------------------------
// World
// ---------------------------------------------------------------------------

/// One bound catalog snapshot. Owns every item, building, and recipe.
///
/// Built by [`crate::binder::WorldBuilder`]; read-only afterwards.
#[derive(Debug, Clone)]
pub struct World {
    name: String,
    items: Vec<Item>,
    buildings: Vec<Building>,
    recipes: Vec<Recipe>,
    item_index: KeyIndex,
    building_index: KeyIndex,
    recipe_index: KeyIndex,
    unresolved: Vec<UnresolvedReference>,
}

impl World {
    pub(crate) fn from_parts(
        name: String,
        items: Vec<Item>,
        buildings: Vec<Building>,
        recipes: Vec<Recipe>,
        item_index: KeyIndex,
        building_index: KeyIndex,
        unresolved: Vec<UnresolvedReference>,
    ) -> Self {
        let recipe_index = KeyIndex::build("recipe", recipes.iter().map(|r| r.key.as_str()));
        Self {
            name,
            items,
            buildings,
            recipes,
            item_index,
            building_index,
            recipe_index,
            unresolved,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn item(&self, id: ItemId) -> Option<&Item> {
        self.items.get(id.index())
    }

    pub fn building(&self, id: BuildingId) -> Option<&Building> {
        self.buildings.get(id.index())
    }

    pub fn recipe(&self, id: RecipeId) -> Option<&Recipe> {
        self.recipes.get(id.index())
    }

    pub fn item_id(&self, key: &str) -> Option<ItemId> {
        self.item_index.get(key).map(ItemId)
    }

    pub fn building_id(&self, key: &str) -> Option<BuildingId> {
        self.building_index.get(key).map(BuildingId)
    }

    pub fn recipe_id(&self, key: &str) -> Option<RecipeId> {
        self.recipe_index.get(key).map(RecipeId)
    }

    /// First item (in catalog order) whose display name is `name`.
    pub fn find_item_by_name(&self, name: &str) -> Option<ItemId> {
        self.items
            .iter()
            .position(|item| item.name == name)
            .map(|i| ItemId(i as u32))
    }

    /// Every recipe listing `item` among its products, in catalog order.
    /// Alternates and excluded recipes are included.
    pub fn recipes_producing(&self, item: ItemId) -> impl Iterator<Item = (RecipeId, &Recipe)> {
        self.recipes()
            .filter(move |(_, recipe)| recipe.produces(item))
    }

    pub fn items(&self) -> impl Iterator<Item = (ItemId, &Item)> {
        self.items
            .iter()
            .enumerate()
            .map(|(i, item)| (ItemId(i as u32), item))
    }

    pub fn buildings(&self) -> impl Iterator<Item = (BuildingId, &Building)> {
        self.buildings
            .iter()
            .enumerate()
            .map(|(i, b)| (BuildingId(i as u32), b))
    }

    pub fn recipes(&self) -> impl Iterator<Item = (RecipeId, &Recipe)> {
        self.recipes
            .iter()
            .enumerate()
            .map(|(i, r)| (RecipeId(i as u32), r))
    }

    /// The default recipe of `item`, if it has one.
    pub fn default_recipe(&self, item: ItemId) -> Option<(RecipeId, &Recipe)> {
        let id = self.item(item)?.default_recipe?;
        self.recipe(id).map(|recipe| (id, recipe))
    }

    /// References dropped during lenient binding.
    pub fn unresolved(&self) -> &[UnresolvedReference] {
        &self.unresolved
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn building_count(&self) -> usize {
        self.buildings.len()
    }

    pub fn recipe_count(&self) -> usize {
        self.recipes.len()
    }
}
