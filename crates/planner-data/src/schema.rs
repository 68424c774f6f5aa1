//! Serde record types for catalog data files.
//!
//! A catalog file holds three keyed collections (`items`, `buildings`,
//! `recipes`). Other top-level sections of the stock data dump (generators,
//! miners, resources, schematics) are ignored. Field names are camelCase on
//! disk. Records convert into the unbound core types; cross references stay
//! string keys until the binder resolves them.

use planner_core::amount::Amount;
use planner_core::catalog::{Building, DraftAmount, DraftRecipe, Item};
use serde::Deserialize;
use serde::de::{Deserializer, MapAccess, SeqAccess, Visitor};
use std::fmt;
use std::marker::PhantomData;

// ===========================================================================
// Keyed collections
// ===========================================================================

/// Records carrying their own catalog key.
pub trait Record {
    fn class_name(&self) -> &str;
}

/// A keyed record collection in file order.
///
/// Accepts either a map of `key -> record` (the stock data layout) or a
/// plain list of records, keyed by their `className`. Entries are kept in
/// the order they appear, since default recipe selection depends on it.
#[derive(Debug, Clone, PartialEq)]
pub struct Keyed<T> {
    entries: Vec<(String, T)>,
}

impl<T> Keyed<T> {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.entries.iter().map(|(_, value)| value)
    }

    pub fn into_values(self) -> impl Iterator<Item = T> {
        self.entries.into_iter().map(|(_, value)| value)
    }
}

impl<T: Record> FromIterator<T> for Keyed<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|record| (record.class_name().to_string(), record))
                .collect(),
        }
    }
}

struct KeyedVisitor<T>(PhantomData<T>);

impl<'de, T: Deserialize<'de> + Record> Visitor<'de> for KeyedVisitor<T> {
    type Value = Keyed<T>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of keyed records or a list of records")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
        while let Some((key, value)) = map.next_entry::<String, T>()? {
            entries.push((key, value));
        }
        Ok(Keyed { entries })
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        let mut entries = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(value) = seq.next_element::<T>()? {
            entries.push((value.class_name().to_string(), value));
        }
        Ok(Keyed { entries })
    }
}

impl<'de, T: Deserialize<'de> + Record> Deserialize<'de> for Keyed<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(KeyedVisitor(PhantomData))
    }
}

// ===========================================================================
// Records
// ===========================================================================

/// An item record.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRecord {
    pub class_name: String,
    pub name: String,
    pub slug: String,
    pub stack_size: Amount,
    pub liquid: bool,
    pub sink_points: Amount,
}

/// A building record. Only `powerConsumption` is read from its metadata.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildingRecord {
    pub class_name: String,
    pub name: String,
    pub slug: String,
    pub description: String,
    #[serde(default)]
    pub metadata: BuildingMetadata,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildingMetadata {
    #[serde(default)]
    pub power_consumption: Amount,
}

/// An ingredient or product entry.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AmountRecord {
    pub item: String,
    pub amount: Amount,
}

/// A recipe record.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeRecord {
    pub class_name: String,
    pub name: String,
    pub slug: String,
    pub alternate: bool,
    pub time: Amount,
    pub ingredients: Vec<AmountRecord>,
    pub products: Vec<AmountRecord>,
    pub produced_in: Vec<String>,
}

impl Record for ItemRecord {
    fn class_name(&self) -> &str {
        &self.class_name
    }
}

impl Record for BuildingRecord {
    fn class_name(&self) -> &str {
        &self.class_name
    }
}

impl Record for RecipeRecord {
    fn class_name(&self) -> &str {
        &self.class_name
    }
}

/// Top-level catalog file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CatalogData {
    pub items: Keyed<ItemRecord>,
    pub buildings: Keyed<BuildingRecord>,
    pub recipes: Keyed<RecipeRecord>,
}

// ===========================================================================
// Conversions
// ===========================================================================

impl From<ItemRecord> for Item {
    fn from(record: ItemRecord) -> Self {
        let mut item = Item::new(&record.class_name, &record.name);
        item.slug = record.slug;
        item.stack_size = record.stack_size;
        item.liquid = record.liquid;
        item.sink_points = record.sink_points;
        item
    }
}

impl From<BuildingRecord> for Building {
    fn from(record: BuildingRecord) -> Self {
        let mut building = Building::new(&record.class_name, &record.name);
        building.slug = record.slug;
        building.description = record.description;
        building.power_consumption = record.metadata.power_consumption;
        building
    }
}

impl From<AmountRecord> for DraftAmount {
    fn from(record: AmountRecord) -> Self {
        DraftAmount {
            item: record.item,
            amount: record.amount,
        }
    }
}

impl From<RecipeRecord> for DraftRecipe {
    fn from(record: RecipeRecord) -> Self {
        let mut recipe = DraftRecipe::new(&record.class_name, &record.name);
        recipe.slug = record.slug;
        recipe.alternate = record.alternate;
        recipe.time = record.time;
        recipe.ingredients = record.ingredients.into_iter().map(DraftAmount::from).collect();
        recipe.products = record.products.into_iter().map(DraftAmount::from).collect();
        recipe.buildings = record.produced_in;
        recipe
    }
}

impl CatalogData {
    /// Split into core catalog inputs, preserving record order.
    pub fn into_parts(self) -> (Vec<Item>, Vec<Building>, Vec<DraftRecipe>) {
        (
            self.items.into_values().map(Item::from).collect(),
            self.buildings.into_values().map(Building::from).collect(),
            self.recipes.into_values().map(DraftRecipe::from).collect(),
        )
    }
}
