//! Shared catalog fixtures for unit tests, integration tests, and benchmarks.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]`.

use crate::amount::Amount;
use crate::binder::{BindPolicy, WorldBuilder};
use crate::catalog::*;
use std::str::FromStr;

// ===========================================================================
// Amount helper
// ===========================================================================

pub fn amt(s: &str) -> Amount {
    Amount::from_str(s).expect("fixture amount must parse")
}

// ===========================================================================
// Catalog keys
// ===========================================================================

pub const IRON_ORE: &str = "Desc_OreIron_C";
pub const IRON_INGOT: &str = "Desc_IronIngot_C";
pub const IRON_PLATE: &str = "Desc_IronPlate_C";
pub const IRON_ROD: &str = "Desc_IronRod_C";
pub const SCREW: &str = "Desc_IronScrew_C";
pub const REINFORCED_PLATE: &str = "Desc_IronPlateReinforced_C";
pub const WATER: &str = "Desc_Water_C";
pub const FUEL: &str = "Desc_LiquidFuel_C";
pub const PACKAGED_FUEL: &str = "Desc_Fuel_C";
pub const CANISTER: &str = "Desc_FluidCanister_C";

pub const SMELTER: &str = "Build_SmelterMk1_C";
pub const CONSTRUCTOR: &str = "Build_ConstructorMk1_C";
pub const ASSEMBLER: &str = "Build_AssemblerMk1_C";
pub const PACKAGER: &str = "Build_Packager_C";

// ===========================================================================
// Draft constructors
// ===========================================================================

pub fn item(key: &str, name: &str) -> Item {
    let mut item = Item::new(key, name);
    item.stack_size = amt("100");
    item
}

pub fn building(key: &str, name: &str, power: &str) -> Building {
    let mut building = Building::new(key, name);
    building.power_consumption = amt(power);
    building
}

/// Build a draft recipe from `(item key, amount)` pairs.
pub fn draft(
    key: &str,
    name: &str,
    ingredients: &[(&str, &str)],
    products: &[(&str, &str)],
    buildings: &[&str],
) -> DraftRecipe {
    let mut recipe = DraftRecipe::new(key, name);
    recipe.time = amt("6");
    recipe.ingredients = ingredients
        .iter()
        .map(|(item, amount)| DraftAmount::new(item, amt(amount)))
        .collect();
    recipe.products = products
        .iter()
        .map(|(item, amount)| DraftAmount::new(item, amt(amount)))
        .collect();
    recipe.buildings = buildings.iter().map(|b| b.to_string()).collect();
    recipe
}

pub fn alternate(mut recipe: DraftRecipe) -> DraftRecipe {
    recipe.alternate = true;
    recipe
}

// ===========================================================================
// Iron catalog
// ===========================================================================

/// Raw iron catalog. Iron ingots have no recipe, so they are the raw
/// resource every branch ends in.
pub fn iron_catalog() -> (Vec<Item>, Vec<Building>, Vec<DraftRecipe>) {
    let items = vec![
        item(IRON_INGOT, "Iron Ingot"),
        item(IRON_PLATE, "Iron Plate"),
        item(IRON_ROD, "Iron Rod"),
        item(SCREW, "Screw"),
        item(REINFORCED_PLATE, "Reinforced Iron Plate"),
    ];
    let buildings = vec![
        building(CONSTRUCTOR, "Constructor", "4"),
        building(ASSEMBLER, "Assembler", "15"),
    ];
    let recipes = vec![
        draft(
            "Recipe_IronPlate_C",
            "Iron Plate",
            &[(IRON_INGOT, "1")],
            &[(IRON_PLATE, "2")],
            &[CONSTRUCTOR],
        ),
        draft(
            "Recipe_IronRod_C",
            "Iron Rod",
            &[(IRON_INGOT, "1")],
            &[(IRON_ROD, "1")],
            &[CONSTRUCTOR],
        ),
        draft(
            "Recipe_Screw_C",
            "Screw",
            &[(IRON_ROD, "1")],
            &[(SCREW, "4")],
            &[CONSTRUCTOR],
        ),
        draft(
            "Recipe_IronPlateReinforced_C",
            "Reinforced Iron Plate",
            &[(IRON_PLATE, "6"), (SCREW, "12")],
            &[(REINFORCED_PLATE, "1")],
            &[ASSEMBLER],
        ),
        alternate(draft(
            "Recipe_Alternate_CoatedIronPlate_C",
            "Alternate: Coated Iron Plate",
            &[(IRON_INGOT, "5")],
            &[(IRON_PLATE, "10")],
            &[ASSEMBLER],
        )),
    ];
    (items, buildings, recipes)
}

pub fn iron_world() -> World {
    let (items, buildings, recipes) = iron_catalog();
    WorldBuilder::bind_all("iron", BindPolicy::default(), items, buildings, &recipes)
        .expect("iron fixture must bind")
}

// ===========================================================================
// Packaging catalog (mutually inverse recipes)
// ===========================================================================

/// Fuel packaging and unpackaging. With no exclusions the unpackage recipe
/// becomes fuel's default, closing a cycle.
pub fn packaging_catalog() -> (Vec<Item>, Vec<Building>, Vec<DraftRecipe>) {
    let items = vec![
        item(FUEL, "Fuel"),
        item(PACKAGED_FUEL, "Packaged Fuel"),
        item(CANISTER, "Empty Canister"),
        item(WATER, "Water"),
    ];
    let buildings = vec![building(PACKAGER, "Packager", "10")];
    let recipes = vec![
        draft(
            "Recipe_UnpackageFuel_C",
            "Unpackage Fuel",
            &[(PACKAGED_FUEL, "2")],
            &[(FUEL, "2"), (CANISTER, "2")],
            &[PACKAGER],
        ),
        draft(
            "Recipe_Fuel_C",
            "Packaged Fuel",
            &[(FUEL, "2"), (CANISTER, "2")],
            &[(PACKAGED_FUEL, "2")],
            &[PACKAGER],
        ),
        draft(
            "Recipe_UnpackageWater_C",
            "Unpackage Water",
            &[(CANISTER, "1")],
            &[(WATER, "1")],
            &[PACKAGER],
        ),
    ];
    (items, buildings, recipes)
}

pub fn packaging_world(policy: BindPolicy) -> World {
    let (items, buildings, recipes) = packaging_catalog();
    WorldBuilder::bind_all("packaging", policy, items, buildings, &recipes)
        .expect("packaging fixture must bind")
}

/// Linear chain `tier0 <- tier1 <- ... <- tier{depth}`, each step doubling
/// the ingredient amount. `tier0` is raw.
pub fn chain_world(depth: usize) -> World {
    let items: Vec<Item> = (0..=depth)
        .map(|i| item(&format!("Desc_Tier{i}_C"), &format!("Tier {i}")))
        .collect();
    let buildings = vec![building(CONSTRUCTOR, "Constructor", "4")];
    let recipes: Vec<DraftRecipe> = (1..=depth)
        .map(|i| {
            draft(
                &format!("Recipe_Tier{i}_C"),
                &format!("Tier {i}"),
                &[(format!("Desc_Tier{}_C", i - 1).as_str(), "2")],
                &[(format!("Desc_Tier{i}_C").as_str(), "1")],
                &[CONSTRUCTOR],
            )
        })
        .collect();
    WorldBuilder::bind_all("chain", BindPolicy::default(), items, buildings, &recipes)
        .expect("chain fixture must bind")
}
