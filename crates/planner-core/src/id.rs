use serde::{Deserialize, Serialize};

/// Identifies an item in a bound world. Cheap to copy and compare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ItemId(pub u32);

/// Identifies a building in a bound world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BuildingId(pub u32);

/// Identifies a recipe in a bound world. Ordering follows catalog order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RecipeId(pub u32);

impl ItemId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl BuildingId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl RecipeId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_id_equality() {
        let a = ItemId(0);
        let b = ItemId(0);
        let c = ItemId(1);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn recipe_ids_order_like_catalog_positions() {
        assert!(RecipeId(0) < RecipeId(1));
        assert_eq!(RecipeId(7).index(), 7);
    }

    #[test]
    fn ids_are_hashable() {
        use std::collections::HashMap;
        let mut map = HashMap::new();
        map.insert(ItemId(0), "iron_ore");
        map.insert(ItemId(1), "iron_plate");
        assert_eq!(map[&ItemId(0)], "iron_ore");
        let mut buildings = HashMap::new();
        buildings.insert(BuildingId(3), "constructor");
        assert_eq!(buildings[&BuildingId(3)], "constructor");
    }
}
