//! Production trees and their traversal.
//!
//! A [`ProductionTree`] is a strict tree: every node owns its children and
//! has exactly one parent. Traversal is pre-order (a node is visited before
//! its descendants, siblings in the order they were appended), so the
//! flattened list is deterministic for a given world and request.

use crate::amount::Amount;
use crate::catalog::{ItemAmount, World};
use crate::id::*;

/// One level of a production tree.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductionNode {
    /// Quantities this node stands for. The root may hold several; nodes
    /// created during expansion hold exactly one.
    pub amounts: Vec<ItemAmount>,
    /// `None` for raw resources.
    pub recipe: Option<RecipeId>,
    pub building: Option<BuildingId>,
    pub children: Vec<ProductionNode>,
}

impl ProductionNode {
    pub fn new(amounts: Vec<ItemAmount>, recipe: Option<RecipeId>, building: Option<BuildingId>) -> Self {
        Self {
            amounts,
            recipe,
            building,
            children: Vec::new(),
        }
    }

    /// A node with no recipe: a raw resource requirement.
    pub fn leaf(amount: ItemAmount) -> Self {
        Self::new(vec![amount], None, None)
    }

    pub fn add_child(&mut self, child: ProductionNode) {
        self.children.push(child);
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn is_raw(&self) -> bool {
        self.recipe.is_none()
    }

    /// Display label: `"<amount> <item name>"` per amount, comma separated.
    pub fn label(&self, world: &World) -> String {
        self.amounts
            .iter()
            .map(|a| a.display(world).to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Pre-order iterator over a tree, yielding `(depth, node)`. The root has
/// depth 0.
pub struct PreOrder<'a> {
    stack: Vec<(usize, &'a ProductionNode)>,
}

impl<'a> Iterator for PreOrder<'a> {
    type Item = (usize, &'a ProductionNode);

    fn next(&mut self) -> Option<Self::Item> {
        let (depth, node) = self.stack.pop()?;
        self.stack
            .extend(node.children.iter().rev().map(|child| (depth + 1, child)));
        Some((depth, node))
    }
}

/// A production tree rooted at the requested amounts.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductionTree {
    root: ProductionNode,
}

impl ProductionTree {
    pub fn new(root: ProductionNode) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &ProductionNode {
        &self.root
    }

    pub fn into_root(self) -> ProductionNode {
        self.root
    }

    /// Pre-order walk with depths.
    pub fn walk(&self) -> PreOrder<'_> {
        PreOrder {
            stack: vec![(0, &self.root)],
        }
    }

    /// Pre-order walk.
    pub fn iter(&self) -> impl Iterator<Item = &ProductionNode> {
        self.walk().map(|(_, node)| node)
    }

    /// Flatten in pre-order.
    pub fn nodes(&self) -> Vec<&ProductionNode> {
        self.iter().collect()
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Always false: a tree has at least its root.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Depth of the deepest node (0 for a lone root).
    pub fn depth(&self) -> usize {
        self.walk().map(|(depth, _)| depth).max().unwrap_or(0)
    }

    /// Nodes without children, in pre-order.
    pub fn leaves(&self) -> impl Iterator<Item = &ProductionNode> {
        self.iter().filter(|node| node.is_leaf())
    }

    /// Total raw-resource requirement per item, in first-seen order.
    pub fn raw_totals(&self) -> Vec<ItemAmount> {
        let mut totals: Vec<ItemAmount> = Vec::new();
        for node in self.iter().filter(|node| node.is_raw()) {
            for amount in &node.amounts {
                accumulate(&mut totals, amount.item, amount.amount);
            }
        }
        totals
    }

    /// Node amounts grouped by the recipe producing them, in first-seen
    /// recipe order. Raw nodes are skipped.
    pub fn recipe_totals(&self) -> Vec<RecipeTotal> {
        let mut groups: Vec<RecipeTotal> = Vec::new();
        for node in self.iter() {
            let Some(recipe) = node.recipe else {
                continue;
            };
            let index = match groups.iter().position(|g| g.recipe == recipe) {
                Some(index) => index,
                None => {
                    groups.push(RecipeTotal {
                        recipe,
                        building: node.building,
                        amounts: Vec::new(),
                    });
                    groups.len() - 1
                }
            };
            for amount in &node.amounts {
                accumulate(&mut groups[index].amounts, amount.item, amount.amount);
            }
        }
        groups
    }
}

/// Amounts produced by one recipe across a whole tree.
#[derive(Debug, Clone, PartialEq)]
pub struct RecipeTotal {
    pub recipe: RecipeId,
    pub building: Option<BuildingId>,
    pub amounts: Vec<ItemAmount>,
}

fn accumulate(totals: &mut Vec<ItemAmount>, item: ItemId, amount: Amount) {
    match totals.iter_mut().find(|t| t.item == item) {
        Some(total) => total.amount += amount,
        None => totals.push(ItemAmount::new(item, amount)),
    }
}

/// Flatten a tree in pre-order.
pub fn tree_to_node_list(tree: &ProductionTree) -> Vec<&ProductionNode> {
    tree.nodes()
}
