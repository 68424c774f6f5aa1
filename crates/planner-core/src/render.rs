//! Rendering production trees.
//!
//! Core never draws anything itself. A [`RenderSink`] receives the world
//! and a finished tree and presents it however it likes; [`OutlineRenderer`]
//! is the plain-text sink shipped with the crate.

use crate::catalog::World;
use crate::tree::{ProductionNode, ProductionTree};
use std::fmt;

/// Consumer of finished production trees.
pub trait RenderSink {
    type Error;

    fn render(&mut self, world: &World, tree: &ProductionTree) -> Result<(), Self::Error>;
}

/// Writes a tree as an indented outline, one node per line:
///
/// ```text
/// 1 Reinforced Iron Plate <- Reinforced Iron Plate @ Assembler
///   6 Iron Plate <- Iron Plate @ Constructor
///     3 Iron Ingot
/// ```
///
/// Raw resources carry no recipe or building suffix.
#[derive(Debug)]
pub struct OutlineRenderer<W> {
    out: W,
    indent: usize,
}

impl<W: fmt::Write> OutlineRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out, indent: 2 }
    }

    /// Spaces per depth level.
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, world: &World, depth: usize, node: &ProductionNode) -> fmt::Result {
        write!(self.out, "{:width$}{}", "", node.label(world), width = depth * self.indent)?;
        if let Some(recipe) = node.recipe.and_then(|id| world.recipe(id)) {
            write!(self.out, " <- {}", recipe.name)?;
        }
        if let Some(building) = node.building.and_then(|id| world.building(id)) {
            write!(self.out, " @ {}", building.name)?;
        }
        writeln!(self.out)
    }
}

impl<W: fmt::Write> RenderSink for OutlineRenderer<W> {
    type Error = fmt::Error;

    fn render(&mut self, world: &World, tree: &ProductionTree) -> Result<(), Self::Error> {
        for (depth, node) in tree.walk() {
            self.line(world, depth, node)?;
        }
        Ok(())
    }
}

/// Render `tree` as an outline string.
pub fn outline(world: &World, tree: &ProductionTree) -> Result<String, fmt::Error> {
    let mut renderer = OutlineRenderer::new(String::new());
    renderer.render(world, tree)?;
    Ok(renderer.into_inner())
}
