//! Layout strategies.
//!
//! A strategy is a pure function from a node's own transform and its
//! children's transforms to updated transforms. The tree snapshots those
//! transforms into a [`LayoutFrame`], runs the strategy and writes the result
//! back, so running a strategy twice on unchanged input yields the same
//! output.

use crate::error::UiError;
use crate::foundation::collections::NodeId;
use crate::foundation::math::{Vec2, Vec4};
use crate::ui::property::{PropertyKind, PropertyType, PropertyValue};
use crate::ui::rect_transform::RectTransform;
use crate::ui::tree::UiTree;
use std::fmt;
use thiserror::Error;

/// Invalid layout configuration
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LayoutError {
    /// Flex needs at least one weight
    #[error("flex layout requires at least one weight")]
    EmptyWeights,

    /// Weights must be positive and finite
    #[error("flex weight {0} is not a positive number")]
    InvalidWeight(f32),

    /// Grid dimensions must be non-zero
    #[error("grid layout requires non-zero dimensions, got {cols}x{rows}")]
    EmptyGrid {
        /// Requested column count
        cols: u32,
        /// Requested row count
        rows: u32,
    },
}

/// Main axis of a list or flex layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Direction {
    /// Children run left to right
    Horizontal,
    /// Children run top to bottom
    #[default]
    Vertical,
}

impl Direction {
    /// Index of the main axis in a `Vec2`
    pub fn main(self) -> usize {
        match self {
            Self::Horizontal => 0,
            Self::Vertical => 1,
        }
    }

    /// Index of the cross axis in a `Vec2`
    pub fn cross(self) -> usize {
        1 - self.main()
    }
}

impl PropertyType for Direction {
    const KIND: PropertyKind = PropertyKind::Enum;

    fn from_value(value: PropertyValue) -> Option<Self> {
        match value {
            PropertyValue::Enum(0) => Some(Self::Horizontal),
            PropertyValue::Enum(1) => Some(Self::Vertical),
            _ => None,
        }
    }

    fn into_value(self) -> PropertyValue {
        PropertyValue::Enum(self.main() as u32)
    }
}

impl From<Direction> for PropertyValue {
    fn from(direction: Direction) -> Self {
        direction.into_value()
    }
}

/// Snapshot handed to a [`Layouter`]
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutFrame {
    /// The laid-out node itself
    pub own: RectTransform,
    /// Content size of the node's parent
    pub parent_size: Vec2,
    /// Children in declaration order
    pub children: Vec<RectTransform>,
}

impl LayoutFrame {
    /// Content size children are resolved against
    pub fn content_size(&self) -> Vec2 {
        self.own.content_size(self.parent_size)
    }
}

/// A layout strategy
pub trait Layouter: fmt::Debug {
    /// Update `frame` in place
    fn layout(&self, frame: &mut LayoutFrame);
}

// Anchor components per axis: (min, max) indices into the edge vector.
fn anchor_indices(axis: usize) -> (usize, usize) {
    if axis == 0 { (0, 2) } else { (1, 3) }
}

fn set_anchor_axis(anchor: &mut Vec4, axis: usize, min: f32, max: f32) {
    let (lo, hi) = anchor_indices(axis);
    anchor[lo] = min;
    anchor[hi] = max;
}

fn set_margin_axis(margin: &mut Vec4, axis: usize, lead: f32, trail: f32) {
    let (lo, hi) = anchor_indices(axis);
    margin[lo] = lead;
    margin[hi] = trail;
}

/// Put the pivot-adjusted position on `axis` so the anchored box starts at
/// the anchor edge.
fn align_to_anchor(child: &mut RectTransform, parent: Vec2, axis: usize) {
    let content = child.content_size(parent);
    child.position[axis] = child.pivot[axis] * content[axis];
}

/// Stacks children along one axis and stretches them across the other.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct List {
    /// Main axis
    pub direction: Direction,
    /// Gap between consecutive children
    pub spacing: f32,
}

impl List {
    /// Create a list layout
    pub fn new(direction: Direction, spacing: f32) -> Self {
        Self { direction, spacing }
    }
}

impl Layouter for List {
    fn layout(&self, frame: &mut LayoutFrame) {
        let parent = frame.content_size();
        let main = self.direction.main();
        let cross = self.direction.cross();
        let mut cursor = 0.0;

        for child in &mut frame.children {
            set_anchor_axis(&mut child.anchor, cross, 0.0, 1.0);
            set_anchor_axis(&mut child.anchor, main, 0.0, 0.0);
            align_to_anchor(child, parent, cross);

            let content = child.content_size(parent);
            child.position[main] = cursor + child.pivot[main] * content[main];
            cursor += child.outer_size(parent)[main] + self.spacing;
        }
    }
}

/// Splits the parent's main axis between children by weight.
#[derive(Debug, Clone, PartialEq)]
pub struct Flex {
    direction: Direction,
    weights: Vec<f32>,
    spacing: f32,
}

impl Flex {
    /// Create a flex layout. Children past the end of `weights` use the
    /// smallest declared weight.
    pub fn new(direction: Direction, weights: Vec<f32>, spacing: f32) -> Result<Self, LayoutError> {
        if weights.is_empty() {
            return Err(LayoutError::EmptyWeights);
        }
        if let Some(bad) = weights.iter().find(|w| !w.is_finite() || **w <= 0.0) {
            return Err(LayoutError::InvalidWeight(*bad));
        }
        Ok(Self { direction, weights, spacing })
    }

    /// Declared weights
    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    fn min_weight(&self) -> f32 {
        self.weights.iter().copied().fold(f32::INFINITY, f32::min)
    }

    fn weight(&self, index: usize) -> f32 {
        self.weights.get(index).copied().unwrap_or_else(|| self.min_weight())
    }

    /// Anchor ranges `(start, end)` for `count` children
    pub fn partition(&self, count: usize) -> Vec<(f32, f32)> {
        let overflow = count.saturating_sub(self.weights.len());
        #[allow(clippy::cast_precision_loss)]
        let effective_sum = self.weights.iter().sum::<f32>() + overflow as f32 * self.min_weight();

        let mut start = 0.0;
        (0..count)
            .map(|i| {
                let end = start + self.weight(i) / effective_sum;
                let range = (start, end);
                start = end;
                range
            })
            .collect()
    }
}

impl Layouter for Flex {
    fn layout(&self, frame: &mut LayoutFrame) {
        let parent = frame.content_size();
        let main = self.direction.main();
        let cross = self.direction.cross();
        let count = frame.children.len();
        let half = self.spacing * 0.5;

        for (i, (child, (start, end))) in frame.children.iter_mut().zip(self.partition(count)).enumerate() {
            set_anchor_axis(&mut child.anchor, main, start, end);
            set_anchor_axis(&mut child.anchor, cross, 0.0, 1.0);
            let lead = if i > 0 { half } else { 0.0 };
            let trail = if i + 1 < count { half } else { 0.0 };
            set_margin_axis(&mut child.margin, main, lead, trail);
            align_to_anchor(child, parent, main);
            align_to_anchor(child, parent, cross);
        }
    }
}

/// Places children in a fixed grid, row by row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Grid {
    cols: u32,
    rows: u32,
    spacing: f32,
}

impl Grid {
    /// Create a grid layout
    pub fn new(cols: u32, rows: u32, spacing: f32) -> Result<Self, LayoutError> {
        if cols == 0 || rows == 0 {
            return Err(LayoutError::EmptyGrid { cols, rows });
        }
        Ok(Self { cols, rows, spacing })
    }

    /// `(column, row)` of the child at `index`
    pub fn cell(&self, index: usize) -> (u32, u32) {
        let index = u32::try_from(index).unwrap_or(u32::MAX);
        (index % self.cols, index / self.cols)
    }
}

impl Layouter for Grid {
    #[allow(clippy::cast_precision_loss)]
    fn layout(&self, frame: &mut LayoutFrame) {
        let parent = frame.content_size();
        let half = self.spacing * 0.5;
        let (cw, rh) = (1.0 / self.cols as f32, 1.0 / self.rows as f32);

        for (i, child) in frame.children.iter_mut().enumerate() {
            let (col, row) = self.cell(i);
            set_anchor_axis(&mut child.anchor, 0, col as f32 * cw, (col + 1) as f32 * cw);
            set_anchor_axis(&mut child.anchor, 1, row as f32 * rh, (row + 1) as f32 * rh);

            let left = if col > 0 { half } else { 0.0 };
            let right = if col + 1 < self.cols { half } else { 0.0 };
            let top = if row > 0 { half } else { 0.0 };
            let bottom = if row + 1 < self.rows { half } else { 0.0 };
            child.margin = Vec4::new(left, top, right, bottom);

            align_to_anchor(child, parent, 0);
            align_to_anchor(child, parent, 1);
        }
    }
}

/// Sizes the node vertically to fit its children.
///
/// Children are measured in the node's content frame, so `size.y` becomes
/// the lowest child edge plus `extra`. The node's own margin and border sit
/// outside that content on a fixed axis, which makes its outer height
/// `lowest + extra + margin + border`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AutoHeight {
    /// Added below the lowest child
    pub extra: f32,
}

impl AutoHeight {
    /// Create an auto-height layout
    pub fn new(extra: f32) -> Self {
        Self { extra }
    }
}

impl Layouter for AutoHeight {
    fn layout(&self, frame: &mut LayoutFrame) {
        let parent = frame.content_size();
        let lowest = frame
            .children
            .iter()
            .map(|child| child.outer_bounds(parent).bottom())
            .fold(0.0_f32, f32::max);

        // Fixed vertical extent; margin and border stay outside the content.
        frame.own.anchor.w = frame.own.anchor.y;
        frame.own.size.y = lowest + self.extra;
    }
}

/// Runs several strategies in order on the same frame.
#[derive(Debug, Default)]
pub struct LayoutChain {
    steps: Vec<Box<dyn Layouter>>,
}

impl LayoutChain {
    /// Create an empty chain
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a step (builder pattern)
    pub fn then(mut self, step: impl Layouter + 'static) -> Self {
        self.steps.push(Box::new(step));
        self
    }
}

impl Layouter for LayoutChain {
    fn layout(&self, frame: &mut LayoutFrame) {
        for step in &self.steps {
            step.layout(frame);
        }
    }
}

/// Install `layouter` on `id`, lay it out once and report configuration errors.
pub fn apply(tree: &mut UiTree, id: NodeId, layouter: Result<impl Layouter + 'static, LayoutError>) -> Result<(), UiError> {
    tree.set_layouter(id, layouter?)?;
    tree.run_layout(id);
    Ok(())
}
