//! UI render commands
//!
//! Clipping uses one stencil bit-plane per mask nesting level. A mask at
//! depth `d` owns bit `1 << d`; the reference value for content inside it is
//! `(1 << (d + 1)) - 1`, i.e. every bit up to and including its own, so a
//! fragment passes only where all enclosing masks have written their bit.

use crate::foundation::collections::NodeId;
use crate::foundation::math::{Mat4, Point3, Vec2, Vec4};
use crate::ui::context::TextureHandle;

/// Stencil comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StencilFunc {
    /// Always passes
    Always,
    /// Passes when `(stored & read_mask) == (reference & read_mask)`
    Equal,
}

/// What happens to the stored value when the test passes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StencilOp {
    /// Leave the stored value alone
    Keep,
    /// Write `reference` through `write_mask`
    Replace,
}

/// A complete stencil configuration for one draw
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StencilState {
    /// Comparison
    pub func: StencilFunc,
    /// Reference value
    pub reference: u8,
    /// Bits compared
    pub read_mask: u8,
    /// Bits written
    pub write_mask: u8,
    /// Operation on pass
    pub op: StencilOp,
}

impl StencilState {
    /// Reference value for content inside the mask at `depth`: 1, 3, 7, ...
    pub fn mask_reference(depth: u32) -> u8 {
        if depth >= 7 {
            return u8::MAX;
        }
        u8::try_from((1u32 << (depth + 1)) - 1).unwrap_or(u8::MAX)
    }

    /// Write mask used by the mask at `depth`: the full mask at depth 0,
    /// otherwise its reference.
    pub fn mask_write_mask(depth: u32) -> u8 {
        if depth == 0 { u8::MAX } else { Self::mask_reference(depth) }
    }

    /// Drawn before a mask's children: set this depth's bit inside the rect.
    ///
    /// At depth 0 the bit is written unconditionally (clearing stale
    /// planes); deeper masks only write where the parent mask passed.
    pub fn mask_on(depth: u32) -> Self {
        let reference = Self::mask_reference(depth);
        let write_mask = Self::mask_write_mask(depth);
        match depth.checked_sub(1) {
            None => Self { func: StencilFunc::Always, reference, read_mask: u8::MAX, write_mask, op: StencilOp::Replace },
            Some(parent) => Self {
                func: StencilFunc::Equal,
                reference,
                read_mask: Self::mask_reference(parent),
                write_mask,
                op: StencilOp::Replace,
            },
        }
    }

    /// Drawn after a mask's children: clear this depth's bit inside the rect.
    pub fn mask_off(depth: u32) -> Self {
        match depth.checked_sub(1) {
            None => Self { func: StencilFunc::Always, reference: 0, read_mask: u8::MAX, write_mask: u8::MAX, op: StencilOp::Replace },
            Some(parent) => Self {
                func: StencilFunc::Always,
                reference: Self::mask_reference(parent),
                read_mask: u8::MAX,
                write_mask: Self::mask_reference(depth) & !Self::mask_reference(parent),
                op: StencilOp::Replace,
            },
        }
    }

    /// Test-only state for content drawn inside the mask at `depth`
    pub fn inside_mask(depth: u32) -> Self {
        let reference = Self::mask_reference(depth);
        Self { func: StencilFunc::Equal, reference, read_mask: reference, write_mask: 0, op: StencilOp::Keep }
    }

    /// Evaluate this state against a stored stencil value.
    ///
    /// Returns whether the fragment passes and the stored value afterwards.
    pub fn apply(&self, stored: u8) -> (bool, u8) {
        let passes = match self.func {
            StencilFunc::Always => true,
            StencilFunc::Equal => (stored & self.read_mask) == (self.reference & self.read_mask),
        };
        let next = match (passes, self.op) {
            (true, StencilOp::Replace) => (stored & !self.write_mask) | (self.reference & self.write_mask),
            _ => stored,
        };
        (passes, next)
    }
}

/// One paintable node, in paint order
#[derive(Debug, Clone, PartialEq)]
pub struct RenderItem {
    /// Source node
    pub node: NodeId,
    /// Local-to-world matrix of the node's rect (origin at its top-left)
    pub matrix: Mat4,
    /// Content size of the rect
    pub size: Vec2,
    /// Sequential paint order
    pub order: u32,
    /// RGBA color
    pub color: Vec4,
    /// Optional texture
    pub texture: Option<TextureHandle>,
    /// Optional text run
    pub text: Option<String>,
    /// Font size for `text`
    pub font_size: f32,
    /// Stencil operation, `None` when unclipped
    pub stencil: Option<StencilState>,
}

impl RenderItem {
    /// Whether the item's rect covers a point in world `z = 0` screen space
    pub fn covers(&self, point: Vec2) -> bool {
        let Some(inverse) = self.matrix.try_inverse() else {
            return false;
        };
        let local = inverse.transform_point(&Point3::new(point.x, point.y, 0.0));
        local.x >= 0.0 && local.y >= 0.0 && local.x <= self.size.x && local.y <= self.size.y
            && self.size.x > 0.0 && self.size.y > 0.0
    }
}

/// Replay the paint list at a single point through a CPU stencil buffer and
/// return the nodes whose fragments survive, in paint order.
///
/// Mask sentinels only touch the stencil and are not reported.
pub fn sample_point(items: &[RenderItem], point: Vec2) -> Vec<NodeId> {
    let mut stored = 0u8;
    let mut visible = Vec::new();
    for item in items.iter().filter(|item| item.covers(point)) {
        match item.stencil {
            Some(state) if state.op == StencilOp::Replace => {
                stored = state.apply(stored).1;
            }
            Some(state) => {
                if state.apply(stored).0 {
                    visible.push(item.node);
                }
            }
            None => visible.push(item.node),
        }
    }
    visible
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_mask_references() {
        let refs: Vec<u8> = (0..3).map(StencilState::mask_reference).collect();
        assert_eq!(refs, vec![1, 3, 7]);
        let writes: Vec<u8> = (0..3).map(StencilState::mask_write_mask).collect();
        assert_eq!(writes, vec![0xFF, 3, 7]);
        assert_eq!(StencilState::mask_reference(12), 0xFF);
    }

    #[test]
    fn test_mask_on_off_sequence() {
        // Outer mask covers the point, inner mask covers it too.
        let mut stored = 0u8;
        stored = StencilState::mask_on(0).apply(stored).1;
        assert_eq!(stored, 1);
        assert!(StencilState::inside_mask(0).apply(stored).0);
        assert!(!StencilState::inside_mask(1).apply(stored).0);

        stored = StencilState::mask_on(1).apply(stored).1;
        assert_eq!(stored, 3);
        assert!(StencilState::inside_mask(1).apply(stored).0);

        stored = StencilState::mask_off(1).apply(stored).1;
        assert_eq!(stored, 1);
        assert!(StencilState::inside_mask(0).apply(stored).0);

        stored = StencilState::mask_off(0).apply(stored).1;
        assert_eq!(stored, 0);
    }

    #[test]
    fn test_inner_mask_cannot_escape_outer() {
        // Point outside the outer mask: the inner mask's write must fail.
        let (passes, stored) = StencilState::mask_on(1).apply(0);
        assert!(!passes);
        assert_eq!(stored, 0);
        assert!(!StencilState::inside_mask(1).apply(stored).0);
    }
}
