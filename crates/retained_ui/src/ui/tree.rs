//! The UI arena: node ownership, property routing, the update tick, hit
//! testing, event delivery and paint extraction.
//!
//! All per-node callbacks (property setters, event handlers, update handlers)
//! receive `&mut UiTree`, so they may restyle, add or remove nodes while they
//! run. The tree detaches the callbacks it is about to invoke and reattaches
//! them afterwards only if their node still exists; traversals snapshot child
//! lists and re-check membership before descending.

use crate::error::{UiError, UiResult};
use crate::events::{Event, EventHandler, EventType};
use crate::foundation::collections::{NodeId, NodeMap};
use crate::foundation::math::{Mat4, Quat, Ray, Vec2, Vec3, Vec4};
use crate::input::collision;
use crate::render::commands::{RenderItem, StencilState};
use crate::ui::layout::{LayoutFrame, Layouter};
use crate::ui::node::{Node, NodeFlags, Paint, UpdateFn};
use crate::ui::property::{PropertyKind, PropertyType, PropertyValue, Setter};
use crate::ui::rect_transform::{Rect, RectTransform};

/// Result of a successful hit test
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    /// Deepest node under the ray
    pub node: NodeId,
    /// Hit point in the node's local frame
    pub local: Vec2,
    /// Hit point in world space
    pub world_point: Vec3,
}

/// Arena of UI nodes plus the list of live roots.
#[derive(Debug)]
pub struct UiTree {
    nodes: NodeMap<Node>,
    roots: Vec<NodeId>,
    screen_size: Vec2,
}

impl UiTree {
    /// Create an empty tree whose roots are sized against `screen_size`
    pub fn new(screen_size: Vec2) -> Self {
        Self { nodes: NodeMap::with_key(), roots: Vec::new(), screen_size }
    }

    /// Number of live nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the arena is empty
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether `id` refers to a live node
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Borrow a node
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    fn node_mut(&mut self, id: NodeId) -> UiResult<&mut Node> {
        self.nodes.get_mut(id).ok_or(UiError::NodeNotFound(id))
    }

    /// Size the roots are laid out against
    pub fn screen_size(&self) -> Vec2 {
        self.screen_size
    }

    /// Resize the root frame; layouts pick it up on the next update
    pub fn set_screen_size(&mut self, size: Vec2) {
        self.screen_size = size;
    }

    // ------------------------------------------------------------------
    // Construction and ownership
    // ------------------------------------------------------------------

    /// Create a detached node with the standard transform and flag
    /// properties registered.
    pub fn create_node(&mut self) -> NodeId {
        let id = self.nodes.insert(Node::new());
        if let Err(err) = self.register_standard_properties(id) {
            // Fresh table, names are unique.
            log::error!("Failed to register standard properties: {}", err);
        }
        log::trace!("Created node {:?}", id);
        id
    }

    /// Create a detached node with a debug name
    pub fn create_named(&mut self, name: &str) -> NodeId {
        let id = self.create_node();
        if let Some(node) = self.nodes.get_mut(id) {
            node.name = Some(name.to_string());
        }
        id
    }

    fn register_standard_properties(&mut self, id: NodeId) -> UiResult<()> {
        self.observe::<Vec3, _>(id, "position", |tree, id, v| {
            tree.transform_mut(id)?.position = v;
            Ok(())
        })?;
        self.observe::<Vec2, _>(id, "size", |tree, id, v| {
            tree.transform_mut(id)?.size = v;
            Ok(())
        })?;
        self.observe::<Vec4, _>(id, "anchor", |tree, id, v| {
            tree.transform_mut(id)?.anchor = v;
            Ok(())
        })?;
        self.observe::<Vec4, _>(id, "margin", |tree, id, v| {
            tree.transform_mut(id)?.margin = v;
            Ok(())
        })?;
        self.observe::<Vec4, _>(id, "border", |tree, id, v| {
            tree.transform_mut(id)?.border = v;
            Ok(())
        })?;
        self.observe::<Vec2, _>(id, "pivot", |tree, id, v| {
            tree.transform_mut(id)?.pivot = v;
            Ok(())
        })?;
        self.observe::<Vec3, _>(id, "rotation", |tree, id, v| {
            tree.transform_mut(id)?.rotation = Quat::from_euler_angles(v.x, v.y, v.z);
            Ok(())
        })?;
        self.observe::<Vec3, _>(id, "scale", |tree, id, v| {
            tree.transform_mut(id)?.scale = v;
            Ok(())
        })?;
        self.observe::<bool, _>(id, "raycast_disabled", |tree, id, v| {
            tree.set_flag(id, NodeFlags::RAYCAST_DISABLED, v)
        })?;
        self.observe::<bool, _>(id, "drag_events", |tree, id, v| {
            tree.set_flag(id, NodeFlags::DRAG_EVENTS, v)
        })?;
        self.observe::<bool, _>(id, "visible", |tree, id, v| tree.set_flag(id, NodeFlags::HIDDEN, !v))?;
        Ok(())
    }

    /// Register `id` as a live root, laid out against the screen size.
    pub fn add_root(&mut self, id: NodeId) -> UiResult<()> {
        let node = self.node_mut(id)?;
        if node.parent.is_some() {
            return Err(UiError::Build(format!("node {id:?} already has a parent")));
        }
        if !self.roots.contains(&id) {
            self.roots.push(id);
        }
        self.set_attached(id, true);
        self.run_layout(id);
        log::debug!("Added root {:?}", id);
        Ok(())
    }

    /// Live roots in paint order
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Follow client-area redirection from `id` to the node that actually
    /// receives children.
    pub fn resolve_client_area(&self, id: NodeId) -> NodeId {
        let mut target = id;
        // Bounded walk so a misconfigured cycle cannot spin forever.
        for _ in 0..self.nodes.len() {
            match self.nodes.get(target).and_then(|n| n.client_area) {
                Some(area) if area != target && self.contains(area) => target = area,
                _ => break,
            }
        }
        target
    }

    /// Append `child` to `parent`'s client area and re-run that node's
    /// layout. Returns the node that received the child.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> UiResult<NodeId> {
        if !self.contains(parent) {
            return Err(UiError::NodeNotFound(parent));
        }
        if !self.contains(child) {
            return Err(UiError::NodeNotFound(child));
        }
        let target = self.resolve_client_area(parent);
        if self.is_ancestor_or_self(child, target) {
            return Err(UiError::Build(format!("adding {child:?} under {target:?} would create a cycle")));
        }

        self.detach(child);
        self.node_mut(target)?.children.push(child);
        self.node_mut(child)?.parent = Some(target);

        let attached = self.nodes.get(target).is_some_and(|n| n.attached);
        self.set_attached(child, attached);
        self.run_layout(target);
        log::trace!("Added {:?} to {:?} (requested {:?})", child, target, parent);
        Ok(target)
    }

    /// Unlink `id` from its parent or from the root list without destroying it.
    fn detach(&mut self, id: NodeId) {
        let parent = self.nodes.get(id).and_then(|n| n.parent);
        if let Some(parent) = parent {
            if let Some(p) = self.nodes.get_mut(parent) {
                p.children.retain(|c| *c != id);
            }
        }
        self.roots.retain(|r| *r != id);
        if let Some(node) = self.nodes.get_mut(id) {
            node.parent = None;
        }
        self.set_attached(id, false);
    }

    fn set_attached(&mut self, id: NodeId, attached: bool) {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.get_mut(current) {
                node.attached = attached;
                stack.extend(node.children.iter().copied());
            }
        }
    }

    /// Destroy `id` and its whole subtree. Returns `false` if it was already gone.
    pub fn remove(&mut self, id: NodeId) -> bool {
        if !self.contains(id) {
            return false;
        }
        self.detach(id);
        let mut stack = vec![id];
        let mut removed = 0usize;
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.remove(current) {
                stack.extend(node.children);
                removed += 1;
            }
        }
        log::debug!("Removed {:?} ({} nodes)", id, removed);
        true
    }

    /// Parent of `id`
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id).and_then(|n| n.parent)
    }

    /// Children of `id` in paint order (empty for unknown nodes)
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(id).map_or(&[], |n| n.children.as_slice())
    }

    /// Client-area redirect of `id`
    pub fn client_area(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id).and_then(|n| n.client_area)
    }

    /// Redirect children added to `id` into `area`
    pub fn set_client_area(&mut self, id: NodeId, area: NodeId) -> UiResult<()> {
        if !self.contains(area) {
            return Err(UiError::NodeNotFound(area));
        }
        self.node_mut(id)?.client_area = Some(area);
        Ok(())
    }

    /// `id` followed by its ancestors up to the root
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut chain = Vec::new();
        let mut current = self.contains(id).then_some(id);
        while let Some(node) = current {
            chain.push(node);
            current = self.parent(node);
        }
        chain
    }

    /// Whether `ancestor` is `id` or one of its ancestors
    pub fn is_ancestor_or_self(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.parent(node);
        }
        false
    }

    /// Set a debug name
    pub fn set_name(&mut self, id: NodeId, name: &str) -> UiResult<()> {
        self.node_mut(id)?.name = Some(name.to_string());
        Ok(())
    }

    // ------------------------------------------------------------------
    // Transform, flags and paint access
    // ------------------------------------------------------------------

    /// Placement of `id`
    pub fn transform(&self, id: NodeId) -> Option<&RectTransform> {
        self.nodes.get(id).map(|n| &n.transform)
    }

    /// Mutable placement of `id`
    pub fn transform_mut(&mut self, id: NodeId) -> UiResult<&mut RectTransform> {
        Ok(&mut self.node_mut(id)?.transform)
    }

    /// Flags of `id` (empty for unknown nodes)
    pub fn flags(&self, id: NodeId) -> NodeFlags {
        self.nodes.get(id).map_or(NodeFlags::empty(), |n| n.flags)
    }

    /// Switch `flag` on or off
    pub fn set_flag(&mut self, id: NodeId, flag: NodeFlags, on: bool) -> UiResult<()> {
        self.node_mut(id)?.flags.set(flag, on);
        Ok(())
    }

    /// Whether `id` has not been hidden
    pub fn is_visible(&self, id: NodeId) -> bool {
        self.contains(id) && !self.flags(id).contains(NodeFlags::HIDDEN)
    }

    /// Whether `id` sits under a live root
    pub fn is_attached(&self, id: NodeId) -> bool {
        self.nodes.get(id).is_some_and(|n| n.attached)
    }

    /// Enclosing mask count computed by the last update
    pub fn clip_depth(&self, id: NodeId) -> u32 {
        self.nodes.get(id).map_or(0, |n| n.clip_depth)
    }

    /// Paint payload of `id`
    pub fn paint(&self, id: NodeId) -> Option<&Paint> {
        self.nodes.get(id).and_then(|n| n.paint.as_ref())
    }

    /// Mutable paint payload of `id`
    pub fn paint_mut(&mut self, id: NodeId) -> Option<&mut Paint> {
        self.nodes.get_mut(id).and_then(|n| n.paint.as_mut())
    }

    /// Replace the paint payload of `id`
    pub fn set_paint(&mut self, id: NodeId, paint: Option<Paint>) -> UiResult<()> {
        self.node_mut(id)?.paint = paint;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Geometry
    // ------------------------------------------------------------------

    /// Content size of `id`'s parent frame.
    ///
    /// Roots use the screen size; detached nodes see a zero-sized parent.
    pub fn parent_size(&self, id: NodeId) -> Vec2 {
        match self.parent(id) {
            Some(parent) => self.content_size(parent),
            None if self.roots.contains(&id) => self.screen_size,
            None => Vec2::zeros(),
        }
    }

    /// Content size of `id`. Walks the parent chain: O(depth).
    pub fn content_size(&self, id: NodeId) -> Vec2 {
        self.nodes
            .get(id)
            .map_or_else(Vec2::zeros, |n| n.transform.content_size(self.parent_size(id)))
    }

    /// Content rect of `id` in its own frame. O(depth).
    pub fn rect(&self, id: NodeId) -> Rect {
        let size = self.content_size(id);
        Rect::new(0.0, 0.0, size.x, size.y)
    }

    /// Outer box `id` occupies in its parent frame. O(depth).
    pub fn outer_bounds(&self, id: NodeId) -> Rect {
        self.nodes
            .get(id)
            .map_or(Rect::ZERO, |n| n.transform.outer_bounds(self.parent_size(id)))
    }

    /// Local-to-world matrix of `id`.
    ///
    /// Multiplies every ancestor's local matrix, so each call is O(depth) and
    /// re-resolves parent sizes along the way. Traversals (hit test, paint)
    /// carry the parent matrix down instead of calling this per node.
    pub fn world_matrix(&self, id: NodeId) -> Mat4 {
        let Some(node) = self.nodes.get(id) else {
            return Mat4::identity();
        };
        let local = node.transform.local_matrix(self.parent_size(id));
        match node.parent {
            Some(parent) => self.world_matrix(parent) * local,
            None => local,
        }
    }

    // ------------------------------------------------------------------
    // Properties
    // ------------------------------------------------------------------

    /// Register a typed setter for `name` on `id`
    pub fn observe<T, F>(&mut self, id: NodeId, name: &str, setter: F) -> UiResult<()>
    where
        T: PropertyType,
        F: FnMut(&mut UiTree, NodeId, T) -> Result<(), UiError> + 'static,
    {
        self.node_mut(id)?.observer.observe::<T, F>(name, setter)?;
        Ok(())
    }

    /// Register an untyped setter for `name` on `id`
    pub fn observe_raw(&mut self, id: NodeId, name: &str, kind: PropertyKind, setter: Setter) -> UiResult<()> {
        self.node_mut(id)?.observer.observe_raw(name, kind, setter)?;
        Ok(())
    }

    /// Kind registered for `name` on `id`
    pub fn observed_kind(&self, id: NodeId, name: &str) -> Option<PropertyKind> {
        self.nodes.get(id).and_then(|n| n.observer.kind_of(name))
    }

    /// Set a named property.
    ///
    /// Unobserved names are ignored. Values are converted to the registered
    /// kind first; an unconvertible value fails without running any setter.
    /// Every setter runs in registration order; the first error is returned.
    pub fn set(&mut self, id: NodeId, name: &str, value: impl Into<PropertyValue>) -> UiResult<()> {
        let prepared = self.node_mut(id)?.observer.prepare(name, value.into())?;
        let Some((value, mut setters)) = prepared else {
            log::trace!("Ignoring unobserved property '{}' on {:?}", name, id);
            return Ok(());
        };

        let mut result = Ok(());
        for setter in &mut setters {
            if let Err(err) = setter(self, id, value.clone()) {
                if result.is_ok() {
                    result = Err(err);
                }
            }
        }

        if let Some(node) = self.nodes.get_mut(id) {
            node.observer.restore(name, setters);
        }
        result
    }

    // ------------------------------------------------------------------
    // Layout and update tick
    // ------------------------------------------------------------------

    /// Install the layout strategy of `id`
    pub fn set_layouter(&mut self, id: NodeId, layouter: impl Layouter + 'static) -> UiResult<()> {
        self.node_mut(id)?.layouter = Some(Box::new(layouter));
        Ok(())
    }

    /// Remove the layout strategy of `id`
    pub fn clear_layouter(&mut self, id: NodeId) -> UiResult<()> {
        self.node_mut(id)?.layouter = None;
        Ok(())
    }

    /// Run the layout strategy of `id` once against its current children.
    pub fn run_layout(&mut self, id: NodeId) {
        let Some(node) = self.nodes.get(id) else {
            return;
        };
        if node.layouter.is_none() {
            return;
        }
        let child_ids = node.children.clone();
        let mut frame = LayoutFrame {
            own: node.transform.clone(),
            parent_size: self.parent_size(id),
            children: child_ids
                .iter()
                .filter_map(|c| self.nodes.get(*c).map(|n| n.transform.clone()))
                .collect(),
        };
        if frame.children.len() != child_ids.len() {
            log::warn!("Node {:?} lists children that no longer exist", id);
            return;
        }

        if let Some(layouter) = self.nodes.get(id).and_then(|n| n.layouter.as_ref()) {
            layouter.layout(&mut frame);
        }

        if let Some(node) = self.nodes.get_mut(id) {
            node.transform = frame.own;
        }
        for (child, transform) in child_ids.into_iter().zip(frame.children) {
            if let Some(node) = self.nodes.get_mut(child) {
                node.transform = transform;
            }
        }
    }

    /// Register a per-tick callback on `id`, run before its children update
    pub fn on_update<F>(&mut self, id: NodeId, handler: F) -> UiResult<()>
    where
        F: FnMut(&mut UiTree, NodeId, f32) -> Result<(), UiError> + 'static,
    {
        let boxed: UpdateFn = Box::new(handler);
        self.node_mut(id)?.update_handlers.push(boxed);
        Ok(())
    }

    /// Register a per-tick callback on `id`, run after its subtree and its own
    /// layout strategy have finished for the tick
    pub fn on_late_update<F>(&mut self, id: NodeId, handler: F) -> UiResult<()>
    where
        F: FnMut(&mut UiTree, NodeId, f32) -> Result<(), UiError> + 'static,
    {
        let boxed: UpdateFn = Box::new(handler);
        self.node_mut(id)?.late_update_handlers.push(boxed);
        Ok(())
    }

    /// Depth-first tick over every root.
    ///
    /// Update handlers run pre-order with the enclosing mask count already
    /// stored on the node; layout strategies run post-order so a container
    /// measures children that have finished their own layout. Late update
    /// handlers run right after the node's own layout.
    pub fn update(&mut self, dt: f32) {
        let roots = self.roots.clone();
        for root in roots {
            if self.roots.contains(&root) {
                self.update_node(root, 0, dt);
            }
        }
    }

    fn update_node(&mut self, id: NodeId, depth: u32, dt: f32) {
        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };
        node.clip_depth = depth;
        self.run_update_handlers(id, dt, false);

        let Some(node) = self.nodes.get(id) else {
            return;
        };
        let child_depth = depth + u32::from(node.flags.contains(NodeFlags::MASKED));
        let children = node.children.clone();
        for child in children {
            if self.parent(child) == Some(id) {
                self.update_node(child, child_depth, dt);
            }
        }
        self.run_layout(id);
        self.run_update_handlers(id, dt, true);
    }

    fn run_update_handlers(&mut self, id: NodeId, dt: f32, late: bool) {
        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };
        let slot = if late { &mut node.late_update_handlers } else { &mut node.update_handlers };
        if slot.is_empty() {
            return;
        }
        let mut handlers = std::mem::take(slot);

        for handler in &mut handlers {
            if let Err(err) = handler(self, id, dt) {
                log::error!("Update handler on {:?} failed: {}", id, err);
            }
        }

        // Handlers registered while running are kept after the existing ones.
        if let Some(node) = self.nodes.get_mut(id) {
            let slot = if late { &mut node.late_update_handlers } else { &mut node.update_handlers };
            handlers.append(slot);
            *slot = handlers;
        }
    }

    // ------------------------------------------------------------------
    // Hit testing
    // ------------------------------------------------------------------

    /// Find the node under a world-space ray.
    ///
    /// Roots and children are tried last-declared first; the first hit wins.
    /// A masked node that is missed hides its whole subtree.
    pub fn hit_test(&self, ray: &Ray) -> Option<Hit> {
        let identity = Mat4::identity();
        self.roots.iter().rev().find_map(|root| {
            if self.flags(*root).intersects(NodeFlags::RAYCAST_DISABLED | NodeFlags::HIDDEN) {
                return None;
            }
            self.hit_node(*root, &identity, self.screen_size, ray)
        })
    }

    fn hit_node(&self, id: NodeId, parent_matrix: &Mat4, parent_size: Vec2, ray: &Ray) -> Option<Hit> {
        let node = self.nodes.get(id)?;
        let world = parent_matrix * node.transform.local_matrix(parent_size);
        let content = node.transform.content_size(parent_size);
        let own = collision::ray_hits_rect(ray, &world, &Rect::new(0.0, 0.0, content.x, content.y));

        if own.is_none() && node.flags.contains(NodeFlags::MASKED) {
            return None;
        }

        let child_hit = node.children.iter().rev().find_map(|child| {
            if self.flags(*child).intersects(NodeFlags::RAYCAST_DISABLED | NodeFlags::HIDDEN) {
                return None;
            }
            self.hit_node(*child, &world, content, ray)
        });

        child_hit.or_else(|| own.map(|(local, world_point)| Hit { node: id, local, world_point }))
    }

    // ------------------------------------------------------------------
    // Events
    // ------------------------------------------------------------------

    /// Register an event handler on `id`
    pub fn on<F>(&mut self, id: NodeId, event_type: EventType, handler: F) -> UiResult<()>
    where
        F: FnMut(&mut UiTree, &mut Event) -> Result<(), UiError> + 'static,
    {
        let boxed: Box<dyn EventHandler> = Box::new(handler);
        self.node_mut(id)?.events.register_handler(event_type, boxed);
        Ok(())
    }

    /// Run `id`'s handlers for `event`. Handler errors are logged and do not
    /// keep later handlers from running.
    pub fn dispatch_to(&mut self, id: NodeId, event: &mut Event) {
        event.current = id;
        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };
        if !node.events.has_handlers(event.event_type) {
            return;
        }
        let mut handlers = node.events.take(event.event_type);
        log::trace!("Dispatching {:?} to {:?} ({} handlers)", event.event_type, id, handlers.len());

        for handler in &mut handlers {
            if let Err(err) = handler.on_event(self, event) {
                log::error!("{:?} handler on {:?} failed: {}", event.event_type, id, err);
            }
        }

        if let Some(node) = self.nodes.get_mut(id) {
            node.events.restore(event.event_type, handlers);
        }
    }

    /// Deliver `event` to `from` and then up the ancestor chain, stopping
    /// before `stop_at`, when a handler stops propagation, or after the first
    /// node for non-bubbling event types.
    pub fn bubble(&mut self, from: NodeId, event: &mut Event, stop_at: Option<NodeId>) {
        let mut current = self.contains(from).then_some(from);
        while let Some(id) = current {
            if Some(id) == stop_at {
                break;
            }
            let parent = self.parent(id);
            self.dispatch_to(id, event);
            if event.is_propagation_stopped() || !event.event_type.bubbles() {
                break;
            }
            current = parent.filter(|p| self.contains(*p));
        }
    }

    // ------------------------------------------------------------------
    // Paint extraction
    // ------------------------------------------------------------------

    /// Collect render items for every visible node with a paint payload,
    /// in depth-first paint order.
    pub fn extract_paint(&self) -> Vec<RenderItem> {
        let mut items = Vec::new();
        let identity = Mat4::identity();
        for root in &self.roots {
            self.collect_paint(*root, &identity, self.screen_size, 0, &mut items);
        }
        items
    }

    fn collect_paint(&self, id: NodeId, parent_matrix: &Mat4, parent_size: Vec2, depth: u32, items: &mut Vec<RenderItem>) {
        let Some(node) = self.nodes.get(id) else {
            return;
        };
        if node.flags.contains(NodeFlags::HIDDEN) {
            return;
        }
        let world = parent_matrix * node.transform.local_matrix(parent_size);
        let content = node.transform.content_size(parent_size);

        if let Some(paint) = &node.paint {
            let stencil = paint
                .stencil
                .or_else(|| depth.checked_sub(1).map(StencilState::inside_mask));
            items.push(RenderItem {
                node: id,
                matrix: world,
                size: content,
                order: u32::try_from(items.len()).unwrap_or(u32::MAX),
                color: paint.color,
                texture: paint.texture,
                text: paint.text.clone(),
                font_size: paint.font_size,
                stencil,
            });
        }

        let child_depth = depth + u32::from(node.flags.contains(NodeFlags::MASKED));
        for child in &node.children {
            self.collect_paint(*child, &world, content, child_depth, items);
        }
    }
}

impl Default for UiTree {
    fn default() -> Self {
        Self::new(Vec2::new(800.0, 600.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventType;
    use crate::ui::layout::List;
    use crate::ui::layout::Direction;
    use approx::assert_relative_eq;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn ray_at(x: f32, y: f32) -> Ray {
        Ray::new(Vec3::new(x, y, -100.0), Vec3::new(0.0, 0.0, 1.0))
    }

    fn boxed(tree: &mut UiTree, x: f32, y: f32, w: f32, h: f32) -> NodeId {
        let id = tree.create_node();
        tree.transform_mut(id).unwrap().set_rect(x, y, w, h);
        id
    }

    #[test]
    fn test_standard_properties() {
        let mut tree = UiTree::default();
        let id = tree.create_node();
        tree.set(id, "size", Vec2::new(10.0, 20.0)).unwrap();
        tree.set(id, "visible", false).unwrap();
        tree.set(id, "drag_events", true).unwrap();
        tree.set(id, "unknown", 1.0_f32).unwrap();

        assert_eq!(tree.transform(id).unwrap().size, Vec2::new(10.0, 20.0));
        assert!(!tree.is_visible(id));
        assert!(tree.flags(id).contains(NodeFlags::DRAG_EVENTS));
    }

    #[test]
    fn test_set_rejects_unconvertible_value() {
        let mut tree = UiTree::default();
        let id = tree.create_node();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        tree.observe::<f32, _>(id, "value", move |_, _, v| {
            sink.borrow_mut().push(v);
            Ok(())
        })
        .unwrap();

        assert!(matches!(tree.set(id, "value", "oops"), Err(UiError::Property(_))));
        tree.set(id, "value", 3_i64).unwrap();
        assert_eq!(*seen.borrow(), vec![3.0]);
    }

    #[test]
    fn test_setters_run_in_registration_order() {
        let mut tree = UiTree::default();
        let id = tree.create_node();
        let log = Rc::new(RefCell::new(Vec::new()));
        for tag in ["first", "second"] {
            let log = Rc::clone(&log);
            tree.observe::<String, _>(id, "text", move |_, _, v| {
                log.borrow_mut().push(format!("{tag}:{v}"));
                Ok(())
            })
            .unwrap();
        }
        tree.set(id, "text", "hi").unwrap();
        assert_eq!(*log.borrow(), vec!["first:hi", "second:hi"]);
    }

    #[test]
    fn test_client_area_redirect_and_attach() {
        let mut tree = UiTree::default();
        let root = tree.create_node();
        let inner = tree.create_node();
        tree.add_child(root, inner).unwrap();
        tree.set_client_area(root, inner).unwrap();
        tree.add_root(root).unwrap();

        let child = tree.create_node();
        let target = tree.add_child(root, child).unwrap();
        assert_eq!(target, inner);
        assert_eq!(tree.parent(child), Some(inner));
        assert!(tree.is_attached(child));
    }

    #[test]
    fn test_add_child_rejects_cycles() {
        let mut tree = UiTree::default();
        let a = tree.create_node();
        let b = tree.create_node();
        tree.add_child(a, b).unwrap();
        assert!(tree.add_child(b, a).is_err());
    }

    #[test]
    fn test_add_child_runs_layout() {
        let mut tree = UiTree::default();
        let list = boxed(&mut tree, 0.0, 0.0, 50.0, 50.0);
        tree.set_layouter(list, List::new(Direction::Vertical, 2.0)).unwrap();
        let a = boxed(&mut tree, 0.0, 0.0, 10.0, 5.0);
        let b = boxed(&mut tree, 0.0, 0.0, 10.0, 5.0);
        tree.add_child(list, a).unwrap();
        tree.add_child(list, b).unwrap();
        assert_relative_eq!(tree.transform(b).unwrap().position.y, 7.0);
    }

    #[test]
    fn test_remove_destroys_subtree() {
        let mut tree = UiTree::default();
        let root = tree.create_node();
        let child = tree.create_node();
        let grandchild = tree.create_node();
        tree.add_child(root, child).unwrap();
        tree.add_child(child, grandchild).unwrap();

        assert!(tree.remove(child));
        assert!(!tree.contains(grandchild));
        assert!(tree.children(root).is_empty());
        assert!(!tree.remove(child));
    }

    #[test]
    fn test_world_matrix_composes_parents() {
        let mut tree = UiTree::default();
        let root = boxed(&mut tree, 10.0, 20.0, 100.0, 100.0);
        let child = boxed(&mut tree, 5.0, 5.0, 10.0, 10.0);
        tree.add_child(root, child).unwrap();
        tree.add_root(root).unwrap();

        let origin = tree.world_matrix(child).transform_point(&crate::foundation::math::Point3::origin());
        assert_relative_eq!(origin.x, 15.0);
        assert_relative_eq!(origin.y, 25.0);
    }

    #[test]
    fn test_overlapping_siblings_hit_last_declared() {
        let mut tree = UiTree::default();
        let root = boxed(&mut tree, 0.0, 0.0, 100.0, 100.0);
        let a = boxed(&mut tree, 0.0, 0.0, 60.0, 60.0);
        let b = boxed(&mut tree, 40.0, 40.0, 60.0, 60.0);
        tree.add_child(root, a).unwrap();
        tree.add_child(root, b).unwrap();
        tree.add_root(root).unwrap();

        assert_eq!(tree.hit_test(&ray_at(50.0, 50.0)).map(|h| h.node), Some(b));
        assert_eq!(tree.hit_test(&ray_at(10.0, 10.0)).map(|h| h.node), Some(a));
        assert_eq!(tree.hit_test(&ray_at(90.0, 5.0)).map(|h| h.node), Some(root));
        assert_eq!(tree.hit_test(&ray_at(500.0, 500.0)), None);
    }

    #[test]
    fn test_raycast_disabled_and_hidden_are_skipped() {
        let mut tree = UiTree::default();
        let root = boxed(&mut tree, 0.0, 0.0, 100.0, 100.0);
        let a = boxed(&mut tree, 0.0, 0.0, 50.0, 50.0);
        let b = boxed(&mut tree, 0.0, 0.0, 50.0, 50.0);
        tree.add_child(root, a).unwrap();
        tree.add_child(root, b).unwrap();
        tree.add_root(root).unwrap();
        tree.set_flag(b, NodeFlags::RAYCAST_DISABLED, true).unwrap();

        assert_eq!(tree.hit_test(&ray_at(10.0, 10.0)).map(|h| h.node), Some(a));
        tree.set(a, "visible", false).unwrap();
        assert_eq!(tree.hit_test(&ray_at(10.0, 10.0)).map(|h| h.node), Some(root));
    }

    #[test]
    fn test_mask_clips_hits_outside_its_rect() {
        let mut tree = UiTree::default();
        let root = boxed(&mut tree, 0.0, 0.0, 200.0, 200.0);
        let mask = boxed(&mut tree, 0.0, 0.0, 50.0, 50.0);
        let overflow = boxed(&mut tree, 0.0, 0.0, 100.0, 100.0);
        tree.add_child(root, mask).unwrap();
        tree.add_child(mask, overflow).unwrap();
        tree.add_root(root).unwrap();

        // Without the flag children outside the parent rect stay hittable.
        assert_eq!(tree.hit_test(&ray_at(80.0, 80.0)).map(|h| h.node), Some(overflow));
        tree.set_flag(mask, NodeFlags::MASKED, true).unwrap();
        assert_eq!(tree.hit_test(&ray_at(80.0, 80.0)).map(|h| h.node), Some(root));
        assert_eq!(tree.hit_test(&ray_at(20.0, 20.0)).map(|h| h.node), Some(overflow));
    }

    #[test]
    fn test_bubble_stops_on_request() {
        let mut tree = UiTree::default();
        let root = tree.create_node();
        let middle = tree.create_node();
        let leaf = tree.create_node();
        tree.add_child(root, middle).unwrap();
        tree.add_child(middle, leaf).unwrap();

        let seen = Rc::new(RefCell::new(Vec::new()));
        for (id, stop) in [(leaf, false), (middle, true), (root, false)] {
            let seen = Rc::clone(&seen);
            tree.on(id, EventType::PointerDown, move |_, event| {
                seen.borrow_mut().push(event.current);
                if stop {
                    event.stop_propagation();
                }
                Ok(())
            })
            .unwrap();
        }

        let mut event = Event::new(EventType::PointerDown, leaf, 0.0);
        tree.bubble(leaf, &mut event, None);
        assert_eq!(*seen.borrow(), vec![leaf, middle]);
    }

    #[test]
    fn test_failing_handler_does_not_block_siblings() {
        let mut tree = UiTree::default();
        let id = tree.create_node();
        let ran = Rc::new(RefCell::new(false));
        tree.on(id, EventType::Click, |_, _| Err(UiError::Handler("boom".into()))).unwrap();
        let flag = Rc::clone(&ran);
        tree.on(id, EventType::Click, move |_, _| {
            *flag.borrow_mut() = true;
            Ok(())
        })
        .unwrap();

        let mut event = Event::new(EventType::Click, id, 0.0);
        tree.dispatch_to(id, &mut event);
        assert!(*ran.borrow());
    }

    #[test]
    fn test_handler_may_remove_its_own_node() {
        let mut tree = UiTree::default();
        let root = tree.create_node();
        let leaf = tree.create_node();
        tree.add_child(root, leaf).unwrap();
        tree.on(leaf, EventType::Click, |tree, event| {
            tree.remove(event.current);
            Ok(())
        })
        .unwrap();
        let reached_root = Rc::new(RefCell::new(false));
        let flag = Rc::clone(&reached_root);
        tree.on(root, EventType::Click, move |_, _| {
            *flag.borrow_mut() = true;
            Ok(())
        })
        .unwrap();

        let mut event = Event::new(EventType::Click, leaf, 0.0);
        tree.bubble(leaf, &mut event, None);
        assert!(!tree.contains(leaf));
        assert!(*reached_root.borrow());
    }

    #[test]
    fn test_update_tolerates_removal_mid_traversal() {
        let mut tree = UiTree::default();
        let root = tree.create_node();
        let a = tree.create_node();
        let b = tree.create_node();
        tree.add_child(root, a).unwrap();
        tree.add_child(root, b).unwrap();
        tree.add_root(root).unwrap();

        let visited = Rc::new(RefCell::new(Vec::new()));
        tree.on_update(a, move |tree, _, _| {
            tree.remove(b);
            Ok(())
        })
        .unwrap();
        let log = Rc::clone(&visited);
        tree.on_update(root, move |_, id, _| {
            log.borrow_mut().push(id);
            Ok(())
        })
        .unwrap();

        tree.update(0.016);
        assert!(!tree.contains(b));
        assert_eq!(*visited.borrow(), vec![root]);
    }

    #[test]
    fn test_late_update_sees_this_ticks_layout() {
        let mut tree = UiTree::default();
        let root = tree.create_node();
        let child = boxed(&mut tree, 0.0, 0.0, 10.0, 10.0);
        tree.add_child(root, child).unwrap();
        tree.add_root(root).unwrap();
        tree.set_layouter(root, crate::ui::layout::AutoHeight::new(0.0)).unwrap();
        tree.update(0.0);

        let seen = Rc::new(RefCell::new(Vec::new()));
        let early = Rc::clone(&seen);
        tree.on_update(root, move |tree, id, _| {
            early.borrow_mut().push(("early", tree.content_size(id).y));
            Ok(())
        })
        .unwrap();
        let late = Rc::clone(&seen);
        tree.on_late_update(root, move |tree, id, _| {
            late.borrow_mut().push(("late", tree.content_size(id).y));
            Ok(())
        })
        .unwrap();

        tree.set(child, "size", Vec2::new(10.0, 40.0)).unwrap();
        tree.update(0.0);
        assert_eq!(*seen.borrow(), vec![("early", 10.0), ("late", 40.0)]);
    }

    #[test]
    fn test_update_assigns_clip_depth() {
        let mut tree = UiTree::default();
        let root = tree.create_node();
        let outer = tree.create_node();
        let inner = tree.create_node();
        let leaf = tree.create_node();
        tree.add_child(root, outer).unwrap();
        tree.add_child(outer, inner).unwrap();
        tree.add_child(inner, leaf).unwrap();
        tree.add_root(root).unwrap();
        tree.set_flag(outer, NodeFlags::MASKED, true).unwrap();
        tree.set_flag(inner, NodeFlags::MASKED, true).unwrap();

        tree.update(0.0);
        assert_eq!(tree.clip_depth(outer), 0);
        assert_eq!(tree.clip_depth(inner), 1);
        assert_eq!(tree.clip_depth(leaf), 2);
    }

    #[test]
    fn test_extract_paint_order_and_hidden() {
        let mut tree = UiTree::default();
        let root = boxed(&mut tree, 0.0, 0.0, 100.0, 100.0);
        let a = boxed(&mut tree, 0.0, 0.0, 10.0, 10.0);
        let b = boxed(&mut tree, 0.0, 0.0, 10.0, 10.0);
        let c = boxed(&mut tree, 0.0, 0.0, 10.0, 10.0);
        for (parent, child) in [(root, a), (a, b), (root, c)] {
            tree.add_child(parent, child).unwrap();
        }
        tree.add_root(root).unwrap();
        for id in [root, a, b, c] {
            tree.set_paint(id, Some(Paint::default())).unwrap();
        }

        let order: Vec<_> = tree.extract_paint().iter().map(|item| item.node).collect();
        assert_eq!(order, vec![root, a, b, c]);

        tree.set(a, "visible", false).unwrap();
        let items = tree.extract_paint();
        let order: Vec<_> = items.iter().map(|item| item.node).collect();
        assert_eq!(order, vec![root, c]);
        assert_eq!(items[1].order, 1);
    }
}
