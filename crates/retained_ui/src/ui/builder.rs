//! Imperative tree construction with scoped property inheritance.
//!
//! A [`Builder`] tracks:
//! - a parent stack (`begin`/`end`) deciding where new nodes are added,
//! - per-parent *local* properties applied to every node created under it,
//! - *next* properties (`use_prop`) applied once to the very next node,
//! - a property *stack* (`push`/`save`) applied while in scope.
//!
//! When a node is created the three sources are merged in the order
//! stack → local → next, later entries overriding earlier ones with the same
//! name, and applied through [`UiTree::set`].
//!
//! Widgets are plain build functions `FnOnce(&mut Builder) -> UiResult<()>`.
//! Each runs in a fresh nested builder and must call [`Builder::set_root`].
//! Inside it, a [`ForwardProp`] wires a child's property to a (prefixed)
//! property on the widget root instead of setting a literal value.

use crate::error::{UiError, UiResult};
use crate::foundation::collections::NodeId;
use crate::ui::context::UiContext;
use crate::ui::property::{PropertyValue, Setter};
use crate::ui::tree::UiTree;
use std::ops::{Deref, DerefMut};

/// Placeholder that forwards an owner property to a child property
#[derive(Debug, Clone, PartialEq)]
pub struct ForwardProp {
    /// Name on the owning widget root (before the builder's prefix)
    pub key: String,
    /// Applied to the child right after wiring
    pub default: Option<PropertyValue>,
}

impl ForwardProp {
    /// Forward `key` without a default
    pub fn new(key: &str) -> Self {
        Self { key: key.to_string(), default: None }
    }

    /// Forward `key`, applying `default` immediately
    pub fn with_default(key: &str, default: impl Into<PropertyValue>) -> Self {
        Self { key: key.to_string(), default: Some(default.into()) }
    }
}

/// A property entry queued in a builder
#[derive(Debug, Clone, PartialEq)]
pub enum PropValue {
    /// Set this value
    Literal(PropertyValue),
    /// Wire to the owner instead
    Forward(ForwardProp),
}

impl PropValue {
    /// Literal value
    pub fn literal(value: impl Into<PropertyValue>) -> Self {
        Self::Literal(value.into())
    }
}

type Props = Vec<(String, PropValue)>;

fn upsert(props: &mut Props, name: &str, value: PropValue) {
    match props.iter_mut().find(|(n, _)| n == name) {
        Some(slot) => slot.1 = value,
        None => props.push((name.to_string(), value)),
    }
}

#[derive(Debug)]
struct Frame {
    node: NodeId,
    local: Props,
}

/// Stack-based tree constructor
#[derive(Debug)]
pub struct Builder<'a> {
    tree: &'a mut UiTree,
    ctx: &'a mut UiContext,
    root: Option<NodeId>,
    parents: Vec<Frame>,
    next: Props,
    stack: Vec<Props>,
    forward_prefix: String,
}

impl<'a> Builder<'a> {
    /// Create a builder with no root and no parent
    pub fn new(tree: &'a mut UiTree, ctx: &'a mut UiContext) -> Self {
        Self {
            tree,
            ctx,
            root: None,
            parents: Vec::new(),
            next: Vec::new(),
            stack: Vec::new(),
            forward_prefix: String::new(),
        }
    }

    /// Create a builder that adds into `parent`
    pub fn with_parent(tree: &'a mut UiTree, ctx: &'a mut UiContext, parent: NodeId) -> UiResult<Self> {
        let mut builder = Self::new(tree, ctx);
        builder.begin(parent)?;
        Ok(builder)
    }

    /// The tree being built
    pub fn tree(&self) -> &UiTree {
        self.tree
    }

    /// The tree being built
    pub fn tree_mut(&mut self) -> &mut UiTree {
        self.tree
    }

    /// Shared UI resources
    pub fn context(&self) -> &UiContext {
        self.ctx
    }

    /// Shared UI resources
    pub fn context_mut(&mut self) -> &mut UiContext {
        self.ctx
    }

    /// Create this builder's root node and make it the current parent.
    pub fn set_root(&mut self) -> UiResult<NodeId> {
        if let Some(root) = self.root {
            return Err(UiError::Build(format!("root already set to {root:?}")));
        }
        let id = self.tree.create_node();
        self.root = Some(id);
        self.parents.push(Frame { node: id, local: Vec::new() });
        Ok(id)
    }

    /// [`Self::set_root`] with a debug name
    pub fn set_root_named(&mut self, name: &str) -> UiResult<NodeId> {
        let id = self.set_root()?;
        self.tree.set_name(id, name)?;
        Ok(id)
    }

    /// Root created by [`Self::set_root`]
    pub fn root(&self) -> UiResult<NodeId> {
        self.root.ok_or_else(|| UiError::Build("builder has no root".to_string()))
    }

    /// Current parent
    pub fn current(&self) -> Option<NodeId> {
        self.parents.last().map(|f| f.node)
    }

    /// Prefix applied to forwarded property names on the owner
    pub fn set_forward_prefix(&mut self, prefix: &str) -> &mut Self {
        self.forward_prefix = prefix.to_string();
        self
    }

    /// Make `id` the current parent
    pub fn begin(&mut self, id: NodeId) -> UiResult<()> {
        if !self.tree.contains(id) {
            return Err(UiError::NodeNotFound(id));
        }
        self.parents.push(Frame { node: id, local: Vec::new() });
        Ok(())
    }

    /// Pop the current parent, returning it
    pub fn end(&mut self) -> UiResult<NodeId> {
        let floor = usize::from(self.root.is_some());
        if self.parents.len() <= floor {
            return Err(UiError::Build("end() without matching begin()".to_string()));
        }
        self.parents
            .pop()
            .map(|f| f.node)
            .ok_or_else(|| UiError::Build("end() without matching begin()".to_string()))
    }

    /// Apply `value` to every node created under the current parent
    pub fn local(&mut self, name: &str, value: impl Into<PropertyValue>) -> &mut Self {
        match self.parents.last_mut() {
            Some(frame) => upsert(&mut frame.local, name, PropValue::literal(value)),
            None => log::warn!("local property '{}' ignored: no current parent", name),
        }
        self
    }

    /// Apply `value` to the next created node only
    pub fn use_prop(&mut self, name: &str, value: impl Into<PropertyValue>) -> &mut Self {
        upsert(&mut self.next, name, PropValue::literal(value));
        self
    }

    /// Forward `name` of the next created node to the widget root
    pub fn use_forward(&mut self, name: &str, forward: ForwardProp) -> &mut Self {
        upsert(&mut self.next, name, PropValue::Forward(forward));
        self
    }

    /// Add `value` to the innermost property scope
    pub fn push(&mut self, name: &str, value: impl Into<PropertyValue>) -> &mut Self {
        if self.stack.is_empty() {
            self.stack.push(Vec::new());
        }
        if let Some(layer) = self.stack.last_mut() {
            upsert(layer, name, PropValue::literal(value));
        }
        self
    }

    /// Open a property scope; everything pushed through the returned guard
    /// is dropped again when the guard goes out of scope.
    pub fn save(&mut self) -> PropertyScope<'_, 'a> {
        let depth = self.stack.len();
        self.stack.push(Vec::new());
        PropertyScope { builder: self, depth }
    }

    fn merged_props(&mut self) -> Props {
        let mut merged = Props::new();
        let layers = self
            .stack
            .iter()
            .chain(self.parents.last().map(|f| &f.local))
            .chain(std::iter::once(&self.next));
        for layer in layers {
            for (name, value) in layer {
                upsert(&mut merged, name, value.clone());
            }
        }
        self.next.clear();
        merged
    }

    /// Instantiate a widget without adding it anywhere.
    ///
    /// Runs `build` in a nested builder, then applies the merged properties.
    /// On failure the partially built widget is removed again.
    pub fn create<F>(&mut self, build: F) -> UiResult<NodeId>
    where
        F: FnOnce(&mut Builder<'_>) -> UiResult<()>,
    {
        let props = self.merged_props();

        let (result, root) = {
            let mut nested = Builder::new(&mut *self.tree, &mut *self.ctx);
            let result = build(&mut nested);
            (result, nested.root)
        };

        let id = match (result, root) {
            (Ok(()), Some(id)) => id,
            (Ok(()), None) => return Err(UiError::Build("build function did not set a root".to_string())),
            (Err(err), root) => {
                if let Some(root) = root {
                    self.tree.remove(root);
                }
                return Err(err);
            }
        };

        if let Err(err) = self.apply_props(id, props) {
            self.tree.remove(id);
            return Err(err);
        }
        Ok(id)
    }

    /// Instantiate a widget and add it to the current parent
    pub fn add<F>(&mut self, build: F) -> UiResult<NodeId>
    where
        F: FnOnce(&mut Builder<'_>) -> UiResult<()>,
    {
        let id = self.create(build)?;
        self.add_entity(id)?;
        Ok(id)
    }

    /// Instantiate a widget, add it and make it the current parent
    pub fn add_begin<F>(&mut self, build: F) -> UiResult<NodeId>
    where
        F: FnOnce(&mut Builder<'_>) -> UiResult<()>,
    {
        let id = self.add(build)?;
        self.begin(id)?;
        Ok(id)
    }

    /// Add an existing node to the current parent's client area
    pub fn add_entity(&mut self, id: NodeId) -> UiResult<NodeId> {
        let parent = self
            .current()
            .ok_or_else(|| UiError::Build("no current parent to add to".to_string()))?;
        self.tree.add_child(parent, id)
    }

    fn apply_props(&mut self, id: NodeId, props: Props) -> UiResult<()> {
        for (name, value) in props {
            match value {
                PropValue::Literal(value) => self.tree.set(id, &name, value)?,
                PropValue::Forward(forward) => self.forward(id, &name, forward)?,
            }
        }
        Ok(())
    }

    fn forward(&mut self, child: NodeId, name: &str, forward: ForwardProp) -> UiResult<()> {
        let owner = self
            .root
            .ok_or_else(|| UiError::Build(format!("forwarded property '{name}' has no owning widget")))?;
        let Some(kind) = self.tree.observed_kind(child, name) else {
            log::warn!("Cannot forward '{}': {:?} does not observe it", name, child);
            return Ok(());
        };

        let key = format!("{}{}", self.forward_prefix, forward.key);
        let target = name.to_string();
        let setter: Setter = Box::new(move |tree: &mut UiTree, _owner: NodeId, value: PropertyValue| {
            if tree.contains(child) {
                tree.set(child, &target, value)
            } else {
                Ok(())
            }
        });
        self.tree.observe_raw(owner, &key, kind, setter)?;
        log::trace!("Forwarding '{}' on {:?} to '{}' on {:?}", key, owner, name, child);

        if let Some(default) = forward.default {
            self.tree.set(child, name, default)?;
        }
        Ok(())
    }
}

/// Guard returned by [`Builder::save`]; pops its property layer on drop.
#[derive(Debug)]
pub struct PropertyScope<'s, 'a> {
    builder: &'s mut Builder<'a>,
    depth: usize,
}

impl PropertyScope<'_, '_> {
    /// Close the scope explicitly
    pub fn restore(self) {}
}

impl<'a> Deref for PropertyScope<'_, 'a> {
    type Target = Builder<'a>;

    fn deref(&self) -> &Self::Target {
        self.builder
    }
}

impl DerefMut for PropertyScope<'_, '_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.builder
    }
}

impl Drop for PropertyScope<'_, '_> {
    fn drop(&mut self) {
        self.builder.stack.truncate(self.depth);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::UiConfig;
    use crate::foundation::math::{Vec2, Vec4};
    use crate::ui::property::PropertyKind;

    fn setup() -> (UiTree, UiContext) {
        (UiTree::default(), UiContext::init(UiConfig::default()).unwrap())
    }

    fn plain(b: &mut Builder<'_>) -> UiResult<()> {
        b.set_root()?;
        Ok(())
    }

    fn size_of(tree: &UiTree, id: NodeId) -> Vec2 {
        tree.transform(id).unwrap().size
    }

    #[test]
    fn test_merge_order_and_next_is_one_shot() {
        let (mut tree, mut ctx) = setup();
        let mut b = Builder::new(&mut tree, &mut ctx);
        let root = b.set_root().unwrap();

        b.push("size", Vec2::new(1.0, 1.0));
        b.local("size", Vec2::new(2.0, 2.0));
        b.use_prop("size", Vec2::new(3.0, 3.0));
        let first = b.add(plain).unwrap();
        let second = b.add(plain).unwrap();

        assert_eq!(b.tree().children(root), &[first, second]);
        assert_eq!(size_of(b.tree(), first), Vec2::new(3.0, 3.0));
        assert_eq!(size_of(b.tree(), second), Vec2::new(2.0, 2.0));
    }

    #[test]
    fn test_scope_guard_pops_on_drop() {
        let (mut tree, mut ctx) = setup();
        let mut b = Builder::new(&mut tree, &mut ctx);
        b.set_root().unwrap();

        let inside = {
            let mut scope = b.save();
            scope.push("size", Vec2::new(4.0, 4.0));
            scope.add(plain).unwrap()
        };
        let outside = b.add(plain).unwrap();
        assert_eq!(size_of(b.tree(), inside), Vec2::new(4.0, 4.0));
        assert_eq!(size_of(b.tree(), outside), Vec2::zeros());
    }

    #[test]
    fn test_scope_guard_pops_on_early_return() {
        fn failing(b: &mut Builder<'_>) -> UiResult<()> {
            let mut scope = b.save();
            scope.push("size", Vec2::new(9.0, 9.0));
            scope.add(|_: &mut Builder<'_>| Err(UiError::Build("nope".to_string())))?;
            Ok(())
        }

        let (mut tree, mut ctx) = setup();
        let mut b = Builder::new(&mut tree, &mut ctx);
        b.set_root().unwrap();
        assert!(failing(&mut b).is_err());
        let after = b.add(plain).unwrap();
        assert_eq!(size_of(b.tree(), after), Vec2::zeros());
    }

    #[test]
    fn test_begin_end_and_local_scope() {
        let (mut tree, mut ctx) = setup();
        let mut b = Builder::new(&mut tree, &mut ctx);
        let root = b.set_root().unwrap();
        let group = b.add_begin(plain).unwrap();
        b.local("size", Vec2::new(5.0, 5.0));
        let inner = b.add(plain).unwrap();
        assert_eq!(b.end().unwrap(), group);
        let outer = b.add(plain).unwrap();
        assert!(b.end().is_err());

        assert_eq!(b.tree().parent(inner), Some(group));
        assert_eq!(b.tree().parent(outer), Some(root));
        assert_eq!(size_of(b.tree(), inner), Vec2::new(5.0, 5.0));
        assert_eq!(size_of(b.tree(), outer), Vec2::zeros());
    }

    #[test]
    fn test_forward_prop_wires_owner_to_child() {
        fn titled(b: &mut Builder<'_>) -> UiResult<()> {
            b.set_root()?;
            b.set_forward_prefix("title_");
            b.use_forward("size", ForwardProp::with_default("size", Vec2::new(1.0, 2.0)));
            b.add(plain)?;
            Ok(())
        }

        let (mut tree, mut ctx) = setup();
        let mut b = Builder::new(&mut tree, &mut ctx);
        b.set_root().unwrap();
        let widget = b.add(titled).unwrap();
        let child = b.tree().children(widget)[0];

        assert_eq!(size_of(b.tree(), child), Vec2::new(1.0, 2.0));
        assert_eq!(b.tree().observed_kind(widget, "title_size"), Some(PropertyKind::Vec2));

        b.tree_mut().set(widget, "title_size", Vec2::new(7.0, 8.0)).unwrap();
        assert_eq!(size_of(b.tree(), child), Vec2::new(7.0, 8.0));
        assert!(b.tree_mut().set(widget, "title_size", Vec4::zeros()).is_err());
    }

    #[test]
    fn test_missing_root_and_bad_props_fail_the_build() {
        let (mut tree, mut ctx) = setup();
        let mut b = Builder::new(&mut tree, &mut ctx);
        b.set_root().unwrap();

        let no_root = b.create(|_: &mut Builder<'_>| Ok(()));
        assert!(matches!(no_root, Err(UiError::Build(_))));

        let before = b.tree().len();
        b.use_prop("size", "oops");
        assert!(matches!(b.add(plain), Err(UiError::Property(_))));
        assert_eq!(b.tree().len(), before);
    }

    #[test]
    fn test_unobserved_props_are_ignored() {
        let (mut tree, mut ctx) = setup();
        let mut b = Builder::new(&mut tree, &mut ctx);
        b.set_root().unwrap();
        b.push("color", Vec4::new(1.0, 0.0, 0.0, 1.0));
        assert!(b.add(plain).is_ok());
    }
}
