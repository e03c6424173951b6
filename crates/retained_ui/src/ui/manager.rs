//! UI Manager
//!
//! Central UI system that owns the widget tree, the shared context and the
//! pointer state machine, and drives the per-frame tick in a fixed order:
//! queued pointer input first, then the update/layout pass, then paint
//! extraction.

use crate::core::UiConfig;
use crate::error::UiResult;
use crate::foundation::collections::NodeId;
use crate::foundation::math::Vec2;
use crate::input::{PointerEvent, PointerProcessor};
use crate::render::backend::UiRenderBackend;
use crate::render::commands::RenderItem;
use crate::ui::builder::Builder;
use crate::ui::context::{UiContext, UiNotification};
use crate::ui::tree::UiTree;
use std::collections::VecDeque;

/// Central UI management system
#[derive(Debug)]
pub struct UIManager {
    /// Widget arena
    tree: UiTree,

    /// Shared resources (config, font, camera, textures)
    context: UiContext,

    /// Hover/press/drag state
    pointer: PointerProcessor,

    /// Input received since the last update
    pending: VecDeque<PointerEvent>,

    /// Seconds since creation, used as event timestamps
    time: f64,

    /// Frame counter
    frame_counter: u64,

    /// Paint list extracted by the last update
    last_paint: Vec<RenderItem>,
}

impl UIManager {
    /// Create a new UI manager
    pub fn new(config: UiConfig) -> UiResult<Self> {
        let context = UiContext::init(config)?;
        let (width, height) = context.config().screen_size;
        let pointer = PointerProcessor::new(context.config().drag_threshold);
        Ok(Self {
            tree: UiTree::new(Vec2::new(width, height)),
            context,
            pointer,
            pending: VecDeque::new(),
            time: 0.0,
            frame_counter: 0,
            last_paint: Vec::new(),
        })
    }

    /// Widget tree
    pub fn tree(&self) -> &UiTree {
        &self.tree
    }

    /// Widget tree
    pub fn tree_mut(&mut self) -> &mut UiTree {
        &mut self.tree
    }

    /// Shared resources
    pub fn context(&self) -> &UiContext {
        &self.context
    }

    /// Shared resources
    pub fn context_mut(&mut self) -> &mut UiContext {
        &mut self.context
    }

    /// Pointer state machine
    pub fn pointer(&self) -> &PointerProcessor {
        &self.pointer
    }

    /// Frames processed so far
    pub fn frame_count(&self) -> u64 {
        self.frame_counter
    }

    /// A builder over this manager's tree with no current parent
    pub fn builder(&mut self) -> Builder<'_> {
        Builder::new(&mut self.tree, &mut self.context)
    }

    /// A builder that adds into `parent`
    pub fn builder_at(&mut self, parent: NodeId) -> UiResult<Builder<'_>> {
        Builder::with_parent(&mut self.tree, &mut self.context, parent)
    }

    /// Build a widget and register it as a UI root
    pub fn build_root<F>(&mut self, build: F) -> UiResult<NodeId>
    where
        F: FnOnce(&mut Builder<'_>) -> UiResult<()>,
    {
        let id = self.builder().create(build)?;
        self.tree.add_root(id)?;
        log::debug!("Added UI root {:?} ({} nodes)", id, self.tree.len());
        Ok(id)
    }

    /// Remove a node (and its subtree), root or not
    pub fn remove(&mut self, id: NodeId) -> bool {
        self.tree.remove(id)
    }

    /// Queue a pointer event for the next update
    pub fn push_pointer_event(&mut self, event: PointerEvent) {
        self.pending.push_back(event);
    }

    /// Set screen size
    pub fn set_screen_size(&mut self, width: f32, height: f32) {
        self.tree.set_screen_size(Vec2::new(width, height));
        self.context.set_screen_size(width, height);
    }

    /// Get screen size
    pub fn get_screen_size(&self) -> (f32, f32) {
        let size = self.tree.screen_size();
        (size.x, size.y)
    }

    /// Update UI state (call once per frame before rendering)
    pub fn update(&mut self, delta_time: f32) {
        self.frame_counter += 1;
        self.time += f64::from(delta_time);

        while let Some(event) = self.pending.pop_front() {
            let result = self.pointer.process(
                &mut self.tree,
                self.context.camera(),
                self.context.viewport(),
                &event,
                self.time,
            );
            if let Err(err) = result {
                log::warn!("Dropped pointer event {:?}: {}", event.kind, err);
            }
        }

        self.tree.update(delta_time);
        self.last_paint = self.tree.extract_paint();
        log::trace!("Frame {}: {} render items", self.frame_counter, self.last_paint.len());
    }

    /// Paint list extracted by the last [`Self::update`]
    pub fn paint_items(&self) -> &[RenderItem] {
        &self.last_paint
    }

    /// Render UI to the backend
    pub fn render(&mut self, backend: &mut dyn UiRenderBackend) -> UiResult<()> {
        let (width, height) = self.get_screen_size();
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        backend.set_screen_size(width as u32, height as u32);

        let projection = self.context.camera().projection(self.tree.screen_size());
        backend.begin_ui_pass(&projection)?;
        let drawn = backend.draw_items(&self.last_paint);
        let ended = backend.end_ui_pass();
        drawn.and(ended)
    }

    /// Take notifications (failed resource loads, ...) queued since the last call
    pub fn drain_notifications(&mut self) -> Vec<UiNotification> {
        self.context.drain_notifications()
    }

    /// Drop every root and release the context's resources
    pub fn shutdown(&mut self) {
        let roots = self.tree.roots().to_vec();
        for root in roots {
            self.tree.remove(root);
        }
        self.pending.clear();
        self.last_paint.clear();
        self.context.teardown();
        log::info!("UI manager shut down after {} frames", self.frame_counter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::backend::RecordingBackend;
    use crate::ui::widgets::panel;

    #[test]
    fn test_update_extracts_and_renders() {
        let mut ui = UIManager::new(UiConfig::default()).unwrap();
        let root = ui.build_root(panel).unwrap();
        ui.tree_mut().set(root, "size", Vec2::new(10.0, 10.0)).unwrap();
        ui.update(0.016);
        assert_eq!(ui.paint_items().len(), 1);
        assert_eq!(ui.paint_items()[0].node, root);

        let mut backend = RecordingBackend::new();
        ui.render(&mut backend).unwrap();
        assert_eq!(backend.passes, 1);
        assert_eq!(backend.frame.len(), 1);
        assert_eq!(backend.get_screen_size(), (800, 600));
    }

    #[test]
    fn test_shutdown_clears_roots() {
        let mut ui = UIManager::new(UiConfig::default()).unwrap();
        ui.build_root(panel).unwrap();
        ui.shutdown();
        assert!(ui.tree().is_empty());
        assert!(!ui.context().is_active());
    }
}
