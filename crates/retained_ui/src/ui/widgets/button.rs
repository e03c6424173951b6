//! Button widget - interactive clickable buttons
//!
//! The visual state follows the pointer: hover, press and release events
//! recolor the background. `Click` itself comes from the pointer pipeline, so
//! register a handler with `tree.on(button, EventType::Click, ..)`.

use super::core::{palette, Anchor};
use super::text::label;
use crate::error::{UiError, UiResult};
use crate::events::EventType;
use crate::foundation::collections::NodeId;
use crate::foundation::math::{Vec2, Vec4};
use crate::ui::builder::{Builder, ForwardProp};
use crate::ui::node::{NodeFlags, Paint};
use crate::ui::tree::UiTree;
use std::cell::RefCell;
use std::rc::Rc;

/// Button state for visual feedback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonState {
    /// Normal resting state
    Normal,
    /// Pointer is hovering over the button
    Hovered,
    /// Button is being pressed
    Pressed,
    /// Button is disabled (non-interactive)
    Disabled,
}

/// Background colors per state
#[derive(Debug, Clone, PartialEq)]
pub struct ButtonColors {
    /// Normal resting color
    pub normal: Vec4,
    /// Hover state color
    pub hover: Vec4,
    /// Pressed state color
    pub pressed: Vec4,
    /// Disabled state color
    pub disabled: Vec4,
}

impl Default for ButtonColors {
    fn default() -> Self {
        Self {
            normal: palette::BUTTON_NORMAL,
            hover: palette::BUTTON_HOVER,
            pressed: palette::BUTTON_PRESSED,
            disabled: palette::BUTTON_DISABLED,
        }
    }
}

impl ButtonColors {
    /// Get the color for a button state
    pub fn get_current_color(&self, state: ButtonState) -> Vec4 {
        match state {
            ButtonState::Normal => self.normal,
            ButtonState::Hovered => self.hover,
            ButtonState::Pressed => self.pressed,
            ButtonState::Disabled => self.disabled,
        }
    }
}

#[derive(Debug)]
struct ButtonModel {
    colors: ButtonColors,
    hovered: bool,
    pressed: bool,
    enabled: bool,
}

impl ButtonModel {
    fn state(&self) -> ButtonState {
        if !self.enabled {
            ButtonState::Disabled
        } else if self.pressed {
            ButtonState::Pressed
        } else if self.hovered {
            ButtonState::Hovered
        } else {
            ButtonState::Normal
        }
    }
}

type SharedModel = Rc<RefCell<ButtonModel>>;

fn refresh(tree: &mut UiTree, id: NodeId, model: &SharedModel) -> UiResult<()> {
    let (state, color) = {
        let model = model.borrow();
        let state = model.state();
        (state, model.colors.get_current_color(state))
    };
    log::trace!("Button {:?} -> {:?}", id, state);
    tree.paint_mut(id).ok_or(UiError::NodeNotFound(id))?.color = color;
    Ok(())
}

fn on_pointer(
    tree: &mut UiTree,
    id: NodeId,
    model: &SharedModel,
    event_type: EventType,
    apply: fn(&mut ButtonModel),
) -> UiResult<()> {
    let model = Rc::clone(model);
    tree.on(id, event_type, move |tree, _event| {
        apply(&mut model.borrow_mut());
        refresh(tree, id, &model)
    })
}

/// Visual state of a button built by [`button`] with the default colors
pub fn button_state(tree: &UiTree, id: NodeId) -> Option<ButtonState> {
    let color = tree.paint(id)?.color;
    let colors = ButtonColors::default();
    [ButtonState::Disabled, ButtonState::Pressed, ButtonState::Hovered, ButtonState::Normal]
        .into_iter()
        .find(|state| colors.get_current_color(*state) == color)
}

/// A clickable button with a centered caption.
///
/// Properties: `text`, `text_color` (forwarded to the caption), `color`
/// (normal background) and `enabled`.
pub fn button(text: impl Into<String>) -> impl FnOnce(&mut Builder<'_>) -> UiResult<()> {
    let text = text.into();
    move |b: &mut Builder<'_>| {
        let id = b.set_root_named("button")?;
        let model: SharedModel = Rc::new(RefCell::new(ButtonModel {
            colors: ButtonColors::default(),
            hovered: false,
            pressed: false,
            enabled: true,
        }));

        {
            let tree = b.tree_mut();
            tree.transform_mut(id)?.size = Vec2::new(100.0, 50.0);
            tree.set_paint(id, Some(Paint::solid(palette::BUTTON_NORMAL)))?;

            on_pointer(tree, id, &model, EventType::PointerEnter, |m| m.hovered = true)?;
            on_pointer(tree, id, &model, EventType::PointerLeave, |m| {
                m.hovered = false;
                m.pressed = false;
            })?;
            on_pointer(tree, id, &model, EventType::PointerDown, |m| m.pressed = true)?;
            on_pointer(tree, id, &model, EventType::PointerUp, |m| m.pressed = false)?;

            let colors = Rc::clone(&model);
            tree.observe::<Vec4, _>(id, "color", move |tree, id, color| {
                colors.borrow_mut().colors.normal = color;
                refresh(tree, id, &colors)
            })?;
            let enabled = Rc::clone(&model);
            tree.observe::<bool, _>(id, "enabled", move |tree, id, on| {
                {
                    let mut model = enabled.borrow_mut();
                    model.enabled = on;
                    model.pressed &= on;
                }
                tree.set_flag(id, NodeFlags::RAYCAST_DISABLED, !on)?;
                refresh(tree, id, &enabled)
            })?;
        }

        b.use_prop("anchor", Anchor::Center.to_edges())
            .use_prop("pivot", Anchor::Center.pivot())
            .use_prop("raycast_disabled", true)
            .use_forward("text", ForwardProp::new("text"))
            .use_forward("color", ForwardProp::new("text_color"));
        b.add(label(text))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::UiConfig;
    use crate::events::Event;
    use crate::ui::context::UiContext;

    fn build() -> (UiTree, NodeId) {
        let mut tree = UiTree::default();
        let mut ctx = UiContext::init(UiConfig::default()).unwrap();
        let id = Builder::new(&mut tree, &mut ctx).create(button("OK")).unwrap();
        (tree, id)
    }

    fn fire(tree: &mut UiTree, id: NodeId, event_type: EventType) {
        tree.dispatch_to(id, &mut Event::new(event_type, id, 0.0));
    }

    #[test]
    fn test_state_follows_pointer() {
        let (mut tree, id) = build();
        assert_eq!(button_state(&tree, id), Some(ButtonState::Normal));
        fire(&mut tree, id, EventType::PointerEnter);
        assert_eq!(button_state(&tree, id), Some(ButtonState::Hovered));
        fire(&mut tree, id, EventType::PointerDown);
        assert_eq!(button_state(&tree, id), Some(ButtonState::Pressed));
        fire(&mut tree, id, EventType::PointerUp);
        assert_eq!(button_state(&tree, id), Some(ButtonState::Hovered));
        fire(&mut tree, id, EventType::PointerLeave);
        assert_eq!(button_state(&tree, id), Some(ButtonState::Normal));
    }

    #[test]
    fn test_disabled_button_ignores_raycasts() {
        let (mut tree, id) = build();
        tree.set(id, "enabled", false).unwrap();
        assert!(tree.flags(id).contains(NodeFlags::RAYCAST_DISABLED));
        fire(&mut tree, id, EventType::PointerEnter);
        assert_eq!(button_state(&tree, id), Some(ButtonState::Disabled));
    }

    #[test]
    fn test_caption_is_forwarded() {
        let (mut tree, id) = build();
        let caption = tree.children(id)[0];
        assert_eq!(tree.paint(caption).unwrap().text.as_deref(), Some("OK"));
        tree.set(id, "text", "Cancel").unwrap();
        assert_eq!(tree.paint(caption).unwrap().text.as_deref(), Some("Cancel"));
        assert!(tree.flags(caption).contains(NodeFlags::RAYCAST_DISABLED));
    }
}
