//! Headless UI demo
//!
//! Builds a small settings-style screen (panel, list of labels, a button and
//! a scroll view), feeds it a scripted pointer session and prints what a
//! renderer would receive each frame.

use retained_ui::core::ConfigError;
use retained_ui::foundation::logging;
use retained_ui::prelude::*;
use retained_ui::ui::{scroll as scroll_view, widgets::button_state};
use std::cell::Cell;
use std::rc::Rc;

const CONFIG_PATH: &str = "ui_demo.toml";
const FRAME_TIME: f32 = 1.0 / 60.0;

#[derive(Debug, thiserror::Error)]
enum DemoError {
    #[error("UI error: {0}")]
    Ui(#[from] UiError),
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}

fn load_config() -> Result<UiConfig, ConfigError> {
    if std::path::Path::new(CONFIG_PATH).exists() {
        let config = UiConfig::load_from_file(CONFIG_PATH)?;
        config.validate()?;
        Ok(config)
    } else {
        Ok(UiConfig::default())
    }
}

struct Screen {
    root: NodeId,
    button: NodeId,
    scroll: NodeId,
    clicks: Rc<Cell<u32>>,
}

fn build_screen(ui: &mut UIManager) -> Result<Screen, UiError> {
    let root = ui.build_root(panel)?;
    ui.tree_mut().set(root, "size", Vec2::new(320.0, 240.0))?;

    let mut b = ui.builder_at(root)?;

    b.use_prop("anchor", Vec4::new(0.0, 0.0, 1.0, 0.0))
        .use_prop("margin", Vec4::new(8.0, 8.0, 8.0, 0.0));
    b.add_begin(list(Direction::Vertical, 4.0))?;
    {
        let mut scope = b.save();
        scope.push("color", Vec4::new(0.9, 0.9, 0.6, 1.0));
        scope.add(label("Settings"))?;
        scope.add(label("Volume"))?;
    }
    b.end()?;

    b.use_prop("position", Vec3::new(8.0, 80.0, 0.0)).use_prop("text_color", Vec4::new(0.0, 0.0, 0.0, 1.0));
    let apply = b.add(button("Apply"))?;

    b.use_prop("position", Vec3::new(160.0, 80.0, 0.0)).use_prop("size", Vec2::new(120.0, 120.0));
    let view = b.add_begin(scroll)?;
    b.use_prop("anchor", Vec4::new(0.0, 0.0, 1.0, 0.0));
    b.add_begin(list(Direction::Vertical, 2.0))?;
    for i in 0..12 {
        b.add(label(format!("Item {i}")))?;
    }
    b.end()?;
    b.end()?;

    let clicks = Rc::new(Cell::new(0));
    let sink = Rc::clone(&clicks);
    ui.tree_mut().on(apply, EventType::Click, move |_tree, _event| {
        sink.set(sink.get() + 1);
        log::info!("Apply clicked ({} total)", sink.get());
        Ok(())
    })?;

    Ok(Screen { root, button: apply, scroll: view, clicks })
}

/// Pointer session: hover and click the button, then drag and wheel the list.
fn script() -> Vec<Vec<PointerEvent>> {
    let at = Vec2::new;
    vec![
        vec![PointerEvent::moved(at(20.0, 90.0))],
        vec![PointerEvent::down(at(20.0, 90.0), MouseButton::Left)],
        vec![PointerEvent::up(at(21.0, 91.0), MouseButton::Left)],
        vec![PointerEvent::moved(at(200.0, 150.0)), PointerEvent::down(at(200.0, 150.0), MouseButton::Left)],
        vec![PointerEvent::moved(at(200.0, 130.0))],
        vec![PointerEvent::moved(at(200.0, 110.0)), PointerEvent::up(at(200.0, 110.0), MouseButton::Left)],
        vec![PointerEvent::wheel(at(200.0, 110.0), Vec2::new(0.0, -1.0))],
        vec![],
        vec![],
    ]
}

fn run() -> Result<(), DemoError> {
    let config = load_config()?;
    logging::init_with_level(&config.log_level);
    log::info!("Starting UI demo with {:?}", config);

    let mut ui = UIManager::new(config)?;
    let screen = build_screen(&mut ui)?;
    let mut backend = RecordingBackend::new();

    for (frame, events) in script().into_iter().enumerate() {
        for event in events {
            ui.push_pointer_event(event);
        }
        ui.update(FRAME_TIME);
        ui.render(&mut backend)?;

        log::info!(
            "frame {frame}: {} items, button {:?}, scroll offset {:?}",
            backend.frame.len(),
            button_state(ui.tree(), screen.button),
            scroll_view::offset(ui.tree(), screen.scroll),
        );
    }

    for item in &backend.frame {
        log::debug!(
            "#{:<3} {:?} size {:?} text {:?} stencil {:?}",
            item.order,
            item.node,
            item.size,
            item.text,
            item.stencil
        );
    }

    for notification in ui.drain_notifications() {
        log::warn!("{notification:?}");
    }
    log::info!("{} click(s) on root {:?}", screen.clicks.get(), screen.root);
    ui.shutdown();
    Ok(())
}

fn main() {
    if let Err(err) = run() {
        log::error!("{err}");
        eprintln!("ui_demo failed: {err}");
        std::process::exit(1);
    }
}
