use crate::core::UiConfig;
use crate::foundation::math::{Ray, Vec2, Vec3, Vec4};
use crate::render::commands::sample_point;
use crate::ui::layout::Direction;
use crate::ui::manager::UIManager;
use crate::ui::widgets::{label, list, mask, panel};
use approx::assert_relative_eq;

#[test]
fn test_panel_list_labels_auto_height() {
    let mut ui = UIManager::new(UiConfig::default()).unwrap();
    let root = ui.build_root(panel).unwrap();
    ui.tree_mut().set(root, "size", Vec2::new(200.0, 100.0)).unwrap();

    let mut b = ui.builder_at(root).unwrap();
    b.use_prop("anchor", Vec4::new(0.0, 0.0, 1.0, 0.0));
    let list_id = b.add_begin(list(Direction::Vertical, 1.0)).unwrap();
    let (a, second) = {
        let mut scope = b.save();
        scope.push("size", Vec2::new(30.0, 2.0));
        (scope.add(label("a")).unwrap(), scope.add(label("b")).unwrap())
    };
    b.end().unwrap();
    ui.update(0.0);

    let tree = ui.tree();
    assert_relative_eq!(tree.transform(list_id).unwrap().size.y, 5.0);
    assert_relative_eq!(tree.outer_bounds(a).y, 0.0);
    assert_relative_eq!(tree.outer_bounds(second).y, 3.0);
    // Cross axis is stretched over the list's width, not the pushed 30.
    assert_relative_eq!(tree.content_size(list_id).x, 200.0);
    assert_relative_eq!(tree.content_size(second).x, 200.0);

    let order: Vec<_> = ui.paint_items().iter().map(|item| item.node).collect();
    assert_eq!(order, vec![root, a, second]);
    let orders: Vec<u32> = ui.paint_items().iter().map(|item| item.order).collect();
    assert_eq!(orders, vec![0, 1, 2]);
}

#[test]
fn test_scope_does_not_leak_after_end() {
    let mut ui = UIManager::new(UiConfig::default()).unwrap();
    let root = ui.build_root(panel).unwrap();
    let mut b = ui.builder_at(root).unwrap();
    {
        let mut scope = b.save();
        scope.push("color", Vec4::new(1.0, 0.0, 0.0, 1.0));
        scope.add(panel).unwrap();
    }
    let plain = b.add(panel).unwrap();
    assert_ne!(ui.tree().paint(plain).unwrap().color, Vec4::new(1.0, 0.0, 0.0, 1.0));
}

#[test]
fn test_masked_content_is_clipped_in_paint_and_hits() {
    let mut ui = UIManager::new(UiConfig::default()).unwrap();
    let root = ui.build_root(panel).unwrap();
    ui.tree_mut().set(root, "size", Vec2::new(400.0, 400.0)).unwrap();

    let mut b = ui.builder_at(root).unwrap();
    b.use_prop("size", Vec2::new(100.0, 100.0));
    b.add_begin(mask).unwrap();
    b.use_prop("size", Vec2::new(300.0, 50.0));
    let wide = b.add(panel).unwrap();
    b.end().unwrap();
    ui.update(0.0);

    let items = ui.paint_items();
    assert_eq!(sample_point(items, Vec2::new(50.0, 25.0)), vec![root, wide]);
    assert_eq!(sample_point(items, Vec2::new(250.0, 25.0)), vec![root]);

    let ray = Ray::new(Vec3::new(250.0, 25.0, -10.0), Vec3::new(0.0, 0.0, 1.0));
    assert_eq!(ui.tree().hit_test(&ray).map(|h| h.node), Some(root));
}
