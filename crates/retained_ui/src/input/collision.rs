//! Collision detection for input processing
//!
//! Pick rays against node rects, the geometric half of hit testing.

use crate::foundation::math::{Mat4, Point3, Ray, Vec2, Vec3};
use crate::ui::rect_transform::Rect;

/// Intersect a world-space ray with a node's rect.
///
/// `world` maps the node's local frame to world space; the rect lies in the
/// local `z = 0` plane. Returns the local and world hit points.
///
/// # Returns
/// `None` when the matrix is singular, the ray is parallel to or points
/// away from the plane, or the hit falls outside the rect.
pub fn ray_hits_rect(ray: &Ray, world: &Mat4, rect: &Rect) -> Option<(Vec2, Vec3)> {
    let inverse = world.try_inverse()?;
    let local_ray = ray.transformed(&inverse);
    let local = local_ray.intersect_z_plane()?;
    if !rect.contains(local.x, local.y) {
        return None;
    }
    let world_point = world.transform_point(&Point3::from(local)).coords;
    Some((Vec2::new(local.x, local.y), world_point))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Quat;
    use approx::assert_relative_eq;

    fn forward_ray(x: f32, y: f32) -> Ray {
        Ray::new(Vec3::new(x, y, -100.0), Vec3::new(0.0, 0.0, 1.0))
    }

    #[test]
    fn test_translated_rect_hit() {
        let world = Mat4::new_translation(&Vec3::new(100.0, 100.0, 0.0));
        let rect = Rect::new(0.0, 0.0, 200.0, 100.0);

        let (local, world_point) = ray_hits_rect(&forward_ray(150.0, 150.0), &world, &rect).unwrap();
        assert_relative_eq!(local.x, 50.0);
        assert_relative_eq!(local.y, 50.0);
        assert_relative_eq!(world_point.x, 150.0);

        assert!(ray_hits_rect(&forward_ray(50.0, 50.0), &world, &rect).is_none());
    }

    #[test]
    fn test_rotated_rect_hit() {
        // Quarter turn around z: local +x maps to world +y
        let rotation = Quat::from_axis_angle(&Vec3::z_axis(), std::f32::consts::FRAC_PI_2);
        let world = rotation.to_homogeneous();
        let rect = Rect::new(0.0, 0.0, 10.0, 2.0);

        assert!(ray_hits_rect(&forward_ray(-1.0, 5.0), &world, &rect).is_some());
        assert!(ray_hits_rect(&forward_ray(5.0, 1.0), &world, &rect).is_none());
    }

    #[test]
    fn test_singular_matrix_misses() {
        let world = Mat4::new_nonuniform_scaling(&Vec3::new(0.0, 1.0, 1.0));
        let rect = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(ray_hits_rect(&forward_ray(0.0, 0.0), &world, &rect).is_none());
    }
}
