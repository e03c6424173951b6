//! # UI Cameras
//!
//! The pointer pipeline needs exactly two things from a camera: a world-space
//! ray through a screen point, and a projection for the renderer. Screen
//! points are pixels with a top-left origin.
//!
//! - [`OrthoCamera`]: the default screen-space camera. One world unit is one
//!   pixel, world y grows downward, rays travel along +Z.
//! - [`PerspectiveCamera`]: for UI panels placed in a 3D scene. Shares the
//!   ortho camera's world orientation, so a tree renders the same way up
//!   under either camera.

use crate::error::{UiError, UiResult};
use crate::foundation::math::{utils, Mat4, Mat4Ext, Ray, Vec2, Vec3, Vec4};
use crate::input::Viewport;

/// Camera collaborator consumed by the pointer pipeline
pub trait UiCamera: std::fmt::Debug {
    /// World-space ray through `screen` (pixels, top-left origin)
    fn screen_to_ray(&self, screen: Vec2, viewport: &Viewport) -> UiResult<Ray>;

    /// Combined view-projection for a screen of `screen_size` pixels
    fn projection(&self, screen_size: Vec2) -> Mat4;
}

/// Screen-space orthographic camera
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrthoCamera {
    /// Distance to near clipping plane
    pub near: f32,
    /// Distance to far clipping plane
    pub far: f32,
}

impl OrthoCamera {
    /// Create a screen camera covering `[near, far]` in depth
    pub fn new(near: f32, far: f32) -> Self {
        Self { near, far }
    }
}

impl Default for OrthoCamera {
    fn default() -> Self {
        Self::new(-1000.0, 1000.0)
    }
}

impl UiCamera for OrthoCamera {
    fn screen_to_ray(&self, screen: Vec2, viewport: &Viewport) -> UiResult<Ray> {
        let local = viewport.screen_to_local(screen);
        Ok(Ray::new(Vec3::new(local.x, local.y, self.near), Vec3::new(0.0, 0.0, 1.0)))
    }

    fn projection(&self, screen_size: Vec2) -> Mat4 {
        Mat4::orthographic_screen(screen_size.x, screen_size.y, self.near, self.far)
    }
}

/// Perspective camera for world-space UI
///
/// World space is y-down like the UI itself: the default camera sits on -Z,
/// looks along +Z and uses `-Y` as its up vector. The view matrix is
/// right-handed and the clip-space flip converts to Y-down NDC.
#[derive(Debug, Clone, PartialEq)]
pub struct PerspectiveCamera {
    /// Camera position in world space
    pub position: Vec3,
    /// Point the camera is looking at in world space
    pub target: Vec3,
    /// Up vector for camera orientation (`[0, -1, 0]` for y-down UI)
    pub up: Vec3,
    /// Field of view angle in radians
    pub fov: f32,
    /// Distance to near clipping plane
    pub near: f32,
    /// Distance to far clipping plane
    pub far: f32,
}

impl PerspectiveCamera {
    /// Create a perspective camera looking at the origin with `-Y` up
    ///
    /// # Arguments
    /// * `position` - Camera position in world space
    /// * `fov_degrees` - Field of view angle in degrees (converted to radians internally)
    /// * `near` - Distance to near clipping plane (must be > 0)
    /// * `far` - Distance to far clipping plane (must be > near)
    pub fn new(position: Vec3, fov_degrees: f32, near: f32, far: f32) -> Self {
        Self {
            position,
            target: Vec3::zeros(),
            up: Vec3::new(0.0, -1.0, 0.0),
            fov: utils::deg_to_rad(fov_degrees),
            near,
            far,
        }
    }

    /// Configure camera to look at a specific point with custom up vector
    pub fn look_at(&mut self, target: Vec3, up: Vec3) {
        self.target = target;
        self.up = up;
        log::trace!("Camera look_at updated - target: {:?}, up: {:?}", target, up);
    }

    /// World to camera space
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at(self.position, self.target, self.up)
    }

    fn view_projection(&self, aspect: f32) -> Mat4 {
        // P × X × V
        Mat4::perspective(self.fov, aspect, self.near, self.far) * Mat4::clip_space_flip() * self.view_matrix()
    }
}

impl Default for PerspectiveCamera {
    fn default() -> Self {
        Self::new(Vec3::new(0.0, 0.0, -10.0), 45.0, 0.1, 1000.0)
    }
}

impl UiCamera for PerspectiveCamera {
    fn screen_to_ray(&self, screen: Vec2, viewport: &Viewport) -> UiResult<Ray> {
        let ndc = viewport.screen_to_ndc(screen);
        let aspect = if viewport.height > 0.0 { viewport.width / viewport.height } else { 1.0 };
        let inverse = self
            .view_projection(aspect)
            .try_inverse()
            .ok_or_else(|| UiError::Camera("view-projection matrix is not invertible".to_string()))?;

        // Unproject the near and far depth of the pixel
        let near = inverse * Vec4::new(ndc.x, ndc.y, 0.0, 1.0);
        let far = inverse * Vec4::new(ndc.x, ndc.y, 1.0, 1.0);
        if near.w.abs() <= f32::EPSILON || far.w.abs() <= f32::EPSILON {
            return Err(UiError::Camera("degenerate unprojection".to_string()));
        }
        let direction = far.xyz() / far.w - near.xyz() / near.w;
        if !direction.iter().all(|c| c.is_finite()) || direction.norm() <= f32::EPSILON {
            return Err(UiError::Camera("degenerate unprojection".to_string()));
        }

        Ok(Ray::new(self.position, direction))
    }

    fn projection(&self, screen_size: Vec2) -> Mat4 {
        let aspect = if screen_size.y > 0.0 { screen_size.x / screen_size.y } else { 1.0 };
        self.view_projection(aspect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_ortho_ray_goes_through_pixel() {
        let camera = OrthoCamera::default();
        let viewport = Viewport { x: 10.0, y: 20.0, width: 800.0, height: 600.0 };
        let ray = camera.screen_to_ray(Vec2::new(110.0, 70.0), &viewport).unwrap();
        let hit = ray.intersect_z_plane().unwrap();
        assert_relative_eq!(hit.x, 100.0);
        assert_relative_eq!(hit.y, 50.0);
    }

    #[test]
    fn test_perspective_center_ray_looks_forward() {
        let camera = PerspectiveCamera::default();
        let viewport = Viewport::new(800.0, 600.0);
        let ray = camera.screen_to_ray(Vec2::new(400.0, 300.0), &viewport).unwrap();
        assert_relative_eq!(ray.origin, Vec3::new(0.0, 0.0, -10.0));
        assert_relative_eq!(ray.direction.normalize(), Vec3::new(0.0, 0.0, 1.0), epsilon = 1e-4);
    }

    #[test]
    fn test_perspective_top_of_screen_is_negative_y() {
        let camera = PerspectiveCamera::default();
        let viewport = Viewport::new(800.0, 600.0);
        let ray = camera.screen_to_ray(Vec2::new(400.0, 0.0), &viewport).unwrap();
        assert!(ray.direction.y < 0.0);
        assert_relative_eq!(ray.direction.x, 0.0, epsilon = 1e-4);
    }

    #[test]
    fn test_perspective_and_ortho_agree_on_orientation() {
        let viewport = Viewport::new(800.0, 600.0);
        let screen = Vec2::new(700.0, 100.0);
        let centre = Vec2::new(400.0, 300.0);

        let ortho = OrthoCamera::default().screen_to_ray(screen, &viewport).unwrap();
        let ortho_centre = OrthoCamera::default().screen_to_ray(centre, &viewport).unwrap();
        let flat = ortho.intersect_z_plane().unwrap() - ortho_centre.intersect_z_plane().unwrap();

        let deep = PerspectiveCamera::default().screen_to_ray(screen, &viewport).unwrap();
        let projected = deep.intersect_z_plane().unwrap();

        assert!(flat.x > 0.0 && projected.x > 0.0);
        assert!(flat.y < 0.0 && projected.y < 0.0);
    }

    #[test]
    fn test_degenerate_camera_reports_error() {
        let mut camera = PerspectiveCamera::default();
        camera.target = camera.position;
        let viewport = Viewport::new(800.0, 600.0);
        assert!(camera.screen_to_ray(Vec2::new(1.0, 1.0), &viewport).is_err());
    }
}
