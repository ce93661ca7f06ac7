//! Perspective camera for pointer picking and popup placement

use glam::{Mat4, Vec2, Vec3};

use crate::consts::{CAMERA_FAR, CAMERA_FOV_DEG, CAMERA_NEAR, CAMERA_Z};
use crate::sim::hit::Ray;

#[derive(Debug, Clone, Copy)]
pub struct Camera {
    pub eye: Vec3,
    pub fov_y_deg: f32,
    /// Viewport width / height
    pub aspect: f32,
}

impl Camera {
    /// Default camera looking down -Z at the origin
    pub fn new(aspect: f32) -> Self {
        Self {
            eye: Vec3::new(0.0, 0.0, CAMERA_Z),
            fov_y_deg: CAMERA_FOV_DEG,
            aspect,
        }
    }

    /// Viewport resized
    pub fn set_viewport(&mut self, width: f32, height: f32) {
        if height > 0.0 {
            self.aspect = width / height;
        }
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, Vec3::ZERO, Vec3::Y)
    }

    pub fn view_proj(&self) -> Mat4 {
        let proj = Mat4::perspective_rh(self.fov_y_deg.to_radians(), self.aspect, CAMERA_NEAR, CAMERA_FAR);
        proj * self.view()
    }

    /// Pick ray through a point in normalized device coordinates
    pub fn ray_from_ndc(&self, ndc: Vec2) -> Ray {
        // Build the direction in view space, then rotate it into the scene
        let half_h = (self.fov_y_deg.to_radians() * 0.5).tan();
        let dir_view = Vec3::new(ndc.x * half_h * self.aspect, ndc.y * half_h, -1.0);
        let dir = self.view().inverse().transform_vector3(dir_view);
        Ray::new(self.eye, dir)
    }

    /// Pick ray under a pointer position in pixels
    pub fn ray_from_pointer(&self, x: f32, y: f32, width: f32, height: f32) -> Ray {
        self.ray_from_ndc(pointer_to_ndc(x, y, width, height))
    }

    /// Project a scene position to NDC; None when behind the camera
    pub fn project(&self, world: Vec3) -> Option<Vec2> {
        let clip = self.view_proj() * world.extend(1.0);
        if clip.w <= 0.0 {
            return None;
        }
        Some(Vec2::new(clip.x / clip.w, clip.y / clip.w))
    }

    /// Project a scene position to pixel coordinates
    pub fn project_to_screen(&self, world: Vec3, width: f32, height: f32) -> Option<Vec2> {
        self.project(world).map(|ndc| ndc_to_screen(ndc, width, height))
    }
}

/// Pixel position (origin top-left) to NDC (origin centre, +Y up)
pub fn pointer_to_ndc(x: f32, y: f32, width: f32, height: f32) -> Vec2 {
    Vec2::new(x / width * 2.0 - 1.0, 1.0 - y / height * 2.0)
}

pub fn ndc_to_screen(ndc: Vec2, width: f32, height: f32) -> Vec2 {
    Vec2::new((ndc.x + 1.0) * 0.5 * width, (1.0 - ndc.y) * 0.5 * height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::hit::ray_sphere;

    #[test]
    fn test_centre_pointer_looks_down_z() {
        let cam = Camera::new(16.0 / 9.0);
        let ray = cam.ray_from_pointer(800.0, 450.0, 1600.0, 900.0);
        assert!((ray.dir - Vec3::NEG_Z).length() < 1e-4);
        assert_eq!(ray.origin, Vec3::new(0.0, 0.0, 20.0));
    }

    #[test]
    fn test_project_origin_is_centre() {
        let cam = Camera::new(1.0);
        let ndc = cam.project(Vec3::ZERO).unwrap();
        assert!(ndc.length() < 1e-5);
        let px = cam.project_to_screen(Vec3::ZERO, 800.0, 600.0).unwrap();
        assert!((px - Vec2::new(400.0, 300.0)).length() < 1e-3);
    }

    #[test]
    fn test_behind_camera_not_projected() {
        let cam = Camera::new(1.0);
        assert!(cam.project(Vec3::new(0.0, 0.0, 30.0)).is_none());
    }

    #[test]
    fn test_projected_point_is_picked() {
        let cam = Camera::new(4.0 / 3.0);
        let target = Vec3::new(6.0, -3.0, -5.0);
        let ndc = cam.project(target).unwrap();
        let ray = cam.ray_from_ndc(ndc);
        assert!(ray_sphere(&ray, target, 0.1).is_some());
    }

    #[test]
    fn test_pointer_ndc_corners() {
        assert_eq!(pointer_to_ndc(0.0, 0.0, 100.0, 50.0), Vec2::new(-1.0, 1.0));
        assert_eq!(pointer_to_ndc(100.0, 50.0, 100.0, 50.0), Vec2::new(1.0, -1.0));
    }
}
