// Orthographic 2D camera

use glam::{Mat4, Vec2};

/// 2D camera producing the view-projection matrix for the sprite pass
#[derive(Debug, Clone)]
pub struct Camera {
    /// Camera position in world space
    pub position: Vec2,
    /// Camera zoom level (1.0 = one world unit per pixel)
    pub zoom: f32,
    viewport_width: f32,
    viewport_height: f32,
    view_proj: Mat4,
}

impl Camera {
    /// Create a new camera
    pub fn new(position: Vec2, viewport_width: f32, viewport_height: f32) -> Self {
        let mut camera = Self {
            position,
            zoom: 1.0,
            viewport_width,
            viewport_height,
            view_proj: Mat4::IDENTITY,
        };
        camera.update_view_proj();
        camera
    }

    fn update_view_proj(&mut self) {
        let half_width = (self.viewport_width / 2.0) / self.zoom;
        let half_height = (self.viewport_height / 2.0) / self.zoom;

        self.view_proj = Mat4::orthographic_rh(
            self.position.x - half_width,
            self.position.x + half_width,
            self.position.y - half_height,
            self.position.y + half_height,
            -100.0,
            100.0,
        );
    }

    /// Set camera position
    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
        self.update_view_proj();
    }

    /// Set camera zoom
    pub fn set_zoom(&mut self, zoom: f32) {
        self.zoom = zoom.max(0.1);
        self.update_view_proj();
    }

    /// Resize the viewport
    pub fn resize(&mut self, width: f32, height: f32) {
        self.viewport_width = width;
        self.viewport_height = height;
        self.update_view_proj();
    }

    /// Get the view-projection matrix
    pub fn view_proj_matrix(&self) -> Mat4 {
        self.view_proj
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use glam::Vec4;

    #[test]
    fn test_camera_center_maps_to_clip_origin() {
        let camera = Camera::new(Vec2::new(10.0, -5.0), 640.0, 360.0);
        let clip = camera.view_proj_matrix() * Vec4::new(10.0, -5.0, 0.0, 1.0);
        assert_relative_eq!(clip.x, 0.0);
        assert_relative_eq!(clip.y, 0.0);
    }

    #[test]
    fn test_zoom_scales_world_extent() {
        let mut camera = Camera::new(Vec2::ZERO, 640.0, 360.0);
        camera.set_zoom(2.0);
        // At 2x zoom the right edge of clip space is 160 world units out
        let clip = camera.view_proj_matrix() * Vec4::new(160.0, 0.0, 0.0, 1.0);
        assert_relative_eq!(clip.x, 1.0);
    }
}
