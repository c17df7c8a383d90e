// Geometry value types shared by rendering and combat

use glam::Vec3;

/// Axis-aligned source rectangle in atlas texel space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    /// Create a new rectangle
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Flatten to the 4-float layout the instance buffer expects
    pub fn to_array(self) -> [f32; 4] {
        [self.x, self.y, self.w, self.h]
    }
}

/// Axis-aligned hit-detection volume in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Create a new box from its corners
    pub const fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Create a box centered at the origin with the given half extents
    pub fn from_half_extents(half: Vec3) -> Self {
        Self {
            min: -half,
            max: half,
        }
    }

    /// Shift the box by an offset
    pub fn translated(self, offset: Vec3) -> Self {
        Self {
            min: self.min + offset,
            max: self.max + offset,
        }
    }

    /// Check overlap with another box
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    /// Check whether a point is inside the box
    pub fn contains(&self, point: Vec3) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
            && point.z >= self.min.z
            && point.z <= self.max.z
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_to_array() {
        let rect = Rect::new(16.0, 0.0, 16.0, 16.0);
        assert_eq!(rect.to_array(), [16.0, 0.0, 16.0, 16.0]);
    }

    #[test]
    fn test_aabb_intersects() {
        let a = Aabb::from_half_extents(Vec3::splat(1.0));
        let b = a.translated(Vec3::new(1.5, 0.0, 0.0));
        let c = a.translated(Vec3::new(3.0, 0.0, 0.0));
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
    }

    #[test]
    fn test_aabb_contains() {
        let a = Aabb::new(Vec3::ZERO, Vec3::splat(2.0));
        assert!(a.contains(Vec3::ONE));
        assert!(!a.contains(Vec3::splat(3.0)));
    }

    #[test]
    fn test_aabb_translated() {
        let a = Aabb::from_half_extents(Vec3::ONE).translated(Vec3::new(4.0, 0.0, 0.0));
        assert_eq!(a.min, Vec3::new(3.0, -1.0, -1.0));
        assert_eq!(a.max, Vec3::new(5.0, 1.0, 1.0));
    }
}
