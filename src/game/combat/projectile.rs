// Projectiles spawned by ranged weapons. The character only constructs
// them; their lifetime is simulated by the host.

use super::CharacterId;
use crate::core::geom::{Aabb, Rect};
use crate::game::config;
use glam::Vec3;

/// Damage effect carried by a hit; selects the hit-flash color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Effect {
    #[default]
    None,
    Pierce,
    Fire,
}

impl Effect {
    /// Flash color shown on the struck character
    pub fn flash_color(self) -> Vec3 {
        match self {
            Effect::None => config::HIT_COLOR,
            Effect::Pierce => Vec3::new(1.0, 1.0, 0.3),
            Effect::Fire => Vec3::new(1.0, 0.5, 0.0),
        }
    }
}

/// A projectile in flight
#[derive(Debug, Clone)]
pub struct Projectile {
    pub sprite: Rect,
    pub position: Vec3,
    pub velocity: Vec3,
    pub damage: f32,
    pub effect: Effect,
    /// Character that fired it; never damages its owner
    pub owner: CharacterId,
}

impl Projectile {
    /// Hit-detection volume at the projectile's current position
    pub fn hitbox(&self) -> Aabb {
        config::HITBOX_PROJECTILE.translated(self.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effect_flash_colors_differ() {
        assert_ne!(Effect::None.flash_color(), Effect::Fire.flash_color());
        assert_eq!(Effect::None.flash_color(), config::HIT_COLOR);
    }

    #[test]
    fn test_hitbox_follows_position() {
        let proj = Projectile {
            sprite: config::atlas::ARROW,
            position: Vec3::new(50.0, 0.0, 0.0),
            velocity: Vec3::ZERO,
            damage: 2.0,
            effect: Effect::Pierce,
            owner: 0,
        };
        assert!(proj.hitbox().contains(Vec3::new(50.0, 8.0, 0.0)));
        assert!(!proj.hitbox().contains(Vec3::ZERO));
    }
}
