// Equipment value objects: weapons, shields, and armor. The combat core
// only reads their fields; balance data lives here.

use super::projectile::{Effect, Projectile};
use super::CharacterId;
use crate::core::geom::{Aabb, Rect};
use crate::game::config::{self, atlas};
use glam::Vec3;

/// Recipe for the projectile a ranged weapon fires
#[derive(Debug, Clone)]
pub struct ProjectileSpec {
    pub sprite: Rect,
    /// Base muzzle speed along the facing axis
    pub speed: f32,
    pub damage: f32,
    pub effect: Effect,
}

impl ProjectileSpec {
    /// Build a projectile at the character's weapon anchor, moving along
    /// the facing direction. The caller adds the shooter's momentum.
    pub fn spawn(&self, position: Vec3, face_forward: bool, owner: CharacterId) -> Projectile {
        let dir = if face_forward { 1.0 } else { -1.0 };
        Projectile {
            sprite: self.sprite,
            position: position + config::WEAPON_OFFSET * dir,
            velocity: Vec3::new(self.speed * dir, 0.0, 0.0),
            damage: self.damage,
            effect: self.effect,
            owner,
        }
    }
}

/// A weapon or shield. For shields, `damage` is the block rating: the flat
/// reduction applied to blocked hits and the unit of break accumulation.
#[derive(Debug, Clone)]
pub struct Weapon {
    pub damage: f32,
    /// Swing-duration multiplier (1.0 = standard)
    pub speed: f32,
    /// Melee reach, relative to the weapon anchor
    pub hitbox: Aabb,
    pub sprite: Rect,
    /// Present on ranged weapons
    pub projectile: Option<ProjectileSpec>,
}

impl Weapon {
    pub fn sword() -> Self {
        Self {
            damage: 3.0,
            speed: 1.0,
            hitbox: Aabb::new(Vec3::new(-10.0, 0.0, -3.0), Vec3::new(10.0, 16.0, 3.0)),
            sprite: atlas::SWORD,
            projectile: None,
        }
    }

    /// Two-handed, slower but longer reach
    pub fn spear() -> Self {
        Self {
            damage: 4.0,
            speed: 1.4,
            hitbox: Aabb::new(Vec3::new(-16.0, 0.0, -3.0), Vec3::new(16.0, 16.0, 3.0)),
            sprite: atlas::SPEAR,
            projectile: None,
        }
    }

    /// Two-handed ranged weapon
    pub fn bow() -> Self {
        Self {
            damage: 1.0,
            speed: 1.6,
            hitbox: Aabb::new(Vec3::new(-6.0, 0.0, -3.0), Vec3::new(6.0, 16.0, 3.0)),
            sprite: atlas::BOW,
            projectile: Some(ProjectileSpec {
                sprite: atlas::ARROW,
                speed: 64.0,
                damage: 2.0,
                effect: Effect::Pierce,
            }),
        }
    }

    pub fn shield() -> Self {
        Self {
            damage: 4.0,
            speed: 1.0,
            hitbox: config::HITBOX_WEAPON_SMALL,
            sprite: atlas::SHIELD,
            projectile: None,
        }
    }

    pub fn steel_shield() -> Self {
        Self {
            damage: 8.0,
            speed: 1.0,
            hitbox: config::HITBOX_WEAPON_SMALL,
            sprite: atlas::STEEL_SHIELD,
            projectile: None,
        }
    }
}

/// Body armor: a flat reduction applied to every incoming hit
#[derive(Debug, Clone)]
pub struct Armor {
    pub defense: f32,
    pub sprite: Rect,
}

impl Armor {
    pub fn plate() -> Self {
        Self {
            defense: 1.0,
            sprite: atlas::ARMOR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bow_is_ranged_sword_is_not() {
        assert!(Weapon::bow().projectile.is_some());
        assert!(Weapon::sword().projectile.is_none());
        assert!(Weapon::spear().projectile.is_none());
    }

    #[test]
    fn test_steel_shield_outrates_shield() {
        assert!(Weapon::steel_shield().damage > Weapon::shield().damage);
    }

    #[test]
    fn test_projectile_spawn_direction() {
        let spec = Weapon::bow().projectile.expect("bow is ranged");
        let forward = spec.spawn(Vec3::ZERO, true, 7);
        let backward = spec.spawn(Vec3::ZERO, false, 7);

        assert!(forward.velocity.x > 0.0);
        assert!(backward.velocity.x < 0.0);
        assert_eq!(forward.owner, 7);
        // Anchor offset flips with facing
        assert_eq!(forward.position.x, -backward.position.x);
    }
}
