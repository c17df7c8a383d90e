// Process-wide combat and sprite constants, plus the animation frame model.
// Loaded once, never mutated at runtime; safe to share across all characters.

use crate::core::geom::{Aabb, Rect};
use glam::Vec3;

/// Animation columns per sprite (base cell plus one alternate pose/step)
pub const SPRITE_COLUMNS: i32 = 2;

/// Walk-cycle playback rate passed to [`frame`]
pub const WALK_RATE: f32 = 5.0;

/// Swing duration set by a re-armed attack, scaled by weapon speed
pub const ATTACK_DURATION: f32 = 0.5;

/// Remaining swing time above which the weapon shows its swing pose
pub const SWING_POSE_THRESHOLD: f32 = 0.2;

/// Stun/flash duration set by a landed hit
pub const HIT_STUN: f32 = 0.5;

/// A shield breaks once it has absorbed this multiple of its rating
pub const SHIELD_BREAK_FACTOR: f32 = 5.0;

/// Cooldown before blocking is allowed again after a break
pub const SHIELD_BREAK_COOLDOWN: f32 = 1.0;

/// Shorter stagger applied when blocking a back-attack
pub const BACK_ATTACK_STAGGER: f32 = 0.5;

/// Weapon/shield anchor relative to the body, flipped with facing
pub const WEAPON_OFFSET: Vec3 = Vec3::new(8.0, 0.0, 1.0);

/// Default hit-flash color (RGB; alpha comes from the stun timer)
pub const HIT_COLOR: Vec3 = Vec3::new(1.0, 0.1, 0.1);

/// Body hit-detection volume, centered on the character's feet
pub const HITBOX_CHAR: Aabb = Aabb::new(Vec3::new(-6.0, 0.0, -2.0), Vec3::new(6.0, 16.0, 2.0));

/// Unarmed/default melee reach
pub const HITBOX_WEAPON_SMALL: Aabb =
    Aabb::new(Vec3::new(-8.0, 0.0, -3.0), Vec3::new(8.0, 16.0, 3.0));

/// Projectile hit-detection volume
pub const HITBOX_PROJECTILE: Aabb =
    Aabb::new(Vec3::new(-4.0, 4.0, -2.0), Vec3::new(4.0, 12.0, 2.0));

/// Source rectangles into the 128x64 sprite atlas (16x16 cells; animated
/// sprites own two adjacent columns)
pub mod atlas {
    use crate::core::geom::Rect;

    pub const KNIGHT: Rect = Rect::new(0.0, 0.0, 16.0, 16.0);
    pub const ROGUE: Rect = Rect::new(32.0, 0.0, 16.0, 16.0);
    pub const MAGE: Rect = Rect::new(64.0, 0.0, 16.0, 16.0);
    pub const BANDIT: Rect = Rect::new(96.0, 0.0, 16.0, 16.0);

    pub const SWORD: Rect = Rect::new(0.0, 16.0, 16.0, 16.0);
    pub const SPEAR: Rect = Rect::new(32.0, 16.0, 16.0, 16.0);
    pub const BOW: Rect = Rect::new(64.0, 16.0, 16.0, 16.0);
    pub const ARROW: Rect = Rect::new(96.0, 16.0, 16.0, 16.0);

    pub const SHIELD: Rect = Rect::new(0.0, 32.0, 16.0, 16.0);
    pub const STEEL_SHIELD: Rect = Rect::new(32.0, 32.0, 16.0, 16.0);
    pub const ARMOR: Rect = Rect::new(64.0, 32.0, 16.0, 16.0);
    pub const CAPE: Rect = Rect::new(80.0, 32.0, 16.0, 16.0);
}

/// Map a base sprite cell and an animation time (or discrete pose index) to
/// the cell for that moment: column = floor(time) mod [`SPRITE_COLUMNS`].
/// Pure and deterministic.
pub fn frame(base: Rect, time: f32) -> Rect {
    let column = (time.floor() as i32).rem_euclid(SPRITE_COLUMNS);
    Rect::new(base.x + base.w * column as f32, base.y, base.w, base.h)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_cycles_columns() {
        let base = atlas::KNIGHT;
        assert_eq!(frame(base, 0.0), base);
        assert_eq!(frame(base, 0.9), base);
        assert_eq!(frame(base, 1.0).x, base.x + base.w);
        assert_eq!(frame(base, 2.0), base);
        assert_eq!(frame(base, 3.5).x, base.x + base.w);
    }

    #[test]
    fn test_frame_pose_index() {
        // Binary pose selection: 0 = rest, 1 = swing/raised
        let weapon = atlas::SWORD;
        assert_eq!(frame(weapon, 0.0), weapon);
        assert_eq!(frame(weapon, 1.0).x, weapon.x + weapon.w);
    }

    #[test]
    fn test_frame_handles_negative_time() {
        let base = atlas::BANDIT;
        let rect = frame(base, -1.0);
        assert!(rect.x >= base.x);
        assert!(rect.x <= base.x + base.w);
    }

    #[test]
    fn test_frame_is_deterministic() {
        let base = atlas::ROGUE;
        assert_eq!(frame(base, 7.3), frame(base, 7.3));
    }
}
