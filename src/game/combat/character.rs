// Character combat state machine: turns the action bitmask into velocity,
// hit sensors, attacks, and projectiles, and resolves incoming damage
// against armor and the shield block state.

use super::equipment::{Armor, Weapon};
use super::projectile::{Effect, Projectile};
use super::sprite::CharacterSprite;
use super::CharacterId;
use crate::core::geom::{Aabb, Rect};
use crate::engine::audio::{AudioSink, Sound};
use crate::engine::renderer::SpriteBatcher;
use crate::game::action::ActionSet;
use crate::game::config::{
    self, BACK_ATTACK_STAGGER, SHIELD_BREAK_COOLDOWN, SHIELD_BREAK_FACTOR,
};
use glam::Vec3;

/// Depth movement is slower than lateral movement
const DEPTH_SPEED_FACTOR: f32 = 0.66;

/// Movement drag while holding a block
const BLOCK_DRAG: f32 = 0.5;

/// A player- or AI-controlled combatant
#[derive(Debug)]
pub struct Character {
    pub id: CharacterId,
    /// Visual state; position is written by the movement collaborator
    pub sprite: CharacterSprite,
    pub velocity: Vec3,
    pub hitpoint: f32,
    pub max_hitpoint: f32,
    /// Unarmed base damage
    pub attack_power: f32,
    /// Minimum time between AI attack decisions
    pub attack_delay: f32,
    pub speed: f32,
    /// Read by the movement collaborator to decay velocity when idle
    pub friction: f32,
    /// Body hit-detection volume, relative to position
    pub hitbox: Aabb,
    /// Hit-detection volumes generated this frame, in world space;
    /// cleared at the start of every update
    pub sensors: Vec<Aabb>,
    /// Action bits held this frame, written by the input collaborator
    pub actions: ActionSet,
    /// Spawned this frame; the projectile collaborator takes ownership
    pub projectile: Option<Projectile>,
    pub is_hero: bool,
    armor: Option<Armor>,
    weapon: Option<Weapon>,
    shield: Option<Weapon>,
    /// Damage absorbed by the shield since it last broke
    blocked_damage: f32,
    /// Cooldown during which blocking is disallowed
    shield_broken: f32,
    last_time: Option<f32>,
}

impl Character {
    pub fn new(
        id: CharacterId,
        hitpoint: f32,
        body: Rect,
        armor: Option<Armor>,
        cape: Option<Rect>,
        is_hero: bool,
    ) -> Self {
        let armor_sprite = armor.as_ref().map(|a| a.sprite);
        Self {
            id,
            sprite: CharacterSprite::new(body, armor_sprite, cape),
            velocity: Vec3::ZERO,
            hitpoint,
            max_hitpoint: hitpoint,
            attack_power: 1.0,
            attack_delay: 1.0,
            speed: 24.0,
            friction: 16.0,
            hitbox: config::HITBOX_CHAR,
            sensors: Vec::new(),
            actions: ActionSet::empty(),
            projectile: None,
            is_hero,
            armor,
            weapon: None,
            shield: None,
            blocked_damage: 0.0,
            shield_broken: 0.0,
            last_time: None,
        }
    }

    /// Advance the state machine one frame. The first call latches `t`.
    pub fn update(&mut self, t: f32, audio: &mut dyn AudioSink) {
        let dt = t - self.last_time.unwrap_or(t);
        self.last_time = Some(t);

        // Sensors never persist across frames
        self.sensors.clear();
        let was_walking = self.sprite.is_walking;
        self.sprite.is_walking = false;

        // Dead characters are frozen; only the sprite fade continues
        if self.sprite.is_dead {
            return;
        }

        self.shield_broken = (self.shield_broken - dt).max(0.0);
        self.sprite.is_blocking = self.shield_broken == 0.0
            && self.shield.is_some()
            && self.actions.contains(ActionSet::BLOCK);

        if self.actions.contains(ActionSet::LEFT) && !self.actions.contains(ActionSet::RIGHT) {
            self.sprite.face_forward = false;
        } else if self.actions.contains(ActionSet::RIGHT) {
            self.sprite.face_forward = true;
        }

        // Stunned: no movement or attacks until the hit timer decays
        if self.sprite.is_hit > 0.0 {
            return;
        }

        if !self.sprite.is_blocking
            && self.sprite.is_attacking == 0.0
            && self.actions.contains(ActionSet::ATTACK)
        {
            let speed = self.weapon.as_ref().map_or(1.0, |w| w.speed);
            self.sprite.attack(speed);

            let reach = self
                .weapon
                .as_ref()
                .map_or(config::HITBOX_WEAPON_SMALL, |w| w.hitbox);
            let dir = if self.sprite.face_forward { 1.0 } else { -1.0 };
            self.sensors
                .push(reach.translated(self.sprite.position + config::WEAPON_OFFSET * dir));

            if let Some(spec) = self.weapon.as_ref().and_then(|w| w.projectile.as_ref()) {
                let mut proj = spec.spawn(self.sprite.position, self.sprite.face_forward, self.id);
                // Inherit the shooter's momentum
                proj.velocity.x += self.velocity.x;
                proj.velocity.z += self.velocity.z;
                self.projectile = Some(proj);
            }
        }

        let drag = if self.sprite.is_blocking {
            BLOCK_DRAG
        } else {
            1.0
        };
        if self.actions.is_moving() {
            // Velocity is recomputed from scratch every frame
            self.velocity = Vec3::ZERO;
            if self.actions.contains(ActionSet::UP) {
                self.velocity.z = -self.speed * DEPTH_SPEED_FACTOR * drag;
            }
            if self.actions.contains(ActionSet::DOWN) {
                self.velocity.z = self.speed * DEPTH_SPEED_FACTOR * drag;
            }
            if self.actions.contains(ActionSet::LEFT) {
                self.velocity.x = -self.speed * drag;
            }
            if self.actions.contains(ActionSet::RIGHT) {
                self.velocity.x = self.speed * drag;
            }
            self.sprite.is_walking = true;
        }

        if self.is_hero
            && self.sprite.is_walking
            && (!was_walking || audio.is_finished(Sound::Footstep))
        {
            audio.play(Sound::Footstep);
        }
    }

    /// Submit this character's sprites for the frame
    pub fn render(&mut self, batcher: &mut SpriteBatcher, t: f32) {
        self.sprite.render(batcher, t);
    }

    /// Resolve an incoming hit. Returns whether it landed (dealt damage
    /// and was not blocked); a landed hit triggers the flash and stun.
    pub fn damage(&mut self, amount: f32, front_attack: bool, effect: Effect) -> bool {
        if self.hitpoint <= 0.0 {
            return false;
        }

        let armor = self.armor.as_ref().map_or(0.0, |a| a.defense);
        let mut damage = (amount - armor).max(0.0);

        let rating = self.shield.as_ref().map_or(0.0, |s| s.damage);
        let mut blocked = front_attack && self.sprite.is_blocking;
        if blocked {
            let absorbed = damage.min(rating);
            damage = (damage - rating).max(0.0);
            self.blocked_damage += absorbed;
            if self.blocked_damage >= rating * SHIELD_BREAK_FACTOR {
                // Shield breaks this instant; the hit counts as unblocked
                blocked = false;
                self.shield_broken = SHIELD_BREAK_COOLDOWN;
                self.blocked_damage = 0.0;
                self.sprite.is_blocking = false;
            }
        } else if !front_attack && self.sprite.is_blocking {
            // A hit from behind staggers the shield without breaking it
            self.shield_broken = BACK_ATTACK_STAGGER;
        }

        self.hitpoint -= damage;
        if self.hitpoint <= 0.0 {
            self.sprite.is_dead = true;
        }

        let landed = damage > 0.0 && !blocked;
        if landed {
            self.sprite.hit(effect);
        }
        landed
    }

    /// Equip or unequip the weapon, mirroring its sprite cell
    pub fn set_weapon(&mut self, weapon: Option<Weapon>) {
        self.sprite.weapon = weapon.as_ref().map(|w| w.sprite);
        self.weapon = weapon;
    }

    /// Equip or unequip the shield, mirroring its sprite cell
    pub fn set_shield(&mut self, shield: Option<Weapon>) {
        self.sprite.shield = shield.as_ref().map(|s| s.sprite);
        self.shield = shield;
    }

    pub fn weapon(&self) -> Option<&Weapon> {
        self.weapon.as_ref()
    }

    pub fn shield(&self) -> Option<&Weapon> {
        self.shield.as_ref()
    }

    pub fn armor(&self) -> Option<&Armor> {
        self.armor.as_ref()
    }

    pub fn position(&self) -> Vec3 {
        self.sprite.position
    }

    pub fn face_forward(&self) -> bool {
        self.sprite.face_forward
    }

    pub fn blocking(&self) -> bool {
        self.sprite.is_blocking
    }

    pub fn is_alive(&self) -> bool {
        self.hitpoint > 0.0
    }

    /// True once the death fade has completed
    pub fn is_fully_dead(&self) -> bool {
        self.sprite.is_fully_dead
    }

    /// Body hit-detection volume at the current position
    pub fn world_hitbox(&self) -> Aabb {
        self.hitbox.translated(self.sprite.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::audio::NullAudio;
    use crate::game::config::atlas;
    use approx::assert_relative_eq;

    fn character() -> Character {
        Character::new(0, 10.0, atlas::KNIGHT, None, None, false)
    }

    fn update(ch: &mut Character, t: f32) {
        let mut audio = NullAudio;
        ch.update(t, &mut audio);
    }

    #[test]
    fn test_lethal_unblocked_hit_kills() {
        let mut ch = character();
        let landed = ch.damage(15.0, true, Effect::None);
        assert!(landed);
        assert!(ch.hitpoint <= 0.0);
        assert!(ch.sprite.is_dead);
        // Further hits are no-ops
        assert!(!ch.damage(5.0, true, Effect::None));
    }

    #[test]
    fn test_armor_reduces_damage_flat() {
        let mut ch = Character::new(0, 10.0, atlas::KNIGHT, Some(Armor::plate()), None, false);
        ch.damage(3.0, true, Effect::None);
        assert_relative_eq!(ch.hitpoint, 8.0);
        // Damage never goes negative
        assert!(!ch.damage(0.5, true, Effect::None));
        assert_relative_eq!(ch.hitpoint, 8.0);
    }

    #[test]
    fn test_five_blocked_hits_break_the_shield() {
        let mut ch = character();
        ch.set_shield(Some(Weapon::shield()));
        ch.actions = ActionSet::BLOCK;
        update(&mut ch, 0.0);
        assert!(ch.blocking());

        // Shield rating is 4; each frontal hit of 4 is fully absorbed
        for _ in 0..4 {
            assert!(!ch.damage(4.0, true, Effect::None));
            assert!(ch.blocking());
        }
        // Fifth hit reaches 5x the rating: the shield breaks
        assert!(!ch.damage(4.0, true, Effect::None));
        assert!(!ch.blocking());
        assert_relative_eq!(ch.hitpoint, 10.0);

        // Cooldown prevents re-blocking until 1.0 elapses
        update(&mut ch, 0.5);
        assert!(!ch.blocking());
        update(&mut ch, 1.2);
        assert!(ch.blocking());
    }

    #[test]
    fn test_back_attack_staggers_without_reduction() {
        let mut ch = character();
        ch.set_shield(Some(Weapon::shield()));
        ch.actions = ActionSet::BLOCK;
        update(&mut ch, 0.0);
        assert!(ch.blocking());

        let landed = ch.damage(3.0, false, Effect::None);
        assert!(landed);
        assert_relative_eq!(ch.hitpoint, 7.0);

        // Stagger cooldown is 0.5, not the full break cooldown
        update(&mut ch, 0.3);
        assert!(!ch.blocking());
        update(&mut ch, 0.6);
        assert!(ch.blocking());
    }

    #[test]
    fn test_facing_follows_action_bits() {
        let mut ch = character();
        assert!(ch.face_forward());

        ch.actions = ActionSet::LEFT;
        update(&mut ch, 0.0);
        assert!(!ch.face_forward());

        ch.actions = ActionSet::RIGHT;
        update(&mut ch, 0.1);
        assert!(ch.face_forward());

        // Both held: the Right branch wins
        ch.actions = ActionSet::LEFT | ActionSet::RIGHT;
        update(&mut ch, 0.2);
        assert!(ch.face_forward());

        ch.actions = ActionSet::LEFT;
        update(&mut ch, 0.3);
        assert!(!ch.face_forward());
    }

    #[test]
    fn test_movement_recomputes_velocity_each_frame() {
        let mut ch = character();
        ch.actions = ActionSet::RIGHT | ActionSet::UP;
        update(&mut ch, 0.0);
        assert_relative_eq!(ch.velocity.x, ch.speed);
        assert_relative_eq!(ch.velocity.z, -ch.speed * 0.66);
        assert!(ch.sprite.is_walking);

        ch.actions = ActionSet::DOWN;
        update(&mut ch, 0.1);
        assert_relative_eq!(ch.velocity.x, 0.0);
        assert_relative_eq!(ch.velocity.z, ch.speed * 0.66);
    }

    #[test]
    fn test_blocking_halves_movement() {
        let mut ch = character();
        ch.set_shield(Some(Weapon::shield()));
        ch.actions = ActionSet::RIGHT | ActionSet::BLOCK;
        update(&mut ch, 0.0);
        assert!(ch.blocking());
        assert_relative_eq!(ch.velocity.x, ch.speed * 0.5);
    }

    #[test]
    fn test_attack_pushes_sensor_and_rearms_swing() {
        let mut ch = character();
        ch.actions = ActionSet::ATTACK;
        update(&mut ch, 0.0);
        assert_eq!(ch.sensors.len(), 1);
        assert!(ch.sprite.is_attacking > 0.0);

        // Mid-swing: no second sensor
        update(&mut ch, 0.1);
        assert!(ch.sensors.is_empty());
    }

    #[test]
    fn test_blocking_suppresses_attack() {
        let mut ch = character();
        ch.set_shield(Some(Weapon::shield()));
        ch.actions = ActionSet::BLOCK | ActionSet::ATTACK;
        update(&mut ch, 0.0);
        assert!(ch.sensors.is_empty());
        assert_relative_eq!(ch.sprite.is_attacking, 0.0);
    }

    #[test]
    fn test_ranged_attack_spawns_projectile_with_momentum() {
        let mut ch = character();
        ch.set_weapon(Some(Weapon::bow()));
        ch.velocity = Vec3::new(5.0, 0.0, 2.0);
        ch.actions = ActionSet::ATTACK;
        update(&mut ch, 0.0);

        let proj = ch.projectile.take().expect("projectile spawned");
        assert_eq!(proj.owner, ch.id);
        assert_relative_eq!(proj.velocity.x, 64.0 + 5.0);
        assert_relative_eq!(proj.velocity.z, 2.0);
    }

    #[test]
    fn test_stun_skips_movement_and_attacks() {
        let mut ch = character();
        ch.sprite.is_hit = 0.3;
        ch.actions = ActionSet::RIGHT | ActionSet::ATTACK;
        update(&mut ch, 0.0);
        assert_relative_eq!(ch.velocity.x, 0.0);
        assert!(ch.sensors.is_empty());
        // Facing still tracks input while stunned
        ch.actions = ActionSet::LEFT;
        update(&mut ch, 0.1);
        assert!(!ch.face_forward());
    }

    #[test]
    fn test_dead_update_is_a_noop() {
        let mut ch = character();
        ch.damage(20.0, true, Effect::None);
        ch.actions = ActionSet::RIGHT | ActionSet::ATTACK;
        update(&mut ch, 0.0);
        assert_relative_eq!(ch.velocity.x, 0.0);
        assert!(ch.sensors.is_empty());
        assert!(!ch.sprite.is_walking);
    }

    #[test]
    fn test_sensors_cleared_every_update() {
        let mut ch = character();
        ch.sensors.push(config::HITBOX_WEAPON_SMALL);
        ch.actions = ActionSet::empty();
        update(&mut ch, 0.0);
        assert!(ch.sensors.is_empty());
    }

    #[test]
    fn test_blocking_requires_shield() {
        let mut ch = character();
        ch.actions = ActionSet::BLOCK;
        update(&mut ch, 0.0);
        assert!(!ch.blocking());
    }

    #[test]
    fn test_equipping_mirrors_sprite_cells() {
        let mut ch = character();
        ch.set_weapon(Some(Weapon::sword()));
        ch.set_shield(Some(Weapon::shield()));
        assert_eq!(ch.sprite.weapon, Some(Weapon::sword().sprite));
        assert_eq!(ch.sprite.shield, Some(Weapon::shield().sprite));

        ch.set_weapon(None);
        assert_eq!(ch.sprite.weapon, None);
    }
}
