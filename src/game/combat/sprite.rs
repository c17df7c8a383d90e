// Visual state of one character: walk cycle, swing and hit-flash timers,
// death fade. Emits up to five instance records per frame (body, armor,
// cape, weapon, shield).

use super::projectile::Effect;
use crate::core::geom::Rect;
use crate::engine::renderer::SpriteBatcher;
use crate::game::config::{
    self, frame, ATTACK_DURATION, HIT_STUN, SWING_POSE_THRESHOLD, WALK_RATE,
};
use glam::Vec3;

/// Death-fade floor; reaching it makes the sprite fully dead
const FADE_FLOOR: f32 = 0.001;

/// Animation and visual state for one character
#[derive(Debug)]
pub struct CharacterSprite {
    pub position: Vec3,
    pub face_forward: bool,
    pub is_walking: bool,
    pub is_blocking: bool,
    pub is_dead: bool,
    /// Terminal state: the death fade has completed
    pub is_fully_dead: bool,
    /// Remaining swing time; weapon shows its swing pose while high
    pub is_attacking: f32,
    /// Remaining hit-stun time; drives the flash tint
    pub is_hit: f32,
    /// Body cell in the atlas
    pub body: Rect,
    /// Referenced equipment cells, mirrored from the equipped items
    pub weapon: Option<Rect>,
    pub shield: Option<Rect>,
    pub armor: Option<Rect>,
    pub cape: Option<Rect>,
    hit_effect: Effect,
    alpha: f32,
    last_time: Option<f32>,
}

impl CharacterSprite {
    pub fn new(body: Rect, armor: Option<Rect>, cape: Option<Rect>) -> Self {
        Self {
            position: Vec3::ZERO,
            face_forward: true,
            is_walking: false,
            is_blocking: false,
            is_dead: false,
            is_fully_dead: false,
            is_attacking: 0.0,
            is_hit: 0.0,
            body,
            weapon: None,
            shield: None,
            armor,
            cape,
            hit_effect: Effect::None,
            alpha: 1.0,
            last_time: None,
        }
    }

    /// Submit this character's instance records for the frame and advance
    /// the visual timers. The first call latches `t`, so it has no
    /// elapsed-time effect.
    pub fn render(&mut self, batcher: &mut SpriteBatcher, t: f32) {
        let dt = t - self.last_time.unwrap_or(t);

        if self.is_dead {
            if self.alpha - dt <= FADE_FLOOR {
                self.is_fully_dead = true;
            }
            self.alpha = (self.alpha - dt).max(FADE_FLOOR);
        }

        let dir = if self.face_forward { 1.0 } else { -1.0 };
        let tint = (self.is_hit > 0.0)
            .then(|| self.hit_effect.flash_color().extend(self.is_hit * 2.0));
        let body = if self.is_walking && !self.is_dead {
            frame(self.body, t * WALK_RATE)
        } else {
            self.body
        };

        batcher.submit(body, self.position, dir, self.alpha, tint);
        if let Some(armor) = self.armor {
            batcher.submit(armor, self.position, dir, self.alpha, tint);
        }
        if let Some(cape) = self.cape {
            batcher.submit(cape, self.position, dir, self.alpha, tint);
        }

        let anchor = self.position + config::WEAPON_OFFSET * dir;
        if let Some(weapon) = self.weapon {
            let pose = if self.is_attacking > SWING_POSE_THRESHOLD {
                1.0
            } else {
                0.0
            };
            batcher.submit(frame(weapon, pose), anchor, dir, self.alpha, tint);
        }
        if let Some(shield) = self.shield {
            let pose = if self.is_blocking { 1.0 } else { 0.0 };
            batcher.submit(frame(shield, pose), anchor, dir, self.alpha, tint);
        }

        self.is_attacking = (self.is_attacking - dt).max(0.0);
        self.is_hit = (self.is_hit - dt).max(0.0);
        self.last_time = Some(t);
    }

    /// Re-arm the hit flash and stun timer. Not additive: re-triggering
    /// resets to the full duration.
    pub fn hit(&mut self, effect: Effect) {
        self.is_hit = HIT_STUN;
        self.hit_effect = effect;
    }

    /// Re-arm the swing timer, scaled by the weapon's speed multiplier.
    /// Not additive: re-triggering resets to the full duration.
    pub fn attack(&mut self, speed: f32) {
        self.is_attacking = ATTACK_DURATION * speed;
    }
}
