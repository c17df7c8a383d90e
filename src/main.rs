use anyhow::Result;
use glam::Vec2;
use log::{error, info};
use std::sync::Arc;
use std::time::Instant;
use winit::{
    event::{Event, WindowEvent},
    event_loop::EventLoop,
    keyboard::{KeyCode, PhysicalKey},
    window::WindowBuilder,
};

mod core;
mod engine;
mod game;

use engine::audio::{AudioSink, NullAudio, Sound};
use engine::renderer::Renderer;
use game::action::ActionSet;
use game::combat::{Armor, Character, Effect, Projectile, Weapon};
use game::config::atlas;

/// Projectiles past this distance from the origin are discarded
const ARENA_HALF_WIDTH: f32 = 200.0;

/// Distance at which the bandit swings instead of approaching
const BANDIT_REACH: f32 = 24.0;

fn main() -> Result<()> {
    // Initialize logger
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    info!("Starting Ironbrand...");

    let event_loop = EventLoop::new()?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title("Ironbrand")
            .with_inner_size(winit::dpi::LogicalSize::new(1280, 720))
            .with_resizable(true)
            .build(&event_loop)?,
    );

    let mut renderer = pollster::block_on(Renderer::new(window.clone()))?;

    let mut hero = Character::new(
        0,
        10.0,
        atlas::KNIGHT,
        Some(Armor::plate()),
        Some(atlas::CAPE),
        true,
    );
    hero.set_weapon(Some(Weapon::sword()));
    hero.set_shield(Some(Weapon::shield()));
    hero.sprite.position.x = -40.0;

    let mut bandit = Character::new(1, 6.0, atlas::BANDIT, None, None, false);
    bandit.set_weapon(Some(Weapon::sword()));
    bandit.sprite.position.x = 40.0;
    bandit.sprite.face_forward = false;

    let mut audio = NullAudio;
    let mut projectiles: Vec<Projectile> = Vec::new();
    let start = Instant::now();
    let mut last_t = 0.0f32;
    let mut bandit_next_attack = 0.0f32;

    event_loop
        .run(move |event, elwt| match event {
            Event::WindowEvent {
                event: WindowEvent::CloseRequested,
                ..
            } => {
                info!("Close requested, shutting down...");
                elwt.exit();
            }
            Event::WindowEvent {
                event: WindowEvent::Resized(physical_size),
                ..
            } => {
                renderer.resize(physical_size);
            }
            Event::WindowEvent {
                event: WindowEvent::KeyboardInput { event: key, .. },
                ..
            } => {
                if let PhysicalKey::Code(code) = key.physical_key {
                    if let Some(action) = action_for_key(code) {
                        hero.actions.set(action, key.state.is_pressed());
                    }
                }
            }
            Event::WindowEvent {
                event: WindowEvent::RedrawRequested,
                ..
            } => {
                let t = start.elapsed().as_secs_f32();
                let dt = t - last_t;
                last_t = t;

                // Bandit AI: close in on the hero, swing when in reach
                bandit.actions = ActionSet::empty();
                if bandit.is_alive() && hero.is_alive() {
                    let dx = hero.position().x - bandit.position().x;
                    if dx.abs() > BANDIT_REACH {
                        bandit.actions |= if dx < 0.0 {
                            ActionSet::LEFT
                        } else {
                            ActionSet::RIGHT
                        };
                    } else {
                        bandit.sprite.face_forward = dx >= 0.0;
                        if t >= bandit_next_attack {
                            bandit.actions |= ActionSet::ATTACK;
                            bandit_next_attack = t + bandit.attack_delay;
                        }
                    }
                }

                hero.update(t, &mut audio);
                bandit.update(t, &mut audio);

                // Movement collaborator: integrate velocity into position
                integrate(&mut hero, dt);
                integrate(&mut bandit, dt);

                // Combat collaborator: melee sensors against body hitboxes
                resolve_melee(&hero, &mut bandit, &mut audio);
                resolve_melee(&bandit, &mut hero, &mut audio);

                // Projectile collaborator takes ownership of spawns
                if let Some(p) = hero.projectile.take() {
                    projectiles.push(p);
                }
                if let Some(p) = bandit.projectile.take() {
                    projectiles.push(p);
                }
                step_projectiles(&mut projectiles, dt, &mut hero, &mut bandit);

                renderer
                    .camera_mut()
                    .set_position(Vec2::new(hero.position().x, 24.0));

                let batcher = renderer.batcher_mut();
                hero.render(batcher, t);
                bandit.render(batcher, t);
                for p in &projectiles {
                    batcher.submit(p.sprite, p.position, p.velocity.x, 1.0, None);
                }

                if let Err(err) = renderer.render() {
                    error!("Render error: {}", err);
                }
            }
            Event::AboutToWait => {
                window.request_redraw();
            }
            _ => {}
        })
        .map_err(|e| anyhow::anyhow!("Event loop error: {}", e))?;

    Ok(())
}

/// Map a key to the action bit it holds
fn action_for_key(code: KeyCode) -> Option<ActionSet> {
    match code {
        KeyCode::KeyA | KeyCode::ArrowLeft => Some(ActionSet::LEFT),
        KeyCode::KeyD | KeyCode::ArrowRight => Some(ActionSet::RIGHT),
        KeyCode::KeyW | KeyCode::ArrowUp => Some(ActionSet::UP),
        KeyCode::KeyS | KeyCode::ArrowDown => Some(ActionSet::DOWN),
        KeyCode::KeyJ | KeyCode::Space => Some(ActionSet::ATTACK),
        KeyCode::KeyK | KeyCode::ShiftLeft => Some(ActionSet::BLOCK),
        _ => None,
    }
}

/// Advance a character's position and apply idle friction
fn integrate(ch: &mut Character, dt: f32) {
    ch.sprite.position += ch.velocity * dt;
    if !ch.sprite.is_walking {
        ch.velocity -= ch.velocity * (ch.friction * dt).min(1.0);
    }
}

/// Total melee damage of a character's current swing
fn melee_damage(ch: &Character) -> f32 {
    ch.attack_power + ch.weapon().map_or(0.0, |w| w.damage)
}

/// Whether an attack from `attacker_x` hits the defender's front side
fn is_front_attack(attacker_x: f32, defender: &Character) -> bool {
    let facing = if defender.face_forward() { 1.0 } else { -1.0 };
    (attacker_x - defender.position().x) * facing >= 0.0
}

/// Apply this frame's melee sensors to a defender
fn resolve_melee(attacker: &Character, defender: &mut Character, audio: &mut dyn AudioSink) {
    for sensor in &attacker.sensors {
        if sensor.intersects(&defender.world_hitbox()) {
            let front = is_front_attack(attacker.position().x, defender);
            let landed = defender.damage(melee_damage(attacker), front, Effect::None);
            if !landed && defender.blocking() {
                audio.play(Sound::SwordClash);
            }
            break;
        }
    }
}

/// Move projectiles, resolve their hits, and cull spent ones
fn step_projectiles(
    projectiles: &mut Vec<Projectile>,
    dt: f32,
    hero: &mut Character,
    bandit: &mut Character,
) {
    let mut i = 0;
    while i < projectiles.len() {
        let mut remove = false;
        {
            let p = &mut projectiles[i];
            p.position += p.velocity * dt;
            for target in [&mut *hero, &mut *bandit] {
                if target.id == p.owner || !target.is_alive() {
                    continue;
                }
                if p.hitbox().intersects(&target.world_hitbox()) {
                    let facing = if target.face_forward() { 1.0 } else { -1.0 };
                    // Frontal if the defender faces into the arrow's travel
                    let front = facing * p.velocity.x < 0.0;
                    target.damage(p.damage, front, p.effect);
                    remove = true;
                }
            }
            if p.position.x.abs() > ARENA_HALF_WIDTH {
                remove = true;
            }
        }
        if remove {
            projectiles.swap_remove(i);
        } else {
            i += 1;
        }
    }
}
