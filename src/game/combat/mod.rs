// Combat system
//
// Everything that turns input into fights:
// - Character state machine and damage resolution
// - Character sprite animation state
// - Equipment value objects and projectiles

pub mod character;
pub mod equipment;
pub mod projectile;
pub mod sprite;

/// Unique identifier for a character
pub type CharacterId = u32;

// Re-export commonly used types
pub use character::Character;
pub use equipment::{Armor, ProjectileSpec, Weapon};
pub use projectile::{Effect, Projectile};
pub use sprite::CharacterSprite;
