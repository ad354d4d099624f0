//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Injected RNG only (seeded PCG by default)
//! - Stable iteration order (obstacles oldest first)
//! - No rendering, audio or storage dependencies

pub mod autopilot;
pub mod collision;
pub mod hitbox;
pub mod player;
pub mod pursuer;
pub mod spawner;
pub mod state;
pub mod tick;

pub use autopilot::{attract_input, autopilot};
pub use collision::{CollisionArbiter, DamageEvent, DamageOutcome, MistakeLog};
pub use hitbox::{Aabb, HitboxProfile};
pub use player::{Intent, JumpVariant, Player, PlayerCue, PlayerState};
pub use pursuer::{PursuerModel, TerminalCause};
pub use spawner::{Lane, Obstacle, ObstacleArchetype, ObstacleSpawner};
pub use state::{BodySample, GameEvent, GameOver, RunSession, RunState, Snapshot};
pub use tick::{TickInput, advance, tick};
