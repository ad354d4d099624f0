//! Player state machine
//!
//! The player is an explicit four-state machine. Each state owns exactly one
//! hitbox profile, and entering a state swaps the whole profile in at once.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::hitbox::{Aabb, HitboxProfile};
use crate::tuning::Tuning;

/// Movement state of the runner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerState {
    /// On the ground, upright
    Running,
    /// Mid-jump or falling
    Airborne,
    /// On the ground, crouched under air obstacles
    Ducking,
    /// Caught; absorbing
    Dead,
}

/// Cosmetic jump animation, no effect on physics or hitbox
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JumpVariant {
    Primary,
    Pirouette,
}

impl JumpVariant {
    /// Draw a variant, `primary_weight` being the chance of `Primary`
    pub fn pick<R: Rng>(rng: &mut R, primary_weight: f64) -> Self {
        if rng.random_bool(primary_weight) {
            JumpVariant::Primary
        } else {
            JumpVariant::Pirouette
        }
    }
}

/// Control intents sampled for one tick (level signals)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Intent {
    pub jump: bool,
    pub duck: bool,
}

/// Something the player did this tick that audio/UX cares about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerCue {
    Jumped(JumpVariant),
    DuckEntered,
}

/// One hitbox per state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerProfiles {
    pub running: HitboxProfile,
    pub airborne: HitboxProfile,
    pub ducking: HitboxProfile,
}

impl PlayerProfiles {
    pub fn from_tuning(tuning: &Tuning) -> Self {
        Self {
            running: tuning.running_hitbox,
            airborne: tuning.airborne_hitbox,
            ducking: tuning.ducking_hitbox,
        }
    }

    /// The profile a state uses; `Dead` keeps the upright geometry
    pub fn for_state(&self, state: PlayerState) -> HitboxProfile {
        match state {
            PlayerState::Running | PlayerState::Dead => self.running,
            PlayerState::Airborne => self.airborne,
            PlayerState::Ducking => self.ducking,
        }
    }
}

/// Transition table
///
/// Pure function of the current state, the sampled intents, the grounded
/// signal and the vertical velocity (negative while rising).
pub fn next_state(state: PlayerState, intent: Intent, grounded: bool, vel_y: f32) -> PlayerState {
    use PlayerState::*;

    match state {
        Dead => Dead,
        Running if intent.jump && grounded => Airborne,
        Running if intent.duck && grounded => Ducking,
        Running => Running,
        Ducking if !intent.duck => Running,
        Ducking => Ducking,
        Airborne if grounded && vel_y >= 0.0 => {
            if intent.duck {
                Ducking
            } else {
                Running
            }
        }
        Airborne => Airborne,
    }
}

/// The runner
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Feet position; x is fixed relative to the world
    pub pos: Vec2,
    /// Vertical velocity in px/s (negative = up)
    pub vel_y: f32,
    /// Last grounded signal consumed
    pub grounded: bool,
    /// Variant of the most recent jump
    pub jump_variant: JumpVariant,
    state: PlayerState,
    hitbox: HitboxProfile,
    profiles: PlayerProfiles,
    frame: Vec2,
}

impl Player {
    pub fn new(tuning: &Tuning) -> Self {
        let profiles = PlayerProfiles::from_tuning(tuning);
        Self {
            pos: Vec2::new(tuning.player_x, tuning.ground_y()),
            vel_y: 0.0,
            grounded: true,
            jump_variant: JumpVariant::Primary,
            state: PlayerState::Running,
            hitbox: profiles.running,
            profiles,
            frame: Vec2::new(tuning.player_frame.0, tuning.player_frame.1),
        }
    }

    #[inline]
    pub fn state(&self) -> PlayerState {
        self.state
    }

    #[inline]
    pub fn hitbox(&self) -> HitboxProfile {
        self.hitbox
    }

    #[inline]
    pub fn is_dead(&self) -> bool {
        self.state == PlayerState::Dead
    }

    /// Hitbox placed in world space
    pub fn hitbox_rect(&self) -> Aabb {
        self.hitbox.world_rect(self.pos, self.frame, 1.0)
    }

    /// Animation key a renderer should play
    pub fn visual_key(&self) -> &'static str {
        match self.state {
            PlayerState::Running => "run",
            PlayerState::Airborne => match self.jump_variant {
                JumpVariant::Primary => "jump",
                JumpVariant::Pirouette => "pirouette",
            },
            PlayerState::Ducking => "duck",
            PlayerState::Dead => "dead",
        }
    }

    /// Enter a state and apply its profile in one step
    fn enter(&mut self, state: PlayerState) {
        self.state = state;
        self.hitbox = self.profiles.for_state(state);
    }

    /// Run the state machine for one tick
    pub fn update<R: Rng>(
        &mut self,
        intent: Intent,
        grounded: bool,
        rng: &mut R,
        tuning: &Tuning,
    ) -> Option<PlayerCue> {
        self.grounded = grounded;

        let from = self.state;
        let to = next_state(from, intent, grounded, self.vel_y);
        if to == from {
            return None;
        }

        log::trace!("player {:?} -> {:?}", from, to);
        self.enter(to);

        match (from, to) {
            (PlayerState::Running, PlayerState::Airborne) => {
                self.vel_y = -tuning.jump_impulse;
                self.grounded = false;
                self.jump_variant = JumpVariant::pick(rng, tuning.jump_primary_weight);
                Some(PlayerCue::Jumped(self.jump_variant))
            }
            (_, PlayerState::Ducking) => Some(PlayerCue::DuckEntered),
            _ => None,
        }
    }

    /// Force the terminal state
    pub fn kill(&mut self) {
        if !self.is_dead() {
            self.enter(PlayerState::Dead);
        }
    }

    /// Built-in arcade body: integrate gravity and rest on the ground line
    ///
    /// Returns the grounded signal for this tick.
    pub fn integrate(&mut self, gravity: f32, dt: f32, ground_y: f32) -> bool {
        self.vel_y += gravity * dt;
        self.pos.y += self.vel_y * dt;
        if self.pos.y >= ground_y {
            self.pos.y = ground_y;
            self.vel_y = self.vel_y.min(0.0);
            true
        } else {
            false
        }
    }

    /// Keep the feet from sinking below the ground line
    ///
    /// Returns true if a correction was applied.
    pub fn settle(&mut self, ground_y: f32) -> bool {
        if self.pos.y > ground_y {
            self.pos.y = ground_y;
            self.vel_y = 0.0;
            true
        } else {
            false
        }
    }
}
