//! Data-driven game balance
//!
//! Every number the simulation reads lives here so a run can be re-tuned
//! from a JSON file without touching the sim code.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::SIM_DT;
use crate::sim::hitbox::HitboxProfile;
use crate::sim::spawner::{Lane, ObstacleArchetype};

/// Errors raised while loading or checking a tuning file
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("tuning JSON could not be parsed: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("{lane:?} obstacle catalog is empty")]
    EmptyCatalog { lane: Lane },

    #[error("{field} must be positive, got {value}")]
    NotPositive { field: &'static str, value: f32 },

    #[error("{field} must not be negative, got {value}")]
    Negative { field: &'static str, value: f32 },

    #[error("spawn interval {0}s is shorter than one tick")]
    SpawnInterval(f32),

    #[error("initial danger distance {initial} exceeds the cap {cap}")]
    InitialAboveCap { initial: f32, cap: f32 },

    #[error("smoothing factor {0} is outside (0, 1]")]
    Smoothing(f32),

    #[error("jump primary weight {0} is outside [0, 1]")]
    JumpWeight(f64),

    #[error("mistake limit must be at least 1")]
    MistakeLimit,
}

/// Game balance parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === World ===
    pub world_width: f32,
    pub world_height: f32,
    /// Distance of the ground line above the bottom edge
    pub ground_margin: f32,

    // === Run pacing ===
    pub start_speed: f32,
    /// Added to the world speed every tick (no cap)
    pub speed_step: f32,
    /// Metres gained per tick per unit of speed
    pub distance_factor: f32,

    // === Player ===
    pub player_x: f32,
    /// Upward velocity applied on jump (px/s)
    pub jump_impulse: f32,
    /// Gravity used by the built-in arcade body (px/s²)
    pub gravity: f32,
    /// Chance of the primary jump animation over the pirouette
    pub jump_primary_weight: f64,
    pub player_frame: (f32, f32),
    pub running_hitbox: HitboxProfile,
    pub airborne_hitbox: HitboxProfile,
    pub ducking_hitbox: HitboxProfile,

    // === Obstacles ===
    /// Seconds between spawns
    pub spawn_interval: f32,
    /// Spawn position past the right edge
    pub spawn_margin: f32,
    /// Obstacles left of this x are retired
    pub retire_x: f32,
    pub ground_catalog: Vec<ObstacleArchetype>,
    pub air_catalog: Vec<ObstacleArchetype>,

    // === Pursuer ===
    pub pursuer_start_x: f32,
    pub pursuer_frame_width: f32,
    pub danger_initial: f32,
    pub danger_cap: f32,
    pub hit_penalty: f32,
    /// Recovery per tick while below the cap
    pub danger_recovery: f32,
    /// On-screen px per unit of danger distance
    pub pursuer_spacing: f32,
    /// Exponential smoothing factor per tick
    pub pursuer_smoothing: f32,
    /// Horizontal gap at which the pursuer catches the player
    pub catch_radius: f32,

    // === Mistakes ===
    /// Trailing window for repeated collisions (seconds)
    pub mistake_window: f64,
    /// Collisions inside the window that are fatal
    pub mistake_limit: usize,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            world_width: 800.0,
            world_height: 450.0,
            ground_margin: 80.0,

            start_speed: 6.0,
            speed_step: 0.001,
            distance_factor: 0.05,

            player_x: 250.0,
            jump_impulse: 650.0,
            gravity: 1000.0,
            jump_primary_weight: 0.7,
            player_frame: (152.0, 140.0),
            running_hitbox: HitboxProfile::new(50.0, 120.0, 50.0, 20.0),
            airborne_hitbox: HitboxProfile::new(40.0, 80.0, 45.0, 10.0),
            ducking_hitbox: HitboxProfile::new(50.0, 60.0, 50.0, 80.0),

            spawn_interval: 1.5,
            spawn_margin: 50.0,
            retire_x: -100.0,
            ground_catalog: vec![
                ObstacleArchetype::ground("crate", 50.0, 70.0, 1.0),
                ObstacleArchetype::ground("barrel", 44.0, 60.0, 1.0),
                ObstacleArchetype::ground("cone", 40.0, 52.0, 1.0),
            ],
            air_catalog: vec![
                ObstacleArchetype::air("wall", 50.0, 400.0, 100.0, 1.0),
                ObstacleArchetype::air("beam", 90.0, 300.0, 100.0, 1.0),
                ObstacleArchetype::air("sign", 70.0, 220.0, 96.0, 1.0),
            ],

            pursuer_start_x: 50.0,
            pursuer_frame_width: 145.0,
            danger_initial: 100.0,
            danger_cap: 150.0,
            hit_penalty: 40.0,
            danger_recovery: 0.05,
            pursuer_spacing: 3.0,
            pursuer_smoothing: 0.1,
            catch_radius: 148.5,

            mistake_window: 10.0,
            mistake_limit: 2,
        }
    }
}

impl Tuning {
    /// Y coordinate of the ground line (feet rest here)
    pub fn ground_y(&self) -> f32 {
        self.world_height - self.ground_margin
    }

    /// X at which new obstacles appear
    pub fn spawn_x(&self) -> f32 {
        self.world_width + self.spawn_margin
    }

    /// Parse and validate a tuning file
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    pub fn to_json(&self) -> Result<String, TuningError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject parameter sets the simulation cannot run with
    pub fn validate(&self) -> Result<(), TuningError> {
        if self.ground_catalog.is_empty() {
            return Err(TuningError::EmptyCatalog { lane: Lane::Ground });
        }
        if self.air_catalog.is_empty() {
            return Err(TuningError::EmptyCatalog { lane: Lane::Air });
        }

        let positives = [
            ("world_width", self.world_width),
            ("world_height", self.world_height),
            ("spawn_interval", self.spawn_interval),
            ("start_speed", self.start_speed),
            ("danger_cap", self.danger_cap),
            ("catch_radius", self.catch_radius),
        ];
        for (field, value) in positives {
            if value <= 0.0 || !value.is_finite() {
                return Err(TuningError::NotPositive { field, value });
            }
        }
        // Rates and penalties may be zero but never negative
        let non_negatives = [
            ("speed_step", self.speed_step),
            ("distance_factor", self.distance_factor),
            ("jump_impulse", self.jump_impulse),
            ("gravity", self.gravity),
            ("danger_initial", self.danger_initial),
            ("hit_penalty", self.hit_penalty),
            ("danger_recovery", self.danger_recovery),
            ("pursuer_spacing", self.pursuer_spacing),
        ];
        for (field, value) in non_negatives {
            if value < 0.0 || !value.is_finite() {
                return Err(TuningError::Negative { field, value });
            }
        }
        if self.spawn_interval < SIM_DT {
            return Err(TuningError::SpawnInterval(self.spawn_interval));
        }
        if self.mistake_window <= 0.0 || !self.mistake_window.is_finite() {
            return Err(TuningError::NotPositive {
                field: "mistake_window",
                value: self.mistake_window as f32,
            });
        }

        if self.danger_initial > self.danger_cap {
            return Err(TuningError::InitialAboveCap {
                initial: self.danger_initial,
                cap: self.danger_cap,
            });
        }
        if !(self.pursuer_smoothing > 0.0 && self.pursuer_smoothing <= 1.0) {
            return Err(TuningError::Smoothing(self.pursuer_smoothing));
        }
        if !(0.0..=1.0).contains(&self.jump_primary_weight) {
            return Err(TuningError::JumpWeight(self.jump_primary_weight));
        }
        if self.mistake_limit == 0 {
            return Err(TuningError::MistakeLimit);
        }
        Ok(())
    }
}
