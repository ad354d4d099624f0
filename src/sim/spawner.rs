//! Obstacle spawning and retirement
//!
//! Obstacles are kinematic: no gravity, immovable, translated left by the
//! world speed every tick. The spawner is the only thing allowed to add or
//! remove entries from the live set.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::hitbox::{Aabb, HitboxProfile};
use crate::tuning::Tuning;

/// Which avoidance an obstacle demands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Lane {
    /// Sits on the ground, clear it by jumping
    Ground,
    /// Hangs above the ground, clear it by ducking under
    Air,
}

/// A catalog entry describing one obstacle type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObstacleArchetype {
    pub key: String,
    pub lane: Lane,
    /// Unscaled frame size
    pub width: f32,
    pub height: f32,
    /// Gap between the ground line and the frame's bottom edge
    #[serde(default)]
    pub clearance: f32,
    pub scale: f32,
    pub hitbox: HitboxProfile,
}

impl ObstacleArchetype {
    /// Ground obstacle whose hitbox is its whole frame
    pub fn ground(key: &str, width: f32, height: f32, scale: f32) -> Self {
        Self {
            key: key.to_string(),
            lane: Lane::Ground,
            width,
            height,
            clearance: 0.0,
            scale,
            hitbox: HitboxProfile::full(width, height),
        }
    }

    /// Air obstacle hanging `gap` px above the ground line
    pub fn air(key: &str, width: f32, height: f32, gap: f32, scale: f32) -> Self {
        Self {
            key: key.to_string(),
            lane: Lane::Air,
            width,
            height,
            clearance: gap,
            scale,
            hitbox: HitboxProfile::full(width, height),
        }
    }

    #[inline]
    pub fn frame(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }
}

/// A live obstacle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: u32,
    pub key: String,
    pub lane: Lane,
    /// Bottom-centre of the frame
    pub pos: Vec2,
    /// Horizontal velocity in px per tick (negative = leftward)
    pub vel_x: f32,
    /// Set once this obstacle has dealt damage
    pub struck: bool,
    frame: Vec2,
    scale: f32,
    hitbox: HitboxProfile,
}

impl Obstacle {
    fn from_archetype(id: u32, archetype: &ObstacleArchetype, x: f32, ground_y: f32) -> Self {
        Self {
            id,
            key: archetype.key.clone(),
            lane: archetype.lane,
            pos: Vec2::new(x, ground_y - archetype.clearance),
            vel_x: 0.0,
            struck: false,
            frame: archetype.frame(),
            scale: archetype.scale,
            hitbox: archetype.hitbox,
        }
    }

    pub fn hitbox_rect(&self) -> Aabb {
        self.hitbox.world_rect(self.pos, self.frame, self.scale)
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }
}

/// Result of one spawner tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpawnReport {
    /// (id, key) of the obstacle spawned this tick
    pub spawned: Option<(u32, String)>,
    pub retired: usize,
}

/// Pick an archetype, avoiding `previous` when another candidate exists
pub fn choose_archetype<'a, R: Rng>(
    catalog: &'a [ObstacleArchetype],
    previous: Option<&str>,
    rng: &mut R,
) -> Option<&'a ObstacleArchetype> {
    let candidates: Vec<&ObstacleArchetype> = catalog
        .iter()
        .filter(|a| Some(a.key.as_str()) != previous)
        .collect();

    if candidates.is_empty() {
        // Pool exhausted by the no-repeat rule: relax it
        if catalog.is_empty() {
            return None;
        }
        return Some(&catalog[rng.random_range(0..catalog.len())]);
    }
    Some(candidates[rng.random_range(0..candidates.len())])
}

/// Owns the live obstacle set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObstacleSpawner {
    obstacles: Vec<Obstacle>,
    /// Seconds since the last spawn
    timer: f64,
    last_key: Option<String>,
    next_id: u32,
}

impl Default for ObstacleSpawner {
    fn default() -> Self {
        Self::new()
    }
}

impl ObstacleSpawner {
    pub fn new() -> Self {
        Self {
            obstacles: Vec::new(),
            timer: 0.0,
            last_key: None,
            next_id: 1,
        }
    }

    /// Live obstacles, oldest first
    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    /// Mutable view for flag updates; the set itself cannot be resized
    pub fn obstacles_mut(&mut self) -> &mut [Obstacle] {
        &mut self.obstacles
    }

    /// Advance the spawn timer, spawn if due, then move and retire
    pub fn update<R: Rng>(
        &mut self,
        rng: &mut R,
        tuning: &Tuning,
        speed: f32,
        dt: f32,
    ) -> SpawnReport {
        let mut report = SpawnReport::default();

        self.timer += dt as f64;
        if self.timer >= tuning.spawn_interval as f64 {
            self.timer -= tuning.spawn_interval as f64;
            let lane = if rng.random_bool(0.5) {
                Lane::Ground
            } else {
                Lane::Air
            };
            if let Some(obstacle) = self.spawn_in_lane(lane, rng, tuning) {
                report.spawned = Some((obstacle.id, obstacle.key.clone()));
            }
        }

        report.retired = self.advance(speed, tuning.retire_x);
        report
    }

    /// Spawn one obstacle from the given lane's catalog at the right edge
    pub fn spawn_in_lane<R: Rng>(
        &mut self,
        lane: Lane,
        rng: &mut R,
        tuning: &Tuning,
    ) -> Option<&Obstacle> {
        let catalog = match lane {
            Lane::Ground => &tuning.ground_catalog,
            Lane::Air => &tuning.air_catalog,
        };
        let archetype = choose_archetype(catalog, self.last_key.as_deref(), rng)?;

        let id = self.next_id;
        self.next_id += 1;
        let obstacle = Obstacle::from_archetype(id, archetype, tuning.spawn_x(), tuning.ground_y());
        log::debug!("spawned obstacle {} ({}, {:?})", id, obstacle.key, lane);

        self.last_key = Some(obstacle.key.clone());
        self.obstacles.push(obstacle);
        self.obstacles.last()
    }

    /// Translate every obstacle left by `speed` and drop those past `retire_x`
    ///
    /// Returns how many were retired.
    pub fn advance(&mut self, speed: f32, retire_x: f32) -> usize {
        for obstacle in &mut self.obstacles {
            obstacle.vel_x = -speed;
            obstacle.pos.x -= speed;
        }

        let before = self.obstacles.len();
        self.obstacles.retain(|o| o.pos.x >= retire_x);
        before - self.obstacles.len()
    }
}
