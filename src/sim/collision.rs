//! Collision-to-damage arbitration
//!
//! Raw overlaps between the player and obstacles become at most one damage
//! event per obstacle. Each damage event feeds the mistake log and the
//! pursuer.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use super::hitbox::Aabb;
use super::pursuer::PursuerModel;
use super::spawner::Obstacle;

/// Timestamps of recent collisions, oldest first
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MistakeLog {
    stamps: VecDeque<f64>,
}

impl MistakeLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a collision at `now` and drop entries outside the window
    ///
    /// Returns how many collisions fall inside the trailing window.
    pub fn record(&mut self, now: f64, window: f64) -> usize {
        self.stamps.push_back(now);
        while let Some(&oldest) = self.stamps.front() {
            if now - oldest < window {
                break;
            }
            self.stamps.pop_front();
        }
        self.stamps.len()
    }

    pub fn len(&self) -> usize {
        self.stamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stamps.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.stamps.iter().copied()
    }
}

/// One obstacle dealing damage
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamageEvent {
    pub obstacle_id: u32,
    /// Session clock in seconds
    pub at: f64,
}

/// What a damage event did to the chase
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamageOutcome {
    pub danger_distance: f32,
    /// Collisions inside the mistake window after this one
    pub recent_mistakes: usize,
    /// The repeated-mistake rule collapsed the distance
    pub fatal: bool,
}

/// Stateless arbiter between overlap reports and damage
pub struct CollisionArbiter;

impl CollisionArbiter {
    /// Test every live obstacle against the player's hitbox
    ///
    /// Obstacles already struck are skipped; newly hit ones are marked so
    /// they never deal damage again.
    pub fn evaluate(player: &Aabb, obstacles: &mut [Obstacle], now: f64) -> Vec<DamageEvent> {
        let mut events = Vec::new();
        for obstacle in obstacles.iter_mut() {
            if obstacle.struck {
                continue;
            }
            if player.overlaps(&obstacle.hitbox_rect()) {
                obstacle.struck = true;
                log::debug!("obstacle {} ({}) struck at {:.2}s", obstacle.id, obstacle.key, now);
                events.push(DamageEvent {
                    obstacle_id: obstacle.id,
                    at: now,
                });
            }
        }
        events
    }

    /// Apply one damage event to the mistake log and the pursuer
    pub fn resolve(
        event: &DamageEvent,
        mistakes: &mut MistakeLog,
        pursuer: &mut PursuerModel,
        window: f64,
        limit: usize,
    ) -> DamageOutcome {
        let recent_mistakes = mistakes.record(event.at, window);
        pursuer.apply_hit();

        let fatal = recent_mistakes >= limit;
        if fatal {
            log::info!(
                "{} collisions inside {:.0}s, the horde closes in",
                recent_mistakes,
                window
            );
            pursuer.collapse();
        }

        DamageOutcome {
            danger_distance: pursuer.danger_distance(),
            recent_mistakes,
            fatal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::spawner::{Lane, ObstacleSpawner};
    use crate::tuning::Tuning;
    use glam::Vec2;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn rect(x0: f32, y0: f32, x1: f32, y1: f32) -> Aabb {
        Aabb {
            min: Vec2::new(x0, y0),
            max: Vec2::new(x1, y1),
        }
    }

    #[test]
    fn test_mistake_log_prunes_window() {
        let mut log = MistakeLog::new();
        assert_eq!(log.record(0.0, 10.0), 1);
        assert_eq!(log.record(4.0, 10.0), 2);
        // 0.0 is exactly 10s old: outside the strict window
        assert_eq!(log.record(10.0, 10.0), 2);
        assert_eq!(log.iter().collect::<Vec<_>>(), vec![4.0, 10.0]);
        assert_eq!(log.record(30.0, 10.0), 1);
    }

    #[test]
    fn test_damage_fires_once_per_obstacle() {
        let tuning = Tuning::default();
        let mut spawner = ObstacleSpawner::new();
        let mut rng = Pcg32::seed_from_u64(1);
        spawner.spawn_in_lane(Lane::Ground, &mut rng, &tuning);

        // A player box that swallows the whole spawn area
        let player = rect(0.0, 0.0, 2000.0, 1000.0);

        let first = CollisionArbiter::evaluate(&player, spawner.obstacles_mut(), 1.0);
        assert_eq!(first.len(), 1);
        assert!(spawner.obstacles()[0].struck);

        for tick in 0..500 {
            let again = CollisionArbiter::evaluate(&player, spawner.obstacles_mut(), 1.0 + tick as f64);
            assert!(again.is_empty());
        }
    }

    #[test]
    fn test_no_overlap_no_damage() {
        let tuning = Tuning::default();
        let mut spawner = ObstacleSpawner::new();
        let mut rng = Pcg32::seed_from_u64(1);
        spawner.spawn_in_lane(Lane::Ground, &mut rng, &tuning);

        let player = rect(0.0, 0.0, 100.0, 100.0);
        assert!(CollisionArbiter::evaluate(&player, spawner.obstacles_mut(), 0.0).is_empty());
        assert!(!spawner.obstacles()[0].struck);
    }

    #[test]
    fn test_resolve_penalty_then_collapse() {
        let tuning = Tuning::default();
        let mut pursuer = PursuerModel::new(&tuning);
        let mut mistakes = MistakeLog::new();

        let first = CollisionArbiter::resolve(
            &DamageEvent { obstacle_id: 1, at: 5.0 },
            &mut mistakes,
            &mut pursuer,
            10.0,
            2,
        );
        assert!(!first.fatal);
        assert_eq!(first.danger_distance, 60.0);

        let second = CollisionArbiter::resolve(
            &DamageEvent { obstacle_id: 2, at: 8.0 },
            &mut mistakes,
            &mut pursuer,
            10.0,
            2,
        );
        assert!(second.fatal);
        assert_eq!(second.recent_mistakes, 2);
        assert_eq!(second.danger_distance, 0.0);
    }

    #[test]
    fn test_resolve_spaced_collisions_not_fatal() {
        let tuning = Tuning::default();
        let mut pursuer = PursuerModel::new(&tuning);
        let mut mistakes = MistakeLog::new();

        for (id, at) in [(1, 0.0), (2, 11.0), (3, 22.0)] {
            let outcome = CollisionArbiter::resolve(
                &DamageEvent { obstacle_id: id, at },
                &mut mistakes,
                &mut pursuer,
                10.0,
                2,
            );
            assert!(!outcome.fatal);
            assert_eq!(outcome.recent_mistakes, 1);
        }
    }
}
