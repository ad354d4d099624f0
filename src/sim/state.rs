//! Run state and the session that owns it
//!
//! A `RunSession` is the single owner of everything that changes during a
//! run. Drivers only touch it through `tick`/`advance`, pause controls and
//! read-only snapshots.

use rand::Rng;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::MistakeLog;
use super::hitbox::{Aabb, HitboxProfile};
use super::player::{JumpVariant, Player, PlayerState};
use super::pursuer::{PursuerModel, TerminalCause};
use super::spawner::{Lane, ObstacleSpawner};
use crate::tuning::Tuning;

/// Session-wide counters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunState {
    pub elapsed_ticks: u64,
    /// Session clock in seconds (advances only on executed ticks)
    pub elapsed_secs: f64,
    /// World speed in px per tick; never decreases
    pub speed: f32,
    /// Metres run; frozen once the run is over
    pub distance: f32,
    /// One-way
    pub is_over: bool,
    pub is_paused: bool,
}

impl RunState {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            elapsed_ticks: 0,
            elapsed_secs: 0.0,
            speed: tuning.start_speed,
            distance: 0.0,
            is_over: false,
            is_paused: false,
        }
    }

    /// Score is the distance truncated to whole metres
    #[inline]
    pub fn score(&self) -> u64 {
        self.distance.max(0.0) as u64
    }
}

/// Vertical body state reported by an external physics collaborator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodySample {
    /// Feet y
    pub y: f32,
    /// Vertical velocity (negative = up)
    pub vy: f32,
    pub grounded: bool,
}

/// Terminal result handed to the scene-transition collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameOver {
    pub score: u64,
    pub cause: TerminalCause,
    /// Beat the best score known when the session started
    pub new_high_score: bool,
}

/// Discrete cues for audio/UX collaborators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Jumped { variant: JumpVariant },
    DuckEntered,
    ObstacleSpawned { id: u32, key: String },
    Collision {
        obstacle_id: u32,
        danger_distance: f32,
        fatal: bool,
    },
    GameOver { score: u64, cause: TerminalCause },
    NewHighScore { score: u64 },
    Paused,
    Resumed,
}

/// One endless run
#[derive(Debug, Clone)]
pub struct RunSession<R: Rng = Pcg32> {
    pub(crate) tuning: Tuning,
    pub(crate) seed: u64,
    pub(crate) rng: R,
    pub(crate) run: RunState,
    pub(crate) player: Player,
    pub(crate) pursuer: PursuerModel,
    pub(crate) spawner: ObstacleSpawner,
    pub(crate) mistakes: MistakeLog,
    pub(crate) events: Vec<GameEvent>,
    pub(crate) result: Option<GameOver>,
    /// Best score read from the store when the run started
    pub(crate) best_score: u64,
    /// Unsimulated frame time carried between `advance` calls
    pub(crate) accumulator: f32,
}

impl RunSession<Pcg32> {
    /// Start a run with the seeded PCG generator
    pub fn new(tuning: Tuning, seed: u64, best_score: u64) -> Self {
        Self::with_rng(tuning, seed, best_score, Pcg32::seed_from_u64(seed))
    }

    /// Fresh run with the same tuning, the next seed and the updated best
    pub fn restart(&self) -> Self {
        let best = self
            .result
            .map(|r| r.score.max(self.best_score))
            .unwrap_or(self.best_score);
        Self::new(self.tuning.clone(), self.seed.wrapping_add(1), best)
    }
}

impl<R: Rng> RunSession<R> {
    /// Start a run drawing from an injected random source
    pub fn with_rng(tuning: Tuning, seed: u64, best_score: u64, rng: R) -> Self {
        log::info!("run started (seed {}, best {})", seed, best_score);
        Self {
            run: RunState::new(&tuning),
            player: Player::new(&tuning),
            pursuer: PursuerModel::new(&tuning),
            spawner: ObstacleSpawner::new(),
            mistakes: MistakeLog::new(),
            events: Vec::new(),
            result: None,
            best_score,
            accumulator: 0.0,
            tuning,
            seed,
            rng,
        }
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn run(&self) -> &RunState {
        &self.run
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn pursuer(&self) -> &PursuerModel {
        &self.pursuer
    }

    pub fn spawner(&self) -> &ObstacleSpawner {
        &self.spawner
    }

    pub fn score(&self) -> u64 {
        self.run.score()
    }

    pub fn best_score(&self) -> u64 {
        self.best_score
    }

    pub fn is_over(&self) -> bool {
        self.run.is_over
    }

    pub fn is_paused(&self) -> bool {
        self.run.is_paused
    }

    /// The terminal result, once the run has ended
    pub fn result(&self) -> Option<GameOver> {
        self.result
    }

    /// Take all queued events
    pub fn drain_events(&mut self) -> impl Iterator<Item = GameEvent> + '_ {
        self.events.drain(..)
    }

    pub fn pause(&mut self) {
        if self.run.is_over || self.run.is_paused {
            return;
        }
        self.run.is_paused = true;
        self.events.push(GameEvent::Paused);
        log::info!("paused at tick {}", self.run.elapsed_ticks);
    }

    pub fn resume(&mut self) {
        if self.run.is_over || !self.run.is_paused {
            return;
        }
        self.run.is_paused = false;
        self.events.push(GameEvent::Resumed);
        log::info!("resumed at tick {}", self.run.elapsed_ticks);
    }

    pub fn toggle_pause(&mut self) {
        if self.run.is_paused {
            self.resume();
        } else {
            self.pause();
        }
    }

    /// The one-shot terminal transition; later calls are no-ops
    pub(crate) fn finish(&mut self, cause: TerminalCause) {
        if self.run.is_over {
            return;
        }
        self.run.is_over = true;
        self.run.is_paused = false;
        self.player.kill();

        let score = self.run.score();
        let new_high_score = score > self.best_score;
        self.result = Some(GameOver {
            score,
            cause,
            new_high_score,
        });

        log::info!(
            "game over ({:?}) after {} ticks: {}m",
            cause,
            self.run.elapsed_ticks,
            score
        );
        self.events.push(GameEvent::GameOver { score, cause });
        if new_high_score {
            log::info!("new high score {} (was {})", score, self.best_score);
            self.events.push(GameEvent::NewHighScore { score });
        }
    }

    /// Read-only view for renderers
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            tick: self.run.elapsed_ticks,
            score: self.run.score(),
            high_score: self.best_score.max(self.result.map(|r| r.score).unwrap_or(0)),
            speed: self.run.speed,
            distance: self.run.distance,
            is_over: self.run.is_over,
            is_paused: self.run.is_paused,
            player: PlayerView {
                x: self.player.pos.x,
                y: self.player.pos.y,
                vel_y: self.player.vel_y,
                state: self.player.state(),
                visual_key: self.player.visual_key(),
                hitbox: self.player.hitbox(),
                rect: self.player.hitbox_rect(),
            },
            pursuer: PursuerView {
                x: self.pursuer.x(),
                visible: self.pursuer.is_visible(),
                danger_distance: self.pursuer.danger_distance(),
                danger_ratio: self.pursuer.danger_ratio(),
                hazard_ratio: self.pursuer.hazard_ratio(),
            },
            obstacles: self
                .spawner
                .obstacles()
                .iter()
                .map(|o| ObstacleView {
                    id: o.id,
                    key: o.key.clone(),
                    lane: o.lane,
                    x: o.pos.x,
                    y: o.pos.y,
                    scale: o.scale(),
                    struck: o.struck,
                    rect: o.hitbox_rect(),
                })
                .collect(),
            game_over: self.result,
        }
    }
}

/// Everything a renderer needs for one frame
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub tick: u64,
    pub score: u64,
    pub high_score: u64,
    pub speed: f32,
    pub distance: f32,
    pub is_over: bool,
    pub is_paused: bool,
    pub player: PlayerView,
    pub pursuer: PursuerView,
    pub obstacles: Vec<ObstacleView>,
    pub game_over: Option<GameOver>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayerView {
    pub x: f32,
    pub y: f32,
    /// Vertical velocity in px/s; `-jump_impulse` on the tick a jump starts
    pub vel_y: f32,
    pub state: PlayerState,
    pub visual_key: &'static str,
    pub hitbox: HitboxProfile,
    pub rect: Aabb,
}

#[derive(Debug, Clone, Serialize)]
pub struct PursuerView {
    pub x: f32,
    pub visible: bool,
    pub danger_distance: f32,
    pub danger_ratio: f32,
    pub hazard_ratio: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct ObstacleView {
    pub id: u32,
    pub key: String,
    pub lane: Lane,
    pub x: f32,
    pub y: f32,
    pub scale: f32,
    pub struck: bool,
    pub rect: Aabb,
}
