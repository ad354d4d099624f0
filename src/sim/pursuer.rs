//! The horde chasing the runner
//!
//! `danger_distance` is the gameplay value (cap = safe, 0 = caught). The
//! on-screen position only follows it through exponential smoothing, so a
//! collision makes the horde surge forward over several frames.

use serde::{Deserialize, Serialize};

use crate::tuning::Tuning;

/// Why a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerminalCause {
    /// Danger distance reached zero
    Caught,
    /// The smoothed horde position reached the runner
    Contact,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PursuerModel {
    danger_distance: f32,
    /// Smoothed on-screen x (frame centre)
    x: f32,
    cap: f32,
    penalty: f32,
    recovery: f32,
    spacing: f32,
    smoothing: f32,
    catch_radius: f32,
    frame_width: f32,
    world_width: f32,
}

impl PursuerModel {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            danger_distance: tuning.danger_initial.clamp(0.0, tuning.danger_cap),
            x: tuning.pursuer_start_x,
            cap: tuning.danger_cap,
            penalty: tuning.hit_penalty,
            recovery: tuning.danger_recovery,
            spacing: tuning.pursuer_spacing,
            smoothing: tuning.pursuer_smoothing,
            catch_radius: tuning.catch_radius,
            frame_width: tuning.pursuer_frame_width,
            world_width: tuning.world_width,
        }
    }

    #[inline]
    pub fn danger_distance(&self) -> f32 {
        self.danger_distance
    }

    #[inline]
    pub fn x(&self) -> f32 {
        self.x
    }

    /// Fraction of the safe distance left, 1.0 = fully safe
    pub fn danger_ratio(&self) -> f32 {
        self.danger_distance.clamp(0.0, self.cap) / self.cap
    }

    /// Inverse of `danger_ratio`, for a bar that fills as the horde closes in
    pub fn hazard_ratio(&self) -> f32 {
        1.0 - self.danger_ratio()
    }

    /// Any part of the horde's frame is on screen
    pub fn is_visible(&self) -> bool {
        let half = self.frame_width / 2.0;
        self.x + half >= 0.0 && self.x - half <= self.world_width
    }

    /// Step decrease from one collision
    pub fn apply_hit(&mut self) {
        self.danger_distance = (self.danger_distance - self.penalty).clamp(0.0, self.cap);
    }

    /// Repeated-mistake rule: caught outright
    pub fn collapse(&mut self) {
        self.danger_distance = 0.0;
    }

    /// Where the horde is heading for the current distance
    pub fn target_x(&self, player_x: f32) -> f32 {
        player_x - self.danger_distance * self.spacing
    }

    /// One tick of recovery, smoothing and the terminal checks
    ///
    /// Recovery is skipped on ticks where the runner took a hit.
    pub fn update(&mut self, player_x: f32, hit_this_tick: bool) -> Option<TerminalCause> {
        if !hit_this_tick && self.danger_distance < self.cap {
            self.danger_distance = (self.danger_distance + self.recovery).min(self.cap);
        }

        let target = self.target_x(player_x);
        self.x += (target - self.x) * self.smoothing;

        self.terminal(player_x)
    }

    /// Terminal checks; distance is reported first when both hold
    pub fn terminal(&self, player_x: f32) -> Option<TerminalCause> {
        if self.danger_distance <= 0.0 {
            Some(TerminalCause::Caught)
        } else if (player_x - self.x).abs() < self.catch_radius {
            Some(TerminalCause::Contact)
        } else {
            None
        }
    }

    /// Place the horde directly, bypassing smoothing
    pub fn set_x(&mut self, x: f32) {
        self.x = x;
    }
}
