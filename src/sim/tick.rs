//! Fixed timestep simulation tick
//!
//! Core game loop that advances a run one step at a time, in a fixed order:
//! body signal, player, spawner, collisions, pursuer, pacing.

use rand::Rng;

use super::collision::CollisionArbiter;
use super::player::{Intent, PlayerCue};
use super::state::{BodySample, GameEvent, RunSession};
use crate::consts::*;

/// Input for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Jump control held
    pub jump: bool,
    /// Duck control held
    pub duck: bool,
    /// Body state from an external physics collaborator; when absent the
    /// built-in arcade body integrates gravity
    pub body: Option<BodySample>,
    /// Pause toggle (one-shot)
    pub pause: bool,
}

impl TickInput {
    fn intent(&self) -> Intent {
        Intent {
            jump: self.jump,
            duck: self.duck,
        }
    }
}

/// Advance the run by one fixed step
///
/// Returns false when nothing was simulated (paused or over).
pub fn tick<R: Rng>(session: &mut RunSession<R>, input: &TickInput) -> bool {
    if input.pause {
        session.toggle_pause();
    }
    if session.run.is_over || session.run.is_paused {
        return false;
    }

    let dt = SIM_DT;
    let tuning = &session.tuning;
    let ground_y = tuning.ground_y();

    session.run.elapsed_ticks += 1;
    session.run.elapsed_secs += dt as f64;
    let now = session.run.elapsed_secs;

    // Grounded signal
    let grounded = match input.body {
        Some(sample) => {
            session.player.pos.y = sample.y;
            session.player.vel_y = sample.vy;
            sample.grounded
        }
        None => session.player.integrate(tuning.gravity, dt, ground_y),
    };

    // Player state machine
    match session
        .player
        .update(input.intent(), grounded, &mut session.rng, tuning)
    {
        Some(PlayerCue::Jumped(variant)) => session.events.push(GameEvent::Jumped { variant }),
        Some(PlayerCue::DuckEntered) => session.events.push(GameEvent::DuckEntered),
        None => {}
    }
    if session.player.settle(ground_y) {
        log::trace!("player clamped to ground at tick {}", session.run.elapsed_ticks);
    }

    // Spawn, translate, retire
    let report = session
        .spawner
        .update(&mut session.rng, tuning, session.run.speed, dt);
    if let Some((id, key)) = report.spawned {
        session.events.push(GameEvent::ObstacleSpawned { id, key });
    }
    if report.retired > 0 {
        log::debug!(
            "retired {} obstacle(s) at tick {}",
            report.retired,
            session.run.elapsed_ticks
        );
    }

    // Overlaps -> damage
    let hits = CollisionArbiter::evaluate(
        &session.player.hitbox_rect(),
        session.spawner.obstacles_mut(),
        now,
    );
    for hit in &hits {
        let outcome = CollisionArbiter::resolve(
            hit,
            &mut session.mistakes,
            &mut session.pursuer,
            tuning.mistake_window,
            tuning.mistake_limit,
        );
        session.events.push(GameEvent::Collision {
            obstacle_id: hit.obstacle_id,
            danger_distance: outcome.danger_distance,
            fatal: outcome.fatal,
        });
    }

    // Chase
    let terminal = session
        .pursuer
        .update(session.player.pos.x, !hits.is_empty());

    // Pacing
    session.run.distance += tuning.distance_factor * session.run.speed;
    session.run.speed += tuning.speed_step;

    if let Some(cause) = terminal {
        session.finish(cause);
    }
    true
}

/// Advance the run by a variable frame delta
///
/// The delta is clamped and split into fixed steps; leftover time carries to
/// the next call. Returns the number of steps simulated.
pub fn advance<R: Rng>(session: &mut RunSession<R>, frame_dt: f32, input: &TickInput) -> u32 {
    let mut input = input.clone();
    if input.pause {
        session.toggle_pause();
        input.pause = false;
    }
    if session.run.is_over || session.run.is_paused {
        session.accumulator = 0.0;
        return 0;
    }

    session.accumulator += frame_dt.clamp(0.0, MAX_FRAME_DT);

    let mut substeps = 0;
    while session.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
        if !tick(session, &input) {
            break;
        }
        session.accumulator -= SIM_DT;
        substeps += 1;
    }
    if session.run.is_over {
        session.accumulator = 0.0;
    }
    substeps
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::player::PlayerState;
    use crate::sim::pursuer::TerminalCause;
    use crate::sim::spawner::Lane;
    use crate::tuning::Tuning;

    /// Tuning that never spawns on its own
    fn quiet_tuning() -> Tuning {
        Tuning {
            spawn_interval: 1.0e6,
            ..Default::default()
        }
    }

    fn run_ticks(session: &mut RunSession, input: &TickInput, n: usize) {
        for _ in 0..n {
            tick(session, input);
        }
    }

    /// Drop an obstacle right on top of the runner
    fn spawn_on_player(session: &mut RunSession, lane: Lane) -> u32 {
        let player_x = session.player.pos.x;
        let obstacle = session
            .spawner
            .spawn_in_lane(lane, &mut session.rng, &session.tuning)
            .map(|o| o.id)
            .unwrap();
        let offset = session.tuning.spawn_x() - player_x;
        session.spawner.advance(offset, session.tuning.retire_x);
        obstacle
    }

    #[test]
    fn test_pacing_grows() {
        let mut session = RunSession::new(quiet_tuning(), 1, 0);
        let input = TickInput::default();
        tick(&mut session, &input);

        assert_eq!(session.run().elapsed_ticks, 1);
        assert!((session.run().distance - 0.3).abs() < 1e-6);
        assert!((session.run().speed - 6.001).abs() < 1e-6);

        run_ticks(&mut session, &input, 999);
        assert!((session.run().speed - 7.0).abs() < 1e-3);
        assert!(session.score() > 300);
    }

    #[test]
    fn test_paused_session_is_frozen() {
        let mut session = RunSession::new(Tuning::default(), 1, 0);
        run_ticks(&mut session, &TickInput::default(), 200);
        let before = session.run().clone();
        let obstacles_before: Vec<_> = session.spawner().obstacles().iter().map(|o| o.pos).collect();

        let toggle = TickInput {
            pause: true,
            ..Default::default()
        };
        assert!(!tick(&mut session, &toggle));
        assert!(session.is_paused());
        run_ticks(&mut session, &TickInput::default(), 100);

        assert_eq!(session.run().distance, before.distance);
        assert_eq!(session.run().speed, before.speed);
        assert_eq!(session.run().elapsed_ticks, before.elapsed_ticks);
        let obstacles_after: Vec<_> = session.spawner().obstacles().iter().map(|o| o.pos).collect();
        assert_eq!(obstacles_before, obstacles_after);

        assert!(tick(&mut session, &toggle));
        assert!(!session.is_paused());
        assert_eq!(session.run().elapsed_ticks, before.elapsed_ticks + 1);
    }

    #[test]
    fn test_collision_costs_distance_once() {
        let mut session = RunSession::new(quiet_tuning(), 3, 0);
        let id = spawn_on_player(&mut session, Lane::Ground);
        // Freeze the obstacle on the player so it overlaps for many ticks
        session.run.speed = 0.0;
        session.tuning.speed_step = 0.0;

        run_ticks(&mut session, &TickInput::default(), 30);

        let collisions: Vec<_> = session
            .drain_events()
            .filter(|e| matches!(e, GameEvent::Collision { .. }))
            .collect();
        assert_eq!(collisions.len(), 1);
        assert!(matches!(
            collisions[0],
            GameEvent::Collision { obstacle_id, fatal: false, .. } if obstacle_id == id
        ));
        // 100 - 40, then 29 ticks of recovery
        let expected = 60.0 + 29.0 * 0.05;
        assert!((session.pursuer().danger_distance() - expected).abs() < 1e-3);
    }

    #[test]
    fn test_two_collisions_three_seconds_apart_end_the_run() {
        let mut session = RunSession::new(quiet_tuning(), 5, 0);

        spawn_on_player(&mut session, Lane::Ground);
        tick(&mut session, &TickInput::default());
        assert!(!session.is_over());
        assert_eq!(session.pursuer().danger_distance(), 60.0);

        // Let the first obstacle scroll away, then three seconds in total
        run_ticks(&mut session, &TickInput::default(), 179);
        assert!(!session.is_over());

        spawn_on_player(&mut session, Lane::Air);
        tick(&mut session, &TickInput::default());

        assert_eq!(session.pursuer().danger_distance(), 0.0);
        assert!(session.is_over());
        let result = session.result().unwrap();
        assert_eq!(result.cause, TerminalCause::Caught);
        assert!(
            session
                .drain_events()
                .any(|e| matches!(e, GameEvent::Collision { fatal: true, .. }))
        );
    }

    #[test]
    fn test_single_collision_recovers_to_cap() {
        let mut session = RunSession::new(quiet_tuning(), 5, 0);
        spawn_on_player(&mut session, Lane::Ground);
        tick(&mut session, &TickInput::default());
        assert_eq!(session.pursuer().danger_distance(), 60.0);

        for _ in 0..(60 * 60) {
            tick(&mut session, &TickInput::default());
            assert!(session.pursuer().danger_distance() <= 150.0);
        }
        assert!(!session.is_over());
        assert_eq!(session.pursuer().danger_distance(), 150.0);
    }

    #[test]
    fn test_duck_held_in_air_waits_for_landing() {
        let tuning = quiet_tuning();
        let ground = tuning.ground_y();
        let mut session = RunSession::new(tuning.clone(), 9, 0);

        let jump = TickInput {
            jump: true,
            ..Default::default()
        };
        tick(&mut session, &jump);
        assert_eq!(session.player().state(), PlayerState::Airborne);

        let duck_in_air = TickInput {
            duck: true,
            body: Some(BodySample {
                y: ground - 120.0,
                vy: 200.0,
                grounded: false,
            }),
            ..Default::default()
        };
        for _ in 0..20 {
            tick(&mut session, &duck_in_air);
            assert_eq!(session.player().state(), PlayerState::Airborne);
            assert_eq!(session.player().hitbox(), tuning.airborne_hitbox);
        }

        let landed = TickInput {
            duck: true,
            body: Some(BodySample {
                y: ground,
                vy: 0.0,
                grounded: true,
            }),
            ..Default::default()
        };
        tick(&mut session, &landed);
        assert_eq!(session.player().state(), PlayerState::Ducking);
        assert_eq!(session.player().hitbox(), tuning.ducking_hitbox);
    }

    #[test]
    fn test_sinking_body_sample_is_clamped() {
        let tuning = quiet_tuning();
        let ground = tuning.ground_y();
        let mut session = RunSession::new(tuning, 9, 0);

        let sunk = TickInput {
            duck: true,
            body: Some(BodySample {
                y: ground + 15.0,
                vy: 240.0,
                grounded: true,
            }),
            ..Default::default()
        };
        tick(&mut session, &sunk);

        assert_eq!(session.player().pos.y, ground);
        assert_eq!(session.player().vel_y, 0.0);
        assert_eq!(session.player().state(), PlayerState::Ducking);
    }

    #[test]
    fn test_contact_ends_run_with_distance_left() {
        let mut session = RunSession::new(quiet_tuning(), 2, 0);
        let player_x = session.player().pos.x;
        session.pursuer.set_x(player_x - 10.0);

        tick(&mut session, &TickInput::default());

        assert!(session.pursuer().danger_distance() > 0.0);
        assert!(session.is_over());
        assert_eq!(session.result().unwrap().cause, TerminalCause::Contact);
    }

    #[test]
    fn test_over_session_is_frozen() {
        let mut session = RunSession::new(Tuning::default(), 4, 0);
        run_ticks(&mut session, &TickInput::default(), 120);
        session.finish(TerminalCause::Caught);

        let run = session.run().clone();
        let player_pos = session.player().pos;
        let obstacles: Vec<_> = session.spawner().obstacles().iter().map(|o| o.pos).collect();

        let jump = TickInput {
            jump: true,
            ..Default::default()
        };
        for _ in 0..100 {
            assert!(!tick(&mut session, &jump));
        }
        assert_eq!(advance(&mut session, 0.05, &jump), 0);

        assert_eq!(session.run(), &run);
        assert_eq!(session.player().pos, player_pos);
        let after: Vec<_> = session.spawner().obstacles().iter().map(|o| o.pos).collect();
        assert_eq!(obstacles, after);
    }

    #[test]
    fn test_advance_splits_frames() {
        let mut session = RunSession::new(quiet_tuning(), 1, 0);
        let input = TickInput::default();

        assert_eq!(advance(&mut session, 0.01, &input), 0);
        assert_eq!(advance(&mut session, 0.01, &input), 1);
        // Huge hitch is clamped to 0.1s -> at most 6 steps, capped at 8
        let steps = advance(&mut session, 5.0, &input);
        assert!(steps <= MAX_SUBSTEPS);
        assert!(steps >= 5);
    }

    #[test]
    fn test_jump_event_and_autonomous_landing() {
        let mut session = RunSession::new(quiet_tuning(), 1, 0);
        let jump = TickInput {
            jump: true,
            ..Default::default()
        };
        tick(&mut session, &jump);
        assert!(
            session
                .drain_events()
                .any(|e| matches!(e, GameEvent::Jumped { .. }))
        );

        run_ticks(&mut session, &TickInput::default(), 120);
        assert_eq!(session.player().state(), PlayerState::Running);
        assert_eq!(session.player().pos.y, session.tuning().ground_y());
    }

    #[test]
    fn test_determinism() {
        let mut a = RunSession::new(Tuning::default(), 99999, 0);
        let mut b = RunSession::new(Tuning::default(), 99999, 0);

        for i in 0..600 {
            let input = TickInput {
                jump: i % 97 == 0,
                duck: (i / 50) % 3 == 0,
                ..Default::default()
            };
            tick(&mut a, &input);
            tick(&mut b, &input);
        }

        assert_eq!(a.run(), b.run());
        let keys_a: Vec<_> = a.spawner().obstacles().iter().map(|o| o.key.clone()).collect();
        let keys_b: Vec<_> = b.spawner().obstacles().iter().map(|o| o.key.clone()).collect();
        assert_eq!(keys_a, keys_b);
    }
}
