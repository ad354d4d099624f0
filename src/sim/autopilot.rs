//! Idle/demo mode: a simple AI that plays the run
//!
//! Reads only the public snapshot, the same view a human player gets, and
//! produces intents. Used by the headless driver and the attract screen.

use super::spawner::Lane;
use super::state::Snapshot;
use super::tick::TickInput;

/// How many ticks of travel ahead the AI reacts to
const REACTION_TICKS: f32 = 12.0;

/// Choose intents for the next tick
pub fn autopilot(snapshot: &Snapshot) -> TickInput {
    let player = &snapshot.player.rect;
    let lookahead = snapshot.speed * REACTION_TICKS;

    // Nearest obstacle not yet behind the player
    let threat = snapshot
        .obstacles
        .iter()
        .filter(|o| !o.struck && o.rect.max.x > player.min.x)
        .min_by(|a, b| {
            a.rect
                .min
                .x
                .partial_cmp(&b.rect.min.x)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

    let mut input = TickInput::default();
    if let Some(obstacle) = threat {
        let gap = obstacle.rect.min.x - player.max.x;
        match obstacle.lane {
            Lane::Ground => input.jump = gap > 0.0 && gap < lookahead,
            // Stay down until the whole obstacle has passed overhead
            Lane::Air => input.duck = gap < lookahead,
        }
    }
    input
}

/// Attract-mode input: the AI moves, the player's pause toggle still applies
pub fn attract_input(snapshot: &Snapshot, controls: &TickInput) -> TickInput {
    TickInput {
        pause: controls.pause,
        ..autopilot(snapshot)
    }
}
