//! Parkour Horde entry point
//!
//! Native: a headless run driven by the idle-mode AI, useful for balancing.
//! Web: a `WebRunner` handle the page's canvas renderer drives every frame.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use wasm_bindgen::prelude::*;

    use parkour_horde::consts::MAX_FRAME_DT;
    use parkour_horde::platform::storage::LocalStore;
    use parkour_horde::sim::{GameEvent, RunSession, TickInput, advance, attract_input};
    use parkour_horde::{HighScore, Tuning};

    /// Game instance holding all state
    #[wasm_bindgen]
    pub struct WebRunner {
        session: RunSession,
        scores: HighScore<LocalStore>,
        input: TickInput,
        last_time: f64,
        idle_mode: bool,
        /// Events of the last frame, as JSON for the page's audio cues
        events_json: String,
    }

    #[wasm_bindgen]
    impl WebRunner {
        /// Start a run; `tuning_json` overrides the default balance
        #[wasm_bindgen(constructor)]
        pub fn new(tuning_json: Option<String>) -> Result<WebRunner, JsValue> {
            let tuning = match tuning_json {
                Some(json) => Tuning::from_json(&json).map_err(|e| JsValue::from_str(&e.to_string()))?,
                None => Tuning::default(),
            };
            let scores = HighScore::load(LocalStore);
            let seed = js_sys::Date::now() as u64;
            log::info!("Parkour Horde (web) starting, seed {}", seed);
            Ok(WebRunner {
                session: RunSession::new(tuning, seed, scores.best()),
                scores,
                input: TickInput::default(),
                last_time: 0.0,
                idle_mode: false,
                events_json: String::from("[]"),
            })
        }

        /// Jump control held/released
        pub fn set_jump(&mut self, held: bool) {
            self.input.jump = held;
        }

        /// Duck control held/released
        pub fn set_duck(&mut self, held: bool) {
            self.input.duck = held;
        }

        pub fn toggle_pause(&mut self) {
            self.input.pause = true;
        }

        /// Attract mode: the AI plays
        pub fn set_idle(&mut self, idle: bool) {
            self.idle_mode = idle;
        }

        /// Advance by the time since the previous frame (`time` in ms)
        pub fn frame(&mut self, time: f64) {
            let dt = if self.last_time > 0.0 {
                ((time - self.last_time) / 1000.0) as f32
            } else {
                0.0
            };
            self.last_time = time;

            let input = if self.idle_mode {
                attract_input(&self.session.snapshot(), &self.input)
            } else {
                self.input.clone()
            };
            advance(&mut self.session, dt.min(MAX_FRAME_DT), &input);
            // Clear one-shot inputs after processing
            self.input.pause = false;

            let events: Vec<GameEvent> = self.session.drain_events().collect();
            for event in &events {
                if let GameEvent::GameOver { score, .. } = event {
                    if let Err(e) = self.scores.submit(*score) {
                        log::warn!("Could not save high score: {}", e);
                    }
                }
            }
            self.events_json = serde_json::to_string(&events).unwrap_or_else(|_| String::from("[]"));
        }

        /// Render snapshot as JSON
        pub fn snapshot_json(&self) -> Result<String, JsValue> {
            serde_json::to_string(&self.session.snapshot()).map_err(|e| JsValue::from_str(&e.to_string()))
        }

        /// Events produced by the last `frame` call, as JSON
        pub fn events_json(&self) -> String {
            self.events_json.clone()
        }

        pub fn high_score(&self) -> u64 {
            self.scores.best()
        }

        /// Start a new run after game over
        pub fn restart(&mut self) {
            self.session = self.session.restart();
            self.input = TickInput::default();
            self.last_time = 0.0;
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    parkour_horde::platform::init_logging();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::path::PathBuf;

    use parkour_horde::persistence::FileStore;
    use parkour_horde::sim::{GameEvent, RunSession, advance, autopilot};
    use parkour_horde::{HighScore, Tuning};

    pub const USAGE: &str = "usage: parkour-horde [--seed N] [--seconds S] [--tuning FILE] [--store DIR]";

    /// Command-line options
    #[derive(Debug)]
    pub struct Args {
        pub seed: u64,
        pub seconds: f32,
        pub tuning: Option<PathBuf>,
        pub store: PathBuf,
    }

    impl Args {
        pub fn parse(mut args: impl Iterator<Item = String>) -> Result<Self, String> {
            let mut parsed = Args {
                seed: 1,
                seconds: 120.0,
                tuning: None,
                store: PathBuf::from(".parkour-horde"),
            };
            while let Some(flag) = args.next() {
                let mut value = || args.next().ok_or_else(|| format!("{flag} needs a value"));
                match flag.as_str() {
                    "--seed" => {
                        parsed.seed = value()?.parse().map_err(|e| format!("--seed: {e}"))?;
                    }
                    "--seconds" => {
                        parsed.seconds = value()?.parse().map_err(|e| format!("--seconds: {e}"))?;
                    }
                    "--tuning" => parsed.tuning = Some(PathBuf::from(value()?)),
                    "--store" => parsed.store = PathBuf::from(value()?),
                    other => return Err(format!("unknown argument {other}")),
                }
            }
            Ok(parsed)
        }
    }

    fn load_tuning(path: Option<&PathBuf>) -> Result<Tuning, String> {
        let Some(path) = path else {
            return Ok(Tuning::default());
        };
        let json = std::fs::read_to_string(path).map_err(|e| format!("{}: {e}", path.display()))?;
        Tuning::from_json(&json).map_err(|e| format!("{}: {e}", path.display()))
    }

    /// Play one run with the idle-mode AI at a simulated 60 fps
    pub fn run(args: Args) -> Result<(), String> {
        let tuning = load_tuning(args.tuning.as_ref())?;
        let mut scores = HighScore::load(FileStore::new(&args.store));
        log::info!("high score store at {}", scores.store().dir().display());
        let mut session = RunSession::new(tuning, args.seed, scores.best());

        let frame_dt = 1.0 / 60.0;
        let frames = (args.seconds / frame_dt) as u64;
        let mut collisions = 0u32;

        for _ in 0..frames {
            let input = autopilot(&session.snapshot());
            advance(&mut session, frame_dt, &input);

            for event in session.drain_events() {
                match event {
                    GameEvent::Collision {
                        obstacle_id,
                        danger_distance,
                        fatal,
                    } => {
                        collisions += 1;
                        log::warn!(
                            "hit obstacle {} (danger {:.1}{})",
                            obstacle_id,
                            danger_distance,
                            if fatal { ", fatal" } else { "" }
                        );
                    }
                    GameEvent::GameOver { score, .. } => {
                        if let Err(e) = scores.submit(score) {
                            log::warn!("Could not save high score: {}", e);
                        }
                    }
                    other => log::debug!("{:?}", other),
                }
            }
            if session.is_over() {
                break;
            }
        }

        match session.result() {
            Some(result) => println!(
                "caught ({:?}) at {}m after {} collision(s); best {}m",
                result.cause,
                result.score,
                collisions,
                scores.best()
            ),
            None => println!(
                "still running at {}m after {:.0}s, {} collision(s); best {}m",
                session.score(),
                args.seconds,
                collisions,
                scores.best()
            ),
        }
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    parkour_horde::platform::init_logging();
    log::info!("Parkour Horde (native, headless) starting...");

    let args = match native::Args::parse(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(msg) => {
            eprintln!("{msg}\n{}", native::USAGE);
            std::process::exit(2);
        }
    };
    if let Err(msg) = native::run(args) {
        eprintln!("{msg}");
        std::process::exit(1);
    }
}
