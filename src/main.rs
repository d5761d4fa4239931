//! Flappy Pug headless runner
//!
//! Runs the simulation without a renderer, flying the autopilot for a few
//! runs and printing the last frame's render snapshot as JSON.
//!
//! Usage: `flappy-pug [config.json]`

use flappy_pug::consts::SIM_DT;
use flappy_pug::sim::{GameEvent, Session, autopilot};
use flappy_pug::{GameConfig, RenderSnapshot};

/// Runs to play before exiting
const RUNS: u32 = 3;
/// Frame cap per run (two minutes at 60 Hz)
const MAX_FRAMES_PER_RUN: u32 = 120 * 60;

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Flappy Pug (headless) starting...");

    let config = match std::env::args().nth(1) {
        Some(path) => match GameConfig::load(&path) {
            Ok(config) => config,
            Err(e) => {
                log::error!("{e}");
                std::process::exit(1);
            }
        },
        None => GameConfig::default(),
    };

    let mut session = Session::new(config);

    for run in 1..=RUNS {
        let mut frames = 0;
        while session.is_running() && frames < MAX_FRAMES_PER_RUN {
            let input = autopilot(session.world());
            for event in session.advance(&input, SIM_DT) {
                if event == GameEvent::Score {
                    log::debug!("Run {run}: score {}", session.score());
                }
            }
            frames += 1;
        }

        log::info!(
            "Run {run} finished after {frames} frames with score {}",
            session.score()
        );

        if run < RUNS {
            if session.is_running() {
                session.handle_event(GameEvent::GameOver);
            }
            session.restart();
        }
    }

    log::info!("Best score: {}", session.best_score());

    match RenderSnapshot::capture(&session).to_json() {
        Ok(json) => println!("{json}"),
        Err(e) => log::error!("Failed to serialize snapshot: {e}"),
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Headless runner is native only; web builds embed the library directly
}
