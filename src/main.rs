//! Tick Platformer entry point
//!
//! Headless demo: builds a seeded course, drives the controller with a simple
//! autopilot on a fixed timestep, then replays the recorded input to check
//! the run is reproducible.
//!
//! Usage: `tick-platformer [settings.json] [seed]`

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Tick Platformer (native) starting...");

    let mut args = std::env::args().skip(1);
    let settings = match args.next() {
        Some(path) => match load_settings(&path) {
            Ok(settings) => settings,
            Err(e) => {
                log::error!("{e}");
                std::process::exit(1);
            }
        },
        None => tick_platformer::ControllerSettings::default(),
    };
    let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(42);

    demo::run(settings, seed);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Hosts embed the library directly on the web; there is no demo loop
}

#[cfg(not(target_arch = "wasm32"))]
fn load_settings(path: &str) -> Result<tick_platformer::ControllerSettings, String> {
    let json = std::fs::read_to_string(path).map_err(|e| format!("Failed to read {path}: {e}"))?;
    tick_platformer::ControllerSettings::from_json(&json).map_err(|e| format!("{path}: {e}"))
}

#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use tick_platformer::consts::{MAX_SUBSTEPS, SIM_DT};
    use tick_platformer::course::{Course, CourseConfig};
    use tick_platformer::debug::{LineBatch, draw_geometry};
    use tick_platformer::sim::{Controller, ControllerEvent, GeometryQuery, InputLog, LayerMask, TickInput};
    use tick_platformer::ControllerSettings;

    /// Wall-clock frame length of the pretend host (deliberately not SIM_DT)
    const FRAME_TIME: f32 = 1.0 / 50.0;
    /// Give up after this many frames
    const MAX_FRAMES: u32 = 50 * 60;
    /// Ticks the autopilot holds jump before releasing
    const JUMP_HOLD_TICKS: u32 = 18;
    /// Jump when a pit starts closer than this
    const JUMP_LOOKAHEAD: f32 = 1.0;

    /// Minimal "player": run right, jump at pit edges
    #[derive(Default)]
    struct Autopilot {
        holding: Option<u32>,
    }

    impl Autopilot {
        fn input(&mut self, controller: &Controller, course: &Course) -> TickInput {
            let mut input = TickInput {
                horizontal: 1.0,
                ..TickInput::with_dt(SIM_DT)
            };

            match self.holding {
                Some(held) if held >= JUMP_HOLD_TICKS => {
                    input.jump_released = true;
                    self.holding = None;
                }
                Some(held) => self.holding = Some(held + 1),
                None => {
                    let near_pit = course
                        .next_gap_distance(controller.position().x)
                        .is_some_and(|d| d < JUMP_LOOKAHEAD);
                    if controller.is_grounded() && near_pit {
                        input.jump_pressed = true;
                        self.holding = Some(0);
                    }
                }
            }
            input
        }
    }

    pub fn run(settings: ControllerSettings, seed: u64) {
        let course = Course::generate(seed, &CourseConfig::default());
        let mut controller = match Controller::new(settings.clone(), course.spawn) {
            Ok(controller) => controller,
            Err(e) => {
                log::error!("Invalid controller settings: {e}");
                return;
            }
        };
        controller.mark_ready();

        let mut autopilot = Autopilot::default();
        let mut log = InputLog::new();
        let mut accumulator = 0.0;
        let mut jumps = 0u32;
        let mut corrections = 0u32;
        let mut respawns = 0u32;
        let mut finished_at = None;

        'frames: for frame in 0..MAX_FRAMES {
            accumulator += FRAME_TIME;
            let mut substeps = 0;
            while accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
                let input = autopilot.input(&controller, &course);
                if let Err(e) = controller.step(&input, &course.geometry) {
                    log::error!("Tick failed: {e}");
                    return;
                }
                log.record(input);
                accumulator -= SIM_DT;
                substeps += 1;

                for event in controller.events() {
                    match event {
                        ControllerEvent::Jumped(_) => jumps += 1,
                        ControllerEvent::CornerCorrected(_) => corrections += 1,
                        _ => {}
                    }
                }

                let bounds = controller.actor().bounds;
                let position = controller.position();
                if course
                    .geometry
                    .overlap_box(bounds.center_at(position), bounds.size, LayerMask::HAZARD)
                {
                    log::info!("Fell into a pit at x={:.2}, respawning", position.x);
                    respawns += 1;
                    controller.teleport(course.spawn);
                    autopilot = Autopilot::default();
                }

                if course.is_finished(controller.position()) {
                    finished_at = Some(frame);
                    break 'frames;
                }
            }
        }

        match finished_at {
            Some(frame) => log::info!(
                "Finished course {seed} in {} ticks ({frame} frames): {jumps} jumps, {corrections} corner corrections, {respawns} respawns",
                controller.tick_count()
            ),
            None => log::warn!(
                "Did not finish course {seed}: reached x={:.2} of {:.2}",
                controller.position().x,
                course.finish_x
            ),
        }

        verify_replay(&settings, &course, &log, &controller);

        let mut batch = LineBatch::new();
        draw_geometry(&course.geometry, &mut batch);
        controller.draw_debug(&mut batch);
        log::info!(
            "Debug batch: {} vertices ({} bytes)",
            batch.vertices().len(),
            batch.as_bytes().len()
        );
    }

    /// Replay the recorded input on a fresh controller and compare end states.
    /// Respawns are host-side teleports, so only runs without them replay exactly.
    fn verify_replay(settings: &ControllerSettings, course: &Course, log: &InputLog, live: &Controller) {
        let Ok(mut replayed) = Controller::new(settings.clone(), course.spawn) else {
            return;
        };
        replayed.mark_ready();
        match log.replay(&mut replayed, &course.geometry) {
            Ok(_) if replayed.snapshot() == live.snapshot() => {
                log::info!("Replay of {} ticks matches", log.len());
            }
            Ok(_) => log::warn!("Replay diverged (host teleports are not recorded)"),
            Err(e) => log::error!("Replay failed: {e}"),
        }
    }
}
