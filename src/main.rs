//! Arena Survivors headless driver
//!
//! Runs an autopiloted session against the simulation core, logging events
//! as they happen and printing the final snapshot as JSON.
//!
//! Usage: `arena-survivors [tuning.json|-] [seed] [seconds]`

#[cfg(not(target_arch = "wasm32"))]
mod driver {
    use std::collections::BTreeMap;
    use std::process::ExitCode;

    use arena_survivors::consts::SIM_DT;
    use arena_survivors::sim::{
        CameraView, Clock, GameEvent, GamePhase, GameState, TickInput, tick,
    };
    use arena_survivors::{Tuning, horizontal, yaw_toward};
    use glam::{Vec2, Vec3};

    /// Eye height of the autopilot's aim (enemy mid-body)
    const AIM_HEIGHT: f32 = 0.9;
    /// Ticks between weapon swaps
    const SWAP_EVERY: u64 = 300;
    /// Ticks between slow-motion toggles
    const SLOW_MO_EVERY: u64 = 420;
    /// Runs allowed before the driver stops restarting
    const MAX_RUNS: u32 = 3;

    pub fn run() -> ExitCode {
        env_logger::init();

        let mut args = std::env::args().skip(1);
        let tuning = match args.next().as_deref() {
            None | Some("-") => Tuning::default(),
            Some(path) => match Tuning::load(path) {
                Ok(tuning) => tuning,
                Err(err) => {
                    log::error!("{err}");
                    return ExitCode::FAILURE;
                }
            },
        };
        let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(42);
        let seconds: f64 = args.next().and_then(|s| s.parse().ok()).unwrap_or(60.0);

        log::info!("Arena Survivors (headless) seed={seed} duration={seconds}s");

        let mut clock = Clock::new(&tuning.slowmo);
        let mut state = GameState::new(seed, tuning);
        let mut counts: BTreeMap<&'static str, u32> = BTreeMap::new();
        let mut runs = 1;

        let frames = (seconds / SIM_DT).ceil() as u64;
        clock.start(0.0);
        for frame in 1..=frames {
            clock.advance(frame as f64 * SIM_DT);

            let (input, camera) = autopilot(&state, frame);
            let events = tick(&mut state, &mut clock, &input, &camera);
            for event in &events {
                *counts.entry(event.kind()).or_insert(0) += 1;
                log_event(event);
            }

            if state.phase == GamePhase::GameOver {
                if runs >= MAX_RUNS {
                    break;
                }
                runs += 1;
            }
        }

        for (kind, count) in &counts {
            log::info!("{kind}: {count}");
        }

        match serde_json::to_string_pretty(&state.snapshot(&clock)) {
            Ok(json) => {
                println!("{json}");
                ExitCode::SUCCESS
            }
            Err(err) => {
                log::error!("failed to serialize snapshot: {err}");
                ExitCode::FAILURE
            }
        }
    }

    /// Face the nearest living enemy, circle-strafe, keep shooting
    fn autopilot(state: &GameState, frame: u64) -> (TickInput, CameraView) {
        let player = &state.player;
        let nearest = state
            .spawner
            .enemies
            .iter()
            .filter(|e| e.is_alive())
            .min_by(|a, b| {
                let da = a.position.distance_squared(player.position);
                let db = b.position.distance_squared(player.position);
                da.total_cmp(&db)
            });

        let yaw = nearest
            .map(|e| yaw_toward(horizontal(e.position - player.position)))
            .unwrap_or(player.yaw);
        let camera = CameraView::from_yaw_pitch(player.position + Vec3::Y * AIM_HEIGHT, yaw, 0.0);

        let slow_mo_toggle = frame % SLOW_MO_EVERY == 0;
        let input = TickInput {
            movement: Vec2::new(1.0, -0.3),
            run: frame % 240 < 60,
            jump: frame % SLOW_MO_EVERY == 30,
            fire: nearest.is_some(),
            slow_mo_toggle,
            cycle_weapon: frame % SWAP_EVERY == 0,
            choose_upgrade: (state.phase == GamePhase::ChoosingUpgrade).then_some(0),
            restart: state.phase == GamePhase::GameOver,
            ..Default::default()
        };
        (input, camera)
    }

    fn log_event(event: &GameEvent) {
        match event {
            GameEvent::LeveledUp { level } => log::info!("reached level {level}"),
            GameEvent::UpgradeApplied { kind } => log::info!("upgrade applied: {}", kind.as_str()),
            GameEvent::PlayerDied => log::info!("player died"),
            GameEvent::SessionReset => log::info!("new run"),
            GameEvent::SlowMoChanged { active } => log::debug!("slow motion: {active}"),
            GameEvent::EnemyDied { enemy_id, .. } => log::debug!("enemy {enemy_id} died"),
            other => log::trace!("{other:?}"),
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> std::process::ExitCode {
    driver::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The simulation is driven by the embedding page on the web
}
