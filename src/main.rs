//! Twin Ascent headless runner
//!
//! Builds a seeded tower of platforms, lets a simple autopilot climb it until
//! the hazard wins (or the time cap is hit), then prints the final snapshot
//! as JSON.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use twin_ascent::consts::{MAX_SUBSTEPS, SIM_DT};
use twin_ascent::logging;
use twin_ascent::sim::{
    EventKind, GameEvent, GameState, JumpSignal, Solid, StaticWorld, TickInput, tick,
};
use twin_ascent::tuning::Tuning;

/// Rendering cadence the runner pretends to have
const FRAME_DT: f32 = 1.0 / 60.0;
/// Vertical gap between tower floors
const FLOOR_SPACING: f32 = 2.5;
const TOWER_FLOORS: usize = 200;

#[derive(Debug, Parser)]
#[command(name = "twin-ascent")]
#[command(version, about = "Headless Twin Ascent run driven by an autopilot")]
struct Options {
    /// Log at debug level (RUST_LOG still wins)
    #[arg(long, short = 'v')]
    verbose: bool,

    /// Seed for the tower layout and the autopilot
    #[arg(long, default_value_t = 12345)]
    seed: u64,

    /// Tuning JSON file (defaults are used when absent or unreadable)
    #[arg(long)]
    tuning: Option<PathBuf>,

    /// Simulated seconds before the run is cut off
    #[arg(long, default_value_t = 300.0)]
    max_seconds: f32,

    /// Print the effective tuning as JSON and exit
    #[arg(long)]
    print_tuning: bool,
}

/// Ground floor plus `floors` platforms stacked `FLOOR_SPACING` apart
fn build_tower(seed: u64, floors: usize) -> StaticWorld {
    let mut rng = Pcg32::seed_from_u64(seed);
    let mut world = StaticWorld::new().with(Solid::platform(0.0, 0.0, 30.0, 1.0));

    let mut x = 0.0f32;
    for floor in 1..=floors {
        // Keep each step within a jump's horizontal reach
        x = (x + rng.random_range(-4.0..4.0)).clamp(-10.0, 10.0);
        let width = rng.random_range(4.0..8.0);
        world.push(Solid::platform(
            x,
            floor as f32 * FLOOR_SPACING,
            width,
            0.5,
        ));
    }

    world
}

/// Walks toward the next platform up and jumps when underneath it
#[derive(Debug)]
struct Autopilot {
    rng: Pcg32,
    airborne_ticks: u32,
}

impl Autopilot {
    fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed ^ 0x5eed),
            airborne_ticks: 0,
        }
    }

    fn next_target<'w>(&self, world: &'w StaticWorld, feet_y: f32) -> Option<&'w Solid> {
        world
            .solids
            .iter()
            .filter(|s| s.top() > feet_y + 0.25)
            .min_by(|a, b| a.top().total_cmp(&b.top()))
    }

    fn decide(&mut self, state: &GameState, world: &StaticWorld) -> TickInput {
        let controller = state.controller().state();
        let position = controller.body.position;
        let feet_y = position.y - 0.5;

        let Some(target) = self.next_target(world, feet_y) else {
            return TickInput::default();
        };
        let center_x = (target.min.x + target.max.x) / 2.0;
        let dx = center_x - position.x;

        let mut input = TickInput {
            movement: Vec2::new(dx.clamp(-1.0, 1.0), 0.0),
            ..Default::default()
        };

        if controller.grounded {
            self.airborne_ticks = 0;
            let half_width = (target.max.x - target.min.x) / 2.0;
            if dx.abs() < half_width + 1.0 {
                input.jump = JumpSignal::Pressed;
            }
            // Occasionally trade places to show off the other character
            if !controller.is_switch_locked() && self.rng.random_bool(0.01) {
                input.switch_character = true;
            }
        } else {
            self.airborne_ticks += 1;
            // Spend a second jump at the apex when one is left
            let apex = controller.body.velocity.y <= 0.0 && self.airborne_ticks > 10;
            if apex && controller.jump.jumps_used < controller.stats.max_jumps {
                input.jump = JumpSignal::Pressed;
            }
        }

        input
    }
}

/// Fixed-step accumulator loop driving the simulation
struct Runner {
    state: GameState,
    world: StaticWorld,
    autopilot: Autopilot,
    accumulator: f32,
}

impl Runner {
    fn update(&mut self, dt: f32) {
        let dt = dt.min(0.1);
        self.accumulator += dt;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            let input = self.autopilot.decide(&self.state, &self.world);
            tick(&mut self.state, &self.world, &input, SIM_DT);
            self.accumulator -= SIM_DT;
            substeps += 1;
        }
    }
}

fn main() -> ExitCode {
    let options = Options::parse();

    logging::init(options.verbose);
    log::info!("Twin Ascent (headless) starting with seed {}", options.seed);

    let tuning = match &options.tuning {
        Some(path) => Tuning::load_or_default(path),
        None => Tuning::default(),
    };

    if options.print_tuning {
        return match tuning.to_json_pretty() {
            Ok(json) => {
                println!("{json}");
                ExitCode::SUCCESS
            }
            Err(err) => {
                log::error!("{err}");
                ExitCode::FAILURE
            }
        };
    }

    let mut state = match GameState::new(&tuning) {
        Ok(state) => state,
        Err(err) => {
            log::error!("Cannot start a run: {err}");
            return ExitCode::FAILURE;
        }
    };

    state.subscribe(EventKind::RespawnFlicker, |_| log::info!("Respawned"));
    state.subscribe(EventKind::GameOver, |event| {
        if let GameEvent::GameOver { cause } = event {
            log::info!("Run ended: {cause:?}");
        }
    });

    let mut runner = Runner {
        state,
        world: build_tower(options.seed, TOWER_FLOORS),
        autopilot: Autopilot::new(options.seed),
        accumulator: 0.0,
    };

    let frames = (options.max_seconds / FRAME_DT).ceil() as u64;
    for _ in 0..frames {
        runner.update(FRAME_DT);
        if runner.state.survival().game_over().is_some() {
            break;
        }
    }

    let snapshot = runner.state.snapshot();
    log::info!(
        "Reached height {:.1} after {} ticks",
        snapshot.controller.body.position.y,
        snapshot.time_ticks
    );
    runner.state.shutdown();

    match serde_json::to_string_pretty(&snapshot) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            log::error!("Failed to serialize snapshot: {err}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_args() {
        let options =
            Options::try_parse_from(["twin-ascent", "--seed", "7", "-v", "--max-seconds", "2.5"])
                .unwrap();
        assert_eq!(options.seed, 7);
        assert!(options.verbose);
        assert_eq!(options.max_seconds, 2.5);
        assert!(options.tuning.is_none());

        let defaults = Options::try_parse_from(["twin-ascent"]).unwrap();
        assert_eq!(defaults.seed, 12345);
        assert_eq!(defaults.max_seconds, 300.0);
        assert!(!defaults.print_tuning);

        let with_file =
            Options::try_parse_from(["twin-ascent", "--tuning", "tuning.json"]).unwrap();
        assert_eq!(with_file.tuning, Some(PathBuf::from("tuning.json")));

        assert!(Options::try_parse_from(["twin-ascent", "--seed"]).is_err());
        assert!(Options::try_parse_from(["twin-ascent", "--seed", "abc"]).is_err());
        assert!(Options::try_parse_from(["twin-ascent", "--bogus"]).is_err());
    }

    #[test]
    fn test_help_is_available() {
        let err = Options::try_parse_from(["twin-ascent", "--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_tower_is_seeded() {
        let a = build_tower(42, 20);
        let b = build_tower(42, 20);
        assert_eq!(a.solids, b.solids);
        assert_eq!(a.solids.len(), 21);
        assert_ne!(a.solids, build_tower(43, 20).solids);
    }

    #[test]
    fn test_runner_respects_substep_cap() {
        let mut runner = Runner {
            state: GameState::new(&Tuning::default()).unwrap(),
            world: build_tower(1, 10),
            autopilot: Autopilot::new(1),
            accumulator: 0.0,
        };
        runner.update(1.0);
        assert_eq!(runner.state.time_ticks, MAX_SUBSTEPS as u64);
    }
}
