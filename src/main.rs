//! Paper Loop entry point
//!
//! Headless driver: builds the course from a seed, drives a scripted vehicle
//! around it for a minute of simulated time and reports what broke.
//!
//! Usage: `paper-loop [seed] [tuning.json]`

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Paper Loop (headless) starting...");

    let mut args = std::env::args().skip(1);
    let seed = match args.next().map(|s| s.parse::<u64>()) {
        Some(Ok(seed)) => seed,
        Some(Err(e)) => {
            log::warn!("Ignoring seed argument ({e}), using 12345");
            12345
        }
        None => 12345,
    };
    let tuning_json = args.next().and_then(|path| match std::fs::read_to_string(&path) {
        Ok(json) => Some(json),
        Err(e) => {
            log::warn!("Could not read {path}: {e}");
            None
        }
    });

    let tuning = paper_loop::Tuning::load_or_default(tuning_json.as_deref());
    match headless::run(&tuning, seed) {
        Ok(summary) => println!("{summary}"),
        Err(e) => {
            log::error!("Failed to build world: {e}");
            std::process::exit(1);
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Browser hosts drive the library directly
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::fmt;
    use std::time::Instant;

    use glam::Vec3;
    use paper_loop::renderer::InstanceBuffer;
    use paper_loop::sim::{
        Environment, EnvironmentEvent, ResourceTable, StopRing, TickInput, VehiclePose,
        highlight_pulse, tick,
    };
    use paper_loop::{ConfigError, Tuning, wrap_unit};

    /// Simulated run length (seconds)
    const RUN_SECONDS: f32 = 60.0;
    const FRAME_DT: f32 = 1.0 / 60.0;
    /// Every this many frames the host "stalls" for a long frame
    const STALL_EVERY: u64 = 600;
    const STALL_DT: f32 = 0.4;
    const CRUISE_SPEED: f32 = 14.0;
    const STOP_COUNT: usize = 30;
    const STOP_RANGE: f32 = 3.2;

    pub struct Summary {
        seed: u64,
        frames: u64,
        simulated: f64,
        destroyed: usize,
        remaining: usize,
        bursts_spawned: usize,
        bursts_expired: usize,
        peak_bursts: usize,
        peak_instances: usize,
        stops_visited: usize,
        wall_ms: u128,
    }

    impl fmt::Display for Summary {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            writeln!(f, "seed            {}", self.seed)?;
            writeln!(f, "frames          {} ({:.1}s simulated)", self.frames, self.simulated)?;
            writeln!(f, "destroyed       {} ({} left standing)", self.destroyed, self.remaining)?;
            writeln!(f, "bursts          {} spawned, {} expired", self.bursts_spawned, self.bursts_expired)?;
            writeln!(f, "peak bursts     {}", self.peak_bursts)?;
            writeln!(f, "peak instances  {}", self.peak_instances)?;
            writeln!(f, "stops visited   {}", self.stops_visited)?;
            write!(f, "wall time       {} ms", self.wall_ms)
        }
    }

    /// Scripted mover: laps the course while weaving out into the jungle band
    struct ScriptedDriver {
        t: f32,
        weave: f32,
    }

    impl ScriptedDriver {
        fn advance(&mut self, env: &Environment, dt: f32) -> VehiclePose {
            self.t = wrap_unit(self.t + CRUISE_SPEED * dt / env.track.circumference());
            self.weave += dt * 0.7;
            // 1.0 keeps to the road centre, 1.6 cuts well into the scenery
            let spread = 1.3 + 0.3 * self.weave.sin();
            let on_track = env.track.world_point_at(self.t, 0.35);
            let position = Vec3::new(on_track.x * spread, on_track.y, on_track.z * spread);
            VehiclePose::from_yaw(position, env.track.tangent_angle_at(self.t), CRUISE_SPEED)
        }
    }

    pub fn run(tuning: &Tuning, seed: u64) -> Result<Summary, ConfigError> {
        let resources = ResourceTable::with_defaults();
        let mut env = Environment::from_tuning(tuning, &resources, seed)?;
        let stops = StopRing::build(&env.track, STOP_COUNT);
        let mut buffer = InstanceBuffer::new();
        let mut driver = ScriptedDriver { t: 0.0, weave: 0.0 };

        let start_pose = driver.advance(&env, 0.0);
        env.camera.reset(&start_pose);

        let mut summary = Summary {
            seed,
            frames: 0,
            simulated: 0.0,
            destroyed: 0,
            remaining: env.destructibles.len(),
            bursts_spawned: 0,
            bursts_expired: 0,
            peak_bursts: 0,
            peak_instances: 0,
            stops_visited: 0,
            wall_ms: 0,
        };
        let mut visited = vec![false; stops.len()];
        let started = Instant::now();
        let frame_count = (RUN_SECONDS / FRAME_DT) as u64;

        for frame in 1..=frame_count {
            let measured = if frame % STALL_EVERY == 0 { STALL_DT } else { FRAME_DT };
            let vehicle = driver.advance(&env, measured.min(env.max_frame_dt));
            let camera = tick(&mut env, &TickInput { dt: measured, vehicle });

            for event in env.drain_events() {
                match event {
                    EnvironmentEvent::Destroyed { destructible, kind, burst } => {
                        summary.destroyed += 1;
                        summary.bursts_spawned += 1;
                        log::debug!(
                            "Smashed {} #{} (burst {})",
                            kind.as_str(),
                            destructible.0,
                            burst.0
                        );
                    }
                    EnvironmentEvent::BurstExpired { .. } => summary.bursts_expired += 1,
                }
            }

            if let Some(near) = stops.nearest_within(vehicle.position, STOP_RANGE) {
                if !visited[near.index] {
                    visited[near.index] = true;
                    log::info!(
                        "Passing stop {} (glow {:.2})",
                        near.index + 1,
                        highlight_pulse(env.elapsed as f32)
                    );
                }
            }

            buffer.write_environment(&env, &resources.track);
            summary.peak_bursts = summary.peak_bursts.max(env.bursts.live_count());
            summary.peak_instances = summary.peak_instances.max(buffer.instances().len());

            if frame % 600 == 0 {
                log::info!(
                    "t={:.1}s destroyed={} live_bursts={} camera=({:.1}, {:.1}, {:.1})",
                    env.elapsed,
                    env.destructibles.destroyed_count(),
                    env.bursts.live_count(),
                    camera.position.x,
                    camera.position.y,
                    camera.position.z
                );
            }
        }

        env.teardown();
        summary.bursts_expired += env
            .drain_events()
            .filter(|e| matches!(e, EnvironmentEvent::BurstExpired { .. }))
            .count();

        summary.frames = env.frame;
        summary.simulated = env.elapsed;
        summary.remaining = env.destructibles.active_count();
        summary.stops_visited = visited.iter().filter(|v| **v).count();
        summary.wall_ms = started.elapsed().as_millis();
        Ok(summary)
    }
}
