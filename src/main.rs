//! Ballpit entry point
//!
//! Headless driver: loads a config, spawns the starting population and runs
//! the simulation at a fixed frame rate, logging what happens.
//!
//! Usage: `ballpit [config.json] [ticks]`

use ballpit::consts::INITIAL_BODY_COUNT;
use ballpit::sim::{Command, World, tick};
use ballpit::{SimConfig, extract_instances};

/// Frame time fed to each tick (60 Hz)
const FRAME_DT: f32 = 1.0 / 60.0;
/// Ticks to run when none are given on the command line
const DEFAULT_TICKS: u64 = 600;
/// Ticks between stats lines
const REPORT_INTERVAL: u64 = 60;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(err) = run() {
        log::error!("{}", err);
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);

    let config = match args.next() {
        Some(path) => SimConfig::from_json_file(&path)?.clamped(),
        None => SimConfig::default(),
    };
    let ticks = match args.next() {
        Some(ticks) => ticks.parse::<u64>()?,
        None => DEFAULT_TICKS,
    };
    let seed = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();

    log::info!("Ballpit starting (seed {}, {} ticks)", seed, ticks);
    log::info!("{:?}", config);

    let mut world = World::new(config, seed)?;
    let created = world.populate_initial();
    log::info!("Spawned {}/{} initial bodies", created, INITIAL_BODY_COUNT);

    let mut window_contacts = 0usize;
    for frame in 1..=ticks {
        // Halfway through, exercise the panel: more bodies, new speed
        if frame == ticks / 2 {
            world.execute(Command::AddBodies(INITIAL_BODY_COUNT));
            let faster = SimConfig {
                body_speed: world.config().body_speed * 1.5,
                ..*world.config()
            }
            .clamped();
            world.apply_config_change(faster)?;
        }

        let report = tick(&mut world, FRAME_DT);
        window_contacts += report.pair_contacts;

        if frame % REPORT_INTERVAL == 0 {
            let instances = extract_instances(&world);
            log::info!(
                "Tick {}: {} bodies, {} instances, {} pair contacts in the last {} ticks",
                report.tick,
                world.body_count(),
                instances.len(),
                window_contacts,
                REPORT_INTERVAL
            );
            window_contacts = 0;
        }
    }

    world.execute(Command::RemoveAllBodies);
    log::info!(
        "Ballpit finished after {} ticks (seed {})",
        world.time_ticks(),
        world.seed()
    );
    Ok(())
}
