//! Seedsim entry point
//!
//! Windowing and GPU upload are provided by the host application. Natively
//! this binary runs the simulation headless at 60 Hz for a fixed number of
//! frames and logs what happened, which is enough to smoke-test a config.
//!
//! Usage: `seedsim [config.json]`

use std::path::Path;
use std::process::ExitCode;

use seedsim::{FrameDriver, FrameInput, SimConfig};

/// Frames simulated by the headless run (10 seconds at 60 Hz)
const HEADLESS_FRAMES: u32 = 600;
const FRAME_DT: f32 = 1.0 / 60.0;

fn main() -> ExitCode {
    env_logger::init();
    log::info!("Seedsim (native, headless) starting...");

    let config = match std::env::args().nth(1) {
        Some(path) => SimConfig::load_from_file(Path::new(&path)),
        None => Ok(SimConfig::default()),
    };

    let mut driver = match config.and_then(FrameDriver::new) {
        Ok(driver) => driver,
        Err(err) => {
            log::error!("{err}");
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };

    let energy_start = driver.world().total_kinetic_energy();
    let input = FrameInput {
        elapsed: FRAME_DT,
        ..Default::default()
    };
    for _ in 0..HEADLESS_FRAMES {
        if driver.frame(&input).quit {
            break;
        }
    }

    let world = driver.world();
    log::info!(
        "Ran {} frames ({} substeps) in '{}' mode",
        driver.frames(),
        world.steps,
        world.mode.as_str()
    );
    log::info!(
        "Kinetic energy {:.1} -> {:.1}, momentum {}",
        energy_start,
        world.total_kinetic_energy(),
        world.total_momentum()
    );
    log::info!("Instance buffer: {} bytes", std::mem::size_of_val(driver.instances()));

    ExitCode::SUCCESS
}
