//! Star Catcher headless runner
//!
//! Usage: `star-catcher [tuning.json] [assets-dir]`
//!
//! Preloads, then lets the autopilot play for a fixed number of frames,
//! restarting after every game over. Set `RUST_LOG=info` to follow along.
//!
//! Pass `-` for the tuning file to keep the defaults. With an assets
//! directory, every manifest entry must exist under it before play starts.

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Star Catcher (headless) starting...");

    let mut args = std::env::args().skip(1);
    let tuning_path = args.next().filter(|p| p != "-");
    let assets_root = args.next();
    if let Err(e) = native::run(tuning_path, assets_root) {
        log::error!("{e}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // No browser front end ships with this crate
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::time::{SystemTime, UNIX_EPOCH};

    use star_catcher::consts::SIM_DT;
    use star_catcher::preload::{FsLoader, HeadlessLoader, Preloader};
    use star_catcher::present::LogPresenter;
    use star_catcher::sim::{ArcadePhysics, Phase};
    use star_catcher::{Result, Session, Tuning, autopilot};

    /// Two minutes of play at 60 Hz
    const DEMO_FRAMES: u32 = 60 * 120;

    pub fn run(tuning_path: Option<String>, assets_root: Option<String>) -> Result<()> {
        let tuning = match tuning_path {
            Some(path) => Tuning::load(path)?,
            None => Tuning::default(),
        };
        if log::log_enabled!(log::Level::Debug) {
            log::debug!("Tuning: {}", tuning.to_json()?);
        }

        let mut presenter = LogPresenter::new();
        let preloader = Preloader::default();
        let ready = match assets_root {
            Some(root) => {
                let mut loader = FsLoader::new(root);
                log::info!("Checking assets under {}", loader.root().display());
                preloader.run(&mut loader, &mut presenter)?
            }
            None => preloader.run(&mut HeadlessLoader, &mut presenter)?,
        };

        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0);
        log::info!("Game initialized with seed: {seed}");

        let physics = ArcadePhysics::new(&tuning.arena);
        let mut session = Session::start(ready, tuning, seed, physics, presenter)?;

        let mut rounds = 1;
        for _ in 0..DEMO_FRAMES {
            let mut input =
                autopilot::drive(session.registry(), session.physics(), session.tuning());
            if session.phase() == Phase::Over {
                log::info!(
                    "Round {rounds} over: {}",
                    serde_json::to_string(&session.summary())?
                );
                input.activate = true;
                rounds += 1;
            }
            session.frame(SIM_DT, &input);
            session.render();
        }

        log::info!(
            "Finished after {rounds} round(s): {}",
            serde_json::to_string(&session.summary())?
        );
        Ok(())
    }
}
