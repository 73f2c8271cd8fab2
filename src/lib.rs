//! Star Catcher - a 2-D platform arena game
//!
//! Core modules:
//! - `sim`: Gameplay simulation (entities, collision routing, round state, input mapping)
//! - `session`: Preload -> playing -> game over -> restart orchestration
//! - `present`: Renderer/text sink abstraction
//! - `preload`: Asset manifest and loading progress
//! - `tuning`: Data-driven game balance
//! - `autopilot`: Demo player for headless runs

pub mod autopilot;
pub mod error;
pub mod preload;
pub mod present;
pub mod session;
pub mod sim;
pub mod tuning;

pub use error::{Error, Result};
pub use session::{RoundSummary, Session};
pub use tuning::Tuning;

/// Game configuration constants (the reference scenario)
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Longest real frame delta fed into the accumulator
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Arena dimensions
    pub const ARENA_WIDTH: f32 = 800.0;
    pub const ARENA_HEIGHT: f32 = 600.0;
    /// Downward acceleration, units/s²
    pub const GRAVITY: f32 = 300.0;

    /// Player defaults
    pub const PLAYER_SPAWN_X: f32 = 100.0;
    pub const PLAYER_SPAWN_Y: f32 = 450.0;
    pub const PLAYER_WIDTH: f32 = 32.0;
    pub const PLAYER_HEIGHT: f32 = 48.0;
    pub const PLAYER_SPEED: f32 = 160.0;
    pub const JUMP_IMPULSE: f32 = 330.0;
    pub const PLAYER_BOUNCE: f32 = 0.2;

    /// Collectible (star) batch
    pub const BATCH_SIZE: usize = 12;
    pub const COLLECTIBLE_FIRST_X: f32 = 12.0;
    pub const COLLECTIBLE_STEP_X: f32 = 70.0;
    pub const COLLECTIBLE_SPAWN_Y: f32 = 0.0;
    pub const COLLECTIBLE_REWARD: u32 = 10;
    pub const COLLECTIBLE_BOUNCE_MIN: f32 = 0.4;
    pub const COLLECTIBLE_BOUNCE_MAX: f32 = 0.8;

    /// Hazard (bomb) spawn
    pub const HAZARD_SPAWN_Y: f32 = 16.0;
    pub const HAZARD_MAX_VX: i32 = 200;
    pub const HAZARD_VY: f32 = 20.0;
    pub const HAZARD_RESTITUTION: f32 = 1.0;

    /// Sprite sheet frame shown while idle or hit
    pub const IDLE_FRAME: u32 = 4;
    /// Tint applied to the player on a hazard hit
    pub const HIT_TINT: u32 = 0xff0000;
}
