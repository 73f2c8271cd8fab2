//! Game balance and arena layout
//!
//! Every constant of the reference scenario lives here so a round can be
//! reshaped from a JSON file without touching the simulation.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{Error, Result};

/// How the jump input is sampled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum JumpPolicy {
    /// Jump every grounded tick while up is held (bunny hop)
    #[default]
    Held,
    /// Jump only on the tick up goes from released to held
    Pressed,
}

/// A static platform, centre position plus full extents
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlatformSpec {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl PlatformSpec {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaTuning {
    pub width: f32,
    pub height: f32,
    pub gravity: f32,
}

impl Default for ArenaTuning {
    fn default() -> Self {
        Self {
            width: ARENA_WIDTH,
            height: ARENA_HEIGHT,
            gravity: GRAVITY,
        }
    }
}

impl ArenaTuning {
    /// Horizontal midpoint used to pick the hazard spawn side
    pub fn midpoint(&self) -> f32 {
        self.width / 2.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    pub spawn: Vec2,
    pub size: Vec2,
    /// Horizontal run speed, units/s
    pub speed: f32,
    /// Upward velocity applied on jump, units/s
    pub jump_impulse: f32,
    pub bounce: f32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            spawn: Vec2::new(PLAYER_SPAWN_X, PLAYER_SPAWN_Y),
            size: Vec2::new(PLAYER_WIDTH, PLAYER_HEIGHT),
            speed: PLAYER_SPEED,
            jump_impulse: JUMP_IMPULSE,
            bounce: PLAYER_BOUNCE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectibleTuning {
    pub count: usize,
    pub first_x: f32,
    pub step_x: f32,
    pub spawn_y: f32,
    pub size: Vec2,
    pub reward: u32,
    pub bounce_min: f32,
    pub bounce_max: f32,
}

impl Default for CollectibleTuning {
    fn default() -> Self {
        Self {
            count: BATCH_SIZE,
            first_x: COLLECTIBLE_FIRST_X,
            step_x: COLLECTIBLE_STEP_X,
            spawn_y: COLLECTIBLE_SPAWN_Y,
            // 24x22 star texture at 0.2 scale
            size: Vec2::new(24.0, 22.0) * 0.2,
            reward: COLLECTIBLE_REWARD,
            bounce_min: COLLECTIBLE_BOUNCE_MIN,
            bounce_max: COLLECTIBLE_BOUNCE_MAX,
        }
    }
}

impl CollectibleTuning {
    /// Spawn position of the collectible at `index` within the batch
    pub fn spawn_position(&self, index: usize) -> Vec2 {
        Vec2::new(self.first_x + self.step_x * index as f32, self.spawn_y)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HazardTuning {
    pub spawn_y: f32,
    pub size: Vec2,
    /// Horizontal launch speed is drawn from `-max_vx..=max_vx`
    pub max_vx: i32,
    pub vy: f32,
    pub restitution: f32,
}

impl Default for HazardTuning {
    fn default() -> Self {
        Self {
            spawn_y: HAZARD_SPAWN_Y,
            // 14x14 bomb texture at 0.2 scale
            size: Vec2::splat(14.0 * 0.2),
            max_vx: HAZARD_MAX_VX,
            vy: HAZARD_VY,
            restitution: HAZARD_RESTITUTION,
        }
    }
}

/// Complete tuning for one arena
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub arena: ArenaTuning,
    pub platforms: Vec<PlatformSpec>,
    pub player: PlayerTuning,
    pub collectibles: CollectibleTuning,
    pub hazards: HazardTuning,
    pub jump_policy: JumpPolicy,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            arena: ArenaTuning::default(),
            platforms: vec![
                // Ground: 400x32 texture at 2x, resting on the bottom of the world
                PlatformSpec::new(400.0, 568.0, 800.0, 64.0),
                // Ledges: 400x32 texture at 0.5x
                PlatformSpec::new(600.0, 460.0, 200.0, 16.0),
                PlatformSpec::new(50.0, 300.0, 200.0, 16.0),
                PlatformSpec::new(750.0, 260.0, 200.0, 16.0),
            ],
            player: PlayerTuning::default(),
            collectibles: CollectibleTuning::default(),
            hazards: HazardTuning::default(),
            jump_policy: JumpPolicy::default(),
        }
    }
}

impl Tuning {
    /// Parse tuning from JSON; missing fields fall back to the reference scenario
    pub fn from_json(json: &str) -> Result<Self> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Load tuning from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| Error::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        let tuning = Self::from_json(&json)?;
        log::info!("Loaded tuning from {}", path.display());
        Ok(tuning)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject layouts the round cannot run with
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: &str| Err(Error::InvalidTuning(msg.to_string()));

        if !(self.arena.width > 0.0 && self.arena.height > 0.0) {
            return invalid("arena must have a positive size");
        }
        if self.collectibles.count == 0 {
            return invalid("collectible batch must not be empty");
        }
        let (lo, hi) = (self.collectibles.bounce_min, self.collectibles.bounce_max);
        if !(lo.is_finite() && hi.is_finite() && lo >= 0.0 && lo <= hi) {
            return invalid("collectible bounce range must satisfy 0 <= min <= max");
        }
        if self.player.speed < 0.0 || self.player.jump_impulse < 0.0 {
            return invalid("player speed and jump impulse must be non-negative");
        }
        if self.player.size.min_element() <= 0.0
            || self.collectibles.size.min_element() <= 0.0
            || self.hazards.size.min_element() <= 0.0
        {
            return invalid("entity sizes must be positive");
        }
        if self.hazards.max_vx < 0 {
            return invalid("hazard max_vx must be non-negative");
        }
        if self
            .platforms
            .iter()
            .any(|p| p.width <= 0.0 || p.height <= 0.0)
        {
            return invalid("platforms must have a positive size");
        }
        Ok(())
    }
}
