//! Input-to-motion mapping
//!
//! Turns the four directional signals into player velocity and animation.
//! Horizontal input is exclusive with left checked first. Vertical velocity is
//! only touched when a jump fires; otherwise gravity owns it.

use serde::{Deserialize, Serialize};

use super::entity::{Animation, Facing};
use super::registry::EntityRegistry;
use super::round::Phase;
use crate::tuning::{JumpPolicy, Tuning};

/// Input signals for a single tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputFrame {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    /// Sampled but unused by the arena
    pub down: bool,
    /// Primary activation (click/tap/key), only meaningful after game over
    pub activate: bool,
}

impl InputFrame {
    pub fn left() -> Self {
        Self {
            left: true,
            ..Default::default()
        }
    }

    pub fn right() -> Self {
        Self {
            right: true,
            ..Default::default()
        }
    }

    pub fn activate() -> Self {
        Self {
            activate: true,
            ..Default::default()
        }
    }

    pub fn with_up(mut self) -> Self {
        self.up = true;
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct InputMapper {
    up_was_held: bool,
}

impl InputMapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one tick of input to the player. `grounded` is the physics
    /// backend's touching-down report from the previous step.
    pub fn apply(
        &mut self,
        input: &InputFrame,
        phase: Phase,
        registry: &mut EntityRegistry,
        grounded: bool,
        tuning: &Tuning,
    ) {
        // Motion is frozen until restart
        if phase != Phase::Playing {
            return;
        }

        let up_edge = input.up && !self.up_was_held;
        self.up_was_held = input.up;

        let Some(player) = registry.player_entity_mut() else {
            return;
        };
        let speed = tuning.player.speed;

        if input.left {
            player.body.vel.x = -speed;
            player.visual.animation = Animation::MoveLeft;
            player.visual.facing = Facing::Left;
        } else if input.right {
            player.body.vel.x = speed;
            player.visual.animation = Animation::MoveRight;
            player.visual.facing = Facing::Right;
        } else {
            player.body.vel.x = 0.0;
            player.visual.animation = Animation::Idle;
        }

        let wants_jump = match tuning.jump_policy {
            JumpPolicy::Held => input.up,
            JumpPolicy::Pressed => up_edge,
        };
        if wants_jump && grounded {
            player.body.vel.y = -tuning.player.jump_impulse;
        }
    }

    /// Forget edge state (restart)
    pub fn reset(&mut self) {
        self.up_was_held = false;
    }
}
