//! Entity and body types
//!
//! An entity is plain data: a kind tag, an arcade body the physics backend
//! integrates, an active flag and the visual state a presenter draws.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::IDLE_FRAME;

/// Stable reference to an entity, valid for the registry's lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Handle(pub(crate) u32);

impl Handle {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Player,
    Platform,
    Collectible,
    Hazard,
}

/// Arcade physics body (axis-aligned box around `pos`)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Body {
    /// Centre position
    pub pos: Vec2,
    pub vel: Vec2,
    pub half_size: Vec2,
    /// Fraction of velocity kept on each axis after a bounce
    pub bounce: Vec2,
    pub gravity: bool,
    pub collide_world_bounds: bool,
    /// Never moved by collisions or integration
    pub immovable: bool,
}

impl Body {
    /// Immovable surface with zero velocity
    pub fn fixed(pos: Vec2, size: Vec2) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            half_size: size / 2.0,
            bounce: Vec2::ZERO,
            gravity: false,
            collide_world_bounds: false,
            immovable: true,
        }
    }

    /// Gravity-affected moving body
    pub fn dynamic(pos: Vec2, size: Vec2) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            half_size: size / 2.0,
            bounce: Vec2::ZERO,
            gravity: true,
            collide_world_bounds: false,
            immovable: false,
        }
    }

    pub fn with_bounce(mut self, bounce: Vec2) -> Self {
        self.bounce = bounce;
        self
    }

    pub fn with_velocity(mut self, vel: Vec2) -> Self {
        self.vel = vel;
        self
    }

    pub fn with_gravity(mut self, gravity: bool) -> Self {
        self.gravity = gravity;
        self
    }

    pub fn with_world_bounds(mut self, collide: bool) -> Self {
        self.collide_world_bounds = collide;
        self
    }

    #[inline]
    pub fn min(&self) -> Vec2 {
        self.pos - self.half_size
    }

    #[inline]
    pub fn max(&self) -> Vec2 {
        self.pos + self.half_size
    }
}

/// Sprite keys from the asset manifest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sprite {
    Sky,
    Ground,
    Star,
    Bomb,
    Dude,
}

impl Sprite {
    pub fn key(&self) -> &'static str {
        match self {
            Sprite::Sky => "sky",
            Sprite::Ground => "ground",
            Sprite::Star => "star",
            Sprite::Bomb => "bomb",
            Sprite::Dude => "dude",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Facing {
    Left,
    #[default]
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Animation {
    MoveLeft,
    MoveRight,
    /// Single "turn" frame facing the camera
    #[default]
    Idle,
}

impl Animation {
    /// Sprite sheet frame range `(first, last)` for the dude sheet
    pub fn frames(&self) -> (u32, u32) {
        match self {
            Animation::MoveLeft => (0, 3),
            Animation::Idle => (IDLE_FRAME, IDLE_FRAME),
            Animation::MoveRight => (5, 8),
        }
    }
}

/// What the presenter needs to draw an entity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Visual {
    pub sprite: Sprite,
    pub animation: Animation,
    pub facing: Facing,
    /// RGB tint, `None` draws the texture as-is
    pub tint: Option<u32>,
}

impl Visual {
    pub fn new(sprite: Sprite) -> Self {
        Self {
            sprite,
            animation: Animation::Idle,
            facing: Facing::default(),
            tint: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub kind: EntityKind,
    pub body: Body,
    pub active: bool,
    pub visual: Visual,
}

impl Entity {
    pub fn new(kind: EntityKind, body: Body, visual: Visual) -> Self {
        Self {
            kind,
            body,
            active: true,
            visual,
        }
    }
}
