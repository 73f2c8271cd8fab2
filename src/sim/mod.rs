//! Gameplay simulation
//!
//! All gameplay decisions live here. This module must stay deterministic:
//! - Seeded RNG only
//! - Stable iteration order (creation order of entities)
//! - No rendering or platform dependencies

pub mod collision;
pub mod entity;
pub mod input;
pub mod physics;
pub mod registry;
pub mod round;
pub mod router;
pub mod spawn;

pub use collision::{CollisionResult, aabb_contact, aabb_overlap};
pub use entity::{Animation, Body, Entity, EntityKind, Facing, Handle, Sprite, Visual};
pub use input::{InputFrame, InputMapper};
pub use physics::{ArcadePhysics, Physics};
pub use registry::EntityRegistry;
pub use round::{Effect, Phase, Round, RoundEvent};
pub use router::{CollisionEvent, CollisionKind, CollisionRouter, DECLARED_PAIRS, Routed};
pub use spawn::{build_arena, spawn_hazard};
