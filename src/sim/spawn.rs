//! Arena construction and entity factories

use glam::Vec2;
use rand::Rng;

use super::entity::{Body, Entity, EntityKind, Handle, Sprite, Visual};
use super::registry::EntityRegistry;
use crate::error::Result;
use crate::tuning::Tuning;

/// Build the starting arena: platforms, the player, then the collectible batch
pub fn build_arena(tuning: &Tuning, rng: &mut impl Rng) -> Result<EntityRegistry> {
    let mut registry = EntityRegistry::new();

    for platform in &tuning.platforms {
        registry.spawn(Entity::new(
            EntityKind::Platform,
            Body::fixed(
                Vec2::new(platform.x, platform.y),
                Vec2::new(platform.width, platform.height),
            ),
            Visual::new(Sprite::Ground),
        ))?;
    }

    registry.spawn(player_entity(tuning))?;

    for index in 0..tuning.collectibles.count {
        let bounce = draw_bounce(tuning, rng);
        registry.spawn(Entity::new(
            EntityKind::Collectible,
            collectible_body(tuning, index, bounce),
            Visual::new(Sprite::Star),
        ))?;
    }

    Ok(registry)
}

pub fn player_body(tuning: &Tuning) -> Body {
    let p = &tuning.player;
    Body::dynamic(p.spawn, p.size)
        .with_bounce(Vec2::splat(p.bounce))
        .with_world_bounds(true)
}

pub fn player_entity(tuning: &Tuning) -> Entity {
    Entity::new(
        EntityKind::Player,
        player_body(tuning),
        Visual::new(Sprite::Dude),
    )
}

/// Collectible at rest at its batch slot with a vertical bounce of `bounce_y`
pub fn collectible_body(tuning: &Tuning, index: usize, bounce_y: f32) -> Body {
    let c = &tuning.collectibles;
    Body::dynamic(c.spawn_position(index), c.size).with_bounce(Vec2::new(0.0, bounce_y))
}

/// Fresh vertical bounce for a (re)activated collectible
pub fn draw_bounce(tuning: &Tuning, rng: &mut impl Rng) -> f32 {
    let (lo, hi) = (tuning.collectibles.bounce_min, tuning.collectibles.bounce_max);
    if lo < hi { rng.random_range(lo..hi) } else { lo }
}

pub fn hazard_body(tuning: &Tuning, x: f32, vx: f32) -> Body {
    let h = &tuning.hazards;
    Body::dynamic(Vec2::new(x, h.spawn_y), h.size)
        .with_velocity(Vec2::new(vx, h.vy))
        .with_bounce(Vec2::splat(h.restitution))
        .with_gravity(false)
        .with_world_bounds(true)
}

/// Activate a hazard at `x` moving with horizontal speed `vx`.
///
/// Hazards retired by a restart are reused before a new one is created.
pub fn spawn_hazard(
    registry: &mut EntityRegistry,
    tuning: &Tuning,
    x: f32,
    vx: f32,
) -> Result<Handle> {
    let body = hazard_body(tuning, x, vx);
    let retired = registry
        .iter(EntityKind::Hazard)
        .find(|(_, e)| !e.active)
        .map(|(h, _)| h);

    if let Some(handle) = retired {
        if let Some(entity) = registry.get_mut(handle) {
            entity.body = body;
            entity.visual = Visual::new(Sprite::Bomb);
            entity.active = true;
            return Ok(handle);
        }
    }

    registry.spawn(Entity::new(
        EntityKind::Hazard,
        body,
        Visual::new(Sprite::Bomb),
    ))
}
