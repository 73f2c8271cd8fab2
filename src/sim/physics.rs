//! Physics collaborator
//!
//! The round only needs a handful of capabilities from a physics engine,
//! captured by [`Physics`]. [`ArcadePhysics`] is the bundled backend: gravity,
//! velocity integration, world bounds and box contacts for the declared pairs.

use std::collections::HashSet;

use glam::Vec2;

use super::collision::{aabb_contact, aabb_overlap, bounce_off, clamp_to_world};
use super::entity::{Body, Handle};
use super::registry::EntityRegistry;
use super::router::{CollisionEvent, CollisionKind, DECLARED_PAIRS, PairRule};
use crate::tuning::ArenaTuning;

pub trait Physics {
    /// Integrate one step and queue the contacts it produced. No-op while paused.
    fn advance(&mut self, registry: &mut EntityRegistry, dt: f32);

    fn pause(&mut self);

    fn resume(&mut self);

    fn is_paused(&self) -> bool;

    /// Whether the body rested on a surface at the end of the last step
    fn is_touching_down(&self, handle: Handle) -> bool;

    /// Contacts queued since the last drain, in detection order
    fn drain_events(&mut self) -> Vec<CollisionEvent>;

    /// Drop contact state and queued events
    fn reset(&mut self);
}

pub struct ArcadePhysics {
    world_size: Vec2,
    gravity: f32,
    rules: &'static [PairRule],
    paused: bool,
    touching_down: HashSet<Handle>,
    pending_events: Vec<CollisionEvent>,
}

impl ArcadePhysics {
    /// A paused world; the session resumes it when the round starts
    pub fn new(arena: &ArenaTuning) -> Self {
        Self::with_rules(arena, DECLARED_PAIRS)
    }

    pub fn with_rules(arena: &ArenaTuning, rules: &'static [PairRule]) -> Self {
        Self {
            world_size: Vec2::new(arena.width, arena.height),
            gravity: arena.gravity,
            rules,
            paused: true,
            touching_down: HashSet::new(),
            pending_events: Vec::new(),
        }
    }

    fn integrate(&mut self, registry: &mut EntityRegistry, dt: f32) -> Vec<Vec2> {
        let previous: Vec<Vec2> = registry.all().map(|(_, e)| e.body.pos).collect();

        for index in 0..previous.len() {
            let handle = Handle(index as u32);
            let Some(entity) = registry.get_mut(handle) else {
                continue;
            };
            if !entity.active || entity.body.immovable {
                continue;
            }

            let body = &mut entity.body;
            if body.gravity {
                body.vel.y += self.gravity * dt;
            }
            body.pos += body.vel * dt;

            if body.collide_world_bounds && clamp_to_world(body, self.world_size).bottom {
                self.touching_down.insert(handle);
            }
        }

        previous
    }

    fn resolve_pair(
        &mut self,
        registry: &mut EntityRegistry,
        previous: &[Vec2],
        a: Handle,
        b: Handle,
        kind: CollisionKind,
    ) {
        let (Some(ea), Some(eb)) = (registry.get(a), registry.get(b)) else {
            return;
        };
        // An earlier contact this step may have deactivated one side
        if !ea.active || !eb.active {
            return;
        }
        let (mut body_a, mut body_b) = (ea.body, eb.body);

        match kind {
            CollisionKind::Overlap => {
                if aabb_overlap(&body_a, &body_b) {
                    self.pending_events.push(CollisionEvent::overlap(a, b));
                }
            }
            CollisionKind::Solid => {
                let Some(normal_a) =
                    separate(&mut body_a, previous[a.index()], &mut body_b, previous[b.index()])
                else {
                    return;
                };
                // Whichever box was pushed up is resting on the other
                if normal_a.y < 0.0 && !body_a.immovable {
                    self.touching_down.insert(a);
                }
                if normal_a.y > 0.0 && !body_b.immovable {
                    self.touching_down.insert(b);
                }
                if let Some(e) = registry.get_mut(a) {
                    e.body = body_a;
                }
                if let Some(e) = registry.get_mut(b) {
                    e.body = body_b;
                }
                self.pending_events.push(CollisionEvent::solid(a, b));
            }
        }
    }
}

/// Push two overlapping boxes apart and bounce their velocities.
/// Returns the contact normal as seen from `a`, or `None` when they do not touch.
fn separate(a: &mut Body, a_prev: Vec2, b: &mut Body, b_prev: Vec2) -> Option<Vec2> {
    if a.immovable && b.immovable {
        return None;
    }
    // Test from the point of view of the moving box
    let (result, flip) = if a.immovable {
        (aabb_contact(b, b_prev, a), true)
    } else {
        (aabb_contact(a, a_prev, b), false)
    };
    if !result.hit {
        return None;
    }
    let normal_a = if flip { -result.normal } else { result.normal };
    let push = normal_a * result.penetration;

    match (a.immovable, b.immovable) {
        (false, true) => a.pos += push,
        (true, false) => b.pos -= push,
        _ => {
            a.pos += push * 0.5;
            b.pos -= push * 0.5;
        }
    }
    if !a.immovable {
        a.vel = bounce_off(a.vel, normal_a, a.bounce);
    }
    if !b.immovable {
        b.vel = bounce_off(b.vel, -normal_a, b.bounce);
    }
    Some(normal_a)
}

impl Physics for ArcadePhysics {
    fn advance(&mut self, registry: &mut EntityRegistry, dt: f32) {
        if self.paused {
            return;
        }
        self.touching_down.clear();

        let previous = self.integrate(registry, dt);

        for rule in self.rules {
            let firsts: Vec<Handle> = registry.iter_active(rule.first).map(|(h, _)| h).collect();
            let seconds: Vec<Handle> = registry.iter_active(rule.second).map(|(h, _)| h).collect();
            for &a in &firsts {
                for &b in &seconds {
                    if a != b {
                        self.resolve_pair(registry, &previous, a, b, rule.kind);
                    }
                }
            }
        }
    }

    fn pause(&mut self) {
        if !self.paused {
            log::debug!("Physics paused");
            self.paused = true;
        }
    }

    fn resume(&mut self) {
        if self.paused {
            log::debug!("Physics resumed");
            self.paused = false;
        }
    }

    fn is_paused(&self) -> bool {
        self.paused
    }

    fn is_touching_down(&self, handle: Handle) -> bool {
        self.touching_down.contains(&handle)
    }

    fn drain_events(&mut self) -> Vec<CollisionEvent> {
        std::mem::take(&mut self.pending_events)
    }

    fn reset(&mut self) {
        self.touching_down.clear();
        self.pending_events.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::sim::entity::{Entity, EntityKind, Sprite, Visual};
    use crate::sim::round::tests::new_round;
    use crate::sim::spawn::hazard_body;
    use crate::tuning::Tuning;

    fn running(tuning: &Tuning) -> ArcadePhysics {
        let mut physics = ArcadePhysics::new(&tuning.arena);
        physics.resume();
        physics
    }

    fn settle(physics: &mut ArcadePhysics, registry: &mut EntityRegistry, ticks: usize) {
        for _ in 0..ticks {
            physics.advance(registry, SIM_DT);
            physics.drain_events();
        }
    }

    #[test]
    fn test_new_world_is_paused() {
        let tuning = Tuning::default();
        let (mut registry, _) = new_round(1);
        let mut physics = ArcadePhysics::new(&tuning.arena);
        let before = registry.player_entity().unwrap().body.pos;

        physics.advance(&mut registry, SIM_DT);
        assert!(physics.is_paused());
        assert_eq!(registry.player_entity().unwrap().body.pos, before);
    }

    #[test]
    fn test_player_falls_and_lands_on_ground() {
        let tuning = Tuning::default();
        let (mut registry, _) = new_round(1);
        let mut physics = running(&tuning);
        let player = registry.player().unwrap();

        settle(&mut physics, &mut registry, 240);

        let body = registry.get(player).unwrap().body;
        // Ground top is 568 - 32
        assert!((body.max().y - 536.0).abs() < 0.5, "player bottom at {}", body.max().y);
        assert!(physics.is_touching_down(player));
    }

    #[test]
    fn test_solid_events_are_reported() {
        let tuning = Tuning::default();
        let (mut registry, _) = new_round(1);
        let mut physics = running(&tuning);
        let player = registry.player().unwrap();

        let mut saw_ground = false;
        for _ in 0..240 {
            physics.advance(&mut registry, SIM_DT);
            saw_ground |= physics.drain_events().iter().any(|e| {
                e.kind == CollisionKind::Solid
                    && (e.a == player || e.b == player)
                    && registry.get(if e.a == player { e.b } else { e.a }).unwrap().kind
                        == EntityKind::Platform
            });
        }
        assert!(saw_ground);
    }

    #[test]
    fn test_overlap_with_collectible() {
        let tuning = Tuning::default();
        let (mut registry, _) = new_round(1);
        let mut physics = running(&tuning);
        let player = registry.player().unwrap();
        let star = registry.handles(EntityKind::Collectible)[0];

        // Park the star inside the player
        let pos = registry.get(player).unwrap().body.pos;
        registry.get_mut(star).unwrap().body.pos = pos;

        physics.advance(&mut registry, SIM_DT);
        let events = physics.drain_events();
        assert!(events.contains(&CollisionEvent::overlap(player, star)));
        // Overlap never moves anything apart
        let player_body = registry.get(player).unwrap().body;
        let star_body = registry.get(star).unwrap().body;
        assert!(aabb_overlap(&player_body, &star_body));
    }

    #[test]
    fn test_inactive_entities_are_skipped() {
        let tuning = Tuning::default();
        let (mut registry, _) = new_round(1);
        let mut physics = running(&tuning);
        let player = registry.player().unwrap();
        let star = registry.handles(EntityKind::Collectible)[0];
        let pos = registry.get(player).unwrap().body.pos;
        {
            let e = registry.get_mut(star).unwrap();
            e.body.pos = pos;
            e.active = false;
        }

        physics.advance(&mut registry, SIM_DT);
        assert!(physics.drain_events().iter().all(|e| e.a != star && e.b != star));
        // Inactive bodies do not integrate either
        assert_eq!(registry.get(star).unwrap().body.pos, pos);
    }

    #[test]
    fn test_hazard_floats_and_bounces_off_walls() {
        let tuning = Tuning::default();
        let mut registry = EntityRegistry::new();
        let hazard = registry
            .spawn(Entity::new(
                EntityKind::Hazard,
                hazard_body(&tuning, 799.0, 200.0).with_velocity(Vec2::new(200.0, 0.0)),
                Visual::new(Sprite::Bomb),
            ))
            .unwrap();
        let mut physics = running(&tuning);

        physics.advance(&mut registry, SIM_DT);
        let body = registry.get(hazard).unwrap().body;
        assert_eq!(body.vel, Vec2::new(-200.0, 0.0));
        assert_eq!(body.pos.y, 16.0);
    }

    #[test]
    fn test_paused_world_produces_nothing() {
        let tuning = Tuning::default();
        let (mut registry, _) = new_round(1);
        let mut physics = running(&tuning);
        let player = registry.player().unwrap();
        let star = registry.handles(EntityKind::Collectible)[0];
        let pos = registry.get(player).unwrap().body.pos;
        registry.get_mut(star).unwrap().body.pos = pos;

        physics.pause();
        physics.pause();
        physics.advance(&mut registry, SIM_DT);
        assert!(physics.drain_events().is_empty());
        assert_eq!(registry.get(player).unwrap().body.pos, pos);

        physics.resume();
        physics.advance(&mut registry, SIM_DT);
        assert!(!physics.drain_events().is_empty());
    }

    #[test]
    fn test_reset_clears_contacts() {
        let tuning = Tuning::default();
        let (mut registry, _) = new_round(1);
        let mut physics = running(&tuning);
        let player = registry.player().unwrap();
        settle(&mut physics, &mut registry, 240);
        physics.advance(&mut registry, SIM_DT);

        physics.reset();
        assert!(!physics.is_touching_down(player));
        assert!(physics.drain_events().is_empty());
    }
}
