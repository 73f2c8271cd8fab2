//! Collision routing
//!
//! The physics backend reports raw `(a, b, kind)` events. The router looks up
//! the unordered pair of entity kinds in a static table and hands gameplay
//! pairs to the round state machine. The same table tells the physics backend
//! which pairs to test at all.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::entity::{EntityKind, Handle};
use super::registry::EntityRegistry;
use super::round::{Effect, Phase, Round, RoundEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CollisionKind {
    /// Physically resolved contact
    Solid,
    /// Detected but not resolved
    Overlap,
}

/// One contact reported by the physics backend for the current tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollisionEvent {
    pub a: Handle,
    pub b: Handle,
    pub kind: CollisionKind,
}

impl CollisionEvent {
    pub fn solid(a: Handle, b: Handle) -> Self {
        Self {
            a,
            b,
            kind: CollisionKind::Solid,
        }
    }

    pub fn overlap(a: Handle, b: Handle) -> Self {
        Self {
            a,
            b,
            kind: CollisionKind::Overlap,
        }
    }
}

/// Gameplay meaning of a declared pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Response {
    /// Physics resolution only
    Physical,
    Collect,
    HazardHit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairRule {
    pub first: EntityKind,
    pub second: EntityKind,
    pub kind: CollisionKind,
    pub response: Response,
}

impl PairRule {
    const fn new(
        first: EntityKind,
        second: EntityKind,
        kind: CollisionKind,
        response: Response,
    ) -> Self {
        Self {
            first,
            second,
            kind,
            response,
        }
    }

    /// Unordered kind match
    pub fn matches(&self, a: EntityKind, b: EntityKind) -> bool {
        (self.first == a && self.second == b) || (self.first == b && self.second == a)
    }
}

/// Every pair the arena checks, in the order the physics backend tests them
pub const DECLARED_PAIRS: &[PairRule] = &[
    PairRule::new(
        EntityKind::Player,
        EntityKind::Platform,
        CollisionKind::Solid,
        Response::Physical,
    ),
    PairRule::new(
        EntityKind::Collectible,
        EntityKind::Platform,
        CollisionKind::Solid,
        Response::Physical,
    ),
    PairRule::new(
        EntityKind::Hazard,
        EntityKind::Platform,
        CollisionKind::Solid,
        Response::Physical,
    ),
    PairRule::new(
        EntityKind::Player,
        EntityKind::Collectible,
        CollisionKind::Overlap,
        Response::Collect,
    ),
    PairRule::new(
        EntityKind::Player,
        EntityKind::Hazard,
        CollisionKind::Solid,
        Response::HazardHit,
    ),
];

/// A routed gameplay event with the relevant handle picked out of the pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Routed {
    Physical,
    Collect { collectible: Handle },
    HazardHit { hazard: Handle },
}

#[derive(Debug, Clone, Copy)]
pub struct CollisionRouter {
    rules: &'static [PairRule],
}

impl Default for CollisionRouter {
    fn default() -> Self {
        Self {
            rules: DECLARED_PAIRS,
        }
    }
}

impl CollisionRouter {
    /// Find the declared rule for an unordered kind pair
    pub fn rule_for(&self, a: EntityKind, b: EntityKind) -> Option<&'static PairRule> {
        self.rules.iter().find(|r| r.matches(a, b))
    }

    /// Classify one event. `None` means it carries no meaning this tick:
    /// an unknown handle, an inactive entity, an undeclared pair, or a
    /// collision kind the pair was not declared with.
    pub fn resolve(&self, event: &CollisionEvent, registry: &EntityRegistry) -> Option<Routed> {
        let a = registry.get(event.a).filter(|e| e.active)?;
        let b = registry.get(event.b).filter(|e| e.active)?;
        let rule = self.rule_for(a.kind, b.kind)?;
        if rule.kind != event.kind {
            return None;
        }

        let pick = |kind: EntityKind| if a.kind == kind { event.a } else { event.b };
        Some(match rule.response {
            Response::Physical => Routed::Physical,
            Response::Collect => Routed::Collect {
                collectible: pick(EntityKind::Collectible),
            },
            Response::HazardHit => Routed::HazardHit {
                hazard: pick(EntityKind::Hazard),
            },
        })
    }

    /// Route a tick's events into the round, in report order.
    ///
    /// Events describe the arena as it was when physics reported them. A
    /// collectible is collected at most once per dispatch, and once a batch
    /// is cleared the remaining collect events are stale: they refer to
    /// stars that have since been put back at the top.
    pub fn dispatch(
        &self,
        events: &[CollisionEvent],
        registry: &mut EntityRegistry,
        round: &mut Round,
    ) -> Vec<Effect> {
        let mut effects = Vec::new();
        let mut collected = HashSet::new();
        let mut batch_respawned = false;

        for event in events {
            // Once Over nothing further in this tick matters
            if round.phase() != Phase::Playing {
                break;
            }
            let round_event = match self.resolve(event, registry) {
                Some(Routed::Collect { collectible }) => {
                    if batch_respawned || !collected.insert(collectible) {
                        continue;
                    }
                    RoundEvent::Collect(collectible)
                }
                Some(Routed::HazardHit { hazard }) => RoundEvent::HazardHit(hazard),
                Some(Routed::Physical) | None => continue,
            };

            let step = round.apply(registry, round_event);
            batch_respawned |= step
                .iter()
                .any(|e| matches!(e, Effect::BatchCleared { .. }));
            effects.extend(step);
        }
        effects
    }
}
