//! Round state machine
//!
//! Two phases, `Playing` and `Over`. Transitions mutate the registry directly
//! (deactivate, respawn, spawn) and return the effects the collaborators must
//! see: physics pause/resume and display updates. Any event that does not fit
//! the current phase yields no effects.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::entity::{Animation, EntityKind, Handle, Sprite, Visual};
use super::registry::EntityRegistry;
use super::spawn::{build_arena, collectible_body, draw_bounce, player_body, spawn_hazard};
use crate::consts::HIT_TINT;
use crate::error::Result;
use crate::tuning::Tuning;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Playing,
    Over,
}

/// Input to the state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundEvent {
    /// Player overlapped a collectible
    Collect(Handle),
    /// Player touched a hazard
    HazardHit(Handle),
    /// Primary activation
    Restart,
}

/// Side effect requested by a transition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Effect {
    PausePhysics,
    ResumePhysics,
    /// Forget contacts and queued events
    ResetPhysics,
    ScoreChanged(u32),
    GameOverShown(bool),
    BatchCleared { batch: u32 },
    HazardSpawned { handle: Handle, x: f32 },
}

#[derive(Debug)]
pub struct Round {
    phase: Phase,
    score: u32,
    batches_cleared: u32,
    seed: u64,
    rng: Pcg32,
    tuning: Tuning,
}

impl Round {
    pub fn new(tuning: Tuning, seed: u64) -> Self {
        Self {
            phase: Phase::Playing,
            score: 0,
            batches_cleared: 0,
            seed,
            rng: Pcg32::seed_from_u64(seed),
            tuning,
        }
    }

    /// Build the starting registry with this round's RNG
    pub fn setup(&mut self) -> Result<EntityRegistry> {
        let registry = build_arena(&self.tuning, &mut self.rng)?;
        log::info!(
            "Round set up: {} platforms, {} collectibles (seed {})",
            registry.count(EntityKind::Platform),
            registry.count(EntityKind::Collectible),
            self.seed
        );
        Ok(registry)
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn batches_cleared(&self) -> u32 {
        self.batches_cleared
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    /// Display state for a freshly started round
    pub fn initial_effects(&self) -> Vec<Effect> {
        vec![Effect::ScoreChanged(self.score), Effect::GameOverShown(false)]
    }

    pub fn apply(&mut self, registry: &mut EntityRegistry, event: RoundEvent) -> Vec<Effect> {
        match event {
            RoundEvent::Collect(handle) => self.collect(registry, handle),
            RoundEvent::HazardHit(handle) => self.hazard_hit(registry, handle),
            RoundEvent::Restart => self.restart(registry),
        }
    }

    pub fn collect(&mut self, registry: &mut EntityRegistry, collectible: Handle) -> Vec<Effect> {
        if self.phase != Phase::Playing
            || !is_active_kind(registry, collectible, EntityKind::Collectible)
        {
            return Vec::new();
        }

        registry.set_active(collectible, false);
        self.score += self.tuning.collectibles.reward;
        let mut effects = vec![Effect::ScoreChanged(self.score)];
        log::debug!(
            "Collected {:?}, score {}, {} left",
            collectible,
            self.score,
            registry.count_active(EntityKind::Collectible)
        );

        if registry.count_active(EntityKind::Collectible) == 0 {
            self.respawn_batch(registry);
            self.batches_cleared += 1;
            effects.push(Effect::BatchCleared {
                batch: self.batches_cleared,
            });

            let player_x = registry
                .player_entity()
                .map(|p| p.body.pos.x)
                .unwrap_or_default();
            let (x, vx) = self.roll_hazard(player_x);
            match spawn_hazard(registry, &self.tuning, x, vx) {
                Ok(handle) => {
                    log::info!(
                        "Batch {} cleared, hazard {:?} spawned at x={} vx={}",
                        self.batches_cleared,
                        handle,
                        x,
                        vx
                    );
                    effects.push(Effect::HazardSpawned { handle, x });
                }
                Err(e) => log::warn!("Hazard spawn failed: {e}"),
            }
        }

        effects
    }

    pub fn hazard_hit(&mut self, registry: &mut EntityRegistry, hazard: Handle) -> Vec<Effect> {
        if self.phase != Phase::Playing || !is_active_kind(registry, hazard, EntityKind::Hazard) {
            return Vec::new();
        }

        self.phase = Phase::Over;
        if let Some(player) = registry.player_entity_mut() {
            player.visual.tint = Some(HIT_TINT);
            player.visual.animation = Animation::Idle;
        }
        log::info!(
            "Game over: score {}, {} batches cleared",
            self.score,
            self.batches_cleared
        );

        vec![Effect::PausePhysics, Effect::GameOverShown(true)]
    }

    pub fn restart(&mut self, registry: &mut EntityRegistry) -> Vec<Effect> {
        if self.phase != Phase::Over {
            return Vec::new();
        }

        self.phase = Phase::Playing;
        self.score = 0;
        self.batches_cleared = 0;

        let body = player_body(&self.tuning);
        if let Some(player) = registry.player_entity_mut() {
            player.body = body;
            player.visual = Visual::new(Sprite::Dude);
            player.active = true;
        }

        for (index, handle) in registry.handles(EntityKind::Collectible).into_iter().enumerate() {
            let bounce = draw_bounce(&self.tuning, &mut self.rng);
            if let Some(star) = registry.get_mut(handle) {
                star.body = collectible_body(&self.tuning, index, bounce);
                star.active = true;
            }
        }

        for handle in registry.handles(EntityKind::Hazard) {
            registry.set_active(handle, false);
        }

        log::info!("Round restarted");
        vec![
            Effect::ResetPhysics,
            Effect::GameOverShown(false),
            Effect::ScoreChanged(0),
            Effect::ResumePhysics,
        ]
    }

    /// Put every collectible back at the top of its column with a fresh bounce
    fn respawn_batch(&mut self, registry: &mut EntityRegistry) {
        let spawn_y = self.tuning.collectibles.spawn_y;
        for handle in registry.handles(EntityKind::Collectible) {
            let bounce = draw_bounce(&self.tuning, &mut self.rng);
            if let Some(star) = registry.get_mut(handle) {
                star.body.pos.y = spawn_y;
                star.body.vel = Vec2::ZERO;
                star.body.bounce.y = bounce;
                star.active = true;
            }
        }
    }

    /// Hazard spawn x on the half of the arena away from the player, plus its horizontal speed
    fn roll_hazard(&mut self, player_x: f32) -> (f32, f32) {
        let width = self.tuning.arena.width.round() as i32;
        let mid = self.tuning.arena.midpoint().round() as i32;
        let x = if player_x < mid as f32 {
            self.rng.random_range(mid..=width)
        } else {
            self.rng.random_range(0..=mid)
        };
        let max_vx = self.tuning.hazards.max_vx;
        let vx = self.rng.random_range(-max_vx..=max_vx);
        (x as f32, vx as f32)
    }
}

fn is_active_kind(registry: &EntityRegistry, handle: Handle, kind: EntityKind) -> bool {
    registry
        .get(handle)
        .is_some_and(|e| e.active && e.kind == kind)
}
