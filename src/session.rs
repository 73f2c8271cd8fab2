//! Session controller
//!
//! Owns the registry, the round and both collaborators. One [`Session::step`]
//! is one simulation tick, always in this order:
//!
//! 1. restart, if the round is over and the activation signal is set
//! 2. input -> player motion
//! 3. physics advance
//! 4. route the tick's contacts into the round
//! 5. hand the resulting effects to physics and the presenter
//!
//! [`Session::frame`] feeds real frame time through a fixed-step accumulator.

use serde::{Deserialize, Serialize};

use crate::consts::{MAX_FRAME_DT, MAX_SUBSTEPS, SIM_DT};
use crate::error::{Error, Result};
use crate::preload::Ready;
use crate::present::{GAME_OVER_TEXT, Presenter, TextId, score_text};
use crate::sim::{
    CollisionRouter, Effect, EntityKind, EntityRegistry, InputFrame, InputMapper, Phase, Physics,
    Round, RoundEvent,
};
use crate::tuning::Tuning;

/// Snapshot of a round for logs and tooling
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundSummary {
    pub phase: Phase,
    pub score: u32,
    pub batches_cleared: u32,
    pub active_collectibles: usize,
    pub active_hazards: usize,
    pub ticks: u64,
    pub seed: u64,
}

pub struct Session<P: Physics, S: Presenter> {
    registry: EntityRegistry,
    round: Round,
    router: CollisionRouter,
    mapper: InputMapper,
    physics: P,
    presenter: S,
    accumulator: f32,
    /// Activation seen in a frame that ran no substep yet
    pending_activate: bool,
    ticks: u64,
}

impl<P: Physics, S: Presenter> Session<P, S> {
    /// Build the arena and start playing. Requires a finished preload.
    pub fn start(
        ready: Ready,
        tuning: Tuning,
        seed: u64,
        mut physics: P,
        mut presenter: S,
    ) -> Result<Self> {
        tuning.validate()?;
        let mut round = Round::new(tuning, seed);
        let registry = round.setup()?;

        physics.reset();
        physics.resume();
        if physics.is_paused() {
            return Err(Error::PhysicsNotReady);
        }

        presenter.set_text(TextId::GameOver, GAME_OVER_TEXT);
        let mut session = Self {
            registry,
            round,
            router: CollisionRouter::default(),
            mapper: InputMapper::new(),
            physics,
            presenter,
            accumulator: 0.0,
            pending_activate: false,
            ticks: 0,
        };
        let effects = session.round.initial_effects();
        session.apply_effects(effects);

        log::info!(
            "Session started ({} assets, {} entities, seed {})",
            ready.keys().len(),
            session.registry.len(),
            seed
        );
        Ok(session)
    }

    /// Run one fixed tick
    pub fn step(&mut self, input: &InputFrame) {
        self.ticks += 1;

        if input.activate && self.round.phase() == Phase::Over {
            self.mapper.reset();
            let effects = self.round.apply(&mut self.registry, RoundEvent::Restart);
            self.apply_effects(effects);
        }

        let grounded = self
            .registry
            .player()
            .is_some_and(|player| self.physics.is_touching_down(player));
        self.mapper.apply(
            input,
            self.round.phase(),
            &mut self.registry,
            grounded,
            self.round.tuning(),
        );

        self.physics.advance(&mut self.registry, SIM_DT);
        let events = self.physics.drain_events();
        let effects = self.router.dispatch(&events, &mut self.registry, &mut self.round);
        self.apply_effects(effects);
    }

    /// Advance by real elapsed time. Returns the number of ticks run.
    /// A non-finite `real_dt` counts as zero elapsed time.
    pub fn frame(&mut self, real_dt: f32, input: &InputFrame) -> u32 {
        let real_dt = if real_dt.is_finite() { real_dt } else { 0.0 };
        self.accumulator += real_dt.clamp(0.0, MAX_FRAME_DT);
        self.pending_activate |= input.activate;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            let tick_input = InputFrame {
                activate: self.pending_activate,
                ..*input
            };
            self.step(&tick_input);
            self.accumulator -= SIM_DT;
            substeps += 1;

            // One-shot
            self.pending_activate = false;
        }
        substeps
    }

    /// Push every active entity to the presenter
    pub fn render(&mut self) {
        self.presenter.begin_frame();
        for (handle, entity) in self.registry.all().filter(|(_, e)| e.active) {
            self.presenter.draw_sprite(handle, &entity.visual, entity.body.pos);
        }
    }

    pub fn summary(&self) -> RoundSummary {
        RoundSummary {
            phase: self.round.phase(),
            score: self.round.score(),
            batches_cleared: self.round.batches_cleared(),
            active_collectibles: self.registry.count_active(EntityKind::Collectible),
            active_hazards: self.registry.count_active(EntityKind::Hazard),
            ticks: self.ticks,
            seed: self.round.seed(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.round.phase()
    }

    pub fn score(&self) -> u32 {
        self.round.score()
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    pub fn round(&self) -> &Round {
        &self.round
    }

    pub fn tuning(&self) -> &Tuning {
        self.round.tuning()
    }

    pub fn physics(&self) -> &P {
        &self.physics
    }

    pub fn physics_mut(&mut self) -> &mut P {
        &mut self.physics
    }

    pub fn presenter(&self) -> &S {
        &self.presenter
    }

    pub fn presenter_mut(&mut self) -> &mut S {
        &mut self.presenter
    }

    fn apply_effects(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::PausePhysics => self.physics.pause(),
                Effect::ResumePhysics => self.physics.resume(),
                Effect::ResetPhysics => self.physics.reset(),
                Effect::ScoreChanged(score) => {
                    self.presenter.set_text(TextId::Score, &score_text(score));
                }
                Effect::GameOverShown(shown) => self.presenter.set_visible(TextId::GameOver, shown),
                Effect::BatchCleared { batch } => log::debug!("Batch {batch} cleared"),
                Effect::HazardSpawned { handle, x } => {
                    log::debug!("Hazard {handle:?} live at x={x}");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use glam::Vec2;

    use super::*;
    use crate::preload::{HeadlessLoader, Preloader};
    use crate::present::DisplayList;
    use crate::sim::{ArcadePhysics, CollisionEvent, Handle};

    /// Physics double that replays scripted contacts, one batch per advance
    #[derive(Default)]
    struct ScriptedPhysics {
        paused: bool,
        refuse_resume: bool,
        grounded: bool,
        script: VecDeque<Vec<CollisionEvent>>,
        pending: Vec<CollisionEvent>,
        advances: u32,
        pauses: u32,
        resumes: u32,
        resets: u32,
    }

    impl ScriptedPhysics {
        fn push(&mut self, events: Vec<CollisionEvent>) {
            self.script.push_back(events);
        }
    }

    impl Physics for ScriptedPhysics {
        fn advance(&mut self, _registry: &mut EntityRegistry, _dt: f32) {
            if self.paused {
                return;
            }
            self.advances += 1;
            if let Some(events) = self.script.pop_front() {
                self.pending.extend(events);
            }
        }

        fn pause(&mut self) {
            self.pauses += 1;
            self.paused = true;
        }

        fn resume(&mut self) {
            self.resumes += 1;
            if !self.refuse_resume {
                self.paused = false;
            }
        }

        fn is_paused(&self) -> bool {
            self.paused
        }

        fn is_touching_down(&self, _handle: Handle) -> bool {
            self.grounded
        }

        fn drain_events(&mut self) -> Vec<CollisionEvent> {
            std::mem::take(&mut self.pending)
        }

        fn reset(&mut self) {
            self.resets += 1;
            self.pending.clear();
        }
    }

    type TestSession = Session<ScriptedPhysics, DisplayList>;

    fn ready() -> Ready {
        Preloader::default()
            .run(&mut HeadlessLoader, &mut DisplayList::new())
            .unwrap()
    }

    fn session() -> TestSession {
        Session::start(
            ready(),
            Tuning::default(),
            7,
            ScriptedPhysics::default(),
            DisplayList::new(),
        )
        .unwrap()
    }

    fn player(session: &TestSession) -> Handle {
        session.registry().player().unwrap()
    }

    fn stars(session: &TestSession) -> Vec<Handle> {
        session.registry().handles(EntityKind::Collectible)
    }

    /// Collect the whole batch in one tick and return the hazard it spawns
    fn clear_batch(session: &mut TestSession) -> Handle {
        let p = player(session);
        let events = stars(session)
            .into_iter()
            .map(|s| CollisionEvent::overlap(p, s))
            .collect();
        session.physics_mut().push(events);
        session.step(&InputFrame::default());
        session
            .registry()
            .iter_active(EntityKind::Hazard)
            .last()
            .map(|(h, _)| h)
            .unwrap()
    }

    fn hit(session: &mut TestSession, hazard: Handle) {
        let p = player(session);
        session
            .physics_mut()
            .push(vec![CollisionEvent::solid(p, hazard), CollisionEvent::solid(hazard, p)]);
        session.step(&InputFrame::default());
    }

    #[test]
    fn test_start_sets_up_display() {
        let session = session();
        let display = session.presenter();

        assert_eq!(display.text(TextId::Score), Some("Score: 0"));
        assert_eq!(display.text(TextId::GameOver), Some(GAME_OVER_TEXT));
        assert!(!display.is_visible(TextId::GameOver));
        assert!(!session.physics().is_paused());
        assert_eq!(session.phase(), Phase::Playing);
        assert_eq!(session.registry().count(EntityKind::Platform), 4);
        assert_eq!(session.registry().count(EntityKind::Collectible), 12);
    }

    #[test]
    fn test_start_fails_when_physics_stays_paused() {
        let physics = ScriptedPhysics {
            paused: true,
            refuse_resume: true,
            ..Default::default()
        };
        let result = Session::start(ready(), Tuning::default(), 7, physics, DisplayList::new());
        assert!(matches!(result, Err(Error::PhysicsNotReady)));
    }

    #[test]
    fn test_start_rejects_invalid_tuning() {
        let mut tuning = Tuning::default();
        tuning.collectibles.count = 0;
        let result = Session::start(
            ready(),
            tuning,
            7,
            ScriptedPhysics::default(),
            DisplayList::new(),
        );
        assert!(matches!(result, Err(Error::InvalidTuning(_))));
    }

    #[test]
    fn test_collect_updates_score_text() {
        let mut session = session();
        let p = player(&session);
        let star = stars(&session)[3];

        session.physics_mut().push(vec![CollisionEvent::overlap(p, star)]);
        session.step(&InputFrame::default());

        assert_eq!(session.score(), 10);
        assert_eq!(session.presenter().text(TextId::Score), Some("Score: 10"));
        assert!(!session.registry().is_active(star));
    }

    #[test]
    fn test_clearing_batch_spawns_one_hazard() {
        let mut session = session();
        clear_batch(&mut session);

        let summary = session.summary();
        assert_eq!(summary.score, 120);
        assert_eq!(summary.batches_cleared, 1);
        assert_eq!(summary.active_collectibles, 12);
        assert_eq!(summary.active_hazards, 1);
    }

    #[test]
    fn test_double_hit_pauses_once() {
        let mut session = session();
        let hazard = clear_batch(&mut session);
        hit(&mut session, hazard);

        assert_eq!(session.phase(), Phase::Over);
        assert_eq!(session.physics().pauses, 1);
        assert!(session.physics().is_paused());
        assert!(session.presenter().is_visible(TextId::GameOver));
        assert_eq!(session.score(), 120);
    }

    #[test]
    fn test_input_frozen_while_over() {
        let mut session = session();
        let hazard = clear_batch(&mut session);
        hit(&mut session, hazard);
        let before = *session.registry().player_entity().unwrap();

        session.physics_mut().grounded = true;
        session.step(&InputFrame::left().with_up());
        let after = session.registry().player_entity().unwrap();

        assert_eq!(after.body, before.body);
        assert_eq!(after.visual.tint, Some(crate::consts::HIT_TINT));
        assert_eq!(session.physics().advances, 2);
    }

    #[test]
    fn test_activation_restarts_after_game_over() {
        let mut session = session();
        let hazard = clear_batch(&mut session);
        hit(&mut session, hazard);

        session.step(&InputFrame::activate());

        assert_eq!(session.phase(), Phase::Playing);
        assert_eq!(session.score(), 0);
        assert_eq!(session.presenter().text(TextId::Score), Some("Score: 0"));
        assert!(!session.presenter().is_visible(TextId::GameOver));
        assert!(!session.physics().is_paused());
        // Once at start, once on restart
        assert_eq!(session.physics().resets, 2);
        // The restart tick also advances physics
        assert_eq!(session.physics().advances, 3);

        let summary = session.summary();
        assert_eq!(summary.active_collectibles, 12);
        assert_eq!(summary.active_hazards, 0);
        assert_eq!(summary.batches_cleared, 0);

        let player = session.registry().player_entity().unwrap();
        assert_eq!(player.body.pos, Vec2::new(100.0, 450.0));
        assert_eq!(player.visual.tint, None);
    }

    #[test]
    fn test_activation_while_playing_is_ignored() {
        let mut session = session();
        let p = player(&session);
        let star = stars(&session)[0];
        session.physics_mut().push(vec![CollisionEvent::overlap(p, star)]);
        session.step(&InputFrame::default());

        session.step(&InputFrame::activate());

        assert_eq!(session.phase(), Phase::Playing);
        assert_eq!(session.score(), 10);
        assert!(!session.registry().is_active(star));
        assert_eq!(session.physics().resets, 1);
    }

    #[test]
    fn test_hazard_reused_after_restart() {
        let mut session = session();
        let first = clear_batch(&mut session);
        hit(&mut session, first);
        session.step(&InputFrame::activate());

        let second = clear_batch(&mut session);
        assert_eq!(first, second);
        assert_eq!(session.registry().count(EntityKind::Hazard), 1);
    }

    #[test]
    fn test_frame_runs_fixed_substeps() {
        let mut session = session();

        assert_eq!(session.frame(SIM_DT * 0.25, &InputFrame::default()), 0);
        assert_eq!(session.ticks(), 0);
        assert_eq!(session.frame(SIM_DT, &InputFrame::default()), 1);

        // Long stalls are clamped
        let ran = session.frame(5.0, &InputFrame::default());
        assert!(ran <= MAX_SUBSTEPS);
        assert!(ran as f32 <= MAX_FRAME_DT / SIM_DT + 1.0);
    }

    #[test]
    fn test_bad_frame_time_does_not_stall() {
        let mut session = session();

        assert_eq!(session.frame(f32::NAN, &InputFrame::default()), 0);
        assert_eq!(session.frame(f32::INFINITY, &InputFrame::default()), 0);
        assert_eq!(session.frame(-1.0, &InputFrame::default()), 0);
        assert_eq!(session.frame(SIM_DT, &InputFrame::default()), 1);
        assert_eq!(session.ticks(), 1);
    }

    #[test]
    fn test_frame_keeps_activation_until_a_tick_runs() {
        let mut session = session();
        let hazard = clear_batch(&mut session);
        hit(&mut session, hazard);

        assert_eq!(session.frame(0.0, &InputFrame::activate()), 0);
        assert_eq!(session.phase(), Phase::Over);

        session.frame(SIM_DT, &InputFrame::default());
        assert_eq!(session.phase(), Phase::Playing);
    }

    #[test]
    fn test_render_draws_active_entities() {
        let mut session = session();
        session.render();
        assert_eq!(session.presenter().sprites().len(), 17);

        let p = player(&session);
        let star = stars(&session)[0];
        session.physics_mut().push(vec![CollisionEvent::overlap(p, star)]);
        session.step(&InputFrame::default());
        session.render();
        assert_eq!(session.presenter().sprites().len(), 16);
        assert!(session.presenter().sprite(star).is_none());
    }

    #[test]
    fn test_summary_serializes() {
        let session = session();
        let json = serde_json::to_string(&session.summary()).unwrap();
        assert!(json.contains("\"phase\":\"Playing\""));
        assert!(json.contains("\"seed\":7"));
    }

    #[test]
    fn test_arcade_session_runs() {
        let tuning = Tuning::default();
        let physics = ArcadePhysics::new(&tuning.arena);
        let mut session = Session::start(ready(), tuning, 3, physics, DisplayList::new()).unwrap();

        for _ in 0..300 {
            session.frame(SIM_DT, &InputFrame::right());
        }
        session.render();

        assert_eq!(session.ticks(), 300);
        assert_eq!(session.score() % 10, 0);
        let player = session.registry().player_entity().unwrap();
        // Walked right and stayed inside the arena
        assert!(player.body.pos.x > 100.0);
        assert!(player.body.max().x <= 800.0);
    }
}
