//! Presentation sink
//!
//! The session never draws directly. It pushes sprites and text through a
//! [`Presenter`]; a real renderer, a retained [`DisplayList`] or the
//! [`LogPresenter`] can sit behind it.

use std::collections::HashMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::sim::{Handle, Sprite, Visual};

/// Text slots shown over the arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TextId {
    /// "Score: N", top left
    Score,
    /// Centred game over banner
    GameOver,
    /// Preload caption
    Loading,
    /// Preload progress, "NN%"
    LoadPercent,
}

pub const GAME_OVER_TEXT: &str = "GAME OVER\nClick to Restart";
pub const LOADING_TEXT: &str = "Loading...";

pub fn score_text(score: u32) -> String {
    format!("Score: {score}")
}

pub fn percent_text(progress: f32) -> String {
    let pct = (progress.clamp(0.0, 1.0) * 100.0).floor() as u32;
    format!("{pct}%")
}

pub trait Presenter {
    /// Start a new frame; sprites from the previous frame are dropped
    fn begin_frame(&mut self);

    fn draw_sprite(&mut self, handle: Handle, visual: &Visual, pos: Vec2);

    fn set_text(&mut self, id: TextId, text: &str);

    fn set_visible(&mut self, id: TextId, visible: bool);
}

/// One drawn sprite
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpriteDraw {
    pub handle: Handle,
    pub visual: Visual,
    pub pos: Vec2,
    /// Sheet frame to show; single-image sprites always use 0
    pub frame: u32,
}

/// First sheet frame of the visual's current animation
pub fn sheet_frame(visual: &Visual) -> u32 {
    match visual.sprite {
        Sprite::Dude => visual.animation.frames().0,
        _ => 0,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct TextSlot {
    text: String,
    visible: bool,
}

/// Retained presenter: remembers every text slot and the last frame's sprites
#[derive(Debug, Clone, Default)]
pub struct DisplayList {
    texts: HashMap<TextId, TextSlot>,
    sprites: Vec<SpriteDraw>,
    frames: u64,
}

impl DisplayList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self, id: TextId) -> Option<&str> {
        self.texts.get(&id).map(|slot| slot.text.as_str())
    }

    /// Slots that were never shown count as hidden
    pub fn is_visible(&self, id: TextId) -> bool {
        self.texts.get(&id).is_some_and(|slot| slot.visible)
    }

    pub fn sprites(&self) -> &[SpriteDraw] {
        &self.sprites
    }

    pub fn sprite(&self, handle: Handle) -> Option<&SpriteDraw> {
        self.sprites.iter().find(|s| s.handle == handle)
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl Presenter for DisplayList {
    fn begin_frame(&mut self) {
        self.sprites.clear();
        self.frames += 1;
    }

    fn draw_sprite(&mut self, handle: Handle, visual: &Visual, pos: Vec2) {
        self.sprites.push(SpriteDraw {
            handle,
            visual: *visual,
            pos,
            frame: sheet_frame(visual),
        });
    }

    fn set_text(&mut self, id: TextId, text: &str) {
        let slot = self.texts.entry(id).or_insert_with(|| TextSlot {
            text: String::new(),
            visible: true,
        });
        slot.text.clear();
        slot.text.push_str(text);
    }

    fn set_visible(&mut self, id: TextId, visible: bool) {
        self.texts
            .entry(id)
            .or_insert_with(|| TextSlot {
                text: String::new(),
                visible,
            })
            .visible = visible;
    }
}

/// Headless presenter that traces text changes through `log`.
/// Sprite draws are counted and reported once per frame at trace level.
#[derive(Debug, Default)]
pub struct LogPresenter {
    sprites_this_frame: usize,
}

impl LogPresenter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Presenter for LogPresenter {
    fn begin_frame(&mut self) {
        if self.sprites_this_frame > 0 {
            log::trace!("{} sprites drawn", self.sprites_this_frame);
        }
        self.sprites_this_frame = 0;
    }

    fn draw_sprite(&mut self, _handle: Handle, _visual: &Visual, _pos: Vec2) {
        self.sprites_this_frame += 1;
    }

    fn set_text(&mut self, id: TextId, text: &str) {
        log::debug!("[{id:?}] {text:?}");
    }

    fn set_visible(&mut self, id: TextId, visible: bool) {
        log::debug!("[{id:?}] visible={visible}");
    }
}
