//! Asset preloading
//!
//! Loads every entry of the manifest before a session may start, reporting
//! progress through the presenter's `Loading` and `LoadPercent` texts.
//! A successful run yields the [`Ready`] token that `Session::start` takes.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::present::{LOADING_TEXT, Presenter, TextId, percent_text};
use crate::sim::Sprite;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssetKind {
    Image,
    SpriteSheet { frame_width: u32, frame_height: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetEntry {
    pub key: String,
    /// Path relative to the loader's root
    pub path: String,
    pub kind: AssetKind,
}

impl AssetEntry {
    pub fn image(sprite: Sprite) -> Self {
        Self {
            key: sprite.key().to_string(),
            path: format!("assets/{}.png", sprite.key()),
            kind: AssetKind::Image,
        }
    }

    pub fn sheet(sprite: Sprite, frame_width: u32, frame_height: u32) -> Self {
        Self {
            kind: AssetKind::SpriteSheet {
                frame_width,
                frame_height,
            },
            ..Self::image(sprite)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetManifest {
    pub entries: Vec<AssetEntry>,
}

impl Default for AssetManifest {
    /// The arena's textures: four images and the 32x48 player sheet
    fn default() -> Self {
        Self {
            entries: vec![
                AssetEntry::image(Sprite::Sky),
                AssetEntry::image(Sprite::Ground),
                AssetEntry::image(Sprite::Star),
                AssetEntry::image(Sprite::Bomb),
                AssetEntry::sheet(Sprite::Dude, 32, 48),
            ],
        }
    }
}

impl AssetManifest {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub trait AssetLoader {
    /// Load one entry. The error string ends up in [`Error::AssetLoad`].
    fn load(&mut self, entry: &AssetEntry) -> std::result::Result<(), String>;
}

/// Checks that each asset exists as a file under `root`
#[derive(Debug, Clone)]
pub struct FsLoader {
    root: PathBuf,
}

impl FsLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl AssetLoader for FsLoader {
    fn load(&mut self, entry: &AssetEntry) -> std::result::Result<(), String> {
        let path = self.root.join(&entry.path);
        match std::fs::metadata(&path) {
            Ok(meta) if meta.is_file() => Ok(()),
            Ok(_) => Err(format!("{} is not a file", path.display())),
            Err(e) => Err(format!("{}: {e}", path.display())),
        }
    }
}

/// Accepts every entry; used when nothing is drawn
#[derive(Debug, Clone, Copy, Default)]
pub struct HeadlessLoader;

impl AssetLoader for HeadlessLoader {
    fn load(&mut self, _entry: &AssetEntry) -> std::result::Result<(), String> {
        Ok(())
    }
}

/// Proof that preloading finished
#[derive(Debug, Clone)]
pub struct Ready {
    keys: Vec<String>,
}

impl Ready {
    /// Keys of the loaded assets, in manifest order
    pub fn keys(&self) -> &[String] {
        &self.keys
    }
}

#[derive(Debug, Clone, Default)]
pub struct Preloader {
    manifest: AssetManifest,
}

impl Preloader {
    pub fn new(manifest: AssetManifest) -> Self {
        Self { manifest }
    }

    pub fn manifest(&self) -> &AssetManifest {
        &self.manifest
    }

    pub fn run(
        &self,
        loader: &mut impl AssetLoader,
        presenter: &mut impl Presenter,
    ) -> Result<Ready> {
        if self.manifest.is_empty() {
            return Err(Error::EmptyManifest);
        }

        presenter.set_text(TextId::Loading, LOADING_TEXT);
        presenter.set_visible(TextId::Loading, true);
        presenter.set_text(TextId::LoadPercent, &percent_text(0.0));
        presenter.set_visible(TextId::LoadPercent, true);

        let total = self.manifest.len();
        let mut keys = Vec::with_capacity(total);
        for (i, entry) in self.manifest.entries.iter().enumerate() {
            loader.load(entry).map_err(|reason| Error::AssetLoad {
                key: entry.key.clone(),
                reason,
            })?;
            log::debug!("Loaded asset `{}` from {}", entry.key, entry.path);
            keys.push(entry.key.clone());

            let progress = (i + 1) as f32 / total as f32;
            presenter.set_text(TextId::LoadPercent, &percent_text(progress));
        }

        presenter.set_visible(TextId::Loading, false);
        presenter.set_visible(TextId::LoadPercent, false);
        log::info!("Preload complete: {} assets", keys.len());

        Ok(Ready { keys })
    }
}
