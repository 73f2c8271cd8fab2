//! Startup errors
//!
//! Per-tick degenerate inputs (events on inactive entities, restart while
//! playing, hits after game over) are silent no-ops and never reach this type.
//! Everything here is fatal to starting a round.

use std::path::PathBuf;

use thiserror::Error;

use crate::sim::EntityKind;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to load asset `{key}`: {reason}")]
    AssetLoad { key: String, reason: String },

    #[error("asset manifest is empty")]
    EmptyManifest,

    #[error("physics collaborator is still paused after resume")]
    PhysicsNotReady,

    #[error("registry already holds a {0:?}; only one is allowed")]
    DuplicateEntity(EntityKind),

    #[error("invalid tuning: {0}")]
    InvalidTuning(String),

    #[error("failed to read {path}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse tuning")]
    ConfigParse(#[from] serde_json::Error),
}
