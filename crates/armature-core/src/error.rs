//! Error types for Armature

use thiserror::Error;

/// Result type alias using Armature's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while resolving guides and assembling a rig
#[derive(Error, Debug)]
pub enum Error {
    /// A guide presented as a record root matches no module's first role
    #[error("invalid root: guide '{guide}' with tag '{tag}' starts no known module")]
    InvalidRoot { guide: String, tag: String },

    /// A fully walked record lacks a role its module signature requires
    #[error("module '{module}' from guide '{guide}' is missing required role '{role}'")]
    MissingRequiredRole {
        module: String,
        guide: String,
        role: String,
    },

    /// Nearest-socket query ran out of eligible candidates
    #[error("no attachment point left for guide '{guide}' after exclusions")]
    NoAttachmentPoint { guide: String },

    /// A module's numeric solve failed; carries the owning record identity
    #[error("module '{module}' from guide '{guide}': {source}")]
    ModuleBuild {
        module: String,
        guide: String,
        source: armature_math::SolveError,
    },

    /// The guide record list does not form a single well-rooted tree
    #[error("guide tree error: {0}")]
    GuideTree(String),

    /// Guide records failed to deserialize
    #[error("guide parse error: {0}")]
    GuideParse(#[from] serde_json::Error),
}
