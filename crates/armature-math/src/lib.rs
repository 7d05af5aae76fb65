//! # Armature Math
//!
//! Closed-form numeric solvers for articulated rig chains.
//!
//! This crate is the single source of truth for the stretch/squash and
//! volume-preservation formulas used by the limb modules. The solvers are
//! pure functions of their inputs: no scene state, no caching, re-evaluated
//! on every query.
//!
//! ## Example
//!
//! ```rust
//! use armature_math::stretch::{solve, StretchParams};
//!
//! // A 2-segment arm reaching past full extension stretches evenly.
//! let solution = solve(&[5.0, 5.0], 12.0, &StretchParams::default()).unwrap();
//! assert!((solution.lengths[0] - 6.0).abs() < 1e-6);
//! ```
//!
//! ## Units and Conventions
//!
//! - **Lengths**: unsigned magnitudes along the chain's primary axis. The
//!   side multiplier (+1/-1 for mirrored limbs) is applied by the caller,
//!   never inside a solver.
//! - **Precision**: all solver arithmetic is `f32`.

pub mod stretch;
pub mod volume;

use thiserror::Error;

/// Result type alias using this crate's SolveError
pub type Result<T> = std::result::Result<T, SolveError>;

/// Errors produced by the numeric solvers
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolveError {
    /// Chain too short for the requested solve
    #[error("degenerate chain: got {got} segments, need at least {need}")]
    DegenerateChain { got: usize, need: usize },

    /// Segment lengths sum to zero (or less), no ratio can be formed
    #[error("chain rest length must be positive, got {0}")]
    NonPositiveRestLength(f32),
}
