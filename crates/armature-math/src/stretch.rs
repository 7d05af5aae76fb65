//! Soft-IK stretch and squash solver
//!
//! Given the rest lengths of a kinematic chain and the current distance from
//! chain root to end effector, this solver computes:
//!
//! - the *soft-landed* effector distance (the chain approaches, but never
//!   abruptly hits, its maximum reach),
//! - a global stretch ratio for the tensile domain,
//! - per-segment output lengths blending stretch and squash by their enable
//!   weights.
//!
//! The two domains do not overlap: stretch only lengthens segments when the
//! effector is past the softened reach, squash only applies when the chain is
//! compressed below its rest length. At exactly rest length both are the
//! identity.

use crate::{Result, SolveError};

/// Linear interpolation between `a` and `b` by `t`
#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Tunable inputs of the stretch solver
///
/// All weights are continuous in `[0, 1]` so they can be animated; `0.0`
/// disables the behavior entirely and `1.0` applies it fully.
#[derive(Debug, Clone, Copy)]
pub struct StretchParams {
    /// Stretch enable weight in `[0, 1]`
    pub stretch: f32,

    /// Squash enable weight in `[0, 1]`
    pub squash: f32,

    /// Soft-IK radius. `0.0` disables softening; the hard clamp used in that
    /// case is the pointwise limit of the exponential formula as the radius
    /// tends to zero, so the two paths are numerically continuous.
    pub soft_radius: f32,

    /// Maximum extra length a single segment may gain from stretching
    pub stretch_limit: f32,
}

impl Default for StretchParams {
    fn default() -> Self {
        Self {
            stretch: 1.0,
            squash: 0.0,
            soft_radius: 0.0,
            stretch_limit: f32::INFINITY,
        }
    }
}

/// Output of one stretch solve
#[derive(Debug, Clone, PartialEq)]
pub struct StretchSolution {
    /// Soft-landed end-effector distance
    pub effective_distance: f32,

    /// Global stretch ratio applied in the tensile domain (`1.0` otherwise)
    pub stretch_ratio: f32,

    /// Final per-segment output lengths
    pub lengths: Vec<f32>,

    /// Per-segment squash factors (`1.0` outside the compressive domain)
    pub squash_factors: Vec<f32>,
}

/// Soft-landing curve for the end-effector distance
///
/// For `soft_radius > 0` the effector distance eases exponentially into the
/// chain's maximum reach once it enters the soft zone `(sum - radius, inf)`:
///
/// ```text
/// effective = sum - r + r * (1 - e^(-(d - (sum - r)) / r))
/// ```
///
/// which increases strictly monotonically in `d` and converges to `sum` from
/// below. For `soft_radius <= 0` the limit case `min(d, sum)` is used.
pub fn soft_distance(distance: f32, rest_sum: f32, soft_radius: f32) -> f32 {
    if soft_radius <= 0.0 {
        return distance.min(rest_sum);
    }
    let soft_start = rest_sum - soft_radius;
    if distance > soft_start {
        soft_start + soft_radius * (1.0 - (-(distance - soft_start) / soft_radius).exp())
    } else {
        distance
    }
}

/// Solve per-segment stretch/squash lengths for a chain
///
/// `rest_lengths` are the initial segment lengths (root to effector order),
/// `distance` is the current root-to-effector distance. Errors with
/// [`SolveError::DegenerateChain`] for fewer than 2 segments and
/// [`SolveError::NonPositiveRestLength`] when the rest lengths sum to zero.
pub fn solve(rest_lengths: &[f32], distance: f32, params: &StretchParams) -> Result<StretchSolution> {
    if rest_lengths.len() < 2 {
        return Err(SolveError::DegenerateChain {
            got: rest_lengths.len(),
            need: 2,
        });
    }

    let rest_sum: f32 = rest_lengths.iter().sum();
    if rest_sum <= 0.0 {
        return Err(SolveError::NonPositiveRestLength(rest_sum));
    }

    let effective = soft_distance(distance, rest_sum, params.soft_radius);

    // Tensile domain: the raw effector distance exceeds the softened reach,
    // so the chain scales up to follow the target.
    let stretch_ratio = if distance > effective {
        distance / effective
    } else {
        1.0
    };

    let compressed = distance < rest_sum;

    let mut lengths = Vec::with_capacity(rest_lengths.len());
    let mut squash_factors = Vec::with_capacity(rest_lengths.len());

    for &rest in rest_lengths {
        let stretched =
            lerp(rest, rest * stretch_ratio, params.stretch).min(rest + params.stretch_limit);

        let squashed = if compressed {
            lerp(rest, rest * (rest_sum / effective), params.squash)
        } else {
            rest
        };
        squash_factors.push(squashed / rest.max(f32::EPSILON));

        // The domains only meet at distance == rest_sum where both terms are
        // the rest length, so the sum blend is continuous.
        lengths.push(stretched + squashed - rest);
    }

    Ok(StretchSolution {
        effective_distance: effective,
        stretch_ratio,
        lengths,
        squash_factors,
    })
}
