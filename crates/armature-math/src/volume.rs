//! Volume-preservation power curve
//!
//! Scales the interior joints of a chain from a single artist-facing
//! parameter to emulate mass conservation under stretch. The exponent forms
//! a symmetric arc over the chain: zero at both ends (ends never scale),
//! growing linearly in magnitude toward the middle, negative on the lower
//! half and positive on the upper half.

use crate::{Result, SolveError};

/// Signed arc exponent for joint `index` in a chain of `count` joints
///
/// `0` at both ends; interior magnitude is the distance to the nearest end.
/// The exact middle joint of an odd chain sits on the upper half.
pub fn arc_exponent(index: usize, count: usize) -> f32 {
    debug_assert!(index < count);
    let from_end = index.min(count - 1 - index) as f32;
    if 2 * index < count - 1 {
        -from_end
    } else {
        from_end
    }
}

/// Per-joint volume scale factor
///
/// `rest_length` is the joint's initial segment length, `amount` the user
/// volume parameter (typically in `[0, 1]`; `0` yields scale `1` everywhere).
/// Errors with [`SolveError::DegenerateChain`] for chains without interior
/// joints (`count < 3`): callers skip volume preservation entirely for
/// 2-joint chains.
pub fn scale_factor(index: usize, count: usize, amount: f32, rest_length: f32) -> Result<f32> {
    if count < 3 {
        return Err(SolveError::DegenerateChain { got: count, need: 3 });
    }
    if rest_length <= 0.0 {
        return Err(SolveError::NonPositiveRestLength(rest_length));
    }

    Ok(rest_length.powf(amount * arc_exponent(index, count)))
}

/// Scale factors for a whole chain in joint order
pub fn chain_scale_factors(rest_lengths: &[f32], amount: f32) -> Result<Vec<f32>> {
    let count = rest_lengths.len();
    rest_lengths
        .iter()
        .enumerate()
        .map(|(i, &rest)| scale_factor(i, count, amount, rest))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn ends_never_scale() {
        for v in [0.0, 0.3, 1.0] {
            assert_relative_eq!(scale_factor(0, 5, v, 2.5).unwrap(), 1.0, epsilon = 1e-6);
            assert_relative_eq!(scale_factor(4, 5, v, 2.5).unwrap(), 1.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn zero_amount_is_identity_everywhere() {
        let factors = chain_scale_factors(&[2.0, 3.0, 1.5, 2.0, 2.5], 0.0).unwrap();
        for f in factors {
            assert_relative_eq!(f, 1.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn exponent_arc_is_symmetric_in_magnitude() {
        // 6 joints: [0, -1, -2, 2, 1, 0]
        let exps: Vec<f32> = (0..6).map(|i| arc_exponent(i, 6)).collect();
        assert_eq!(exps, vec![0.0, -1.0, -2.0, 2.0, 1.0, 0.0]);
    }

    #[test]
    fn lower_half_negative_upper_half_positive() {
        assert!(arc_exponent(1, 5) < 0.0);
        assert!(arc_exponent(3, 5) > 0.0);
        // Exact middle of an odd chain lands on the upper half
        assert!(arc_exponent(2, 5) > 0.0);
    }

    #[test]
    fn interior_scale_follows_power_curve() {
        // rest 2.0, exponent -1 at index 1 of 5, amount 1 => 2^-1
        assert_relative_eq!(scale_factor(1, 5, 1.0, 2.0).unwrap(), 0.5, epsilon = 1e-6);
        // exponent +2 at index 2 of 5 (middle, upper half) => 2^2
        assert_relative_eq!(scale_factor(2, 5, 1.0, 2.0).unwrap(), 4.0, epsilon = 1e-6);
    }

    #[test]
    fn short_chains_are_rejected() {
        let err = scale_factor(0, 2, 1.0, 1.0).unwrap_err();
        assert_eq!(err, SolveError::DegenerateChain { got: 2, need: 3 });
    }
}
