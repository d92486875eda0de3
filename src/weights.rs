/// Below this threshold a per-dimension divisor is treated as zero and the
/// dimension is deactivated for the step (its weight is set to 0 instead of
/// dividing by a near-zero value).
pub const ZERO_THRESHOLD: f64 = 1e-5;

/// A per-dimension weight policy, driving which dimensions dominate a
/// combined-size measure or an item-bin score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Weight {
    Unit,
    Average,
    Exponential,
    ReciprocalAverage,
    ResidualRatio,
    UtilizationRatio,
}

impl Weight {
    /// Ratio-type weights depend on residual capacity and are implicitly
    /// dynamic (recomputed after every placement).
    pub fn is_ratio(self) -> bool {
        matches!(self, Weight::ResidualRatio | Weight::UtilizationRatio)
    }

    pub fn from_str(token: &str) -> Option<Self> {
        Some(match token {
            "Unit" => Weight::Unit,
            "Average" | "Avg" => Weight::Average,
            "Exponential" | "Expo" => Weight::Exponential,
            "ReciprocalAverage" | "ReciprocAvg" => Weight::ReciprocalAverage,
            "ResidualRatio" => Weight::ResidualRatio,
            "UtilizationRatio" | "UtilRatio" => Weight::UtilizationRatio,
            _ => return None,
        })
    }
}

/// Computes a non-ratio weight vector (`Unit`, `Average`, `Exponential`,
/// `ReciprocalAverage`) into `out`.
///
/// `agg` is the running aggregate the policy reads: total normalized item
/// size by default, or total normalized residual capacity when
/// `use_bin_weights` redirects the source. `denom` is `n_remaining` items,
/// or open-bin count under the same redirection; only `Exponential` uses it.
pub fn compute_weights(policy: Weight, denom: f64, agg: &[f64], out: &mut [f64]) {
    debug_assert!(!policy.is_ratio());
    for (w, &a) in out.iter_mut().zip(agg) {
        *w = match policy {
            Weight::Unit => 1.0,
            Weight::Average => a,
            Weight::Exponential => {
                if denom > 0.0 {
                    (0.01 * a / denom).exp()
                } else {
                    1.0
                }
            }
            Weight::ReciprocalAverage => {
                if a < ZERO_THRESHOLD {
                    0.0
                } else {
                    1.0 / a
                }
            }
            Weight::ResidualRatio | Weight::UtilizationRatio => unreachable!(),
        };
    }
}

/// Computes a ratio-type weight vector (`ResidualRatio`, `UtilizationRatio`).
/// Always consults both aggregates, regardless of `use_bin_weights`.
pub fn compute_weights_ratio(
    policy: Weight,
    total_norm_size: &[f64],
    total_norm_residual: &[f64],
    out: &mut [f64],
) {
    debug_assert!(policy.is_ratio());
    for ((w, &size), &residual) in out.iter_mut().zip(total_norm_size).zip(total_norm_residual) {
        *w = match policy {
            Weight::ResidualRatio => {
                if residual < ZERO_THRESHOLD {
                    0.0
                } else {
                    1.0 / residual
                }
            }
            Weight::UtilizationRatio => {
                if residual < ZERO_THRESHOLD {
                    0.0
                } else {
                    size / residual
                }
            }
            _ => unreachable!(),
        };
    }
}

/// Dispatches to [`compute_weights`] or [`compute_weights_ratio`] depending
/// on the policy, picking the right aggregate/denominator pair for
/// `use_bin_weights`.
#[allow(clippy::too_many_arguments)]
pub fn compute_weight_vector(
    policy: Weight,
    use_bin_weights: bool,
    n_remaining_items: usize,
    n_open_bins: usize,
    total_norm_item_size: &[f64],
    total_norm_residual: &[f64],
    out: &mut [f64],
) {
    if policy.is_ratio() {
        compute_weights_ratio(policy, total_norm_item_size, total_norm_residual, out);
        return;
    }
    let (denom, agg) = if use_bin_weights {
        (n_open_bins as f64, total_norm_residual)
    } else {
        (n_remaining_items as f64, total_norm_item_size)
    };
    compute_weights(policy, denom, agg, out);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_weight_is_always_one() {
        let mut out = vec![0.0; 3];
        compute_weights(Weight::Unit, 5.0, &[1.0, 2.0, 3.0], &mut out);
        assert_eq!(out, vec![1.0, 1.0, 1.0]);
    }

    #[test]
    fn reciprocal_average_deactivates_below_threshold() {
        let mut out = vec![0.0; 2];
        compute_weights(
            Weight::ReciprocalAverage,
            1.0,
            &[0.0, 2.0],
            &mut out,
        );
        assert_eq!(out[0], 0.0);
        assert!((out[1] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn utilization_ratio_deactivates_below_threshold() {
        let mut out = vec![0.0; 1];
        compute_weights_ratio(Weight::UtilizationRatio, &[1.0], &[0.0], &mut out);
        assert_eq!(out[0], 0.0);
    }

    #[test]
    fn is_ratio_identifies_residual_dependent_policies() {
        assert!(Weight::ResidualRatio.is_ratio());
        assert!(Weight::UtilizationRatio.is_ratio());
        assert!(!Weight::Average.is_ratio());
    }
}
