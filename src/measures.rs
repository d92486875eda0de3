/// Combines a weight vector and a per-entity normalized vector into the
/// scalar used to order items/bins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Measure {
    L1,
    LInf,
    L2,
    L2Load,
}

impl Measure {
    pub fn from_str(token: &str) -> Option<Self> {
        Some(match token {
            "L1" | "Sum" => Measure::L1,
            "LInf" | "Linf" | "Max" => Measure::LInf,
            "L2" | "SumSq" => Measure::L2,
            "L2Load" | "SumSqLoad" => Measure::L2Load,
            _ => return None,
        })
    }

    /// Whether this measure reads bin load instead of bin residual capacity.
    /// Irrelevant for items, which have no load.
    pub fn uses_load(self) -> bool {
        matches!(self, Measure::L2Load)
    }
}

pub fn combine(measure: Measure, weights: &[f64], x: &[f64]) -> f64 {
    match measure {
        Measure::L1 => weights.iter().zip(x).map(|(w, v)| w * v).sum(),
        Measure::LInf => weights
            .iter()
            .zip(x)
            .map(|(w, v)| w * v)
            .fold(0.0_f64, f64::max),
        Measure::L2 | Measure::L2Load => weights
            .iter()
            .zip(x)
            .map(|(w, v)| w * v * v)
            .sum::<f64>()
            .sqrt(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn l1_is_weighted_sum() {
        let w = [1.0, 2.0];
        let x = [0.5, 0.25];
        assert!((combine(Measure::L1, &w, &x) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn linf_is_weighted_max() {
        let w = [1.0, 1.0];
        let x = [0.1, 0.9];
        assert!((combine(Measure::LInf, &w, &x) - 0.9).abs() < 1e-12);
    }

    #[test]
    fn l2_is_weighted_euclidean_norm() {
        let w = [1.0, 1.0];
        let x = [3.0, 4.0];
        assert!((combine(Measure::L2, &w, &x) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn l2load_uses_same_formula_as_l2() {
        let w = [2.0];
        let x = [3.0];
        assert_eq!(
            combine(Measure::L2, &w, &x),
            combine(Measure::L2Load, &w, &x)
        );
    }
}
