use crate::weights::ZERO_THRESHOLD;

/// Item-bin affinity used by the bin-centric and pairing heuristics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Score {
    DotProduct1,
    DotProduct2,
    DotProduct3,
    NormDotProduct,
    L2Norm,
    TightFillSum,
    TightFillMin,
}

impl Score {
    pub fn from_str(token: &str) -> Option<Self> {
        Some(match token {
            "DotProduct1" | "DP1" => Score::DotProduct1,
            "DotProduct2" | "DP2" => Score::DotProduct2,
            "DotProduct3" | "DP3" => Score::DotProduct3,
            "NormDotProduct" | "NormDP" => Score::NormDotProduct,
            "L2Norm" => Score::L2Norm,
            "TightFillSum" | "TFSum" => Score::TightFillSum,
            "TightFillMin" | "TFMin" => Score::TightFillMin,
            _ => return None,
        })
    }
}

/// Everything a score policy needs about one item-bin candidate pair.
/// `norm_size`/`norm_residual` are normalized to bin capacity; `max_caps`/
/// `avail_caps` are the raw values `TightFill*` need.
pub struct ScoreInputs<'a> {
    pub weights: &'a [f64],
    pub norm_size: &'a [f64],
    pub norm_residual: &'a [f64],
    pub max_caps: &'a [u64],
    pub avail_caps: &'a [u64],
    pub item_norm_l2: f64,
    pub bin_norm_l2: f64,
    pub total_norm_size: &'a [f64],
    pub total_norm_residual: &'a [f64],
}

fn dot_product1(i: &ScoreInputs) -> f64 {
    i.weights
        .iter()
        .zip(i.norm_size)
        .zip(i.norm_residual)
        .map(|((&w, &s), &r)| w * s * r)
        .sum()
}

pub fn compute(policy: Score, i: &ScoreInputs) -> f64 {
    match policy {
        Score::DotProduct1 => dot_product1(i),
        Score::DotProduct2 => {
            let denom = i.item_norm_l2 * i.bin_norm_l2;
            if denom < ZERO_THRESHOLD {
                0.0
            } else {
                dot_product1(i) / denom
            }
        }
        Score::DotProduct3 => {
            let denom = i.bin_norm_l2 * i.bin_norm_l2;
            if denom < ZERO_THRESHOLD {
                0.0
            } else {
                dot_product1(i) / denom
            }
        }
        Score::NormDotProduct => i
            .weights
            .iter()
            .zip(i.norm_size)
            .zip(i.norm_residual)
            .zip(i.total_norm_size)
            .zip(i.total_norm_residual)
            .map(|((((&w, &s), &r), &ts), &tr)| {
                if ts > ZERO_THRESHOLD && tr > ZERO_THRESHOLD {
                    w * s * r / (ts * tr)
                } else {
                    0.0
                }
            })
            .sum(),
        Score::L2Norm => -i
            .weights
            .iter()
            .zip(i.norm_size)
            .zip(i.norm_residual)
            .map(|((&w, &s), &r)| {
                let gap = r - s;
                w * gap * gap
            })
            .sum::<f64>(),
        Score::TightFillSum => i
            .weights
            .iter()
            .zip(i.norm_size)
            .zip(i.max_caps)
            .zip(i.avail_caps)
            .map(|(((&w, &s), &max_cap), &avail)| {
                if avail == 0 {
                    0.0
                } else {
                    w * s * max_cap as f64 / avail as f64
                }
            })
            .sum(),
        Score::TightFillMin => {
            let mut min: Option<f64> = None;
            for (((&w, &s), &max_cap), &avail) in i
                .weights
                .iter()
                .zip(i.norm_size)
                .zip(i.max_caps)
                .zip(i.avail_caps)
            {
                if w == 0.0 || avail == 0 {
                    continue;
                }
                let term = w * s * max_cap as f64 / avail as f64;
                min = Some(match min {
                    None => term,
                    Some(m) => m.min(term),
                });
            }
            min.unwrap_or(0.0)
        }
    }
}
