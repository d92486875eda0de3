//! `AlgoBinCentric` (`BCS`): iterate bins, and at each step place the best
//! scored feasible item into the current bin, per §4.6. Single-bin entry
//! only; the multi-bin entry point is a contract violation for this family.

use std::rc::Rc;

use crate::bin::Bin;
use crate::error::{Result, VbppError};
use crate::instance::Instance;
use crate::scores::{self, Score, ScoreInputs};
use crate::weights::{self, Weight};

use super::{open_bin, Algorithm};

#[derive(Debug, Clone)]
pub struct BinCentricConfig {
    pub score: Score,
    pub weight: Weight,
    pub dynamic: bool,
    pub use_bin_weights: bool,
}

impl BinCentricConfig {
    pub fn new(score: Score, weight: Weight) -> Self {
        BinCentricConfig {
            score,
            weight,
            dynamic: false,
            use_bin_weights: false,
        }
    }

    fn dynamic_effective(&self) -> bool {
        self.dynamic || self.weight.is_ratio()
    }
}

#[derive(Debug)]
pub struct BinCentricAlgo<'a> {
    name: String,
    instance: &'a Instance,
    config: BinCentricConfig,
    bins: Vec<Bin>,
    next_bin_index: usize,
    solved: bool,
    cached_objective: usize,
    weights: Vec<f64>,
    total_norm_size: Vec<f64>,
    total_norm_residual: Vec<f64>,
}

impl<'a> BinCentricAlgo<'a> {
    pub fn new(name: impl Into<String>, instance: &'a Instance, config: BinCentricConfig) -> Self {
        let dims = instance.dims();
        let total_norm_size = (0..dims)
            .map(|h| instance.items().iter().map(|it| it.norm_size_dim(h)).sum())
            .collect();
        let name = name.into();
        log::debug!("constructing bin-centric algorithm '{name}' over {} items", instance.n_items());
        BinCentricAlgo {
            name,
            instance,
            config,
            bins: Vec::new(),
            next_bin_index: 0,
            solved: false,
            cached_objective: 0,
            weights: vec![0.0; dims],
            total_norm_size,
            total_norm_residual: vec![0.0; dims],
        }
    }

    fn recompute_weights(&mut self, n_remaining: usize) {
        let n_open_bins = self.bins.len().max(1);
        weights::compute_weight_vector(
            self.config.weight,
            self.config.use_bin_weights,
            n_remaining,
            n_open_bins,
            &self.total_norm_size,
            &self.total_norm_residual,
            &mut self.weights,
        );
    }

    fn open_new_bin(&mut self) -> usize {
        let caps: Rc<[u64]> = self.instance.capacities_rc();
        let idx = open_bin(&mut self.bins, &mut self.next_bin_index, caps, true);
        let dims = self.instance.dims();
        for h in 0..dims {
            self.total_norm_residual[h] += 1.0;
        }
        idx
    }

    fn best_item_for(&self, bin_idx: usize, unpacked: &[usize]) -> Option<(usize, f64)> {
        let dims = self.instance.dims();
        let bin = &self.bins[bin_idx];
        let bin_norm_residual: Vec<f64> = (0..dims).map(|h| bin.norm_avail_dim(h)).collect();
        let bin_norm_l2 = bin.norm_avail_l2();

        let mut best: Option<(usize, f64)> = None;
        for &item_id in unpacked {
            let item = self.instance.item(item_id);
            if !bin.does_item_fit(item.sizes()) {
                continue;
            }
            let inputs = ScoreInputs {
                weights: &self.weights,
                norm_size: item.norm_sizes(),
                norm_residual: &bin_norm_residual,
                max_caps: bin.max_caps(),
                avail_caps: bin.avail_caps(),
                item_norm_l2: item.norm_size_l2(),
                bin_norm_l2,
                total_norm_size: &self.total_norm_size,
                total_norm_residual: &self.total_norm_residual,
            };
            let score = scores::compute(self.config.score, &inputs);
            match best {
                Some((_, best_score)) if best_score >= score => {}
                _ => best = Some((item_id, score)),
            }
        }
        best
    }
}

impl<'a> Algorithm for BinCentricAlgo<'a> {
    fn name(&self) -> &str {
        &self.name
    }

    fn bins(&self) -> &[Bin] {
        &self.bins
    }

    fn is_solved(&self) -> bool {
        self.solved
    }

    fn solve_single(&mut self, hint_bins: usize) -> Result<usize> {
        if self.solved {
            return Ok(self.cached_objective);
        }
        self.bins.reserve(hint_bins);
        let n = self.instance.n_items();
        if n == 0 {
            self.solved = true;
            return Ok(0);
        }

        let mut unpacked: Vec<usize> = (0..n).collect();
        let mut current_bin = self.open_new_bin();
        self.recompute_weights(unpacked.len());

        while !unpacked.is_empty() {
            if self.bins.len() > n {
                return Err(VbppError::Runaway {
                    algorithm: self.name.clone(),
                    instance: self.instance.name().to_string(),
                    bins: self.bins.len(),
                });
            }
            if self.config.dynamic_effective() {
                self.recompute_weights(unpacked.len());
            }
            match self.best_item_for(current_bin, &unpacked) {
                Some((item_id, _)) => {
                    let dims = self.instance.dims();
                    let item = self.instance.item(item_id);
                    for h in 0..dims {
                        self.total_norm_size[h] -= item.norm_size_dim(h);
                        self.total_norm_residual[h] -= item.norm_size_dim(h);
                    }
                    let sizes = item.sizes().to_vec();
                    self.bins[current_bin].add_item(item_id, &sizes);
                    unpacked.retain(|&id| id != item_id);
                }
                None => {
                    current_bin = self.open_new_bin();
                }
            }
        }

        self.solved = true;
        self.cached_objective = self.bins.len();
        Ok(self.cached_objective)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_1_bin_centric_covers_all_items() {
        let inst = Instance::without_shuffle("s1", vec![10], vec![vec![6], vec![5], vec![4], vec![3]]);
        let mut algo = BinCentricAlgo::new(
            "BCS-DP1-Unit",
            &inst,
            BinCentricConfig::new(Score::DotProduct1, Weight::Unit),
        );
        let objective = algo.solve_single(0).unwrap();
        let mut covered: Vec<usize> = algo.bins().iter().flat_map(|b| b.alloc_list().to_vec()).collect();
        covered.sort();
        assert_eq!(covered, vec![0, 1, 2, 3]);
        assert!(objective >= 2);
    }

    #[test]
    fn respects_capacity_per_dimension() {
        let inst = Instance::without_shuffle(
            "s2",
            vec![10, 10],
            vec![vec![6, 2], vec![5, 5], vec![4, 8], vec![3, 3]],
        );
        let mut algo = BinCentricAlgo::new(
            "BCS-DP1-Average",
            &inst,
            BinCentricConfig::new(Score::DotProduct1, Weight::Average),
        );
        algo.solve_single(0).unwrap();
        for bin in algo.bins() {
            for h in 0..inst.dims() {
                let sum: u64 = bin
                    .alloc_list()
                    .iter()
                    .map(|&id| inst.item(id).size_dim(h))
                    .sum();
                assert!(sum <= inst.capacities()[h]);
            }
        }
    }

    #[test]
    fn solve_multi_is_a_contract_violation() {
        let inst = Instance::without_shuffle("s1", vec![10], vec![vec![6]]);
        let mut algo = BinCentricAlgo::new(
            "BCS-DP1-Unit",
            &inst,
            BinCentricConfig::new(Score::DotProduct1, Weight::Unit),
        );
        assert!(matches!(
            algo.solve_multi(1, 1),
            Err(VbppError::ContractViolation { .. })
        ));
    }
}
