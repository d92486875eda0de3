//! The item-centric "fit" family: `FF`, `FFD`, `BFD-T1/T2/T3`, `BF`,
//! `WFD-T1/T2`, `WF`, and their `-Lexico`/`-Rank` item-order variants.
//!
//! Rather than one type per row of the variant matrix, a single
//! [`ItemCentricAlgo`] is configured by an [`ItemCentricConfig`]: the item
//! order, the bin order, and the weight policies are orthogonal knobs
//! instead of a virtual-dispatch lattice.

use std::cmp::Ordering;
use std::rc::Rc;

use crate::bin::{self, Bin};
use crate::error::{Result, VbppError};
use crate::instance::Instance;
use crate::item::{self, Item};
use crate::measures::{self, Measure};
use crate::sorting::{bubble_down, bubble_up};
use crate::weights::{self, Weight};

use super::{open_bin, Algorithm};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemCentricKind {
    Ff,
    Ffd,
    BfdT1,
    BfdT2,
    BfdT3,
    Bf,
    WfdT1,
    WfdT2,
    Wf,
}

impl ItemCentricKind {
    /// Items are processed in decreasing-measure order rather than input
    /// order (everything but `FF`/`BF`/`WF`).
    fn sorts_items(self) -> bool {
        !matches!(self, ItemCentricKind::Ff | ItemCentricKind::Bf | ItemCentricKind::Wf)
    }

    /// Bins are kept in measure order at all (everything but `FF`/`FFD`).
    fn sorts_bins(self) -> bool {
        !matches!(self, ItemCentricKind::Ff | ItemCentricKind::Ffd)
    }

    /// Worst-fit family: bins ordered decreasing, new bins open at the front.
    fn worst_fit(self) -> bool {
        matches!(
            self,
            ItemCentricKind::WfdT1 | ItemCentricKind::WfdT2 | ItemCentricKind::Wf
        )
    }

    /// T2/T3/BF/WF derive the bin weight vector from the running bin
    /// aggregate, so it shifts on every placement and forces a full
    /// recompute-and-resort. T1/WFD-T1 instead reuse the (possibly static)
    /// item weight vector to score bin residuals, so only the touched bin's
    /// measure changes on a placement that didn't also change item weights.
    fn bin_weight_from_aggregate(self) -> bool {
        matches!(
            self,
            ItemCentricKind::BfdT2
                | ItemCentricKind::BfdT3
                | ItemCentricKind::Bf
                | ItemCentricKind::WfdT2
                | ItemCentricKind::Wf
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemOrderStyle {
    /// Decreasing combined-size measure, per §4.2.
    Standard,
    /// Lexicographic decreasing on raw size; only the touched bin is
    /// repositioned after each placement.
    Lexico,
    /// Increasing sum of per-dimension ranks; full re-rank after each
    /// placement when `dynamic` is set.
    Rank,
}

#[derive(Debug, Clone)]
pub struct ItemCentricConfig {
    pub kind: ItemCentricKind,
    pub ordering: ItemOrderStyle,
    pub measure: Measure,
    pub item_weight: Weight,
    /// Distinct bin-side weight policy; only meaningful for `BfdT3` (spec:
    /// "item weights and bin weights are distinct policies"). Every other
    /// aggregate-driven kind reuses `item_weight` for the bin side.
    pub bin_weight: Weight,
    pub dynamic: bool,
}

impl ItemCentricConfig {
    pub fn new(kind: ItemCentricKind, measure: Measure, item_weight: Weight) -> Self {
        ItemCentricConfig {
            kind,
            ordering: ItemOrderStyle::Standard,
            measure,
            item_weight,
            bin_weight: item_weight,
            dynamic: false,
        }
    }

    fn dynamic_effective(&self) -> bool {
        self.dynamic || self.item_weight.is_ratio() || self.bin_weight.is_ratio()
    }
}

#[derive(Debug)]
pub struct ItemCentricAlgo<'a> {
    name: String,
    instance: &'a Instance,
    config: ItemCentricConfig,
    bins: Vec<Bin>,
    next_bin_index: usize,
    solved: bool,
    cached_objective: usize,
    order: Vec<usize>,
    item_measure: Vec<f64>,
}

impl<'a> ItemCentricAlgo<'a> {
    pub fn new(name: impl Into<String>, instance: &'a Instance, config: ItemCentricConfig) -> Self {
        let n = instance.n_items();
        let name = name.into();
        log::debug!("constructing item-centric algorithm '{name}' over {n} items");
        ItemCentricAlgo {
            name,
            instance,
            config,
            bins: Vec::new(),
            next_bin_index: 0,
            solved: false,
            cached_objective: 0,
            order: instance.processing_order().to_vec(),
            item_measure: vec![0.0; n],
        }
    }

    fn dims(&self) -> usize {
        self.instance.dims()
    }

    /// Returns `'a`, not the usual elided `&self` lifetime: items live as
    /// long as the `Instance` itself, so holding one never conflicts with a
    /// later mutable borrow of this algorithm's own scratch fields.
    fn item(&self, id: usize) -> &'a Item {
        self.instance.item(id)
    }

    fn create_bins_at_end(&self) -> bool {
        !self.config.kind.worst_fit()
    }

    /// Recomputes `item_measure` for every item id in `ids`, deriving the
    /// weight vector from the aggregate over exactly those ids (the
    /// "still-unpacked items" aggregate of §4.1).
    fn recompute_item_measures(&mut self, ids: &[usize]) {
        let dims = self.dims();
        let mut total_norm_size = vec![0.0; dims];
        for &id in ids {
            for h in 0..dims {
                total_norm_size[h] += self.item(id).norm_size_dim(h);
            }
        }
        let mut weights = vec![0.0; dims];
        if self.config.item_weight.is_ratio() {
            // Items have no residual aggregate of their own; ratio item
            // weights fall back to the bin residual aggregate.
            let total_norm_residual = self.total_norm_residual();
            weights::compute_weights_ratio(
                self.config.item_weight,
                &total_norm_size,
                &total_norm_residual,
                &mut weights,
            );
        } else {
            weights::compute_weights(self.config.item_weight, ids.len() as f64, &total_norm_size, &mut weights);
        }
        for &id in ids {
            let item = self.item(id);
            self.item_measure[id] = measures::combine(self.config.measure, &weights, item.norm_sizes());
        }
    }

    fn total_norm_residual(&self) -> Vec<f64> {
        let dims = self.dims();
        let mut total = vec![0.0; dims];
        for bin in &self.bins {
            for h in 0..dims {
                total[h] += bin.norm_avail_dim(h);
            }
        }
        total
    }

    fn rank_item_measures(&mut self, ids: &[usize]) {
        let dims = self.dims();
        for &id in ids {
            self.item_measure[id] = 0.0;
        }
        for h in 0..dims {
            let mut sorted = ids.to_vec();
            sorted.sort_by(|&a, &b| self.item(a).size_dim(h).cmp(&self.item(b).size_dim(h)));
            for (rank, id) in sorted.into_iter().enumerate() {
                self.item_measure[id] += rank as f64;
            }
        }
    }

    fn recompute_bin_measure(&mut self, bin_idx: usize, weights: &[f64]) {
        let dims = self.dims();
        let x: Vec<f64> = (0..dims)
            .map(|h| {
                if self.config.measure.uses_load() {
                    self.bins[bin_idx].norm_load_dim(h)
                } else {
                    self.bins[bin_idx].norm_avail_dim(h)
                }
            })
            .collect();
        self.bins[bin_idx].measure = measures::combine(self.config.measure, weights, &x);
    }

    fn recompute_all_bin_measures(&mut self) {
        let dims = self.dims();
        let mut total_norm_residual = vec![0.0; dims];
        for bin in &self.bins {
            for h in 0..dims {
                total_norm_residual[h] += bin.norm_avail_dim(h);
            }
        }
        let mut total_norm_size = vec![0.0; dims];
        for &id in &self.order {
            for h in 0..dims {
                total_norm_size[h] += self.item(id).norm_size_dim(h);
            }
        }
        let mut weights = vec![0.0; dims];
        weights::compute_weight_vector(
            self.config.bin_weight,
            true,
            0,
            self.bins.len(),
            &total_norm_size,
            &total_norm_residual,
            &mut weights,
        );
        for idx in 0..self.bins.len() {
            self.recompute_bin_measure(idx, &weights);
        }
        self.bins.sort_by(bin::cmp_measure_increasing);
        if self.config.kind.worst_fit() {
            self.bins.reverse();
        }
    }

    fn bin_cmp(&self) -> impl Fn(&Bin, &Bin) -> Ordering {
        let worst_fit = self.config.kind.worst_fit();
        let lexico = self.config.ordering == ItemOrderStyle::Lexico;
        move |a: &Bin, b: &Bin| {
            if lexico {
                if worst_fit {
                    bin::cmp_lexicographic_decreasing(a, b)
                } else {
                    bin::cmp_lexicographic_increasing(a, b)
                }
            } else if worst_fit {
                bin::cmp_measure_decreasing(a, b)
            } else {
                bin::cmp_measure_increasing(a, b)
            }
        }
    }

    fn try_place_in_existing(&mut self, item_id: usize) -> Option<usize> {
        let sizes = self.item(item_id).sizes().to_vec();
        for idx in 0..self.bins.len() {
            if self.bins[idx].does_item_fit(&sizes) {
                self.bins[idx].add_item(item_id, &sizes);
                return Some(idx);
            }
        }
        None
    }

    fn open_new_bin(&mut self) -> usize {
        let caps: Rc<[u64]> = self.instance.capacities_rc();
        let at_end = self.create_bins_at_end();
        open_bin(&mut self.bins, &mut self.next_bin_index, caps, at_end)
    }

    fn place_item(&mut self, item_id: usize) -> Result<usize> {
        let n_items = self.instance.n_items();
        loop {
            if let Some(idx) = self.try_place_in_existing(item_id) {
                return Ok(idx);
            }
            let idx = self.open_new_bin();
            if self.bins.len() > n_items {
                return Err(VbppError::Runaway {
                    algorithm: self.name.clone(),
                    instance: self.instance.name().to_string(),
                    bins: self.bins.len(),
                });
            }
            let sizes = self.item(item_id).sizes().to_vec();
            if self.bins[idx].does_item_fit(&sizes) {
                self.bins[idx].add_item(item_id, &sizes);
                return Ok(idx);
            }
            // The brand new, fully-empty bin still can't hold the item: it
            // is oversized in some dimension. Keep opening bins until the
            // runaway guard above trips.
        }
    }

    fn maintain_bins_after_placement(&mut self, touched_bin_idx: usize) {
        if !self.config.kind.sorts_bins() {
            return;
        }
        if self.config.ordering == ItemOrderStyle::Lexico {
            let cmp = self.bin_cmp();
            bubble_into_place(&mut self.bins, touched_bin_idx, &cmp);
            return;
        }
        if self.config.kind.bin_weight_from_aggregate() {
            self.recompute_all_bin_measures();
            return;
        }
        // T1/WFD-T1: reuse the item weight vector. If item weights didn't
        // move, only the touched bin's own residual changed.
        if self.config.dynamic_effective() {
            self.recompute_all_bin_measures();
        } else {
            let dims = self.dims();
            let mut weights = vec![0.0; dims];
            let mut total_norm_size = vec![0.0; dims];
            for &id in &self.order {
                for h in 0..dims {
                    total_norm_size[h] += self.item(id).norm_size_dim(h);
                }
            }
            weights::compute_weights(self.config.item_weight, self.order.len() as f64, &total_norm_size, &mut weights);
            self.recompute_bin_measure(touched_bin_idx, &weights);
            let cmp = self.bin_cmp();
            bubble_into_place(&mut self.bins, touched_bin_idx, &cmp);
        }
    }

    fn maintain_items_after_placement(&mut self, cursor: usize) {
        if !self.config.kind.sorts_items() {
            return;
        }
        let remaining = &self.order[cursor..];
        match self.config.ordering {
            ItemOrderStyle::Standard => {
                if self.config.dynamic_effective() {
                    let ids = remaining.to_vec();
                    self.recompute_item_measures(&ids);
                    let order_slice = &mut self.order[cursor..];
                    let cmp = |a: &usize, b: &usize| {
                        self.item_measure[*b]
                            .partial_cmp(&self.item_measure[*a])
                            .unwrap_or(Ordering::Equal)
                    };
                    bubble_up(order_slice, cmp);
                }
            }
            ItemOrderStyle::Lexico => { /* static order, nothing to maintain */ }
            ItemOrderStyle::Rank => {
                if self.config.dynamic {
                    let ids = remaining.to_vec();
                    self.rank_item_measures(&ids);
                    self.order[cursor..].sort_by(|&a, &b| self.item_measure[a].partial_cmp(&self.item_measure[b]).unwrap_or(Ordering::Equal));
                }
            }
        }
    }

    fn initial_sort(&mut self) {
        if !self.config.kind.sorts_items() {
            return;
        }
        match self.config.ordering {
            ItemOrderStyle::Standard => {
                let ids = self.order.clone();
                self.recompute_item_measures(&ids);
                let measures = &self.item_measure;
                self.order
                    .sort_by(|&a, &b| measures[b].partial_cmp(&measures[a]).unwrap_or(Ordering::Equal));
            }
            ItemOrderStyle::Lexico => {
                let order = self.order.clone();
                let instance = self.instance;
                let mut order = order;
                order.sort_by(|&a, &b| item::cmp_lexicographic_decreasing(instance.item(a), instance.item(b)));
                self.order = order;
            }
            ItemOrderStyle::Rank => {
                let ids = self.order.clone();
                self.rank_item_measures(&ids);
                self.order.sort_by(|&a, &b| self.item_measure[a].partial_cmp(&self.item_measure[b]).unwrap_or(Ordering::Equal));
            }
        }
    }
}

/// Removes `slice[idx]` and reinserts it at the position the comparator
/// dictates, a bounded, single-element reposition rather than a full sort.
fn bubble_into_place(bins: &mut [Bin], idx: usize, cmp: &impl Fn(&Bin, &Bin) -> Ordering) {
    if idx > 0 {
        bubble_up(&mut bins[..=idx], cmp);
    }
    if idx < bins.len() - 1 {
        bubble_down(&mut bins[idx..], cmp);
    }
}

impl<'a> Algorithm for ItemCentricAlgo<'a> {
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

        self.initial_sort();

        let mut cursor = 0;
        while cursor < n {
            let item_id = self.order[cursor];
            let touched = self.place_item(item_id)?;
            cursor += 1;
            self.maintain_bins_after_placement(touched);
            self.maintain_items_after_placement(cursor);
        }

        self.solved = true;
        self.cached_objective = self.bins.len();
        Ok(self.cached_objective)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ff<'a>(instance: &'a Instance) -> ItemCentricAlgo<'a> {
        ItemCentricAlgo::new(
            "FF",
            instance,
            ItemCentricConfig::new(ItemCentricKind::Ff, Measure::L1, Weight::Unit),
        )
    }

    #[test]
    fn ff_scenario_1_first_fit_into_two_bins() {
        let inst = Instance::without_shuffle("s1", vec![10], vec![vec![6], vec![5], vec![4], vec![3]]);
        let mut algo = ff(&inst);
        assert_eq!(algo.solve_single(0).unwrap(), 2);
        assert_eq!(algo.bins()[0].alloc_list(), &[0, 2]);
        assert_eq!(algo.bins()[1].alloc_list(), &[1, 3]);
    }

    #[test]
    fn ff_empty_instance_is_zero_bins() {
        let inst = Instance::without_shuffle("empty", vec![10], vec![]);
        let mut algo = ff(&inst);
        assert_eq!(algo.solve_single(0).unwrap(), 0);
    }

    #[test]
    fn ff_all_zero_size_items_use_one_bin() {
        let inst = Instance::without_shuffle("zeros", vec![10, 10], (0..6).map(|_| vec![0, 0]).collect());
        let mut algo = ff(&inst);
        assert_eq!(algo.solve_single(0).unwrap(), 1);
    }

    #[test]
    fn oversized_item_trips_runaway_guard() {
        let inst = Instance::without_shuffle("oversized", vec![10], vec![vec![20]]);
        let mut algo = ff(&inst);
        assert!(matches!(algo.solve_single(0), Err(VbppError::Runaway { .. })));
    }

    #[test]
    fn re_solving_returns_cached_objective() {
        let inst = Instance::without_shuffle("s1", vec![10], vec![vec![6], vec![5], vec![4], vec![3]]);
        let mut algo = ff(&inst);
        assert_eq!(algo.solve_single(0).unwrap(), 2);
        assert_eq!(algo.solve_single(0).unwrap(), 2);
    }

    #[test]
    fn ffd_scenario_2_packs_into_two_bins() {
        let inst = Instance::without_shuffle(
            "s2",
            vec![10, 10],
            vec![vec![6, 2], vec![5, 5], vec![4, 8], vec![3, 3]],
        );
        let mut algo = ItemCentricAlgo::new(
            "FFD-L1-Average",
            &inst,
            ItemCentricConfig::new(ItemCentricKind::Ffd, Measure::L1, Weight::Average),
        );
        let objective = algo.solve_single(0).unwrap();
        assert!(objective <= 3);
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
    fn scenario_3_pairwise_incompatible_needs_four_bins() {
        let inst = Instance::without_shuffle("s3", vec![4, 4, 4], (0..4).map(|_| vec![3, 3, 3]).collect());
        let mut algo = ff(&inst);
        assert_eq!(algo.solve_single(0).unwrap(), 4);
    }

    #[test]
    fn bfd_t1_keeps_bins_feasible() {
        let inst = Instance::without_shuffle(
            "s5",
            vec![5, 5],
            vec![vec![5, 0], vec![0, 5], vec![3, 2], vec![2, 3]],
        );
        let mut algo = ItemCentricAlgo::new(
            "BFD-T1-L1-Unit",
            &inst,
            ItemCentricConfig::new(ItemCentricKind::BfdT1, Measure::L1, Weight::Unit),
        );
        let objective = algo.solve_single(0).unwrap();
        assert_eq!(objective, 2);
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
    fn wfd_t1_opens_bins_at_front() {
        let inst = Instance::without_shuffle("s1", vec![10], vec![vec![6], vec![5], vec![4], vec![3]]);
        let mut algo = ItemCentricAlgo::new(
            "WFD-T1-L1-Unit",
            &inst,
            ItemCentricConfig::new(ItemCentricKind::WfdT1, Measure::L1, Weight::Unit),
        );
        let objective = algo.solve_single(0).unwrap();
        let mut covered: Vec<usize> = algo.bins().iter().flat_map(|b| b.alloc_list().to_vec()).collect();
        covered.sort();
        assert_eq!(covered, vec![0, 1, 2, 3]);
        assert!(objective >= 2);
    }
}
