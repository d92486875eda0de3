use std::rc::Rc;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::item::Item;

/// Seed for the one-shot deterministic item shuffle applied at load time.
/// Carried over unchanged from the reference implementation so historical
/// instance files reproduce known results.
pub const DEFAULT_SHUFFLE_SEED: u64 = 23;

/// A read-only problem instance: dimension count, bin capacities, and the
/// item sequence. Once built, nothing mutates it; every algorithm only ever
/// reads through a shared reference.
///
/// Items are stored indexed by their stable, file-order identifier, so
/// `item(id)` and anything downstream of it (bin allocation lists, `LB_clique`'s
/// id-order tie-break) always refer to the identifier the instance file and
/// an emitted solution agree on. The one-shot deterministic shuffle instead
/// permutes a separate `processing_order` sequence of those same ids, the
/// way the reference implementation reorders a list of item pointers without
/// touching any pointer's own id.
#[derive(Debug, Clone)]
pub struct Instance {
    name: String,
    capacities: Rc<[u64]>,
    items: Vec<Item>,
    processing_order: Vec<usize>,
}

impl Instance {
    /// Builds an instance from raw sizes, normalizing against `capacities`
    /// and optionally applying the one-shot deterministic shuffle.
    pub fn new(name: impl Into<String>, capacities: Vec<u64>, sizes: Vec<Vec<u64>>) -> Self {
        Self::with_seed(name, capacities, sizes, true, DEFAULT_SHUFFLE_SEED)
    }

    pub fn without_shuffle(name: impl Into<String>, capacities: Vec<u64>, sizes: Vec<Vec<u64>>) -> Self {
        Self::with_seed(name, capacities, sizes, false, DEFAULT_SHUFFLE_SEED)
    }

    pub fn with_seed(
        name: impl Into<String>,
        capacities: Vec<u64>,
        sizes: Vec<Vec<u64>>,
        shuffle: bool,
        seed: u64,
    ) -> Self {
        let capacities: Rc<[u64]> = Rc::from(capacities.into_boxed_slice());
        let items: Vec<Item> = sizes
            .into_iter()
            .enumerate()
            .map(|(id, s)| Item::new(id, s, &capacities))
            .collect();
        let mut processing_order: Vec<usize> = (0..items.len()).collect();
        if shuffle {
            let mut rng = StdRng::seed_from_u64(seed);
            processing_order.shuffle(&mut rng);
        }
        Instance {
            name: name.into(),
            capacities,
            items,
            processing_order,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dims(&self) -> usize {
        self.capacities.len()
    }

    pub fn capacities(&self) -> &[u64] {
        &self.capacities
    }

    pub fn capacities_rc(&self) -> Rc<[u64]> {
        Rc::clone(&self.capacities)
    }

    /// Items in identifier order (`items()[id].id() == id`).
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn n_items(&self) -> usize {
        self.items.len()
    }

    pub fn item(&self, id: usize) -> &Item {
        &self.items[id]
    }

    /// Item ids in the order algorithms should process them by default: the
    /// one-shot deterministic shuffle applied at load, or identifier order
    /// when shuffling was disabled.
    pub fn processing_order(&self) -> &[usize] {
        &self.processing_order
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalized_sizes_follow_capacities() {
        let inst = Instance::without_shuffle("t", vec![10, 10], vec![vec![5, 2], vec![1, 1]]);
        assert_eq!(inst.n_items(), 2);
        assert_eq!(inst.item(0).norm_sizes(), &[0.5, 0.2]);
    }

    #[test]
    fn shuffle_is_deterministic_for_a_fixed_seed() {
        let sizes: Vec<Vec<u64>> = (0..20).map(|i| vec![i as u64]).collect();
        let a = Instance::with_seed("t", vec![100], sizes.clone(), true, 23);
        let b = Instance::with_seed("t", vec![100], sizes, true, 23);
        assert_eq!(a.processing_order(), b.processing_order());
    }

    #[test]
    fn shuffle_permutes_processing_order_without_touching_item_ids() {
        let sizes: Vec<Vec<u64>> = (0..20).map(|i| vec![i as u64]).collect();
        let inst = Instance::with_seed("t", vec![100], sizes, true, 23);
        assert_ne!(inst.processing_order(), (0..20).collect::<Vec<usize>>().as_slice());
        let mut sorted = inst.processing_order().to_vec();
        sorted.sort();
        assert_eq!(sorted, (0..20).collect::<Vec<usize>>());
        for id in 0..20 {
            assert_eq!(inst.item(id).id(), id);
        }
    }

    #[test]
    fn without_shuffle_preserves_file_order() {
        let sizes: Vec<Vec<u64>> = (0..5).map(|i| vec![i as u64]).collect();
        let inst = Instance::without_shuffle("t", vec![100], sizes);
        let ids: Vec<usize> = inst.items().iter().map(|it| it.id()).collect();
        assert_eq!(ids, vec![0, 1, 2, 3, 4]);
    }
}
