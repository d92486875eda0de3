/// An immutable item to be packed. Items are owned by an [`crate::instance::Instance`]
/// and referenced by algorithms through their `id`; no algorithm ever mutates
/// or copies one. Ordering scratch lives in algorithm-local vectors instead
/// of on the item (see `crate::algo`), so the same instance can in principle
/// back several independent solves at once.
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    id: usize,
    sizes: Vec<u64>,
    norm_sizes: Vec<f64>,
}

impl Item {
    pub fn new(id: usize, sizes: Vec<u64>, capacities: &[u64]) -> Self {
        debug_assert_eq!(sizes.len(), capacities.len());
        let norm_sizes = sizes
            .iter()
            .zip(capacities)
            .map(|(&s, &c)| s as f64 / c as f64)
            .collect();
        Item {
            id,
            sizes,
            norm_sizes,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn dims(&self) -> usize {
        self.sizes.len()
    }

    pub fn sizes(&self) -> &[u64] {
        &self.sizes
    }

    pub fn size_dim(&self, h: usize) -> u64 {
        self.sizes[h]
    }

    pub fn norm_sizes(&self) -> &[f64] {
        &self.norm_sizes
    }

    pub fn norm_size_dim(&self, h: usize) -> f64 {
        self.norm_sizes[h]
    }

    /// Euclidean norm of the normalized size vector, used by `DotProduct2/3`.
    pub fn norm_size_l2(&self) -> f64 {
        self.norm_sizes.iter().map(|v| v * v).sum::<f64>().sqrt()
    }
}

/// Per-dimension comparison of raw sizes, used by the `Lexico` item order:
/// strictly decreasing lexicographic order, first differing dimension decides.
pub fn cmp_lexicographic_decreasing(a: &Item, b: &Item) -> std::cmp::Ordering {
    for h in 0..a.dims() {
        match b.size_dim(h).cmp(&a.size_dim(h)) {
            std::cmp::Ordering::Equal => continue,
            other => return other,
        }
    }
    std::cmp::Ordering::Equal
}
