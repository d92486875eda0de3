use crate::instance::Instance;

/// Per-dimension sum of item sizes divided by capacity, rounded up; the
/// lower bound is the maximum across dimensions. Historically also named
/// `LB_BPP`/`BPP_LB1`; this crate exposes one function under one name.
pub fn lb_sum(instance: &Instance) -> usize {
    let dims = instance.dims();
    let mut sums = vec![0u64; dims];
    for item in instance.items() {
        for h in 0..dims {
            sums[h] += item.size_dim(h);
        }
    }
    let caps = instance.capacities();
    (0..dims)
        .map(|h| {
            let val = (sums[h] as f64 / caps[h] as f64).ceil();
            val as usize
        })
        .max()
        .unwrap_or(0)
}

fn incompatible(a: &crate::item::Item, b: &crate::item::Item, caps: &[u64]) -> bool {
    (0..caps.len()).any(|h| a.size_dim(h) + b.size_dim(h) > caps[h])
}

/// Johnson's greedy clique heuristic on the item-item incompatibility graph
/// (items `i,j` adjacent iff they cannot share a bin in some dimension).
/// Each item in the returned clique needs a bin of its own, so the clique
/// size is a valid, if not tight, lower bound.
pub fn lb_clique(instance: &Instance) -> usize {
    let items = instance.items();
    let n = items.len();
    if n == 0 {
        return 0;
    }
    let caps = instance.capacities();

    let mut adj = vec![vec![false; n]; n];
    let mut degrees = vec![0i64; n];
    for i in 0..n {
        for j in (i + 1)..n {
            if incompatible(&items[i], &items[j], caps) {
                adj[i][j] = true;
                adj[j][i] = true;
                degrees[i] += 1;
                degrees[j] += 1;
            }
        }
    }

    let mut rest: Vec<usize> = (0..n).collect();
    let mut clique_size = 0usize;

    while !rest.is_empty() {
        let y = argmax_degree(&degrees);
        let Some(y) = y else {
            break;
        };
        clique_size += 1;

        let to_remove: Vec<usize> = rest.iter().copied().filter(|&v| !adj[y][v]).collect();
        for v in to_remove {
            rest.retain(|&x| x != v);
            for j in 0..n {
                if adj[v][j] {
                    degrees[j] -= 1;
                }
            }
            degrees[v] = -1;
        }
    }

    clique_size
}

fn argmax_degree(degrees: &[i64]) -> Option<usize> {
    let mut best: Option<(usize, i64)> = None;
    for (i, &d) in degrees.iter().enumerate() {
        if d < 0 {
            continue;
        }
        match best {
            Some((_, bd)) if bd >= d => {}
            _ => best = Some((i, d)),
        }
    }
    best.map(|(i, _)| i)
}
