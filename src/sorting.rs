use std::cmp::Ordering;

/// Single backward adjacent-swap pass. Given a slice that is sorted under
/// `cmp` everywhere except possibly for one out-of-place element, this
/// brings the element that belongs first to index 0.
///
/// Used throughout the item-centric family to avoid a full re-sort when
/// only the leading candidate matters for the next placement (see the
/// variant matrix's "bubble max to front" maintenance rule).
pub fn bubble_up<T>(slice: &mut [T], cmp: impl Fn(&T, &T) -> Ordering) {
    if slice.len() < 2 {
        return;
    }
    for i in (1..slice.len()).rev() {
        if cmp(&slice[i], &slice[i - 1]) == Ordering::Less {
            slice.swap(i, i - 1);
        } else {
            break;
        }
    }
}

/// Mirror of [`bubble_up`]: a single forward pass that sinks the one
/// out-of-place element toward the end, so the element that belongs last
/// ends at the final index.
///
/// Used when a bin's measure moved in the direction that pushes it later
/// in a decreasing bin order (worst-fit variants).
pub fn bubble_down<T>(slice: &mut [T], cmp: impl Fn(&T, &T) -> Ordering) {
    if slice.len() < 2 {
        return;
    }
    for i in 0..slice.len() - 1 {
        if cmp(&slice[i], &slice[i + 1]) == Ordering::Greater {
            slice.swap(i, i + 1);
        } else {
            break;
        }
    }
}
