//! Every concrete algorithm family implements one trait with two entry
//! points instead of sitting in a class-inheritance lattice. A centric
//! algorithm only ever overrides `solve_single`; a multi-bin algorithm only
//! ever overrides `solve_multi`. Calling the wrong one is a programmer
//! error and fails loudly through `ContractViolation`, per the contract
//! described in the error module.

use crate::bin::Bin;
use crate::error::{Result, VbppError};

pub mod bin_centric;
pub mod item_centric;
pub mod multi_bin;

pub trait Algorithm: std::fmt::Debug {
    fn name(&self) -> &str;
    fn bins(&self) -> &[Bin];
    fn is_solved(&self) -> bool;

    /// Solves a single, unbounded instance, opening bins on demand.
    /// `hint_bins` only pre-reserves capacity; it never caps how many bins
    /// get created.
    fn solve_single(&mut self, _hint_bins: usize) -> Result<usize> {
        Err(VbppError::ContractViolation {
            algorithm: self.name().to_string(),
            expected_entry: "solve_single",
        })
    }

    /// Searches for the smallest feasible bin count in `[lb, ub]`. Returns
    /// `Ok(-1)` (not an error) when the search is exhausted without finding
    /// a feasible count within the range.
    fn solve_multi(&mut self, _lb: usize, _ub: usize) -> Result<i64> {
        Err(VbppError::ContractViolation {
            algorithm: self.name().to_string(),
            expected_entry: "solve_multi",
        })
    }
}

/// Opens a new bin and appends/prepends it per `create_bins_at_end`, in the
/// style of the original `createNewBin` used by every family. Returns the
/// new bin's position in `bins`.
pub(crate) fn open_bin(
    bins: &mut Vec<Bin>,
    next_bin_index: &mut usize,
    max_caps: std::rc::Rc<[u64]>,
    create_bins_at_end: bool,
) -> usize {
    let bin = Bin::new(*next_bin_index, max_caps);
    *next_bin_index += 1;
    if create_bins_at_end {
        bins.push(bin);
        bins.len() - 1
    } else {
        bins.insert(0, bin);
        0
    }
}
