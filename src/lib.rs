//! Heuristic engine for the vector bin packing problem: a collection of
//! greedy packing algorithms (item-centric fit variants, bin-centric score,
//! and multi-bin search) sharing one set of weight, measure and score
//! policies, plus the `.vbp` instance format and a descriptor grammar that
//! names a concrete algorithm as a single hyphen-joined string.

pub mod algo;
pub mod bin;
pub mod descriptor;
pub mod error;
pub mod instance;
pub mod io;
pub mod item;
pub mod lower_bounds;
pub mod measures;
pub mod scores;
pub mod sorting;
pub mod weights;

pub use algo::Algorithm;
pub use descriptor::Descriptor;
pub use error::{Result, VbppError};
pub use instance::Instance;
