use thiserror::Error;

/// Every way the engine can fail to produce a solution.
///
/// `Infeasible` (a multi-bin inner attempt failing) and `Exhausted` (no
/// feasible bin count in range) are not represented here: both are normal
/// search outcomes, not errors, and are reported through ordinary return
/// values (see [`crate::algo::multi_bin::MultiBinAlgo`]).
#[derive(Debug, Error)]
pub enum VbppError {
    #[error("{path}:{line}: {reason}")]
    InstanceMalformed {
        path: String,
        line: usize,
        reason: String,
    },

    #[error("could not resolve algorithm descriptor '{descriptor}': unrecognized token '{token}'")]
    DescriptorUnknown { descriptor: String, token: String },

    #[error("algorithm '{algorithm}' does not support the {expected_entry} entry point")]
    ContractViolation {
        algorithm: String,
        expected_entry: &'static str,
    },

    #[error(
        "algorithm '{algorithm}' created more bins ({bins}) than items while solving '{instance}'"
    )]
    Runaway {
        algorithm: String,
        instance: String,
        bins: usize,
    },
}

pub type Result<T> = std::result::Result<T, VbppError>;
