pub mod algorithms;
pub mod common;

/// Re-export common types
pub use common::*;

pub use algorithms::{
    factorial, scaled_footrule_distance, ExhaustiveSolver, FootruleProblem, HeapSwaps,
    ScaledFootruleAggregator,
};
