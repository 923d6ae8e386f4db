pub mod exhaustive;
pub mod footrule;
pub mod heap;

pub use exhaustive::ExhaustiveSolver;
pub use footrule::{scaled_footrule_distance, FootruleProblem, ScaledFootruleAggregator};
pub use heap::{factorial, HeapSwaps};
