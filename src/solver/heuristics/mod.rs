//! Variable- and value-ordering heuristics for the heuristic backtracking
//! solver.

pub mod value;
pub mod variable;

pub use value::{ConsistentDomainOrder, LeastConstrainingValue, ValueOrderingHeuristic};
pub use variable::{
    DegreeHeuristic, FirstCandidate, MinimumRemainingValues, TieBreakHeuristic,
    VariableSelectionHeuristic,
};
