//! Vincula is a generic library for modeling and solving finite-domain
//! constraint satisfaction problems (CSPs).
//!
//! A problem is a set of [`Variable`]s, each with a finite domain of
//! candidate values, plus [`Constraint`]s restricting which value
//! combinations are permitted. Variables and constraints live in arenas
//! owned by a [`Problem`] and are addressed by integer handles, so identity
//! is never confused with structural equality and replicating a whole
//! problem is one bulk clone.
//!
//! # Core Concepts
//!
//! - **[`Variable`]**: a finite domain and at most one current assignment,
//!   held as an index into the domain.
//! - **[`Constraint`]**: an n-ary relation given as a first-class predicate
//!   over the currently assigned values of its variables.
//! - **[`Problem`]**: the constraint set plus the derived variable →
//!   constraints map and neighbor graph, queried by every solver.
//! - **Solvers**: systematic search ([`solver::backtracking`],
//!   [`solver::heuristic`], [`solver::tree`], [`solver::cutset`]) and local
//!   search ([`solver::local`]), sharing one assign/unassign protocol over
//!   the problem's variables.
//! - **Preprocessors**: [`preprocess::ac3`], [`preprocess::ac4`] and
//!   [`preprocess::pc2`] shrink domains to a consistency fixed point before
//!   search.
//!
//! # Example: colouring a tiny map
//!
//! ```
//! use vincula::csp::{evaluators, Constraint, Problem, Variable};
//! use vincula::solver::backtracking;
//!
//! # fn main() -> vincula::error::Result<()> {
//! // Three regions over two colours; the middle one touches both others.
//! let variables = vec![
//!     Variable::new(["red", "green"])?,
//!     Variable::new(["red", "green"])?,
//!     Variable::new(["red", "green"])?,
//! ];
//! let constraints = vec![
//!     Constraint::new(vec![0, 1], evaluators::all_different)?,
//!     Constraint::new(vec![1, 2], evaluators::all_different)?,
//! ];
//! let mut problem = Problem::new(variables, constraints)?;
//!
//! let (status, _stats) = backtracking::solve(&mut problem, None)?;
//! assert!(status.is_solved());
//! assert!(problem.is_completely_consistently_assigned());
//! assert_ne!(
//!     problem.variable(0).value()?,
//!     problem.variable(1).value()?,
//! );
//! # Ok(())
//! # }
//! ```
//!
//! Solvers that use randomness (random assignment, min-conflicts, the whole
//! local-search family) take one caller-supplied `StdRng`, so a seeded run
//! replays exactly.

pub mod csp;
pub mod error;
pub mod preprocess;
pub mod problems;
pub mod solver;

pub use csp::{Assignment, AssignmentHistory, Constraint, Problem, Value, VarId, Variable};
pub use error::{CspError, Error, Result};
pub use solver::SolveStatus;
