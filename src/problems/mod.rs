//! Ready-made problem encodings, used by the demos, the benchmarks, and
//! the end-to-end tests.

pub mod map_colouring;
pub mod n_queens;
