use crate::{
    csp::{Constraint, Problem, Value, Variable},
    error::Result,
};

/// Builds the n-queens problem: one variable per column holding the queen's
/// row, and one binary constraint per column pair ruling out shared rows
/// and shared diagonals. Domains are stored sorted, so row lookups binary
/// search.
pub fn n_queens(n: usize) -> Result<Problem<i64>> {
    let variables = (0..n)
        .map(|_| Variable::with_sorted_domain(0..n as i64))
        .collect::<Result<Vec<_>>>()?;

    let mut constraints = Vec::with_capacity(n * (n - 1) / 2);
    for i in 0..n {
        for j in i + 1..n {
            let spread = (j - i) as i64;
            constraints.push(Constraint::new(vec![i, j], move |values: &[i64]| {
                match values {
                    [a, b] => a != b && (a - b).abs() != spread,
                    _ => values.len() < 2,
                }
            })?);
        }
    }
    Problem::new(variables, constraints)
}

/// Reads a solved board back as rows per column.
pub fn rows<T: Value>(problem: &Problem<T>) -> Result<Vec<T>> {
    problem
        .variable_ids()
        .map(|var| problem.variable(var).value().cloned())
        .collect()
}
