use std::collections::HashMap;

use crate::{
    csp::{evaluators, Constraint, Problem, Value, VarId, Variable},
    error::Result,
};

/// A colour for map-colouring instances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Colour {
    Red,
    Green,
    Blue,
    Yellow,
}

/// Builds a map-colouring problem: one variable per region, an
/// all-different constraint per border.
pub fn map_colouring<C: Value>(
    regions: usize,
    borders: &[(VarId, VarId)],
    colours: &[C],
) -> Result<Problem<C>> {
    let variables = (0..regions)
        .map(|_| Variable::new(colours.iter().cloned()))
        .collect::<Result<Vec<_>>>()?;
    let constraints = borders
        .iter()
        .map(|&(a, b)| Constraint::new(vec![a, b], evaluators::all_different))
        .collect::<Result<Vec<_>>>()?;
    Problem::new(variables, constraints)
}

/// The three-colouring of Australia's seven territories. Tasmania borders
/// nothing; it enters the problem through a vacuous unary constraint, as in
/// the classic formulation.
pub fn australia() -> Result<Problem<Colour>> {
    const REGIONS: [&str; 7] = ["wa", "nt", "sa", "q", "nsw", "v", "t"];
    let colours = [Colour::Red, Colour::Green, Colour::Blue];

    let names: HashMap<String, VarId> = REGIONS
        .iter()
        .enumerate()
        .map(|(id, name)| (name.to_string(), id))
        .collect();
    let region = |name: &str| names[name];

    let variables = REGIONS
        .iter()
        .map(|_| Variable::new(colours))
        .collect::<Result<Vec<_>>>()?;

    let mut constraints = [
        ("sa", "wa"),
        ("sa", "nt"),
        ("sa", "q"),
        ("sa", "nsw"),
        ("sa", "v"),
        ("wa", "nt"),
        ("nt", "q"),
        ("q", "nsw"),
        ("nsw", "v"),
    ]
    .iter()
    .map(|&(a, b)| Constraint::new(vec![region(a), region(b)], evaluators::all_different))
    .collect::<Result<Vec<_>>>()?;
    constraints.push(Constraint::new(
        vec![region("t")],
        evaluators::always_satisfied,
    )?);

    Problem::with_names(variables, constraints, names)
}
