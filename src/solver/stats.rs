use prettytable::{Cell, Row, Table};

use crate::{
    preprocess::PropagationStats,
    solver::SearchStats,
};

/// Renders one search run's counters as a table for logging.
pub fn render_stats_table(stats: &SearchStats) -> String {
    let mut table = Table::new();
    table.add_row(Row::new(vec![
        Cell::new("Nodes Visited"),
        Cell::new("Backtracks"),
        Cell::new("Dead Ends"),
    ]));
    table.add_row(Row::new(vec![
        Cell::new(&stats.nodes_visited.to_string()),
        Cell::new(&stats.backtracks.to_string()),
        Cell::new(&stats.dead_ends.to_string()),
    ]));
    table.to_string()
}

/// Renders per-constraint propagation counters, busiest constraints first.
pub fn render_propagation_table(stats: &PropagationStats) -> String {
    let mut table = Table::new();
    table.add_row(Row::new(vec![
        Cell::new("Constraint"),
        Cell::new("Revisions"),
        Cell::new("Prunings"),
    ]));

    let mut sorted: Vec<_> = stats.constraint_stats.iter().collect();
    sorted.sort_by_key(|(id, per)| (std::cmp::Reverse(per.prunings), **id));

    for (id, per) in sorted {
        table.add_row(Row::new(vec![
            Cell::new(&id.to_string()),
            Cell::new(&per.revisions.to_string()),
            Cell::new(&per.prunings.to_string()),
        ]));
    }
    table.to_string()
}

#[cfg(test)]
mod tests {
    use super::{render_propagation_table, render_stats_table};
    use crate::{preprocess::PropagationStats, solver::SearchStats};

    #[test]
    fn search_table_contains_the_counters() {
        let stats = SearchStats {
            nodes_visited: 42,
            backtracks: 7,
            dead_ends: 3,
        };
        let rendered = render_stats_table(&stats);
        assert!(rendered.contains("42"));
        assert!(rendered.contains("Backtracks"));
    }

    #[test]
    fn propagation_table_lists_constraints() {
        let mut stats = PropagationStats::default();
        stats.record_revision(0);
        stats.record_pruning(0);
        stats.record_revision(1);
        let rendered = render_propagation_table(&stats);
        assert!(rendered.contains("Revisions"));
        assert!(rendered.contains("Prunings"));
    }
}
