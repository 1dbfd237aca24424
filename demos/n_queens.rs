use vincula::problems::n_queens::{n_queens, rows};
use vincula::solver::{
    heuristic::HeuristicBacktracking,
    heuristics::{FirstCandidate, MinimumRemainingValues},
    inference::ForwardChecking,
    stats::render_stats_table,
};

fn main() {
    let args: Vec<String> = std::env::args().collect();
    if args.len() != 2 {
        eprintln!("Usage: {} <N>", args[0]);
        std::process::exit(1);
    }
    let n: usize = args[1].parse().expect("N must be an integer");

    let mut problem = n_queens(n).expect("n-queens builds for any n >= 1");
    let solver = HeuristicBacktracking::new(
        Box::new(MinimumRemainingValues),
        Box::new(FirstCandidate),
    )
    .with_inference(Box::new(ForwardChecking));

    let (status, stats) = solver.solve(&mut problem, None).expect("search runs cleanly");
    println!("status: {status:?}");
    println!("{}", render_stats_table(&stats));

    if status.is_solved() {
        let board = rows(&problem).expect("solved problems are fully assigned");
        for &row in &board {
            let mut line = String::new();
            for column in 0..n as i64 {
                line.push(if column == row { 'Q' } else { '.' });
                line.push(' ');
            }
            println!("{line}");
        }
    }
}
