use vincula::preprocess::{ac3_with_stats, PropagationStats};
use vincula::problems::map_colouring::australia;
use vincula::solver::{backtracking, stats::render_propagation_table};

fn main() {
    let mut problem = australia().expect("the Australia instance builds");

    let mut stats = PropagationStats::default();
    let feasible = ac3_with_stats(&mut problem, &mut stats).expect("AC-3 runs cleanly");
    println!("AC-3 potentially solvable: {feasible}");
    println!("{}", render_propagation_table(&stats));

    let (status, _) = backtracking::solve(&mut problem, None).expect("search runs cleanly");
    println!("status: {status:?}");

    for region in ["wa", "nt", "sa", "q", "nsw", "v", "t"] {
        let var = problem.variable_by_name(region).expect("region is named");
        println!("{region}: {}", problem.variable_to_string(var));
    }
}
