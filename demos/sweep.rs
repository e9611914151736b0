// Example: minimum-emission diet and a dispersion sweep
//
// Eleven foods, each with a greenhouse-gas impact, a cost and its protein,
// carbohydrate and fat content per serving. Choose servings that:
// - stay within a daily budget of 15
// - keep protein in 82..136 g, carbohydrate in 225..325 g, fat in 44..78 g
// and minimize the total impact.
//
// The LP optimum piles everything onto two foods. The second part caps the
// coefficient of variation of the servings and scans the cap from 0.2 to 3.0
// to show how spreading the diet out costs emissions.

use ecodiet::{
    cv_sweep, ConstraintBuilder, DietTargets, FoodCatalog, LogMonitor, Method, ServingBounds,
    SolverConfig, SolverFactory, SweepRange,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let catalog = FoodCatalog::sample();
    let targets = DietTargets::sample();
    let builder = ConstraintBuilder::new(&catalog, &targets);
    let problem = builder.problem(ServingBounds::default())?;
    let start = vec![0.0; catalog.len()];

    println!("=== Minimum-emission diet ===\n");
    for method in [Method::Simplex, Method::InteriorPoint, Method::Slp] {
        let solver = SolverFactory::create_from_method(method, &SolverConfig::default())?;
        let outcome = solver.solve(&problem, &start)?;

        println!("Method: {} ({})", method, solver.name());
        println!("Status: {}", outcome.status);
        println!("Message: {}", outcome.message);
        if let Some(value) = outcome.optimal_value {
            println!("Total impact: {:.4}", value);
            for (i, (name, servings)) in catalog.names().iter().zip(&outcome.optimal_vector).enumerate() {
                if servings.abs() > 1e-6 {
                    println!("  #{:02} {}: {:.3}", i + 1, name, servings);
                }
            }
            for status in problem.evaluate_constraints(&outcome.optimal_vector)? {
                println!("  {:<18} margin {:>10.4}", status.name, status.margin);
            }
        }
        println!(
            "Iterations: {}, elapsed: {:.3}ms\n",
            outcome.iterations,
            outcome.elapsed.as_secs_f64() * 1e3
        );
    }

    println!("=== Coefficient-of-variation sweep ===\n");
    let solver = SolverFactory::create_from_method(Method::Slp, &SolverConfig::default())?;
    let report = cv_sweep(
        &catalog,
        &targets,
        ServingBounds::default(),
        &SweepRange::new(0.2, 3.0, 0.1)?,
        solver.as_ref(),
        &vec![1.0; catalog.len()],
        &mut LogMonitor::new(false),
    )?;

    println!("\n{}", serde_json::to_string_pretty(&report.best())?);
    Ok(())
}
