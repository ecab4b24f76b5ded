use hover::control::closed_loop_eigenvalues;
use hover::server::{run_request, SimulationRequest};
use hover::{design_lqr, LinearModel, LogObserver, LqrWeights, PhysicalParams};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let observer = LogObserver;
    let params = PhysicalParams::default();
    let model = LinearModel::from_params(&params);
    let design = design_lqr(&model, &LqrWeights::default(), &observer)?;

    let worst = closed_loop_eigenvalues(&model, &design.k)
        .iter()
        .map(|eig| eig.re)
        .fold(f64::NEG_INFINITY, f64::max);
    println!(
        "LQR design: K is {}x{}, slowest closed-loop mode Re = {:.4}",
        design.k.nrows(),
        design.k.ncols(),
        worst
    );

    // Hover recovery from a 1 m offset in x, the canonical scenario
    let mut request = SimulationRequest::default();
    let mut initial_state = vec![0.0; 12];
    initial_state[0] = 1.0;
    request.initial_state = Some(initial_state);

    let result = run_request(&request, &observer)?;
    let metrics = &result.metrics;
    println!(
        "Simulated {} steps over {:.1} s",
        result.time.len(),
        result.time.last().copied().unwrap_or(0.0)
    );
    match metrics.settling_time {
        Some(t) => println!("Settling time: {:.2} s", t),
        None => println!("Did not settle within the horizon"),
    }
    println!(
        "Max position error: {:.4} m, RMSE: {:.4} m, control energy: {:.2}",
        metrics.max_position_error, metrics.rmse_position, metrics.control_energy
    );

    Ok(())
}
