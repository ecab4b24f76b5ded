use hover::control::LqrDesign;
use hover::{design_lqr, LinearModel, LqrWeights, NullObserver, PhysicalParams, State};

/// Canonical quadrotor: Ixx = Iyy = 0.0221, Izz = 0.0366, mass = 1.0.
pub fn canonical_params() -> PhysicalParams {
    PhysicalParams::default()
}

pub fn canonical_design() -> (LinearModel, LqrDesign) {
    let model = LinearModel::from_params(&canonical_params());
    let design = design_lqr(&model, &LqrWeights::default(), &NullObserver)
        .expect("canonical design must succeed");
    (model, design)
}

/// Hover state displaced 1 m along x.
pub fn offset_initial_state() -> State {
    let mut state = State::zeros();
    state[0] = 1.0;
    state
}

/// Position error norm at one trajectory index.
pub fn position_error(error: &State) -> f64 {
    error.fixed_rows::<3>(0).norm()
}
