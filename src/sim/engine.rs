use crate::config::PhysicalParams;
use crate::control::lqr_control;
use crate::error::SimError;
use crate::model::{nonlinear_dynamics, Control, GainMatrix, LinearModel, State};
use crate::observer::SimObserver;
use crate::sim::integrator::{integrate_interval, IntegratorConfig};

/// Closed-loop simulation result: five parallel sequences of equal length,
/// with time[i] = i * dt exactly. Immutable once returned.
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    pub time: Vec<f64>,
    pub states: Vec<State>,
    pub inputs: Vec<Control>,
    pub reference: Vec<State>,
    pub error: Vec<State>,
}

impl Trajectory {
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }
}

/// Drives the feedback loop: LQR correction, hover trim, thrust
/// saturation, optional disturbance injection, and adaptive integration of
/// the nonlinear dynamics with a linear-Euler fallback.
///
/// Holds no state across runs; independent runs with identical inputs
/// produce identical trajectories.
pub struct ClosedLoopSim<'a> {
    model: LinearModel,
    gain: GainMatrix,
    params: PhysicalParams,
    integrator: IntegratorConfig,
    observer: &'a dyn SimObserver,
}

impl<'a> ClosedLoopSim<'a> {
    pub fn new(
        model: LinearModel,
        gain: GainMatrix,
        params: PhysicalParams,
        observer: &'a dyn SimObserver,
    ) -> Self {
        Self {
            model,
            gain,
            params,
            integrator: IntegratorConfig::default(),
            observer,
        }
    }

    pub fn with_integrator(mut self, config: IntegratorConfig) -> Self {
        self.integrator = config;
        self
    }

    /// Run the closed loop for `horizon` seconds at nominal step `dt`
    /// against a constant reference (zero/hover if `None`).
    pub fn run(
        &self,
        initial_state: &State,
        horizon: f64,
        dt: f64,
        reference: Option<&State>,
    ) -> Result<Trajectory, SimError> {
        let reference = reference.copied().unwrap_or_else(State::zeros);
        self.run_inner(initial_state, horizon, dt, &reference, None)
    }

    /// Like [`run`](Self::run), additionally adding `disturbance` to the
    /// control input at the step index derived from `disturbance_time / dt`
    /// (truncating; callers should keep the time an exact multiple of dt).
    pub fn run_with_disturbance(
        &self,
        initial_state: &State,
        horizon: f64,
        dt: f64,
        disturbance_time: f64,
        disturbance: &Control,
    ) -> Result<Trajectory, SimError> {
        if !(disturbance_time.is_finite() && disturbance_time >= 0.0) {
            return Err(SimError::InvalidParameter(format!(
                "disturbance_time must be non-negative, got {}",
                disturbance_time
            )));
        }
        let disturbance_index = (disturbance_time / dt) as usize;
        let reference = State::zeros();
        self.run_inner(
            initial_state,
            horizon,
            dt,
            &reference,
            Some((disturbance_index, *disturbance)),
        )
    }

    fn run_inner(
        &self,
        initial_state: &State,
        horizon: f64,
        dt: f64,
        reference: &State,
        disturbance: Option<(usize, Control)>,
    ) -> Result<Trajectory, SimError> {
        self.params.validate()?;
        if !(horizon.is_finite() && horizon > 0.0) {
            return Err(SimError::InvalidParameter(format!(
                "horizon must be positive, got {}",
                horizon
            )));
        }
        if !(dt.is_finite() && dt > 0.0) {
            return Err(SimError::InvalidParameter(format!(
                "dt must be positive, got {}",
                dt
            )));
        }
        let num_steps = (horizon / dt).floor() as usize;
        if num_steps == 0 {
            return Err(SimError::InvalidParameter(
                "horizon is shorter than one step".into(),
            ));
        }

        let mut trajectory = Trajectory {
            time: (0..num_steps).map(|i| i as f64 * dt).collect(),
            states: Vec::with_capacity(num_steps),
            inputs: Vec::with_capacity(num_steps),
            reference: Vec::with_capacity(num_steps),
            error: Vec::with_capacity(num_steps),
        };
        trajectory.states.push(*initial_state);

        for i in 0..num_steps {
            let t = trajectory.time[i];
            let state = trajectory.states[i];

            trajectory.reference.push(*reference);
            let u = self.step_input(t, &state, reference, &disturbance, i);
            trajectory.inputs.push(u);
            trajectory.error.push(state - reference);

            // The last index records reference/input/error only; nothing is
            // integrated past the final state.
            if i + 1 == num_steps {
                break;
            }

            let next_state = self.advance(t, dt, &state, &u);
            trajectory.states.push(next_state);
        }

        Ok(trajectory)
    }

    /// Per-step control input: LQR correction, hover trim on the thrust
    /// channel, thrust-only saturation, then the disturbance (if this is
    /// its step).
    fn step_input(
        &self,
        t: f64,
        state: &State,
        reference: &State,
        disturbance: &Option<(usize, Control)>,
        index: usize,
    ) -> Control {
        let mut u = lqr_control(state, reference, &self.gain);

        // The gain regulates deviation from hover; equilibrium thrust is
        // added outside the feedback law.
        u[0] += self.params.hover_thrust();

        // The actuator cannot pull: thrust is clamped at zero. Torque
        // channels are intentionally left unclamped.
        u[0] = u[0].max(0.0);

        if let Some((disturbance_index, vector)) = disturbance {
            if index == *disturbance_index {
                u += vector;
                self.observer.disturbance_applied(t);
            }
        }
        u
    }

    /// Integrate the nonlinear dynamics over one nominal step, falling back
    /// to an explicit-Euler step of the linear model when the adaptive
    /// integrator fails. The control input and parameters are captured by
    /// value so sub-step evaluations never see a partial update.
    fn advance(&self, t: f64, dt: f64, state: &State, u: &Control) -> State {
        let u_step = *u;
        let params = self.params;
        let dynamics = move |tau: f64, x: &State| nonlinear_dynamics(tau, x, &u_step, &params);

        match integrate_interval(dynamics, t, t + dt, state, &self.integrator) {
            Ok(next) => next,
            Err(error) => {
                self.observer.integration_fallback(t, &error);
                state + dt * (self.model.a * state + self.model.b * u)
            }
        }
    }
}
