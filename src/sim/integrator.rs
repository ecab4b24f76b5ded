use serde::{Deserialize, Serialize};

use crate::error::IntegrationError;
use crate::model::State;

/// Tuning for the adaptive Dormand-Prince 4(5) integrator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntegratorConfig {
    pub rel_tol: f64,
    pub abs_tol: f64,
    /// Smallest step the controller may select before the attempt is
    /// declared failed.
    pub min_step: f64,
    /// Step attempts allowed per integration interval.
    pub max_steps: usize,
}

impl Default for IntegratorConfig {
    fn default() -> Self {
        Self {
            rel_tol: 1e-6,
            abs_tol: 1e-9,
            min_step: 1e-12,
            max_steps: 1000,
        }
    }
}

// Dormand-Prince coefficients. The fifth-order weights double as the last
// stage row (FSAL), the fourth-order weights feed the error estimate.
const C: [f64; 7] = [0.0, 1.0 / 5.0, 3.0 / 10.0, 4.0 / 5.0, 8.0 / 9.0, 1.0, 1.0];
const A2: [f64; 1] = [1.0 / 5.0];
const A3: [f64; 2] = [3.0 / 40.0, 9.0 / 40.0];
const A4: [f64; 3] = [44.0 / 45.0, -56.0 / 15.0, 32.0 / 9.0];
const A5: [f64; 4] = [
    19372.0 / 6561.0,
    -25360.0 / 2187.0,
    64448.0 / 6561.0,
    -212.0 / 729.0,
];
const A6: [f64; 5] = [
    9017.0 / 3168.0,
    -355.0 / 33.0,
    46732.0 / 5247.0,
    49.0 / 176.0,
    -5103.0 / 18656.0,
];
const B5: [f64; 7] = [
    35.0 / 384.0,
    0.0,
    500.0 / 1113.0,
    125.0 / 192.0,
    -2187.0 / 6784.0,
    11.0 / 84.0,
    0.0,
];
const B4: [f64; 7] = [
    5179.0 / 57600.0,
    0.0,
    7571.0 / 16695.0,
    393.0 / 640.0,
    -92097.0 / 339200.0,
    187.0 / 2100.0,
    1.0 / 40.0,
];

const SAFETY: f64 = 0.9;
const MIN_FACTOR: f64 = 0.2;
const MAX_FACTOR: f64 = 5.0;

/// Integrate `f` from `t0` to `t1`, returning the solution exactly at `t1`.
///
/// Embedded 4th/5th-order error estimation drives the step size; the last
/// step is clamped so the interval endpoint is hit exactly. `f` may be
/// evaluated any number of times with trial states.
pub fn integrate_interval<F>(
    f: F,
    t0: f64,
    t1: f64,
    y0: &State,
    config: &IntegratorConfig,
) -> Result<State, IntegrationError>
where
    F: Fn(f64, &State) -> State,
{
    let mut t = t0;
    let mut y = *y0;
    let mut h = t1 - t0;

    let mut attempts = 0;
    while t < t1 - f64::EPSILON * t1.abs().max(1.0) {
        if attempts >= config.max_steps {
            return Err(IntegrationError::MaxStepsExceeded { t });
        }
        attempts += 1;

        if h < config.min_step {
            return Err(IntegrationError::StepSizeUnderflow { t });
        }
        h = h.min(t1 - t);

        let k1 = f(t, &y);
        let k2 = f(t + C[1] * h, &(y + h * (A2[0] * k1)));
        let k3 = f(t + C[2] * h, &(y + h * (A3[0] * k1 + A3[1] * k2)));
        let k4 = f(t + C[3] * h, &(y + h * (A4[0] * k1 + A4[1] * k2 + A4[2] * k3)));
        let k5 = f(
            t + C[4] * h,
            &(y + h * (A5[0] * k1 + A5[1] * k2 + A5[2] * k3 + A5[3] * k4)),
        );
        let k6 = f(
            t + C[5] * h,
            &(y + h * (A6[0] * k1 + A6[1] * k2 + A6[2] * k3 + A6[3] * k4 + A6[4] * k5)),
        );
        let y5 = y + h * (B5[0] * k1 + B5[2] * k3 + B5[3] * k4 + B5[4] * k5 + B5[5] * k6);
        let k7 = f(t + C[6] * h, &y5);
        let y4 = y + h
            * (B4[0] * k1 + B4[2] * k3 + B4[3] * k4 + B4[4] * k5 + B4[5] * k6 + B4[6] * k7);

        if !y5.iter().all(|x| x.is_finite()) {
            return Err(IntegrationError::NonFinite { t });
        }

        // Weighted RMS error against the mixed absolute/relative tolerance
        let mut err_sq = 0.0;
        for i in 0..y.len() {
            let scale = config.abs_tol + config.rel_tol * y[i].abs().max(y5[i].abs());
            let e = (y5[i] - y4[i]) / scale;
            err_sq += e * e;
        }
        let err_norm = (err_sq / y.len() as f64).sqrt();

        if err_norm <= 1.0 {
            t += h;
            y = y5;
        }

        let factor = if err_norm == 0.0 {
            MAX_FACTOR
        } else {
            (SAFETY * err_norm.powf(-0.2)).clamp(MIN_FACTOR, MAX_FACTOR)
        };
        h *= factor;
    }

    Ok(y)
}
