use serde::{Deserialize, Serialize};

use crate::sim::engine::Trajectory;

/// Post-hoc performance summary of a closed-loop run. Consumes the
/// trajectory read-only; imposes no contract back onto the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    /// First time the position error norm drops below 2% of its peak;
    /// `None` if the threshold is never reached.
    pub settling_time: Option<f64>,
    pub max_position_error: f64,
    pub rmse_position: f64,
    /// Integral of absolute position error (trapezoidal).
    pub iae_position: f64,
    pub max_control_effort: f64,
    /// Integral of the squared input norm (trapezoidal).
    pub control_energy: f64,
    pub rmse_orientation: f64,
    pub max_orientation_error: f64,
}

impl PerformanceMetrics {
    pub fn from_trajectory(trajectory: &Trajectory) -> Self {
        let position_error: Vec<f64> = trajectory
            .error
            .iter()
            .map(|e| e.fixed_rows::<3>(0).norm())
            .collect();
        let orientation_error: Vec<f64> = trajectory
            .error
            .iter()
            .map(|e| e.fixed_rows::<3>(6).norm())
            .collect();
        let input_norms: Vec<f64> = trajectory.inputs.iter().map(|u| u.norm()).collect();
        let input_norms_sq: Vec<f64> = trajectory.inputs.iter().map(|u| u.norm_squared()).collect();

        let max_position_error = position_error.iter().copied().fold(0.0, f64::max);
        let threshold = 0.02 * max_position_error;
        let settling_time = position_error
            .iter()
            .position(|e| *e < threshold)
            .map(|i| trajectory.time[i]);

        Self {
            settling_time,
            max_position_error,
            rmse_position: rms(&position_error),
            iae_position: trapezoid(&position_error, &trajectory.time),
            max_control_effort: input_norms.iter().copied().fold(0.0, f64::max),
            control_energy: trapezoid(&input_norms_sq, &trajectory.time),
            rmse_orientation: rms(&orientation_error),
            max_orientation_error: orientation_error.iter().copied().fold(0.0, f64::max),
        }
    }
}

fn rms(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    (values.iter().map(|v| v * v).sum::<f64>() / values.len() as f64).sqrt()
}

fn trapezoid(values: &[f64], time: &[f64]) -> f64 {
    values
        .windows(2)
        .zip(time.windows(2))
        .map(|(v, t)| 0.5 * (v[0] + v[1]) * (t[1] - t[0]))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Control, State};
    use approx::assert_relative_eq;

    fn synthetic_trajectory() -> Trajectory {
        // Position error decays 1.0 -> 0.5 -> 0.0 along x; constant unit thrust
        let mut states = Vec::new();
        for value in [1.0, 0.5, 0.0] {
            let mut state = State::zeros();
            state[0] = value;
            states.push(state);
        }
        Trajectory {
            time: vec![0.0, 1.0, 2.0],
            error: states.clone(),
            states,
            inputs: vec![Control::new(1.0, 0.0, 0.0, 0.0); 3],
            reference: vec![State::zeros(); 3],
        }
    }

    #[test]
    fn metrics_on_synthetic_decay() {
        let metrics = PerformanceMetrics::from_trajectory(&synthetic_trajectory());
        assert_relative_eq!(metrics.max_position_error, 1.0);
        // Settles when the error drops below 0.02 * 1.0, i.e. at the last sample
        assert_eq!(metrics.settling_time, Some(2.0));
        // Trapezoid over [1.0, 0.5, 0.0] with unit spacing
        assert_relative_eq!(metrics.iae_position, 1.0);
        assert_relative_eq!(metrics.rmse_position, (1.25_f64 / 3.0).sqrt());
        assert_relative_eq!(metrics.max_control_effort, 1.0);
        assert_relative_eq!(metrics.control_energy, 2.0);
        assert_relative_eq!(metrics.rmse_orientation, 0.0);
    }

    #[test]
    fn settling_time_is_none_when_error_never_drops() {
        let mut trajectory = synthetic_trajectory();
        for error in &mut trajectory.error {
            error[0] = 1.0;
        }
        let metrics = PerformanceMetrics::from_trajectory(&trajectory);
        assert_eq!(metrics.settling_time, None);
    }
}
