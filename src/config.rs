use nalgebra::{SMatrix, SVector};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::SimError;
use crate::model::{Control, State, INPUT_DIM, STATE_DIM};

/// Physical constants of the rigid body, immutable per design or
/// simulation call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicalParams {
    /// Principal moment of inertia about the body x axis [kg m^2]
    pub ixx: f64,
    /// Principal moment of inertia about the body y axis [kg m^2]
    pub iyy: f64,
    /// Principal moment of inertia about the body z axis [kg m^2]
    pub izz: f64,
    /// Vehicle mass [kg]
    pub mass: f64,
    /// Gravitational acceleration [m/s^2]
    pub g: f64,
}

impl PhysicalParams {
    pub fn new(ixx: f64, iyy: f64, izz: f64, mass: f64, g: f64) -> Result<Self, SimError> {
        let params = Self {
            ixx,
            iyy,
            izz,
            mass,
            g,
        };
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<(), SimError> {
        for (name, value) in [
            ("Ixx", self.ixx),
            ("Iyy", self.iyy),
            ("Izz", self.izz),
            ("mass", self.mass),
            ("g", self.g),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(SimError::InvalidParameter(format!(
                    "{} must be positive and finite, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }

    /// Thrust that balances gravity at hover.
    pub fn hover_thrust(&self) -> f64 {
        self.mass * self.g
    }
}

impl Default for PhysicalParams {
    fn default() -> Self {
        Self {
            ixx: 0.0221,
            iyy: 0.0221,
            izz: 0.0366,
            mass: 1.0,
            g: 9.81,
        }
    }
}

/// LQR weight matrices. Q penalizes state deviation (PSD), R penalizes
/// control effort (PD, must be invertible).
#[derive(Debug, Clone, PartialEq)]
pub struct LqrWeights {
    pub q: SMatrix<f64, STATE_DIM, STATE_DIM>,
    pub r: SMatrix<f64, INPUT_DIM, INPUT_DIM>,
}

impl LqrWeights {
    pub fn new(
        q: SMatrix<f64, STATE_DIM, STATE_DIM>,
        r: SMatrix<f64, INPUT_DIM, INPUT_DIM>,
    ) -> Result<Self, SimError> {
        let weights = Self { q, r };
        weights.validate()?;
        Ok(weights)
    }

    /// Build diagonal weight matrices from slices of length 12 and 4.
    pub fn from_diagonals(q_diag: &[f64], r_diag: &[f64]) -> Result<Self, SimError> {
        if q_diag.len() != STATE_DIM {
            return Err(SimError::InvalidParameter(format!(
                "Q diagonal must have {} entries, got {}",
                STATE_DIM,
                q_diag.len()
            )));
        }
        if r_diag.len() != INPUT_DIM {
            return Err(SimError::InvalidParameter(format!(
                "R diagonal must have {} entries, got {}",
                INPUT_DIM,
                r_diag.len()
            )));
        }
        let q = SMatrix::from_diagonal(&SVector::<f64, STATE_DIM>::from_column_slice(q_diag));
        let r = SMatrix::from_diagonal(&SVector::<f64, INPUT_DIM>::from_column_slice(r_diag));
        Self::new(q, r)
    }

    pub fn validate(&self) -> Result<(), SimError> {
        if !self.q.iter().all(|x| x.is_finite()) || !self.r.iter().all(|x| x.is_finite()) {
            return Err(SimError::InvalidParameter(
                "Weight matrices must be finite".into(),
            ));
        }
        let tol = 1e-9;
        if (self.q - self.q.transpose()).abs().max() > tol {
            return Err(SimError::InvalidParameter("Q must be symmetric".into()));
        }
        if (self.r - self.r.transpose()).abs().max() > tol {
            return Err(SimError::InvalidParameter("R must be symmetric".into()));
        }
        // Invertibility of R is what the gain computation actually needs;
        // definiteness beyond that surfaces as a Riccati failure.
        if self.r.determinant().abs() < f64::EPSILON {
            return Err(SimError::InvalidParameter("R must be invertible".into()));
        }
        Ok(())
    }
}

impl Default for LqrWeights {
    fn default() -> Self {
        let q_diag = [10.0, 10.0, 10.0, 1.0, 1.0, 1.0, 10.0, 10.0, 10.0, 1.0, 1.0, 1.0];
        let r_diag = [1.0, 1.0, 1.0, 1.0];
        Self::from_diagonals(&q_diag, &r_diag).expect("default weights are well formed")
    }
}

/// A complete simulation scenario: plant parameters, cost weights, horizon
/// and initial condition, with an optional input disturbance.
///
/// Loadable from YAML; every field has the canonical hover default.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScenarioConfig {
    pub ixx: f64,
    pub iyy: f64,
    pub izz: f64,
    pub mass: f64,
    pub g: f64,
    /// Simulated time span [s]
    pub simulation_time: f64,
    /// Nominal step size [s]
    pub dt: f64,
    /// Initial state, 12 entries: [x, y, z, u, v, w, phi, theta, psi, p, q, r]
    pub initial_state: Vec<f64>,
    pub q_diag: Vec<f64>,
    pub r_diag: Vec<f64>,
    /// Simulated time at which the disturbance is injected [s]
    pub disturbance_time: Option<f64>,
    /// Input-space disturbance, 4 entries: [T, tau_x, tau_y, tau_z]
    pub disturbance: Option<Vec<f64>>,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        let params = PhysicalParams::default();
        Self {
            ixx: params.ixx,
            iyy: params.iyy,
            izz: params.izz,
            mass: params.mass,
            g: params.g,
            simulation_time: 15.0,
            dt: 0.01,
            initial_state: vec![0.0; STATE_DIM],
            q_diag: vec![10.0, 10.0, 10.0, 1.0, 1.0, 1.0, 10.0, 10.0, 10.0, 1.0, 1.0, 1.0],
            r_diag: vec![1.0, 1.0, 1.0, 1.0],
            disturbance_time: None,
            disturbance: None,
        }
    }
}

impl ScenarioConfig {
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self, SimError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    pub fn from_yaml_str(contents: &str) -> Result<Self, SimError> {
        let config: Self = serde_yaml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), SimError> {
        self.params()?;
        self.weights()?;
        self.initial_state()?;
        self.disturbance()?;
        if !(self.simulation_time.is_finite() && self.simulation_time > 0.0) {
            return Err(SimError::InvalidParameter(format!(
                "simulation_time must be positive, got {}",
                self.simulation_time
            )));
        }
        if !(self.dt.is_finite() && self.dt > 0.0) {
            return Err(SimError::InvalidParameter(format!(
                "dt must be positive, got {}",
                self.dt
            )));
        }
        Ok(())
    }

    pub fn params(&self) -> Result<PhysicalParams, SimError> {
        PhysicalParams::new(self.ixx, self.iyy, self.izz, self.mass, self.g)
    }

    pub fn weights(&self) -> Result<LqrWeights, SimError> {
        LqrWeights::from_diagonals(&self.q_diag, &self.r_diag)
    }

    pub fn initial_state(&self) -> Result<State, SimError> {
        if self.initial_state.len() != STATE_DIM {
            return Err(SimError::InvalidParameter(format!(
                "initial_state must have {} entries, got {}",
                STATE_DIM,
                self.initial_state.len()
            )));
        }
        Ok(State::from_column_slice(&self.initial_state))
    }

    /// The (time, vector) disturbance pair, if the scenario defines one.
    /// Both fields must be present together.
    pub fn disturbance(&self) -> Result<Option<(f64, Control)>, SimError> {
        match (self.disturbance_time, &self.disturbance) {
            (None, None) => Ok(None),
            (Some(time), Some(vector)) => {
                if !(time.is_finite() && time >= 0.0) {
                    return Err(SimError::InvalidParameter(format!(
                        "disturbance_time must be non-negative, got {}",
                        time
                    )));
                }
                if vector.len() != INPUT_DIM {
                    return Err(SimError::InvalidParameter(format!(
                        "disturbance must have {} entries, got {}",
                        INPUT_DIM,
                        vector.len()
                    )));
                }
                Ok(Some((time, Control::from_column_slice(vector))))
            }
            _ => Err(SimError::InvalidParameter(
                "disturbance_time and disturbance must be provided together".into(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_params_are_canonical() {
        let params = PhysicalParams::default();
        assert_eq!(params.ixx, 0.0221);
        assert_eq!(params.izz, 0.0366);
        assert_eq!(params.hover_thrust(), 9.81);
    }

    #[test]
    fn rejects_non_positive_mass() {
        assert!(PhysicalParams::new(0.0221, 0.0221, 0.0366, 0.0, 9.81).is_err());
        assert!(PhysicalParams::new(0.0221, -0.1, 0.0366, 1.0, 9.81).is_err());
    }

    #[test]
    fn rejects_wrong_diagonal_lengths() {
        assert!(LqrWeights::from_diagonals(&[1.0; 11], &[1.0; 4]).is_err());
        assert!(LqrWeights::from_diagonals(&[1.0; 12], &[1.0; 3]).is_err());
        assert!(LqrWeights::from_diagonals(&[1.0; 12], &[1.0; 4]).is_ok());
    }

    #[test]
    fn rejects_singular_r() {
        let result = LqrWeights::from_diagonals(&[1.0; 12], &[1.0, 1.0, 0.0, 1.0]);
        assert!(matches!(result, Err(SimError::InvalidParameter(_))));
    }

    #[test]
    fn scenario_yaml_round_trip() {
        let yaml = "
ixx: 0.03
simulation_time: 5.0
dt: 0.02
disturbance_time: 2.0
disturbance: [1.0, 0.0, 0.0, 0.0]
";
        let config = ScenarioConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.ixx, 0.03);
        // Unspecified fields keep the canonical defaults
        assert_eq!(config.izz, 0.0366);
        assert_eq!(config.initial_state.len(), 12);
        let (time, vector) = config.disturbance().unwrap().unwrap();
        assert_eq!(time, 2.0);
        assert_eq!(vector[0], 1.0);
    }

    #[test]
    fn scenario_rejects_lone_disturbance_time() {
        let config = ScenarioConfig {
            disturbance_time: Some(1.0),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
