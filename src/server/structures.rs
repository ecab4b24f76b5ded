use serde::{Deserialize, Serialize};

use crate::config::ScenarioConfig;
use crate::error::SimError;
use crate::model::GainMatrix;
use crate::sim::{PerformanceMetrics, Trajectory};

/// Commands accepted over the wire.
#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub enum Command {
    /// Run a simulation; any omitted field keeps its default.
    RunSimulation {
        #[serde(default)]
        request: SimulationRequest,
    },
    /// Close the connection.
    Close,
}

/// Per-request parameter overrides, merged over [`ScenarioConfig::default`].
/// Q and R are accepted as diagonals only.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationRequest {
    pub ixx: Option<f64>,
    pub iyy: Option<f64>,
    pub izz: Option<f64>,
    pub mass: Option<f64>,
    pub g: Option<f64>,
    pub simulation_time: Option<f64>,
    pub dt: Option<f64>,
    pub initial_state: Option<Vec<f64>>,
    pub q_diag: Option<Vec<f64>>,
    pub r_diag: Option<Vec<f64>>,
    pub disturbance_time: Option<f64>,
    pub disturbance: Option<Vec<f64>>,
}

impl SimulationRequest {
    /// Merge the provided overrides into a scenario. Validation happens on
    /// the merged scenario, not here.
    pub fn merge_into(&self, config: &mut ScenarioConfig) {
        if let Some(ixx) = self.ixx {
            config.ixx = ixx;
        }
        if let Some(iyy) = self.iyy {
            config.iyy = iyy;
        }
        if let Some(izz) = self.izz {
            config.izz = izz;
        }
        if let Some(mass) = self.mass {
            config.mass = mass;
        }
        if let Some(g) = self.g {
            config.g = g;
        }
        if let Some(simulation_time) = self.simulation_time {
            config.simulation_time = simulation_time;
        }
        if let Some(dt) = self.dt {
            config.dt = dt;
        }
        if let Some(initial_state) = &self.initial_state {
            config.initial_state = initial_state.clone();
        }
        if let Some(q_diag) = &self.q_diag {
            config.q_diag = q_diag.clone();
        }
        if let Some(r_diag) = &self.r_diag {
            config.r_diag = r_diag.clone();
        }
        if let Some(disturbance_time) = self.disturbance_time {
            config.disturbance_time = Some(disturbance_time);
        }
        if let Some(disturbance) = &self.disturbance {
            config.disturbance = Some(disturbance.clone());
        }
    }
}

/// Serialized simulation output: the five trajectory sequences, the gain
/// matrix (row major), and the performance summary.
#[derive(Debug, Serialize, Deserialize)]
pub struct SimulationResult {
    pub time: Vec<f64>,
    pub states: Vec<Vec<f64>>,
    pub inputs: Vec<Vec<f64>>,
    pub reference: Vec<Vec<f64>>,
    pub error: Vec<Vec<f64>>,
    pub k: Vec<Vec<f64>>,
    pub metrics: PerformanceMetrics,
}

impl SimulationResult {
    pub fn new(trajectory: &Trajectory, k: &GainMatrix) -> Self {
        Self {
            time: trajectory.time.clone(),
            states: to_rows(&trajectory.states),
            inputs: to_rows(&trajectory.inputs),
            reference: to_rows(&trajectory.reference),
            error: to_rows(&trajectory.error),
            k: (0..k.nrows())
                .map(|i| k.row(i).iter().copied().collect())
                .collect(),
            metrics: PerformanceMetrics::from_trajectory(trajectory),
        }
    }
}

fn to_rows<const N: usize>(vectors: &[nalgebra::SVector<f64, N>]) -> Vec<Vec<f64>> {
    vectors
        .iter()
        .map(|v| v.iter().copied().collect())
        .collect()
}

/// Structured failure payload; the server never lets a core error escape
/// as anything but this.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub kind: String,
    pub message: String,
}

/// Wire response for one command.
#[derive(Debug, Serialize, Deserialize)]
pub struct Response {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<SimulationResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorPayload>,
}

impl Response {
    pub fn ok(result: SimulationResult) -> Self {
        Self {
            success: true,
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(error: &SimError) -> Self {
        Self {
            success: false,
            result: None,
            error: Some(ErrorPayload {
                kind: error.kind().to_string(),
                message: error.to_string(),
            }),
        }
    }
}
