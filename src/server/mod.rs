mod structures;

pub use structures::{Command, ErrorPayload, Response, SimulationRequest, SimulationResult};

use crate::config::ScenarioConfig;
use crate::control::design_lqr;
use crate::error::SimError;
use crate::model::LinearModel;
use crate::observer::SimObserver;
use crate::sim::ClosedLoopSim;

/// Execute one request end to end: merge overrides over the defaults,
/// linearize, design the gain, simulate, and package the result.
pub fn run_request(
    request: &SimulationRequest,
    observer: &dyn SimObserver,
) -> Result<SimulationResult, SimError> {
    let mut config = ScenarioConfig::default();
    request.merge_into(&mut config);
    config.validate()?;

    let params = config.params()?;
    let model = LinearModel::from_params(&params);
    let design = design_lqr(&model, &config.weights()?, observer)?;

    let sim = ClosedLoopSim::new(model, design.k, params, observer);
    let initial_state = config.initial_state()?;
    let trajectory = match config.disturbance()? {
        Some((time, vector)) => sim.run_with_disturbance(
            &initial_state,
            config.simulation_time,
            config.dt,
            time,
            &vector,
        )?,
        None => sim.run(&initial_state, config.simulation_time, config.dt, None)?,
    };

    Ok(SimulationResult::new(&trajectory, &design.k))
}

/// Handle one wire command, converting any core failure into a structured
/// error payload. `Close` is answered with an empty success; the connection
/// loop decides to stop on it.
pub fn handle_command(command: &Command, observer: &dyn SimObserver) -> Response {
    match command {
        Command::RunSimulation { request } => match run_request(request, observer) {
            Ok(result) => Response::ok(result),
            Err(error) => Response::failure(&error),
        },
        Command::Close => Response {
            success: true,
            result: None,
            error: None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::NullObserver;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_produce_a_full_length_result() {
        let request = SimulationRequest {
            simulation_time: Some(1.0),
            ..Default::default()
        };
        let result = run_request(&request, &NullObserver).unwrap();
        assert_eq!(result.time.len(), 100);
        assert_eq!(result.states.len(), 100);
        assert_eq!(result.states[0].len(), 12);
        assert_eq!(result.k.len(), 4);
        assert_eq!(result.k[0].len(), 12);
    }

    #[test]
    fn overrides_are_merged_over_defaults() {
        let request = SimulationRequest {
            mass: Some(2.0),
            q_diag: Some(vec![1.0; 12]),
            ..Default::default()
        };
        let mut config = ScenarioConfig::default();
        request.merge_into(&mut config);
        assert_eq!(config.mass, 2.0);
        assert_eq!(config.q_diag, vec![1.0; 12]);
        // Untouched fields keep the canonical defaults
        assert_eq!(config.izz, 0.0366);
        assert_eq!(config.dt, 0.01);
    }

    #[test]
    fn invalid_request_becomes_structured_error() {
        let request = SimulationRequest {
            q_diag: Some(vec![1.0; 3]),
            simulation_time: Some(1.0),
            ..Default::default()
        };
        let command = Command::RunSimulation { request };
        let response = handle_command(&command, &NullObserver);
        assert!(!response.success);
        let payload = response.error.unwrap();
        assert_eq!(payload.kind, "invalid_parameter");
    }

    #[test]
    fn command_round_trips_through_json() {
        let json = r#"{"RunSimulation":{"request":{"mass":1.5,"dt":0.02}}}"#;
        let command: Command = serde_json::from_str(json).unwrap();
        match &command {
            Command::RunSimulation { request } => {
                assert_eq!(request.mass, Some(1.5));
                assert_eq!(request.dt, Some(0.02));
                assert_eq!(request.ixx, None);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
