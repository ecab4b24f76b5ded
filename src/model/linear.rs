use serde::{Deserialize, Serialize};

use crate::config::PhysicalParams;
use crate::model::{InputMatrix, StateMatrix};

/// Linear state-space model (A, B) of the flight dynamics about hover
/// equilibrium. Derived once from [`PhysicalParams`], never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    pub a: StateMatrix,
    pub b: InputMatrix,
}

impl LinearModel {
    /// Assemble the small-angle hover linearization.
    ///
    /// The model is sparse: positions couple to their velocities, horizontal
    /// accelerations to pitch/roll through gravity, attitude angles to their
    /// body rates, vertical acceleration to thrust over mass, and each
    /// angular acceleration to its torque over the matching principal
    /// inertia. No other couplings exist at this operating point.
    pub fn from_params(params: &PhysicalParams) -> Self {
        let mut a = StateMatrix::zeros();
        let mut b = InputMatrix::zeros();

        // Position derivatives
        a[(0, 3)] = 1.0; // dx/dt = u
        a[(1, 4)] = 1.0; // dy/dt = v
        a[(2, 5)] = 1.0; // dz/dt = w

        // Velocity derivatives through the gravity projection
        a[(3, 7)] = params.g; // du/dt = g * theta
        a[(4, 6)] = -params.g; // dv/dt = -g * phi

        // Attitude derivatives
        a[(6, 9)] = 1.0; // dphi/dt = p
        a[(7, 10)] = 1.0; // dtheta/dt = q
        a[(8, 11)] = 1.0; // dpsi/dt = r

        // Control couplings
        b[(5, 0)] = 1.0 / params.mass; // dw/dt = T / m
        b[(9, 1)] = 1.0 / params.ixx; // dp/dt = tau_x / Ixx
        b[(10, 2)] = 1.0 / params.iyy; // dq/dt = tau_y / Iyy
        b[(11, 3)] = 1.0 / params.izz; // dr/dt = tau_z / Izz

        Self { a, b }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn canonical_model_structure() {
        let params = PhysicalParams::default();
        let model = LinearModel::from_params(&params);

        assert_relative_eq!(model.a[(0, 3)], 1.0);
        assert_relative_eq!(model.a[(3, 7)], 9.81);
        assert_relative_eq!(model.a[(4, 6)], -9.81);
        assert_relative_eq!(model.a[(8, 11)], 1.0);
        assert_relative_eq!(model.b[(5, 0)], 1.0);
        assert_relative_eq!(model.b[(9, 1)], 1.0 / 0.0221);
        assert_relative_eq!(model.b[(11, 3)], 1.0 / 0.0366);
    }

    #[test]
    fn no_extra_couplings() {
        let model = LinearModel::from_params(&PhysicalParams::default());
        let a_nonzero = model.a.iter().filter(|x| **x != 0.0).count();
        let b_nonzero = model.b.iter().filter(|x| **x != 0.0).count();
        assert_eq!(a_nonzero, 8);
        assert_eq!(b_nonzero, 4);
    }
}
