use crate::config::PhysicalParams;
use crate::model::{Control, State};

/// Full nonlinear state derivative of the rigid-body flight model.
///
/// Pure function of (t, state, u, params); the adaptive integrator calls it
/// several times per nominal step with trial states, so it must be freely
/// re-evaluable. Time is accepted for signature compatibility with the
/// integrator but the dynamics are autonomous.
///
/// The Euler-angle rate transform involves tan(theta) and is singular at
/// theta = +-90 deg (gimbal lock). That limitation is inherent to the
/// attitude representation and is deliberately not guarded here.
pub fn nonlinear_dynamics(_t: f64, state: &State, u: &Control, params: &PhysicalParams) -> State {
    let (u_vel, v_vel, w_vel) = (state[3], state[4], state[5]);
    let (phi, theta, _psi) = (state[6], state[7], state[8]);
    let (p, q, r) = (state[9], state[10], state[11]);

    let (thrust, tau_x, tau_y, tau_z) = (u[0], u[1], u[2], u[3]);

    let (ixx, iyy, izz) = (params.ixx, params.iyy, params.izz);
    let (mass, g) = (params.mass, params.g);

    let (sin_phi, cos_phi) = phi.sin_cos();
    let (sin_theta, cos_theta) = theta.sin_cos();
    let tan_theta = sin_theta / cos_theta;

    // Position derivatives
    let dx = u_vel;
    let dy = v_vel;
    let dz = w_vel;

    // Linear velocity derivatives: rotational cross terms, the gravity
    // projection, and thrust on the vertical channel
    let du = r * v_vel - q * w_vel + g * sin_theta;
    let dv = p * w_vel - r * u_vel - g * cos_theta * sin_phi;
    let dw = q * u_vel - p * v_vel - g * cos_theta * cos_phi + thrust / mass;

    // Euler-angle rate kinematics
    let dphi = p + q * sin_phi * tan_theta + r * cos_phi * tan_theta;
    let dtheta = q * cos_phi - r * sin_phi;
    let dpsi = q * sin_phi / cos_theta + r * cos_phi / cos_theta;

    // Rigid-body Euler equations with diagonal inertia
    let dp = (iyy - izz) * q * r / ixx + tau_x / ixx;
    let dq = (izz - ixx) * p * r / iyy + tau_y / iyy;
    let dr = (ixx - iyy) * p * q / izz + tau_z / izz;

    State::from_column_slice(&[dx, dy, dz, du, dv, dw, dphi, dtheta, dpsi, dp, dq, dr])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::math::rotation_matrix;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    #[test]
    fn hover_is_an_equilibrium() {
        let params = PhysicalParams::default();
        let state = State::zeros();
        let u = Control::new(params.hover_thrust(), 0.0, 0.0, 0.0);
        let derivative = nonlinear_dynamics(0.0, &state, &u, &params);
        assert_relative_eq!(derivative.norm(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn position_rate_equals_body_velocity() {
        let params = PhysicalParams::default();
        let mut state = State::zeros();
        state[3] = 1.5;
        state[4] = -0.7;
        state[5] = 0.3;
        let u = Control::new(params.hover_thrust(), 0.0, 0.0, 0.0);
        let derivative = nonlinear_dynamics(0.0, &state, &u, &params);
        assert_relative_eq!(derivative[0], 1.5);
        assert_relative_eq!(derivative[1], -0.7);
        assert_relative_eq!(derivative[2], 0.3);
    }

    #[test]
    fn gravity_terms_match_attitude_rotation() {
        // The velocity-derivative gravity terms are the inertial gravity
        // vector resolved into the body frame, negated.
        let params = PhysicalParams::default();
        let (phi, theta, psi) = (0.3, -0.2, 1.1);
        let mut state = State::zeros();
        state[6] = phi;
        state[7] = theta;
        state[8] = psi;
        let u = Control::new(0.0, 0.0, 0.0, 0.0);
        let derivative = nonlinear_dynamics(0.0, &state, &u, &params);

        let gravity_body = rotation_matrix(phi, theta, psi) * Vector3::new(0.0, 0.0, params.g);
        assert_relative_eq!(derivative[3], -gravity_body[0], epsilon = 1e-12);
        assert_relative_eq!(derivative[4], -gravity_body[1], epsilon = 1e-12);
        assert_relative_eq!(derivative[5], -gravity_body[2], epsilon = 1e-12);
    }

    #[test]
    fn gyroscopic_coupling_for_pure_spin() {
        let params = PhysicalParams::new(0.02, 0.03, 0.04, 1.0, 9.81).unwrap();
        let mut state = State::zeros();
        state[10] = 2.0; // q
        state[11] = -1.0; // r
        let u = Control::zeros();
        let derivative = nonlinear_dynamics(0.0, &state, &u, &params);
        // dp = (Iyy - Izz) q r / Ixx
        assert_relative_eq!(derivative[9], (0.03 - 0.04) * 2.0 * (-1.0) / 0.02);
        // p = 0 so the other two gyroscopic terms vanish
        assert_relative_eq!(derivative[10], 0.0);
        assert_relative_eq!(derivative[11], 0.0);
    }

    #[test]
    fn torque_scales_by_inverse_inertia() {
        let params = PhysicalParams::default();
        let state = State::zeros();
        let u = Control::new(params.hover_thrust(), 0.01, -0.02, 0.005);
        let derivative = nonlinear_dynamics(0.0, &state, &u, &params);
        assert_relative_eq!(derivative[9], 0.01 / params.ixx);
        assert_relative_eq!(derivative[10], -0.02 / params.iyy);
        assert_relative_eq!(derivative[11], 0.005 / params.izz);
    }
}
