mod dynamics;
mod linear;

pub use dynamics::nonlinear_dynamics;
pub use linear::LinearModel;

use nalgebra::{SMatrix, SVector};

/// System order of the rigid-body flight model.
pub const STATE_DIM: usize = 12;
/// Number of control channels: thrust plus three body torques.
pub const INPUT_DIM: usize = 4;

/// State vector [x, y, z, u, v, w, phi, theta, psi, p, q, r]: position,
/// body-frame linear velocity, Euler attitude, body-frame angular rate.
pub type State = SVector<f64, STATE_DIM>;

/// Control input vector [T, tau_x, tau_y, tau_z].
pub type Control = SVector<f64, INPUT_DIM>;

/// 12x12 state matrix.
pub type StateMatrix = SMatrix<f64, STATE_DIM, STATE_DIM>;

/// 12x4 input matrix.
pub type InputMatrix = SMatrix<f64, STATE_DIM, INPUT_DIM>;

/// 4x12 state-feedback gain.
pub type GainMatrix = SMatrix<f64, INPUT_DIM, STATE_DIM>;
