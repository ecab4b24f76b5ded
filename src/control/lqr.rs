use nalgebra::{Complex, DMatrix};

use crate::config::LqrWeights;
use crate::control::care::{solve_care, CareSolution};
use crate::error::SimError;
use crate::model::{Control, GainMatrix, InputMatrix, LinearModel, State, StateMatrix, STATE_DIM};
use crate::observer::SimObserver;

/// Result of an LQR design call.
#[derive(Debug, Clone)]
pub struct LqrDesign {
    /// State-feedback gain K = R^-1 B' P, shape 4 x 12.
    pub k: GainMatrix,
    /// Riccati solution P.
    pub p: StateMatrix,
}

/// Controllability matrix [B, AB, A^2 B, ..., A^(n-1) B], shape 12 x 48.
pub fn controllability_matrix(a: &StateMatrix, b: &InputMatrix) -> DMatrix<f64> {
    let n = STATE_DIM;
    let input_dim = b.ncols();
    let mut ctrb = DMatrix::zeros(n, n * input_dim);
    let mut block = *b;
    for i in 0..n {
        ctrb.view_mut((0, i * input_dim), (n, input_dim))
            .copy_from(&block);
        block = a * block;
    }
    ctrb
}

/// Numerical rank of the controllability matrix, using the usual
/// singular-value tolerance max_dim * sigma_max * machine epsilon.
pub fn controllability_rank(a: &StateMatrix, b: &InputMatrix) -> usize {
    let ctrb = controllability_matrix(a, b);
    let max_dim = ctrb.nrows().max(ctrb.ncols()) as f64;
    let singular_values = ctrb.singular_values();
    let tol = max_dim * singular_values[0] * f64::EPSILON;
    singular_values.iter().filter(|sv| **sv > tol).count()
}

/// Design an LQR state-feedback gain for the given linear model.
///
/// A controllability deficiency is reported through the observer but does
/// not abort the design; the Riccati solve itself decides whether a
/// stabilizing solution exists. Riccati failure is fatal and propagated.
pub fn design_lqr(
    model: &LinearModel,
    weights: &LqrWeights,
    observer: &dyn SimObserver,
) -> Result<LqrDesign, SimError> {
    weights.validate()?;

    let rank = controllability_rank(&model.a, &model.b);
    if rank < STATE_DIM {
        observer.uncontrollable_system(rank, STATE_DIM);
    }

    let a = DMatrix::from_column_slice(STATE_DIM, STATE_DIM, model.a.as_slice());
    let b = DMatrix::from_column_slice(STATE_DIM, model.b.ncols(), model.b.as_slice());
    let q = DMatrix::from_column_slice(STATE_DIM, STATE_DIM, weights.q.as_slice());
    let r = DMatrix::from_column_slice(weights.r.nrows(), weights.r.ncols(), weights.r.as_slice());

    let CareSolution {
        p,
        iterations,
        residual,
    } = solve_care(&a, &b, &q, &r)?;
    observer.riccati_converged(iterations, residual);

    let r_inv = r
        .try_inverse()
        .ok_or_else(|| SimError::InvalidParameter("R is not invertible".into()))?;
    let k = r_inv * b.transpose() * &p;

    Ok(LqrDesign {
        k: GainMatrix::from_column_slice(k.as_slice()),
        p: StateMatrix::from_column_slice(p.as_slice()),
    })
}

/// Feedback law u = -K (state - reference). Pure; never fails for
/// well-formed inputs.
pub fn lqr_control(state: &State, reference: &State, k: &GainMatrix) -> Control {
    -(k * (state - reference))
}

/// Eigenvalues of the closed-loop matrix A - B K.
pub fn closed_loop_eigenvalues(model: &LinearModel, k: &GainMatrix) -> Vec<Complex<f64>> {
    let a_closed = model.a - model.b * k;
    let a_closed = DMatrix::from_column_slice(STATE_DIM, STATE_DIM, a_closed.as_slice());
    a_closed.complex_eigenvalues().iter().copied().collect()
}
