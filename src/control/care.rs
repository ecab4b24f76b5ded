use nalgebra::DMatrix;

use crate::error::SimError;

const MAX_SIGN_ITERATIONS: usize = 100;
const SIGN_TOL: f64 = 1e-10;
const RESIDUAL_TOL: f64 = 1e-6;

/// Stabilizing solution of a continuous algebraic Riccati equation,
/// with convergence diagnostics.
#[derive(Debug, Clone)]
pub struct CareSolution {
    /// Symmetric positive-definite solution P.
    pub p: DMatrix<f64>,
    /// Sign iterations taken to converge.
    pub iterations: usize,
    /// Frobenius norm of the Riccati residual A'P + PA - PGP + Q.
    pub residual: f64,
}

/// Solve A'P + PA - P B R^-1 B' P + Q = 0 for the unique stabilizing
/// symmetric solution P.
///
/// Uses the matrix sign function of the 2n x 2n Hamiltonian, computed by a
/// Newton iteration with determinant scaling, followed by extraction of the
/// stable invariant subspace through an SVD least-squares solve. Fails with
/// [`SimError::RiccatiSolve`] when no stabilizing solution exists (the
/// residual check rejects the candidate) or the iteration does not
/// converge.
pub fn solve_care(
    a: &DMatrix<f64>,
    b: &DMatrix<f64>,
    q: &DMatrix<f64>,
    r: &DMatrix<f64>,
) -> Result<CareSolution, SimError> {
    let n = a.nrows();
    if a.ncols() != n || b.nrows() != n || q.shape() != (n, n) || r.shape() != (b.ncols(), b.ncols())
    {
        return Err(SimError::InvalidParameter(format!(
            "Dimension mismatch: A {:?}, B {:?}, Q {:?}, R {:?}",
            a.shape(),
            b.shape(),
            q.shape(),
            r.shape()
        )));
    }

    let r_inv = r
        .clone()
        .try_inverse()
        .ok_or_else(|| SimError::InvalidParameter("R is not invertible".into()))?;
    let g = b * &r_inv * b.transpose();

    // Hamiltonian H = [A, -G; -Q, -A']
    let m = 2 * n;
    let mut h = DMatrix::zeros(m, m);
    h.view_mut((0, 0), (n, n)).copy_from(a);
    h.view_mut((0, n), (n, n)).copy_from(&(-&g));
    h.view_mut((n, 0), (n, n)).copy_from(&(-q));
    h.view_mut((n, n), (n, n)).copy_from(&(-a.transpose()));

    // Newton iteration for sign(H): Z <- (mu Z + (mu Z)^-1) / 2, with
    // determinant scaling mu = |det Z|^(-1/2n) to accelerate convergence.
    let mut z = h;
    let mut iterations = 0;
    let mut converged = false;
    while iterations < MAX_SIGN_ITERATIONS {
        let det = z.determinant();
        if !det.is_finite() || det == 0.0 {
            return Err(SimError::RiccatiSolve(
                "Hamiltonian sign iterate is singular; system may not be stabilizable".into(),
            ));
        }
        let mu = det.abs().powf(-1.0 / m as f64);
        let z_scaled = &z * mu;
        let z_inv = z_scaled.clone().try_inverse().ok_or_else(|| {
            SimError::RiccatiSolve("Hamiltonian sign iterate is not invertible".into())
        })?;
        let z_next = 0.5 * (&z_scaled + &z_inv);
        let delta = (&z_next - &z).norm();
        let tol = SIGN_TOL * z_next.norm().max(1.0);
        z = z_next;
        iterations += 1;
        if delta <= tol {
            converged = true;
            break;
        }
    }
    if !converged {
        return Err(SimError::RiccatiSolve(format!(
            "Sign iteration did not converge within {} iterations",
            MAX_SIGN_ITERATIONS
        )));
    }

    // With S = sign(H) the stabilizing solution satisfies
    //   S12' P = S22' - I  and  (S11 - I)' P = S21',
    // a stacked 2n x n least-squares problem in P.
    let s11 = z.view((0, 0), (n, n));
    let s12 = z.view((0, n), (n, n));
    let s21 = z.view((n, 0), (n, n));
    let s22 = z.view((n, n), (n, n));

    let identity = DMatrix::<f64>::identity(n, n);
    let mut lhs = DMatrix::zeros(m, n);
    lhs.view_mut((0, 0), (n, n)).copy_from(&s12.transpose());
    lhs.view_mut((n, 0), (n, n))
        .copy_from(&(s11.transpose() - &identity));
    let mut rhs = DMatrix::zeros(m, n);
    rhs.view_mut((0, 0), (n, n))
        .copy_from(&(s22.transpose() - &identity));
    rhs.view_mut((n, 0), (n, n)).copy_from(&s21.transpose());

    let svd = lhs.svd(true, true);
    let p = svd
        .solve(&rhs, f64::EPSILON)
        .map_err(|e| SimError::RiccatiSolve(e.to_string()))?;

    // Symmetrize before validating; the subspace extraction leaves
    // asymmetry on the order of the iteration tolerance.
    let p = 0.5 * (&p + &p.transpose());
    if !p.iter().all(|x| x.is_finite()) {
        return Err(SimError::RiccatiSolve(
            "Riccati solution contains non-finite entries".into(),
        ));
    }

    let residual = (a.transpose() * &p + &p * a - &p * &g * &p + q).norm();
    if residual > RESIDUAL_TOL * (1.0 + p.norm()) {
        return Err(SimError::RiccatiSolve(format!(
            "No stabilizing solution found: residual {:.3e}",
            residual
        )));
    }

    Ok(CareSolution {
        p,
        iterations,
        residual,
    })
}
