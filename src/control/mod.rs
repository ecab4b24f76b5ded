mod care;
mod lqr;

pub use care::{solve_care, CareSolution};
pub use lqr::{
    closed_loop_eigenvalues, controllability_matrix, controllability_rank, design_lqr,
    lqr_control, LqrDesign,
};
