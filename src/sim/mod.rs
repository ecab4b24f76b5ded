mod engine;
mod integrator;
mod metrics;

pub use engine::{ClosedLoopSim, Trajectory};
pub use integrator::{integrate_interval, IntegratorConfig};
pub use metrics::PerformanceMetrics;
