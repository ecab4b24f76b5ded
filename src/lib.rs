pub mod config;
pub mod control;
pub mod error;
pub mod model;
pub mod observer;
pub mod server;
pub mod sim;
pub mod utils;

pub use config::{LqrWeights, PhysicalParams, ScenarioConfig};
pub use control::{design_lqr, lqr_control, LqrDesign};
pub use error::{IntegrationError, SimError};
pub use model::{nonlinear_dynamics, Control, LinearModel, State};
pub use observer::{LogObserver, NullObserver, SimObserver};
pub use sim::{ClosedLoopSim, IntegratorConfig, PerformanceMetrics, Trajectory};
