use crate::error::IntegrationError;

/// Observer interface for non-fatal events from the designer and the
/// simulation engine.
///
/// Passed explicitly into each component instead of relying on ambient
/// global logging state, so callers decide where diagnostics go.
pub trait SimObserver {
    /// Controllability rank fell short of the system order. The design
    /// proceeds regardless; the Riccati solve may still succeed on the
    /// controllable subspace.
    fn uncontrollable_system(&self, rank: usize, order: usize) {
        let _ = (rank, order);
    }

    /// Riccati sign iteration converged.
    fn riccati_converged(&self, iterations: usize, residual: f64) {
        let _ = (iterations, residual);
    }

    /// Adaptive integration failed for one step; the engine substitutes a
    /// linear explicit-Euler step and continues.
    fn integration_fallback(&self, t: f64, error: &IntegrationError) {
        let _ = (t, error);
    }

    /// The configured disturbance was added to the control input.
    fn disturbance_applied(&self, t: f64) {
        let _ = t;
    }
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl SimObserver for NullObserver {}

/// Forwards events to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl SimObserver for LogObserver {
    fn uncontrollable_system(&self, rank: usize, order: usize) {
        log::warn!(
            "System is not controllable: rank {} < order {}",
            rank,
            order
        );
    }

    fn riccati_converged(&self, iterations: usize, residual: f64) {
        log::debug!(
            "Riccati sign iteration converged after {} iterations, residual {:.3e}",
            iterations,
            residual
        );
    }

    fn integration_fallback(&self, t: f64, error: &IntegrationError) {
        log::warn!(
            "Integration failed at t = {:.4}: {}; falling back to linear Euler step",
            t,
            error
        );
    }

    fn disturbance_applied(&self, t: f64) {
        log::info!("Applying disturbance at t = {:.4}", t);
    }
}
