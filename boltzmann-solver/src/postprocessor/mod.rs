//! # Postprocessor
//!
//! Integrates response functions over the Brillouin zone into transport tensors and
//! reduces the tensors to the scalars tracked by the convergence loops.

mod integrator;
mod scalars;

pub use integrator::BoltzmannIntegrator;
pub use scalars::{deviation, trace_average, ElectronScalars, PhononScalars};

use crate::{Field, Particle, ResponseFunction, SolverError};
use nalgebra::Matrix3;
use serde::{Deserialize, Serialize};

/// Heat- and charge-current responses of one species to one field
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransportTensors {
    pub heat: Matrix3<f64>,
    pub charge: Matrix3<f64>,
}

/// Turns a response function into transport tensors
pub trait TransportAggregator: Sync {
    fn integrate(
        &self,
        particle: &Particle,
        field: Field,
        response: &ResponseFunction,
        temperature: f64,
    ) -> Result<TransportTensors, SolverError>;
}
