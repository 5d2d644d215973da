//! # Error
//! Error types for the solver library

use crate::scattering::ScatteringTableError;
use boltzmann_mesher::MeshError;
use miette::Diagnostic;

#[derive(thiserror::Error, Debug, Diagnostic)]
/// Problems found while assembling the inputs of a calculation
pub enum BuildError {
    #[error(transparent)]
    Mesh(#[from] MeshError),
    #[error("{0}")]
    Shape(String),
    #[error("negative scattering rate {rate} for irreducible state {state}")]
    NegativeRate { state: usize, rate: f64 },
    #[error("a worker team needs at least one worker")]
    NoWorkers,
    #[error(transparent)]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

#[derive(thiserror::Error, Debug, Diagnostic)]
/// Physically inconsistent requests, fatal and never retried
pub enum ConfigurationError {
    #[error("the phonon chemical potential must be exactly zero, got {0}")]
    #[diagnostic(code(boltzmann::phonon_chemical_potential))]
    PhononChemicalPotential(f64),
    #[error("temperature must be positive, got {0}")]
    Temperature(f64),
    #[error("{0}")]
    Mode(String),
    #[error("the {species} mesh was reduced with {mesh} operations but the crystal has {crystal}")]
    PointGroup {
        species: crate::Species,
        mesh: usize,
        crystal: usize,
    },
}

#[derive(thiserror::Error, Debug, Diagnostic)]
/// Top level error of a transport calculation
pub enum SolverError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Build(#[from] BuildError),
    #[error(transparent)]
    #[diagnostic(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error(transparent)]
    #[diagnostic(transparent)]
    Scattering(#[from] ScatteringTableError),
    #[error(transparent)]
    Mesh(#[from] MeshError),
    #[error("{species} state with grid index {grid_index} is referenced by a scattering record but absent from the mesh")]
    UnknownState {
        species: crate::Species,
        grid_index: usize,
    },
}
