//! # Outer loop
//!
//! Drives a transport calculation from the relaxation-time approximation to a converged
//! (or iteration-capped) solution of the linearised BTE. In the coupled mode every outer
//! pass sweeps the phonons once and then runs the electron loop to convergence at fixed
//! phonon responses, before restoring the Kelvin–Onsager relation between the phonon-drag
//! Seebeck and Peltier coefficients.

mod convergence;
mod methods;
mod onsager;

pub use convergence::{Convergence, LoopStatus};
pub use onsager::{electron_part, enforce_kelvin_onsager, DragScaling};

pub(crate) use convergence::{iterate_to_convergence, ScalarSet};

use crate::{
    parallel::WorkerTeam,
    postprocessor::{ElectronScalars, PhononScalars, TransportTensors},
    Crystal, FieldPair, Particle, ResponseFunction, RtaRates, Species,
};
use boltzmann_mesher::Grid;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Builder struct for the outer loop
pub struct OuterLoopBuilder<RefConvergenceSettings, RefCrystal, RefTeam, RefTables, RefAggregator>
{
    convergence_settings: RefConvergenceSettings,
    crystal: RefCrystal,
    team: RefTeam,
    tables: RefTables,
    aggregator: RefAggregator,
}

impl OuterLoopBuilder<(), (), (), (), ()> {
    /// Initialise an empty OuterLoopBuilder
    pub fn new() -> Self {
        Self {
            convergence_settings: (),
            crystal: (),
            team: (),
            tables: (),
            aggregator: (),
        }
    }
}

impl Default for OuterLoopBuilder<(), (), (), (), ()> {
    fn default() -> Self {
        Self::new()
    }
}

impl<RefConvergenceSettings, RefCrystal, RefTeam, RefTables, RefAggregator>
    OuterLoopBuilder<RefConvergenceSettings, RefCrystal, RefTeam, RefTables, RefAggregator>
{
    /// Attach convergence information for the inner and outer loop
    pub fn with_convergence_settings<ConvergenceSettings>(
        self,
        convergence_settings: &ConvergenceSettings,
    ) -> OuterLoopBuilder<&ConvergenceSettings, RefCrystal, RefTeam, RefTables, RefAggregator> {
        OuterLoopBuilder {
            convergence_settings,
            crystal: self.crystal,
            team: self.team,
            tables: self.tables,
            aggregator: self.aggregator,
        }
    }

    /// Attach the crystal whose point group both meshes were reduced with
    pub fn with_crystal<Crystal>(
        self,
        crystal: &Crystal,
    ) -> OuterLoopBuilder<RefConvergenceSettings, &Crystal, RefTeam, RefTables, RefAggregator> {
        OuterLoopBuilder {
            convergence_settings: self.convergence_settings,
            crystal,
            team: self.team,
            tables: self.tables,
            aggregator: self.aggregator,
        }
    }

    pub fn with_team<Team>(
        self,
        team: &Team,
    ) -> OuterLoopBuilder<RefConvergenceSettings, RefCrystal, &Team, RefTables, RefAggregator> {
        OuterLoopBuilder {
            convergence_settings: self.convergence_settings,
            crystal: self.crystal,
            team,
            tables: self.tables,
            aggregator: self.aggregator,
        }
    }

    /// Attach the provider of scattering records
    pub fn with_tables<Tables>(
        self,
        tables: &Tables,
    ) -> OuterLoopBuilder<RefConvergenceSettings, RefCrystal, RefTeam, &Tables, RefAggregator> {
        OuterLoopBuilder {
            convergence_settings: self.convergence_settings,
            crystal: self.crystal,
            team: self.team,
            tables,
            aggregator: self.aggregator,
        }
    }

    /// Attach the aggregator turning responses into transport tensors
    pub fn with_aggregator<Aggregator>(
        self,
        aggregator: &Aggregator,
    ) -> OuterLoopBuilder<RefConvergenceSettings, RefCrystal, RefTeam, RefTables, &Aggregator> {
        OuterLoopBuilder {
            convergence_settings: self.convergence_settings,
            crystal: self.crystal,
            team: self.team,
            tables: self.tables,
            aggregator,
        }
    }
}

impl<'a, S, A> OuterLoopBuilder<&'a Convergence, &'a Crystal, &'a WorkerTeam, &'a S, &'a A> {
    pub fn build(self) -> OuterLoop<'a, S, A> {
        OuterLoop {
            convergence_settings: self.convergence_settings,
            crystal: self.crystal,
            team: self.team,
            tables: self.tables,
            aggregator: self.aggregator,
        }
    }
}

/// The solver context shared by every temperature of a run
#[derive(Debug)]
pub struct OuterLoop<'a, S, A> {
    convergence_settings: &'a Convergence,
    crystal: &'a Crystal,
    team: &'a WorkerTeam,
    tables: &'a S,
    aggregator: &'a A,
}

/// A species and the scattering-rate channels summed into its RTA rates
#[derive(Clone, Copy, Debug)]
pub struct SpeciesInput<'a> {
    pub particle: &'a Particle,
    /// Each of shape `(irreducible points, bands)`
    pub rate_channels: &'a [Array2<f64>],
}

/// Which subsystems are solved
#[derive(Clone, Copy, Debug)]
pub enum Mode<'a> {
    Phonon(SpeciesInput<'a>),
    Electron(SpeciesInput<'a>),
    CoupledDrag {
        phonon: SpeciesInput<'a>,
        electron: SpeciesInput<'a>,
        /// Grid of the interpolated phonon references in the electron tables
        fine_grid: &'a Grid,
    },
}

/// Final state of one species
#[derive(Clone, Debug)]
pub struct SpeciesSolution {
    pub species: Species,
    pub rates: RtaRates,
    pub field_terms: FieldPair<ResponseFunction>,
    pub responses: FieldPair<ResponseFunction>,
    pub tensors: FieldPair<TransportTensors>,
}

/// Diagnostics of one outer pass, iteration zero being the RTA
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct IterationRecord {
    pub iteration: usize,
    pub phonon: Option<PhononScalars>,
    pub electron: Option<ElectronScalars>,
    /// Kelvin–Onsager violation in percent
    pub deviation: Option<f64>,
    pub drag_scaling: Option<DragScaling>,
}

#[derive(Clone, Debug)]
pub struct Solution {
    pub status: LoopStatus,
    pub history: Vec<IterationRecord>,
    pub phonon: Option<SpeciesSolution>,
    pub electron: Option<SpeciesSolution>,
}
