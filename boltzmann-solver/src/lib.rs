// Copyright 2022 Chris Gubbin
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Boltzmann-solver is an iterative solver for the coupled electron–phonon Boltzmann
//! transport equation written in Rust
//!
//! # Overview
//! The linearised BTE is solved for the response functions `F` of phonons and electrons
//! to a temperature gradient and an electric field. Starting from the relaxation-time
//! approximation, the scattering integral is iterated to self-consistency. Three-phonon
//! and electron–phonon processes enter through precomputed transition records, and the
//! phonon-drag contribution is coupled between both species in a nested loop, with the
//! phonon loop on the outside.
//!
//! Responses are stored over the full Brillouin zone while the work is distributed over
//! the irreducible states of each species. Every sweep is projected back onto the
//! invariant subspace of the crystal point group.
//!
//! # Usage
//! Boltzmann-solver is distributed as a binary crate, and is intended to be run from the
//! command line with a directory holding a `system.toml` description:
//!
//! ```toml
//! volume = 1.0
//! symmetry = "inversion"
//! temperatures = [300.0]
//!
//! [phonon]
//! grid = [8, 8, 8]
//! energies = "phonon_energies.txt"
//! velocities = "phonon_velocities.txt"
//! rate_channels = ["phonon_rates.txt"]
//! ```
//!
//! where an `[electron]` section of the same form adds the electronic subsystem.

#![allow(clippy::type_complexity)]

/// The command line global application, tracing and output
pub mod app;

/// Physical constants
pub mod constants;

/// Error handling
mod error;

/// Field terms, the relaxation-time responses
pub mod field_term;

/// The electron loop, run at fixed phonon responses
mod inner_loop;

/// Jacobi sweeps of the scattering integral
pub mod iteration;

/// The outer loop, which drives the phonon sweeps, the electron loop and the drag consistency
pub mod outer_loop;

/// Static partitioning of irreducible states over a worker team
pub mod parallel;

/// Band data of phonons and electrons
mod particle;

/// Computes transport tensors and scalar coefficients from response functions
pub mod postprocessor;

/// Response functions over the full zone
mod response;

/// Relaxation-time rates
mod rta;

/// Providers of transition records
pub mod scattering;

/// Projection onto the invariant subspace of each wave vector
pub mod symmetrizer;

pub use error::{BuildError, ConfigurationError, SolverError};
pub use particle::{Crystal, EnergyWindow, Field, FieldPair, Particle, Species};
pub use response::ResponseFunction;
pub use rta::RtaRates;
