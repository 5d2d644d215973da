// Copyright 2022 Chris Gubbin
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! # Constants
//!
//! Defines physical constants used in the simulation. Energies are carried in electron
//! volts throughout the solver.

pub const BOLTZMANN: f64 = 8.617333262e-5; // The Boltzmann constant in eV / K
pub const ELECTRON_CHARGE: f64 = 1.602176634e-19; // Single electron charge in C
pub const ELECTRON_SPIN_DEGENERACY: f64 = 2.0;
pub const PHONON_DEGENERACY: f64 = 1.0;
/// Absolute tolerance of the Kelvin–Onsager bisection
pub const DRAG_SCALING_TOLERANCE: f64 = 1e-6;
pub const DRAG_SCALING_MAXIMUM_ITERATIONS: usize = 100;
/// Deviations smaller than this (in percent) are reported as zero
pub const DEVIATION_FLOOR: f64 = 1e-6;
