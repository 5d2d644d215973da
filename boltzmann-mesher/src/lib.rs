// Copyright 2022 Chris Gubbin
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Reciprocal-space grids, point-group operations and irreducible meshes for the
//! Boltzmann solver.

mod error;
mod generate;
mod grid;
mod mesh;
mod state;
mod symmetry;

pub use error::MeshError;
pub use generate::*;
pub use grid::Grid;
pub use mesh::{Image, Mesh};
pub use state::{State, StateCodec};
pub use symmetry::Symmetry;
