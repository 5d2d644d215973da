//! # Iteration
//!
//! Jacobi sweeps of the scattering integral. A sweep reads the previous iterate only,
//! so every worker can update the images of its irreducible states independently:
//!
//! ```text
//! F_new(s) = F0(s) + tau(s) * sum_records w [ ... F_old(partners) ... ]
//! ```
//!
//! The local buffers are reduced across the team and the result is projected onto the
//! invariant subspace of each wave vector before it replaces the old iterate.

mod electron;
mod interpolate;
mod phonon;

pub use electron::ElectronIterator;
pub use phonon::PhononIterator;

use crate::{
    parallel::WorkerTeam, symmetrizer::symmetrize, Particle, ResponseFunction, RtaRates,
    SolverError,
};
use boltzmann_mesher::{Grid, State, Symmetry};
use nalgebra::Vector3;
use ndarray::Array3;

/// Whether a sweep sees the other species
#[derive(Clone, Copy, Debug)]
pub enum Coupling<P> {
    Decoupled,
    CoupledDrag(P),
}

/// The electron subsystem as seen by a phonon sweep
#[derive(Clone, Copy, Debug)]
pub struct ElectronPartner<'a> {
    pub electron: &'a Particle,
    pub response: &'a ResponseFunction,
}

/// The phonon subsystem as seen by an electron sweep
#[derive(Clone, Copy, Debug)]
pub struct PhononPartner<'a> {
    pub phonon: &'a Particle,
    pub response: &'a ResponseFunction,
    /// The grid interpolated references are expressed on
    pub fine_grid: &'a Grid,
}

/// Runs one distributed sweep.
///
/// `scattering(index, state)` returns the scattering sum of every image of the
/// irreducible state, in the order of `Mesh::images`, or `None` for states that take no
/// part in transport.
pub(crate) fn jacobi_sweep<K>(
    particle: &Particle,
    field_term: &ResponseFunction,
    rates: &RtaRates,
    team: &WorkerTeam,
    scattering: K,
) -> Result<ResponseFunction, SolverError>
where
    K: Fn(usize, State) -> Result<Option<Vec<Vector3<f64>>>, SolverError> + Sync,
{
    let mesh = particle.mesh();
    let shape = (mesh.number_of_fbz_points(), particle.number_of_bands(), 3);
    let published = team.run(
        particle.number_of_ibz_states(),
        |_rank, range| -> Result<Array3<f64>, SolverError> {
            let mut buffer = Array3::zeros(shape);
            for index in range {
                let state = particle.decode_ibz(index);
                let sums = match scattering(index, state)? {
                    Some(sums) => sums,
                    None => continue,
                };
                let lifetime = rates.lifetime(state.wavevector, state.band);
                for (image, sum) in mesh.images(state.wavevector).iter().zip(sums) {
                    let value = field_term.get(image.wavevector, state.band) + sum * lifetime;
                    for a in 0..3 {
                        buffer[[image.wavevector, state.band, a]] = value[a];
                    }
                }
            }
            Ok(buffer)
        },
    )?;
    let mut response = ResponseFunction::from_array(published.all_gather_sum(shape)?)?;
    symmetrize(mesh, &mut response)?;
    Ok(response)
}

/// Rotates a grid state of `particle` by `operation` and returns the FBZ state it lands on
pub(crate) fn rotate_state(
    particle: &Particle,
    symmetry: &Symmetry,
    operation: usize,
    grid_state: usize,
) -> Result<State, SolverError> {
    let State { band, wavevector } = particle.codec().decode(grid_state);
    let mesh = particle.mesh();
    let rotated = mesh.grid().rotate(symmetry.crystal(operation), wavevector)?;
    let fbz = mesh.locate(rotated).ok_or(SolverError::UnknownState {
        species: particle.species(),
        grid_index: rotated,
    })?;
    Ok(State {
        band,
        wavevector: fbz,
    })
}

/// The response of the grid state `grid_state` rotated by `operation`
pub(crate) fn rotated_response(
    particle: &Particle,
    response: &ResponseFunction,
    symmetry: &Symmetry,
    operation: usize,
    grid_state: usize,
) -> Result<Vector3<f64>, SolverError> {
    let State { band, wavevector } = rotate_state(particle, symmetry, operation, grid_state)?;
    Ok(response.get(wavevector, band))
}

#[cfg(test)]
mod test {
    use super::rotate_state;
    use crate::{Particle, SolverError};
    use boltzmann_mesher::{create_irreducible_mesh, Grid, State, Symmetry};
    use ndarray::{Array2, Array3};

    #[test]
    fn rotation_of_a_state_keeps_its_band() {
        let grid = Grid::new([4, 1, 1]).unwrap();
        let symmetry = Symmetry::inversion();
        let mesh = create_irreducible_mesh(grid, &symmetry, None).unwrap();
        let phonon =
            Particle::phonon(mesh, Array2::ones((4, 2)), Array3::zeros((4, 2, 3))).unwrap();
        // grid point 1, band 1 inverts onto grid point 3
        let rotated = rotate_state(&phonon, &symmetry, 1, 3).unwrap();
        assert_eq!(
            rotated,
            State {
                band: 1,
                wavevector: 3
            }
        );
    }

    #[test]
    fn state_outside_a_partial_zone_is_unknown() {
        let grid = Grid::new([4, 1, 1]).unwrap();
        let symmetry = Symmetry::inversion();
        let mesh = create_irreducible_mesh(grid, &symmetry, Some(vec![0, 2])).unwrap();
        let particle =
            Particle::phonon(mesh, Array2::ones((2, 1)), Array3::zeros((2, 1, 3))).unwrap();
        assert!(matches!(
            rotate_state(&particle, &symmetry, 0, 1),
            Err(SolverError::UnknownState { grid_index: 1, .. })
        ));
    }
}
