use crate::{Particle, ResponseFunction, SolverError, Species};
use boltzmann_mesher::{Grid, State, Symmetry};
use nalgebra::Vector3;

/// The phonon response at a point of `fine_grid`, rotated by `operation` and trilinearly
/// interpolated from the full phonon mesh.
///
/// `fine_state` encodes the fine grid point and the phonon branch with the phonon codec.
pub(crate) fn interpolated_response(
    phonon: &Particle,
    response: &ResponseFunction,
    fine_grid: &Grid,
    symmetry: &Symmetry,
    operation: usize,
    fine_state: usize,
) -> Result<Vector3<f64>, SolverError> {
    let State { band, wavevector } = phonon.codec().decode(fine_state);
    let rotated = fine_grid.rotate(symmetry.crystal(operation), wavevector)?;
    let coordinate = fine_grid.crystal_coordinates(rotated);

    let mesh = phonon.mesh();
    let mut value = Vector3::zeros();
    for (grid_index, weight) in mesh.grid().trilinear_weights(&coordinate) {
        if weight == 0. {
            continue;
        }
        let fbz = mesh.locate(grid_index).ok_or(SolverError::UnknownState {
            species: Species::Phonon,
            grid_index,
        })?;
        value += response.get(fbz, band) * weight;
    }
    Ok(value)
}

#[cfg(test)]
mod test {
    use super::interpolated_response;
    use crate::{Particle, ResponseFunction};
    use approx::assert_relative_eq;
    use boltzmann_mesher::{create_irreducible_mesh, Grid, Symmetry};
    use nalgebra::Vector3;
    use ndarray::{Array2, Array3};

    fn linear_chain() -> (Particle, ResponseFunction) {
        let grid = Grid::new([4, 1, 1]).unwrap();
        let mesh = create_irreducible_mesh(grid, &Symmetry::identity(), None).unwrap();
        let phonon =
            Particle::phonon(mesh, Array2::ones((4, 1)), Array3::zeros((4, 1, 3))).unwrap();
        let mut response = ResponseFunction::zeros(4, 1);
        for iq in 0..4 {
            response.set(iq, 0, &Vector3::new(iq as f64, 0., 1.));
        }
        (phonon, response)
    }

    #[test]
    fn coincident_point_reads_the_coarse_value() {
        let (phonon, response) = linear_chain();
        let fine = Grid::new([8, 1, 1]).unwrap();
        let value =
            interpolated_response(&phonon, &response, &fine, &Symmetry::identity(), 0, 4)
                .unwrap();
        assert_relative_eq!(value, Vector3::new(2., 0., 1.), epsilon = 1e-12);
    }

    #[test]
    fn midpoint_is_the_mean_of_its_neighbours() {
        let (phonon, response) = linear_chain();
        let fine = Grid::new([8, 1, 1]).unwrap();
        let value =
            interpolated_response(&phonon, &response, &fine, &Symmetry::identity(), 0, 3)
                .unwrap();
        assert_relative_eq!(value, Vector3::new(1.5, 0., 1.), epsilon = 1e-12);
    }

    #[test]
    fn interpolation_wraps_periodically() {
        let (phonon, response) = linear_chain();
        let fine = Grid::new([8, 1, 1]).unwrap();
        // between coarse points 3 and 0
        let value =
            interpolated_response(&phonon, &response, &fine, &Symmetry::identity(), 0, 7)
                .unwrap();
        assert_relative_eq!(value, Vector3::new(1.5, 0., 1.), epsilon = 1e-12);
    }

    #[test]
    fn rotation_is_applied_on_the_fine_grid() {
        let (phonon, response) = linear_chain();
        let fine = Grid::new([8, 1, 1]).unwrap();
        // inversion takes fine point 3 (3/8) onto fine point 5 (5/8)
        let value =
            interpolated_response(&phonon, &response, &fine, &Symmetry::inversion(), 1, 3)
                .unwrap();
        assert_relative_eq!(value, Vector3::new(2.5, 0., 1.), epsilon = 1e-12);
    }
}
