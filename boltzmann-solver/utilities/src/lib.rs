pub mod tables;

use boltzmann_mesher::{create_irreducible_mesh, Grid, Symmetry};
use boltzmann_solver::{EnergyWindow, Particle};
use nalgebra::{Matrix3, Vector3};
use ndarray::{Array2, Array3};
use rand::{thread_rng, Rng};
use std::f64::consts::PI;

/// The four proper rotations about the z axis
pub fn c4z() -> Symmetry {
    let quarter = Matrix3::new(0, -1, 0, 1, 0, 0, 0, 0, 1);
    let mut crystal = vec![Matrix3::identity()];
    for _ in 1..4 {
        let last = crystal[crystal.len() - 1];
        crystal.push(quarter * last);
    }
    let cartesian = crystal.iter().map(|rotation| rotation.cast::<f64>()).collect();
    Symmetry::new(crystal, cartesian).expect("C4 group is valid")
}

/// Band data sampled over the full zone of `grid` reduced by `symmetry`.
///
/// Energies are functions of `sum_i sin^2(pi k_i)` and velocities are proportional to
/// `sin(2 pi k_i)`, so both transform correctly under any rotation of a cubic grid.
fn sampled_bands(
    grid: [usize; 3],
    symmetry: &Symmetry,
    bands: usize,
    energy: impl Fn(usize, f64) -> f64,
    speed: f64,
) -> (boltzmann_mesher::Mesh, Array2<f64>, Array3<f64>) {
    let grid = Grid::new(grid).expect("positive subdivisions");
    let mesh = create_irreducible_mesh(grid, symmetry, None).expect("closed grid");
    let points = mesh.number_of_fbz_points();
    let mut energies = Array2::zeros((points, bands));
    let mut velocities = Array3::zeros((points, bands, 3));
    for point in 0..points {
        let k = mesh.grid().crystal_coordinates(mesh.grid_index(point));
        let dispersion = k.iter().map(|x| (PI * x).sin().powi(2)).sum::<f64>();
        let direction = k.map(|x| (2. * PI * x).sin());
        for band in 0..bands {
            energies[[point, band]] = energy(band, dispersion);
            let velocity: Vector3<f64> = direction * (speed * (band + 1) as f64);
            for a in 0..3 {
                velocities[[point, band, a]] = velocity[a];
            }
        }
    }
    (mesh, energies, velocities)
}

/// Acoustic-like phonon branches, strictly positive away from the zone centre
pub fn phonon(grid: [usize; 3], symmetry: &Symmetry, bands: usize) -> Particle {
    let (mesh, energies, velocities) = sampled_bands(
        grid,
        symmetry,
        bands,
        |band, dispersion| 0.01 * (band + 1) as f64 * dispersion,
        1.,
    );
    Particle::phonon(mesh, energies, velocities).expect("consistent phonon shapes")
}

/// A single tight-binding-like conduction band around `chemical_potential`, with states
/// further than `cutoff` from it left out of transport
pub fn electron(
    grid: [usize; 3],
    symmetry: &Symmetry,
    chemical_potential: f64,
    cutoff: f64,
) -> Particle {
    let (mesh, energies, velocities) = sampled_bands(
        grid,
        symmetry,
        1,
        |_, dispersion| chemical_potential - 0.05 + 0.05 * dispersion,
        0.5,
    );
    let window = EnergyWindow {
        reference: chemical_potential,
        cutoff,
    };
    Particle::electron(mesh, energies, velocities, chemical_potential, window)
        .expect("consistent electron shapes")
}

/// The same rate for every irreducible state
pub fn uniform_rates(particle: &Particle, rate: f64) -> Array2<f64> {
    Array2::from_elem(
        (
            particle.mesh().number_of_ibz_points(),
            particle.number_of_bands(),
        ),
        rate,
    )
}

/// Rates drawn uniformly from `[minimum, minimum + 1)`
pub fn random_rates(particle: &Particle, minimum: f64) -> Array2<f64> {
    let mut rng = thread_rng();
    Array2::from_shape_fn(
        (
            particle.mesh().number_of_ibz_points(),
            particle.number_of_bands(),
        ),
        |_| minimum + rng.gen::<f64>(),
    )
}
