//! # Field term
//!
//! The driving term of the linearised BTE, which is also its solution in the relaxation
//! time approximation:
//!
//! ```text
//! F0(s) = A v(s) (e(s) - mu)^p / rate(s)
//! ```
//!
//! with `A = 1 / T, p = 1` for a temperature gradient and `A = q, p = 0` for an
//! electric field acting on electrons. Phonons do not couple to an electric field.

use crate::{
    constants::ELECTRON_CHARGE, parallel::WorkerTeam, ConfigurationError, Field, Particle,
    ResponseFunction, RtaRates, SolverError, Species,
};
use boltzmann_mesher::State;
use ndarray::Array3;
use tracing::debug;

/// Computes the field term of `particle` in `field` over every FBZ state.
///
/// The work is split over the irreducible states and each worker writes the images of
/// its states. States with a vanishing rate, or outside an electronic transport window,
/// carry a zero field term.
#[tracing::instrument(name = "Field term", skip_all, fields(species = %particle.species(), field = %field))]
pub fn field_term(
    particle: &Particle,
    field: Field,
    temperature: f64,
    rates: &RtaRates,
    team: &WorkerTeam,
) -> Result<ResponseFunction, SolverError> {
    let mesh = particle.mesh();
    let number_of_bands = particle.number_of_bands();
    let shape = (mesh.number_of_fbz_points(), number_of_bands, 3);

    let (prefactor, power) = match (particle.species(), field) {
        (Species::Phonon, Field::ElectricField) => {
            return Ok(ResponseFunction::zeros(shape.0, shape.1))
        }
        (_, Field::TemperatureGradient) => {
            if temperature <= 0. {
                return Err(ConfigurationError::Temperature(temperature).into());
            }
            (1. / temperature, 1)
        }
        (Species::Electron, Field::ElectricField) => (ELECTRON_CHARGE, 0),
    };
    if particle.species() == Species::Phonon && particle.chemical_potential() != 0. {
        return Err(
            ConfigurationError::PhononChemicalPotential(particle.chemical_potential()).into(),
        );
    }
    if rates.rates().dim() != (mesh.number_of_ibz_points(), number_of_bands) {
        return Err(crate::BuildError::Shape(format!(
            "rates of shape {:?} do not match {} irreducible points with {number_of_bands} bands",
            rates.rates().dim(),
            mesh.number_of_ibz_points()
        ))
        .into());
    }

    let chemical_potential = particle.chemical_potential();
    let published = team.run(
        particle.number_of_ibz_states(),
        |_rank, range| -> Result<Array3<f64>, SolverError> {
            let mut buffer = Array3::zeros(shape);
            for index in range {
                let State { band, wavevector } = particle.decode_ibz(index);
                let lifetime = rates.lifetime(wavevector, band);
                if lifetime == 0. {
                    continue;
                }
                for image in mesh.images(wavevector) {
                    let fbz = image.wavevector;
                    if !particle.in_window(fbz, band) {
                        continue;
                    }
                    let scale = prefactor
                        * (particle.energy(fbz, band) - chemical_potential).powi(power)
                        * lifetime;
                    let velocity = particle.velocity(fbz, band);
                    for a in 0..3 {
                        buffer[[fbz, band, a]] = scale * velocity[a];
                    }
                }
            }
            Ok(buffer)
        },
    )?;
    debug!(
        "Field term assembled by {} active workers",
        published.active_workers()
    );
    Ok(ResponseFunction::from_array(published.all_gather_sum(shape)?)?)
}

#[cfg(test)]
mod test {
    use super::field_term;
    use crate::{
        parallel::WorkerTeam, Field, Particle, RtaRates, SolverError, Species,
    };
    use approx::assert_relative_eq;
    use boltzmann_mesher::{create_irreducible_mesh, Grid, Symmetry};
    use nalgebra::Vector3;
    use ndarray::{Array2, Array3};
    use rand::Rng;

    fn random_phonon(points: usize, bands: usize) -> (Particle, RtaRates) {
        let mut rng = rand::thread_rng();
        let grid = Grid::new([points, 1, 1]).unwrap();
        let mesh = create_irreducible_mesh(grid, &Symmetry::identity(), None).unwrap();
        let energies = Array2::from_shape_fn((points, bands), |_| rng.gen::<f64>());
        let velocities = Array3::from_shape_fn((points, bands, 3), |_| rng.gen::<f64>() - 0.5);
        let rates = RtaRates::from_rates(Array2::from_shape_fn((points, bands), |_| {
            rng.gen::<f64>() + 0.1
        }))
        .unwrap();
        (Particle::phonon(mesh, energies, velocities).unwrap(), rates)
    }

    #[test]
    fn phonons_do_not_couple_to_an_electric_field() {
        let (phonon, rates) = random_phonon(6, 2);
        let team = WorkerTeam::new(3).unwrap();
        let term = field_term(&phonon, Field::ElectricField, 300., &rates, &team).unwrap();
        assert!(term.as_array().iter().all(|&value| value == 0.));
        assert_eq!(term.number_of_fbz_points(), 6);
    }

    #[test]
    fn temperature_gradient_term_matches_closed_form() {
        let (phonon, rates) = random_phonon(5, 3);
        let team = WorkerTeam::new(2).unwrap();
        let temperature = 150.;
        let term =
            field_term(&phonon, Field::TemperatureGradient, temperature, &rates, &team).unwrap();
        for iq in 0..5 {
            for ib in 0..3 {
                let expected = phonon.velocity(iq, ib) * phonon.energy(iq, ib)
                    / temperature
                    / rates.rate(iq, ib);
                assert_relative_eq!(term.get(iq, ib), expected, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn worker_count_does_not_change_the_result() {
        let (phonon, rates) = random_phonon(7, 2);
        let single = field_term(
            &phonon,
            Field::TemperatureGradient,
            10.,
            &rates,
            &WorkerTeam::new(1).unwrap(),
        )
        .unwrap();
        for workers in [2, 3, 16] {
            let team = WorkerTeam::new(workers).unwrap();
            let distributed =
                field_term(&phonon, Field::TemperatureGradient, 10., &rates, &team).unwrap();
            assert_eq!(distributed, single);
        }
    }

    #[test]
    fn zero_rate_gives_zero_term() {
        let (phonon, _) = random_phonon(3, 1);
        let rates = RtaRates::from_rates(Array2::zeros((3, 1))).unwrap();
        let team = WorkerTeam::new(2).unwrap();
        let term = field_term(&phonon, Field::TemperatureGradient, 10., &rates, &team).unwrap();
        assert!(term.as_array().iter().all(|&value| value == 0.));
    }

    #[test]
    fn non_zero_phonon_chemical_potential_is_fatal() {
        let grid = Grid::new([2, 1, 1]).unwrap();
        let mesh = create_irreducible_mesh(grid, &Symmetry::identity(), None).unwrap();
        let phonon = Particle::new(
            Species::Phonon,
            mesh,
            Array2::ones((2, 1)),
            Array3::ones((2, 1, 3)),
            0.1,
            None,
        )
        .unwrap();
        let rates = RtaRates::from_rates(Array2::ones((2, 1))).unwrap();
        let team = WorkerTeam::new(1).unwrap();
        let result = field_term(&phonon, Field::TemperatureGradient, 10., &rates, &team);
        assert!(matches!(result, Err(SolverError::Configuration(_))));
    }

    #[test]
    fn single_state_reproduces_the_velocity() {
        let grid = Grid::new([1, 1, 1]).unwrap();
        let mesh = create_irreducible_mesh(grid, &Symmetry::identity(), None).unwrap();
        let mut velocities = Array3::zeros((1, 1, 3));
        velocities[[0, 0, 0]] = 1.;
        let phonon = Particle::phonon(mesh, Array2::ones((1, 1)), velocities).unwrap();
        let rates = RtaRates::from_rates(Array2::ones((1, 1))).unwrap();
        let team = WorkerTeam::new(4).unwrap();
        let term = field_term(&phonon, Field::TemperatureGradient, 1., &rates, &team).unwrap();
        assert_eq!(term.get(0, 0), Vector3::new(1., 0., 0.));
    }
}
