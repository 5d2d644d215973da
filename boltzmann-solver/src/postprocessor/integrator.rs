use super::{TransportAggregator, TransportTensors};
use crate::{
    constants::{BOLTZMANN, ELECTRON_CHARGE},
    BuildError, ConfigurationError, Crystal, Field, Particle, ResponseFunction, SolverError,
    Species,
};
use nalgebra::Matrix3;

/// Brillouin-zone sum of `w(s) v(s) F(s)^T` with the equilibrium occupation derivative
/// as weight.
///
/// ```text
/// heat   = g / (N V) sum_s w(s) (e(s) - mu) v(s) F(s)^T
/// charge = g / (N V) sum_s w(s) q v(s) F(s)^T            (zero for phonons)
/// w      = n (n + 1) / kT (Bose)   or   f (1 - f) / kT (Fermi)
/// ```
///
/// `N` counts every point of the grid, `V` is the cell volume and `g` the spin
/// degeneracy. Both tensors are averaged over the point group.
#[derive(Clone, Copy, Debug)]
pub struct BoltzmannIntegrator<'a> {
    crystal: &'a Crystal,
}

impl<'a> BoltzmannIntegrator<'a> {
    pub fn new(crystal: &'a Crystal) -> Self {
        Self { crystal }
    }
}

fn occupation_derivative(species: Species, reduced_energy: f64, thermal_energy: f64) -> f64 {
    match species {
        Species::Phonon => {
            let n = 1. / reduced_energy.exp_m1();
            n * (n + 1.) / thermal_energy
        }
        Species::Electron => {
            let f = 1. / (reduced_energy.exp() + 1.);
            f * (1. - f) / thermal_energy
        }
    }
}

impl TransportAggregator for BoltzmannIntegrator<'_> {
    fn integrate(
        &self,
        particle: &Particle,
        _field: Field,
        response: &ResponseFunction,
        temperature: f64,
    ) -> Result<TransportTensors, SolverError> {
        if temperature <= 0. {
            return Err(ConfigurationError::Temperature(temperature).into());
        }
        let mesh = particle.mesh();
        if response.number_of_fbz_points() != mesh.number_of_fbz_points()
            || response.number_of_bands() != particle.number_of_bands()
        {
            return Err(BuildError::Shape(format!(
                "{} response has {} points and {} bands, the particle {} and {}",
                particle.species(),
                response.number_of_fbz_points(),
                response.number_of_bands(),
                mesh.number_of_fbz_points(),
                particle.number_of_bands()
            ))
            .into());
        }

        let thermal_energy = BOLTZMANN * temperature;
        let prefactor = particle.spin_degeneracy()
            / (mesh.grid().number_of_points() as f64 * self.crystal.volume);
        let charge = match particle.species() {
            Species::Phonon => 0.,
            Species::Electron => ELECTRON_CHARGE,
        };

        let mut heat_tensor = Matrix3::zeros();
        let mut charge_tensor = Matrix3::zeros();
        for wavevector in 0..mesh.number_of_fbz_points() {
            for band in 0..particle.number_of_bands() {
                if !particle.in_window(wavevector, band) {
                    continue;
                }
                let energy = particle.energy(wavevector, band) - particle.chemical_potential();
                // Zero-frequency phonons carry no heat
                if particle.species() == Species::Phonon && energy <= 0. {
                    continue;
                }
                let reduced_energy = energy / thermal_energy;
                let weight =
                    occupation_derivative(particle.species(), reduced_energy, thermal_energy);
                let outer = particle.velocity(wavevector, band)
                    * response.get(wavevector, band).transpose();
                heat_tensor += outer * (weight * energy);
                charge_tensor += outer * (weight * charge);
            }
        }

        let symmetry = &self.crystal.symmetry;
        Ok(TransportTensors {
            heat: symmetry.symmetrize_tensor(&(heat_tensor * prefactor)),
            charge: symmetry.symmetrize_tensor(&(charge_tensor * prefactor)),
        })
    }
}
