//! # Particle
//!
//! Band data of one carrier species on its mesh, as delivered by the band-structure
//! interpolation.

use crate::{
    constants::{ELECTRON_SPIN_DEGENERACY, PHONON_DEGENERACY},
    BuildError,
};
use boltzmann_mesher::{Mesh, State, StateCodec, Symmetry};
use nalgebra::Vector3;
use ndarray::{Array2, Array3};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Species {
    Phonon,
    Electron,
}

impl std::fmt::Display for Species {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Species::Phonon => write!(f, "phonon"),
            Species::Electron => write!(f, "electron"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Field {
    TemperatureGradient,
    ElectricField,
}

impl Field {
    pub const ALL: [Field; 2] = [Field::TemperatureGradient, Field::ElectricField];
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Field::TemperatureGradient => write!(f, "T"),
            Field::ElectricField => write!(f, "E"),
        }
    }
}

/// One value per external field
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FieldPair<T> {
    pub temperature_gradient: T,
    pub electric_field: T,
}

impl<T> FieldPair<T> {
    pub fn from_fn<E>(mut f: impl FnMut(Field) -> Result<T, E>) -> Result<Self, E> {
        Ok(Self {
            temperature_gradient: f(Field::TemperatureGradient)?,
            electric_field: f(Field::ElectricField)?,
        })
    }

    pub fn get(&self, field: Field) -> &T {
        match field {
            Field::TemperatureGradient => &self.temperature_gradient,
            Field::ElectricField => &self.electric_field,
        }
    }

    pub fn get_mut(&mut self, field: Field) -> &mut T {
        match field {
            Field::TemperatureGradient => &mut self.temperature_gradient,
            Field::ElectricField => &mut self.electric_field,
        }
    }
}

/// States with `|energy - reference| < cutoff` take part in electronic transport
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnergyWindow {
    pub reference: f64,
    pub cutoff: f64,
}

impl EnergyWindow {
    pub fn contains(&self, energy: f64) -> bool {
        (energy - self.reference).abs() < self.cutoff
    }
}

/// Cell volume and point group shared by both species
#[derive(Clone, Debug)]
pub struct Crystal {
    pub volume: f64,
    pub symmetry: Symmetry,
}

/// Energies and group velocities of one species over the full zone of its mesh
#[derive(Clone, Debug)]
pub struct Particle {
    species: Species,
    mesh: Mesh,
    codec: StateCodec,
    /// Shape `(fbz points, bands)`
    energies: Array2<f64>,
    /// Shape `(fbz points, bands, 3)`
    velocities: Array3<f64>,
    chemical_potential: f64,
    spin_degeneracy: f64,
    window: Option<EnergyWindow>,
}

impl Particle {
    pub fn new(
        species: Species,
        mesh: Mesh,
        energies: Array2<f64>,
        velocities: Array3<f64>,
        chemical_potential: f64,
        window: Option<EnergyWindow>,
    ) -> Result<Self, BuildError> {
        let (points, bands) = energies.dim();
        if points != mesh.number_of_fbz_points() || bands == 0 {
            return Err(BuildError::Shape(format!(
                "{species} energies have shape {:?} on a mesh of {} points",
                energies.dim(),
                mesh.number_of_fbz_points()
            )));
        }
        if velocities.dim() != (points, bands, 3) {
            return Err(BuildError::Shape(format!(
                "{species} velocities have shape {:?}, expected {:?}",
                velocities.dim(),
                (points, bands, 3)
            )));
        }
        let spin_degeneracy = match species {
            Species::Phonon => PHONON_DEGENERACY,
            Species::Electron => ELECTRON_SPIN_DEGENERACY,
        };
        Ok(Self {
            species,
            mesh,
            codec: StateCodec::new(bands)?,
            energies,
            velocities,
            chemical_potential,
            spin_degeneracy,
            window,
        })
    }

    pub fn phonon(
        mesh: Mesh,
        energies: Array2<f64>,
        velocities: Array3<f64>,
    ) -> Result<Self, BuildError> {
        Self::new(Species::Phonon, mesh, energies, velocities, 0., None)
    }

    pub fn electron(
        mesh: Mesh,
        energies: Array2<f64>,
        velocities: Array3<f64>,
        chemical_potential: f64,
        window: EnergyWindow,
    ) -> Result<Self, BuildError> {
        Self::new(
            Species::Electron,
            mesh,
            energies,
            velocities,
            chemical_potential,
            Some(window),
        )
    }

    pub fn species(&self) -> Species {
        self.species
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn codec(&self) -> &StateCodec {
        &self.codec
    }

    pub fn number_of_bands(&self) -> usize {
        self.codec.number_of_bands()
    }

    pub fn number_of_ibz_states(&self) -> usize {
        self.codec.number_of_states(self.mesh.number_of_ibz_points())
    }

    pub fn energies(&self) -> &Array2<f64> {
        &self.energies
    }

    pub fn energy(&self, wavevector: usize, band: usize) -> f64 {
        self.energies[[wavevector, band]]
    }

    pub fn velocity(&self, wavevector: usize, band: usize) -> Vector3<f64> {
        Vector3::from_fn(|a, _| self.velocities[[wavevector, band, a]])
    }

    pub fn chemical_potential(&self) -> f64 {
        self.chemical_potential
    }

    pub fn spin_degeneracy(&self) -> f64 {
        self.spin_degeneracy
    }

    pub fn window(&self) -> Option<&EnergyWindow> {
        self.window.as_ref()
    }

    /// Whether the FBZ state takes part in transport; always true without a window
    pub fn in_window(&self, wavevector: usize, band: usize) -> bool {
        self.window
            .as_ref()
            .map_or(true, |window| window.contains(self.energy(wavevector, band)))
    }

    /// Decodes a flat IBZ state index into the IBZ point and band
    pub fn decode_ibz(&self, index: usize) -> State {
        self.codec.decode(index)
    }
}

#[cfg(test)]
mod test {
    use super::{EnergyWindow, Particle};
    use boltzmann_mesher::{create_irreducible_mesh, Grid, Symmetry};
    use ndarray::{Array2, Array3};

    #[test]
    fn mismatched_velocity_shape_is_rejected() {
        let grid = Grid::new([2, 1, 1]).unwrap();
        let mesh = create_irreducible_mesh(grid, &Symmetry::identity(), None).unwrap();
        let result = Particle::phonon(mesh, Array2::zeros((2, 3)), Array3::zeros((2, 2, 3)));
        assert!(result.is_err());
    }

    #[test]
    fn window_is_open_interval_about_reference() {
        let window = EnergyWindow {
            reference: 1.,
            cutoff: 0.5,
        };
        assert!(window.contains(1.2));
        assert!(window.contains(0.6));
        assert!(!window.contains(1.5));
        assert!(!window.contains(0.));
    }
}
