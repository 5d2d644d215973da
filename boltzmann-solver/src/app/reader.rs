//! # Reader
//!
//! The physical system of a run is described by `system.toml` in the input directory:
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
//!
//! [electron]
//! grid = [16, 16, 16]
//! energies = "electron_energies.txt"
//! velocities = "electron_velocities.txt"
//! rate_channels = ["electron_rates.txt"]
//! chemical_potential = 0.1
//! window = { reference = 0.1, cutoff = 0.4 }
//! ```
//!
//! Band data are whitespace separated text tables: one row of band energies per full-zone
//! point, one row of three velocity components per point and band. Rate channels are
//! read from the temperature directory `T<temperature>`, one row per irreducible point,
//! and the scattering tables of that temperature live in its `tables` subdirectory.

use crate::{EnergyWindow, Particle, Species};
use boltzmann_mesher::{create_irreducible_mesh, Grid, Symmetry};
use color_eyre::eyre::{eyre, WrapErr};
use config::{Config, File};
use ndarray::{Array2, Array3};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum SymmetryPreset {
    Identity,
    Inversion,
}

impl SymmetryPreset {
    pub(crate) fn operations(self) -> Symmetry {
        match self {
            SymmetryPreset::Identity => Symmetry::identity(),
            SymmetryPreset::Inversion => Symmetry::inversion(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct System {
    pub(crate) volume: f64,
    pub(crate) symmetry: SymmetryPreset,
    pub(crate) temperatures: Vec<f64>,
    pub(crate) phonon: Option<SpeciesDescription>,
    pub(crate) electron: Option<SpeciesDescription>,
    /// Subdivisions of the grid interpolated phonon references live on, the electron
    /// grid when absent
    pub(crate) fine_grid: Option<[usize; 3]>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SpeciesDescription {
    pub(crate) grid: [usize; 3],
    pub(crate) energies: PathBuf,
    pub(crate) velocities: PathBuf,
    pub(crate) rate_channels: Vec<PathBuf>,
    #[serde(default)]
    pub(crate) chemical_potential: f64,
    pub(crate) window: Option<EnergyWindow>,
}

/// Name of the directory holding everything specific to one temperature
pub(crate) fn temperature_directory(temperature: f64) -> String {
    format!("T{temperature}")
}

impl System {
    pub(crate) fn build(input: &Path) -> color_eyre::Result<Self> {
        let s = Config::builder()
            .add_source(File::from(input.join("system.toml")))
            .build()?;
        s.try_deserialize()
            .map_err(|e| eyre!("Failed to deserialize the system: {:?}", e))
    }

    pub(crate) fn description(&self, species: Species) -> color_eyre::Result<&SpeciesDescription> {
        match species {
            Species::Phonon => self.phonon.as_ref(),
            Species::Electron => self.electron.as_ref(),
        }
        .ok_or_else(|| eyre!("the system has no [{species}] section"))
    }

    pub(crate) fn fine_grid(&self) -> color_eyre::Result<Grid> {
        let subdivisions = match self.fine_grid {
            Some(subdivisions) => subdivisions,
            None => self.description(Species::Electron)?.grid,
        };
        Ok(Grid::new(subdivisions)?)
    }

    /// Loads the band data of `species` onto its irreducible mesh
    pub(crate) fn particle(
        &self,
        input: &Path,
        species: Species,
        symmetry: &Symmetry,
    ) -> color_eyre::Result<Particle> {
        let description = self.description(species)?;
        let mesh = create_irreducible_mesh(Grid::new(description.grid)?, symmetry, None)?;
        let points = mesh.number_of_fbz_points();

        let energies = read_matrix(&input.join(&description.energies))?;
        let bands = energies.ncols();
        let velocities = read_matrix(&input.join(&description.velocities))?;
        if velocities.dim() != (points * bands, 3) {
            return Err(eyre!(
                "{species} velocities need {} rows of three components, found {:?}",
                points * bands,
                velocities.dim()
            ));
        }
        let velocities = Array3::from_shape_vec((points, bands, 3), velocities.into_raw_vec())?;

        Ok(Particle::new(
            species,
            mesh,
            energies,
            velocities,
            description.chemical_potential,
            description.window,
        )?)
    }

    /// The scattering-rate channels of `species` at `temperature`
    pub(crate) fn rate_channels(
        &self,
        input: &Path,
        species: Species,
        temperature: f64,
    ) -> color_eyre::Result<Vec<Array2<f64>>> {
        let directory = input.join(temperature_directory(temperature));
        self.description(species)?
            .rate_channels
            .iter()
            .map(|channel| read_matrix(&directory.join(channel)))
            .collect()
    }

    pub(crate) fn tables_directory(&self, input: &Path, temperature: f64) -> PathBuf {
        input.join(temperature_directory(temperature)).join("tables")
    }
}

/// Reads a whitespace separated table of floats, skipping blank lines and `#` comments
pub(crate) fn read_matrix(path: &Path) -> color_eyre::Result<Array2<f64>> {
    let contents = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("Failed to read {}", path.display()))?;
    let mut values = Vec::new();
    let mut columns = None;
    let mut rows = 0;
    for (number, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let row = line
            .split_whitespace()
            .map(str::parse::<f64>)
            .collect::<Result<Vec<_>, _>>()
            .wrap_err_with(|| format!("{}:{}", path.display(), number + 1))?;
        match columns {
            None => columns = Some(row.len()),
            Some(columns) if columns != row.len() => {
                return Err(eyre!(
                    "{}:{} has {} columns, expected {columns}",
                    path.display(),
                    number + 1,
                    row.len()
                ))
            }
            Some(_) => {}
        }
        values.extend(row);
        rows += 1;
    }
    Ok(Array2::from_shape_vec((rows, columns.unwrap_or(0)), values)?)
}
