/// This module governs the high-level implementation of the simulation
mod configuration;
mod reader;
mod telemetry;
mod writer;

pub(crate) use configuration::Configuration;

use crate::{
    outer_loop::{Convergence, Mode, OuterLoopBuilder, SpeciesInput},
    parallel::WorkerTeam,
    postprocessor::BoltzmannIntegrator,
    scattering::DiskTables,
    Crystal, Particle, Species,
};
use clap::{ArgEnum, Parser};
use reader::System;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct App {
    /// Directory holding `system.toml` and the data it refers to
    input: PathBuf,
    #[clap(arg_enum, short, long, default_value = "info")]
    log_level: LogLevel,
    #[clap(arg_enum, short, long, default_value = "coupled")]
    calculation: Calculation,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, ArgEnum)]
enum LogLevel {
    Trace,
    Info,
    Debug,
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "trace"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, ArgEnum)]
pub(crate) enum Calculation {
    Phonon,
    Electron,
    Coupled,
}

pub fn run() -> color_eyre::Result<()> {
    let cli = App::parse();
    let config = Configuration::build()?;

    let output = config.global.output_directory.clone();
    std::fs::create_dir_all(&output)?;
    let (subscriber, _guard) = telemetry::get_subscriber(cli.log_level, &output);
    telemetry::init_subscriber(subscriber)?;

    info!("calculation: {:?}", cli.calculation);
    info!("input: {}", cli.input.display());

    let system = System::build(&cli.input)?;
    let crystal = Crystal {
        volume: system.volume,
        symmetry: system.symmetry.operations(),
    };
    let team = WorkerTeam::new(config.global.number_of_workers)?;
    let convergence = config.convergence();

    let load = |species| system.particle(&cli.input, species, &crystal.symmetry);
    let phonon = match cli.calculation {
        Calculation::Phonon | Calculation::Coupled => Some(load(Species::Phonon)?),
        Calculation::Electron => None,
    };
    let electron = match cli.calculation {
        Calculation::Electron | Calculation::Coupled => Some(load(Species::Electron)?),
        Calculation::Phonon => None,
    };
    let fine_grid = match (&phonon, &electron) {
        (Some(_), Some(_)) => Some(system.fine_grid()?),
        _ => None,
    };

    let context = RunContext {
        input: &cli.input,
        output: &output,
        system: &system,
        crystal: &crystal,
        team: &team,
        convergence: &convergence,
        drag: config.drag.enabled,
    };
    for &temperature in system.temperatures.iter() {
        info!("Solving at T = {temperature} K");
        context.solve_at(
            temperature,
            phonon.as_ref(),
            electron.as_ref(),
            fine_grid.as_ref(),
        )?;
    }

    Ok(())
}

/// Everything shared by the temperatures of a run
struct RunContext<'a> {
    input: &'a Path,
    output: &'a Path,
    system: &'a System,
    crystal: &'a Crystal,
    team: &'a WorkerTeam,
    convergence: &'a Convergence,
    drag: bool,
}

impl RunContext<'_> {
    fn solve_at(
        &self,
        temperature: f64,
        phonon: Option<&Particle>,
        electron: Option<&Particle>,
        fine_grid: Option<&boltzmann_mesher::Grid>,
    ) -> color_eyre::Result<()> {
        let tables = DiskTables::new(self.system.tables_directory(self.input, temperature));
        let aggregator = BoltzmannIntegrator::new(self.crystal);
        let outer_loop = OuterLoopBuilder::new()
            .with_convergence_settings(self.convergence)
            .with_crystal(self.crystal)
            .with_team(self.team)
            .with_tables(&tables)
            .with_aggregator(&aggregator)
            .build();

        let phonon_channels = match phonon {
            Some(_) => self
                .system
                .rate_channels(self.input, Species::Phonon, temperature)?,
            None => Vec::new(),
        };
        let electron_channels = match electron {
            Some(_) => self
                .system
                .rate_channels(self.input, Species::Electron, temperature)?,
            None => Vec::new(),
        };
        let phonon = phonon.map(|particle| SpeciesInput {
            particle,
            rate_channels: &phonon_channels,
        });
        let electron = electron.map(|particle| SpeciesInput {
            particle,
            rate_channels: &electron_channels,
        });

        match (phonon, electron, fine_grid) {
            (Some(phonon), Some(electron), Some(fine_grid)) if self.drag => {
                let mode = Mode::CoupledDrag {
                    phonon,
                    electron,
                    fine_grid,
                };
                let solution = outer_loop.solve(temperature, mode)?;
                writer::write_solution(self.output, temperature, "coupled", &solution)?;
            }
            (phonon, electron, _) => {
                if let Some(phonon) = phonon {
                    let solution = outer_loop.solve(temperature, Mode::Phonon(phonon))?;
                    writer::write_solution(self.output, temperature, "phonon", &solution)?;
                }
                if let Some(electron) = electron {
                    let solution = outer_loop.solve(temperature, Mode::Electron(electron))?;
                    writer::write_solution(self.output, temperature, "electron", &solution)?;
                }
            }
        }
        Ok(())
    }
}
