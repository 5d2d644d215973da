use super::{
    electron_part, enforce_kelvin_onsager, iterate_to_convergence, IterationRecord, Mode,
    OuterLoop, ScalarSet, Solution, SpeciesInput, SpeciesSolution,
};
use crate::{
    field_term::field_term,
    inner_loop::{Inner, InnerLoopBuilder, PhononFields},
    iteration::{Coupling, ElectronIterator, ElectronPartner, PhononIterator},
    postprocessor::{deviation, trace_average, ElectronScalars, PhononScalars, TransportAggregator},
    scattering::ScatteringTables,
    ConfigurationError, Field, FieldPair, RtaRates, SolverError, Species,
};
use boltzmann_mesher::Grid;
use tracing::{info, warn};

impl<S, A> OuterLoop<'_, S, A>
where
    S: ScatteringTables,
    A: TransportAggregator,
{
    /// Solves the linearised BTE at `temperature` for the subsystems selected by `mode`.
    ///
    /// Reaching the outer iteration cap is reported through the returned status.
    #[tracing::instrument(name = "Solve", skip_all, fields(temperature = temperature))]
    pub fn solve(&self, temperature: f64, mode: Mode<'_>) -> Result<Solution, SolverError> {
        if temperature <= 0. {
            return Err(ConfigurationError::Temperature(temperature).into());
        }
        let solution = match mode {
            Mode::Phonon(phonon) => self.solve_phonon(temperature, phonon)?,
            Mode::Electron(electron) => self.solve_electron(temperature, electron)?,
            Mode::CoupledDrag {
                phonon,
                electron,
                fine_grid,
            } => self.solve_coupled(temperature, phonon, electron, fine_grid)?,
        };
        if solution.status.converged {
            info!(
                "Converged after {} outer iterations",
                solution.status.iterations
            );
        } else {
            warn!(
                "Outer loop reached {} iterations without converging",
                solution.status.iterations
            );
        }
        Ok(solution)
    }

    /// Relaxation-time start: rates, field terms, responses equal to the field terms and
    /// the tensors they give
    fn initialize(
        &self,
        temperature: f64,
        input: SpeciesInput<'_>,
        expected: Species,
    ) -> Result<SpeciesSolution, SolverError> {
        let particle = input.particle;
        if particle.species() != expected {
            return Err(ConfigurationError::Mode(format!(
                "the {expected} slot was given a {} subsystem",
                particle.species()
            ))
            .into());
        }
        let operations = particle.mesh().number_of_operations();
        if operations != self.crystal.symmetry.number_of_operations() {
            return Err(ConfigurationError::PointGroup {
                species: expected,
                mesh: operations,
                crystal: self.crystal.symmetry.number_of_operations(),
            }
            .into());
        }
        let rates = RtaRates::matthiessen(
            particle.mesh().number_of_ibz_points(),
            particle.number_of_bands(),
            input.rate_channels,
        )?;
        let field_terms = FieldPair::from_fn(|field| {
            field_term(particle, field, temperature, &rates, self.team)
        })?;
        let responses = field_terms.clone();
        let tensors = FieldPair::from_fn(|field| {
            self.aggregator
                .integrate(particle, field, responses.get(field), temperature)
        })?;
        Ok(SpeciesSolution {
            species: expected,
            rates,
            field_terms,
            responses,
            tensors,
        })
    }

    fn solve_phonon(
        &self,
        temperature: f64,
        input: SpeciesInput<'_>,
    ) -> Result<Solution, SolverError> {
        let SpeciesSolution {
            species,
            rates,
            field_terms,
            mut responses,
            mut tensors,
        } = self.initialize(temperature, input, Species::Phonon)?;
        let phonon = input.particle;
        let iterator =
            PhononIterator::new(phonon, &self.crystal.symmetry, &rates, self.tables, self.team);

        let initial = PhononScalars::from_tensors(&tensors, temperature);
        let mut history = vec![IterationRecord {
            iteration: 0,
            phonon: Some(initial),
            electron: None,
            deviation: None,
            drag_scaling: None,
        }];
        let mut scalars = ScalarSet::new(initial.values());
        let status = iterate_to_convergence(
            &mut scalars,
            self.convergence_settings.outer_tolerance(),
            self.convergence_settings.maximum_outer_iterations(),
            |iteration| {
                let field = Field::TemperatureGradient;
                iterator.sweep(
                    field_terms.get(field),
                    responses.get_mut(field),
                    Coupling::Decoupled,
                )?;
                *tensors.get_mut(field) =
                    self.aggregator
                        .integrate(phonon, field, responses.get(field), temperature)?;
                let updated = PhononScalars::from_tensors(&tensors, temperature);
                info!(
                    "Iteration {iteration}: kappa_ph {:e}",
                    updated.thermal_conductivity
                );
                history.push(IterationRecord {
                    iteration,
                    phonon: Some(updated),
                    electron: None,
                    deviation: None,
                    drag_scaling: None,
                });
                Ok::<_, SolverError>(updated.values())
            },
        )?;

        Ok(Solution {
            status,
            history,
            phonon: Some(SpeciesSolution {
                species,
                rates,
                field_terms,
                responses,
                tensors,
            }),
            electron: None,
        })
    }

    fn solve_electron(
        &self,
        temperature: f64,
        input: SpeciesInput<'_>,
    ) -> Result<Solution, SolverError> {
        let SpeciesSolution {
            species,
            rates,
            field_terms,
            mut responses,
            mut tensors,
        } = self.initialize(temperature, input, Species::Electron)?;
        let electron = input.particle;
        let iterator = ElectronIterator::new(
            electron,
            &self.crystal.symmetry,
            &rates,
            self.tables,
            self.team,
        );
        let inner_loop = InnerLoopBuilder::new()
            .with_convergence_settings(self.convergence_settings)
            .with_electron(electron)
            .with_field_terms(&field_terms)
            .with_iterator(&iterator)
            .with_aggregator(self.aggregator)
            .build(Coupling::Decoupled, temperature);

        let initial = ElectronScalars::from_tensors(&tensors, temperature);
        let mut history = vec![IterationRecord {
            iteration: 0,
            phonon: None,
            electron: Some(initial),
            deviation: Some(deviation(initial.seebeck, initial.peltier, 0.)),
            drag_scaling: None,
        }];
        let mut scalars = ScalarSet::new(initial.values());
        let status = iterate_to_convergence(
            &mut scalars,
            self.convergence_settings.outer_tolerance(),
            self.convergence_settings.maximum_outer_iterations(),
            |iteration| {
                let updated = inner_loop.single_iteration(&mut responses, &mut tensors)?;
                let deviation = deviation(updated.seebeck, updated.peltier, 0.);
                info!(
                    "Iteration {iteration}: kappa_el {:e}, sigma {:e}, deviation {deviation:.3e}%",
                    updated.thermal_conductivity, updated.conductivity
                );
                history.push(IterationRecord {
                    iteration,
                    phonon: None,
                    electron: Some(updated),
                    deviation: Some(deviation),
                    drag_scaling: None,
                });
                Ok::<_, SolverError>(updated.values())
            },
        )?;

        Ok(Solution {
            status,
            history,
            phonon: None,
            electron: Some(SpeciesSolution {
                species,
                rates,
                field_terms,
                responses,
                tensors,
            }),
        })
    }

    fn solve_coupled(
        &self,
        temperature: f64,
        phonon_input: SpeciesInput<'_>,
        electron_input: SpeciesInput<'_>,
        fine_grid: &Grid,
    ) -> Result<Solution, SolverError> {
        let phonon_solution = self.initialize(temperature, phonon_input, Species::Phonon)?;
        let electron_solution = self.initialize(temperature, electron_input, Species::Electron)?;
        let phonon = phonon_input.particle;
        let electron = electron_input.particle;

        let SpeciesSolution {
            rates: phonon_rates,
            field_terms: phonon_field_terms,
            responses: mut phonon_responses,
            tensors: mut phonon_tensors,
            ..
        } = phonon_solution;
        let SpeciesSolution {
            rates: electron_rates,
            field_terms: electron_field_terms,
            responses: mut electron_responses,
            tensors: mut electron_tensors,
            ..
        } = electron_solution;

        let phonon_iterator = PhononIterator::new(
            phonon,
            &self.crystal.symmetry,
            &phonon_rates,
            self.tables,
            self.team,
        );
        let electron_iterator = ElectronIterator::new(
            electron,
            &self.crystal.symmetry,
            &electron_rates,
            self.tables,
            self.team,
        );

        let initial_phonon = PhononScalars::from_tensors(&phonon_tensors, temperature);
        let initial_electron = ElectronScalars::from_tensors(&electron_tensors, temperature);
        let mut history = vec![IterationRecord {
            iteration: 0,
            phonon: Some(initial_phonon),
            electron: Some(initial_electron),
            deviation: Some(deviation(
                initial_electron.seebeck,
                initial_electron.peltier,
                initial_phonon.peltier,
            )),
            drag_scaling: None,
        }];

        let mut scalars = ScalarSet::new(initial_phonon.values());
        let status = iterate_to_convergence(
            &mut scalars,
            self.convergence_settings.outer_tolerance(),
            self.convergence_settings.maximum_outer_iterations(),
            |iteration| {
                for field in Field::ALL {
                    let partner = ElectronPartner {
                        electron,
                        response: electron_responses.get(field),
                    };
                    phonon_iterator.sweep(
                        phonon_field_terms.get(field),
                        phonon_responses.get_mut(field),
                        Coupling::CoupledDrag(partner),
                    )?;
                    *phonon_tensors.get_mut(field) = self.aggregator.integrate(
                        phonon,
                        field,
                        phonon_responses.get(field),
                        temperature,
                    )?;
                }
                let phonon_scalars = PhononScalars::from_tensors(&phonon_tensors, temperature);

                let inner_loop = InnerLoopBuilder::new()
                    .with_convergence_settings(self.convergence_settings)
                    .with_electron(electron)
                    .with_field_terms(&electron_field_terms)
                    .with_iterator(&electron_iterator)
                    .with_aggregator(self.aggregator)
                    .build(
                        Coupling::CoupledDrag(PhononFields {
                            phonon,
                            responses: &phonon_responses,
                            fine_grid,
                        }),
                        temperature,
                    );
                inner_loop.run_loop(&mut electron_responses, &mut electron_tensors)?;

                let electronic =
                    electron_part(electron, &electron_responses.electric_field, temperature);
                let drag = electron_responses
                    .temperature_gradient
                    .combine(1., &electronic, -1.);
                let drag_scaling = enforce_kelvin_onsager(phonon_scalars.peltier, |lambda| {
                    let tensors = self.aggregator.integrate(
                        electron,
                        Field::TemperatureGradient,
                        &drag.scaled(lambda),
                        temperature,
                    )?;
                    Ok::<_, SolverError>(trace_average(&tensors.charge))
                })?;
                if !drag_scaling.converged {
                    warn!(
                        "Drag scaling did not meet its tolerance, keeping lambda = {}",
                        drag_scaling.lambda
                    );
                }
                electron_responses.temperature_gradient =
                    electronic.combine(1., &drag, drag_scaling.lambda);
                electron_tensors.temperature_gradient = self.aggregator.integrate(
                    electron,
                    Field::TemperatureGradient,
                    &electron_responses.temperature_gradient,
                    temperature,
                )?;

                let electron_scalars =
                    ElectronScalars::from_tensors(&electron_tensors, temperature);
                let deviation = deviation(
                    electron_scalars.seebeck,
                    electron_scalars.peltier,
                    phonon_scalars.peltier,
                );
                info!(
                    "Iteration {iteration}: kappa_ph {:e}, alpha_ph {:e}, kappa_el {:e}, lambda {:.6}, deviation {deviation:.3e}%",
                    phonon_scalars.thermal_conductivity,
                    phonon_scalars.peltier,
                    electron_scalars.thermal_conductivity,
                    drag_scaling.lambda
                );
                history.push(IterationRecord {
                    iteration,
                    phonon: Some(phonon_scalars),
                    electron: Some(electron_scalars),
                    deviation: Some(deviation),
                    drag_scaling: Some(drag_scaling),
                });
                Ok::<_, SolverError>(phonon_scalars.values())
            },
        )?;

        Ok(Solution {
            status,
            history,
            phonon: Some(SpeciesSolution {
                species: Species::Phonon,
                rates: phonon_rates,
                field_terms: phonon_field_terms,
                responses: phonon_responses,
                tensors: phonon_tensors,
            }),
            electron: Some(SpeciesSolution {
                species: Species::Electron,
                rates: electron_rates,
                field_terms: electron_field_terms,
                responses: electron_responses,
                tensors: electron_tensors,
            }),
        })
    }
}

