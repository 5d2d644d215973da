use super::InnerLoop;
use crate::{
    iteration::{Coupling, PhononPartner},
    outer_loop::{electron_part, iterate_to_convergence, LoopStatus, ScalarSet},
    postprocessor::{ElectronScalars, TransportAggregator, TransportTensors},
    scattering::ScatteringTables,
    Field, FieldPair, ResponseFunction, SolverError,
};
use tracing::{debug, warn};

pub(crate) trait Inner {
    /// Sweeps the electron responses once and returns the updated scalars
    fn single_iteration(
        &self,
        responses: &mut FieldPair<ResponseFunction>,
        tensors: &mut FieldPair<TransportTensors>,
    ) -> Result<ElectronScalars, SolverError>;
    /// Sweeps until the four electron scalars settle or the iteration cap is reached
    fn run_loop(
        &self,
        responses: &mut FieldPair<ResponseFunction>,
        tensors: &mut FieldPair<TransportTensors>,
    ) -> Result<LoopStatus, SolverError>;
}

impl<S, A> Inner for InnerLoop<'_, S, A>
where
    S: ScatteringTables,
    A: TransportAggregator,
{
    fn single_iteration(
        &self,
        responses: &mut FieldPair<ResponseFunction>,
        tensors: &mut FieldPair<TransportTensors>,
    ) -> Result<ElectronScalars, SolverError> {
        match self.coupling {
            Coupling::CoupledDrag(phonons) => {
                for field in Field::ALL {
                    let partner = PhononPartner {
                        phonon: phonons.phonon,
                        response: phonons.responses.get(field),
                        fine_grid: phonons.fine_grid,
                    };
                    self.iterator.sweep(
                        self.field_terms.get(field),
                        responses.get_mut(field),
                        Coupling::CoupledDrag(partner),
                    )?;
                }
            }
            Coupling::Decoupled => {
                self.iterator.sweep(
                    &self.field_terms.electric_field,
                    &mut responses.electric_field,
                    Coupling::Decoupled,
                )?;
                responses.temperature_gradient =
                    electron_part(self.electron, &responses.electric_field, self.temperature);
            }
        }
        for field in Field::ALL {
            *tensors.get_mut(field) = self.aggregator.integrate(
                self.electron,
                field,
                responses.get(field),
                self.temperature,
            )?;
        }
        Ok(ElectronScalars::from_tensors(tensors, self.temperature))
    }

    fn run_loop(
        &self,
        responses: &mut FieldPair<ResponseFunction>,
        tensors: &mut FieldPair<TransportTensors>,
    ) -> Result<LoopStatus, SolverError> {
        let mut scalars =
            ScalarSet::new(ElectronScalars::from_tensors(tensors, self.temperature).values());
        let status = iterate_to_convergence(
            &mut scalars,
            self.convergence_settings.inner_tolerance(),
            self.convergence_settings.maximum_inner_iterations(),
            |iteration| {
                let updated = self.single_iteration(responses, tensors)?;
                debug!(
                    "Electron pass {iteration}: kappa {:e}, sigma S {:e}, sigma {:e}, alpha {:e}",
                    updated.thermal_conductivity,
                    updated.seebeck,
                    updated.conductivity,
                    updated.peltier
                );
                Ok::<_, SolverError>(updated.values())
            },
        )?;
        if !status.converged {
            warn!(
                "Electron loop reached {} iterations without converging",
                status.iterations
            );
        }
        Ok(status)
    }
}
