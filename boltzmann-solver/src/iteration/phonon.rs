use super::{jacobi_sweep, rotated_response, Coupling, ElectronPartner};
use crate::{
    parallel::WorkerTeam,
    scattering::{Channel, ScatteringTables},
    Particle, ResponseFunction, RtaRates, SolverError,
};
use boltzmann_mesher::Symmetry;
use nalgebra::Vector3;

/// Sweeps of the phonon BTE over three-phonon and, optionally, phonon-electron processes
#[derive(Debug)]
pub struct PhononIterator<'a, S> {
    phonon: &'a Particle,
    symmetry: &'a Symmetry,
    rates: &'a RtaRates,
    tables: &'a S,
    team: &'a WorkerTeam,
}

impl<'a, S: ScatteringTables> PhononIterator<'a, S> {
    pub fn new(
        phonon: &'a Particle,
        symmetry: &'a Symmetry,
        rates: &'a RtaRates,
        tables: &'a S,
        team: &'a WorkerTeam,
    ) -> Self {
        Self {
            phonon,
            symmetry,
            rates,
            tables,
            team,
        }
    }

    /// Replaces `response` by one Jacobi update driven by `field_term`.
    ///
    /// With drag the electron response must belong to the same field as `field_term`.
    #[tracing::instrument(name = "Phonon sweep", skip_all)]
    pub fn sweep(
        &self,
        field_term: &ResponseFunction,
        response: &mut ResponseFunction,
        coupling: Coupling<ElectronPartner<'_>>,
    ) -> Result<(), SolverError> {
        let previous: &ResponseFunction = response;
        let updated = jacobi_sweep(
            self.phonon,
            field_term,
            self.rates,
            self.team,
            |index, state| {
                let plus = self.tables.fetch(Channel::PhononPlus, index)?;
                let minus = self.tables.fetch(Channel::PhononMinus, index)?;
                let drag = match coupling {
                    Coupling::CoupledDrag(_) => {
                        self.tables.fetch(Channel::PhononElectron, index)?
                    }
                    Coupling::Decoupled => Vec::new(),
                };

                let response_at = |operation: usize, grid_state: usize| {
                    rotated_response(self.phonon, previous, self.symmetry, operation, grid_state)
                };

                let mut sums = Vec::new();
                for image in self.phonon.mesh().images(state.wavevector) {
                    let op = image.operation;
                    let mut sum = Vector3::zeros();
                    for record in plus.iter() {
                        let first = response_at(op, record.first_state(Channel::PhononPlus)?)?;
                        let second = response_at(op, record.second)?;
                        sum += (second - first) * record.weight;
                    }
                    for record in minus.iter() {
                        let first = response_at(op, record.first_state(Channel::PhononMinus)?)?;
                        let second = response_at(op, record.second)?;
                        sum += (second + first) * (0.5 * record.weight);
                    }
                    if let Coupling::CoupledDrag(partner) = coupling {
                        let electron_at = |operation: usize, grid_state: usize| {
                            rotated_response(
                                partner.electron,
                                partner.response,
                                self.symmetry,
                                operation,
                                grid_state,
                            )
                        };
                        let degeneracy = partner.electron.spin_degeneracy();
                        for record in drag.iter() {
                            let initial =
                                electron_at(op, record.first_state(Channel::PhononElectron)?)?;
                            let last = electron_at(op, record.second)?;
                            sum += (last - initial) * (degeneracy * record.weight);
                        }
                    }
                    sums.push(sum);
                }
                Ok(Some(sums))
            },
        )?;
        *response = updated;
        Ok(())
    }
}
