use super::{
    interpolate::interpolated_response, jacobi_sweep, rotated_response, Coupling, PhononPartner,
};
use crate::{
    parallel::WorkerTeam,
    scattering::{Channel, PhononRef, ScatteringTables},
    Particle, ResponseFunction, RtaRates, SolverError,
};
use boltzmann_mesher::Symmetry;
use nalgebra::Vector3;

/// Sweeps of the electron BTE over electron-phonon processes.
///
/// Only irreducible states inside the transport window are updated; every other entry of
/// the response is zero after a sweep.
#[derive(Debug)]
pub struct ElectronIterator<'a, S> {
    electron: &'a Particle,
    symmetry: &'a Symmetry,
    rates: &'a RtaRates,
    tables: &'a S,
    team: &'a WorkerTeam,
}

impl<'a, S: ScatteringTables> ElectronIterator<'a, S> {
    pub fn new(
        electron: &'a Particle,
        symmetry: &'a Symmetry,
        rates: &'a RtaRates,
        tables: &'a S,
        team: &'a WorkerTeam,
    ) -> Self {
        Self {
            electron,
            symmetry,
            rates,
            tables,
            team,
        }
    }

    /// Replaces `response` by one Jacobi update driven by `field_term`.
    ///
    /// The phonon wave vector of a record is the momentum transfer `k' - k`. Absorbing it
    /// drags the electron by `-w F_ph(q)`, emitting `-q` by `+w F_ph(-q)` with the odd
    /// parity `F_ph(-q) = -F_ph(q)`.
    #[tracing::instrument(name = "Electron sweep", skip_all)]
    pub fn sweep(
        &self,
        field_term: &ResponseFunction,
        response: &mut ResponseFunction,
        coupling: Coupling<PhononPartner<'_>>,
    ) -> Result<(), SolverError> {
        let previous: &ResponseFunction = response;
        let updated = jacobi_sweep(
            self.electron,
            field_term,
            self.rates,
            self.team,
            |index, state| {
                let representative = self.electron.mesh().representative(state.wavevector);
                if !self.electron.in_window(representative, state.band) {
                    return Ok(None);
                }
                let plus = self.tables.fetch(Channel::ElectronPlus, index)?;
                let minus = self.tables.fetch(Channel::ElectronMinus, index)?;

                let mut sums = Vec::new();
                for image in self.electron.mesh().images(state.wavevector) {
                    let op = image.operation;
                    let mut sum = Vector3::zeros();
                    for (channel, records) in
                        [(Channel::ElectronPlus, &plus), (Channel::ElectronMinus, &minus)]
                    {
                        for record in records.iter() {
                            let last = rotated_response(
                                self.electron,
                                previous,
                                self.symmetry,
                                op,
                                record.second,
                            )?;
                            sum += last * record.weight;

                            if let Coupling::CoupledDrag(partner) = coupling {
                                let phonon = self.phonon_response(
                                    &partner,
                                    op,
                                    record.first_phonon(channel)?,
                                )?;
                                // absorbed and emitted phonons both drag with the same sign
                                sum -= phonon * record.weight;
                            }
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

    fn phonon_response(
        &self,
        partner: &PhononPartner<'_>,
        operation: usize,
        phonon: PhononRef,
    ) -> Result<Vector3<f64>, SolverError> {
        match phonon {
            PhononRef::Direct(grid_state) => rotated_response(
                partner.phonon,
                partner.response,
                self.symmetry,
                operation,
                grid_state,
            ),
            PhononRef::Interpolated(fine_state) => interpolated_response(
                partner.phonon,
                partner.response,
                partner.fine_grid,
                self.symmetry,
                operation,
                fine_state,
            ),
        }
    }
}
