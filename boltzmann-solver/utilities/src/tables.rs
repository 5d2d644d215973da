//! Synthetic transition records coupling every irreducible state to its neighbours
//! along the first grid axis.

use boltzmann_mesher::State;
use boltzmann_solver::{
    scattering::{Channel, InMemoryTables, PhononRef, TransitionRecord},
    Particle,
};

/// Grid state of the representative of irreducible `index`, shifted by `shift` points
/// along the first axis
fn shifted_grid_state(particle: &Particle, index: usize, shift: isize) -> usize {
    let state = particle.decode_ibz(index);
    let mesh = particle.mesh();
    let grid = mesh.grid();
    let [i, j, k] = grid.coordinates(mesh.grid_index(mesh.representative(state.wavevector)));
    let shifted = grid.index_of([i as isize + shift, j as isize, k as isize]);
    particle.codec().encode(State {
        band: state.band,
        wavevector: shifted,
    })
}

/// One plus and one minus three-phonon record per irreducible state, each of `weight`
pub fn add_phonon_records(tables: &mut InMemoryTables, phonon: &Particle, weight: f64) {
    for index in 0..phonon.number_of_ibz_states() {
        let forward = shifted_grid_state(phonon, index, 1);
        let backward = shifted_grid_state(phonon, index, -1);
        tables.push(
            Channel::PhononPlus,
            index,
            TransitionRecord::between(weight, backward, forward),
        );
        tables.push(
            Channel::PhononMinus,
            index,
            TransitionRecord::between(weight, forward, backward),
        );
    }
}

/// Phonon-electron records linking every phonon state to a pair of neighbouring electron
/// states on the same band
pub fn add_phonon_electron_records(
    tables: &mut InMemoryTables,
    phonon: &Particle,
    electron: &Particle,
    weight: f64,
) {
    let electrons = electron.number_of_ibz_states();
    for index in 0..phonon.number_of_ibz_states() {
        let initial = index % electrons;
        tables.push(
            Channel::PhononElectron,
            index,
            TransitionRecord::between(
                weight,
                shifted_grid_state(electron, initial, 0),
                shifted_grid_state(electron, initial, 1),
            ),
        );
    }
}

/// Electron-phonon records: absorption of the phonon at the same grid point as the
/// electron and emission of one interpolated from the electron grid
pub fn add_electron_records(
    tables: &mut InMemoryTables,
    phonon: &Particle,
    electron: &Particle,
    weight: f64,
) {
    let phonon_grid = phonon.mesh().grid();
    for index in 0..electron.number_of_ibz_states() {
        let state = electron.decode_ibz(index);
        let mesh = electron.mesh();
        let grid_index = mesh.grid_index(mesh.representative(state.wavevector));
        let fine_state = phonon.codec().encode(State {
            band: 0,
            wavevector: grid_index,
        });
        let [i, j, k] = mesh.grid().coordinates(grid_index);
        let [n1, n2, n3] = mesh.grid().subdivisions();
        let [m1, m2, m3] = phonon_grid.subdivisions();
        let coarse = phonon_grid.index_of([
            (i * m1 / n1) as isize,
            (j * m2 / n2) as isize,
            (k * m3 / n3) as isize,
        ]);
        let direct_state = phonon.codec().encode(State {
            band: 0,
            wavevector: coarse,
        });
        tables.push(
            Channel::ElectronPlus,
            index,
            TransitionRecord::via_phonon(
                weight,
                PhononRef::Direct(direct_state),
                shifted_grid_state(electron, index, 1),
            ),
        );
        tables.push(
            Channel::ElectronMinus,
            index,
            TransitionRecord::via_phonon(
                weight,
                PhononRef::Interpolated(fine_state),
                shifted_grid_state(electron, index, -1),
            ),
        );
    }
}
