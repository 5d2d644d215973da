use boltzmann_solver::{
    outer_loop::{electron_part, Convergence, Mode, OuterLoopBuilder, Solution, SpeciesInput},
    parallel::WorkerTeam,
    postprocessor::BoltzmannIntegrator,
    scattering::InMemoryTables,
    Crystal, Particle,
};
use ndarray::Array2;

const TEMPERATURE: f64 = 300.;

fn solve_electron(
    electron: &Particle,
    channels: &[Array2<f64>],
    tables: &InMemoryTables,
    crystal: &Crystal,
    maximum_outer_iterations: usize,
) -> Solution {
    let team = WorkerTeam::new(3).unwrap();
    let aggregator = BoltzmannIntegrator::new(crystal);
    let convergence = Convergence {
        outer_tolerance: 1e-12,
        inner_tolerance: 1e-12,
        maximum_outer_iterations,
        maximum_inner_iterations: 10,
    };
    OuterLoopBuilder::new()
        .with_convergence_settings(&convergence)
        .with_crystal(crystal)
        .with_team(&team)
        .with_tables(tables)
        .with_aggregator(&aggregator)
        .build()
        .solve(
            TEMPERATURE,
            Mode::Electron(SpeciesInput {
                particle: electron,
                rate_channels: channels,
            }),
        )
        .unwrap()
}

/// Electrons on a square lattice whose window leaves out the top of the band
fn windowed_electrons() -> (Particle, Vec<Array2<f64>>, Crystal) {
    let symmetry = utilities::c4z();
    let electron = utilities::electron([4, 4, 1], &symmetry, 0.1, 0.03);
    let channels = vec![utilities::random_rates(&electron, 1.)];
    (
        electron,
        channels,
        Crystal {
            volume: 1.,
            symmetry,
        },
    )
}

#[test]
fn temperature_gradient_response_follows_the_kelvin_relation() {
    let (electron, channels, crystal) = windowed_electrons();
    let solution = solve_electron(&electron, &channels, &InMemoryTables::new(), &crystal, 3);
    let responses = solution.electron.unwrap().responses;
    let expected = electron_part(&electron, &responses.electric_field, TEMPERATURE);
    assert_eq!(responses.temperature_gradient, expected);
}

#[test]
fn sweeps_without_records_leave_the_field_term_in_place() {
    let (electron, channels, crystal) = windowed_electrons();
    let solution = solve_electron(&electron, &channels, &InMemoryTables::new(), &crystal, 4);
    assert!(solution.status.converged);
    let electron_solution = solution.electron.unwrap();
    let (response, field_term) = (
        electron_solution.responses.electric_field.as_array(),
        electron_solution.field_terms.electric_field.as_array(),
    );
    for (value, expected) in response.iter().zip(field_term.iter()) {
        // only rounding noise in the velocities is projected out
        assert!((value - expected).abs() <= 1e-30);
    }
}

#[test]
fn states_outside_the_window_carry_no_response() {
    let (electron, channels, crystal) = windowed_electrons();
    let mut tables = InMemoryTables::new();
    let phonon = utilities::phonon([4, 4, 1], &crystal.symmetry, 1);
    utilities::tables::add_electron_records(&mut tables, &phonon, &electron, 0.1);
    let solution = solve_electron(&electron, &channels, &tables, &crystal, 5);
    let responses = solution.electron.unwrap().responses;

    let mut outside = 0;
    for wavevector in 0..electron.mesh().number_of_fbz_points() {
        if electron.in_window(wavevector, 0) {
            continue;
        }
        outside += 1;
        for response in [&responses.electric_field, &responses.temperature_gradient] {
            assert!(response.get(wavevector, 0).iter().all(|&value| value == 0.));
        }
    }
    assert!(outside > 0);
}

#[test]
fn decoupled_electrons_report_no_deviation() {
    let (electron, channels, crystal) = windowed_electrons();
    let mut tables = InMemoryTables::new();
    let phonon = utilities::phonon([4, 4, 1], &crystal.symmetry, 1);
    utilities::tables::add_electron_records(&mut tables, &phonon, &electron, 0.1);
    let solution = solve_electron(&electron, &channels, &tables, &crystal, 5);
    for record in solution.history.iter() {
        assert!(record.phonon.is_none());
        assert!(record.electron.is_some());
        assert_eq!(record.deviation, Some(0.));
    }
}
