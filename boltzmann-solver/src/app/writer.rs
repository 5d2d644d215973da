use super::reader::temperature_directory;
use crate::{
    outer_loop::{Solution, SpeciesSolution},
    Field,
};
use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

/// Writes a `Solution` below `output/T<temperature>`.
///
/// `label` prefixes the diagnostics file so that independent solutions at the same
/// temperature do not overwrite each other.
pub(crate) fn write_solution(
    output: &Path,
    temperature: f64,
    label: &str,
    solution: &Solution,
) -> Result<(), std::io::Error> {
    let mut write_path = output.to_path_buf();
    write_path.push(temperature_directory(temperature));

    // If the write directory for this temperature does not exist then create it
    if !write_path.exists() {
        std::fs::create_dir_all(&write_path)?;
    }

    write_diagnostics(&write_path.join(format!("{label}_diagnostics.csv")), solution)?;
    for species in [&solution.phonon, &solution.electron].into_iter().flatten() {
        write_rates(&write_path, species)?;
        write_tensors(&write_path, species)?;
    }
    Ok(())
}

fn write_diagnostics(path: &Path, solution: &Solution) -> Result<(), std::io::Error> {
    let mut file = BufWriter::new(File::create(path)?);
    writeln!(
        file,
        "iteration, kappa_ph, alpha_ph, kappa_el, sigma_s, sigma, alpha_el, deviation, lambda"
    )?;
    let optional = |value: Option<f64>| value.map(|value| value.to_string()).unwrap_or_default();
    for record in solution.history.iter() {
        let phonon = record.phonon.map(|scalars| scalars.values());
        let electron = record.electron.map(|scalars| scalars.values());
        writeln!(
            file,
            "{}, {}, {}, {}, {}, {}, {}, {}, {}",
            record.iteration,
            optional(phonon.map(|values| values[0])),
            optional(phonon.map(|values| values[1])),
            optional(electron.map(|values| values[0])),
            optional(electron.map(|values| values[1])),
            optional(electron.map(|values| values[2])),
            optional(electron.map(|values| values[3])),
            optional(record.deviation),
            optional(record.drag_scaling.map(|scaling| scaling.lambda)),
        )?;
    }
    writeln!(
        file,
        "# {} after {} iterations",
        if solution.status.converged {
            "converged"
        } else {
            "not converged"
        },
        solution.status.iterations
    )?;
    file.flush()
}

fn write_rates(directory: &Path, solution: &SpeciesSolution) -> Result<(), std::io::Error> {
    let path: PathBuf = directory.join(format!("{}_rta_rates.csv", solution.species));
    let mut file = BufWriter::new(File::create(path)?);
    for row in solution.rates.rates().rows() {
        let line = row
            .iter()
            .map(|rate| rate.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        writeln!(file, "{line}")?;
    }
    file.flush()
}

fn write_tensors(directory: &Path, solution: &SpeciesSolution) -> Result<(), std::io::Error> {
    let path = directory.join(format!("{}_tensors.csv", solution.species));
    let mut file = BufWriter::new(File::create(path)?);
    writeln!(file, "field, current, xx, xy, xz, yx, yy, yz, zx, zy, zz")?;
    for field in Field::ALL {
        let tensors = solution.tensors.get(field);
        for (current, tensor) in [("heat", &tensors.heat), ("charge", &tensors.charge)] {
            let components = tensor
                .transpose()
                .iter()
                .map(|value| value.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            writeln!(file, "{field}, {current}, {components}")?;
        }
    }
    file.flush()
}
