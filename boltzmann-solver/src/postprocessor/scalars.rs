use super::TransportTensors;
use crate::{constants::DEVIATION_FLOOR, FieldPair};
use nalgebra::Matrix3;
use serde::{Deserialize, Serialize};

pub fn trace_average(tensor: &Matrix3<f64>) -> f64 {
    tensor.trace() / 3.
}

/// Scalars tracked by the phonon loop
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PhononScalars {
    pub thermal_conductivity: f64,
    /// Phonon-drag contribution to the Peltier coefficient, divided by temperature
    pub peltier: f64,
}

impl PhononScalars {
    pub fn from_tensors(tensors: &FieldPair<TransportTensors>, temperature: f64) -> Self {
        Self {
            thermal_conductivity: trace_average(&tensors.temperature_gradient.heat),
            peltier: trace_average(&tensors.electric_field.heat) / temperature,
        }
    }

    pub fn values(&self) -> [f64; 2] {
        [self.thermal_conductivity, self.peltier]
    }
}

/// Scalars tracked by the electron loop
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ElectronScalars {
    pub thermal_conductivity: f64,
    /// Conductivity times Seebeck coefficient
    pub seebeck: f64,
    pub conductivity: f64,
    /// Electronic Peltier coefficient, divided by temperature
    pub peltier: f64,
}

impl ElectronScalars {
    pub fn from_tensors(tensors: &FieldPair<TransportTensors>, temperature: f64) -> Self {
        Self {
            thermal_conductivity: trace_average(&tensors.temperature_gradient.heat),
            seebeck: trace_average(&tensors.temperature_gradient.charge),
            conductivity: trace_average(&tensors.electric_field.charge),
            peltier: trace_average(&tensors.electric_field.heat) / temperature,
        }
    }

    pub fn values(&self) -> [f64; 4] {
        [
            self.thermal_conductivity,
            self.seebeck,
            self.conductivity,
            self.peltier,
        ]
    }
}

/// Percentage violation of the Kelvin–Onsager relation `sigma S = alpha_el + alpha_ph`.
///
/// Reported as zero when its magnitude is below the floor or the Peltier sum vanishes.
pub fn deviation(seebeck: f64, electron_peltier: f64, phonon_peltier: f64) -> f64 {
    let peltier = electron_peltier + phonon_peltier;
    if peltier == 0. {
        return 0.;
    }
    let deviation = 100. * (seebeck - peltier) / peltier;
    if deviation.abs() < DEVIATION_FLOOR {
        0.
    } else {
        deviation
    }
}

#[cfg(test)]
mod test {
    use super::{deviation, ElectronScalars};
    use crate::{postprocessor::TransportTensors, FieldPair};
    use approx::assert_relative_eq;
    use nalgebra::Matrix3;

    #[test]
    fn deviation_is_a_percentage_of_the_peltier_sum() {
        assert_relative_eq!(deviation(1.1, 0.6, 0.4), 10., max_relative = 1e-12);
    }

    #[test]
    fn tiny_deviation_is_reported_as_zero() {
        assert_eq!(deviation(1. + 1e-10, 0.5, 0.5), 0.);
    }

    #[test]
    fn vanishing_peltier_sum_gives_zero_deviation() {
        assert_eq!(deviation(3., 0.5, -0.5), 0.);
    }

    #[test]
    fn electron_scalars_read_the_matching_tensors() {
        let tensors = FieldPair {
            temperature_gradient: TransportTensors {
                heat: Matrix3::identity() * 3.,
                charge: Matrix3::identity() * 6.,
            },
            electric_field: TransportTensors {
                heat: Matrix3::identity() * 9.,
                charge: Matrix3::identity() * 12.,
            },
        };
        let scalars = ElectronScalars::from_tensors(&tensors, 3.);
        assert_eq!(scalars.values(), [3., 6., 12., 3.]);
    }
}
