use crate::BuildError;
use nalgebra::Vector3;
use ndarray::{Array3, Zip};

/// A Cartesian 3-vector for every FBZ state, shape `(fbz points, bands, 3)`.
///
/// Field terms and the iterated solutions of the linearised BTE share this layout.
#[derive(Clone, Debug, PartialEq)]
pub struct ResponseFunction {
    values: Array3<f64>,
}

impl ResponseFunction {
    pub fn zeros(number_of_fbz_points: usize, number_of_bands: usize) -> Self {
        Self {
            values: Array3::zeros((number_of_fbz_points, number_of_bands, 3)),
        }
    }

    pub fn from_array(values: Array3<f64>) -> Result<Self, BuildError> {
        if values.dim().2 != 3 {
            return Err(BuildError::Shape(format!(
                "a response function carries three Cartesian components, got shape {:?}",
                values.dim()
            )));
        }
        Ok(Self { values })
    }

    pub fn number_of_fbz_points(&self) -> usize {
        self.values.dim().0
    }

    pub fn number_of_bands(&self) -> usize {
        self.values.dim().1
    }

    pub fn as_array(&self) -> &Array3<f64> {
        &self.values
    }

    pub fn into_array(self) -> Array3<f64> {
        self.values
    }

    pub fn get(&self, wavevector: usize, band: usize) -> Vector3<f64> {
        Vector3::from_fn(|a, _| self.values[[wavevector, band, a]])
    }

    pub fn set(&mut self, wavevector: usize, band: usize, value: &Vector3<f64>) {
        for a in 0..3 {
            self.values[[wavevector, band, a]] = value[a];
        }
    }

    /// `self * scale + other * other_scale`, element-wise
    pub fn combine(&self, scale: f64, other: &Self, other_scale: f64) -> Self {
        let values = Zip::from(&self.values)
            .and(&other.values)
            .map_collect(|&a, &b| a * scale + b * other_scale);
        Self { values }
    }

    pub fn scaled(&self, scale: f64) -> Self {
        Self {
            values: &self.values * scale,
        }
    }
}
