//! # Grid
//!
//! A Γ-centred regular subdivision of the reciprocal unit cell. Point `(i, j, k)` sits at
//! crystal coordinate `(i / n1, j / n2, k / n3)` and carries the flat index
//! `i + n1 * (j + n2 * k)`. All index arithmetic wraps periodically.

use crate::MeshError;
use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    subdivisions: [usize; 3],
}

impl Grid {
    pub fn new(subdivisions: [usize; 3]) -> Result<Self, MeshError> {
        if subdivisions.iter().any(|&n| n == 0) {
            return Err(MeshError::EmptyGrid(subdivisions));
        }
        Ok(Self { subdivisions })
    }

    pub fn subdivisions(&self) -> [usize; 3] {
        self.subdivisions
    }

    pub fn number_of_points(&self) -> usize {
        self.subdivisions.iter().product()
    }

    /// The flat index of the integer coordinate `ijk`, folded back into the grid
    pub fn index_of(&self, ijk: [isize; 3]) -> usize {
        let [n1, n2, n3] = self.subdivisions;
        let wrap = |value: isize, n: usize| value.rem_euclid(n as isize) as usize;
        wrap(ijk[0], n1) + n1 * (wrap(ijk[1], n2) + n2 * wrap(ijk[2], n3))
    }

    pub fn coordinates(&self, index: usize) -> [usize; 3] {
        let [n1, n2, _] = self.subdivisions;
        [index % n1, (index / n1) % n2, index / (n1 * n2)]
    }

    /// Fractional coordinate of the grid point in the reciprocal basis
    pub fn crystal_coordinates(&self, index: usize) -> Vector3<f64> {
        let ijk = self.coordinates(index);
        Vector3::from_fn(|a, _| ijk[a] as f64 / self.subdivisions[a] as f64)
    }

    /// Applies an integer crystal rotation to a grid point.
    ///
    /// Errors if the rotated point does not land on the grid, which happens when the
    /// subdivisions do not respect the rotation.
    pub fn rotate(&self, rotation: &Matrix3<i32>, index: usize) -> Result<usize, MeshError> {
        let rotated = rotation.cast::<f64>() * self.crystal_coordinates(index);
        let mut ijk = [0_isize; 3];
        for (a, value) in ijk.iter_mut().enumerate() {
            let scaled = rotated[a] * self.subdivisions[a] as f64;
            let nearest = scaled.round();
            if (scaled - nearest).abs() > 1e-6 {
                return Err(MeshError::OffGrid {
                    index,
                    subdivisions: self.subdivisions,
                });
            }
            *value = nearest as isize;
        }
        Ok(self.index_of(ijk))
    }

    /// A grid with every subdivision multiplied by `factor`
    pub fn refine(&self, factor: usize) -> Result<Self, MeshError> {
        Self::new(self.subdivisions.map(|n| n * factor))
    }

    /// The eight corners bracketing `coordinate` (crystal units) and their trilinear weights
    pub fn trilinear_weights(&self, coordinate: &Vector3<f64>) -> [(usize, f64); 8] {
        let mut lower = [0_isize; 3];
        let mut fraction = [0_f64; 3];
        for a in 0..3 {
            let scaled = coordinate[a] * self.subdivisions[a] as f64;
            let floor = scaled.floor();
            lower[a] = floor as isize;
            fraction[a] = scaled - floor;
        }

        let mut corners = [(0, 0_f64); 8];
        for (corner, slot) in corners.iter_mut().enumerate() {
            let shift = [corner & 1, (corner >> 1) & 1, (corner >> 2) & 1];
            let mut weight = 1_f64;
            let mut ijk = lower;
            for a in 0..3 {
                if shift[a] == 1 {
                    ijk[a] += 1;
                    weight *= fraction[a];
                } else {
                    weight *= 1_f64 - fraction[a];
                }
            }
            *slot = (self.index_of(ijk), weight);
        }
        corners
    }
}
