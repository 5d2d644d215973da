use crate::{Grid, MeshError};
use nalgebra::Matrix3;
use serde::{Deserialize, Serialize};

/// The point group of the crystal.
///
/// Each operation is held twice: as an integer rotation acting on crystal coordinates of
/// reciprocal-space points, and as the matching Cartesian rotation acting on vectors and
/// tensors. Operation zero is the identity. Discovering the group is left to the caller.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Operations", into = "Operations")]
pub struct Symmetry {
    crystal: Vec<Matrix3<i32>>,
    cartesian: Vec<Matrix3<f64>>,
}

/// Unchecked serialised form of a `Symmetry`
#[derive(Clone, Debug, Serialize, Deserialize)]
struct Operations {
    crystal: Vec<Matrix3<i32>>,
    cartesian: Vec<Matrix3<f64>>,
}

impl TryFrom<Operations> for Symmetry {
    type Error = MeshError;

    fn try_from(operations: Operations) -> Result<Self, Self::Error> {
        Symmetry::new(operations.crystal, operations.cartesian)
    }
}

impl From<Symmetry> for Operations {
    fn from(symmetry: Symmetry) -> Self {
        Self {
            crystal: symmetry.crystal,
            cartesian: symmetry.cartesian,
        }
    }
}

impl Symmetry {
    pub fn new(crystal: Vec<Matrix3<i32>>, cartesian: Vec<Matrix3<f64>>) -> Result<Self, MeshError> {
        if crystal.len() != cartesian.len() {
            return Err(MeshError::Symmetry(format!(
                "{} crystal rotations but {} cartesian rotations",
                crystal.len(),
                cartesian.len()
            )));
        }
        match crystal.first() {
            Some(first) if *first == Matrix3::identity() => {}
            _ => {
                return Err(MeshError::Symmetry(
                    "the first operation must be the identity".into(),
                ))
            }
        }
        Ok(Self { crystal, cartesian })
    }

    /// The trivial group
    pub fn identity() -> Self {
        Self {
            crystal: vec![Matrix3::identity()],
            cartesian: vec![Matrix3::identity()],
        }
    }

    /// The group `{E, I}`
    pub fn inversion() -> Self {
        Self {
            crystal: vec![Matrix3::identity(), -Matrix3::identity()],
            cartesian: vec![Matrix3::identity(), -Matrix3::identity()],
        }
    }

    pub fn number_of_operations(&self) -> usize {
        self.crystal.len()
    }

    pub fn crystal(&self, operation: usize) -> &Matrix3<i32> {
        &self.crystal[operation]
    }

    pub fn cartesian(&self, operation: usize) -> &Matrix3<f64> {
        &self.cartesian[operation]
    }

    /// Operations leaving the grid point `index` invariant
    pub fn little_group(&self, grid: &Grid, index: usize) -> Result<Vec<usize>, MeshError> {
        let mut operations = Vec::new();
        for (operation, rotation) in self.crystal.iter().enumerate() {
            if grid.rotate(rotation, index)? == index {
                operations.push(operation);
            }
        }
        Ok(operations)
    }

    /// The projector onto vectors invariant under the little group of `index`: the mean of
    /// the little group's cartesian rotations.
    pub fn symmetrizer(&self, grid: &Grid, index: usize) -> Result<Matrix3<f64>, MeshError> {
        let little_group = self.little_group(grid, index)?;
        let sum = little_group
            .iter()
            .fold(Matrix3::zeros(), |acc, &operation| acc + self.cartesian[operation]);
        Ok(sum / little_group.len() as f64)
    }

    /// Averages a rank-2 tensor over the full group, `(1/|G|) Σ R T Rᵀ`
    pub fn symmetrize_tensor(&self, tensor: &Matrix3<f64>) -> Matrix3<f64> {
        let sum = self.cartesian.iter().fold(Matrix3::zeros(), |acc, rotation| {
            acc + rotation * tensor * rotation.transpose()
        });
        sum / self.cartesian.len() as f64
    }
}

#[cfg(test)]
mod test {
    use super::Symmetry;
    use crate::Grid;
    use approx::assert_relative_eq;
    use nalgebra::Matrix3;

    fn cubic_fourfold() -> Symmetry {
        // Rotations by multiples of 90 degrees about z
        let quarter = Matrix3::new(0, -1, 0, 1, 0, 0, 0, 0, 1);
        let mut crystal = vec![Matrix3::identity()];
        for _ in 0..3 {
            let next = quarter * crystal.last().unwrap();
            crystal.push(next);
        }
        let cartesian = crystal.iter().map(|m| m.cast::<f64>()).collect();
        Symmetry::new(crystal, cartesian).unwrap()
    }

    #[test]
    fn first_operation_must_be_identity() {
        let result = Symmetry::new(vec![-Matrix3::identity()], vec![-Matrix3::identity()]);
        assert!(result.is_err());
    }

    #[test]
    fn deserialized_groups_are_checked() {
        let identity = "[1,0,0,0,1,0,0,0,1]";
        let inversion = "[-1,0,0,0,-1,0,0,0,-1]";

        let valid = format!(
            r#"{{"crystal":[{identity},{inversion}],"cartesian":[{identity},{inversion}]}}"#
        );
        let symmetry: Symmetry = serde_json::from_str(&valid).unwrap();
        assert_eq!(symmetry, Symmetry::inversion());

        let inversion_first =
            format!(r#"{{"crystal":[{inversion}],"cartesian":[{inversion}]}}"#);
        assert!(serde_json::from_str::<Symmetry>(&inversion_first).is_err());

        let unpaired = format!(r#"{{"crystal":[{identity}],"cartesian":[]}}"#);
        assert!(serde_json::from_str::<Symmetry>(&unpaired).is_err());
    }

    #[test]
    fn serialized_groups_read_back_unchanged() {
        let text = serde_json::to_string(&cubic_fourfold()).unwrap();
        let symmetry: Symmetry = serde_json::from_str(&text).unwrap();
        assert_eq!(symmetry, cubic_fourfold());
    }

    #[test]
    fn symmetrizer_is_idempotent() {
        let symmetry = cubic_fourfold();
        let grid = Grid::new([4, 4, 4]).unwrap();
        for index in 0..grid.number_of_points() {
            let projector = symmetry.symmetrizer(&grid, index).unwrap();
            assert_relative_eq!(projector * projector, projector, epsilon = 1e-12);
        }
    }

    #[test]
    fn symmetrizer_on_the_fourfold_axis_keeps_only_z() {
        let symmetry = cubic_fourfold();
        let grid = Grid::new([4, 4, 4]).unwrap();
        let on_axis = grid.index_of([0, 0, 1]);
        let projector = symmetry.symmetrizer(&grid, on_axis).unwrap();
        let mut expected = Matrix3::zeros();
        expected[(2, 2)] = 1.;
        assert_relative_eq!(projector, expected, epsilon = 1e-12);
    }

    #[test]
    fn tensor_symmetrization_of_a_fourfold_group_equalises_xx_and_yy() {
        let symmetry = cubic_fourfold();
        let tensor = Matrix3::new(1., 2., 0., 0., 3., 0., 0., 0., 5.);
        let symmetric = symmetry.symmetrize_tensor(&tensor);
        assert_relative_eq!(symmetric[(0, 0)], 2., epsilon = 1e-12);
        assert_relative_eq!(symmetric[(1, 1)], 2., epsilon = 1e-12);
        assert_relative_eq!(symmetric[(2, 2)], 5., epsilon = 1e-12);
    }
}
