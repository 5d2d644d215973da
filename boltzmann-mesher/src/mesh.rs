use crate::{Grid, MeshError, Symmetry};
use nalgebra::Matrix3;

/// A point of the full zone reached from an irreducible point by a point-group operation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Image {
    /// Index of the operation in the crystal's `Symmetry`
    pub operation: usize,
    /// Index of the image in the full zone
    pub wavevector: usize,
}

/// A reciprocal-space mesh split into irreducible (IBZ) and full (FBZ) zones.
///
/// The full zone is a sorted list of grid indices: either every point of the grid, or a
/// subset such as the wave vectors inside an electronic energy window. Positions in that
/// list are the FBZ indices used everywhere else.
#[derive(Clone, Debug)]
pub struct Mesh {
    grid: Grid,
    /// Order of the point group the maps were built with
    number_of_operations: usize,
    /// Grid index of every FBZ point, sorted ascending
    wavevectors: Vec<usize>,
    /// FBZ index of the representative of every IBZ point
    irreducible: Vec<usize>,
    /// The images of every IBZ point
    images: Vec<Vec<Image>>,
    /// The IBZ class of every FBZ point
    classes: Vec<usize>,
    /// The projector enforcing the little-group invariance of every FBZ point
    symmetrizers: Vec<Matrix3<f64>>,
}

impl Mesh {
    /// Assembles a mesh from externally computed equivalence maps.
    ///
    /// Every FBZ point must occur in exactly one IBZ class, each IBZ representative must be
    /// among its own images, and every image must name an operation of `symmetry`.
    pub fn from_equivalence(
        grid: Grid,
        symmetry: &Symmetry,
        wavevectors: Vec<usize>,
        irreducible: Vec<usize>,
        images: Vec<Vec<Image>>,
        symmetrizers: Vec<Matrix3<f64>>,
    ) -> Result<Self, MeshError> {
        if wavevectors.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(MeshError::Equivalence(
                "full-zone wave vectors must be strictly ascending".into(),
            ));
        }
        if let Some(&last) = wavevectors.last() {
            if last >= grid.number_of_points() {
                return Err(MeshError::Equivalence(format!(
                    "grid index {last} lies outside a grid of {} points",
                    grid.number_of_points()
                )));
            }
        }
        if irreducible.len() != images.len() {
            return Err(MeshError::Equivalence(format!(
                "{} irreducible points but {} image lists",
                irreducible.len(),
                images.len()
            )));
        }
        if symmetrizers.len() != wavevectors.len() {
            return Err(MeshError::Equivalence(format!(
                "{} symmetrizers for {} full-zone points",
                symmetrizers.len(),
                wavevectors.len()
            )));
        }

        let mut classes = vec![None; wavevectors.len()];
        for (class, (representative, class_images)) in
            irreducible.iter().zip(images.iter()).enumerate()
        {
            if !class_images
                .iter()
                .any(|image| image.wavevector == *representative)
            {
                return Err(MeshError::Equivalence(format!(
                    "irreducible point {class} is not among its own images"
                )));
            }
            for image in class_images {
                if image.operation >= symmetry.number_of_operations() {
                    return Err(MeshError::Equivalence(format!(
                        "image {} of irreducible point {class} uses operation {} of a group of {}",
                        image.wavevector,
                        image.operation,
                        symmetry.number_of_operations()
                    )));
                }
                let slot = classes.get_mut(image.wavevector).ok_or_else(|| {
                    MeshError::Equivalence(format!(
                        "image {} lies outside the full zone",
                        image.wavevector
                    ))
                })?;
                if let Some(previous) = slot {
                    return Err(MeshError::Equivalence(format!(
                        "full-zone point {} belongs to classes {previous} and {class}",
                        image.wavevector
                    )));
                }
                *slot = Some(class);
            }
        }
        let classes = classes
            .into_iter()
            .enumerate()
            .map(|(point, class)| {
                class.ok_or_else(|| {
                    MeshError::Equivalence(format!("full-zone point {point} has no class"))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            grid,
            number_of_operations: symmetry.number_of_operations(),
            wavevectors,
            irreducible,
            images,
            classes,
            symmetrizers,
        })
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn number_of_operations(&self) -> usize {
        self.number_of_operations
    }

    pub fn number_of_fbz_points(&self) -> usize {
        self.wavevectors.len()
    }

    pub fn number_of_ibz_points(&self) -> usize {
        self.irreducible.len()
    }

    /// True when the full zone covers the entire grid
    pub fn is_complete(&self) -> bool {
        self.wavevectors.len() == self.grid.number_of_points()
    }

    pub fn grid_index(&self, wavevector: usize) -> usize {
        self.wavevectors[wavevector]
    }

    /// FBZ index of a grid point, found by binary search
    pub fn locate(&self, grid_index: usize) -> Option<usize> {
        self.wavevectors.binary_search(&grid_index).ok()
    }

    pub fn representative(&self, irreducible: usize) -> usize {
        self.irreducible[irreducible]
    }

    pub fn images(&self, irreducible: usize) -> &[Image] {
        &self.images[irreducible]
    }

    /// The IBZ class the FBZ point `wavevector` belongs to
    pub fn class_of(&self, wavevector: usize) -> usize {
        self.classes[wavevector]
    }

    pub fn symmetrizer(&self, wavevector: usize) -> &Matrix3<f64> {
        &self.symmetrizers[wavevector]
    }

    /// Rotates the FBZ point `wavevector` by `operation`, returning the FBZ index of the
    /// result or `None` when it falls outside the full zone
    pub fn rotate(
        &self,
        symmetry: &Symmetry,
        operation: usize,
        wavevector: usize,
    ) -> Result<Option<usize>, MeshError> {
        let rotated = self
            .grid
            .rotate(symmetry.crystal(operation), self.wavevectors[wavevector])?;
        Ok(self.locate(rotated))
    }
}

#[cfg(test)]
mod test {
    use super::{Image, Mesh};
    use crate::{Grid, MeshError, Symmetry};
    use nalgebra::Matrix3;

    fn two_point_grid() -> Grid {
        Grid::new([2, 1, 1]).unwrap()
    }

    #[test]
    fn point_in_two_classes_is_rejected() {
        let images = vec![
            vec![Image { operation: 0, wavevector: 0 }],
            vec![
                Image { operation: 0, wavevector: 1 },
                Image { operation: 1, wavevector: 0 },
            ],
        ];
        let result = Mesh::from_equivalence(
            two_point_grid(),
            &Symmetry::inversion(),
            vec![0, 1],
            vec![0, 1],
            images,
            vec![Matrix3::identity(); 2],
        );
        assert!(result.is_err());
    }

    #[test]
    fn point_without_class_is_rejected() {
        let images = vec![vec![Image { operation: 0, wavevector: 0 }]];
        let result = Mesh::from_equivalence(
            two_point_grid(),
            &Symmetry::identity(),
            vec![0, 1],
            vec![0],
            images,
            vec![Matrix3::identity(); 2],
        );
        assert!(result.is_err());
    }

    #[test]
    fn partial_zone_is_located_by_grid_index() {
        let grid = Grid::new([4, 1, 1]).unwrap();
        let images = vec![
            vec![Image { operation: 0, wavevector: 0 }],
            vec![Image { operation: 0, wavevector: 1 }],
        ];
        let mesh = Mesh::from_equivalence(
            grid,
            &Symmetry::identity(),
            vec![1, 3],
            vec![0, 1],
            images,
            vec![Matrix3::identity(); 2],
        )
        .unwrap();
        assert_eq!(mesh.locate(3), Some(1));
        assert_eq!(mesh.locate(2), None);
        assert!(!mesh.is_complete());
        assert_eq!(mesh.class_of(1), 1);
    }

    #[test]
    fn image_with_an_unknown_operation_is_rejected() {
        let grid = Grid::new([1, 1, 1]).unwrap();
        let images = vec![vec![Image { operation: 7, wavevector: 0 }]];
        let result = Mesh::from_equivalence(
            grid,
            &Symmetry::identity(),
            vec![0],
            vec![0],
            images,
            vec![Matrix3::identity()],
        );
        assert!(matches!(result, Err(MeshError::Equivalence(_))));
    }
}
