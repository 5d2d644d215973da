use crate::mesh::{Image, Mesh};
use crate::{Grid, MeshError, Symmetry};

/// Builds the IBZ/FBZ maps of a grid by orbit enumeration.
///
/// `kept` restricts the full zone to a subset of grid indices (for example the electronic
/// states inside a transport window); `None` keeps the whole grid. The subset must be
/// closed under the point group. Points are visited in ascending grid order and the first
/// unvisited point of every orbit becomes the irreducible representative.
pub fn create_irreducible_mesh(
    grid: Grid,
    symmetry: &Symmetry,
    kept: Option<Vec<usize>>,
) -> Result<Mesh, MeshError> {
    let mut wavevectors = kept.unwrap_or_else(|| (0..grid.number_of_points()).collect());
    wavevectors.sort_unstable();
    wavevectors.dedup();

    let locate = |grid_index: usize| wavevectors.binary_search(&grid_index).ok();

    let mut visited = vec![false; wavevectors.len()];
    let mut irreducible = Vec::new();
    let mut images = Vec::new();

    for (point, &grid_index) in wavevectors.iter().enumerate() {
        if visited[point] {
            continue;
        }
        let mut orbit = Vec::new();
        for operation in 0..symmetry.number_of_operations() {
            let rotated = grid.rotate(symmetry.crystal(operation), grid_index)?;
            let image = locate(rotated).ok_or(MeshError::NotClosed {
                grid_index,
                operation,
            })?;
            if !visited[image] {
                visited[image] = true;
                orbit.push(Image {
                    operation,
                    wavevector: image,
                });
            }
        }
        irreducible.push(point);
        images.push(orbit);
    }

    let symmetrizers = wavevectors
        .iter()
        .map(|&grid_index| symmetry.symmetrizer(&grid, grid_index))
        .collect::<Result<Vec<_>, _>>()?;

    Mesh::from_equivalence(grid, symmetry, wavevectors, irreducible, images, symmetrizers)
}

#[cfg(test)]
mod test {
    use super::create_irreducible_mesh;
    use crate::{Grid, Symmetry};
    use approx::assert_relative_eq;
    use nalgebra::Matrix3;

    #[test]
    fn identity_group_makes_every_point_irreducible() {
        let grid = Grid::new([3, 2, 2]).unwrap();
        let mesh = create_irreducible_mesh(grid, &Symmetry::identity(), None).unwrap();
        assert_eq!(mesh.number_of_ibz_points(), 12);
        assert_eq!(mesh.number_of_fbz_points(), 12);
        for irreducible in 0..mesh.number_of_ibz_points() {
            assert_eq!(mesh.images(irreducible).len(), 1);
        }
    }

    #[test]
    fn inversion_halves_the_zone_away_from_invariant_points() {
        let grid = Grid::new([4, 1, 1]).unwrap();
        let mesh = create_irreducible_mesh(grid, &Symmetry::inversion(), None).unwrap();
        // 0 and 2 are their own inverses, 1 and 3 are paired
        assert_eq!(mesh.number_of_ibz_points(), 3);
        let paired = mesh.class_of(1);
        assert_eq!(mesh.class_of(3), paired);
        assert_eq!(mesh.images(paired).len(), 2);
    }

    #[test]
    fn every_full_zone_point_has_exactly_one_class() {
        let grid = Grid::new([4, 4, 2]).unwrap();
        let mesh = create_irreducible_mesh(grid, &Symmetry::inversion(), None).unwrap();
        let mut seen = vec![0; mesh.number_of_fbz_points()];
        for irreducible in 0..mesh.number_of_ibz_points() {
            for image in mesh.images(irreducible) {
                seen[image.wavevector] += 1;
            }
        }
        assert!(seen.iter().all(|&count| count == 1));
    }

    #[test]
    fn invariant_points_under_inversion_have_vanishing_symmetrizer() {
        let grid = Grid::new([4, 1, 1]).unwrap();
        let mesh = create_irreducible_mesh(grid, &Symmetry::inversion(), None).unwrap();
        assert_relative_eq!(*mesh.symmetrizer(0), Matrix3::zeros());
        assert_relative_eq!(*mesh.symmetrizer(1), Matrix3::identity());
    }

    #[test]
    fn subset_not_closed_under_the_group_is_rejected() {
        let grid = Grid::new([4, 1, 1]).unwrap();
        let result = create_irreducible_mesh(grid, &Symmetry::inversion(), Some(vec![0, 1]));
        assert!(result.is_err());
    }
}
