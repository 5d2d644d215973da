use miette::Diagnostic;

#[derive(thiserror::Error, Debug, Diagnostic)]
/// Errors raised while assembling grids, symmetry data and meshes
pub enum MeshError {
    #[error("grid subdivisions must all be positive, got {0:?}")]
    EmptyGrid([usize; 3]),
    #[error("rotating grid point {index} leaves a grid with subdivisions {subdivisions:?}")]
    OffGrid {
        index: usize,
        subdivisions: [usize; 3],
    },
    #[error("operation {operation} maps grid point {grid_index} outside the full zone")]
    NotClosed { grid_index: usize, operation: usize },
    #[error("a state codec needs at least one band")]
    NoBands,
    #[error("{0}")]
    Symmetry(String),
    #[error("{0}")]
    Equivalence(String),
}
