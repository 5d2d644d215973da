use crate::{BuildError, ResponseFunction};
use boltzmann_mesher::Mesh;

/// Projects every vector of `response` onto the subspace left invariant by the little
/// group of its wave vector
pub fn symmetrize(mesh: &Mesh, response: &mut ResponseFunction) -> Result<(), BuildError> {
    if response.number_of_fbz_points() != mesh.number_of_fbz_points() {
        return Err(BuildError::Shape(format!(
            "response covers {} wave vectors but the mesh has {}",
            response.number_of_fbz_points(),
            mesh.number_of_fbz_points()
        )));
    }
    for wavevector in 0..mesh.number_of_fbz_points() {
        let projector = mesh.symmetrizer(wavevector);
        for band in 0..response.number_of_bands() {
            let projected = projector * response.get(wavevector, band);
            response.set(wavevector, band, &projected);
        }
    }
    Ok(())
}
