//! # State codec
//!
//! Scattering states are `(band, wavevector)` pairs. They are addressed by a single flat
//! index
//!
//! ```text
//! index = wavevector * number_of_bands + band
//! ```
//!
//! so that all bands of one wave vector are contiguous. The wave-vector index is whatever
//! set the caller is addressing (IBZ point, FBZ point or grid point); the codec only fixes
//! the band count.

use crate::MeshError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct State {
    pub band: usize,
    pub wavevector: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StateCodec {
    number_of_bands: usize,
}

impl StateCodec {
    pub fn new(number_of_bands: usize) -> Result<Self, MeshError> {
        if number_of_bands == 0 {
            return Err(MeshError::NoBands);
        }
        Ok(Self { number_of_bands })
    }

    pub fn number_of_bands(&self) -> usize {
        self.number_of_bands
    }

    pub fn encode(&self, state: State) -> usize {
        debug_assert!(state.band < self.number_of_bands);
        state.wavevector * self.number_of_bands + state.band
    }

    pub fn decode(&self, index: usize) -> State {
        State {
            band: index % self.number_of_bands,
            wavevector: index / self.number_of_bands,
        }
    }

    /// Total number of states over `number_of_wavevectors` points
    pub fn number_of_states(&self, number_of_wavevectors: usize) -> usize {
        number_of_wavevectors * self.number_of_bands
    }
}
