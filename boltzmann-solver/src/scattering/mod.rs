//! # Scattering
//!
//! Sparse transition-probability records of the scattering processes, served per
//! initial state by a `ScatteringTables` provider.
//!
//! Records are keyed by the flat index of an irreducible state. Partners are expressed
//! in the frame of the irreducible representative and rotated into each image by the
//! iterators:
//!
//! | channel          | first partner                | second partner              |
//! |------------------|------------------------------|-----------------------------|
//! | `PhononPlus`     | phonon grid state            | phonon grid state           |
//! | `PhononMinus`    | phonon grid state            | phonon grid state           |
//! | `PhononElectron` | initial electron grid state  | final electron grid state   |
//! | `ElectronPlus`   | phonon reference             | final electron grid state   |
//! | `ElectronMinus`  | phonon reference             | final electron grid state   |

mod disk;
mod memory;

pub use disk::DiskTables;
pub use memory::InMemoryTables;

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Channel {
    /// Three-phonon coalescence
    PhononPlus,
    /// Three-phonon decay
    PhononMinus,
    /// Phonon absorption or emission by an electron, seen from the phonon
    PhononElectron,
    /// Phonon absorption, seen from the electron
    ElectronPlus,
    /// Phonon emission, seen from the electron
    ElectronMinus,
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Channel::PhononPlus => "phonon plus",
            Channel::PhononMinus => "phonon minus",
            Channel::PhononElectron => "phonon-electron",
            Channel::ElectronPlus => "electron plus",
            Channel::ElectronMinus => "electron minus",
        };
        write!(f, "{name}")
    }
}

/// The phonon taking part in an electron-phonon process
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PhononRef {
    /// A state of the phonon grid
    Direct(usize),
    /// A state of the refined electron grid, to be interpolated from the phonon grid
    Interpolated(usize),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Partner {
    State(usize),
    Phonon(PhononRef),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransitionRecord {
    pub weight: f64,
    pub first: Partner,
    pub second: usize,
}

impl TransitionRecord {
    /// A record whose partners are both plain grid states
    pub fn between(weight: f64, first: usize, second: usize) -> Self {
        Self {
            weight,
            first: Partner::State(first),
            second,
        }
    }

    /// An electron-phonon record
    pub fn via_phonon(weight: f64, phonon: PhononRef, second: usize) -> Self {
        Self {
            weight,
            first: Partner::Phonon(phonon),
            second,
        }
    }

    /// The first partner as a grid state, for channels which carry one
    pub fn first_state(&self, channel: Channel) -> Result<usize, ScatteringTableError> {
        match self.first {
            Partner::State(state) => Ok(state),
            Partner::Phonon(_) => Err(ScatteringTableError::UnexpectedPartner(channel)),
        }
    }

    /// The first partner as a phonon reference, for electron channels
    pub fn first_phonon(&self, channel: Channel) -> Result<PhononRef, ScatteringTableError> {
        match self.first {
            Partner::Phonon(phonon) => Ok(phonon),
            Partner::State(_) => Err(ScatteringTableError::UnexpectedPartner(channel)),
        }
    }
}

#[derive(thiserror::Error, Debug, Diagnostic)]
pub enum ScatteringTableError {
    #[error("failed to read scattering records from {path}")]
    #[diagnostic(code(boltzmann::scattering::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed scattering record in {path} at line {line}: {reason}")]
    #[diagnostic(code(boltzmann::scattering::malformed))]
    Malformed {
        path: PathBuf,
        line: usize,
        reason: String,
    },
    #[error("a {0} record carries a partner of the wrong kind")]
    UnexpectedPartner(Channel),
}

/// Read-only source of transition records.
///
/// Implementations are shared by every worker of a sweep and must be safe to call
/// concurrently.
pub trait ScatteringTables: Sync {
    /// All records of `channel` for the irreducible state with flat index `state`
    fn fetch(
        &self,
        channel: Channel,
        state: usize,
    ) -> Result<Vec<TransitionRecord>, ScatteringTableError>;
}

impl<T: ScatteringTables + ?Sized> ScatteringTables for &T {
    fn fetch(
        &self,
        channel: Channel,
        state: usize,
    ) -> Result<Vec<TransitionRecord>, ScatteringTableError> {
        (**self).fetch(channel, state)
    }
}
