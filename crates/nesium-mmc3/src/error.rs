use crate::cartridge::mapper4::Mapper4Registers;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No built-in board or user provider knows this iNES mapper id.
    #[error("mapper {id} is not supported")]
    UnsupportedMapper { id: u16 },
    /// A raw save-state blob does not match the register file layout.
    #[error("save state expected {expected} bytes, got {actual}")]
    StateLength { expected: usize, actual: usize },
    /// Snapshot metadata names a different board than the one loading it.
    #[error("snapshot belongs to mapper {found:?}, expected mapper {expected}")]
    SnapshotMapperMismatch { expected: u16, found: Option<u16> },
    /// Snapshot was written by a newer layout than this build understands.
    #[error("snapshot format version {found} is newer than supported version {supported}")]
    SnapshotVersion { found: u32, supported: u32 },
    #[cfg(feature = "savestate-postcard")]
    #[error("postcard: {0}")]
    Postcard(#[from] postcard::Error),
}

impl Error {
    pub(crate) fn state_length(actual: usize) -> Self {
        Self::StateLength {
            expected: Mapper4Registers::LEN,
            actual,
        }
    }
}
