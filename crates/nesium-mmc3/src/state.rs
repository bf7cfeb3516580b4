//! Save/load interfaces for mapper state.
//!
//! The trait only hands out typed snapshots; callers pick the wire format.
//! With the `savestate-postcard` feature, [`encode`] and [`decode`] provide a
//! compact default.

#[cfg(feature = "savestate-serde")]
use serde::{Deserialize, Serialize};

use crate::cartridge::MapperHost;

/// Metadata stored next to a snapshot to catch mismatched loads.
#[cfg_attr(feature = "savestate-serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotMeta {
    /// Version of the snapshot payload layout.
    pub format_version: u32,
    /// Host frame/tick counter when the snapshot was captured.
    pub tick: u64,
    /// iNES mapper id of the board that produced the payload.
    pub mapper: Option<u16>,
}

impl Default for SnapshotMeta {
    fn default() -> Self {
        Self {
            format_version: 1,
            tick: 0,
            mapper: None,
        }
    }
}

/// Snapshot metadata bundled with its payload.
#[cfg_attr(feature = "savestate-serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot<T, M = SnapshotMeta> {
    pub meta: M,
    pub data: T,
}

/// Minimal save/load contract for a board.
pub trait SaveState {
    type Full;
    type Error;

    /// Bumped whenever the `Full` layout changes; loads of newer versions are
    /// rejected.
    const FORMAT_VERSION: u32 = 1;

    /// Capture the persisted state. The implementation stamps its own
    /// version and mapper id into `meta`.
    fn save_full(&self, meta: SnapshotMeta) -> Result<Snapshot<Self::Full>, Self::Error>;

    /// Restore a snapshot and push the resulting bank windows to `host`.
    fn load_full(
        &mut self,
        host: &mut dyn MapperHost,
        snapshot: &Snapshot<Self::Full>,
    ) -> Result<(), Self::Error>;
}

/// Encode a snapshot with postcard.
#[cfg(feature = "savestate-postcard")]
pub fn encode<T: Serialize>(snapshot: &Snapshot<T>) -> Result<Vec<u8>, crate::Error> {
    Ok(postcard::to_allocvec(snapshot)?)
}

/// Decode a snapshot produced by [`encode`].
#[cfg(feature = "savestate-postcard")]
pub fn decode<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<Snapshot<T>, crate::Error> {
    Ok(postcard::from_bytes(bytes)?)
}
