use tracing::debug;

use super::{Mapper4, Mapper4Registers};
use crate::{
    cartridge::mapper::{Mapper, MapperHost},
    error::Error,
    state::{SaveState, Snapshot, SnapshotMeta},
};

impl Mapper4 {
    /// Swap in a register file and replay its effects on the host.
    ///
    /// Timing cursors are not part of the register file; the frame is rearmed
    /// as if it had just started.
    pub(super) fn restore(&mut self, host: &mut dyn MapperHost, regs: Mapper4Registers) {
        self.regs = regs;
        self.counter_just_clocked = 0;
        self.apply_mapping(host);
        if self.regs.irq_enabled {
            host.irq_changed();
        }
        debug!(
            mode = self.regs.mode,
            irq_ctr = self.regs.irq_ctr,
            irq_flag = self.regs.irq_flag,
            "MMC3 state restored"
        );
    }
}

impl SaveState for Mapper4 {
    type Full = Mapper4Registers;
    type Error = Error;

    fn save_full(&self, mut meta: SnapshotMeta) -> Result<Snapshot<Self::Full>, Self::Error> {
        meta.format_version = Self::FORMAT_VERSION;
        meta.mapper = Some(Self::ID);
        Ok(Snapshot {
            meta,
            data: self.regs,
        })
    }

    fn load_full(
        &mut self,
        host: &mut dyn MapperHost,
        snapshot: &Snapshot<Self::Full>,
    ) -> Result<(), Self::Error> {
        if snapshot.meta.mapper != Some(Self::ID) {
            return Err(Error::SnapshotMapperMismatch {
                expected: Self::ID,
                found: snapshot.meta.mapper,
            });
        }
        if snapshot.meta.format_version > Self::FORMAT_VERSION {
            return Err(Error::SnapshotVersion {
                found: snapshot.meta.format_version,
                supported: Self::FORMAT_VERSION,
            });
        }

        self.restore(host, snapshot.data);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::powered_on;
    use super::*;

    #[test]
    fn blob_round_trip_restores_windows() {
        let (mut mapper, mut host) = powered_on();
        mapper.write(&mut host, 0, 0x8000, 0xC6);
        mapper.write(&mut host, 0, 0x8001, 12);
        mapper.write(&mut host, 0, 0xA000, 0);
        mapper.write(&mut host, 0, 0xA001, 0x80);
        mapper.write(&mut host, 0, 0xC000, 9);
        let blob = mapper.save_state();
        assert_eq!(blob.len(), Mapper4Registers::LEN);

        let (mut other, mut other_host) = powered_on();
        other.load_state(&mut other_host, &blob).expect("load");

        assert_eq!(other.registers(), mapper.registers());
        assert_eq!(other_host.map, host.map);
        assert_eq!(other_host.mirroring, host.mirroring);
        assert_eq!(other_host.prg_ram, Some((true, false)));
    }

    #[test]
    fn bad_blob_leaves_state_alone() {
        let (mut mapper, mut host) = powered_on();
        mapper.write(&mut host, 0, 0xC000, 9);

        let err = mapper.load_state(&mut host, &[0; 3]).expect_err("short blob");
        assert!(matches!(err, Error::StateLength { actual: 3, .. }));
        assert_eq!(mapper.registers().irq_latch, 9);
    }

    #[test]
    fn restored_pending_irq_is_announced() {
        let (mut mapper, mut host) = powered_on();
        mapper.write(&mut host, 0, 0xE001, 0);
        mapper.a12_clocked(&mut host, 1);
        let snapshot = mapper.save_full(SnapshotMeta::default()).expect("save");
        assert_eq!(snapshot.meta.mapper, Some(Mapper4::ID));

        let (mut other, mut other_host) = powered_on();
        other.load_full(&mut other_host, &snapshot).expect("load");
        assert!(other.irq_pending());
        assert_eq!(other_host.irq_notifications, 1);
    }

    #[test]
    fn rejects_foreign_snapshots() {
        let (mut mapper, mut host) = powered_on();
        let mut snapshot = mapper.save_full(SnapshotMeta::default()).expect("save");

        snapshot.meta.mapper = Some(1);
        let err = mapper.load_full(&mut host, &snapshot).expect_err("wrong board");
        assert!(matches!(
            err,
            Error::SnapshotMapperMismatch {
                expected: 4,
                found: Some(1)
            }
        ));

        snapshot.meta.mapper = Some(Mapper4::ID);
        snapshot.meta.format_version = 2;
        let err = mapper.load_full(&mut host, &snapshot).expect_err("future layout");
        assert!(matches!(err, Error::SnapshotVersion { found: 2, .. }));
    }

    #[cfg(feature = "savestate-postcard")]
    #[test]
    fn postcard_round_trip() {
        let (mut mapper, mut host) = powered_on();
        mapper.write(&mut host, 0, 0x8000, 0x47);
        mapper.write(&mut host, 0, 0x8001, 3);

        let snapshot = mapper.save_full(SnapshotMeta::default()).expect("save");
        let bytes = crate::state::encode(&snapshot).expect("encode");
        let decoded = crate::state::decode::<Mapper4Registers>(&bytes).expect("decode");
        assert_eq!(decoded, snapshot);
    }
}
