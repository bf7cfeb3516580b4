//! MMC3 (iNES mapper 4) core for the Nesium emulator.
//!
//! The crate owns the mapper's register file, its PRG/CHR bank translation and
//! the scanline IRQ counter. Everything the chip needs from the rest of the
//! console (bank windows, mirroring, PRG-RAM gating, rendering state, the IRQ
//! line) goes through the [`MapperHost`] trait, so the core can be dropped
//! into any CPU/PPU scheduler that speaks in CPU cycles.
//!
//! ```
//! use nesium_mmc3::{Mapper, Timing, cartridge::mapper};
//! # use nesium_mmc3::{BankSize, MapperHost, Mirroring};
//! # #[derive(Default)]
//! # struct Host;
//! # impl MapperHost for Host {
//! #     fn enable_prg_ram(&mut self, _: bool, _: bool) {}
//! #     fn set_prg_bank(&mut self, _: u16, _: BankSize, _: usize) {}
//! #     fn set_chr_bank(&mut self, _: u16, _: BankSize, _: usize) {}
//! #     fn set_mirroring(&mut self, _: Mirroring) {}
//! #     fn four_screen_mirroring(&self) -> bool { false }
//! #     fn rendering_enabled(&self) -> bool { true }
//! #     fn last_prg_bank(&self) -> usize { 15 }
//! #     fn irq_changed(&mut self) {}
//! # }
//! let mut host = Host::default();
//! let mut mmc3 = mapper::create(4, Timing::NTSC)?;
//! mmc3.reset(&mut host);
//!
//! mmc3.write(&mut host, 0, 0xC000, 5); // IRQ latch
//! mmc3.write(&mut host, 0, 0xC001, 0); // reload
//! mmc3.write(&mut host, 0, 0xE001, 0); // enable
//! assert!(mmc3.next_irq(&host, 0).is_some());
//! # Ok::<(), nesium_mmc3::Error>(())
//! ```

pub mod cartridge;
pub mod config;
pub(crate) mod contract;
pub mod error;
pub mod state;

pub use cartridge::{
    BankSize, Mapper, Mapper4, Mapper4Registers, MapperHost, Mirroring, Provider,
    a12_watcher::{A12Edge, A12Watcher},
    bank_map::BankMap,
};
pub use config::timing::{CpuTime, PpuTime, Timing};
pub use error::Error;
pub use state::{SaveState, Snapshot, SnapshotMeta};
