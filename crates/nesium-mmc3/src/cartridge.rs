//! Cartridge-side board logic.
//!
//! Only the MMC3 board lives here, together with two host-side helpers: a
//! [`BankMap`](bank_map::BankMap) that records the windows the mapper selects,
//! and an [`A12Watcher`](a12_watcher::A12Watcher) that turns PPU pattern
//! fetches into the counter clocks the mapper expects.

pub mod a12_watcher;
pub mod bank_map;
pub mod mapper;
pub mod mirroring;

pub use mapper::{BankSize, Mapper, MapperHost, Provider, mapper4, mapper4::Mapper4};
pub use mapper4::Mapper4Registers;
pub use mirroring::Mirroring;
