use std::{borrow::Cow, fmt::Debug};

use dyn_clone::DynClone;
use tracing::debug;

use crate::{
    cartridge::Mirroring,
    config::timing::{CpuTime, Timing},
    error::Error,
};

pub mod mapper4;
pub mod provider;

pub use mapper4::Mapper4;
pub use provider::Provider;

/// Granularity of a bank window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BankSize {
    Size1K,
    Size2K,
    Size8K,
}

impl BankSize {
    /// Window length in bytes.
    #[inline]
    pub const fn bytes(self) -> usize {
        match self {
            BankSize::Size1K => 0x0400,
            BankSize::Size2K => 0x0800,
            BankSize::Size8K => 0x2000,
        }
    }
}

/// Everything a mapper needs from the console it is plugged into.
///
/// Bank numbers are in units of the [`BankSize`] passed alongside them, so a
/// 2 KiB CHR bank `3` starts at byte `0x1800` of CHR memory.
pub trait MapperHost {
    /// Gate the `$6000-$7FFF` PRG-RAM chip.
    fn enable_prg_ram(&mut self, enabled: bool, write_protected: bool);

    /// Map the CPU window starting at `addr` to PRG bank `bank`.
    fn set_prg_bank(&mut self, addr: u16, size: BankSize, bank: usize);

    /// Map the PPU window starting at `addr` to CHR bank `bank`.
    fn set_chr_bank(&mut self, addr: u16, size: BankSize, bank: usize);

    fn set_mirroring(&mut self, mirroring: Mirroring);

    /// True when the board wires its own four nametables, which overrides any
    /// mapper-controlled mirroring.
    fn four_screen_mirroring(&self) -> bool;

    /// True while the PPU is fetching background tiles.
    fn rendering_enabled(&self) -> bool;

    /// Index of the last 8 KiB PRG-ROM bank, from the cartridge geometry.
    fn last_prg_bank(&self) -> usize;

    /// The mapper's IRQ output may have changed; the host should re-query
    /// [`Mapper::irq_pending`] and [`Mapper::next_irq`].
    fn irq_changed(&mut self);
}

/// A cartridge board driven by a cycle-stamped host.
///
/// All `time` arguments are CPU cycles since the start of the current frame
/// and must not go backwards between [`Mapper::end_frame`] calls.
pub trait Mapper: DynClone + Debug + Send {
    /// Power-on state, including every bank window.
    fn reset(&mut self, host: &mut dyn MapperHost);

    /// Push the whole register file to the host again (after reset or a
    /// state load) and rearm the frame.
    fn apply_mapping(&mut self, host: &mut dyn MapperHost);

    /// A CPU write that the host's bus decoder routed to the mapper.
    fn write(&mut self, host: &mut dyn MapperHost, time: CpuTime, addr: u16, data: u8);

    /// Rearm per-frame timing at the start of a frame.
    fn start_frame(&mut self) {}

    /// Catch up on everything that happens before `end_time`.
    fn run_until(&mut self, _host: &dyn MapperHost, _end_time: CpuTime) {}

    /// The PPU produced a qualifying A12 rising edge at `time`.
    fn a12_clocked(&mut self, _host: &mut dyn MapperHost, _time: CpuTime) {}

    /// Flush the frame up to `end_time` and rearm for the next one.
    fn end_frame(&mut self, host: &dyn MapperHost, end_time: CpuTime) {
        self.run_until(host, end_time);
        self.start_frame();
    }

    /// Earliest time at which the mapper will assert its IRQ, or `None` when
    /// no IRQ can fire in the rest of this frame. `Some(0)` means it is
    /// already asserted.
    fn next_irq(&mut self, _host: &dyn MapperHost, _present: CpuTime) -> Option<CpuTime> {
        None
    }

    /// Current level of the IRQ output.
    fn irq_pending(&self) -> bool {
        false
    }

    /// Serialize the persisted register file.
    fn save_state(&self) -> Vec<u8>;

    /// Restore a blob produced by [`Mapper::save_state`] and reapply it.
    fn load_state(&mut self, host: &mut dyn MapperHost, bytes: &[u8]) -> Result<(), Error>;

    fn mapper_id(&self) -> u16;

    fn name(&self) -> Cow<'static, str> {
        Cow::Owned(format!("Mapper {}", self.mapper_id()))
    }
}

dyn_clone::clone_trait_object!(Mapper);

/// Build the board for an iNES mapper id.
pub fn create(id: u16, timing: Timing) -> Result<Box<dyn Mapper>, Error> {
    create_with_provider(id, timing, None)
}

/// Build the board for an iNES mapper id, asking `provider` for ids the core
/// does not implement.
pub fn create_with_provider(
    id: u16,
    timing: Timing,
    provider: Option<&dyn Provider>,
) -> Result<Box<dyn Mapper>, Error> {
    match id {
        Mapper4::ID => Ok(Box::new(Mapper4::new(timing))),
        _ => {
            debug!(id, "mapper not built in, consulting provider");
            provider
                .and_then(|provider| provider.get_mapper(id, timing))
                .ok_or(Error::UnsupportedMapper { id })
        }
    }
}
