//! Mapper 4 (MMC3) implementation.
//!
//! This mapper powers many of the most popular NES games (e.g. Super Mario
//! Bros. 3, Kirby's Adventure). It provides:
//! - 8 KiB PRG-ROM banking with two switchable windows and two fixed windows.
//! - CHR banking using 2 KiB + 1 KiB pages with optional A12 inversion.
//! - A scanline IRQ counter, clocked lazily from frame timing and directly by
//!   PPU A12 rising edges.
//! - Mapper-controlled mirroring and PRG-RAM enable/write-protect bits.
//!
//! The core never touches ROM bytes itself: every window change is pushed to
//! the [`MapperHost`], and only when the register bits that feed that window
//! actually change.
//!
//! | Area | Address range     | Behaviour                                       |
//! |------|-------------------|-------------------------------------------------|
//! | CPU  | `$8000-$9FFF`     | R6 or second-last bank; bank select/data regs   |
//! | CPU  | `$A000-$BFFF`     | R7; mirroring and PRG-RAM control regs          |
//! | CPU  | `$C000-$DFFF`     | Second-last bank or R6; IRQ latch/reload regs   |
//! | CPU  | `$E000-$FFFF`     | Last bank; IRQ disable/enable regs              |
//! | PPU  | `$0000-$1FFF`     | 2×2 KiB + 4×1 KiB CHR banks, A12-invertible     |

use std::borrow::Cow;

use tracing::debug;

use crate::{
    cartridge::{
        Mirroring,
        mapper::{BankSize, Mapper, MapperHost},
    },
    config::timing::{CpuTime, PpuTime, Timing},
    contract::contract,
    error::Error,
};

mod irq;
mod registers;
mod savestate;

pub use registers::Mapper4Registers;
use registers::{MODE_CHR_INVERT, MODE_PRG_SWAP};

/// Register decode: A15-A13 pick the 8 KiB window, A0 picks even/odd.
const REGISTER_DECODE_MASK: u16 = 0xE001;

/// CPU `$8000-$9FFF`: first 8 KiB PRG-ROM window.
const PRG_WINDOW_8000: u16 = 0x8000;
/// CPU `$A000-$BFFF`: always R7.
const PRG_WINDOW_A000: u16 = 0xA000;
/// CPU `$C000-$DFFF`: R6 or the second-last bank.
const PRG_WINDOW_C000: u16 = 0xC000;
/// CPU `$E000-$FFFF`: hardwired to the last bank.
const PRG_WINDOW_E000: u16 = 0xE000;

/// PPU address bit flipped by CHR A12 inversion.
const CHR_INVERT_XOR: u16 = 0x1000;

/// CPU-visible MMC3 register set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Mmc3CpuRegister {
    /// `$8000/$8001` – bank select and bank data.
    BankSelect,
    BankData,
    /// `$A000/$A001` – mirroring control and PRG-RAM enable/write-protect.
    Mirroring,
    PrgRamProtect,
    /// `$C000/$C001` – IRQ latch value and counter reload.
    IrqLatch,
    IrqReload,
    /// `$E000/$E001` – IRQ disable/ack and IRQ enable.
    IrqDisable,
    IrqEnable,
}

impl Mmc3CpuRegister {
    fn from_addr(addr: u16) -> Option<Self> {
        use Mmc3CpuRegister::*;

        match addr & REGISTER_DECODE_MASK {
            0x8000 => Some(BankSelect),
            0x8001 => Some(BankData),
            0xA000 => Some(Mirroring),
            0xA001 => Some(PrgRamProtect),
            0xC000 => Some(IrqLatch),
            0xC001 => Some(IrqReload),
            0xE000 => Some(IrqDisable),
            0xE001 => Some(IrqEnable),
            _ => None,
        }
    }

    /// Registers in `$C000-$FFFF` touch the IRQ line.
    fn affects_irq(self) -> bool {
        use Mmc3CpuRegister::*;

        matches!(self, IrqLatch | IrqReload | IrqDisable | IrqEnable)
    }
}

#[derive(Debug, Clone)]
pub struct Mapper4 {
    regs: Mapper4Registers,
    timing: Timing,

    /// Next lazily-replayed scanline clock, in PPU dots since frame start.
    next_time: PpuTime,
    /// Host time the counter has been replayed up to in this frame.
    flushed_to: CpuTime,
    /// Counter clocks since the last `$C001` write, counting down from 2.
    /// Only feeds the double-reload warning.
    counter_just_clocked: u8,
}

impl Mapper4 {
    pub const ID: u16 = 4;

    /// A mapper holding power-on registers. Call [`Mapper::reset`] before use
    /// so the host receives the initial bank windows.
    pub fn new(timing: Timing) -> Self {
        Self {
            regs: Mapper4Registers::POWER_ON,
            timing,
            next_time: 0,
            flushed_to: 0,
            counter_just_clocked: 0,
        }
    }

    /// Read-only view of the register file.
    pub fn registers(&self) -> &Mapper4Registers {
        &self.regs
    }

    pub fn timing(&self) -> Timing {
        self.timing
    }

    fn apply_prg_ram(&self, host: &mut dyn MapperHost) {
        host.enable_prg_ram(
            self.regs.prg_ram_enabled(),
            self.regs.prg_ram_write_protected(),
        );
    }

    fn apply_mirroring(&self, host: &mut dyn MapperHost) {
        // Four-screen boards ignore $A000 entirely.
        if !host.four_screen_mirroring() {
            host.set_mirroring(Mirroring::from_register(self.regs.mirror));
        }
    }

    /// R0/R1 drive the 2 KiB windows, R2-R5 the 1 KiB windows; A12 inversion
    /// swaps the two halves of pattern memory.
    fn update_chr_banks(&self, host: &mut dyn MapperHost) {
        let flip = if self.regs.chr_inverted() {
            CHR_INVERT_XOR
        } else {
            0
        };
        let banks = &self.regs.banks;

        host.set_chr_bank(0x0000 ^ flip, BankSize::Size2K, usize::from(banks[0] >> 1));
        host.set_chr_bank(0x0800 ^ flip, BankSize::Size2K, usize::from(banks[1] >> 1));
        for (addr, &bank) in (0x1000u16..).step_by(0x0400).zip(&banks[2..6]) {
            host.set_chr_bank(addr ^ flip, BankSize::Size1K, usize::from(bank));
        }
    }

    fn update_prg_banks(&self, host: &mut dyn MapperHost) {
        let second_last = host.last_prg_bank().saturating_sub(1);
        let r6 = usize::from(self.regs.banks[6]);

        host.set_prg_bank(
            PRG_WINDOW_A000,
            BankSize::Size8K,
            usize::from(self.regs.banks[7]),
        );

        let (low, high) = if self.regs.prg_swap_at_c000() {
            (second_last, r6)
        } else {
            (r6, second_last)
        };
        host.set_prg_bank(PRG_WINDOW_8000, BankSize::Size8K, low);
        host.set_prg_bank(PRG_WINDOW_C000, BankSize::Size8K, high);
    }

    fn write_bank_select(&mut self, host: &mut dyn MapperHost, data: u8) {
        let changed = self.regs.mode ^ data;
        self.regs.mode = data;

        if changed & MODE_CHR_INVERT != 0 {
            self.update_chr_banks(host);
        }
        if changed & MODE_PRG_SWAP != 0 {
            self.update_prg_banks(host);
        }
    }

    fn write_bank_data(&mut self, host: &mut dyn MapperHost, data: u8) {
        let slot = self.regs.selected_slot();
        self.regs.banks[slot] = data;

        if slot < 6 {
            self.update_chr_banks(host);
        } else {
            self.update_prg_banks(host);
        }
    }

    fn write_mirroring(&mut self, host: &mut dyn MapperHost, data: u8) {
        self.regs.mirror = data;
        self.apply_mirroring(host);
    }

    fn write_prg_ram_protect(&mut self, host: &mut dyn MapperHost, data: u8) {
        self.regs.sram_mode = data;
        self.apply_prg_ram(host);
    }
}

impl Default for Mapper4 {
    fn default() -> Self {
        Self::new(Timing::default())
    }
}

impl Mapper for Mapper4 {
    fn reset(&mut self, host: &mut dyn MapperHost) {
        self.regs = Mapper4Registers::POWER_ON;
        self.next_time = 0;
        self.flushed_to = 0;
        self.counter_just_clocked = 0;

        let last = host.last_prg_bank();
        host.set_prg_bank(PRG_WINDOW_E000, BankSize::Size8K, last);
        self.apply_mapping(host);
        debug!(last_prg_bank = last, "MMC3 reset");
    }

    fn apply_mapping(&mut self, host: &mut dyn MapperHost) {
        self.apply_prg_ram(host);
        self.apply_mirroring(host);
        self.update_chr_banks(host);
        self.update_prg_banks(host);
        self.start_frame();
    }

    fn write(&mut self, host: &mut dyn MapperHost, time: CpuTime, addr: u16, data: u8) {
        contract!(
            addr >= PRG_WINDOW_8000 && addr & !REGISTER_DECODE_MASK == 0,
            "MMC3 write outside the register decode pattern: {addr:#06X}"
        );
        let Some(reg) = Mmc3CpuRegister::from_addr(addr) else {
            return;
        };

        self.run_scanlines(&*host, time);

        use Mmc3CpuRegister::*;
        match reg {
            BankSelect => self.write_bank_select(host, data),
            BankData => self.write_bank_data(host, data),
            Mirroring => self.write_mirroring(host, data),
            PrgRamProtect => self.write_prg_ram_protect(host, data),
            IrqLatch => self.write_irq_latch(data),
            IrqReload => self.write_irq_reload(),
            IrqDisable => self.write_irq_disable(),
            IrqEnable => self.write_irq_enable(),
        }

        if reg.affects_irq() && self.regs.irq_enabled {
            host.irq_changed();
        }
    }

    fn start_frame(&mut self) {
        self.rearm_frame();
    }

    fn run_until(&mut self, host: &dyn MapperHost, end_time: CpuTime) {
        self.run_scanlines(host, end_time);
    }

    fn a12_clocked(&mut self, host: &mut dyn MapperHost, time: CpuTime) {
        self.run_scanlines(&*host, time);
        self.clock_counter();
        if self.regs.irq_enabled {
            host.irq_changed();
        }
    }

    fn next_irq(&mut self, host: &dyn MapperHost, present: CpuTime) -> Option<CpuTime> {
        self.run_scanlines(host, present);
        self.predict_irq(host)
    }

    fn irq_pending(&self) -> bool {
        self.regs.irq_flag
    }

    fn save_state(&self) -> Vec<u8> {
        self.regs.to_bytes().to_vec()
    }

    fn load_state(&mut self, host: &mut dyn MapperHost, bytes: &[u8]) -> Result<(), Error> {
        self.restore(host, Mapper4Registers::from_bytes(bytes)?);
        Ok(())
    }

    fn mapper_id(&self) -> u16 {
        Self::ID
    }

    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed("MMC3")
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::cartridge::bank_map::BankMap;

    /// Host that records every window into a [`BankMap`] and counts calls.
    #[derive(Debug)]
    pub(crate) struct RecordingHost {
        pub map: BankMap,
        pub mirroring: Option<Mirroring>,
        pub prg_ram: Option<(bool, bool)>,
        pub four_screen: bool,
        pub rendering: bool,
        pub last_bank: usize,
        pub chr_updates: usize,
        pub prg_updates: usize,
        pub irq_notifications: usize,
    }

    impl RecordingHost {
        pub(crate) fn new() -> Self {
            Self {
                map: BankMap::new(32 * BankSize::Size8K.bytes(), 256 * BankSize::Size1K.bytes()),
                mirroring: None,
                prg_ram: None,
                four_screen: false,
                rendering: false,
                last_bank: 31,
                chr_updates: 0,
                prg_updates: 0,
                irq_notifications: 0,
            }
        }
    }

    impl MapperHost for RecordingHost {
        fn enable_prg_ram(&mut self, enabled: bool, write_protected: bool) {
            self.prg_ram = Some((enabled, write_protected));
        }

        fn set_prg_bank(&mut self, addr: u16, size: BankSize, bank: usize) {
            self.prg_updates += 1;
            self.map.map_prg(addr, size, bank);
        }

        fn set_chr_bank(&mut self, addr: u16, size: BankSize, bank: usize) {
            self.chr_updates += 1;
            self.map.map_chr(addr, size, bank);
        }

        fn set_mirroring(&mut self, mirroring: Mirroring) {
            self.mirroring = Some(mirroring);
        }

        fn four_screen_mirroring(&self) -> bool {
            self.four_screen
        }

        fn rendering_enabled(&self) -> bool {
            self.rendering
        }

        fn last_prg_bank(&self) -> usize {
            self.last_bank
        }

        fn irq_changed(&mut self) {
            self.irq_notifications += 1;
        }
    }

    pub(crate) fn powered_on() -> (Mapper4, RecordingHost) {
        let mut host = RecordingHost::new();
        let mut mapper = Mapper4::new(Timing::NTSC);
        mapper.reset(&mut host);
        (mapper, host)
    }

    #[test]
    fn reset_pushes_power_on_windows() {
        let (mapper, host) = powered_on();

        assert_eq!(*mapper.registers(), Mapper4Registers::POWER_ON);
        assert_eq!(host.mirroring, Some(Mirroring::Horizontal));
        assert_eq!(host.prg_ram, Some((false, false)));

        // R6=0 at $8000, R7=1 at $A000, second-last at $C000, last at $E000.
        assert_eq!(host.map.prg_bank(0x8000), 0);
        assert_eq!(host.map.prg_bank(0xA000), 1);
        assert_eq!(host.map.prg_bank(0xC000), 30);
        assert_eq!(host.map.prg_bank(0xE000), 31);

        // R0=0, R1=2 as 2 KiB banks; R2-R5 as 1 KiB banks.
        assert_eq!(host.map.chr_bank(0x0000), 0);
        assert_eq!(host.map.chr_bank(0x0400), 1);
        assert_eq!(host.map.chr_bank(0x0800), 2);
        assert_eq!(host.map.chr_bank(0x0C00), 3);
        assert_eq!(host.map.chr_bank(0x1000), 4);
        assert_eq!(host.map.chr_bank(0x1400), 5);
        assert_eq!(host.map.chr_bank(0x1800), 6);
        assert_eq!(host.map.chr_bank(0x1C00), 7);
    }

    #[test]
    fn bank_select_only_recomputes_changed_family() {
        let (mut mapper, mut host) = powered_on();
        host.chr_updates = 0;
        host.prg_updates = 0;

        // Slot bits only: nothing to recompute.
        mapper.write(&mut host, 0, 0x8000, 0x05);
        assert_eq!((host.chr_updates, host.prg_updates), (0, 0));

        // PRG mode flips: three PRG windows.
        mapper.write(&mut host, 0, 0x8000, 0x45);
        assert_eq!((host.chr_updates, host.prg_updates), (0, 3));

        // CHR inversion flips: six CHR windows.
        mapper.write(&mut host, 0, 0x8000, 0xC5);
        assert_eq!((host.chr_updates, host.prg_updates), (6, 3));

        // Same value again is a no-op.
        mapper.write(&mut host, 0, 0x8000, 0xC5);
        assert_eq!((host.chr_updates, host.prg_updates), (6, 3));
    }

    #[test]
    fn bank_data_routes_to_chr_or_prg() {
        let (mut mapper, mut host) = powered_on();
        host.chr_updates = 0;
        host.prg_updates = 0;

        mapper.write(&mut host, 0, 0x8000, 2);
        mapper.write(&mut host, 0, 0x8001, 0x20);
        assert_eq!(mapper.registers().banks[2], 0x20);
        assert_eq!((host.chr_updates, host.prg_updates), (6, 0));
        assert_eq!(host.map.chr_bank(0x1000), 0x20);

        mapper.write(&mut host, 0, 0x8000, 6);
        mapper.write(&mut host, 0, 0x8001, 0x05);
        assert_eq!(mapper.registers().banks[6], 0x05);
        assert_eq!((host.chr_updates, host.prg_updates), (6, 3));
        assert_eq!(host.map.prg_bank(0x8000), 5);
    }

    #[test]
    fn two_kib_banks_drop_low_bit() {
        let (mut mapper, mut host) = powered_on();

        mapper.write(&mut host, 0, 0x8000, 0);
        mapper.write(&mut host, 0, 0x8001, 0x0B);
        assert_eq!(mapper.registers().banks[0], 0x0B);
        assert_eq!(host.map.chr_bank(0x0000), 0x0A);
        assert_eq!(host.map.chr_bank(0x0400), 0x0B);
    }

    #[test]
    fn chr_inversion_swaps_halves() {
        let (mut mapper, mut host) = powered_on();

        mapper.write(&mut host, 0, 0x8000, 0x80);
        // 2 KiB banks move to $1000, 1 KiB banks to $0000.
        assert_eq!(host.map.chr_bank(0x1000), 0);
        assert_eq!(host.map.chr_bank(0x1800), 2);
        assert_eq!(host.map.chr_bank(0x0000), 4);
        assert_eq!(host.map.chr_bank(0x0400), 5);
        assert_eq!(host.map.chr_bank(0x0800), 6);
        assert_eq!(host.map.chr_bank(0x0C00), 7);
    }

    #[test]
    fn prg_mode_picks_fixed_window() {
        let (mut mapper, mut host) = powered_on();

        mapper.write(&mut host, 0, 0x8000, 6);
        mapper.write(&mut host, 0, 0x8001, 3);
        mapper.write(&mut host, 0, 0x8000, 7);
        mapper.write(&mut host, 0, 0x8001, 9);

        assert_eq!(host.map.prg_bank(0x8000), 3);
        assert_eq!(host.map.prg_bank(0xA000), 9);
        assert_eq!(host.map.prg_bank(0xC000), 30);
        assert_eq!(host.map.prg_bank(0xE000), 31);

        mapper.write(&mut host, 0, 0x8000, 0x47);
        assert_eq!(host.map.prg_bank(0x8000), 30);
        assert_eq!(host.map.prg_bank(0xA000), 9);
        assert_eq!(host.map.prg_bank(0xC000), 3);
        assert_eq!(host.map.prg_bank(0xE000), 31);
    }

    #[test]
    fn mirroring_follows_bit_zero() {
        let (mut mapper, mut host) = powered_on();

        mapper.write(&mut host, 0, 0xA000, 0);
        assert_eq!(host.mirroring, Some(Mirroring::Vertical));
        mapper.write(&mut host, 0, 0xA000, 1);
        assert_eq!(host.mirroring, Some(Mirroring::Horizontal));
    }

    #[test]
    fn four_screen_ignores_mirroring_writes() {
        let mut host = RecordingHost::new();
        host.four_screen = true;
        let mut mapper = Mapper4::new(Timing::NTSC);
        mapper.reset(&mut host);
        assert_eq!(host.mirroring, None);

        mapper.write(&mut host, 0, 0xA000, 0);
        mapper.write(&mut host, 0, 0xA000, 1);
        assert_eq!(host.mirroring, None);
        assert_eq!(mapper.registers().mirror, 1);
    }

    #[test]
    fn prg_ram_control_is_forwarded() {
        let (mut mapper, mut host) = powered_on();

        mapper.write(&mut host, 0, 0xA001, 0x80);
        assert_eq!(host.prg_ram, Some((true, false)));
        mapper.write(&mut host, 0, 0xA001, 0xC0);
        assert_eq!(host.prg_ram, Some((true, true)));
        mapper.write(&mut host, 0, 0xA001, 0x00);
        assert_eq!(host.prg_ram, Some((false, false)));
    }

    #[test]
    fn low_registers_never_notify_irq() {
        let (mut mapper, mut host) = powered_on();
        mapper.write(&mut host, 0, 0xE001, 0);
        let notified = host.irq_notifications;

        mapper.write(&mut host, 0, 0x8000, 0x40);
        mapper.write(&mut host, 0, 0xA000, 0);
        assert_eq!(host.irq_notifications, notified);

        mapper.write(&mut host, 0, 0xC000, 3);
        assert_eq!(host.irq_notifications, notified + 1);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "decode pattern")]
    fn mirrored_register_address_is_a_contract_violation() {
        let (mut mapper, mut host) = powered_on();
        mapper.write(&mut host, 0, 0x9FFF, 0);
    }
}
