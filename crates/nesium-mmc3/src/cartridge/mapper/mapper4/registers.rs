#[cfg(feature = "savestate-serde")]
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// `$8000` bit 7: swap the 2 KiB and 1 KiB CHR halves.
pub(super) const MODE_CHR_INVERT: u8 = 0x80;
/// `$8000` bit 6: fix `$8000` instead of `$C000` to the second-last bank.
pub(super) const MODE_PRG_SWAP: u8 = 0x40;
/// `$8000` bits 0-2: bank register targeted by `$8001`.
pub(super) const MODE_SLOT_MASK: u8 = 0x07;

/// `$A001` bit 7: PRG-RAM chip enable.
const SRAM_ENABLE: u8 = 0x80;
/// `$A001` bit 6: PRG-RAM write protect.
const SRAM_WRITE_PROTECT: u8 = 0x40;

/// The MMC3 register file.
///
/// This is exactly the state that survives a save/load cycle. Timing cursors
/// are rebuilt from it when the state is applied.
#[cfg_attr(feature = "savestate-serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Mapper4Registers {
    /// R0-R7 as written through `$8001`. R0/R1 select 2 KiB CHR banks and drop
    /// their low bit; R6/R7 select 8 KiB PRG banks.
    pub banks: [u8; 8],
    /// Last `$8000` value.
    pub mode: u8,
    /// Last `$A000` value.
    pub mirror: u8,
    /// Last `$A001` value.
    pub sram_mode: u8,
    pub irq_latch: u8,
    pub irq_ctr: u8,
    pub irq_enabled: bool,
    /// IRQ output level seen by the CPU.
    pub irq_flag: bool,
}

impl Mapper4Registers {
    /// Encoded size in bytes.
    pub const LEN: usize = 15;

    pub const POWER_ON: Self = Self {
        banks: [0, 2, 4, 5, 6, 7, 0, 1],
        mode: 0,
        mirror: 1,
        sram_mode: 0,
        irq_latch: 0,
        irq_ctr: 0,
        irq_enabled: false,
        irq_flag: false,
    };

    #[inline]
    pub fn chr_inverted(&self) -> bool {
        self.mode & MODE_CHR_INVERT != 0
    }

    /// PRG mode 1: `$8000` fixed, `$C000` switchable.
    #[inline]
    pub fn prg_swap_at_c000(&self) -> bool {
        self.mode & MODE_PRG_SWAP != 0
    }

    #[inline]
    pub fn selected_slot(&self) -> usize {
        (self.mode & MODE_SLOT_MASK) as usize
    }

    #[inline]
    pub fn prg_ram_enabled(&self) -> bool {
        self.sram_mode & SRAM_ENABLE != 0
    }

    #[inline]
    pub fn prg_ram_write_protected(&self) -> bool {
        self.sram_mode & SRAM_WRITE_PROTECT != 0
    }

    /// Save-state layout: R0-R7, mode, mirror, sram_mode, irq_latch,
    /// irq_ctr, irq_enabled, irq_flag. One byte each, no header.
    pub fn to_bytes(&self) -> [u8; Self::LEN] {
        let mut out = [0u8; Self::LEN];
        out[..8].copy_from_slice(&self.banks);
        out[8] = self.mode;
        out[9] = self.mirror;
        out[10] = self.sram_mode;
        out[11] = self.irq_latch;
        out[12] = self.irq_ctr;
        out[13] = u8::from(self.irq_enabled);
        out[14] = u8::from(self.irq_flag);
        out
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        let bytes: &[u8; Self::LEN] = bytes
            .try_into()
            .map_err(|_| Error::state_length(bytes.len()))?;

        let mut banks = [0u8; 8];
        banks.copy_from_slice(&bytes[..8]);
        Ok(Self {
            banks,
            mode: bytes[8],
            mirror: bytes[9],
            sram_mode: bytes[10],
            irq_latch: bytes[11],
            irq_ctr: bytes[12],
            irq_enabled: bytes[13] != 0,
            irq_flag: bytes[14] != 0,
        })
    }
}

impl Default for Mapper4Registers {
    fn default() -> Self {
        Self::POWER_ON
    }
}
