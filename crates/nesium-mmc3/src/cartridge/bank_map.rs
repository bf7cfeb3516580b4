//! Host-side record of the windows a mapper selected.
//!
//! A [`MapperHost`](crate::MapperHost) can forward every
//! `set_prg_bank`/`set_chr_bank` call here and later translate CPU and PPU
//! addresses into offsets inside its ROM images.

use crate::{cartridge::mapper::BankSize, contract::contract};

const PRG_PAGE: usize = 0x2000;
const CHR_PAGE: usize = 0x0400;
const PRG_BASE_ADDR: u16 = 0x8000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BankMap {
    /// Byte offsets for the 4 x 8 KiB windows at `$8000-$FFFF`.
    prg_base: [usize; 4],
    /// Byte offsets for the 8 x 1 KiB windows at PPU `$0000-$1FFF`.
    chr_base: [usize; 8],
    prg_len: usize,
    chr_len: usize,
}

impl BankMap {
    /// Bank numbers wrap modulo the image sizes, as on the real address bus.
    pub fn new(prg_len: usize, chr_len: usize) -> Self {
        Self {
            prg_base: [0; 4],
            chr_base: [0; 8],
            prg_len,
            chr_len,
        }
    }

    /// Index of the last 8 KiB PRG bank.
    pub fn last_prg_bank(&self) -> usize {
        (self.prg_len / PRG_PAGE).saturating_sub(1)
    }

    pub fn map_prg(&mut self, addr: u16, size: BankSize, bank: usize) {
        contract!(
            addr >= PRG_BASE_ADDR && size == BankSize::Size8K,
            "PRG windows are 8 KiB at $8000-$FFFF, got {size:?} at {addr:#06X}"
        );
        let slot = usize::from(addr.wrapping_sub(PRG_BASE_ADDR)) / PRG_PAGE;
        if let Some(base) = self.prg_base.get_mut(slot) {
            *base = wrap(bank * size.bytes(), self.prg_len);
        }
    }

    pub fn map_chr(&mut self, addr: u16, size: BankSize, bank: usize) {
        let first = usize::from(addr) / CHR_PAGE;
        let start = bank * size.bytes();
        for (i, base) in self
            .chr_base
            .iter_mut()
            .skip(first)
            .take(size.bytes() / CHR_PAGE)
            .enumerate()
        {
            *base = wrap(start + i * CHR_PAGE, self.chr_len);
        }
    }

    /// 8 KiB PRG bank visible at CPU `addr`.
    pub fn prg_bank(&self, addr: u16) -> usize {
        self.prg_offset(addr) / PRG_PAGE
    }

    /// 1 KiB CHR bank visible at PPU `addr`.
    pub fn chr_bank(&self, addr: u16) -> usize {
        self.chr_offset(addr) / CHR_PAGE
    }

    /// Offset into PRG-ROM for CPU `addr` in `$8000-$FFFF`.
    pub fn prg_offset(&self, addr: u16) -> usize {
        let slot = usize::from(addr.wrapping_sub(PRG_BASE_ADDR)) / PRG_PAGE;
        self.prg_base[slot & 3] + (usize::from(addr) & (PRG_PAGE - 1))
    }

    /// Offset into CHR memory for PPU `addr` in `$0000-$1FFF`.
    pub fn chr_offset(&self, addr: u16) -> usize {
        let slot = usize::from(addr & 0x1FFF) / CHR_PAGE;
        self.chr_base[slot] + (usize::from(addr) & (CHR_PAGE - 1))
    }
}

#[inline]
fn wrap(offset: usize, len: usize) -> usize {
    if len == 0 { 0 } else { offset % len }
}
