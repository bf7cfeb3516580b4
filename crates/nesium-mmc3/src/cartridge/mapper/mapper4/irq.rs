//! MMC3 scanline counter.
//!
//! The real chip clocks its counter on filtered PPU A12 rising edges. Between
//! explicit [`Mapper::a12_clocked`](crate::Mapper::a12_clocked) calls the
//! core approximates those edges with one clock per scanline, replayed lazily
//! whenever the host hands in a later timestamp. Both paths share
//! the same counter clock.

use tracing::warn;

use super::Mapper4;
use crate::{
    cartridge::mapper::MapperHost,
    config::timing::{CpuTime, PpuTime},
    contract::contract,
};

impl Mapper4 {
    /// Rearm the scanline replay at the first counted scanline of a frame.
    pub(super) fn rearm_frame(&mut self) {
        self.next_time = self.timing.first_scanline();
        self.flushed_to = 0;
    }

    /// Replay every scanline clock that falls before `end_time`.
    ///
    /// Rendering is sampled once on entry; a mid-call toggle is not seen until
    /// the next flush.
    pub(super) fn run_scanlines(&mut self, host: &dyn MapperHost, end_time: CpuTime) {
        contract!(
            end_time >= self.flushed_to,
            "MMC3 timer asked to run backwards: {end_time} < {}",
            self.flushed_to
        );
        self.flushed_to = self.flushed_to.max(end_time);

        let bg_enabled = host.rendering_enabled();
        let end = self.timing.to_ppu(end_time);
        let last = self.timing.last_scanline();

        while self.next_time < end && self.next_time <= last {
            if bg_enabled {
                self.clock_counter();
            }
            self.next_time += self.timing.scanline_len();
        }
    }

    /// One counter clock.
    ///
    /// A zero counter reloads from the latch instead of wrapping, and the IRQ
    /// output follows `irq_enabled` whenever the counter ends the clock at
    /// zero. A zero latch therefore re-asserts on every clock.
    pub(super) fn clock_counter(&mut self) {
        self.counter_just_clocked = self.counter_just_clocked.saturating_sub(1);

        if self.regs.irq_ctr == 0 {
            self.regs.irq_ctr = self.regs.irq_latch;
        } else {
            self.regs.irq_ctr -= 1;
        }

        if self.regs.irq_ctr == 0 {
            self.regs.irq_flag = self.regs.irq_enabled;
        }
    }

    /// Host time of the next assertion, assuming the scanline replay keeps
    /// running. Expects the replay to be flushed to the present already.
    pub(super) fn predict_irq(&self, host: &dyn MapperHost) -> Option<CpuTime> {
        if !self.regs.irq_enabled {
            return None;
        }

        if self.regs.irq_flag {
            return Some(0);
        }

        if !host.rendering_enabled() {
            return None;
        }

        // Clocks still needed after the next one: a zero counter spends the
        // next clock reloading.
        let remain = match self.regs.irq_ctr {
            0 => self.regs.irq_latch,
            ctr => ctr - 1,
        };

        let time = PpuTime::from(remain) * self.timing.scanline_len() + self.next_time;
        if time > self.timing.last_scanline() {
            return None;
        }

        Some(self.timing.to_cpu_after(time))
    }

    pub(super) fn write_irq_latch(&mut self, data: u8) {
        self.regs.irq_latch = data;
    }

    /// `$C001`: zero the counter now so the next clock reloads it.
    pub(super) fn write_irq_reload(&mut self) {
        if self.counter_just_clocked == 1 {
            warn!(
                irq_latch = self.regs.irq_latch,
                "MMC3 IRQ counter reloaded twice within two clocks; chip revisions disagree here"
            );
        }
        self.counter_just_clocked = 2;
        self.regs.irq_ctr = 0;
    }

    /// `$E000`: disable and acknowledge.
    pub(super) fn write_irq_disable(&mut self) {
        self.regs.irq_flag = false;
        self.regs.irq_enabled = false;
    }

    pub(super) fn write_irq_enable(&mut self) {
        self.regs.irq_enabled = true;
    }
}
