//! PPU A12 edge filter for the MMC3 counter.
//!
//! The MMC3 clocks its scanline counter on rising edges of PPU address line
//! A12. Pattern fetches toggle A12 several times per scanline, so the chip
//! only accepts a rise after A12 has been held low for a while. Hosts that
//! model the PPU bus feed every pattern address through [`A12Watcher`] and
//! forward accepted rises to [`Mapper::a12_clocked`](crate::Mapper::a12_clocked).

use crate::config::timing::{PpuTime, Timing};

/// PPU address bit observed by the watcher.
const A12_MASK: u16 = 0x1000;

/// Edge reported by [`A12Watcher::observe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum A12Edge {
    None,
    /// Low to high after a long enough low period.
    Rise,
    /// High to low; starts the low-time measurement.
    Fall,
}

impl A12Edge {
    #[inline]
    pub fn is_rise(self) -> bool {
        self == A12Edge::Rise
    }
}

/// Debounces A12 in PPU dots since frame start.
///
/// Dots must be monotonic within a frame and restart near zero on the next
/// one; a smaller dot than the previous observation is read as a frame wrap.
#[derive(Debug, Clone)]
pub struct A12Watcher {
    last_dot: PpuTime,
    /// Dots A12 has been low, or `None` while it is high.
    low_for: Option<PpuTime>,
    frame_len: PpuTime,
    min_low: PpuTime,
}

impl A12Watcher {
    /// Low time a rise must exceed, in PPU dots.
    pub const DEFAULT_MIN_LOW: PpuTime = 10;

    pub const fn new(frame_len: PpuTime) -> Self {
        Self {
            last_dot: 0,
            low_for: None,
            frame_len,
            min_low: Self::DEFAULT_MIN_LOW,
        }
    }

    pub const fn for_timing(timing: &Timing) -> Self {
        Self::new(timing.frame_len())
    }

    /// Override the debounce threshold.
    pub const fn with_min_low(mut self, dots: PpuTime) -> Self {
        self.min_low = dots;
        self
    }

    pub fn reset(&mut self) {
        self.last_dot = 0;
        self.low_for = None;
    }

    /// Feed the PPU bus address seen at `dot`.
    pub fn observe(&mut self, addr: u16, dot: PpuTime) -> A12Edge {
        let elapsed = if dot < self.last_dot {
            self.frame_len.saturating_sub(self.last_dot) + dot
        } else {
            dot - self.last_dot
        };
        self.last_dot = dot;

        let high = addr & A12_MASK != 0;
        match (self.low_for, high) {
            (None, false) => {
                self.low_for = Some(1);
                A12Edge::Fall
            }
            (Some(low), false) => {
                self.low_for = Some(low.saturating_add(elapsed));
                A12Edge::None
            }
            (Some(low), true) => {
                self.low_for = None;
                if low.saturating_add(elapsed) > self.min_low {
                    A12Edge::Rise
                } else {
                    A12Edge::None
                }
            }
            (None, true) => A12Edge::None,
        }
    }
}

impl Default for A12Watcher {
    fn default() -> Self {
        Self::for_timing(&Timing::NTSC)
    }
}
