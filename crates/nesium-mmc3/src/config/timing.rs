//! Frame timing used by the MMC3 scanline counter.
//!
//! Host time is measured in CPU cycles relative to the start of the current
//! frame. The counter works in PPU dots ("overclocked" CPU time) so that edges
//! that fall between two CPU cycles keep their position.

/// Host time unit: CPU cycles since the start of the frame.
pub type CpuTime = u64;
/// Internal time unit: PPU dots since the start of the frame.
pub type PpuTime = u64;

/// PPU dots per scanline.
pub const SCANLINE_LEN: PpuTime = 341;
/// PPU dots per CPU cycle on NTSC hardware.
pub const PPU_OVERCLOCK: u64 = 3;
/// Scanlines between the start of the frame and the first visible line.
pub const PRE_RENDER_SCANLINES: u64 = 20;
/// Visible scanlines per frame.
pub const VISIBLE_SCANLINES: u64 = 240;
/// Scanlines per NTSC frame, pre-render line included.
pub const FRAME_SCANLINES: u64 = 262;
/// Offset of the first counter clock inside its scanline, in PPU dots.
///
/// Tuned against software: 264 or lower breaks Gargoyle's Quest II and 267 or
/// lower breaks Magician. Keep it at exactly 268.
pub const IRQ_FINE_TUNE: PpuTime = 268;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Timing {
    scanline_len: PpuTime,
    overclock: u64,
    first_scanline: PpuTime,
    last_scanline: PpuTime,
}

impl Timing {
    pub const NTSC: Timing = Timing::new(SCANLINE_LEN, PPU_OVERCLOCK);

    /// Builds a timing profile from a scanline length (PPU dots) and a
    /// PPU-dots-per-CPU-cycle multiplier.
    ///
    /// # Panics
    ///
    /// Panics if `scanline_len` or `overclock` is zero.
    pub const fn new(scanline_len: PpuTime, overclock: u64) -> Self {
        assert!(scanline_len > 0, "scanline length must be non-zero");
        assert!(overclock > 0, "overclock factor must be non-zero");
        let first_scanline = PRE_RENDER_SCANLINES * scanline_len + IRQ_FINE_TUNE;
        Self {
            scanline_len,
            overclock,
            first_scanline,
            last_scanline: first_scanline + VISIBLE_SCANLINES * scanline_len,
        }
    }

    /// Same scanline geometry with a different host multiplier.
    ///
    /// # Panics
    ///
    /// Panics if `overclock` is zero.
    pub const fn with_overclock(self, overclock: u64) -> Self {
        Self::new(self.scanline_len, overclock)
    }

    #[inline]
    pub const fn scanline_len(&self) -> PpuTime {
        self.scanline_len
    }

    #[inline]
    pub const fn overclock(&self) -> u64 {
        self.overclock
    }

    /// Time of the first counter clock in a frame.
    #[inline]
    pub const fn first_scanline(&self) -> PpuTime {
        self.first_scanline
    }

    /// Time of the last counter clock in a frame.
    #[inline]
    pub const fn last_scanline(&self) -> PpuTime {
        self.last_scanline
    }

    /// PPU dots per frame.
    #[inline]
    pub const fn frame_len(&self) -> PpuTime {
        FRAME_SCANLINES * self.scanline_len
    }

    #[inline]
    pub const fn to_ppu(&self, time: CpuTime) -> PpuTime {
        time * self.overclock
    }

    /// Converts back to host time, rounding up past the exact dot so the
    /// result never lands before the event it describes.
    #[inline]
    pub const fn to_cpu_after(&self, time: PpuTime) -> CpuTime {
        time / self.overclock + 1
    }
}

impl Default for Timing {
    fn default() -> Self {
        Self::NTSC
    }
}
