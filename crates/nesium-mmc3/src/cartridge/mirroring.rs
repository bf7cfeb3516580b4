/// Nametable layout selected by the mapper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mirroring {
    /// Two horizontal nametables that mirror vertically.
    Horizontal,
    /// Two vertical nametables that mirror horizontally.
    Vertical,
}

impl Mirroring {
    /// Decodes the MMC3 `$A000` register: bit 0 set selects horizontal.
    #[inline]
    pub const fn from_register(value: u8) -> Self {
        if value & 0x01 != 0 {
            Self::Horizontal
        } else {
            Self::Vertical
        }
    }
}
