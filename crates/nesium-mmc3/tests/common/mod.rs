#![allow(dead_code)]

use ctor::ctor;
use nesium_mmc3::{BankMap, BankSize, Mapper, MapperHost, Mirroring, Timing, cartridge::mapper};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[ctor]
fn init_tracing() {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::DEBUG)
        .with_test_writer()
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("Failed to set subscriber");
}

/// The eight canonical register addresses, in decode order.
pub const REGISTERS: [u16; 8] = [
    0x8000, 0x8001, 0xA000, 0xA001, 0xC000, 0xC001, 0xE000, 0xE001,
];

/// A minimal console: bank windows, nametable arrangement and the IRQ line.
#[derive(Debug, Clone)]
pub struct Board {
    pub map: BankMap,
    pub mirroring: Option<Mirroring>,
    pub prg_ram: Option<(bool, bool)>,
    pub four_screen: bool,
    pub rendering: bool,
    pub irq_changes: usize,
}

impl Board {
    /// `prg_banks` 8 KiB PRG banks and 256 KiB of CHR.
    pub fn new(prg_banks: usize) -> Self {
        Self {
            map: BankMap::new(
                prg_banks * BankSize::Size8K.bytes(),
                256 * BankSize::Size1K.bytes(),
            ),
            mirroring: None,
            prg_ram: None,
            four_screen: false,
            rendering: true,
            irq_changes: 0,
        }
    }
}

impl MapperHost for Board {
    fn enable_prg_ram(&mut self, enabled: bool, write_protected: bool) {
        self.prg_ram = Some((enabled, write_protected));
    }

    fn set_prg_bank(&mut self, addr: u16, size: BankSize, bank: usize) {
        self.map.map_prg(addr, size, bank);
    }

    fn set_chr_bank(&mut self, addr: u16, size: BankSize, bank: usize) {
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
        self.map.last_prg_bank()
    }

    fn irq_changed(&mut self) {
        self.irq_changes += 1;
    }
}

/// A freshly reset MMC3 on a 256 KiB PRG board.
pub fn powered_on() -> (Box<dyn Mapper>, Board) {
    let mut board = Board::new(32);
    let mut mmc3 = mapper::create(4, Timing::NTSC).expect("mapper 4 is built in");
    mmc3.reset(&mut board);
    (mmc3, board)
}
