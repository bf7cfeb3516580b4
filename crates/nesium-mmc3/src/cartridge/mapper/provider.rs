use std::fmt::Debug;

use crate::{cartridge::Mapper, config::timing::Timing};

/// Source of user-provided mappers when the core does not implement a board.
///
/// `Provider` is consulted only when the requested mapper id is unknown to the
/// built-in registry. Returning `None` defers to the core's
/// `UnsupportedMapper` error.
///
/// # Example
/// ```
/// use std::borrow::Cow;
///
/// use nesium_mmc3::{
///     CpuTime, Error, Mapper, MapperHost, Provider, Timing, cartridge::mapper,
/// };
///
/// #[derive(Debug, Clone)]
/// struct OpenBusBoard;
///
/// impl Mapper for OpenBusBoard {
///     fn reset(&mut self, _host: &mut dyn MapperHost) {}
///     fn apply_mapping(&mut self, _host: &mut dyn MapperHost) {}
///     fn write(&mut self, _host: &mut dyn MapperHost, _time: CpuTime, _addr: u16, _data: u8) {}
///     fn save_state(&self) -> Vec<u8> { Vec::new() }
///     fn load_state(&mut self, _host: &mut dyn MapperHost, _bytes: &[u8]) -> Result<(), Error> {
///         Ok(())
///     }
///     fn mapper_id(&self) -> u16 { 1234 }
///     fn name(&self) -> Cow<'static, str> { Cow::Borrowed("open bus") }
/// }
///
/// #[derive(Debug)]
/// struct CustomProvider;
///
/// impl Provider for CustomProvider {
///     fn get_mapper(&self, id: u16, _timing: Timing) -> Option<Box<dyn Mapper>> {
///         (id == 1234).then(|| Box::new(OpenBusBoard) as Box<dyn Mapper>)
///     }
/// }
///
/// let board = mapper::create_with_provider(1234, Timing::NTSC, Some(&CustomProvider))?;
/// assert_eq!(board.name(), "open bus");
/// # Ok::<(), Error>(())
/// ```
pub trait Provider: Debug + Send {
    fn get_mapper(&self, id: u16, timing: Timing) -> Option<Box<dyn Mapper>>;
}
