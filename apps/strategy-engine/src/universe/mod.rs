//! Options universe: load payload, validation and the search-ready cache.

mod cache;
mod error;
mod input;
mod instrument;

pub use cache::{UniverseBounds, UniverseCache};
pub use error::UniverseError;
pub use input::{InstrumentRow, UniverseInput};
pub use instrument::{Instrument, N_INTRA_DATES, OptionType};
