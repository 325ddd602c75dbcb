mod conversion;
mod fixtures;
mod helper;
mod inspect;

pub use fixtures::*;
pub use helper::*;
