//! Field-by-field mapping of the library graph between the two schemas.

pub mod to_kotatsu;
pub mod to_mihon;

pub use to_kotatsu::{DEFAULT_CATEGORY_ID, mihon_to_kotatsu};
pub use to_mihon::kotatsu_to_mihon;

/// What the Kotatsu to Mihon mapping does with a favourite whose source
/// cannot be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OnUnresolved {
    #[default]
    Skip,
    Abort,
}

impl From<bool> for OnUnresolved {
    fn from(strict: bool) -> Self {
        if strict {
            OnUnresolved::Abort
        } else {
            OnUnresolved::Skip
        }
    }
}
