use core::fmt;
use std::collections::TryReserveError;

/// Allocation failure.
///
/// The only hard error in this crate. Fallible constructors and growth
/// paths return it when the underlying buffer reservation fails; the
/// structure that reported it is left in its prior state.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct AllocError;

impl From<TryReserveError> for AllocError {
    fn from(_: TryReserveError) -> Self {
        AllocError
    }
}

impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("allocation failed")
    }
}

impl std::error::Error for AllocError {}
