//! Portfolio - lot bookkeeping, FIFO replay, realized profit and holdings.

pub mod fifo;
pub mod holdings;
pub mod lots;
pub mod realized;

pub use fifo::*;
pub use holdings::*;
pub use lots::*;
pub use realized::*;

#[cfg(test)]
pub(crate) mod test_support;
