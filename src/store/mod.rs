//! Record store and its JSON persistence.

pub mod codec;
pub mod records;

pub use records::{Record, RecordStore};
