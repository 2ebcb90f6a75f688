//! Order store: order records and their status patch.

pub mod entity;
pub mod error;

pub use error::*;
