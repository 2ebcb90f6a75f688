//! Product store: catalog records, patches and the bundled fallback catalog.

pub mod catalog;
pub mod dtos;
pub mod entity;
pub mod error;

pub use catalog::*;
pub use dtos::*;
pub use error::*;
