//! Service layer
//!
//! - [`InMemoryCatalog`] - catalog lookups used to freeze item prices

pub mod catalog;

pub use catalog::{CatalogError, CatalogLookup, InMemoryCatalog};
