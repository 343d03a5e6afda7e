//! Configuration for tilepack
//!
//! Provides types and loading for the optional `tilepack.toml` file.

pub mod loader;
pub mod schema;

pub use loader::*;
pub use schema::*;
