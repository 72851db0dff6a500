//! Facade over the trellis workspace crates.
//!
//! Models are built from [`Assembly`], [`Unit`], and [`Driver`];
//! see `trellis-engine` for the execution semantics.

pub use trellis_engine::*;
