//! Dependency-driven lazy execution engine.
//!
//! Models are trees of units: leaf components that compute output
//! variables from input variables, assemblies that group units behind
//! passthrough aliases, and drivers that iterate a workflow of
//! siblings. Connections form a dependency graph per assembly scope;
//! setting a value invalidates everything downstream, and running a
//! unit pulls only the stale part of its upstream chain.

mod assembly;
mod driver;
mod expr;
mod unit;

pub use assembly::Assembly;
pub use driver::{Driver, Reference};
pub use unit::{Compute, Unit, UnitKind};

pub use trellis_model::{
  DepGraph, Direction, EngineError, VarPath, VarSet, VarSpec, Variable, Workflow,
};
