//! Trellis model
//!
//! Passive data types for the trellis execution engine: variable slots
//! with validity flags, dotted variable paths, the per-scope dependency
//! graph (single source per destination, ordered fan-out, backward
//! reachability), and workflow order lists.
//!
//! The live object model (units, assemblies, drivers) and the pull
//! evaluator that mutates these types live in `trellis-engine`.

mod error;
mod graph;
mod path;
mod variable;
mod workflow;

pub use error::EngineError;
pub use graph::DepGraph;
pub use path::VarPath;
pub use variable::{Direction, VarSet, VarSpec, Variable};
pub use workflow::Workflow;
