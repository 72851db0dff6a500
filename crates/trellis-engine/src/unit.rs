use std::fmt;

use trellis_model::{EngineError, VarSet, VarSpec};

use crate::assembly::Assembly;
use crate::driver::Driver;

/// A unit's computation function: read input slots, write output
/// slots. Validity flags and execution counters are owned by the
/// engine, never by the computation.
pub trait Compute {
  fn compute(&mut self, vars: &mut VarSet) -> Result<(), EngineError>;
}

impl<F> Compute for F
where
  F: FnMut(&mut VarSet) -> Result<(), EngineError>,
{
  fn compute(&mut self, vars: &mut VarSet) -> Result<(), EngineError> {
    self(vars)
  }
}

pub enum UnitKind {
  /// Leaf computation.
  Component(Box<dyn Compute>),
  /// Nested container with its own graph, workflow, and passthroughs.
  Assembly(Assembly),
  /// Workflow iterator with registered variable references.
  Driver(Driver),
}

/// A named computation with declared variable slots, an execution
/// counter, and a force-execute override. Units get their name when
/// added to a parent assembly.
pub struct Unit {
  pub(crate) vars: VarSet,
  pub(crate) exec_count: u64,
  pub(crate) force_execute: bool,
  pub(crate) kind: UnitKind,
}

impl Unit {
  /// A leaf component with the given variable schema.
  pub fn component(specs: Vec<VarSpec>, compute: Box<dyn Compute>) -> Result<Self, EngineError> {
    Ok(Self {
      vars: VarSet::from_specs(specs)?,
      exec_count: 0,
      force_execute: false,
      kind: UnitKind::Component(compute),
    })
  }

  /// A nested assembly. Its boundary variables are the passthrough
  /// aliases it exposes.
  pub fn assembly(assembly: Assembly) -> Self {
    Self {
      vars: VarSet::default(),
      exec_count: 0,
      force_execute: false,
      kind: UnitKind::Assembly(assembly),
    }
  }

  /// A driver owning its own workflow of sibling units.
  pub fn driver(driver: Driver) -> Self {
    Self {
      vars: VarSet::default(),
      exec_count: 0,
      force_execute: false,
      kind: UnitKind::Driver(driver),
    }
  }

  pub fn exec_count(&self) -> u64 {
    self.exec_count
  }

  pub fn force_execute(&self) -> bool {
    self.force_execute
  }

  pub fn vars(&self) -> &VarSet {
    &self.vars
  }

  pub(crate) fn kind_name(&self) -> &'static str {
    match self.kind {
      UnitKind::Component(_) => "component",
      UnitKind::Assembly(_) => "assembly",
      UnitKind::Driver(_) => "driver",
    }
  }
}

impl fmt::Debug for Unit {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Unit")
      .field("kind", &self.kind_name())
      .field("exec_count", &self.exec_count)
      .field("force_execute", &self.force_execute)
      .finish_non_exhaustive()
  }
}
