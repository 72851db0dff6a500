use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::EngineError;

/// Direction of a variable slot relative to its owning unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
  In,
  Out,
}

/// Declaration of a single variable slot, supplied when a unit is
/// constructed. The declared order of specs is the order reported by
/// listing operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarSpec {
  pub name: String,
  pub direction: Direction,
  pub default: Value,
}

impl VarSpec {
  pub fn input(name: impl Into<String>, default: Value) -> Self {
    Self {
      name: name.into(),
      direction: Direction::In,
      default,
    }
  }

  pub fn output(name: impl Into<String>, default: Value) -> Self {
    Self {
      name: name.into(),
      direction: Direction::Out,
      default,
    }
  }
}

/// A variable slot: declared spec plus current value and validity.
///
/// Inputs start valid (their default is a known value); outputs start
/// invalid (nothing has computed them yet).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Variable {
  spec: VarSpec,
  value: Value,
  valid: bool,
}

impl Variable {
  fn new(spec: VarSpec) -> Self {
    let value = spec.default.clone();
    let valid = spec.direction == Direction::In;
    Self { spec, value, valid }
  }

  pub fn name(&self) -> &str {
    &self.spec.name
  }

  pub fn direction(&self) -> Direction {
    self.spec.direction
  }

  pub fn value(&self) -> &Value {
    &self.value
  }

  pub fn is_valid(&self) -> bool {
    self.valid
  }

  /// Store a value without touching the validity flag.
  pub fn store(&mut self, value: Value) {
    self.value = value;
  }

  pub fn mark(&mut self, valid: bool) {
    self.valid = valid;
  }
}

/// Insertion-ordered set of the variable slots belonging to one unit.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VarSet {
  vars: Vec<Variable>,
}

impl VarSet {
  /// Build a set from declared specs, rejecting duplicate names.
  pub fn from_specs(specs: Vec<VarSpec>) -> Result<Self, EngineError> {
    let mut set = Self::default();
    for spec in specs {
      if set.get(&spec.name).is_some() {
        return Err(EngineError::NameConflict(spec.name));
      }
      set.vars.push(Variable::new(spec));
    }
    Ok(set)
  }

  pub fn get(&self, name: &str) -> Option<&Variable> {
    self.vars.iter().find(|v| v.name() == name)
  }

  pub fn get_mut(&mut self, name: &str) -> Option<&mut Variable> {
    self.vars.iter_mut().find(|v| v.name() == name)
  }

  pub fn iter(&self) -> impl Iterator<Item = &Variable> {
    self.vars.iter()
  }

  /// Input slots in declared order.
  pub fn inputs(&self) -> impl Iterator<Item = &Variable> {
    self.vars.iter().filter(|v| v.direction() == Direction::In)
  }

  /// Output slots in declared order.
  pub fn outputs(&self) -> impl Iterator<Item = &Variable> {
    self.vars.iter().filter(|v| v.direction() == Direction::Out)
  }

  pub fn is_empty(&self) -> bool {
    self.vars.is_empty()
  }

  /// Set every slot's validity flag at once.
  pub fn mark_all(&mut self, valid: bool) {
    for var in &mut self.vars {
      var.mark(valid);
    }
  }

  /// Current value of a slot, for use inside computations.
  pub fn value(&self, name: &str) -> Option<&Value> {
    self.get(name).map(Variable::value)
  }

  /// Store a value into a slot from inside a computation. Validity is
  /// managed by the engine, not by computations.
  pub fn put(&mut self, name: &str, value: Value) -> Result<(), EngineError> {
    match self.get_mut(name) {
      Some(var) => {
        var.store(value);
        Ok(())
      }
      None => Err(EngineError::VariableNotFound(name.to_string())),
    }
  }
}
