use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// A variable address within one graph scope.
///
/// `unit: None` names a boundary variable of the scope owner (`"c4"`);
/// `unit: Some(..)` names a variable of a direct child unit
/// (`"comp1.a"`). The `var` part of a child address may itself be
/// dotted when it refers to a passthrough alias created across a
/// nesting boundary (`"comp3.a"` as seen from the parent of `sub`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VarPath {
  pub unit: Option<String>,
  pub var: String,
}

impl VarPath {
  /// A boundary variable of the scope owner.
  pub fn boundary(var: impl Into<String>) -> Self {
    Self {
      unit: None,
      var: var.into(),
    }
  }

  /// A variable of a direct child unit.
  pub fn child(unit: impl Into<String>, var: impl Into<String>) -> Self {
    Self {
      unit: Some(unit.into()),
      var: var.into(),
    }
  }

  /// Split a dotted path at the first separator: `"comp.x"` becomes a
  /// child address, `"x"` a boundary address. Rejects empty segments.
  pub fn parse(path: &str) -> Result<Self, EngineError> {
    let parsed = match path.split_once('.') {
      Some((unit, var)) => {
        if unit.is_empty() || var.is_empty() || var.starts_with('.') || var.ends_with('.') {
          return Err(EngineError::BadPath(path.to_string()));
        }
        Self::child(unit, var)
      }
      None => {
        if path.is_empty() {
          return Err(EngineError::BadPath(path.to_string()));
        }
        Self::boundary(path)
      }
    };
    Ok(parsed)
  }
}

impl fmt::Display for VarPath {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match &self.unit {
      Some(unit) => write!(f, "{}.{}", unit, self.var),
      None => write!(f, "{}", self.var),
    }
  }
}
