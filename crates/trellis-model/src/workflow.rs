use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Explicit execution-order list scoped to a container or driver.
///
/// The order is the deterministic fallback for units with no
/// dependency between them; duplicates are rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Workflow {
  order: Vec<String>,
}

impl Workflow {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn add(&mut self, name: impl Into<String>) -> Result<(), EngineError> {
    let name = name.into();
    if self.contains(&name) {
      return Err(EngineError::DuplicateWorkflowEntry(name));
    }
    self.order.push(name);
    Ok(())
  }

  pub fn add_all<I, S>(&mut self, names: I) -> Result<(), EngineError>
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    for name in names {
      self.add(name)?;
    }
    Ok(())
  }

  /// Remove an entry; returns whether it was present.
  pub fn remove(&mut self, name: &str) -> bool {
    let before = self.order.len();
    self.order.retain(|n| n != name);
    before != self.order.len()
  }

  pub fn contains(&self, name: &str) -> bool {
    self.order.iter().any(|n| n == name)
  }

  pub fn names(&self) -> &[String] {
    &self.order
  }

  pub fn is_empty(&self) -> bool {
    self.order.is_empty()
  }

  pub fn rename(&mut self, old: &str, new: &str) {
    for name in &mut self.order {
      if name == old {
        *name = new.to_string();
      }
    }
  }
}
