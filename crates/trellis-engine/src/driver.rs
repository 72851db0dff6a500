use trellis_model::{VarPath, Workflow};

/// A registered expression with its resolved variable references.
///
/// References are extracted and resolved once at registration time;
/// requirement analysis never re-parses the expression text.
#[derive(Debug, Clone)]
pub struct Reference {
  pub expr: String,
  pub vars: Vec<VarPath>,
}

/// A unit that iterates its own workflow of sibling units and declares
/// interest in specific variables (objectives, parameters,
/// constraints) for requirement-scoping purposes.
///
/// How many iterations a search algorithm performs is outside this
/// engine; `run` executes one workflow pass.
#[derive(Debug, Default)]
pub struct Driver {
  pub(crate) workflow: Workflow,
  pub(crate) objectives: Vec<Reference>,
  pub(crate) parameters: Vec<Reference>,
  pub(crate) constraints: Vec<Reference>,
}

impl Driver {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn workflow(&self) -> &Workflow {
    &self.workflow
  }

  pub fn workflow_mut(&mut self) -> &mut Workflow {
    &mut self.workflow
  }

  pub fn objectives(&self) -> &[Reference] {
    &self.objectives
  }

  pub fn parameters(&self) -> &[Reference] {
    &self.parameters
  }

  pub fn constraints(&self) -> &[Reference] {
    &self.constraints
  }

  /// Every resolved variable reference across all three categories.
  pub(crate) fn references(&self) -> impl Iterator<Item = &VarPath> {
    self
      .objectives
      .iter()
      .chain(self.parameters.iter())
      .chain(self.constraints.iter())
      .flat_map(|r| r.vars.iter())
  }

  pub(crate) fn has_references(&self) -> bool {
    !self.objectives.is_empty() || !self.parameters.is_empty() || !self.constraints.is_empty()
  }

  /// Drop the workflow entry and every registered reference that
  /// mentions a removed unit.
  pub(crate) fn remove_unit(&mut self, name: &str) {
    self.workflow.remove(name);
    let mentions =
      |r: &Reference| r.vars.iter().any(|v| v.unit.as_deref() == Some(name));
    self.objectives.retain(|r| !mentions(r));
    self.parameters.retain(|r| !mentions(r));
    self.constraints.retain(|r| !mentions(r));
  }

  pub(crate) fn rename_unit(&mut self, old: &str, new: &str) {
    self.workflow.rename(old, new);
    for reference in self
      .objectives
      .iter_mut()
      .chain(self.parameters.iter_mut())
      .chain(self.constraints.iter_mut())
    {
      for var in &mut reference.vars {
        if var.unit.as_deref() == Some(old) {
          var.unit = Some(new.to_string());
        }
      }
    }
  }
}
