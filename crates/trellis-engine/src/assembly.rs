use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use serde_json::Value;
use tracing::{debug, trace};
use trellis_model::{DepGraph, Direction, EngineError, VarPath, Variable, Workflow};

use crate::driver::{Driver, Reference};
use crate::expr;
use crate::unit::{Unit, UnitKind};

enum RefSlot {
  Objective,
  Parameter,
  Constraint,
}

/// A unit composed of nested child units, an internal dependency
/// graph, a workflow, and a passthrough alias table.
///
/// The root of a model is a bare `Assembly`; nested ones are wrapped
/// in [`Unit::assembly`] and added as children. All path-taking
/// operations accept dotted paths and descend through nested scopes,
/// so mutations made deep in the tree propagate invalidation back out
/// across every boundary they cross.
///
/// A passthrough is an alias resolved at lookup time: the external
/// name *is* the internal variable, so reading or writing either is
/// observably identical.
#[derive(Debug, Default)]
pub struct Assembly {
  /// Child names in insertion order.
  children: Vec<String>,
  units: HashMap<String, Unit>,
  graph: DepGraph,
  workflow: Workflow,
  /// external name -> internal scope-level path.
  passthroughs: BTreeMap<String, VarPath>,
  /// Units currently executing in this scope, innermost last.
  run_stack: Vec<String>,
}

impl Assembly {
  pub fn new() -> Self {
    Self::default()
  }

  // ---- structure ------------------------------------------------------

  /// Add a child unit under `name`. Fails on a naming conflict with an
  /// existing child or passthrough before anything is mutated.
  pub fn add(&mut self, name: &str, unit: Unit) -> Result<(), EngineError> {
    if name.is_empty() || name.contains('.') {
      return Err(EngineError::BadPath(name.to_string()));
    }
    if self.units.contains_key(name) || self.passthroughs.contains_key(name) {
      return Err(EngineError::NameConflict(name.to_string()));
    }
    debug!(unit = name, kind = unit.kind_name(), "added unit");
    self.children.push(name.to_string());
    self.units.insert(name.to_string(), unit);
    Ok(())
  }

  /// Remove a child unit along with every connection touching it,
  /// every passthrough aliasing into it, and its workflow entries.
  pub fn remove(&mut self, name: &str) -> Result<Unit, EngineError> {
    let Some(unit) = self.units.remove(name) else {
      return Err(EngineError::UnitNotFound(name.to_string()));
    };
    self.children.retain(|n| n != name);
    let removed = self.graph.disconnect_unit(name);
    self.passthroughs.retain(|_, t| t.unit.as_deref() != Some(name));
    self.workflow.remove(name);
    for other in self.units.values_mut() {
      if let UnitKind::Driver(driver) = &mut other.kind {
        driver.remove_unit(name);
      }
    }
    debug!(unit = name, edges = removed.len(), "removed unit");
    Ok(unit)
  }

  /// Rename a child, rewriting edges, aliases, workflow entries, and
  /// driver references that mention it.
  pub fn rename(&mut self, old: &str, new: &str) -> Result<(), EngineError> {
    if !self.units.contains_key(old) {
      return Err(EngineError::UnitNotFound(old.to_string()));
    }
    if new.is_empty() || new.contains('.') {
      return Err(EngineError::BadPath(new.to_string()));
    }
    if self.units.contains_key(new) || self.passthroughs.contains_key(new) {
      return Err(EngineError::NameConflict(new.to_string()));
    }
    let Some(unit) = self.units.remove(old) else {
      return Err(EngineError::UnitNotFound(old.to_string()));
    };
    self.units.insert(new.to_string(), unit);
    for name in &mut self.children {
      if name == old {
        *name = new.to_string();
      }
    }
    self.graph.rename_unit(old, new);
    for target in self.passthroughs.values_mut() {
      if target.unit.as_deref() == Some(old) {
        target.unit = Some(new.to_string());
      }
    }
    self.workflow.rename(old, new);
    for other in self.units.values_mut() {
      if let UnitKind::Driver(driver) = &mut other.kind {
        driver.rename_unit(old, new);
      }
    }
    debug!(old, new, "renamed unit");
    Ok(())
  }

  /// Append a child to this assembly's workflow.
  pub fn add_to_workflow(&mut self, name: &str) -> Result<(), EngineError> {
    if !self.units.contains_key(name) {
      return Err(EngineError::UnitNotFound(name.to_string()));
    }
    self.workflow.add(name)
  }

  pub fn add_all_to_workflow(&mut self, names: &[&str]) -> Result<(), EngineError> {
    for name in names {
      self.add_to_workflow(name)?;
    }
    Ok(())
  }

  /// Append a sibling to a child driver's workflow. A driver may not
  /// iterate itself, directly or through another driver's workflow.
  pub fn add_to_driver_workflow(&mut self, driver: &str, member: &str) -> Result<(), EngineError> {
    if !self.units.contains_key(member) {
      return Err(EngineError::UnitNotFound(member.to_string()));
    }
    if member == driver || self.driver_workflow_reaches(member, driver) {
      return Err(EngineError::CircularDependency {
        src: driver.to_string(),
        dst: member.to_string(),
      });
    }
    let Some(unit) = self.units.get_mut(driver) else {
      return Err(EngineError::UnitNotFound(driver.to_string()));
    };
    let UnitKind::Driver(d) = &mut unit.kind else {
      return Err(EngineError::NotADriver(driver.to_string()));
    };
    d.workflow.add(member)
  }

  /// Can `target` be reached from `from` by following driver
  /// workflow membership transitively?
  fn driver_workflow_reaches(&self, from: &str, target: &str) -> bool {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut stack: Vec<&str> = vec![from];
    while let Some(name) = stack.pop() {
      if !seen.insert(name) {
        continue;
      }
      if let Some(unit) = self.units.get(name)
        && let UnitKind::Driver(driver) = &unit.kind
      {
        for member in driver.workflow.names() {
          if member == target {
            return true;
          }
          stack.push(member);
        }
      }
    }
    false
  }

  pub fn workflow(&self) -> &Workflow {
    &self.workflow
  }

  pub fn graph(&self) -> &DepGraph {
    &self.graph
  }

  /// Child names in insertion order.
  pub fn unit_names(&self) -> &[String] {
    &self.children
  }

  /// A child unit, addressed by a dotted unit path.
  pub fn unit_ref(&self, path: &str) -> Result<&Unit, EngineError> {
    match path.split_once('.') {
      None => self
        .units
        .get(path)
        .ok_or_else(|| EngineError::UnitNotFound(path.to_string())),
      Some((head, rest)) => {
        let unit = self
          .units
          .get(head)
          .ok_or_else(|| EngineError::UnitNotFound(head.to_string()))?;
        match &unit.kind {
          UnitKind::Assembly(sub) => sub.unit_ref(rest),
          _ => Err(EngineError::UnitNotFound(path.to_string())),
        }
      }
    }
  }

  /// A nested assembly, addressed by a dotted unit path.
  pub fn assembly_ref(&self, path: &str) -> Result<&Assembly, EngineError> {
    match &self.unit_ref(path)?.kind {
      UnitKind::Assembly(sub) => Ok(sub),
      _ => Err(EngineError::UnitNotFound(path.to_string())),
    }
  }

  pub fn exec_count(&self, path: &str) -> Result<u64, EngineError> {
    Ok(self.unit_ref(path)?.exec_count())
  }

  pub fn set_force_execute(&mut self, path: &str, force: bool) -> Result<(), EngineError> {
    self.unit_mut(path)?.force_execute = force;
    Ok(())
  }

  // ---- connections ----------------------------------------------------

  /// Connect an output variable to an input variable.
  ///
  /// Both paths are resolved in this scope; when both sides start with
  /// the same nested assembly the call descends into it instead. A
  /// deep path on one side creates a passthrough alias on the child it
  /// crosses into. The destination is invalidated, cascading.
  pub fn connect(&mut self, src: &str, dst: &str) -> Result<(), EngineError> {
    self.connect_in(src, dst).map(|_| ())
  }

  fn connect_in(&mut self, src: &str, dst: &str) -> Result<BTreeSet<String>, EngineError> {
    if let Some((src_head, src_rest)) = src.split_once('.')
      && let Some((dst_head, dst_rest)) = dst.split_once('.')
      && src_head == dst_head
      && let Some(unit) = self.units.get_mut(src_head)
      && let UnitKind::Assembly(sub) = &mut unit.kind
    {
      let surfaced = sub.connect_in(src_rest, dst_rest)?;
      let child = src_head.to_string();
      return Ok(self.propagate_from_child(&child, &surfaced));
    }

    let src_parsed = VarPath::parse(src)?;
    // a boundary input alias may fan out to further internal inputs
    let src_is_boundary = src_parsed.unit.is_none();
    let src_p = self.normalize_endpoint(src_parsed)?;
    let dst_p = self.normalize_endpoint(VarPath::parse(dst)?)?;
    let src_dir = self.lookup(&src_p)?.direction();
    let dst_dir = self.lookup(&dst_p)?.direction();
    if src_dir != Direction::Out && !src_is_boundary {
      return Err(EngineError::InvalidConnection {
        src: src.to_string(),
        dst: dst.to_string(),
        reason: "source must be an output variable or a boundary alias".to_string(),
      });
    }
    if dst_dir != Direction::In {
      return Err(EngineError::InvalidConnection {
        src: src.to_string(),
        dst: dst.to_string(),
        reason: "destination must be an input variable".to_string(),
      });
    }
    self.ensure_alias_for(&src_p)?;
    self.ensure_alias_for(&dst_p)?;
    self.graph.connect(src_p.clone(), dst_p.clone())?;
    debug!(src = %src_p, dst = %dst_p, "connected");
    // the destination now awaits a copy from its source
    Ok(self.cascade_invalid(vec![dst_p]))
  }

  /// Remove one connection. Descends when both paths run through the
  /// same nested assembly.
  pub fn disconnect(&mut self, src: &str, dst: &str) -> Result<(), EngineError> {
    if let Some((src_head, src_rest)) = src.split_once('.')
      && let Some((dst_head, dst_rest)) = dst.split_once('.')
      && src_head == dst_head
      && let Some(unit) = self.units.get_mut(src_head)
      && let UnitKind::Assembly(sub) = &mut unit.kind
    {
      return sub.disconnect(src_rest, dst_rest);
    }
    let src_p = self.normalize_endpoint(VarPath::parse(src)?)?;
    let dst_p = self.normalize_endpoint(VarPath::parse(dst)?)?;
    self.graph.disconnect(&src_p, &dst_p)?;
    debug!(src = %src_p, dst = %dst_p, "disconnected");
    Ok(())
  }

  /// Remove every connection touching a unit or a variable. The
  /// variable becomes settable again; its value is untouched.
  pub fn disconnect_all(&mut self, path: &str) -> Result<(), EngineError> {
    match path.split_once('.') {
      None => {
        if self.units.contains_key(path) {
          let removed = self.graph.disconnect_unit(path);
          debug!(unit = path, edges = removed.len(), "disconnected unit");
          Ok(())
        } else if let Some(target) = self.passthroughs.get(path).cloned() {
          let removed = self.graph.disconnect_var(&target);
          debug!(var = path, edges = removed.len(), "disconnected variable");
          Ok(())
        } else {
          Err(EngineError::UnitNotFound(path.to_string()))
        }
      }
      Some((head, rest)) => {
        let p = VarPath::child(head, rest);
        self.lookup(&p)?;
        let removed = self.graph.disconnect_var(&p);
        debug!(var = %p, edges = removed.len(), "disconnected variable");
        if let Some(unit) = self.units.get_mut(head)
          && let UnitKind::Assembly(sub) = &mut unit.kind
        {
          sub.disconnect_all(rest)?;
        }
        Ok(())
      }
    }
  }

  /// Expose an internal variable under an external name. The external
  /// name behaves exactly like the internal variable it maps to.
  pub fn create_passthrough(&mut self, internal: &str, external: &str) -> Result<(), EngineError> {
    if self.passthroughs.contains_key(external) || self.units.contains_key(external) {
      return Err(EngineError::NameConflict(external.to_string()));
    }
    let target = VarPath::parse(internal)?;
    if target.unit.is_none() {
      return Err(EngineError::BadPath(internal.to_string()));
    }
    self.lookup(&target)?;
    self.ensure_alias_for(&target)?;
    debug!(external, internal, "created passthrough");
    self.passthroughs.insert(external.to_string(), target);
    Ok(())
  }

  /// The source feeding a variable: its connection source if any,
  /// otherwise the internal target when the path names a passthrough.
  pub fn get_source(&self, path: &str) -> Result<Option<String>, EngineError> {
    let p = VarPath::parse(path)?;
    self.lookup(&p)?;
    if let Some(src) = self.graph.get_source(&p) {
      return Ok(Some(src.to_string()));
    }
    if p.unit.is_none()
      && let Some(target) = self.passthroughs.get(&p.var)
    {
      return Ok(Some(target.to_string()));
    }
    Ok(None)
  }

  /// Output variable names of a child that do (`connected = true`) or
  /// do not have at least one outgoing connection in this scope. For
  /// nested assemblies the names are passthrough externals, in stable
  /// alphabetical order; for components, declared order.
  pub fn list_outputs(&self, unit: &str, connected: bool) -> Result<Vec<String>, EngineError> {
    let u = self
      .units
      .get(unit)
      .ok_or_else(|| EngineError::UnitNotFound(unit.to_string()))?;
    let names: Vec<String> = match &u.kind {
      UnitKind::Assembly(sub) => sub
        .passthroughs
        .iter()
        .filter(|(_, target)| {
          sub
            .lookup(target)
            .map(|v| v.direction() == Direction::Out)
            .unwrap_or(false)
        })
        .map(|(ext, _)| ext.clone())
        .collect(),
      _ => u.vars.outputs().map(|v| v.name().to_string()).collect(),
    };
    Ok(
      names
        .into_iter()
        .filter(|name| {
          self
            .graph
            .has_destinations(&VarPath::child(unit, name.clone()))
            == connected
        })
        .collect(),
    )
  }

  // ---- values and validity --------------------------------------------

  /// Store a value into an unconnected variable and cascade
  /// invalidation to its dependents. Writing to a connected input
  /// fails, naming the blocking source; writing an unchanged value is
  /// a no-op.
  pub fn set(&mut self, path: &str, value: Value) -> Result<(), EngineError> {
    self.set_in(path, value).map(|_| ())
  }

  pub fn get(&self, path: &str) -> Result<Value, EngineError> {
    Ok(self.lookup(&VarPath::parse(path)?)?.value().clone())
  }

  /// Validity snapshot for a list of variable paths, in the order
  /// given.
  pub fn get_valid(&self, paths: &[&str]) -> Result<Vec<bool>, EngineError> {
    paths
      .iter()
      .map(|path| Ok(self.lookup(&VarPath::parse(path)?)?.is_valid()))
      .collect()
  }

  /// Mark a variable invalid and cascade per the invalidation rules.
  pub fn invalidate(&mut self, path: &str) -> Result<(), EngineError> {
    let p = VarPath::parse(path)?;
    self.lookup(&p)?;
    self.cascade_invalid(vec![p]);
    Ok(())
  }

  // ---- driver references ----------------------------------------------

  pub fn add_objective(&mut self, driver: &str, expr: &str) -> Result<(), EngineError> {
    self.register_reference(driver, expr, RefSlot::Objective)
  }

  pub fn add_parameter(&mut self, driver: &str, expr: &str) -> Result<(), EngineError> {
    self.register_reference(driver, expr, RefSlot::Parameter)
  }

  pub fn add_constraint(&mut self, driver: &str, expr: &str) -> Result<(), EngineError> {
    self.register_reference(driver, expr, RefSlot::Constraint)
  }

  /// Units that must execute to produce every variable the driver's
  /// objectives, parameters, and constraints reference, excluding the
  /// driver itself.
  pub fn required_unit_names(&self, driver: &str) -> Result<BTreeSet<String>, EngineError> {
    let Some(unit) = self.units.get(driver) else {
      return Err(EngineError::UnitNotFound(driver.to_string()));
    };
    let UnitKind::Driver(d) = &unit.kind else {
      return Err(EngineError::NotADriver(driver.to_string()));
    };
    Ok(self.required_for(d, driver))
  }

  fn required_for(&self, driver: &Driver, driver_name: &str) -> BTreeSet<String> {
    let targets: Vec<VarPath> = driver.references().cloned().collect();
    let mut required: BTreeSet<String> =
      self.graph.required_units(&targets).into_iter().collect();
    required.remove(driver_name);
    required
  }

  fn register_reference(
    &mut self,
    driver: &str,
    expr: &str,
    slot: RefSlot,
  ) -> Result<(), EngineError> {
    let mut vars = Vec::new();
    for candidate in expr::extract_references(expr) {
      let p = VarPath::parse(&candidate)?;
      self
        .lookup(&p)
        .map_err(|_| EngineError::VariableNotFound(candidate.clone()))?;
      vars.push(p);
    }
    let Some(unit) = self.units.get_mut(driver) else {
      return Err(EngineError::UnitNotFound(driver.to_string()));
    };
    let UnitKind::Driver(d) = &mut unit.kind else {
      return Err(EngineError::NotADriver(driver.to_string()));
    };
    let reference = Reference {
      expr: expr.to_string(),
      vars,
    };
    match slot {
      RefSlot::Objective => d.objectives.push(reference),
      RefSlot::Parameter => d.parameters.push(reference),
      RefSlot::Constraint => d.constraints.push(reference),
    }
    Ok(())
  }

  // ---- execution ------------------------------------------------------

  /// Run this assembly's workflow in order. Each listed unit pulls its
  /// transitive producers on demand, so only stale units execute.
  pub fn run(&mut self) -> Result<(), EngineError> {
    let order = self.workflow.names().to_vec();
    for name in order {
      self.run_child(&name, None)?;
    }
    Ok(())
  }

  /// Run one unit directly, addressed by a dotted unit path. Pulls the
  /// unit's transitive producers first, across nesting boundaries in
  /// both directions, regardless of workflow membership.
  pub fn run_unit(&mut self, path: &str) -> Result<(), EngineError> {
    match path.split_once('.') {
      None => self.run_child(path, None).map(|_| ()),
      Some((head, rest)) => {
        // resolve the enclosing assembly's pending boundary inputs in
        // this scope before descending
        self.resolve_unit_inputs(head, None)?;
        let Some(unit) = self.units.get_mut(head) else {
          return Err(EngineError::UnitNotFound(head.to_string()));
        };
        match &mut unit.kind {
          UnitKind::Assembly(sub) => sub.run_unit(rest),
          _ => Err(EngineError::UnitNotFound(path.to_string())),
        }
      }
    }
  }

  /// Run one child in this scope; returns whether it actually
  /// executed.
  fn run_child(&mut self, name: &str, ctx: Option<&str>) -> Result<bool, EngineError> {
    if self.run_stack.iter().any(|n| n == name) {
      return Err(EngineError::Execution {
        unit: name.to_string(),
        message: "circular execution dependency".to_string(),
      });
    }
    if !self.units.contains_key(name) {
      return Err(EngineError::UnitNotFound(name.to_string()));
    }
    self.run_stack.push(name.to_string());
    let result = self.run_child_inner(name, ctx);
    self.run_stack.pop();
    result
  }

  fn run_child_inner(&mut self, name: &str, ctx: Option<&str>) -> Result<bool, EngineError> {
    self.resolve_unit_inputs(name, ctx)?;
    if !self.unit_is_stale(name)? {
      trace!(unit = name, "up to date, skipping");
      return Ok(false);
    }
    let kind_is_driver = matches!(
      self.units.get(name).map(|u| &u.kind),
      Some(UnitKind::Driver(_))
    );
    if kind_is_driver {
      let (pulls, members) = self.plan_driver(name)?;
      for producer in &pulls {
        self.run_child(producer, None)?;
      }
      if let Some(unit) = self.units.get_mut(name) {
        unit.exec_count += 1;
        debug!(unit = name, exec_count = unit.exec_count, "executing driver workflow");
      }
      for member in &members {
        self.run_child(member, Some(name))?;
      }
      return Ok(true);
    }

    let Some(unit) = self.units.get_mut(name) else {
      return Err(EngineError::UnitNotFound(name.to_string()));
    };
    match &mut unit.kind {
      UnitKind::Component(compute) => {
        compute
          .compute(&mut unit.vars)
          .map_err(|e| EngineError::Execution {
            unit: name.to_string(),
            message: e.to_string(),
          })?;
        unit.exec_count += 1;
        unit.vars.mark_all(true);
        debug!(unit = name, exec_count = unit.exec_count, "executed component");
      }
      UnitKind::Assembly(sub) => {
        sub.run()?;
        unit.exec_count += 1;
        debug!(unit = name, exec_count = unit.exec_count, "ran nested assembly");
      }
      UnitKind::Driver(_) => {}
    }
    Ok(true)
  }

  /// Pull step: for every connected, currently invalid input of
  /// `name`, run the producer of its source, then copy the value
  /// across the edge and mark the destination valid.
  fn resolve_unit_inputs(&mut self, name: &str, ctx: Option<&str>) -> Result<(), EngineError> {
    for (src, dst) in self.graph.inputs_of(name) {
      if self.path_is_valid(&dst)? {
        continue;
      }
      // input-valued sources (boundary alias fan-out) need no producer
      if let Some(src_unit) = src.unit.clone()
        && self.lookup(&src)?.direction() == Direction::Out
      {
        let mut runner = self.resolve_runner(&src_unit);
        if ctx == Some(runner.as_str()) {
          // the requesting driver iterates that unit itself
          runner = src_unit.clone();
        }
        if runner != name && !self.run_stack.iter().any(|n| n == &runner) {
          self.run_producer(&runner, &src)?;
        }
      }
      let value = self.lookup(&src)?.value().clone();
      self.write_refresh(&dst, value)?;
      trace!(src = %src, dst = %dst, "copied value across connection");
    }
    Ok(())
  }

  /// Run the unit that produces `src`. A nested assembly producing a
  /// boundary output runs only the internal chain behind that output,
  /// never its whole workflow.
  fn run_producer(&mut self, runner: &str, src: &VarPath) -> Result<(), EngineError> {
    let runner_is_assembly = matches!(
      self.units.get(runner).map(|u| &u.kind),
      Some(UnitKind::Assembly(_))
    );
    if runner_is_assembly && src.unit.as_deref() == Some(runner) {
      self.resolve_unit_inputs(runner, None)?;
      let Some(unit) = self.units.get_mut(runner) else {
        return Err(EngineError::UnitNotFound(runner.to_string()));
      };
      if let UnitKind::Assembly(sub) = &mut unit.kind {
        sub.run_for_output(&src.var)?;
      }
      Ok(())
    } else {
      self.run_child(runner, None).map(|_| ())
    }
  }

  /// Run whatever produces the given boundary output of this
  /// assembly, descending through alias chains.
  fn run_for_output(&mut self, external: &str) -> Result<(), EngineError> {
    let target = match self.passthroughs.get(external) {
      Some(t) => t.clone(),
      None => VarPath::parse(external)?,
    };
    let Some(unit_name) = target.unit.clone() else {
      return Ok(());
    };
    let target_is_assembly = matches!(
      self.units.get(&unit_name).map(|u| &u.kind),
      Some(UnitKind::Assembly(_))
    );
    if target_is_assembly {
      self.resolve_unit_inputs(&unit_name, None)?;
      let Some(unit) = self.units.get_mut(&unit_name) else {
        return Err(EngineError::UnitNotFound(unit_name));
      };
      if let UnitKind::Assembly(sub) = &mut unit.kind {
        sub.run_for_output(&target.var)?;
      }
      Ok(())
    } else {
      let runner = self.resolve_runner(&unit_name);
      self.run_child(&runner, None).map(|_| ())
    }
  }

  /// Decide what a driver must pull before iterating, and which
  /// members it iterates. Producers inside the driver's own workflow
  /// are never pulled; when references are registered the member list
  /// is pruned to units that influence them.
  fn plan_driver(&self, name: &str) -> Result<(Vec<String>, Vec<String>), EngineError> {
    let Some(unit) = self.units.get(name) else {
      return Err(EngineError::UnitNotFound(name.to_string()));
    };
    let UnitKind::Driver(driver) = &unit.kind else {
      return Err(EngineError::NotADriver(name.to_string()));
    };
    let in_set: HashSet<&str> = driver.workflow.names().iter().map(String::as_str).collect();
    let mut pulls: Vec<String> = Vec::new();
    let consider = |runner: String, pulls: &mut Vec<String>| {
      if runner != name && !pulls.contains(&runner) {
        pulls.push(runner);
      }
    };
    for reference in driver.references() {
      if self.path_is_valid(reference)? {
        continue;
      }
      if let Some(unit_name) = &reference.unit {
        if in_set.contains(unit_name.as_str()) {
          continue;
        }
        consider(self.resolve_runner(unit_name), &mut pulls);
      }
    }
    for member in driver.workflow.names() {
      for (src, dst) in self.graph.inputs_of(member) {
        if self.path_is_valid(&dst)? {
          continue;
        }
        let Some(src_unit) = &src.unit else { continue };
        if in_set.contains(src_unit.as_str()) {
          continue;
        }
        consider(self.resolve_runner(src_unit), &mut pulls);
      }
    }
    let members: Vec<String> = if driver.has_references() {
      let required = self.required_for(driver, name);
      driver
        .workflow
        .names()
        .iter()
        .filter(|m| required.contains(*m))
        .cloned()
        .collect()
    } else {
      driver.workflow.names().to_vec()
    };
    Ok((pulls, members))
  }

  /// The unit to run when `unit`'s output is demanded: the sibling
  /// driver that iterates it, or the unit itself.
  fn resolve_runner(&self, unit: &str) -> String {
    for name in &self.children {
      if name == unit {
        continue;
      }
      if let Some(u) = self.units.get(name)
        && let UnitKind::Driver(driver) = &u.kind
        && driver.workflow.contains(unit)
      {
        return name.clone();
      }
    }
    unit.to_string()
  }

  /// Whether a unit must execute: forced, or (component) any variable
  /// invalid, or (assembly) any descendant stale, or (driver) any
  /// registered reference invalid or any workflow member stale.
  fn unit_is_stale(&self, name: &str) -> Result<bool, EngineError> {
    self.unit_is_stale_guarded(name, &mut HashSet::new())
  }

  /// The `seen` set breaks cycles in driver membership: a unit already
  /// under consideration contributes nothing new to the answer.
  fn unit_is_stale_guarded(
    &self,
    name: &str,
    seen: &mut HashSet<String>,
  ) -> Result<bool, EngineError> {
    if !seen.insert(name.to_string()) {
      return Ok(false);
    }
    let unit = self
      .units
      .get(name)
      .ok_or_else(|| EngineError::UnitNotFound(name.to_string()))?;
    if unit.force_execute {
      return Ok(true);
    }
    match &unit.kind {
      UnitKind::Component(_) => Ok(unit.vars.iter().any(|v| !v.is_valid())),
      UnitKind::Assembly(sub) => Ok(sub.any_stale()),
      UnitKind::Driver(driver) => {
        for reference in driver.references() {
          if !self.path_is_valid(reference)? {
            return Ok(true);
          }
        }
        for member in driver.workflow.names() {
          if self.unit_is_stale_guarded(member, seen)? {
            return Ok(true);
          }
        }
        Ok(false)
      }
    }
  }

  fn any_stale(&self) -> bool {
    self
      .children
      .iter()
      .any(|name| self.unit_is_stale(name).unwrap_or(false))
  }

  // ---- invalidation ----------------------------------------------------

  /// Mark each seed invalid and cascade: an invalid component input
  /// conservatively invalidates every output of its unit; each newly
  /// invalid variable follows its outgoing edges. Alias boundaries are
  /// crossed in both directions. Returns the boundary names of this
  /// assembly that became invalid, for the enclosing scope to continue
  /// from. Already-invalid variables stop the walk.
  fn cascade_invalid(&mut self, seeds: Vec<VarPath>) -> BTreeSet<String> {
    let mut surfaced = BTreeSet::new();
    let mut work = seeds;
    while let Some(item) = work.pop() {
      let item = match item.unit {
        None => match self.passthroughs.get(&item.var) {
          Some(target) => target.clone(),
          None => continue,
        },
        Some(_) => item,
      };
      let Some(unit_name) = item.unit.clone() else {
        continue;
      };
      let mut newly: Vec<VarPath> = Vec::new();
      {
        let Some(unit) = self.units.get_mut(&unit_name) else {
          continue;
        };
        match &mut unit.kind {
          UnitKind::Assembly(sub) => {
            for ext in sub.invalidate_in(&item.var) {
              newly.push(VarPath::child(unit_name.clone(), ext));
            }
          }
          _ => {
            let Some(var) = unit.vars.get_mut(&item.var) else {
              continue;
            };
            if !var.is_valid() {
              continue;
            }
            var.mark(false);
            let direction = var.direction();
            newly.push(item.clone());
            if direction == Direction::In {
              let stale_outputs: Vec<String> = unit
                .vars
                .outputs()
                .filter(|v| v.is_valid())
                .map(|v| v.name().to_string())
                .collect();
              for out in stale_outputs {
                if let Some(v) = unit.vars.get_mut(&out) {
                  v.mark(false);
                }
                newly.push(VarPath::child(unit_name.clone(), out));
              }
            }
          }
        }
      }
      for invalidated in newly {
        trace!(var = %invalidated, "invalidated");
        for ext in self.aliases_of(&invalidated) {
          surfaced.insert(ext);
        }
        work.extend(self.graph.destinations(&invalidated).iter().cloned());
      }
    }
    surfaced
  }

  /// Invalidation entry point for a parent scope crossing into this
  /// assembly through an alias.
  fn invalidate_in(&mut self, var: &str) -> BTreeSet<String> {
    match VarPath::parse(var) {
      Ok(p) => self.cascade_invalid(vec![p]),
      Err(_) => BTreeSet::new(),
    }
  }

  /// Continue an invalidation that surfaced out of a child assembly:
  /// follow this scope's edges from each surfaced boundary name, and
  /// re-surface through this assembly's own aliases.
  fn propagate_from_child(&mut self, child: &str, exts: &BTreeSet<String>) -> BTreeSet<String> {
    let mut seeds: Vec<VarPath> = Vec::new();
    for ext in exts {
      let p = VarPath::child(child, ext.clone());
      seeds.extend(self.graph.destinations(&p).iter().cloned());
    }
    let mut up = self.cascade_invalid(seeds);
    for ext in exts {
      for alias in self.aliases_of(&VarPath::child(child, ext.clone())) {
        up.insert(alias);
      }
    }
    up
  }

  fn aliases_of(&self, target: &VarPath) -> Vec<String> {
    self
      .passthroughs
      .iter()
      .filter(|(_, t)| *t == target)
      .map(|(ext, _)| ext.clone())
      .collect()
  }

  // ---- resolution ------------------------------------------------------

  fn lookup(&self, p: &VarPath) -> Result<&Variable, EngineError> {
    match &p.unit {
      None => {
        let target = self
          .passthroughs
          .get(&p.var)
          .ok_or_else(|| EngineError::VariableNotFound(p.to_string()))?;
        self.lookup(target)
      }
      Some(unit_name) => {
        let unit = self
          .units
          .get(unit_name)
          .ok_or_else(|| EngineError::UnitNotFound(unit_name.clone()))?;
        match &unit.kind {
          UnitKind::Assembly(sub) => sub.lookup(&VarPath::parse(&p.var)?),
          _ => {
            if p.var.contains('.') {
              return Err(EngineError::BadPath(p.to_string()));
            }
            unit
              .vars
              .get(&p.var)
              .ok_or_else(|| EngineError::VariableNotFound(p.to_string()))
          }
        }
      }
    }
  }

  fn lookup_mut(&mut self, p: &VarPath) -> Result<&mut Variable, EngineError> {
    match &p.unit {
      None => {
        let target = self
          .passthroughs
          .get(&p.var)
          .cloned()
          .ok_or_else(|| EngineError::VariableNotFound(p.to_string()))?;
        self.lookup_mut(&target)
      }
      Some(unit_name) => {
        let unit = self
          .units
          .get_mut(unit_name)
          .ok_or_else(|| EngineError::UnitNotFound(unit_name.clone()))?;
        match &mut unit.kind {
          UnitKind::Assembly(sub) => sub.lookup_mut(&VarPath::parse(&p.var)?),
          _ => {
            if p.var.contains('.') {
              return Err(EngineError::BadPath(p.to_string()));
            }
            unit
              .vars
              .get_mut(&p.var)
              .ok_or_else(|| EngineError::VariableNotFound(p.to_string()))
          }
        }
      }
    }
  }

  fn unit_mut(&mut self, path: &str) -> Result<&mut Unit, EngineError> {
    match path.split_once('.') {
      None => self
        .units
        .get_mut(path)
        .ok_or_else(|| EngineError::UnitNotFound(path.to_string())),
      Some((head, rest)) => {
        let unit = self
          .units
          .get_mut(head)
          .ok_or_else(|| EngineError::UnitNotFound(head.to_string()))?;
        match &mut unit.kind {
          UnitKind::Assembly(sub) => sub.unit_mut(rest),
          _ => Err(EngineError::UnitNotFound(path.to_string())),
        }
      }
    }
  }

  fn path_is_valid(&self, p: &VarPath) -> Result<bool, EngineError> {
    Ok(self.lookup(p)?.is_valid())
  }

  /// Store a pulled value and mark the destination valid, without
  /// cascading (its consumers were invalidated when the source was).
  fn write_refresh(&mut self, p: &VarPath, value: Value) -> Result<(), EngineError> {
    let var = self.lookup_mut(p)?;
    var.store(value);
    var.mark(true);
    Ok(())
  }

  /// Resolve a boundary alias to its internal target; child paths pass
  /// through unchanged.
  fn normalize_endpoint(&self, p: VarPath) -> Result<VarPath, EngineError> {
    match p.unit {
      None => self
        .passthroughs
        .get(&p.var)
        .cloned()
        .ok_or_else(|| EngineError::VariableNotFound(p.to_string())),
      Some(_) => Ok(p),
    }
  }

  /// When an endpoint crosses into a child assembly, make sure the
  /// child exposes the crossed path as a passthrough alias so that
  /// invalidation can surface back through it.
  fn ensure_alias_for(&mut self, p: &VarPath) -> Result<(), EngineError> {
    let Some(unit_name) = p.unit.clone() else {
      return Ok(());
    };
    let Some(unit) = self.units.get_mut(&unit_name) else {
      return Err(EngineError::UnitNotFound(unit_name));
    };
    if let UnitKind::Assembly(sub) = &mut unit.kind {
      sub.ensure_alias(&p.var)?;
    }
    Ok(())
  }

  fn ensure_alias(&mut self, name: &str) -> Result<(), EngineError> {
    if self.passthroughs.contains_key(name) {
      return Ok(());
    }
    let target = VarPath::parse(name)?;
    let Some(unit_name) = target.unit.clone() else {
      return Err(EngineError::VariableNotFound(name.to_string()));
    };
    {
      let Some(unit) = self.units.get_mut(&unit_name) else {
        return Err(EngineError::UnitNotFound(unit_name));
      };
      if let UnitKind::Assembly(sub) = &mut unit.kind {
        sub.ensure_alias(&target.var)?;
      }
    }
    self.lookup(&target)?;
    debug!(external = name, internal = %target, "created passthrough alias");
    self.passthroughs.insert(name.to_string(), target);
    Ok(())
  }

  fn set_in(&mut self, path: &str, value: Value) -> Result<BTreeSet<String>, EngineError> {
    match path.split_once('.') {
      None => {
        let target = self
          .passthroughs
          .get(path)
          .cloned()
          .ok_or_else(|| EngineError::VariableNotFound(path.to_string()))?;
        self.set_in(&target.to_string(), value)
      }
      Some((head, rest)) => {
        let scoped = VarPath::child(head, rest);
        if let Some(src) = self.graph.get_source(&scoped) {
          return Err(EngineError::ConnectedInput {
            target: scoped.to_string(),
            src: src.to_string(),
          });
        }
        let head_is_assembly = matches!(
          self.units.get(head).map(|u| &u.kind),
          Some(UnitKind::Assembly(_))
        );
        if head_is_assembly {
          let surfaced = {
            let Some(unit) = self.units.get_mut(head) else {
              return Err(EngineError::UnitNotFound(head.to_string()));
            };
            let UnitKind::Assembly(sub) = &mut unit.kind else {
              return Err(EngineError::UnitNotFound(head.to_string()));
            };
            sub.set_in(rest, value)?
          };
          return Ok(self.propagate_from_child(head, &surfaced));
        }
        // leaf variable of a component
        let (direction, output_names) = {
          let Some(unit) = self.units.get_mut(head) else {
            return Err(EngineError::UnitNotFound(head.to_string()));
          };
          if rest.contains('.') {
            return Err(EngineError::BadPath(path.to_string()));
          }
          let output_names: Vec<String> =
            unit.vars.outputs().map(|v| v.name().to_string()).collect();
          let Some(var) = unit.vars.get_mut(rest) else {
            return Err(EngineError::VariableNotFound(scoped.to_string()));
          };
          if var.value() == &value {
            return Ok(BTreeSet::new());
          }
          var.store(value);
          var.mark(true);
          (var.direction(), output_names)
        };
        debug!(var = %scoped, "set value");
        // an input that is itself a fan-out source also feeds edges
        let mut seeds: Vec<VarPath> = self.graph.destinations(&scoped).to_vec();
        if direction == Direction::In {
          seeds.extend(
            output_names
              .into_iter()
              .map(|out| VarPath::child(head, out)),
          );
        }
        let mut surfaced = self.cascade_invalid(seeds);
        for ext in self.aliases_of(&scoped) {
          surfaced.insert(ext);
        }
        Ok(surfaced)
      }
    }
  }
}
