use std::collections::{BTreeMap, HashSet};

use crate::error::EngineError;
use crate::path::VarPath;

/// Per-scope dependency edge store.
///
/// A destination has at most one incoming edge; a source may fan out
/// to many destinations. Edges are kept in ordered maps so that pull
/// resolution and listing walk them deterministically.
#[derive(Debug, Clone, Default)]
pub struct DepGraph {
  /// destination -> its single source.
  sources: BTreeMap<VarPath, VarPath>,
  /// source -> destinations, in connection order.
  outgoing: BTreeMap<VarPath, Vec<VarPath>>,
}

impl DepGraph {
  pub fn new() -> Self {
    Self::default()
  }

  /// Record an edge. Fails if the destination already has a source or
  /// if the edge would close a unit-level cycle; no state is mutated
  /// on failure.
  pub fn connect(&mut self, src: VarPath, dst: VarPath) -> Result<(), EngineError> {
    if let Some(existing) = self.sources.get(&dst) {
      return Err(EngineError::AlreadyConnected {
        dst: dst.to_string(),
        src: existing.to_string(),
      });
    }
    if let (Some(su), Some(du)) = (&src.unit, &dst.unit) {
      if su == du {
        return Err(EngineError::InvalidConnection {
          src: src.to_string(),
          dst: dst.to_string(),
          reason: "source and destination belong to the same unit".to_string(),
        });
      }
      if self.unit_reaches(du, su) {
        return Err(EngineError::CircularDependency {
          src: src.to_string(),
          dst: dst.to_string(),
        });
      }
    }
    self
      .outgoing
      .entry(src.clone())
      .or_default()
      .push(dst.clone());
    self.sources.insert(dst, src);
    Ok(())
  }

  /// Remove one edge. Fails if it does not exist.
  pub fn disconnect(&mut self, src: &VarPath, dst: &VarPath) -> Result<(), EngineError> {
    if self.sources.get(dst) != Some(src) {
      return Err(EngineError::InvalidConnection {
        src: src.to_string(),
        dst: dst.to_string(),
        reason: "no such connection".to_string(),
      });
    }
    self.sources.remove(dst);
    if let Some(dsts) = self.outgoing.get_mut(src) {
      dsts.retain(|d| d != dst);
      if dsts.is_empty() {
        self.outgoing.remove(src);
      }
    }
    Ok(())
  }

  /// Remove every edge touching the given variable; returns the
  /// removed `(src, dst)` pairs.
  pub fn disconnect_var(&mut self, var: &VarPath) -> Vec<(VarPath, VarPath)> {
    let mut removed: Vec<(VarPath, VarPath)> = Vec::new();
    if let Some(src) = self.sources.get(var).cloned() {
      removed.push((src, var.clone()));
    }
    for dst in self.destinations(var).to_vec() {
      removed.push((var.clone(), dst));
    }
    for (src, dst) in &removed {
      let _ = self.disconnect(src, dst);
    }
    removed
  }

  /// Remove every edge touching any variable of the given unit;
  /// returns the removed `(src, dst)` pairs.
  pub fn disconnect_unit(&mut self, unit: &str) -> Vec<(VarPath, VarPath)> {
    let touches = |p: &VarPath| p.unit.as_deref() == Some(unit);
    let removed: Vec<(VarPath, VarPath)> = self
      .sources
      .iter()
      .filter(|(dst, src)| touches(dst) || touches(src))
      .map(|(dst, src)| (src.clone(), dst.clone()))
      .collect();
    for (src, dst) in &removed {
      let _ = self.disconnect(src, dst);
    }
    removed
  }

  /// The source feeding `dst`, if it is connected.
  pub fn get_source(&self, dst: &VarPath) -> Option<&VarPath> {
    self.sources.get(dst)
  }

  /// Destinations fed by `src`, in connection order.
  pub fn destinations(&self, src: &VarPath) -> &[VarPath] {
    self
      .outgoing
      .get(src)
      .map(|v| v.as_slice())
      .unwrap_or(&[])
  }

  pub fn has_destinations(&self, src: &VarPath) -> bool {
    !self.destinations(src).is_empty()
  }

  /// Incoming edges of the given unit as `(src, dst)` pairs, ordered
  /// by destination path.
  pub fn inputs_of(&self, unit: &str) -> Vec<(VarPath, VarPath)> {
    self
      .sources
      .iter()
      .filter(|(dst, _)| dst.unit.as_deref() == Some(unit))
      .map(|(dst, src)| (src.clone(), dst.clone()))
      .collect()
  }

  /// Backward reachability: the names of every unit that must execute
  /// to produce the given target variables, walking incoming edges
  /// transitively. Boundary and unconnected variables contribute
  /// nothing beyond their owning unit.
  pub fn required_units(&self, targets: &[VarPath]) -> HashSet<String> {
    let mut required = HashSet::new();
    let mut stack: Vec<String> = targets.iter().filter_map(|p| p.unit.clone()).collect();
    while let Some(unit) = stack.pop() {
      if !required.insert(unit.clone()) {
        continue;
      }
      for (dst, src) in &self.sources {
        if dst.unit.as_deref() == Some(&unit) {
          if let Some(upstream) = &src.unit {
            if !required.contains(upstream) {
              stack.push(upstream.clone());
            }
          }
        }
      }
    }
    required
  }

  /// Rewrite every path mentioning `old` as a unit name to `new`.
  pub fn rename_unit(&mut self, old: &str, new: &str) {
    let rewrite = |p: &VarPath| -> VarPath {
      if p.unit.as_deref() == Some(old) {
        VarPath::child(new, p.var.clone())
      } else {
        p.clone()
      }
    };
    self.sources = self
      .sources
      .iter()
      .map(|(dst, src)| (rewrite(dst), rewrite(src)))
      .collect();
    self.outgoing = self
      .outgoing
      .iter()
      .map(|(src, dsts)| (rewrite(src), dsts.iter().map(&rewrite).collect()))
      .collect();
  }

  /// Unit-level downstream reachability: can invalidation starting at
  /// an input of `from` reach a variable of `to`?
  fn unit_reaches(&self, from: &str, to: &str) -> bool {
    if from == to {
      return true;
    }
    let mut seen: HashSet<&str> = HashSet::new();
    let mut stack: Vec<&str> = vec![from];
    while let Some(unit) = stack.pop() {
      if !seen.insert(unit) {
        continue;
      }
      for (src, dsts) in &self.outgoing {
        if src.unit.as_deref() != Some(unit) {
          continue;
        }
        for dst in dsts {
          match dst.unit.as_deref() {
            Some(next) if next == to => return true,
            Some(next) => stack.push(next),
            None => {}
          }
        }
      }
    }
    false
  }
}
