use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

use serde_json::{json, Value};
use trellis_engine::{Assembly, Driver, EngineError, Unit, VarSet, VarSpec};

type ExecLog = Rc<RefCell<Vec<String>>>;

/// Adder with two inputs and two outputs: c = a + b, d = a - b.
/// Every execution appends the unit's name to the shared log.
fn adder(log: &ExecLog, name: &str) -> Unit {
  let log = Rc::clone(log);
  let name = name.to_string();
  Unit::component(
    vec![
      VarSpec::input("a", json!(1)),
      VarSpec::input("b", json!(2)),
      VarSpec::output("c", json!(3)),
      VarSpec::output("d", json!(-1)),
    ],
    Box::new(move |vars: &mut VarSet| {
      log.borrow_mut().push(name.clone());
      let a = vars.value("a").and_then(Value::as_i64).unwrap_or(0);
      let b = vars.value("b").and_then(Value::as_i64).unwrap_or(0);
      vars.put("c", json!(a + b))?;
      vars.put("d", json!(a - b))
    }),
  )
  .expect("valid schema")
}

const ALL_COMPS: [&str; 8] = [
  "sub.comp1",
  "sub.comp2",
  "sub.comp3",
  "sub.comp4",
  "sub.comp5",
  "sub.comp6",
  "comp7",
  "comp8",
];

fn exec_counts(top: &Assembly) -> Vec<u64> {
  ALL_COMPS
    .iter()
    .map(|p| top.exec_count(p).unwrap())
    .collect()
}

fn outputs(top: &Assembly) -> Vec<(i64, i64)> {
  ALL_COMPS
    .iter()
    .map(|p| {
      let c = top.get(&format!("{p}.c")).unwrap();
      let d = top.get(&format!("{p}.d")).unwrap();
      (c.as_i64().unwrap(), d.as_i64().unwrap())
    })
    .collect()
}

fn valids(top: &Assembly, unit: &str) -> Vec<bool> {
  let paths: Vec<String> = ["a", "b", "c", "d"]
    .iter()
    .map(|v| format!("{unit}.{v}"))
    .collect();
  let refs: Vec<&str> = paths.iter().map(String::as_str).collect();
  top.get_valid(&refs).unwrap()
}

/// Two-level model: `top` holds comp7, comp8, and a nested `sub` of
/// six adders wired through explicit and automatic passthroughs.
fn build_nested() -> (Assembly, ExecLog) {
  let log: ExecLog = Rc::default();
  let mut sub = Assembly::new();
  for name in ["comp1", "comp2", "comp3", "comp4", "comp5", "comp6"] {
    sub.add(name, adder(&log, name)).unwrap();
  }
  sub
    .add_all_to_workflow(&["comp1", "comp2", "comp3", "comp4", "comp5", "comp6"])
    .unwrap();

  sub.create_passthrough("comp1.a", "a1").unwrap();
  sub.create_passthrough("comp2.b", "b2").unwrap();
  sub.create_passthrough("comp4.b", "b4").unwrap();
  sub.create_passthrough("comp4.c", "c4").unwrap();
  sub.create_passthrough("comp6.b", "b6").unwrap();
  sub.create_passthrough("comp2.c", "c2").unwrap();
  sub.create_passthrough("comp1.d", "d1").unwrap();
  sub.create_passthrough("comp5.d", "d5").unwrap();

  sub.connect("comp1.c", "comp4.a").unwrap();
  sub.connect("comp5.c", "comp1.b").unwrap();
  sub.connect("comp2.d", "comp5.b").unwrap();
  sub.connect("comp3.c", "comp5.a").unwrap();
  sub.connect("comp4.d", "comp6.a").unwrap();

  let mut top = Assembly::new();
  top.add("sub", Unit::assembly(sub)).unwrap();
  top.add("comp7", adder(&log, "comp7")).unwrap();
  top.add("comp8", adder(&log, "comp8")).unwrap();
  top.add_all_to_workflow(&["comp7", "sub", "comp8"]).unwrap();

  top.connect("sub.c4", "comp8.a").unwrap();
  // deep endpoints create passthrough aliases on sub automatically
  top.connect("comp7.c", "sub.comp3.a").unwrap();
  top.connect("sub.comp3.d", "comp8.b").unwrap();

  (top, log)
}

#[test]
fn single_component_runs_lazily() {
  let log: ExecLog = Rc::default();
  let mut top = Assembly::new();
  top.add("comp1", adder(&log, "comp1")).unwrap();
  top.add_to_workflow("comp1").unwrap();

  assert_eq!(top.exec_count("comp1").unwrap(), 0);
  assert_eq!(valids(&top, "comp1"), [true, true, false, false]);

  top.run().unwrap();
  assert_eq!(top.exec_count("comp1").unwrap(), 1);
  assert_eq!(top.get("comp1.c").unwrap(), json!(3));
  assert_eq!(top.get("comp1.d").unwrap(), json!(-1));
  assert_eq!(valids(&top, "comp1"), [true, true, true, true]);

  top.set("comp1.a", json!(5)).unwrap();
  assert_eq!(valids(&top, "comp1"), [true, true, false, false]);
  top.run().unwrap();
  assert_eq!(top.exec_count("comp1").unwrap(), 2);
  assert_eq!(top.get("comp1.c").unwrap(), json!(7));
  assert_eq!(top.get("comp1.d").unwrap(), json!(3));

  // nothing changed, so a second run executes nothing
  top.run().unwrap();
  assert_eq!(top.exec_count("comp1").unwrap(), 2);

  // connect a second component downstream
  top.add("comp2", adder(&log, "comp2")).unwrap();
  top.add_to_workflow("comp2").unwrap();
  top.connect("comp1.c", "comp2.a").unwrap();
  assert_eq!(top.exec_count("comp2").unwrap(), 0);
  assert_eq!(top.get("comp2.c").unwrap(), json!(3));
  assert_eq!(top.get("comp2.d").unwrap(), json!(-1));
  assert_eq!(valids(&top, "comp2"), [false, true, false, false]);

  top.run().unwrap();
  assert_eq!(top.exec_count("comp1").unwrap(), 2);
  assert_eq!(top.exec_count("comp2").unwrap(), 1);
  assert_eq!(top.get("comp2.c").unwrap(), json!(9));
  assert_eq!(top.get("comp2.d").unwrap(), json!(5));
  assert_eq!(valids(&top, "comp2"), [true, true, true, true]);
}

#[test]
fn first_run_executes_each_component_once() {
  let (mut top, _log) = build_nested();
  top.run().unwrap();
  assert_eq!(exec_counts(&top), [1, 1, 1, 1, 1, 1, 1, 1]);
  assert_eq!(
    outputs(&top),
    [
      (5, -3),
      (3, -1),
      (5, 1),
      (7, 3),
      (4, 6),
      (5, 1),
      (3, -1),
      (8, 6)
    ]
  );
  top.run().unwrap();
  assert_eq!(exec_counts(&top), [1, 1, 1, 1, 1, 1, 1, 1]);
}

#[test]
fn boundary_set_reruns_only_downstream() {
  let (mut top, _log) = build_nested();
  top.run().unwrap();
  assert_eq!(valids(&top, "sub.comp6"), [true, true, true, true]);

  // sub.b6 is an alias for sub.comp6.b, so setting it writes comp6.b
  // directly; only comp6's outputs go stale
  top.set("sub.b6", json!(3)).unwrap();
  assert_eq!(valids(&top, "sub.comp6"), [true, true, false, false]);
  assert_eq!(top.get("sub.comp6.b").unwrap(), json!(3));
  assert_eq!(top.get("sub.b6").unwrap(), json!(3));

  top.run().unwrap();
  assert_eq!(exec_counts(&top), [1, 1, 1, 1, 1, 2, 1, 1]);
  assert_eq!(
    outputs(&top),
    [
      (5, -3),
      (3, -1),
      (5, 1),
      (7, 3),
      (4, 6),
      (6, 0),
      (3, -1),
      (8, 6)
    ]
  );
}

#[test]
fn upstream_set_invalidates_across_boundaries() {
  let (mut top, _log) = build_nested();
  top.run().unwrap();
  assert_eq!(valids(&top, "sub.comp3"), [true, true, true, true]);

  top.set("comp7.a", json!(3)).unwrap();
  assert_eq!(valids(&top, "comp7"), [true, true, false, false]);
  assert_eq!(valids(&top, "sub.comp1"), [true, false, false, false]);
  assert_eq!(valids(&top, "sub.comp2"), [true, true, true, true]);
  assert_eq!(valids(&top, "sub.comp3"), [false, true, false, false]);
  assert_eq!(valids(&top, "sub.comp4"), [false, true, false, false]);
  assert_eq!(valids(&top, "sub.comp5"), [false, true, false, false]);
  assert_eq!(valids(&top, "sub.comp6"), [false, true, false, false]);
  assert_eq!(valids(&top, "comp8"), [false, false, false, false]);

  top.run().unwrap();
  // everything downstream of comp7 reruns; comp2 is untouched
  assert_eq!(exec_counts(&top), [2, 1, 2, 2, 2, 2, 2, 2]);
  assert_eq!(
    outputs(&top),
    [
      (7, -5),
      (3, -1),
      (7, 3),
      (9, 5),
      (6, 8),
      (7, 3),
      (5, 1),
      (12, 6)
    ]
  );
}

#[test]
fn internal_boundary_set_surfaces_to_parent_scope() {
  let (mut top, _log) = build_nested();
  top.run().unwrap();

  // sub.b2 aliases sub.comp2.b; the write stays valid while its whole
  // downstream chain (through c4 into comp8) goes stale
  top.set("sub.b2", json!(5)).unwrap();
  assert_eq!(valids(&top, "sub.comp1"), [true, false, false, false]);
  assert_eq!(valids(&top, "sub.comp2"), [true, true, false, false]);
  assert_eq!(valids(&top, "sub.comp3"), [true, true, true, true]);
  assert_eq!(valids(&top, "sub.comp4"), [false, true, false, false]);
  assert_eq!(valids(&top, "sub.comp5"), [true, false, false, false]);
  assert_eq!(valids(&top, "sub.comp6"), [false, true, false, false]);
  assert_eq!(valids(&top, "comp7"), [true, true, true, true]);
  // comp8.b is fed by comp3.d, which is not downstream of b2
  assert_eq!(valids(&top, "comp8"), [false, true, false, false]);

  top.run().unwrap();
  assert_eq!(exec_counts(&top), [2, 2, 1, 2, 2, 2, 1, 2]);
  assert_eq!(
    outputs(&top),
    [
      (2, 0),
      (6, -4),
      (5, 1),
      (4, 0),
      (1, 9),
      (2, -2),
      (3, -1),
      (5, 3)
    ]
  );
}

#[test]
fn running_a_nested_unit_pulls_across_boundaries() {
  let (mut top, _log) = build_nested();
  top.run().unwrap();
  top.set("comp7.b", json!(4)).unwrap();

  // running sub.comp1 directly pulls comp7 (outside sub) and the
  // internal chain comp3 -> comp5 that feeds comp1, nothing more
  top.run_unit("sub.comp1").unwrap();
  assert_eq!(exec_counts(&top), [2, 1, 2, 1, 2, 1, 2, 1]);
  assert_eq!(
    outputs(&top),
    [
      (7, -5),
      (3, -1),
      (7, 3),
      (7, 3),
      (6, 8),
      (5, 1),
      (5, -3),
      (8, 6)
    ]
  );

  // running comp8 pulls only comp4 behind sub's c4 boundary output,
  // never sub's whole workflow
  top.run_unit("comp8").unwrap();
  assert_eq!(exec_counts(&top), [2, 1, 2, 2, 2, 1, 2, 2]);
  assert_eq!(
    outputs(&top),
    [
      (7, -5),
      (3, -1),
      (7, 3),
      (9, 5),
      (6, 8),
      (5, 1),
      (5, -3),
      (12, 6)
    ]
  );
}

#[test]
fn unconnected_units_run_in_workflow_order() {
  let log: ExecLog = Rc::default();
  let mut top = Assembly::new();
  top.add("c2", adder(&log, "c2")).unwrap();
  top.add("c1", adder(&log, "c1")).unwrap();
  top.add("c3", adder(&log, "c3")).unwrap();
  top.add("c4", adder(&log, "c4")).unwrap();
  top.add_all_to_workflow(&["c1", "c2", "c3", "c4"]).unwrap();

  top.run().unwrap();
  assert_eq!(*log.borrow(), ["c1", "c2", "c3", "c4"]);

  // make c3 depend on c4; a pull now runs c4 ahead of c3
  top.connect("c4.c", "c3.a").unwrap();
  log.borrow_mut().clear();
  top.set("c4.a", json!(2)).unwrap();
  top.run().unwrap();
  assert_eq!(*log.borrow(), ["c4", "c3"]);
}

#[test]
fn driver_pulls_external_producers_before_iterating() {
  let log: ExecLog = Rc::default();
  let mut top = Assembly::new();
  top.add("driver1", Unit::driver(Driver::new())).unwrap();
  top.add("driver2", Unit::driver(Driver::new())).unwrap();
  top.add("c1", adder(&log, "c1")).unwrap();
  top.add("c2", adder(&log, "c2")).unwrap();
  top.add("c3", adder(&log, "c3")).unwrap();

  top.add_all_to_workflow(&["driver1", "driver2", "c3"]).unwrap();
  top.add_to_driver_workflow("driver1", "c2").unwrap();
  top.add_to_driver_workflow("driver2", "c1").unwrap();

  top.connect("c1.c", "c2.a").unwrap();
  top.add_objective("driver1", "c2.c*c2.d").unwrap();
  top.add_objective("driver2", "c1.c").unwrap();

  top.run().unwrap();
  // driver1 needs c2, whose input comes from c1, iterated by driver2;
  // driver2 therefore runs first, and nothing runs twice
  assert_eq!(*log.borrow(), ["c1", "c2", "c3"]);
  assert_eq!(top.exec_count("driver1").unwrap(), 1);
  assert_eq!(top.exec_count("driver2").unwrap(), 1);
  assert_eq!(top.exec_count("c1").unwrap(), 1);
  assert_eq!(top.exec_count("c2").unwrap(), 1);
  assert_eq!(top.exec_count("c3").unwrap(), 1);

  // everything is valid, so another pass is a no-op
  top.run().unwrap();
  assert_eq!(top.exec_count("driver1").unwrap(), 1);
  assert_eq!(top.exec_count("driver2").unwrap(), 1);
  assert_eq!(top.exec_count("c2").unwrap(), 1);
}

#[test]
fn driver_references_must_resolve() {
  let mut top = Assembly::new();
  top.add("driver1", Unit::driver(Driver::new())).unwrap();
  let err = top.add_objective("driver1", "c9.c").unwrap_err();
  assert!(matches!(err, EngineError::VariableNotFound(name) if name == "c9.c"));
}

#[test]
fn required_units_follow_incoming_edges() {
  let log: ExecLog = Rc::default();
  let mut top = Assembly::new();
  top.add("driver", Unit::driver(Driver::new())).unwrap();
  top.add("c1", adder(&log, "c1")).unwrap();
  top.add("c2", adder(&log, "c2")).unwrap();
  top.add("c3", adder(&log, "c3")).unwrap();
  top.add("c4", adder(&log, "c4")).unwrap();
  top.connect("c1.c", "c2.a").unwrap();
  top.connect("c2.c", "c3.a").unwrap();

  top.add_objective("driver", "c3.c").unwrap();
  let required = top.required_unit_names("driver").unwrap();
  assert_eq!(
    required,
    BTreeSet::from(["c1".to_string(), "c2".to_string(), "c3".to_string()])
  );

  top.add_parameter("driver", "c4.a").unwrap();
  let required = top.required_unit_names("driver").unwrap();
  assert!(required.contains("c4"));
  assert_eq!(required.len(), 4);

  let err = top.required_unit_names("c1").unwrap_err();
  assert!(matches!(err, EngineError::NotADriver(name) if name == "c1"));
}

#[test]
fn connected_input_rejects_direct_set() {
  let log: ExecLog = Rc::default();
  let mut top = Assembly::new();
  top.add("c1", adder(&log, "c1")).unwrap();
  top.add("c2", adder(&log, "c2")).unwrap();
  top.connect("c1.c", "c2.a").unwrap();

  let err = top.set("c2.a", json!(9)).unwrap_err();
  match err {
    EngineError::ConnectedInput { target, src } => {
      assert_eq!(target, "c2.a");
      assert_eq!(src, "c1.c");
    }
    other => panic!("unexpected error: {other:?}"),
  }
  assert_eq!(
    top.set("c2.a", json!(9)).unwrap_err().to_string(),
    "'c2.a' is connected to source 'c1.c' and cannot be set directly"
  );

  // once disconnected the input is settable again
  top.disconnect("c1.c", "c2.a").unwrap();
  top.set("c2.a", json!(9)).unwrap();
  assert_eq!(top.get("c2.a").unwrap(), json!(9));
}

#[test]
fn list_outputs_reports_connection_state() {
  let log: ExecLog = Rc::default();
  let mut top = Assembly::new();
  top.add("c2", adder(&log, "c2")).unwrap();
  top.add("c1", adder(&log, "c1")).unwrap();

  assert!(top.list_outputs("c1", true).unwrap().is_empty());
  top.connect("c1.c", "c2.a").unwrap();
  assert_eq!(top.list_outputs("c1", true).unwrap(), ["c"]);
  top.connect("c1.d", "c2.b").unwrap();
  assert_eq!(top.list_outputs("c1", true).unwrap(), ["c", "d"]);
  top.disconnect("c1.d", "c2.b").unwrap();
  assert_eq!(top.list_outputs("c1", true).unwrap(), ["c"]);
  assert_eq!(top.list_outputs("c1", false).unwrap(), ["d"]);
}

#[test]
fn nested_boundary_outputs_and_sources() {
  let (mut top, _log) = build_nested();
  assert_eq!(
    top.list_outputs("sub", true).unwrap(),
    ["c4", "comp3.d"]
  );
  assert_eq!(
    top.assembly_ref("sub").unwrap().get_source("c4").unwrap(),
    Some("comp4.c".to_string())
  );
  assert_eq!(
    top.get_source("comp8.a").unwrap(),
    Some("sub.c4".to_string())
  );

  // dropping every connection into comp8 leaves sub's boundary
  // outputs unconnected
  top.disconnect_all("comp8").unwrap();
  assert!(top.list_outputs("sub", true).unwrap().is_empty());
  assert_eq!(
    top.assembly_ref("sub").unwrap().get_source("c4").unwrap(),
    Some("comp4.c".to_string())
  );
}

#[test]
fn force_execute_reruns_with_fresh_inputs() {
  let log: ExecLog = Rc::default();
  let mut top = Assembly::new();
  top.add("c2", adder(&log, "c2")).unwrap();
  top.add("c1", adder(&log, "c1")).unwrap();
  top.set_force_execute("c2", true).unwrap();
  top.connect("c1.c", "c2.a").unwrap();
  top.add_all_to_workflow(&["c1", "c2"]).unwrap();

  top.run().unwrap();
  assert_eq!(top.get("c2.a").unwrap(), json!(3));
  assert_eq!(top.exec_count("c2").unwrap(), 1);

  // forced unit reruns even when nothing upstream changed
  top.run().unwrap();
  assert_eq!(top.exec_count("c1").unwrap(), 1);
  assert_eq!(top.exec_count("c2").unwrap(), 2);

  top.set("c1.a", json!(2)).unwrap();
  top.run().unwrap();
  assert_eq!(top.get("c2.a").unwrap(), json!(4));
}

#[test]
fn invalidate_marks_downstream_stale() {
  let log: ExecLog = Rc::default();
  let mut top = Assembly::new();
  top.add("c1", adder(&log, "c1")).unwrap();
  top.add("c2", adder(&log, "c2")).unwrap();
  top.add_all_to_workflow(&["c1", "c2"]).unwrap();
  top.connect("c1.c", "c2.a").unwrap();
  top.run().unwrap();
  assert_eq!(top.exec_count("c1").unwrap(), 1);

  top.invalidate("c1.c").unwrap();
  // only the named output and its downstream consumers go stale
  assert_eq!(valids(&top, "c1"), [true, true, false, true]);
  assert_eq!(valids(&top, "c2"), [false, true, false, false]);
  top.run().unwrap();
  assert_eq!(top.exec_count("c1").unwrap(), 2);
  assert_eq!(top.exec_count("c2").unwrap(), 2);
}

#[test]
fn connect_rejects_fan_in_and_cycles() {
  let log: ExecLog = Rc::default();
  let mut top = Assembly::new();
  top.add("c1", adder(&log, "c1")).unwrap();
  top.add("c2", adder(&log, "c2")).unwrap();
  top.add("c3", adder(&log, "c3")).unwrap();
  top.connect("c1.c", "c3.a").unwrap();

  let err = top.connect("c2.c", "c3.a").unwrap_err();
  assert!(matches!(err, EngineError::AlreadyConnected { .. }));

  top.connect("c3.c", "c2.a").unwrap();
  let err = top.connect("c2.c", "c1.b").unwrap_err();
  assert!(matches!(err, EngineError::CircularDependency { .. }));
}

#[test]
fn driver_workflow_rejects_cyclic_membership() {
  let mut top = Assembly::new();
  top.add("d1", Unit::driver(Driver::new())).unwrap();
  top.add("d2", Unit::driver(Driver::new())).unwrap();

  let err = top.add_to_driver_workflow("d1", "d1").unwrap_err();
  assert!(matches!(err, EngineError::CircularDependency { .. }));

  top.add_to_driver_workflow("d1", "d2").unwrap();
  let err = top.add_to_driver_workflow("d2", "d1").unwrap_err();
  assert!(matches!(err, EngineError::CircularDependency { .. }));
}

#[test]
fn prebuilt_cyclic_driver_runs_without_recursing() {
  // a driver assembled with itself in its workflow before being added
  // bypasses the membership guard; the staleness walk must still
  // terminate
  let mut cyclic = Driver::new();
  cyclic.workflow_mut().add("d").unwrap();
  let mut top = Assembly::new();
  top.add("d", Unit::driver(cyclic)).unwrap();
  top.add_to_workflow("d").unwrap();

  top.run().unwrap();
  assert_eq!(top.exec_count("d").unwrap(), 0);
}

#[test]
fn boundary_input_alias_fans_out_to_internal_inputs() {
  let log: ExecLog = Rc::default();
  let mut sub = Assembly::new();
  sub.add("c1", adder(&log, "c1")).unwrap();
  sub.add("c3", adder(&log, "c3")).unwrap();
  sub.add_all_to_workflow(&["c1", "c3"]).unwrap();
  sub.create_passthrough("c1.a", "ext_in").unwrap();
  sub.connect("ext_in", "c3.b").unwrap();

  sub.run().unwrap();
  assert_eq!(sub.get("c3.b").unwrap(), json!(1));
  assert_eq!(sub.get("c3.c").unwrap(), json!(2));

  // one external write reaches both components
  sub.set("ext_in", json!(6)).unwrap();
  assert_eq!(
    sub.get_valid(&["c1.c", "c3.b", "c3.c"]).unwrap(),
    [false, false, false]
  );
  sub.run().unwrap();
  assert_eq!(sub.get("c1.c").unwrap(), json!(8));
  assert_eq!(sub.get("c3.b").unwrap(), json!(6));
  assert_eq!(sub.get("c3.c").unwrap(), json!(7));

  // a plain child input is still not a legal source
  let err = sub.connect("c1.b", "c3.a").unwrap_err();
  assert!(matches!(err, EngineError::InvalidConnection { .. }));
}

#[test]
fn remove_scrubs_driver_references() {
  let log: ExecLog = Rc::default();
  let mut top = Assembly::new();
  top.add("driver", Unit::driver(Driver::new())).unwrap();
  top.add("c1", adder(&log, "c1")).unwrap();
  top.add("c2", adder(&log, "c2")).unwrap();
  top.add_to_workflow("driver").unwrap();
  top.add_to_driver_workflow("driver", "c1").unwrap();
  top.add_objective("driver", "c1.c").unwrap();
  top.add_objective("driver", "c2.c*c1.d").unwrap();

  top.remove("c1").unwrap();
  assert!(top.required_unit_names("driver").unwrap().is_empty());
  top.run().unwrap();
  assert_eq!(top.exec_count("driver").unwrap(), 0);
}

#[test]
fn workflow_rejects_duplicates_and_unknown_units() {
  let log: ExecLog = Rc::default();
  let mut top = Assembly::new();
  top.add("c1", adder(&log, "c1")).unwrap();
  top.add_to_workflow("c1").unwrap();
  let err = top.add_to_workflow("c1").unwrap_err();
  assert!(matches!(err, EngineError::DuplicateWorkflowEntry(name) if name == "c1"));
  let err = top.add_to_workflow("c9").unwrap_err();
  assert!(matches!(err, EngineError::UnitNotFound(name) if name == "c9"));
}
