use thiserror::Error;

/// Error surface shared by graph mutation and execution operations.
///
/// Guard errors (naming conflicts, illegal sets, bad references) are
/// raised before any state is mutated; execution errors are raised at
/// the failing unit and leave previously completed units as they were.
#[derive(Debug, Error)]
pub enum EngineError {
  #[error("name '{0}' is already in use")]
  NameConflict(String),

  #[error("'{dst}' is already connected to source '{src}'")]
  AlreadyConnected { dst: String, src: String },

  #[error("'{target}' is connected to source '{src}' and cannot be set directly")]
  ConnectedInput { target: String, src: String },

  #[error("cannot connect '{src}' to '{dst}': {reason}")]
  InvalidConnection {
    src: String,
    dst: String,
    reason: String,
  },

  #[error("connecting '{src}' to '{dst}' would create a circular dependency")]
  CircularDependency { src: String, dst: String },

  #[error("unit not found: {0}")]
  UnitNotFound(String),

  #[error("variable not found: {0}")]
  VariableNotFound(String),

  #[error("'{0}' is not a valid variable path")]
  BadPath(String),

  #[error("unit '{0}' is not a driver")]
  NotADriver(String),

  #[error("workflow already contains '{0}'")]
  DuplicateWorkflowEntry(String),

  #[error("execution of '{unit}' failed: {message}")]
  Execution { unit: String, message: String },
}
