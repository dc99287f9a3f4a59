use std::sync::Arc;

use thiserror::Error;

/// The aggregate failure of a [`LimitGroup`](crate::LimitGroup), as returned
/// by its `wait` method.
///
/// Only the first failure in completion order is retained; every `wait`
/// caller observes the same value. The subtask error is held behind an `Arc`
/// so the enum stays clonable without requiring `E: Clone`.
#[derive(Error, Debug, PartialEq)]
pub enum GroupError<E> {
  /// A subtask body returned an error. This is the earliest-completing
  /// failure; later ones are discarded.
  #[error("subtask failed: {0}")]
  Subtask(Arc<E>),

  /// The group was cancelled (by its first failure or by the parent token)
  /// before the subtask could acquire an admission slot. Its body never ran.
  #[error("group cancelled before an admission slot became available")]
  Cancelled,

  /// A subtask body panicked during execution.
  #[error("subtask panicked during execution")]
  Panicked,
}

// Hand-written so cloning never demands `E: Clone`; the `Subtask` payload is
// shared, not duplicated.
impl<E> Clone for GroupError<E> {
  fn clone(&self) -> Self {
    match self {
      Self::Subtask(err) => Self::Subtask(Arc::clone(err)),
      Self::Cancelled => Self::Cancelled,
      Self::Panicked => Self::Panicked,
    }
  }
}
