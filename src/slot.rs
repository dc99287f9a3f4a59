use crate::error::GroupError;

use parking_lot::Mutex;

/// Write-once cell holding the first failure observed by a group.
///
/// Concurrent failing subtasks race to fill it; exactly one wins. The value
/// is never taken back out, only cloned, so repeated `wait` calls all read
/// the same result.
pub(crate) struct ErrorSlot<E> {
  cell: Mutex<Option<GroupError<E>>>,
}

impl<E> ErrorSlot<E> {
  pub(crate) fn new() -> Self {
    Self {
      cell: Mutex::new(None),
    }
  }

  /// Stores `err` if the slot is still empty. Returns `true` when this call
  /// is the one that filled it — the winner is responsible for cancelling
  /// the group's token.
  pub(crate) fn record(&self, err: GroupError<E>) -> bool {
    let mut cell = self.cell.lock();
    if cell.is_none() {
      *cell = Some(err);
      true
    } else {
      false
    }
  }

  pub(crate) fn get(&self) -> Option<GroupError<E>> {
    self.cell.lock().clone()
  }
}
