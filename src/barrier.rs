use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::Notify;

/// Counts admitted subtasks still in flight and signals waiters once the
/// count drains to zero.
///
/// The count is only ever incremented between a successful slot acquisition
/// and the subtask's spawn, so a drained barrier means every admitted
/// subtask has fully finished.
pub(crate) struct JoinBarrier {
  pending: AtomicUsize,
  drained: Notify,
}

impl JoinBarrier {
  pub(crate) fn new() -> Self {
    Self {
      pending: AtomicUsize::new(0),
      drained: Notify::new(),
    }
  }

  pub(crate) fn add_one(&self) {
    self.pending.fetch_add(1, Ordering::SeqCst);
  }

  /// Marks one subtask finished. The call that drains the count to zero
  /// wakes every waiter.
  pub(crate) fn done_one(&self) {
    let prev = self.pending.fetch_sub(1, Ordering::SeqCst);
    debug_assert!(prev > 0, "done_one called more times than add_one");
    if prev == 1 {
      self.drained.notify_waiters();
    }
  }

  pub(crate) fn pending(&self) -> usize {
    self.pending.load(Ordering::SeqCst)
  }

  /// Resolves once the pending count reaches zero.
  ///
  /// `notify_waiters` wakes only already-registered waiters, so the waiter
  /// is registered (`enable`) before the count is re-checked; a drain that
  /// lands between the check and the await is not missed.
  pub(crate) async fn wait(&self) {
    loop {
      let drained = self.drained.notified();
      tokio::pin!(drained);
      drained.as_mut().enable();

      if self.pending.load(Ordering::SeqCst) == 0 {
        return;
      }
      drained.await;
    }
  }
}
