use crate::barrier::JoinBarrier;
use crate::error::GroupError;
use crate::slot::ErrorSlot;

use std::future::Future;
use std::num::NonZeroUsize;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;

use futures::FutureExt;
use tokio::runtime::Handle as TokioHandle;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info_span, trace, Instrument};

lazy_static::lazy_static! {
  static ref NEXT_SUBTASK_ID_COUNTER: AtomicU64 = AtomicU64::new(0);
}

/// Effective limit substituted when the caller passes `0`: twice the number
/// of available hardware execution units. The parallelism query never
/// reports zero, so the default is at least 2.
pub(crate) fn default_limit() -> usize {
  let units = std::thread::available_parallelism()
    .map(NonZeroUsize::get)
    .unwrap_or(1);
  units * 2
}

/// A bounded-concurrency task group.
///
/// The group runs independent subtasks belonging to one logical operation,
/// caps how many execute simultaneously, cancels all sibling and future work
/// on the first failure, and reports that failure (or success) from
/// [`wait`](Self::wait) once every admitted subtask has finished.
///
/// Cancellation is cooperative: a running body is never interrupted, but the
/// derived [`CancellationToken`] returned by [`new`](Self::new) fires as soon
/// as any subtask fails (or the parent token is cancelled), and no slot
/// acquisition started after that point will run its body.
///
/// A group is intended to be created fresh per logical operation and
/// discarded after `wait` returns. Submitting after `wait` has returned is
/// the caller's responsibility: the subtask still runs and releases its
/// slot, but no completed `wait` is obliged to cover it.
///
/// The handle is cheap to clone; all clones share the same limiter, token,
/// and join bookkeeping.
pub struct LimitGroup<E: Send + Sync + 'static> {
  inner: Arc<GroupInner<E>>,
}

// Hand-written so cloning the handle never demands `E: Clone`.
impl<E: Send + Sync + 'static> Clone for LimitGroup<E> {
  fn clone(&self) -> Self {
    Self {
      inner: self.inner.clone(),
    }
  }
}

struct GroupInner<E: Send + Sync + 'static> {
  group_name: String,
  limit: usize,
  semaphore: Arc<Semaphore>,
  token: CancellationToken,
  first_error: ErrorSlot<E>,
  barrier: JoinBarrier,
  tokio_handle: TokioHandle,
}

impl<E: Send + Sync + 'static> LimitGroup<E> {
  /// Creates a new group and the cancellation token shared by all of its
  /// subtasks.
  ///
  /// The returned token is a child of `parent`: it fires when `parent` is
  /// cancelled or when any subtask fails, whichever comes first, and is
  /// handed back so non-subtask code can observe cancellation too. A
  /// `parent` that is already cancelled yields a group that refuses every
  /// admission.
  ///
  /// A `limit` of `0` selects a platform-derived default of twice the
  /// available hardware parallelism.
  pub fn new(
    parent: &CancellationToken,
    limit: usize,
    tokio_handle: TokioHandle,
    group_name: &str,
  ) -> (Self, CancellationToken) {
    let limit = if limit == 0 { default_limit() } else { limit };
    let limit = limit.min(Semaphore::MAX_PERMITS);
    let token = parent.child_token();

    let group = Self {
      inner: Arc::new(GroupInner {
        group_name: group_name.to_string(),
        limit,
        semaphore: Arc::new(Semaphore::new(limit)),
        token: token.clone(),
        first_error: ErrorSlot::new(),
        barrier: JoinBarrier::new(),
        tokio_handle,
      }),
    };

    debug!(group = %group.inner.group_name, limit, "Created bounded task group.");
    (group, token)
  }

  /// Submits a subtask, suspending the caller until one of the `limit`
  /// admission slots is free.
  ///
  /// If the group is cancelled before a slot becomes available, `body` is
  /// dropped without running and the refusal is routed through the same
  /// first-error path as an ordinary failure, so a late submission still
  /// surfaces the cancellation reason instead of vanishing.
  ///
  /// On admission the subtask is spawned and `go` returns immediately; the
  /// slot is held for the duration of the body and released when it
  /// finishes, whether by success, failure, or panic. A panicking body is
  /// contained and counts as a failure.
  pub async fn go<F>(&self, body: F)
  where
    F: Future<Output = Result<(), E>> + Send + 'static,
  {
    let subtask_id = NEXT_SUBTASK_ID_COUNTER.fetch_add(1, AtomicOrdering::Relaxed);

    let permit = tokio::select! {
      biased;

      _ = self.inner.token.cancelled() => None,

      acquired = self.inner.semaphore.clone().acquire_owned() => {
        match acquired {
          Ok(permit) => Some(permit),
          Err(_) => {
            // The group never closes its own semaphore.
            error!(group = %self.inner.group_name, "Admission semaphore closed unexpectedly.");
            None
          }
        }
      }
    };

    let Some(permit) = permit else {
      debug!(
        group = %self.inner.group_name,
        %subtask_id,
        "Group cancelled before a slot became available. Body will not run."
      );
      self.inner.record_failure(GroupError::Cancelled);
      return;
    };

    trace!(
      group = %self.inner.group_name,
      %subtask_id,
      available = self.inner.semaphore.available_permits(),
      "Acquired admission slot. Spawning subtask."
    );

    // Counted before the spawn so a `wait` that starts after this call
    // returns is guaranteed to cover the subtask.
    self.inner.barrier.add_one();

    let inner = self.inner.clone();
    self.inner.tokio_handle.spawn(
      async move {
        // Held for the duration of the body; released explicitly below, and
        // by RAII if the task is torn down mid-flight.
        let slot = permit;

        match AssertUnwindSafe(body).catch_unwind().await {
          Ok(Ok(())) => {
            trace!("Subtask completed successfully.");
          }
          Ok(Err(err)) => {
            debug!("Subtask failed. Recording outcome.");
            inner.record_failure(GroupError::Subtask(Arc::new(err)));
          }
          Err(_panic_payload) => {
            error!("Subtask panicked during execution.");
            inner.record_failure(GroupError::Panicked);
          }
        }

        // Slot first, barrier second: a woken waiter must never observe a
        // stale admission.
        drop(slot);
        inner.barrier.done_one();
      }
      .instrument(info_span!(
        "subtask",
        group = %self.inner.group_name,
        %subtask_id
      )),
    );
  }

  /// Waits until every subtask admitted by a returned `go` call has
  /// finished, then reports the aggregate outcome: `Ok(())` on full
  /// success, otherwise the first failure in completion order.
  ///
  /// Repeated and concurrent `wait` calls are permitted and all observe the
  /// same final result.
  pub async fn wait(&self) -> Result<(), GroupError<E>> {
    trace!(
      group = %self.inner.group_name,
      pending = self.inner.barrier.pending(),
      "Waiting for subtasks to drain."
    );
    self.inner.barrier.wait().await;

    match self.inner.first_error.get() {
      Some(err) => Err(err),
      None => Ok(()),
    }
  }

  /// The configured (or defaulted) concurrency ceiling.
  pub fn limit(&self) -> usize {
    self.inner.limit
  }

  /// The group's diagnostic label.
  pub fn name(&self) -> &str {
    &self.inner.group_name
  }

  /// Whether the shared cancellation token has fired.
  pub fn is_cancelled(&self) -> bool {
    self.inner.token.is_cancelled()
  }

  /// The number of subtask bodies currently holding an admission slot.
  pub fn active_count(&self) -> usize {
    self.inner.limit.saturating_sub(self.inner.semaphore.available_permits())
  }
}

impl<E: Send + Sync + 'static> GroupInner<E> {
  /// Centralized failure sink: the call that fills the slot is also the one
  /// that cancels the shared token, so cancellation happens exactly once and
  /// the reported error never depends on how later failures interleave.
  fn record_failure(&self, err: GroupError<E>) {
    if self.first_error.record(err) {
      debug!(group = %self.group_name, "First failure recorded. Cancelling the group.");
      self.token.cancel();
    } else {
      trace!(group = %self.group_name, "Subsequent failure discarded; first error already recorded.");
    }
  }
}
