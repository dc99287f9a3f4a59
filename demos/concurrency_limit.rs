use limit_group::LimitGroup;

use std::time::{Duration, Instant};

use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;
use tracing::info;

#[tokio::main]
async fn main() {
  tracing_subscriber::fmt()
    .with_max_level(tracing::Level::DEBUG)
    .with_target(false)
    .init();

  info!("--- Concurrency Limit Example (Limit: 2) ---");

  let limit = 2;
  let num_subtasks = 5;
  let (group, _token) =
    LimitGroup::<String>::new(&CancellationToken::new(), limit, Handle::current(), "limited_group");

  info!(
    "Submitting {} subtasks, each takes 1 sec. With limit {}, this should take ~{} secs.",
    num_subtasks,
    limit,
    (num_subtasks as f32 / limit as f32).ceil()
  );

  let start = Instant::now();
  for i in 0..num_subtasks {
    group
      .go(async move {
        info!("Subtask {} starting (should take 1s).", i);
        tokio::time::sleep(Duration::from_secs(1)).await;
        info!("Subtask {} finished.", i);
        Ok(())
      })
      .await;
    info!("Subtask {} admitted after {:?}.", i, start.elapsed());
  }

  group.wait().await.expect("No subtask fails in this example");
  info!("All {} subtasks done in {:?}.", num_subtasks, start.elapsed());
  info!("--- Concurrency Limit Example End ---");
}
