use limit_group::LimitGroup;

use std::time::Duration;

use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;
use tracing::info;

#[tokio::main]
async fn main() {
  tracing_subscriber::fmt()
    .with_max_level(tracing::Level::DEBUG)
    .with_target(false)
    .init();

  info!("--- Basic Usage Example ---");

  let parent = CancellationToken::new();
  let (group, _token) = LimitGroup::<String>::new(&parent, 2, Handle::current(), "basic_group");

  for i in 0..3 {
    group
      .go(async move {
        info!("Subtask {} starting.", i);
        tokio::time::sleep(Duration::from_millis(100 * (i + 1))).await;
        info!("Subtask {} finished.", i);
        Ok(())
      })
      .await;
  }

  match group.wait().await {
    Ok(()) => info!("All subtasks completed successfully."),
    Err(e) => info!("Group failed: {}", e),
  }

  info!("--- Basic Usage Example End ---");
}
