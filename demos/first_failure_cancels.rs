use limit_group::LimitGroup;

use std::time::Duration;

use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[tokio::main]
async fn main() {
  tracing_subscriber::fmt()
    .with_max_level(tracing::Level::DEBUG)
    .with_target(false)
    .init();

  info!("--- First Failure Cancels Example ---");

  let (group, token) =
    LimitGroup::<String>::new(&CancellationToken::new(), 3, Handle::current(), "failing_group");

  // A subtask that fails shortly after starting.
  group
    .go(async {
      tokio::time::sleep(Duration::from_millis(200)).await;
      warn!("Subtask 0 hit an error.");
      Err("disk on fire".to_string())
    })
    .await;

  // Long-running siblings that cooperatively stop once the group cancels.
  for i in 1..3 {
    let token = token.clone();
    group
      .go(async move {
        info!("Subtask {} starting; would take 10s uninterrupted.", i);
        tokio::select! {
          _ = token.cancelled() => {
            info!("Subtask {} observed cancellation and stopped early.", i);
          }
          _ = tokio::time::sleep(Duration::from_secs(10)) => {
            info!("Subtask {} ran to completion.", i);
          }
        }
        Ok(())
      })
      .await;
  }

  match group.wait().await {
    Ok(()) => info!("Group succeeded (unexpected in this example)."),
    Err(e) => info!("Group failed as expected: {}", e),
  }

  info!("--- First Failure Cancels Example End ---");
}
