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

  info!("--- Subtask Panic Example ---");

  let (group, _token) =
    LimitGroup::<String>::new(&CancellationToken::new(), 2, Handle::current(), "panic_group");

  group
    .go(async {
      info!("Well-behaved subtask starting.");
      tokio::time::sleep(Duration::from_millis(100)).await;
      info!("Well-behaved subtask finished.");
      Ok(())
    })
    .await;

  group
    .go(async {
      tokio::time::sleep(Duration::from_millis(50)).await;
      panic!("This subtask intentionally panics!");
    })
    .await;

  // The panic is contained: the slot is released, siblings are cancelled,
  // and the group reports the panic as its first failure.
  match group.wait().await {
    Ok(()) => info!("Group succeeded (unexpected in this example)."),
    Err(e) => info!("Group failed: {}", e),
  }

  info!("--- Subtask Panic Example End ---");
}
