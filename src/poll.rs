use std::future::Future;
use std::time::Duration;

use tokio::time::{sleep, Instant};

/// `probe` が `Some` を返すか期限を過ぎるまで一定間隔で呼び出す
///
/// 初回は即座に呼ぶ。期限切れなら `None`。
pub async fn poll_until<T, F, Fut>(timeout: Duration, interval: Duration, mut probe: F) -> Option<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Option<T>>,
{
    let deadline = Instant::now() + timeout;

    loop {
        if let Some(value) = probe().await {
            return Some(value);
        }

        let now = Instant::now();
        if now >= deadline {
            return None;
        }

        sleep(interval.min(deadline - now)).await;
    }
}
