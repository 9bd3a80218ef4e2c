use crate::application::ports::notifier::Notifier;
use async_trait::async_trait;
use tracing::{info, warn};

/// 通知をログに流す Notifier 実装。UI を持たない構成のデフォルト。
pub struct TracingNotifier;

#[async_trait]
impl Notifier for TracingNotifier {
    async fn success(&self, message: &str) {
        info!("{}", message);
    }

    async fn failure(&self, message: &str) {
        warn!("{}", message);
    }
}
