pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod shared;
pub mod state;

pub use shared::{AppError, Result};
pub use state::AppState;

/// ログ設定の初期化。
///
/// テストや複数回の呼び出しでも失敗しないよう `try_init` を使う。
pub fn init_logging() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shiori=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
