use crate::application::ports::auth_gateway::AuthGateway;
use crate::application::ports::repositories::FavoriteRepository;
use crate::domain::entities::Book;
use crate::domain::value_objects::{BookId, CacheKey};
use crate::infrastructure::cache::{QueryCache, QueryState, RollbackToken};
use crate::shared::error::AppError;
use std::sync::Arc;
use tracing::{debug, warn};

/// 書籍カードが観測するお気に入り状態。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FavoriteView {
    pub favorited: bool,
    pub is_loading: bool,
    pub is_updating: bool,
}

impl FavoriteView {
    fn settled(favorited: bool) -> Self {
        Self {
            favorited,
            is_loading: false,
            is_updating: false,
        }
    }
}

/// トグルの同期フェーズが発行するチケット。
///
/// `begin_toggle` が返った時点で楽観値はキャッシュに反映済みで、
/// 残りのネットワーク処理は `settle_toggle` に持ち越される。
#[derive(Debug)]
pub struct ToggleTicket {
    book_id: BookId,
    key: CacheKey,
    next: bool,
    rollback: RollbackToken<bool>,
}

impl ToggleTicket {
    /// このトグルが目指す値。
    pub fn next_state(&self) -> bool {
        self.next
    }
}

/// お気に入りトグルの状態コントローラ。
///
/// 書籍 ID ごとのお気に入りブール値をキャッシュ上で管理し、
/// 楽観的更新・失敗時の巻き戻し・settle 後の無効化を司る。
/// 同一書籍への連続トグルは直列化せず、後から settle した方が
/// 最終値を決める（last-settled-wins）。
pub struct FavoriteService {
    auth: Arc<dyn AuthGateway>,
    favorites: Arc<dyn FavoriteRepository>,
    status_cache: Arc<QueryCache<bool>>,
    list_cache: Arc<QueryCache<Vec<Book>>>,
}

impl FavoriteService {
    pub fn new(
        auth: Arc<dyn AuthGateway>,
        favorites: Arc<dyn FavoriteRepository>,
        status_cache: Arc<QueryCache<bool>>,
        list_cache: Arc<QueryCache<Vec<Book>>>,
    ) -> Self {
        Self {
            auth,
            favorites,
            status_cache,
            list_cache,
        }
    }

    /// 書籍のお気に入り状態を観測する。
    ///
    /// `book_id` が無い場合は操作自体が無効で、リモートに触れずに
    /// `(false, false)` を返す。初回観測は読み込みを発行し、同じキーの
    /// 観測者は一つの読み込みを共有する。読み込み失敗は `false` に
    /// 倒す（お気に入りが読めないことで閲覧を止めない）。
    pub async fn observe(&self, book_id: Option<&BookId>) -> FavoriteView {
        let Some(book_id) = book_id else {
            return FavoriteView::default();
        };
        let key = CacheKey::favorite(book_id);

        loop {
            match self.status_cache.read(&key) {
                QueryState::Settled(favorited) if !self.status_cache.is_stale(&key) => {
                    return FavoriteView::settled(favorited);
                }
                QueryState::Pending(favorited) => {
                    return FavoriteView {
                        favorited,
                        is_loading: false,
                        is_updating: true,
                    };
                }
                _ => {}
            }

            match self.status_cache.begin_fetch(&key) {
                Some(token) => {
                    let favorited = self.load_status(book_id).await;
                    self.status_cache.complete_fetch(&key, token, favorited);
                }
                None => self.status_cache.wait_for_idle(&key).await,
            }
        }
    }

    /// 楽観的フェーズ。キャンセル・スナップショット・楽観値の反映を
    /// 同期で済ませ、この呼び出しが返った直後から `observe` は新しい
    /// 値を返す。
    pub fn begin_toggle(&self, book_id: &BookId) -> ToggleTicket {
        let key = CacheKey::favorite(book_id);
        let current = matches!(
            self.status_cache.read(&key),
            QueryState::Settled(true) | QueryState::Pending(true)
        );
        let next = !current;
        let rollback = self.status_cache.write_optimistic(&key, next);
        debug!("favorite toggle begun: {} -> {}", book_id, next);

        ToggleTicket {
            book_id: book_id.clone(),
            key,
            next,
            rollback,
        }
    }

    /// ネットワークフェーズ。upsert が失敗したら楽観値をスナップ
    /// ショットへ巻き戻し、成否にかかわらず個別キーと一覧キーを
    /// 無効化する。自動リトライはしない。
    pub async fn settle_toggle(&self, ticket: ToggleTicket) -> Result<bool, AppError> {
        let ToggleTicket {
            book_id,
            key,
            next,
            rollback,
        } = ticket;

        let outcome = self.persist(&book_id, next).await;
        match &outcome {
            Ok(()) => self.status_cache.commit_write(&key),
            Err(_) => self.status_cache.rollback_write(rollback),
        }

        self.status_cache.invalidate(&key);
        self.list_cache.invalidate(&CacheKey::favorites_list());

        match outcome {
            Ok(()) => {
                debug!("favorite toggle settled: {} = {}", book_id, next);
                Ok(next)
            }
            Err(err) => {
                warn!("favorite toggle failed for {}: {}", book_id, err);
                Err(err)
            }
        }
    }

    /// 現在の観測値を反転するトグル。完了まで待つ呼び出し面。
    pub async fn toggle(&self, book_id: &BookId) -> Result<bool, AppError> {
        let ticket = self.begin_toggle(book_id);
        self.settle_toggle(ticket).await
    }

    /// fire-and-forget 版。楽観値はこの関数が返る前に可視になり、
    /// settle はランタイム上のタスクに持ち越される。
    pub fn toggle_detached(
        self: &Arc<Self>,
        book_id: &BookId,
    ) -> tokio::task::JoinHandle<Result<bool, AppError>> {
        let ticket = self.begin_toggle(book_id);
        let service = Arc::clone(self);
        tokio::spawn(async move { service.settle_toggle(ticket).await })
    }

    async fn load_status(&self, book_id: &BookId) -> bool {
        let user = match self.auth.current_user().await {
            Ok(Some(user)) => user,
            Ok(None) => return false,
            Err(err) => {
                warn!("favorite status read degraded to false: {}", err);
                return false;
            }
        };

        match self.favorites.find_favorite(&user.id, book_id).await {
            Ok(Some(favorite)) => favorite.favorited(),
            Ok(None) => false,
            Err(err) => {
                warn!("favorite status read degraded to false: {}", err);
                false
            }
        }
    }

    async fn persist(&self, book_id: &BookId, next: bool) -> Result<(), AppError> {
        let user = self
            .auth
            .current_user()
            .await?
            .ok_or_else(|| AppError::Unauthorized("login required to favorite books".into()))?;

        self.favorites.upsert_favorite(&user.id, book_id, next).await
    }
}
