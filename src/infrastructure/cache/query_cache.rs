use crate::domain::value_objects::CacheKey;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use tokio::sync::watch;

/// キャッシュエントリの観測結果。
///
/// - `Unknown`: まだ読み込まれていない
/// - `Loading`: 読み込み中で表示できる値がない
/// - `Settled(T)`: サーバー値と一致しているとみなせる値
/// - `Pending(T)`: 楽観的更新の書き込みが飛行中の値
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryState<T> {
    Unknown,
    Loading,
    Settled(T),
    Pending(T),
}

impl<T> QueryState<T> {
    pub fn value(&self) -> Option<&T> {
        match self {
            QueryState::Settled(value) | QueryState::Pending(value) => Some(value),
            QueryState::Unknown | QueryState::Loading => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, QueryState::Loading)
    }

    pub fn is_updating(&self) -> bool {
        matches!(self, QueryState::Pending(_))
    }
}

/// `begin_fetch` が発行する読み込みの引換券。
///
/// 世代番号を保持しており、発行後に `cancel` や楽観的書き込みで世代が
/// 進むと `complete_fetch` は黙って捨てられる。遅延した古い読み込みが
/// 新しい楽観値を潰すのを防ぐ仕組み。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchToken(u64);

/// 楽観的書き込みの巻き戻しに使うスナップショット。
///
/// `Clone` しないワンショット値。失敗時に `rollback_write` へ渡す。
#[derive(Debug)]
pub struct RollbackToken<T> {
    key: CacheKey,
    previous: Option<T>,
}

impl<T> RollbackToken<T> {
    pub fn key(&self) -> &CacheKey {
        &self.key
    }

    pub fn previous(&self) -> Option<&T> {
        self.previous.as_ref()
    }
}

struct EntryState<T> {
    value: Option<T>,
    /// 飛行中の読み込みの世代番号。
    fetching: Option<u64>,
    /// `cancel` と楽観的書き込みで単調増加する。
    generation: u64,
    stale: bool,
    writes_in_flight: u32,
    invalidations: u64,
}

impl<T> Default for EntryState<T> {
    fn default() -> Self {
        Self {
            value: None,
            fetching: None,
            generation: 0,
            stale: false,
            writes_in_flight: 0,
            invalidations: 0,
        }
    }
}

struct QueryEntry<T> {
    state: Mutex<EntryState<T>>,
    /// 状態遷移ごとに進むバージョン。settle 待ちの購読に使う。
    version: watch::Sender<u64>,
}

impl<T> QueryEntry<T> {
    fn new() -> Self {
        let (version, _) = watch::channel(0u64);
        Self {
            state: Mutex::new(EntryState::default()),
            version,
        }
    }

    fn lock(&self) -> MutexGuard<'_, EntryState<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn notify(&self) {
        self.version.send_modify(|v| *v = v.wrapping_add(1));
    }
}

/// キー指定のクエリキャッシュ。
///
/// 読み書きはすべて同期で完了する。非同期になるのは settle 待ち
/// (`wait_for_idle`) だけで、実際のネットワーク呼び出しは利用側が
/// `begin_fetch` / `complete_fetch` の間で行う。
pub struct QueryCache<T: Clone> {
    entries: RwLock<HashMap<CacheKey, Arc<QueryEntry<T>>>>,
}

impl<T: Clone> Default for QueryCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> QueryCache<T> {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    fn entry(&self, key: &CacheKey) -> Arc<QueryEntry<T>> {
        {
            let entries = self
                .entries
                .read()
                .unwrap_or_else(PoisonError::into_inner);
            if let Some(entry) = entries.get(key) {
                return Arc::clone(entry);
            }
        }
        let mut entries = self
            .entries
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        Arc::clone(
            entries
                .entry(key.clone())
                .or_insert_with(|| Arc::new(QueryEntry::new())),
        )
    }

    fn find(&self, key: &CacheKey) -> Option<Arc<QueryEntry<T>>> {
        let entries = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        entries.get(key).map(Arc::clone)
    }

    /// 現在の観測状態を返す。エントリが無ければ `Unknown`。
    pub fn read(&self, key: &CacheKey) -> QueryState<T> {
        let Some(entry) = self.find(key) else {
            return QueryState::Unknown;
        };
        let state = entry.lock();
        match (&state.value, state.writes_in_flight, state.fetching) {
            (Some(value), writes, _) if writes > 0 => QueryState::Pending(value.clone()),
            (Some(value), _, _) => QueryState::Settled(value.clone()),
            (None, _, Some(_)) => QueryState::Loading,
            (None, _, None) => QueryState::Unknown,
        }
    }

    /// 読み込みを開始してよければ引換券を返す。
    ///
    /// 新鮮な値が既にある・別の読み込みが飛行中・楽観的書き込みが
    /// 飛行中、のいずれかでは `None`（呼び出し側は settle を待つ）。
    pub fn begin_fetch(&self, key: &CacheKey) -> Option<FetchToken> {
        let entry = self.entry(key);
        let mut state = entry.lock();
        if state.writes_in_flight > 0 || state.fetching.is_some() {
            return None;
        }
        if state.value.is_some() && !state.stale {
            return None;
        }
        let token = state.generation;
        state.fetching = Some(token);
        drop(state);
        entry.notify();
        Some(FetchToken(token))
    }

    /// 読み込み結果を反映する。引換券の世代が古ければ何もしない。
    pub fn complete_fetch(&self, key: &CacheKey, token: FetchToken, value: T) {
        let Some(entry) = self.find(key) else { return };
        let mut state = entry.lock();
        if state.fetching != Some(token.0) {
            return;
        }
        state.fetching = None;
        state.value = Some(value);
        state.stale = false;
        drop(state);
        entry.notify();
    }

    /// 読み込み失敗を反映する。値は変えず Loading だけ解除する。
    pub fn fail_fetch(&self, key: &CacheKey, token: FetchToken) {
        let Some(entry) = self.find(key) else { return };
        let mut state = entry.lock();
        if state.fetching != Some(token.0) {
            return;
        }
        state.fetching = None;
        drop(state);
        entry.notify();
    }

    /// 飛行中の読み込みを論理的に取り消す。
    pub fn cancel(&self, key: &CacheKey) {
        let Some(entry) = self.find(key) else { return };
        let mut state = entry.lock();
        state.generation += 1;
        state.fetching = None;
        drop(state);
        entry.notify();
    }

    /// 楽観的書き込み。
    ///
    /// 飛行中の読み込みを取り消し、現在値をスナップショットしてから
    /// 新しい値を即時に反映する。呼び出しが返った時点で `read` は
    /// 新しい値を返す。
    pub fn write_optimistic(&self, key: &CacheKey, value: T) -> RollbackToken<T> {
        let entry = self.entry(key);
        let mut state = entry.lock();
        state.generation += 1;
        state.fetching = None;
        let previous = state.value.clone();
        state.value = Some(value);
        state.writes_in_flight += 1;
        drop(state);
        entry.notify();
        RollbackToken {
            key: key.clone(),
            previous,
        }
    }

    /// 楽観的書き込みの成功を確定する。楽観値はそのまま残す。
    pub fn commit_write(&self, key: &CacheKey) {
        let Some(entry) = self.find(key) else { return };
        let mut state = entry.lock();
        state.writes_in_flight = state.writes_in_flight.saturating_sub(1);
        drop(state);
        entry.notify();
    }

    /// 楽観的書き込みを巻き戻す。スナップショット時点の値に戻す。
    pub fn rollback_write(&self, token: RollbackToken<T>) {
        let entry = self.entry(&token.key);
        let mut state = entry.lock();
        state.value = token.previous;
        state.writes_in_flight = state.writes_in_flight.saturating_sub(1);
        drop(state);
        entry.notify();
    }

    /// エントリを陳腐化する。表示中の値は消さず、次の観測で再読込させる。
    pub fn invalidate(&self, key: &CacheKey) {
        let entry = self.entry(key);
        let mut state = entry.lock();
        state.stale = true;
        state.invalidations += 1;
        drop(state);
        entry.notify();
    }

    pub fn is_stale(&self, key: &CacheKey) -> bool {
        self.find(key).map(|entry| entry.lock().stale).unwrap_or(false)
    }

    /// これまでの無効化回数。キャッシュ統計として公開する。
    pub fn invalidation_count(&self, key: &CacheKey) -> u64 {
        self.find(key)
            .map(|entry| entry.lock().invalidations)
            .unwrap_or(0)
    }

    /// 読み込みも書き込みも飛行していない状態になるまで待つ。
    pub async fn wait_for_idle(&self, key: &CacheKey) {
        let entry = self.entry(key);
        let mut version = entry.version.subscribe();
        loop {
            {
                let state = entry.lock();
                if state.fetching.is_none() && state.writes_in_flight == 0 {
                    return;
                }
            }
            if version.changed().await.is_err() {
                return;
            }
        }
    }
}
