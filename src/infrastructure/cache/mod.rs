pub mod query_cache;

pub use query_cache::{FetchToken, QueryCache, QueryState, RollbackToken};
