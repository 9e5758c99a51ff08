pub mod cache;
pub mod connection;

pub use cache::{Cache, CacheError, RedisCache, get_json, set_json};
