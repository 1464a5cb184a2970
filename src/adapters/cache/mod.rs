pub mod noop;
pub mod redis_store;

pub use noop::CacheStore as NoopCacheStore;
pub use redis_store::CacheStore as RedisCacheStore;
