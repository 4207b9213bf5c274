pub mod memory;
pub mod postgres;
pub mod redis;
pub mod store;

pub use memory::MemoryNewsStore;
pub use postgres::{create_pool, PgNewsStore};
pub use redis::{create_redis_client, Cache, CacheKey, CacheWriterHandle};
pub use store::NewsStore;
